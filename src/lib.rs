#![warn(
    clippy::pedantic,
    future_incompatible,
    missing_debug_implementations,
    missing_docs,
    rust_2018_idioms
)]
#![cfg_attr(docsrs, feature(doc_auto_cfg, doc_cfg))]
#![deny(rustdoc::broken_intra_doc_links)]

//! Welcome to `percolator`, a library for verifying the binary compatibility of
//! JVM plugins against a host platform.
//!
//! Given a compiled plugin and the class pools of the host, the JDK, and the
//! plugin's dependencies, the engine statically checks every bytecode reference
//! the plugin makes and reports the references that would break at load, link,
//! or invocation time: missing classes and members, illegal accesses, final
//! overrides, static/instance mismatches, and the like. No bytecode is ever
//! executed.
//!
//! The entry point is [`verification::verify_plugin`].
//!
//! ## Features
#![doc = document_features::document_features!()]

pub mod access;
pub mod classes;
pub mod dependencies;
pub mod hierarchy;
pub mod locations;
pub(crate) mod macros;
pub mod problems;
pub mod references;
pub mod registrar;
pub mod resolution;
pub mod resolvers;
pub mod types;
pub mod usages;
pub mod verification;
