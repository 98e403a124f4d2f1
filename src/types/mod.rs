//! The non-generic JVM descriptor type system.
//!
//! Descriptor parsing is centralized here; every presence check in the
//! verifiers goes through these types rather than re-scanning descriptor
//! strings.

pub mod field_type;
pub mod method_descriptor;
