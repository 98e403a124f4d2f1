//! Records of resolved references to discouraged API.
//!
//! These are not problems: a deprecated target still links. They are collected
//! separately when [`find_deprecated_api_usages`] is enabled.
//!
//! [`find_deprecated_api_usages`]: crate::verification::VerifierParameters::find_deprecated_api_usages

use crate::{
    locations::Location,
    references::{FieldRef, MethodRef},
};

/// The API element a usage points at.
#[derive(Debug, PartialEq, Eq, Hash, Clone, derive_more::Display)]
pub enum ApiElement {
    /// A class.
    #[display("class {_0}")]
    Class(String),
    /// A method.
    #[display("method {_0}")]
    Method(MethodRef),
    /// A field.
    #[display("field {_0}")]
    Field(FieldRef),
}

/// One resolved reference to a discouraged API element.
#[derive(Debug, PartialEq, Eq, Hash, Clone, derive_more::Display)]
pub enum ApiUsage {
    /// The target is marked deprecated.
    #[display("deprecated {element} used at {usage}")]
    Deprecated {
        /// The deprecated element.
        element: ApiElement,
        /// Where the plugin references it.
        usage: Location,
    },
    /// The target is marked as experimental API.
    #[display("experimental {element} used at {usage}")]
    Experimental {
        /// The experimental element.
        element: ApiElement,
        /// Where the plugin references it.
        usage: Location,
    },
    /// The target is marked as internal API.
    #[display("internal {element} used at {usage}")]
    Internal {
        /// The internal element.
        element: ApiElement,
        /// Where the plugin references it.
        usage: Location,
    },
}
