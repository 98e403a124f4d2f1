//! Symbolic references to JVM elements, as they appear in bytecode prior to
//! resolution.

use crate::types::{
    field_type::FieldType,
    method_descriptor::{MethodDescriptor, ReturnType},
};

/// The name of instance initializers (constructors).
pub const CONSTRUCTOR_NAME: &str = "<init>";

/// The name of static initializer blocks.
pub const CLASS_INITIALIZER_NAME: &str = "<clinit>";

/// A reference to a class by its binary name (e.g. `org/acme/Widget`).
#[derive(Debug, PartialEq, Eq, Clone, Hash, PartialOrd, Ord, derive_more::Display)]
#[display("{binary_name}")]
pub struct ClassRef {
    /// The binary name of the class.
    pub binary_name: String,
}

impl ClassRef {
    /// Creates a new [`ClassRef`] from a binary name.
    pub fn new<S: Into<String>>(binary_name: S) -> Self {
        ClassRef {
            binary_name: binary_name.into(),
        }
    }

    /// The package part of the binary name, without the trailing slash.
    /// Empty for classes in the default package.
    #[must_use]
    pub fn package(&self) -> &str {
        crate::access::package_of(&self.binary_name)
    }
}

/// A reference to a field.
#[derive(Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Clone, derive_more::Display)]
#[display("{owner}.{name} : {field_type}")]
pub struct FieldRef {
    /// A reference to the class that contains the field.
    pub owner: ClassRef,
    /// The name of the field.
    pub name: String,
    /// The type of the field.
    pub field_type: FieldType,
}

/// A reference to a method.
#[derive(Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Clone, derive_more::Display)]
#[display("{owner}.{name}{descriptor}")]
pub struct MethodRef {
    /// The reference to the class containing the method.
    pub owner: ClassRef,
    /// The name of the method.
    pub name: String,
    /// The descriptor of the method.
    pub descriptor: MethodDescriptor,
}

impl MethodRef {
    /// Checks if the reference names a constructor.
    #[must_use]
    pub fn is_constructor(&self) -> bool {
        self.name == CONSTRUCTOR_NAME && matches!(self.descriptor.return_type, ReturnType::Void)
    }

    /// Checks if the reference names a static initializer block.
    #[must_use]
    pub fn is_static_initializer_block(&self) -> bool {
        self.name == CLASS_INITIALIZER_NAME
            && self.descriptor.parameter_types.is_empty()
            && matches!(self.descriptor.return_type, ReturnType::Void)
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use crate::tests::arb_class_name;

    use super::*;
    use proptest::prelude::*;

    proptest! {
        #[test]
        fn constructor_reference(class_name in arb_class_name()) {
            let method = MethodRef {
                owner: ClassRef::new(class_name),
                name: CONSTRUCTOR_NAME.to_string(),
                descriptor: "()V".parse().unwrap(),
            };
            assert!(method.is_constructor());
            assert!(!method.is_static_initializer_block());
        }

        #[test]
        fn static_initializer_reference(class_name in arb_class_name()) {
            let method = MethodRef {
                owner: ClassRef::new(class_name),
                name: CLASS_INITIALIZER_NAME.to_string(),
                descriptor: "()V".parse().unwrap(),
            };
            assert!(method.is_static_initializer_block());
            assert!(!method.is_constructor());
        }
    }

    #[test]
    fn package_of_class_ref() {
        assert_eq!(ClassRef::new("org/acme/Widget").package(), "org/acme");
        assert_eq!(ClassRef::new("TopLevel").package(), "");
    }
}
