//! Resolution of symbolic member references against the layered classpath.

use std::sync::Arc;

use crate::{
    access::MethodAccessFlags,
    classes::{ClassNode, FieldNode, MethodNode},
    types::field_type::FieldType,
};

pub mod fields;
pub mod methods;

/// A method resolved to its declaring class.
#[derive(Debug, Clone)]
pub struct ResolvedMethod {
    /// The class or interface the method is declared in.
    pub class: Arc<ClassNode>,
    /// The index of the method in [`ClassNode::methods`].
    pub index: usize,
}

impl ResolvedMethod {
    /// The resolved method node.
    #[must_use]
    pub fn method(&self) -> &MethodNode {
        &self.class.methods[self.index]
    }
}

/// The outcome of a method lookup.
///
/// `Failed` means a prerequisite class resolution already raised a problem
/// and the invocation should be abandoned without further reports.
#[derive(Debug, Clone)]
pub enum MethodLookup {
    /// The method was resolved.
    Found(ResolvedMethod),
    /// No declaration matches the reference.
    NotFound,
    /// A prerequisite resolution failed; a problem has been registered.
    Failed,
}

/// A field resolved to its declaring class.
#[derive(Debug, Clone)]
pub struct ResolvedField {
    /// The class or interface the field is declared in.
    pub class: Arc<ClassNode>,
    /// The index of the field in [`ClassNode::fields`].
    pub index: usize,
}

impl ResolvedField {
    /// The resolved field node.
    #[must_use]
    pub fn field(&self) -> &FieldNode {
        &self.class.fields[self.index]
    }
}

/// The outcome of a field lookup.
#[derive(Debug, Clone)]
pub enum FieldLookup {
    /// The field was resolved.
    Found(ResolvedField),
    /// No declaration matches the reference.
    NotFound,
    /// A prerequisite resolution failed; a problem has been registered.
    Failed,
}

/// The only owners of signature-polymorphic methods.
pub(crate) const SIGNATURE_POLYMORPHIC_OWNERS: [&str; 2] = [
    "java/lang/invoke/MethodHandle",
    "java/lang/invoke/VarHandle",
];

/// Whether `method` is signature-polymorphic: declared in `MethodHandle` or
/// `VarHandle`, native and varargs, with a single `Object[]` parameter.
/// The detection is deliberately exact; it must not be broadened.
#[must_use]
pub(crate) fn is_signature_polymorphic(owner_name: &str, method: &MethodNode) -> bool {
    SIGNATURE_POLYMORPHIC_OWNERS.contains(&owner_name)
        && method
            .access
            .contains(MethodAccessFlags::NATIVE | MethodAccessFlags::VARARGS)
        && matches!(
            method.descriptor.parameter_types.as_slice(),
            [FieldType::Array(element)]
                if matches!(
                    element.as_ref(),
                    FieldType::Object(class) if class.binary_name == "java/lang/Object"
                )
        )
}

#[cfg(test)]
mod tests {
    use crate::{
        access::MethodAccessFlags,
        tests::method,
    };

    use super::*;

    fn polymorphic_flags() -> MethodAccessFlags {
        MethodAccessFlags::PUBLIC
            | MethodAccessFlags::NATIVE
            | MethodAccessFlags::VARARGS
            | MethodAccessFlags::FINAL
    }

    #[test]
    fn detects_method_handle_invoke() {
        let invoke = method("invokeExact", "([Ljava/lang/Object;)Ljava/lang/Object;")
            .flags(polymorphic_flags())
            .build();
        assert!(is_signature_polymorphic(
            "java/lang/invoke/MethodHandle",
            &invoke
        ));
        assert!(is_signature_polymorphic("java/lang/invoke/VarHandle", &invoke));
    }

    #[test]
    fn owner_must_be_an_invoke_handle() {
        let invoke = method("invoke", "([Ljava/lang/Object;)Ljava/lang/Object;")
            .flags(polymorphic_flags())
            .build();
        assert!(!is_signature_polymorphic("java/lang/Object", &invoke));
    }

    #[test]
    fn shape_must_be_exactly_one_object_array() {
        let two_params = method(
            "invoke",
            "([Ljava/lang/Object;[Ljava/lang/Object;)Ljava/lang/Object;",
        )
        .flags(polymorphic_flags())
        .build();
        assert!(!is_signature_polymorphic(
            "java/lang/invoke/MethodHandle",
            &two_params
        ));
        let wrong_element = method("invoke", "([Ljava/lang/String;)Ljava/lang/Object;")
            .flags(polymorphic_flags())
            .build();
        assert!(!is_signature_polymorphic(
            "java/lang/invoke/MethodHandle",
            &wrong_element
        ));
    }

    #[test]
    fn flags_must_include_native_and_varargs() {
        let plain = method("invoke", "([Ljava/lang/Object;)Ljava/lang/Object;").build();
        assert!(!is_signature_polymorphic(
            "java/lang/invoke/MethodHandle",
            &plain
        ));
    }
}
