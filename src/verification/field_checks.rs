//! Field-level verifier: the declared type of every field must exist.

use std::sync::Arc;

use crate::{
    classes::{ClassNode, FieldNode},
    locations::{FieldLocation, Location},
};

use super::context::VerificationContext;

pub(crate) fn verify(
    ctx: &mut VerificationContext<'_>,
    class: &Arc<ClassNode>,
    field: &FieldNode,
) {
    let Some(element) = field.field_type.element_class() else {
        // Primitive types (and arrays of them) cannot go missing.
        return;
    };
    let usage = Location::Field(FieldLocation {
        class_name: class.name.clone(),
        field_name: field.name.clone(),
    });
    ctx.resolve_class_ref(&element.binary_name, class, &usage);
}
