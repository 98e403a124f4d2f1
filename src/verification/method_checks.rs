//! Method-level verifier: overriding of methods that became final.

use std::sync::Arc;

use crate::{
    classes::{ClassNode, MethodNode},
    locations::{Location, MethodLocation},
    problems::Problem,
};

use super::context::VerificationContext;

pub(crate) fn verify(
    ctx: &mut VerificationContext<'_>,
    class: &Arc<ClassNode>,
    method: &MethodNode,
) {
    // Only instance methods participate in overriding.
    if method.is_private() || method.is_static() || method.name.starts_with('<') {
        return;
    }
    let location = MethodLocation {
        class_name: class.name.clone(),
        method_name: method.name.clone(),
        descriptor: method.descriptor.clone(),
    };
    let usage = Location::Method(location.clone());
    for ancestor in ctx.walk_ancestors(class, &usage) {
        if let Some(inherited) = ancestor.get_method(&method.name, &method.descriptor) {
            if inherited.is_private() || inherited.is_static() {
                continue;
            }
            if inherited.is_final() && !inherited.is_abstract() {
                ctx.register(Problem::OverridingFinalMethod {
                    method: inherited.as_ref(&ancestor),
                    location,
                });
                return;
            }
        }
    }
}
