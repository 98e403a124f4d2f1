//! Class-level verifiers: superclass and superinterface sanity, and the
//! inherited-implementation analysis for concrete classes.

use std::collections::HashSet;
use std::sync::Arc;

use crate::{
    classes::ClassNode,
    locations::{ClassLocation, Location},
    problems::Problem,
    references::{ClassRef, MethodRef},
    resolution::methods::{maximally_specific, superinterface_matches},
    types::method_descriptor::MethodDescriptor,
};

use super::context::VerificationContext;

pub(crate) fn verify(ctx: &mut VerificationContext<'_>, class: &Arc<ClassNode>) {
    let location = ClassLocation {
        class_name: class.name.clone(),
    };
    let usage = Location::Class(location.clone());

    if let Some(super_name) = &class.super_name
        && let Some(superclass) = ctx.resolve_class_ref(super_name, class, &usage)
    {
        if superclass.is_interface() {
            ctx.register(Problem::SuperClassBecameInterface {
                class_name: super_name.clone(),
                location: location.clone(),
            });
        } else if superclass.is_final() {
            ctx.register(Problem::InheritFromFinalClass {
                class_name: super_name.clone(),
                location: location.clone(),
            });
        }
    }

    for interface_name in &class.interfaces {
        if let Some(interface) = ctx.resolve_class_ref(interface_name, class, &usage)
            && !interface.is_interface()
        {
            ctx.register(Problem::SuperInterfaceBecameClass {
                class_name: interface_name.clone(),
                location: location.clone(),
            });
        }
    }

    if !class.is_abstract() && !class.is_interface() {
        check_inherited_implementations(ctx, class, &location, &usage);
    }
}

/// One inherited method signature a concrete class must end up providing.
struct Requirement {
    name: String,
    descriptor: MethodDescriptor,
    /// The first supertype declaring the signature abstract, if any.
    abstract_declarer: Option<String>,
}

/// Walks all supertypes of a concrete class and checks that every inherited
/// instance method is implemented exactly once: abstract signatures with no
/// implementation are reported as [`Problem::MethodNotImplemented`], and
/// signatures with conflicting defaults from unrelated interfaces as
/// [`Problem::MultipleDefaultImplementations`].
fn check_inherited_implementations(
    ctx: &mut VerificationContext<'_>,
    class: &Arc<ClassNode>,
    location: &ClassLocation,
    usage: &Location,
) {
    let ancestors = ctx.walk_ancestors(class, usage);

    // Concrete implementations along the class chain satisfy any requirement.
    let mut implemented: HashSet<(&str, &MethodDescriptor)> = HashSet::new();
    for method in &class.methods {
        if !method.is_abstract() && !method.is_static() && !method.is_private() {
            implemented.insert((method.name.as_str(), &method.descriptor));
        }
    }
    for ancestor in ancestors.iter().filter(|a| !a.is_interface()) {
        for method in &ancestor.methods {
            if !method.is_abstract() && !method.is_static() && !method.is_private() {
                implemented.insert((method.name.as_str(), &method.descriptor));
            }
        }
    }

    let mut requirements: Vec<Requirement> = Vec::new();
    for ancestor in &ancestors {
        for method in &ancestor.methods {
            if method.is_static() || method.is_private() || method.name.starts_with('<') {
                continue;
            }
            if !ancestor.is_interface() && !method.is_abstract() {
                continue;
            }
            if implemented.contains(&(method.name.as_str(), &method.descriptor)) {
                continue;
            }
            let declarer = method
                .is_abstract()
                .then(|| ancestor.name.clone());
            match requirements
                .iter_mut()
                .find(|r| r.name == method.name && r.descriptor == method.descriptor)
            {
                Some(requirement) => {
                    if requirement.abstract_declarer.is_none() {
                        requirement.abstract_declarer = declarer;
                    }
                }
                None => requirements.push(Requirement {
                    name: method.name.clone(),
                    descriptor: method.descriptor.clone(),
                    abstract_declarer: declarer,
                }),
            }
        }
    }

    for requirement in requirements {
        let reference = MethodRef {
            owner: ClassRef::new(class.name.clone()),
            name: requirement.name.clone(),
            descriptor: requirement.descriptor.clone(),
        };
        let matches = superinterface_matches(ctx, class, &reference, usage);
        let maximal = maximally_specific(ctx, &matches, usage);
        let defaults = maximal
            .iter()
            .filter(|m| !m.method().is_abstract())
            .count();
        if defaults > 1 {
            ctx.register(Problem::MultipleDefaultImplementations {
                method: reference,
                location: location.clone(),
            });
        } else if defaults == 0
            && let Some(declarer) = requirement.abstract_declarer
        {
            ctx.register(Problem::MethodNotImplemented {
                method: MethodRef {
                    owner: ClassRef::new(declarer),
                    name: requirement.name,
                    descriptor: requirement.descriptor,
                },
                location: location.clone(),
            });
        }
    }
}

#[cfg(test)]
mod tests {
    use crate::{
        resolvers::{CachingResolver, FixedResolver, UnionResolver},
        tests::{class, method, object_class},
        verification::VerifierParameters,
    };

    use super::*;

    fn run_check(classes: Vec<ClassNode>, current: &str) -> Vec<Problem> {
        let resolver = CachingResolver::new(UnionResolver::new(vec![Box::new(
            FixedResolver::from_classes(classes.into_iter().chain([object_class()])),
        )]));
        let params = VerifierParameters::default();
        let mut ctx = VerificationContext::new(&resolver, &params);
        let Some(current) = ctx.resolve_plugin_class(current) else {
            panic!("the verified class must resolve");
        };
        verify(&mut ctx, &current);
        ctx.finish().0
    }

    #[test]
    fn inheriting_from_a_final_class() {
        let classes = vec![
            class("p/Sealed").final_class().build(),
            class("q/B").extends("p/Sealed").build(),
        ];
        let problems = run_check(classes, "q/B");
        assert_eq!(problems.len(), 1);
        assert!(matches!(
            &problems[0],
            Problem::InheritFromFinalClass { class_name, .. } if class_name == "p/Sealed"
        ));
    }

    #[test]
    fn abstract_classes_may_leave_methods_unimplemented() {
        let classes = vec![
            class("p/Base")
                .abstract_class()
                .method(method("draw", "()V").abstract_method().build())
                .build(),
            class("q/Shape").abstract_class().extends("p/Base").build(),
        ];
        let problems = run_check(classes, "q/Shape");
        assert!(problems.is_empty(), "{problems:?}");
    }

    #[test]
    fn abstract_redeclaration_cancels_an_inherited_default() {
        let classes = vec![
            class("p/Top")
                .interface()
                .method(method("m", "()V").build())
                .build(),
            class("p/Sub")
                .interface()
                .implements("p/Top")
                .method(method("m", "()V").abstract_method().build())
                .build(),
            class("q/Impl").implements("p/Sub").build(),
        ];
        let problems = run_check(classes, "q/Impl");
        assert_eq!(problems.len(), 1);
        assert!(matches!(
            &problems[0],
            Problem::MethodNotImplemented { method, .. } if method.owner.binary_name == "p/Sub"
        ));
    }

    #[test]
    fn inherited_default_satisfies_an_abstract_superclass_method() {
        let classes = vec![
            class("p/Base")
                .abstract_class()
                .method(method("m", "()V").abstract_method().build())
                .build(),
            class("p/WithDefault")
                .interface()
                .method(method("m", "()V").build())
                .build(),
            class("q/Impl")
                .extends("p/Base")
                .implements("p/WithDefault")
                .build(),
        ];
        let problems = run_check(classes, "q/Impl");
        assert!(problems.is_empty(), "{problems:?}");
    }
}
