//! Field resolution.
#![doc = crate::macros::see_jvm_spec!(5, 4, 3, 2)]

use std::collections::{HashSet, VecDeque};
use std::sync::Arc;

use crate::{
    classes::ClassNode, locations::Location, references::FieldRef,
    verification::context::VerificationContext,
};

use super::{FieldLookup, ResolvedField};

/// Resolves a field reference against `owner`: the class itself, then its
/// superinterfaces breadth-first, then the superclass, recursively.
pub fn resolve_field(
    ctx: &mut VerificationContext<'_>,
    owner: &Arc<ClassNode>,
    reference: &FieldRef,
    usage: &Location,
) -> FieldLookup {
    let mut visited_interfaces: HashSet<String> = HashSet::new();
    let mut current = Arc::clone(owner);
    loop {
        if let Some(index) = declared_index(&current, reference) {
            return FieldLookup::Found(ResolvedField {
                class: current,
                index,
            });
        }
        let mut queue: VecDeque<String> = current.interfaces.iter().cloned().collect();
        while let Some(name) = queue.pop_front() {
            if !visited_interfaces.insert(name.clone()) {
                continue;
            }
            // An unresolvable superinterface ends its branch; the walk
            // continues elsewhere.
            if let Some(interface) = ctx.resolve_for_walk(&name, usage) {
                if let Some(index) = declared_index(&interface, reference) {
                    return FieldLookup::Found(ResolvedField {
                        class: interface,
                        index,
                    });
                }
                queue.extend(interface.interfaces.iter().cloned());
            }
        }
        match current.super_name.clone() {
            Some(super_name) => match ctx.resolve_for_walk(&super_name, usage) {
                Some(next) => current = next,
                None => return FieldLookup::Failed,
            },
            None => break,
        }
    }
    FieldLookup::NotFound
}

fn declared_index(class: &ClassNode, reference: &FieldRef) -> Option<usize> {
    class
        .fields
        .iter()
        .position(|f| f.name == reference.name && f.field_type == reference.field_type)
}

#[cfg(test)]
mod tests {
    use crate::{
        locations::ClassLocation,
        references::ClassRef,
        resolvers::{CachingResolver, FixedResolver, UnionResolver},
        tests::{class, field, object_class},
        verification::VerifierParameters,
    };

    use super::*;

    fn reference(owner: &str, name: &str, descriptor: &str) -> FieldRef {
        FieldRef {
            owner: ClassRef::new(owner),
            name: name.to_owned(),
            field_type: descriptor.parse().unwrap(),
        }
    }

    fn usage() -> Location {
        Location::Class(ClassLocation {
            class_name: "test/Caller".into(),
        })
    }

    fn run_lookup(
        classes: Vec<ClassNode>,
        owner: &str,
        test: impl FnOnce(&mut VerificationContext<'_>, &Arc<ClassNode>),
    ) {
        let resolver = CachingResolver::new(UnionResolver::new(vec![Box::new(
            FixedResolver::from_classes(classes.into_iter().chain([object_class()])),
        )]));
        let params = VerifierParameters::default();
        let mut ctx = VerificationContext::new(&resolver, &params);
        let Some(owner) = ctx.resolve_for_walk(owner, &usage()) else {
            panic!("owner must resolve");
        };
        test(&mut ctx, &owner);
    }

    #[test]
    fn finds_field_in_the_class_itself() {
        let classes = vec![class("p/A").field(field("x", "I").build()).build()];
        run_lookup(classes, "p/A", |ctx, owner| {
            let lookup = resolve_field(ctx, owner, &reference("p/A", "x", "I"), &usage());
            let FieldLookup::Found(found) = lookup else {
                panic!("expected Found, got {lookup:?}");
            };
            assert_eq!(found.class.name, "p/A");
        });
    }

    #[test]
    fn interface_constants_win_over_superclass_fields() {
        let classes = vec![
            class("p/Base").field(field("x", "I").build()).build(),
            class("p/Consts")
                .interface()
                .field(field("x", "I").static_field().final_field().build())
                .build(),
            class("p/A")
                .extends("p/Base")
                .implements("p/Consts")
                .build(),
        ];
        run_lookup(classes, "p/A", |ctx, owner| {
            let lookup = resolve_field(ctx, owner, &reference("p/A", "x", "I"), &usage());
            let FieldLookup::Found(found) = lookup else {
                panic!("expected Found, got {lookup:?}");
            };
            assert_eq!(found.class.name, "p/Consts");
        });
    }

    #[test]
    fn falls_back_to_the_superclass_chain() {
        let classes = vec![
            class("p/Base").field(field("x", "I").build()).build(),
            class("p/Mid").extends("p/Base").build(),
            class("p/A").extends("p/Mid").build(),
        ];
        run_lookup(classes, "p/A", |ctx, owner| {
            let lookup = resolve_field(ctx, owner, &reference("p/A", "x", "I"), &usage());
            let FieldLookup::Found(found) = lookup else {
                panic!("expected Found, got {lookup:?}");
            };
            assert_eq!(found.class.name, "p/Base");
        });
    }

    #[test]
    fn descriptor_mismatch_is_not_found() {
        let classes = vec![class("p/A").field(field("x", "I").build()).build()];
        run_lookup(classes, "p/A", |ctx, owner| {
            let lookup = resolve_field(ctx, owner, &reference("p/A", "x", "J"), &usage());
            assert!(matches!(lookup, FieldLookup::NotFound));
        });
    }

    #[test]
    fn missing_superclass_fails_the_lookup() {
        let classes = vec![class("p/A").extends("p/Gone").build()];
        run_lookup(classes, "p/A", |ctx, owner| {
            let lookup = resolve_field(ctx, owner, &reference("p/A", "x", "I"), &usage());
            assert!(matches!(lookup, FieldLookup::Failed));
            assert_eq!(ctx.problem_count(), 1);
        });
    }
}
