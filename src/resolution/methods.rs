//! Method resolution.
#![doc = crate::macros::see_jvm_spec!(5, 4, 3)]

use std::sync::Arc;

use crate::{
    classes::ClassNode,
    hierarchy,
    locations::Location,
    macros::see_jvm_spec,
    problems::Problem,
    references::MethodRef,
    verification::context::VerificationContext,
};

use super::{MethodLookup, ResolvedMethod, SIGNATURE_POLYMORPHIC_OWNERS, is_signature_polymorphic};

/// Resolves a method referenced with a class owner.
#[doc = see_jvm_spec!(5, 4, 3, 3)]
pub fn resolve_class_method(
    ctx: &mut VerificationContext<'_>,
    owner: &Arc<ClassNode>,
    reference: &MethodRef,
    usage: &Location,
) -> MethodLookup {
    if owner.is_interface() {
        ctx.register(Problem::IncompatibleClassToInterfaceChange {
            class_name: owner.name.clone(),
            usage: usage.clone(),
        });
        return MethodLookup::Failed;
    }
    let mut current = Arc::clone(owner);
    loop {
        if let Some(found) = declared_match(&current, reference) {
            return MethodLookup::Found(found);
        }
        match current.super_name.clone() {
            Some(super_name) => match ctx.resolve_for_walk(&super_name, usage) {
                Some(next) => current = next,
                None => return MethodLookup::Failed,
            },
            None => break,
        }
    }
    superinterface_lookup(ctx, owner, reference, usage)
}

/// Resolves a method referenced with an interface owner.
#[doc = see_jvm_spec!(5, 4, 3, 4)]
pub fn resolve_interface_method(
    ctx: &mut VerificationContext<'_>,
    owner: &Arc<ClassNode>,
    reference: &MethodRef,
    usage: &Location,
) -> MethodLookup {
    if !owner.is_interface() {
        ctx.register(Problem::IncompatibleInterfaceToClassChange {
            class_name: owner.name.clone(),
            usage: usage.clone(),
        });
        return MethodLookup::Failed;
    }
    if let Some(index) = declared_index(owner, reference) {
        return MethodLookup::Found(ResolvedMethod {
            class: Arc::clone(owner),
            index,
        });
    }
    // An interface reference may resolve to a public instance method of
    // java/lang/Object (toString and friends).
    if let Some(object) = ctx.resolve_for_walk(hierarchy::OBJECT, usage) {
        let object_match = object.methods.iter().position(|m| {
            m.name == reference.name
                && m.descriptor == reference.descriptor
                && m.access.contains(crate::access::MethodAccessFlags::PUBLIC)
                && !m.is_static()
        });
        if let Some(index) = object_match {
            return MethodLookup::Found(ResolvedMethod {
                class: object,
                index,
            });
        }
    }
    superinterface_lookup(ctx, owner, reference, usage)
}

/// A declared method matching the reference exactly, or the
/// signature-polymorphic special case for the `java.lang.invoke` handles.
fn declared_match(class: &Arc<ClassNode>, reference: &MethodRef) -> Option<ResolvedMethod> {
    if SIGNATURE_POLYMORPHIC_OWNERS.contains(&class.name.as_str()) {
        let mut named = class
            .methods
            .iter()
            .enumerate()
            .filter(|(_, m)| m.name == reference.name);
        if let (Some((index, method)), None) = (named.next(), named.next())
            && is_signature_polymorphic(&class.name, method)
        {
            // The descriptor is deliberately not matched.
            return Some(ResolvedMethod {
                class: Arc::clone(class),
                index,
            });
        }
    }
    declared_index(class, reference).map(|index| ResolvedMethod {
        class: Arc::clone(class),
        index,
    })
}

fn declared_index(class: &ClassNode, reference: &MethodRef) -> Option<usize> {
    class
        .methods
        .iter()
        .position(|m| m.name == reference.name && m.descriptor == reference.descriptor)
}

/// Steps 3 and 4 of class-method lookup: prefer the unique non-abstract
/// maximally-specific superinterface method, otherwise fall back to the first
/// applicable superinterface method in walk order.
fn superinterface_lookup(
    ctx: &mut VerificationContext<'_>,
    start: &Arc<ClassNode>,
    reference: &MethodRef,
    usage: &Location,
) -> MethodLookup {
    let matches = superinterface_matches(ctx, start, reference, usage);
    let maximal = maximally_specific(ctx, &matches, usage);
    let mut non_abstract = maximal.iter().filter(|m| !m.method().is_abstract());
    if let (Some(only), None) = (non_abstract.next(), non_abstract.next()) {
        return MethodLookup::Found(only.clone());
    }
    match matches.into_iter().next() {
        Some(first) => MethodLookup::Found(first),
        None => MethodLookup::NotFound,
    }
}

/// Every non-private non-static method matching the reference in any direct
/// or indirect superinterface of `start`, in BFS order.
pub(crate) fn superinterface_matches(
    ctx: &mut VerificationContext<'_>,
    start: &Arc<ClassNode>,
    reference: &MethodRef,
    usage: &Location,
) -> Vec<ResolvedMethod> {
    ctx.walk_ancestors(start, usage)
        .into_iter()
        .filter(|ancestor| ancestor.is_interface())
        .filter_map(|interface| {
            let index = interface.methods.iter().position(|m| {
                m.name == reference.name
                    && m.descriptor == reference.descriptor
                    && !m.is_private()
                    && !m.is_static()
            })?;
            Some(ResolvedMethod {
                class: interface,
                index,
            })
        })
        .collect()
}

/// Keeps a match declared in interface `I` iff no other match is declared in
/// a strict subinterface of `I`. Ties are retained.
pub(crate) fn maximally_specific(
    ctx: &mut VerificationContext<'_>,
    matches: &[ResolvedMethod],
    usage: &Location,
) -> Vec<ResolvedMethod> {
    let mut maximal = Vec::new();
    for candidate in matches {
        let is_shadowed = matches.iter().any(|other| {
            other.class.name != candidate.class.name
                && ctx.is_strict_subtype(&other.class, &candidate.class.name, usage)
        });
        if !is_shadowed {
            maximal.push(candidate.clone());
        }
    }
    maximal
}
