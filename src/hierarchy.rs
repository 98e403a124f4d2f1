//! Cycle-safe walks over class hierarchies.
//!
//! Plugin class pools routinely contain malformed hierarchies, including
//! cycles; every walk carries a visited set and terminates with a defined
//! answer instead of looping. A parent that cannot be resolved ends that
//! branch of the walk: the callback reports the miss, the walk goes on.

use std::collections::{HashSet, VecDeque};
use std::sync::Arc;

use crate::classes::ClassNode;

/// The binary name of the root of the class hierarchy.
pub const OBJECT: &str = "java/lang/Object";

/// The direct parents of a class: the superclass, then the declared
/// interfaces.
pub fn direct_parents(class: &ClassNode) -> impl Iterator<Item = &str> {
    class
        .super_name
        .as_deref()
        .into_iter()
        .chain(class.interfaces.iter().map(String::as_str))
}

/// Whether `start` is `parent_name` or inherits from it, directly or
/// transitively.
///
/// `resolve` maps a binary name to its node; returning `None` ends that
/// branch of the walk (the caller decides whether the miss is reportable).
pub fn is_subclass_or_self(
    start: &ClassNode,
    parent_name: &str,
    resolve: &mut dyn FnMut(&str) -> Option<Arc<ClassNode>>,
) -> bool {
    if start.name == parent_name {
        return true;
    }
    is_subclass(start, parent_name, resolve)
}

/// Whether `start` strictly inherits from `parent_name`.
pub fn is_subclass(
    start: &ClassNode,
    parent_name: &str,
    resolve: &mut dyn FnMut(&str) -> Option<Arc<ClassNode>>,
) -> bool {
    // Everything except Object itself is a subclass of Object.
    if parent_name == OBJECT {
        return start.name != OBJECT;
    }
    let mut visited: HashSet<String> = HashSet::new();
    let mut queue: VecDeque<String> = direct_parents(start).map(ToOwned::to_owned).collect();
    visited.insert(start.name.clone());
    while let Some(name) = queue.pop_front() {
        if !visited.insert(name.clone()) {
            continue;
        }
        if name == parent_name {
            return true;
        }
        if let Some(node) = resolve(&name) {
            queue.extend(direct_parents(&node).map(ToOwned::to_owned));
        }
    }
    false
}

/// Every supertype of `start` in BFS order (superclass chain and all
/// superinterfaces), excluding `start` itself. Unresolvable parents are
/// skipped after the callback has seen the miss.
pub fn ancestors(
    start: &ClassNode,
    resolve: &mut dyn FnMut(&str) -> Option<Arc<ClassNode>>,
) -> Vec<Arc<ClassNode>> {
    let mut visited: HashSet<String> = HashSet::new();
    visited.insert(start.name.clone());
    let mut queue: VecDeque<String> = direct_parents(start).map(ToOwned::to_owned).collect();
    let mut found = Vec::new();
    while let Some(name) = queue.pop_front() {
        if !visited.insert(name.clone()) {
            continue;
        }
        if let Some(node) = resolve(&name) {
            queue.extend(direct_parents(&node).map(ToOwned::to_owned));
            found.push(node);
        }
    }
    found
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use proptest::prelude::*;

    use crate::tests::class;

    use super::*;

    fn resolver_over(
        classes: Vec<ClassNode>,
    ) -> impl FnMut(&str) -> Option<Arc<ClassNode>> {
        let map: HashMap<String, Arc<ClassNode>> = classes
            .into_iter()
            .map(|c| (c.name.clone(), Arc::new(c)))
            .collect();
        move |name: &str| map.get(name).cloned()
    }

    #[test]
    fn subclass_through_superclass_chain() {
        let mut resolve = resolver_over(vec![
            class("p/A").build(),
            class("p/B").extends("p/A").build(),
            class("p/C").extends("p/B").build(),
        ]);
        let c = class("p/C").extends("p/B").build();
        assert!(is_subclass_or_self(&c, "p/A", &mut resolve));
        assert!(is_subclass_or_self(&c, "p/C", &mut resolve));
        assert!(!is_subclass(&c, "p/C", &mut resolve));
        assert!(!is_subclass_or_self(&c, "p/Unrelated", &mut resolve));
    }

    #[test]
    fn subclass_through_interfaces() {
        let mut resolve = resolver_over(vec![
            class("p/Top").interface().build(),
            class("p/Mid").interface().implements("p/Top").build(),
            class("p/Impl").implements("p/Mid").build(),
        ]);
        let impl_class = class("p/Impl").implements("p/Mid").build();
        assert!(is_subclass_or_self(&impl_class, "p/Top", &mut resolve));
    }

    #[test]
    fn object_is_everyones_parent() {
        let mut resolve = resolver_over(vec![]);
        let c = class("p/C").build();
        assert!(is_subclass(&c, OBJECT, &mut resolve));
        let object = class(OBJECT).no_super().build();
        assert!(!is_subclass(&object, OBJECT, &mut resolve));
    }

    #[test]
    fn cyclic_hierarchy_terminates() {
        let mut resolve = resolver_over(vec![
            class("p/A").extends("p/B").build(),
            class("p/B").extends("p/A").build(),
        ]);
        let a = class("p/A").extends("p/B").build();
        assert!(!is_subclass(&a, "p/Absent", &mut resolve));
        assert!(is_subclass(&a, "p/B", &mut resolve));
    }

    #[test]
    fn missing_parent_ends_branch() {
        let mut resolve = resolver_over(vec![class("p/B").extends("p/Gone").build()]);
        let b = class("p/B").extends("p/Gone").build();
        assert!(!is_subclass(&b, "p/A", &mut resolve));
    }

    proptest! {
        // Walks must terminate with a defined answer on any hierarchy shape,
        // including dense cycles.
        #[test]
        fn walks_terminate_on_arbitrary_cyclic_graphs(
            interface_edges in prop::collection::vec((0usize..8, 0usize..8), 0..24),
            target in 0usize..8,
        ) {
            let classes: Vec<ClassNode> = (0..8)
                .map(|i| {
                    let mut builder =
                        class(&format!("c{i}")).extends(&format!("c{}", (i + 1) % 8));
                    for (from, to) in &interface_edges {
                        if *from == i {
                            builder = builder.implements(&format!("c{to}"));
                        }
                    }
                    builder.build()
                })
                .collect();
            let start = classes[0].clone();
            let mut resolve = resolver_over(classes);
            let _ = is_subclass(&start, &format!("c{target}"), &mut resolve);
            let _ = ancestors(&start, &mut resolve);
        }
    }

    #[test]
    fn ancestors_in_bfs_order() {
        let mut resolve = resolver_over(vec![
            class("p/A").implements("p/I").build(),
            class("p/I").interface().build(),
            class("p/B").extends("p/A").build(),
        ]);
        let b = class("p/B").extends("p/A").build();
        let names: Vec<String> = ancestors(&b, &mut resolve)
            .into_iter()
            .map(|it| it.name.clone())
            .collect();
        assert_eq!(names, vec!["p/A", "p/I"]);
    }
}
