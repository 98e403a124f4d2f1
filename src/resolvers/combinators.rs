//! Resolvers composed from other resolvers.

use std::{cell::RefCell, collections::HashMap, path::PathBuf};

use itertools::Itertools;

use super::{Resolution, Resolver};

/// An ordered union of resolvers.
///
/// Lookups return the first [`Resolution::Found`] in child order. A child
/// answering [`Resolution::FailedToRead`] or [`Resolution::Invalid`]
/// short-circuits the search: a broken class entry must surface as a problem,
/// not be silently shadowed by a later layer.
#[derive(Debug, Default)]
pub struct UnionResolver {
    children: Vec<Box<dyn Resolver>>,
}

impl UnionResolver {
    /// Creates a union over the given children, earlier children first.
    #[must_use]
    pub fn new(children: Vec<Box<dyn Resolver>>) -> Self {
        Self { children }
    }

    /// Appends a child after the existing ones.
    pub fn push(&mut self, child: Box<dyn Resolver>) {
        self.children.push(child);
    }
}

impl Resolver for UnionResolver {
    fn contains(&self, binary_name: &str) -> bool {
        self.children.iter().any(|child| child.contains(binary_name))
    }

    fn resolve(&self, binary_name: &str) -> Resolution {
        for child in &self.children {
            match child.resolve(binary_name) {
                Resolution::NotFound => continue,
                outcome => return outcome,
            }
        }
        Resolution::NotFound
    }

    fn class_names(&self) -> Vec<String> {
        self.children
            .iter()
            .flat_map(|child| child.class_names())
            .unique()
            .collect()
    }

    fn class_path(&self) -> Vec<PathBuf> {
        self.children
            .iter()
            .flat_map(|child| child.class_path())
            .collect()
    }
}

/// A resolver that memoizes the resolutions of one child.
///
/// Memoization covers all four outcomes, so a class entry that fails to read
/// fails identically on every repeated query. Verification is single-threaded
/// within a job, hence the plain [`RefCell`].
#[derive(Debug)]
pub struct CachingResolver<R> {
    inner: R,
    cache: RefCell<HashMap<String, Resolution>>,
}

impl<R: Resolver> CachingResolver<R> {
    /// Wraps a resolver with a memoizing cache.
    #[must_use]
    pub fn new(inner: R) -> Self {
        Self {
            inner,
            cache: RefCell::new(HashMap::new()),
        }
    }
}

impl<R: Resolver> Resolver for CachingResolver<R> {
    fn contains(&self, binary_name: &str) -> bool {
        if let Some(memoized) = self.cache.borrow().get(binary_name) {
            return memoized.is_found();
        }
        self.inner.contains(binary_name)
    }

    fn resolve(&self, binary_name: &str) -> Resolution {
        if let Some(memoized) = self.cache.borrow().get(binary_name) {
            return memoized.clone();
        }
        let outcome = self.inner.resolve(binary_name);
        self.cache
            .borrow_mut()
            .insert(binary_name.to_owned(), outcome.clone());
        outcome
    }

    fn class_names(&self) -> Vec<String> {
        self.inner.class_names()
    }

    fn class_path(&self) -> Vec<PathBuf> {
        self.inner.class_path()
    }
}

#[cfg(test)]
mod tests {
    use std::sync::{
        Arc,
        atomic::{AtomicUsize, Ordering},
    };

    use crate::{classes::ClassNode, resolvers::FixedResolver, tests::class};

    use super::*;

    #[derive(Debug)]
    struct CountingResolver {
        class: ClassNode,
        lookups: Arc<AtomicUsize>,
    }

    impl Resolver for CountingResolver {
        fn contains(&self, binary_name: &str) -> bool {
            binary_name == self.class.name
        }

        fn resolve(&self, binary_name: &str) -> Resolution {
            self.lookups.fetch_add(1, Ordering::Relaxed);
            if binary_name == self.class.name {
                Resolution::Found(Arc::new(self.class.clone()))
            } else {
                Resolution::NotFound
            }
        }

        fn class_names(&self) -> Vec<String> {
            vec![self.class.name.clone()]
        }
    }

    #[derive(Debug)]
    struct BrokenResolver;

    impl Resolver for BrokenResolver {
        fn contains(&self, _: &str) -> bool {
            true
        }

        fn resolve(&self, _: &str) -> Resolution {
            Resolution::FailedToRead("disk on fire".into())
        }

        fn class_names(&self) -> Vec<String> {
            Vec::new()
        }
    }

    #[test]
    fn union_returns_first_found() {
        let first = FixedResolver::from_classes([class("p/A").deprecated().build()]);
        let second = FixedResolver::from_classes([class("p/A").build(), class("p/B").build()]);
        let union = UnionResolver::new(vec![Box::new(first), Box::new(second)]);
        let Resolution::Found(found) = union.resolve("p/A") else {
            panic!("expected Found");
        };
        assert!(found.is_deprecated, "the first layer must win");
        assert!(union.resolve("p/B").is_found());
    }

    #[test]
    fn union_short_circuits_on_read_failure() {
        let healthy = FixedResolver::from_classes([class("p/A").build()]);
        let union = UnionResolver::new(vec![Box::new(BrokenResolver), Box::new(healthy)]);
        assert!(matches!(
            union.resolve("p/A"),
            Resolution::FailedToRead(reason) if reason == "disk on fire"
        ));
    }

    #[test]
    fn union_iteration_dedups_first_wins() {
        let first = FixedResolver::from_classes([class("p/A").build()]);
        let second = FixedResolver::from_classes([class("p/A").build(), class("p/B").build()]);
        let union = UnionResolver::new(vec![Box::new(first), Box::new(second)]);
        assert_eq!(union.class_names(), vec!["p/A", "p/B"]);
    }

    #[test]
    fn cache_resolves_each_name_once() {
        let lookups = Arc::new(AtomicUsize::new(0));
        let counting = CountingResolver {
            class: class("p/A").build(),
            lookups: Arc::clone(&lookups),
        };
        let cached = CachingResolver::new(counting);
        assert!(cached.resolve("p/A").is_found());
        assert!(cached.resolve("p/A").is_found());
        assert!(matches!(cached.resolve("p/B"), Resolution::NotFound));
        assert!(matches!(cached.resolve("p/B"), Resolution::NotFound));
        assert_eq!(lookups.load(Ordering::Relaxed), 2);
    }
}
