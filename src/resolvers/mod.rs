//! Class sources and their composition.
//!
//! A [`Resolver`] looks classes up by binary name. Verification composes
//! several of them into one layered lookup: plugin classes first, then the
//! JDK, then the host, then resolved dependencies, then any extra classpath
//! supplied by the user. Resolvers own the class nodes they hand out; dropping
//! a resolver releases its backing storage, so a verification job releases
//! everything it acquired on every exit path.

use std::{path::PathBuf, sync::Arc};

use crate::classes::ClassNode;

pub mod combinators;
pub mod pools;

pub use combinators::{CachingResolver, UnionResolver};
pub use pools::DirectoryClassPool;
#[cfg(feature = "jar")]
pub use pools::JarClassPool;

/// The outcome of looking a class up in a [`Resolver`].
///
/// Read failures are reportable outcomes rather than errors: the verifier
/// turns them into problems attached to the first reference site and carries
/// on with the next reference.
#[derive(Debug, Clone)]
pub enum Resolution {
    /// The class was found and read successfully.
    Found(Arc<ClassNode>),
    /// No layer knows the class.
    NotFound,
    /// The class entry exists but reading it failed with an I/O error.
    FailedToRead(String),
    /// The class entry exists but its bytes are not a valid class file.
    Invalid(String),
}

impl Resolution {
    /// Whether the lookup produced a class node.
    #[must_use]
    pub fn is_found(&self) -> bool {
        matches!(self, Resolution::Found(_))
    }
}

/// A source of classes, looked up by binary name.
pub trait Resolver: std::fmt::Debug {
    /// Whether the resolver knows a class by this name, without reading it.
    fn contains(&self, binary_name: &str) -> bool;

    /// Looks the class up and reads it.
    fn resolve(&self, binary_name: &str) -> Resolution;

    /// The binary names of every class this resolver can produce, in the
    /// resolver's canonical order.
    fn class_names(&self) -> Vec<String>;

    /// The files and directories backing this resolver.
    fn class_path(&self) -> Vec<PathBuf> {
        Vec::new()
    }
}

impl<T: Resolver + ?Sized> Resolver for Box<T> {
    fn contains(&self, binary_name: &str) -> bool {
        (**self).contains(binary_name)
    }

    fn resolve(&self, binary_name: &str) -> Resolution {
        (**self).resolve(binary_name)
    }

    fn class_names(&self) -> Vec<String> {
        (**self).class_names()
    }

    fn class_path(&self) -> Vec<PathBuf> {
        (**self).class_path()
    }
}

/// An in-memory resolver over pre-built class nodes.
///
/// This is the natural adapter for collaborators that already hold parsed
/// classes (plugin handles, test fixtures).
#[derive(Debug, Default)]
pub struct FixedResolver {
    classes: Vec<(String, Arc<ClassNode>)>,
}

impl FixedResolver {
    /// Creates an empty resolver.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a class, keyed by its own name. A class added twice replaces the
    /// earlier copy.
    pub fn add(&mut self, class: ClassNode) {
        let name = class.name.clone();
        self.classes.retain(|(existing, _)| *existing != name);
        self.classes.push((name, Arc::new(class)));
    }

    /// Builds a resolver from an iterator of classes.
    pub fn from_classes(classes: impl IntoIterator<Item = ClassNode>) -> Self {
        let mut resolver = Self::new();
        for class in classes {
            resolver.add(class);
        }
        resolver
    }
}

impl Resolver for FixedResolver {
    fn contains(&self, binary_name: &str) -> bool {
        self.classes.iter().any(|(name, _)| name == binary_name)
    }

    fn resolve(&self, binary_name: &str) -> Resolution {
        self.classes
            .iter()
            .find(|(name, _)| name == binary_name)
            .map_or(Resolution::NotFound, |(_, class)| {
                Resolution::Found(Arc::clone(class))
            })
    }

    fn class_names(&self) -> Vec<String> {
        self.classes.iter().map(|(name, _)| name.clone()).collect()
    }
}

#[cfg(test)]
mod tests {
    use crate::tests::class;

    use super::*;

    #[test]
    fn fixed_resolver_finds_added_classes() {
        let resolver = FixedResolver::from_classes([class("p/A").build()]);
        assert!(resolver.contains("p/A"));
        assert!(resolver.resolve("p/A").is_found());
        assert!(!resolver.contains("p/B"));
        assert!(matches!(resolver.resolve("p/B"), Resolution::NotFound));
    }

    #[test]
    fn later_copy_shadows_earlier() {
        let mut resolver = FixedResolver::new();
        resolver.add(class("p/A").build());
        resolver.add(class("p/A").deprecated().build());
        let Resolution::Found(found) = resolver.resolve("p/A") else {
            panic!("expected Found");
        };
        assert!(found.is_deprecated);
    }
}
