//! Per-job verification state.

use std::collections::HashSet;
use std::sync::Arc;

use crate::{
    access::{AccessLevel, ClassAccessFlags, same_package},
    classes::ClassNode,
    hierarchy,
    locations::{ClassLocation, Location},
    problems::Problem,
    registrar::{IgnoredProblem, ProblemRegistrar},
    resolution::{ResolvedField, ResolvedMethod},
    resolvers::{Resolution, Resolver},
    usages::{ApiElement, ApiUsage},
};

use super::VerifierParameters;

/// The mutable state of one verification job: the layered resolver, the
/// problem registrar, and the usage collector. Jobs are single-threaded;
/// nothing here is synchronized.
#[derive(Debug)]
pub struct VerificationContext<'a> {
    resolver: &'a dyn Resolver,
    params: &'a VerifierParameters,
    registrar: ProblemRegistrar,
    usages: Vec<ApiUsage>,
    usage_seen: HashSet<ApiUsage>,
    // Read failures surface once per class name per run, regardless of how
    // many references touch the broken entry.
    reported_read_failures: HashSet<String>,
}

impl<'a> VerificationContext<'a> {
    /// Creates the state for one job over the layered `resolver`.
    #[must_use]
    pub fn new(resolver: &'a dyn Resolver, params: &'a VerifierParameters) -> Self {
        Self {
            resolver,
            params,
            registrar: ProblemRegistrar::new(params.problem_filters.clone()),
            usages: Vec::new(),
            usage_seen: HashSet::new(),
            reported_read_failures: HashSet::new(),
        }
    }

    /// Registers a problem with the job's registrar.
    pub fn register(&mut self, problem: Problem) {
        self.registrar.register(problem);
    }

    /// The number of problems registered so far.
    #[must_use]
    pub fn problem_count(&self) -> usize {
        self.registrar.len()
    }

    /// Whether the user marked the class's package as external: absence of
    /// such classes is silently tolerated.
    #[must_use]
    pub fn is_external(&self, binary_name: &str) -> bool {
        self.params
            .external_class_prefixes
            .iter()
            .any(|prefix| binary_name.starts_with(prefix.as_str()))
    }

    /// Resolves a class for a hierarchy walk or a prerequisite lookup.
    /// Misses and read failures are registered as problems at `usage`;
    /// external classes are skipped silently.
    pub fn resolve_for_walk(
        &mut self,
        binary_name: &str,
        usage: &Location,
    ) -> Option<Arc<ClassNode>> {
        if self.is_external(binary_name) {
            return None;
        }
        match self.resolver.resolve(binary_name) {
            Resolution::Found(class) => Some(class),
            Resolution::NotFound => {
                self.register(Problem::ClassNotFound {
                    class_name: binary_name.to_owned(),
                    usage: usage.clone(),
                });
                None
            }
            Resolution::FailedToRead(reason) => {
                if self.reported_read_failures.insert(binary_name.to_owned()) {
                    self.register(Problem::FailedToReadClassFile {
                        class_name: binary_name.to_owned(),
                        reason,
                        usage: usage.clone(),
                    });
                }
                None
            }
            Resolution::Invalid(reason) => {
                if self.reported_read_failures.insert(binary_name.to_owned()) {
                    self.register(Problem::InvalidClassFile {
                        class_name: binary_name.to_owned(),
                        reason,
                        usage: usage.clone(),
                    });
                }
                None
            }
        }
    }

    /// Resolves a class named by a bytecode reference from `from`. On top of
    /// [`Self::resolve_for_walk`] this checks class-level accessibility and
    /// records discouraged-API usages.
    pub fn resolve_class_ref(
        &mut self,
        binary_name: &str,
        from: &ClassNode,
        usage: &Location,
    ) -> Option<Arc<ClassNode>> {
        let class = self.resolve_for_walk(binary_name, usage)?;
        if !class.access.contains(ClassAccessFlags::PUBLIC)
            && !same_package(&class.name, &from.name)
        {
            self.register(Problem::IllegalClassAccess {
                class_name: class.name.clone(),
                level: AccessLevel::from(class.access),
                usage: usage.clone(),
            });
        }
        self.record_class_usage(&class, usage);
        Some(class)
    }

    /// Resolves one of the plugin's own classes selected for checking.
    pub(crate) fn resolve_plugin_class(&mut self, binary_name: &str) -> Option<Arc<ClassNode>> {
        let usage = Location::Class(ClassLocation {
            class_name: binary_name.to_owned(),
        });
        self.resolve_for_walk(binary_name, &usage)
    }

    /// All supertypes of `start` in BFS order. Unresolvable parents are
    /// reported at `usage` and skipped.
    pub fn walk_ancestors(
        &mut self,
        start: &ClassNode,
        usage: &Location,
    ) -> Vec<Arc<ClassNode>> {
        hierarchy::ancestors(start, &mut |name| self.resolve_for_walk(name, usage))
    }

    /// Whether `child` is `parent_name` or inherits from it.
    pub fn is_subtype_or_self(
        &mut self,
        child: &ClassNode,
        parent_name: &str,
        usage: &Location,
    ) -> bool {
        hierarchy::is_subclass_or_self(child, parent_name, &mut |name| {
            self.resolve_for_walk(name, usage)
        })
    }

    /// Whether `child` strictly inherits from `parent_name`.
    pub fn is_strict_subtype(
        &mut self,
        child: &ClassNode,
        parent_name: &str,
        usage: &Location,
    ) -> bool {
        hierarchy::is_subclass(child, parent_name, &mut |name| {
            self.resolve_for_walk(name, usage)
        })
    }

    /// Applies the accessibility rule to a resolved method; a violation is
    /// registered as [`Problem::IllegalMethodAccess`].
    pub(crate) fn check_method_access(
        &mut self,
        resolved: &ResolvedMethod,
        symbolic_owner: &ClassNode,
        from: &ClassNode,
        usage: &Location,
    ) {
        let level = AccessLevel::from(resolved.method().access);
        let is_static = resolved.method().is_static();
        if !self.is_member_accessible(
            level,
            &resolved.class,
            symbolic_owner,
            from,
            is_static,
            usage,
        ) {
            self.register(Problem::IllegalMethodAccess {
                method: resolved.method().as_ref(&resolved.class),
                level,
                usage: usage.clone(),
            });
        }
    }

    /// Applies the accessibility rule to a resolved field; a violation is
    /// registered as [`Problem::IllegalFieldAccess`].
    pub(crate) fn check_field_access(
        &mut self,
        resolved: &ResolvedField,
        symbolic_owner: &ClassNode,
        from: &ClassNode,
        usage: &Location,
    ) {
        let level = AccessLevel::from(resolved.field().access);
        let is_static = resolved.field().is_static();
        if !self.is_member_accessible(
            level,
            &resolved.class,
            symbolic_owner,
            from,
            is_static,
            usage,
        ) {
            self.register(Problem::IllegalFieldAccess {
                field: resolved.field().as_ref(&resolved.class),
                level,
                usage: usage.clone(),
            });
        }
    }

    /// The member-accessibility rule: `R accessible from D`, where `R` is a
    /// member declared in `declaring` and `D` is `from`.
    fn is_member_accessible(
        &mut self,
        level: AccessLevel,
        declaring: &Arc<ClassNode>,
        symbolic_owner: &ClassNode,
        from: &ClassNode,
        is_static: bool,
        usage: &Location,
    ) -> bool {
        match level {
            AccessLevel::Public => true,
            AccessLevel::PackagePrivate => same_package(&declaring.name, &from.name),
            AccessLevel::Private => declaring.name == from.name,
            AccessLevel::Protected => {
                if same_package(&declaring.name, &from.name) {
                    return true;
                }
                if !self.is_subtype_or_self(from, &declaring.name, usage) {
                    return false;
                }
                // For instance members the symbolic owner must additionally
                // relate to the accessing class.
                is_static
                    || self.is_subtype_or_self(symbolic_owner, &from.name, usage)
                    || self.is_subtype_or_self(from, &symbolic_owner.name, usage)
            }
        }
    }

    /// Records discouraged-API usages for a resolved class reference.
    pub(crate) fn record_class_usage(&mut self, class: &ClassNode, usage: &Location) {
        if !self.params.find_deprecated_api_usages {
            return;
        }
        let element = ApiElement::Class(class.name.clone());
        self.record_markers(
            &element,
            class.is_deprecated,
            class.is_experimental,
            class.is_internal_api,
            usage,
        );
    }

    /// Records discouraged-API usages for a resolved method reference.
    pub(crate) fn record_method_usage(&mut self, resolved: &ResolvedMethod, usage: &Location) {
        if !self.params.find_deprecated_api_usages {
            return;
        }
        let element = ApiElement::Method(resolved.method().as_ref(&resolved.class));
        self.record_markers(
            &element,
            resolved.method().is_deprecated || resolved.class.is_deprecated,
            resolved.class.is_experimental,
            resolved.class.is_internal_api,
            usage,
        );
    }

    /// Records discouraged-API usages for a resolved field reference.
    pub(crate) fn record_field_usage(&mut self, resolved: &ResolvedField, usage: &Location) {
        if !self.params.find_deprecated_api_usages {
            return;
        }
        let element = ApiElement::Field(resolved.field().as_ref(&resolved.class));
        self.record_markers(
            &element,
            resolved.field().is_deprecated || resolved.class.is_deprecated,
            resolved.class.is_experimental,
            resolved.class.is_internal_api,
            usage,
        );
    }

    fn record_markers(
        &mut self,
        element: &ApiElement,
        deprecated: bool,
        experimental: bool,
        internal: bool,
        usage: &Location,
    ) {
        if deprecated {
            self.push_usage(ApiUsage::Deprecated {
                element: element.clone(),
                usage: usage.clone(),
            });
        }
        if experimental {
            self.push_usage(ApiUsage::Experimental {
                element: element.clone(),
                usage: usage.clone(),
            });
        }
        if internal {
            self.push_usage(ApiUsage::Internal {
                element: element.clone(),
                usage: usage.clone(),
            });
        }
    }

    fn push_usage(&mut self, usage: ApiUsage) {
        if self.usage_seen.insert(usage.clone()) {
            self.usages.push(usage);
        }
    }

    /// Finalizes the job: problems in reporting order (with the package
    /// rollup applied), suppressed problems, and collected usages.
    #[must_use]
    pub fn finish(self) -> (Vec<Problem>, Vec<IgnoredProblem>, Vec<ApiUsage>) {
        let (problems, ignored) = self.registrar.finish();
        (problems, ignored, self.usages)
    }
}
