//! The verification job: inputs, driver, and result.

use std::collections::BTreeSet;
use std::sync::{
    Arc,
    atomic::{AtomicBool, Ordering},
};

use crate::{
    dependencies::{DependencyFinder, DependencyGraph, DependencySummary, PluginDependency},
    problems::Problem,
    registrar::{IgnoredProblem, ProblemFilter},
    resolvers::{CachingResolver, Resolver, UnionResolver},
    usages::ApiUsage,
};

mod class_checks;
pub mod context;
mod field_checks;
mod instruction_checks;
mod method_checks;

use context::VerificationContext;

/// The host platform a plugin is verified against.
#[derive(Debug)]
pub struct IdeDescriptor {
    /// The version string of the host.
    pub version: String,
    /// The host's classes.
    pub resolver: Box<dyn Resolver>,
    /// The JDK bundled with the host, when it ships one.
    pub bundled_jdk: Option<Box<dyn Resolver>>,
}

/// A JDK supplied separately from the host.
#[derive(Debug)]
pub struct JdkDescriptor {
    /// The version string of the JDK.
    pub version: String,
    /// The JDK's core classes.
    pub resolver: Box<dyn Resolver>,
}

/// The opened plugin under verification, as produced by the plugin-structure
/// collaborator.
#[derive(Debug)]
pub struct PluginDetails {
    /// The identifier of the plugin.
    pub plugin_id: String,
    /// The dependencies the plugin descriptor declares.
    pub declared_dependencies: Vec<PluginDependency>,
    /// The plugin's classes.
    pub resolver: Box<dyn Resolver>,
    /// The binary names of the classes to verify. Ordered, so verification
    /// order (and with it report order) is independent of how the set was
    /// produced.
    pub classes_to_check: BTreeSet<String>,
    /// Non-fatal findings of the descriptor parser.
    pub structure_warnings: Vec<String>,
}

/// The user-configurable knobs of a verification job.
#[derive(Debug, Default)]
pub struct VerifierParameters {
    /// Package prefixes of classes known to be absent on purpose; no
    /// [`Problem::ClassNotFound`] is reported for them.
    pub external_class_prefixes: Vec<String>,
    /// Extra resolvers appended after every other layer.
    pub external_classpath: Vec<Box<dyn Resolver>>,
    /// When set, resolved references to deprecated, experimental, and
    /// internal API produce [`ApiUsage`] records.
    pub find_deprecated_api_usages: bool,
    /// Patterns suppressing problems by enclosing class; suppressed problems
    /// are retained with their reason.
    pub problem_filters: Vec<ProblemFilter>,
}

/// A cooperative cancellation flag, checked between classes.
#[derive(Debug, Clone, Default)]
pub struct CancellationToken {
    cancelled: Arc<AtomicBool>,
}

impl CancellationToken {
    /// Creates a token in the not-cancelled state.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Requests cancellation of the jobs sharing this token.
    pub fn cancel(&self) {
        self.cancelled.store(true, Ordering::Relaxed);
    }

    /// Whether cancellation has been requested.
    #[must_use]
    pub fn is_cancelled(&self) -> bool {
        self.cancelled.load(Ordering::Relaxed)
    }
}

/// Everything a completed verification produced.
#[derive(Debug)]
pub struct VerifiedPlugin {
    /// The identifier of the verified plugin.
    pub plugin_id: String,
    /// The version of the host it was verified against.
    pub ide_version: String,
    /// The resolved dependency graph.
    pub dependencies: DependencySummary,
    /// Non-fatal findings of the descriptor parser.
    pub structure_warnings: Vec<String>,
    /// The compatibility problems, in reporting order.
    pub problems: Vec<Problem>,
    /// Resolved references to discouraged API.
    pub usages: Vec<ApiUsage>,
    /// Problems suppressed by the user's filters.
    pub ignored_problems: Vec<IgnoredProblem>,
}

/// The outcome of a verification job.
///
/// `InvalidPlugin`, `NotFound`, and `FailedToDownload` wrap failures of the
/// collaborators that locate and open plugins; the engine itself produces the
/// other variants.
#[derive(Debug)]
pub enum VerificationResult {
    /// No findings.
    Ok(VerifiedPlugin),
    /// Only descriptor warnings.
    StructureWarnings(VerifiedPlugin),
    /// At least one mandatory dependency is unresolved.
    MissingDependencies(VerifiedPlugin),
    /// At least one compatibility problem.
    CompatibilityProblems(VerifiedPlugin),
    /// The plugin's archive or descriptor is broken.
    InvalidPlugin {
        /// The identifier of the plugin, as far as it is known.
        plugin_id: String,
        /// The structure errors.
        errors: Vec<String>,
    },
    /// The plugin could not be located.
    NotFound {
        /// The identifier that was looked up.
        plugin_id: String,
        /// Why the lookup failed.
        reason: String,
    },
    /// The plugin exists but could not be fetched.
    FailedToDownload {
        /// The identifier that was fetched.
        plugin_id: String,
        /// Why the fetch failed.
        reason: String,
    },
    /// The job was cancelled; no partial problems are reported.
    Cancelled,
}

/// Verifies `plugin` against `ide`, reporting every bytecode reference that
/// would break on the target.
///
/// The classpath is layered in this order: plugin classes, JDK classes, host
/// classes, resolved dependencies, external classpath. The order is a
/// correctness requirement; earlier layers win.
///
/// The job owns every resolver passed in and releases all of them on every
/// exit path, including cancellation.
#[must_use]
pub fn verify_plugin(
    ide: IdeDescriptor,
    jdk: Option<JdkDescriptor>,
    plugin: PluginDetails,
    dependency_finder: &dyn DependencyFinder,
    params: VerifierParameters,
    cancellation: &CancellationToken,
) -> VerificationResult {
    let span = tracing::info_span!(
        "verify",
        plugin = %plugin.plugin_id,
        ide = %ide.version,
    );
    let _entered = span.enter();

    let graph = DependencyGraph::build(
        &plugin.plugin_id,
        &plugin.declared_dependencies,
        dependency_finder,
    );
    let dependencies = graph.summary();
    let has_missing_dependencies = graph.has_missing_dependencies();

    let mut layers: Vec<Box<dyn Resolver>> = Vec::new();
    layers.push(plugin.resolver);
    match (ide.bundled_jdk, jdk) {
        (Some(bundled), _) => layers.push(bundled),
        (None, Some(jdk)) => layers.push(jdk.resolver),
        (None, None) => {}
    }
    layers.push(ide.resolver);
    layers.push(Box::new(graph.into_resolver()));
    let VerifierParameters {
        external_class_prefixes,
        external_classpath,
        find_deprecated_api_usages,
        problem_filters,
    } = params;
    layers.extend(external_classpath);
    let layered = CachingResolver::new(UnionResolver::new(layers));

    let params = VerifierParameters {
        external_class_prefixes,
        external_classpath: Vec::new(),
        find_deprecated_api_usages,
        problem_filters,
    };
    let mut ctx = VerificationContext::new(&layered, &params);

    tracing::debug!(classes = plugin.classes_to_check.len(), "verifying classes");
    for class_name in &plugin.classes_to_check {
        if cancellation.is_cancelled() {
            tracing::debug!("verification cancelled");
            return VerificationResult::Cancelled;
        }
        verify_class(&mut ctx, class_name);
    }

    let (problems, ignored_problems, usages) = ctx.finish();
    let verified = VerifiedPlugin {
        plugin_id: plugin.plugin_id,
        ide_version: ide.version,
        dependencies,
        structure_warnings: plugin.structure_warnings,
        problems,
        usages,
        ignored_problems,
    };
    if has_missing_dependencies {
        VerificationResult::MissingDependencies(verified)
    } else if !verified.problems.is_empty() {
        VerificationResult::CompatibilityProblems(verified)
    } else if !verified.structure_warnings.is_empty() {
        VerificationResult::StructureWarnings(verified)
    } else {
        VerificationResult::Ok(verified)
    }
}

/// Runs every verifier over one class: class-level checks, then fields, then
/// methods with their instructions in declaration order.
fn verify_class(ctx: &mut VerificationContext<'_>, class_name: &str) {
    let Some(class) = ctx.resolve_plugin_class(class_name) else {
        return;
    };
    class_checks::verify(ctx, &class);
    for field in &class.fields {
        field_checks::verify(ctx, &class, field);
    }
    for method in &class.methods {
        method_checks::verify(ctx, &class, method);
        for (index, instruction) in method.instructions.iter().enumerate() {
            instruction_checks::verify(ctx, &class, method, index, instruction);
        }
    }
}
