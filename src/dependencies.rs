//! Resolution of a plugin's declared dependencies into a resolver layer.
//!
//! The graph is built by BFS from the verified plugin. Vertices are resolved
//! plugins, edges are declared dependencies. Vertices live in the graph's
//! arena and are addressed by index, so cycles (which are legal between
//! plugins) need no back-references.

use itertools::Itertools;
use petgraph::{
    algo::tarjan_scc,
    graph::{DiGraph, NodeIndex},
};

use crate::resolvers::{Resolver, UnionResolver};

/// One declared dependency of a plugin.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct PluginDependency {
    /// The identifier of the depended-on plugin.
    pub id: String,
    /// Whether the dependency is optional.
    pub optional: bool,
}

/// The collaborator that locates a plugin by identifier.
///
/// Downloading and descriptor parsing are out of scope for this crate; the
/// finder hands back an already-opened handle.
pub trait DependencyFinder: std::fmt::Debug {
    /// Locates the plugin with the given identifier.
    fn find(&self, plugin_id: &str) -> DependencyFindResult;
}

/// The outcome of a [`DependencyFinder`] lookup.
#[derive(Debug)]
pub enum DependencyFindResult {
    /// The plugin was located and opened.
    Found(DependencyDetails),
    /// No such plugin exists.
    NotFound(String),
    /// The plugin exists but could not be opened.
    Failed(String),
}

/// An opened dependency plugin.
#[derive(Debug)]
pub struct DependencyDetails {
    /// The identifier of the plugin.
    pub plugin_id: String,
    /// The dependencies the plugin declares in turn.
    pub declared_dependencies: Vec<PluginDependency>,
    /// The plugin's classes.
    pub resolver: Box<dyn Resolver>,
}

/// A mandatory dependency that could not be resolved.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MissingDependency {
    /// The unresolved declaration.
    pub dependency: PluginDependency,
    /// Why resolution failed.
    pub reason: String,
}

/// A value-only snapshot of a resolved dependency graph, safe to keep in a
/// verification result after the resolvers are gone.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct DependencySummary {
    /// The identifiers of all vertices, the verified plugin first.
    pub vertices: Vec<String>,
    /// The edges as `(from, to, optional)` triples.
    pub edges: Vec<(String, String, bool)>,
    /// The mandatory dependencies that could not be resolved.
    pub missing: Vec<MissingDependency>,
    /// Non-fatal findings: unresolved optional dependencies and dependency
    /// cycles.
    pub warnings: Vec<String>,
}

struct DependencyVertex {
    plugin_id: String,
    // None for the root: the verified plugin's resolver is layered separately.
    resolver: Option<Box<dyn Resolver>>,
}

impl std::fmt::Debug for DependencyVertex {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DependencyVertex")
            .field("plugin_id", &self.plugin_id)
            .finish_non_exhaustive()
    }
}

/// The transitive dependency closure of one plugin.
#[derive(Debug)]
pub struct DependencyGraph {
    graph: DiGraph<DependencyVertex, bool>,
    missing: Vec<MissingDependency>,
    warnings: Vec<String>,
}

impl DependencyGraph {
    /// Resolves the transitive closure of `declared` starting from the plugin
    /// `root_id`, using `finder` for every lookup.
    ///
    /// Unresolved optional dependencies become warnings; unresolved mandatory
    /// ones become [`MissingDependency`] entries. Cycles are permitted and
    /// produce one warning per strongly connected component.
    #[must_use]
    pub fn build(
        root_id: &str,
        declared: &[PluginDependency],
        finder: &dyn DependencyFinder,
    ) -> Self {
        let mut graph: DiGraph<DependencyVertex, bool> = DiGraph::new();
        let root = graph.add_node(DependencyVertex {
            plugin_id: root_id.to_owned(),
            resolver: None,
        });
        let mut vertex_of = std::collections::HashMap::new();
        vertex_of.insert(root_id.to_owned(), root);

        let mut missing = Vec::new();
        let mut warnings = Vec::new();
        let mut queue: std::collections::VecDeque<(NodeIndex, Vec<PluginDependency>)> =
            std::collections::VecDeque::new();
        queue.push_back((root, declared.to_vec()));

        while let Some((from, dependencies)) = queue.pop_front() {
            for dependency in dependencies {
                if let Some(&to) = vertex_of.get(&dependency.id) {
                    if !graph.contains_edge(from, to) {
                        graph.add_edge(from, to, dependency.optional);
                    }
                    continue;
                }
                match finder.find(&dependency.id) {
                    DependencyFindResult::Found(details) => {
                        tracing::debug!(dependency = %dependency.id, "resolved dependency");
                        let to = graph.add_node(DependencyVertex {
                            plugin_id: details.plugin_id,
                            resolver: Some(details.resolver),
                        });
                        vertex_of.insert(dependency.id.clone(), to);
                        graph.add_edge(from, to, dependency.optional);
                        queue.push_back((to, details.declared_dependencies));
                    }
                    DependencyFindResult::NotFound(reason)
                    | DependencyFindResult::Failed(reason) => {
                        if dependency.optional {
                            tracing::debug!(
                                dependency = %dependency.id,
                                %reason,
                                "optional dependency not resolved"
                            );
                            warnings.push(format!(
                                "optional dependency {} is not resolved: {reason}",
                                dependency.id
                            ));
                        } else {
                            tracing::debug!(
                                dependency = %dependency.id,
                                %reason,
                                "mandatory dependency not resolved"
                            );
                            missing.push(MissingDependency { dependency, reason });
                        }
                    }
                }
            }
        }

        for component in tarjan_scc(&graph) {
            if component.len() > 1 {
                let ids = component
                    .iter()
                    .map(|&idx| graph[idx].plugin_id.as_str())
                    .sorted_unstable()
                    .join(", ");
                warnings.push(format!("plugins [{ids}] form a dependency cycle"));
            }
        }

        Self {
            graph,
            missing,
            warnings,
        }
    }

    /// Snapshots the graph into plain values.
    #[must_use]
    pub fn summary(&self) -> DependencySummary {
        DependencySummary {
            vertices: self
                .graph
                .node_indices()
                .map(|idx| self.graph[idx].plugin_id.clone())
                .collect(),
            edges: self
                .graph
                .edge_indices()
                .filter_map(|edge| {
                    let (from, to) = self.graph.edge_endpoints(edge)?;
                    Some((
                        self.graph[from].plugin_id.clone(),
                        self.graph[to].plugin_id.clone(),
                        self.graph[edge],
                    ))
                })
                .collect(),
            missing: self.missing.clone(),
            warnings: self.warnings.clone(),
        }
    }

    /// Whether any mandatory dependency is unresolved.
    #[must_use]
    pub fn has_missing_dependencies(&self) -> bool {
        !self.missing.is_empty()
    }

    /// Consumes the graph into a resolver over every resolved vertex's class
    /// pool, in resolution order. The returned resolver owns the pools and
    /// releases them when dropped, at job completion.
    #[must_use]
    pub fn into_resolver(self) -> UnionResolver {
        let mut union = UnionResolver::default();
        let mut graph = self.graph;
        for idx in graph.node_indices().collect::<Vec<_>>() {
            if let Some(resolver) = graph[idx].resolver.take() {
                union.push(resolver);
            }
        }
        union
    }
}
