//! Collection, deduplication, filtering, and rollup of problems.

use std::collections::HashSet;

use itertools::Itertools;

use crate::{access::package_of, problems::Problem};

/// How many missing classes under one package prefix it takes to collapse
/// them into a single [`Problem::PackageNotFound`].
const PACKAGE_NOT_FOUND_THRESHOLD: usize = 5;

/// A user-supplied suppression pattern, matched against the binary name of
/// the class a problem is located in.
///
/// A pattern is either an exact binary name (`com/acme/Widget`) or a prefix
/// wildcard (`com/acme/*`).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProblemFilter {
    pattern: String,
}

impl ProblemFilter {
    /// Creates a filter from a pattern.
    pub fn new(pattern: impl Into<String>) -> Self {
        Self {
            pattern: pattern.into(),
        }
    }

    /// Whether the filter suppresses problems located in `class_name`.
    #[must_use]
    pub fn matches(&self, class_name: &str) -> bool {
        match self.pattern.strip_suffix('*') {
            Some(prefix) => class_name.starts_with(prefix),
            None => class_name == self.pattern,
        }
    }

    fn reason(&self) -> String {
        format!("suppressed by filter '{}'", self.pattern)
    }
}

/// A problem a filter suppressed, kept in the result for transparency.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IgnoredProblem {
    /// The suppressed problem.
    pub problem: Problem,
    /// Why it was suppressed.
    pub reason: String,
}

/// Buffers problems in insertion order, dropping structural duplicates and
/// applying the user's filters.
#[derive(Debug, Default)]
pub struct ProblemRegistrar {
    filters: Vec<ProblemFilter>,
    seen: HashSet<Problem>,
    problems: Vec<Problem>,
    ignored: Vec<IgnoredProblem>,
}

impl ProblemRegistrar {
    /// Creates a registrar applying the given filters.
    #[must_use]
    pub fn new(filters: Vec<ProblemFilter>) -> Self {
        Self {
            filters,
            ..Self::default()
        }
    }

    /// Registers a problem. Duplicates of an already-registered problem are
    /// dropped; filtered problems are moved to the ignored list.
    pub fn register(&mut self, problem: Problem) {
        if self.seen.contains(&problem) {
            return;
        }
        self.seen.insert(problem.clone());
        if let Some(filter) = self
            .filters
            .iter()
            .find(|f| f.matches(problem.enclosing_class()))
        {
            self.ignored.push(IgnoredProblem {
                reason: filter.reason(),
                problem,
            });
        } else {
            self.problems.push(problem);
        }
    }

    /// The number of distinct problems registered so far (ignored ones
    /// excluded).
    #[must_use]
    pub fn len(&self) -> usize {
        self.problems.len()
    }

    /// Whether no problem has been registered.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.problems.is_empty()
    }

    /// Finalizes the run: applies the [`Problem::PackageNotFound`] rollup and
    /// returns the problems in reporting order plus the ignored set.
    #[must_use]
    pub fn finish(self) -> (Vec<Problem>, Vec<IgnoredProblem>) {
        (rollup_missing_packages(self.problems), self.ignored)
    }
}

/// Collapses batches of [`Problem::ClassNotFound`] sharing a common package
/// prefix into single [`Problem::PackageNotFound`] problems.
///
/// Packages are clustered by their longest shared package prefix; a cluster
/// with at least [`PACKAGE_NOT_FOUND_THRESHOLD`] distinct missing classes is
/// collapsed. The rollup takes the position of its first child; everything
/// else keeps its order.
fn rollup_missing_packages(problems: Vec<Problem>) -> Vec<Problem> {
    let packages: Vec<&str> = problems
        .iter()
        .filter_map(|p| match p {
            Problem::ClassNotFound { class_name, .. } => Some(package_of(class_name)),
            _ => None,
        })
        .filter(|pkg| !pkg.is_empty())
        .sorted_unstable()
        .dedup()
        .collect();

    // Cluster sorted packages by shared leading segments; each cluster is
    // labelled with the shortest shared prefix.
    let mut clusters: Vec<String> = Vec::new();
    for package in packages {
        match clusters.last_mut() {
            Some(last) => {
                let shared = common_package_prefix(last, package);
                if shared.is_empty() {
                    clusters.push(package.to_owned());
                } else {
                    *last = shared;
                }
            }
            None => clusters.push(package.to_owned()),
        }
    }

    let cluster_of = |class_name: &str| -> Option<String> {
        let package = package_of(class_name);
        clusters
            .iter()
            .find(|prefix| {
                package == **prefix
                    || package
                        .strip_prefix(prefix.as_str())
                        .is_some_and(|rest| rest.starts_with('/'))
            })
            .cloned()
    };

    // Count distinct missing classes per cluster.
    let mut missing_per_cluster: Vec<(String, HashSet<String>)> = Vec::new();
    for problem in &problems {
        if let Problem::ClassNotFound { class_name, .. } = problem
            && let Some(cluster) = cluster_of(class_name)
        {
            match missing_per_cluster.iter_mut().find(|(c, _)| *c == cluster) {
                Some((_, names)) => {
                    names.insert(class_name.clone());
                }
                None => {
                    missing_per_cluster
                        .push((cluster, HashSet::from([class_name.clone()])));
                }
            }
        }
    }
    let collapsed: HashSet<String> = missing_per_cluster
        .into_iter()
        .filter(|(_, names)| names.len() >= PACKAGE_NOT_FOUND_THRESHOLD)
        .map(|(cluster, _)| cluster)
        .collect();

    if collapsed.is_empty() {
        return problems;
    }

    let mut result = Vec::with_capacity(problems.len());
    let mut rolled_up: Vec<(String, Vec<Problem>)> = Vec::new();
    for problem in problems {
        let cluster = match &problem {
            Problem::ClassNotFound { class_name, .. } => {
                cluster_of(class_name).filter(|c| collapsed.contains(c))
            }
            _ => None,
        };
        match cluster {
            Some(cluster) => {
                match rolled_up.iter_mut().find(|(c, _)| *c == cluster) {
                    Some((_, children)) => children.push(problem),
                    None => {
                        // Reserve the rollup's slot at the first child.
                        result.push(Problem::PackageNotFound {
                            package: cluster.clone(),
                            missing: Vec::new(),
                        });
                        rolled_up.push((cluster, vec![problem]));
                    }
                }
            }
            None => result.push(problem),
        }
    }
    for problem in &mut result {
        if let Problem::PackageNotFound { package, missing } = problem
            && let Some((_, children)) = rolled_up.iter_mut().find(|(c, _)| c == package)
        {
            *missing = std::mem::take(children);
        }
    }
    result
}

fn common_package_prefix(a: &str, b: &str) -> String {
    a.split('/')
        .zip(b.split('/'))
        .take_while(|(x, y)| x == y)
        .map(|(x, _)| x)
        .join("/")
}
