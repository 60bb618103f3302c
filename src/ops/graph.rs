//! The finished operation graph: issue collector + populated registry.

use crate::issues::Issues;
use crate::ops::builder;
use crate::ops::registry::Operations;
use crate::structure::StructureGraph;
use std::path::Path;

/// Graph of dependent operations to execute to produce the dataset.
///
/// Created once per build; the registry is never mutated afterwards
/// (the execution runtime only reads it). `check_graph` appends to the
/// issue collector only.
#[derive(Debug, Clone)]
pub struct OperationGraph {
    issues: Issues,
    operations: Operations,
}

impl OperationGraph {
    /// Compile a structure graph into an operation graph.
    ///
    /// `folder` is the root under which the download/extract caches and
    /// local files are resolved. Invalid metadata lands in `issues`;
    /// only corrupt internal state is an `Err`.
    pub fn from_structure(
        graph: &StructureGraph,
        folder: &Path,
        mut issues: Issues,
    ) -> anyhow::Result<Self> {
        let operations = builder::build_operations(graph, folder, &mut issues)?;
        Ok(Self { issues, operations })
    }

    /// Structural soundness checks, reported through the issue
    /// collector. Both checks always run; neither suppresses the other.
    pub fn check_graph(&mut self) {
        if !self.operations.is_directed() {
            self.issues.add_error("Operation graph is not directed.");
        }
        let self_loops: Vec<String> = self
            .operations
            .edges()
            .filter(|(from, to)| from == to)
            .map(|(from, _)| self.operations.get(from).to_string())
            .collect();
        if !self_loops.is_empty() {
            self.issues.add_error(format!(
                "The following operations refer to themselves: {}",
                self_loops.join(", ")
            ));
        }
    }

    pub fn operations(&self) -> &Operations {
        &self.operations
    }

    pub fn issues(&self) -> &Issues {
        &self.issues
    }
}
