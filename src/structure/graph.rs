//! Validated structure graph: typed nodes plus the directed reference
//! edges driving the builder's traversal.
//!
//! Two relations live here and serve different purposes:
//! - the directed graph (containment, source-reference, and hierarchy
//!   edges) gives the topological order and the predecessor propagation;
//! - the per-node ancestor chain (`Node::parents`) gives the upward walk
//!   that resolves a field's owning record set.

use crate::structure::node::{Metadata, Node, NodeId};
use anyhow::bail;
use std::collections::{BTreeMap, BTreeSet};

#[derive(Debug, Clone)]
pub struct StructureGraph {
    root: NodeId,
    nodes: BTreeMap<NodeId, Node>,
    /// Successors in declared order.
    children: BTreeMap<NodeId, Vec<NodeId>>,
    /// Predecessors in edge-insertion order.
    parents: BTreeMap<NodeId, Vec<NodeId>>,
}

impl StructureGraph {
    pub fn new(metadata: Metadata) -> Self {
        let root = metadata.id.clone();
        let mut nodes = BTreeMap::new();
        nodes.insert(root.clone(), Node::Metadata(metadata));
        Self {
            root,
            nodes,
            children: BTreeMap::new(),
            parents: BTreeMap::new(),
        }
    }

    pub fn root(&self) -> &NodeId {
        &self.root
    }

    pub fn insert(&mut self, node: Node) {
        self.nodes.insert(node.id().clone(), node);
    }

    /// Add a directed edge `from -> to`. Duplicate edges are dropped so
    /// declared order is kept without multi-edges.
    pub fn add_edge(&mut self, from: &NodeId, to: &NodeId) {
        let kids = self.children.entry(from.clone()).or_default();
        if !kids.contains(to) {
            kids.push(to.clone());
        }
        let parents = self.parents.entry(to.clone()).or_default();
        if !parents.contains(from) {
            parents.push(from.clone());
        }
    }

    pub fn node(&self, id: &NodeId) -> Option<&Node> {
        self.nodes.get(id)
    }

    pub fn nodes(&self) -> impl Iterator<Item = &Node> {
        self.nodes.values()
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn successors(&self, id: &NodeId) -> &[NodeId] {
        self.children.get(id).map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn predecessors(&self, id: &NodeId) -> &[NodeId] {
        self.parents.get(id).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Deterministic topological order (Kahn's algorithm; ties broken by
    /// node id). A cycle is an error naming one node on it.
    pub fn topological_order(&self) -> anyhow::Result<Vec<NodeId>> {
        let mut indegree: BTreeMap<NodeId, usize> = self
            .nodes
            .keys()
            .map(|id| (id.clone(), self.predecessors(id).len()))
            .collect();

        let mut ready: BTreeSet<NodeId> = indegree
            .iter()
            .filter(|(_, d)| **d == 0)
            .map(|(id, _)| id.clone())
            .collect();

        let mut order = Vec::with_capacity(self.nodes.len());
        while let Some(id) = ready.pop_first() {
            for succ in self.successors(&id) {
                let Some(d) = indegree.get_mut(succ) else {
                    continue;
                };
                *d -= 1;
                if *d == 0 {
                    ready.insert(succ.clone());
                }
            }
            order.push(id);
        }

        if order.len() != self.nodes.len() {
            let stuck = indegree
                .iter()
                .find(|(_, d)| **d > 0)
                .map(|(id, _)| id.as_str())
                .unwrap_or("?");
            bail!("structure graph contains a cycle through `{}`", stuck);
        }
        Ok(order)
    }
}
