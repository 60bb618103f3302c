//! Operation registry: the mutable DAG of operations under construction.
//!
//! Operations are interned by identity, so adding the same operation
//! twice yields the same graph node — repeated `Join(record_set)`
//! appends from different fields converge on one Join. Edges denote
//! "produces input for".

use crate::ops::operation::Operation;
use std::collections::{BTreeMap, BTreeSet};

/// Copyable handle to an operation inside one registry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct OpId(usize);

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Operations {
    ops: Vec<Operation>,
    index: BTreeMap<Operation, OpId>,
    succ: BTreeMap<OpId, BTreeSet<OpId>>,
    pred: BTreeMap<OpId, BTreeSet<OpId>>,
}

impl Operations {
    pub fn new() -> Self {
        Self::default()
    }

    /// Idempotent insert: an operation already present keeps its handle.
    pub fn add_node(&mut self, op: Operation) -> OpId {
        if let Some(id) = self.index.get(&op) {
            return *id;
        }
        let id = OpId(self.ops.len());
        self.index.insert(op.clone(), id);
        self.ops.push(op);
        self.succ.insert(id, BTreeSet::new());
        self.pred.insert(id, BTreeSet::new());
        id
    }

    /// Directed edge `from -> to`, set semantics.
    pub fn add_edge(&mut self, from: OpId, to: OpId) {
        self.succ.entry(from).or_default().insert(to);
        self.pred.entry(to).or_default().insert(from);
    }

    /// Chain-composition primitive: register `op`, wire an edge from
    /// every frontier element to it, and return it as the new frontier.
    pub fn extend(&mut self, frontier: &[OpId], op: Operation) -> OpId {
        let id = self.add_node(op);
        for from in frontier {
            self.add_edge(*from, id);
        }
        id
    }

    pub fn get(&self, id: OpId) -> &Operation {
        &self.ops[id.0]
    }

    pub fn predecessors(&self, id: OpId) -> impl Iterator<Item = OpId> + '_ {
        self.pred.get(&id).into_iter().flatten().copied()
    }

    pub fn successors(&self, id: OpId) -> impl Iterator<Item = OpId> + '_ {
        self.succ.get(&id).into_iter().flatten().copied()
    }

    /// All operations with no predecessors; the Init root is attached to
    /// exactly these.
    pub fn entry_points(&self) -> Vec<OpId> {
        (0..self.ops.len())
            .map(OpId)
            .filter(|id| self.predecessors(*id).next().is_none())
            .collect()
    }

    pub fn iter(&self) -> impl Iterator<Item = (OpId, &Operation)> {
        self.ops.iter().enumerate().map(|(i, op)| (OpId(i), op))
    }

    pub fn edges(&self) -> impl Iterator<Item = (OpId, OpId)> + '_ {
        self.succ
            .iter()
            .flat_map(|(from, tos)| tos.iter().map(move |to| (*from, *to)))
    }

    /// The representation is an adjacency-list digraph; this is the
    /// structural witness `check_graph` asserts on.
    pub fn is_directed(&self) -> bool {
        true
    }

    pub fn len(&self) -> usize {
        self.ops.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ops.is_empty()
    }

    pub fn edge_count(&self) -> usize {
        self.succ.values().map(BTreeSet::len).sum()
    }

    /// Dependency order over the finished graph (Kahn's algorithm, ties
    /// broken by handle). Nodes on a cycle are appended in handle order
    /// so rendering can still show a defective graph in full.
    pub fn topological_order(&self) -> Vec<OpId> {
        let mut indegree: BTreeMap<OpId, usize> = (0..self.ops.len())
            .map(OpId)
            .map(|id| (id, self.predecessors(id).count()))
            .collect();

        let mut ready: BTreeSet<OpId> = indegree
            .iter()
            .filter(|(_, d)| **d == 0)
            .map(|(id, _)| *id)
            .collect();

        let mut order = Vec::with_capacity(self.ops.len());
        while let Some(id) = ready.pop_first() {
            for succ in self.successors(id) {
                if succ == id {
                    continue;
                }
                let d = indegree.get_mut(&succ).expect("known handle");
                *d -= 1;
                if *d == 0 {
                    ready.insert(succ);
                }
            }
            indegree.remove(&id);
            order.push(id);
        }

        order.extend(indegree.keys().copied());
        order
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::structure::NodeId;
    use pretty_assertions::assert_eq;

    fn join(name: &str) -> Operation {
        Operation::Join {
            node: NodeId::new(name),
        }
    }

    fn data(name: &str) -> Operation {
        Operation::Data {
            node: NodeId::new(name),
        }
    }

    #[test]
    fn add_node_is_idempotent() {
        let mut ops = Operations::new();
        let a = ops.add_node(join("rs"));
        let b = ops.add_node(join("rs"));
        assert_eq!(a, b);
        assert_eq!(ops.len(), 1);
    }

    #[test]
    fn extend_wires_fan_in() {
        let mut ops = Operations::new();
        let a = ops.add_node(data("a"));
        let b = ops.add_node(data("b"));
        let j = ops.extend(&[a, b], join("rs"));

        let preds: Vec<OpId> = ops.predecessors(j).collect();
        assert_eq!(preds, vec![a, b]);
        assert_eq!(ops.entry_points(), vec![a, b]);
    }

    #[test]
    fn extend_with_empty_frontier_creates_entry_point() {
        let mut ops = Operations::new();
        let j = ops.extend(&[], join("rs"));
        assert_eq!(ops.entry_points(), vec![j]);
    }

    #[test]
    fn interning_shares_downstream_chains() {
        let mut ops = Operations::new();
        let a = ops.add_node(data("a"));
        let b = ops.add_node(data("b"));
        // Two callers chain through the "same" join.
        let j1 = ops.extend(&[a], join("rs"));
        let j2 = ops.extend(&[b], join("rs"));
        assert_eq!(j1, j2);
        assert_eq!(ops.len(), 3);
        assert_eq!(ops.predecessors(j1).count(), 2);
    }

    #[test]
    fn topological_order_puts_dependencies_first() {
        let mut ops = Operations::new();
        let a = ops.add_node(data("a"));
        let j = ops.extend(&[a], join("rs"));
        let init = ops.add_node(Operation::Init {
            node: NodeId::new("ds"),
        });
        ops.add_edge(init, a);

        assert_eq!(ops.topological_order(), vec![init, a, j]);
    }

    #[test]
    fn edges_enumerates_every_edge_once() {
        let mut ops = Operations::new();
        let a = ops.add_node(data("a"));
        let j = ops.extend(&[a], join("rs"));
        ops.add_edge(a, j);

        let edges: Vec<(OpId, OpId)> = ops.edges().collect();
        assert_eq!(edges, vec![(a, j)]);
        assert_eq!(ops.edge_count(), 1);
    }
}
