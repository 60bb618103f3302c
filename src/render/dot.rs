//! Graphviz rendering of the operation graph.

use crate::ops::{OpId, Operations};
use std::collections::BTreeMap;
use std::fmt::Write;

/// Render the operation graph as a Graphviz digraph.
///
/// Node ids follow dependency order, so the output is byte-stable for a
/// given graph.
pub fn render_dot(operations: &Operations) -> String {
    let order = operations.topological_order();
    let mut names = BTreeMap::<OpId, String>::new();
    for (i, id) in order.iter().enumerate() {
        names.insert(*id, format!("op{}", i));
    }

    let mut out = String::from("digraph operations {\n  rankdir=LR;\n");
    for id in &order {
        let _ = writeln!(
            out,
            "  {} [label=\"{}\"];",
            names[id],
            escape(&operations.get(*id).to_string())
        );
    }
    for id in &order {
        for succ in operations.successors(*id) {
            let _ = writeln!(out, "  {} -> {};", names[id], names[&succ]);
        }
    }
    out.push_str("}\n");
    out
}

fn escape(label: &str) -> String {
    label.replace('\\', "\\\\").replace('"', "\\\"")
}
