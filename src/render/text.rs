//! Plain-text rendering of the operation graph.

use crate::ops::Operations;
use std::fmt::Write;

/// Render the plan as a numbered, dependency-ordered listing with each
/// operation's direct inputs.
pub fn render_text(operations: &Operations) -> String {
    let order = operations.topological_order();
    let mut out = String::new();
    for (i, id) in order.iter().enumerate() {
        let op = operations.get(*id);
        let preds: Vec<String> = operations
            .predecessors(*id)
            .map(|p| operations.get(p).to_string())
            .collect();
        if preds.is_empty() {
            let _ = writeln!(out, "{:>3}. {}", i + 1, op);
        } else {
            let _ = writeln!(out, "{:>3}. {}  [after: {}]", i + 1, op, preds.join(", "));
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ops::Operation;
    use crate::structure::NodeId;
    use pretty_assertions::assert_eq;

    #[test]
    fn lists_operations_with_their_inputs() {
        let mut operations = Operations::new();
        let init = operations.add_node(Operation::Init {
            node: NodeId::new("ds"),
        });
        let data = operations.add_node(Operation::Data {
            node: NodeId::new("literal"),
        });
        operations.add_edge(init, data);

        let text = render_text(&operations);
        assert_eq!(
            text,
            "  1. Init(ds)\n  2. Data(literal)  [after: Init(ds)]\n"
        );
    }
}
