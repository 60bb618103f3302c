//! Operation kinds: one executable step of the compiled plan.
//!
//! An operation's identity is its kind, the structure node it realizes,
//! and its extra parameters (target folder, field tuple). Identity is
//! total-ordered so the registry can intern operations, which is what
//! makes two nodes consuming the same source share one sub-pipeline.
//!
//! The core carries the parameters the external runtime needs and never
//! performs the bytes-level work itself.

use crate::structure::NodeId;
use std::path::PathBuf;

#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord)]
pub enum Operation {
    /// Synthetic source feeding every entry point; one per graph.
    Init { node: NodeId },
    /// Fetch remote or versioned bytes into `folder`; a cache hit is a
    /// no-op precondition check.
    Download { node: NodeId, folder: PathBuf },
    /// Unpack an archive-typed FileObject into `folder`.
    Extract { node: NodeId, folder: PathBuf },
    /// Resolve a FileSet with no remote origin to an existing directory
    /// under `folder`.
    LocalDirectory { node: NodeId, folder: PathBuf },
    /// Narrow a directory listing to members matching the FileSet's
    /// include rule.
    FilterFiles { node: NodeId },
    /// Merge per-member tabular results of a filtered file set into one
    /// logical table.
    Concatenate { node: NodeId },
    /// Parse bytes at the resolved location into rows, restricted to the
    /// given fields.
    Read {
        node: NodeId,
        folder: PathBuf,
        fields: Vec<NodeId>,
    },
    /// Materialize the literal inline rows of a RecordSet.
    Data { node: NodeId },
    /// Merge rows arriving from every predecessor contributing fields to
    /// the same RecordSet.
    Join { node: NodeId },
    /// Opening bracket of the row-grouping scope for a RecordSet.
    GroupRecordSetStart { node: NodeId },
    /// Closing bracket of the row-grouping scope.
    GroupRecordSetEnd { node: NodeId },
    /// Extract and transform a single field's value from the rows
    /// flowing through (see `structure::source::apply_transforms`).
    ReadField { node: NodeId },
}

impl Operation {
    /// The structure node this operation realizes.
    pub fn node(&self) -> &NodeId {
        match self {
            Operation::Init { node }
            | Operation::Download { node, .. }
            | Operation::Extract { node, .. }
            | Operation::LocalDirectory { node, .. }
            | Operation::FilterFiles { node }
            | Operation::Concatenate { node }
            | Operation::Read { node, .. }
            | Operation::Data { node }
            | Operation::Join { node }
            | Operation::GroupRecordSetStart { node }
            | Operation::GroupRecordSetEnd { node }
            | Operation::ReadField { node } => node,
        }
    }

    pub fn kind(&self) -> &'static str {
        match self {
            Operation::Init { .. } => "Init",
            Operation::Download { .. } => "Download",
            Operation::Extract { .. } => "Extract",
            Operation::LocalDirectory { .. } => "LocalDirectory",
            Operation::FilterFiles { .. } => "FilterFiles",
            Operation::Concatenate { .. } => "Concatenate",
            Operation::Read { .. } => "Read",
            Operation::Data { .. } => "Data",
            Operation::Join { .. } => "Join",
            Operation::GroupRecordSetStart { .. } => "GroupRecordSetStart",
            Operation::GroupRecordSetEnd { .. } => "GroupRecordSetEnd",
            Operation::ReadField { .. } => "ReadField",
        }
    }
}

impl std::fmt::Display for Operation {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        write!(f, "{}({})", self.kind(), self.node())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn display_is_kind_and_node() {
        let op = Operation::Download {
            node: NodeId::new("data.zip"),
            folder: PathBuf::from("/cache/download"),
        };
        assert_eq!(op.to_string(), "Download(data.zip)");
        assert_eq!(op.kind(), "Download");
        assert_eq!(op.node().as_str(), "data.zip");
    }

    #[test]
    fn identity_includes_parameters() {
        let a = Operation::Read {
            node: NodeId::new("rows"),
            folder: PathBuf::from("."),
            fields: vec![NodeId::new("rs/id")],
        };
        let b = Operation::Read {
            node: NodeId::new("rows"),
            folder: PathBuf::from("."),
            fields: vec![],
        };
        assert_ne!(a, b);
        assert_eq!(a, a.clone());
    }
}
