//! Typed nodes of the validated structure graph.
//!
//! Five variants: the Metadata root, FileObject/FileSet distribution
//! nodes, RecordSet, and Field. Every node carries its stable id and its
//! ancestor chain (root-first), which the builder walks to find the
//! record set owning a field.

use crate::structure::source::Source;

/// Stable node identifier: the unique name for distribution nodes and
/// record sets, slash-joined for fields ("ratings/user_id").
///
/// Ordered so it can key BTreeMap/BTreeSet.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct NodeId(String);

impl NodeId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for NodeId {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

#[derive(Debug, Clone)]
pub struct Metadata {
    pub id: NodeId,
    pub name: String,
}

#[derive(Debug, Clone)]
pub struct FileObject {
    pub id: NodeId,
    pub name: String,
    pub content_url: Option<String>,
    pub encoding_format: Option<String>,
    /// Back-reference to a containing FileObject: bytes come from the
    /// container's pipeline, not an independent fetch.
    pub contained_in: Option<NodeId>,
    pub sha256: Option<String>,
    pub md5: Option<String>,
    pub parents: Vec<NodeId>,
}

#[derive(Debug, Clone)]
pub struct FileSet {
    pub id: NodeId,
    pub name: String,
    pub encoding_format: Option<String>,
    /// Include rule narrowing the directory listing ("*.csv").
    pub includes: Option<String>,
    pub contained_in: Option<NodeId>,
    pub parents: Vec<NodeId>,
}

#[derive(Debug, Clone)]
pub struct RecordSet {
    pub id: NodeId,
    pub name: String,
    /// Inline literal rows; `Some` always holds at least one row
    /// (empty lists are normalized away at validation time).
    pub data: Option<Vec<serde_json::Value>>,
    pub parents: Vec<NodeId>,
}

#[derive(Debug, Clone)]
pub struct Field {
    pub id: NodeId,
    pub name: String,
    pub source: Option<Source>,
    /// Non-empty when the field materializes via its children.
    pub sub_fields: Vec<NodeId>,
    pub parents: Vec<NodeId>,
}

#[derive(Debug, Clone)]
pub enum Node {
    Metadata(Metadata),
    FileObject(FileObject),
    FileSet(FileSet),
    RecordSet(RecordSet),
    Field(Field),
}

impl Node {
    pub fn id(&self) -> &NodeId {
        match self {
            Node::Metadata(n) => &n.id,
            Node::FileObject(n) => &n.id,
            Node::FileSet(n) => &n.id,
            Node::RecordSet(n) => &n.id,
            Node::Field(n) => &n.id,
        }
    }

    /// Ancestor chain, root-first. Empty for the Metadata root.
    pub fn parents(&self) -> &[NodeId] {
        match self {
            Node::Metadata(_) => &[],
            Node::FileObject(n) => &n.parents,
            Node::FileSet(n) => &n.parents,
            Node::RecordSet(n) => &n.parents,
            Node::Field(n) => &n.parents,
        }
    }

    /// Encoding format for distribution nodes, `None` otherwise.
    pub fn encoding_format(&self) -> Option<&str> {
        match self {
            Node::FileObject(n) => n.encoding_format.as_deref(),
            Node::FileSet(n) => n.encoding_format.as_deref(),
            _ => None,
        }
    }

    pub fn is_distribution(&self) -> bool {
        matches!(self, Node::FileObject(_) | Node::FileSet(_))
    }

    pub fn as_record_set(&self) -> Option<&RecordSet> {
        match self {
            Node::RecordSet(n) => Some(n),
            _ => None,
        }
    }

    pub fn as_field(&self) -> Option<&Field> {
        match self {
            Node::Field(n) => Some(n),
            _ => None,
        }
    }
}
