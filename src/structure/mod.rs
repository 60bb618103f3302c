//! Structure layer: the validated dataset-description graph.
//!
//! This module owns:
//! - the typed node variants (Metadata/FileObject/FileSet/RecordSet/Field)
//! - the field Source/Extract/Transform model
//! - the StructureGraph adjacency and its topological order

pub mod graph;
pub mod node;
pub mod source;

pub use graph::StructureGraph;
pub use node::{Field, FileObject, FileSet, Metadata, Node, NodeId, RecordSet};
pub use source::{Extract, FileProperty, Reference, Source, Transform, apply_transforms};
