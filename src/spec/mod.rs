//! Spec layer: JSON description + validated in-memory structures.
//!
//! This module is intentionally separate from graph building and
//! rendering. It owns:
//! - the raw dataset description shapes (serde-friendly)
//! - source/extract/transform declarations
//! - validation into the structure graph

pub mod dataset;
pub mod source;

pub use dataset::{DatasetSpec, DistributionSpec, FieldSpec, RecordSetSpec};
pub use source::{ExtractSpec, SourceSpec, TransformSpec};
