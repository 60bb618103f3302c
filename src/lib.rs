//! # dataset-planner
//!
//! Compile a declarative dataset description (files, file sets, record
//! sets, fields) into a validated dependency graph of concrete
//! data-movement and data-transformation operations.
//!
//! ## Architecture
//!
//! Layers, input side first:
//!
//! - `spec`: raw JSON description + validation into the structure graph
//! - `structure`: typed nodes, reference edges, topological order, and
//!   the field source/transform model
//! - `ops`: operation contracts, the registry DAG, the builder, and the
//!   validated `OperationGraph`
//! - `render`: text and Graphviz output of a finished plan
//!
//! The crate plans; it never downloads, extracts, or parses data files.
//! An execution runtime walks the finished `OperationGraph` (plus the
//! structure graph for node attributes) in dependency order.

pub mod constants;
pub mod issues;
pub mod ops;
pub mod render;
pub mod spec;
pub mod structure;

pub type Result<T> = anyhow::Result<T>;

pub use issues::Issues;
pub use ops::{OpId, Operation, OperationGraph, Operations};
pub use spec::DatasetSpec;
pub use structure::{Node, NodeId, StructureGraph};
