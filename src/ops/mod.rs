//! Operation layer: operation contracts, the registry DAG, the builder
//! that translates structure graphs into it, and the validated result.

pub mod builder;
pub mod graph;
pub mod operation;
pub mod registry;

pub use graph::OperationGraph;
pub use operation::Operation;
pub use registry::{OpId, Operations};
