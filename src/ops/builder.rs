//! Graph builder: translate the structure graph into the operation DAG.
//!
//! One pass in topological order. A `last` map records, per structure
//! node, the operation(s) currently producing its data; each dispatch
//! arm chains new operations onto that frontier and updates the map.
//! The map lives only for the duration of one build.

use crate::constants;
use crate::issues::Issues;
use crate::ops::operation::Operation;
use crate::ops::registry::{OpId, Operations};
use crate::structure::{Field, FileObject, FileSet, Node, NodeId, RecordSet, StructureGraph};
use anyhow::bail;
use std::collections::BTreeMap;
use std::path::Path;
use tracing::{debug, info};

type LastOps = BTreeMap<NodeId, Vec<OpId>>;

/// Build the full operation registry for a structure graph.
///
/// Expected-but-invalid metadata (a field without an owning record set,
/// a contained file with no upstream) is reported through `issues` and
/// skips only the affected chain. Corrupt internal state (a cyclic
/// structure graph, a field with no ancestors) is a hard error.
pub fn build_operations(
    graph: &StructureGraph,
    folder: &Path,
    issues: &mut Issues,
) -> anyhow::Result<Operations> {
    let mut operations = Operations::new();
    let mut last: LastOps = BTreeMap::new();

    for id in graph.topological_order()? {
        // Chain continuation across structurally related nodes that are
        // not operation-distinct: the first predecessor with a recorded
        // last operation seeds this node.
        if !last.contains_key(&id) {
            let inherited = graph
                .predecessors(&id)
                .iter()
                .find_map(|p| last.get(p))
                .cloned();
            if let Some(ops) = inherited {
                last.insert(id.clone(), ops);
            }
        }

        let Some(node) = graph.node(&id) else {
            continue;
        };
        match node {
            Node::Field(field) => {
                add_operations_for_field_with_source(graph, &mut operations, &mut last, field, issues)?;
            }
            Node::RecordSet(rs) if rs.data.is_some() => {
                add_operations_for_record_set_with_data(&mut operations, &mut last, rs);
            }
            Node::FileObject(fo) => {
                if fo.encoding_format.as_deref() == Some(constants::GIT_HTTPS_ENCODING_FORMAT) {
                    add_operations_for_git(graph, &mut operations, &mut last, fo, folder);
                } else {
                    add_operations_for_file_object(graph, &mut operations, &mut last, fo, folder, issues);
                }
            }
            Node::FileSet(fs) if fs.contained_in.is_none() => {
                add_operations_for_local_file_set(graph, &mut operations, &mut last, fs, folder);
            }
            _ => {}
        }
    }

    // Attach all entry operations to a single synthetic root, so an
    // empty plan is still a runnable graph.
    let entry_points = operations.entry_points();
    let init = operations.add_node(Operation::Init {
        node: graph.root().clone(),
    });
    for entry in entry_points {
        operations.add_edge(init, entry);
    }

    info!(
        operations = operations.len(),
        edges = operations.edge_count(),
        "operation graph built"
    );
    Ok(operations)
}

/// The record set owning a field, found by walking its ancestor chain
/// upward (typically the parent or the parent's parent).
///
/// `Ok(None)` means the metadata is invalid; an empty ancestor chain
/// means the structure graph itself is corrupt.
fn find_record_set(graph: &StructureGraph, field: &Field) -> anyhow::Result<Option<NodeId>> {
    if field.parents.is_empty() {
        bail!("field `{}` has no parents in the structure graph", field.id);
    }
    Ok(field
        .parents
        .iter()
        .rev()
        .find(|p| graph.node(p).is_some_and(|n| n.as_record_set().is_some()))
        .cloned())
}

/// Field with a source: `last(field) -> Join -> GroupRecordSetStart ->
/// ReadField -> GroupRecordSetEnd`, all record-set operations shared
/// between the fields of one record set.
fn add_operations_for_field_with_source(
    graph: &StructureGraph,
    operations: &mut Operations,
    last: &mut LastOps,
    field: &Field,
    issues: &mut Issues,
) -> anyhow::Result<()> {
    let parent_has_data = field
        .parents
        .last()
        .and_then(|p| graph.node(p))
        .and_then(Node::as_record_set)
        .is_some_and(|rs| rs.data.is_some());
    if field.source.is_none() || !field.sub_fields.is_empty() || parent_has_data {
        // Structural only: sub-fields or the record set's inline data
        // carry the payload.
        return Ok(());
    }

    let Some(record_set) = find_record_set(graph, field)? else {
        issues.add_error(format!(
            "Field `{}` has a source but no record set among its ancestors.",
            field.id
        ));
        return Ok(());
    };

    let frontier = last.get(&field.id).cloned().unwrap_or_default();
    let join = operations.extend(
        &frontier,
        Operation::Join {
            node: record_set.clone(),
        },
    );
    let start = operations.extend(
        &[join],
        Operation::GroupRecordSetStart {
            node: record_set.clone(),
        },
    );
    let read = operations.extend(
        &[start],
        Operation::ReadField {
            node: field.id.clone(),
        },
    );
    let end = operations.extend(&[read], Operation::GroupRecordSetEnd { node: record_set });
    last.insert(field.id.clone(), vec![end]);
    Ok(())
}

/// Record set with inline rows: a single entry-point `Data` operation.
fn add_operations_for_record_set_with_data(
    operations: &mut Operations,
    last: &mut LastOps,
    record_set: &RecordSet,
) {
    let op = operations.add_node(Operation::Data {
        node: record_set.id.clone(),
    });
    last.insert(record_set.id.clone(), vec![op]);
}

/// FileObject read from a repository-style remote: the transport exposes
/// a browsable tree, so each FileSet successor filters and reads
/// directly off the download with no Extract.
fn add_operations_for_git(
    graph: &StructureGraph,
    operations: &mut Operations,
    last: &mut LastOps,
    file_object: &FileObject,
    folder: &Path,
) {
    let download = operations.add_node(Operation::Download {
        node: file_object.id.clone(),
        folder: folder.join(constants::DOWNLOAD_DIR),
    });
    let fields = field_successors(graph, &file_object.id);

    let mut frontier = vec![download];
    for succ_id in graph.successors(&file_object.id) {
        if let Some(Node::FileSet(fs)) = graph.node(succ_id) {
            let filter = operations.extend(
                &frontier,
                Operation::FilterFiles {
                    node: fs.id.clone(),
                },
            );
            let read = operations.extend(
                &[filter],
                Operation::Read {
                    node: fs.id.clone(),
                    folder: folder.to_path_buf(),
                    fields: fields.clone(),
                },
            );
            frontier = vec![read];
        }
    }
    last.insert(file_object.id.clone(), frontier);
}

/// Generic FileObject: Download (or the containing object's pipeline),
/// one Extract on each path that leaves the archive, FilterFiles +
/// Concatenate per FileSet successor, and a trailing Read when the
/// object is itself directly tabular.
fn add_operations_for_file_object(
    graph: &StructureGraph,
    operations: &mut Operations,
    last: &mut LastOps,
    file_object: &FileObject,
    folder: &Path,
    issues: &mut Issues,
) {
    let first: Vec<OpId> = if let Some(container) = &file_object.contained_in {
        // Bytes come from the container's pipeline, never a new fetch.
        match last.get(&file_object.id) {
            Some(ops) if !ops.is_empty() => ops.clone(),
            _ => {
                issues.add_error(format!(
                    "FileObject `{}` is contained in `{}`, but no upstream operation produces it.",
                    file_object.id, container
                ));
                return;
            }
        }
    } else {
        vec![operations.add_node(Operation::Download {
            node: file_object.id.clone(),
            folder: folder.join(constants::DOWNLOAD_DIR),
        })]
    };

    let needs_extract = constants::should_extract(file_object.encoding_format.as_deref());
    let mut tail = first.clone();
    for succ_id in graph.successors(&file_object.id) {
        let Some(succ) = graph.node(succ_id) else {
            continue;
        };
        if !succ.is_distribution() {
            // Field successors take their upstream via propagation once
            // this object's pipeline is complete.
            continue;
        }
        // Restart from the head for every successor; each gets its own
        // branch off the download.
        let mut frontier = first.clone();
        if needs_extract && !constants::should_extract(succ.encoding_format()) {
            let extract = operations.extend(
                &frontier,
                Operation::Extract {
                    node: file_object.id.clone(),
                    folder: folder.join(constants::EXTRACT_DIR),
                },
            );
            frontier = vec![extract];
        }
        if let Node::FileSet(fs) = succ {
            let filter = operations.extend(
                &frontier,
                Operation::FilterFiles {
                    node: fs.id.clone(),
                },
            );
            last.insert(fs.id.clone(), vec![filter]);
            let concatenate = operations.extend(
                &[filter],
                Operation::Concatenate {
                    node: fs.id.clone(),
                },
            );
            frontier = vec![concatenate];
        }
        last.insert(succ.id().clone(), frontier.clone());
        tail = frontier;
    }

    if !needs_extract {
        // Directly tabular: the object itself is parsed for the fields
        // declared on it.
        let read = operations.extend(
            &tail,
            Operation::Read {
                node: file_object.id.clone(),
                folder: folder.to_path_buf(),
                fields: field_successors(graph, &file_object.id),
            },
        );
        tail = vec![read];
    }
    debug!(node = %file_object.id, "file object pipeline complete");
    last.insert(file_object.id.clone(), tail);
}

/// FileSet with no remote origin: resolve a local directory, filter it,
/// read the matching members.
fn add_operations_for_local_file_set(
    graph: &StructureGraph,
    operations: &mut Operations,
    last: &mut LastOps,
    file_set: &FileSet,
    folder: &Path,
) {
    let directory = operations.add_node(Operation::LocalDirectory {
        node: file_set.id.clone(),
        folder: folder.to_path_buf(),
    });
    let filter = operations.extend(
        &[directory],
        Operation::FilterFiles {
            node: file_set.id.clone(),
        },
    );
    let read = operations.extend(
        &[filter],
        Operation::Read {
            node: file_set.id.clone(),
            folder: folder.to_path_buf(),
            fields: field_successors(graph, &file_set.id),
        },
    );
    last.insert(file_set.id.clone(), vec![read]);
}

/// Field-typed successors of a node, in declared order.
fn field_successors(graph: &StructureGraph, id: &NodeId) -> Vec<NodeId> {
    graph
        .successors(id)
        .iter()
        .filter(|s| graph.node(s).is_some_and(|n| n.as_field().is_some()))
        .cloned()
        .collect()
}
