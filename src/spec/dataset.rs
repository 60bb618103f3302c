//! Dataset description (metadata.json) as a flat, serde-friendly shape.
//!
//! JSON shape:
//! {
//!   "name": "movielens",
//!   "distribution": [
//!     { "type": "FileObject", "name": "data.zip",
//!       "content_url": "https://…/ml-25m.zip",
//!       "encoding_format": "application/zip" },
//!     { "type": "FileSet", "name": "rows",
//!       "contained_in": "data.zip",
//!       "encoding_format": "text/csv", "includes": "*.csv" }
//!   ],
//!   "record_sets": [
//!     { "name": "ratings",
//!       "fields": [
//!         { "name": "user_id",
//!           "source": { "distribution": "rows",
//!                       "extract": { "column": "userId" } } }
//!       ] }
//!   ]
//! }
//!
//! We check name uniqueness, resolve every containment and source
//! reference, and build the validated structure graph. Vocabulary
//! expansion of the full schema document is the metadata parser's job,
//! not ours.

use crate::spec::source::SourceSpec;
use crate::structure::{
    Field, FileObject, FileSet, Metadata, Node, NodeId, RecordSet, StructureGraph,
};
use anyhow::{Context, bail};
use serde::Deserialize;
use std::collections::{BTreeMap, BTreeSet};

#[derive(Debug, Clone, Deserialize)]
pub struct DatasetSpec {
    pub name: String,

    #[serde(default)]
    pub distribution: Vec<DistributionSpec>,

    #[serde(default)]
    pub record_sets: Vec<RecordSetSpec>,
}

/// Raw distribution entry: a FileObject or FileSet.
#[derive(Debug, Clone, Deserialize)]
pub struct DistributionSpec {
    #[serde(rename = "type")]
    pub kind: String,

    pub name: String,

    #[serde(default)]
    pub content_url: Option<String>,

    #[serde(default)]
    pub encoding_format: Option<String>,

    #[serde(default)]
    pub contained_in: Option<String>,

    #[serde(default)]
    pub includes: Option<String>,

    #[serde(default)]
    pub sha256: Option<String>,

    #[serde(default)]
    pub md5: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct RecordSetSpec {
    pub name: String,

    /// Inline literal rows; bypasses file I/O entirely.
    #[serde(default)]
    pub data: Vec<serde_json::Value>,

    #[serde(default)]
    pub fields: Vec<FieldSpec>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct FieldSpec {
    pub name: String,

    #[serde(default)]
    pub source: Option<SourceSpec>,

    #[serde(default)]
    pub sub_fields: Vec<FieldSpec>,
}

impl DatasetSpec {
    /// Validate the description and build the structure graph:
    /// - unique node names (metadata, distributions, record sets, fields)
    /// - `contained_in` references existing distributions, acyclically
    /// - source references resolve (distributions by name, fields by
    ///   slash-joined id)
    /// - FileSets declare an include rule
    /// - inline data is a list of objects
    pub fn validate_and_build(&self) -> anyhow::Result<StructureGraph> {
        if self.name.trim().is_empty() {
            bail!("dataset name must not be empty");
        }

        // 1) Unique names.
        let mut ids = BTreeSet::<String>::new();
        ids.insert(self.name.clone());
        let mut distribution_names = BTreeSet::<String>::new();
        for d in &self.distribution {
            if !ids.insert(d.name.clone()) {
                bail!("duplicate node name: {}", d.name);
            }
            distribution_names.insert(d.name.clone());
        }
        let mut field_ids = BTreeSet::<String>::new();
        for rs in &self.record_sets {
            if !ids.insert(rs.name.clone()) {
                bail!("duplicate node name: {}", rs.name);
            }
            collect_field_ids(&rs.name, &rs.fields, &mut ids, &mut field_ids)?;
        }

        // 2) Containment references + transitive ancestor chains.
        let by_name: BTreeMap<&str, &DistributionSpec> = self
            .distribution
            .iter()
            .map(|d| (d.name.as_str(), d))
            .collect();
        for d in &self.distribution {
            if let Some(c) = &d.contained_in {
                if !distribution_names.contains(c) {
                    bail!("`{}` references unknown contained_in: {}", d.name, c);
                }
            }
        }
        let root_id = NodeId::new(self.name.clone());
        let mut chains = BTreeMap::<String, Vec<NodeId>>::new();
        for d in &self.distribution {
            containment_chain(&root_id, d, &by_name, &mut chains, &mut Vec::new())?;
        }

        // 3) Nodes + edges.
        let mut graph = StructureGraph::new(Metadata {
            id: root_id.clone(),
            name: self.name.clone(),
        });

        for d in &self.distribution {
            let id = NodeId::new(d.name.clone());
            let parents = chains.get(&d.name).cloned().unwrap_or_default();
            let contained_in = d.contained_in.as_ref().map(|c| NodeId::new(c.clone()));
            let node = match d.kind.as_str() {
                "FileObject" => Node::FileObject(FileObject {
                    id: id.clone(),
                    name: d.name.clone(),
                    content_url: d.content_url.clone(),
                    encoding_format: d.encoding_format.clone(),
                    contained_in: contained_in.clone(),
                    sha256: d.sha256.clone(),
                    md5: d.md5.clone(),
                    parents,
                }),
                "FileSet" => {
                    if d.includes.is_none() {
                        bail!("FileSet `{}` must declare an include rule", d.name);
                    }
                    Node::FileSet(FileSet {
                        id: id.clone(),
                        name: d.name.clone(),
                        encoding_format: d.encoding_format.clone(),
                        includes: d.includes.clone(),
                        contained_in: contained_in.clone(),
                        parents,
                    })
                }
                other => bail!("distribution `{}` has unknown type: {}", d.name, other),
            };
            graph.insert(node);
            let from = contained_in.unwrap_or_else(|| root_id.clone());
            graph.add_edge(&from, &id);
        }

        for rs in &self.record_sets {
            let rs_id = NodeId::new(rs.name.clone());
            let data = if rs.data.is_empty() {
                None
            } else {
                for row in &rs.data {
                    if !row.is_object() {
                        bail!(
                            "record set `{}` inline data must be a list of objects",
                            rs.name
                        );
                    }
                }
                Some(rs.data.clone())
            };
            graph.insert(Node::RecordSet(RecordSet {
                id: rs_id.clone(),
                name: rs.name.clone(),
                data,
                parents: vec![root_id.clone()],
            }));
            graph.add_edge(&root_id, &rs_id);

            let ancestors = vec![root_id.clone(), rs_id];
            for f in &rs.fields {
                build_field(&mut graph, &distribution_names, &field_ids, &ancestors, f)?;
            }
        }

        // Reject reference cycles up front rather than at build time.
        graph
            .topological_order()
            .context("invalid dataset description")?;
        Ok(graph)
    }
}

fn collect_field_ids(
    parent_path: &str,
    fields: &[FieldSpec],
    ids: &mut BTreeSet<String>,
    field_ids: &mut BTreeSet<String>,
) -> anyhow::Result<()> {
    for f in fields {
        let id = format!("{}/{}", parent_path, f.name);
        if !ids.insert(id.clone()) {
            bail!("duplicate node name: {}", id);
        }
        field_ids.insert(id.clone());
        collect_field_ids(&id, &f.sub_fields, ids, field_ids)?;
    }
    Ok(())
}

/// Ancestor chain of a distribution (root-first), following
/// `contained_in` transitively. Cycles are an error.
fn containment_chain(
    root: &NodeId,
    d: &DistributionSpec,
    by_name: &BTreeMap<&str, &DistributionSpec>,
    chains: &mut BTreeMap<String, Vec<NodeId>>,
    visiting: &mut Vec<String>,
) -> anyhow::Result<Vec<NodeId>> {
    if let Some(chain) = chains.get(&d.name) {
        return Ok(chain.clone());
    }
    if visiting.contains(&d.name) {
        bail!("containment cycle: {}", visiting.join(" -> "));
    }

    let chain = match &d.contained_in {
        None => vec![root.clone()],
        Some(container) => {
            visiting.push(d.name.clone());
            let parent = by_name
                .get(container.as_str())
                .expect("contained_in was validated");
            let mut chain = containment_chain(root, parent, by_name, chains, visiting)?;
            visiting.pop();
            chain.push(NodeId::new(container.clone()));
            chain
        }
    };
    chains.insert(d.name.clone(), chain.clone());
    Ok(chain)
}

fn build_field(
    graph: &mut StructureGraph,
    distribution_names: &BTreeSet<String>,
    field_ids: &BTreeSet<String>,
    ancestors: &[NodeId],
    f: &FieldSpec,
) -> anyhow::Result<NodeId> {
    let owner = ancestors.last().expect("fields always have an owner");
    let id = NodeId::new(format!("{}/{}", owner, f.name));

    let source = match &f.source {
        None => None,
        Some(s) => Some(s.resolve(id.as_str(), distribution_names, field_ids)?),
    };

    let mut child_ancestors = ancestors.to_vec();
    child_ancestors.push(id.clone());
    let mut sub_fields = Vec::with_capacity(f.sub_fields.len());
    for sub in &f.sub_fields {
        sub_fields.push(build_field(
            graph,
            distribution_names,
            field_ids,
            &child_ancestors,
            sub,
        )?);
    }

    graph.insert(Node::Field(Field {
        id: id.clone(),
        name: f.name.clone(),
        source: source.clone(),
        sub_fields,
        parents: ancestors.to_vec(),
    }));
    graph.add_edge(owner, &id);
    if let Some(source) = &source {
        graph.add_edge(source.reference.node_id(), &id);
    }
    Ok(id)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    fn spec(value: serde_json::Value) -> DatasetSpec {
        serde_json::from_value(value).unwrap()
    }

    fn archive_with_csv_rows() -> DatasetSpec {
        spec(json!({
            "name": "movielens",
            "distribution": [
                { "type": "FileObject", "name": "data.zip",
                  "content_url": "https://example.org/data.zip",
                  "encoding_format": "application/zip" },
                { "type": "FileSet", "name": "rows",
                  "contained_in": "data.zip",
                  "encoding_format": "text/csv",
                  "includes": "*.csv" }
            ],
            "record_sets": [
                { "name": "ratings",
                  "fields": [
                    { "name": "user_id",
                      "source": { "distribution": "rows",
                                  "extract": { "column": "userId" } } }
                  ] }
            ]
        }))
    }

    #[test]
    fn builds_nodes_edges_and_parent_chains() {
        let graph = archive_with_csv_rows().validate_and_build().unwrap();
        assert_eq!(graph.len(), 5);

        let root = graph.root().clone();
        let zip = NodeId::new("data.zip");
        let rows = NodeId::new("rows");
        let rs = NodeId::new("ratings");
        let field = NodeId::new("ratings/user_id");

        assert_eq!(graph.successors(&root), &[zip.clone(), rs.clone()]);
        assert_eq!(graph.successors(&zip), &[rows.clone()]);
        // Hierarchy edge first, then the source-reference edge.
        assert_eq!(graph.predecessors(&field), &[rs.clone(), rows.clone()]);

        let rows_node = graph.node(&rows).unwrap();
        assert_eq!(rows_node.parents(), &[root.clone(), zip]);
        let field_node = graph.node(&field).unwrap();
        assert_eq!(field_node.parents(), &[root, rs]);
    }

    #[test]
    fn rejects_duplicate_names() {
        let err = spec(json!({
            "name": "ds",
            "distribution": [
                { "type": "FileObject", "name": "a.csv" },
                { "type": "FileObject", "name": "a.csv" }
            ]
        }))
        .validate_and_build()
        .unwrap_err()
        .to_string();
        assert!(err.contains("duplicate node name"), "{}", err);
    }

    #[test]
    fn rejects_unknown_contained_in() {
        let err = spec(json!({
            "name": "ds",
            "distribution": [
                { "type": "FileObject", "name": "a.csv", "contained_in": "missing.zip" }
            ]
        }))
        .validate_and_build()
        .unwrap_err()
        .to_string();
        assert!(err.contains("unknown contained_in"), "{}", err);
    }

    #[test]
    fn rejects_containment_cycle() {
        let err = spec(json!({
            "name": "ds",
            "distribution": [
                { "type": "FileObject", "name": "a.zip", "contained_in": "b.zip" },
                { "type": "FileObject", "name": "b.zip", "contained_in": "a.zip" }
            ]
        }))
        .validate_and_build()
        .unwrap_err()
        .to_string();
        assert!(err.contains("containment cycle"), "{}", err);
    }

    #[test]
    fn rejects_file_set_without_includes() {
        let err = spec(json!({
            "name": "ds",
            "distribution": [
                { "type": "FileSet", "name": "files" }
            ]
        }))
        .validate_and_build()
        .unwrap_err()
        .to_string();
        assert!(err.contains("include rule"), "{}", err);
    }

    #[test]
    fn rejects_unknown_distribution_type() {
        let err = spec(json!({
            "name": "ds",
            "distribution": [
                { "type": "Archive", "name": "a.zip" }
            ]
        }))
        .validate_and_build()
        .unwrap_err()
        .to_string();
        assert!(err.contains("unknown type"), "{}", err);
    }

    #[test]
    fn rejects_non_object_inline_rows() {
        let err = spec(json!({
            "name": "ds",
            "record_sets": [
                { "name": "literal", "data": [1, 2, 3] }
            ]
        }))
        .validate_and_build()
        .unwrap_err()
        .to_string();
        assert!(err.contains("list of objects"), "{}", err);
    }

    #[test]
    fn sub_fields_get_slash_joined_ids() {
        let graph = spec(json!({
            "name": "ds",
            "distribution": [
                { "type": "FileObject", "name": "a.json",
                  "encoding_format": "application/json" }
            ],
            "record_sets": [
                { "name": "people",
                  "fields": [
                    { "name": "location",
                      "sub_fields": [
                        { "name": "lat",
                          "source": { "distribution": "a.json",
                                      "extract": { "json_path": "$.lat" } } }
                      ] }
                  ] }
            ]
        }))
        .validate_and_build()
        .unwrap();

        let parent = NodeId::new("people/location");
        let sub = NodeId::new("people/location/lat");
        let parent_node = graph.node(&parent).unwrap().as_field().unwrap();
        assert_eq!(parent_node.sub_fields, vec![sub.clone()]);
        let sub_node = graph.node(&sub).unwrap().as_field().unwrap();
        assert_eq!(
            sub_node.parents,
            vec![graph.root().clone(), NodeId::new("people"), parent]
        );
    }
}
