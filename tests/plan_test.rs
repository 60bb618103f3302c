//! End-to-end: JSON description -> structure graph -> operation graph
//! -> validation -> rendering, through the public API only.

use dataset_planner::{DatasetSpec, Issues, OperationGraph, render};
use pretty_assertions::assert_eq;
use std::path::Path;

const MOVIELENS: &str = r#"{
    "name": "movielens",
    "distribution": [
        { "type": "FileObject", "name": "data.zip",
          "content_url": "https://files.grouplens.org/datasets/movielens/ml-25m.zip",
          "encoding_format": "application/zip",
          "sha256": "8b21cfb7eb1706b4ec0aac894368d90acf26ebdfb6aced3ebd4ad5bd1eb9c6aa" },
        { "type": "FileSet", "name": "ratings-files",
          "contained_in": "data.zip",
          "encoding_format": "text/csv",
          "includes": "ml-25m/ratings.csv" }
    ],
    "record_sets": [
        { "name": "ratings",
          "fields": [
            { "name": "user_id",
              "source": { "distribution": "ratings-files",
                          "extract": { "column": "userId" } } },
            { "name": "movie_id",
              "source": { "distribution": "ratings-files",
                          "extract": { "column": "movieId" } } }
          ] }
    ]
}"#;

fn plan(description: &str) -> OperationGraph {
    let dataset: DatasetSpec = serde_json::from_str(description).unwrap();
    let structure = dataset.validate_and_build().unwrap();
    let mut graph =
        OperationGraph::from_structure(&structure, Path::new("/cache"), Issues::new()).unwrap();
    graph.check_graph();
    graph
}

#[test]
fn movielens_plan_is_clean_and_complete() {
    let graph = plan(MOVIELENS);
    assert!(!graph.issues().has_errors(), "{}", graph.issues().report());

    let text = render::render_text(graph.operations());
    assert_eq!(
        text,
        "  1. Init(movielens)\n\
         \x20 2. Download(data.zip)  [after: Init(movielens)]\n\
         \x20 3. Extract(data.zip)  [after: Download(data.zip)]\n\
         \x20 4. FilterFiles(ratings-files)  [after: Extract(data.zip)]\n\
         \x20 5. Concatenate(ratings-files)  [after: FilterFiles(ratings-files)]\n\
         \x20 6. Join(ratings)  [after: Concatenate(ratings-files)]\n\
         \x20 7. GroupRecordSetStart(ratings)  [after: Join(ratings)]\n\
         \x20 8. ReadField(ratings/user_id)  [after: GroupRecordSetStart(ratings)]\n\
         \x20 9. ReadField(ratings/movie_id)  [after: GroupRecordSetStart(ratings)]\n\
         \x2010. GroupRecordSetEnd(ratings)  [after: ReadField(ratings/user_id), ReadField(ratings/movie_id)]\n"
    );
}

#[test]
fn dot_output_contains_every_operation_and_edge() {
    let graph = plan(MOVIELENS);
    let dot = render::render_dot(graph.operations());

    assert!(dot.starts_with("digraph operations {"));
    for label in [
        "Init(movielens)",
        "Download(data.zip)",
        "Extract(data.zip)",
        "FilterFiles(ratings-files)",
        "Concatenate(ratings-files)",
        "Join(ratings)",
        "GroupRecordSetStart(ratings)",
        "ReadField(ratings/user_id)",
        "ReadField(ratings/movie_id)",
        "GroupRecordSetEnd(ratings)",
    ] {
        assert!(dot.contains(label), "missing {} in:\n{}", label, dot);
    }
    assert_eq!(dot.matches(" -> ").count(), graph.operations().edge_count());
}

#[test]
fn inline_data_plan_is_a_single_entry_point() {
    let graph = plan(
        r#"{
            "name": "tiny",
            "record_sets": [
                { "name": "literal",
                  "data": [ { "a": 1 }, { "a": 2 } ],
                  "fields": [ { "name": "a" } ] }
            ]
        }"#,
    );
    assert!(!graph.issues().has_errors());
    assert_eq!(
        render::render_text(graph.operations()),
        "  1. Init(tiny)\n  2. Data(literal)  [after: Init(tiny)]\n"
    );
}
