use std::path::PathBuf;

use serde_json::Value;
use vecedit_core::archive;
use vecedit_core::core_api::{Engine, Session};
use vecedit_core::document::{Document, TreeNode};
use vecedit_core::spatial::GridCell;
use vecedit_render::{
    render_cell_report, render_json_summary, render_map_window, render_mutation_report,
    render_text_summary, render_tree,
};

fn workspace_root() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("../..")
}

fn fixture_session() -> Session {
    let path = workspace_root().join("tests/fixtures/world_1.json");
    let text = std::fs::read_to_string(path).expect("fixture should be readable");
    let value: Value = serde_json::from_str(&text).expect("fixture should be valid JSON");
    let doc = Document::from_value(value).expect("fixture root should be a mapping");
    let bytes = archive::encode(&doc).expect("fixture should encode");
    Engine::new()
        .open_bytes(bytes)
        .expect("fixture should open")
}

#[test]
fn json_summary_uses_fixed_top_level_order() {
    let session = fixture_session();
    let value = render_json_summary(&session).expect("summary renders");
    let keys: Vec<&str> = value
        .as_object()
        .expect("json should be an object")
        .keys()
        .map(String::as_str)
        .collect();

    assert_eq!(
        keys,
        vec![
            "file_name",
            "name",
            "description",
            "version",
            "world_time",
            "seed",
            "gamemode",
            "active_region",
            "regions",
            "research",
        ]
    );
    assert_eq!(value["seed"], 1337);
    assert_eq!(value["regions"][0]["region_id"], "region_the_abyss");
    assert_eq!(value["regions"][1]["hostile_entities"], 3);
    assert_eq!(value["research"]["completed"], 2);
}

#[test]
fn json_summary_of_empty_document_uses_nulls() {
    let session = Engine::new().open_document(Document::new());
    let value = render_json_summary(&session).expect("summary renders");
    assert_eq!(value["name"], Value::Null);
    assert_eq!(value["regions"], Value::Array(Vec::new()));
}

#[test]
fn text_summary_contains_expected_sections() {
    let session = fixture_session();
    let rendered = render_text_summary(&session).expect("summary renders");

    assert!(rendered.contains("VECTOR WORLD SAVE"));
    assert!(rendered.contains("Sanctum"));
    assert!(rendered.contains("File: world_1"));
    assert!(rendered.contains("World Time: 01:30:21"));
    assert!(rendered.contains("Active Region: region_the_abyss"));
    assert!(rendered.contains(" ::: Regions :::"));
    assert!(rendered.contains("entities 9 (2 hostile)"));
    assert!(rendered.contains("Completed: 2 of 87"));
}

#[test]
fn cell_report_skips_blank_lines() {
    let mut session = fixture_session();
    session
        .rebuild_indexes("region_the_abyss")
        .expect("indexes build");

    let wall = session.describe_cell(GridCell::new(5, 6)).expect("report");
    assert_eq!(
        render_cell_report(&wall),
        "Cell 5,6\nResource: Gold\nBuilding: Wall\nFaction: Player\nHealth: NA\n"
    );

    let empty = session.describe_cell(GridCell::new(2, 2)).expect("report");
    assert_eq!(
        render_cell_report(&empty),
        "Cell 2,2\nNo resource selected\nNo building selected\n"
    );

    let storage = session.describe_cell(GridCell::new(10, 20)).expect("report");
    assert!(render_cell_report(&storage).ends_with("Output Storage: 10 Gold\n"));
}

#[test]
fn map_window_draws_entities_over_resources() {
    let mut session = fixture_session();
    let indexes = session
        .rebuild_indexes("region_the_abyss")
        .expect("indexes build");

    let rendered = render_map_window(indexes, GridCell::new(4, 5), 4, 2);
    assert_eq!(
        rendered,
        "region_the_abyss: x 4..7 y 5..6\n....\n.Wg.\n"
    );
}

#[test]
fn map_window_is_clipped_to_grid() {
    let mut session = fixture_session();
    let indexes = session
        .rebuild_indexes("region_the_abyss")
        .expect("indexes build");

    let rendered = render_map_window(indexes, GridCell::new(478, -1), 5, 3);
    let lines: Vec<&str> = rendered.lines().collect();
    assert_eq!(lines[0], "region_the_abyss: x 478..479 y 0..1");
    assert_eq!(&lines[1..], ["..", ".."]);

    let off = render_map_window(indexes, GridCell::new(500, 500), 3, 3);
    assert!(off.contains("off the map"));
}

#[test]
fn tree_listing_indents_children() {
    let nodes = vec![
        TreeNode::scalar("Name", "Sanctum"),
        TreeNode::container(
            "completedResearchTechs",
            vec![TreeNode::scalar("[0]", "tech_main")],
        ),
    ];
    assert_eq!(
        render_tree(&nodes),
        "Name: Sanctum\ncompletedResearchTechs\n  [0]: tech_main\n"
    );
}

#[test]
fn mutation_report_line() {
    let mut session = fixture_session();
    let report = session.remove_enemy_units().expect("mutation applies");
    assert_eq!(
        render_mutation_report(&report),
        "remove_enemy_units: removed 3 entries, 2 regions touched"
    );
}
