use std::fs;
use std::path::PathBuf;
use std::process::Command;
use std::time::{SystemTime, UNIX_EPOCH};

use serde_json::Value;
use vecedit_core::archive;
use vecedit_core::document::Document;

fn workspace_root() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("../..")
}

fn run_cli(args: &[&str]) -> std::process::Output {
    Command::new(env!("CARGO_BIN_EXE_vecedit"))
        .args(args)
        .output()
        .expect("failed to run vecedit CLI")
}

fn temp_path(prefix: &str, extension: &str) -> PathBuf {
    let nanos = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .expect("system time before unix epoch")
        .as_nanos();
    std::env::temp_dir().join(format!(
        "{prefix}_{}_{}.{extension}",
        std::process::id(),
        nanos
    ))
}

/// Writes the JSON fixture as a real save archive and returns its path.
fn fixture_save(prefix: &str) -> PathBuf {
    let fixture = workspace_root().join("tests/fixtures/world_1.json");
    let text = fs::read_to_string(&fixture).expect("fixture should be readable");
    let value: Value = serde_json::from_str(&text).expect("fixture should be valid JSON");
    let doc = Document::from_value(value).expect("fixture root should be a mapping");
    let path = temp_path(prefix, "sav");
    archive::save(&doc, &path).expect("failed to write fixture save");
    path
}

#[test]
fn default_output_is_text_summary() {
    let save = fixture_save("vecedit_summary");
    let output = run_cli(&[save.to_str().expect("utf-8 path")]);
    assert!(output.status.success());

    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("VECTOR WORLD SAVE"));
    assert!(stdout.contains("Seed: 1337"));
    assert!(stdout.contains("region_phantom_plains"));

    fs::remove_file(&save).expect("failed to clean temp save");
}

#[test]
fn json_output_parses() {
    let save = fixture_save("vecedit_json");
    let output = run_cli(&["--json", save.to_str().expect("utf-8 path")]);
    assert!(output.status.success());

    let value: Value = serde_json::from_slice(&output.stdout).expect("stdout should be JSON");
    assert_eq!(value["name"], "Sanctum");
    assert_eq!(value["regions"].as_array().map(Vec::len), Some(2));

    fs::remove_file(&save).expect("failed to clean temp save");
}

#[test]
fn cell_report_for_default_region() {
    let save = fixture_save("vecedit_cell");
    let output = run_cli(&["--cell", "5,6", save.to_str().expect("utf-8 path")]);
    assert!(output.status.success());

    let stdout = String::from_utf8_lossy(&output.stdout);
    let lines: Vec<&str> = stdout.lines().collect();
    assert_eq!(
        lines,
        vec![
            "Cell 5,6",
            "Resource: Gold",
            "Building: Wall",
            "Faction: Player",
            "Health: NA",
        ]
    );

    fs::remove_file(&save).expect("failed to clean temp save");
}

#[test]
fn map_window_for_named_region() {
    let save = fixture_save("vecedit_map");
    let output = run_cli(&[
        "--map",
        "3,3,2,2",
        "--region",
        "region_phantom_plains",
        save.to_str().expect("utf-8 path"),
    ]);
    assert!(output.status.success());

    let stdout = String::from_utf8_lossy(&output.stdout);
    assert_eq!(stdout, "region_phantom_plains: x 3..4 y 3..4\n..\n.W\n");

    fs::remove_file(&save).expect("failed to clean temp save");
}

#[test]
fn tree_listing_marks_sequence_elements() {
    let save = fixture_save("vecedit_tree");
    let output = run_cli(&["--tree", save.to_str().expect("utf-8 path")]);
    assert!(output.status.success());

    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.starts_with("FileName: world_1\n"));
    assert!(stdout.contains("completedResearchTechs\n  [0]: tech_main\n"));

    fs::remove_file(&save).expect("failed to clean temp save");
}

#[test]
fn edits_require_output() {
    let save = fixture_save("vecedit_no_output");
    let output = run_cli(&["--set-name", "X", save.to_str().expect("utf-8 path")]);
    assert_eq!(output.status.code(), Some(2));
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("--output"));

    fs::remove_file(&save).expect("failed to clean temp save");
}

#[test]
fn output_requires_an_edit() {
    let save = fixture_save("vecedit_output_only");
    let out = temp_path("vecedit_output_only_out", "sav");
    let output = run_cli(&[
        "--output",
        out.to_str().expect("utf-8 path"),
        save.to_str().expect("utf-8 path"),
    ]);
    assert_eq!(output.status.code(), Some(2));
    assert!(!out.exists());

    fs::remove_file(&save).expect("failed to clean temp save");
}

#[test]
fn conflicting_views_are_rejected() {
    let save = fixture_save("vecedit_conflict");
    let output = run_cli(&["--json", "--tree", save.to_str().expect("utf-8 path")]);
    assert_eq!(output.status.code(), Some(2));

    fs::remove_file(&save).expect("failed to clean temp save");
}

#[test]
fn missing_save_exits_with_error() {
    let missing = temp_path("vecedit_missing", "sav");
    let output = run_cli(&[missing.to_str().expect("utf-8 path")]);
    assert_eq!(output.status.code(), Some(1));
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("Error opening save file"));
}

#[test]
fn header_and_bulk_edits_are_written() {
    let save = fixture_save("vecedit_edit_in");
    let out = temp_path("vecedit_edit_out", "sav");
    let output = run_cli(&[
        "--set-name",
        "Conquered",
        "--set-seed",
        "-42",
        "--set-gamemode",
        "gamemode_creative",
        "--remove-enemy-units",
        "--unlock-research",
        "--output",
        out.to_str().expect("utf-8 path"),
        save.to_str().expect("utf-8 path"),
    ]);
    assert!(
        output.status.success(),
        "stderr: {}",
        String::from_utf8_lossy(&output.stderr)
    );

    let stdout = String::from_utf8_lossy(&output.stdout);
    let lines: Vec<&str> = stdout.lines().collect();
    assert_eq!(
        lines[0],
        "remove_enemy_units: removed 3 entries, 2 regions touched"
    );
    assert!(lines[1].starts_with("unlock_all_research:"));
    assert!(lines[2].starts_with("Wrote edited save to "));

    let edited = archive::load(&out).expect("edited save should load");
    assert_eq!(edited.get_str("Name"), Ok("Conquered".to_string()));
    assert_eq!(edited.get_i64("Seed"), Ok(-42));
    assert_eq!(
        edited.get_str("GamemodeData.ID"),
        Ok("gamemode_creative".to_string())
    );
    assert_eq!(edited.get_i64("GamemodeData.Difficulty"), Ok(1));
    assert_eq!(
        edited
            .get("regions.region_phantom_plains.entities.vec_sawblade")
            .expect("sequence kept")
            .as_array()
            .map(Vec::len),
        Some(0)
    );

    fs::remove_file(&save).expect("failed to clean temp save");
    fs::remove_file(&out).expect("failed to clean edited save");
}

#[test]
fn invalid_world_time_fails_without_writing() {
    let save = fixture_save("vecedit_bad_time");
    let out = temp_path("vecedit_bad_time_out", "sav");
    let output = run_cli(&[
        "--set-world-time",
        "-5",
        "--output",
        out.to_str().expect("utf-8 path"),
        save.to_str().expect("utf-8 path"),
    ]);
    assert_eq!(output.status.code(), Some(1));
    assert!(!out.exists());

    fs::remove_file(&save).expect("failed to clean temp save");
}

#[test]
fn catalog_override_changes_unlocked_techs() {
    let save = fixture_save("vecedit_catalog_in");
    let out = temp_path("vecedit_catalog_out", "sav");
    let catalog = temp_path("vecedit_catalog", "json");
    fs::write(&catalog, r#"{"tech_ids": ["tech_main", "tech_radar"]}"#)
        .expect("failed to write catalog override");

    let output = run_cli(&[
        "--catalog",
        catalog.to_str().expect("utf-8 path"),
        "--unlock-research",
        "--output",
        out.to_str().expect("utf-8 path"),
        save.to_str().expect("utf-8 path"),
    ]);
    assert!(output.status.success());

    let edited = archive::load(&out).expect("edited save should load");
    assert_eq!(
        edited.get("completedResearchTechs"),
        Ok(&serde_json::json!(["tech_main", "tech_radar"]))
    );

    fs::remove_file(&save).expect("failed to clean temp save");
    fs::remove_file(&out).expect("failed to clean edited save");
    fs::remove_file(&catalog).expect("failed to clean catalog override");
}
