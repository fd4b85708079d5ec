use std::fmt::Write as _;

use serde_json::{Map as JsonMap, Value as JsonValue};
use vecedit_core::core_api::{CoreError, RegionOverview, ResearchProgress, SaveHeader, Session};
use vecedit_core::document::TreeNode;
use vecedit_core::entity::{display_name, short_label};
use vecedit_core::mutations::MutationReport;
use vecedit_core::spatial::{CellReport, GridCell, MAP_EXTENT, SpatialIndexes};

const SHEET_WIDTH: usize = 76;
const LEFT_COL_WIDTH: usize = 34;
const REGION_COL_WIDTH: usize = 26;
const MISSING_VALUE: &str = "-";
const EMPTY_CELL_GLYPH: char = '.';
const TREE_INDENT: &str = "  ";

pub fn render_json_summary(session: &Session) -> Result<JsonValue, CoreError> {
    let header = session.header()?;
    let mut out = header_json(&header);
    out.insert(
        "regions".to_string(),
        JsonValue::Array(
            session
                .region_overviews()
                .iter()
                .map(region_to_json)
                .collect(),
        ),
    );
    out.insert(
        "research".to_string(),
        research_to_json(&session.research_progress()),
    );
    Ok(JsonValue::Object(out))
}

fn header_json(header: &SaveHeader) -> JsonMap<String, JsonValue> {
    let mut out = JsonMap::new();
    out.insert("file_name".to_string(), optional_string(&header.file_name));
    out.insert("name".to_string(), optional_string(&header.name));
    out.insert(
        "description".to_string(),
        optional_string(&header.description),
    );
    out.insert("version".to_string(), optional_string(&header.version));
    out.insert(
        "world_time".to_string(),
        header.world_time.map_or(JsonValue::Null, JsonValue::from),
    );
    out.insert(
        "seed".to_string(),
        header.seed.map_or(JsonValue::Null, JsonValue::from),
    );
    out.insert("gamemode".to_string(), optional_string(&header.gamemode_id));
    out.insert(
        "active_region".to_string(),
        optional_string(&header.active_region),
    );
    out
}

fn optional_string(value: &Option<String>) -> JsonValue {
    match value {
        Some(v) => JsonValue::String(v.clone()),
        None => JsonValue::Null,
    }
}

fn region_to_json(region: &RegionOverview) -> JsonValue {
    let mut m = JsonMap::new();
    m.insert(
        "region_id".to_string(),
        JsonValue::String(region.region_id.clone()),
    );
    m.insert(
        "entity_types".to_string(),
        JsonValue::from(region.entity_types),
    );
    m.insert("entities".to_string(), JsonValue::from(region.entities));
    m.insert(
        "hostile_entities".to_string(),
        JsonValue::from(region.hostile_entities),
    );
    m.insert(
        "resource_tiles".to_string(),
        JsonValue::from(region.resource_tiles),
    );
    m.insert(
        "world_features".to_string(),
        JsonValue::from(region.world_features),
    );
    JsonValue::Object(m)
}

fn research_to_json(research: &ResearchProgress) -> JsonValue {
    let mut m = JsonMap::new();
    m.insert("completed".to_string(), JsonValue::from(research.completed));
    m.insert(
        "in_progress".to_string(),
        JsonValue::from(research.in_progress),
    );
    m.insert(
        "catalog_size".to_string(),
        JsonValue::from(research.catalog_size),
    );
    JsonValue::Object(m)
}

pub fn render_text_summary(session: &Session) -> Result<String, CoreError> {
    let header = session.header()?;
    let text = |value: &Option<String>| value.clone().unwrap_or_else(|| MISSING_VALUE.to_string());

    let mut out = String::new();
    writeln!(&mut out).expect("writing to String cannot fail");
    writeln!(
        &mut out,
        "{}",
        centered_no_trailing("VECTOR WORLD SAVE", SHEET_WIDTH)
    )
    .expect("writing to String cannot fail");
    writeln!(
        &mut out,
        "{}",
        centered_no_trailing(&text(&header.name), SHEET_WIDTH)
    )
    .expect("writing to String cannot fail");
    writeln!(&mut out).expect("writing to String cannot fail");

    let rows = [
        (
            format!("File: {}", text(&header.file_name)),
            format!("Version: {}", text(&header.version)),
        ),
        (
            format!(
                "Seed: {}",
                header
                    .seed
                    .map_or_else(|| MISSING_VALUE.to_string(), |s| s.to_string())
            ),
            format!(
                "World Time: {}",
                header
                    .world_time
                    .map_or_else(|| MISSING_VALUE.to_string(), format_world_time)
            ),
        ),
        (
            format!("Gamemode: {}", text(&header.gamemode_id)),
            format!("Active Region: {}", text(&header.active_region)),
        ),
    ];
    for (left, right) in rows {
        writeln!(
            &mut out,
            "  {}{}",
            pad_column(&left, LEFT_COL_WIDTH),
            right
        )
        .expect("writing to String cannot fail");
    }
    writeln!(&mut out, "  Description: {}", text(&header.description))
        .expect("writing to String cannot fail");
    writeln!(&mut out).expect("writing to String cannot fail");

    writeln!(&mut out, " ::: Regions :::").expect("writing to String cannot fail");
    let regions = session.region_overviews();
    if regions.is_empty() {
        writeln!(&mut out, "  (none)").expect("writing to String cannot fail");
    }
    for region in &regions {
        writeln!(
            &mut out,
            "  {}entities {} ({} hostile)  types {}  resources {}  features {}",
            pad_column(&region.region_id, REGION_COL_WIDTH),
            region.entities,
            region.hostile_entities,
            region.entity_types,
            region.resource_tiles,
            region.world_features,
        )
        .expect("writing to String cannot fail");
    }
    writeln!(&mut out).expect("writing to String cannot fail");

    let research = session.research_progress();
    writeln!(&mut out, " ::: Research :::").expect("writing to String cannot fail");
    writeln!(
        &mut out,
        "  Completed: {} of {}   In progress: {}",
        research.completed, research.catalog_size, research.in_progress
    )
    .expect("writing to String cannot fail");

    Ok(out)
}

/// The panel text for one selected cell, one label per line. Blank summary
/// lines are left out.
pub fn render_cell_report(report: &CellReport) -> String {
    let mut out = String::new();
    writeln!(&mut out, "Cell {}", report.coords).expect("writing to String cannot fail");
    for line in [
        &report.resource,
        &report.building,
        &report.faction,
        &report.health,
    ]
    .into_iter()
    .chain(report.summary.lines.iter())
    .filter(|line| !line.is_empty())
    {
        writeln!(&mut out, "{line}").expect("writing to String cannot fail");
    }
    out
}

/// ASCII view of a window of the grid, one row per `y`. Resources show as a
/// lowercase letter, entities as an uppercase letter drawn over them. The
/// window is clipped to the displayable grid.
pub fn render_map_window(
    indexes: &SpatialIndexes,
    origin: GridCell,
    width: i64,
    height: i64,
) -> String {
    let x_range = origin.x.max(0)..origin.x.saturating_add(width).min(MAP_EXTENT);
    let y_range = origin.y.max(0)..origin.y.saturating_add(height).min(MAP_EXTENT);

    let mut out = String::new();
    if x_range.is_empty() || y_range.is_empty() {
        writeln!(
            &mut out,
            "{}: window {},{} {}x{} is off the map",
            indexes.region_id, origin.x, origin.y, width, height
        )
        .expect("writing to String cannot fail");
        return out;
    }

    writeln!(
        &mut out,
        "{}: x {}..{} y {}..{}",
        indexes.region_id,
        x_range.start,
        x_range.end - 1,
        y_range.start,
        y_range.end - 1
    )
    .expect("writing to String cannot fail");
    for y in y_range {
        let row: String = x_range
            .clone()
            .map(|x| cell_glyph(indexes, GridCell::new(x, y)))
            .collect();
        writeln!(&mut out, "{row}").expect("writing to String cannot fail");
    }
    out
}

fn cell_glyph(indexes: &SpatialIndexes, cell: GridCell) -> char {
    if let Some(entity) = indexes.entity_at(cell) {
        let name = display_name(entity.entity_id().unwrap_or(entity.type_id()));
        return first_letter(&name).map_or('?', |c| c.to_ascii_uppercase());
    }
    if let Some(resource_id) = indexes.resource_at(cell) {
        return first_letter(&short_label(resource_id)).map_or('?', |c| c.to_ascii_lowercase());
    }
    EMPTY_CELL_GLYPH
}

fn first_letter(text: &str) -> Option<char> {
    text.chars().find(|c| c.is_ascii_alphabetic())
}

/// Indented listing of a tree view: `key: text` for scalars, the bare key
/// for mappings and sequences.
pub fn render_tree(nodes: &[TreeNode]) -> String {
    let mut out = String::new();
    write_tree_nodes(&mut out, nodes, 0);
    out
}

fn write_tree_nodes(out: &mut String, nodes: &[TreeNode], depth: usize) {
    let indent = TREE_INDENT.repeat(depth);
    for node in nodes {
        match &node.text {
            Some(text) if node.children.is_empty() => {
                writeln!(out, "{indent}{}: {text}", node.key)
                    .expect("writing to String cannot fail");
            }
            _ => {
                writeln!(out, "{indent}{}", node.key).expect("writing to String cannot fail");
                write_tree_nodes(out, &node.children, depth + 1);
            }
        }
    }
}

pub fn render_mutation_report(report: &MutationReport) -> String {
    format!(
        "{}: removed {} entries, {} regions touched",
        report.mutation.as_str(),
        report.entries_removed,
        report.regions_touched
    )
}

fn pad_column(value: &str, width: usize) -> String {
    format!("{:<width$}", fit_column(value, width.saturating_sub(1)))
}

fn fit_column(value: &str, width: usize) -> String {
    if value.chars().count() <= width {
        return value.to_string();
    }
    if width <= 3 {
        return value.chars().take(width).collect();
    }

    let mut out: String = value.chars().take(width - 3).collect();
    out.push_str("...");
    out
}

fn centered_no_trailing(value: &str, width: usize) -> String {
    let len = value.chars().count();
    if len >= width {
        return value.to_string();
    }

    let left_padding = (width - len) / 2;
    format!("{}{}", " ".repeat(left_padding), value)
}

/// Seconds of world time as `HH:MM:SS`; hours are not wrapped at 24.
fn format_world_time(seconds: f64) -> String {
    let total = seconds.max(0.0) as u64;
    format!(
        "{:02}:{:02}:{:02}",
        total / 3600,
        (total / 60) % 60,
        total % 60
    )
}
