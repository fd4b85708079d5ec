//! Coordinate-keyed views over one region: resource tiles and placed buildings.
//!
//! These are caches derived from the document. Nothing invalidates them; a
//! caller that edits the document rebuilds them before trusting them again.

use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::catalog::Catalogs;
use crate::core_api::CoreError;
use crate::document::{Document, KEY_REGIONS, NodePath, absent_as_none, scalar};
use crate::entity::{Entity, EntitySummary, describe_entity, display_name, short_label};

/// World units per grid cell.
pub const GRID_DIVISOR: f64 = 5.0;
/// Side of the square grid the map displays, in cells.
pub const MAP_EXTENT: i64 = 480;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct GridCell {
    pub x: i64,
    pub y: i64,
}

impl GridCell {
    pub fn new(x: i64, y: i64) -> Self {
        Self { x, y }
    }

    /// Floor division of a world position by [`GRID_DIVISOR`]; negative
    /// positions round towards negative infinity, not towards zero.
    pub fn from_world(pos_x: f64, pos_y: f64) -> Self {
        Self {
            x: pos_x.div_euclid(GRID_DIVISOR) as i64,
            y: pos_y.div_euclid(GRID_DIVISOR) as i64,
        }
    }

    /// Cells on or left/above the zero lines are treated as off-map.
    pub fn is_indexable(&self) -> bool {
        self.x > 0 && self.y > 0
    }

    pub fn is_on_map(&self) -> bool {
        (0..MAP_EXTENT).contains(&self.x) && (0..MAP_EXTENT).contains(&self.y)
    }
}

impl fmt::Display for GridCell {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{},{}", self.x, self.y)
    }
}

impl FromStr for GridCell {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (x, y) = s
            .split_once(',')
            .ok_or_else(|| format!("invalid cell '{s}', expected X,Y"))?;
        let x = x
            .trim()
            .parse()
            .map_err(|_| format!("invalid cell x coordinate '{x}'"))?;
        let y = y
            .trim()
            .parse()
            .map_err(|_| format!("invalid cell y coordinate '{y}'"))?;
        Ok(Self { x, y })
    }
}

pub type ResourceIndex = BTreeMap<GridCell, String>;
pub type EntityIndex = BTreeMap<GridCell, Entity>;

fn region_path(region_id: &str, table: &str) -> NodePath {
    NodePath::root().key(KEY_REGIONS).key(region_id).key(table)
}

/// Flattens `regions.<region>.resources` into tile -> resource type id.
/// Tile coordinates are used as stored; a missing region yields an empty index.
pub fn build_resource_index(
    document: &Document,
    region_id: &str,
) -> Result<ResourceIndex, CoreError> {
    let path = region_path(region_id, "resources");
    let mut index = ResourceIndex::new();
    let Some(Value::Object(resources)) = absent_as_none(document.get(&path))? else {
        return Ok(index);
    };

    for (resource_id, tiles) in resources {
        let Some(tiles) = tiles.as_array() else {
            continue;
        };
        for (i, tile) in tiles.iter().enumerate() {
            let (Some(x), Some(y)) = (tile.get("X"), tile.get("Y")) else {
                continue;
            };
            let tile_path = path.clone().key(resource_id.clone()).index(i);
            let x = scalar::to_i64(x, &tile_path.clone().key("X"))?;
            let y = scalar::to_i64(y, &tile_path.key("Y"))?;
            index.insert(GridCell::new(x, y), resource_id.clone());
        }
    }

    tracing::debug!(
        target: "vecedit::spatial",
        region = region_id,
        cells = index.len(),
        "resource_index.built"
    );
    Ok(index)
}

/// Places every entity whose type is not excluded into its grid cell.
///
/// Entities whose cell has `x <= 0` or `y <= 0` are left out. When two
/// entities land in the same cell, the one listed last wins.
pub fn build_entity_index(
    document: &Document,
    region_id: &str,
    excluded_type_ids: &[&str],
) -> Result<EntityIndex, CoreError> {
    let path = region_path(region_id, "entities");
    let mut index = EntityIndex::new();
    let Some(Value::Object(entities)) = absent_as_none(document.get(&path))? else {
        return Ok(index);
    };

    let mut skipped = 0usize;
    for (type_id, instances) in entities {
        if excluded_type_ids.contains(&type_id.as_str()) {
            continue;
        }
        let Some(instances) = instances.as_array() else {
            continue;
        };
        for record in instances {
            let entity = Entity::new(type_id.clone(), record.clone());
            let Some((pos_x, pos_y)) = entity.position()? else {
                skipped += 1;
                continue;
            };
            let cell = GridCell::from_world(pos_x, pos_y);
            if !cell.is_indexable() {
                skipped += 1;
                continue;
            }
            index.insert(cell, entity);
        }
    }

    tracing::debug!(
        target: "vecedit::spatial",
        region = region_id,
        cells = index.len(),
        skipped,
        "entity_index.built"
    );
    Ok(index)
}

/// Both views for one region, built together.
#[derive(Debug, Clone, PartialEq)]
pub struct SpatialIndexes {
    pub region_id: String,
    pub resources: ResourceIndex,
    pub entities: EntityIndex,
}

impl SpatialIndexes {
    pub fn build(
        document: &Document,
        region_id: &str,
        catalogs: &Catalogs,
    ) -> Result<Self, CoreError> {
        let excluded = catalogs.map_excluded_type_ids();
        Ok(Self {
            region_id: region_id.to_string(),
            resources: build_resource_index(document, region_id)?,
            entities: build_entity_index(document, region_id, &excluded)?,
        })
    }

    pub fn resource_at(&self, cell: GridCell) -> Option<&str> {
        self.resources.get(&cell).map(String::as_str)
    }

    pub fn entity_at(&self, cell: GridCell) -> Option<&Entity> {
        self.entities.get(&cell)
    }

    pub fn describe_cell(&self, cell: GridCell) -> Result<CellReport, CoreError> {
        describe_cell(&self.resources, &self.entities, cell)
    }
}

/// Everything the map panel shows for one selected cell.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CellReport {
    pub cell: GridCell,
    pub coords: String,
    pub resource: String,
    pub building: String,
    pub faction: String,
    pub health: String,
    pub summary: EntitySummary,
}

pub fn describe_cell(
    resources: &ResourceIndex,
    entities: &EntityIndex,
    cell: GridCell,
) -> Result<CellReport, CoreError> {
    let resource = match resources.get(&cell) {
        Some(resource_id) => format!("Resource: {}", short_label(resource_id)),
        None => "No resource selected".to_string(),
    };

    let mut report = CellReport {
        cell,
        coords: cell.to_string(),
        resource,
        building: "No building selected".to_string(),
        faction: String::new(),
        health: String::new(),
        summary: EntitySummary::default(),
    };

    let Some(entity) = entities.get(&cell) else {
        return Ok(report);
    };
    let entity_id = entity.entity_id().unwrap_or(entity.type_id());
    report.building = format!("Building: {}", display_name(entity_id));
    report.faction = format!(
        "Faction: {}",
        entity.faction_id().map(short_label).unwrap_or_default()
    );
    report.health = "Health: NA".to_string();
    report.summary = describe_entity(entity)?;
    Ok(report)
}

#[cfg(test)]
mod tests {
    use super::GridCell;

    #[test]
    fn from_world_floors_negative_positions() {
        assert_eq!(GridCell::from_world(-0.5, 4.9), GridCell::new(-1, 0));
        assert_eq!(GridCell::from_world(-5.0, -5.1), GridCell::new(-1, -2));
        assert_eq!(GridCell::from_world(27.0, 33.0), GridCell::new(5, 6));
    }

    #[test]
    fn parses_cell_text() {
        assert_eq!("12, 40".parse::<GridCell>(), Ok(GridCell::new(12, 40)));
        assert!("12".parse::<GridCell>().is_err());
        assert!("a,b".parse::<GridCell>().is_err());
    }

    #[test]
    fn map_extent_bounds_display_only() {
        assert!(GridCell::new(0, 479).is_on_map());
        assert!(!GridCell::new(480, 10).is_on_map());
        assert!(!GridCell::new(0, 10).is_indexable());
    }
}
