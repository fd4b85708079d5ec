use serde::{Deserialize, Serialize};

/// The save's top-level metadata, as the editor's form shows it.
/// `None` means the key is not in the document.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SaveHeader {
    pub file_name: Option<String>,
    pub name: Option<String>,
    pub description: Option<String>,
    pub version: Option<String>,
    pub world_time: Option<f64>,
    pub seed: Option<i64>,
    pub gamemode_id: Option<String>,
    pub active_region: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RegionOverview {
    pub region_id: String,
    pub entity_types: usize,
    pub entities: usize,
    pub hostile_entities: usize,
    pub resource_tiles: usize,
    pub world_features: usize,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ResearchProgress {
    pub completed: usize,
    pub in_progress: usize,
    pub catalog_size: usize,
}
