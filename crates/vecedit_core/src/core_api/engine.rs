use std::path::Path;

use serde_json::Value;

use crate::archive;
use crate::catalog::Catalogs;
use crate::document::{
    Document, KEY_ACTIVE_REGION, KEY_COMPLETED_RESEARCH_TECHS, KEY_DESCRIPTION,
    KEY_FILE_NAME, KEY_GAMEMODE_ID, KEY_NAME, KEY_REGIONS, KEY_RESEARCH_TECH_RESOURCES, KEY_SEED,
    KEY_VERSION, KEY_WORLD_TIME, NodePath, TreeNode, absent_as_none,
};
use crate::mutations::{Mutation, MutationReport};
use crate::spatial::{CellReport, GridCell, SpatialIndexes};

use super::error::{CoreError, CoreErrorCode};
use super::types::{RegionOverview, ResearchProgress, SaveHeader};

#[derive(Debug, Default, Clone)]
pub struct Engine {
    catalogs: Catalogs,
}

/// One open save. Owns the document; every query and edit goes through it.
///
/// The spatial indexes are built on request and are not refreshed by edits.
#[derive(Debug)]
pub struct Session {
    document: Document,
    catalogs: Catalogs,
    indexes: Option<SpatialIndexes>,
}

impl Engine {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_catalogs(catalogs: Catalogs) -> Self {
        Self { catalogs }
    }

    pub fn catalogs(&self) -> &Catalogs {
        &self.catalogs
    }

    pub fn open_bytes<B: AsRef<[u8]>>(&self, bytes: B) -> Result<Session, CoreError> {
        let document = archive::decode(bytes.as_ref())?;
        Ok(self.open_document(document))
    }

    pub fn open_path(&self, path: &Path) -> Result<Session, CoreError> {
        let document = archive::load(path)?;
        tracing::info!(
            target: "vecedit::session",
            path = %path.display(),
            "session.opened"
        );
        Ok(self.open_document(document))
    }

    pub fn open_document(&self, document: Document) -> Session {
        Session {
            document,
            catalogs: self.catalogs.clone(),
            indexes: None,
        }
    }
}

impl Session {
    pub fn document(&self) -> &Document {
        &self.document
    }

    /// Direct access for structural edits. Rebuild the indexes afterwards.
    pub fn document_mut(&mut self) -> &mut Document {
        &mut self.document
    }

    pub fn into_document(self) -> Document {
        self.document
    }

    pub fn catalogs(&self) -> &Catalogs {
        &self.catalogs
    }

    pub fn header(&self) -> Result<SaveHeader, CoreError> {
        let doc = &self.document;
        Ok(SaveHeader {
            file_name: absent_as_none(doc.get_str(KEY_FILE_NAME))?,
            name: absent_as_none(doc.get_str(KEY_NAME))?,
            description: absent_as_none(doc.get_str(KEY_DESCRIPTION))?,
            version: absent_as_none(doc.get_str(KEY_VERSION))?,
            world_time: absent_as_none(doc.get_f64(KEY_WORLD_TIME))?,
            seed: absent_as_none(doc.get_i64(KEY_SEED))?,
            gamemode_id: absent_as_none(doc.get_str(KEY_GAMEMODE_ID))?,
            active_region: absent_as_none(doc.get_str(KEY_ACTIVE_REGION))?,
        })
    }

    /// Region ids present in the document, in document order.
    pub fn regions_present(&self) -> Vec<String> {
        match self.document.get(KEY_REGIONS) {
            Ok(Value::Object(regions)) => regions.keys().cloned().collect(),
            _ => Vec::new(),
        }
    }

    pub fn region_overviews(&self) -> Vec<RegionOverview> {
        self.regions_present()
            .into_iter()
            .map(|region_id| self.region_overview(region_id))
            .collect()
    }

    fn region_overview(&self, region_id: String) -> RegionOverview {
        let region = NodePath::root().key(KEY_REGIONS).key(region_id.clone());
        let table = |name: &str| match self.document.get(region.clone().key(name)) {
            Ok(Value::Object(map)) => map
                .values()
                .filter_map(Value::as_array)
                .collect::<Vec<_>>(),
            _ => Vec::new(),
        };

        let entity_lists = table("entities");
        let hostile = Some(self.catalogs.hostile_faction_id.as_str());
        RegionOverview {
            entity_types: entity_lists.len(),
            entities: entity_lists.iter().map(|list| list.len()).sum(),
            hostile_entities: entity_lists
                .iter()
                .flat_map(|list| list.iter())
                .filter(|e| e.get("FactionID").and_then(Value::as_str) == hostile)
                .count(),
            resource_tiles: table("resources").iter().map(|list| list.len()).sum(),
            world_features: table("worldFeatures").iter().map(|list| list.len()).sum(),
            region_id,
        }
    }

    pub fn research_progress(&self) -> ResearchProgress {
        let len_of = |key: &str| {
            self.document
                .get(key)
                .ok()
                .and_then(Value::as_array)
                .map_or(0, Vec::len)
        };
        ResearchProgress {
            completed: len_of(KEY_COMPLETED_RESEARCH_TECHS),
            in_progress: len_of(KEY_RESEARCH_TECH_RESOURCES),
            catalog_size: self.catalogs.tech_ids.len(),
        }
    }

    pub fn set_file_name(&mut self, file_name: &str) -> Result<(), CoreError> {
        self.set_header_field(KEY_FILE_NAME, Value::from(file_name), "file name")
    }

    pub fn set_name(&mut self, name: &str) -> Result<(), CoreError> {
        self.set_header_field(KEY_NAME, Value::from(name), "name")
    }

    pub fn set_description(&mut self, description: &str) -> Result<(), CoreError> {
        self.set_header_field(KEY_DESCRIPTION, Value::from(description), "description")
    }

    pub fn set_version(&mut self, version: &str) -> Result<(), CoreError> {
        self.set_header_field(KEY_VERSION, Value::from(version), "version")
    }

    pub fn set_world_time(&mut self, seconds: f64) -> Result<(), CoreError> {
        if !seconds.is_finite() || seconds < 0.0 {
            return Err(CoreError::new(
                CoreErrorCode::Validation,
                format!("invalid world time {seconds}, expected a non-negative number of seconds"),
            ));
        }
        self.set_header_field(KEY_WORLD_TIME, Value::from(seconds), "world time")
    }

    pub fn set_seed(&mut self, seed: i64) -> Result<(), CoreError> {
        self.set_header_field(KEY_SEED, Value::from(seed), "seed")
    }

    pub fn set_gamemode(&mut self, gamemode_id: &str) -> Result<(), CoreError> {
        self.set_header_field(KEY_GAMEMODE_ID, Value::from(gamemode_id), "gamemode")
    }

    pub fn set_active_region(&mut self, region_id: &str) -> Result<(), CoreError> {
        self.set_header_field(KEY_ACTIVE_REGION, Value::from(region_id), "active region")
    }

    fn set_header_field(&mut self, key: &str, value: Value, what: &str) -> Result<(), CoreError> {
        self.document
            .set(key, value)
            .map_err(|e| CoreError::new(e.code, format!("failed to set {what}: {}", e.message)))
    }

    pub fn apply(&mut self, mutation: Mutation) -> Result<MutationReport, CoreError> {
        mutation.apply(&mut self.document, &self.catalogs)
    }

    pub fn remove_enemy_units(&mut self) -> Result<MutationReport, CoreError> {
        self.apply(Mutation::RemoveEnemyUnits)
    }

    pub fn remove_enemy_buildings(&mut self) -> Result<MutationReport, CoreError> {
        self.apply(Mutation::RemoveEnemyBuildings)
    }

    pub fn unlock_all_research(&mut self) -> Result<MutationReport, CoreError> {
        self.apply(Mutation::UnlockAllResearch)
    }

    pub fn remove_all_decryptors(&mut self) -> Result<MutationReport, CoreError> {
        self.apply(Mutation::RemoveAllDecryptors)
    }

    pub fn rebuild_indexes(&mut self, region_id: &str) -> Result<&SpatialIndexes, CoreError> {
        let indexes = SpatialIndexes::build(&self.document, region_id, &self.catalogs)?;
        Ok(&*self.indexes.insert(indexes))
    }

    /// The indexes from the last [`Session::rebuild_indexes`], which may
    /// predate later edits.
    pub fn indexes(&self) -> Option<&SpatialIndexes> {
        self.indexes.as_ref()
    }

    pub fn describe_cell(&self, cell: GridCell) -> Result<CellReport, CoreError> {
        let indexes = self.indexes.as_ref().ok_or_else(|| {
            CoreError::new(
                CoreErrorCode::Absent,
                "spatial indexes have not been built for this session",
            )
        })?;
        indexes.describe_cell(cell)
    }

    pub fn to_tree(&self) -> Vec<TreeNode> {
        self.document.to_tree()
    }

    /// Replaces the whole document with one rebuilt from a tree edit.
    /// Scalars arrive as text and are re-typed when read.
    pub fn replace_from_tree(&mut self, nodes: &[TreeNode]) {
        self.document = Document::from_tree(nodes);
        tracing::debug!(
            target: "vecedit::session",
            top_level_keys = self.document.root().len(),
            "document.replaced_from_tree"
        );
    }

    pub fn to_json_pretty(&self) -> Result<Vec<u8>, CoreError> {
        archive::to_json_pretty(&self.document)
    }

    pub fn to_bytes(&self) -> Result<Vec<u8>, CoreError> {
        archive::encode(&self.document)
    }

    pub fn save(&self, path: &Path) -> Result<(), CoreError> {
        archive::save(&self.document, path)
    }
}
