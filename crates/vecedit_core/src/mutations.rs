//! Catalog-driven bulk edits.
//!
//! Every edit replaces whole sequences, so running it twice changes nothing
//! the second time. A region or type id missing from the document is skipped.

use serde::Serialize;
use serde_json::Value;

use crate::catalog::Catalogs;
use crate::core_api::CoreError;
use crate::document::{
    Document, KEY_COMPLETED_RESEARCH_TECHS, KEY_REGIONS, KEY_RESEARCH_TECH_RESOURCES, NodePath,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Mutation {
    RemoveEnemyUnits,
    RemoveEnemyBuildings,
    UnlockAllResearch,
    RemoveAllDecryptors,
}

impl Mutation {
    pub const ALL: [Mutation; 4] = [
        Mutation::RemoveEnemyUnits,
        Mutation::RemoveEnemyBuildings,
        Mutation::UnlockAllResearch,
        Mutation::RemoveAllDecryptors,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::RemoveEnemyUnits => "remove_enemy_units",
            Self::RemoveEnemyBuildings => "remove_enemy_buildings",
            Self::UnlockAllResearch => "unlock_all_research",
            Self::RemoveAllDecryptors => "remove_all_decryptors",
        }
    }

    pub fn apply(
        self,
        document: &mut Document,
        catalogs: &Catalogs,
    ) -> Result<MutationReport, CoreError> {
        let report = match self {
            Self::RemoveEnemyUnits => remove_enemy_units(document, catalogs),
            Self::RemoveEnemyBuildings => remove_enemy_buildings(document, catalogs),
            Self::UnlockAllResearch => unlock_all_research(document, catalogs)?,
            Self::RemoveAllDecryptors => remove_all_decryptors(document, catalogs),
        };
        tracing::info!(
            target: "vecedit::mutations",
            mutation = self.as_str(),
            regions_touched = report.regions_touched,
            entries_removed = report.entries_removed,
            "mutation.applied"
        );
        Ok(report)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct MutationReport {
    pub mutation: Mutation,
    pub regions_touched: usize,
    pub entries_removed: usize,
}

impl MutationReport {
    fn new(mutation: Mutation) -> Self {
        Self {
            mutation,
            regions_touched: 0,
            entries_removed: 0,
        }
    }
}

/// Drops hostile-faction instances of every unit type, in every known region.
pub fn remove_enemy_units(document: &mut Document, catalogs: &Catalogs) -> MutationReport {
    let mut report = MutationReport::new(Mutation::RemoveEnemyUnits);
    for region_id in &catalogs.region_ids {
        let removed = retain_non_hostile(
            document,
            region_id,
            &catalogs.unit_type_ids,
            &catalogs.hostile_faction_id,
        );
        if let Some(removed) = removed {
            report.regions_touched += 1;
            report.entries_removed += removed;
        }
    }
    report
}

/// Drops hostile-faction instances of every building type in the primary
/// region only; other regions keep their enemy buildings.
pub fn remove_enemy_buildings(document: &mut Document, catalogs: &Catalogs) -> MutationReport {
    let mut report = MutationReport::new(Mutation::RemoveEnemyBuildings);
    if let Some(removed) = retain_non_hostile(
        document,
        &catalogs.primary_region_id,
        &catalogs.building_type_ids,
        &catalogs.hostile_faction_id,
    ) {
        report.regions_touched = 1;
        report.entries_removed = removed;
    }
    report
}

/// Clears the in-progress research and marks the whole tech catalog complete,
/// in catalog order.
pub fn unlock_all_research(
    document: &mut Document,
    catalogs: &Catalogs,
) -> Result<MutationReport, CoreError> {
    let mut report = MutationReport::new(Mutation::UnlockAllResearch);
    report.entries_removed = document
        .get(KEY_RESEARCH_TECH_RESOURCES)
        .ok()
        .and_then(Value::as_array)
        .map_or(0, Vec::len);

    document.set(KEY_RESEARCH_TECH_RESOURCES, Value::Array(Vec::new()))?;
    document.set(
        KEY_COMPLETED_RESEARCH_TECHS,
        Value::Array(
            catalogs
                .tech_ids
                .iter()
                .map(|id| Value::String(id.clone()))
                .collect(),
        ),
    )?;
    Ok(report)
}

/// Empties the decryptor world-feature list in every known region that has one.
pub fn remove_all_decryptors(document: &mut Document, catalogs: &Catalogs) -> MutationReport {
    let mut report = MutationReport::new(Mutation::RemoveAllDecryptors);
    for region_id in &catalogs.region_ids {
        let path = NodePath::root()
            .key(KEY_REGIONS)
            .key(region_id.clone())
            .key("worldFeatures")
            .key(catalogs.decryptor_feature_id.clone());
        let Ok(features) = document.get_mut(&path) else {
            continue;
        };
        report.regions_touched += 1;
        report.entries_removed += features.as_array().map_or(0, Vec::len);
        *features = Value::Array(Vec::new());
    }
    report
}

/// Filters each listed type's sequence in one region down to the entries
/// whose `FactionID` is not hostile. Returns `None` when the region has no
/// `entities` mapping.
fn retain_non_hostile(
    document: &mut Document,
    region_id: &str,
    type_ids: &[String],
    hostile_faction_id: &str,
) -> Option<usize> {
    let path = NodePath::root()
        .key(KEY_REGIONS)
        .key(region_id)
        .key("entities");
    let entities = document.get_mut(&path).ok()?.as_object_mut()?;

    let mut removed = 0;
    for type_id in type_ids {
        let Some(Value::Array(instances)) = entities.get_mut(type_id) else {
            continue;
        };
        let before = instances.len();
        instances.retain(|entity| {
            entity.get("FactionID").and_then(Value::as_str) != Some(hostile_faction_id)
        });
        removed += before - instances.len();
    }
    Some(removed)
}
