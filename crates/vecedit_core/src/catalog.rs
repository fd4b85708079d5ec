//! Static catalogs the bulk edits work from.
//!
//! None of these lists are derived from the save: the game does not record
//! which entity types are units or which techs exist, so the editor carries
//! them. A JSON file can override any field; missing fields keep the builtin
//! values.

use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::core_api::{CoreError, CoreErrorCode};

pub const HOSTILE_FACTION_ID: &str = "faction_redscar";
pub const REGION_THE_ABYSS: &str = "region_the_abyss";
pub const REGION_PHANTOM_PLAINS: &str = "region_phantom_plains";
pub const DECRYPTOR_FEATURE_ID: &str = "vec_decryptor";

pub const UNIT_TYPE_IDS: &[&str] = &[
    "vec_sawblade",
    "vec_triangle",
    "vec_fighter",
    "vec_bomber",
    "vec_carrier",
    "vec_hammerhead",
];

/// Drones and projectiles: placed like entities but never shown on the map.
pub const DRONE_TYPE_IDS: &[&str] = &[
    "vec_cargo_drone",
    "vec_builder_drone",
    "vec_courier_drone",
    "vec_fabricator_drone",
    "vec_dark_builder_drone",
    "vec_bullet",
];

pub const BUILDING_TYPE_IDS: &[&str] = &[
    "vec_storage",
    "vec_wall",
    "vec_reclaimer",
    "vec_builder_port",
    "vec_barrier",
    "vec_cargo_drone",
    "vec_cargo_port",
    "vec_shotgunner",
    "vec_foundry",
    "vec_node_reactor",
    "vec_builder_drone",
    "vec_sweeper",
    "vec_ranger",
    "vec_collector",
    "vec_depot",
    "vec_liquidator",
    "vec_manufacturer",
    "vec_laborator",
    "vec_buffer",
    "vec_repeater",
    "vec_basic_core",
    "vec_hive_core",
    "vec_hive_cell",
    "vec_core_assembler",
    "vec_artillery",
    "vec_ammo_forge",
    "vec_bullet_shield",
    "vec_pulsar",
    "vec_generator",
];

// Order matters: it becomes the order of `completedResearchTechs`.
// `tech_abyss_fragment` is listed twice and kept that way.
pub const TECH_IDS: &[&str] = &[
    "tech_main",
    "tech_cargo_port",
    "tech_collector",
    "tech_gilded_crystal",
    "tech_gold",
    "tech_laboratory",
    "tech_liquid_essence",
    "tech_storage",
    "tech_foundry",
    "tech_liquidator",
    "tech_sweeper",
    "tech_redeemer",
    "tech_manufacturer",
    "tech_ammo_forge",
    "tech_core_assembler",
    "tech_artillery",
    "tech_striker",
    "tech_depot",
    "tech_phantom_core",
    "tech_arcana_steel",
    "tech_pulsar",
    "tech_essence",
    "tech_repeater",
    "tech_builder_port",
    "tech_crystallite",
    "tech_node_reactor",
    "tech_ranger",
    "tech_reclaimer",
    "tech_shotgunner",
    "tech_wall",
    "tech_glimmering_gem",
    "tech_plasma_round",
    "tech_artillery_shell",
    "tech_ether_shard",
    "tech_buffer",
    "tech_filter",
    "tech_lumina",
    "tech_arcanium_battery",
    "tech_barrier",
    "tech_liquid_lumina",
    "tech_iridium",
    "tech_reactive_cellite",
    "tech_kinetic_cellite",
    "tech_nitrium",
    "tech_driller",
    "tech_celite",
    "tech_generator",
    "tech_beacon",
    "tech_bullet_shield",
    "tech_decorations",
    "tech_courier_port",
    "tech_fabricator_port",
    "tech_enforced_tile",
    "tech_caution_tile",
    "tech_circular_tile",
    "tech_basic_missile",
    "tech_plains_gateway",
    "tech_phantom_tech",
    "tech_abyss_gateway",
    "tech_frigid_gateway",
    "tech_liquid_nitrium",
    "tech_arcana_battery",
    "tech_illuminator",
    "tech_spotter",
    "tech_phantomite_fragment",
    "tech_alcheminium",
    "tech_voidstone",
    "tech_osmium",
    "tech_reanimated_shard",
    "tech_tesla",
    "tech_phantom_lab",
    "tech_alchemized_iridium",
    "tech_gargoyle",
    "tech_alchemator",
    "tech_abyss_fragment",
    "tech_abyss_fragment",
    "tech_dark_gold",
    "tech_dark_builder_port",
    "tech_atomizer",
    "tech_energy_wall",
    "tech_alchemized_nitrium",
    "tech_shaded_gem",
    "tech_abyss_core",
    "tech_alchemized_crystallite",
    "tech_radar",
    "tech_orbitar",
    "tech_scyther",
];

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Catalogs {
    pub hostile_faction_id: String,
    /// The only region enemy buildings are removed from.
    pub primary_region_id: String,
    pub region_ids: Vec<String>,
    pub unit_type_ids: Vec<String>,
    pub building_type_ids: Vec<String>,
    pub drone_type_ids: Vec<String>,
    pub tech_ids: Vec<String>,
    pub decryptor_feature_id: String,
}

impl Default for Catalogs {
    fn default() -> Self {
        Self::builtin()
    }
}

impl Catalogs {
    pub fn builtin() -> Self {
        Self {
            hostile_faction_id: HOSTILE_FACTION_ID.to_string(),
            primary_region_id: REGION_THE_ABYSS.to_string(),
            region_ids: owned(&[REGION_THE_ABYSS, REGION_PHANTOM_PLAINS]),
            unit_type_ids: owned(UNIT_TYPE_IDS),
            building_type_ids: owned(BUILDING_TYPE_IDS),
            drone_type_ids: owned(DRONE_TYPE_IDS),
            tech_ids: owned(TECH_IDS),
            decryptor_feature_id: DECRYPTOR_FEATURE_ID.to_string(),
        }
    }

    pub fn from_json_str(data: &str) -> Result<Self, CoreError> {
        serde_json::from_str(data).map_err(|e| {
            CoreError::new(
                CoreErrorCode::Format,
                format!("failed to parse catalog overrides: {e}"),
            )
        })
    }

    pub fn load_from_file(path: &Path) -> Result<Self, CoreError> {
        let contents = fs::read_to_string(path).map_err(|e| {
            CoreError::new(
                CoreErrorCode::Io,
                format!("failed to read catalog overrides from {}: {e}", path.display()),
            )
        })?;
        let catalogs = Self::from_json_str(&contents)?;
        tracing::info!(
            target: "vecedit::catalog",
            path = %path.display(),
            units = catalogs.unit_type_ids.len(),
            buildings = catalogs.building_type_ids.len(),
            techs = catalogs.tech_ids.len(),
            "catalog.loaded"
        );
        Ok(catalogs)
    }

    /// Entity types left out of the building map: units, drones and projectiles.
    pub fn map_excluded_type_ids(&self) -> Vec<&str> {
        self.unit_type_ids
            .iter()
            .chain(&self.drone_type_ids)
            .map(String::as_str)
            .collect()
    }
}

fn owned(ids: &[&str]) -> Vec<String> {
    ids.iter().map(|s| (*s).to_string()).collect()
}
