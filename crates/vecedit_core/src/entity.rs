use std::fmt;

use serde::Serialize;
use serde_json::Value;

use crate::core_api::CoreError;
use crate::document::scalar::{self, scalar_text};
use crate::document::{NodePath, absent_as_none};

pub const SUMMARY_LINE_COUNT: usize = 5;

const KEY_ENTITY_ID: &str = "EntityID";
const KEY_FACTION_ID: &str = "FactionID";
const KEY_POS_X: &str = "PosX";
const KEY_POS_Y: &str = "PosY";
const KEY_COMPONENTS: &str = "Components";
const KEY_COMPONENT_TYPE: &str = "Type";
const KEY_TARGET_MODE: &str = "TargetMode";

/// Placeholder the panel shows for a missing field or an unknown target mode.
const MISSING_FIELD_TEXT: &str = "None";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ComponentKind {
    ResourceModule,
    Turret,
    Decryptor,
}

impl ComponentKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::ResourceModule => "ResourceModule",
            Self::Turret => "Turret",
            Self::Decryptor => "Decryptor",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TargetMode {
    Default,
    Closest,
    Strongest,
    Weakest,
    Unknown(i64),
}

impl TargetMode {
    pub fn from_raw(raw: i64) -> Self {
        match raw {
            0 => Self::Default,
            1 => Self::Closest,
            2 => Self::Strongest,
            3 => Self::Weakest,
            other => Self::Unknown(other),
        }
    }

    pub fn label(&self) -> Option<&'static str> {
        match self {
            Self::Default => Some("Default"),
            Self::Closest => Some("Closest"),
            Self::Strongest => Some("Strongest"),
            Self::Weakest => Some("Weakest"),
            Self::Unknown(_) => None,
        }
    }
}

impl fmt::Display for TargetMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label().unwrap_or(MISSING_FIELD_TEXT))
    }
}

/// One placed instance from a region's `entities` table, with the type id it
/// was listed under.
#[derive(Debug, Clone, PartialEq)]
pub struct Entity {
    type_id: String,
    record: Value,
}

impl Entity {
    pub fn new(type_id: impl Into<String>, record: Value) -> Self {
        Self {
            type_id: type_id.into(),
            record,
        }
    }

    pub fn type_id(&self) -> &str {
        &self.type_id
    }

    pub fn record(&self) -> &Value {
        &self.record
    }

    pub fn entity_id(&self) -> Option<&str> {
        self.record.get(KEY_ENTITY_ID).and_then(Value::as_str)
    }

    pub fn faction_id(&self) -> Option<&str> {
        self.record.get(KEY_FACTION_ID).and_then(Value::as_str)
    }

    /// World-space position, or `None` when either coordinate is missing.
    pub fn position(&self) -> Result<Option<(f64, f64)>, CoreError> {
        let (Some(x), Some(y)) = (self.record.get(KEY_POS_X), self.record.get(KEY_POS_Y)) else {
            return Ok(None);
        };
        let x = scalar::to_f64(x, &self.field_path(KEY_POS_X))?;
        let y = scalar::to_f64(y, &self.field_path(KEY_POS_Y))?;
        Ok(Some((x, y)))
    }

    pub fn components(&self) -> &[Value] {
        self.record
            .get(KEY_COMPONENTS)
            .and_then(Value::as_array)
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    /// Position of the first component of `kind` in the `Components` list.
    pub fn component_index(&self, kind: ComponentKind) -> Option<usize> {
        self.components().iter().position(|component| {
            component.get(KEY_COMPONENT_TYPE).and_then(Value::as_str) == Some(kind.as_str())
        })
    }

    pub fn find_component(&self, kind: ComponentKind) -> Option<Component<'_>> {
        self.component_index(kind)
            .and_then(|index| self.component_at(index))
    }

    pub fn component_at(&self, index: usize) -> Option<Component<'_>> {
        self.components().get(index).map(|record| Component {
            index,
            record,
            entity_path: self.path(),
        })
    }

    fn path(&self) -> NodePath {
        NodePath::root().key(self.type_id.clone())
    }

    fn field_path(&self, field: &str) -> NodePath {
        self.path().key(field)
    }
}

#[derive(Debug, Clone)]
pub struct Component<'a> {
    index: usize,
    record: &'a Value,
    entity_path: NodePath,
}

impl<'a> Component<'a> {
    pub fn index(&self) -> usize {
        self.index
    }

    pub fn type_name(&self) -> Option<&'a str> {
        self.record.get(KEY_COMPONENT_TYPE).and_then(Value::as_str)
    }

    pub fn field(&self, name: &str) -> Option<&'a Value> {
        self.record.get(name)
    }

    /// A field written as `null` reads the same as a missing one.
    fn present_field(&self, name: &str) -> Result<&'a Value, CoreError> {
        self.field(name)
            .filter(|v| !v.is_null())
            .ok_or_else(|| CoreError::absent(self.field_path(name)))
    }

    pub fn bool_field(&self, name: &str) -> Result<Option<bool>, CoreError> {
        absent_as_none(
            self.present_field(name)
                .and_then(|v| scalar::to_bool(v, &self.field_path(name))),
        )
    }

    pub fn i64_field(&self, name: &str) -> Result<Option<i64>, CoreError> {
        absent_as_none(
            self.present_field(name)
                .and_then(|v| scalar::to_i64(v, &self.field_path(name))),
        )
    }

    /// Turret target mode. A number that is not a whole code has no mode;
    /// only text that does not parse is an error.
    pub fn target_mode(&self) -> Result<Option<TargetMode>, CoreError> {
        match self.field(KEY_TARGET_MODE) {
            Some(number @ Value::Number(_)) => {
                let path = self.field_path(KEY_TARGET_MODE);
                Ok(scalar::to_i64(number, &path).ok().map(TargetMode::from_raw))
            }
            _ => Ok(self.i64_field(KEY_TARGET_MODE)?.map(TargetMode::from_raw)),
        }
    }

    /// Scalar text of a field, `None` placeholder when it is missing or null.
    pub fn display_field(&self, name: &str) -> String {
        self.present_field(name)
            .ok()
            .and_then(scalar_text)
            .unwrap_or_else(|| MISSING_FIELD_TEXT.to_string())
    }

    fn field_path(&self, name: &str) -> NodePath {
        self.entity_path
            .clone()
            .key(KEY_COMPONENTS)
            .index(self.index)
            .key(name)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct EntitySummary {
    pub lines: [String; SUMMARY_LINE_COUNT],
}

impl EntitySummary {
    pub fn is_blank(&self) -> bool {
        self.lines.iter().all(String::is_empty)
    }
}

/// Summarises an entity's components into the five detail lines of the
/// map panel.
///
/// Component checks run in a fixed order and each one overwrites the lines
/// it writes: ResourceModule, then Turret, then Decryptor. Turret fields are
/// read from the ResourceModule's slot, or from the last component when there
/// is no ResourceModule.
pub fn describe_entity(entity: &Entity) -> Result<EntitySummary, CoreError> {
    let mut summary = EntitySummary::default();
    let components = entity.components();
    if components.is_empty() {
        return Ok(summary);
    }
    let lines = &mut summary.lines;

    let resource_module_index = entity.component_index(ComponentKind::ResourceModule);
    if let Some(module) = resource_module_index.and_then(|i| entity.component_at(i)) {
        if module.bool_field("HasInputStorage")?.unwrap_or(false)
            && let Some(text) = storage_text(&module, "InputStorage")
        {
            lines[0] = format!("Input Storage: {text}");
        }
        if module.bool_field("HasOutputStorage")?.unwrap_or(false)
            && let Some(text) = storage_text(&module, "OutputStorage")
        {
            lines[1] = format!("Output Storage: {text}");
            if lines[0].is_empty() {
                lines[0] = std::mem::take(&mut lines[1]);
            }
        }
    }

    if entity.component_index(ComponentKind::Turret).is_some() {
        let source_index = resource_module_index.unwrap_or(components.len() - 1);
        if let Some(turret) = entity.component_at(source_index) {
            let target_mode = turret
                .target_mode()?
                .map(|mode| mode.to_string())
                .unwrap_or_else(|| MISSING_FIELD_TEXT.to_string());
            lines[0] = format!("Barrel Rotation: {}", turret.display_field("BarrelRotation"));
            lines[1] = format!("Cooldown: {}", turret.display_field("Cooldown"));
            lines[2] = format!("Target mode: {target_mode}");
        }
    }

    if let Some(decryptor) = entity.find_component(ComponentKind::Decryptor) {
        let tech = decryptor
            .field("TechID")
            .and_then(scalar_text)
            .map(|id| display_name(&id))
            .unwrap_or_default();
        lines[0] = format!("Tech: {tech}");
    }

    Ok(summary)
}

fn storage_text(module: &Component<'_>, key: &str) -> Option<String> {
    let first = module.field(key)?.as_array()?.first()?;
    let amount = first
        .get("Amount")
        .and_then(scalar_text)
        .unwrap_or_else(|| MISSING_FIELD_TEXT.to_string());
    let id = first.get("ID").and_then(scalar_text).unwrap_or_default();
    Some(format!("{amount} {}", display_name(&id)))
}

/// `resource_liquid_essence` -> `Liquid Essence`: the family prefix is
/// dropped and the remaining words are title-cased.
pub fn display_name(id: &str) -> String {
    let words: Vec<&str> = id.split('_').skip(1).collect();
    title_case(&words.join(" "))
}

/// `faction_redscar` -> `Redscar`: only the second id word, capitalised.
/// Ids without a prefix fall back to the whole id.
pub fn short_label(id: &str) -> String {
    let word = id.split('_').nth(1).unwrap_or(id);
    let mut chars = word.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars.flat_map(char::to_lowercase)).collect(),
        None => String::new(),
    }
}

fn title_case(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut previous_cased = false;
    for c in text.chars() {
        if previous_cased {
            out.extend(c.to_lowercase());
        } else {
            out.extend(c.to_uppercase());
        }
        previous_cased = c.is_alphabetic();
    }
    out
}
