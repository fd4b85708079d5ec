pub mod path;
pub mod scalar;
pub mod tree;

use serde_json::{Map, Value};

use crate::core_api::{CoreError, CoreErrorCode};

pub use path::{NodePath, PathSegment};
pub use tree::{ContainerKind, TreeNode};

pub const KEY_FILE_NAME: &str = "FileName";
pub const KEY_NAME: &str = "Name";
pub const KEY_DESCRIPTION: &str = "Description";
pub const KEY_VERSION: &str = "Version";
pub const KEY_WORLD_TIME: &str = "WorldTime";
pub const KEY_SEED: &str = "Seed";
pub const KEY_GAMEMODE_ID: &str = "GamemodeData.ID";
pub const KEY_ACTIVE_REGION: &str = "ActiveRegion";
pub const KEY_RESEARCH_TECH_RESOURCES: &str = "researchTechResources";
pub const KEY_COMPLETED_RESEARCH_TECHS: &str = "completedResearchTechs";
pub const KEY_REGIONS: &str = "regions";

/// The decoded save: a mapping at the root, no schema beyond that.
///
/// Mapping keys keep their insertion order so a re-encoded save diffs cleanly
/// against the one the game wrote.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Document {
    root: Map<String, Value>,
}

impl Document {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_value(value: Value) -> Result<Self, CoreError> {
        match value {
            Value::Object(root) => Ok(Self { root }),
            other => Err(CoreError::new(
                CoreErrorCode::Format,
                format!(
                    "save payload must be a mapping at the top level, found {}",
                    scalar::kind_name(&other)
                ),
            )),
        }
    }

    pub fn root(&self) -> &Map<String, Value> {
        &self.root
    }

    pub fn to_value(&self) -> Value {
        Value::Object(self.root.clone())
    }

    pub fn into_value(self) -> Value {
        Value::Object(self.root)
    }

    pub fn contains(&self, path: impl Into<NodePath>) -> bool {
        self.get(path).is_ok()
    }

    pub fn get(&self, path: impl Into<NodePath>) -> Result<&Value, CoreError> {
        let path = path.into();
        let mut segments = path.segments().iter();
        let Some(first) = segments.next() else {
            return Err(CoreError::new(
                CoreErrorCode::Absent,
                "the document root is not addressable as a node",
            ));
        };
        let mut current = match first {
            PathSegment::Key(key) => self.root.get(key),
            PathSegment::Index(_) => None,
        }
        .ok_or_else(|| CoreError::absent(&path))?;

        for segment in segments {
            current = child(current, segment).ok_or_else(|| CoreError::absent(&path))?;
        }
        Ok(current)
    }

    pub fn get_mut(&mut self, path: impl Into<NodePath>) -> Result<&mut Value, CoreError> {
        let path = path.into();
        let mut segments = path.segments().iter();
        let Some(first) = segments.next() else {
            return Err(CoreError::new(
                CoreErrorCode::Absent,
                "the document root is not addressable as a node",
            ));
        };
        let mut current = match first {
            PathSegment::Key(key) => self.root.get_mut(key),
            PathSegment::Index(_) => None,
        }
        .ok_or_else(|| CoreError::absent(&path))?;

        for segment in segments {
            current = child_mut(current, segment).ok_or_else(|| CoreError::absent(&path))?;
        }
        Ok(current)
    }

    /// Replaces the node at `path`, creating missing intermediate mappings.
    ///
    /// Sequence elements can be replaced but not appended, and a scalar in the
    /// middle of the path is never overwritten with a mapping.
    pub fn set(&mut self, path: impl Into<NodePath>, value: Value) -> Result<(), CoreError> {
        let path = path.into();
        let Some((parent_path, last)) = path.split_last() else {
            let replacement = Document::from_value(value).map_err(|e| {
                CoreError::new(CoreErrorCode::Validation, e.message)
            })?;
            *self = replacement;
            return Ok(());
        };

        let mut container = ContainerMut::Mapping(&mut self.root);
        for segment in parent_path.segments() {
            container = container.descend_or_create(segment, &path)?;
        }

        match (container, last) {
            (ContainerMut::Mapping(map), PathSegment::Key(key)) => {
                map.insert(key.clone(), value);
                Ok(())
            }
            (ContainerMut::Sequence(seq), segment) => {
                let slot = sequence_index(segment)
                    .and_then(|i| seq.get_mut(i))
                    .ok_or_else(|| CoreError::absent(&path))?;
                *slot = value;
                Ok(())
            }
            (ContainerMut::Mapping(_), PathSegment::Index(_)) => Err(CoreError::validation(
                &path,
                "a sequence before the index",
                "a mapping",
            )),
        }
    }

    /// Removes and returns the node at `path`, keeping sibling order intact.
    pub fn remove(&mut self, path: impl Into<NodePath>) -> Result<Value, CoreError> {
        let path = path.into();
        let Some((parent_path, last)) = path.split_last() else {
            return Err(CoreError::new(
                CoreErrorCode::Validation,
                "the document root cannot be removed",
            ));
        };

        let removed = if parent_path.is_root() {
            match last {
                PathSegment::Key(key) => self.root.shift_remove(key),
                PathSegment::Index(_) => None,
            }
        } else {
            match self.get_mut(&parent_path)? {
                Value::Object(map) => match last {
                    PathSegment::Key(key) => map.shift_remove(key),
                    PathSegment::Index(_) => None,
                },
                Value::Array(seq) => sequence_index(last)
                    .filter(|&i| i < seq.len())
                    .map(|i| seq.remove(i)),
                _ => None,
            }
        };
        removed.ok_or_else(|| CoreError::absent(&path))
    }

    pub fn get_str(&self, path: impl Into<NodePath>) -> Result<String, CoreError> {
        let path = path.into();
        scalar::to_string(self.get(&path)?, &path)
    }

    pub fn get_i64(&self, path: impl Into<NodePath>) -> Result<i64, CoreError> {
        let path = path.into();
        scalar::to_i64(self.get(&path)?, &path)
    }

    pub fn get_f64(&self, path: impl Into<NodePath>) -> Result<f64, CoreError> {
        let path = path.into();
        scalar::to_f64(self.get(&path)?, &path)
    }

    pub fn get_bool(&self, path: impl Into<NodePath>) -> Result<bool, CoreError> {
        let path = path.into();
        scalar::to_bool(self.get(&path)?, &path)
    }

    pub fn to_tree(&self) -> Vec<TreeNode> {
        tree::nodes_from_mapping(&self.root)
    }

    pub fn from_tree(nodes: &[TreeNode]) -> Self {
        Self {
            root: tree::mapping_from_nodes(nodes),
        }
    }
}

/// Turns an `Absent` error into `None` and passes every other outcome through.
pub fn absent_as_none<T>(result: Result<T, CoreError>) -> Result<Option<T>, CoreError> {
    match result {
        Ok(value) => Ok(Some(value)),
        Err(e) if e.is_absent() => Ok(None),
        Err(e) => Err(e),
    }
}

enum ContainerMut<'a> {
    Mapping(&'a mut Map<String, Value>),
    Sequence(&'a mut Vec<Value>),
}

impl<'a> ContainerMut<'a> {
    fn descend_or_create(
        self,
        segment: &PathSegment,
        path: &NodePath,
    ) -> Result<ContainerMut<'a>, CoreError> {
        let next = match (self, segment) {
            (ContainerMut::Mapping(map), PathSegment::Key(key)) => map
                .entry(key.clone())
                .or_insert_with(|| Value::Object(Map::new())),
            (ContainerMut::Mapping(_), PathSegment::Index(_)) => {
                return Err(CoreError::validation(
                    path,
                    "a sequence before the index",
                    "a mapping",
                ));
            }
            (ContainerMut::Sequence(seq), segment) => sequence_index(segment)
                .and_then(|i| seq.get_mut(i))
                .ok_or_else(|| CoreError::absent(path))?,
        };

        match next {
            Value::Object(map) => Ok(ContainerMut::Mapping(map)),
            Value::Array(seq) => Ok(ContainerMut::Sequence(seq)),
            other => Err(CoreError::validation(
                path,
                "a mapping or sequence along the way",
                scalar::kind_name(other),
            )),
        }
    }
}

fn sequence_index(segment: &PathSegment) -> Option<usize> {
    match segment {
        PathSegment::Index(i) => Some(*i),
        PathSegment::Key(key) => key.parse().ok(),
    }
}

fn child<'a>(node: &'a Value, segment: &PathSegment) -> Option<&'a Value> {
    match (node, segment) {
        (Value::Object(map), PathSegment::Key(key)) => map.get(key),
        (Value::Array(seq), segment) => sequence_index(segment).and_then(|i| seq.get(i)),
        _ => None,
    }
}

fn child_mut<'a>(node: &'a mut Value, segment: &PathSegment) -> Option<&'a mut Value> {
    match (node, segment) {
        (Value::Object(map), PathSegment::Key(key)) => map.get_mut(key),
        (Value::Array(seq), segment) => sequence_index(segment).and_then(|i| seq.get_mut(i)),
        _ => None,
    }
}
