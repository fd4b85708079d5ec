//! Bridge between a [`super::Document`] and a generic key/value tree editor.
//!
//! The editor sees two columns per row: a key and the text of a scalar.
//! Sequence elements are keyed `[0]`, `[1]`, ... in document order. Nodes
//! built by [`super::Document::to_tree`] remember whether they were a mapping
//! or a sequence; nodes without that kind fall back to the marker rule, where
//! a container whose children are all `[n]` keys is a sequence. Sequence
//! elements come back ordered by their marker index. Scalars come back as
//! strings; typed reads re-type them later.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use super::path::parse_index_marker;
use super::scalar::scalar_text;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ContainerKind {
    Mapping,
    Sequence,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TreeNode {
    pub key: String,
    /// Scalar text; `None` marks a mapping or sequence.
    pub text: Option<String>,
    /// Container kind recorded when the node came from a document.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub kind: Option<ContainerKind>,
    pub children: Vec<TreeNode>,
}

impl TreeNode {
    pub fn scalar(key: impl Into<String>, text: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            text: Some(text.into()),
            kind: None,
            children: Vec::new(),
        }
    }

    /// A container of unrecorded kind, rebuilt by the marker rule.
    pub fn container(key: impl Into<String>, children: Vec<TreeNode>) -> Self {
        Self {
            key: key.into(),
            text: None,
            kind: None,
            children,
        }
    }

    pub fn mapping(key: impl Into<String>, children: Vec<TreeNode>) -> Self {
        Self {
            kind: Some(ContainerKind::Mapping),
            ..Self::container(key, children)
        }
    }

    pub fn sequence(key: impl Into<String>, children: Vec<TreeNode>) -> Self {
        Self {
            kind: Some(ContainerKind::Sequence),
            ..Self::container(key, children)
        }
    }

    pub fn is_container(&self) -> bool {
        self.text.is_none() || self.kind.is_some() || !self.children.is_empty()
    }
}

pub(crate) fn nodes_from_mapping(map: &Map<String, Value>) -> Vec<TreeNode> {
    map.iter()
        .map(|(key, value)| node_from_value(key.clone(), value))
        .collect()
}

fn node_from_value(key: String, value: &Value) -> TreeNode {
    match value {
        Value::Object(map) => TreeNode::mapping(key, nodes_from_mapping(map)),
        Value::Array(seq) => TreeNode::sequence(
            key,
            seq.iter()
                .enumerate()
                .map(|(i, item)| node_from_value(format!("[{i}]"), item))
                .collect(),
        ),
        scalar => TreeNode {
            key,
            text: scalar_text(scalar),
            kind: None,
            children: Vec::new(),
        },
    }
}

pub(crate) fn mapping_from_nodes(nodes: &[TreeNode]) -> Map<String, Value> {
    let mut map = Map::new();
    for node in nodes {
        map.insert(node.key.clone(), value_from_node(node));
    }
    map
}

fn value_from_node(node: &TreeNode) -> Value {
    if !node.is_container() {
        return Value::String(node.text.clone().unwrap_or_default());
    }
    let kind = node.kind.unwrap_or_else(|| marker_kind(&node.children));
    match kind {
        ContainerKind::Sequence => Value::Array(sequence_from_nodes(&node.children)),
        ContainerKind::Mapping => Value::Object(mapping_from_nodes(&node.children)),
    }
}

// Empty containers of unrecorded kind carry no markers and rebuild as sequences.
fn marker_kind(children: &[TreeNode]) -> ContainerKind {
    if children
        .iter()
        .all(|child| parse_index_marker(&child.key).is_some())
    {
        ContainerKind::Sequence
    } else {
        ContainerKind::Mapping
    }
}

/// Elements ordered by marker index; unmarked rows keep their place after
/// the marked ones.
fn sequence_from_nodes(children: &[TreeNode]) -> Vec<Value> {
    let mut ordered: Vec<&TreeNode> = children.iter().collect();
    ordered.sort_by_key(|child| parse_index_marker(&child.key).unwrap_or(usize::MAX));
    ordered.into_iter().map(value_from_node).collect()
}
