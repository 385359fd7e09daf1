//! Building a [`Tree`] from a nested JSON description.
//!
//! ```json
//! {
//!   "type": "Window",
//!   "id": "main",
//!   "aliases": ["Container"],
//!   "properties": { "title": "Demo", "width": 640, "visible": true },
//!   "children": [ { "type": "Button", "id": "ok" } ]
//! }
//! ```
//!
//! Only `type` is required. Property values may be strings, numbers or
//! booleans; numbers and booleans are stored in their JSON spelling.

use std::collections::BTreeMap;
use std::io::Read;

use serde::Deserialize;
use serde_json::Value;
use thiserror::Error;

use crate::{NodeData, NodeId, Tree};

/// Why a tree description could not be loaded.
#[derive(Debug, Error)]
pub enum TreeError {
    /// The input is not JSON or does not have the expected shape.
    #[error("invalid tree description: {0}")]
    Json(#[from] serde_json::Error),

    /// A property value is an array, object or null.
    #[error("property '{name}' of node '{node}' must be a string, number or boolean")]
    InvalidProperty {
        /// Type and id of the offending node.
        node: String,
        /// The property name.
        name: String,
    },
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct NodeSpec {
    #[serde(rename = "type")]
    type_name: String,
    #[serde(default)]
    id: String,
    #[serde(default)]
    aliases: Vec<String>,
    #[serde(default)]
    properties: BTreeMap<String, Value>,
    #[serde(default)]
    children: Vec<NodeSpec>,
}

impl NodeSpec {
    fn into_parts(self) -> Result<(NodeData, Vec<Self>), TreeError> {
        let mut data = NodeData::new(self.type_name).with_id(self.id);
        data.types.extend(self.aliases);
        for (name, value) in self.properties {
            let value = match value {
                Value::String(text) => text,
                Value::Bool(flag) => flag.to_string(),
                Value::Number(number) => number.to_string(),
                Value::Null | Value::Array(_) | Value::Object(_) => {
                    return Err(TreeError::InvalidProperty {
                        node: crate::label(&data),
                        name,
                    });
                }
            };
            let _ = data.properties.insert(name, value);
        }
        Ok((data, self.children))
    }
}

impl Tree {
    /// Parse a tree from JSON text.
    ///
    /// # Errors
    ///
    /// Returns [`TreeError`] if the text is not a valid tree description.
    pub fn from_json(text: &str) -> Result<Self, TreeError> {
        Self::from_spec(serde_json::from_str(text)?)
    }

    /// Parse a tree from a JSON stream.
    ///
    /// # Errors
    ///
    /// Returns [`TreeError`] if reading fails or the input is not a valid
    /// tree description.
    pub fn from_reader(reader: impl Read) -> Result<Self, TreeError> {
        Self::from_spec(serde_json::from_reader(reader)?)
    }

    fn from_spec(spec: NodeSpec) -> Result<Self, TreeError> {
        let (root, children) = spec.into_parts()?;
        let mut tree = Self::new(root);
        // Explicit work list: (parent, pending children in document order).
        let mut pending = vec![(NodeId::ROOT, children)];
        while let Some((parent, children)) = pending.pop() {
            for child in children {
                let (data, grandchildren) = child.into_parts()?;
                let id = tree.append(parent, data);
                if !grandchildren.is_empty() {
                    pending.push((id, grandchildren));
                }
            }
        }
        Ok(tree)
    }
}
