//! Exported model graph.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// One operation node.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NodeDef {
    pub name: String,
    pub op: String,
    #[serde(default)]
    pub attrs: BTreeMap<String, String>,
}

impl NodeDef {
    pub fn new(name: impl Into<String>, op: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            op: op.into(),
            attrs: BTreeMap::new(),
        }
    }

    pub fn with_attr(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.attrs.insert(key.into(), value.into());
        self
    }

    pub fn attr(&self, key: &str) -> Option<&str> {
        self.attrs.get(key).map(String::as_str)
    }
}

/// Named function body inside a graph library.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FunctionDef {
    pub name: String,
    #[serde(default)]
    pub nodes: Vec<NodeDef>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct GraphDef {
    #[serde(default)]
    pub nodes: Vec<NodeDef>,
    #[serde(default)]
    pub functions: Vec<FunctionDef>,
}

/// Model produced by an export pass.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExportedModel {
    pub graph: GraphDef,
    /// Node that initializes resources, empty when there is none.
    #[serde(default)]
    pub init_node_name: String,
    #[serde(default)]
    pub checkpoint_dir: String,
}

impl ExportedModel {
    /// Every node: top-level graph nodes first, then function bodies in order.
    pub fn nodes(&self) -> impl Iterator<Item = &NodeDef> {
        self.graph.nodes.iter().chain(
            self.graph
                .functions
                .iter()
                .flat_map(|function| function.nodes.iter()),
        )
    }

    pub fn nodes_mut(&mut self) -> impl Iterator<Item = &mut NodeDef> {
        self.graph.nodes.iter_mut().chain(
            self.graph
                .functions
                .iter_mut()
                .flat_map(|function| function.nodes.iter_mut()),
        )
    }
}
