//! Engine configuration.

use crate::core::HsmError;
use serde::{Deserialize, Serialize};

/// How `add_child` treats nodes that already have a parent.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Topology {
    /// Multiple parents are allowed. A node reachable through several paths
    /// processes a routed message once per path.
    #[default]
    Graph,

    /// Every node has at most one parent and no cycles may be formed.
    Tree,
}

/// Per-node engine settings.
///
/// Missing fields fall back to their defaults:
///
/// ```rust
/// use hsm_engine::config::{EngineConfig, Topology};
///
/// let config = EngineConfig::from_json(r#"{ "topology": "tree" }"#).unwrap();
/// assert_eq!(config.topology, Topology::Tree);
/// assert_eq!(config.indent, "  ");
/// ```
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Indentation unit used by `Node::describe`
    pub indent: String,

    /// Parent/child policy enforced by `Node::add_child`
    pub topology: Topology,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            indent: "  ".to_string(),
            topology: Topology::Graph,
        }
    }
}

impl EngineConfig {
    /// Parse a configuration from JSON.
    pub fn from_json(json: &str) -> Result<Self, HsmError> {
        Ok(serde_json::from_str(json)?)
    }

    /// Render the configuration as JSON.
    pub fn to_json(&self) -> Result<String, HsmError> {
        Ok(serde_json::to_string(self)?)
    }
}
