use serde::{Deserialize, Deserializer, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use crate::{LogframeError, Result, ToolboxRegistry};

pub type NodeId = String;
pub type EdgeId = String;

/// Toolbox grouping of a node, also used for rule dispatch.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NodeCategory {
    Foundation,
    Stakeholder,
    Intervention,
    Bridge,
    Risk,
}

impl NodeCategory {
    pub const ALL: [NodeCategory; 5] = [
        NodeCategory::Foundation,
        NodeCategory::Stakeholder,
        NodeCategory::Intervention,
        NodeCategory::Bridge,
        NodeCategory::Risk,
    ];
}

impl fmt::Display for NodeCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            NodeCategory::Foundation => "foundation",
            NodeCategory::Stakeholder => "stakeholder",
            NodeCategory::Intervention => "intervention",
            NodeCategory::Bridge => "bridge",
            NodeCategory::Risk => "risk",
        };
        write!(f, "{}", s)
    }
}

impl FromStr for NodeCategory {
    type Err = LogframeError;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_lowercase().as_str() {
            "foundation" => Ok(NodeCategory::Foundation),
            "stakeholder" => Ok(NodeCategory::Stakeholder),
            "intervention" => Ok(NodeCategory::Intervention),
            "bridge" => Ok(NodeCategory::Bridge),
            "risk" => Ok(NodeCategory::Risk),
            other => Err(LogframeError::InvalidSnapshot(format!(
                "unknown node category: {}",
                other
            ))),
        }
    }
}

/// Program domain. Selects the toolbox, the simulation strategy and the
/// compilation strategy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Domain {
    /// Foundational literacy and numeracy; also the generic default.
    Fln,
    CareerReadiness,
}

impl Default for Domain {
    fn default() -> Self {
        Domain::Fln
    }
}

impl fmt::Display for Domain {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Domain::Fln => write!(f, "fln"),
            Domain::CareerReadiness => write!(f, "career-readiness"),
        }
    }
}

impl FromStr for Domain {
    type Err = LogframeError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_lowercase().replace('_', "-").as_str() {
            "fln" | "foundational-literacy" | "generic" => Ok(Domain::Fln),
            "career" | "career-readiness" => Ok(Domain::CareerReadiness),
            other => Err(LogframeError::UnknownDomain(other.to_string())),
        }
    }
}

/// Canvas coordinate. Layout only.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Position {
    pub x: f64,
    pub y: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Node {
    pub id: NodeId,
    /// Coarse role (`intervention`, `outcome`, ...) or a toolbox id (`tlm_kit`, `crcc`).
    #[serde(rename = "type")]
    pub node_type: String,
    /// `None` when the UI sent no category or one we do not know.
    #[serde(
        default,
        deserialize_with = "lenient_category",
        skip_serializing_if = "Option::is_none"
    )]
    pub category: Option<NodeCategory>,
    #[serde(default)]
    pub label: String,
    #[serde(default)]
    pub position: Position,
    /// Raw form values as sent by the authoring UI. Decode through the
    /// toolbox registry before use.
    #[serde(default)]
    pub attributes: BTreeMap<String, serde_json::Value>,
}

impl Node {
    pub fn new(
        id: impl Into<NodeId>,
        node_type: impl Into<String>,
        category: NodeCategory,
        label: impl Into<String>,
    ) -> Self {
        Self {
            id: id.into(),
            node_type: node_type.into(),
            category: Some(category),
            label: label.into(),
            position: Position::default(),
            attributes: BTreeMap::new(),
        }
    }

    pub fn with_attribute(mut self, key: impl Into<String>, value: serde_json::Value) -> Self {
        self.attributes.insert(key.into(), value);
        self
    }

    pub fn with_position(mut self, x: f64, y: f64) -> Self {
        self.position = Position { x, y };
        self
    }

    /// The node's own category, else the category of its toolbox type.
    pub fn resolved_category(&self) -> Option<NodeCategory> {
        self.category.or_else(|| {
            ToolboxRegistry::find(&self.node_type).map(|(_, item)| item.category)
        })
    }
}

fn lenient_category<'de, D>(deserializer: D) -> std::result::Result<Option<NodeCategory>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<serde_json::Value>::deserialize(deserializer)?;
    Ok(value
        .as_ref()
        .and_then(serde_json::Value::as_str)
        .and_then(|s| s.parse().ok()))
}

/// How the effect of a connection is measured.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Indicator {
    pub label: String,
    #[serde(default)]
    pub unit: String,
}

impl Indicator {
    pub fn new(label: impl Into<String>, unit: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            unit: unit.into(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Edge {
    pub id: EdgeId,
    pub source: NodeId,
    pub target: NodeId,
    #[serde(default)]
    pub interaction_type: String,
    #[serde(default)]
    pub indicators: Vec<Indicator>,
}

impl Edge {
    pub fn new(id: impl Into<EdgeId>, source: impl Into<NodeId>, target: impl Into<NodeId>) -> Self {
        Self {
            id: id.into(),
            source: source.into(),
            target: target.into(),
            interaction_type: String::new(),
            indicators: Vec::new(),
        }
    }

    pub fn with_interaction(mut self, interaction_type: impl Into<String>) -> Self {
        self.interaction_type = interaction_type.into();
        self
    }

    pub fn with_indicator(mut self, label: impl Into<String>, unit: impl Into<String>) -> Self {
        self.indicators.push(Indicator::new(label, unit));
        self
    }

    pub fn touches(&self, node_id: &str) -> bool {
        self.source == node_id || self.target == node_id
    }
}

/// Immutable `{nodes, edges}` value handed over by the persistence layer
/// or the authoring UI.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct GraphSnapshot {
    #[serde(default)]
    pub nodes: Vec<Node>,
    #[serde(default)]
    pub edges: Vec<Edge>,
}

impl GraphSnapshot {
    pub fn new(nodes: Vec<Node>, edges: Vec<Edge>) -> Self {
        Self { nodes, edges }
    }

    pub fn from_json(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn from_reader<R: std::io::Read>(reader: R) -> Result<Self> {
        Ok(serde_json::from_reader(reader)?)
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty() && self.edges.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_snapshot_from_ui_json() {
        let json = r#"{
            "nodes": [
                {"id": "n1", "type": "tlm_kit", "category": "intervention", "label": "TLM Kit",
                 "position": {"x": 10, "y": 20}, "attributes": {"quantity": 40}},
                {"id": "n2", "type": "outcome", "category": "foundation", "label": "Reading"}
            ],
            "edges": [
                {"id": "e1", "source": "n1", "target": "n2", "interactionType": "delivers",
                 "indicators": [{"label": "Kits in use", "unit": "%"}]}
            ]
        }"#;

        let snapshot = GraphSnapshot::from_json(json).unwrap();
        assert_eq!(snapshot.nodes.len(), 2);
        assert_eq!(snapshot.nodes[0].node_type, "tlm_kit");
        assert_eq!(snapshot.nodes[0].category, Some(NodeCategory::Intervention));
        assert!(snapshot.nodes[1].attributes.is_empty());
        assert_eq!(snapshot.edges[0].interaction_type, "delivers");
        assert_eq!(snapshot.edges[0].indicators[0].unit, "%");
    }

    #[test]
    fn test_unknown_or_missing_category_keeps_the_node() {
        let json = r#"{"nodes": [
            {"id": "n1", "type": "x", "category": "mystery"},
            {"id": "n2", "type": "tlm_kit"},
            {"id": "n3", "type": "y", "category": null},
            {"id": "n4", "type": "z", "category": 7}
        ]}"#;
        let snapshot = GraphSnapshot::from_json(json).unwrap();
        assert_eq!(snapshot.nodes.len(), 4);
        assert!(snapshot.nodes.iter().all(|n| n.category.is_none()));

        assert_eq!(snapshot.nodes[0].resolved_category(), None);
        assert_eq!(
            snapshot.nodes[1].resolved_category(),
            Some(NodeCategory::Intervention)
        );
    }

    #[test]
    fn test_domain_parsing() {
        assert_eq!("fln".parse::<Domain>().unwrap(), Domain::Fln);
        assert_eq!(
            "Career_Readiness".parse::<Domain>().unwrap(),
            Domain::CareerReadiness
        );
        assert!(matches!(
            "astronomy".parse::<Domain>(),
            Err(LogframeError::UnknownDomain(_))
        ));
        assert_eq!(Domain::CareerReadiness.to_string(), "career-readiness");
    }
}
