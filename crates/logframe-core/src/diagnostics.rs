use serde::{Deserialize, Serialize};
use std::fmt;

use crate::{EdgeId, NodeId};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Critical,
    Warning,
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Severity::Critical => write!(f, "critical"),
            Severity::Warning => write!(f, "warning"),
        }
    }
}

/// A single structural or semantic finding. Both the structural validator
/// and the simulators report through this one shape.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LogicError {
    /// Stable per violation, e.g. `orphan-<nodeId>`.
    pub id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub node_id: Option<NodeId>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub edge_id: Option<EdgeId>,
    pub title: String,
    pub message: String,
    pub severity: Severity,
    #[serde(default)]
    pub fix_suggestion: String,
}

impl LogicError {
    pub fn new(
        id: impl Into<String>,
        severity: Severity,
        title: impl Into<String>,
        message: impl Into<String>,
    ) -> Self {
        Self {
            id: id.into(),
            node_id: None,
            edge_id: None,
            title: title.into(),
            message: message.into(),
            severity,
            fix_suggestion: String::new(),
        }
    }

    pub fn critical(
        id: impl Into<String>,
        title: impl Into<String>,
        message: impl Into<String>,
    ) -> Self {
        Self::new(id, Severity::Critical, title, message)
    }

    pub fn warning(
        id: impl Into<String>,
        title: impl Into<String>,
        message: impl Into<String>,
    ) -> Self {
        Self::new(id, Severity::Warning, title, message)
    }

    pub fn on_node(mut self, node_id: impl Into<NodeId>) -> Self {
        self.node_id = Some(node_id.into());
        self
    }

    pub fn on_edge(mut self, edge_id: impl Into<EdgeId>) -> Self {
        self.edge_id = Some(edge_id.into());
        self
    }

    pub fn with_fix(mut self, fix_suggestion: impl Into<String>) -> Self {
        self.fix_suggestion = fix_suggestion.into();
        self
    }

    pub fn is_critical(&self) -> bool {
        self.severity == Severity::Critical
    }
}

impl fmt::Display for LogicError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}] {}: {}", self.severity, self.title, self.message)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_serializes_with_camel_case_and_skips_missing_targets() {
        let err = LogicError::warning("orphan-n1", "Orphan node", "n1 is not connected")
            .on_node("n1")
            .with_fix("Connect it");
        let value = serde_json::to_value(&err).unwrap();

        assert_eq!(value["nodeId"], "n1");
        assert_eq!(value["fixSuggestion"], "Connect it");
        assert_eq!(value["severity"], "warning");
        assert!(value.get("edgeId").is_none());
    }
}
