//! Pairwise edge legality rules.
//!
//! Each rule names a source pattern and a target pattern; every edge whose
//! endpoints match both produces one diagnostic. New rules are added to the
//! table, the checking loop stays the same.

use logframe_core::{LogicError, Node, NodeCategory, Severity};
use tracing::debug;

use crate::{LogicGraph, NodeRole};

/// Endpoint pattern of a grammar rule.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Matcher {
    Any,
    Role(NodeRole),
    Category(NodeCategory),
    /// Exact node type (coarse or toolbox id)
    Type(String),
}

impl Matcher {
    pub fn matches(&self, node: &Node, role: NodeRole) -> bool {
        match self {
            Matcher::Any => true,
            Matcher::Role(r) => *r == role,
            Matcher::Category(c) => node.resolved_category() == Some(*c),
            Matcher::Type(t) => t.eq_ignore_ascii_case(&node.node_type),
        }
    }
}

#[derive(Debug, Clone)]
pub struct GrammarRule {
    pub id: String,
    pub source: Matcher,
    pub target: Matcher,
    pub severity: Severity,
    pub title: String,
    /// `{source}` and `{target}` are replaced with the endpoint labels.
    pub message: String,
    pub fix_suggestion: String,
}

impl GrammarRule {
    pub fn new(
        id: impl Into<String>,
        source: Matcher,
        target: Matcher,
        severity: Severity,
        title: impl Into<String>,
        message: impl Into<String>,
        fix_suggestion: impl Into<String>,
    ) -> Self {
        Self {
            id: id.into(),
            source,
            target,
            severity,
            title: title.into(),
            message: message.into(),
            fix_suggestion: fix_suggestion.into(),
        }
    }

    fn render(&self, template: &str, source: &Node, target: &Node) -> String {
        template
            .replace("{source}", display_name(source))
            .replace("{target}", display_name(target))
    }
}

fn display_name(node: &Node) -> &str {
    if node.label.trim().is_empty() {
        &node.id
    } else {
        &node.label
    }
}

#[derive(Debug, Clone)]
pub struct GrammarTable {
    rules: Vec<GrammarRule>,
}

impl Default for GrammarTable {
    fn default() -> Self {
        Self {
            rules: vec![
                GrammarRule::new(
                    "backward-flow",
                    Matcher::Role(NodeRole::Outcome),
                    Matcher::Role(NodeRole::Intervention),
                    Severity::Critical,
                    "Backward flow",
                    "Outcome '{source}' points back to intervention '{target}'. Effects cannot cause their own inputs.",
                    "Reverse the connection so that '{target}' leads towards '{source}'.",
                ),
                GrammarRule::new(
                    "output-to-intervention",
                    Matcher::Role(NodeRole::Output),
                    Matcher::Role(NodeRole::Intervention),
                    Severity::Critical,
                    "Backward flow",
                    "Output '{source}' points back to intervention '{target}'.",
                    "Connect interventions to the outputs they produce, not the other way round.",
                ),
                GrammarRule::new(
                    "goal-outgoing",
                    Matcher::Role(NodeRole::Goal),
                    Matcher::Any,
                    Severity::Warning,
                    "Goal is not terminal",
                    "Goal '{source}' has an outgoing connection to '{target}'. The goal should be the end of the chain.",
                    "Remove the connection from '{source}' or point it into the goal instead.",
                ),
                GrammarRule::new(
                    "risk-as-effect",
                    Matcher::Any,
                    Matcher::Role(NodeRole::Risk),
                    Severity::Warning,
                    "Risk used as an effect",
                    "'{source}' points into risk '{target}'. Risks should point at the activities they threaten.",
                    "Connect '{target}' to the intervention it endangers.",
                ),
            ],
        }
    }
}

impl GrammarTable {
    pub fn empty() -> Self {
        Self { rules: Vec::new() }
    }

    pub fn with_rule(mut self, rule: GrammarRule) -> Self {
        self.rules.push(rule);
        self
    }

    pub fn push(&mut self, rule: GrammarRule) {
        self.rules.push(rule);
    }

    pub fn rules(&self) -> &[GrammarRule] {
        &self.rules
    }

    /// One diagnostic per (rule, edge) match, in edge order then rule order.
    pub fn check(&self, graph: &LogicGraph) -> Vec<LogicError> {
        let mut errors = Vec::new();

        for (edge_index, edge) in graph.edges().iter().enumerate() {
            let (s, t) = graph.endpoints_of(edge_index);
            let (source, source_role) = (graph.node_at(s), graph.role_at(s));
            let (target, target_role) = (graph.node_at(t), graph.role_at(t));

            for rule in &self.rules {
                if !rule.source.matches(source, source_role)
                    || !rule.target.matches(target, target_role)
                {
                    continue;
                }
                debug!("Edge {} violates grammar rule {}", edge.id, rule.id);
                errors.push(
                    LogicError::new(
                        format!("grammar-{}-{}", rule.id, edge.id),
                        rule.severity,
                        rule.title.clone(),
                        rule.render(&rule.message, source, target),
                    )
                    .on_edge(edge.id.clone())
                    .with_fix(rule.render(&rule.fix_suggestion, source, target)),
                );
            }
        }

        errors
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use logframe_core::Edge;

    #[test]
    fn test_backward_flow_is_critical() {
        let graph = LogicGraph::new(
            vec![
                Node::new("o", "outcome", NodeCategory::Foundation, "Reading levels"),
                Node::new("i", "tlm_kit", NodeCategory::Intervention, "Kits"),
            ],
            vec![Edge::new("e1", "o", "i")],
        );

        let errors = GrammarTable::default().check(&graph);
        assert_eq!(errors.len(), 1);
        assert_eq!(errors[0].id, "grammar-backward-flow-e1");
        assert_eq!(errors[0].severity, Severity::Critical);
        assert_eq!(errors[0].edge_id.as_deref(), Some("e1"));
        assert!(errors[0].message.contains("Reading levels"));
    }

    #[test]
    fn test_goal_with_outgoing_edge_warns() {
        let graph = LogicGraph::new(
            vec![
                Node::new("g", "vision_goal", NodeCategory::Foundation, "Vision"),
                Node::new("s", "teacher", NodeCategory::Stakeholder, "Teachers"),
            ],
            vec![Edge::new("e1", "g", "s")],
        );

        let errors = GrammarTable::default().check(&graph);
        assert_eq!(errors.len(), 1);
        assert_eq!(errors[0].severity, Severity::Warning);
    }

    #[test]
    fn test_custom_rule_extends_table() {
        let graph = LogicGraph::new(
            vec![
                Node::new("a", "crcc", NodeCategory::Stakeholder, "CRCC"),
                Node::new("b", "smc", NodeCategory::Stakeholder, "SMC"),
            ],
            vec![Edge::new("e1", "a", "b")],
        );

        assert!(GrammarTable::default().check(&graph).is_empty());

        let table = GrammarTable::empty().with_rule(GrammarRule::new(
            "crcc-to-smc",
            Matcher::Type("crcc".into()),
            Matcher::Category(NodeCategory::Stakeholder),
            Severity::Warning,
            "Unusual reporting line",
            "{source} reports to {target}",
            "",
        ));
        let errors = table.check(&graph);
        assert_eq!(errors.len(), 1);
        assert_eq!(errors[0].message, "CRCC reports to SMC");
    }
}
