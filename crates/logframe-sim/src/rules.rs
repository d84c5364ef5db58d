//! Semantic rule catalog.
//!
//! Each rule is a row: id, penalty, how the penalty applies, and a detector
//! over the indexed graph. Detectors are independent of each other, so the
//! total penalty is the same in any evaluation order.

use lazy_static::lazy_static;
use logframe_core::{Edge, LogicError, Node, SimulationConfig};
use logframe_graph::{LogicGraph, NodeRole};
use regex::Regex;
use std::fmt;
use tracing::debug;

use crate::scoring::SimulationResult;

pub type DetectFn = fn(&LogicGraph, &SimulationConfig) -> Vec<LogicError>;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PenaltyMode {
    /// Penalty charged for every violation found.
    PerViolation,
    /// Penalty charged once if the rule fires at all.
    Once,
}

#[derive(Clone, Copy)]
pub struct RuleSpec {
    pub id: &'static str,
    pub penalty: u32,
    pub mode: PenaltyMode,
    pub detect: DetectFn,
}

impl fmt::Debug for RuleSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RuleSpec")
            .field("id", &self.id)
            .field("penalty", &self.penalty)
            .field("mode", &self.mode)
            .finish()
    }
}

impl RuleSpec {
    pub fn penalty_for(&self, violations: usize) -> u32 {
        match self.mode {
            PenaltyMode::PerViolation => self.penalty.saturating_mul(violations as u32),
            PenaltyMode::Once if violations > 0 => self.penalty,
            PenaltyMode::Once => 0,
        }
    }
}

pub const RULE_CATALOG: &[RuleSpec] = &[
    RuleSpec {
        id: "orphan",
        penalty: 10,
        mode: PenaltyMode::PerViolation,
        detect: detect_orphans,
    },
    RuleSpec {
        id: "miracle",
        penalty: 15,
        mode: PenaltyMode::PerViolation,
        detect: detect_miracle_jumps,
    },
    RuleSpec {
        id: "stakeholder-overload",
        penalty: 20,
        mode: PenaltyMode::Once,
        detect: detect_stakeholder_overload,
    },
    RuleSpec {
        id: "missing-authority",
        penalty: 10,
        mode: PenaltyMode::Once,
        detect: detect_missing_authority,
    },
    RuleSpec {
        id: "measure",
        penalty: 5,
        mode: PenaltyMode::PerViolation,
        detect: detect_undefined_measurement,
    },
];

/// Violations and penalty from a single rule.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RuleOutcome {
    pub rule_id: &'static str,
    pub penalty: u32,
    pub violations: Vec<LogicError>,
}

pub fn evaluate_rule(rule: &RuleSpec, graph: &LogicGraph, config: &SimulationConfig) -> RuleOutcome {
    let violations = (rule.detect)(graph, config);
    let penalty = rule.penalty_for(violations.len());
    if !violations.is_empty() {
        debug!(
            "Rule {} fired {} time(s), penalty {}",
            rule.id,
            violations.len(),
            penalty
        );
    }
    RuleOutcome {
        rule_id: rule.id,
        penalty,
        violations,
    }
}

/// An ordered set of rules; defaults to [`RULE_CATALOG`].
#[derive(Debug, Clone)]
pub struct RuleSet {
    rules: Vec<RuleSpec>,
}

impl Default for RuleSet {
    fn default() -> Self {
        Self {
            rules: RULE_CATALOG.to_vec(),
        }
    }
}

impl RuleSet {
    pub fn new(rules: Vec<RuleSpec>) -> Self {
        Self { rules }
    }

    pub fn with_rule(mut self, rule: RuleSpec) -> Self {
        self.rules.push(rule);
        self
    }

    pub fn rules(&self) -> &[RuleSpec] {
        &self.rules
    }

    /// Errors are listed in rule order, then in graph order within a rule.
    pub fn evaluate(&self, graph: &LogicGraph, config: &SimulationConfig) -> SimulationResult {
        let mut total_penalty = 0u32;
        let mut errors = Vec::new();

        for rule in &self.rules {
            let outcome = evaluate_rule(rule, graph, config);
            total_penalty = total_penalty.saturating_add(outcome.penalty);
            errors.extend(outcome.violations);
        }

        SimulationResult::from_penalties(total_penalty, errors)
    }
}

lazy_static! {
    static ref TEACHER_LABEL: Regex = Regex::new(r"(?i)teacher").unwrap();
    static ref AUTHORITY_LABEL: Regex =
        Regex::new(r"(?i)\b(beo|deo)\b|block\s+(education\s+)?officer").unwrap();
}

const TEACHER_TYPES: &[&str] = &["teacher", "head_teacher"];
const AUTHORITY_TYPES: &[&str] = &["beo", "deo", "block_officer"];

/// Type ids first; a free-text label only counts on stakeholder nodes.
pub fn is_teacher(node: &Node, role: NodeRole) -> bool {
    TEACHER_TYPES.contains(&node.node_type.as_str())
        || (role == NodeRole::Stakeholder && TEACHER_LABEL.is_match(&node.label))
}

pub fn is_authority(node: &Node) -> bool {
    AUTHORITY_TYPES.contains(&node.node_type.as_str()) || AUTHORITY_LABEL.is_match(&node.label)
}

fn display_name(node: &Node) -> &str {
    if node.label.trim().is_empty() {
        &node.id
    } else {
        &node.label
    }
}

fn has_indicators(edge: &Edge) -> bool {
    edge.indicators.iter().any(|i| !i.label.trim().is_empty())
}

fn detect_orphans(graph: &LogicGraph, _config: &SimulationConfig) -> Vec<LogicError> {
    graph
        .nodes()
        .iter()
        .filter(|node| graph.edges_touching(&node.id).is_empty())
        .map(|node| {
            LogicError::warning(
                format!("orphan-{}", node.id),
                "Orphan node",
                format!(
                    "\"{}\" is not connected to anything, so it plays no part in the theory of change.",
                    display_name(node)
                ),
            )
            .on_node(node.id.clone())
            .with_fix("Connect it to the step it supports, or remove it.")
        })
        .collect()
}

fn detect_miracle_jumps(graph: &LogicGraph, _config: &SimulationConfig) -> Vec<LogicError> {
    graph
        .edges()
        .iter()
        .filter(|edge| {
            graph.role(&edge.source) == Some(NodeRole::Intervention)
                && graph.role(&edge.target) == Some(NodeRole::Outcome)
        })
        .filter_map(|edge| {
            let source = graph.node(&edge.source)?;
            let target = graph.node(&edge.target)?;
            Some(
                LogicError::critical(
                    format!("miracle-{}", edge.id),
                    "Miracle jump",
                    format!(
                        "\"{}\" leads straight to \"{}\" with no change in practice or behaviour in between.",
                        display_name(source),
                        display_name(target)
                    ),
                )
                .on_edge(edge.id.clone())
                .with_fix("Insert the practice shift that the intervention is expected to cause before the outcome."),
            )
        })
        .collect()
}

fn detect_stakeholder_overload(graph: &LogicGraph, config: &SimulationConfig) -> Vec<LogicError> {
    let busiest = graph
        .nodes_with_roles()
        .filter(|(node, role)| is_teacher(node, *role))
        .map(|(node, _)| (node, graph.in_degree(&node.id)))
        .fold(None::<(&Node, usize)>, |best, (node, load)| match best {
            Some((_, best_load)) if best_load >= load => best,
            _ => Some((node, load)),
        });

    match busiest {
        Some((node, load)) if load > config.overload_ceiling => vec![LogicError::warning(
            "stakeholder-overload",
            "Stakeholder overload",
            format!(
                "\"{}\" is expected to absorb {} separate demands; more than {} is unlikely to be carried out.",
                display_name(node),
                load,
                config.overload_ceiling
            ),
        )
        .on_node(node.id.clone())
        .with_fix("Spread the work across other actors or merge overlapping interventions.")],
        _ => Vec::new(),
    }
}

fn detect_missing_authority(graph: &LogicGraph, config: &SimulationConfig) -> Vec<LogicError> {
    if graph.node_count() <= config.authority_scale_threshold
        || graph.nodes().iter().any(is_authority)
    {
        return Vec::new();
    }

    vec![LogicError::warning(
        "missing-authority",
        "Missing system authority",
        format!(
            "A design with {} elements has no block or district education officer to sanction and sustain it.",
            graph.node_count()
        ),
    )
    .with_fix("Add the Block Education Officer (or equivalent) and connect them to the actors they oversee.")]
}

fn detect_undefined_measurement(graph: &LogicGraph, _config: &SimulationConfig) -> Vec<LogicError> {
    graph
        .edges()
        .iter()
        .filter(|edge| graph.role(&edge.source) == Some(NodeRole::Intervention) && !has_indicators(edge))
        .map(|edge| {
            let source = graph
                .node(&edge.source)
                .map(display_name)
                .unwrap_or(edge.source.as_str());
            LogicError::warning(
                format!("measure-{}", edge.id),
                "Undefined measurement",
                format!(
                    "Nothing says how the effect of \"{}\" along this connection will be measured.",
                    source
                ),
            )
            .on_edge(edge.id.clone())
            .with_fix("Attach at least one indicator to the connection.")
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use logframe_core::{Edge, Node, NodeCategory};

    fn node(id: &str, node_type: &str, category: NodeCategory, label: &str) -> Node {
        Node::new(id, node_type, category, label)
    }

    fn rule(id: &str) -> &'static RuleSpec {
        RULE_CATALOG.iter().find(|r| r.id == id).unwrap()
    }

    fn config() -> SimulationConfig {
        SimulationConfig::default()
    }

    #[test]
    fn test_orphan_rule_in_isolation() {
        let graph = LogicGraph::new(
            vec![
                node("a", "teacher", NodeCategory::Stakeholder, "Teachers"),
                node("b", "crcc", NodeCategory::Stakeholder, "CRCC"),
                node("c", "smc", NodeCategory::Stakeholder, "SMC"),
            ],
            vec![Edge::new("e1", "a", "b")],
        );
        let outcome = evaluate_rule(rule("orphan"), &graph, &config());
        assert_eq!(outcome.penalty, 10);
        assert_eq!(outcome.violations[0].id, "orphan-c");
        assert_eq!(outcome.violations[0].node_id.as_deref(), Some("c"));
    }

    #[test]
    fn test_miracle_rule_flags_direct_intervention_to_outcome() {
        let graph = LogicGraph::new(
            vec![
                node("kit", "tlm_kit", NodeCategory::Intervention, "TLM Kit"),
                node("lo", "learning_outcome", NodeCategory::Foundation, "Reading"),
            ],
            vec![Edge::new("e1", "kit", "lo").with_indicator("Kits in use", "%")],
        );
        let outcome = evaluate_rule(rule("miracle"), &graph, &config());
        assert_eq!(outcome.penalty, 15);
        assert_eq!(outcome.violations[0].id, "miracle-e1");
        assert!(outcome.violations[0].is_critical());
    }

    #[test]
    fn test_overload_is_flat_and_uses_ceiling() {
        let mut nodes = vec![node("t", "teacher", NodeCategory::Stakeholder, "Teachers")];
        let mut edges = Vec::new();
        for i in 0..5 {
            nodes.push(node(&format!("i{}", i), "intervention", NodeCategory::Intervention, "x"));
            edges.push(Edge::new(format!("e{}", i), format!("i{}", i), "t"));
        }
        let graph = LogicGraph::new(nodes, edges);

        let outcome = evaluate_rule(rule("stakeholder-overload"), &graph, &config());
        assert_eq!(outcome.violations.len(), 1);
        assert_eq!(outcome.penalty, 20);

        let relaxed = SimulationConfig {
            overload_ceiling: 5,
            ..config()
        };
        assert!(evaluate_rule(rule("stakeholder-overload"), &graph, &relaxed)
            .violations
            .is_empty());
    }

    #[test]
    fn test_teacher_label_fallback_only_for_stakeholders() {
        let custom = node("x", "custom_actor", NodeCategory::Stakeholder, "Para-teacher");
        assert!(is_teacher(&custom, NodeRole::Stakeholder));

        let training = node("y", "teacher_training", NodeCategory::Intervention, "Teacher training");
        assert!(!is_teacher(&training, NodeRole::Intervention));
    }

    #[test]
    fn test_missing_authority_depends_on_scale() {
        let small: Vec<Node> = (0..10)
            .map(|i| node(&format!("n{}", i), "smc", NodeCategory::Stakeholder, "SMC"))
            .collect();
        let graph = LogicGraph::new(small.clone(), vec![]);
        assert!(evaluate_rule(rule("missing-authority"), &graph, &config())
            .violations
            .is_empty());

        let mut large = small;
        large.push(node("n10", "smc", NodeCategory::Stakeholder, "SMC"));
        let graph = LogicGraph::new(large.clone(), vec![]);
        assert_eq!(
            evaluate_rule(rule("missing-authority"), &graph, &config()).penalty,
            10
        );

        large.push(node("officer", "custom", NodeCategory::Stakeholder, "Block Education Officer"));
        let graph = LogicGraph::new(large, vec![]);
        assert!(evaluate_rule(rule("missing-authority"), &graph, &config())
            .violations
            .is_empty());
    }

    #[test]
    fn test_authority_label_matches_whole_words() {
        assert!(is_authority(&node("a", "x", NodeCategory::Stakeholder, "BEO Office")));
        assert!(is_authority(&node("b", "x", NodeCategory::Stakeholder, "block officer")));
        assert!(!is_authority(&node("c", "x", NodeCategory::Stakeholder, "Beowulf club")));
    }

    #[test]
    fn test_measurement_ignores_blank_indicator_labels() {
        let graph = LogicGraph::new(
            vec![
                node("kit", "tlm_kit", NodeCategory::Intervention, "TLM Kit"),
                node("shift", "practice_shift", NodeCategory::Bridge, "Shift"),
            ],
            vec![Edge::new("e1", "kit", "shift").with_indicator("  ", "")],
        );
        let outcome = evaluate_rule(rule("measure"), &graph, &config());
        assert_eq!(outcome.violations[0].id, "measure-e1");
        assert_eq!(outcome.penalty, 5);
    }

    #[test]
    fn test_rule_order_does_not_change_score() {
        let graph = LogicGraph::new(
            vec![
                node("kit", "tlm_kit", NodeCategory::Intervention, "TLM Kit"),
                node("lo", "learning_outcome", NodeCategory::Foundation, "Reading"),
                node("lonely", "smc", NodeCategory::Stakeholder, "SMC"),
            ],
            vec![Edge::new("e1", "kit", "lo")],
        );
        let forward = RuleSet::default().evaluate(&graph, &config());
        let mut reversed_rules = RULE_CATALOG.to_vec();
        reversed_rules.reverse();
        let reversed = RuleSet::new(reversed_rules).evaluate(&graph, &config());

        assert_eq!(forward.score, reversed.score);
        assert_eq!(forward.score, 100 - 10 - 15 - 5);
    }
}
