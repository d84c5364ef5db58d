use logframe_core::{FrameworkCell, LfaDocument, Node};
use logframe_graph::{LogicGraph, NodeRole};
use tracing::debug;

use crate::cells::{activity_cell, goal_cell, outcome_cell, output_cell, placeholder_goal};
use crate::templates::has_deliverable;
use crate::CompilationStrategy;

/// Generic strategy, also used for foundational literacy and numeracy.
#[derive(Debug, Clone, Copy, Default)]
pub struct FlnCompiler;

impl FlnCompiler {
    /// The explicit goal node, else the single final outcome.
    pub fn locate_goal(graph: &LogicGraph) -> Option<&Node> {
        if let Some(goal) = graph.nodes_with_role(NodeRole::Goal).next() {
            return Some(goal);
        }

        let mut finals = graph
            .nodes_with_role(NodeRole::Outcome)
            .filter(|node| graph.out_degree(&node.id) == 0);
        match (finals.next(), finals.next()) {
            (Some(only), None) => Some(only),
            _ => None,
        }
    }
}

impl CompilationStrategy for FlnCompiler {
    fn name(&self) -> &'static str {
        "fln"
    }

    fn compile(&self, graph: &LogicGraph) -> LfaDocument {
        let goal_node = Self::locate_goal(graph);
        let goal = match goal_node {
            Some(node) => goal_cell(graph, node),
            None => placeholder_goal(
                "no goal node found; add a vision goal or leave exactly one final outcome",
            ),
        };
        let goal_id = goal_node.map(|node| node.id.as_str());

        let outcomes: Vec<FrameworkCell> = graph
            .nodes_with_roles()
            .filter(|(node, role)| {
                matches!(role, NodeRole::Outcome | NodeRole::Bridge)
                    && Some(node.id.as_str()) != goal_id
            })
            .map(|(node, _)| outcome_cell(graph, node))
            .collect();

        let deliverables: Vec<&Node> = graph
            .nodes_with_role(NodeRole::Intervention)
            .filter(|node| has_deliverable(&node.node_type))
            .collect();
        let outputs = deliverables
            .iter()
            .filter_map(|node| output_cell(graph, node))
            .collect();
        let activities = deliverables
            .iter()
            .filter_map(|node| activity_cell(graph, node))
            .collect();

        let document = LfaDocument {
            goal: Some(goal),
            outcomes,
            outputs,
            activities,
        };
        debug!("FLN compilation produced {} cell(s)", document.cell_count());
        document
    }
}
