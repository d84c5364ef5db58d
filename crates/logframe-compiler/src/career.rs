use logframe_core::{Domain, FrameworkCell, LfaDocument, Marker, Node, NodeCategory, ToolboxRegistry};
use logframe_graph::LogicGraph;
use tracing::debug;

use crate::cells::{activity_cell, goal_cell, outcome_cell, output_cell, placeholder_goal};
use crate::CompilationStrategy;

/// Fixed-shape strategy for career readiness designs.
///
/// Only career toolbox types are recognised. Each tier is filled only when
/// the tier above it exists: outcomes need a goal marker, outputs need an
/// outcome, activities need an output.
#[derive(Debug, Clone, Copy, Default)]
pub struct CareerCompiler;

fn career_item(node: &Node) -> Option<&'static logframe_core::ToolboxItem> {
    ToolboxRegistry::lookup(Domain::CareerReadiness, &node.node_type)
}

impl CareerCompiler {
    pub fn locate_goal(graph: &LogicGraph) -> Option<&Node> {
        graph
            .nodes()
            .iter()
            .find(|node| career_item(node).map_or(false, |item| item.marker == Some(Marker::Goal)))
    }

    fn is_outcome(node: &Node) -> bool {
        career_item(node).map_or(false, |item| {
            item.marker == Some(Marker::Outcome) || item.category == NodeCategory::Bridge
        })
    }

    fn is_deliverable(node: &Node) -> bool {
        career_item(node).map_or(false, |item| {
            item.marker.is_none() && item.category == NodeCategory::Intervention
        })
    }
}

impl CompilationStrategy for CareerCompiler {
    fn name(&self) -> &'static str {
        "career-readiness"
    }

    fn compile(&self, graph: &LogicGraph) -> LfaDocument {
        let Some(goal_node) = Self::locate_goal(graph) else {
            debug!("Career compilation: no income or self-employment goal");
            return LfaDocument {
                goal: Some(placeholder_goal(
                    "no sustainable income or self employment goal node found",
                )),
                ..Default::default()
            };
        };

        let outcomes: Vec<FrameworkCell> = graph
            .nodes()
            .iter()
            .filter(|node| Self::is_outcome(node))
            .map(|node| outcome_cell(graph, node))
            .collect();

        let mut document = LfaDocument {
            goal: Some(goal_cell(graph, goal_node)),
            outcomes,
            ..Default::default()
        };
        if document.outcomes.is_empty() {
            return document;
        }

        let deliverables: Vec<&Node> = graph
            .nodes()
            .iter()
            .filter(|node| Self::is_deliverable(node))
            .collect();
        document.outputs = deliverables
            .iter()
            .filter_map(|node| output_cell(graph, node))
            .collect();
        if !document.outputs.is_empty() {
            document.activities = deliverables
                .iter()
                .filter_map(|node| activity_cell(graph, node))
                .collect();
        }

        debug!("Career compilation produced {} cell(s)", document.cell_count());
        document
    }
}
