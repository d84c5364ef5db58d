use logframe_graph::{LogicGraph, NodeRole};

use crate::templates::node_label;

/// Indicator labels attached to a node's incoming edges, flattened in edge order.
pub fn incoming_indicators(graph: &LogicGraph, node_id: &str) -> Vec<String> {
    graph
        .incoming_edges(node_id)
        .flat_map(|edge| edge.indicators.iter())
        .map(|indicator| indicator.label.trim())
        .filter(|label| !label.is_empty())
        .map(str::to_string)
        .collect()
}

/// Assumptions for an activity: one entry per risk node feeding into it.
pub fn risk_assumptions(graph: &LogicGraph, node_id: &str) -> Vec<String> {
    graph
        .parents_of(node_id)
        .into_iter()
        .filter(|parent| graph.role(&parent.id) == Some(NodeRole::Risk))
        .map(|risk| {
            graph
                .attributes(&risk.id)
                .and_then(|attrs| attrs.text("mitigation_plan"))
                .map(|plan| plan.trim().to_string())
                .filter(|plan| !plan.is_empty())
                .unwrap_or_else(|| {
                    format!("Risk: {} (no mitigation plan recorded)", node_label(risk))
                })
        })
        .collect()
}
