use logframe_core::{FrameworkCell, Node};
use logframe_graph::LogicGraph;

use crate::extract::{incoming_indicators, risk_assumptions};
use crate::templates::{node_label, render, template_for, Tier, TypeTemplate};

fn fill(cell: &mut FrameworkCell, tier: Option<&Tier>) {
    if let Some(tier) = tier {
        for source in tier.verification {
            cell.push_verification(*source);
        }
    }
}

fn narrative(graph: &LogicGraph, node: &Node, tier: Option<&Tier>) -> String {
    match tier {
        Some(tier) => render(tier.narrative, node, graph.attributes(&node.id)),
        None => node_label(node).to_string(),
    }
}

fn tier_of(node: &Node, pick: fn(&TypeTemplate) -> Option<&Tier>) -> Option<&'static Tier> {
    template_for(&node.node_type).and_then(pick)
}

pub fn goal_cell(graph: &LogicGraph, node: &Node) -> FrameworkCell {
    // A final outcome standing in for the goal keeps its outcome wording.
    let tier = tier_of(node, |t| t.goal.as_ref()).or_else(|| tier_of(node, |t| t.outcome.as_ref()));
    let mut cell = FrameworkCell::new(narrative(graph, node, tier));
    for indicator in incoming_indicators(graph, &node.id) {
        cell.push_indicator(indicator);
    }
    fill(&mut cell, tier);
    cell
}

/// Stand-in goal when the design names none. The warning sits in the
/// indicator list so exporters show it where a target would be.
pub fn placeholder_goal(reason: &str) -> FrameworkCell {
    let mut cell = FrameworkCell::new("Goal not yet defined");
    cell.push_indicator(format!("Warning: {}", reason));
    cell
}

pub fn outcome_cell(graph: &LogicGraph, node: &Node) -> FrameworkCell {
    let tier = tier_of(node, |t| t.outcome.as_ref());
    let mut cell = FrameworkCell::new(narrative(graph, node, tier));
    for indicator in incoming_indicators(graph, &node.id) {
        cell.push_indicator(indicator);
    }
    fill(&mut cell, tier);
    cell
}

/// Output cell, or `None` for types without a deliverable template.
pub fn output_cell(graph: &LogicGraph, node: &Node) -> Option<FrameworkCell> {
    let tier = tier_of(node, |t| t.output.as_ref())?;
    let attributes = graph.attributes(&node.id);

    let mut cell = FrameworkCell::new(render(tier.narrative, node, attributes));
    if let Some(indicator) = tier.indicator {
        cell.push_indicator(render(indicator, node, attributes));
    }
    for indicator in incoming_indicators(graph, &node.id) {
        cell.push_indicator(indicator);
    }
    fill(&mut cell, Some(tier));
    Some(cell)
}

pub fn activity_cell(graph: &LogicGraph, node: &Node) -> Option<FrameworkCell> {
    let tier = tier_of(node, |t| t.activity.as_ref())?;

    let mut cell = FrameworkCell::new(render(tier.narrative, node, graph.attributes(&node.id)));
    fill(&mut cell, Some(tier));
    for assumption in risk_assumptions(graph, &node.id) {
        cell.push_assumption(assumption);
    }
    Some(cell)
}
