use logframe_core::LogicError;
use serde::Serialize;
use tracing::{debug, info};

use crate::traversal::{reachable_count, Direction};
use crate::{GrammarTable, LogicGraph};

/// Purely diagnostic result of the graph-theory checks. No score.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StructuralReport {
    pub has_cycle: bool,
    pub is_fragmented: bool,
    pub errors: Vec<LogicError>,
}

impl StructuralReport {
    pub fn has_critical(&self) -> bool {
        self.errors.iter().any(LogicError::is_critical)
    }
}

#[derive(Debug, Clone, Default)]
pub struct StructuralValidator {
    grammar: GrammarTable,
}

impl StructuralValidator {
    pub fn new(grammar: GrammarTable) -> Self {
        Self { grammar }
    }

    pub fn grammar(&self) -> &GrammarTable {
        &self.grammar
    }

    pub fn validate(&self, graph: &LogicGraph) -> StructuralReport {
        let mut report = StructuralReport {
            has_cycle: has_cycle(graph),
            is_fragmented: is_fragmented(graph),
            errors: Vec::new(),
        };

        if report.has_cycle {
            report.errors.push(
                LogicError::critical(
                    "structural-cycle",
                    "Circular logic",
                    "The design contains a loop: a chain of connections leads back to where it started, so a result ends up causing its own cause.",
                )
                .with_fix("Find the connection that points back upstream and remove or reverse it."),
            );
        }

        if report.is_fragmented {
            report.errors.push(
                LogicError::critical(
                    "structural-fragmented",
                    "Disconnected islands",
                    "Parts of the design are not connected to each other, so they cannot contribute to a single goal.",
                )
                .with_fix("Link every group of nodes into the main chain or remove the stray ones."),
            );
        }

        report.errors.extend(self.grammar.check(graph));

        info!(
            "Structural validation: cycle={}, fragmented={}, {} issue(s)",
            report.has_cycle,
            report.is_fragmented,
            report.errors.len()
        );
        report
    }
}

/// True when some directed walk returns to a node already on it.
///
/// Iterative depth-first search from every unvisited node, tracking the
/// nodes currently on the stack.
pub fn has_cycle(graph: &LogicGraph) -> bool {
    #[derive(Clone, Copy, PartialEq)]
    enum Mark {
        Unvisited,
        OnStack,
        Done,
    }

    let n = graph.node_count();
    let mut marks = vec![Mark::Unvisited; n];

    for root in 0..n {
        if marks[root] != Mark::Unvisited {
            continue;
        }

        let mut stack: Vec<(usize, Vec<usize>)> = vec![(root, graph.successors(root).collect())];
        marks[root] = Mark::OnStack;

        while let Some(top) = stack.last_mut() {
            let current = top.0;
            match top.1.pop() {
                Some(next) => match marks[next] {
                    Mark::OnStack => {
                        debug!("Cycle closes at node {}", graph.node_at(next).id);
                        return true;
                    }
                    Mark::Unvisited => {
                        marks[next] = Mark::OnStack;
                        let successors = graph.successors(next).collect();
                        stack.push((next, successors));
                    }
                    Mark::Done => {}
                },
                None => {
                    marks[current] = Mark::Done;
                    stack.pop();
                }
            }
        }
    }

    false
}

/// True when the graph, with edges taken both ways, splits into more than
/// one component. Graphs with 0 or 1 nodes are never fragmented.
pub fn is_fragmented(graph: &LogicGraph) -> bool {
    let total = graph.node_count();
    if total <= 1 {
        return false;
    }
    let start = &graph.nodes()[0].id;
    reachable_count(graph, start, Direction::Undirected) < total
}

#[cfg(test)]
mod tests {
    use super::*;
    use logframe_core::{Edge, Node, NodeCategory};

    fn nodes(ids: &[&str]) -> Vec<Node> {
        ids.iter()
            .map(|id| Node::new(*id, "stakeholder", NodeCategory::Stakeholder, *id))
            .collect()
    }

    fn edges(pairs: &[(&str, &str)]) -> Vec<Edge> {
        pairs
            .iter()
            .enumerate()
            .map(|(i, (s, t))| Edge::new(format!("e{}", i), *s, *t))
            .collect()
    }

    #[test]
    fn test_three_cycle_detected() {
        let graph = LogicGraph::new(
            nodes(&["A", "B", "C"]),
            edges(&[("A", "B"), ("B", "C"), ("C", "A")]),
        );
        assert!(has_cycle(&graph));
    }

    #[test]
    fn test_chain_has_no_cycle() {
        let graph = LogicGraph::new(nodes(&["A", "B", "C"]), edges(&[("A", "B"), ("B", "C")]));
        assert!(!has_cycle(&graph));
    }

    #[test]
    fn test_diamond_is_not_a_cycle() {
        let graph = LogicGraph::new(
            nodes(&["A", "B", "C", "D"]),
            edges(&[("A", "B"), ("A", "C"), ("B", "D"), ("C", "D")]),
        );
        assert!(!has_cycle(&graph));
    }

    #[test]
    fn test_self_loop_and_late_cycle() {
        let looped = LogicGraph::new(nodes(&["A"]), edges(&[("A", "A")]));
        assert!(has_cycle(&looped));

        // The cycle is only reachable from the second root.
        let late = LogicGraph::new(
            nodes(&["A", "B", "C"]),
            edges(&[("B", "C"), ("C", "B")]),
        );
        assert!(has_cycle(&late));
    }

    #[test]
    fn test_fragmentation() {
        let split = LogicGraph::new(
            nodes(&["A", "B", "C", "D"]),
            edges(&[("A", "B"), ("C", "D")]),
        );
        assert!(is_fragmented(&split));

        let joined = LogicGraph::new(
            nodes(&["A", "B", "C", "D"]),
            edges(&[("A", "B"), ("C", "D"), ("B", "C")]),
        );
        assert!(!is_fragmented(&joined));
    }

    #[test]
    fn test_tiny_graphs_are_never_fragmented() {
        assert!(!is_fragmented(&LogicGraph::new(vec![], vec![])));
        assert!(!is_fragmented(&LogicGraph::new(nodes(&["A"]), vec![])));
    }

    #[test]
    fn test_report_collects_structural_errors() {
        let graph = LogicGraph::new(
            nodes(&["A", "B", "C", "D"]),
            edges(&[("A", "B"), ("B", "A"), ("C", "D")]),
        );
        let report = StructuralValidator::default().validate(&graph);
        assert!(report.has_cycle);
        assert!(report.is_fragmented);
        assert!(report.has_critical());
        let ids: Vec<&str> = report.errors.iter().map(|e| e.id.as_str()).collect();
        assert_eq!(ids, vec!["structural-cycle", "structural-fragmented"]);
    }
}
