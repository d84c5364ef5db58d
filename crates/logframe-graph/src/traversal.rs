use logframe_core::Node;
use std::collections::{HashSet, VecDeque};

use crate::LogicGraph;

/// Which edges a traversal follows.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    /// Source to target (downstream effects)
    Outgoing,
    /// Target to source (upstream causes)
    Incoming,
    /// Both ways, as used for connectivity
    Undirected,
}

/// Configuration for traversal algorithms
#[derive(Debug, Clone, Copy)]
pub struct TraversalConfig {
    /// Maximum depth to traverse (None for unlimited)
    pub max_depth: Option<usize>,
    /// Whether to include the starting node in results
    pub include_start: bool,
    pub direction: Direction,
}

impl Default for TraversalConfig {
    fn default() -> Self {
        Self {
            max_depth: None,
            include_start: true,
            direction: Direction::Outgoing,
        }
    }
}

impl TraversalConfig {
    pub fn with_direction(direction: Direction) -> Self {
        Self {
            direction,
            ..Default::default()
        }
    }
}

/// Breadth-first iterator yielding `(node, depth)` pairs.
pub struct BfsIterator<'g> {
    graph: &'g LogicGraph,
    queue: VecDeque<(usize, usize)>,
    visited: HashSet<usize>,
    config: TraversalConfig,
}

impl<'g> BfsIterator<'g> {
    /// Starting from an unknown node yields nothing.
    pub fn new(graph: &'g LogicGraph, start: &str, config: TraversalConfig) -> Self {
        let mut queue = VecDeque::new();
        let mut visited = HashSet::new();

        if let Some(index) = graph.index_of(start) {
            visited.insert(index);
            queue.push_back((index, 0));
        }

        Self {
            graph,
            queue,
            visited,
            config,
        }
    }

    fn neighbours(&self, index: usize) -> Vec<usize> {
        match self.config.direction {
            Direction::Outgoing => self.graph.successors(index).collect(),
            Direction::Incoming => self.graph.predecessors(index).collect(),
            Direction::Undirected => self
                .graph
                .successors(index)
                .chain(self.graph.predecessors(index))
                .collect(),
        }
    }
}

impl<'g> Iterator for BfsIterator<'g> {
    type Item = (&'g Node, usize);

    fn next(&mut self) -> Option<Self::Item> {
        while let Some((current, depth)) = self.queue.pop_front() {
            let expand = self.config.max_depth.map_or(true, |max| depth < max);
            if expand {
                for neighbour in self.neighbours(current) {
                    if self.visited.insert(neighbour) {
                        self.queue.push_back((neighbour, depth + 1));
                    }
                }
            }

            if depth == 0 && !self.config.include_start {
                continue;
            }
            return Some((self.graph.node_at(current), depth));
        }
        None
    }
}

/// Number of nodes reachable from `start`, the start node included.
pub fn reachable_count(graph: &LogicGraph, start: &str, direction: Direction) -> usize {
    BfsIterator::new(graph, start, TraversalConfig::with_direction(direction)).count()
}

#[cfg(test)]
mod tests {
    use super::*;
    use logframe_core::{Edge, NodeCategory};

    fn chain() -> LogicGraph {
        LogicGraph::new(
            vec![
                Node::new("a", "intervention", NodeCategory::Intervention, "A"),
                Node::new("b", "bridge", NodeCategory::Bridge, "B"),
                Node::new("c", "outcome", NodeCategory::Foundation, "C"),
                Node::new("d", "stakeholder", NodeCategory::Stakeholder, "D"),
            ],
            vec![
                Edge::new("e1", "a", "b"),
                Edge::new("e2", "b", "c"),
                Edge::new("e3", "d", "b"),
            ],
        )
    }

    #[test]
    fn test_bfs_respects_direction() {
        let graph = chain();
        assert_eq!(reachable_count(&graph, "a", Direction::Outgoing), 3);
        assert_eq!(reachable_count(&graph, "c", Direction::Outgoing), 1);
        assert_eq!(reachable_count(&graph, "c", Direction::Undirected), 4);
        assert_eq!(reachable_count(&graph, "missing", Direction::Undirected), 0);
    }

    #[test]
    fn test_bfs_depth_limit_and_start_exclusion() {
        let graph = chain();
        let config = TraversalConfig {
            max_depth: Some(1),
            include_start: false,
            direction: Direction::Incoming,
        };
        let visited: Vec<(&str, usize)> = BfsIterator::new(&graph, "c", config)
            .map(|(n, d)| (n.id.as_str(), d))
            .collect();
        assert_eq!(visited, vec![("b", 1)]);
    }
}
