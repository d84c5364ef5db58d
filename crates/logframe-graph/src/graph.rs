use logframe_core::{
    AttributeIssue, DecodedAttributes, Edge, EdgeId, GraphSnapshot, Node, NodeId, ToolboxRegistry,
};
use serde::Serialize;
use std::collections::{HashMap, HashSet};
use tracing::{debug, warn};

use crate::NodeRole;

/// An edge whose source or target is not part of the snapshot.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DanglingEdge {
    pub edge_id: EdgeId,
    pub missing: Vec<NodeId>,
}

/// Data-integrity faults found while indexing a snapshot. Duplicates and
/// dangling edges are left out of the indexed graph; uncategorized nodes and
/// bad attributes are kept with the faulty part treated as absent.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct IntegrityReport {
    pub duplicate_node_ids: Vec<NodeId>,
    pub duplicate_edge_ids: Vec<EdgeId>,
    pub dangling_edges: Vec<DanglingEdge>,
    /// Nodes with no usable category, neither sent nor implied by their type.
    pub uncategorized_nodes: Vec<NodeId>,
    pub attribute_issues: Vec<AttributeIssue>,
}

impl IntegrityReport {
    pub fn is_clean(&self) -> bool {
        self.duplicate_node_ids.is_empty()
            && self.duplicate_edge_ids.is_empty()
            && self.dangling_edges.is_empty()
            && self.uncategorized_nodes.is_empty()
            && self.attribute_issues.is_empty()
    }
}

/// Read-only, indexed view over one graph snapshot.
///
/// Node and edge order follow the snapshot so that every consumer iterates
/// deterministically. Dangling edges and duplicate ids are dropped on
/// construction and recorded in [`IntegrityReport`].
#[derive(Debug, Clone)]
pub struct LogicGraph {
    nodes: Vec<Node>,
    roles: Vec<NodeRole>,
    attributes: Vec<DecodedAttributes>,
    edges: Vec<Edge>,
    /// (source index, target index) per edge
    endpoints: Vec<(usize, usize)>,
    node_index: HashMap<NodeId, usize>,
    outgoing: Vec<Vec<usize>>,
    incoming: Vec<Vec<usize>>,
    integrity: IntegrityReport,
}

impl LogicGraph {
    pub fn from_snapshot(snapshot: &GraphSnapshot) -> Self {
        Self::new(snapshot.nodes.clone(), snapshot.edges.clone())
    }

    pub fn new(raw_nodes: Vec<Node>, raw_edges: Vec<Edge>) -> Self {
        let mut integrity = IntegrityReport::default();
        let mut node_index = HashMap::with_capacity(raw_nodes.len());
        let mut nodes = Vec::with_capacity(raw_nodes.len());

        for node in raw_nodes {
            if node_index.contains_key(&node.id) {
                integrity.duplicate_node_ids.push(node.id.clone());
                continue;
            }
            node_index.insert(node.id.clone(), nodes.len());
            nodes.push(node);
        }

        integrity.uncategorized_nodes = nodes
            .iter()
            .filter(|node| node.resolved_category().is_none())
            .map(|node| node.id.clone())
            .collect();

        let roles: Vec<NodeRole> = nodes.iter().map(NodeRole::of).collect();
        let attributes: Vec<DecodedAttributes> = nodes
            .iter()
            .map(ToolboxRegistry::decode_attributes)
            .collect();
        for decoded in &attributes {
            integrity.attribute_issues.extend(decoded.issues.iter().cloned());
        }

        let mut edges = Vec::with_capacity(raw_edges.len());
        let mut endpoints = Vec::with_capacity(raw_edges.len());
        let mut outgoing = vec![Vec::new(); nodes.len()];
        let mut incoming = vec![Vec::new(); nodes.len()];
        let mut seen_edges = HashSet::with_capacity(raw_edges.len());

        for edge in raw_edges {
            if !seen_edges.insert(edge.id.clone()) {
                integrity.duplicate_edge_ids.push(edge.id.clone());
                continue;
            }

            let source = node_index.get(&edge.source).copied();
            let target = node_index.get(&edge.target).copied();
            let (source, target) = match (source, target) {
                (Some(s), Some(t)) => (s, t),
                _ => {
                    let mut missing = Vec::new();
                    if source.is_none() {
                        missing.push(edge.source.clone());
                    }
                    if target.is_none() && edge.target != edge.source {
                        missing.push(edge.target.clone());
                    }
                    integrity.dangling_edges.push(DanglingEdge {
                        edge_id: edge.id.clone(),
                        missing,
                    });
                    continue;
                }
            };

            let index = edges.len();
            outgoing[source].push(index);
            incoming[target].push(index);
            endpoints.push((source, target));
            edges.push(edge);
        }

        if !integrity.is_clean() {
            warn!(
                "Snapshot integrity: {} duplicate nodes, {} duplicate edges, {} dangling edges, {} uncategorized nodes, {} attribute issues",
                integrity.duplicate_node_ids.len(),
                integrity.duplicate_edge_ids.len(),
                integrity.dangling_edges.len(),
                integrity.uncategorized_nodes.len(),
                integrity.attribute_issues.len()
            );
        }
        debug!("Indexed graph: {} nodes, {} edges", nodes.len(), edges.len());

        Self {
            nodes,
            roles,
            attributes,
            edges,
            endpoints,
            node_index,
            outgoing,
            incoming,
            integrity,
        }
    }

    pub fn nodes(&self) -> &[Node] {
        &self.nodes
    }

    pub fn edges(&self) -> &[Edge] {
        &self.edges
    }

    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    pub fn edge_count(&self) -> usize {
        self.edges.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn integrity(&self) -> &IntegrityReport {
        &self.integrity
    }

    pub fn node(&self, id: &str) -> Option<&Node> {
        self.index_of(id).map(|i| &self.nodes[i])
    }

    pub fn contains(&self, id: &str) -> bool {
        self.node_index.contains_key(id)
    }

    pub fn role(&self, id: &str) -> Option<NodeRole> {
        self.index_of(id).map(|i| self.roles[i])
    }

    /// Schema-checked attributes of a node. Malformed values are absent.
    pub fn attributes(&self, id: &str) -> Option<&DecodedAttributes> {
        self.index_of(id).map(|i| &self.attributes[i])
    }

    /// Nodes together with their resolved role, in snapshot order.
    pub fn nodes_with_roles(&self) -> impl Iterator<Item = (&Node, NodeRole)> + '_ {
        self.nodes.iter().zip(self.roles.iter().copied())
    }

    pub fn nodes_with_role(&self, role: NodeRole) -> impl Iterator<Item = &Node> + '_ {
        self.nodes_with_roles()
            .filter(move |(_, r)| *r == role)
            .map(|(n, _)| n)
    }

    pub fn outgoing_edges(&self, id: &str) -> impl Iterator<Item = &Edge> + '_ {
        self.adjacent(&self.outgoing, id)
    }

    pub fn incoming_edges(&self, id: &str) -> impl Iterator<Item = &Edge> + '_ {
        self.adjacent(&self.incoming, id)
    }

    /// All edges with `id` as source or target. A self-loop appears once.
    pub fn edges_touching(&self, id: &str) -> Vec<&Edge> {
        let Some(i) = self.index_of(id) else {
            return Vec::new();
        };
        let mut indices: Vec<usize> = self.outgoing[i]
            .iter()
            .chain(self.incoming[i].iter())
            .copied()
            .collect();
        indices.sort_unstable();
        indices.dedup();
        indices.into_iter().map(|e| &self.edges[e]).collect()
    }

    /// Distinct source nodes of incoming edges, in edge order.
    pub fn parents_of(&self, id: &str) -> Vec<&Node> {
        let Some(i) = self.index_of(id) else {
            return Vec::new();
        };
        self.distinct_nodes(self.incoming[i].iter().map(|&e| self.endpoints[e].0))
    }

    /// Distinct target nodes of outgoing edges, in edge order.
    pub fn children_of(&self, id: &str) -> Vec<&Node> {
        let Some(i) = self.index_of(id) else {
            return Vec::new();
        };
        self.distinct_nodes(self.outgoing[i].iter().map(|&e| self.endpoints[e].1))
    }

    pub fn out_degree(&self, id: &str) -> usize {
        self.index_of(id).map_or(0, |i| self.outgoing[i].len())
    }

    pub fn in_degree(&self, id: &str) -> usize {
        self.index_of(id).map_or(0, |i| self.incoming[i].len())
    }

    pub(crate) fn index_of(&self, id: &str) -> Option<usize> {
        self.node_index.get(id).copied()
    }

    pub(crate) fn successors(&self, index: usize) -> impl Iterator<Item = usize> + '_ {
        self.outgoing[index].iter().map(move |&e| self.endpoints[e].1)
    }

    pub(crate) fn predecessors(&self, index: usize) -> impl Iterator<Item = usize> + '_ {
        self.incoming[index].iter().map(move |&e| self.endpoints[e].0)
    }

    pub(crate) fn node_at(&self, index: usize) -> &Node {
        &self.nodes[index]
    }

    pub(crate) fn role_at(&self, index: usize) -> NodeRole {
        self.roles[index]
    }

    pub(crate) fn endpoints_of(&self, edge_index: usize) -> (usize, usize) {
        self.endpoints[edge_index]
    }

    fn adjacent<'a>(&'a self, table: &'a [Vec<usize>], id: &str) -> impl Iterator<Item = &'a Edge> + 'a {
        let list: &'a [usize] = match self.index_of(id) {
            Some(i) => &table[i],
            None => &[],
        };
        list.iter().map(move |&e| &self.edges[e])
    }

    fn distinct_nodes(&self, indices: impl Iterator<Item = usize>) -> Vec<&Node> {
        let mut seen = HashSet::new();
        indices
            .filter(|i| seen.insert(*i))
            .map(|i| &self.nodes[i])
            .collect()
    }
}

impl From<&GraphSnapshot> for LogicGraph {
    fn from(snapshot: &GraphSnapshot) -> Self {
        Self::from_snapshot(snapshot)
    }
}
