use logframe_core::{Marker, Node, NodeCategory, ToolboxRegistry};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Position of a node in the causal chain, resolved from its type and
/// category. Rules and templates dispatch on roles instead of labels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NodeRole {
    Goal,
    Outcome,
    Output,
    Intervention,
    Stakeholder,
    Bridge,
    Risk,
    Foundation,
}

impl NodeRole {
    /// Resolution order: coarse type names, then the toolbox marker of a
    /// fine-grained type, then the node's (or its toolbox type's) category.
    /// A node with none of these is treated as foundation.
    pub fn of(node: &Node) -> NodeRole {
        if let Some(role) = Self::from_coarse_type(&node.node_type) {
            return role;
        }

        if let Some((_, item)) = ToolboxRegistry::find(&node.node_type) {
            match item.marker {
                Some(Marker::Goal) => return NodeRole::Goal,
                Some(Marker::Outcome) => return NodeRole::Outcome,
                None => {}
            }
        }

        node.resolved_category()
            .map(Self::from_category)
            .unwrap_or(NodeRole::Foundation)
    }

    fn from_coarse_type(node_type: &str) -> Option<NodeRole> {
        match node_type.to_lowercase().as_str() {
            "goal" | "vision" => Some(NodeRole::Goal),
            "outcome" => Some(NodeRole::Outcome),
            "output" => Some(NodeRole::Output),
            "intervention" | "activity" => Some(NodeRole::Intervention),
            "stakeholder" => Some(NodeRole::Stakeholder),
            "bridge" => Some(NodeRole::Bridge),
            "risk" | "assumption" => Some(NodeRole::Risk),
            _ => None,
        }
    }

    pub fn from_category(category: NodeCategory) -> NodeRole {
        match category {
            NodeCategory::Foundation => NodeRole::Foundation,
            NodeCategory::Stakeholder => NodeRole::Stakeholder,
            NodeCategory::Intervention => NodeRole::Intervention,
            NodeCategory::Bridge => NodeRole::Bridge,
            NodeCategory::Risk => NodeRole::Risk,
        }
    }
}

impl fmt::Display for NodeRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            NodeRole::Goal => "goal",
            NodeRole::Outcome => "outcome",
            NodeRole::Output => "output",
            NodeRole::Intervention => "intervention",
            NodeRole::Stakeholder => "stakeholder",
            NodeRole::Bridge => "bridge",
            NodeRole::Risk => "risk",
            NodeRole::Foundation => "foundation",
        };
        write!(f, "{}", s)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_coarse_type_wins_over_category() {
        let node = Node::new("o", "outcome", NodeCategory::Bridge, "Outcome");
        assert_eq!(NodeRole::of(&node), NodeRole::Outcome);
    }

    #[test]
    fn test_toolbox_marker_then_category() {
        let goal = Node::new("g", "vision_goal", NodeCategory::Foundation, "Vision");
        let kit = Node::new("k", "tlm_kit", NodeCategory::Intervention, "Kit");
        let custom = Node::new("c", "radio_show", NodeCategory::Intervention, "Radio");
        let placement = Node::new("p", "job_placement", NodeCategory::Foundation, "Jobs");

        assert_eq!(NodeRole::of(&goal), NodeRole::Goal);
        assert_eq!(NodeRole::of(&kit), NodeRole::Intervention);
        assert_eq!(NodeRole::of(&custom), NodeRole::Intervention);
        assert_eq!(NodeRole::of(&placement), NodeRole::Outcome);
    }

    #[test]
    fn test_missing_category_falls_back_on_type() {
        let mut kit = Node::new("k", "tlm_kit", NodeCategory::Intervention, "Kit");
        kit.category = None;
        assert_eq!(NodeRole::of(&kit), NodeRole::Intervention);

        let mut unknown = Node::new("u", "radio_show", NodeCategory::Intervention, "Radio");
        unknown.category = None;
        assert_eq!(NodeRole::of(&unknown), NodeRole::Foundation);
    }
}
