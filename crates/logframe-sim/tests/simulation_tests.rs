use async_trait::async_trait;
use logframe_ai::{GenerationConfig, LLMProvider, LLMResponse, LLMResult, LlmCritiqueService, Message};
use logframe_core::{Domain, Edge, GraphSnapshot, Node, NodeCategory, SimulationConfig};
use logframe_graph::LogicGraph;
use logframe_sim::{strategy_for, CritiqueStrategy, HealthStatus, RuleBasedStrategy, SimulationStrategy};
use serde_json::json;
use std::sync::Arc;

/// Provider that always answers with the same text.
struct ReplyWith(&'static str);

#[async_trait]
impl LLMProvider for ReplyWith {
    async fn generate_chat(
        &self,
        _messages: &[Message],
        _config: &GenerationConfig,
    ) -> LLMResult<LLMResponse> {
        Ok(LLMResponse {
            content: self.0.to_string(),
            total_tokens: None,
            finish_reason: Some("stop".to_string()),
            model: "fixed".to_string(),
        })
    }

    fn provider_name(&self) -> &str {
        "fixed"
    }

    fn model_name(&self) -> &str {
        "fixed"
    }
}

async fn critique_with_reply(reply: &'static str) -> logframe_sim::SimulationResult {
    let service = Arc::new(LlmCritiqueService::new(Arc::new(ReplyWith(reply))));
    CritiqueStrategy::new(service, &SimulationConfig::default())
        .simulate(Domain::CareerReadiness, &LogicGraph::from_snapshot(&clean_fln()))
        .await
}

fn clean_fln() -> GraphSnapshot {
    serde_json::from_value(json!({
        "nodes": [
            {"id": "kit", "type": "tlm_kit", "category": "intervention", "label": "TLM Kit"},
            {"id": "shift", "type": "practice_shift", "category": "bridge", "label": "Activity-based teaching"},
            {"id": "lo", "type": "learning_outcome", "category": "foundation", "label": "Grade 3 reading"},
            {"id": "goal", "type": "vision_goal", "category": "foundation", "label": "Every child reads"}
        ],
        "edges": [
            {"id": "e1", "source": "kit", "target": "shift",
             "indicators": [{"label": "Teachers using kits daily", "unit": "%"}]},
            {"id": "e2", "source": "shift", "target": "lo"},
            {"id": "e3", "source": "lo", "target": "goal"}
        ]
    }))
    .unwrap()
}

fn run(snapshot: &GraphSnapshot) -> logframe_sim::SimulationResult {
    RuleBasedStrategy::new(SimulationConfig::default()).run(&LogicGraph::from_snapshot(snapshot))
}

#[test]
fn test_empty_graph_is_perfect() {
    let result = run(&GraphSnapshot::default());
    assert_eq!(result.score, 100);
    assert_eq!(result.status, HealthStatus::Success);
    assert!(result.errors.is_empty());
}

#[test]
fn test_clean_design_scores_full_marks() {
    let result = run(&clean_fln());
    assert_eq!(result.score, 100, "unexpected errors: {:?}", result.errors);
    assert_eq!(result.status, HealthStatus::Success);
}

#[test]
fn test_each_added_violation_never_raises_the_score() {
    let mut snapshot = clean_fln();
    let mut previous = run(&snapshot).score;

    // orphan
    snapshot
        .nodes
        .push(Node::new("smc", "smc", NodeCategory::Stakeholder, "SMC"));
    let score = run(&snapshot).score;
    assert_eq!(score, previous - 10);
    previous = score;

    // miracle jump, also unmeasured
    snapshot.nodes.push(Node::new(
        "training",
        "teacher_training",
        NodeCategory::Intervention,
        "Teacher training",
    ));
    snapshot.edges.push(Edge::new("e4", "training", "lo"));
    let score = run(&snapshot).score;
    assert_eq!(score, previous - 15 - 5);
    previous = score;

    // a second orphan
    snapshot
        .nodes
        .push(Node::new("crcc", "crcc", NodeCategory::Stakeholder, "CRCC"));
    let result = run(&snapshot);
    assert!(result.score <= previous);
    assert_eq!(result.score, 60);
    assert_eq!(result.status, HealthStatus::Failure);
    assert!(result.errors.iter().any(|e| e.id == "orphan-smc"));
    assert!(result.errors.iter().any(|e| e.id == "miracle-e4"));
    assert!(result.errors.iter().any(|e| e.id == "measure-e4"));
}

#[test]
fn test_dangling_edges_are_skipped_not_scored() {
    let mut snapshot = clean_fln();
    snapshot.edges.push(Edge::new("ghost", "kit", "missing-node"));
    let result = run(&snapshot);
    assert_eq!(result.score, 100);
}

#[test]
fn test_simulation_is_deterministic() {
    let snapshot = clean_fln();
    assert_eq!(run(&snapshot), run(&snapshot));
}

#[tokio::test]
async fn test_career_without_ai_falls_back_to_rules() {
    let graph = LogicGraph::from_snapshot(&clean_fln());
    let strategy = strategy_for(Domain::CareerReadiness, &SimulationConfig::default(), None);
    let result = strategy.simulate(Domain::CareerReadiness, &graph).await;
    assert_eq!(result.score, 100);
}

#[tokio::test]
async fn test_array_reply_from_critique_service_is_unavailable() {
    for reply in ["[]", r#"["No employer link", "Add mentors"]"#] {
        let result = critique_with_reply(reply).await;
        assert_eq!(result.status, HealthStatus::Failure);
        assert_eq!(result.score, 0);
        assert_eq!(result.errors.len(), 1);
        assert_eq!(result.errors[0].id, "critique-unavailable");
    }
}

#[tokio::test]
async fn test_object_reply_from_critique_service_is_scored() {
    let result = critique_with_reply(r#"{"shortcomings": ["No employer link"]}"#).await;
    assert_eq!(result.score, 90);
    assert_eq!(result.errors[0].id, "shortcoming-1");
}
