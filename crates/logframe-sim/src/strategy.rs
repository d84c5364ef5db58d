use async_trait::async_trait;
use logframe_ai::CritiqueService;
use logframe_core::{Domain, GraphSnapshot, LogicError, SimulationConfig};
use logframe_graph::LogicGraph;
use std::sync::Arc;
use tracing::{info, warn};

use crate::rules::RuleSet;
use crate::scoring::{HealthStatus, SimulationResult, BASELINE_SCORE};

/// One way of scoring a design. All strategies return the same shape.
#[async_trait]
pub trait SimulationStrategy: Send + Sync {
    fn name(&self) -> &'static str;

    async fn simulate(&self, domain: Domain, graph: &LogicGraph) -> SimulationResult;
}

/// Local, deterministic rule table.
#[derive(Debug, Clone, Default)]
pub struct RuleBasedStrategy {
    rules: RuleSet,
    config: SimulationConfig,
}

impl RuleBasedStrategy {
    pub fn new(config: SimulationConfig) -> Self {
        Self {
            rules: RuleSet::default(),
            config,
        }
    }

    pub fn with_rules(mut self, rules: RuleSet) -> Self {
        self.rules = rules;
        self
    }

    /// Synchronous entry point; the async trait method delegates here.
    pub fn run(&self, graph: &LogicGraph) -> SimulationResult {
        let result = self.rules.evaluate(graph, &self.config);
        info!(
            "Rule-based simulation: score={}, status={}, {} issue(s)",
            result.score,
            result.status,
            result.errors.len()
        );
        result
    }
}

#[async_trait]
impl SimulationStrategy for RuleBasedStrategy {
    fn name(&self) -> &'static str {
        "rule-based"
    }

    async fn simulate(&self, _domain: Domain, graph: &LogicGraph) -> SimulationResult {
        self.run(graph)
    }
}

/// Scores from the number of shortcomings an external critique reports.
pub struct CritiqueStrategy {
    service: Arc<dyn CritiqueService>,
    penalty_per_shortcoming: u32,
}

impl CritiqueStrategy {
    pub fn new(service: Arc<dyn CritiqueService>, config: &SimulationConfig) -> Self {
        Self {
            service,
            penalty_per_shortcoming: config.penalty_per_shortcoming,
        }
    }

    /// Fixed result when the critique cannot be obtained or understood.
    pub fn fallback(reason: impl std::fmt::Display) -> SimulationResult {
        SimulationResult {
            status: HealthStatus::Failure,
            score: 0,
            errors: vec![LogicError::critical(
                "critique-unavailable",
                "Critique unavailable",
                format!("The design could not be reviewed: {}", reason),
            )
            .with_fix("Check the AI service settings and try again.")],
        }
    }

    fn score(&self, shortcomings: Vec<String>, suggestions: &[String]) -> SimulationResult {
        let penalty = self
            .penalty_per_shortcoming
            .saturating_mul(shortcomings.len() as u32);
        let errors = shortcomings
            .into_iter()
            .enumerate()
            .map(|(i, text)| {
                let mut error = LogicError::warning(format!("shortcoming-{}", i + 1), "Shortcoming", text);
                if let Some(suggestion) = suggestions.get(i) {
                    error = error.with_fix(suggestion.clone());
                }
                error
            })
            .collect();
        SimulationResult::from_penalties(penalty, errors)
    }
}

#[async_trait]
impl SimulationStrategy for CritiqueStrategy {
    fn name(&self) -> &'static str {
        "critique"
    }

    async fn simulate(&self, domain: Domain, graph: &LogicGraph) -> SimulationResult {
        let snapshot = GraphSnapshot::new(graph.nodes().to_vec(), graph.edges().to_vec());

        match self.service.critique_graph(domain, &snapshot).await {
            Ok(report) => {
                let result = self.score(report.shortcomings, &report.suggestions);
                info!(
                    "Critique simulation: score={}/{}, status={}",
                    result.score, BASELINE_SCORE, result.status
                );
                result
            }
            Err(e) => {
                warn!("Critique failed, using fallback result: {:#}", e);
                Self::fallback(e)
            }
        }
    }
}

/// FLN always uses the rule table. Career readiness delegates to the
/// critique service when one is available.
pub fn strategy_for(
    domain: Domain,
    config: &SimulationConfig,
    critique: Option<Arc<dyn CritiqueService>>,
) -> Box<dyn SimulationStrategy> {
    match (domain, critique) {
        (Domain::CareerReadiness, Some(service)) => Box::new(CritiqueStrategy::new(service, config)),
        _ => Box::new(RuleBasedStrategy::new(config.clone())),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use anyhow::anyhow;
    use logframe_ai::{AuditReport, CritiqueReport, LLMResult};
    use logframe_core::LfaDocument;

    struct FixedCritique(Option<CritiqueReport>);

    #[async_trait]
    impl CritiqueService for FixedCritique {
        async fn critique_graph(
            &self,
            _domain: Domain,
            _snapshot: &GraphSnapshot,
        ) -> LLMResult<CritiqueReport> {
            self.0.clone().ok_or_else(|| anyhow!("timed out"))
        }

        async fn audit_document(
            &self,
            _domain: Domain,
            _document: &LfaDocument,
        ) -> LLMResult<AuditReport> {
            Err(anyhow!("not used"))
        }
    }

    fn critique(shortcomings: usize) -> Arc<dyn CritiqueService> {
        Arc::new(FixedCritique(Some(CritiqueReport {
            shortcomings: (0..shortcomings).map(|i| format!("gap {}", i)).collect(),
            suggestions: vec!["fix the first".to_string()],
            overall_assessment: String::new(),
        })))
    }

    #[tokio::test]
    async fn test_critique_score_counts_shortcomings() {
        let strategy = CritiqueStrategy::new(critique(3), &SimulationConfig::default());
        let result = strategy
            .simulate(Domain::CareerReadiness, &LogicGraph::new(vec![], vec![]))
            .await;

        assert_eq!(result.score, 70);
        assert_eq!(result.status, HealthStatus::Warning);
        assert_eq!(result.errors[0].id, "shortcoming-1");
        assert_eq!(result.errors[0].fix_suggestion, "fix the first");
        assert_eq!(result.errors[2].id, "shortcoming-3");
        assert!(result.errors[2].fix_suggestion.is_empty());
    }

    #[tokio::test]
    async fn test_critique_score_clamps_at_zero() {
        let strategy = CritiqueStrategy::new(critique(14), &SimulationConfig::default());
        let result = strategy
            .simulate(Domain::CareerReadiness, &LogicGraph::new(vec![], vec![]))
            .await;
        assert_eq!(result.score, 0);
        assert_eq!(result.status, HealthStatus::Failure);
    }

    #[tokio::test]
    async fn test_critique_failure_uses_fixed_fallback() {
        let strategy = CritiqueStrategy::new(
            Arc::new(FixedCritique(None)),
            &SimulationConfig::default(),
        );
        let result = strategy
            .simulate(Domain::CareerReadiness, &LogicGraph::new(vec![], vec![]))
            .await;

        assert_eq!(result.status, HealthStatus::Failure);
        assert_eq!(result.score, 0);
        assert_eq!(result.errors.len(), 1);
        assert_eq!(result.errors[0].id, "critique-unavailable");
    }

    #[test]
    fn test_strategy_selection_by_domain() {
        let config = SimulationConfig::default();
        assert_eq!(strategy_for(Domain::Fln, &config, Some(critique(0))).name(), "rule-based");
        assert_eq!(
            strategy_for(Domain::CareerReadiness, &config, Some(critique(0))).name(),
            "critique"
        );
        assert_eq!(strategy_for(Domain::CareerReadiness, &config, None).name(), "rule-based");
    }
}
