use logframe_ai::{audit_or_fallback, AuditReport, CritiqueService, LlmCritiqueService};
use logframe_core::{
    Domain, GraphSnapshot, LfaDocument, LogframeConfig, LogframeError, LogicError, Result,
};
use logframe_graph::{IntegrityReport, LogicGraph, StructuralReport, StructuralValidator};
use logframe_sim::{strategy_for, SimulationResult, SimulationStrategy};
use serde::Serialize;
use std::sync::Arc;
use tracing::{info, warn};

/// Everything one pass over a snapshot produces.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Evaluation {
    pub domain: Domain,
    pub strategy: &'static str,
    pub integrity: IntegrityReport,
    pub structural: StructuralReport,
    pub simulation: SimulationResult,
    /// Structural errors first, then semantic ones.
    pub errors: Vec<LogicError>,
    /// Present only when the design is acceptable.
    pub document: Option<LfaDocument>,
}

impl Evaluation {
    pub fn is_acceptable(&self) -> bool {
        self.document.is_some()
    }
}

pub struct LogframeEngine {
    config: LogframeConfig,
    validator: StructuralValidator,
    critique: Option<Arc<dyn CritiqueService>>,
}

impl LogframeEngine {
    /// Engine without an AI critique service.
    pub fn new(config: LogframeConfig) -> Self {
        Self {
            config,
            validator: StructuralValidator::default(),
            critique: None,
        }
    }

    /// Engine with the critique service described by `config.ai`, when enabled.
    /// A provider that cannot be built leaves the engine on local rules.
    pub fn from_config(config: LogframeConfig) -> Self {
        let critique = if config.ai.enabled {
            match LlmCritiqueService::from_config(&config.ai) {
                Ok(service) => Some(Arc::new(service) as Arc<dyn CritiqueService>),
                Err(e) => {
                    warn!("AI critique disabled: {:#}", e);
                    None
                }
            }
        } else {
            None
        };

        Self {
            critique,
            ..Self::new(config)
        }
    }

    pub fn with_critique(mut self, service: Arc<dyn CritiqueService>) -> Self {
        self.critique = Some(service);
        self
    }

    pub fn with_validator(mut self, validator: StructuralValidator) -> Self {
        self.validator = validator;
        self
    }

    pub fn config(&self) -> &LogframeConfig {
        &self.config
    }

    pub fn has_critique(&self) -> bool {
        self.critique.is_some()
    }

    fn simulation_strategy(&self, domain: Domain) -> Box<dyn SimulationStrategy> {
        strategy_for(domain, &self.config.simulation, self.critique.clone())
    }

    pub fn validate(&self, snapshot: &GraphSnapshot) -> StructuralReport {
        self.validator.validate(&LogicGraph::from_snapshot(snapshot))
    }

    pub async fn simulate(&self, domain: Domain, snapshot: &GraphSnapshot) -> SimulationResult {
        let graph = LogicGraph::from_snapshot(snapshot);
        self.simulation_strategy(domain).simulate(domain, &graph).await
    }

    /// Compile regardless of health. Callers wanting the acceptance gate use
    /// [`LogframeEngine::evaluate`].
    pub fn compile(&self, domain: Domain, snapshot: &GraphSnapshot) -> LfaDocument {
        logframe_compiler::compile(domain, &LogicGraph::from_snapshot(snapshot))
    }

    /// Structural validation, then simulation, then compilation if the
    /// design is acceptable.
    pub async fn evaluate(&self, domain: Domain, snapshot: &GraphSnapshot) -> Evaluation {
        let graph = LogicGraph::from_snapshot(snapshot);
        let structural = self.validator.validate(&graph);

        let strategy = self.simulation_strategy(domain);
        let simulation = strategy.simulate(domain, &graph).await;

        let acceptable = !structural.has_critical()
            && (!simulation.is_failure() || self.config.pipeline.compile_on_failure);
        let document = acceptable.then(|| logframe_compiler::compile(domain, &graph));

        let mut errors = structural.errors.clone();
        errors.extend(simulation.errors.iter().cloned());

        info!(
            "Evaluated {} design: score={}, status={}, {} issue(s), document={}",
            domain,
            simulation.score,
            simulation.status,
            errors.len(),
            document.is_some()
        );

        Evaluation {
            domain,
            strategy: strategy.name(),
            integrity: graph.integrity().clone(),
            structural,
            simulation,
            errors,
            document,
        }
    }

    /// Compile and send the document for an AI audit. Audit failures become
    /// a zero-score report; only a missing critique service is an error.
    pub async fn audit(&self, domain: Domain, snapshot: &GraphSnapshot) -> Result<AuditReport> {
        let service = self.critique.as_ref().ok_or_else(|| {
            LogframeError::InvalidOperation(
                "AI critique is not enabled; set [ai] enabled = true".to_string(),
            )
        })?;
        let document = self.compile(domain, snapshot);
        Ok(audit_or_fallback(service.as_ref(), domain, &document).await)
    }
}

impl Default for LogframeEngine {
    fn default() -> Self {
        Self::new(LogframeConfig::default())
    }
}
