use crate::json::parse_reply;
use crate::llm_factory::LLMProviderFactory;
use crate::llm_provider::{GenerationConfig, LLMProvider, LLMResult};
use crate::prompts;
use async_trait::async_trait;
use logframe_core::{AiConfig, Domain, GraphSnapshot, LfaDocument};
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;
use std::sync::Arc;
use tracing::{debug, info, warn};

/// Narrative review of a design graph.
///
/// Every field is optional on the wire: missing or null lists become empty,
/// a bare string becomes a one-element list.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CritiqueReport {
    #[serde(default, deserialize_with = "lenient_string_list")]
    pub shortcomings: Vec<String>,
    #[serde(default, deserialize_with = "lenient_string_list")]
    pub suggestions: Vec<String>,
    #[serde(default, alias = "overall_assessment", deserialize_with = "lenient_string")]
    pub overall_assessment: String,
}

/// Review of a compiled logical framework.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AuditReport {
    /// 0..=100
    #[serde(default, deserialize_with = "lenient_score")]
    pub score: u32,
    #[serde(default, deserialize_with = "lenient_string")]
    pub summary: String,
    #[serde(default, alias = "criticalGaps", deserialize_with = "lenient_string_list")]
    pub critical_gaps: Vec<String>,
    #[serde(default, deserialize_with = "lenient_string_list")]
    pub warnings: Vec<String>,
    #[serde(default, alias = "regionalInsights", deserialize_with = "lenient_string_list")]
    pub regional_insights: Vec<String>,
}

impl AuditReport {
    /// Stand-in report when the audit could not be obtained.
    pub fn unavailable(reason: impl std::fmt::Display) -> Self {
        Self {
            score: 0,
            summary: format!("Audit unavailable: {}", reason),
            ..Default::default()
        }
    }
}

fn lenient_string<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match Value::deserialize(deserializer)? {
        Value::Null => String::new(),
        Value::String(s) => s.trim().to_string(),
        other => other.to_string(),
    })
}

fn lenient_string_list<'de, D>(deserializer: D) -> Result<Vec<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let items = match Value::deserialize(deserializer)? {
        Value::Null => Vec::new(),
        Value::Array(values) => values,
        single => vec![single],
    };

    Ok(items
        .into_iter()
        .filter_map(|item| match item {
            Value::Null => None,
            Value::String(s) => Some(s.trim().to_string()),
            // Some models return {"issue": "..."} objects; keep the first text field.
            Value::Object(map) => {
                let text = map
                    .values()
                    .find_map(|v| v.as_str().map(|s| s.trim().to_string()));
                Some(text.unwrap_or_else(|| Value::Object(map).to_string()))
            }
            other => Some(other.to_string()),
        })
        .filter(|s| !s.is_empty())
        .collect())
}

fn lenient_score<'de, D>(deserializer: D) -> Result<u32, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = match Value::deserialize(deserializer)? {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().trim_end_matches('%').trim().parse::<f64>().ok(),
        _ => None,
    };
    Ok(raw
        .filter(|v| v.is_finite())
        .map(|v| v.round().clamp(0.0, 100.0) as u32)
        .unwrap_or(0))
}

/// External narrative critique, consumed as structured JSON.
#[async_trait]
pub trait CritiqueService: Send + Sync {
    async fn critique_graph(
        &self,
        domain: Domain,
        snapshot: &GraphSnapshot,
    ) -> LLMResult<CritiqueReport>;

    async fn audit_document(&self, domain: Domain, document: &LfaDocument)
        -> LLMResult<AuditReport>;
}

/// Run an audit, converting any failure into [`AuditReport::unavailable`].
pub async fn audit_or_fallback(
    service: &dyn CritiqueService,
    domain: Domain,
    document: &LfaDocument,
) -> AuditReport {
    match service.audit_document(domain, document).await {
        Ok(report) => report,
        Err(e) => {
            warn!("LFA audit failed: {:#}", e);
            AuditReport::unavailable(e)
        }
    }
}

/// Critique service backed by any [`LLMProvider`].
pub struct LlmCritiqueService {
    provider: Arc<dyn LLMProvider>,
    generation: GenerationConfig,
}

impl LlmCritiqueService {
    pub fn new(provider: Arc<dyn LLMProvider>) -> Self {
        Self {
            provider,
            generation: GenerationConfig::default(),
        }
    }

    pub fn with_generation(mut self, generation: GenerationConfig) -> Self {
        self.generation = generation;
        self
    }

    pub fn from_config(config: &AiConfig) -> anyhow::Result<Self> {
        let provider = LLMProviderFactory::create_from_config(config)?;
        Ok(Self::new(provider).with_generation(LLMProviderFactory::generation_config(config)))
    }

    pub fn provider(&self) -> &Arc<dyn LLMProvider> {
        &self.provider
    }
}

#[async_trait]
impl CritiqueService for LlmCritiqueService {
    async fn critique_graph(
        &self,
        domain: Domain,
        snapshot: &GraphSnapshot,
    ) -> LLMResult<CritiqueReport> {
        let system = prompts::critique_system_prompt(domain);
        let user = prompts::critique_user_prompt(domain, snapshot)?;

        debug!(
            "Requesting critique from {} ({})",
            self.provider.provider_name(),
            self.provider.model_name()
        );
        let response = self.provider.generate(&system, &user, &self.generation).await?;
        let report: CritiqueReport = parse_reply(&response.content)?;

        info!(
            "Critique returned {} shortcoming(s), {} suggestion(s)",
            report.shortcomings.len(),
            report.suggestions.len()
        );
        Ok(report)
    }

    async fn audit_document(
        &self,
        domain: Domain,
        document: &LfaDocument,
    ) -> LLMResult<AuditReport> {
        let system = prompts::audit_system_prompt(domain);
        let user = prompts::audit_user_prompt(domain, document)?;

        let response = self.provider.generate(&system, &user, &self.generation).await?;
        let report: AuditReport = parse_reply(&response.content)?;

        info!("Audit score {}", report.score);
        Ok(report)
    }
}
