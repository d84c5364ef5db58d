use anyhow::{Context, Result};
use logframe_core::{Domain, GraphSnapshot, LfaDocument};
use serde_json::json;

fn domain_focus(domain: Domain) -> &'static str {
    match domain {
        Domain::Fln => {
            "foundational literacy and numeracy programmes in government primary schools. \
             Pay attention to teacher workload, the role of cluster and block education \
             officials, classroom practice change and how learning is measured"
        }
        Domain::CareerReadiness => {
            "career readiness and livelihood programmes for young people. Pay attention to \
             employer engagement, the link between training and placement or self-employment, \
             dropout during the programme and labour-market risk"
        }
    }
}

/// System prompt for critiquing a design graph.
pub fn critique_system_prompt(domain: Domain) -> String {
    format!(
        "You are a monitoring and evaluation specialist reviewing a programme theory of change \
         for {}.\n\
         The design is a directed graph: nodes are stakeholders, interventions, practice shifts, \
         outcomes and risks; an edge means the source contributes to the target.\n\
         Respond with a single JSON object and nothing else:\n\
         {{\"shortcomings\": [string], \"suggestions\": [string], \"overallAssessment\": string}}\n\
         List each distinct logical gap once in `shortcomings`. Leave the list empty if the design is sound.",
        domain_focus(domain)
    )
}

/// User prompt carrying the graph as compact JSON.
pub fn critique_user_prompt(domain: Domain, snapshot: &GraphSnapshot) -> Result<String> {
    let graph = serde_json::to_string(snapshot).context("Failed to serialize graph snapshot")?;
    Ok(format!(
        "Domain: {}\nNodes: {}, connections: {}\nGraph:\n{}",
        domain,
        snapshot.nodes.len(),
        snapshot.edges.len(),
        graph
    ))
}

/// System prompt for auditing a compiled logical framework.
pub fn audit_system_prompt(domain: Domain) -> String {
    format!(
        "You are auditing a logical framework (goal, outcomes, outputs, activities with \
         indicators, means of verification and assumptions) for {}.\n\
         Respond with a single JSON object and nothing else:\n\
         {{\"score\": number 0-100, \"summary\": string, \"critical_gaps\": [string], \
         \"warnings\": [string], \"regional_insights\": [string]}}",
        domain_focus(domain)
    )
}

pub fn audit_user_prompt(domain: Domain, document: &LfaDocument) -> Result<String> {
    let body = json!({
        "domain": domain,
        "framework": document,
    });
    serde_json::to_string_pretty(&body).context("Failed to serialize logical framework")
}
