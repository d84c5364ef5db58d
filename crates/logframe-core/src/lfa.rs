use serde::{Deserialize, Serialize};

/// One row of the logical framework matrix.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FrameworkCell {
    pub narrative: String,
    /// Objectively verifiable indicators.
    #[serde(default)]
    pub indicators: Vec<String>,
    #[serde(default)]
    pub means_of_verification: Vec<String>,
    #[serde(default)]
    pub assumptions_risks: Vec<String>,
}

impl FrameworkCell {
    pub fn new(narrative: impl Into<String>) -> Self {
        Self {
            narrative: narrative.into(),
            ..Default::default()
        }
    }

    /// Append an indicator unless an identical one is already present.
    pub fn push_indicator(&mut self, indicator: impl Into<String>) {
        push_unique(&mut self.indicators, indicator.into());
    }

    pub fn push_verification(&mut self, source: impl Into<String>) {
        push_unique(&mut self.means_of_verification, source.into());
    }

    pub fn push_assumption(&mut self, assumption: impl Into<String>) {
        push_unique(&mut self.assumptions_risks, assumption.into());
    }
}

fn push_unique(list: &mut Vec<String>, value: String) {
    let trimmed = value.trim();
    if trimmed.is_empty() || list.iter().any(|v| v == trimmed) {
        return;
    }
    list.push(trimmed.to_string());
}

/// Goal → Outcomes → Outputs → Activities.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LfaDocument {
    pub goal: Option<FrameworkCell>,
    #[serde(default)]
    pub outcomes: Vec<FrameworkCell>,
    #[serde(default)]
    pub outputs: Vec<FrameworkCell>,
    #[serde(default)]
    pub activities: Vec<FrameworkCell>,
}

impl LfaDocument {
    pub fn cell_count(&self) -> usize {
        usize::from(self.goal.is_some())
            + self.outcomes.len()
            + self.outputs.len()
            + self.activities.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_push_helpers_skip_blanks_and_duplicates() {
        let mut cell = FrameworkCell::new("Outcome");
        cell.push_indicator("Reading fluency");
        cell.push_indicator("  Reading fluency ");
        cell.push_indicator("");
        cell.push_assumption("Teachers attend");

        assert_eq!(cell.indicators, vec!["Reading fluency".to_string()]);
        assert_eq!(cell.assumptions_risks.len(), 1);
    }

    #[test]
    fn test_document_serializes_camel_case_cells() {
        let doc = LfaDocument {
            goal: Some(FrameworkCell::new("Goal")),
            ..Default::default()
        };
        let value = serde_json::to_value(&doc).unwrap();
        assert!(value["goal"]["meansOfVerification"].is_array());
        assert!(value["outputs"].as_array().unwrap().is_empty());
        assert_eq!(doc.cell_count(), 1);
    }
}
