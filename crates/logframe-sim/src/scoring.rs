use logframe_core::LogicError;
use serde::{Deserialize, Serialize};
use std::fmt;

pub const BASELINE_SCORE: u32 = 100;

/// Scores above this and below the baseline are warnings; at or below it, failures.
pub const FAILURE_CEILING: u32 = 60;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum HealthStatus {
    Success,
    Warning,
    Failure,
}

impl HealthStatus {
    pub fn from_score(score: u32) -> Self {
        if score >= BASELINE_SCORE {
            HealthStatus::Success
        } else if score > FAILURE_CEILING {
            HealthStatus::Warning
        } else {
            HealthStatus::Failure
        }
    }
}

impl fmt::Display for HealthStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            HealthStatus::Success => write!(f, "success"),
            HealthStatus::Warning => write!(f, "warning"),
            HealthStatus::Failure => write!(f, "failure"),
        }
    }
}

/// `{status, score, errors}`, shared by every simulation strategy.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SimulationResult {
    pub status: HealthStatus,
    pub score: u32,
    pub errors: Vec<LogicError>,
}

impl SimulationResult {
    /// Score from the baseline minus the summed penalties, clamped at 0.
    pub fn from_penalties(total_penalty: u32, errors: Vec<LogicError>) -> Self {
        let score = BASELINE_SCORE.saturating_sub(total_penalty);
        Self {
            status: HealthStatus::from_score(score),
            score,
            errors,
        }
    }

    pub fn is_failure(&self) -> bool {
        self.status == HealthStatus::Failure
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_boundaries() {
        assert_eq!(HealthStatus::from_score(100), HealthStatus::Success);
        assert_eq!(HealthStatus::from_score(99), HealthStatus::Warning);
        assert_eq!(HealthStatus::from_score(61), HealthStatus::Warning);
        assert_eq!(HealthStatus::from_score(60), HealthStatus::Failure);
        assert_eq!(HealthStatus::from_score(0), HealthStatus::Failure);
    }

    #[test]
    fn test_penalties_clamp_at_zero() {
        let result = SimulationResult::from_penalties(250, vec![]);
        assert_eq!(result.score, 0);
        assert!(result.is_failure());

        let clean = SimulationResult::from_penalties(0, vec![]);
        assert_eq!(clean.score, 100);
        assert_eq!(clean.status, HealthStatus::Success);
    }

    #[test]
    fn test_serializes_lowercase_status() {
        let value = serde_json::to_value(SimulationResult::from_penalties(15, vec![])).unwrap();
        assert_eq!(value["status"], "warning");
        assert_eq!(value["score"], 85);
    }
}
