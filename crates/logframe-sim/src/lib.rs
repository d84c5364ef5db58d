pub mod rules;
pub mod scoring;
pub mod strategy;

pub use rules::{evaluate_rule, PenaltyMode, RuleOutcome, RuleSet, RuleSpec, RULE_CATALOG};
pub use scoring::*;
pub use strategy::*;
