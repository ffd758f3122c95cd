use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use super::document::AcceptanceCriterion;

/// Ranked severity. Declaration order is the sort order: critical first.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Critical,
    Moderate,
    Low,
}

impl Severity {
    /// Points each flag contributes to the red flag sub-score.
    pub fn score_weight(self) -> f64 {
        match self {
            Severity::Critical => 15.0,
            Severity::Moderate => 8.0,
            Severity::Low => 3.0,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Severity::Critical => "critical",
            Severity::Moderate => "moderate",
            Severity::Low => "low",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RedFlag {
    pub criterion: AcceptanceCriterion,
    pub flagged_term: String,
    pub category: String,
    pub severity: Severity,
    pub suggested_metric: String,
    pub negotiation_script: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RedFlagSummary {
    pub total: usize,
    pub critical: usize,
    pub moderate: usize,
    pub low: usize,
    pub categories: BTreeMap<String, usize>,
    pub most_common_terms: Vec<(String, usize)>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QuickCheckFlag {
    pub term: String,
    pub category: String,
    pub severity: Severity,
    pub suggested_metric: String,
    pub negotiation_script: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LineRedFlags {
    pub line_number: usize,
    pub line: String,
    pub flags: Vec<QuickCheckFlag>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct QuickCheckReport {
    pub lines: Vec<LineRedFlags>,
    pub total: usize,
    pub critical: usize,
    pub moderate: usize,
    pub low: usize,
}
