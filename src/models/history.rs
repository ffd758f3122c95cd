use serde::{Deserialize, Serialize};

use super::assessment::PlanAssessment;
use super::risk_score::RiskLevel;

/// Summary row of a persisted assessment.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AssessmentRecord {
    pub id: String,
    pub created_at: i64,
    pub plan_name: String,
    pub source_path: Option<String>,
    pub overall_score: f64,
    pub risk_level: RiskLevel,
    pub failing_sprints: usize,
    pub red_flag_count: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StoredAssessment {
    pub record: AssessmentRecord,
    pub assessment: PlanAssessment,
}
