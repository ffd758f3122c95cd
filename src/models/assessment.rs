use serde::{Deserialize, Serialize};

use super::audit::DataWarning;
use super::capacity::{CapacitySummary, SprintAnalysis};
use super::deployment::{DeploymentCluster, DeploymentSummary, TimelineEntry};
use super::red_flag::{RedFlag, RedFlagSummary};
use super::resource::ResourceAnalysis;
use super::risk_score::{RiskLevel, RiskScoreResult};
use super::velocity::VelocityAnalysis;

/// Everything one analysis run produces for a plan.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PlanAssessment {
    pub plan_name: String,
    pub source_path: Option<String>,
    pub red_flags: Vec<RedFlag>,
    pub red_flag_summary: RedFlagSummary,
    pub capacity: Vec<SprintAnalysis>,
    pub capacity_summary: CapacitySummary,
    pub deployment_clusters: Vec<DeploymentCluster>,
    pub deployment_summary: DeploymentSummary,
    pub deployment_timeline: Vec<TimelineEntry>,
    pub resources: ResourceAnalysis,
    pub velocity: VelocityAnalysis,
    pub risk: RiskScoreResult,
    /// Populated in strict mode only.
    pub warnings: Vec<DataWarning>,
    pub duration_ms: u64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnalysisProgress {
    pub stage: String,
    pub current: usize,
    pub total: usize,
}

/// One row of a multi-plan comparison.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlanComparison {
    pub path: String,
    pub plan_name: String,
    pub overall_score: f64,
    pub risk_level: RiskLevel,
    pub failing_sprints: usize,
    pub red_flag_count: usize,
    pub cd_percentage: f64,
}

/// In-memory cache of the latest assessment
#[derive(Debug, Default)]
pub struct AssessmentCache {
    pub workspace_path: Option<String>,
    pub latest: Option<PlanAssessment>,
}
