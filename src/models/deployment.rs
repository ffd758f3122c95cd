use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use super::plan::Task;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DeploymentStrategy {
    FeatureFlag,
    FullDeployment,
}

impl DeploymentStrategy {
    pub fn as_str(self) -> &'static str {
        match self {
            DeploymentStrategy::FeatureFlag => "feature_flag",
            DeploymentStrategy::FullDeployment => "full_deployment",
        }
    }

    pub fn rollback_plan(self) -> &'static str {
        match self {
            DeploymentStrategy::FeatureFlag => "Disable feature flag to instantly revert",
            DeploymentStrategy::FullDeployment => {
                "Redeploy previous version via deployment pipeline"
            }
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DeploymentCluster {
    pub name: String,
    /// Classification key the cluster was grouped under (e.g. "auth", "story_S1").
    pub domain: String,
    pub tasks: Vec<Task>,
    pub strategy: DeploymentStrategy,
    pub deploy_timing: String,
    pub dependencies: Vec<String>,
    pub rollback_plan: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DeploymentSummary {
    pub total_clusters: usize,
    pub eligible_tasks: usize,
    pub total_tasks: usize,
    pub cd_percentage: f64,
    pub target_percentage: f64,
    pub target_met: bool,
    pub status: String,
    pub strategies: BTreeMap<String, usize>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TimelineTask {
    pub id: String,
    pub name: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TimelineEntry {
    pub timing: String,
    pub cluster: String,
    pub task_count: usize,
    pub strategy: DeploymentStrategy,
    pub tasks: Vec<TimelineTask>,
}
