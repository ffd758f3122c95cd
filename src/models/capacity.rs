use serde::{Deserialize, Serialize};

use super::plan::{SprintStatus, Task};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RecommendationKind {
    /// Move a safe task out of an overloaded sprint into a later one.
    Move,
    /// Advisory: split the largest task across sprints.
    Split,
    /// Pull a red-flagged task into an earlier sprint.
    EarlyValidation,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CapacityRecommendation {
    pub task: Task,
    pub kind: RecommendationKind,
    pub from_sprint: String,
    pub to_sprint: String,
    /// Hours this recommendation shifts. For a split, the overflow left to absorb.
    pub hours: f64,
    pub reason: String,
    /// 1 = high, 2 = medium, 3 = low
    pub priority: u8,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SprintAnalysis {
    pub sprint_name: String,
    pub total_hours: f64,
    pub net_capacity: f64,
    pub sprint_load: f64,
    pub status: SprintStatus,
    pub overflow_hours: f64,
    pub utilization_percent: f64,
    pub recommendations: Vec<CapacityRecommendation>,
    pub high_risk_tasks: Vec<Task>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CapacitySummary {
    pub total_sprints: usize,
    pub passing_sprints: usize,
    pub failing_sprints: usize,
    pub overall_utilization: f64,
    pub total_capacity_hours: f64,
    pub total_load_hours: f64,
    pub total_recommendations: usize,
    pub high_risk_task_count: usize,
}

/// Stand-alone capacity check for a sprint that has not been planned yet.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CapacityCheck {
    pub total_hours: f64,
    pub net_capacity: f64,
    pub sprint_load: f64,
    pub status: SprintStatus,
    pub overflow_hours: f64,
    pub utilization_percent: f64,
}
