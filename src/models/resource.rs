use serde::{Deserialize, Serialize};

use super::plan::{Resource, Task};

/// How a task is tied to the person doing it.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AttributionStrategy {
    /// The resource name appears verbatim in the task tags.
    #[default]
    Tags,
    /// `Task::assignee` equals the resource name.
    Assignee,
}

impl AttributionStrategy {
    pub fn as_str(self) -> &'static str {
        match self {
            AttributionStrategy::Tags => "tags",
            AttributionStrategy::Assignee => "assignee",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "tags" => Some(AttributionStrategy::Tags),
            "assignee" => Some(AttributionStrategy::Assignee),
            _ => None,
        }
    }

    pub fn attributes(self, task: &Task, resource: &Resource) -> bool {
        match self {
            AttributionStrategy::Tags => task.tags.iter().any(|tag| *tag == resource.name),
            AttributionStrategy::Assignee => task.assignee.as_deref() == Some(resource.name.as_str()),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResourceSprintAllocation {
    pub sprint_name: String,
    pub allocated_hours: f64,
    pub available_hours: f64,
    pub consumed_hours: Option<f64>,
    pub utilization_percent: f64,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ResourceMetrics {
    pub name: String,
    pub discipline: String,
    pub total_allocated_hours: f64,
    pub total_available_hours: f64,
    pub total_consumed_hours: f64,
    /// Allocated-to-available ratio across all sprints, as a percentage.
    pub average_utilization: f64,
    pub allocated_cost: f64,
    pub sprint_allocations: Vec<ResourceSprintAllocation>,
    pub is_over_allocated: bool,
    pub is_under_allocated: bool,
    pub over_allocated_sprints: Vec<String>,
    pub task_count: usize,
    /// Coefficient of variation of task sizes. Reporting only.
    pub task_hours_cv: f64,
    pub unique_stories: usize,
    pub unique_epics: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BottleneckWarning {
    pub resource_name: String,
    pub reason: String,
    pub epic_count: usize,
    pub story_count: usize,
    pub sprint_count: usize,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ResourceAnalysis {
    pub resource_metrics: Vec<ResourceMetrics>,
    pub over_allocated: Vec<String>,
    pub under_allocated: Vec<String>,
    pub bottleneck_warnings: Vec<BottleneckWarning>,
    pub total_resources: usize,
}
