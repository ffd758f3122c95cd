use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use super::document::DedDocument;

pub const DEFAULT_BUFFER_PERCENTAGE: f64 = 0.20;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Task {
    pub id: String,
    pub name: String,
    pub hours: f64,
    pub sprint: String,
    #[serde(default)]
    pub story_id: Option<String>,
    #[serde(default)]
    pub epic_id: Option<String>,
    #[serde(default)]
    pub dependencies: Vec<String>,
    #[serde(default)]
    pub tags: Vec<String>,
    /// Explicit resource reference, used by the `assignee` attribution strategy.
    #[serde(default)]
    pub assignee: Option<String>,
}

impl Task {
    pub fn new(id: &str, name: &str, hours: f64, sprint: &str) -> Self {
        Self {
            id: id.to_string(),
            name: name.to_string(),
            hours,
            sprint: sprint.to_string(),
            story_id: None,
            epic_id: None,
            dependencies: Vec::new(),
            tags: Vec::new(),
            assignee: None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SprintStatus {
    Pass,
    Fail,
}

impl SprintStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            SprintStatus::Pass => "pass",
            SprintStatus::Fail => "fail",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Sprint {
    pub name: String,
    pub total_hours: f64,
    /// Unset means "use the configured default buffer".
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub buffer_percentage: Option<f64>,
    #[serde(default)]
    pub tasks: Vec<Task>,
}

impl Sprint {
    pub fn new(name: &str, total_hours: f64) -> Self {
        Self {
            name: name.to_string(),
            total_hours,
            buffer_percentage: None,
            tasks: Vec::new(),
        }
    }

    pub fn with_tasks(mut self, tasks: Vec<Task>) -> Self {
        self.tasks = tasks;
        self
    }

    pub fn with_buffer(mut self, buffer_percentage: f64) -> Self {
        self.buffer_percentage = Some(buffer_percentage);
        self
    }

    /// Effective buffer; [`DEFAULT_BUFFER_PERCENTAGE`] when unset.
    pub fn buffer(&self) -> f64 {
        self.buffer_percentage.unwrap_or(DEFAULT_BUFFER_PERCENTAGE)
    }

    pub fn buffer_hours(&self) -> f64 {
        self.total_hours * self.buffer()
    }

    /// `total_hours × (1 − buffer)`
    pub fn net_capacity(&self) -> f64 {
        self.total_hours * (1.0 - self.buffer())
    }

    pub fn sprint_load(&self) -> f64 {
        self.tasks.iter().map(|t| t.hours).sum()
    }

    pub fn status(&self) -> SprintStatus {
        if self.sprint_load() <= self.net_capacity() {
            SprintStatus::Pass
        } else {
            SprintStatus::Fail
        }
    }

    /// Negative when the sprint has spare capacity.
    pub fn overflow_hours(&self) -> f64 {
        self.sprint_load() - self.net_capacity()
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CapacityPlan {
    #[serde(default)]
    pub filename: String,
    #[serde(default)]
    pub sprints: Vec<Sprint>,
    #[serde(default)]
    pub warnings: Vec<String>,
}

impl CapacityPlan {
    pub fn new(filename: &str, sprints: Vec<Sprint>) -> Self {
        Self {
            filename: filename.to_string(),
            sprints,
            warnings: Vec::new(),
        }
    }

    pub fn all_tasks(&self) -> impl Iterator<Item = &Task> {
        self.sprints.iter().flat_map(|s| s.tasks.iter())
    }

    pub fn task_count(&self) -> usize {
        self.sprints.iter().map(|s| s.tasks.len()).sum()
    }

    pub fn total_hours(&self) -> f64 {
        self.sprints.iter().map(|s| s.total_hours).sum()
    }

    pub fn total_load(&self) -> f64 {
        self.sprints.iter().map(Sprint::sprint_load).sum()
    }

    /// Number of task → task dependency edges declared across the plan.
    pub fn dependency_count(&self) -> usize {
        self.all_tasks().map(|t| t.dependencies.len()).sum()
    }
}

/// A person on the plan. Per-sprint availability comes from `sprint_hours`
/// and falls back to the uniform `hours_per_sprint`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Resource {
    pub name: String,
    #[serde(default)]
    pub discipline: String,
    #[serde(default)]
    pub hourly_rate: f64,
    #[serde(default)]
    pub hours_per_sprint: f64,
    #[serde(default)]
    pub sprint_hours: BTreeMap<String, f64>,
    /// Hours already burned per sprint, as tracked by the external sheet. May be partial.
    #[serde(default)]
    pub consumed_hours: BTreeMap<String, f64>,
}

impl Resource {
    pub fn new(name: &str, hours_per_sprint: f64) -> Self {
        Self {
            name: name.to_string(),
            hours_per_sprint,
            ..Self::default()
        }
    }

    pub fn available_for(&self, sprint_name: &str) -> f64 {
        self.sprint_hours
            .get(sprint_name)
            .copied()
            .unwrap_or(self.hours_per_sprint)
    }

    pub fn consumed_for(&self, sprint_name: &str) -> Option<f64> {
        self.consumed_hours.get(sprint_name).copied()
    }
}

/// On-disk analysis input: the parsed capacity plan plus optional DED and roster.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PlanInput {
    pub plan: CapacityPlan,
    #[serde(default)]
    pub document: Option<DedDocument>,
    #[serde(default)]
    pub resources: Vec<Resource>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn derived_capacity_values() {
        let sprint = Sprint::new("Sprint 1", 100.0).with_tasks(vec![
            Task::new("T1", "Login form", 30.0, "Sprint 1"),
            Task::new("T2", "Logout", 30.0, "Sprint 1"),
        ]);

        assert_eq!(sprint.net_capacity(), 80.0);
        assert_eq!(sprint.buffer_hours(), 20.0);
        assert_eq!(sprint.sprint_load(), 60.0);
        assert_eq!(sprint.overflow_hours(), -20.0);
        assert_eq!(sprint.status(), SprintStatus::Pass);
    }

    #[test]
    fn load_equal_to_capacity_passes() {
        let sprint = Sprint::new("S", 100.0).with_tasks(vec![Task::new("T", "x", 80.0, "S")]);
        assert_eq!(sprint.status(), SprintStatus::Pass);
        assert_eq!(sprint.overflow_hours(), 0.0);
    }

    #[test]
    fn sprint_buffer_is_unset_when_missing_from_json() {
        let sprint: Sprint =
            serde_json::from_str(r#"{"name":"S1","total_hours":50}"#).expect("parse sprint");
        assert_eq!(sprint.buffer_percentage, None);
        assert_eq!(sprint.buffer(), DEFAULT_BUFFER_PERCENTAGE);
        assert!(sprint.tasks.is_empty());

        let explicit = Sprint::new("S2", 50.0).with_buffer(0.5);
        assert_eq!(explicit.net_capacity(), 25.0);
    }

    #[test]
    fn resource_availability_prefers_sprint_override() {
        let mut resource = Resource::new("alice", 40.0);
        resource.sprint_hours.insert("Sprint 2".to_string(), 20.0);

        assert_eq!(resource.available_for("Sprint 1"), 40.0);
        assert_eq!(resource.available_for("Sprint 2"), 20.0);
        assert_eq!(resource.consumed_for("Sprint 1"), None);
    }

    #[test]
    fn plan_counts_dependency_edges() {
        let mut t2 = Task::new("T2", "b", 1.0, "S1");
        t2.dependencies = vec!["T1".to_string(), "T0".to_string()];
        let plan = CapacityPlan::new(
            "plan.json",
            vec![Sprint::new("S1", 10.0).with_tasks(vec![Task::new("T1", "a", 1.0, "S1"), t2])],
        );
        assert_eq!(plan.dependency_count(), 2);
        assert_eq!(plan.task_count(), 2);
        assert_eq!(plan.total_load(), 2.0);
    }
}
