use std::collections::HashSet;

use crate::error::ConfigError;
use crate::models::capacity::{
    CapacityCheck, CapacityRecommendation, CapacitySummary, RecommendationKind, SprintAnalysis,
};
use crate::models::plan::{CapacityPlan, Sprint, SprintStatus, Task, DEFAULT_BUFFER_PERCENTAGE};
use crate::models::red_flag::RedFlag;

const EPSILON: f64 = 1e-9;
/// Tasks at or below this size are not worth splitting.
const MIN_SPLIT_HOURS: f64 = 4.0;

const PRIORITY_EARLY_VALIDATION: u8 = 1;
const PRIORITY_MOVE: u8 = 2;
const PRIORITY_SPLIT: u8 = 3;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CapacityConfig {
    default_buffer: f64,
}

impl CapacityConfig {
    pub fn new(default_buffer: f64) -> Result<Self, ConfigError> {
        if !default_buffer.is_finite() || !(0.0..1.0).contains(&default_buffer) {
            return Err(ConfigError::BufferOutOfRange(default_buffer));
        }
        Ok(Self { default_buffer })
    }

    pub fn default_buffer(&self) -> f64 {
        self.default_buffer
    }

    /// Copy of `plan` with the default buffer stamped on every sprint that
    /// leaves it unset. Explicit sprint buffers are kept as they are.
    pub fn with_default_buffers(&self, plan: &CapacityPlan) -> CapacityPlan {
        let mut resolved = plan.clone();
        for sprint in &mut resolved.sprints {
            sprint.buffer_percentage.get_or_insert(self.default_buffer);
        }
        resolved
    }

    /// Like [`Self::with_default_buffers`], but rejects explicit sprint
    /// buffers outside `[0, 1)`.
    pub fn resolve_plan(&self, plan: &CapacityPlan) -> Result<CapacityPlan, ConfigError> {
        for sprint in &plan.sprints {
            if let Some(buffer) = sprint.buffer_percentage {
                if !buffer.is_finite() || !(0.0..1.0).contains(&buffer) {
                    return Err(ConfigError::BufferOutOfRange(buffer));
                }
            }
        }
        Ok(self.with_default_buffers(plan))
    }
}

impl Default for CapacityConfig {
    fn default() -> Self {
        Self {
            default_buffer: DEFAULT_BUFFER_PERCENTAGE,
        }
    }
}

/// Story and epic ids referenced by red flags.
struct RiskKeys<'a> {
    stories: HashSet<&'a str>,
    epics: HashSet<&'a str>,
}

impl<'a> RiskKeys<'a> {
    fn from_flags(red_flags: Option<&'a [RedFlag]>) -> Self {
        let mut keys = Self {
            stories: HashSet::new(),
            epics: HashSet::new(),
        };
        for rf in red_flags.unwrap_or_default() {
            if let Some(story_id) = rf.criterion.story_id.as_deref() {
                keys.stories.insert(story_id);
            }
            if let Some(epic_id) = rf.criterion.epic_id.as_deref() {
                keys.epics.insert(epic_id);
            }
        }
        keys
    }

    fn is_high_risk(&self, task: &Task) -> bool {
        task.story_id
            .as_deref()
            .is_some_and(|id| self.stories.contains(id))
            || task
                .epic_id
                .as_deref()
                .is_some_and(|id| self.epics.contains(id))
    }
}

#[derive(Debug, Clone, Default)]
pub struct CapacityAnalyzer {
    config: CapacityConfig,
}

impl CapacityAnalyzer {
    pub fn new(config: CapacityConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &CapacityConfig {
        &self.config
    }

    /// Per-sprint verdicts plus rebalancing advice, in plan order. Sprints
    /// without an explicit buffer use the configured default.
    ///
    /// Spare capacity is tracked across the whole plan and is consumed by every
    /// recommendation, so two overloaded sprints never both target the same
    /// free hours.
    pub fn analyze(&self, plan: &CapacityPlan, red_flags: Option<&[RedFlag]>) -> Vec<SprintAnalysis> {
        let plan = &self.config.with_default_buffers(plan);
        let risk_keys = RiskKeys::from_flags(red_flags);
        let mut spare: Vec<f64> = plan
            .sprints
            .iter()
            .map(|s| s.net_capacity() - s.sprint_load())
            .collect();

        let mut analyses = Vec::with_capacity(plan.sprints.len());
        for (index, sprint) in plan.sprints.iter().enumerate() {
            let high_risk_tasks: Vec<Task> = sprint
                .tasks
                .iter()
                .filter(|t| risk_keys.is_high_risk(t))
                .cloned()
                .collect();

            let mut recommendations = Vec::new();
            if sprint.status() == SprintStatus::Fail {
                recommendations.extend(overload_recommendations(
                    plan,
                    index,
                    &risk_keys,
                    &mut spare,
                ));
            }
            if index > 0 {
                recommendations.extend(early_validation_recommendations(
                    plan,
                    index,
                    &high_risk_tasks,
                    &mut spare,
                ));
            }
            recommendations.sort_by_key(|r| r.priority);

            analyses.push(SprintAnalysis {
                sprint_name: sprint.name.clone(),
                total_hours: sprint.total_hours,
                net_capacity: sprint.net_capacity(),
                sprint_load: sprint.sprint_load(),
                status: sprint.status(),
                overflow_hours: sprint.overflow_hours(),
                utilization_percent: utilization(sprint.sprint_load(), sprint.net_capacity()),
                recommendations,
                high_risk_tasks,
            });
        }

        log::debug!(
            "Capacity analysis of '{}': {} sprints, {} failing",
            plan.filename,
            analyses.len(),
            analyses
                .iter()
                .filter(|a| a.status == SprintStatus::Fail)
                .count()
        );
        analyses
    }

    pub fn summary(&self, analyses: &[SprintAnalysis]) -> CapacitySummary {
        let total_capacity_hours: f64 = analyses.iter().map(|a| a.net_capacity).sum();
        let total_load_hours: f64 = analyses.iter().map(|a| a.sprint_load).sum();
        let failing_sprints = analyses
            .iter()
            .filter(|a| a.status == SprintStatus::Fail)
            .count();

        CapacitySummary {
            total_sprints: analyses.len(),
            passing_sprints: analyses.len() - failing_sprints,
            failing_sprints,
            overall_utilization: utilization(total_load_hours, total_capacity_hours),
            total_capacity_hours,
            total_load_hours,
            total_recommendations: analyses.iter().map(|a| a.recommendations.len()).sum(),
            high_risk_task_count: analyses.iter().map(|a| a.high_risk_tasks.len()).sum(),
        }
    }

    /// Checks a prospective load against a sprint size using the configured buffer.
    pub fn validate_capacity(&self, total_hours: f64, sprint_load: f64) -> CapacityCheck {
        let net_capacity = total_hours * (1.0 - self.config.default_buffer);
        let status = if sprint_load <= net_capacity {
            SprintStatus::Pass
        } else {
            SprintStatus::Fail
        };

        CapacityCheck {
            total_hours,
            net_capacity,
            sprint_load,
            status,
            overflow_hours: sprint_load - net_capacity,
            utilization_percent: utilization(sprint_load, net_capacity),
        }
    }

    /// Greedy largest-first placement of `tasks` over empty `sprints`.
    /// Each task goes to the sprint with the most spare net capacity that can
    /// hold it; when none can, to the least-loaded sprint.
    pub fn calculate_optimal_distribution(
        &self,
        tasks: &[Task],
        sprints: &[Sprint],
    ) -> Vec<(String, Vec<Task>)> {
        if sprints.is_empty() {
            return Vec::new();
        }

        let mut ordered: Vec<&Task> = tasks.iter().collect();
        ordered.sort_by(|a, b| b.hours.total_cmp(&a.hours));

        let mut loads = vec![0.0_f64; sprints.len()];
        let mut buckets: Vec<Vec<Task>> = vec![Vec::new(); sprints.len()];

        for task in ordered {
            let mut best: Option<(usize, f64)> = None;
            for (index, sprint) in sprints.iter().enumerate() {
                let free = sprint.net_capacity() - loads[index];
                if free >= task.hours && best.map_or(true, |(_, best_free)| free > best_free) {
                    best = Some((index, free));
                }
            }

            let target = match best {
                Some((index, _)) => index,
                None => least_loaded(&loads),
            };

            loads[target] += task.hours;
            let mut placed = task.clone();
            placed.sprint = sprints[target].name.clone();
            buckets[target].push(placed);
        }

        sprints
            .iter()
            .map(|s| s.name.clone())
            .zip(buckets)
            .collect()
    }
}

fn overload_recommendations(
    plan: &CapacityPlan,
    index: usize,
    risk_keys: &RiskKeys<'_>,
    spare: &mut [f64],
) -> Vec<CapacityRecommendation> {
    let sprint = &plan.sprints[index];
    let mut remaining = sprint.overflow_hours();
    let mut recommendations = Vec::new();
    let mut moved: HashSet<&str> = HashSet::new();

    let mut candidates: Vec<&Task> = sprint
        .tasks
        .iter()
        .filter(|t| !risk_keys.is_high_risk(t))
        .collect();
    candidates.sort_by(|a, b| b.hours.total_cmp(&a.hours));

    for task in candidates {
        if remaining <= EPSILON {
            break;
        }
        if task.hours <= 0.0 {
            continue;
        }

        let Some(target) = (index + 1..plan.sprints.len()).find(|&j| spare[j] >= task.hours) else {
            continue;
        };

        spare[target] -= task.hours;
        remaining -= task.hours;
        moved.insert(task.id.as_str());
        recommendations.push(CapacityRecommendation {
            task: task.clone(),
            kind: RecommendationKind::Move,
            from_sprint: sprint.name.clone(),
            to_sprint: plan.sprints[target].name.clone(),
            hours: task.hours,
            reason: format!("Reduce overload by {}h", task.hours),
            priority: PRIORITY_MOVE,
        });
    }

    if remaining > EPSILON {
        let largest = sprint
            .tasks
            .iter()
            .filter(|t| !moved.contains(t.id.as_str()))
            .filter(|t| t.hours > remaining && t.hours > MIN_SPLIT_HOURS)
            .fold(None::<&Task>, |best, t| match best {
                Some(b) if b.hours >= t.hours => Some(b),
                _ => Some(t),
            });

        if let Some(task) = largest {
            let to_sprint = match (index + 1..plan.sprints.len()).find(|&j| spare[j] >= remaining) {
                Some(target) => {
                    spare[target] -= remaining;
                    plan.sprints[target].name.clone()
                }
                None => format!("{} + later sprint", sprint.name),
            };

            recommendations.push(CapacityRecommendation {
                task: task.clone(),
                kind: RecommendationKind::Split,
                from_sprint: sprint.name.clone(),
                to_sprint,
                hours: remaining,
                reason: format!(
                    "Split {}h task to absorb the remaining {remaining:.1}h overflow",
                    task.hours
                ),
                priority: PRIORITY_SPLIT,
            });
        }
    }

    recommendations
}

fn early_validation_recommendations(
    plan: &CapacityPlan,
    index: usize,
    high_risk_tasks: &[Task],
    spare: &mut [f64],
) -> Vec<CapacityRecommendation> {
    let sprint = &plan.sprints[index];
    let mut recommendations = Vec::new();

    for task in high_risk_tasks {
        if task.hours <= 0.0 {
            continue;
        }
        // First earlier sprint with room wins, even if a later one fits better.
        let Some(target) = (0..index).find(|&j| spare[j] >= task.hours) else {
            continue;
        };

        spare[target] -= task.hours;
        recommendations.push(CapacityRecommendation {
            task: task.clone(),
            kind: RecommendationKind::EarlyValidation,
            from_sprint: sprint.name.clone(),
            to_sprint: plan.sprints[target].name.clone(),
            hours: task.hours,
            reason: "High-risk task should be validated early".to_string(),
            priority: PRIORITY_EARLY_VALIDATION,
        });
    }

    recommendations
}

fn utilization(load: f64, capacity: f64) -> f64 {
    if capacity <= 0.0 {
        0.0
    } else {
        load / capacity * 100.0
    }
}

fn least_loaded(loads: &[f64]) -> usize {
    let mut best = 0;
    for (index, load) in loads.iter().enumerate() {
        if *load < loads[best] {
            best = index;
        }
    }
    best
}
