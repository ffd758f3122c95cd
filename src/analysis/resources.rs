use std::collections::HashSet;

use crate::error::ConfigError;
use crate::models::plan::{Resource, Sprint, Task};
use crate::models::resource::{
    AttributionStrategy, BottleneckWarning, ResourceAnalysis, ResourceMetrics,
    ResourceSprintAllocation,
};

pub const DEFAULT_OVER_THRESHOLD: f64 = 1.0;
pub const DEFAULT_UNDER_THRESHOLD: f64 = 0.5;
pub const DEFAULT_BOTTLENECK_EPIC_THRESHOLD: usize = 3;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ResourceConfig {
    over_threshold: f64,
    under_threshold: f64,
    bottleneck_epic_threshold: usize,
    attribution: AttributionStrategy,
}

impl ResourceConfig {
    pub fn new(
        over_threshold: f64,
        under_threshold: f64,
        bottleneck_epic_threshold: usize,
        attribution: AttributionStrategy,
    ) -> Result<Self, ConfigError> {
        if !over_threshold.is_finite() || over_threshold <= 0.0 {
            return Err(ConfigError::InvalidThreshold {
                name: "over_threshold",
                value: over_threshold,
            });
        }
        if !under_threshold.is_finite() || under_threshold < 0.0 || under_threshold > over_threshold {
            return Err(ConfigError::InvalidThreshold {
                name: "under_threshold",
                value: under_threshold,
            });
        }
        if bottleneck_epic_threshold == 0 {
            return Err(ConfigError::InvalidThreshold {
                name: "bottleneck_epic_threshold",
                value: 0.0,
            });
        }

        Ok(Self {
            over_threshold,
            under_threshold,
            bottleneck_epic_threshold,
            attribution,
        })
    }

    pub fn over_threshold(&self) -> f64 {
        self.over_threshold
    }

    pub fn under_threshold(&self) -> f64 {
        self.under_threshold
    }

    pub fn bottleneck_epic_threshold(&self) -> usize {
        self.bottleneck_epic_threshold
    }

    pub fn attribution(&self) -> AttributionStrategy {
        self.attribution
    }
}

impl Default for ResourceConfig {
    fn default() -> Self {
        Self {
            over_threshold: DEFAULT_OVER_THRESHOLD,
            under_threshold: DEFAULT_UNDER_THRESHOLD,
            bottleneck_epic_threshold: DEFAULT_BOTTLENECK_EPIC_THRESHOLD,
            attribution: AttributionStrategy::Tags,
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct ResourceAnalyzer {
    config: ResourceConfig,
}

impl ResourceAnalyzer {
    pub fn new(config: ResourceConfig) -> Self {
        Self { config }
    }

    pub fn analyze(&self, resources: &[Resource], sprints: &[Sprint]) -> ResourceAnalysis {
        if resources.is_empty() || sprints.is_empty() {
            return ResourceAnalysis::default();
        }

        let mut analysis = ResourceAnalysis {
            total_resources: resources.len(),
            ..ResourceAnalysis::default()
        };

        for resource in resources {
            let (metrics, sprint_count) = self.resource_metrics(resource, sprints);

            if metrics.is_over_allocated {
                analysis.over_allocated.push(metrics.name.clone());
            }
            if metrics.is_under_allocated {
                analysis.under_allocated.push(metrics.name.clone());
            }
            if metrics.unique_epics >= self.config.bottleneck_epic_threshold {
                analysis.bottleneck_warnings.push(BottleneckWarning {
                    resource_name: metrics.name.clone(),
                    reason: format!(
                        "Allocated across {} epics in {} sprints, potential skill bottleneck",
                        metrics.unique_epics, sprint_count
                    ),
                    epic_count: metrics.unique_epics,
                    story_count: metrics.unique_stories,
                    sprint_count,
                });
            }
            analysis.resource_metrics.push(metrics);
        }

        log::debug!(
            "Resource analysis: {} resources, {} over, {} under, {} bottlenecks",
            analysis.total_resources,
            analysis.over_allocated.len(),
            analysis.under_allocated.len(),
            analysis.bottleneck_warnings.len()
        );
        analysis
    }

    /// Whether `task` counts toward `resource` under the configured strategy.
    pub fn is_attributed(&self, task: &Task, resource: &Resource) -> bool {
        self.config.attribution.attributes(task, resource)
    }

    /// Metrics for one person, plus the number of sprints they have work in.
    fn resource_metrics(&self, resource: &Resource, sprints: &[Sprint]) -> (ResourceMetrics, usize) {
        let mut metrics = ResourceMetrics {
            name: resource.name.clone(),
            discipline: resource.discipline.clone(),
            ..ResourceMetrics::default()
        };
        let mut task_hours: Vec<f64> = Vec::new();
        let mut stories: HashSet<&str> = HashSet::new();
        let mut epics: HashSet<&str> = HashSet::new();
        let mut active_sprints = 0;

        for sprint in sprints {
            let attributed: Vec<&Task> = sprint
                .tasks
                .iter()
                .filter(|t| self.is_attributed(t, resource))
                .collect();

            let allocated: f64 = attributed.iter().map(|t| t.hours).sum();
            let available = resource.available_for(&sprint.name);
            let consumed = resource.consumed_for(&sprint.name);

            if !attributed.is_empty() {
                active_sprints += 1;
            }
            for task in &attributed {
                task_hours.push(task.hours);
                if let Some(story_id) = task.story_id.as_deref() {
                    stories.insert(story_id);
                }
                if let Some(epic_id) = task.epic_id.as_deref() {
                    epics.insert(epic_id);
                }
            }

            if available > 0.0 && allocated / available > self.config.over_threshold {
                metrics.is_over_allocated = true;
                metrics.over_allocated_sprints.push(sprint.name.clone());
            }

            metrics.total_allocated_hours += allocated;
            metrics.total_available_hours += available;
            metrics.total_consumed_hours += consumed.unwrap_or(0.0);
            metrics.sprint_allocations.push(ResourceSprintAllocation {
                sprint_name: sprint.name.clone(),
                allocated_hours: allocated,
                available_hours: available,
                consumed_hours: consumed,
                utilization_percent: percent(allocated, available),
            });
        }

        metrics.average_utilization =
            percent(metrics.total_allocated_hours, metrics.total_available_hours);
        metrics.is_under_allocated = metrics.total_available_hours > 0.0
            && metrics.total_allocated_hours / metrics.total_available_hours
                < self.config.under_threshold;
        metrics.allocated_cost = metrics.total_allocated_hours * resource.hourly_rate;
        metrics.task_count = task_hours.len();
        metrics.task_hours_cv = coefficient_of_variation(&task_hours);
        metrics.unique_stories = stories.len();
        metrics.unique_epics = epics.len();

        (metrics, active_sprints)
    }
}

fn percent(part: f64, whole: f64) -> f64 {
    if whole <= 0.0 {
        0.0
    } else {
        part / whole * 100.0
    }
}

/// Population standard deviation over mean; 0 for fewer than two values.
fn coefficient_of_variation(values: &[f64]) -> f64 {
    if values.len() < 2 {
        return 0.0;
    }
    let n = values.len() as f64;
    let mean = values.iter().sum::<f64>() / n;
    if mean == 0.0 {
        return 0.0;
    }
    let variance = values.iter().map(|v| (v - mean).powi(2)).sum::<f64>() / n;
    variance.sqrt() / mean
}
