use crate::error::ConfigError;
use crate::models::plan::Sprint;
use crate::models::velocity::{ConfidenceIntervals, SprintVelocity, VelocityAnalysis, VelocityTrend};

pub const DEFAULT_TREND_THRESHOLD: f64 = 0.02;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct VelocityConfig {
    trend_threshold: f64,
}

impl VelocityConfig {
    pub fn new(trend_threshold: f64) -> Result<Self, ConfigError> {
        if !trend_threshold.is_finite() || trend_threshold < 0.0 {
            return Err(ConfigError::InvalidThreshold {
                name: "trend_threshold",
                value: trend_threshold,
            });
        }
        Ok(Self { trend_threshold })
    }

    pub fn trend_threshold(&self) -> f64 {
        self.trend_threshold
    }
}

impl Default for VelocityConfig {
    fn default() -> Self {
        Self {
            trend_threshold: DEFAULT_TREND_THRESHOLD,
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct VelocityAnalyzer {
    config: VelocityConfig,
}

impl VelocityAnalyzer {
    pub fn new(config: VelocityConfig) -> Self {
        Self { config }
    }

    pub fn analyze(&self, sprints: &[Sprint]) -> VelocityAnalysis {
        if sprints.is_empty() {
            return VelocityAnalysis::default();
        }

        let sprint_velocities: Vec<SprintVelocity> = sprints
            .iter()
            .map(|sprint| {
                let capacity = sprint.net_capacity();
                let load = sprint.sprint_load();
                SprintVelocity {
                    sprint_name: sprint.name.clone(),
                    capacity,
                    load,
                    velocity_ratio: if capacity <= 0.0 { 0.0 } else { load / capacity },
                    unused_capacity: capacity - load,
                }
            })
            .collect();

        let ratios: Vec<f64> = sprint_velocities.iter().map(|v| v.velocity_ratio).collect();
        let loads: Vec<f64> = sprint_velocities.iter().map(|v| v.load).collect();

        let mean_velocity = mean(&ratios);
        let velocity_variance = population_variance(&ratios, mean_velocity);
        let trend_slope = ols_slope(&ratios);

        VelocityAnalysis {
            sprint_count: sprint_velocities.len(),
            sprint_velocities,
            mean_velocity,
            velocity_std_dev: velocity_variance.sqrt(),
            velocity_variance,
            trend: self.classify_trend(trend_slope),
            trend_slope,
            confidence_intervals: confidence_intervals(&loads),
        }
    }

    pub fn classify_trend(&self, slope: f64) -> VelocityTrend {
        if slope > self.config.trend_threshold {
            VelocityTrend::Improving
        } else if slope < -self.config.trend_threshold {
            VelocityTrend::Declining
        } else {
            VelocityTrend::Stable
        }
    }
}

fn mean(values: &[f64]) -> f64 {
    if values.is_empty() {
        return 0.0;
    }
    values.iter().sum::<f64>() / values.len() as f64
}

fn population_variance(values: &[f64], mean: f64) -> f64 {
    if values.len() < 2 {
        return 0.0;
    }
    values.iter().map(|v| (v - mean).powi(2)).sum::<f64>() / values.len() as f64
}

/// Least-squares slope of `values` against their 0-based index.
fn ols_slope(values: &[f64]) -> f64 {
    let n = values.len();
    if n < 2 {
        return 0.0;
    }

    let x_mean = (n - 1) as f64 / 2.0;
    let y_mean = mean(values);
    let mut numerator = 0.0;
    let mut denominator = 0.0;
    for (index, y) in values.iter().enumerate() {
        let dx = index as f64 - x_mean;
        numerator += dx * (y - y_mean);
        denominator += dx * dx;
    }

    if denominator == 0.0 {
        0.0
    } else {
        numerator / denominator
    }
}

fn confidence_intervals(loads: &[f64]) -> ConfidenceIntervals {
    let mut sorted = loads.to_vec();
    sorted.sort_by(f64::total_cmp);
    ConfidenceIntervals {
        p50: percentile(&sorted, 50.0),
        p85: percentile(&sorted, 85.0),
        p95: percentile(&sorted, 95.0),
    }
}

/// Linear interpolation between the closest ranks of a sorted series.
pub fn percentile(sorted: &[f64], pct: f64) -> f64 {
    match sorted.len() {
        0 => 0.0,
        1 => sorted[0],
        n => {
            let rank = pct / 100.0 * (n - 1) as f64;
            let lower = rank.floor() as usize;
            let upper = (lower + 1).min(n - 1);
            let fraction = rank - lower as f64;
            sorted[lower] + (sorted[upper] - sorted[lower]) * fraction
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::plan::Task;

    fn loaded(name: &str, load: f64) -> Sprint {
        Sprint::new(name, 100.0).with_tasks(vec![Task::new("T", "t", load, name)])
    }

    #[test]
    fn percentiles_interpolate_between_ranks() {
        let sprints: Vec<Sprint> = [40.0, 60.0, 80.0, 100.0]
            .iter()
            .enumerate()
            .map(|(i, load)| loaded(&format!("Sprint {}", i + 1), *load))
            .collect();

        let analysis = VelocityAnalyzer::default().analyze(&sprints);
        assert!((analysis.confidence_intervals.p50 - 70.0).abs() < 1e-9);
        assert!((analysis.confidence_intervals.p85 - 91.0).abs() < 1e-9);
        assert!((analysis.confidence_intervals.p95 - 97.0).abs() < 1e-9);
        assert_eq!(analysis.trend, VelocityTrend::Improving);
    }

    #[test]
    fn single_sprint_is_stable_with_zero_variance() {
        let analysis = VelocityAnalyzer::default().analyze(&[loaded("Sprint 1", 60.0)]);
        assert_eq!(analysis.velocity_variance, 0.0);
        assert_eq!(analysis.trend_slope, 0.0);
        assert_eq!(analysis.trend, VelocityTrend::Stable);
        assert_eq!(analysis.confidence_intervals.p50, 60.0);
        assert_eq!(analysis.confidence_intervals.p95, 60.0);
    }

    #[test]
    fn declining_trend_and_zero_capacity_ratio() {
        let mut sprints = vec![loaded("Sprint 1", 80.0), loaded("Sprint 2", 40.0)];
        sprints.push(Sprint::new("Sprint 3", 0.0));

        let analysis = VelocityAnalyzer::default().analyze(&sprints);
        assert_eq!(analysis.sprint_velocities[2].velocity_ratio, 0.0);
        assert!((analysis.mean_velocity - 0.5).abs() < 1e-12);
        assert!((analysis.trend_slope + 0.5).abs() < 1e-12);
        assert_eq!(analysis.trend, VelocityTrend::Declining);
    }

    #[test]
    fn empty_input_is_default() {
        assert_eq!(VelocityAnalyzer::default().analyze(&[]), VelocityAnalysis::default());
    }

    #[test]
    fn rejects_negative_threshold() {
        assert!(VelocityConfig::new(-0.1).is_err());
    }
}
