use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum VelocityTrend {
    Improving,
    Declining,
    #[default]
    Stable,
}

/// Load percentiles across the historical sprints.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct ConfidenceIntervals {
    pub p50: f64,
    pub p85: f64,
    pub p95: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SprintVelocity {
    pub sprint_name: String,
    pub capacity: f64,
    pub load: f64,
    /// load / capacity; 1.0 is a perfect match.
    pub velocity_ratio: f64,
    pub unused_capacity: f64,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct VelocityAnalysis {
    pub sprint_velocities: Vec<SprintVelocity>,
    pub mean_velocity: f64,
    pub velocity_std_dev: f64,
    pub velocity_variance: f64,
    pub trend: VelocityTrend,
    pub trend_slope: f64,
    pub confidence_intervals: ConfidenceIntervals,
    pub sprint_count: usize,
}
