use crate::error::ConfigError;
use crate::models::capacity::SprintAnalysis;
use crate::models::plan::SprintStatus;
use crate::models::red_flag::{RedFlag, Severity};
use crate::models::resource::ResourceAnalysis;
use crate::models::risk_score::{RiskFactor, RiskFactorKind, RiskLevel, RiskScoreResult, RiskWeights};

const MAX_SCORE: f64 = 100.0;
/// Variance at which the velocity sub-score saturates.
const VELOCITY_VARIANCE_SATURATION: f64 = 0.04;
const CAPACITY_OVERRUN_SCALE: f64 = 2.0;
const OVER_ALLOCATION_SCALE: f64 = 200.0;
const BOTTLENECK_POINTS: f64 = 10.0;
const BOTTLENECK_CAP: f64 = 20.0;
const DEPENDENCY_SCALE: f64 = 50.0;
const TOP_FACTORS: usize = 3;

/// Inputs to the composite score, borrowed from the individual analyses.
#[derive(Debug, Clone, Copy, Default)]
pub struct ScoreInputs<'a> {
    pub red_flags: &'a [RedFlag],
    pub capacity: &'a [SprintAnalysis],
    pub resources: Option<&'a ResourceAnalysis>,
    pub velocity_variance: f64,
    pub dependency_count: usize,
    pub total_tasks: usize,
}

#[derive(Debug, Clone, Default)]
pub struct RiskScorer {
    weights: RiskWeights,
}

impl RiskScorer {
    pub fn new(weights: RiskWeights) -> Result<Self, ConfigError> {
        weights.validate()?;
        Ok(Self { weights })
    }

    pub fn weights(&self) -> &RiskWeights {
        &self.weights
    }

    pub fn score(&self, inputs: &ScoreInputs<'_>) -> RiskScoreResult {
        let factor_breakdown: Vec<RiskFactor> = vec![
            self.factor(
                RiskFactorKind::RedFlags,
                red_flag_score(inputs.red_flags),
                red_flag_description(inputs.red_flags),
            ),
            self.factor(
                RiskFactorKind::CapacityOverrun,
                capacity_score(inputs.capacity),
                capacity_description(inputs.capacity),
            ),
            self.factor(
                RiskFactorKind::VelocityVariance,
                velocity_score(inputs.velocity_variance),
                format!("Velocity variance: {:.4}", inputs.velocity_variance),
            ),
            self.factor(
                RiskFactorKind::ResourceOverAllocation,
                resource_score(inputs.resources),
                resource_description(inputs.resources),
            ),
            self.factor(
                RiskFactorKind::DependencyComplexity,
                dependency_score(inputs.dependency_count, inputs.total_tasks),
                format!(
                    "{} dependencies across {} tasks",
                    inputs.dependency_count, inputs.total_tasks
                ),
            ),
        ];

        let total: f64 = factor_breakdown.iter().map(|f| f.weighted_score).sum();
        let overall = total.clamp(0.0, MAX_SCORE);

        let mut ranked: Vec<&RiskFactor> = factor_breakdown.iter().collect();
        ranked.sort_by(|a, b| b.weighted_score.total_cmp(&a.weighted_score));
        let top_risk_factors = ranked.iter().take(TOP_FACTORS).map(|f| f.kind).collect();

        RiskScoreResult {
            overall_score: (overall * 10.0).round() / 10.0,
            risk_level: RiskLevel::from_score(overall),
            factor_breakdown,
            top_risk_factors,
        }
    }

    fn factor(&self, kind: RiskFactorKind, raw_score: f64, description: String) -> RiskFactor {
        let weight = self.weights.get(kind);
        RiskFactor {
            kind,
            raw_score,
            weight,
            weighted_score: raw_score * weight,
            description,
        }
    }
}

fn red_flag_score(red_flags: &[RedFlag]) -> f64 {
    red_flags
        .iter()
        .map(|rf| rf.severity.score_weight())
        .sum::<f64>()
        .min(MAX_SCORE)
}

fn red_flag_description(red_flags: &[RedFlag]) -> String {
    if red_flags.is_empty() {
        return "No red flags detected".to_string();
    }
    let count = |severity: Severity| red_flags.iter().filter(|rf| rf.severity == severity).count();
    format!(
        "{} red flags ({} critical, {} moderate, {} low)",
        red_flags.len(),
        count(Severity::Critical),
        count(Severity::Moderate),
        count(Severity::Low)
    )
}

fn capacity_score(capacity: &[SprintAnalysis]) -> f64 {
    let total_capacity: f64 = capacity.iter().map(|a| a.net_capacity).sum();
    if capacity.is_empty() || total_capacity <= 0.0 {
        return 0.0;
    }
    let overflow: f64 = capacity.iter().map(|a| a.overflow_hours.max(0.0)).sum();
    (overflow / total_capacity * 100.0 * CAPACITY_OVERRUN_SCALE).min(MAX_SCORE)
}

fn capacity_description(capacity: &[SprintAnalysis]) -> String {
    if capacity.is_empty() {
        return "No capacity data".to_string();
    }
    let failing = capacity
        .iter()
        .filter(|a| a.status == SprintStatus::Fail)
        .count();
    format!("{failing}/{} sprints over capacity", capacity.len())
}

fn velocity_score(variance: f64) -> f64 {
    if !variance.is_finite() || variance <= 0.0 {
        return 0.0;
    }
    (variance / VELOCITY_VARIANCE_SATURATION * 100.0).min(MAX_SCORE)
}

fn resource_score(resources: Option<&ResourceAnalysis>) -> f64 {
    let Some(analysis) = resources else {
        return 0.0;
    };
    if analysis.total_resources == 0 {
        return 0.0;
    }

    let over_ratio = analysis.over_allocated.len() as f64 / analysis.total_resources as f64;
    let base = (over_ratio * OVER_ALLOCATION_SCALE).min(MAX_SCORE);
    let bonus = (analysis.bottleneck_warnings.len() as f64 * BOTTLENECK_POINTS).min(BOTTLENECK_CAP);
    (base + bonus).min(MAX_SCORE)
}

fn resource_description(resources: Option<&ResourceAnalysis>) -> String {
    match resources {
        Some(analysis) if analysis.total_resources > 0 => format!(
            "{} over-allocated, {} under-allocated, {} bottlenecks",
            analysis.over_allocated.len(),
            analysis.under_allocated.len(),
            analysis.bottleneck_warnings.len()
        ),
        _ => "No resource data".to_string(),
    }
}

fn dependency_score(dependency_count: usize, total_tasks: usize) -> f64 {
    if total_tasks == 0 {
        return 0.0;
    }
    (dependency_count as f64 / total_tasks as f64 * DEPENDENCY_SCALE).min(MAX_SCORE)
}
