use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum RiskLevel {
    #[default]
    Low,
    Medium,
    High,
    Critical,
}

impl RiskLevel {
    /// ≤30 LOW, ≤60 MEDIUM, ≤80 HIGH, else CRITICAL
    pub fn from_score(score: f64) -> Self {
        if score <= 30.0 {
            RiskLevel::Low
        } else if score <= 60.0 {
            RiskLevel::Medium
        } else if score <= 80.0 {
            RiskLevel::High
        } else {
            RiskLevel::Critical
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            RiskLevel::Low => "LOW",
            RiskLevel::Medium => "MEDIUM",
            RiskLevel::High => "HIGH",
            RiskLevel::Critical => "CRITICAL",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "LOW" => Some(RiskLevel::Low),
            "MEDIUM" => Some(RiskLevel::Medium),
            "HIGH" => Some(RiskLevel::High),
            "CRITICAL" => Some(RiskLevel::Critical),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RiskFactorKind {
    RedFlags,
    CapacityOverrun,
    VelocityVariance,
    ResourceOverAllocation,
    DependencyComplexity,
}

impl RiskFactorKind {
    pub const ALL: [RiskFactorKind; 5] = [
        RiskFactorKind::RedFlags,
        RiskFactorKind::CapacityOverrun,
        RiskFactorKind::VelocityVariance,
        RiskFactorKind::ResourceOverAllocation,
        RiskFactorKind::DependencyComplexity,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            RiskFactorKind::RedFlags => "red_flags",
            RiskFactorKind::CapacityOverrun => "capacity_overrun",
            RiskFactorKind::VelocityVariance => "velocity_variance",
            RiskFactorKind::ResourceOverAllocation => "resource_over_allocation",
            RiskFactorKind::DependencyComplexity => "dependency_complexity",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RiskFactor {
    pub kind: RiskFactorKind,
    /// Sub-score on the 0–100 scale, before weighting.
    pub raw_score: f64,
    pub weight: f64,
    pub weighted_score: f64,
    pub description: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RiskScoreResult {
    pub overall_score: f64,
    pub risk_level: RiskLevel,
    pub factor_breakdown: Vec<RiskFactor>,
    /// Three largest weighted contributions, largest first.
    pub top_risk_factors: Vec<RiskFactorKind>,
}

/// Composite weights. Must sum to 1.0.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RiskWeights {
    pub red_flags: f64,
    pub capacity_overrun: f64,
    pub velocity_variance: f64,
    pub resource_over_allocation: f64,
    pub dependency_complexity: f64,
}

impl Default for RiskWeights {
    fn default() -> Self {
        Self {
            red_flags: 0.25,
            capacity_overrun: 0.25,
            velocity_variance: 0.15,
            resource_over_allocation: 0.20,
            dependency_complexity: 0.15,
        }
    }
}

const WEIGHT_SUM_TOLERANCE: f64 = 1e-6;

impl RiskWeights {
    pub fn get(&self, kind: RiskFactorKind) -> f64 {
        match kind {
            RiskFactorKind::RedFlags => self.red_flags,
            RiskFactorKind::CapacityOverrun => self.capacity_overrun,
            RiskFactorKind::VelocityVariance => self.velocity_variance,
            RiskFactorKind::ResourceOverAllocation => self.resource_over_allocation,
            RiskFactorKind::DependencyComplexity => self.dependency_complexity,
        }
    }

    pub fn sum(&self) -> f64 {
        RiskFactorKind::ALL.iter().map(|k| self.get(*k)).sum()
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        for kind in RiskFactorKind::ALL {
            let value = self.get(kind);
            if !value.is_finite() || !(0.0..=1.0).contains(&value) {
                return Err(ConfigError::InvalidWeight {
                    name: kind.as_str(),
                    value,
                });
            }
        }

        let sum = self.sum();
        if (sum - 1.0).abs() > WEIGHT_SUM_TOLERANCE {
            return Err(ConfigError::WeightsDoNotSumToOne(sum));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_weights_sum_to_one() {
        let weights = RiskWeights::default();
        assert!((weights.sum() - 1.0).abs() < 1e-9);
        assert!(weights.validate().is_ok());
    }

    #[test]
    fn rejects_weights_not_summing_to_one() {
        let weights = RiskWeights {
            red_flags: 0.5,
            ..RiskWeights::default()
        };
        assert!(matches!(
            weights.validate(),
            Err(ConfigError::WeightsDoNotSumToOne(_))
        ));
    }

    #[test]
    fn rejects_negative_weight() {
        let weights = RiskWeights {
            red_flags: -0.25,
            capacity_overrun: 0.75,
            ..RiskWeights::default()
        };
        assert!(matches!(
            weights.validate(),
            Err(ConfigError::InvalidWeight { name: "red_flags", .. })
        ));
    }

    #[test]
    fn risk_level_boundaries_are_inclusive() {
        assert_eq!(RiskLevel::from_score(0.0), RiskLevel::Low);
        assert_eq!(RiskLevel::from_score(30.0), RiskLevel::Low);
        assert_eq!(RiskLevel::from_score(30.1), RiskLevel::Medium);
        assert_eq!(RiskLevel::from_score(60.0), RiskLevel::Medium);
        assert_eq!(RiskLevel::from_score(80.0), RiskLevel::High);
        assert_eq!(RiskLevel::from_score(80.5), RiskLevel::Critical);
    }

    #[test]
    fn risk_level_string_round_trip() {
        for level in [
            RiskLevel::Low,
            RiskLevel::Medium,
            RiskLevel::High,
            RiskLevel::Critical,
        ] {
            assert_eq!(RiskLevel::parse(level.as_str()), Some(level));
        }
        assert_eq!(RiskLevel::parse("unknown"), None);
    }
}
