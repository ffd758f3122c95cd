use serde_json::{json, Map, Value};
use std::fs;
use std::path::{Path, PathBuf};

use crate::analysis::capacity::CapacityConfig;
use crate::analysis::deployment::{DeploymentConfig, DEFAULT_CD_TARGET};
use crate::analysis::resources::{
    ResourceConfig, DEFAULT_BOTTLENECK_EPIC_THRESHOLD, DEFAULT_OVER_THRESHOLD,
    DEFAULT_UNDER_THRESHOLD,
};
use crate::analysis::velocity::{VelocityConfig, DEFAULT_TREND_THRESHOLD};
use crate::commands::workspace::ensure_data_dir;
use crate::error::Result;
use crate::models::plan::DEFAULT_BUFFER_PERCENTAGE;
use crate::models::resource::AttributionStrategy;
use crate::models::risk_score::{RiskFactorKind, RiskWeights};

const SETTINGS_SCHEMA_VERSION: i64 = 2;
pub const DEFAULT_SNAPSHOT_RETENTION: usize = 52;

/// Validated analyzer configuration for one run.
#[derive(Debug, Clone, PartialEq)]
pub struct AnalysisSettings {
    pub capacity: CapacityConfig,
    pub deployment: DeploymentConfig,
    pub resources: ResourceConfig,
    pub velocity: VelocityConfig,
    pub weights: RiskWeights,
    pub strict_mode: bool,
    pub snapshot_retention: usize,
}

impl Default for AnalysisSettings {
    fn default() -> Self {
        Self {
            capacity: CapacityConfig::default(),
            deployment: DeploymentConfig::default(),
            resources: ResourceConfig::default(),
            velocity: VelocityConfig::default(),
            weights: RiskWeights::default(),
            strict_mode: false,
            snapshot_retention: DEFAULT_SNAPSHOT_RETENTION,
        }
    }
}

impl AnalysisSettings {
    /// Builds settings from a migrated settings document.
    pub fn from_value(settings: &Value) -> Result<Self> {
        let number = |key: &str, default: f64| settings.get(key).and_then(Value::as_f64).unwrap_or(default);

        let attribution = settings
            .get("attribution")
            .and_then(Value::as_str)
            .and_then(AttributionStrategy::parse)
            .unwrap_or_default();

        let defaults = RiskWeights::default();
        let weight = |kind: RiskFactorKind| {
            settings
                .get("weights")
                .and_then(|w| w.get(kind.as_str()))
                .and_then(Value::as_f64)
                .unwrap_or_else(|| defaults.get(kind))
        };
        let weights = RiskWeights {
            red_flags: weight(RiskFactorKind::RedFlags),
            capacity_overrun: weight(RiskFactorKind::CapacityOverrun),
            velocity_variance: weight(RiskFactorKind::VelocityVariance),
            resource_over_allocation: weight(RiskFactorKind::ResourceOverAllocation),
            dependency_complexity: weight(RiskFactorKind::DependencyComplexity),
        };
        weights.validate()?;

        Ok(Self {
            capacity: CapacityConfig::new(number("bufferPercentage", DEFAULT_BUFFER_PERCENTAGE))?,
            deployment: DeploymentConfig::new(number("cdTargetPercentage", DEFAULT_CD_TARGET))?,
            resources: ResourceConfig::new(
                number("overThreshold", DEFAULT_OVER_THRESHOLD),
                number("underThreshold", DEFAULT_UNDER_THRESHOLD),
                settings
                    .get("bottleneckEpicThreshold")
                    .and_then(Value::as_u64)
                    .map_or(DEFAULT_BOTTLENECK_EPIC_THRESHOLD, |v| v as usize),
                attribution,
            )?,
            velocity: VelocityConfig::new(number("trendThreshold", DEFAULT_TREND_THRESHOLD))?,
            weights,
            strict_mode: settings
                .get("strictMode")
                .and_then(Value::as_bool)
                .unwrap_or(false),
            snapshot_retention: settings
                .get("snapshotRetention")
                .and_then(Value::as_u64)
                .map_or(DEFAULT_SNAPSHOT_RETENTION, |v| v as usize),
        })
    }
}

pub fn get_settings(workspace_path: &str) -> Result<Value> {
    load_settings_from_disk(workspace_path)
}

/// Merges a partial settings object into the stored one.
pub fn save_settings(workspace_path: &str, settings: Value) -> Result<Value> {
    save_settings_to_disk(workspace_path, settings)
}

pub fn load_effective_analysis_settings(workspace_path: &str) -> Result<AnalysisSettings> {
    let settings = load_settings_from_disk(workspace_path)?;
    AnalysisSettings::from_value(&settings)
}

pub fn load_settings_from_disk(workspace_path: &str) -> Result<Value> {
    let path = settings_path(workspace_path);
    ensure_data_dir(workspace_path)?;

    let original = if path.exists() {
        let raw = fs::read_to_string(&path)?;
        serde_json::from_str::<Value>(&raw).unwrap_or_else(|e| {
            log::warn!("Ignoring unreadable {}: {e}", path.display());
            json!({})
        })
    } else {
        json!({})
    };

    let migrated = migrate_settings(original.clone());
    if migrated != original || !path.exists() {
        write_settings_file(&path, &migrated)?;
    }

    Ok(migrated)
}

pub fn save_settings_to_disk(workspace_path: &str, settings: Value) -> Result<Value> {
    let path = settings_path(workspace_path);
    ensure_data_dir(workspace_path)?;

    let mut merged = load_settings_from_disk(workspace_path).unwrap_or_else(|_| default_settings());
    merge_settings(&mut merged, &settings);

    let migrated = migrate_settings(merged);
    write_settings_file(&path, &migrated)?;
    Ok(migrated)
}

fn settings_path(workspace_path: &str) -> PathBuf {
    crate::commands::workspace::data_dir(workspace_path).join("settings.json")
}

fn write_settings_file(path: &Path, settings: &Value) -> Result<()> {
    let raw = serde_json::to_string_pretty(settings)?;
    fs::write(path, raw)?;
    Ok(())
}

fn migrate_settings(input: Value) -> Value {
    let defaults = default_settings();
    let mut out = match input {
        Value::Object(map) => Value::Object(map),
        _ => Value::Object(Map::new()),
    };

    let version = out
        .get("schema_version")
        .and_then(Value::as_i64)
        .unwrap_or(0);

    if version < 1 {
        migrate_weights_from_percentages(&mut out);
    }

    if version < 2 {
        // V2 adds strict mode, attribution strategy and the CD target.
        ensure_key(&mut out, "strictMode", json!(false));
        ensure_key(&mut out, "attribution", json!(AttributionStrategy::Tags.as_str()));
        ensure_key(&mut out, "cdTargetPercentage", json!(DEFAULT_CD_TARGET));
    }

    deep_merge_defaults(&mut out, &defaults);
    sanitize_settings(&mut out);
    if let Some(obj) = out.as_object_mut() {
        obj.insert("schema_version".to_string(), json!(SETTINGS_SCHEMA_VERSION));
    }

    out
}

fn default_weights() -> Map<String, Value> {
    let weights = RiskWeights::default();
    RiskFactorKind::ALL
        .iter()
        .map(|kind| (kind.as_str().to_string(), json!(weights.get(*kind))))
        .collect()
}

fn default_settings() -> Value {
    json!({
        "schema_version": SETTINGS_SCHEMA_VERSION,
        "bufferPercentage": DEFAULT_BUFFER_PERCENTAGE,
        "overThreshold": DEFAULT_OVER_THRESHOLD,
        "underThreshold": DEFAULT_UNDER_THRESHOLD,
        "bottleneckEpicThreshold": DEFAULT_BOTTLENECK_EPIC_THRESHOLD,
        "trendThreshold": DEFAULT_TREND_THRESHOLD,
        "cdTargetPercentage": DEFAULT_CD_TARGET,
        "strictMode": false,
        "attribution": AttributionStrategy::Tags.as_str(),
        "weights": default_weights(),
        "snapshotRetention": DEFAULT_SNAPSHOT_RETENTION
    })
}

fn deep_merge_defaults(target: &mut Value, defaults: &Value) {
    let (Some(target_obj), Some(default_obj)) = (target.as_object_mut(), defaults.as_object()) else {
        return;
    };

    for (key, default_value) in default_obj {
        match target_obj.get_mut(key) {
            Some(existing) => {
                if existing.is_object() && default_value.is_object() {
                    deep_merge_defaults(existing, default_value);
                }
            }
            None => {
                target_obj.insert(key.clone(), default_value.clone());
            }
        }
    }
}

fn ensure_key(target: &mut Value, key: &str, value: Value) {
    if let Some(obj) = target.as_object_mut() {
        obj.entry(key.to_string()).or_insert(value);
    }
}

fn merge_settings(target: &mut Value, incoming: &Value) {
    match (target, incoming) {
        (Value::Object(target_obj), Value::Object(incoming_obj)) => {
            for (key, value) in incoming_obj {
                if let Some(existing) = target_obj.get_mut(key) {
                    merge_settings(existing, value);
                } else {
                    target_obj.insert(key.clone(), value.clone());
                }
            }
        }
        (target_slot, incoming_value) => {
            *target_slot = incoming_value.clone();
        }
    }
}

fn migrate_weights_from_percentages(settings: &mut Value) {
    let Some(weights) = settings.get_mut("weights").and_then(Value::as_object_mut) else {
        return;
    };

    let has_percentage_like_values = weights.values().any(|v| v.as_f64().unwrap_or(0.0) > 1.0);
    if !has_percentage_like_values {
        return;
    }

    for value in weights.values_mut() {
        if let Some(v) = value.as_f64() {
            *value = json!(v / 100.0);
        }
    }
}

fn sanitize_settings(settings: &mut Value) {
    let Some(obj) = settings.as_object_mut() else {
        return;
    };

    clamp_f64(obj, "bufferPercentage", 0.0, 0.95, DEFAULT_BUFFER_PERCENTAGE);
    clamp_f64(obj, "overThreshold", 0.1, 5.0, DEFAULT_OVER_THRESHOLD);
    let over = obj
        .get("overThreshold")
        .and_then(Value::as_f64)
        .unwrap_or(DEFAULT_OVER_THRESHOLD);
    clamp_f64(obj, "underThreshold", 0.0, over, DEFAULT_UNDER_THRESHOLD.min(over));
    clamp_u64(obj, "bottleneckEpicThreshold", 1, 50, DEFAULT_BOTTLENECK_EPIC_THRESHOLD as u64);
    clamp_f64(obj, "trendThreshold", 0.0, 1.0, DEFAULT_TREND_THRESHOLD);
    clamp_f64(obj, "cdTargetPercentage", 0.0, 1.0, DEFAULT_CD_TARGET);
    clamp_u64(obj, "snapshotRetention", 1, 1000, DEFAULT_SNAPSHOT_RETENTION as u64);

    sanitize_enum(obj, "attribution", &["tags", "assignee"], AttributionStrategy::Tags.as_str());
    ensure_bool(obj, "strictMode", false);

    // Weights are clamped then normalised to sum to 1.
    let default_weight_map = default_weights();
    let weights = obj
        .entry("weights".to_string())
        .or_insert_with(|| json!({}));

    if let Some(weight_obj) = weights.as_object_mut() {
        weight_obj.retain(|key, _| default_weight_map.contains_key(key));
        for (key, default_value) in &default_weight_map {
            let fallback = default_value.as_f64().unwrap_or(0.0);
            let current = weight_obj
                .get(key)
                .and_then(Value::as_f64)
                .filter(|v| v.is_finite())
                .unwrap_or(fallback);
            weight_obj.insert(key.clone(), json!(current.clamp(0.0, 1.0)));
        }

        let sum: f64 = weight_obj.values().filter_map(Value::as_f64).sum();
        if sum > f64::EPSILON {
            for value in weight_obj.values_mut() {
                if let Some(v) = value.as_f64() {
                    *value = json!((v / sum).clamp(0.0, 1.0));
                }
            }
        } else {
            *weight_obj = default_weight_map;
        }
    } else {
        *weights = Value::Object(default_weight_map);
    }
}

fn clamp_f64(map: &mut Map<String, Value>, key: &str, min: f64, max: f64, default: f64) {
    let raw = map
        .get(key)
        .and_then(Value::as_f64)
        .filter(|v| v.is_finite())
        .unwrap_or(default);
    map.insert(key.to_string(), json!(raw.clamp(min, max)));
}

fn clamp_u64(map: &mut Map<String, Value>, key: &str, min: u64, max: u64, default: u64) {
    let raw = map.get(key).and_then(Value::as_u64).unwrap_or(default);
    map.insert(key.to_string(), json!(raw.clamp(min, max)));
}

fn sanitize_enum(map: &mut Map<String, Value>, key: &str, allowed: &[&str], default: &str) {
    let valid = map
        .get(key)
        .and_then(Value::as_str)
        .filter(|value| allowed.contains(value))
        .unwrap_or(default);
    map.insert(key.to_string(), json!(valid));
}

fn ensure_bool(map: &mut Map<String, Value>, key: &str, default: bool) {
    let value = map.get(key).and_then(Value::as_bool).unwrap_or(default);
    map.insert(key.to_string(), json!(value));
}
