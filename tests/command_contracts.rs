use serde_json::json;
use std::fs;
use std::path::PathBuf;
use std::sync::{Arc, Mutex};
use tempfile::TempDir;
use pi_strategist_lib::commands::assessment::run_full_assessment_internal;
use pi_strategist_lib::commands::compare::compare_plans;
use pi_strategist_lib::commands::db::{delete_assessment, get_db_connection, list_assessments, load_assessment};
use pi_strategist_lib::commands::settings::{get_settings, load_effective_analysis_settings, save_settings, AnalysisSettings};
use pi_strategist_lib::commands::workspace::open_workspace;
use pi_strategist_lib::models::assessment::AssessmentCache;
use pi_strategist_lib::models::resource::AttributionStrategy;
use pi_strategist_lib::StrategistError;

fn overloaded_plan() -> serde_json::Value {
    json!({
        "plan": {
            "filename": "pi-overloaded.xlsx",
            "sprints": [
                {
                    "name": "Sprint 1",
                    "total_hours": 100.0,
                    "tasks": [
                        { "id": "T1", "name": "Login page", "hours": 60.0, "sprint": "Sprint 1" },
                        { "id": "T2", "name": "Report export", "hours": 40.0, "sprint": "Sprint 1" }
                    ]
                },
                {
                    "name": "Sprint 2",
                    "total_hours": 100.0,
                    "tasks": [
                        { "id": "T3", "name": "Checkout", "hours": 30.0, "sprint": "Sprint 2", "story_id": "S1" }
                    ]
                }
            ]
        },
        "document": {
            "filename": "ded.docx",
            "epics": [{
                "id": "E1",
                "name": "Payments",
                "stories": [{
                    "id": "S1",
                    "name": "Pay",
                    "acceptance_criteria": [
                        { "id": "AC1", "text": "Checkout must be fast and secure", "story_id": "S1", "epic_id": "E1" }
                    ]
                }]
            }]
        }
    })
}

fn light_plan() -> serde_json::Value {
    json!({
        "plan": {
            "filename": "pi-light.xlsx",
            "sprints": [{
                "name": "Sprint 1",
                "total_hours": 100.0,
                "tasks": [
                    { "id": "T1", "name": "Copy review", "hours": 10.0, "sprint": "Sprint 1" }
                ]
            }]
        }
    })
}

fn create_workspace_with_plans() -> (TempDir, String, PathBuf) {
    let temp_dir = tempfile::tempdir().expect("create temp dir");
    let workspace_path = temp_dir.path().to_string_lossy().to_string();
    let plans_dir = temp_dir.path().join("plans");
    fs::create_dir_all(&plans_dir).expect("create plans dir");

    let overloaded = plans_dir.join("overloaded.json");
    fs::write(&overloaded, overloaded_plan().to_string()).expect("write overloaded plan");
    fs::write(plans_dir.join("light.json"), light_plan().to_string()).expect("write light plan");

    (temp_dir, workspace_path, overloaded)
}

#[test]
fn open_workspace_returns_expected_metadata_contract() {
    let (_tmp, workspace_path, _plan) = create_workspace_with_plans();

    let meta = open_workspace(&workspace_path).expect("open workspace");

    assert_eq!(meta.path, workspace_path);
    assert!(!meta.name.is_empty());
    assert_eq!(meta.assessment_count, 0);
    assert!(meta.last_assessment_at.is_none());
}

#[test]
fn open_workspace_rejects_missing_directory() {
    let (tmp, _workspace_path, _plan) = create_workspace_with_plans();
    let missing = tmp.path().join("nope").to_string_lossy().to_string();

    let err = open_workspace(&missing).expect_err("missing dir");
    assert!(matches!(err, StrategistError::NotFound(_)));
}

#[test]
fn settings_commands_round_trip_and_merge_partial_updates() {
    let (_tmp, workspace_path, _plan) = create_workspace_with_plans();
    open_workspace(&workspace_path).expect("open workspace");

    let initial = get_settings(&workspace_path).expect("load settings");
    assert!(initial.get("weights").is_some());
    assert_eq!(initial["strictMode"], json!(false));

    let saved = save_settings(
        &workspace_path,
        json!({
            "bufferPercentage": 0.3,
            "strictMode": true,
            "attribution": "assignee"
        }),
    )
    .expect("save settings");

    assert_eq!(saved["bufferPercentage"], json!(0.3));
    assert_eq!(saved["strictMode"], json!(true));
    let weight_sum: f64 = saved["weights"]
        .as_object()
        .expect("weights object")
        .values()
        .filter_map(|v| v.as_f64())
        .sum();
    assert!((weight_sum - 1.0).abs() < 1e-6);
    assert_eq!(saved["cdTargetPercentage"], initial["cdTargetPercentage"]);

    let effective = load_effective_analysis_settings(&workspace_path).expect("effective settings");
    assert!((effective.capacity.default_buffer() - 0.3).abs() < 1e-9);
    assert!(effective.strict_mode);
    assert_eq!(effective.resources.attribution(), AttributionStrategy::Assignee);
}

#[test]
fn full_assessment_persists_history_and_updates_cache() {
    let (_tmp, workspace_path, plan_path) = create_workspace_with_plans();
    open_workspace(&workspace_path).expect("open workspace");

    let cache = Arc::new(Mutex::new(AssessmentCache::default()));
    let mut stages = Vec::new();
    let assessment = run_full_assessment_internal(&workspace_path, &plan_path, &cache, |p| {
        stages.push(p.stage)
    })
    .expect("run full assessment");

    assert_eq!(stages.len(), 7);
    assert_eq!(assessment.plan_name, "pi-overloaded.xlsx");
    assert_eq!(assessment.capacity_summary.failing_sprints, 1);
    assert_eq!(assessment.red_flags.len(), 2);
    assert!(assessment.risk.overall_score > 0.0);

    {
        let cache_lock = cache.lock().expect("cache lock");
        assert_eq!(cache_lock.workspace_path.as_deref(), Some(workspace_path.as_str()));
        assert_eq!(cache_lock.latest.as_ref(), Some(&assessment));
    }

    let conn = get_db_connection(&workspace_path).expect("db connection");
    let history = list_assessments(&conn, None).expect("list assessments");
    assert_eq!(history.len(), 1);
    assert_eq!(history[0].plan_name, "pi-overloaded.xlsx");
    assert_eq!(history[0].failing_sprints, 1);
    assert_eq!(history[0].red_flag_count, 2);

    let stored = load_assessment(&conn, &history[0].id).expect("load assessment");
    assert_eq!(stored.assessment.plan_name, assessment.plan_name);
    assert_eq!(stored.assessment.risk.risk_level, assessment.risk.risk_level);
    assert!((stored.assessment.risk.overall_score - assessment.risk.overall_score).abs() < 1e-9);
    assert_eq!(stored.assessment.capacity.len(), assessment.capacity.len());

    let meta = open_workspace(&workspace_path).expect("reopen workspace");
    assert_eq!(meta.assessment_count, 1);
    assert!(meta.last_assessment_at.is_some());

    delete_assessment(&conn, &history[0].id).expect("delete assessment");
    assert!(list_assessments(&conn, None).expect("list").is_empty());
    assert!(matches!(
        load_assessment(&conn, &history[0].id),
        Err(StrategistError::NotFound(_))
    ));
}

#[test]
fn workspace_buffer_setting_drives_sprint_capacity() {
    let (_tmp, workspace_path, plan_path) = create_workspace_with_plans();
    open_workspace(&workspace_path).expect("open workspace");
    save_settings(&workspace_path, json!({ "bufferPercentage": 0.5 })).expect("save settings");

    let cache = Arc::new(Mutex::new(AssessmentCache::default()));
    let assessment =
        run_full_assessment_internal(&workspace_path, &plan_path, &cache, |_| {}).expect("assess");

    assert_eq!(assessment.capacity[0].net_capacity, 50.0);
    assert_eq!(assessment.capacity[1].net_capacity, 50.0);
    assert_eq!(assessment.capacity_summary.total_capacity_hours, 100.0);
}

#[test]
fn history_keeps_only_the_configured_retention() {
    let (_tmp, workspace_path, plan_path) = create_workspace_with_plans();
    open_workspace(&workspace_path).expect("open workspace");
    save_settings(&workspace_path, json!({ "snapshotRetention": 2 })).expect("save settings");

    let cache = Arc::new(Mutex::new(AssessmentCache::default()));
    for _ in 0..3 {
        run_full_assessment_internal(&workspace_path, &plan_path, &cache, |_| {}).expect("assess");
    }

    let conn = get_db_connection(&workspace_path).expect("db connection");
    assert_eq!(list_assessments(&conn, None).expect("list").len(), 2);
}

#[test]
fn compare_ranks_plans_by_risk_and_skips_unreadable_files() {
    let (tmp, _workspace_path, _plan) = create_workspace_with_plans();
    fs::write(tmp.path().join("plans").join("broken.json"), "{ not json").expect("write broken");

    let pattern = format!("{}/plans/*.json", tmp.path().display());
    let rows = compare_plans(&pattern, &AnalysisSettings::default()).expect("compare plans");

    assert_eq!(rows.len(), 2);
    assert_eq!(rows[0].plan_name, "pi-overloaded.xlsx");
    assert_eq!(rows[0].failing_sprints, 1);
    assert_eq!(rows[1].plan_name, "pi-light.xlsx");
    assert_eq!(rows[1].overall_score, 0.0);
    assert!(rows[0].overall_score > rows[1].overall_score);
}

#[test]
fn compare_rejects_invalid_pattern() {
    let err = compare_plans("plans/[", &AnalysisSettings::default()).expect_err("bad pattern");
    assert!(matches!(err, StrategistError::Pattern(_)));
}
