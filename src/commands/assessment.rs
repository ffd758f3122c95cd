use std::fs;
use std::path::Path;
use std::sync::{Arc, Mutex};
use std::time::Instant;

use crate::analysis::audit::audit_plan;
use crate::analysis::capacity::CapacityAnalyzer;
use crate::analysis::deployment::DeploymentAnalyzer;
use crate::analysis::red_flags::RiskAnalyzer;
use crate::analysis::resources::ResourceAnalyzer;
use crate::analysis::risk_score::{RiskScorer, ScoreInputs};
use crate::analysis::velocity::VelocityAnalyzer;
use crate::commands::settings::AnalysisSettings;
use crate::error::{Result, StrategistError};
use crate::models::assessment::{AnalysisProgress, AssessmentCache, PlanAssessment};
use crate::models::plan::PlanInput;

const STAGES: [&str; 7] = [
    "red_flags",
    "capacity",
    "deployment",
    "resources",
    "velocity",
    "risk_score",
    "audit",
];

pub fn load_plan_input(plan_path: &Path) -> Result<PlanInput> {
    if !plan_path.is_file() {
        return Err(StrategistError::NotFound(format!("plan file {}", plan_path.display())));
    }
    let raw = fs::read_to_string(plan_path)?;
    let mut input: PlanInput = serde_json::from_str(&raw)?;

    if input.plan.filename.is_empty() {
        input.plan.filename = plan_path
            .file_name()
            .map(|n| n.to_string_lossy().to_string())
            .unwrap_or_default();
    }
    Ok(input)
}

pub fn run_assessment(input: &PlanInput, settings: &AnalysisSettings) -> Result<PlanAssessment> {
    run_assessment_with_progress(input, settings, |_| {})
}

/// Runs every analyzer over `input`, reporting each stage before it starts.
pub fn run_assessment_with_progress<F>(
    input: &PlanInput,
    settings: &AnalysisSettings,
    mut emit_progress: F,
) -> Result<PlanAssessment>
where
    F: FnMut(AnalysisProgress),
{
    let start = Instant::now();
    let scorer = RiskScorer::new(settings.weights)?;
    let plan = &settings.capacity.resolve_plan(&input.plan)?;
    let document = input.document.as_ref();
    let mut stage = stage_reporter(&mut emit_progress);

    stage(0);
    let risk_analyzer = RiskAnalyzer::new();
    let red_flags = document
        .map(|doc| risk_analyzer.analyze(doc))
        .unwrap_or_default();
    let red_flag_summary = risk_analyzer.summary(&red_flags);

    stage(1);
    let capacity_analyzer = CapacityAnalyzer::new(settings.capacity);
    let capacity = capacity_analyzer.analyze(plan, Some(red_flags.as_slice()));
    let capacity_summary = capacity_analyzer.summary(&capacity);

    stage(2);
    let deployment_analyzer = DeploymentAnalyzer::new(settings.deployment);
    let deployment_clusters = deployment_analyzer.analyze(plan, document);
    let deployment_summary = deployment_analyzer.summary(&deployment_clusters, plan.task_count());
    let deployment_timeline = deployment_analyzer.timeline(&deployment_clusters);

    stage(3);
    let resources = ResourceAnalyzer::new(settings.resources).analyze(&input.resources, &plan.sprints);

    stage(4);
    let velocity = VelocityAnalyzer::new(settings.velocity).analyze(&plan.sprints);

    stage(5);
    let risk = scorer.score(&ScoreInputs {
        red_flags: &red_flags,
        capacity: &capacity,
        resources: Some(&resources),
        velocity_variance: velocity.velocity_variance,
        dependency_count: plan.dependency_count(),
        total_tasks: plan.task_count(),
    });

    stage(6);
    let mut warnings = audit_plan(plan, &input.resources, settings.resources.attribution());
    for warning in &warnings {
        if settings.strict_mode {
            log::warn!("{}: {warning}", plan.filename);
        } else {
            log::debug!("{}: {warning}", plan.filename);
        }
    }
    if !settings.strict_mode {
        warnings.clear();
    }

    let assessment = PlanAssessment {
        plan_name: plan.filename.clone(),
        source_path: None,
        red_flags,
        red_flag_summary,
        capacity,
        capacity_summary,
        deployment_clusters,
        deployment_summary,
        deployment_timeline,
        resources,
        velocity,
        risk,
        warnings,
        duration_ms: start.elapsed().as_millis() as u64,
    };

    log::info!(
        "Assessed '{}': score {:.1} ({})",
        assessment.plan_name,
        assessment.risk.overall_score,
        assessment.risk.risk_level.as_str()
    );
    Ok(assessment)
}

/// Loads and assesses a plan file without persisting anything.
pub fn assess_plan_file(plan_path: &Path, settings: &AnalysisSettings) -> Result<PlanAssessment> {
    let input = load_plan_input(plan_path)?;
    let mut assessment = run_assessment(&input, settings)?;
    assessment.source_path = Some(plan_path.to_string_lossy().to_string());
    Ok(assessment)
}

/// Workspace flow: settings, plan file, analysis, history and cache.
pub fn run_full_assessment_internal<F>(
    workspace_path: &str,
    plan_path: &Path,
    cache: &Arc<Mutex<AssessmentCache>>,
    emit_progress: F,
) -> Result<PlanAssessment>
where
    F: FnMut(AnalysisProgress),
{
    let settings = crate::commands::settings::load_effective_analysis_settings(workspace_path)?;
    let input = load_plan_input(plan_path)?;

    let mut assessment = run_assessment_with_progress(&input, &settings, emit_progress)?;
    assessment.source_path = Some(plan_path.to_string_lossy().to_string());

    persist_assessment(workspace_path, &assessment, settings.snapshot_retention)?;
    update_cache(cache, workspace_path, assessment.clone());

    Ok(assessment)
}

fn persist_assessment(workspace_path: &str, assessment: &PlanAssessment, retention: usize) -> Result<()> {
    let conn = crate::commands::db::get_db_connection(workspace_path)?;
    let record = crate::commands::db::insert_assessment(&conn, assessment)?;
    crate::commands::db::prune_assessments(&conn, retention)?;
    log::info!("Stored assessment {} for '{}'", record.id, record.plan_name);
    Ok(())
}

fn update_cache(cache: &Arc<Mutex<AssessmentCache>>, workspace_path: &str, assessment: PlanAssessment) {
    if let Ok(mut lock) = cache.lock() {
        lock.workspace_path = Some(workspace_path.to_string());
        lock.latest = Some(assessment);
    }
}

fn stage_reporter<'a, F>(emit_progress: &'a mut F) -> impl FnMut(usize) + 'a
where
    F: FnMut(AnalysisProgress),
{
    move |index| {
        emit_progress(AnalysisProgress {
            stage: STAGES[index].to_string(),
            current: index + 1,
            total: STAGES.len(),
        });
    }
}
