use crate::commands::assessment::assess_plan_file;
use crate::commands::settings::AnalysisSettings;
use crate::error::Result;
use crate::models::assessment::PlanComparison;

/// Assesses every plan file matching `pattern`, riskiest first.
/// Files that fail to load or parse are skipped.
pub fn compare_plans(pattern: &str, settings: &AnalysisSettings) -> Result<Vec<PlanComparison>> {
    let mut rows = Vec::new();

    for entry in glob::glob(pattern)? {
        let path = match entry {
            Ok(path) => path,
            Err(e) => {
                log::warn!("Skipping unreadable path: {e}");
                continue;
            }
        };
        if !path.is_file() {
            continue;
        }

        match assess_plan_file(&path, settings) {
            Ok(assessment) => rows.push(PlanComparison {
                path: path.to_string_lossy().to_string(),
                plan_name: assessment.plan_name,
                overall_score: assessment.risk.overall_score,
                risk_level: assessment.risk.risk_level,
                failing_sprints: assessment.capacity_summary.failing_sprints,
                red_flag_count: assessment.red_flags.len(),
                cd_percentage: assessment.deployment_summary.cd_percentage,
            }),
            Err(e) => log::warn!("Skipping {}: {e}", path.display()),
        }
    }

    rows.sort_by(|a, b| b.overall_score.total_cmp(&a.overall_score));
    log::info!("Compared {} plans matching {pattern}", rows.len());
    Ok(rows)
}
