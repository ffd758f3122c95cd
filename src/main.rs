use std::fmt::Write as _;
use std::fs;
use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::{Arc, Mutex};

use clap::{Parser, Subcommand, ValueEnum};
use serde::Serialize;

use pi_strategist_lib::analysis::red_flags::RiskAnalyzer;
use pi_strategist_lib::commands::assessment::{assess_plan_file, run_full_assessment_internal};
use pi_strategist_lib::commands::compare::compare_plans;
use pi_strategist_lib::commands::db;
use pi_strategist_lib::commands::settings::{
    get_settings, load_effective_analysis_settings, save_settings, AnalysisSettings,
};
use pi_strategist_lib::commands::workspace::open_workspace;
use pi_strategist_lib::models::assessment::{AssessmentCache, PlanAssessment, PlanComparison};
use pi_strategist_lib::models::history::AssessmentRecord;
use pi_strategist_lib::models::red_flag::QuickCheckReport;
use pi_strategist_lib::Result;

#[derive(Parser, Debug)]
#[command(author, version, about = "Risk analysis for Program Increment plans", long_about = None)]
struct Cli {
    /// Increase log verbosity (-v info, -vv debug)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    #[arg(long, value_enum, default_value_t = Format::Text, global = true)]
    format: Format,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Analyze a plan file
    Analyze {
        #[arg(help = "Path to the plan JSON file")]
        plan: PathBuf,
        /// Workspace whose settings and history to use
        #[arg(long)]
        workspace: Option<String>,
        /// Skip writing the result to the workspace history
        #[arg(long)]
        no_persist: bool,
    },
    /// Scan free text for ambiguous requirement terms
    Check {
        #[arg(help = "Text file to scan")]
        file: PathBuf,
    },
    /// List stored assessments
    History {
        #[arg(long)]
        workspace: String,
        #[arg(long)]
        limit: Option<usize>,
        /// Delete the assessment with this id
        #[arg(long)]
        delete: Option<String>,
    },
    /// Print a stored assessment
    Show {
        #[arg(long)]
        workspace: String,
        id: String,
    },
    /// Rank every plan matching a glob pattern by risk
    Compare {
        #[arg(help = "Glob pattern, e.g. 'plans/*.json'")]
        pattern: String,
        #[arg(long)]
        workspace: Option<String>,
    },
    /// Show or update workspace settings
    Settings {
        #[arg(long)]
        workspace: String,
        /// Partial settings JSON to merge
        #[arg(long)]
        set: Option<String>,
    },
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
enum Format {
    Text,
    Json,
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    match run(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            log::error!("{e}");
            eprintln!("error: {e}");
            ExitCode::FAILURE
        }
    }
}

fn init_logging(verbose: u8) {
    let default_level = match verbose {
        0 => "warn",
        1 => "info",
        _ => "debug",
    };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default_level)).init();
}

fn run(cli: Cli) -> Result<()> {
    let format = cli.format;

    match cli.command {
        Commands::Analyze {
            plan,
            workspace,
            no_persist,
        } => {
            let assessment = match workspace {
                Some(ws) if !no_persist => {
                    open_workspace(&ws)?;
                    let cache = Arc::new(Mutex::new(AssessmentCache::default()));
                    run_full_assessment_internal(&ws, &plan, &cache, |progress| {
                        log::debug!("[{}/{}] {}", progress.current, progress.total, progress.stage);
                    })?
                }
                ws => assess_plan_file(&plan, &settings_for(ws.as_deref())?)?,
            };
            emit(format, &assessment, render_assessment)
        }
        Commands::Check { file } => {
            let text = fs::read_to_string(&file)?;
            let report = RiskAnalyzer::new().quick_check(&text);
            emit(format, &report, render_quick_check)
        }
        Commands::History {
            workspace,
            limit,
            delete,
        } => {
            open_workspace(&workspace)?;
            let conn = db::get_db_connection(&workspace)?;
            if let Some(id) = delete {
                db::delete_assessment(&conn, &id)?;
                log::info!("Deleted assessment {id}");
            }
            let records = db::list_assessments(&conn, limit)?;
            emit(format, &records, |rows: &Vec<AssessmentRecord>| render_history(rows))
        }
        Commands::Show { workspace, id } => {
            let conn = db::get_db_connection(&workspace)?;
            let stored = db::load_assessment(&conn, &id)?;
            emit(format, &stored.assessment, render_assessment)
        }
        Commands::Compare { pattern, workspace } => {
            let rows = compare_plans(&pattern, &settings_for(workspace.as_deref())?)?;
            emit(format, &rows, |rows: &Vec<PlanComparison>| render_comparison(rows))
        }
        Commands::Settings { workspace, set } => {
            let settings = match set {
                Some(raw) => save_settings(&workspace, serde_json::from_str(&raw)?)?,
                None => get_settings(&workspace)?,
            };
            // Settings are a JSON document either way.
            println!("{}", serde_json::to_string_pretty(&settings)?);
            Ok(())
        }
    }
}

fn settings_for(workspace: Option<&str>) -> Result<AnalysisSettings> {
    match workspace {
        Some(ws) => load_effective_analysis_settings(ws),
        None => Ok(AnalysisSettings::default()),
    }
}

fn emit<T, F>(format: Format, value: &T, render: F) -> Result<()>
where
    T: Serialize,
    F: Fn(&T) -> String,
{
    match format {
        Format::Json => println!("{}", serde_json::to_string_pretty(value)?),
        Format::Text => print!("{}", render(value)),
    }
    Ok(())
}

fn render_assessment(a: &PlanAssessment) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "Plan: {}", a.plan_name);
    let _ = writeln!(
        out,
        "Risk: {:.1} ({})",
        a.risk.overall_score,
        a.risk.risk_level.as_str()
    );
    for factor in &a.risk.factor_breakdown {
        let _ = writeln!(
            out,
            "  {:<26} {:>5.1} x {:.2} = {:>5.1}  {}",
            factor.kind.as_str(),
            factor.raw_score,
            factor.weight,
            factor.weighted_score,
            factor.description
        );
    }

    let _ = writeln!(
        out,
        "\nCapacity: {}/{} sprints pass, {:.1}% utilized",
        a.capacity_summary.passing_sprints,
        a.capacity_summary.total_sprints,
        a.capacity_summary.overall_utilization
    );
    for sprint in &a.capacity {
        let _ = writeln!(
            out,
            "  {:<16} {:>7.1}h / {:>7.1}h  {}",
            sprint.sprint_name,
            sprint.sprint_load,
            sprint.net_capacity,
            sprint.status.as_str()
        );
        for rec in &sprint.recommendations {
            let _ = writeln!(
                out,
                "    -> {} {} to {}: {}",
                rec.task.id, rec.from_sprint, rec.to_sprint, rec.reason
            );
        }
    }

    let _ = writeln!(
        out,
        "\nRed flags: {} ({} critical, {} moderate, {} low)",
        a.red_flag_summary.total,
        a.red_flag_summary.critical,
        a.red_flag_summary.moderate,
        a.red_flag_summary.low
    );
    for flag in &a.red_flags {
        let _ = writeln!(
            out,
            "  [{}] '{}' in {}: {}",
            flag.severity.as_str(),
            flag.flagged_term,
            flag.criterion.id,
            flag.suggested_metric
        );
    }

    let _ = writeln!(
        out,
        "\nDeployment: {} clusters, {:.1}% CD eligible ({})",
        a.deployment_summary.total_clusters,
        a.deployment_summary.cd_percentage,
        a.deployment_summary.status
    );
    for cluster in &a.deployment_clusters {
        let _ = writeln!(
            out,
            "  {:<28} {:<14} {} tasks, {}",
            cluster.name,
            cluster.strategy.as_str(),
            cluster.tasks.len(),
            cluster.deploy_timing
        );
    }

    if !a.resources.resource_metrics.is_empty() {
        let _ = writeln!(out, "\nResources:");
        for metrics in &a.resources.resource_metrics {
            let _ = writeln!(
                out,
                "  {:<20} {:>6.1}% avg utilization",
                metrics.name, metrics.average_utilization
            );
        }
        for warning in &a.resources.bottleneck_warnings {
            let _ = writeln!(out, "  ! {}: {}", warning.resource_name, warning.reason);
        }
    }

    let ci = a.velocity.confidence_intervals;
    let _ = writeln!(
        out,
        "\nVelocity: mean {:.2}, p50 {:.1}h, p85 {:.1}h, p95 {:.1}h",
        a.velocity.mean_velocity, ci.p50, ci.p85, ci.p95
    );

    for warning in &a.warnings {
        let _ = writeln!(out, "warning: {warning}");
    }
    out
}

fn render_quick_check(report: &QuickCheckReport) -> String {
    let mut out = String::new();
    for line in &report.lines {
        let terms: Vec<&str> = line.flags.iter().map(|f| f.term.as_str()).collect();
        let _ = writeln!(out, "{:>4}: {} [{}]", line.line_number, line.line, terms.join(", "));
    }
    let _ = writeln!(
        out,
        "{} flags ({} critical, {} moderate, {} low)",
        report.total, report.critical, report.moderate, report.low
    );
    out
}

fn render_history(records: &[AssessmentRecord]) -> String {
    let mut out = String::new();
    for record in records {
        let when = chrono::DateTime::from_timestamp(record.created_at, 0)
            .map(|t| t.format("%Y-%m-%d %H:%M").to_string())
            .unwrap_or_default();
        let _ = writeln!(
            out,
            "{}  {}  {:<24} {:>5.1} {}",
            record.id,
            when,
            record.plan_name,
            record.overall_score,
            record.risk_level.as_str()
        );
    }
    out
}

fn render_comparison(rows: &[PlanComparison]) -> String {
    let mut out = String::new();
    for row in rows {
        let _ = writeln!(
            out,
            "{:>5.1} {:<8} {:<24} {} failing sprints, {} red flags, {:.1}% CD",
            row.overall_score,
            row.risk_level.as_str(),
            row.plan_name,
            row.failing_sprints,
            row.red_flag_count,
            row.cd_percentage
        );
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn cli_definition_is_consistent() {
        Cli::command().debug_assert();
    }

    #[test]
    fn verbose_flag_counts() {
        let cli = Cli::try_parse_from(["pi-strategist", "-vv", "check", "notes.txt"]).expect("parse");
        assert_eq!(cli.verbose, 2);
        assert_eq!(cli.format, Format::Text);
    }

    #[test]
    fn quick_check_render_lists_terms() {
        let report = RiskAnalyzer::new().quick_check("The page must be fast.\nNothing here.");
        let text = render_quick_check(&report);
        assert!(text.contains("1: The page must be fast. [fast]"));
        assert!(text.ends_with("1 flags (1 critical, 0 moderate, 0 low)\n"));
    }
}
