use pi_strategist_lib::analysis::capacity::CapacityAnalyzer;
use pi_strategist_lib::analysis::deployment::DeploymentAnalyzer;
use pi_strategist_lib::analysis::resources::ResourceAnalyzer;
use pi_strategist_lib::analysis::velocity::VelocityAnalyzer;
use pi_strategist_lib::commands::assessment::run_assessment;
use pi_strategist_lib::commands::settings::AnalysisSettings;
use pi_strategist_lib::models::capacity::RecommendationKind;
use pi_strategist_lib::models::document::AcceptanceCriterion;
use pi_strategist_lib::models::plan::{CapacityPlan, PlanInput, Resource, Sprint, SprintStatus, Task};
use pi_strategist_lib::models::red_flag::{RedFlag, Severity};
use pi_strategist_lib::models::velocity::VelocityTrend;
use proptest::prelude::*;
use std::collections::HashSet;

const NAMES: [&str; 6] = [
    "Login form",
    "Billing page",
    "Admin panel",
    "Search box",
    "Misc chore",
    "Profile view",
];

/// (hours, high risk, name index, depends on previous task)
type TaskSeed = (f64, bool, usize, bool);

fn plan_strategy() -> impl Strategy<Value = CapacityPlan> {
    let task = (0.0..60.0f64, any::<bool>(), 0..NAMES.len(), any::<bool>());
    prop::collection::vec(
        (0.0..200.0f64, 0.0..0.9f64, prop::collection::vec(task, 0..6)),
        0..5,
    )
    .prop_map(build_plan)
}

fn build_plan(seeds: Vec<(f64, f64, Vec<TaskSeed>)>) -> CapacityPlan {
    let sprints = seeds
        .into_iter()
        .enumerate()
        .map(|(s, (total_hours, buffer, tasks))| {
            let name = format!("Sprint {}", s + 1);
            let tasks = tasks
                .into_iter()
                .enumerate()
                .map(|(i, (hours, risky, name_index, depends))| {
                    let mut task = Task::new(&format!("T{s}-{i}"), NAMES[name_index], hours, &name);
                    if risky {
                        task.story_id = Some("S1".to_string());
                    }
                    if depends && i > 0 {
                        task.dependencies = vec![format!("T{s}-{}", i - 1)];
                    }
                    task
                })
                .collect();
            Sprint::new(&name, total_hours)
                .with_buffer(buffer)
                .with_tasks(tasks)
        })
        .collect();
    CapacityPlan::new("generated", sprints)
}

fn story_flag() -> RedFlag {
    let mut criterion = AcceptanceCriterion::new("AC1", "must be fast");
    criterion.story_id = Some("S1".to_string());
    RedFlag {
        criterion,
        flagged_term: "fast".to_string(),
        category: "Subjective Term".to_string(),
        severity: Severity::Critical,
        suggested_metric: String::new(),
        negotiation_script: String::new(),
    }
}

proptest! {
    #[test]
    fn status_matches_overflow_sign(plan in plan_strategy()) {
        let analyses = CapacityAnalyzer::default().analyze(&plan, None);
        prop_assert_eq!(analyses.len(), plan.sprints.len());
        for analysis in &analyses {
            prop_assert_eq!(analysis.status == SprintStatus::Fail, analysis.overflow_hours > 0.0);
            prop_assert_eq!(analysis.overflow_hours, analysis.sprint_load - analysis.net_capacity);
        }
    }

    #[test]
    fn moves_stop_at_overflow_and_skip_high_risk_tasks(plan in plan_strategy()) {
        let flags = vec![story_flag()];
        let analyses = CapacityAnalyzer::default().analyze(&plan, Some(flags.as_slice()));

        for analysis in &analyses {
            let moves: Vec<_> = analysis
                .recommendations
                .iter()
                .filter(|r| r.kind == RecommendationKind::Move)
                .collect();
            if analysis.status == SprintStatus::Pass {
                prop_assert!(moves.is_empty());
            }
            // Every move but the last is made while overflow remains.
            if let Some((last, earlier)) = moves.split_last() {
                let before_last: f64 = earlier.iter().map(|r| r.hours).sum();
                prop_assert!(before_last < analysis.overflow_hours + 1e-6);
                prop_assert!(last.hours > 0.0);
            }
            for rec in moves {
                prop_assert!(rec.task.story_id.is_none());
                prop_assert_eq!(&rec.from_sprint, &analysis.sprint_name);
            }
        }
    }

    #[test]
    fn clusters_hold_two_or_more_independent_tasks(plan in plan_strategy()) {
        let clusters = DeploymentAnalyzer::default().analyze(&plan, None);
        let mut seen = HashSet::new();

        for cluster in &clusters {
            prop_assert!(cluster.tasks.len() >= 2);
            let ids: HashSet<&str> = cluster.tasks.iter().map(|t| t.id.as_str()).collect();
            for task in &cluster.tasks {
                prop_assert!(task.dependencies.iter().all(|d| !ids.contains(d.as_str())));
                prop_assert!(seen.insert(task.id.clone()), "task in two clusters");
            }
        }
    }

    #[test]
    fn over_and_under_allocation_follow_thresholds(
        plan in plan_strategy(),
        hours_per_sprint in 0.0..80.0f64,
    ) {
        let mut plan = plan;
        for task in plan.sprints.iter_mut().flat_map(|s| s.tasks.iter_mut()) {
            task.tags = vec!["alice".to_string()];
        }
        let alice = Resource::new("alice", hours_per_sprint);
        let analysis = ResourceAnalyzer::default().analyze(&[alice], &plan.sprints);

        if plan.sprints.is_empty() {
            prop_assert_eq!(analysis.total_resources, 0);
            return Ok(());
        }

        let expect_over = hours_per_sprint > 0.0
            && plan.sprints.iter().any(|s| s.sprint_load() / hours_per_sprint > 1.0);
        let total_load = plan.sprints.iter().fold(0.0, |acc, s| acc + s.sprint_load());
        let total_available = plan.sprints.iter().fold(0.0, |acc, _| acc + hours_per_sprint);
        let expect_under = total_available > 0.0 && total_load / total_available < 0.5;

        prop_assert_eq!(analysis.over_allocated.contains(&"alice".to_string()), expect_over);
        prop_assert_eq!(analysis.under_allocated.contains(&"alice".to_string()), expect_under);
    }

    #[test]
    fn single_sprint_velocity_is_flat(total_hours in 1.0..200.0f64, hours in prop::collection::vec(0.0..40.0f64, 0..6)) {
        let tasks = hours
            .iter()
            .enumerate()
            .map(|(i, h)| Task::new(&format!("T{i}"), "Work", *h, "Sprint 1"))
            .collect();
        let sprint = Sprint::new("Sprint 1", total_hours).with_tasks(tasks);
        let load = sprint.sprint_load();

        let velocity = VelocityAnalyzer::default().analyze(&[sprint]);
        prop_assert_eq!(velocity.sprint_count, 1);
        prop_assert_eq!(velocity.velocity_variance, 0.0);
        prop_assert_eq!(velocity.trend, VelocityTrend::Stable);
        prop_assert_eq!(velocity.confidence_intervals.p50, load);
        prop_assert_eq!(velocity.confidence_intervals.p95, load);
    }

    #[test]
    fn overall_score_is_bounded_and_repeatable(plan in plan_strategy()) {
        let input = PlanInput {
            plan,
            ..PlanInput::default()
        };
        let settings = AnalysisSettings::default();
        let first = run_assessment(&input, &settings).expect("first run");
        let second = run_assessment(&input, &settings).expect("second run");

        prop_assert!((0.0..=100.0).contains(&first.risk.overall_score));
        prop_assert_eq!(first.risk, second.risk);
        prop_assert_eq!(first.capacity, second.capacity);
    }
}
