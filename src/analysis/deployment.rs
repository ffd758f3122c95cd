use std::collections::{BTreeMap, BTreeSet, HashSet};

use crate::error::ConfigError;
use crate::models::deployment::{
    DeploymentCluster, DeploymentStrategy, DeploymentSummary, TimelineEntry, TimelineTask,
};
use crate::models::document::DedDocument;
use crate::models::plan::{CapacityPlan, Task};

pub const DEFAULT_CD_TARGET: f64 = 0.30;
const MIN_CLUSTER_SIZE: usize = 2;
const GENERAL_DOMAIN: &str = "general";

/// Domain keyword sets in precedence order. The first domain with a keyword
/// contained in the task text wins.
pub const DOMAIN_KEYWORDS: &[(&str, &[&str])] = &[
    ("auth", &["auth", "login", "logout", "password", "session", "token", "oauth", "sso"]),
    ("user", &["user", "profile", "account", "settings", "preferences"]),
    ("payment", &["payment", "billing", "invoice", "subscription", "checkout", "cart"]),
    ("notification", &["notification", "email", "sms", "push", "alert", "message"]),
    ("analytics", &["analytics", "metrics", "dashboard", "report", "chart", "stats"]),
    ("admin", &["admin", "management", "configuration", "system"]),
    ("api", &["api", "endpoint", "rest", "graphql", "webhook"]),
    ("ui", &["ui", "component", "widget", "modal", "form", "button"]),
    ("data", &["database", "migration", "schema", "model", "entity"]),
    ("search", &["search", "filter", "query", "index"]),
];

/// Domains that ship without a feature flag.
const FULL_DEPLOYMENT_DOMAINS: &[&str] = &["auth", "payment", "data", "api", "admin"];

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DeploymentConfig {
    cd_target: f64,
}

impl DeploymentConfig {
    pub fn new(cd_target: f64) -> Result<Self, ConfigError> {
        if !cd_target.is_finite() || !(0.0..=1.0).contains(&cd_target) {
            return Err(ConfigError::CdTargetOutOfRange(cd_target));
        }
        Ok(Self { cd_target })
    }

    pub fn cd_target(&self) -> f64 {
        self.cd_target
    }
}

impl Default for DeploymentConfig {
    fn default() -> Self {
        Self {
            cd_target: DEFAULT_CD_TARGET,
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct DeploymentAnalyzer {
    config: DeploymentConfig,
}

impl DeploymentAnalyzer {
    pub fn new(config: DeploymentConfig) -> Self {
        Self { config }
    }

    /// Groups dependency-free tasks into rollout clusters, largest first.
    pub fn analyze(&self, plan: &CapacityPlan, document: Option<&DedDocument>) -> Vec<DeploymentCluster> {
        let graph = dependency_graph(plan);

        let mut groups: Vec<(String, Vec<&Task>)> = Vec::new();
        for task in plan.all_tasks() {
            let independent = graph.get(&task.id).map_or(true, BTreeSet::is_empty);
            if !independent {
                continue;
            }

            let domain = classify(task);
            match groups.iter_mut().find(|(d, _)| *d == domain) {
                Some((_, tasks)) => tasks.push(task),
                None => groups.push((domain, vec![task])),
            }
        }

        groups.retain(|(_, tasks)| tasks.len() >= MIN_CLUSTER_SIZE);
        // Stable: ties keep first-seen domain order.
        groups.sort_by(|a, b| b.1.len().cmp(&a.1.len()));

        let clusters: Vec<DeploymentCluster> = groups
            .into_iter()
            .enumerate()
            .map(|(index, (domain, tasks))| build_cluster(index, domain, tasks, document))
            .collect();

        log::debug!(
            "Deployment analysis of '{}': {} clusters",
            plan.filename,
            clusters.len()
        );
        clusters
    }

    pub fn summary(&self, clusters: &[DeploymentCluster], total_tasks: usize) -> DeploymentSummary {
        let eligible_tasks: usize = clusters.iter().map(|c| c.tasks.len()).sum();
        let cd_percentage = if total_tasks == 0 {
            0.0
        } else {
            eligible_tasks as f64 / total_tasks as f64 * 100.0
        };
        let target_percentage = self.config.cd_target * 100.0;
        let target_met = cd_percentage >= target_percentage;

        let mut strategies = BTreeMap::new();
        for cluster in clusters {
            *strategies
                .entry(cluster.strategy.as_str().to_string())
                .or_insert(0) += 1;
        }

        DeploymentSummary {
            total_clusters: clusters.len(),
            eligible_tasks,
            total_tasks,
            cd_percentage,
            target_percentage,
            target_met,
            status: if target_met { "ON TRACK" } else { "BELOW TARGET" }.to_string(),
            strategies,
        }
    }

    pub fn timeline(&self, clusters: &[DeploymentCluster]) -> Vec<TimelineEntry> {
        clusters
            .iter()
            .map(|cluster| TimelineEntry {
                timing: cluster.deploy_timing.clone(),
                cluster: cluster.name.clone(),
                task_count: cluster.tasks.len(),
                strategy: cluster.strategy,
                tasks: cluster
                    .tasks
                    .iter()
                    .map(|t| TimelineTask {
                        id: t.id.clone(),
                        name: t.name.clone(),
                    })
                    .collect(),
            })
            .collect()
    }
}

/// Every keyword domain the task text hits, in precedence order.
pub fn matching_domains(task: &Task) -> Vec<&'static str> {
    let text = task_text(task);
    DOMAIN_KEYWORDS
        .iter()
        .filter(|(_, keywords)| keywords.iter().any(|k| text.contains(k)))
        .map(|(domain, _)| *domain)
        .collect()
}

/// task id → ids it depends on
pub fn dependency_graph(plan: &CapacityPlan) -> BTreeMap<String, BTreeSet<String>> {
    plan.all_tasks()
        .map(|t| (t.id.clone(), t.dependencies.iter().cloned().collect()))
        .collect()
}

fn task_text(task: &Task) -> String {
    format!("{} {}", task.name, task.tags.join(" ")).to_lowercase()
}

fn classify(task: &Task) -> String {
    let text = task_text(task);
    let keyword_domain = DOMAIN_KEYWORDS
        .iter()
        .find(|(_, keywords)| keywords.iter().any(|k| text.contains(k)))
        .map(|(domain, _)| domain.to_string());

    keyword_domain
        .or_else(|| task.story_id.as_ref().map(|id| format!("story_{id}")))
        .unwrap_or_else(|| GENERAL_DOMAIN.to_string())
}

fn build_cluster(
    index: usize,
    domain: String,
    tasks: Vec<&Task>,
    document: Option<&DedDocument>,
) -> DeploymentCluster {
    let strategy = if FULL_DEPLOYMENT_DOMAINS.contains(&domain.as_str()) {
        DeploymentStrategy::FullDeployment
    } else {
        DeploymentStrategy::FeatureFlag
    };

    let ids: HashSet<&str> = tasks.iter().map(|t| t.id.as_str()).collect();
    let external: BTreeSet<String> = tasks
        .iter()
        .flat_map(|t| t.dependencies.iter())
        .filter(|dep| !ids.contains(dep.as_str()))
        .cloned()
        .collect();

    DeploymentCluster {
        name: cluster_name(&domain, document),
        domain,
        tasks: tasks.into_iter().cloned().collect(),
        strategy,
        deploy_timing: format!("Week {}", index + 1),
        dependencies: external.into_iter().collect(),
        rollback_plan: strategy.rollback_plan().to_string(),
    }
}

fn cluster_name(domain: &str, document: Option<&DedDocument>) -> String {
    let fixed = match domain {
        "auth" => Some("Authentication & Security"),
        "user" => Some("User Profile & Settings"),
        "payment" => Some("Payment & Billing"),
        "notification" => Some("Notifications & Messaging"),
        "analytics" => Some("Analytics & Reporting"),
        "admin" => Some("Administration & Config"),
        "api" => Some("API Endpoints"),
        "ui" => Some("UI Components"),
        "data" => Some("Data & Migrations"),
        "search" => Some("Search & Filtering"),
        GENERAL_DOMAIN => Some("General Features"),
        _ => None,
    };
    if let Some(name) = fixed {
        return name.to_string();
    }

    match domain.strip_prefix("story_") {
        Some(story_id) => document
            .and_then(|doc| doc.find_story(story_id))
            .map(|story| story.name.clone())
            .unwrap_or_else(|| format!("Story {story_id}")),
        None => domain.to_string(),
    }
}
