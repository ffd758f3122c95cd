use std::collections::HashSet;

use crate::analysis::deployment::matching_domains;
use crate::models::audit::DataWarning;
use crate::models::plan::{CapacityPlan, Resource};
use crate::models::resource::AttributionStrategy;

/// Lists the soft data problems in a plan, in task order.
pub fn audit_plan(
    plan: &CapacityPlan,
    resources: &[Resource],
    attribution: AttributionStrategy,
) -> Vec<DataWarning> {
    let task_ids: HashSet<&str> = plan.all_tasks().map(|t| t.id.as_str()).collect();
    let resource_names: HashSet<&str> = resources.iter().map(|r| r.name.as_str()).collect();
    let mut warnings = Vec::new();

    for task in plan.all_tasks() {
        for dependency in &task.dependencies {
            if !task_ids.contains(dependency.as_str()) {
                warnings.push(DataWarning::DanglingDependency {
                    task_id: task.id.clone(),
                    dependency_id: dependency.clone(),
                });
            }
        }

        if !resources.is_empty() {
            if !resources.iter().any(|r| attribution.attributes(task, r)) {
                warnings.push(DataWarning::UnattributedTask {
                    task_id: task.id.clone(),
                });
            }
            if let Some(assignee) = task.assignee.as_deref() {
                if !resource_names.contains(assignee) {
                    warnings.push(DataWarning::UnknownAssignee {
                        task_id: task.id.clone(),
                        assignee: assignee.to_string(),
                    });
                }
            }
        }

        let domains = matching_domains(task);
        if domains.len() > 1 {
            warnings.push(DataWarning::AmbiguousDomain {
                task_id: task.id.clone(),
                domains: domains.iter().map(|d| d.to_string()).collect(),
            });
        }
    }

    warnings
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::plan::{Sprint, Task};

    fn plan(tasks: Vec<Task>) -> CapacityPlan {
        CapacityPlan::new("p", vec![Sprint::new("Sprint 1", 100.0).with_tasks(tasks)])
    }

    #[test]
    fn reports_dangling_dependencies() {
        let mut task = Task::new("T1", "Copy", 4.0, "Sprint 1");
        task.dependencies = vec!["T9".to_string()];

        let warnings = audit_plan(&plan(vec![task]), &[], AttributionStrategy::Tags);
        assert_eq!(
            warnings,
            vec![DataWarning::DanglingDependency {
                task_id: "T1".to_string(),
                dependency_id: "T9".to_string(),
            }]
        );
    }

    #[test]
    fn attribution_checks_only_apply_with_a_roster() {
        let mut task = Task::new("T1", "Copy", 4.0, "Sprint 1");
        task.assignee = Some("carol".to_string());
        let p = plan(vec![task]);

        assert!(audit_plan(&p, &[], AttributionStrategy::Assignee).is_empty());

        let warnings = audit_plan(&p, &[Resource::new("alice", 40.0)], AttributionStrategy::Assignee);
        assert_eq!(warnings.len(), 2);
        assert!(matches!(warnings[0], DataWarning::UnattributedTask { .. }));
        assert!(warnings[1].to_string().contains("carol"));
    }

    #[test]
    fn reports_ambiguous_domains() {
        let warnings = audit_plan(
            &plan(vec![Task::new("T1", "User login", 4.0, "Sprint 1")]),
            &[],
            AttributionStrategy::Tags,
        );
        assert_eq!(
            warnings,
            vec![DataWarning::AmbiguousDomain {
                task_id: "T1".to_string(),
                domains: vec!["auth".to_string(), "user".to_string()],
            }]
        );
    }
}
