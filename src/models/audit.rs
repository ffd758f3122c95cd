use serde::{Deserialize, Serialize};
use std::fmt;

/// Input data problem that the analyzers otherwise skip over silently.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum DataWarning {
    DanglingDependency {
        task_id: String,
        dependency_id: String,
    },
    UnattributedTask {
        task_id: String,
    },
    UnknownAssignee {
        task_id: String,
        assignee: String,
    },
    AmbiguousDomain {
        task_id: String,
        domains: Vec<String>,
    },
}

impl fmt::Display for DataWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DataWarning::DanglingDependency {
                task_id,
                dependency_id,
            } => write!(f, "task {task_id} depends on unknown task {dependency_id}"),
            DataWarning::UnattributedTask { task_id } => {
                write!(f, "task {task_id} is not attributed to any resource")
            }
            DataWarning::UnknownAssignee { task_id, assignee } => {
                write!(f, "task {task_id} is assigned to unknown resource {assignee}")
            }
            DataWarning::AmbiguousDomain { task_id, domains } => write!(
                f,
                "task {task_id} matches several deployment domains: {}",
                domains.join(", ")
            ),
        }
    }
}
