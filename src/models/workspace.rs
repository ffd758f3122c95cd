use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WorkspaceMeta {
    pub path: String,
    pub name: String,
    pub assessment_count: usize,
    pub last_assessment_at: Option<i64>,
}
