use std::fs;
use std::path::{Path, PathBuf};

use crate::error::{Result, StrategistError};
use crate::models::workspace::WorkspaceMeta;

const DATA_DIR: &str = ".pistrategist";

pub fn data_dir(workspace_path: &str) -> PathBuf {
    Path::new(workspace_path).join(DATA_DIR)
}

pub fn ensure_data_dir(workspace_path: &str) -> Result<PathBuf> {
    let dir = data_dir(workspace_path);
    fs::create_dir_all(&dir)?;
    Ok(dir)
}

/// Prepares the workspace data directory, database and settings file.
pub fn open_workspace(path: &str) -> Result<WorkspaceMeta> {
    let workspace_path = Path::new(path);
    if !workspace_path.is_dir() {
        return Err(StrategistError::NotFound(format!("workspace directory {path}")));
    }

    ensure_data_dir(path)?;
    let conn = crate::commands::db::get_db_connection(path)?;
    crate::commands::settings::load_settings_from_disk(path)?;

    let name = workspace_path
        .canonicalize()
        .ok()
        .and_then(|p| p.file_name().map(|n| n.to_string_lossy().to_string()))
        .unwrap_or_else(|| "unknown".to_string());

    let meta = WorkspaceMeta {
        path: path.to_string(),
        name,
        assessment_count: crate::commands::db::count_assessments(&conn)?,
        last_assessment_at: crate::commands::db::last_assessment_time(&conn)?,
    };
    log::info!("Opened workspace {} ({} assessments)", meta.path, meta.assessment_count);
    Ok(meta)
}
