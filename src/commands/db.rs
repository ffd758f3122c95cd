use rusqlite::{params, Connection, OptionalExtension, Row};

use crate::error::{Result, StrategistError};
use crate::models::assessment::PlanAssessment;
use crate::models::history::{AssessmentRecord, StoredAssessment};
use crate::models::plan::SprintStatus;
use crate::models::risk_score::RiskLevel;

const DB_SCHEMA_VERSION: i64 = 2;

const RECORD_COLUMNS: &str = "id, created_at, plan_name, source_path, overall_score, risk_level, failing_sprints, red_flag_count";

pub fn initialize_schema(conn: &Connection) -> rusqlite::Result<()> {
    conn.execute_batch(
        "PRAGMA foreign_keys = ON;
         PRAGMA journal_mode = WAL;
         PRAGMA synchronous = NORMAL;",
    )?;

    let mut version: i64 = conn.pragma_query_value(None, "user_version", |row| row.get(0))?;

    if version < 1 {
        apply_migration_1(conn)?;
        version = 1;
        conn.pragma_update(None, "user_version", version)?;
    }

    if version < 2 {
        apply_migration_2(conn)?;
        version = 2;
        conn.pragma_update(None, "user_version", version)?;
    }

    if version > DB_SCHEMA_VERSION {
        log::debug!("Database schema version {version} is newer than {DB_SCHEMA_VERSION}");
    }

    Ok(())
}

fn apply_migration_1(conn: &Connection) -> rusqlite::Result<()> {
    conn.execute_batch(
        "
        CREATE TABLE IF NOT EXISTS assessments (
            id TEXT PRIMARY KEY,
            created_at INTEGER NOT NULL,
            plan_name TEXT NOT NULL,
            overall_score REAL NOT NULL DEFAULT 0,
            risk_level TEXT NOT NULL CHECK(risk_level IN ('LOW', 'MEDIUM', 'HIGH', 'CRITICAL')),
            failing_sprints INTEGER NOT NULL DEFAULT 0,
            red_flag_count INTEGER NOT NULL DEFAULT 0,
            results_json TEXT NOT NULL DEFAULT '{}'
        );
        ",
    )
}

fn apply_migration_2(conn: &Connection) -> rusqlite::Result<()> {
    add_column_if_missing(conn, "assessments", "source_path TEXT")?;
    conn.execute_batch(
        "CREATE INDEX IF NOT EXISTS idx_assessments_created_at ON assessments(created_at);",
    )
}

fn add_column_if_missing(conn: &Connection, table: &str, column_def: &str) -> rusqlite::Result<()> {
    let column_name = column_def
        .split_whitespace()
        .next()
        .unwrap_or(column_def)
        .to_string();

    let mut stmt = conn.prepare(&format!("PRAGMA table_info({table})"))?;
    let exists = stmt
        .query_map([], |row| row.get::<_, String>(1))?
        .filter_map(|res| res.ok())
        .any(|name| name == column_name);

    if !exists {
        conn.execute(&format!("ALTER TABLE {table} ADD COLUMN {column_def}"), [])?;
    }

    Ok(())
}

pub fn get_db_connection(workspace_path: &str) -> Result<Connection> {
    let dir = crate::commands::workspace::ensure_data_dir(workspace_path)?;
    let conn = Connection::open(dir.join("state.db"))?;
    initialize_schema(&conn)?;
    Ok(conn)
}

/// Persists an assessment and returns its summary row.
pub fn insert_assessment(conn: &Connection, assessment: &PlanAssessment) -> Result<AssessmentRecord> {
    let record = AssessmentRecord {
        id: uuid::Uuid::new_v4().to_string(),
        created_at: chrono::Utc::now().timestamp(),
        plan_name: assessment.plan_name.clone(),
        source_path: assessment.source_path.clone(),
        overall_score: assessment.risk.overall_score,
        risk_level: assessment.risk.risk_level,
        failing_sprints: assessment
            .capacity
            .iter()
            .filter(|a| a.status == SprintStatus::Fail)
            .count(),
        red_flag_count: assessment.red_flags.len(),
    };
    let results_json = serde_json::to_string(assessment)?;

    conn.execute(
        "INSERT INTO assessments (id, created_at, plan_name, source_path, overall_score, risk_level, failing_sprints, red_flag_count, results_json)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)",
        params![
            record.id,
            record.created_at,
            record.plan_name,
            record.source_path,
            record.overall_score,
            record.risk_level.as_str(),
            record.failing_sprints as i64,
            record.red_flag_count as i64,
            results_json,
        ],
    )?;

    Ok(record)
}

pub fn load_assessment(conn: &Connection, id: &str) -> Result<StoredAssessment> {
    let row = conn
        .query_row(
            &format!("SELECT {RECORD_COLUMNS}, results_json FROM assessments WHERE id = ?1"),
            params![id],
            |row| Ok((record_from_row(row)?, row.get::<_, String>(8)?)),
        )
        .optional()?;

    let (record, results_json) =
        row.ok_or_else(|| StrategistError::NotFound(format!("assessment {id}")))?;
    let assessment = serde_json::from_str::<PlanAssessment>(&results_json)?;
    Ok(StoredAssessment { record, assessment })
}

/// Summary rows, newest first.
pub fn list_assessments(conn: &Connection, limit: Option<usize>) -> Result<Vec<AssessmentRecord>> {
    let limit = limit.map_or(-1, |l| l as i64);
    let mut stmt = conn.prepare(&format!(
        "SELECT {RECORD_COLUMNS} FROM assessments ORDER BY created_at DESC, rowid DESC LIMIT ?1"
    ))?;

    let records = stmt
        .query_map(params![limit], record_from_row)?
        .collect::<rusqlite::Result<Vec<_>>>()?;
    Ok(records)
}

pub fn delete_assessment(conn: &Connection, id: &str) -> Result<()> {
    let deleted = conn.execute("DELETE FROM assessments WHERE id = ?1", params![id])?;
    if deleted == 0 {
        return Err(StrategistError::NotFound(format!("assessment {id}")));
    }
    Ok(())
}

/// Keeps the newest `retention` assessments. Returns how many were removed.
pub fn prune_assessments(conn: &Connection, retention: usize) -> Result<usize> {
    let removed = conn.execute(
        "DELETE FROM assessments WHERE id NOT IN (
            SELECT id FROM assessments ORDER BY created_at DESC, rowid DESC LIMIT ?1
        )",
        params![retention as i64],
    )?;
    if removed > 0 {
        log::debug!("Pruned {removed} assessments beyond retention {retention}");
    }
    Ok(removed)
}

pub fn count_assessments(conn: &Connection) -> Result<usize> {
    let count: i64 = conn.query_row("SELECT COUNT(*) FROM assessments", [], |row| row.get(0))?;
    Ok(count as usize)
}

pub fn last_assessment_time(conn: &Connection) -> Result<Option<i64>> {
    let latest = conn.query_row("SELECT MAX(created_at) FROM assessments", [], |row| row.get(0))?;
    Ok(latest)
}

fn record_from_row(row: &Row<'_>) -> rusqlite::Result<AssessmentRecord> {
    let level: String = row.get(5)?;
    Ok(AssessmentRecord {
        id: row.get(0)?,
        created_at: row.get(1)?,
        plan_name: row.get(2)?,
        source_path: row.get(3)?,
        overall_score: row.get(4)?,
        risk_level: RiskLevel::parse(&level).unwrap_or_default(),
        failing_sprints: row.get::<_, i64>(6)? as usize,
        red_flag_count: row.get::<_, i64>(7)? as usize,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::risk_score::RiskScoreResult;

    fn memory_db() -> Connection {
        let conn = Connection::open_in_memory().expect("in-memory db");
        initialize_schema(&conn).expect("schema init");
        conn
    }

    fn assessment(name: &str, score: f64) -> PlanAssessment {
        PlanAssessment {
            plan_name: name.to_string(),
            risk: RiskScoreResult {
                overall_score: score,
                risk_level: RiskLevel::from_score(score),
                ..RiskScoreResult::default()
            },
            ..PlanAssessment::default()
        }
    }

    #[test]
    fn schema_initializes_with_expected_version() {
        let conn = memory_db();
        let version: i64 = conn
            .pragma_query_value(None, "user_version", |row| row.get(0))
            .expect("schema version");
        assert_eq!(version, DB_SCHEMA_VERSION);
    }

    #[test]
    fn assessment_round_trip_preserves_results() {
        let conn = memory_db();
        let original = assessment("PI 24.3", 42.5);

        let record = insert_assessment(&conn, &original).expect("insert");
        let stored = load_assessment(&conn, &record.id).expect("load");

        assert_eq!(stored.record, record);
        assert_eq!(stored.record.risk_level, RiskLevel::Medium);
        assert_eq!(stored.assessment, original);
    }

    #[test]
    fn list_is_newest_first_and_prune_keeps_latest() {
        let conn = memory_db();
        for (i, name) in ["a", "b", "c"].iter().enumerate() {
            insert_assessment(&conn, &assessment(name, i as f64)).expect("insert");
        }

        let names: Vec<String> = list_assessments(&conn, None)
            .expect("list")
            .into_iter()
            .map(|r| r.plan_name)
            .collect();
        assert_eq!(names, vec!["c", "b", "a"]);
        assert_eq!(list_assessments(&conn, Some(1)).expect("list").len(), 1);

        assert_eq!(prune_assessments(&conn, 2).expect("prune"), 1);
        let remaining: Vec<String> = list_assessments(&conn, None)
            .expect("list")
            .into_iter()
            .map(|r| r.plan_name)
            .collect();
        assert_eq!(remaining, vec!["c", "b"]);
    }

    #[test]
    fn missing_ids_are_not_found() {
        let conn = memory_db();
        assert!(matches!(load_assessment(&conn, "nope"), Err(StrategistError::NotFound(_))));
        assert!(matches!(delete_assessment(&conn, "nope"), Err(StrategistError::NotFound(_))));
        assert_eq!(last_assessment_time(&conn).expect("max"), None);
    }
}
