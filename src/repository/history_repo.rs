// ==========================================
// 线索工具 - 处理历史数据仓储
// ==========================================
// 对齐: processing_history 表
// 红线: 只追加，不修改历史记录
// ==========================================

use crate::domain::history::ProcessingRun;
use crate::domain::lead::ProcessingStats;
use crate::domain::types::RunStatus;
use crate::repository::error::{RepositoryError, RepositoryResult};
use chrono::NaiveDateTime;
use rusqlite::{params, Connection, Row};
use std::sync::{Arc, Mutex};

const TS_FORMAT: &str = "%Y-%m-%d %H:%M:%S%.3f";

// ==========================================
// HistoryRepository - 处理历史仓储
// ==========================================
pub struct HistoryRepository {
    conn: Arc<Mutex<Connection>>,
}

impl HistoryRepository {
    pub fn new(conn: Arc<Mutex<Connection>>) -> Self {
        Self { conn }
    }

    fn get_conn(&self) -> RepositoryResult<std::sync::MutexGuard<Connection>> {
        self.conn
            .lock()
            .map_err(|e| RepositoryError::LockError(e.to_string()))
    }

    /// 插入一次运行记录
    ///
    /// # 返回
    /// - `Ok(run_id)`
    pub fn insert(&self, run: &ProcessingRun) -> RepositoryResult<String> {
        let conn = self.get_conn()?;
        let input_files = serde_json::to_string(&run.input_files)?;

        conn.execute(
            r#"
            INSERT INTO processing_history (
                run_id, input_files, output_file,
                total_rows, valid_rows, duplicates_removed, invalid_phones, files_processed,
                duration_ms, status, processed_at
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11)
            "#,
            params![
                run.run_id,
                input_files,
                run.output_file,
                run.stats.total_rows as i64,
                run.stats.valid_rows as i64,
                run.stats.duplicates_removed as i64,
                run.stats.invalid_phones as i64,
                run.stats.files_processed as i64,
                run.duration_ms,
                run.status.to_string(),
                run.processed_at.format(TS_FORMAT).to_string(),
            ],
        )?;

        Ok(run.run_id.clone())
    }

    /// 最近的运行记录（新的在前）
    pub fn list_recent(&self, limit: usize) -> RepositoryResult<Vec<ProcessingRun>> {
        let conn = self.get_conn()?;
        let mut stmt = conn.prepare(
            r#"
            SELECT run_id, input_files, output_file,
                   total_rows, valid_rows, duplicates_removed, invalid_phones, files_processed,
                   duration_ms, status, processed_at
            FROM processing_history
            ORDER BY processed_at DESC, rowid DESC
            LIMIT ?1
            "#,
        )?;

        let raw = stmt
            .query_map(params![limit as i64], RawRun::from_row)?
            .collect::<Result<Vec<_>, _>>()?;

        raw.into_iter().map(RawRun::into_run).collect()
    }

    pub fn count(&self) -> RepositoryResult<usize> {
        let conn = self.get_conn()?;
        let n: i64 = conn.query_row("SELECT COUNT(*) FROM processing_history", [], |row| row.get(0))?;
        Ok(n as usize)
    }
}

/// 数据库原始行（文本列尚未解析）
struct RawRun {
    run_id: String,
    input_files: String,
    output_file: Option<String>,
    stats: ProcessingStats,
    duration_ms: i64,
    status: String,
    processed_at: String,
}

impl RawRun {
    fn from_row(row: &Row) -> rusqlite::Result<Self> {
        let count = |idx: usize| -> rusqlite::Result<usize> {
            let v: i64 = row.get(idx)?;
            Ok(v.max(0) as usize)
        };
        Ok(Self {
            run_id: row.get(0)?,
            input_files: row.get(1)?,
            output_file: row.get(2)?,
            stats: ProcessingStats {
                total_rows: count(3)?,
                valid_rows: count(4)?,
                duplicates_removed: count(5)?,
                invalid_phones: count(6)?,
                files_processed: count(7)?,
            },
            duration_ms: row.get(8)?,
            status: row.get(9)?,
            processed_at: row.get(10)?,
        })
    }

    fn into_run(self) -> RepositoryResult<ProcessingRun> {
        let status: RunStatus = self.status.parse().map_err(|e: String| {
            RepositoryError::FieldValueError {
                field: "status".to_string(),
                message: e,
            }
        })?;
        let processed_at = NaiveDateTime::parse_from_str(&self.processed_at, TS_FORMAT)
            .map_err(|e| RepositoryError::FieldValueError {
                field: "processed_at".to_string(),
                message: e.to_string(),
            })?;

        Ok(ProcessingRun {
            run_id: self.run_id,
            input_files: serde_json::from_str(&self.input_files)?,
            output_file: self.output_file,
            stats: self.stats,
            duration_ms: self.duration_ms,
            status,
            processed_at,
        })
    }
}
