// ==========================================
// 线索工具 - 负责人名册数据仓储
// ==========================================
// 对齐: managers 表（name 唯一）
// ==========================================

use crate::domain::history::Manager;
use crate::repository::error::{RepositoryError, RepositoryResult};
use rusqlite::{params, Connection};
use std::collections::HashSet;
use std::sync::{Arc, Mutex};

pub struct ManagerRepository {
    conn: Arc<Mutex<Connection>>,
}

impl ManagerRepository {
    pub fn new(conn: Arc<Mutex<Connection>>) -> Self {
        Self { conn }
    }

    fn get_conn(&self) -> RepositoryResult<std::sync::MutexGuard<Connection>> {
        self.conn
            .lock()
            .map_err(|e| RepositoryError::LockError(e.to_string()))
    }

    /// 保存名册: 全部停用后，将给定名称写入并激活
    ///
    /// # 返回
    /// - 激活的不同名称数量（去空白后重复的名称只计一次）
    pub fn save_roster(&self, names: &[String]) -> RepositoryResult<usize> {
        let mut conn = self.get_conn()?;
        let tx = conn.transaction()?;

        tx.execute("UPDATE managers SET is_active = 0", [])?;

        let mut seen = HashSet::new();
        for name in names.iter().map(|n| n.trim()).filter(|n| !n.is_empty()) {
            if !seen.insert(name) {
                continue;
            }
            tx.execute(
                r#"
                INSERT INTO managers (name, is_active) VALUES (?1, 1)
                ON CONFLICT(name) DO UPDATE SET is_active = 1
                "#,
                params![name],
            )?;
        }

        tx.commit()?;
        Ok(seen.len())
    }

    /// 激活的负责人名称（按名称排序）
    pub fn list_active(&self) -> RepositoryResult<Vec<String>> {
        let conn = self.get_conn()?;
        let mut stmt = conn.prepare("SELECT name FROM managers WHERE is_active = 1 ORDER BY name")?;
        let names = stmt
            .query_map([], |row| row.get::<_, String>(0))?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(names)
    }

    /// 全部名册条目（含停用）
    pub fn list_all(&self) -> RepositoryResult<Vec<Manager>> {
        let conn = self.get_conn()?;
        let mut stmt = conn.prepare("SELECT name, is_active FROM managers ORDER BY name")?;
        let managers = stmt
            .query_map([], |row| {
                Ok(Manager {
                    name: row.get(0)?,
                    is_active: row.get::<_, i64>(1)? != 0,
                })
            })?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(managers)
    }
}
