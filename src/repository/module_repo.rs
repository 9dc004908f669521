// ==========================================
// 元数据导入器 - 模块目录仓储
// ==========================================
// 职责: 按名称查询模块 ID 与模块前缀
// 说明: 导入核心从不创建模块；insert 仅供初始化/运维使用
// ==========================================

use crate::domain::ModuleEntity;
use crate::repository::error::{RepositoryError, RepositoryResult};
use rusqlite::{params, Connection, OptionalExtension};
use std::sync::{Arc, Mutex};

pub struct ModuleRepository {
    conn: Arc<Mutex<Connection>>,
}

impl ModuleRepository {
    pub fn from_connection(conn: Arc<Mutex<Connection>>) -> Self {
        Self { conn }
    }

    fn get_conn(&self) -> RepositoryResult<std::sync::MutexGuard<'_, Connection>> {
        self.conn
            .lock()
            .map_err(|e| RepositoryError::LockError(e.to_string()))
    }

    pub fn find_by_name(&self, name: &str) -> RepositoryResult<Option<ModuleEntity>> {
        let conn = self.get_conn()?;
        let module = conn
            .query_row(
                "SELECT module_id, name, prefix FROM module WHERE name = ?1",
                params![name],
                |row| {
                    Ok(ModuleEntity {
                        module_id: row.get(0)?,
                        name: row.get(1)?,
                        prefix: row.get(2)?,
                    })
                },
            )
            .optional()?;
        Ok(module)
    }

    /// 按名称查询模块 ID
    pub fn module_id_by_name(&self, name: &str) -> RepositoryResult<Option<i64>> {
        Ok(self.find_by_name(name)?.map(|m| m.module_id))
    }

    /// 查询模块前缀（空字符串视为缺失）
    pub fn module_prefix(&self, module_id: i64) -> RepositoryResult<Option<String>> {
        let conn = self.get_conn()?;
        let prefix: Option<Option<String>> = conn
            .query_row(
                "SELECT prefix FROM module WHERE module_id = ?1",
                params![module_id],
                |row| row.get(0),
            )
            .optional()?;
        Ok(prefix
            .flatten()
            .map(|p| p.trim().to_string())
            .filter(|p| !p.is_empty()))
    }

    /// 登记模块（初始化用）
    pub fn insert(&self, name: &str, prefix: &str) -> RepositoryResult<i64> {
        let conn = self.get_conn()?;
        conn.execute(
            "INSERT INTO module (name, prefix) VALUES (?1, ?2)",
            params![name, prefix],
        )?;
        Ok(conn.last_insert_rowid())
    }
}
