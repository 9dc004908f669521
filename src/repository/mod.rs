// ==========================================
// 元数据导入器 - 数据仓储层
// ==========================================
// 红线: Repository 不含业务逻辑
// 职责: 提供目录数据访问接口,屏蔽数据库细节
// 约束: 所有查询使用参数化,防止 SQL 注入
// ==========================================

pub mod error;
pub mod field_repo;
pub mod list_repo;
pub mod module_repo;
pub mod object_repo;
pub mod template_repo;

pub use error::{RepositoryError, RepositoryResult};
pub use field_repo::{FieldRepository, NewField};
pub use list_repo::FieldListRepository;
pub use module_repo::ModuleRepository;
pub use object_repo::{NewObject, ObjectRepository};
pub use template_repo::TemplateRepository;

use crate::db::{init_catalog_schema, open_sqlite_connection};
use chrono::{DateTime, Utc};
use rusqlite::Connection;
use std::sync::{Arc, Mutex};

/// 解析 RFC3339 时间戳（格式异常时回退为当前时间）
pub(crate) fn parse_timestamp(raw: &str) -> DateTime<Utc> {
    DateTime::parse_from_rfc3339(raw)
        .map(|dt| dt.with_timezone(&Utc))
        .unwrap_or_else(|_| Utc::now())
}

// ==========================================
// Catalog - 共享同一连接的仓储集合
// ==========================================
pub struct Catalog {
    conn: Arc<Mutex<Connection>>,
    pub modules: ModuleRepository,
    pub objects: ObjectRepository,
    pub fields: FieldRepository,
    pub lists: FieldListRepository,
    pub templates: TemplateRepository,
}

impl Catalog {
    /// 打开目录数据库并确保 schema 存在
    pub fn open(db_path: &str) -> RepositoryResult<Self> {
        let conn = open_sqlite_connection(db_path)
            .map_err(|e| RepositoryError::DatabaseConnectionError(e.to_string()))?;
        Self::from_connection(Arc::new(Mutex::new(conn)))
    }

    pub fn from_connection(conn: Arc<Mutex<Connection>>) -> RepositoryResult<Self> {
        {
            let guard = conn
                .lock()
                .map_err(|e| RepositoryError::LockError(e.to_string()))?;
            init_catalog_schema(&guard)?;
        }

        Ok(Self {
            modules: ModuleRepository::from_connection(conn.clone()),
            objects: ObjectRepository::from_connection(conn.clone()),
            fields: FieldRepository::from_connection(conn.clone()),
            lists: FieldListRepository::from_connection(conn.clone()),
            templates: TemplateRepository::from_connection(conn.clone()),
            conn,
        })
    }

    /// 共享连接（供配置读取等复用）
    pub fn connection(&self) -> Arc<Mutex<Connection>> {
        self.conn.clone()
    }
}
