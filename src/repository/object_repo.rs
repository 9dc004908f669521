// ==========================================
// 元数据导入器 - 业务对象仓储
// ==========================================
// 职责: object_def / object_translation 表的 CRUD
// 红线: 不含业务规则（前缀/模块一致性校验在导入层）
// ==========================================

use crate::domain::{ObjectEntity, ObjectTranslation};
use crate::repository::error::{RepositoryError, RepositoryResult};
use crate::repository::parse_timestamp;
use chrono::Utc;
use rusqlite::{params, Connection, OptionalExtension, Row};
use std::sync::{Arc, Mutex};

/// 新建对象所需字段
#[derive(Debug, Clone)]
pub struct NewObject {
    pub name: String,
    pub db_table: String,
    pub prefix: String,
    pub module_id: i64,
}

const OBJECT_COLUMNS: &str =
    "object_id, name, db_table, prefix, module_id, template_id, created_at, updated_at";

fn map_object(row: &Row) -> rusqlite::Result<ObjectEntity> {
    Ok(ObjectEntity {
        object_id: row.get(0)?,
        name: row.get(1)?,
        db_table: row.get(2)?,
        prefix: row.get(3)?,
        module_id: row.get(4)?,
        template_id: row.get(5)?,
        created_at: parse_timestamp(&row.get::<_, String>(6)?),
        updated_at: parse_timestamp(&row.get::<_, String>(7)?),
    })
}

pub struct ObjectRepository {
    conn: Arc<Mutex<Connection>>,
}

impl ObjectRepository {
    pub fn from_connection(conn: Arc<Mutex<Connection>>) -> Self {
        Self { conn }
    }

    fn get_conn(&self) -> RepositoryResult<std::sync::MutexGuard<'_, Connection>> {
        self.conn
            .lock()
            .map_err(|e| RepositoryError::LockError(e.to_string()))
    }

    pub fn find_by_name(&self, name: &str) -> RepositoryResult<Option<ObjectEntity>> {
        let conn = self.get_conn()?;
        let sql = format!("SELECT {} FROM object_def WHERE name = ?1", OBJECT_COLUMNS);
        let object = conn.query_row(&sql, params![name], map_object).optional()?;
        Ok(object)
    }

    pub fn find_by_id(&self, object_id: i64) -> RepositoryResult<Option<ObjectEntity>> {
        let conn = self.get_conn()?;
        let sql = format!("SELECT {} FROM object_def WHERE object_id = ?1", OBJECT_COLUMNS);
        let object = conn.query_row(&sql, params![object_id], map_object).optional()?;
        Ok(object)
    }

    /// 插入对象并回读
    pub fn insert(&self, object: &NewObject) -> RepositoryResult<ObjectEntity> {
        let object_id = {
            let conn = self.get_conn()?;
            let now = Utc::now().to_rfc3339();
            conn.execute(
                r#"
                INSERT INTO object_def (name, db_table, prefix, module_id, template_id, created_at, updated_at)
                VALUES (?1, ?2, ?3, ?4, NULL, ?5, ?5)
                "#,
                params![object.name, object.db_table, object.prefix, object.module_id, now],
            )?;
            conn.last_insert_rowid()
        };

        self.find_by_id(object_id)?
            .ok_or_else(|| RepositoryError::NotFound {
                entity: "object_def".to_string(),
                id: object_id.to_string(),
            })
    }

    /// 更新对象的模板引用
    pub fn update_template(&self, object_id: i64, template_id: i64) -> RepositoryResult<()> {
        let conn = self.get_conn()?;
        let affected = conn.execute(
            "UPDATE object_def SET template_id = ?2, updated_at = ?3 WHERE object_id = ?1",
            params![object_id, template_id, Utc::now().to_rfc3339()],
        )?;
        if affected == 0 {
            return Err(RepositoryError::NotFound {
                entity: "object_def".to_string(),
                id: object_id.to_string(),
            });
        }
        Ok(())
    }

    // ===== 对象翻译 =====

    pub fn find_translation(
        &self,
        object_id: i64,
        lang: &str,
    ) -> RepositoryResult<Option<ObjectTranslation>> {
        let conn = self.get_conn()?;
        let translation = conn
            .query_row(
                r#"
                SELECT translation_id, object_id, lang, value
                FROM object_translation
                WHERE object_id = ?1 AND lang = ?2
                "#,
                params![object_id, lang],
                |row| {
                    Ok(ObjectTranslation {
                        translation_id: row.get(0)?,
                        object_id: row.get(1)?,
                        lang: row.get(2)?,
                        value: row.get(3)?,
                    })
                },
            )
            .optional()?;
        Ok(translation)
    }

    pub fn insert_translation(&self, object_id: i64, lang: &str, value: &str) -> RepositoryResult<i64> {
        let conn = self.get_conn()?;
        conn.execute(
            "INSERT INTO object_translation (object_id, lang, value) VALUES (?1, ?2, ?3)",
            params![object_id, lang, value],
        )?;
        Ok(conn.last_insert_rowid())
    }

    pub fn update_translation(&self, translation_id: i64, value: &str) -> RepositoryResult<()> {
        let conn = self.get_conn()?;
        conn.execute(
            "UPDATE object_translation SET value = ?2 WHERE translation_id = ?1",
            params![translation_id, value],
        )?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::init_catalog_schema;
    use crate::repository::ModuleRepository;

    fn setup() -> (ObjectRepository, i64) {
        let conn = Connection::open_in_memory().unwrap();
        init_catalog_schema(&conn).unwrap();
        let shared = Arc::new(Mutex::new(conn));
        let module_id = ModuleRepository::from_connection(shared.clone())
            .insert("Demo", "dem")
            .unwrap();
        (ObjectRepository::from_connection(shared), module_id)
    }

    #[test]
    fn test_insert_reads_back_id() {
        let (repo, module_id) = setup();
        let created = repo
            .insert(&NewObject {
                name: "DemOrder".to_string(),
                db_table: "dem_order".to_string(),
                prefix: "ord".to_string(),
                module_id,
            })
            .unwrap();

        assert!(created.object_id > 0);
        assert_eq!(created.template_id, None);
        let found = repo.find_by_name("DemOrder").unwrap().unwrap();
        assert_eq!(found.object_id, created.object_id);
        assert_eq!(found.db_table, "dem_order");
    }

    #[test]
    fn test_duplicate_name_rejected() {
        let (repo, module_id) = setup();
        let draft = NewObject {
            name: "DemOrder".to_string(),
            db_table: "dem_order".to_string(),
            prefix: "ord".to_string(),
            module_id,
        };
        repo.insert(&draft).unwrap();
        assert!(matches!(
            repo.insert(&draft),
            Err(RepositoryError::UniqueConstraintViolation(_))
        ));
    }

    #[test]
    fn test_update_template_on_missing_object() {
        let (repo, _) = setup();
        assert!(matches!(
            repo.update_template(999, 1),
            Err(RepositoryError::NotFound { .. })
        ));
    }
}
