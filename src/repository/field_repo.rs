// ==========================================
// 元数据导入器 - 属性仓储
// ==========================================
// 职责: field_def / field_translation / object_field 表的 CRUD
// 说明: 属性只插入不更新（按行新建）
// ==========================================

use crate::domain::{FieldEntity, FieldTranslation, FieldType, ObjectFieldEntity};
use crate::repository::error::{RepositoryError, RepositoryResult};
use crate::repository::parse_timestamp;
use chrono::Utc;
use rusqlite::{params, Connection, OptionalExtension, Result as SqliteResult};
use std::sync::{Arc, Mutex};

/// 新建属性所需字段
#[derive(Debug, Clone)]
pub struct NewField {
    pub name: String,
    pub db_name: String,
    pub field_type: FieldType,
    pub size: Option<i32>,
    pub list_name: Option<String>,
    pub module_id: i64,
}

pub struct FieldRepository {
    conn: Arc<Mutex<Connection>>,
}

impl FieldRepository {
    pub fn from_connection(conn: Arc<Mutex<Connection>>) -> Self {
        Self { conn }
    }

    fn get_conn(&self) -> RepositoryResult<std::sync::MutexGuard<'_, Connection>> {
        self.conn
            .lock()
            .map_err(|e| RepositoryError::LockError(e.to_string()))
    }

    /// 插入属性并回读
    pub fn insert(&self, field: &NewField) -> RepositoryResult<FieldEntity> {
        let field_id = {
            let conn = self.get_conn()?;
            conn.execute(
                r#"
                INSERT INTO field_def (name, db_name, field_type, size, list_name, module_id, created_at)
                VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)
                "#,
                params![
                    field.name,
                    field.db_name,
                    field.field_type.code(),
                    field.size,
                    field.list_name,
                    field.module_id,
                    Utc::now().to_rfc3339(),
                ],
            )?;
            conn.last_insert_rowid()
        };

        self.find_by_id(field_id)?
            .ok_or_else(|| RepositoryError::NotFound {
                entity: "field_def".to_string(),
                id: field_id.to_string(),
            })
    }

    pub fn find_by_id(&self, field_id: i64) -> RepositoryResult<Option<FieldEntity>> {
        let conn = self.get_conn()?;
        let raw = conn
            .query_row(
                r#"
                SELECT field_id, name, db_name, field_type, size, list_name, module_id, created_at
                FROM field_def
                WHERE field_id = ?1
                "#,
                params![field_id],
                |row| {
                    Ok((
                        row.get::<_, i64>(0)?,
                        row.get::<_, String>(1)?,
                        row.get::<_, String>(2)?,
                        row.get::<_, i32>(3)?,
                        row.get::<_, Option<i32>>(4)?,
                        row.get::<_, Option<String>>(5)?,
                        row.get::<_, i64>(6)?,
                        row.get::<_, String>(7)?,
                    ))
                },
            )
            .optional()?;

        let Some((field_id, name, db_name, type_code, size, list_name, module_id, created_at)) = raw
        else {
            return Ok(None);
        };

        let field_type =
            FieldType::from_code(type_code).ok_or_else(|| RepositoryError::FieldValueError {
                field: "field_type".to_string(),
                message: format!("未知类型码 {}", type_code),
            })?;

        Ok(Some(FieldEntity {
            field_id,
            name,
            db_name,
            field_type,
            size,
            list_name,
            module_id,
            created_at: parse_timestamp(&created_at),
        }))
    }

    /// 同名属性数量（属性无唯一约束）
    pub fn count_by_name(&self, name: &str) -> RepositoryResult<i64> {
        let conn = self.get_conn()?;
        let count = conn.query_row(
            "SELECT COUNT(*) FROM field_def WHERE name = ?1",
            params![name],
            |row| row.get(0),
        )?;
        Ok(count)
    }

    // ===== 属性翻译 =====

    pub fn find_translation(
        &self,
        field_id: i64,
        lang: &str,
    ) -> RepositoryResult<Option<FieldTranslation>> {
        let conn = self.get_conn()?;
        let translation = conn
            .query_row(
                r#"
                SELECT translation_id, field_id, lang, value, simple_help
                FROM field_translation
                WHERE field_id = ?1 AND lang = ?2
                "#,
                params![field_id, lang],
                |row| {
                    Ok(FieldTranslation {
                        translation_id: row.get(0)?,
                        field_id: row.get(1)?,
                        lang: row.get(2)?,
                        value: row.get(3)?,
                        simple_help: row.get(4)?,
                    })
                },
            )
            .optional()?;
        Ok(translation)
    }

    pub fn insert_translation(
        &self,
        field_id: i64,
        lang: &str,
        value: &str,
        simple_help: Option<&str>,
    ) -> RepositoryResult<i64> {
        let conn = self.get_conn()?;
        conn.execute(
            r#"
            INSERT INTO field_translation (field_id, lang, value, simple_help)
            VALUES (?1, ?2, ?3, ?4)
            "#,
            params![field_id, lang, value, simple_help],
        )?;
        Ok(conn.last_insert_rowid())
    }

    pub fn update_translation(
        &self,
        translation_id: i64,
        value: &str,
        simple_help: Option<&str>,
    ) -> RepositoryResult<()> {
        let conn = self.get_conn()?;
        conn.execute(
            "UPDATE field_translation SET value = ?2, simple_help = ?3 WHERE translation_id = ?1",
            params![translation_id, value, simple_help],
        )?;
        Ok(())
    }

    // ===== 对象-属性关联 =====

    pub fn insert_object_field(
        &self,
        object_id: i64,
        field_id: i64,
        field_order: i64,
        module_id: i64,
    ) -> RepositoryResult<ObjectFieldEntity> {
        let conn = self.get_conn()?;
        conn.execute(
            r#"
            INSERT INTO object_field (object_id, field_id, field_order, module_id)
            VALUES (?1, ?2, ?3, ?4)
            "#,
            params![object_id, field_id, field_order, module_id],
        )?;
        Ok(ObjectFieldEntity {
            object_field_id: conn.last_insert_rowid(),
            object_id,
            field_id,
            field_order,
            module_id,
        })
    }

    /// 按顺序列出对象的属性关联
    pub fn list_object_fields(&self, object_id: i64) -> RepositoryResult<Vec<ObjectFieldEntity>> {
        let conn = self.get_conn()?;
        let mut stmt = conn.prepare(
            r#"
            SELECT object_field_id, object_id, field_id, field_order, module_id
            FROM object_field
            WHERE object_id = ?1
            ORDER BY field_order ASC, object_field_id ASC
            "#,
        )?;

        let rows = stmt
            .query_map(params![object_id], |row| {
                Ok(ObjectFieldEntity {
                    object_field_id: row.get(0)?,
                    object_id: row.get(1)?,
                    field_id: row.get(2)?,
                    field_order: row.get(3)?,
                    module_id: row.get(4)?,
                })
            })?
            .collect::<SqliteResult<Vec<_>>>()?;

        Ok(rows)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::init_catalog_schema;
    use crate::repository::ModuleRepository;

    fn setup() -> (FieldRepository, i64) {
        let conn = Connection::open_in_memory().unwrap();
        init_catalog_schema(&conn).unwrap();
        let shared = Arc::new(Mutex::new(conn));
        let module_id = ModuleRepository::from_connection(shared.clone())
            .insert("Demo", "dem")
            .unwrap();
        (FieldRepository::from_connection(shared), module_id)
    }

    fn draft(module_id: i64) -> NewField {
        NewField {
            name: "demOrdStatus".to_string(),
            db_name: "dem_ord_status".to_string(),
            field_type: FieldType::Enum,
            size: Some(10),
            list_name: Some("DEM_ORD_STATUS".to_string()),
            module_id,
        }
    }

    #[test]
    fn test_insert_round_trips_type_code() {
        let (repo, module_id) = setup();
        let field = repo.insert(&draft(module_id)).unwrap();
        assert_eq!(field.field_type, FieldType::Enum);
        assert_eq!(field.size, Some(10));
        assert_eq!(field.list_name.as_deref(), Some("DEM_ORD_STATUS"));
    }

    #[test]
    fn test_same_name_inserted_twice() {
        let (repo, module_id) = setup();
        let first = repo.insert(&draft(module_id)).unwrap();
        let second = repo.insert(&draft(module_id)).unwrap();
        assert_ne!(first.field_id, second.field_id);
        assert_eq!(repo.count_by_name("demOrdStatus").unwrap(), 2);
    }
}
