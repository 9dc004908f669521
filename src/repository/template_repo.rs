// ==========================================
// 元数据导入器 - UI 模板仓储
// ==========================================
// 职责: template / template_field 表的 CRUD
// ==========================================

use crate::domain::{TemplateEntity, TemplateFieldEntity};
use crate::repository::error::{RepositoryError, RepositoryResult};
use rusqlite::{params, Connection, OptionalExtension, Result as SqliteResult};
use std::sync::{Arc, Mutex};

pub struct TemplateRepository {
    conn: Arc<Mutex<Connection>>,
}

impl TemplateRepository {
    pub fn from_connection(conn: Arc<Mutex<Connection>>) -> Self {
        Self { conn }
    }

    fn get_conn(&self) -> RepositoryResult<std::sync::MutexGuard<'_, Connection>> {
        self.conn
            .lock()
            .map_err(|e| RepositoryError::LockError(e.to_string()))
    }

    pub fn find_by_name(&self, name: &str) -> RepositoryResult<Option<TemplateEntity>> {
        let conn = self.get_conn()?;
        let template = conn
            .query_row(
                "SELECT template_id, name, ui, image, module_id FROM template WHERE name = ?1",
                params![name],
                |row| {
                    Ok(TemplateEntity {
                        template_id: row.get(0)?,
                        name: row.get(1)?,
                        ui: row.get(2)?,
                        image: row.get(3)?,
                        module_id: row.get(4)?,
                    })
                },
            )
            .optional()?;
        Ok(template)
    }

    /// 插入模板（忽略 template_id）并回读 ID
    pub fn insert(&self, template: &TemplateEntity) -> RepositoryResult<i64> {
        let conn = self.get_conn()?;
        conn.execute(
            "INSERT INTO template (name, ui, image, module_id) VALUES (?1, ?2, ?3, ?4)",
            params![template.name, template.ui, template.image, template.module_id],
        )?;
        Ok(conn.last_insert_rowid())
    }

    /// 更新可变字段（名称为自然键，不改写）
    pub fn update(&self, template: &TemplateEntity) -> RepositoryResult<()> {
        let conn = self.get_conn()?;
        conn.execute(
            "UPDATE template SET ui = ?2, image = ?3, module_id = ?4 WHERE template_id = ?1",
            params![template.template_id, template.ui, template.image, template.module_id],
        )?;
        Ok(())
    }

    // ===== 模板成员 =====

    /// 整体替换模板成员（事务内先删后插，位置从 1 开始）
    pub fn replace_fields(&self, template_id: i64, field_names: &[String]) -> RepositoryResult<()> {
        let mut conn = self.get_conn()?;
        let tx = conn.transaction()?;
        tx.execute(
            "DELETE FROM template_field WHERE template_id = ?1",
            params![template_id],
        )?;
        {
            let mut stmt = tx.prepare(
                r#"
                INSERT INTO template_field (template_id, field_name, position)
                VALUES (?1, ?2, ?3)
                ON CONFLICT(template_id, field_name) DO NOTHING
                "#,
            )?;
            let mut position = 0i64;
            for field_name in field_names {
                if stmt.execute(params![template_id, field_name, position + 1])? > 0 {
                    position += 1;
                }
            }
        }
        tx.commit()?;
        Ok(())
    }

    pub fn list_fields(&self, template_id: i64) -> RepositoryResult<Vec<TemplateFieldEntity>> {
        let conn = self.get_conn()?;
        let mut stmt = conn.prepare(
            r#"
            SELECT template_id, field_name, position
            FROM template_field
            WHERE template_id = ?1
            ORDER BY position ASC
            "#,
        )?;
        let rows = stmt
            .query_map(params![template_id], |row| {
                Ok(TemplateFieldEntity {
                    template_id: row.get(0)?,
                    field_name: row.get(1)?,
                    position: row.get(2)?,
                })
            })?
            .collect::<SqliteResult<Vec<_>>>()?;
        Ok(rows)
    }
}
