// ==========================================
// 元数据导入器 - 值列表仓储
// ==========================================
// 职责: field_list / field_list_code / field_list_value 表的 CRUD
// ==========================================

use crate::domain::{FieldListEntity, ListItemEntity, ListItemValueEntity};
use crate::repository::error::{RepositoryError, RepositoryResult};
use rusqlite::{params, Connection, OptionalExtension, Result as SqliteResult, Row};
use std::sync::{Arc, Mutex};

fn map_item(row: &Row) -> rusqlite::Result<ListItemEntity> {
    Ok(ListItemEntity {
        item_id: row.get(0)?,
        list_id: row.get(1)?,
        code: row.get(2)?,
        label: row.get(3)?,
        order_by: row.get(4)?,
        module_id: row.get(5)?,
    })
}

pub struct FieldListRepository {
    conn: Arc<Mutex<Connection>>,
}

impl FieldListRepository {
    pub fn from_connection(conn: Arc<Mutex<Connection>>) -> Self {
        Self { conn }
    }

    fn get_conn(&self) -> RepositoryResult<std::sync::MutexGuard<'_, Connection>> {
        self.conn
            .lock()
            .map_err(|e| RepositoryError::LockError(e.to_string()))
    }

    // ===== 列表 =====

    pub fn find_list_by_name(&self, name: &str) -> RepositoryResult<Option<FieldListEntity>> {
        let conn = self.get_conn()?;
        let list = conn
            .query_row(
                "SELECT list_id, name, module_id FROM field_list WHERE name = ?1",
                params![name],
                |row| {
                    Ok(FieldListEntity {
                        list_id: row.get(0)?,
                        name: row.get(1)?,
                        module_id: row.get(2)?,
                    })
                },
            )
            .optional()?;
        Ok(list)
    }

    pub fn insert_list(&self, name: &str, module_id: i64) -> RepositoryResult<FieldListEntity> {
        let conn = self.get_conn()?;
        conn.execute(
            "INSERT INTO field_list (name, module_id) VALUES (?1, ?2)",
            params![name, module_id],
        )?;
        Ok(FieldListEntity {
            list_id: conn.last_insert_rowid(),
            name: name.to_string(),
            module_id,
        })
    }

    // ===== 条目 =====

    pub fn find_item(&self, list_id: i64, code: &str) -> RepositoryResult<Option<ListItemEntity>> {
        let conn = self.get_conn()?;
        let item = conn
            .query_row(
                r#"
                SELECT item_id, list_id, code, label, order_by, module_id
                FROM field_list_code
                WHERE list_id = ?1 AND code = ?2
                "#,
                params![list_id, code],
                map_item,
            )
            .optional()?;
        Ok(item)
    }

    pub fn insert_item(
        &self,
        list_id: i64,
        code: &str,
        label: &str,
        order_by: i64,
        module_id: i64,
    ) -> RepositoryResult<ListItemEntity> {
        let conn = self.get_conn()?;
        conn.execute(
            r#"
            INSERT INTO field_list_code (list_id, code, label, order_by, module_id)
            VALUES (?1, ?2, ?3, ?4, ?5)
            "#,
            params![list_id, code, label, order_by, module_id],
        )?;
        Ok(ListItemEntity {
            item_id: conn.last_insert_rowid(),
            list_id,
            code: code.to_string(),
            label: label.to_string(),
            order_by,
            module_id,
        })
    }

    /// 仅更新可变字段（label / order_by）
    pub fn update_item(&self, item_id: i64, label: &str, order_by: i64) -> RepositoryResult<()> {
        let conn = self.get_conn()?;
        conn.execute(
            "UPDATE field_list_code SET label = ?2, order_by = ?3 WHERE item_id = ?1",
            params![item_id, label, order_by],
        )?;
        Ok(())
    }

    pub fn list_items(&self, list_id: i64) -> RepositoryResult<Vec<ListItemEntity>> {
        let conn = self.get_conn()?;
        let mut stmt = conn.prepare(
            r#"
            SELECT item_id, list_id, code, label, order_by, module_id
            FROM field_list_code
            WHERE list_id = ?1
            ORDER BY order_by ASC, item_id ASC
            "#,
        )?;
        let rows = stmt
            .query_map(params![list_id], map_item)?
            .collect::<SqliteResult<Vec<_>>>()?;
        Ok(rows)
    }

    // ===== 条目翻译值 =====

    pub fn find_value(&self, item_id: i64, lang: &str) -> RepositoryResult<Option<ListItemValueEntity>> {
        let conn = self.get_conn()?;
        let value = conn
            .query_row(
                r#"
                SELECT value_id, item_id, lang, value
                FROM field_list_value
                WHERE item_id = ?1 AND lang = ?2
                "#,
                params![item_id, lang],
                |row| {
                    Ok(ListItemValueEntity {
                        value_id: row.get(0)?,
                        item_id: row.get(1)?,
                        lang: row.get(2)?,
                        value: row.get(3)?,
                    })
                },
            )
            .optional()?;
        Ok(value)
    }

    pub fn insert_value(&self, item_id: i64, lang: &str, value: &str) -> RepositoryResult<ListItemValueEntity> {
        let conn = self.get_conn()?;
        conn.execute(
            "INSERT INTO field_list_value (item_id, lang, value) VALUES (?1, ?2, ?3)",
            params![item_id, lang, value],
        )?;
        Ok(ListItemValueEntity {
            value_id: conn.last_insert_rowid(),
            item_id,
            lang: lang.to_string(),
            value: value.to_string(),
        })
    }

    pub fn update_value(&self, value_id: i64, value: &str) -> RepositoryResult<()> {
        let conn = self.get_conn()?;
        conn.execute(
            "UPDATE field_list_value SET value = ?2 WHERE value_id = ?1",
            params![value_id, value],
        )?;
        Ok(())
    }
}
