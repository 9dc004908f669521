// ==========================================
// 元数据导入器 - SQLite 连接与目录 schema
// ==========================================
// 目标:
// - 统一所有 Connection::open 的 PRAGMA 行为（外键 + busy_timeout）
// - 幂等建表，记录 schema_version，预置 Base 模板原型
// ==========================================

use rusqlite::Connection;
use rusqlite::OptionalExtension;
use std::path::PathBuf;
use std::time::Duration;

/// 默认 busy_timeout（毫秒）
pub const DEFAULT_BUSY_TIMEOUT_MS: u64 = 5_000;

/// 当前代码所期望的 schema_version
pub const CURRENT_SCHEMA_VERSION: i64 = 1;

/// 预置模板原型名称
pub const BASE_TEMPLATE_NAME: &str = "Base";

/// 预置模板原型的 UI 布局
pub const BASE_TEMPLATE_UI: &str = r#"<div class="area" data-area="1"></div>"#;

/// 配置 SQLite 连接的统一 PRAGMA
///
/// 说明：
/// - foreign_keys 需要“每个连接”单独开启
/// - busy_timeout 需要“每个连接”单独配置
pub fn configure_sqlite_connection(conn: &Connection) -> rusqlite::Result<()> {
    conn.execute_batch("PRAGMA foreign_keys = ON;")?;
    conn.busy_timeout(Duration::from_millis(DEFAULT_BUSY_TIMEOUT_MS))?;
    Ok(())
}

/// 打开 SQLite 连接并应用统一配置
pub fn open_sqlite_connection(db_path: &str) -> rusqlite::Result<Connection> {
    let conn = Connection::open(db_path)?;
    configure_sqlite_connection(&conn)?;
    Ok(conn)
}

/// 读取 schema_version（若表不存在则返回 None）
pub fn read_schema_version(conn: &Connection) -> rusqlite::Result<Option<i64>> {
    let has_table: bool = conn
        .query_row(
            "SELECT 1 FROM sqlite_master WHERE type='table' AND name='schema_version' LIMIT 1",
            [],
            |_row| Ok(true),
        )
        .optional()?
        .unwrap_or(false);

    if !has_table {
        return Ok(None);
    }

    let v: Option<i64> = conn.query_row("SELECT MAX(version) FROM schema_version", [], |row| row.get(0))?;
    Ok(v)
}

/// 创建目录 schema（幂等）
///
/// 说明：
/// - field_def.name 不加唯一约束：属性按行新建，重复导入会产生重复属性
/// - 其余实体均按自然键唯一
pub fn init_catalog_schema(conn: &Connection) -> rusqlite::Result<()> {
    conn.execute_batch(
        r#"
        CREATE TABLE IF NOT EXISTS schema_version (
            version INTEGER PRIMARY KEY,
            applied_at TEXT NOT NULL DEFAULT (datetime('now'))
        );

        CREATE TABLE IF NOT EXISTS config_kv (
            scope_id TEXT NOT NULL,
            key TEXT NOT NULL,
            value TEXT NOT NULL,
            updated_at TEXT NOT NULL DEFAULT (datetime('now')),
            PRIMARY KEY (scope_id, key)
        );

        CREATE TABLE IF NOT EXISTS module (
            module_id INTEGER PRIMARY KEY AUTOINCREMENT,
            name TEXT NOT NULL UNIQUE,
            prefix TEXT
        );

        CREATE TABLE IF NOT EXISTS template (
            template_id INTEGER PRIMARY KEY AUTOINCREMENT,
            name TEXT NOT NULL UNIQUE,
            ui TEXT NOT NULL DEFAULT '',
            image TEXT NOT NULL DEFAULT '',
            module_id INTEGER REFERENCES module(module_id)
        );

        CREATE TABLE IF NOT EXISTS template_field (
            template_id INTEGER NOT NULL REFERENCES template(template_id) ON DELETE CASCADE,
            field_name TEXT NOT NULL,
            position INTEGER NOT NULL,
            PRIMARY KEY (template_id, field_name)
        );

        CREATE TABLE IF NOT EXISTS object_def (
            object_id INTEGER PRIMARY KEY AUTOINCREMENT,
            name TEXT NOT NULL UNIQUE,
            db_table TEXT NOT NULL,
            prefix TEXT NOT NULL,
            module_id INTEGER NOT NULL REFERENCES module(module_id),
            template_id INTEGER REFERENCES template(template_id),
            created_at TEXT NOT NULL,
            updated_at TEXT NOT NULL
        );

        CREATE TABLE IF NOT EXISTS object_translation (
            translation_id INTEGER PRIMARY KEY AUTOINCREMENT,
            object_id INTEGER NOT NULL REFERENCES object_def(object_id) ON DELETE CASCADE,
            lang TEXT NOT NULL,
            value TEXT NOT NULL,
            UNIQUE (object_id, lang)
        );

        CREATE TABLE IF NOT EXISTS field_def (
            field_id INTEGER PRIMARY KEY AUTOINCREMENT,
            name TEXT NOT NULL,
            db_name TEXT NOT NULL,
            field_type INTEGER NOT NULL,
            size INTEGER,
            list_name TEXT,
            module_id INTEGER NOT NULL REFERENCES module(module_id),
            created_at TEXT NOT NULL
        );

        CREATE INDEX IF NOT EXISTS idx_field_def_name ON field_def(name);

        CREATE TABLE IF NOT EXISTS field_translation (
            translation_id INTEGER PRIMARY KEY AUTOINCREMENT,
            field_id INTEGER NOT NULL REFERENCES field_def(field_id) ON DELETE CASCADE,
            lang TEXT NOT NULL,
            value TEXT NOT NULL,
            simple_help TEXT,
            UNIQUE (field_id, lang)
        );

        CREATE TABLE IF NOT EXISTS object_field (
            object_field_id INTEGER PRIMARY KEY AUTOINCREMENT,
            object_id INTEGER NOT NULL REFERENCES object_def(object_id) ON DELETE CASCADE,
            field_id INTEGER NOT NULL REFERENCES field_def(field_id) ON DELETE CASCADE,
            field_order INTEGER NOT NULL,
            module_id INTEGER NOT NULL REFERENCES module(module_id)
        );

        CREATE TABLE IF NOT EXISTS field_list (
            list_id INTEGER PRIMARY KEY AUTOINCREMENT,
            name TEXT NOT NULL UNIQUE,
            module_id INTEGER NOT NULL REFERENCES module(module_id)
        );

        CREATE TABLE IF NOT EXISTS field_list_code (
            item_id INTEGER PRIMARY KEY AUTOINCREMENT,
            list_id INTEGER NOT NULL REFERENCES field_list(list_id) ON DELETE CASCADE,
            code TEXT NOT NULL,
            label TEXT NOT NULL,
            order_by INTEGER NOT NULL,
            module_id INTEGER NOT NULL REFERENCES module(module_id),
            UNIQUE (list_id, code)
        );

        CREATE TABLE IF NOT EXISTS field_list_value (
            value_id INTEGER PRIMARY KEY AUTOINCREMENT,
            item_id INTEGER NOT NULL REFERENCES field_list_code(item_id) ON DELETE CASCADE,
            lang TEXT NOT NULL,
            value TEXT NOT NULL,
            UNIQUE (item_id, lang)
        );
        "#,
    )?;

    conn.execute(
        "INSERT OR IGNORE INTO schema_version (version) VALUES (?1)",
        [CURRENT_SCHEMA_VERSION],
    )?;
    conn.execute(
        "INSERT OR IGNORE INTO template (name, ui, image, module_id) VALUES (?1, ?2, '', NULL)",
        [BASE_TEMPLATE_NAME, BASE_TEMPLATE_UI],
    )?;
    Ok(())
}

/// 默认数据库路径
///
/// 优先级: 环境变量 CATALOG_IMPORTER_DB_PATH > 用户数据目录 > 当前目录
pub fn default_db_path() -> String {
    if let Ok(path) = std::env::var("CATALOG_IMPORTER_DB_PATH") {
        let trimmed = path.trim();
        if !trimmed.is_empty() {
            return trimmed.to_string();
        }
    }

    let mut path = PathBuf::from("./catalog.db");
    if let Some(data_dir) = dirs::data_dir() {
        let dir = data_dir.join("catalog-importer");
        // 目录创建失败时回退到当前目录
        if std::fs::create_dir_all(&dir).is_ok() {
            path = dir.join("catalog.db");
        }
    }
    path.to_string_lossy().to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_init_schema_is_idempotent() {
        let conn = Connection::open_in_memory().unwrap();
        configure_sqlite_connection(&conn).unwrap();
        assert_eq!(read_schema_version(&conn).unwrap(), None);

        init_catalog_schema(&conn).unwrap();
        init_catalog_schema(&conn).unwrap();

        assert_eq!(read_schema_version(&conn).unwrap(), Some(CURRENT_SCHEMA_VERSION));
        let base_count: i64 = conn
            .query_row(
                "SELECT COUNT(*) FROM template WHERE name = ?1",
                [BASE_TEMPLATE_NAME],
                |row| row.get(0),
            )
            .unwrap();
        assert_eq!(base_count, 1);
    }
}
