// ==========================================
// 元数据导入器 - 配置管理器
// ==========================================
// 职责: 从 config_kv 表读取导入配置，缺省时回退默认值
// 存储: config_kv 表 (scope_id + key + value)
// ==========================================

use crate::db::BASE_TEMPLATE_NAME;
use crate::repository::{RepositoryError, RepositoryResult};
use rusqlite::{params, Connection, OptionalExtension};
use std::sync::{Arc, Mutex};

/// 配置键常量
pub mod config_keys {
    /// 翻译默认语言
    pub const DEFAULT_LANG: &str = "import/default_lang";
    /// 模板原型名称
    pub const BASE_TEMPLATE: &str = "import/base_template";
}

/// 默认翻译语言
pub const DEFAULT_LANG: &str = "FRA";

const GLOBAL_SCOPE: &str = "global";

// ==========================================
// ImportConfig - 单次导入运行的配置快照
// ==========================================
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImportConfig {
    pub default_lang: String,
    pub base_template: String,
}

impl Default for ImportConfig {
    fn default() -> Self {
        Self {
            default_lang: DEFAULT_LANG.to_string(),
            base_template: BASE_TEMPLATE_NAME.to_string(),
        }
    }
}

// ==========================================
// ConfigManager - 配置管理器
// ==========================================
pub struct ConfigManager {
    conn: Arc<Mutex<Connection>>,
}

impl ConfigManager {
    pub fn from_connection(conn: Arc<Mutex<Connection>>) -> Self {
        Self { conn }
    }

    /// 从 config_kv 表读取配置值（scope_id='global'）
    fn get_config_value(&self, key: &str) -> RepositoryResult<Option<String>> {
        let conn = self
            .conn
            .lock()
            .map_err(|e| RepositoryError::LockError(e.to_string()))?;

        let value = conn
            .query_row(
                "SELECT value FROM config_kv WHERE scope_id = ?1 AND key = ?2",
                params![GLOBAL_SCOPE, key],
                |row| row.get::<_, String>(0),
            )
            .optional()?;
        Ok(value.map(|v| v.trim().to_string()).filter(|v| !v.is_empty()))
    }

    fn get_config_or_default(&self, key: &str, default: &str) -> RepositoryResult<String> {
        Ok(self
            .get_config_value(key)?
            .unwrap_or_else(|| default.to_string()))
    }

    /// 写入 global scope 配置
    pub fn set_config_value(&self, key: &str, value: &str) -> RepositoryResult<()> {
        let conn = self
            .conn
            .lock()
            .map_err(|e| RepositoryError::LockError(e.to_string()))?;
        conn.execute(
            r#"
            INSERT INTO config_kv (scope_id, key, value) VALUES (?1, ?2, ?3)
            ON CONFLICT(scope_id, key) DO UPDATE SET
                value = excluded.value,
                updated_at = datetime('now')
            "#,
            params![GLOBAL_SCOPE, key, value],
        )?;
        Ok(())
    }

    /// 读取导入配置快照
    pub fn load_import_config(&self) -> RepositoryResult<ImportConfig> {
        let defaults = ImportConfig::default();
        Ok(ImportConfig {
            default_lang: self.get_config_or_default(config_keys::DEFAULT_LANG, &defaults.default_lang)?,
            base_template: self
                .get_config_or_default(config_keys::BASE_TEMPLATE, &defaults.base_template)?,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::init_catalog_schema;

    fn manager() -> ConfigManager {
        let conn = Connection::open_in_memory().unwrap();
        init_catalog_schema(&conn).unwrap();
        ConfigManager::from_connection(Arc::new(Mutex::new(conn)))
    }

    #[test]
    fn test_defaults_when_empty() {
        let config = manager().load_import_config().unwrap();
        assert_eq!(config, ImportConfig::default());
        assert_eq!(config.default_lang, "FRA");
        assert_eq!(config.base_template, "Base");
    }

    #[test]
    fn test_overrides_from_config_kv() {
        let manager = manager();
        manager.set_config_value(config_keys::DEFAULT_LANG, "ENU").unwrap();
        manager.set_config_value(config_keys::BASE_TEMPLATE, " ").unwrap();

        let config = manager.load_import_config().unwrap();
        assert_eq!(config.default_lang, "ENU");
        // 空白值回退默认
        assert_eq!(config.base_template, "Base");
    }
}
