// ==========================================
// 元数据导入器 - 配置层
// ==========================================
// 职责: 导入配置读取（默认语言、模板原型）
// 存储: config_kv 表
// ==========================================

pub mod config_manager;

pub use config_manager::{config_keys, ConfigManager, ImportConfig, DEFAULT_LANG};
