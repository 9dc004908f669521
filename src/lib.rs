// ==========================================
// 元数据导入器 - 核心库
// ==========================================
// 技术栈: Rust + SQLite
// 系统定位: 批量元数据编译器（CSV 规格 → 目录元数据）
// ==========================================

// ==========================================
// 模块声明
// ==========================================

// 领域层 - 实体与类型
pub mod domain;

// 数据仓储层 - 数据访问
pub mod repository;

// 导入层 - 行处理/名称派生/模板收尾
pub mod importer;

// 配置层 - 导入配置
pub mod config;

// 数据库基础设施（连接初始化/PRAGMA/schema）
pub mod db;

// 日志系统
pub mod logging;

// API 层 - 异步导入接口
pub mod api;

// ==========================================
// 重导出核心类型
// ==========================================

pub use api::{ApiError, ImportApi};
pub use domain::{FieldType, ImportReport, RowStage, RunStatus};
pub use importer::{EntityResolver, ImportError, ListImporter, ParamImporter};
pub use repository::Catalog;

// ==========================================
// 常量定义
// ==========================================

// 系统版本
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

// 系统名称
pub const APP_NAME: &str = "元数据导入器";

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_version() {
        assert!(!VERSION.is_empty());
    }
}
