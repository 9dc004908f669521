// ==========================================
// 元数据导入器 - 导入模块错误类型
// ==========================================
// 工具: thiserror 派生宏
// 传播: 行级错误在行处理器边界捕获，不中断后续行
// ==========================================

use crate::domain::RowStage;
use crate::repository::RepositoryError;
use thiserror::Error;

/// 导入模块错误类型
#[derive(Error, Debug)]
pub enum ImportError {
    // ===== 文件相关错误（运行级）=====
    #[error("文件不存在: {0}")]
    FileNotFound(String),

    #[error("文件读取失败: {0}")]
    FileReadError(String),

    // ===== 行级错误 =====
    #[error("行格式错误: {0}")]
    MalformedRow(String),

    #[error("模块不存在: {0}")]
    ModuleNotFound(String),

    #[error("模块前缀为空: 模块 #{0}")]
    ModulePrefixMissing(i64),

    #[error("未知属性类型: {0}")]
    UnknownType(String),

    #[error("对象 {object} 与目录中已有记录不一致: {message}")]
    EntityMismatch { object: String, message: String },

    #[error(transparent)]
    Persistence(#[from] RepositoryError),

    // ===== 模板收尾错误 =====
    #[error("模板生成失败 (对象 {object}): {message}")]
    TemplateError { object: String, message: String },
}

// 实现 From<std::io::Error>
impl From<std::io::Error> for ImportError {
    fn from(err: std::io::Error) -> Self {
        ImportError::FileReadError(err.to_string())
    }
}

/// Result 类型别名
pub type ImportResult<T> = Result<T, ImportError>;

// ==========================================
// RowFailure - 行级失败（附带到达的阶段）
// ==========================================
#[derive(Error, Debug)]
#[error("第 {line} 行在 {stage} 阶段失败: {error}")]
pub struct RowFailure {
    pub line: u64,
    pub stage: RowStage,
    #[source]
    pub error: ImportError,
}
