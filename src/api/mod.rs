// ==========================================
// 元数据导入器 - API层
// ==========================================
// 职责: 对外业务接口，把导入运行放到阻塞线程池执行
// ==========================================

pub mod error;
pub mod import_api;

pub use error::{ApiError, ApiResult};
pub use import_api::ImportApi;
