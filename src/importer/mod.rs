// ==========================================
// 元数据导入器 - 导入层
// ==========================================
// 职责: 读取 CSV 规格文件，生成对象/属性/值列表/模板元数据
// 支持: 元数据文件（7 列）、值列表文件（6 列）
// ==========================================

// 模块声明
pub mod aggregate;
pub mod entity_resolver;
pub mod error;
pub mod finalizer;
pub mod line_adapter;
pub mod list_importer;
pub mod naming;
pub mod param_importer;
pub mod run_journal;
pub mod type_resolver;

// 重导出核心类型
pub use aggregate::{RunAggregate, FIELD_ORDER_STEP};
pub use entity_resolver::{EntityResolver, ObjectRequest, Upserted};
pub use error::{ImportError, ImportResult, RowFailure};
pub use finalizer::TemplateFinalizer;
pub use line_adapter::{run_line_adapter, LineAdapter, CSV_SEPARATOR};
pub use list_importer::ListImporter;
pub use param_importer::ParamImporter;
pub use run_journal::{ImportSink, RunJournal};
pub use type_resolver::TypeResolver;
