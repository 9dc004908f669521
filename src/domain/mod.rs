// ==========================================
// 元数据导入器 - 领域层
// ==========================================
// 职责: 目录实体、类型码、导入运行模型
// 红线: 不含数据访问
// ==========================================

pub mod catalog;
pub mod import_run;
pub mod types;

pub use catalog::{
    FieldEntity, FieldListEntity, FieldTranslation, ListItemEntity, ListItemValueEntity,
    ModuleEntity, ObjectEntity, ObjectFieldEntity, ObjectTranslation, TemplateEntity,
    TemplateFieldEntity,
};
pub use import_run::{ImportReport, RowStage};
pub use types::{FieldType, RunStatus, LAST_TYPE_CODE};
