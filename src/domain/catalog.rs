// ==========================================
// 元数据导入器 - 目录实体模型
// ==========================================
// 职责: 模块/对象/属性/翻译/值列表/模板的持久化实体
// 约束: *_id 由数据库分配，插入后立即回读
// ==========================================

use crate::domain::types::FieldType;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

// ==========================================
// ModuleEntity - 模块（只读，不由导入器创建）
// ==========================================
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ModuleEntity {
    pub module_id: i64,
    pub name: String,
    pub prefix: Option<String>, // 2-4 位模块前缀
}

// ==========================================
// ObjectEntity - 业务对象
// ==========================================
// 自然键: name（逻辑名）
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ObjectEntity {
    pub object_id: i64,
    pub name: String,     // 逻辑名，如 ModMyObj
    pub db_table: String, // 物理表名，如 mod_my_obj
    pub prefix: String,   // 对象前缀（小写）
    pub module_id: i64,
    pub template_id: Option<i64>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// 对象翻译，自然键 (object_id, lang)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ObjectTranslation {
    pub translation_id: i64,
    pub object_id: i64,
    pub lang: String,
    pub value: String,
}

// ==========================================
// FieldEntity - 属性
// ==========================================
// 说明: 属性只创建不更新，唯一性由确定性命名保证
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FieldEntity {
    pub field_id: i64,
    pub name: String,
    pub db_name: String,
    pub field_type: FieldType,
    pub size: Option<i32>,
    pub list_name: Option<String>, // 枚举类属性引用的值列表名
    pub module_id: i64,
    pub created_at: DateTime<Utc>,
}

/// 属性翻译，自然键 (field_id, lang)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FieldTranslation {
    pub translation_id: i64,
    pub field_id: i64,
    pub lang: String,
    pub value: String,
    pub simple_help: Option<String>,
}

/// 对象-属性关联
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ObjectFieldEntity {
    pub object_field_id: i64,
    pub object_id: i64,
    pub field_id: i64,
    pub field_order: i64,
    pub module_id: i64,
}

// ==========================================
// 值列表
// ==========================================

/// 值列表，自然键 name
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FieldListEntity {
    pub list_id: i64,
    pub name: String,
    pub module_id: i64,
}

/// 值列表条目，自然键 (list_id, code)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ListItemEntity {
    pub item_id: i64,
    pub list_id: i64,
    pub code: String,
    pub label: String,
    pub order_by: i64,
    pub module_id: i64,
}

/// 条目翻译值，自然键 (item_id, lang)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ListItemValueEntity {
    pub value_id: i64,
    pub item_id: i64,
    pub lang: String,
    pub value: String,
}

// ==========================================
// TemplateEntity - UI 模板
// ==========================================
// 自然键: name（与对象逻辑名一致）
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TemplateEntity {
    pub template_id: i64,
    pub name: String,
    pub ui: String,
    pub image: String,
    pub module_id: Option<i64>,
}

/// 模板成员（属性排列顺序）
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TemplateFieldEntity {
    pub template_id: i64,
    pub field_name: String,
    pub position: i64,
}
