// ==========================================
// 元数据导入器 - 属性类型解析
// ==========================================
// 职责: 类型标签 → 类型码映射（运行开始时构建一次）
// 规则: 按类型码升序枚举，丢弃第一个 "(" 之后的参数后缀
//       例: "DECIMAL(p,s)" 以 "DECIMAL" 为键
// ==========================================

use crate::domain::FieldType;
use crate::importer::error::{ImportError, ImportResult};
use std::collections::HashMap;
use tracing::debug;

pub struct TypeResolver {
    types: HashMap<String, FieldType>,
}

/// 去掉参数后缀
fn base_label(label: &str) -> &str {
    label.split('(').next().unwrap_or(label)
}

impl TypeResolver {
    pub fn build() -> Self {
        let mut types = HashMap::new();
        for field_type in FieldType::ALL {
            let key = base_label(field_type.label()).to_string();
            debug!(code = field_type.code(), label = %key, "注册属性类型");
            types.insert(key, field_type);
        }
        Self { types }
    }

    pub fn resolve(&self, label: &str) -> ImportResult<FieldType> {
        self.types
            .get(label)
            .copied()
            .ok_or_else(|| ImportError::UnknownType(label.to_string()))
    }

    pub fn len(&self) -> usize {
        self.types.len()
    }

    pub fn is_empty(&self) -> bool {
        self.types.is_empty()
    }
}
