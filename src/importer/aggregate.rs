// ==========================================
// 元数据导入器 - 运行级聚合状态
// ==========================================
// 生命周期: 一次导入运行（开始时构造，结束时丢弃），不持久化
// 内容:
// - 对象逻辑名 → 已加载对象
// - 对象逻辑名 → 属性名序列（按首次出现顺序，供模板收尾）
// - 对象逻辑名 → 最近分配的字段顺序
// ==========================================

use crate::domain::ObjectEntity;
use indexmap::IndexMap;
use std::collections::HashMap;

/// 每个对象第一个属性的顺序，以及之后的步长
pub const FIELD_ORDER_STEP: i64 = 10;

#[derive(Debug, Default)]
pub struct RunAggregate {
    objects: HashMap<String, ObjectEntity>,
    template_fields: IndexMap<String, Vec<String>>,
    field_orders: HashMap<String, i64>,
}

impl RunAggregate {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cached_object(&self, object_name: &str) -> Option<&ObjectEntity> {
        self.objects.get(object_name)
    }

    pub fn remember_object(&mut self, object: ObjectEntity) {
        self.objects.insert(object.name.clone(), object);
    }

    /// 推进并返回对象的下一个字段顺序: 10, 20, 30, ...
    pub fn next_field_order(&mut self, object_name: &str) -> i64 {
        let order = self
            .field_orders
            .get(object_name)
            .map_or(FIELD_ORDER_STEP, |last| last + FIELD_ORDER_STEP);
        self.field_orders.insert(object_name.to_string(), order);
        order
    }

    /// 记录模板成员；同名属性只保留首次出现的位置
    pub fn add_for_template(&mut self, object_name: &str, attribute_name: &str) {
        let fields = self
            .template_fields
            .entry(object_name.to_string())
            .or_default();
        if !fields.iter().any(|f| f == attribute_name) {
            fields.push(attribute_name.to_string());
        }
    }

    /// 有属性记录的对象，按首次出现顺序
    pub fn template_entries(&self) -> impl Iterator<Item = (&str, Option<&ObjectEntity>, &[String])> {
        self.template_fields.iter().map(|(name, fields)| {
            (name.as_str(), self.objects.get(name), fields.as_slice())
        })
    }

    pub fn object_count(&self) -> usize {
        self.objects.len()
    }
}
