// ==========================================
// 元数据导入器 - 实体解析/Upsert
// ==========================================
// 职责: 按自然键查找实体，存在则复用并仅更新可变字段，不存在则新建
// 并发: 每类实体一把互斥锁，覆盖 "查找 → 修改 → 持久化" 全过程，
//       避免两次并发创建同名新实体都观察到 "不存在"
// 锁顺序: template → object → translation；list → item → item_value
// 说明: 每次持久化后立即回读行 ID，供依赖实体引用
// ==========================================

use crate::domain::{
    FieldEntity, FieldListEntity, FieldTranslation, ListItemEntity, ListItemValueEntity,
    ModuleEntity, ObjectEntity, ObjectFieldEntity, TemplateEntity,
};
use crate::importer::error::{ImportError, ImportResult};
use crate::importer::naming::to_physical_name;
use crate::repository::{Catalog, NewField, NewObject, RepositoryError};
use std::sync::{Arc, Mutex, MutexGuard};
use tracing::{debug, info};

/// 值列表初始化时预置的条目代码
pub const BOOTSTRAP_ITEM_CODES: [&str; 3] = ["A", "B", "C"];

/// 预置条目的排序步长
pub const BOOTSTRAP_ORDER_STEP: i64 = 10;

/// Upsert 结果
#[derive(Debug, Clone)]
pub struct Upserted<T> {
    pub entity: T,
    pub created: bool,
}

impl<T> Upserted<T> {
    fn created(entity: T) -> Self {
        Self { entity, created: true }
    }

    fn found(entity: T) -> Self {
        Self { entity, created: false }
    }
}

/// 对象解析请求
#[derive(Debug, Clone)]
pub struct ObjectRequest<'a> {
    pub name: &'a str,
    pub label: &'a str,
    pub prefix: &'a str,
    pub module: &'a ModuleEntity,
    pub lang: &'a str,
}

/// 校验已有对象与当前行的前缀/模块一致
pub fn validate_object(existing: &ObjectEntity, prefix: &str, module: &ModuleEntity) -> ImportResult<()> {
    if existing.prefix.to_lowercase() != prefix {
        return Err(ImportError::EntityMismatch {
            object: existing.name.clone(),
            message: format!("对象前缀不一致: 已有 {}, 当前行 {}", existing.prefix, prefix),
        });
    }
    if existing.module_id != module.module_id {
        return Err(ImportError::EntityMismatch {
            object: existing.name.clone(),
            message: format!(
                "对象模块不一致: 已有模块 #{}, 当前行模块 {} (#{})",
                existing.module_id, module.name, module.module_id
            ),
        });
    }
    Ok(())
}

pub struct EntityResolver {
    catalog: Arc<Catalog>,
    object_lock: Mutex<()>,
    translation_lock: Mutex<()>,
    field_lock: Mutex<()>,
    object_field_lock: Mutex<()>,
    list_lock: Mutex<()>,
    item_lock: Mutex<()>,
    item_value_lock: Mutex<()>,
    template_lock: Mutex<()>,
}

fn guard<'a>(lock: &'a Mutex<()>, kind: &str) -> ImportResult<MutexGuard<'a, ()>> {
    lock.lock()
        .map_err(|e| RepositoryError::LockError(format!("{}: {}", kind, e)).into())
}

impl EntityResolver {
    pub fn new(catalog: Arc<Catalog>) -> Self {
        Self {
            catalog,
            object_lock: Mutex::new(()),
            translation_lock: Mutex::new(()),
            field_lock: Mutex::new(()),
            object_field_lock: Mutex::new(()),
            list_lock: Mutex::new(()),
            item_lock: Mutex::new(()),
            item_value_lock: Mutex::new(()),
            template_lock: Mutex::new(()),
        }
    }

    pub fn catalog(&self) -> &Catalog {
        &self.catalog
    }

    // ==========================================
    // 模块（只读）
    // ==========================================

    pub fn module_by_name(&self, name: &str) -> ImportResult<ModuleEntity> {
        self.catalog
            .modules
            .find_by_name(name)?
            .ok_or_else(|| ImportError::ModuleNotFound(name.to_string()))
    }

    pub fn module_prefix(&self, module: &ModuleEntity) -> ImportResult<String> {
        self.catalog
            .modules
            .module_prefix(module.module_id)?
            .ok_or(ImportError::ModulePrefixMissing(module.module_id))
    }

    // ==========================================
    // 业务对象
    // ==========================================

    /// 解析或创建对象；新建时同时创建默认语言翻译
    pub fn resolve_object(&self, request: &ObjectRequest<'_>) -> ImportResult<Upserted<ObjectEntity>> {
        let _guard = guard(&self.object_lock, "object")?;

        if let Some(existing) = self.catalog.objects.find_by_name(request.name)? {
            validate_object(&existing, request.prefix, request.module)?;
            debug!(object = %existing.name, object_id = existing.object_id, "复用目录中已有对象");
            return Ok(Upserted::found(existing));
        }

        let object = self.catalog.objects.insert(&NewObject {
            name: request.name.to_string(),
            db_table: to_physical_name(request.name),
            prefix: request.prefix.to_string(),
            module_id: request.module.module_id,
        })?;
        info!(object = %object.name, table = %object.db_table, "创建对象");

        self.upsert_object_translation(object.object_id, request.lang, request.label)?;
        Ok(Upserted::created(object))
    }

    fn upsert_object_translation(&self, object_id: i64, lang: &str, value: &str) -> ImportResult<bool> {
        let _guard = guard(&self.translation_lock, "object_translation")?;
        let objects = &self.catalog.objects;
        match objects.find_translation(object_id, lang)? {
            Some(existing) => {
                objects.update_translation(existing.translation_id, value)?;
                Ok(false)
            }
            None => {
                objects.insert_translation(object_id, lang, value)?;
                Ok(true)
            }
        }
    }

    /// 设置对象的模板引用（无变化则不写）
    pub fn link_object_template(&self, object_id: i64, template_id: i64) -> ImportResult<bool> {
        let _guard = guard(&self.object_lock, "object")?;
        let object = self
            .catalog
            .objects
            .find_by_id(object_id)?
            .ok_or_else(|| RepositoryError::NotFound {
                entity: "object_def".to_string(),
                id: object_id.to_string(),
            })?;
        if object.template_id == Some(template_id) {
            return Ok(false);
        }
        self.catalog.objects.update_template(object_id, template_id)?;
        Ok(true)
    }

    // ==========================================
    // 属性（只创建）
    // ==========================================

    pub fn create_field(&self, field: &NewField) -> ImportResult<FieldEntity> {
        let _guard = guard(&self.field_lock, "field")?;
        Ok(self.catalog.fields.insert(field)?)
    }

    pub fn upsert_field_translation(
        &self,
        field_id: i64,
        lang: &str,
        value: &str,
        simple_help: Option<&str>,
    ) -> ImportResult<Upserted<FieldTranslation>> {
        let _guard = guard(&self.translation_lock, "field_translation")?;
        let fields = &self.catalog.fields;
        match fields.find_translation(field_id, lang)? {
            Some(mut existing) => {
                fields.update_translation(existing.translation_id, value, simple_help)?;
                existing.value = value.to_string();
                existing.simple_help = simple_help.map(str::to_string);
                Ok(Upserted::found(existing))
            }
            None => {
                let translation_id = fields.insert_translation(field_id, lang, value, simple_help)?;
                Ok(Upserted::created(FieldTranslation {
                    translation_id,
                    field_id,
                    lang: lang.to_string(),
                    value: value.to_string(),
                    simple_help: simple_help.map(str::to_string),
                }))
            }
        }
    }

    pub fn create_object_field(
        &self,
        object_id: i64,
        field_id: i64,
        field_order: i64,
        module_id: i64,
    ) -> ImportResult<ObjectFieldEntity> {
        let _guard = guard(&self.object_field_lock, "object_field")?;
        Ok(self
            .catalog
            .fields
            .insert_object_field(object_id, field_id, field_order, module_id)?)
    }

    // ==========================================
    // 值列表
    // ==========================================

    /// 按名称解析或创建值列表（不预置条目）
    pub fn upsert_list(&self, name: &str, module_id: i64) -> ImportResult<Upserted<FieldListEntity>> {
        let _guard = guard(&self.list_lock, "field_list")?;
        self.upsert_list_locked(name, module_id)
    }

    fn upsert_list_locked(&self, name: &str, module_id: i64) -> ImportResult<Upserted<FieldListEntity>> {
        let lists = &self.catalog.lists;
        if let Some(existing) = lists.find_list_by_name(name)? {
            return Ok(Upserted::found(existing));
        }
        let list = lists.insert_list(name, module_id)?;
        info!(list = %list.name, "创建值列表");
        Ok(Upserted::created(list))
    }

    /// 枚举属性引用的值列表: 首次创建时预置 A/B/C 三个条目，已存在则不做任何事
    pub fn bootstrap_list(
        &self,
        name: &str,
        module_id: i64,
        lang: &str,
    ) -> ImportResult<Upserted<FieldListEntity>> {
        let _guard = guard(&self.list_lock, "field_list")?;
        let list = self.upsert_list_locked(name.trim(), module_id)?;
        if !list.created {
            return Ok(list);
        }

        for (idx, code) in BOOTSTRAP_ITEM_CODES.iter().enumerate() {
            let label = format!("code {}", code);
            let order = (idx as i64 + 1) * BOOTSTRAP_ORDER_STEP;
            let item = self.upsert_list_item(list.entity.list_id, code, &label, order, module_id)?;
            self.upsert_item_value(item.entity.item_id, lang, &label)?;
        }
        debug!(list = %list.entity.name, "值列表预置条目完成");
        Ok(list)
    }

    /// 按 (list, code) 解析或创建条目；已存在时只更新 label / order
    pub fn upsert_list_item(
        &self,
        list_id: i64,
        code: &str,
        label: &str,
        order_by: i64,
        module_id: i64,
    ) -> ImportResult<Upserted<ListItemEntity>> {
        let _guard = guard(&self.item_lock, "field_list_code")?;
        let lists = &self.catalog.lists;
        match lists.find_item(list_id, code)? {
            Some(mut existing) => {
                lists.update_item(existing.item_id, label, order_by)?;
                existing.label = label.to_string();
                existing.order_by = order_by;
                Ok(Upserted::found(existing))
            }
            None => Ok(Upserted::created(
                lists.insert_item(list_id, code, label, order_by, module_id)?,
            )),
        }
    }

    /// 按 (item, lang) 解析或创建条目翻译值；已存在时只更新 value
    pub fn upsert_item_value(
        &self,
        item_id: i64,
        lang: &str,
        value: &str,
    ) -> ImportResult<Upserted<ListItemValueEntity>> {
        let _guard = guard(&self.item_value_lock, "field_list_value")?;
        let lists = &self.catalog.lists;
        match lists.find_value(item_id, lang)? {
            Some(mut existing) => {
                lists.update_value(existing.value_id, value)?;
                existing.value = value.to_string();
                Ok(Upserted::found(existing))
            }
            None => Ok(Upserted::created(lists.insert_value(item_id, lang, value)?)),
        }
    }

    // ==========================================
    // 模板
    // ==========================================

    pub fn find_template(&self, name: &str) -> ImportResult<Option<TemplateEntity>> {
        Ok(self.catalog.templates.find_by_name(name)?)
    }

    /// 按名称解析或创建模板；已存在且内容无变化时不写
    pub fn upsert_template(
        &self,
        name: &str,
        ui: &str,
        module_id: i64,
    ) -> ImportResult<Upserted<TemplateEntity>> {
        let _guard = guard(&self.template_lock, "template")?;
        let templates = &self.catalog.templates;

        let wanted = |template_id: i64| TemplateEntity {
            template_id,
            name: name.to_string(),
            ui: ui.to_string(),
            image: String::new(),
            module_id: Some(module_id),
        };

        match templates.find_by_name(name)? {
            Some(existing) => {
                let updated = wanted(existing.template_id);
                if updated != existing {
                    templates.update(&updated)?;
                    debug!(template = %name, "模板已更新");
                }
                Ok(Upserted::found(updated))
            }
            None => {
                let template_id = templates.insert(&wanted(0))?;
                info!(template = %name, "创建模板");
                Ok(Upserted::created(wanted(template_id)))
            }
        }
    }

    /// 用本次运行聚合的属性替换模板成员（位置从 1 开始，重名只计一次）
    pub fn assign_template_fields(&self, template_id: i64, field_names: &[String]) -> ImportResult<()> {
        let _guard = guard(&self.template_lock, "template")?;
        self.catalog.templates.replace_fields(template_id, field_names)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn setup() -> (EntityResolver, ModuleEntity) {
        let catalog = Catalog::open(":memory:").unwrap();
        catalog.modules.insert("Demo", "dem").unwrap();
        let resolver = EntityResolver::new(Arc::new(catalog));
        let module = resolver.module_by_name("Demo").unwrap();
        (resolver, module)
    }

    fn request<'a>(module: &'a ModuleEntity, prefix: &'a str) -> ObjectRequest<'a> {
        ObjectRequest {
            name: "DemOrder",
            label: "Commande",
            prefix,
            module,
            lang: "FRA",
        }
    }

    #[test]
    fn test_module_not_found() {
        let (resolver, _) = setup();
        assert!(matches!(
            resolver.module_by_name("Nope"),
            Err(ImportError::ModuleNotFound(_))
        ));
    }

    #[test]
    fn test_object_created_once_with_translation() {
        let (resolver, module) = setup();
        let first = resolver.resolve_object(&request(&module, "ord")).unwrap();
        let second = resolver.resolve_object(&request(&module, "ord")).unwrap();

        assert!(first.created);
        assert!(!second.created);
        assert_eq!(first.entity.object_id, second.entity.object_id);
        assert_eq!(first.entity.db_table, "dem_order");

        let tsl = resolver
            .catalog()
            .objects
            .find_translation(first.entity.object_id, "FRA")
            .unwrap()
            .unwrap();
        assert_eq!(tsl.value, "Commande");
    }

    #[test]
    fn test_object_prefix_mismatch() {
        let (resolver, module) = setup();
        resolver.resolve_object(&request(&module, "ord")).unwrap();
        let err = resolver.resolve_object(&request(&module, "cmd")).unwrap_err();
        assert!(matches!(err, ImportError::EntityMismatch { .. }));

        let stored = resolver.catalog().objects.find_by_name("DemOrder").unwrap().unwrap();
        assert_eq!(stored.prefix, "ord");
    }

    #[test]
    fn test_bootstrap_list_seeds_once() {
        let (resolver, module) = setup();
        let first = resolver.bootstrap_list("DEM_ORD_STATUS", module.module_id, "FRA").unwrap();
        let second = resolver.bootstrap_list("DEM_ORD_STATUS", module.module_id, "FRA").unwrap();

        assert!(first.created);
        assert!(!second.created);
        let items = resolver.catalog().lists.list_items(first.entity.list_id).unwrap();
        let seeded: Vec<(String, i64)> = items.iter().map(|i| (i.code.clone(), i.order_by)).collect();
        assert_eq!(
            seeded,
            vec![("A".to_string(), 10), ("B".to_string(), 20), ("C".to_string(), 30)]
        );
        assert_eq!(items[0].label, "code A");
    }

    #[test]
    fn test_list_item_update_keeps_identity() {
        let (resolver, module) = setup();
        let list = resolver.upsert_list("DEM_COLOR", module.module_id).unwrap();
        let created = resolver
            .upsert_list_item(list.entity.list_id, "R", "Red", 2, module.module_id)
            .unwrap();
        let updated = resolver
            .upsert_list_item(list.entity.list_id, "R", "Rouge", 5, module.module_id)
            .unwrap();

        assert!(created.created);
        assert!(!updated.created);
        assert_eq!(created.entity.item_id, updated.entity.item_id);
        assert_eq!(updated.entity.code, "R");
        assert_eq!(updated.entity.label, "Rouge");
        assert_eq!(updated.entity.order_by, 5);
    }

    #[test]
    fn test_template_upsert_and_link() {
        let (resolver, module) = setup();
        let object = resolver.resolve_object(&request(&module, "ord")).unwrap().entity;

        let template = resolver.upsert_template("DemOrder", "<ui/>", module.module_id).unwrap();
        assert!(template.created);
        assert!(resolver
            .link_object_template(object.object_id, template.entity.template_id)
            .unwrap());
        // 第二次无变化
        assert!(!resolver
            .link_object_template(object.object_id, template.entity.template_id)
            .unwrap());

        let again = resolver.upsert_template("DemOrder", "<ui/>", module.module_id).unwrap();
        assert!(!again.created);
        assert_eq!(again.entity.template_id, template.entity.template_id);
    }
}
