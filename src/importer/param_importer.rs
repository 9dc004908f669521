// ==========================================
// 元数据导入器 - 对象/属性元数据文件（7 列）
// ==========================================
// 列: 模块, 对象标签, 对象前缀, 属性标签, 属性帮助, 类型标签, 长度
// 行状态机:
//   ParsingRow → ResolvingModule → ResolvingObject
//   → CreatingAttribute → RecordingAggregate → Done
// 失败: 任意阶段失败只影响当前行（已创建的记录不回滚）
// 收尾: 所有行处理完后由 TemplateFinalizer 生成模板
// ==========================================

use crate::config::ImportConfig;
use crate::domain::{FieldEntity, ModuleEntity, ObjectEntity, RowStage};
use crate::importer::aggregate::RunAggregate;
use crate::importer::entity_resolver::{validate_object, EntityResolver, ObjectRequest};
use crate::importer::error::{ImportError, ImportResult, RowFailure};
use crate::importer::finalizer::TemplateFinalizer;
use crate::importer::line_adapter::LineAdapter;
use crate::importer::naming::{
    derive_attribute_name, derive_object_name, is_blank_label, to_list_name, to_physical_name,
};
use crate::importer::run_journal::ImportSink;
use crate::importer::type_resolver::TypeResolver;
use crate::repository::NewField;
use std::sync::Arc;
use tracing::{debug, info};

// ===== 列索引 =====
pub const COLUMN_COUNT: usize = 7;
const IDX_MODULE: usize = 0;
const IDX_OBJECT_LABEL: usize = 1;
const IDX_OBJECT_PREFIX: usize = 2;
const IDX_ATTRIBUTE_LABEL: usize = 3;
const IDX_ATTRIBUTE_HELP: usize = 4;
const IDX_TYPE_LABEL: usize = 5;
const IDX_LENGTH: usize = 6;

/// 一个已校验列数的数据行
#[derive(Debug)]
struct ParamRow<'a> {
    module: &'a str,
    object_label: &'a str,
    object_prefix: String,
    attribute_label: &'a str,
    attribute_help: &'a str,
    type_label: &'a str,
    size: Option<i32>,
}

fn parse_row(values: &[String]) -> ImportResult<ParamRow<'_>> {
    if values.len() != COLUMN_COUNT {
        return Err(ImportError::MalformedRow(format!(
            "期望 {} 列，实际 {} 列",
            COLUMN_COUNT,
            values.len()
        )));
    }

    let length = values[IDX_LENGTH].trim();
    let size = if length.is_empty() {
        None
    } else {
        Some(length.parse::<i32>().map_err(|_| {
            ImportError::MalformedRow(format!("长度不是整数: {}", length))
        })?)
    };

    let row = ParamRow {
        module: values[IDX_MODULE].trim(),
        object_label: values[IDX_OBJECT_LABEL].trim(),
        object_prefix: values[IDX_OBJECT_PREFIX].trim().to_lowercase(),
        attribute_label: values[IDX_ATTRIBUTE_LABEL].trim(),
        attribute_help: values[IDX_ATTRIBUTE_HELP].trim(),
        type_label: values[IDX_TYPE_LABEL].trim(),
        size,
    };

    if is_blank_label(row.object_label) {
        return Err(ImportError::MalformedRow("对象标签为空".to_string()));
    }
    if is_blank_label(row.attribute_label) {
        return Err(ImportError::MalformedRow("属性标签为空".to_string()));
    }
    Ok(row)
}

pub struct ParamImporter {
    resolver: Arc<EntityResolver>,
    config: ImportConfig,
    types: Option<TypeResolver>,
    aggregate: RunAggregate,
    templates_built: usize,
}

impl ParamImporter {
    pub fn new(resolver: Arc<EntityResolver>, config: ImportConfig) -> Self {
        Self {
            resolver,
            config,
            types: None,
            aggregate: RunAggregate::new(),
            templates_built: 0,
        }
    }

    pub fn aggregate(&self) -> &RunAggregate {
        &self.aggregate
    }

    pub fn templates_built(&self) -> usize {
        self.templates_built
    }

    /// 执行一行；stage 随推进更新，失败时停留在出错阶段
    fn process_row(&mut self, values: &[String], stage: &mut RowStage) -> ImportResult<FieldEntity> {
        *stage = RowStage::ParsingRow;
        let row = parse_row(values)?;

        *stage = RowStage::ResolvingModule;
        let module = self.resolver.module_by_name(row.module)?;
        let module_prefix = self.resolver.module_prefix(&module)?;

        *stage = RowStage::ResolvingObject;
        let object = self.resolve_object(&row, &module, &module_prefix)?;

        *stage = RowStage::CreatingAttribute;
        let field = self.create_attribute(&row, &object, &module, &module_prefix)?;

        *stage = RowStage::RecordingAggregate;
        self.aggregate.add_for_template(&object.name, &field.name);

        *stage = RowStage::Done;
        Ok(field)
    }

    /// 运行内缓存优先，其次目录查找，最后新建
    fn resolve_object(
        &mut self,
        row: &ParamRow<'_>,
        module: &ModuleEntity,
        module_prefix: &str,
    ) -> ImportResult<ObjectEntity> {
        let name = derive_object_name(row.object_label, module_prefix);

        if let Some(cached) = self.aggregate.cached_object(&name) {
            validate_object(cached, &row.object_prefix, module)?;
            return Ok(cached.clone());
        }

        let resolved = self.resolver.resolve_object(&ObjectRequest {
            name: &name,
            label: row.object_label,
            prefix: &row.object_prefix,
            module,
            lang: &self.config.default_lang,
        })?;
        self.aggregate.remember_object(resolved.entity.clone());
        Ok(resolved.entity)
    }

    /// 属性 → 属性翻译 → 对象属性关联（依次创建，失败不回滚）
    fn create_attribute(
        &mut self,
        row: &ParamRow<'_>,
        object: &ObjectEntity,
        module: &ModuleEntity,
        module_prefix: &str,
    ) -> ImportResult<FieldEntity> {
        let field_type = self
            .types
            .get_or_insert_with(TypeResolver::build)
            .resolve(row.type_label)?;

        let name = derive_attribute_name(row.attribute_label, &object.prefix, module_prefix);
        let lang = self.config.default_lang.as_str();

        let list_name = if field_type.is_enum() {
            let list = self
                .resolver
                .bootstrap_list(&to_list_name(&name), module.module_id, lang)?;
            Some(list.entity.name)
        } else {
            None
        };

        let field = self.resolver.create_field(&NewField {
            db_name: to_physical_name(&name),
            name,
            field_type,
            size: row.size,
            list_name,
            module_id: module.module_id,
        })?;

        let help = Some(row.attribute_help).filter(|h| !h.is_empty());
        self.resolver
            .upsert_field_translation(field.field_id, lang, row.attribute_label, help)?;

        let order = self.aggregate.next_field_order(&object.name);
        self.resolver
            .create_object_field(object.object_id, field.field_id, order, module.module_id)?;

        debug!(field = %field.name, object = %object.name, order, "属性已创建");
        Ok(field)
    }
}

impl LineAdapter for ParamImporter {
    fn name(&self) -> &'static str {
        "params"
    }

    fn pre_process(&mut self, sink: &mut dyn ImportSink) -> ImportResult<()> {
        let types = TypeResolver::build();
        sink.append_log(&format!("=== {} attribute type(s) registered", types.len()));
        self.types = Some(types);
        self.aggregate = RunAggregate::new();
        self.templates_built = 0;
        Ok(())
    }

    fn process_values(
        &mut self,
        line_number: u64,
        values: &[String],
        sink: &mut dyn ImportSink,
    ) -> Result<(), RowFailure> {
        let mut stage = RowStage::Idle;
        match self.process_row(values, &mut stage) {
            Ok(field) => {
                sink.append_log(&format!(
                    "=== Line #{} done : field {} ({})",
                    line_number, field.name, field.field_type
                ));
                Ok(())
            }
            Err(error) => Err(RowFailure {
                line: line_number,
                stage,
                error,
            }),
        }
    }

    fn post_process(&mut self, sink: &mut dyn ImportSink) {
        let finalizer = TemplateFinalizer::new(&self.resolver, &self.config.base_template);
        self.templates_built = finalizer.finalize(&self.aggregate, sink);
        info!(
            objects = self.aggregate.object_count(),
            templates = self.templates_built,
            "元数据导入收尾完成"
        );
    }
}
