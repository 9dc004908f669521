// ==========================================
// 元数据导入器 - 模板收尾
// ==========================================
// 时机: 所有数据行处理完后执行一次
// 流程: 加载基础模板（原型）→ 对每个有属性的对象:
//       upsert 同名模板（复制 ui）→ 关联对象 → 写入成员位置 1..N
// 失败: 记为运行级错误；单个对象失败不影响其它对象，也不回滚已提交的行
// ==========================================

use crate::domain::{ObjectEntity, RunStatus, TemplateEntity};
use crate::importer::aggregate::RunAggregate;
use crate::importer::entity_resolver::EntityResolver;
use crate::importer::error::{ImportError, ImportResult};
use crate::importer::run_journal::ImportSink;
use tracing::{debug, instrument};

pub struct TemplateFinalizer<'a> {
    resolver: &'a EntityResolver,
    base_template: &'a str,
}

impl<'a> TemplateFinalizer<'a> {
    pub fn new(resolver: &'a EntityResolver, base_template: &'a str) -> Self {
        Self {
            resolver,
            base_template,
        }
    }

    /// 返回成功生成模板的对象数
    #[instrument(skip_all, fields(base = %self.base_template, objects = aggregate.object_count()))]
    pub fn finalize(&self, aggregate: &RunAggregate, sink: &mut dyn ImportSink) -> usize {
        let base = match self.load_base() {
            Ok(base) => base,
            Err(e) => {
                sink.append_error(&e.to_string());
                sink.set_status(RunStatus::ImportError);
                return 0;
            }
        };

        let mut built = 0;
        for (name, object, fields) in aggregate.template_entries() {
            let result = match object {
                Some(object) => self.finalize_object(&base, object, fields),
                None => Err(ImportError::TemplateError {
                    object: name.to_string(),
                    message: "对象未被缓存".to_string(),
                }),
            };
            match result {
                Ok(()) => {
                    built += 1;
                    sink.append_log(&format!(
                        "=== Template {} : {} field(s)",
                        name,
                        fields.len()
                    ));
                }
                Err(e) => {
                    sink.append_error(&e.to_string());
                    sink.set_status(RunStatus::ImportError);
                }
            }
        }
        built
    }

    fn load_base(&self) -> ImportResult<TemplateEntity> {
        self.resolver
            .find_template(self.base_template)?
            .ok_or_else(|| ImportError::TemplateError {
                object: self.base_template.to_string(),
                message: format!("基础模板 {} 不存在", self.base_template),
            })
    }

    fn finalize_object(
        &self,
        base: &TemplateEntity,
        object: &ObjectEntity,
        fields: &[String],
    ) -> ImportResult<()> {
        let wrap = |e: ImportError| match e {
            ImportError::TemplateError { .. } => e,
            other => ImportError::TemplateError {
                object: object.name.clone(),
                message: other.to_string(),
            },
        };

        let template = self
            .resolver
            .upsert_template(&object.name, &base.ui, object.module_id)
            .map_err(wrap)?;
        let template_id = template.entity.template_id;

        let relinked = self
            .resolver
            .link_object_template(object.object_id, template_id)
            .map_err(wrap)?;
        self.resolver
            .assign_template_fields(template_id, fields)
            .map_err(wrap)?;

        debug!(
            object = %object.name,
            template_id,
            created = template.created,
            relinked,
            "模板收尾完成"
        );
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::BASE_TEMPLATE_UI;
    use crate::importer::entity_resolver::ObjectRequest;
    use crate::importer::run_journal::RunJournal;
    use crate::repository::Catalog;
    use std::sync::Arc;

    fn setup() -> (EntityResolver, RunAggregate) {
        let catalog = Catalog::open(":memory:").unwrap();
        catalog.modules.insert("Demo", "dem").unwrap();
        let resolver = EntityResolver::new(Arc::new(catalog));
        let module = resolver.module_by_name("Demo").unwrap();

        let object = resolver
            .resolve_object(&ObjectRequest {
                name: "DemOrder",
                label: "Commande",
                prefix: "ord",
                module: &module,
                lang: "FRA",
            })
            .unwrap()
            .entity;

        let mut aggregate = RunAggregate::new();
        aggregate.remember_object(object);
        aggregate.add_for_template("DemOrder", "demOrdNumber");
        aggregate.add_for_template("DemOrder", "demOrdDate");
        (resolver, aggregate)
    }

    #[test]
    fn test_template_built_from_base() {
        let (resolver, aggregate) = setup();
        let mut journal = RunJournal::new("t");

        let built = TemplateFinalizer::new(&resolver, "Base").finalize(&aggregate, &mut journal);

        assert_eq!(built, 1);
        assert_eq!(journal.status(), RunStatus::Running);

        let template = resolver.find_template("DemOrder").unwrap().unwrap();
        assert_eq!(template.ui, BASE_TEMPLATE_UI);
        let object = resolver.catalog().objects.find_by_name("DemOrder").unwrap().unwrap();
        assert_eq!(object.template_id, Some(template.template_id));

        let members: Vec<(String, i64)> = resolver
            .catalog()
            .templates
            .list_fields(template.template_id)
            .unwrap()
            .into_iter()
            .map(|f| (f.field_name, f.position))
            .collect();
        assert_eq!(
            members,
            vec![("demOrdNumber".to_string(), 1), ("demOrdDate".to_string(), 2)]
        );
    }

    #[test]
    fn test_missing_base_template_is_run_error() {
        let (resolver, aggregate) = setup();
        let mut journal = RunJournal::new("t");

        let built = TemplateFinalizer::new(&resolver, "Nope").finalize(&aggregate, &mut journal);

        assert_eq!(built, 0);
        assert_eq!(journal.status(), RunStatus::ImportError);
        assert_eq!(journal.errors().len(), 1);
        assert!(resolver.find_template("DemOrder").unwrap().is_none());
    }
}
