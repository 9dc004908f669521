// ==========================================
// 元数据导入器 - 值列表文件（6 列）
// ==========================================
// 列: 模块, 列表代码, 条目代码, 条目标签, 语言, 翻译值
// 规则: 列表按名称 upsert（新建时不预置条目）；
//       条目按 (列表, 代码) upsert，排序号 = 行号；
//       翻译按 (条目, 语言) upsert
// ==========================================

use crate::domain::RowStage;
use crate::importer::entity_resolver::EntityResolver;
use crate::importer::error::{ImportError, ImportResult, RowFailure};
use crate::importer::line_adapter::LineAdapter;
use crate::importer::run_journal::ImportSink;
use std::sync::Arc;
use tracing::debug;

pub const COLUMN_COUNT: usize = 6;
const IDX_MODULE: usize = 0;
const IDX_LIST: usize = 1;
const IDX_CODE: usize = 2;
const IDX_LABEL: usize = 3;
const IDX_LANG: usize = 4;
const IDX_VALUE: usize = 5;

pub struct ListImporter {
    resolver: Arc<EntityResolver>,
}

impl ListImporter {
    pub fn new(resolver: Arc<EntityResolver>) -> Self {
        Self { resolver }
    }

    fn process_row(&self, line_number: u64, values: &[String], stage: &mut RowStage) -> ImportResult<String> {
        *stage = RowStage::ParsingRow;
        if values.len() != COLUMN_COUNT {
            return Err(ImportError::MalformedRow(format!(
                "期望 {} 列，实际 {} 列",
                COLUMN_COUNT,
                values.len()
            )));
        }
        let list_name = values[IDX_LIST].trim();
        let code = values[IDX_CODE].trim();
        if list_name.is_empty() || code.is_empty() {
            return Err(ImportError::MalformedRow("列表代码或条目代码为空".to_string()));
        }

        *stage = RowStage::ResolvingModule;
        let module = self.resolver.module_by_name(values[IDX_MODULE].trim())?;

        *stage = RowStage::ResolvingList;
        let list = self.resolver.upsert_list(list_name, module.module_id)?;

        *stage = RowStage::UpsertingItem;
        let item = self.resolver.upsert_list_item(
            list.entity.list_id,
            code,
            values[IDX_LABEL].trim(),
            line_number as i64,
            module.module_id,
        )?;
        self.resolver
            .upsert_item_value(item.entity.item_id, values[IDX_LANG].trim(), values[IDX_VALUE].trim())?;

        debug!(list = %list.entity.name, code, created = item.created, "值列表条目已写入");
        *stage = RowStage::Done;
        Ok(format!("{}/{}", list.entity.name, code))
    }
}

impl LineAdapter for ListImporter {
    fn name(&self) -> &'static str {
        "lists"
    }

    fn pre_process(&mut self, _sink: &mut dyn ImportSink) -> ImportResult<()> {
        Ok(())
    }

    fn process_values(
        &mut self,
        line_number: u64,
        values: &[String],
        sink: &mut dyn ImportSink,
    ) -> Result<(), RowFailure> {
        let mut stage = RowStage::Idle;
        match self.process_row(line_number, values, &mut stage) {
            Ok(key) => {
                sink.append_log(&format!("=== Line #{} done : item {}", line_number, key));
                Ok(())
            }
            Err(error) => Err(RowFailure {
                line: line_number,
                stage,
                error,
            }),
        }
    }

    fn post_process(&mut self, _sink: &mut dyn ImportSink) {}
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::importer::run_journal::RunJournal;
    use crate::repository::Catalog;

    fn importer() -> ListImporter {
        let catalog = Catalog::open(":memory:").unwrap();
        catalog.modules.insert("Demo", "dem").unwrap();
        ListImporter::new(Arc::new(EntityResolver::new(Arc::new(catalog))))
    }

    fn row(values: &[&str]) -> Vec<String> {
        values.iter().map(|v| v.to_string()).collect()
    }

    #[test]
    fn test_failure_records_stage() {
        let mut importer = importer();
        let mut journal = RunJournal::new("t");

        let failure = importer
            .process_values(2, &row(&["Nope", "COLOR", "R", "Red", "FRA", "Rouge"]), &mut journal)
            .unwrap_err();
        assert_eq!(failure.stage, RowStage::ResolvingModule);
        assert!(matches!(failure.error, ImportError::ModuleNotFound(_)));

        let failure = importer
            .process_values(3, &row(&["Demo", "COLOR"]), &mut journal)
            .unwrap_err();
        assert_eq!(failure.stage, RowStage::ParsingRow);
    }

    #[test]
    fn test_item_order_is_line_number() {
        let mut importer = importer();
        let mut journal = RunJournal::new("t");

        importer
            .process_values(7, &row(&["Demo", "COLOR", "R", "Red", "FRA", "Rouge"]), &mut journal)
            .unwrap();

        let catalog = importer.resolver.catalog();
        let list = catalog.lists.find_list_by_name("COLOR").unwrap().unwrap();
        let items = catalog.lists.list_items(list.list_id).unwrap();
        assert_eq!(items.len(), 1);
        assert_eq!(items[0].order_by, 7);
        let value = catalog.lists.find_value(items[0].item_id, "FRA").unwrap().unwrap();
        assert_eq!(value.value, "Rouge");
    }
}
