// ==========================================
// 元数据导入器 - 按行 CSV 适配器驱动
// ==========================================
// 职责: 读取 CSV（固定逗号分隔），跳过第 1 行表头，逐行交给适配器
// 隔离: 行级失败在此边界记录（行号 + 原始输入），状态置为 ImportError，
//       继续处理下一行；运行永不因单行失败而中止
// 流程: pre_process → process_values × N → post_process → 状态收尾
// ==========================================

use crate::domain::{ImportReport, RowStage, RunStatus};
use crate::importer::error::{ImportError, ImportResult, RowFailure};
use crate::importer::run_journal::{ImportSink, RunJournal};
use chrono::Utc;
use csv::{ReaderBuilder, Trim};
use std::fs::File;
use std::path::Path;
use tracing::instrument;
use uuid::Uuid;

/// 固定分隔符
pub const CSV_SEPARATOR: u8 = b',';

// ==========================================
// LineAdapter Trait
// ==========================================
// 实现者: ParamImporter（元数据文件）, ListImporter（值列表文件）
pub trait LineAdapter {
    fn name(&self) -> &'static str;

    /// 运行开始前初始化（失败则整个文件不处理）
    fn pre_process(&mut self, sink: &mut dyn ImportSink) -> ImportResult<()>;

    /// 处理一个数据行（行号从 1 计，表头不会进入这里）
    fn process_values(
        &mut self,
        line_number: u64,
        values: &[String],
        sink: &mut dyn ImportSink,
    ) -> Result<(), RowFailure>;

    /// 所有行处理完后的收尾
    fn post_process(&mut self, sink: &mut dyn ImportSink);
}

/// 记录一次行失败
pub fn report_row_failure(sink: &mut dyn ImportSink, values: &[String], failure: &RowFailure) {
    sink.append_error(&format!(
        "=== Error at line #{} : {:?}",
        failure.line, values
    ));
    sink.append_error(&failure.to_string());
    sink.set_status(RunStatus::ImportError);
}

/// 对单个 CSV 文件运行适配器
#[instrument(skip_all, fields(adapter = adapter.name(), file = %path.display()))]
pub fn run_line_adapter<A: LineAdapter + ?Sized>(adapter: &mut A, path: &Path) -> ImportResult<ImportReport> {
    if !path.exists() {
        return Err(ImportError::FileNotFound(path.display().to_string()));
    }

    let run_id = Uuid::new_v4().to_string();
    let started_at = Utc::now();
    let mut journal = RunJournal::new(&run_id);
    journal.append_log(&format!("=== Start {} on {}", adapter.name(), path.display()));

    adapter.pre_process(&mut journal)?;

    let file = File::open(path)?;
    let mut reader = ReaderBuilder::new()
        .has_headers(false)
        .flexible(true) // 列数校验由适配器负责
        .delimiter(CSV_SEPARATOR)
        .trim(Trim::All)
        .from_reader(file);

    let mut rows_total = 0usize;
    let mut rows_failed = 0usize;

    let mut last_line = 0u64;
    for (idx, result) in reader.records().enumerate() {
        // 物理行号（空行被读取器跳过，但仍计入行号）
        let position = match &result {
            Ok(record) => record.position(),
            Err(e) => e.position(),
        };
        let line_number = position.map_or(last_line + 1, |p| p.line());
        last_line = line_number;

        let values: Vec<String> = match &result {
            Ok(record) => record.iter().map(str::to_string).collect(),
            Err(_) => Vec::new(),
        };

        if idx == 0 {
            journal.append_log(&format!(
                "=== Ignoring header line (#{}) : {:?}",
                line_number, values
            ));
            continue;
        }

        rows_total += 1;
        journal.append_log(&format!("=== Processing line #{} : {:?}", line_number, values));

        let outcome = match result {
            Ok(_) => adapter.process_values(line_number, &values, &mut journal),
            Err(e) => Err(RowFailure {
                line: line_number,
                stage: RowStage::ParsingRow,
                error: ImportError::MalformedRow(e.to_string()),
            }),
        };

        if let Err(failure) = outcome {
            rows_failed += 1;
            report_row_failure(&mut journal, &values, &failure);
        }
    }

    adapter.post_process(&mut journal);

    if journal.status() == RunStatus::Running {
        journal.set_status(RunStatus::Success);
    }
    let status = journal.status();
    journal.append_log(&format!("End Process with status {}", status));

    let (log, errors) = journal.into_lines();
    Ok(ImportReport {
        run_id,
        adapter: adapter.name().to_string(),
        file: path.display().to_string(),
        status,
        rows_total,
        rows_succeeded: rows_total - rows_failed,
        rows_failed,
        started_at,
        finished_at: Utc::now(),
        log,
        errors,
    })
}
