// ==========================================
// 元数据导入器 - 导入运行模型
// ==========================================
// 职责: 行处理阶段、运行报告
// ==========================================

use crate::domain::types::RunStatus;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

// ==========================================
// RowStage - 行处理状态机阶段
// ==========================================
// Idle → ParsingRow → ResolvingModule → ResolvingObject
//      → CreatingAttribute → RecordingAggregate → Done
// ParsingRow 之后任意阶段均可进入 Failed
// 值列表文件: ParsingRow → ResolvingModule → ResolvingList → UpsertingItem → Done
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RowStage {
    Idle,
    ParsingRow,
    ResolvingModule,
    ResolvingObject,
    CreatingAttribute,
    RecordingAggregate,
    ResolvingList,
    UpsertingItem,
    Done,
}

impl fmt::Display for RowStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            RowStage::Idle => "Idle",
            RowStage::ParsingRow => "ParsingRow",
            RowStage::ResolvingModule => "Resolving(Module)",
            RowStage::ResolvingObject => "Resolving(Object)",
            RowStage::CreatingAttribute => "CreatingAttribute",
            RowStage::RecordingAggregate => "RecordingAggregate",
            RowStage::ResolvingList => "Resolving(List)",
            RowStage::UpsertingItem => "UpsertingItem",
            RowStage::Done => "Done",
        };
        write!(f, "{}", s)
    }
}

// ==========================================
// ImportReport - 单次导入运行结果
// ==========================================
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ImportReport {
    pub run_id: String,
    pub adapter: String,
    pub file: String,
    pub status: RunStatus,
    pub rows_total: usize, // 不含表头
    pub rows_succeeded: usize,
    pub rows_failed: usize,
    pub started_at: DateTime<Utc>,
    pub finished_at: DateTime<Utc>,
    pub log: Vec<String>,
    pub errors: Vec<String>,
}

impl ImportReport {
    pub fn is_success(&self) -> bool {
        self.status == RunStatus::Success
    }
}
