// ==========================================
// 元数据导入器 - 运行日志与状态
// ==========================================
// 职责: 导入运行的日志/错误流（只写）与运行状态（最后一次写入生效）
// 实现: RunJournal 同时写入 tracing 并在内存中保留，供运行报告返回
// ==========================================

use crate::domain::RunStatus;
use tracing::{error, info, warn};

// ==========================================
// ImportSink Trait
// ==========================================
// 用途: 行处理器/收尾阶段的日志与状态出口
// 实现者: RunJournal
pub trait ImportSink {
    fn append_log(&mut self, line: &str);

    fn append_error(&mut self, line: &str);

    fn set_status(&mut self, status: RunStatus);

    fn status(&self) -> RunStatus;
}

#[derive(Debug)]
pub struct RunJournal {
    run_id: String,
    status: RunStatus,
    log: Vec<String>,
    errors: Vec<String>,
}

impl RunJournal {
    pub fn new(run_id: &str) -> Self {
        Self {
            run_id: run_id.to_string(),
            status: RunStatus::Running,
            log: Vec::new(),
            errors: Vec::new(),
        }
    }

    pub fn log(&self) -> &[String] {
        &self.log
    }

    pub fn errors(&self) -> &[String] {
        &self.errors
    }

    pub fn into_lines(self) -> (Vec<String>, Vec<String>) {
        (self.log, self.errors)
    }
}

impl ImportSink for RunJournal {
    fn append_log(&mut self, line: &str) {
        info!(run_id = %self.run_id, "{}", line);
        self.log.push(line.to_string());
    }

    fn append_error(&mut self, line: &str) {
        error!(run_id = %self.run_id, "{}", line);
        self.errors.push(line.to_string());
    }

    fn set_status(&mut self, status: RunStatus) {
        if self.status != status {
            warn!(run_id = %self.run_id, from = %self.status, to = %status, "导入状态变更");
        }
        self.status = status;
    }

    fn status(&self) -> RunStatus {
        self.status
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_last_write_wins() {
        let mut journal = RunJournal::new("r1");
        assert_eq!(journal.status(), RunStatus::Running);
        journal.set_status(RunStatus::ImportError);
        journal.set_status(RunStatus::ImportError);
        assert_eq!(journal.status(), RunStatus::ImportError);
    }

    #[test]
    fn test_lines_are_kept() {
        let mut journal = RunJournal::new("r1");
        journal.append_log("a");
        journal.append_error("b");
        journal.append_log("c");
        assert_eq!(journal.log(), ["a", "c"]);
        assert_eq!(journal.errors(), ["b"]);
    }
}
