// ==========================================
// 元数据导入器 - 命令行入口
// ==========================================
// 子命令: init / module add / params / lists
// 输出: 导入运行报告（JSON，stdout）；运行状态为 IMPORT_ERROR 时退出码非 0
// ==========================================

use anyhow::{Context, Result};
use catalog_importer::{db, logging, ImportApi, ImportReport, APP_NAME, VERSION};
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use std::process::ExitCode;

#[derive(Parser, Debug)]
#[command(name = "catalog-importer", version, about = "从 CSV 规格文件导入目录元数据")]
struct Cli {
    /// 目录数据库路径
    #[arg(long, global = true, env = "CATALOG_IMPORTER_DB_PATH")]
    db: Option<String>,

    /// 以 JSON 格式输出日志（stderr）
    #[arg(long, global = true)]
    json_log: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// 创建目录 schema
    Init,
    /// 模块管理
    Module {
        #[command(subcommand)]
        action: ModuleAction,
    },
    /// 导入对象/属性元数据文件（7 列）
    Params { file: PathBuf },
    /// 导入值列表文件（6 列）
    Lists { file: PathBuf },
}

#[derive(Subcommand, Debug)]
enum ModuleAction {
    /// 新增模块
    Add { name: String, prefix: String },
}

fn print_report(report: &ImportReport) -> Result<ExitCode> {
    let json = serde_json::to_string_pretty(report).context("序列化运行报告失败")?;
    println!("{}", json);
    Ok(if report.is_success() {
        ExitCode::SUCCESS
    } else {
        ExitCode::FAILURE
    })
}

#[tokio::main]
async fn main() -> Result<ExitCode> {
    let cli = Cli::parse();
    logging::init(cli.json_log);

    let db_path = cli.db.unwrap_or_else(db::default_db_path);
    tracing::info!("{} v{}", APP_NAME, VERSION);
    tracing::info!("使用数据库: {}", db_path);

    let api = ImportApi::new(&db_path).with_context(|| format!("无法打开目录数据库: {}", db_path))?;

    match cli.command {
        Command::Init => {
            println!("{}", db_path);
            Ok(ExitCode::SUCCESS)
        }
        Command::Module {
            action: ModuleAction::Add { name, prefix },
        } => {
            let module_id = api.add_module(&name, &prefix)?;
            println!("{}", module_id);
            Ok(ExitCode::SUCCESS)
        }
        Command::Params { file } => {
            let report = api
                .import_param_file(&file)
                .await
                .with_context(|| format!("导入失败: {}", file.display()))?;
            print_report(&report)
        }
        Command::Lists { file } => {
            let report = api
                .import_list_file(&file)
                .await
                .with_context(|| format!("导入失败: {}", file.display()))?;
            print_report(&report)
        }
    }
}
