// ==========================================
// ChemLizer - 命令行入口
// ==========================================
// 职责: 解析命令 → 令牌认证 → 调用 API → 输出 JSON
// 输出: 标准输出为 JSON 结果，日志写标准错误
// ==========================================

use std::path::PathBuf;

use anyhow::{anyhow, Context, Result};
use chemlizer::app::{get_default_db_path, AppState};
use chemlizer::domain::User;
use chemlizer::logging;
use clap::{Parser, Subcommand};
use serde::Serialize;

#[derive(Parser)]
#[command(author, version, about = "ChemLizer 化工设备数据分析")]
struct Cli {
    /// 数据库文件路径（默认: CHEMLIZER_DB_PATH 或用户数据目录）
    #[arg(long, global = true)]
    db: Option<String>,

    /// 会话令牌
    #[arg(long, global = true, env = "CHEMLIZER_TOKEN", hide_env_values = true)]
    token: Option<String>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// 注册新用户
    Register { username: String, password: String },
    /// 登录并输出会话令牌
    Login { username: String, password: String },
    /// 注销当前令牌
    Logout,
    /// 上传设备 CSV
    Upload { file: PathBuf },
    /// 当前上传的设备行
    Data,
    /// 当前上传的摘要
    Summary,
    /// 最近上传历史
    History,
    /// 删除一条上传记录
    Delete { upload_id: i64 },
    /// 生成当前上传的报表
    Report {
        #[arg(long, default_value = ".")]
        out: PathBuf,
    },
    /// 读写运行配置
    Config {
        #[command(subcommand)]
        action: ConfigCommand,
    },
}

#[derive(Subcommand)]
enum ConfigCommand {
    /// 读取配置（不指定 key 时列出全部）
    Get { key: Option<String> },
    /// 写入配置
    Set { key: String, value: String },
}

fn print_json<T: Serialize>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

fn require_user(state: &AppState, token: Option<&str>) -> Result<User> {
    let token = token.ok_or_else(|| anyhow!("需要登录: 请提供 --token 或设置 CHEMLIZER_TOKEN"))?;
    Ok(state.auth_api.authenticate(token)?)
}

#[tokio::main]
async fn main() -> Result<()> {
    logging::init();

    let cli = Cli::parse();
    let db_path = cli.db.clone().unwrap_or_else(get_default_db_path);
    tracing::debug!(db_path = %db_path, version = chemlizer::VERSION, "启动");

    let state = AppState::new(db_path).map_err(|e| anyhow!(e))?;
    let token = cli.token.as_deref();

    match cli.command {
        Command::Register { username, password } => {
            let user = state.auth_api.register(&username, &password)?;
            print_json(&user)?;
        }
        Command::Login { username, password } => {
            let session = state.auth_api.login(&username, &password)?;
            print_json(&session)?;
        }
        Command::Logout => {
            let token = token.ok_or_else(|| anyhow!("需要登录: 请提供 --token 或设置 CHEMLIZER_TOKEN"))?;
            state.auth_api.logout(token)?;
            print_json(&serde_json::json!({ "message": "Logged out" }))?;
        }
        Command::Upload { file } => {
            let user = require_user(&state, token)?;
            let response = state.upload_api.upload_file(&user, &file).await?;
            print_json(&response)?;
        }
        Command::Data => {
            let user = require_user(&state, token)?;
            print_json(&state.equipment_api.rows_for_current(&user)?)?;
        }
        Command::Summary => {
            let user = require_user(&state, token)?;
            print_json(&state.equipment_api.summary_response(&user)?)?;
        }
        Command::History => {
            let user = require_user(&state, token)?;
            print_json(&state.equipment_api.history(&user)?)?;
        }
        Command::Delete { upload_id } => {
            let user = require_user(&state, token)?;
            state.upload_api.delete_upload(&user, upload_id)?;
            print_json(&serde_json::json!({ "message": "Upload deleted", "upload_id": upload_id }))?;
        }
        Command::Report { out } => {
            let user = require_user(&state, token)?;
            let path = state
                .report_api
                .write_report(&user, &out)
                .await
                .with_context(|| format!("报表生成失败 (out={})", out.display()))?;
            print_json(&serde_json::json!({ "report": path.display().to_string() }))?;
        }
        Command::Config { action } => match action {
            ConfigCommand::Get { key: Some(key) } => {
                let value = state.config_manager.get_value(&key)?;
                print_json(&serde_json::json!({ "key": key, "value": value }))?;
            }
            ConfigCommand::Get { key: None } => {
                print_json(&state.config_manager.list_values()?)?;
            }
            ConfigCommand::Set { key, value } => {
                state.config_manager.set_value(&key, &value)?;
                print_json(&serde_json::json!({ "key": key, "value": value }))?;
            }
        },
    }

    Ok(())
}
