// ==========================================
// 鲜果出口仓储 - 命令行入口
// ==========================================
// 用法:
//   produce-intake [stats]            驾驶舱统计
//   produce-intake pending [status]   在途点数记录 (默认 pending_rejection)
//   produce-intake history [query]    拒收历史检索
//
// 数据库路径: PRODUCE_INTAKE_DB_PATH 或用户数据目录
// 输出: stdout JSON
// ==========================================

use anyhow::{anyhow, bail, Context};
use produce_intake::app::{get_default_db_path, AppState};
use produce_intake::domain::RecordFilter;
use produce_intake::logging;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    logging::init();

    tracing::info!("{} v{}", produce_intake::APP_NAME, produce_intake::VERSION);

    let db_path = get_default_db_path();
    tracing::info!(db_path = %db_path, "使用数据库");

    let state = AppState::new(db_path).await.map_err(|e| anyhow!(e))?;

    let mut args = std::env::args().skip(1);
    let command = args.next().unwrap_or_else(|| "stats".to_string());
    let arg = args.next();

    let output = match command.as_str() {
        "stats" => serde_json::to_value(state.rejection_api.rejection_stats())?,
        "pending" => {
            let records = state.counting_api.list_counting_records(arg.as_deref())?;
            serde_json::to_value(records)?
        }
        "history" => {
            let filter = arg.as_deref().map(RecordFilter::text).unwrap_or_default();
            let records = state.rejection_api.search_rejection_history(&filter)?;
            serde_json::to_value(records)?
        }
        other => bail!("未知命令: {} (可用: stats / pending [status] / history [query])", other),
    };

    let rendered = serde_json::to_string_pretty(&output).context("输出序列化失败")?;
    println!("{}", rendered);
    Ok(())
}
