// ==========================================
// 鲜果出口仓储 - SQLite 连接初始化与建表
// ==========================================
// 目标:
// - 统一所有 Connection::open 的 PRAGMA 行为
// - 统一 busy_timeout,减少并发写入时的偶发 busy 错误
// - 幂等建表 (CREATE TABLE IF NOT EXISTS)
// ==========================================

use chrono::{NaiveDateTime, SubsecRound};
use rusqlite::Connection;
use rusqlite::OptionalExtension;
use std::time::Duration;

/// 默认 busy_timeout（毫秒）
pub const DEFAULT_BUSY_TIMEOUT_MS: u64 = 5_000;

/// 当前代码所期望的 schema_version
pub const CURRENT_SCHEMA_VERSION: i64 = 1;

/// 时间戳存储格式: 字典序即时间序
pub const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S%.6f";

/// 配置 SQLite 连接的统一 PRAGMA
///
/// 说明：
/// - foreign_keys 需要“每个连接”单独开启
/// - busy_timeout 需要“每个连接”单独配置
pub fn configure_sqlite_connection(conn: &Connection) -> rusqlite::Result<()> {
    conn.execute_batch("PRAGMA foreign_keys = ON;")?;
    conn.busy_timeout(Duration::from_millis(DEFAULT_BUSY_TIMEOUT_MS))?;
    Ok(())
}

/// 打开 SQLite 连接并应用统一配置
pub fn open_sqlite_connection(db_path: &str) -> rusqlite::Result<Connection> {
    let conn = Connection::open(db_path)?;
    configure_sqlite_connection(&conn)?;
    Ok(conn)
}

/// 建表 (幂等)
///
/// - counting_records.supplier_id 唯一: 同一供应商同时只能有一条待对账记录
/// - rejection_records.original_counting_id 唯一: 点数记录只能被消费一次
pub fn ensure_schema(conn: &Connection) -> rusqlite::Result<()> {
    conn.execute_batch(
        r#"
        CREATE TABLE IF NOT EXISTS schema_version (
            version INTEGER PRIMARY KEY,
            applied_at TEXT NOT NULL DEFAULT (datetime('now'))
        );

        CREATE TABLE IF NOT EXISTS counting_records (
            id TEXT PRIMARY KEY,
            supplier_id TEXT NOT NULL,
            supplier_name TEXT NOT NULL,
            supplier_phone TEXT,
            region TEXT,
            pallet_id TEXT NOT NULL,
            total_weight REAL NOT NULL DEFAULT 0,
            counting_data TEXT NOT NULL,
            totals TEXT NOT NULL,
            total_counted_weight REAL NOT NULL DEFAULT 0,
            status TEXT NOT NULL DEFAULT 'pending_rejection',
            submitted_at TEXT NOT NULL,
            processed_by TEXT
        );
        CREATE UNIQUE INDEX IF NOT EXISTS uq_counting_supplier ON counting_records(supplier_id);
        CREATE INDEX IF NOT EXISTS idx_counting_status_ts ON counting_records(status, submitted_at);

        CREATE TABLE IF NOT EXISTS rejection_records (
            id TEXT PRIMARY KEY,
            supplier_id TEXT NOT NULL,
            supplier_name TEXT NOT NULL,
            supplier_phone TEXT,
            region TEXT,
            pallet_id TEXT NOT NULL,
            counting_data TEXT NOT NULL,
            totals TEXT NOT NULL,
            total_intake_weight REAL NOT NULL,
            total_counted_weight REAL NOT NULL,
            total_rejected_weight REAL NOT NULL,
            weight_variance REAL NOT NULL,
            variance_level TEXT NOT NULL,
            crates TEXT NOT NULL,
            notes TEXT,
            processed_by TEXT,
            submitted_at TEXT NOT NULL,
            original_counting_id TEXT NOT NULL UNIQUE
        );
        CREATE INDEX IF NOT EXISTS idx_rejection_ts ON rejection_records(submitted_at);
        CREATE INDEX IF NOT EXISTS idx_rejection_supplier ON rejection_records(supplier_id, submitted_at);

        CREATE TABLE IF NOT EXISTS config_kv (
            scope_id TEXT NOT NULL,
            key TEXT NOT NULL,
            value TEXT NOT NULL,
            updated_at TEXT NOT NULL DEFAULT (datetime('now')),
            PRIMARY KEY (scope_id, key)
        );

        CREATE TABLE IF NOT EXISTS action_log (
            action_id TEXT PRIMARY KEY,
            action_type TEXT NOT NULL,
            action_ts TEXT NOT NULL,
            actor TEXT NOT NULL,
            target_id TEXT,
            payload_json TEXT,
            detail TEXT
        );
        CREATE INDEX IF NOT EXISTS idx_action_ts ON action_log(action_ts);
        CREATE INDEX IF NOT EXISTS idx_action_target ON action_log(target_id);
        "#,
    )?;

    conn.execute(
        "INSERT OR IGNORE INTO schema_version (version) VALUES (?1)",
        [CURRENT_SCHEMA_VERSION],
    )?;
    Ok(())
}

/// 读取 schema_version（若表不存在则返回 None）
pub fn read_schema_version(conn: &Connection) -> rusqlite::Result<Option<i64>> {
    let has_table: bool = conn
        .query_row(
            "SELECT 1 FROM sqlite_master WHERE type='table' AND name='schema_version' LIMIT 1",
            [],
            |_row| Ok(true),
        )
        .optional()?
        .unwrap_or(false);

    if !has_table {
        return Ok(None);
    }

    let v: Option<i64> = conn.query_row("SELECT MAX(version) FROM schema_version", [], |row| row.get(0))?;
    Ok(v)
}

/// 当前 UTC 时间,截断到微秒 (与存储精度一致)
pub fn now_timestamp() -> NaiveDateTime {
    chrono::Utc::now().naive_utc().trunc_subsecs(6)
}

/// 时间戳 → 存储文本
pub fn format_timestamp(ts: &NaiveDateTime) -> String {
    ts.format(TIMESTAMP_FORMAT).to_string()
}

/// 存储文本 → 时间戳
///
/// 兼容不带小数秒的旧数据
pub fn parse_timestamp(s: &str) -> Option<NaiveDateTime> {
    NaiveDateTime::parse_from_str(s, TIMESTAMP_FORMAT)
        .or_else(|_| NaiveDateTime::parse_from_str(s, "%Y-%m-%d %H:%M:%S"))
        .ok()
}
