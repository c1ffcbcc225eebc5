// ==========================================
// 鲜果出口仓储 - 配置管理器
// ==========================================
// 职责: 配置加载、查询、覆写
// 存储: config_kv 表 (key-value + scope)
// ==========================================

use crate::config::intake_config_trait::IntakeConfigReader;
use crate::db::open_sqlite_connection;
use crate::engine::variance::{
    VarianceThresholds, DEFAULT_VARIANCE_HIGH_ABOVE_KG, DEFAULT_VARIANCE_MEDIUM_MIN_KG,
};
use async_trait::async_trait;
use rusqlite::{params, Connection};
use std::collections::HashMap;
use std::error::Error;
use std::sync::{Arc, Mutex};

/// 列表/检索默认条数上限
pub const DEFAULT_QUERY_RESULT_LIMIT: usize = 100;

/// 列表/检索条数上限的硬上界
pub const MAX_QUERY_RESULT_LIMIT: usize = 500;

// ==========================================
// ConfigManager - 配置管理器
// ==========================================
pub struct ConfigManager {
    conn: Arc<Mutex<Connection>>,
}

impl ConfigManager {
    /// 创建新的 ConfigManager 实例
    pub fn new(db_path: &str) -> Result<Self, Box<dyn Error>> {
        let conn = open_sqlite_connection(db_path)?;

        Ok(Self {
            conn: Arc::new(Mutex::new(conn)),
        })
    }

    /// 从已有连接创建 ConfigManager
    ///
    /// 说明：为保证连接行为一致，会对传入连接再次应用统一 PRAGMA（幂等）。
    pub fn from_connection(conn: Arc<Mutex<Connection>>) -> Result<Self, Box<dyn Error>> {
        {
            let conn_guard = conn.lock().map_err(|e| format!("锁获取失败: {}", e))?;
            crate::db::configure_sqlite_connection(&conn_guard)?;
        }

        Ok(Self { conn })
    }

    /// 从 config_kv 表读取配置值（scope_id='global'）
    fn get_config_value(&self, key: &str) -> Result<Option<String>, Box<dyn Error>> {
        let conn = self.conn.lock().map_err(|e| format!("锁获取失败: {}", e))?;

        let result = conn.query_row(
            "SELECT value FROM config_kv WHERE scope_id = 'global' AND key = ?1",
            params![key],
            |row| row.get::<_, String>(0),
        );

        match result {
            Ok(value) => Ok(Some(value)),
            Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
            Err(e) => Err(Box::new(e)),
        }
    }

    /// 写入 global scope 配置 (UPSERT)
    pub fn set_global_config_value(&self, key: &str, value: &str) -> Result<(), Box<dyn Error>> {
        let conn = self.conn.lock().map_err(|e| format!("锁获取失败: {}", e))?;
        conn.execute(
            "INSERT INTO config_kv (scope_id, key, value) VALUES ('global', ?1, ?2)
             ON CONFLICT(scope_id, key) DO UPDATE SET value = ?2, updated_at = datetime('now')",
            params![key, value],
        )?;
        Ok(())
    }

    /// 获取所有 global 配置（用于启动时打印/排障）
    pub fn get_config_snapshot(&self) -> Result<HashMap<String, String>, Box<dyn Error>> {
        let conn = self.conn.lock().map_err(|e| format!("锁获取失败: {}", e))?;

        let mut stmt = conn.prepare(
            "SELECT key, value FROM config_kv WHERE scope_id = 'global' ORDER BY key",
        )?;
        let rows = stmt.query_map([], |row| {
            Ok((row.get::<_, String>(0)?, row.get::<_, String>(1)?))
        })?;

        let mut config_map = HashMap::new();
        for row in rows {
            let (key, value) = row?;
            config_map.insert(key, value);
        }
        Ok(config_map)
    }

    /// 读取 f64 配置,缺失返回默认值,格式错误告警后返回默认值
    fn get_f64_or_default(&self, key: &str, default: f64) -> Result<f64, Box<dyn Error>> {
        match self.get_config_value(key)? {
            None => Ok(default),
            Some(raw) => match raw.trim().parse::<f64>() {
                Ok(v) if v.is_finite() => Ok(v),
                _ => {
                    tracing::warn!(config_key = key, raw_value = %raw, "配置格式错误，使用默认值");
                    Ok(default)
                }
            },
        }
    }
}

// ==========================================
// IntakeConfigReader Trait 实现
// ==========================================
#[async_trait]
impl IntakeConfigReader for ConfigManager {
    async fn get_variance_thresholds(&self) -> Result<VarianceThresholds, Box<dyn Error>> {
        let medium_min = self.get_f64_or_default(
            config_keys::VARIANCE_MEDIUM_MIN_KG,
            DEFAULT_VARIANCE_MEDIUM_MIN_KG,
        )?;
        let high_above = self.get_f64_or_default(
            config_keys::VARIANCE_HIGH_ABOVE_KG,
            DEFAULT_VARIANCE_HIGH_ABOVE_KG,
        )?;

        Ok(VarianceThresholds::new(medium_min, high_above).unwrap_or_else(|| {
            tracing::warn!(
                medium_min,
                high_above,
                "偏差阈值配置不合法 (需 0 ≤ medium_min ≤ high_above)，使用默认值"
            );
            VarianceThresholds::default()
        }))
    }

    async fn get_query_result_limit(&self) -> Result<usize, Box<dyn Error>> {
        let raw = match self.get_config_value(config_keys::QUERY_RESULT_LIMIT)? {
            Some(v) => v,
            None => return Ok(DEFAULT_QUERY_RESULT_LIMIT),
        };

        match raw.trim().parse::<usize>() {
            Ok(v) => Ok(v.clamp(1, MAX_QUERY_RESULT_LIMIT)),
            Err(_) => {
                tracing::warn!(
                    config_key = config_keys::QUERY_RESULT_LIMIT,
                    raw_value = %raw,
                    "配置格式错误，使用默认值"
                );
                Ok(DEFAULT_QUERY_RESULT_LIMIT)
            }
        }
    }
}

// ==========================================
// 配置键常量
// ==========================================
pub mod config_keys {
    // 偏差分级 (kg)
    pub const VARIANCE_MEDIUM_MIN_KG: &str = "variance_medium_min_kg";
    pub const VARIANCE_HIGH_ABOVE_KG: &str = "variance_high_above_kg";

    // 查询
    pub const QUERY_RESULT_LIMIT: &str = "query_result_limit";
}

#[cfg(test)]
mod tests {
    use super::*;

    fn setup_manager() -> ConfigManager {
        let conn = Connection::open_in_memory().unwrap();
        crate::db::ensure_schema(&conn).unwrap();
        ConfigManager::from_connection(Arc::new(Mutex::new(conn))).unwrap()
    }

    #[tokio::test]
    async fn test_defaults_when_unset() {
        let manager = setup_manager();
        assert_eq!(
            manager.get_variance_thresholds().await.unwrap(),
            VarianceThresholds::default()
        );
        assert_eq!(
            manager.get_query_result_limit().await.unwrap(),
            DEFAULT_QUERY_RESULT_LIMIT
        );
    }

    #[tokio::test]
    async fn test_configured_thresholds() {
        let manager = setup_manager();
        manager
            .set_global_config_value(config_keys::VARIANCE_MEDIUM_MIN_KG, "5")
            .unwrap();
        manager
            .set_global_config_value(config_keys::VARIANCE_HIGH_ABOVE_KG, "15.5")
            .unwrap();

        let t = manager.get_variance_thresholds().await.unwrap();
        assert_eq!(t.medium_min_kg, 5.0);
        assert_eq!(t.high_above_kg, 15.5);
    }

    #[tokio::test]
    async fn test_invalid_values_fall_back() {
        let manager = setup_manager();
        manager
            .set_global_config_value(config_keys::VARIANCE_MEDIUM_MIN_KG, "30")
            .unwrap();
        manager
            .set_global_config_value(config_keys::VARIANCE_HIGH_ABOVE_KG, "abc")
            .unwrap();
        // medium_min=30 > high_above=20(默认) → 整体回落
        assert_eq!(
            manager.get_variance_thresholds().await.unwrap(),
            VarianceThresholds::default()
        );

        manager
            .set_global_config_value(config_keys::QUERY_RESULT_LIMIT, "100000")
            .unwrap();
        assert_eq!(
            manager.get_query_result_limit().await.unwrap(),
            MAX_QUERY_RESULT_LIMIT
        );
        manager
            .set_global_config_value(config_keys::QUERY_RESULT_LIMIT, "0")
            .unwrap();
        assert_eq!(manager.get_query_result_limit().await.unwrap(), 1);
    }

    #[test]
    fn test_config_snapshot() {
        let manager = setup_manager();
        manager.set_global_config_value("a", "1").unwrap();
        manager.set_global_config_value("a", "2").unwrap();
        let snapshot = manager.get_config_snapshot().unwrap();
        assert_eq!(snapshot.get("a").map(String::as_str), Some("2"));
    }
}
