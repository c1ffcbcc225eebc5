// ==========================================
// 鲜果出口仓储 - 应用状态
// ==========================================
// 职责: 管理应用级别的共享状态和API实例
// ==========================================

use rusqlite::Connection;
use std::sync::{Arc, Mutex};

use crate::api::{CountingApi, RejectionApi};
use crate::config::{ConfigManager, IntakeConfigReader};
use crate::db::{ensure_schema, open_sqlite_connection};
use crate::engine::VarianceThresholds;
use crate::repository::{
    ActionLogRepository, CountingRecordRepository, RejectionRecordRepository,
};

/// 默认数据库路径的环境变量覆盖
pub const DB_PATH_ENV: &str = "PRODUCE_INTAKE_DB_PATH";

/// 应用状态
///
/// 所有仓储共享同一个 SQLite 连接
pub struct AppState {
    /// 数据库路径
    pub db_path: String,

    /// 点数记录API
    pub counting_api: Arc<CountingApi>,

    /// 拒收对账API
    pub rejection_api: Arc<RejectionApi>,

    /// 配置管理器
    pub config_manager: Arc<ConfigManager>,

    /// 操作日志仓储（用于审计追踪）
    pub action_log_repo: Arc<ActionLogRepository>,
}

impl AppState {
    /// 创建新的AppState实例,阈值与查询上限从 config_kv 读取
    ///
    /// # 说明
    /// 该方法会：
    /// 1. 打开数据库并幂等建表
    /// 2. 读取配置
    /// 3. 初始化所有Repository与API
    pub async fn new(db_path: String) -> Result<Self, String> {
        tracing::info!(db_path = %db_path, "初始化AppState");

        let conn = Self::open_shared_connection(&db_path)?;
        let config_manager = Arc::new(
            ConfigManager::from_connection(conn.clone())
                .map_err(|e| format!("无法创建ConfigManager: {}", e))?,
        );

        let thresholds = config_manager
            .get_variance_thresholds()
            .await
            .map_err(|e| format!("读取偏差阈值配置失败: {}", e))?;
        let query_limit = config_manager
            .get_query_result_limit()
            .await
            .map_err(|e| format!("读取查询上限配置失败: {}", e))?;

        tracing::info!(
            medium_min_kg = thresholds.medium_min_kg,
            high_above_kg = thresholds.high_above_kg,
            query_limit,
            "配置加载完成"
        );

        Ok(Self::assemble(db_path, conn, config_manager, thresholds, query_limit))
    }

    /// 以显式配置创建AppState (不读取 config_kv)
    pub fn with_settings(
        db_path: String,
        thresholds: VarianceThresholds,
        query_limit: usize,
    ) -> Result<Self, String> {
        let conn = Self::open_shared_connection(&db_path)?;
        let config_manager = Arc::new(
            ConfigManager::from_connection(conn.clone())
                .map_err(|e| format!("无法创建ConfigManager: {}", e))?,
        );
        Ok(Self::assemble(db_path, conn, config_manager, thresholds, query_limit))
    }

    fn open_shared_connection(db_path: &str) -> Result<Arc<Mutex<Connection>>, String> {
        let conn = open_sqlite_connection(db_path)
            .map_err(|e| format!("无法打开数据库: {}", e))?;
        ensure_schema(&conn).map_err(|e| format!("数据库建表失败: {}", e))?;
        Ok(Arc::new(Mutex::new(conn)))
    }

    fn assemble(
        db_path: String,
        conn: Arc<Mutex<Connection>>,
        config_manager: Arc<ConfigManager>,
        thresholds: VarianceThresholds,
        query_limit: usize,
    ) -> Self {
        // ==========================================
        // 初始化Repository层
        // ==========================================
        let counting_repo = Arc::new(CountingRecordRepository::new(conn.clone()));
        let rejection_repo = Arc::new(RejectionRecordRepository::new(conn.clone()));
        let action_log_repo = Arc::new(ActionLogRepository::new(conn));

        // ==========================================
        // 创建API实例
        // ==========================================
        let counting_api = Arc::new(CountingApi::new(
            counting_repo.clone(),
            action_log_repo.clone(),
            query_limit,
        ));
        let rejection_api = Arc::new(RejectionApi::new(
            counting_repo,
            rejection_repo,
            action_log_repo.clone(),
            thresholds,
            query_limit,
        ));

        tracing::info!("AppState初始化完成");

        Self {
            db_path,
            counting_api,
            rejection_api,
            config_manager,
            action_log_repo,
        }
    }
}

/// 获取默认数据库路径
///
/// 优先级: PRODUCE_INTAKE_DB_PATH 环境变量 > 用户数据目录 > 当前目录
pub fn get_default_db_path() -> String {
    use std::path::PathBuf;

    if let Ok(path) = std::env::var(DB_PATH_ENV) {
        let trimmed = path.trim();
        if !trimmed.is_empty() {
            return trimmed.to_string();
        }
    }

    let mut path = PathBuf::from("./produce_intake.db");

    if let Some(data_dir) = dirs::data_dir() {
        let dir = data_dir.join("produce-intake");
        // 目录创建失败时回落到当前目录
        if std::fs::create_dir_all(&dir).is_ok() {
            path = dir.join("produce_intake.db");
        }
    }

    path.to_string_lossy().to_string()
}
