// ==========================================
// API集成测试辅助工具
// ==========================================
// 职责: 基于临时数据库文件组装完整 AppState
// ==========================================

#[path = "../test_helpers.rs"]
mod test_helpers;

use std::sync::Arc;
use tempfile::NamedTempFile;

use produce_intake::api::{CountingApi, RejectionApi};
use produce_intake::app::AppState;
use produce_intake::config::ConfigManager;
use produce_intake::engine::VarianceThresholds;

/// API测试环境
pub struct ApiTestEnv {
    pub db_path: String,
    pub state: AppState,

    // 临时文件（确保生命周期）
    _temp_file: NamedTempFile,
}

impl ApiTestEnv {
    /// 默认阈值 (10 / 20) + 查询上限 100
    pub fn new() -> Result<Self, Box<dyn std::error::Error>> {
        Self::with_settings(VarianceThresholds::default(), 100)
    }

    pub fn with_settings(
        thresholds: VarianceThresholds,
        query_limit: usize,
    ) -> Result<Self, Box<dyn std::error::Error>> {
        produce_intake::logging::init_test();

        let (temp_file, db_path) = test_helpers::create_test_db()?;
        let state = AppState::with_settings(db_path.clone(), thresholds, query_limit)?;
        Ok(Self {
            db_path,
            state,
            _temp_file: temp_file,
        })
    }

    /// 从 config_kv 读取配置组装环境 (写入配置后调用)
    pub async fn reload(self) -> Result<Self, Box<dyn std::error::Error>> {
        let Self {
            db_path,
            state,
            _temp_file,
        } = self;
        drop(state);
        let state = AppState::new(db_path.clone()).await?;
        Ok(Self {
            db_path,
            state,
            _temp_file,
        })
    }

    pub fn counting_api(&self) -> &Arc<CountingApi> {
        &self.state.counting_api
    }

    pub fn rejection_api(&self) -> &Arc<RejectionApi> {
        &self.state.rejection_api
    }

    pub fn config_manager(&self) -> &Arc<ConfigManager> {
        &self.state.config_manager
    }
}
