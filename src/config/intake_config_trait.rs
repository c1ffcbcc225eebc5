// ==========================================
// 鲜果出口仓储 - 对账配置读取 Trait
// ==========================================
// 职责: 定义对账/查询所需的配置读取接口（不包含实现）
// 红线: 不包含配置写入、不包含业务逻辑
// ==========================================

use crate::engine::variance::VarianceThresholds;
use async_trait::async_trait;
use std::error::Error;

// ==========================================
// IntakeConfigReader Trait
// ==========================================
// 实现者: ConfigManager（从 config_kv 表读取）
#[async_trait]
pub trait IntakeConfigReader: Send + Sync {
    /// 偏差分级阈值
    ///
    /// # 默认值
    /// - medium_min_kg = 10, high_above_kg = 20
    /// - 配置非法 (非数字 / medium_min > high_above / 负数) 时回落默认值
    async fn get_variance_thresholds(&self) -> Result<VarianceThresholds, Box<dyn Error>>;

    /// 列表/检索返回条数上限
    ///
    /// # 默认值
    /// - 100,取值范围 1..=500
    async fn get_query_result_limit(&self) -> Result<usize, Box<dyn Error>>;
}
