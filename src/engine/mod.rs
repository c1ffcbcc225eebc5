// ==========================================
// 鲜果出口仓储 - 引擎层
// ==========================================
// 职责: 尺码汇总 / 重量推算 / 偏差分级 / 对账
// 红线: 引擎不访问数据库,全部为确定性计算
// ==========================================

pub mod intake;
pub mod reconcile;
pub mod tally;
pub mod variance;
pub mod weight;

// 重导出核心引擎
pub use intake::IntakeEngine;
pub use reconcile::ReconciliationEngine;
pub use tally::SizeTallyAggregator;
pub use variance::{weight_variance, VarianceThresholds};
pub use weight::derive_counted_weight;
