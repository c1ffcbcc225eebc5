// ==========================================
// 鲜果出口仓储 - 领域模型层
// ==========================================
// 职责: 定义领域实体、类型
// 红线: 不含数据访问逻辑,不含引擎逻辑
// ==========================================

pub mod action_log;
pub mod coerce;
pub mod counting;
pub mod query;
pub mod rejection;
pub mod types;

// 重导出核心类型
pub use action_log::{ActionLog, ActionType};
pub use counting::{CountingData, CountingRecord, CountingTotals, NewCountingRecord};
pub use query::RecordFilter;
pub use rejection::{ReconcileRequest, RejectedCrate, RejectionRecord, RejectionStats};
pub use types::{BoxType, CountingStatus, Fruit, QualityClass, VarianceLevel};
