// ==========================================
// 鲜果出口仓储 - 核心库
// ==========================================
// 技术栈: Rust + SQLite
// 业务范围: 入库点数 → 拒收对账 (鳄梨 Fuerte / Hass)
// ==========================================

// ==========================================
// 模块声明
// ==========================================

// 领域层 - 实体与类型
pub mod domain;

// 数据仓储层 - 数据访问
pub mod repository;

// 引擎层 - 汇总/推算/分级
pub mod engine;

// 配置层 - 系统配置
pub mod config;

// 数据库基础设施（连接初始化/PRAGMA 统一/建表）
pub mod db;

// 日志系统
pub mod logging;

// API 层 - 业务接口
pub mod api;

// 应用层 - 状态组装
pub mod app;

// ==========================================
// 重导出核心类型
// ==========================================

// 领域类型
pub use domain::types::{BoxType, CountingStatus, Fruit, QualityClass, VarianceLevel};

// 领域实体
pub use domain::{
    ActionLog, ActionType, CountingData, CountingRecord, CountingTotals, NewCountingRecord,
    ReconcileRequest, RecordFilter, RejectedCrate, RejectionRecord, RejectionStats,
};

// 引擎
pub use engine::{IntakeEngine, ReconciliationEngine, SizeTallyAggregator, VarianceThresholds};

// API
pub use api::{ApiError, ApiResult, CountingApi, ErrorResponse, RejectionApi};

// ==========================================
// 常量定义
// ==========================================

// 系统版本
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

// 系统名称
pub const APP_NAME: &str = "鲜果出口仓储对账系统";
