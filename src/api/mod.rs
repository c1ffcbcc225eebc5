// ==========================================
// 鲜果出口仓储 - API 层
// ==========================================
// 职责: 提供业务 API 接口,供命令行/服务端调用
// ==========================================

pub mod counting_api;
pub mod error;
pub mod rejection_api;

// 重导出核心类型
pub use counting_api::CountingApi;
pub use error::{ApiError, ApiResult, ErrorResponse};
pub use rejection_api::RejectionApi;
