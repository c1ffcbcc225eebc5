// ==========================================
// 鲜果出口仓储 - API层错误类型
// ==========================================
// 职责: 定义API层错误类型,转换Repository错误为调用方可理解的错误消息
// 错误分类: 校验 / 冲突 / 不存在 / 存储 / 内部
// ==========================================

use crate::repository::error::RepositoryError;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// 存储/内部错误对外统一文案 (细节只进日志)
pub const GENERIC_STORAGE_MESSAGE: &str = "存储服务暂时不可用，请稍后重试";

/// API层错误类型
#[derive(Error, Debug)]
pub enum ApiError {
    /// 缺少必填字段或请求体格式错误
    #[error("数据验证失败: {0}")]
    ValidationError(String),

    /// 唯一性约束冲突 (同一供应商已有在途记录)
    #[error("{0}")]
    ConflictError(String),

    /// 记录不存在 (已对账 / 已删除 / 从未存在)
    #[error("资源未找到: {0}")]
    NotFoundError(String),

    #[error("存储错误: {0}")]
    StorageError(String),

    #[error("内部错误: {0}")]
    InternalError(String),
}

// ==========================================
// 从 RepositoryError 转换
// ==========================================
impl From<RepositoryError> for ApiError {
    fn from(err: RepositoryError) -> Self {
        match err {
            RepositoryError::NotFound { entity, id } => {
                ApiError::NotFoundError(format!("{}(id={})不存在", entity, id))
            }
            RepositoryError::ValidationError(msg) => ApiError::ValidationError(msg),
            RepositoryError::LockError(msg) => {
                ApiError::StorageError(format!("数据库锁获取失败: {}", msg))
            }
            other => ApiError::StorageError(other.to_string()),
        }
    }
}

/// API Result 类型别名
pub type ApiResult<T> = Result<T, ApiError>;

// ==========================================
// ErrorResponse - 传输无关的错误响应
// ==========================================
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorResponse {
    /// 错误代码
    pub code: String,

    /// HTTP 等价状态码
    pub status: u16,

    /// 错误消息
    pub message: String,
}

impl ErrorResponse {
    pub fn from_api_error(err: &ApiError) -> Self {
        let (code, status) = match err {
            ApiError::ValidationError(_) => ("VALIDATION_ERROR", 400),
            ApiError::NotFoundError(_) => ("NOT_FOUND", 404),
            ApiError::ConflictError(_) => ("CONFLICT", 409),
            ApiError::StorageError(_) => ("STORAGE_ERROR", 500),
            ApiError::InternalError(_) => ("INTERNAL_ERROR", 500),
        };

        let message = match err {
            ApiError::StorageError(_) | ApiError::InternalError(_) => {
                tracing::error!(error = %err, code, "请求失败 (存储/内部错误)");
                GENERIC_STORAGE_MESSAGE.to_string()
            }
            _ => err.to_string(),
        };

        Self {
            code: code.to_string(),
            status,
            message,
        }
    }

    /// 序列化为 JSON 字符串
    pub fn to_json(&self) -> String {
        serde_json::to_string(self).unwrap_or_else(|_| self.message.clone())
    }
}

impl From<&ApiError> for ErrorResponse {
    fn from(err: &ApiError) -> Self {
        ErrorResponse::from_api_error(err)
    }
}
