// ==========================================
// 鲜果出口仓储 - 点数记录 API
// ==========================================
// 职责: 点数记录创建、查询、检索、删除
// 重复供应商: 由唯一索引拦截,转换为 ConflictError
// ==========================================

use std::sync::Arc;
use tracing::{info, instrument, warn};

use crate::api::error::{ApiError, ApiResult};
use crate::db::now_timestamp;
use crate::domain::action_log::{ActionLog, ActionType};
use crate::domain::counting::{CountingRecord, NewCountingRecord};
use crate::domain::query::RecordFilter;
use crate::domain::types::CountingStatus;
use crate::engine::IntakeEngine;
use crate::repository::action_log_repo::ActionLogRepository;
use crate::repository::counting_repo::CountingRecordRepository;
use crate::repository::error::RepositoryError;

/// 重复供应商提示文案
pub const DUPLICATE_SUPPLIER_MESSAGE: &str = "supplier already exists in the system";

// ==========================================
// CountingApi - 点数记录 API
// ==========================================
pub struct CountingApi {
    counting_repo: Arc<CountingRecordRepository>,
    action_log_repo: Arc<ActionLogRepository>,
    engine: IntakeEngine,
    query_limit: usize,
}

impl CountingApi {
    pub fn new(
        counting_repo: Arc<CountingRecordRepository>,
        action_log_repo: Arc<ActionLogRepository>,
        query_limit: usize,
    ) -> Self {
        Self {
            counting_repo,
            action_log_repo,
            engine: IntakeEngine::new(),
            query_limit: query_limit.max(1),
        }
    }

    // ==========================================
    // 写入接口
    // ==========================================

    /// 创建点数记录
    ///
    /// # 错误
    /// - ValidationError: supplier_id / supplier_name / pallet_id 缺失
    /// - ConflictError: 该供应商已有在途记录
    #[instrument(skip(self, input), fields(supplier_id = input.supplier_id.as_deref().unwrap_or("")))]
    pub fn create_counting_record(&self, input: NewCountingRecord) -> ApiResult<CountingRecord> {
        let missing: Vec<&str> = [
            ("supplier_id", &input.supplier_id),
            ("supplier_name", &input.supplier_name),
            ("pallet_id", &input.pallet_id),
        ]
        .iter()
        .filter(|(_, v)| v.as_deref().map(str::trim).map_or(true, str::is_empty))
        .map(|(name, _)| *name)
        .collect();
        if !missing.is_empty() {
            return Err(ApiError::ValidationError(format!(
                "缺少必填字段: {}",
                missing.join(", ")
            )));
        }

        let record = self.engine.build_record(input, now_timestamp());

        self.counting_repo.insert(&record).map_err(|e| match e {
            RepositoryError::UniqueConstraintViolation(_) => {
                ApiError::ConflictError(DUPLICATE_SUPPLIER_MESSAGE.to_string())
            }
            other => ApiError::from(other),
        })?;

        info!(
            record_id = %record.id,
            supplier_id = %record.supplier_id,
            total_counted_weight = record.total_counted_weight,
            status = %record.status,
            "点数记录已创建"
        );

        let log = ActionLog::new(
            ActionType::CreateCounting,
            record.processed_by.as_deref(),
            &record.id,
        )
        .with_payload(serde_json::json!({
            "supplier_id": record.supplier_id,
            "pallet_id": record.pallet_id,
            "total_weight": record.total_weight,
            "total_counted_weight": record.total_counted_weight,
        }));
        self.record_action(&log);

        Ok(record)
    }

    /// 删除点数记录 (无条件)
    ///
    /// # 错误
    /// - NotFoundError: 记录不存在
    #[instrument(skip(self))]
    pub fn delete_counting_record(&self, id: &str, operator: Option<&str>) -> ApiResult<()> {
        let rows = self.counting_repo.delete_by_id(id)?;
        if rows == 0 {
            return Err(ApiError::NotFoundError(format!(
                "CountingRecord(id={})不存在",
                id
            )));
        }

        info!(record_id = %id, "点数记录已删除");
        self.record_action(&ActionLog::new(ActionType::DeleteCounting, operator, id));
        Ok(())
    }

    // ==========================================
    // 查询接口
    // ==========================================

    /// 按状态列出点数记录 (新提交在前)
    ///
    /// status 为空或无法识别时默认 pending_rejection
    pub fn list_counting_records(&self, status: Option<&str>) -> ApiResult<Vec<CountingRecord>> {
        let status = CountingStatus::from_requested(status);
        Ok(self.counting_repo.list(Some(status), self.query_limit)?)
    }

    pub fn get_counting_record(&self, id: &str) -> ApiResult<CountingRecord> {
        self.counting_repo
            .find_by_id(id)?
            .ok_or_else(|| ApiError::NotFoundError(format!("CountingRecord(id={})不存在", id)))
    }

    pub fn search_counting_records(&self, filter: &RecordFilter) -> ApiResult<Vec<CountingRecord>> {
        Ok(self.counting_repo.search(filter, self.query_limit)?)
    }

    /// 写操作日志,失败只告警
    fn record_action(&self, log: &ActionLog) {
        if let Err(e) = self.action_log_repo.insert(log) {
            warn!(error = %e, action_type = %log.action_type, "记录操作日志失败");
        }
    }
}
