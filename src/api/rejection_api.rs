// ==========================================
// 鲜果出口仓储 - 拒收对账 API
// ==========================================
// 职责: 点数记录 → 拒收记录 的对账转换、历史检索、驾驶舱统计
// 原子性: 删除点数行 + 写入拒收行 在同一事务内完成
// ==========================================

use std::sync::Arc;
use tracing::{error, info, instrument, warn};

use crate::api::error::{ApiError, ApiResult};
use crate::db::now_timestamp;
use crate::domain::action_log::{ActionLog, ActionType};
use crate::domain::query::RecordFilter;
use crate::domain::rejection::{ReconcileRequest, RejectionRecord, RejectionStats};
use crate::engine::{ReconciliationEngine, VarianceThresholds};
use crate::repository::action_log_repo::ActionLogRepository;
use crate::repository::counting_repo::CountingRecordRepository;
use crate::repository::rejection_repo::RejectionRecordRepository;

// ==========================================
// RejectionApi - 拒收对账 API
// ==========================================
pub struct RejectionApi {
    counting_repo: Arc<CountingRecordRepository>,
    rejection_repo: Arc<RejectionRecordRepository>,
    action_log_repo: Arc<ActionLogRepository>,
    engine: ReconciliationEngine,
    query_limit: usize,
}

impl RejectionApi {
    pub fn new(
        counting_repo: Arc<CountingRecordRepository>,
        rejection_repo: Arc<RejectionRecordRepository>,
        action_log_repo: Arc<ActionLogRepository>,
        thresholds: VarianceThresholds,
        query_limit: usize,
    ) -> Self {
        Self {
            counting_repo,
            rejection_repo,
            action_log_repo,
            engine: ReconciliationEngine::new(thresholds),
            query_limit: query_limit.max(1),
        }
    }

    /// 当前生效的偏差阈值
    pub fn thresholds(&self) -> VarianceThresholds {
        self.engine.thresholds()
    }

    // ==========================================
    // 对账
    // ==========================================

    /// 将点数记录对账为拒收记录
    ///
    /// # 流程
    /// 1. crates 缺失 → ValidationError
    /// 2. 加载点数记录,不存在 → NotFoundError
    /// 3. 计算拒收重量、偏差、分级
    /// 4. 单事务: 删除点数记录 + 写入拒收记录
    ///
    /// 并发对账同一记录时,只有一方成功,另一方得到 NotFoundError
    #[instrument(skip(self, request))]
    pub fn reconcile_to_rejection(
        &self,
        counting_id: &str,
        request: ReconcileRequest,
    ) -> ApiResult<RejectionRecord> {
        let ReconcileRequest {
            crates,
            notes,
            processed_by,
        } = request;
        let crates = crates
            .ok_or_else(|| ApiError::ValidationError("缺少必填字段: crates".to_string()))?;

        let counting = self.counting_repo.find_by_id(counting_id)?.ok_or_else(|| {
            ApiError::NotFoundError(format!("CountingRecord(id={})不存在", counting_id))
        })?;

        let record = self
            .engine
            .reconcile(&counting, crates, notes, processed_by, now_timestamp());

        self.rejection_repo.insert_consuming_counting(&record)?;

        info!(
            rejection_id = %record.id,
            counting_id = %record.original_counting_id,
            supplier_id = %record.supplier_id,
            weight_variance = record.weight_variance,
            variance_level = %record.variance_level,
            "对账完成"
        );

        let log = ActionLog::new(
            ActionType::ReconcileRejection,
            record.processed_by.as_deref(),
            &record.id,
        )
        .with_payload(serde_json::json!({
            "original_counting_id": record.original_counting_id,
            "total_rejected_weight": record.total_rejected_weight,
            "weight_variance": record.weight_variance,
            "variance_level": record.variance_level.as_str(),
        }))
        .with_detail(format!("crates={}", record.crates.len()));
        if let Err(e) = self.action_log_repo.insert(&log) {
            warn!(error = %e, "记录操作日志失败");
        }

        Ok(record)
    }

    // ==========================================
    // 查询接口
    // ==========================================

    pub fn get_rejection_record(&self, id: &str) -> ApiResult<RejectionRecord> {
        self.rejection_repo
            .find_by_id(id)?
            .ok_or_else(|| ApiError::NotFoundError(format!("RejectionRecord(id={})不存在", id)))
    }

    /// 拒收历史检索 (新提交在前)
    pub fn search_rejection_history(&self, filter: &RecordFilter) -> ApiResult<Vec<RejectionRecord>> {
        Ok(self.rejection_repo.search(filter, self.query_limit)?)
    }

    pub fn list_rejections_by_supplier(&self, supplier_id: &str) -> ApiResult<Vec<RejectionRecord>> {
        Ok(self
            .rejection_repo
            .list_by_supplier(supplier_id, self.query_limit)?)
    }

    // ==========================================
    // 统计
    // ==========================================

    /// 驾驶舱统计 (存储失败时返回全零,并记录 error 日志)
    pub fn rejection_stats(&self) -> RejectionStats {
        match self.try_rejection_stats() {
            Ok(stats) => stats,
            Err(e) => {
                error!(error = %e, "拒收统计查询失败，返回零值");
                RejectionStats::default()
            }
        }
    }

    /// 驾驶舱统计 (错误向上传播)
    pub fn try_rejection_stats(&self) -> ApiResult<RejectionStats> {
        Ok(self.rejection_repo.stats(now_timestamp())?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::counting::{CountingData, NewCountingRecord};
    use crate::domain::rejection::RejectedCrate;
    use crate::domain::types::{BoxType, Fruit, QualityClass, VarianceLevel};
    use crate::engine::IntakeEngine;
    use rusqlite::Connection;
    use std::sync::Mutex;

    struct Fixture {
        api: RejectionApi,
        counting_repo: Arc<CountingRecordRepository>,
        conn: Arc<Mutex<Connection>>,
    }

    fn setup() -> Fixture {
        let conn = Connection::open_in_memory().unwrap();
        crate::db::ensure_schema(&conn).unwrap();
        let conn = Arc::new(Mutex::new(conn));
        let counting_repo = Arc::new(CountingRecordRepository::new(conn.clone()));
        let api = RejectionApi::new(
            counting_repo.clone(),
            Arc::new(RejectionRecordRepository::new(conn.clone())),
            Arc::new(ActionLogRepository::new(conn.clone())),
            VarianceThresholds::default(),
            100,
        );
        Fixture {
            api,
            counting_repo,
            conn,
        }
    }

    /// fuerte_4kg_total=50 (200kg) + hass_10kg_total=20 (200kg), 申报 500kg
    fn seed_counting(fx: &Fixture, supplier_id: &str) -> String {
        let mut data = CountingData::default();
        data.set_count(Fruit::Fuerte, BoxType::FourKg, QualityClass::Class1, 14, 30);
        data.set_count(Fruit::Fuerte, BoxType::FourKg, QualityClass::Class2, 20, 20);
        data.set_count(Fruit::Hass, BoxType::TenKg, QualityClass::Class1, 32, 20);
        let input = NewCountingRecord {
            supplier_id: Some(supplier_id.to_string()),
            supplier_name: Some("Sunripe".to_string()),
            pallet_id: Some("PAL-1".to_string()),
            total_weight: 500.0,
            counting_data: data,
            ..Default::default()
        };
        let record = IntakeEngine::new().build_record(input, now_timestamp());
        fx.counting_repo.insert(&record).unwrap();
        record.id
    }

    fn crates(weights: &[f64]) -> ReconcileRequest {
        ReconcileRequest {
            crates: Some(weights.iter().map(|w| RejectedCrate::with_weight(*w)).collect()),
            notes: Some("bruised".to_string()),
            processed_by: Some("qc".to_string()),
        }
    }

    #[test]
    fn test_reconcile_medium_variance() {
        let fx = setup();
        let id = seed_counting(&fx, "S1");
        let record = fx.api.reconcile_to_rejection(&id, crates(&[40.0, 50.0])).unwrap();

        assert_eq!(record.total_counted_weight, 400.0);
        assert_eq!(record.total_rejected_weight, 90.0);
        assert_eq!(record.weight_variance, 10.0);
        assert_eq!(record.variance_level, VarianceLevel::Medium);
        assert_eq!(record.original_counting_id, id);
        assert!(fx.counting_repo.find_by_id(&id).unwrap().is_none());
        assert_eq!(fx.api.get_rejection_record(&record.id).unwrap(), record);
    }

    #[test]
    fn test_reconcile_low_variance() {
        let fx = setup();
        let id = seed_counting(&fx, "S1");
        let record = fx.api.reconcile_to_rejection(&id, crates(&[100.0, 5.0])).unwrap();
        assert_eq!(record.weight_variance, -5.0);
        assert_eq!(record.variance_level, VarianceLevel::Low);
    }

    #[test]
    fn test_reconcile_requires_crates() {
        let fx = setup();
        let id = seed_counting(&fx, "S1");
        let err = fx
            .api
            .reconcile_to_rejection(&id, ReconcileRequest::default())
            .unwrap_err();
        assert!(matches!(err, ApiError::ValidationError(_)));
        assert!(fx.counting_repo.find_by_id(&id).unwrap().is_some());
    }

    #[test]
    fn test_reconcile_twice_not_found() {
        let fx = setup();
        let id = seed_counting(&fx, "S1");
        fx.api.reconcile_to_rejection(&id, crates(&[1.0])).unwrap();
        let err = fx.api.reconcile_to_rejection(&id, crates(&[1.0])).unwrap_err();
        assert!(matches!(err, ApiError::NotFoundError(_)));
    }

    #[test]
    fn test_stats_degrade_to_zero_on_storage_failure() {
        let fx = setup();
        let id = seed_counting(&fx, "S1");
        fx.api.reconcile_to_rejection(&id, crates(&[90.0])).unwrap();
        assert_eq!(fx.api.rejection_stats().total_processed, 1);

        fx.conn
            .lock()
            .unwrap()
            .execute_batch("DROP TABLE rejection_records;")
            .unwrap();
        assert_eq!(fx.api.rejection_stats(), RejectionStats::default());
        assert!(matches!(
            fx.api.try_rejection_stats(),
            Err(ApiError::StorageError(_))
        ));
    }
}
