// ==========================================
// 鲜果出口仓储 - 拒收对账引擎
// ==========================================
// 状态: Pending (点数记录存在) → Reconciled (拒收记录存在,点数记录消失)
// 职责: 计算拒收重量/偏差/等级,生成拒收记录
// 红线: 引擎只算不存;持久化的原子替换由仓储层事务完成
// ==========================================
// 未决: 负数拒收重量不做校验,按原值参与求和
// ==========================================

use crate::domain::counting::CountingRecord;
use crate::domain::rejection::{RejectedCrate, RejectionRecord};
use crate::engine::variance::{weight_variance, VarianceThresholds};
use chrono::NaiveDateTime;
use tracing::instrument;

// ==========================================
// ReconciliationEngine - 对账引擎
// ==========================================
#[derive(Debug, Clone, Copy, Default)]
pub struct ReconciliationEngine {
    thresholds: VarianceThresholds,
}

impl ReconciliationEngine {
    pub fn new(thresholds: VarianceThresholds) -> Self {
        Self { thresholds }
    }

    pub fn thresholds(&self) -> VarianceThresholds {
        self.thresholds
    }

    /// 拒收总重 (kg)
    pub fn total_rejected_weight(&self, crates: &[RejectedCrate]) -> f64 {
        crates.iter().map(RejectedCrate::weight_kg).sum()
    }

    /// 由点数记录与拒收筐生成拒收记录
    ///
    /// # 参数
    /// - counting: 待消费的点数记录 (totals/重量 视为事实,不重算)
    /// - crates: 实物拒收筐
    /// - submitted_at: 对账时间
    ///
    /// # 返回
    /// 新拒收记录,id 为新 UUID,original_counting_id 指向 counting.id
    #[instrument(skip(self, counting, crates, notes, processed_by), fields(counting_id = %counting.id, crates = crates.len()))]
    pub fn reconcile(
        &self,
        counting: &CountingRecord,
        crates: Vec<RejectedCrate>,
        notes: Option<String>,
        processed_by: Option<String>,
        submitted_at: NaiveDateTime,
    ) -> RejectionRecord {
        let total_rejected_weight = self.total_rejected_weight(&crates);
        let variance = weight_variance(
            counting.total_weight,
            counting.total_counted_weight,
            total_rejected_weight,
        );
        let variance_level = self.thresholds.classify(variance);

        tracing::debug!(
            intake = counting.total_weight,
            counted = counting.total_counted_weight,
            rejected = total_rejected_weight,
            variance,
            level = %variance_level,
            "对账偏差计算完成"
        );

        RejectionRecord {
            id: uuid::Uuid::new_v4().to_string(),
            supplier_id: counting.supplier_id.clone(),
            supplier_name: counting.supplier_name.clone(),
            supplier_phone: counting.supplier_phone.clone(),
            region: counting.region.clone(),
            pallet_id: counting.pallet_id.clone(),
            counting_data: counting.counting_data.clone(),
            totals: counting.totals,
            total_intake_weight: counting.total_weight,
            total_counted_weight: counting.total_counted_weight,
            total_rejected_weight,
            weight_variance: variance,
            variance_level,
            crates,
            notes,
            processed_by,
            submitted_at,
            original_counting_id: counting.id.clone(),
        }
    }
}
