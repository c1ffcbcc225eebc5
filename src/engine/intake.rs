// ==========================================
// 鲜果出口仓储 - 点数入库引擎
// ==========================================
// 职责: 由创建请求生成完整点数记录 (尺码汇总 + 重量推算)
// 红线: 不做数据访问;必填字段由调用方先行校验
// ==========================================

use crate::domain::counting::{CountingRecord, NewCountingRecord};
use crate::domain::types::CountingStatus;
use crate::engine::tally::SizeTallyAggregator;
use crate::engine::weight::derive_counted_weight;
use chrono::NaiveDateTime;
use tracing::instrument;

// ==========================================
// IntakeEngine - 点数入库
// ==========================================
#[derive(Debug, Default, Clone, Copy)]
pub struct IntakeEngine {
    aggregator: SizeTallyAggregator,
}

impl IntakeEngine {
    pub fn new() -> Self {
        Self {
            aggregator: SizeTallyAggregator::new(),
        }
    }

    /// 生成点数记录
    ///
    /// - id: 新 UUID
    /// - totals / total_counted_weight: 此处一次算定
    /// - status: 非法或缺失时为 pending_rejection
    #[instrument(skip(self, input), fields(supplier_id = ?input.supplier_id))]
    pub fn build_record(&self, input: NewCountingRecord, submitted_at: NaiveDateTime) -> CountingRecord {
        let totals = self.aggregator.aggregate(&input.counting_data);
        let total_counted_weight = derive_counted_weight(&totals);
        let status = CountingStatus::from_requested(input.status.as_deref());

        CountingRecord {
            id: uuid::Uuid::new_v4().to_string(),
            supplier_id: trimmed(input.supplier_id),
            supplier_name: trimmed(input.supplier_name),
            supplier_phone: non_blank(input.supplier_phone),
            region: non_blank(input.region),
            pallet_id: trimmed(input.pallet_id),
            total_weight: input.total_weight,
            counting_data: input.counting_data,
            totals,
            total_counted_weight,
            status,
            submitted_at,
            processed_by: non_blank(input.processed_by),
        }
    }
}

fn trimmed(value: Option<String>) -> String {
    value.map(|v| v.trim().to_string()).unwrap_or_default()
}

fn non_blank(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}
