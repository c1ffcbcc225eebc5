// ==========================================
// 鲜果出口仓储 - 拒收记录领域模型
// ==========================================
// 对齐: rejection_records 表
// 红线: 拒收记录一经生成即不可变 (只追加)
// ==========================================

use crate::domain::coerce::coerce_weight;
use crate::domain::counting::{CountingData, CountingTotals};
use crate::domain::types::VarianceLevel;
use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

// ==========================================
// RejectedCrate - 实物拒收筐
// ==========================================
// 本核心只关心 weight,其余字段原样透传
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RejectedCrate {
    #[serde(default)]
    pub weight: Value,

    #[serde(flatten)]
    pub details: Map<String, Value>,
}

impl RejectedCrate {
    pub fn with_weight(weight: f64) -> Self {
        Self {
            weight: Value::from(weight),
            details: Map::new(),
        }
    }

    /// 拒收重量 (kg),缺失/非数字按 0
    pub fn weight_kg(&self) -> f64 {
        coerce_weight(&self.weight)
    }
}

// ==========================================
// ReconcileRequest - 对账请求
// ==========================================
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ReconcileRequest {
    /// 缺失时对账请求非法
    #[serde(default)]
    pub crates: Option<Vec<RejectedCrate>>,
    #[serde(default)]
    pub notes: Option<String>,
    #[serde(default)]
    pub processed_by: Option<String>,
}

// ==========================================
// RejectionRecord - 对账结果
// ==========================================
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RejectionRecord {
    pub id: String,

    // ===== 从点数记录带入 =====
    pub supplier_id: String,
    pub supplier_name: String,
    pub supplier_phone: Option<String>,
    pub region: Option<String>,
    pub pallet_id: String,
    pub counting_data: CountingData,
    pub totals: CountingTotals,

    // ===== 三方重量 =====
    pub total_intake_weight: f64,
    pub total_counted_weight: f64,
    pub total_rejected_weight: f64,

    /// intake − (counted + rejected),可正可负
    pub weight_variance: f64,
    pub variance_level: VarianceLevel,

    pub crates: Vec<RejectedCrate>,
    pub notes: Option<String>,
    pub processed_by: Option<String>,
    pub submitted_at: NaiveDateTime,

    /// 被消费的点数记录ID (快照,非外键)
    pub original_counting_id: String,
}

// ==========================================
// RejectionStats - 驾驶舱统计
// ==========================================
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RejectionStats {
    pub total_processed: i64,
    pub pending_count: i64,
    pub distinct_suppliers: i64,
    pub fuerte_4kg_boxes: i64,
    pub fuerte_10kg_boxes: i64,
    pub hass_4kg_boxes: i64,
    pub hass_10kg_boxes: i64,
    pub last_7_days: i64,
    pub last_30_days: i64,
    pub high_variance_count: i64,
}
