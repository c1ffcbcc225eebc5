// ==========================================
// 鲜果出口仓储 - 重量偏差分级
// ==========================================
// 偏差 = 申报重量 − (点数重量 + 拒收重量)
// 分级 (按 |偏差|, kg):
//   low    : |v| <  medium_min
//   medium : medium_min ≤ |v| ≤ high_above
//   high   : |v| >  high_above
// ==========================================

use crate::domain::types::VarianceLevel;
use serde::{Deserialize, Serialize};

/// 默认 medium 下界 (kg)
pub const DEFAULT_VARIANCE_MEDIUM_MIN_KG: f64 = 10.0;

/// 默认 high 阈值 (kg),超过即 high
pub const DEFAULT_VARIANCE_HIGH_ABOVE_KG: f64 = 20.0;

/// 偏差分级阈值
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct VarianceThresholds {
    pub medium_min_kg: f64,
    pub high_above_kg: f64,
}

impl Default for VarianceThresholds {
    fn default() -> Self {
        Self {
            medium_min_kg: DEFAULT_VARIANCE_MEDIUM_MIN_KG,
            high_above_kg: DEFAULT_VARIANCE_HIGH_ABOVE_KG,
        }
    }
}

impl VarianceThresholds {
    /// 构造阈值,不满足 0 ≤ medium_min ≤ high_above 时返回 None
    pub fn new(medium_min_kg: f64, high_above_kg: f64) -> Option<Self> {
        let valid = medium_min_kg.is_finite()
            && high_above_kg.is_finite()
            && medium_min_kg >= 0.0
            && medium_min_kg <= high_above_kg;
        valid.then_some(Self {
            medium_min_kg,
            high_above_kg,
        })
    }

    pub fn classify(&self, weight_variance: f64) -> VarianceLevel {
        let magnitude = weight_variance.abs();
        if magnitude < self.medium_min_kg {
            VarianceLevel::Low
        } else if magnitude <= self.high_above_kg {
            VarianceLevel::Medium
        } else {
            VarianceLevel::High
        }
    }
}

/// 计算重量偏差 (不做舍入)
pub fn weight_variance(intake_kg: f64, counted_kg: f64, rejected_kg: f64) -> f64 {
    intake_kg - (counted_kg + rejected_kg)
}
