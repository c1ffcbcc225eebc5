// ==========================================
// 鲜果出口仓储 - 点数记录领域模型
// ==========================================
// 对齐: counting_records 表
// 红线: totals / total_counted_weight 创建时一次算定,之后不再重算
// ==========================================

use crate::domain::coerce::{lenient_flag, lenient_weight};
use crate::domain::types::{BoxType, CountingStatus, Fruit, QualityClass};
use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;

// ==========================================
// CountingData - 点数原始录入
// ==========================================
// 键格式: {fruit}_{boxType}_{class}_size{N},例如 hass_10kg_class1_size18
// 未知键原样保留,汇总时忽略
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CountingData {
    /// 下游冷库入库标记,本核心不解释
    #[serde(default, rename = "forColdroom", alias = "for_coldroom", deserialize_with = "lenient_flag")]
    pub for_coldroom: bool,

    #[serde(flatten)]
    pub counts: BTreeMap<String, Value>,
}

impl CountingData {
    /// 生成尺码键
    pub fn size_key(fruit: Fruit, box_type: BoxType, class: QualityClass, size: u32) -> String {
        format!("{}_{}_{}_size{}", fruit, box_type, class, size)
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.counts.get(key)
    }

    /// 写入一个尺码的箱数（测试/种子数据使用）
    pub fn set_count(
        &mut self,
        fruit: Fruit,
        box_type: BoxType,
        class: QualityClass,
        size: u32,
        count: i64,
    ) {
        self.counts.insert(
            Self::size_key(fruit, box_type, class, size),
            Value::from(count),
        );
    }
}

// ==========================================
// CountingTotals - 派生小计
// ==========================================
// 4 个 class1 小计 + 4 个 class2 小计 + 4 个 品种×箱型 合计
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CountingTotals {
    pub fuerte_4kg_class1: i64,
    pub fuerte_4kg_class2: i64,
    pub fuerte_4kg_total: i64,
    pub fuerte_10kg_class1: i64,
    pub fuerte_10kg_class2: i64,
    pub fuerte_10kg_total: i64,
    pub hass_4kg_class1: i64,
    pub hass_4kg_class2: i64,
    pub hass_4kg_total: i64,
    pub hass_10kg_class1: i64,
    pub hass_10kg_class2: i64,
    pub hass_10kg_total: i64,
}

impl CountingTotals {
    /// 品种×箱型×等级 小计
    pub fn class_subtotal(&self, fruit: Fruit, box_type: BoxType, class: QualityClass) -> i64 {
        let (c1, c2, _) = self.group(fruit, box_type);
        match class {
            QualityClass::Class1 => c1,
            QualityClass::Class2 => c2,
        }
    }

    /// 品种×箱型 合计 (class1 + class2)
    pub fn box_total(&self, fruit: Fruit, box_type: BoxType) -> i64 {
        self.group(fruit, box_type).2
    }

    fn group(&self, fruit: Fruit, box_type: BoxType) -> (i64, i64, i64) {
        match (fruit, box_type) {
            (Fruit::Fuerte, BoxType::FourKg) => {
                (self.fuerte_4kg_class1, self.fuerte_4kg_class2, self.fuerte_4kg_total)
            }
            (Fruit::Fuerte, BoxType::TenKg) => {
                (self.fuerte_10kg_class1, self.fuerte_10kg_class2, self.fuerte_10kg_total)
            }
            (Fruit::Hass, BoxType::FourKg) => {
                (self.hass_4kg_class1, self.hass_4kg_class2, self.hass_4kg_total)
            }
            (Fruit::Hass, BoxType::TenKg) => {
                (self.hass_10kg_class1, self.hass_10kg_class2, self.hass_10kg_total)
            }
        }
    }

    /// 写入一组小计,合计同步为两者之和
    pub fn set_group(&mut self, fruit: Fruit, box_type: BoxType, class1: i64, class2: i64) {
        let total = class1.saturating_add(class2);
        let slots = match (fruit, box_type) {
            (Fruit::Fuerte, BoxType::FourKg) => (
                &mut self.fuerte_4kg_class1,
                &mut self.fuerte_4kg_class2,
                &mut self.fuerte_4kg_total,
            ),
            (Fruit::Fuerte, BoxType::TenKg) => (
                &mut self.fuerte_10kg_class1,
                &mut self.fuerte_10kg_class2,
                &mut self.fuerte_10kg_total,
            ),
            (Fruit::Hass, BoxType::FourKg) => (
                &mut self.hass_4kg_class1,
                &mut self.hass_4kg_class2,
                &mut self.hass_4kg_total,
            ),
            (Fruit::Hass, BoxType::TenKg) => (
                &mut self.hass_10kg_class1,
                &mut self.hass_10kg_class2,
                &mut self.hass_10kg_total,
            ),
        };
        *slots.0 = class1;
        *slots.1 = class2;
        *slots.2 = total;
    }
}

// ==========================================
// CountingRecord - 待对账点数记录
// ==========================================
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CountingRecord {
    pub id: String,

    // ===== 供应商信息 (创建后不可变) =====
    pub supplier_id: String,
    pub supplier_name: String,
    pub supplier_phone: Option<String>,
    pub region: Option<String>,
    pub pallet_id: String,

    /// 供应商申报重量 (kg)
    pub total_weight: f64,

    // ===== 录入与派生 =====
    pub counting_data: CountingData,
    pub totals: CountingTotals,
    pub total_counted_weight: f64,

    pub status: CountingStatus,
    pub submitted_at: NaiveDateTime,
    pub processed_by: Option<String>,
}

impl CountingRecord {
    pub fn for_coldroom(&self) -> bool {
        self.counting_data.for_coldroom
    }
}

// ==========================================
// NewCountingRecord - 创建请求
// ==========================================
// 必填: supplier_id / supplier_name / pallet_id (空白视为缺失)
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct NewCountingRecord {
    #[serde(default)]
    pub supplier_id: Option<String>,
    #[serde(default)]
    pub supplier_name: Option<String>,
    #[serde(default)]
    pub supplier_phone: Option<String>,
    #[serde(default)]
    pub region: Option<String>,
    #[serde(default)]
    pub pallet_id: Option<String>,
    #[serde(default, deserialize_with = "lenient_weight")]
    pub total_weight: f64,
    #[serde(default)]
    pub counting_data: CountingData,
    #[serde(default)]
    pub status: Option<String>,
    #[serde(default)]
    pub processed_by: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_counting_data_flatten() {
        let data: CountingData = serde_json::from_value(json!({
            "forColdroom": "true",
            "hass_4kg_class1_size12": 5,
            "hass_4kg_class1_size14": "3",
        }))
        .unwrap();

        assert!(data.for_coldroom);
        assert_eq!(data.counts.len(), 2);
        assert_eq!(data.get("hass_4kg_class1_size12"), Some(&json!(5)));

        let back = serde_json::to_value(&data).unwrap();
        assert_eq!(back["forColdroom"], json!(true));
        assert!(back.get("for_coldroom").is_none());
        assert_eq!(back["hass_4kg_class1_size14"], json!("3"));
    }

    #[test]
    fn test_size_key_format() {
        assert_eq!(
            CountingData::size_key(Fruit::Fuerte, BoxType::TenKg, QualityClass::Class2, 28),
            "fuerte_10kg_class2_size28"
        );
    }

    #[test]
    fn test_totals_set_group() {
        let mut totals = CountingTotals::default();
        totals.set_group(Fruit::Hass, BoxType::TenKg, 12, 8);
        assert_eq!(totals.hass_10kg_total, 20);
        assert_eq!(totals.class_subtotal(Fruit::Hass, BoxType::TenKg, QualityClass::Class2), 8);
        assert_eq!(totals.box_total(Fruit::Fuerte, BoxType::FourKg), 0);
    }

    #[test]
    fn test_totals_set_group_saturates() {
        let mut totals = CountingTotals::default();
        totals.set_group(Fruit::Fuerte, BoxType::FourKg, i64::MAX, 1);
        assert_eq!(totals.fuerte_4kg_total, i64::MAX);
        assert_eq!(totals.fuerte_4kg_class2, 1);
    }

    #[test]
    fn test_counting_data_snake_case_flag_still_read() {
        let data: CountingData = serde_json::from_value(json!({
            "for_coldroom": true,
            "fuerte_4kg_class1_size12": 1,
        }))
        .unwrap();
        assert!(data.for_coldroom);
        assert_eq!(data.counts.len(), 1);
    }

    #[test]
    fn test_new_counting_record_lenient_weight() {
        let input: NewCountingRecord = serde_json::from_value(json!({
            "supplier_id": "S1",
            "total_weight": "500",
        }))
        .unwrap();
        assert_eq!(input.total_weight, 500.0);
        assert!(input.pallet_id.is_none());
    }
}
