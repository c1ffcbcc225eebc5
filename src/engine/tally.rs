// ==========================================
// 鲜果出口仓储 - 尺码汇总引擎
// ==========================================
// 输入: CountingData (扁平的 尺码键 → 箱数)
// 输出: CountingTotals (8 个等级小计 + 4 个品种×箱型合计)
// 红线: 纯函数,同输入必得同输出,与键顺序无关
// ==========================================

use crate::domain::coerce::coerce_count;
use crate::domain::counting::{CountingData, CountingTotals};
use crate::domain::types::{BoxType, Fruit, QualityClass};
use tracing::instrument;

// ==========================================
// SizeTallyAggregator - 尺码汇总
// ==========================================
#[derive(Debug, Default, Clone, Copy)]
pub struct SizeTallyAggregator;

impl SizeTallyAggregator {
    pub fn new() -> Self {
        Self
    }

    /// 汇总全部 品种×箱型×等级
    ///
    /// 只读取箱型尺码表内的键;缺失或非数字按 0
    #[instrument(skip(self, data), fields(keys = data.counts.len()))]
    pub fn aggregate(&self, data: &CountingData) -> CountingTotals {
        let mut totals = CountingTotals::default();
        for fruit in Fruit::ALL {
            for box_type in BoxType::ALL {
                let class1 = self.class_subtotal(data, fruit, box_type, QualityClass::Class1);
                let class2 = self.class_subtotal(data, fruit, box_type, QualityClass::Class2);
                totals.set_group(fruit, box_type, class1, class2);
            }
        }
        totals
    }

    /// 单个 品种×箱型×等级 的尺码求和 (饱和加法,超大箱数不溢出)
    pub fn class_subtotal(
        &self,
        data: &CountingData,
        fruit: Fruit,
        box_type: BoxType,
        class: QualityClass,
    ) -> i64 {
        box_type
            .sizes()
            .iter()
            .map(|&size| {
                let key = CountingData::size_key(fruit, box_type, class, size);
                data.get(&key).map(coerce_count).unwrap_or(0)
            })
            .fold(0i64, i64::saturating_add)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn data_from(value: serde_json::Value) -> CountingData {
        serde_json::from_value(value).unwrap()
    }

    #[test]
    fn test_aggregate_known_input() {
        let data = data_from(json!({
            "fuerte_4kg_class1_size12": 10,
            "fuerte_4kg_class1_size26": "15",
            "fuerte_4kg_class2_size18": 25,
            "hass_10kg_class1_size32": 12,
            "hass_10kg_class2_size28": 8,
            "hass_4kg_class2_size20": "bad",
        }));

        let totals = SizeTallyAggregator::new().aggregate(&data);

        assert_eq!(totals.fuerte_4kg_class1, 25);
        assert_eq!(totals.fuerte_4kg_class2, 25);
        assert_eq!(totals.fuerte_4kg_total, 50);
        assert_eq!(totals.hass_10kg_class1, 12);
        assert_eq!(totals.hass_10kg_class2, 8);
        assert_eq!(totals.hass_10kg_total, 20);
        assert_eq!(totals.hass_4kg_total, 0);
        assert_eq!(totals.fuerte_10kg_total, 0);
    }

    #[test]
    fn test_huge_counts_saturate_instead_of_overflowing() {
        let data = data_from(json!({
            "hass_4kg_class1_size12": "9223372036854775807",
            "hass_4kg_class1_size14": "1",
            "hass_4kg_class2_size16": 5,
        }));

        let totals = SizeTallyAggregator::new().aggregate(&data);
        assert_eq!(totals.hass_4kg_class1, i64::MAX);
        assert_eq!(totals.hass_4kg_class2, 5);
        assert_eq!(totals.hass_4kg_total, i64::MAX);
    }

    #[test]
    fn test_sizes_outside_box_table_ignored() {
        // 4kg 箱没有 28/30/32 码
        let data = data_from(json!({
            "hass_4kg_class1_size28": 100,
            "hass_4kg_class1_size32": 100,
            "hass_10kg_class1_size28": 3,
            "avocado_misc": 9,
        }));

        let totals = SizeTallyAggregator::new().aggregate(&data);
        assert_eq!(totals.hass_4kg_class1, 0);
        assert_eq!(totals.hass_10kg_class1, 3);
    }

    #[test]
    fn test_class_sums_match_combined_total() {
        let aggregator = SizeTallyAggregator::new();
        let mut data = CountingData::default();
        let mut n = 1;
        for fruit in Fruit::ALL {
            for box_type in BoxType::ALL {
                for class in QualityClass::ALL {
                    for &size in box_type.sizes() {
                        data.set_count(fruit, box_type, class, size, n);
                        n += 3;
                    }
                }
            }
        }

        let totals = aggregator.aggregate(&data);
        for fruit in Fruit::ALL {
            for box_type in BoxType::ALL {
                let c1 = totals.class_subtotal(fruit, box_type, QualityClass::Class1);
                let c2 = totals.class_subtotal(fruit, box_type, QualityClass::Class2);
                assert_eq!(c1 + c2, totals.box_total(fruit, box_type));
                assert_eq!(c1, aggregator.class_subtotal(&data, fruit, box_type, QualityClass::Class1));
            }
        }
    }

    #[test]
    fn test_aggregate_is_deterministic() {
        let data = data_from(json!({
            "fuerte_10kg_class2_size30": 4,
            "fuerte_10kg_class1_size12": 6,
        }));
        let aggregator = SizeTallyAggregator::new();
        assert_eq!(aggregator.aggregate(&data), aggregator.aggregate(&data.clone()));
    }
}
