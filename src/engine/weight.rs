// ==========================================
// 鲜果出口仓储 - 点数重量推算
// ==========================================
// 公式: Σ(品种×箱型合计 × 箱型标称重量)
// 说明: 估算值,精度不超过箱数粒度;标称重量只看箱型
// ==========================================

use crate::domain::counting::CountingTotals;
use crate::domain::types::{BoxType, Fruit};

/// 由箱数合计推算点数重量 (kg)
pub fn derive_counted_weight(totals: &CountingTotals) -> f64 {
    let mut weight = 0.0;
    for fruit in Fruit::ALL {
        for box_type in BoxType::ALL {
            weight += totals.box_total(fruit, box_type) as f64 * box_type.unit_weight_kg();
        }
    }
    weight
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_derive_counted_weight() {
        let mut totals = CountingTotals::default();
        totals.set_group(Fruit::Fuerte, BoxType::FourKg, 30, 20);
        totals.set_group(Fruit::Hass, BoxType::TenKg, 15, 5);
        // 50×4 + 20×10
        assert_eq!(derive_counted_weight(&totals), 400.0);
    }

    #[test]
    fn test_all_four_groups_weighted() {
        let mut totals = CountingTotals::default();
        totals.set_group(Fruit::Fuerte, BoxType::FourKg, 1, 0);
        totals.set_group(Fruit::Fuerte, BoxType::TenKg, 1, 0);
        totals.set_group(Fruit::Hass, BoxType::FourKg, 0, 1);
        totals.set_group(Fruit::Hass, BoxType::TenKg, 0, 1);
        assert_eq!(derive_counted_weight(&totals), 28.0);
        assert_eq!(derive_counted_weight(&CountingTotals::default()), 0.0);
    }
}
