// ==========================================
// 测试数据构建器 - 用于集成测试
// ==========================================

use produce_intake::domain::{
    BoxType, CountingData, Fruit, NewCountingRecord, QualityClass, ReconcileRequest, RejectedCrate,
};

// ==========================================
// NewCountingRecord 构建器
// ==========================================

pub struct CountingInputBuilder {
    input: NewCountingRecord,
}

impl CountingInputBuilder {
    pub fn new(supplier_id: &str) -> Self {
        Self {
            input: NewCountingRecord {
                supplier_id: Some(supplier_id.to_string()),
                supplier_name: Some(format!("Grower {}", supplier_id)),
                pallet_id: Some(format!("PAL-{}", supplier_id)),
                ..Default::default()
            },
        }
    }

    pub fn supplier_name(mut self, name: &str) -> Self {
        self.input.supplier_name = Some(name.to_string());
        self
    }

    pub fn region(mut self, region: &str) -> Self {
        self.input.region = Some(region.to_string());
        self
    }

    pub fn declared_weight(mut self, kg: f64) -> Self {
        self.input.total_weight = kg;
        self
    }

    pub fn status(mut self, status: &str) -> Self {
        self.input.status = Some(status.to_string());
        self
    }

    pub fn count(
        mut self,
        fruit: Fruit,
        box_type: BoxType,
        class: QualityClass,
        size: u32,
        boxes: i64,
    ) -> Self {
        self.input
            .counting_data
            .set_count(fruit, box_type, class, size, boxes);
        self
    }

    pub fn raw_counts(mut self, data: CountingData) -> Self {
        self.input.counting_data = data;
        self
    }

    pub fn build(self) -> NewCountingRecord {
        self.input
    }
}

/// 标准场景: 申报 500kg, fuerte_4kg_total=50 (200kg), hass_10kg_total=20 (200kg)
pub fn standard_intake(supplier_id: &str) -> NewCountingRecord {
    CountingInputBuilder::new(supplier_id)
        .declared_weight(500.0)
        .count(Fruit::Fuerte, BoxType::FourKg, QualityClass::Class1, 12, 25)
        .count(Fruit::Fuerte, BoxType::FourKg, QualityClass::Class2, 26, 25)
        .count(Fruit::Hass, BoxType::TenKg, QualityClass::Class1, 18, 12)
        .count(Fruit::Hass, BoxType::TenKg, QualityClass::Class2, 32, 8)
        .build()
}

/// 按重量列表构造对账请求
pub fn reconcile_request(weights: &[f64]) -> ReconcileRequest {
    ReconcileRequest {
        crates: Some(weights.iter().map(|w| RejectedCrate::with_weight(*w)).collect()),
        notes: None,
        processed_by: Some("qc-officer".to_string()),
    }
}
