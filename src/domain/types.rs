// ==========================================
// 鲜果出口仓储 - 领域类型定义
// ==========================================
// 品种 / 箱型 / 等级 / 记录状态 / 偏差等级
// 序列化格式: snake_case (与数据库一致)
// ==========================================

use serde::{Deserialize, Serialize};
use std::fmt;

// ==========================================
// 品种 (Fruit Family)
// ==========================================
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Fruit {
    Fuerte,
    Hass,
}

impl Fruit {
    pub const ALL: [Fruit; 2] = [Fruit::Fuerte, Fruit::Hass];

    pub fn as_str(&self) -> &'static str {
        match self {
            Fruit::Fuerte => "fuerte",
            Fruit::Hass => "hass",
        }
    }
}

impl fmt::Display for Fruit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ==========================================
// 箱型 (Box Type)
// ==========================================
// 尺码表按箱型查表,新增尺码只改这里
const SIZES_4KG: &[u32] = &[12, 14, 16, 18, 20, 22, 24, 26];
const SIZES_10KG: &[u32] = &[12, 14, 16, 18, 20, 22, 24, 26, 28, 30, 32];

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum BoxType {
    #[serde(rename = "4kg")]
    FourKg,
    #[serde(rename = "10kg")]
    TenKg,
}

impl BoxType {
    pub const ALL: [BoxType; 2] = [BoxType::FourKg, BoxType::TenKg];

    pub fn as_str(&self) -> &'static str {
        match self {
            BoxType::FourKg => "4kg",
            BoxType::TenKg => "10kg",
        }
    }

    /// 该箱型允许录入的尺码
    pub fn sizes(&self) -> &'static [u32] {
        match self {
            BoxType::FourKg => SIZES_4KG,
            BoxType::TenKg => SIZES_10KG,
        }
    }

    /// 单箱标称重量（kg）
    ///
    /// 只由箱型决定,不是实际称重
    pub fn unit_weight_kg(&self) -> f64 {
        match self {
            BoxType::FourKg => 4.0,
            BoxType::TenKg => 10.0,
        }
    }
}

impl fmt::Display for BoxType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ==========================================
// 品质等级 (Quality Class)
// ==========================================
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum QualityClass {
    Class1,
    Class2,
}

impl QualityClass {
    pub const ALL: [QualityClass; 2] = [QualityClass::Class1, QualityClass::Class2];

    pub fn as_str(&self) -> &'static str {
        match self {
            QualityClass::Class1 => "class1",
            QualityClass::Class2 => "class2",
        }
    }
}

impl fmt::Display for QualityClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ==========================================
// 点数记录状态 (Counting Status)
// ==========================================
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CountingStatus {
    PendingColdroom,
    #[default]
    PendingRejection,
    Completed,
}

impl CountingStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            CountingStatus::PendingColdroom => "pending_coldroom",
            CountingStatus::PendingRejection => "pending_rejection",
            CountingStatus::Completed => "completed",
        }
    }

    /// 从字符串解析,未知值返回 None
    pub fn parse(s: &str) -> Option<Self> {
        match s.trim() {
            "pending_coldroom" => Some(CountingStatus::PendingColdroom),
            "pending_rejection" => Some(CountingStatus::PendingRejection),
            "completed" => Some(CountingStatus::Completed),
            _ => None,
        }
    }

    /// 调用方给出的状态不合法时回落到默认值
    pub fn from_requested(requested: Option<&str>) -> Self {
        requested.and_then(Self::parse).unwrap_or_default()
    }

    pub fn is_pending(&self) -> bool {
        matches!(
            self,
            CountingStatus::PendingColdroom | CountingStatus::PendingRejection
        )
    }
}

impl fmt::Display for CountingStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ==========================================
// 重量偏差等级 (Variance Level)
// ==========================================
// 红线: 等级由 |偏差| 决定,不区分正负
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum VarianceLevel {
    Low,
    Medium,
    High,
}

impl VarianceLevel {
    pub fn as_str(&self) -> &'static str {
        match self {
            VarianceLevel::Low => "low",
            VarianceLevel::Medium => "medium",
            VarianceLevel::High => "high",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s.trim() {
            "low" => Some(VarianceLevel::Low),
            "medium" => Some(VarianceLevel::Medium),
            "high" => Some(VarianceLevel::High),
            _ => None,
        }
    }
}

impl fmt::Display for VarianceLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_box_type_size_table() {
        assert_eq!(BoxType::FourKg.sizes().len(), 8);
        assert_eq!(BoxType::TenKg.sizes().len(), 11);
        assert_eq!(BoxType::FourKg.sizes().last(), Some(&26));
        assert_eq!(BoxType::TenKg.sizes().last(), Some(&32));
    }

    #[test]
    fn test_counting_status_fallback() {
        assert_eq!(
            CountingStatus::from_requested(Some("pending_coldroom")),
            CountingStatus::PendingColdroom
        );
        assert_eq!(
            CountingStatus::from_requested(Some("archived")),
            CountingStatus::PendingRejection
        );
        assert_eq!(
            CountingStatus::from_requested(None),
            CountingStatus::PendingRejection
        );
    }

    #[test]
    fn test_serde_names() {
        assert_eq!(serde_json::to_string(&BoxType::TenKg).unwrap(), "\"10kg\"");
        assert_eq!(
            serde_json::to_string(&CountingStatus::PendingRejection).unwrap(),
            "\"pending_rejection\""
        );
        assert_eq!(serde_json::to_string(&VarianceLevel::High).unwrap(), "\"high\"");
    }
}
