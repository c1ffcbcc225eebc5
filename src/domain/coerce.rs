// ==========================================
// 鲜果出口仓储 - 表单数值宽松转换
// ==========================================
// 红线: 转换永不报错,失败一律按 0 处理
// 表单常出现空串/半填写,这里不向调用方回报格式问题
// ==========================================

use serde::{Deserialize, Deserializer};
use serde_json::Value;

/// 箱数转换: 整数原样,小数/数字字符串向零截断,其余为 0
pub fn coerce_count(value: &Value) -> i64 {
    match value {
        Value::Number(n) => {
            if let Some(i) = n.as_i64() {
                i
            } else {
                n.as_f64().map(truncate_finite).unwrap_or(0)
            }
        }
        Value::String(s) => {
            let s = s.trim();
            match s.parse::<i64>() {
                Ok(i) => i,
                Err(_) => s.parse::<f64>().map(truncate_finite).unwrap_or(0),
            }
        }
        _ => 0,
    }
}

/// 重量转换: 数字或数字字符串,其余为 0.0
pub fn coerce_weight(value: &Value) -> f64 {
    let w = match value {
        Value::Number(n) => n.as_f64().unwrap_or(0.0),
        Value::String(s) => s.trim().parse::<f64>().unwrap_or(0.0),
        _ => 0.0,
    };
    if w.is_finite() {
        w
    } else {
        0.0
    }
}

/// 布尔转换: true / "true" / "1" / 非零数字为真
pub fn coerce_flag(value: &Value) -> bool {
    match value {
        Value::Bool(b) => *b,
        Value::String(s) => matches!(s.trim().to_ascii_lowercase().as_str(), "true" | "1" | "yes"),
        Value::Number(n) => n.as_f64().map(|f| f != 0.0).unwrap_or(false),
        _ => false,
    }
}

fn truncate_finite(f: f64) -> i64 {
    if f.is_finite() {
        f.trunc() as i64
    } else {
        0
    }
}

// ==========================================
// serde 宽松反序列化 (用于 #[serde(deserialize_with)])
// ==========================================

pub fn lenient_weight<'de, D>(deserializer: D) -> Result<f64, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Value::deserialize(deserializer)?;
    Ok(coerce_weight(&value))
}

pub fn lenient_flag<'de, D>(deserializer: D) -> Result<bool, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Value::deserialize(deserializer)?;
    Ok(coerce_flag(&value))
}
