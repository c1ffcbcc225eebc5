// ==========================================
// 鲜果出口仓储 - 查询过滤条件
// ==========================================
// 点数记录与拒收历史共用
// ==========================================

use crate::domain::types::CountingStatus;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// 查询过滤条件
///
/// - `query`: 对 供应商名 / 托盘号 / 产区 做子串匹配
/// - `submitted_from` / `submitted_to`: 提交日期闭区间
/// - `status`: 仅对点数记录生效
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RecordFilter {
    #[serde(default)]
    pub query: Option<String>,
    #[serde(default)]
    pub submitted_from: Option<NaiveDate>,
    #[serde(default)]
    pub submitted_to: Option<NaiveDate>,
    #[serde(default)]
    pub status: Option<CountingStatus>,
}

impl RecordFilter {
    pub fn text(query: &str) -> Self {
        Self {
            query: Some(query.to_string()),
            ..Default::default()
        }
    }

    /// 去空白后的查询串,空串视为无条件
    pub fn normalized_query(&self) -> Option<&str> {
        self.query
            .as_deref()
            .map(str::trim)
            .filter(|q| !q.is_empty())
    }
}
