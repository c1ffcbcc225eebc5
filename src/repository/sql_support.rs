// ==========================================
// 鲜果出口仓储 - 仓储层 SQL 公共工具
// ==========================================
// 职责: 行字段解码 (JSON 块/时间戳) + 过滤条件拼装
// 约束: 用户输入一律参数化,只有列名和 LIMIT 进入 SQL 文本
// ==========================================

use crate::db::parse_timestamp;
use crate::domain::query::RecordFilter;
use chrono::NaiveDateTime;
use rusqlite::types::Type;
use rusqlite::Row;
use serde::de::DeserializeOwned;

/// 读取 JSON 文本列并反序列化
pub(crate) fn get_json<T: DeserializeOwned>(row: &Row<'_>, idx: usize) -> rusqlite::Result<T> {
    let raw: String = row.get(idx)?;
    serde_json::from_str(&raw)
        .map_err(|e| rusqlite::Error::FromSqlConversionFailure(idx, Type::Text, Box::new(e)))
}

/// 读取时间戳列
pub(crate) fn get_timestamp(row: &Row<'_>, idx: usize) -> rusqlite::Result<NaiveDateTime> {
    let raw: String = row.get(idx)?;
    parse_timestamp(&raw).ok_or_else(|| {
        rusqlite::Error::FromSqlConversionFailure(
            idx,
            Type::Text,
            format!("无法解析时间戳: {}", raw).into(),
        )
    })
}

/// LIKE 子串模式,转义 % _ \
pub(crate) fn like_pattern(query: &str) -> String {
    let mut escaped = String::with_capacity(query.len() + 2);
    escaped.push('%');
    for ch in query.chars() {
        if matches!(ch, '%' | '_' | '\\') {
            escaped.push('\\');
        }
        escaped.push(ch);
    }
    escaped.push('%');
    escaped
}

/// 由 RecordFilter 拼装 WHERE 子句
///
/// # 返回
/// - (where_sql, params): where_sql 为空串表示无条件,否则以 " WHERE " 开头
///
/// # 说明
/// - status 只在 `with_status` 为 true 时生效 (拒收表无 status 列)
pub(crate) fn build_filter_clause(filter: &RecordFilter, with_status: bool) -> (String, Vec<String>) {
    let mut conditions: Vec<&'static str> = Vec::new();
    let mut params: Vec<String> = Vec::new();

    if let Some(q) = filter.normalized_query() {
        conditions.push(
            "(supplier_name LIKE ? ESCAPE '\\' OR pallet_id LIKE ? ESCAPE '\\' OR region LIKE ? ESCAPE '\\')",
        );
        let pattern = like_pattern(q);
        params.extend(std::iter::repeat(pattern).take(3));
    }
    if let Some(from) = filter.submitted_from {
        conditions.push("substr(submitted_at, 1, 10) >= ?");
        params.push(from.format("%Y-%m-%d").to_string());
    }
    if let Some(to) = filter.submitted_to {
        conditions.push("substr(submitted_at, 1, 10) <= ?");
        params.push(to.format("%Y-%m-%d").to_string());
    }
    if with_status {
        if let Some(status) = filter.status {
            conditions.push("status = ?");
            params.push(status.as_str().to_string());
        }
    }

    if conditions.is_empty() {
        (String::new(), params)
    } else {
        (format!(" WHERE {}", conditions.join(" AND ")), params)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::types::CountingStatus;
    use chrono::NaiveDate;

    #[test]
    fn test_like_pattern_escapes_wildcards() {
        assert_eq!(like_pattern("abc"), "%abc%");
        assert_eq!(like_pattern("10%_x"), "%10\\%\\_x%");
    }

    #[test]
    fn test_build_filter_clause() {
        let (sql, params) = build_filter_clause(&RecordFilter::default(), true);
        assert!(sql.is_empty());
        assert!(params.is_empty());

        let filter = RecordFilter {
            query: Some(" Nyeri ".to_string()),
            submitted_from: NaiveDate::from_ymd_opt(2026, 1, 1),
            submitted_to: None,
            status: Some(CountingStatus::PendingColdroom),
        };
        let (sql, params) = build_filter_clause(&filter, true);
        assert!(sql.starts_with(" WHERE "));
        assert!(sql.contains("status = ?"));
        assert_eq!(params.len(), 5);
        assert_eq!(params[0], "%Nyeri%");
        assert_eq!(params[3], "2026-01-01");
        assert_eq!(params[4], "pending_coldroom");

        let (sql, params) = build_filter_clause(&filter, false);
        assert!(!sql.contains("status"));
        assert_eq!(params.len(), 4);
    }
}
