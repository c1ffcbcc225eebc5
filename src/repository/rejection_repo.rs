// ==========================================
// 鲜果出口仓储 - 拒收记录数据仓储
// ==========================================
// 对齐: rejection_records 表
// 红线: 拒收记录只追加,不提供更新/删除
// 红线: 点数记录 → 拒收记录 的替换在单个事务内完成
// ==========================================

use crate::db::format_timestamp;
use crate::domain::counting::CountingTotals;
use crate::domain::query::RecordFilter;
use crate::domain::rejection::{RejectionRecord, RejectionStats};
use crate::domain::types::{BoxType, Fruit, VarianceLevel};
use crate::repository::error::{RepositoryError, RepositoryResult};
use crate::repository::sql_support::{build_filter_clause, get_json, get_timestamp};
use chrono::{Duration, NaiveDateTime};
use rusqlite::types::Type;
use rusqlite::{params, params_from_iter, Connection, OptionalExtension, Result as SqliteResult, Row};
use std::sync::{Arc, Mutex};

const SELECT_COLUMNS: &str = r#"
    SELECT id, supplier_id, supplier_name, supplier_phone, region, pallet_id,
           counting_data, totals,
           total_intake_weight, total_counted_weight, total_rejected_weight,
           weight_variance, variance_level, crates, notes, processed_by,
           submitted_at, original_counting_id
    FROM rejection_records
"#;

// ==========================================
// RejectionRecordRepository - 拒收记录仓储
// ==========================================
pub struct RejectionRecordRepository {
    conn: Arc<Mutex<Connection>>,
}

impl RejectionRecordRepository {
    /// 从共享连接创建仓储实例
    ///
    /// 必须与 CountingRecordRepository 共用同一连接,事务才覆盖两张表
    pub fn new(conn: Arc<Mutex<Connection>>) -> Self {
        Self { conn }
    }

    fn get_conn(&self) -> RepositoryResult<std::sync::MutexGuard<'_, Connection>> {
        self.conn
            .lock()
            .map_err(|e| RepositoryError::LockError(e.to_string()))
    }

    // ==========================================
    // 写入操作
    // ==========================================

    /// 消费点数记录并写入拒收记录 (单事务)
    ///
    /// 步骤:
    /// 1. DELETE counting_records WHERE id = original_counting_id
    /// 2. 0 行受影响 → 回滚, NotFound (已被对账/删除)
    /// 3. INSERT rejection_records
    /// 4. COMMIT
    ///
    /// 任一步失败事务随 drop 回滚,两张表保持原状
    pub fn insert_consuming_counting(&self, record: &RejectionRecord) -> RepositoryResult<()> {
        let counting_data = serde_json::to_string(&record.counting_data)
            .map_err(|e| RepositoryError::serialization("counting_data", e))?;
        let totals = serde_json::to_string(&record.totals)
            .map_err(|e| RepositoryError::serialization("totals", e))?;
        let crates = serde_json::to_string(&record.crates)
            .map_err(|e| RepositoryError::serialization("crates", e))?;

        let mut conn = self.get_conn()?;
        let tx = conn
            .transaction()
            .map_err(|e| RepositoryError::DatabaseTransactionError(e.to_string()))?;

        let consumed = tx.execute(
            "DELETE FROM counting_records WHERE id = ?1",
            params![record.original_counting_id],
        )?;
        if consumed == 0 {
            return Err(RepositoryError::NotFound {
                entity: "CountingRecord".to_string(),
                id: record.original_counting_id.clone(),
            });
        }

        tx.execute(
            r#"
            INSERT INTO rejection_records (
                id, supplier_id, supplier_name, supplier_phone, region, pallet_id,
                counting_data, totals,
                total_intake_weight, total_counted_weight, total_rejected_weight,
                weight_variance, variance_level, crates, notes, processed_by,
                submitted_at, original_counting_id
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13, ?14, ?15, ?16, ?17, ?18)
            "#,
            params![
                record.id,
                record.supplier_id,
                record.supplier_name,
                record.supplier_phone,
                record.region,
                record.pallet_id,
                counting_data,
                totals,
                record.total_intake_weight,
                record.total_counted_weight,
                record.total_rejected_weight,
                record.weight_variance,
                record.variance_level.as_str(),
                crates,
                record.notes,
                record.processed_by,
                format_timestamp(&record.submitted_at),
                record.original_counting_id,
            ],
        )?;

        tx.commit()
            .map_err(|e| RepositoryError::DatabaseTransactionError(e.to_string()))?;
        Ok(())
    }

    // ==========================================
    // 查询操作
    // ==========================================

    /// 按ID查询
    pub fn find_by_id(&self, id: &str) -> RepositoryResult<Option<RejectionRecord>> {
        let conn = self.get_conn()?;
        let sql = format!("{} WHERE id = ?1", SELECT_COLUMNS);
        let record = conn
            .query_row(&sql, params![id], map_rejection_row)
            .optional()?;
        Ok(record)
    }

    /// 按原点数记录ID查询
    pub fn find_by_counting_id(&self, counting_id: &str) -> RepositoryResult<Option<RejectionRecord>> {
        let conn = self.get_conn()?;
        let sql = format!("{} WHERE original_counting_id = ?1", SELECT_COLUMNS);
        let record = conn
            .query_row(&sql, params![counting_id], map_rejection_row)
            .optional()?;
        Ok(record)
    }

    /// 历史检索 (新提交在前)
    pub fn search(&self, filter: &RecordFilter, limit: usize) -> RepositoryResult<Vec<RejectionRecord>> {
        let (where_sql, args) = build_filter_clause(filter, false);
        let sql = format!(
            "{}{} ORDER BY submitted_at DESC, rowid DESC LIMIT {}",
            SELECT_COLUMNS, where_sql, limit
        );

        let conn = self.get_conn()?;
        let mut stmt = conn.prepare(&sql)?;
        let records = stmt
            .query_map(params_from_iter(args.iter()), map_rejection_row)?
            .collect::<SqliteResult<Vec<_>>>()?;
        Ok(records)
    }

    /// 按供应商列出 (新提交在前)
    pub fn list_by_supplier(&self, supplier_id: &str, limit: usize) -> RepositoryResult<Vec<RejectionRecord>> {
        let sql = format!(
            "{} WHERE supplier_id = ?1 ORDER BY submitted_at DESC, rowid DESC LIMIT {}",
            SELECT_COLUMNS, limit
        );

        let conn = self.get_conn()?;
        let mut stmt = conn.prepare(&sql)?;
        let records = stmt
            .query_map(params![supplier_id], map_rejection_row)?
            .collect::<SqliteResult<Vec<_>>>()?;
        Ok(records)
    }

    // ==========================================
    // 统计
    // ==========================================

    /// 驾驶舱统计
    ///
    /// # 参数
    /// - now: 统计基准时间 (7/30 天窗口从此倒推)
    pub fn stats(&self, now: NaiveDateTime) -> RepositoryResult<RejectionStats> {
        let since_7 = format_timestamp(&(now - Duration::days(7)));
        let since_30 = format_timestamp(&(now - Duration::days(30)));

        let conn = self.get_conn()?;

        let (total_processed, distinct_suppliers, last_7_days, last_30_days, high_variance_count): (
            i64,
            i64,
            i64,
            i64,
            i64,
        ) = conn.query_row(
            r#"
            SELECT
                COUNT(*),
                COUNT(DISTINCT supplier_id),
                COALESCE(SUM(CASE WHEN submitted_at >= ?1 THEN 1 ELSE 0 END), 0),
                COALESCE(SUM(CASE WHEN submitted_at >= ?2 THEN 1 ELSE 0 END), 0),
                COALESCE(SUM(CASE WHEN variance_level = ?3 THEN 1 ELSE 0 END), 0)
            FROM rejection_records
            "#,
            params![since_7, since_30, VarianceLevel::High.as_str()],
            |row| Ok((row.get(0)?, row.get(1)?, row.get(2)?, row.get(3)?, row.get(4)?)),
        )?;

        let pending_count: i64 = conn.query_row(
            "SELECT COUNT(*) FROM counting_records WHERE status IN ('pending_coldroom', 'pending_rejection')",
            [],
            |row| row.get(0),
        )?;

        let mut stats = RejectionStats {
            total_processed,
            pending_count,
            distinct_suppliers,
            last_7_days,
            last_30_days,
            high_variance_count,
            ..Default::default()
        };

        let mut stmt = conn.prepare("SELECT totals FROM rejection_records")?;
        let all_totals = stmt
            .query_map([], |row| get_json::<CountingTotals>(row, 0))?
            .collect::<SqliteResult<Vec<_>>>()?;
        for totals in &all_totals {
            stats.fuerte_4kg_boxes = stats
                .fuerte_4kg_boxes
                .saturating_add(totals.box_total(Fruit::Fuerte, BoxType::FourKg));
            stats.fuerte_10kg_boxes = stats
                .fuerte_10kg_boxes
                .saturating_add(totals.box_total(Fruit::Fuerte, BoxType::TenKg));
            stats.hass_4kg_boxes = stats
                .hass_4kg_boxes
                .saturating_add(totals.box_total(Fruit::Hass, BoxType::FourKg));
            stats.hass_10kg_boxes = stats
                .hass_10kg_boxes
                .saturating_add(totals.box_total(Fruit::Hass, BoxType::TenKg));
        }

        Ok(stats)
    }
}

/// 行映射
fn map_rejection_row(row: &Row<'_>) -> SqliteResult<RejectionRecord> {
    let level: String = row.get(12)?;
    let variance_level = VarianceLevel::parse(&level).ok_or_else(|| {
        rusqlite::Error::FromSqlConversionFailure(
            12,
            Type::Text,
            format!("未知偏差等级: {}", level).into(),
        )
    })?;

    Ok(RejectionRecord {
        id: row.get(0)?,
        supplier_id: row.get(1)?,
        supplier_name: row.get(2)?,
        supplier_phone: row.get(3)?,
        region: row.get(4)?,
        pallet_id: row.get(5)?,
        counting_data: get_json(row, 6)?,
        totals: get_json(row, 7)?,
        total_intake_weight: row.get(8)?,
        total_counted_weight: row.get(9)?,
        total_rejected_weight: row.get(10)?,
        weight_variance: row.get(11)?,
        variance_level,
        crates: get_json(row, 13)?,
        notes: row.get(14)?,
        processed_by: row.get(15)?,
        submitted_at: get_timestamp(row, 16)?,
        original_counting_id: row.get(17)?,
    })
}
