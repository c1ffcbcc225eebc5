// ==========================================
// 鲜果出口仓储 - 点数记录数据仓储
// ==========================================
// 对齐: counting_records 表
// 红线: Repository 不含业务逻辑,只负责数据访问
// 重复供应商由 uq_counting_supplier 唯一索引拦截
// ==========================================

use crate::db::format_timestamp;
use crate::domain::counting::CountingRecord;
use crate::domain::query::RecordFilter;
use crate::domain::types::CountingStatus;
use crate::repository::error::{RepositoryError, RepositoryResult};
use crate::repository::sql_support::{build_filter_clause, get_json, get_timestamp};
use rusqlite::{params, params_from_iter, Connection, OptionalExtension, Result as SqliteResult, Row};
use std::sync::{Arc, Mutex};

const SELECT_COLUMNS: &str = r#"
    SELECT id, supplier_id, supplier_name, supplier_phone, region, pallet_id,
           total_weight, counting_data, totals, total_counted_weight,
           status, submitted_at, processed_by
    FROM counting_records
"#;

// ==========================================
// CountingRecordRepository - 点数记录仓储
// ==========================================
pub struct CountingRecordRepository {
    conn: Arc<Mutex<Connection>>,
}

impl CountingRecordRepository {
    /// 从共享连接创建仓储实例
    pub fn new(conn: Arc<Mutex<Connection>>) -> Self {
        Self { conn }
    }

    /// 获取数据库连接
    fn get_conn(&self) -> RepositoryResult<std::sync::MutexGuard<'_, Connection>> {
        self.conn
            .lock()
            .map_err(|e| RepositoryError::LockError(e.to_string()))
    }

    // ==========================================
    // 写入操作
    // ==========================================

    /// 插入点数记录
    ///
    /// # 返回
    /// - Err(UniqueConstraintViolation): 该供应商已有在途记录
    pub fn insert(&self, record: &CountingRecord) -> RepositoryResult<()> {
        let counting_data = serde_json::to_string(&record.counting_data)
            .map_err(|e| RepositoryError::serialization("counting_data", e))?;
        let totals = serde_json::to_string(&record.totals)
            .map_err(|e| RepositoryError::serialization("totals", e))?;

        let conn = self.get_conn()?;
        conn.execute(
            r#"
            INSERT INTO counting_records (
                id, supplier_id, supplier_name, supplier_phone, region, pallet_id,
                total_weight, counting_data, totals, total_counted_weight,
                status, submitted_at, processed_by
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13)
            "#,
            params![
                record.id,
                record.supplier_id,
                record.supplier_name,
                record.supplier_phone,
                record.region,
                record.pallet_id,
                record.total_weight,
                counting_data,
                totals,
                record.total_counted_weight,
                record.status.as_str(),
                format_timestamp(&record.submitted_at),
                record.processed_by,
            ],
        )?;
        Ok(())
    }

    /// 按ID删除
    ///
    /// # 返回
    /// - Ok(rows): 受影响行数 (0 表示不存在)
    pub fn delete_by_id(&self, id: &str) -> RepositoryResult<usize> {
        let conn = self.get_conn()?;
        let rows = conn.execute("DELETE FROM counting_records WHERE id = ?1", params![id])?;
        Ok(rows)
    }

    // ==========================================
    // 查询操作
    // ==========================================

    /// 按ID查询
    pub fn find_by_id(&self, id: &str) -> RepositoryResult<Option<CountingRecord>> {
        let conn = self.get_conn()?;
        let sql = format!("{} WHERE id = ?1", SELECT_COLUMNS);
        let record = conn
            .query_row(&sql, params![id], map_counting_row)
            .optional()?;
        Ok(record)
    }

    /// 按供应商ID查询在途记录
    pub fn find_by_supplier_id(&self, supplier_id: &str) -> RepositoryResult<Option<CountingRecord>> {
        let conn = self.get_conn()?;
        let sql = format!("{} WHERE supplier_id = ?1", SELECT_COLUMNS);
        let record = conn
            .query_row(&sql, params![supplier_id], map_counting_row)
            .optional()?;
        Ok(record)
    }

    /// 按状态列出 (新提交在前)
    pub fn list(&self, status: Option<CountingStatus>, limit: usize) -> RepositoryResult<Vec<CountingRecord>> {
        let filter = RecordFilter {
            status,
            ..Default::default()
        };
        self.search(&filter, limit)
    }

    /// 条件检索 (新提交在前)
    pub fn search(&self, filter: &RecordFilter, limit: usize) -> RepositoryResult<Vec<CountingRecord>> {
        let (where_sql, args) = build_filter_clause(filter, true);
        let sql = format!(
            "{}{} ORDER BY submitted_at DESC, rowid DESC LIMIT {}",
            SELECT_COLUMNS, where_sql, limit
        );

        let conn = self.get_conn()?;
        let mut stmt = conn.prepare(&sql)?;
        let records = stmt
            .query_map(params_from_iter(args.iter()), map_counting_row)?
            .collect::<SqliteResult<Vec<_>>>()?;
        Ok(records)
    }
}

/// 行映射
pub(crate) fn map_counting_row(row: &Row<'_>) -> SqliteResult<CountingRecord> {
    let status: String = row.get(10)?;
    Ok(CountingRecord {
        id: row.get(0)?,
        supplier_id: row.get(1)?,
        supplier_name: row.get(2)?,
        supplier_phone: row.get(3)?,
        region: row.get(4)?,
        pallet_id: row.get(5)?,
        total_weight: row.get(6)?,
        counting_data: get_json(row, 7)?,
        totals: get_json(row, 8)?,
        total_counted_weight: row.get(9)?,
        status: CountingStatus::parse(&status).unwrap_or_default(),
        submitted_at: get_timestamp(row, 11)?,
        processed_by: row.get(12)?,
    })
}
