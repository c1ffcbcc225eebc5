// ==========================================
// 鲜果出口仓储 - 演示数据灌入工具
// ==========================================
// 用法:
//   cargo run --bin seed_demo_intake -- [db_path] [supplier_count]
//
// 职责: 备份并重置数据库,写入演示点数记录
// 约三分之一供应商当场完成对账,便于统计/历史页面有数据
// ==========================================

use chrono::Local;
use std::error::Error;
use std::fs;
use std::path::Path;

use produce_intake::app::{get_default_db_path, AppState};
use produce_intake::domain::{
    BoxType, CountingData, Fruit, NewCountingRecord, QualityClass, ReconcileRequest, RejectedCrate,
};
use produce_intake::engine::VarianceThresholds;

const DEFAULT_SUPPLIER_COUNT: usize = 24;
const REGIONS: [&str; 4] = ["Murang'a", "Meru", "Kisii", "Nyeri"];

fn main() -> Result<(), Box<dyn Error>> {
    produce_intake::logging::init();

    let db_path = std::env::args()
        .nth(1)
        .unwrap_or_else(get_default_db_path);

    let supplier_count = std::env::args()
        .nth(2)
        .and_then(|s| s.parse::<usize>().ok())
        .unwrap_or(DEFAULT_SUPPLIER_COUNT)
        .max(1);

    backup_and_reset_db(&db_path)?;

    let state = AppState::with_settings(db_path.clone(), VarianceThresholds::default(), 500)?;

    let mut reconciled = 0usize;
    for i in 0..supplier_count {
        let record = state.counting_api.create_counting_record(demo_input(i))?;

        if i % 3 == 0 {
            // 拒收重量按点数重量的比例给出,偏差覆盖 low/medium/high
            let rejected = (record.total_weight - record.total_counted_weight) - (i % 25) as f64;
            let request = ReconcileRequest {
                crates: Some(vec![
                    RejectedCrate::with_weight((rejected * 0.6).max(0.0)),
                    RejectedCrate::with_weight((rejected * 0.4).max(0.0)),
                ]),
                notes: Some("demo".to_string()),
                processed_by: Some("seed".to_string()),
            };
            state
                .rejection_api
                .reconcile_to_rejection(&record.id, request)?;
            reconciled += 1;
        }
    }

    let stats = state.rejection_api.try_rejection_stats()?;
    eprintln!(
        "Seeded {} suppliers into {} ({} reconciled, {} pending)",
        supplier_count, db_path, reconciled, stats.pending_count
    );
    println!("{}", serde_json::to_string_pretty(&stats)?);
    Ok(())
}

fn backup_and_reset_db(db_path: &str) -> Result<(), Box<dyn Error>> {
    let path = Path::new(db_path);
    if !path.exists() {
        return Ok(());
    }

    let ts = Local::now().format("%Y%m%d_%H%M%S").to_string();
    let backup_path = format!("{}.bak.{}", db_path, ts);
    fs::copy(path, &backup_path)?;
    fs::remove_file(path)?;

    eprintln!("Backed up {} -> {}", db_path, backup_path);
    Ok(())
}

/// 确定性生成第 i 个供应商的点数
fn demo_input(i: usize) -> NewCountingRecord {
    let mut data = CountingData::default();
    for (fi, fruit) in Fruit::ALL.iter().enumerate() {
        for box_type in [BoxType::FourKg, BoxType::TenKg] {
            for (si, size) in box_type.sizes().iter().enumerate() {
                let seed = (i * 7 + fi * 3 + si * 5) % 11;
                if seed < 4 {
                    continue;
                }
                data.set_count(*fruit, box_type, QualityClass::Class1, *size, seed as i64);
                data.set_count(*fruit, box_type, QualityClass::Class2, *size, (seed / 3) as i64);
            }
        }
    }

    let totals = produce_intake::SizeTallyAggregator::new().aggregate(&data);
    let counted = produce_intake::engine::derive_counted_weight(&totals);

    NewCountingRecord {
        supplier_id: Some(format!("SUP-{:04}", i + 1)),
        supplier_name: Some(format!("Demo Grower {}", i + 1)),
        supplier_phone: Some(format!("+2547{:08}", 10_000_000 + i * 137)),
        region: Some(REGIONS[i % REGIONS.len()].to_string()),
        pallet_id: Some(format!("PAL-{:05}", 1000 + i)),
        total_weight: counted + 40.0 + (i % 9) as f64 * 5.0,
        counting_data: data,
        status: Some(if i % 4 == 1 { "pending_coldroom" } else { "pending_rejection" }.to_string()),
        processed_by: Some("seed".to_string()),
    }
}
