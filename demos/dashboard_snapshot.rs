//! 看板快照展示
//!
//! 以記憶體資料來源載入一週的生產資料，輸出五項指標。
//!
//! ```bash
//! RUST_LOG=debug cargo run --example dashboard_snapshot
//! ```

use chrono::NaiveDate;
use rust_decimal::Decimal;
use shiftboard::calc::{ParetoDimension, StopScope};
use shiftboard::model::{
    DateRange, Line, OrderStatus, Product, RawOrder, RawProductionRecord, RawStopEvent,
    RawWeeklyPlanEntry, RecordFilter,
};
use shiftboard::{DashboardService, EngineConfig, InMemoryDataStore, MetricsCalculator, RawSnapshot};
use tracing_subscriber::{fmt, EnvFilter};

fn init_logging() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_line_number(true)
        .init();
}

fn date(day: u32) -> anyhow::Result<NaiveDate> {
    NaiveDate::from_ymd_opt(2025, 11, day)
        .ok_or_else(|| anyhow::anyhow!("無效日期: 2025-11-{}", day))
}

fn sample_data() -> anyhow::Result<RawSnapshot> {
    let products = vec![
        Product::new("SKU-001", "Water 500ml", Decimal::from(7200)).with_packaging(12, 80),
        Product::new("SKU-002", "Juice 1L", Decimal::from(4000)).with_packaging(6, 100),
    ];
    let lines = vec![Line::new("L1", "Line 1"), Line::new("L2", "Line 2")];

    let records = vec![
        RawProductionRecord::new(date(3)?, "A", "L1", "SKU-001", Decimal::from(6100)).with_stops(
            vec![
                RawStopEvent::with_duration("30min").at("Filler 2", "Bottle jam"),
                RawStopEvent::with_duration(45u32)
                    .typed("Scheduled")
                    .at("Filler 2", "CIP cleaning"),
            ],
        ),
        RawProductionRecord::new(date(3)?, "B", "L1", "Water 500ml", Decimal::from(5400))
            .with_hours_worked(Decimal::from(6))
            .with_stops(vec![
                RawStopEvent::with_duration(20u32).at("Capper", "Cap feed motor overload"),
                RawStopEvent::with_duration("15")
                    .typed("Changeover")
                    .at("Labeler", "Format change"),
            ]),
        RawProductionRecord::new(date(4)?, "A", "L2", "SKU-002", Decimal::from(3500)).with_stops(
            vec![RawStopEvent::with_duration("n/a").at("Palletizer", "Waiting for pallets")],
        ),
        // 舊資料以已停用的品名引用
        RawProductionRecord::new(date(4)?, "B", "Line 2", "Lemonade 330ml", Decimal::from(900)),
    ];

    let orders = vec![
        RawOrder::new("ACME Retail", date(2)?, OrderStatus::Delivered)
            .with_line("SKU-001", Decimal::from(4000)),
        RawOrder::new("Globex", date(6)?, OrderStatus::Pending)
            .with_line("SKU-001", Decimal::from(6000))
            .with_line("SKU-002", Decimal::from(1200)),
        RawOrder::new("Initech", date(7)?, OrderStatus::Scheduled)
            .with_line("Juice 1L", Decimal::from(3000)),
        RawOrder::new("Umbrella", date(8)?, OrderStatus::Cancelled)
            .with_line("SKU-002", Decimal::from(9999)),
    ];

    let weekly_plan = vec![
        RawWeeklyPlanEntry::new("SKU-001", date(3)?, Decimal::from(20000)),
        RawWeeklyPlanEntry::new("SKU-002", date(4)?, Decimal::from(3000)),
    ];

    Ok(RawSnapshot {
        products,
        lines,
        orders,
        records,
        weekly_plan,
    })
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    init_logging();

    let config = EngineConfig::default();
    let source = InMemoryDataStore::new(sample_data()?);
    let service = DashboardService::new(config.clone());

    let outcome = service.refresh(&source).await;
    tracing::info!("刷新結果: {:?}", outcome);

    let today = date(7)?;
    let week = DateRange::new(date(3)?, date(9)?)?;

    println!("=== 庫存 ===");
    for product in ["SKU-001", "SKU-002", "Lemonade 330ml"] {
        println!(
            "{:<16} 庫存 {:>8}  待出貨 {:>8}  預估 {:>8}",
            product,
            service.get_stock(product),
            service.get_pending_demand(product),
            service.get_forecast(product)
        );
        if let Some(balance) = service.get_snapshot_balance(product) {
            println!(
                "{:<16} 快照期初 {:>8}  快照預估 {:>8}  告急 {}",
                "",
                balance.seed_stock,
                balance.forecast,
                balance.critical
            );
        }
    }

    println!("\n=== 產線效率 ===");
    for line in ["L1", "L2"] {
        println!(
            "{} 可用率 {}%  性能率 {}%",
            line,
            service.get_line_availability(line, week, None).round_dp(1),
            service.get_line_performance(line, week, None).round_dp(1)
        );
    }

    println!("\n=== 停機 ===");
    let downtime = service.get_downtime_breakdown(week, None);
    println!(
        "總停機 {} 分鐘，瓶頸停機 {} 分鐘，MTTR {} 分鐘",
        downtime.raw_total(),
        downtime.bottleneck_total(),
        downtime.bottleneck.mttr_minutes.round_dp(1)
    );
    for entry in &downtime.bottleneck.pareto {
        println!(
            "  {:<12} {:>4} 分鐘  {:>6}%  累計 {:>6}%",
            entry.label,
            entry.minutes,
            entry.percentage.round_dp(1),
            entry.cumulative_percentage.round_dp(1)
        );
    }

    let snapshot = service.snapshot();
    let by_reason = MetricsCalculator::new(config).pareto(
        &snapshot,
        &RecordFilter::all().with_range(week),
        StopScope::All,
        ParetoDimension::ReasonCategory,
    );
    for entry in &by_reason {
        println!("  原因 {:<12} {:>4} 分鐘", entry.label, entry.minutes);
    }

    println!("\n=== 週目標 ===");
    let goals = service.get_weekly_goal_status(today);
    println!("剩餘 {} 天", goals.days_remaining);
    for goal in &goals.goals {
        println!(
            "  {:<10} {:>8} / {:>8}  {:>6}%  {:?}",
            goal.product,
            goal.actual,
            goal.planned,
            goal.progress.round_dp(1),
            goal.status
        );
    }

    println!("\n=== 訂單備貨 ===");
    for report in service.get_backlog() {
        let ready = service.is_order_ready(&report.order_id);
        println!("  {} {:?} 可出貨: {}", report.order_id, report.status, ready);
        for shortage in &report.shortages {
            println!("    {} 缺 {}", shortage.product, shortage.shortfall);
        }
    }

    for warning in service.warnings() {
        println!("[{:?}] {}: {}", warning.severity, warning.subject, warning.message);
    }

    Ok(())
}
