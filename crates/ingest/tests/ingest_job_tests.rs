use async_trait::async_trait;
use chrono::{Duration, NaiveDate, Utc};
use kabu_core::config::IngestConfig;
use kabu_core::market::entity::PriceBar;
use kabu_core::market::error::MarketError;
use kabu_core::market::port::PriceProvider;
use kabu_core::store::port::PriceStore;
use kabu_ingest::IngestJob;
use kabu_store::config::set_root_dir;
use kabu_store::price::SqlitePriceStore;
use std::collections::HashMap;
use std::sync::Arc;
use tempfile::tempdir;

/// 测试用数据源：每个 symbol 一份固定的 Bar 序列，按请求窗口过滤。
struct MockProvider {
    bars: HashMap<String, Vec<PriceBar>>,
}

#[async_trait]
impl PriceProvider for MockProvider {
    async fn fetch_daily_bars(
        &self,
        symbol: &str,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<Vec<PriceBar>, MarketError> {
        Ok(self
            .bars
            .get(symbol)
            .cloned()
            .unwrap_or_default()
            .into_iter()
            .filter(|b| b.date >= start && b.date <= end)
            .collect())
    }
}

fn bar(date: NaiveDate, close: f64) -> PriceBar {
    PriceBar {
        date,
        open: close - 1.0,
        high: close + 1.0,
        low: close - 2.0,
        close,
        volume: 10_000,
    }
}

/// # Summary
/// 摄取任务的核心场景：首跑入库、带新增数据的重跑、以及无新增时的重跑。
///
/// # Logic
/// 1. 首跑：两天数据全部插入。
/// 2. 数据源追加一天后重跑：只有新的一天被插入，既有两行保持原值。
/// 3. 无新增时再跑：窗口收敛到"最近日期次日"，零插入零改动。
#[tokio::test]
async fn test_ingest_run_and_rerun() {
    let tmp_dir = tempdir().expect("Failed to create temp dir");
    set_root_dir(tmp_dir.path().to_path_buf());

    let store: Arc<SqlitePriceStore> =
        Arc::new(SqlitePriceStore::new().await.expect("price store"));

    let today = Utc::now().date_naive();
    let d1 = today - Duration::days(2);
    let d2 = today - Duration::days(1);

    let mut bars = HashMap::new();
    bars.insert("ABC".to_string(), vec![bar(d1, 100.0), bar(d2, 101.0)]);

    let config = IngestConfig {
        symbols: vec!["ABC".to_string()],
        lookback_days: 30,
    };

    // 1. 首跑
    let provider = Arc::new(MockProvider { bars: bars.clone() });
    let job = IngestJob::new(provider, store.clone(), config.clone());
    let report = job.run().await;

    assert_eq!(report.succeeded(), 1);
    assert_eq!(report.failed(), 0);
    assert_eq!(report.bars_inserted(), 2);

    let stored = store.list_bars("ABC", None).await.unwrap();
    assert_eq!(stored.len(), 2);

    // 2. 数据源追加一天（同时仍返回旧的两天）后重跑
    bars.get_mut("ABC")
        .unwrap()
        .push(bar(today, 102.0));
    let provider = Arc::new(MockProvider { bars: bars.clone() });
    let job = IngestJob::new(provider, store.clone(), config.clone());
    let report = job.run().await;

    assert_eq!(report.bars_inserted(), 1); // 只有新的一天
    let stored = store.list_bars("ABC", None).await.unwrap();
    assert_eq!(stored.len(), 3);
    // 日期降序：today, d2, d1；旧值未被改动
    assert_eq!(stored[0].date, today);
    assert_eq!(stored[0].close, 102.0);
    assert_eq!(stored[1].close, 101.0);
    assert_eq!(stored[2].close, 100.0);

    // 3. 无新增时重跑：幂等，零插入
    let provider = Arc::new(MockProvider { bars });
    let job = IngestJob::new(provider, store.clone(), config);
    let report = job.run().await;

    assert_eq!(report.bars_inserted(), 0);
    assert_eq!(report.failed(), 0);
    assert_eq!(store.list_bars("ABC", None).await.unwrap().len(), 3);
}
