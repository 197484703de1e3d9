use chrono::{Duration, NaiveDate, Utc};
use kabu_core::common::Instrument;
use kabu_core::config::IngestConfig;
use kabu_core::market::error::MarketError;
use kabu_core::market::port::PriceProvider;
use kabu_core::store::error::StoreError;
use kabu_core::store::port::PriceStore;
use std::sync::Arc;
use thiserror::Error;
use tracing::{info, warn};

/// 单个 symbol 同步过程中可能出现的失败。
///
/// 仅在 [`IngestJob`] 内部流转，最终以字符串形式落入 [`SymbolReport`]，
/// 不向任务之外传播。
#[derive(Error, Debug)]
enum IngestError {
    #[error("store: {0}")]
    Store(#[from] StoreError),
    #[error("provider: {0}")]
    Provider(#[from] MarketError),
}

/// # Summary
/// 单个 symbol 的同步结果。
#[derive(Debug, Clone)]
pub struct SymbolReport {
    // 股票代码
    pub symbol: String,
    // 本次实际插入的 Bar 数
    pub inserted: usize,
    // 因已存在而跳过的 Bar 数（重跑时的稳态）
    pub skipped: usize,
    // 单根 Bar 写入失败的条数（不中断同一 symbol 的其余 Bar）
    pub write_failures: usize,
    // 整个 symbol 级别的失败原因（抓取失败、标的登记失败等）
    pub error: Option<String>,
}

impl SymbolReport {
    fn empty(symbol: &str) -> Self {
        Self {
            symbol: symbol.to_string(),
            inserted: 0,
            skipped: 0,
            write_failures: 0,
            error: None,
        }
    }
}

/// # Summary
/// 一次摄取运行的汇总报告。
///
/// # Invariants
/// - `outcomes` 与配置的 symbol 全集一一对应，顺序一致。
#[derive(Debug, Default)]
pub struct IngestReport {
    pub outcomes: Vec<SymbolReport>,
}

impl IngestReport {
    /// symbol 级别成功的条数
    pub fn succeeded(&self) -> usize {
        self.outcomes.iter().filter(|o| o.error.is_none()).count()
    }

    /// symbol 级别失败的条数
    pub fn failed(&self) -> usize {
        self.outcomes.iter().filter(|o| o.error.is_some()).count()
    }

    /// 全批次实际插入的 Bar 总数
    pub fn bars_inserted(&self) -> usize {
        self.outcomes.iter().map(|o| o.inserted).sum()
    }

    /// 全批次因已存在而跳过的 Bar 总数
    pub fn bars_skipped(&self) -> usize {
        self.outcomes.iter().map(|o| o.skipped).sum()
    }

    /// 单行文本摘要，用于日志与 refresh 接口的即时响应。
    pub fn summary(&self) -> String {
        format!(
            "{} symbols: {} succeeded, {} failed, {} bars inserted, {} skipped",
            self.outcomes.len(),
            self.succeeded(),
            self.failed(),
            self.bars_inserted(),
            self.bars_skipped()
        )
    }
}

/// # Summary
/// 日线摄取任务：对配置的每只股票独立执行"登记标的 → 拉取 → Upsert"。
///
/// # Invariants
/// - symbol 之间完全隔离：一个 symbol 的任何失败都不影响其余 symbol。
/// - 同一天重跑不产生重复 Bar、不修改已有行（由价格库的 no-op 规则保证）。
/// - 除价格库写入外没有任何副作用。
pub struct IngestJob {
    provider: Arc<dyn PriceProvider>,
    store: Arc<dyn PriceStore>,
    config: IngestConfig,
}

impl IngestJob {
    /// 构造摄取任务。依赖在进程启动时由 DI 容器注入。
    pub fn new(
        provider: Arc<dyn PriceProvider>,
        store: Arc<dyn PriceStore>,
        config: IngestConfig,
    ) -> Self {
        Self {
            provider,
            store,
            config,
        }
    }

    /// # Summary
    /// 执行一轮完整的摄取批次。
    ///
    /// # Logic
    /// 1. 以当前 UTC 日历日期为窗口终点。
    /// 2. 顺序处理每个配置的 symbol；失败被捕获、记日志、落入报告后继续。
    /// 3. 返回逐 symbol 的汇总报告。
    ///
    /// # Returns
    /// 本轮运行的 [`IngestReport`]；批次整体"尽力而为"，永不整体失败。
    pub async fn run(&self) -> IngestReport {
        let today = Utc::now().date_naive();
        info!(
            "Ingestion run started: {} symbols, window ending {}",
            self.config.symbols.len(),
            today
        );

        let mut report = IngestReport {
            outcomes: Vec::with_capacity(self.config.symbols.len()),
        };

        for symbol in &self.config.symbols {
            let outcome = match self.sync_symbol(symbol, today).await {
                Ok(outcome) => {
                    info!(
                        "{}: {} inserted, {} skipped",
                        symbol, outcome.inserted, outcome.skipped
                    );
                    outcome
                }
                Err(e) => {
                    warn!("{}: ingestion failed: {}", symbol, e);
                    SymbolReport {
                        error: Some(e.to_string()),
                        ..SymbolReport::empty(symbol)
                    }
                }
            };
            report.outcomes.push(outcome);
        }

        info!("Ingestion run finished: {}", report.summary());
        report
    }

    /// # Summary
    /// 同步单只股票。
    ///
    /// # Logic
    /// 1. 登记（或定位）标的。
    /// 2. 计算抓取窗口：回看上限与"最近入库日期的次日"取较晚者，
    ///    稳态下只拉取尾部增量。
    /// 3. 拉取日线并逐根 Upsert；单根写入失败只记数，不中断其余 Bar。
    ///
    /// # Arguments
    /// * `symbol`: 股票代码。
    /// * `today`: 窗口终点（UTC 日历日期）。
    async fn sync_symbol(
        &self,
        symbol: &str,
        today: NaiveDate,
    ) -> Result<SymbolReport, IngestError> {
        let instrument = Instrument::from_symbol(symbol);
        let id = self.store.upsert_instrument(&instrument).await?;

        let lookback_start = today - Duration::days(i64::from(self.config.lookback_days));
        let start = match self.store.latest_bar_date(id).await? {
            Some(latest) => (latest + Duration::days(1)).max(lookback_start),
            None => lookback_start,
        };

        let mut outcome = SymbolReport::empty(symbol);
        if start > today {
            // 已经是最新状态，无需访问数据源
            return Ok(outcome);
        }

        // 空结果（停牌、退市、窗口内无交易日）不是错误
        let bars = self.provider.fetch_daily_bars(symbol, start, today).await?;

        for bar in &bars {
            match self.store.upsert_bar(id, bar).await {
                Ok(true) => outcome.inserted += 1,
                Ok(false) => outcome.skipped += 1,
                Err(e) => {
                    warn!("{}: failed to write bar {}: {}", symbol, bar.date, e);
                    outcome.write_failures += 1;
                }
            }
        }

        Ok(outcome)
    }
}
