use async_trait::async_trait;
use chrono::{NaiveDate, TimeZone, Utc};
use kabu_core::market::entity::PriceBar;
use kabu_core::market::error::MarketError;
use kabu_core::market::port::PriceProvider;
use reqwest::Client;
use serde::Deserialize;
use std::time::Duration;
use tracing::debug;

/// # Summary
/// Yahoo Finance 日线行情提供者实现。
///
/// # Invariants
/// - 使用 `reqwest` 异步客户端进行通讯，单次请求 10 秒超时——
///   摄取批次中一个无响应的 symbol 不会拖垮整轮任务。
#[derive(Clone)]
pub struct YahooProvider {
    /// 内部使用的 HTTP 客户端
    client: Client,
}

impl YahooProvider {
    /// # Summary
    /// 创建一个新的 YahooProvider 实例。
    ///
    /// # Logic
    /// 1. 配置 10 秒超时。
    /// 2. 设置伪装浏览器 Header (User-Agent) 以减少被拦截风险。
    /// 3. 初始化 reqwest 客户端。
    #[allow(clippy::unwrap_used, clippy::expect_used)]
    pub fn new() -> Self {
        let mut headers = reqwest::header::HeaderMap::new();
        headers.insert(
            reqwest::header::USER_AGENT,
            "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/91.0.4472.124 Safari/537.36".parse().unwrap()
        );

        Self {
            client: Client::builder()
                .timeout(Duration::from_secs(10))
                .default_headers(headers)
                .build()
                .expect("Failed to build HTTP client"),
        }
    }
}

impl Default for YahooProvider {
    fn default() -> Self {
        Self::new()
    }
}

/// # Summary
/// Yahoo API 响应顶层结构。
///
/// # Invariants
/// - 映射自 Yahoo v8 chart 接口。
#[derive(Deserialize, Debug)]
struct YahooResponse {
    chart: YahooChart,
}

/// Yahoo API 图表数据部分。
#[derive(Deserialize, Debug)]
struct YahooChart {
    result: Option<Vec<YahooResult>>,
    error: Option<YahooError>,
}

/// Yahoo API 错误详情。
#[derive(Deserialize, Debug)]
struct YahooError {
    description: String,
}

/// Yahoo API 单个时间序列结果。
#[derive(Deserialize, Debug)]
struct YahooResult {
    timestamp: Vec<i64>,
    indicators: YahooIndicators,
}

/// Yahoo API 指标容器。
#[derive(Deserialize, Debug)]
struct YahooIndicators {
    quote: Vec<YahooQuote>,
}

/// Yahoo API 原始报价数据。
#[derive(Deserialize, Debug)]
struct YahooQuote {
    /// 开盘价列表
    open: Vec<Option<f64>>,
    /// 最高价列表
    high: Vec<Option<f64>>,
    /// 最低价列表
    low: Vec<Option<f64>>,
    /// 收盘价列表
    close: Vec<Option<f64>>,
    /// 成交量列表
    volume: Vec<Option<i64>>,
}

/// # Summary
/// 将 v8 chart 的列式数组压缩为日线 Bar 列表。
///
/// # Logic
/// 1. 按时间戳逐项打包 OHLCV；任一字段缺失的条目整条丢弃（停牌日常见）。
/// 2. 时间戳按 UTC 折算到日历日期。
/// 3. 丢弃落在 `[start, end]` 之外的日期——接口偶尔会附带窗口边缘的条目。
fn bars_from_chart(
    result: YahooResult,
    start: NaiveDate,
    end: NaiveDate,
) -> Result<Vec<PriceBar>, MarketError> {
    let quote = result
        .indicators
        .quote
        .first()
        .ok_or(MarketError::Parse("No quote data".into()))?;

    let mut bars = Vec::new();
    for (i, &ts) in result.timestamp.iter().enumerate() {
        if let (Some(o), Some(h), Some(l), Some(c), Some(v)) = (
            quote.open.get(i).and_then(|x| *x),
            quote.high.get(i).and_then(|x| *x),
            quote.low.get(i).and_then(|x| *x),
            quote.close.get(i).and_then(|x| *x),
            quote.volume.get(i).and_then(|x| *x),
        ) {
            let date = Utc
                .timestamp_opt(ts, 0)
                .single()
                .ok_or(MarketError::Parse(format!("Bad timestamp: {}", ts)))?
                .date_naive();

            if date < start || date > end {
                continue;
            }

            bars.push(PriceBar {
                date,
                open: o,
                high: h,
                low: l,
                close: c,
                volume: v,
            });
        }
    }

    Ok(bars)
}

#[async_trait]
impl PriceProvider for YahooProvider {
    /// # Summary
    /// 从 Yahoo Finance 抓取日线历史数据。
    ///
    /// # Logic
    /// 1. 构建包含 period1, period2 的 API URL（period2 取 end 的次日零点，
    ///    使 end 当天包含在内）。
    /// 2. 发起异步请求并解析嵌套的 JSON 数据。
    /// 3. 通过 [`bars_from_chart`] 映射为日期升序的 `PriceBar` 列表。
    ///
    /// # Arguments
    /// * `symbol`: 股票代码。
    /// * `start`: 开始日期（含）。
    /// * `end`: 结束日期（含）。
    ///
    /// # Returns
    /// 成功返回 Bar 列表，失败返回 MarketError。
    async fn fetch_daily_bars(
        &self,
        symbol: &str,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<Vec<PriceBar>, MarketError> {
        let period1 = Utc
            .from_utc_datetime(&start.and_hms_opt(0, 0, 0).unwrap_or_default())
            .timestamp();
        let period2 = Utc
            .from_utc_datetime(
                &(end + chrono::Duration::days(1))
                    .and_hms_opt(0, 0, 0)
                    .unwrap_or_default(),
            )
            .timestamp();

        let url = format!(
            "https://query1.finance.yahoo.com/v8/finance/chart/{}",
            symbol
        );

        let resp = self
            .client
            .get(&url)
            .query(&[
                ("symbol", symbol),
                ("period1", &period1.to_string()),
                ("period2", &period2.to_string()),
                ("interval", "1d"),
            ])
            .send()
            .await
            .map_err(|e| MarketError::Network(e.to_string()))?;

        if !resp.status().is_success() {
            return Err(MarketError::Network(format!("HTTP {}", resp.status())));
        }

        let json: YahooResponse = resp
            .json()
            .await
            .map_err(|e| MarketError::Parse(e.to_string()))?;

        if let Some(err) = json.chart.error {
            return Err(MarketError::Unknown(err.description));
        }

        let result = json
            .chart
            .result
            .ok_or(MarketError::NotFound)?
            .pop()
            .ok_or(MarketError::NotFound)?;

        let bars = bars_from_chart(result, start, end)?;
        debug!("Fetched {} daily bars for {}", bars.len(), symbol);
        Ok(bars)
    }
}
