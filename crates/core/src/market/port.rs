use crate::market::entity::PriceBar;
use crate::market::error::MarketError;
use async_trait::async_trait;
use chrono::NaiveDate;

/// # Summary
/// 外部行情数据提供者接口（原始数据源）。
///
/// # Invariants
/// - 实现者必须对单次请求施加超时，一次无响应的调用不能拖垮整个摄取批次。
/// - 返回的 Bar 序列按日期升序排列，且不包含重复日期。
/// - 某个 symbol 无数据（退市、非交易日区间）时返回空列表或 `NotFound`，
///   由调用方决定如何降级。
#[async_trait]
pub trait PriceProvider: Send + Sync {
    /// # Summary
    /// 获取特定股票在指定日期范围内的日线 Bar。
    ///
    /// # Logic
    /// 1. 构建数据源请求（含超时）。
    /// 2. 执行网络请求并解析响应数据。
    /// 3. 丢弃字段不完整的条目，映射为 `PriceBar`。
    ///
    /// # Arguments
    /// * `symbol`: 股票代码。
    /// * `start`: 开始日期（含）。
    /// * `end`: 结束日期（含）。
    ///
    /// # Returns
    /// 成功返回日期升序的 Bar 列表，失败返回 `MarketError`。
    async fn fetch_daily_bars(
        &self,
        symbol: &str,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<Vec<PriceBar>, MarketError>;
}
