use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// # Summary
/// 单日价格条目实体 (Bar)，记录一只股票在一个交易日内的行情波动。
///
/// # Invariants
/// - 同一标的在同一日历日期下至多存在一根 Bar。
/// - 数据质量预期（不由存储层强制）：`high >= low`，`high >= open, close`，
///   `low <= open, close`；数据源返回值按原样信任。
/// - 写入后不可变：重复摄取同一日期是 no-op，不会覆盖历史值。
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PriceBar {
    // 交易日历日期
    pub date: NaiveDate,
    // 开盘价
    pub open: f64,
    // 最高价
    pub high: f64,
    // 最低价
    pub low: f64,
    // 收盘价
    pub close: f64,
    // 成交量 (非负整数)
    pub volume: i64,
}
