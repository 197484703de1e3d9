use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// # Summary
/// 单次预测结果实体：某标的的次一交易日收盘价估计。
///
/// # Invariants
/// - 临时值，按请求即时计算，不持久化。
/// - 相同模型与相同特征向量必须产出相同的 `predicted_close`（无隐藏随机性）。
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Prediction {
    // 股票代码
    pub symbol: String,
    // 预测的次一交易日收盘价
    pub predicted_close: f64,
    // 特征向量取自哪个交易日的 Bar
    pub based_on: NaiveDate,
}
