use crate::predict::entity::Prediction;
use crate::predict::error::PredictError;
use async_trait::async_trait;

/// # Summary
/// 次日收盘价预测服务契约。
///
/// # Invariants
/// - 纯读取 + 计算，无副作用，可被多个请求并发调用。
/// - 单个请求的失败只影响该请求，不影响后续请求或其他 symbol。
#[async_trait]
pub trait ClosePredictor: Send + Sync {
    /// # Summary
    /// 对一只股票给出次一交易日收盘价的标量估计。
    ///
    /// # Logic
    /// 1. 校验标的在价格库中存在。
    /// 2. 读取最近一根 Bar 并派生特征向量。
    /// 3. 应用预训练回归模型得到标量输出。
    ///
    /// # Arguments
    /// * `symbol`: 股票代码。
    ///
    /// # Returns
    /// 成功返回 `Prediction`；未知标的返回 `UnknownSymbol`，
    /// 无历史数据返回 `InsufficientHistory`。
    async fn predict_next_close(&self, symbol: &str) -> Result<Prediction, PredictError>;
}
