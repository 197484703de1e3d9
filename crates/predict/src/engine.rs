use crate::model::{LinearModel, bar_features};
use async_trait::async_trait;
use kabu_core::predict::entity::Prediction;
use kabu_core::predict::error::PredictError;
use kabu_core::predict::port::ClosePredictor;
use kabu_core::store::port::PriceStore;
use std::sync::Arc;
use tracing::debug;

/// # Summary
/// 在线预测引擎：读取价格库中某标的最近一根 Bar，应用预训练线性模型，
/// 给出次一交易日收盘价的标量估计。
///
/// # Invariants
/// - 模型在构造时已完成加载与校验（加载失败的工件不可能流到这里）。
/// - 只读 + 计算，无副作用；可被多个请求并发共享（`Arc` 注入）。
pub struct PredictEngine {
    model: LinearModel,
    store: Arc<dyn PriceStore>,
}

impl PredictEngine {
    /// 构造引擎。`model` 来自进程启动时的一次性加载。
    pub fn new(model: LinearModel, store: Arc<dyn PriceStore>) -> Self {
        Self { model, store }
    }
}

#[async_trait]
impl ClosePredictor for PredictEngine {
    /// # Summary
    /// 对一只股票给出次一交易日收盘价估计。
    ///
    /// # Logic
    /// 1. 标的不存在 → `UnknownSymbol`。
    /// 2. 标的存在但没有任何 Bar → `InsufficientHistory`。
    /// 3. 取最近一根 Bar 派生特征向量，做点积推理。
    ///
    /// # Arguments
    /// * `symbol`: 股票代码。
    async fn predict_next_close(&self, symbol: &str) -> Result<Prediction, PredictError> {
        let instrument = self
            .store
            .get_instrument(symbol)
            .await
            .map_err(|e| PredictError::Store(e.to_string()))?;

        if instrument.is_none() {
            return Err(PredictError::UnknownSymbol(symbol.to_string()));
        }

        let bars = self
            .store
            .list_bars(symbol, Some(1))
            .await
            .map_err(|e| PredictError::Store(e.to_string()))?;

        let latest = bars
            .first()
            .ok_or_else(|| PredictError::InsufficientHistory(symbol.to_string()))?;

        let features = bar_features(latest);
        let predicted_close = self.model.predict(&features);
        debug!(
            "{}: predicted next close {:.4} from bar {}",
            symbol, predicted_close, latest.date
        );

        Ok(Prediction {
            symbol: symbol.to_string(),
            predicted_close,
            based_on: latest.date,
        })
    }
}
