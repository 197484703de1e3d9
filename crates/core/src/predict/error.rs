use thiserror::Error;

/// # Summary
/// 预测域错误枚举。
///
/// # Invariants
/// - 前两个变体是按请求报告的前置条件失败；`Model` 在加载阶段出现时是致命的
///   （引擎拒绝启动），在推理阶段不应出现。
#[derive(Error, Debug)]
pub enum PredictError {
    /// 价格库中不存在该标的
    #[error("Unknown symbol: {0}")]
    UnknownSymbol(String),
    /// 标的存在但没有任何历史 Bar，无法构造特征向量
    #[error("Insufficient history for symbol: {0}")]
    InsufficientHistory(String),
    /// 模型工件缺失、损坏或与预期特征不匹配
    #[error("Model error: {0}")]
    Model(String),
    /// 底层存储读取失败
    #[error("Store error: {0}")]
    Store(String),
}
