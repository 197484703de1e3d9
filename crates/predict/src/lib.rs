//! # `kabu-predict` - 次日收盘价预测
//!
//! 实现 `kabu-core` 的 [`ClosePredictor`](kabu_core::predict::port::ClosePredictor)
//! 端口：
//! - [`model`]: 线性回归模型工件 (JSON) 的加载、校验与点积推理
//! - [`engine`]: 读取价格库最近一根 Bar 并应用模型的在线引擎
//! - [`train`]: 离线训练（(特征, 次日收盘) 配对 + OLS 拟合 + 留出集评估），
//!   由 `kabu-app` 的 `train_model` 二进制调用
//!
//! 模型在进程启动时一次性加载；加载失败是致命错误，引擎拒绝启动。

pub mod engine;
pub mod model;
pub mod train;

pub use engine::PredictEngine;
pub use model::{FEATURE_NAMES, LinearModel, ModelArtifact, bar_features};
