use chrono::{DateTime, Utc};
use kabu_core::market::entity::PriceBar;
use kabu_core::predict::error::PredictError;
use serde::{Deserialize, Serialize};
use std::path::Path;
use tracing::info;

/// 特征向量的规范顺序。训练与推理两侧都以此为准；
/// 工件中的 `features` 字段必须逐项一致，否则拒绝加载。
pub const FEATURE_NAMES: [&str; 5] = ["open", "high", "low", "close", "volume"];

/// # Summary
/// 序列化的回归模型工件：离线训练任务的产物，在线引擎的输入。
///
/// # Invariants
/// - `coefficients` 的长度与 `features` 一致，顺序按 `features` 对应。
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ModelArtifact {
    /// 特征名列表（训练时固化，加载时校验）
    pub features: Vec<String>,
    /// 各特征的回归系数
    pub coefficients: Vec<f64>,
    /// 截距项
    pub intercept: f64,
    /// 训练完成时间
    pub trained_at: DateTime<Utc>,
}

/// # Summary
/// 已加载并通过校验的线性回归模型。
///
/// # Invariants
/// - 构造成功即保证系数与规范特征列表逐项对齐，推理阶段不再校验。
/// - 推理是纯函数：相同输入永远产出相同输出。
#[derive(Debug, Clone)]
pub struct LinearModel {
    artifact: ModelArtifact,
}

impl LinearModel {
    /// # Summary
    /// 从 JSON 工件文件加载模型。
    ///
    /// # Logic
    /// 1. 读取并反序列化工件文件。
    /// 2. 委托 [`Self::from_artifact`] 做结构校验。
    ///
    /// # Arguments
    /// * `path`: 工件文件路径。
    ///
    /// # Returns
    /// 文件缺失、JSON 损坏或特征不匹配均返回 `PredictError::Model`——
    /// 调用方（进程启动流程）应视为致命错误。
    pub fn load(path: &Path) -> Result<Self, PredictError> {
        let raw = std::fs::read_to_string(path).map_err(|e| {
            PredictError::Model(format!(
                "Failed to read model artifact {}: {}",
                path.display(),
                e
            ))
        })?;

        let artifact: ModelArtifact = serde_json::from_str(&raw)
            .map_err(|e| PredictError::Model(format!("Malformed model artifact: {}", e)))?;

        let model = Self::from_artifact(artifact)?;
        info!(
            "Loaded model artifact from {} (trained at {})",
            path.display(),
            model.artifact.trained_at
        );
        Ok(model)
    }

    /// # Summary
    /// 校验工件并构造模型。
    ///
    /// # Logic
    /// 1. 特征名必须与 [`FEATURE_NAMES`] 逐项一致。
    /// 2. 系数个数必须与特征个数一致。
    pub fn from_artifact(artifact: ModelArtifact) -> Result<Self, PredictError> {
        if !artifact.features.iter().map(String::as_str).eq(FEATURE_NAMES) {
            return Err(PredictError::Model(format!(
                "Artifact features {:?} do not match expected {:?}",
                artifact.features, FEATURE_NAMES
            )));
        }
        if artifact.coefficients.len() != FEATURE_NAMES.len() {
            return Err(PredictError::Model(format!(
                "Artifact has {} coefficients, expected {}",
                artifact.coefficients.len(),
                FEATURE_NAMES.len()
            )));
        }
        Ok(Self { artifact })
    }

    /// # Summary
    /// 对一个特征向量做点积推理。
    ///
    /// # Returns
    /// `intercept + Σ coefficient·feature`。
    pub fn predict(&self, features: &[f64; 5]) -> f64 {
        self.artifact.intercept
            + self
                .artifact
                .coefficients
                .iter()
                .zip(features)
                .map(|(c, x)| c * x)
                .sum::<f64>()
    }

    /// 访问底层工件（训练任务写盘时使用）。
    pub fn artifact(&self) -> &ModelArtifact {
        &self.artifact
    }
}

/// # Summary
/// 从单日 Bar 派生特征向量，顺序与 [`FEATURE_NAMES`] 对应。
#[allow(clippy::cast_precision_loss)]
pub fn bar_features(bar: &PriceBar) -> [f64; 5] {
    [
        bar.open,
        bar.high,
        bar.low,
        bar.close,
        bar.volume as f64,
    ]
}

#[cfg(test)]
mod tests {
    use super::*;

    fn artifact(coefficients: Vec<f64>) -> ModelArtifact {
        ModelArtifact {
            features: FEATURE_NAMES.map(String::from).to_vec(),
            coefficients,
            intercept: 1.5,
            trained_at: Utc::now(),
        }
    }

    #[test]
    fn test_predict_is_dot_product_plus_intercept() {
        let model =
            LinearModel::from_artifact(artifact(vec![0.0, 0.0, 0.0, 1.0, 0.0])).unwrap();
        // 只有 close 有系数：预测 = close + 1.5
        assert_eq!(model.predict(&[9.0, 11.0, 8.0, 10.0, 5000.0]), 11.5);

        // 纯函数：重复调用结果一致
        let first = model.predict(&[1.0, 2.0, 3.0, 4.0, 5.0]);
        let second = model.predict(&[1.0, 2.0, 3.0, 4.0, 5.0]);
        assert_eq!(first, second);
    }

    #[test]
    fn test_rejects_wrong_feature_names() {
        let mut bad = artifact(vec![0.0; 5]);
        bad.features[0] = "adj_close".to_string();
        assert!(matches!(
            LinearModel::from_artifact(bad),
            Err(PredictError::Model(_))
        ));
    }

    #[test]
    fn test_rejects_wrong_coefficient_arity() {
        let bad = artifact(vec![0.0; 4]);
        assert!(matches!(
            LinearModel::from_artifact(bad),
            Err(PredictError::Model(_))
        ));
    }

    #[test]
    fn test_artifact_json_round_trip() {
        let original = artifact(vec![0.1, 0.2, 0.3, 0.4, 0.5]);
        let json = serde_json::to_string(&original).unwrap();
        let model = LinearModel::from_artifact(serde_json::from_str(&json).unwrap()).unwrap();
        assert_eq!(model.artifact().coefficients, original.coefficients);
        assert_eq!(model.artifact().intercept, original.intercept);
    }
}
