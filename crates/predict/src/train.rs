use crate::model::{FEATURE_NAMES, LinearModel, ModelArtifact, bar_features};
use chrono::Utc;
use kabu_core::market::entity::PriceBar;
use linfa::Dataset;
use linfa::traits::Fit;
use linfa_linear::LinearRegression;
use ndarray::{Array1, Array2};
use thiserror::Error;
use tracing::info;

/// 拟合至少需要的样本对数
const MIN_ROWS: usize = 10;

/// # Summary
/// 离线训练过程的错误。
#[derive(Error, Debug)]
pub enum TrainError {
    /// 价格库中的可配对历史不足以拟合
    #[error("Insufficient training data: {0} rows (need at least {MIN_ROWS})")]
    InsufficientData(usize),
    /// 底层最小二乘求解失败
    #[error("Fit failed: {0}")]
    Fit(String),
}

/// # Summary
/// 留出集 (held-out) 上的回归评估指标。
#[derive(Debug, Clone)]
pub struct TrainingMetrics {
    /// 决定系数 R²
    pub r2: f64,
    /// 平均绝对误差
    pub mae: f64,
    /// 均方根误差
    pub rmse: f64,
    /// 训练样本数
    pub train_rows: usize,
    /// 评估样本数
    pub test_rows: usize,
}

/// # Summary
/// 构造 (特征, 次日收盘) 训练样本对。
///
/// # Logic
/// 1. 逐标的处理：每根 Bar 的特征向量与**同一标的**下一交易日的收盘价配对。
/// 2. 每个序列的最后一根 Bar 没有"次日"，自然丢弃。
/// 3. 标的之间永不交叉配对。
///
/// # Arguments
/// * `series`: 每个标的的日期升序 Bar 序列。
pub fn build_training_pairs(series: &[(String, Vec<PriceBar>)]) -> Vec<([f64; 5], f64)> {
    let mut pairs = Vec::new();
    for (_symbol, bars) in series {
        for window in bars.windows(2) {
            pairs.push((bar_features(&window[0]), window[1].close));
        }
    }
    pairs
}

/// # Summary
/// 拟合次日收盘价线性回归模型并在留出集上评估。
///
/// # Logic
/// 1. 按时间顺序 80/20 切分（不打乱——评估集是序列尾部的"未来"）。
/// 2. 对训练段做 OLS 拟合 (linfa)。
/// 3. 用拟合出的工件在评估段上计算 R² / MAE / RMSE。
///
/// # Arguments
/// * `pairs`: [`build_training_pairs`] 产出的样本对。
///
/// # Returns
/// 成功返回 (工件, 指标)；样本不足或求解失败返回 `TrainError`。
#[allow(clippy::cast_precision_loss)]
pub fn fit_next_close_model(
    pairs: &[([f64; 5], f64)],
) -> Result<(ModelArtifact, TrainingMetrics), TrainError> {
    if pairs.len() < MIN_ROWS {
        return Err(TrainError::InsufficientData(pairs.len()));
    }

    let split = (pairs.len() * 4) / 5;
    let (train, test) = pairs.split_at(split);

    let x_train = Array2::from_shape_fn((train.len(), FEATURE_NAMES.len()), |(i, j)| {
        train[i].0[j]
    });
    let y_train = Array1::from_iter(train.iter().map(|p| p.1));

    let dataset = Dataset::new(x_train, y_train);
    let fitted = LinearRegression::default()
        .fit(&dataset)
        .map_err(|e| TrainError::Fit(e.to_string()))?;

    let artifact = ModelArtifact {
        features: FEATURE_NAMES.map(String::from).to_vec(),
        coefficients: fitted.params().to_vec(),
        intercept: fitted.intercept(),
        trained_at: Utc::now(),
    };

    // 用与在线推理完全相同的代码路径评估，避免训练/推理偏差
    let model = LinearModel::from_artifact(artifact.clone())
        .map_err(|e| TrainError::Fit(e.to_string()))?;

    let n = test.len() as f64;
    let mut abs_err_sum = 0.0;
    let mut sq_err_sum = 0.0;
    for (features, target) in test {
        let err = model.predict(features) - target;
        abs_err_sum += err.abs();
        sq_err_sum += err * err;
    }

    let mean_target = test.iter().map(|p| p.1).sum::<f64>() / n;
    let ss_tot = test
        .iter()
        .map(|p| (p.1 - mean_target) * (p.1 - mean_target))
        .sum::<f64>();
    let r2 = if ss_tot > 0.0 {
        1.0 - sq_err_sum / ss_tot
    } else {
        0.0
    };

    let metrics = TrainingMetrics {
        r2,
        mae: abs_err_sum / n,
        rmse: (sq_err_sum / n).sqrt(),
        train_rows: train.len(),
        test_rows: test.len(),
    };

    info!(
        "Model fitted: {} train rows, {} test rows, R2 = {:.4}, MAE = {:.4}, RMSE = {:.4}",
        metrics.train_rows, metrics.test_rows, metrics.r2, metrics.mae, metrics.rmse
    );

    Ok((artifact, metrics))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn bar(date: NaiveDate, open: f64, close: f64, volume: i64) -> PriceBar {
        PriceBar {
            date,
            open,
            high: open + 2.0,
            low: open - 2.0,
            close,
            volume,
        }
    }

    fn day(offset: i64) -> NaiveDate {
        "2024-01-01".parse::<NaiveDate>().expect("valid date") + chrono::Duration::days(offset)
    }

    #[test]
    fn test_pairs_never_cross_instrument_boundary() {
        let series = vec![
            (
                "AAA".to_string(),
                vec![
                    bar(day(0), 10.0, 11.0, 100),
                    bar(day(1), 11.0, 12.0, 110),
                    bar(day(2), 12.0, 13.0, 120),
                ],
            ),
            (
                "BBB".to_string(),
                vec![bar(day(0), 500.0, 501.0, 900), bar(day(1), 501.0, 502.0, 910)],
            ),
        ];

        let pairs = build_training_pairs(&series);

        // 3 根 + 2 根 Bar → 2 + 1 对；每个序列的最后一根被丢弃
        assert_eq!(pairs.len(), 3);
        // AAA 的对：target 是 AAA 自己的次日收盘
        assert_eq!(pairs[0].1, 12.0);
        assert_eq!(pairs[1].1, 13.0);
        // BBB 的第一根只会配 BBB 的次日，绝不会配到 AAA 的任何收盘价
        assert_eq!(pairs[2].0[0], 500.0);
        assert_eq!(pairs[2].1, 502.0);
    }

    #[test]
    fn test_fit_recovers_planted_linear_relation() {
        // 构造特征彼此不共线的样本，目标严格满足 target = 3*close + 7
        let mut pairs = Vec::new();
        for i in 0..40_i64 {
            let open = 10.0 + i as f64;
            let high = open + 2.0 + ((i * 7) % 5) as f64;
            let low = open - 1.0 - ((i * 3) % 4) as f64;
            let close = open + ((i * 11) % 7) as f64 * 0.5;
            let volume = 1_000.0 + ((i * i * 17) % 400) as f64;
            let features = [open, high, low, close, volume];
            pairs.push((features, 3.0 * close + 7.0));
        }

        let (artifact, metrics) = fit_next_close_model(&pairs).expect("fit should succeed");

        // 关系可被精确拟合：留出集上近乎零误差
        assert!(metrics.r2 > 0.999, "R2 was {}", metrics.r2);
        assert!(metrics.rmse < 1e-4, "RMSE was {}", metrics.rmse);
        assert_eq!(metrics.train_rows, 32);
        assert_eq!(metrics.test_rows, 8);

        // 工件直接可用于推理，且结果与构造关系一致
        let model = LinearModel::from_artifact(artifact).expect("valid artifact");
        let prediction = model.predict(&[20.0, 23.0, 18.0, 21.0, 1_200.0]);
        assert!((prediction - (3.0 * 21.0 + 7.0)).abs() < 1e-3);
    }

    #[test]
    fn test_fit_rejects_insufficient_data() {
        let pairs = vec![([1.0, 2.0, 3.0, 4.0, 5.0], 6.0); 4];
        assert!(matches!(
            fit_next_close_model(&pairs),
            Err(TrainError::InsufficientData(4))
        ));
    }
}
