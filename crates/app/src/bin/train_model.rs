//! # 离线训练任务
//!
//! 读取价格库的全量历史，按标的构造 (特征, 次日收盘) 样本对，
//! 拟合线性回归并把模型工件写到配置的路径。
//!
//! 一次性批处理进程，与在线服务分离运行：
//! `cargo run --bin train_model`

use std::fs;
use std::path::Path;

use kabu_core::config::AppConfig;
use kabu_core::store::port::PriceStore;
use kabu_predict::train::{build_training_pairs, fit_next_close_model};
use kabu_store::price::SqlitePriceStore;
use tracing::info;

/// 从可选的配置文件与环境变量加载配置；两者都缺省时使用内置默认值。
fn load_config() -> Result<AppConfig, Box<dyn std::error::Error>> {
    let config = config::Config::builder()
        .add_source(config::File::with_name("config/kabu").required(false))
        .add_source(
            config::Environment::with_prefix("KABU")
                .separator("__")
                .try_parsing(true),
        )
        .build()?
        .try_deserialize::<AppConfig>()?;
    Ok(config)
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt::init();

    let config = load_config()?;
    kabu_store::config::set_root_dir(config.database.data_dir.clone().into());

    info!("Connecting to price store to fetch training data...");
    let store = SqlitePriceStore::new().await?;

    // 1. 按标的读取全量历史（list_bars 为降序，训练需要升序）
    let mut series = Vec::new();
    for symbol in store.list_symbols().await? {
        let mut bars = store.list_bars(&symbol, None).await?;
        bars.reverse();
        series.push((symbol, bars));
    }

    // 2. 逐标的配对：每根 Bar 的特征 × 同一标的次日收盘
    let pairs = build_training_pairs(&series);
    info!(
        "Fetched {} series, {} training pairs",
        series.len(),
        pairs.len()
    );

    // 3. 拟合并在留出集上评估
    let (artifact, metrics) = fit_next_close_model(&pairs)?;
    info!("--- Model Evaluation ---");
    info!("R-squared (R2): {:.4}", metrics.r2);
    info!("Mean Absolute Error (MAE): ${:.2}", metrics.mae);
    info!("Root Mean Squared Error (RMSE): ${:.2}", metrics.rmse);
    info!("------------------------");

    // 4. 工件写盘，在线服务下次启动时加载
    let path = Path::new(&config.model.artifact_path);
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }
    fs::write(path, serde_json::to_string_pretty(&artifact)?)?;
    info!("Model saved successfully to {}", path.display());

    Ok(())
}
