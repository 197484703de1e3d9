use std::path::Path;
use std::sync::Arc;

use kabu_api::server::{AppState, start_server};
use kabu_core::config::AppConfig;
use kabu_feed::yahoo::YahooProvider;
use kabu_ingest::IngestJob;
use kabu_predict::{LinearModel, PredictEngine};
use kabu_store::price::SqlitePriceStore;
use kabu_store::system::SqliteSystemStore;
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

/// # Summary
/// 应用启动入口，纯粹的 DI 容器。
/// 负责实例化所有具体实现组件并通过 Arc<dyn Trait> 注入到 API 服务。
///
/// # Logic
/// 1. 初始化全局日志与配置。
/// 2. 实例化基础设施层（Feed、Store）。
/// 3. 一次性加载模型工件——缺失或损坏是致命错误，进程直接退出。
/// 4. 构造摄取任务与预测引擎。
/// 5. 启动 HTTP 服务并阻塞至进程退出。
#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // 1. 初始化日志
    tracing_subscriber::fmt::init();
    info!("kabu backend starting...");

    // 2. 加载配置并注入存储根目录
    let config = load_config()?;
    kabu_store::config::set_root_dir(config.database.data_dir.clone().into());

    // 3. 实例化基础设施层
    let provider = Arc::new(YahooProvider::new());
    let price_store = Arc::new(SqlitePriceStore::new().await?);
    let system_store = Arc::new(SqliteSystemStore::new().await?);

    // 4. 加载回归模型（进程级单例，此后只读共享）
    let model = LinearModel::load(Path::new(&config.model.artifact_path))?;
    let predictor = Arc::new(PredictEngine::new(model, price_store.clone()));

    // 5. 构造摄取任务（由 /internal/refresh-all 在后台触发）
    let ingest_job = Arc::new(IngestJob::new(
        provider,
        price_store.clone(),
        config.ingest.clone(),
    ));

    // 6. 组装共享状态并启动 HTTP 服务
    let bind_addr = format!("{}:{}", config.server.host, config.server.port);
    let state = AppState {
        price_store,
        system_store,
        predictor,
        ingest_job,
        app_config: Arc::new(config),
    };

    start_server(state, &bind_addr).await
}
