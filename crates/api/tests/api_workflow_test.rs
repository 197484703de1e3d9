use async_trait::async_trait;
use chrono::{NaiveDate, Utc};
use kabu_api::server::{AppState, build_router};
use kabu_api::types::{ApiResponse, LoginResponse, PredictionResponse, PriceHistoryResponse};
use kabu_core::common::Instrument;
use kabu_core::config::{AppConfig, IngestConfig};
use kabu_core::market::entity::PriceBar;
use kabu_core::market::error::MarketError;
use kabu_core::market::port::PriceProvider;
use kabu_core::store::port::PriceStore;
use kabu_ingest::IngestJob;
use kabu_predict::{FEATURE_NAMES, LinearModel, ModelArtifact, PredictEngine};
use kabu_store::price::SqlitePriceStore;
use kabu_store::system::SqliteSystemStore;
use reqwest::StatusCode;
use std::sync::Arc;
use tokio::net::TcpListener;

/// 测试用数据源：对 "NEW" 返回今天的一根 Bar，其余 symbol 为空。
struct OneBarProvider;

#[async_trait]
impl PriceProvider for OneBarProvider {
    async fn fetch_daily_bars(
        &self,
        symbol: &str,
        _start: NaiveDate,
        _end: NaiveDate,
    ) -> Result<Vec<PriceBar>, MarketError> {
        if symbol != "NEW" {
            return Ok(Vec::new());
        }
        Ok(vec![PriceBar {
            date: Utc::now().date_naive(),
            open: 9.0,
            high: 11.0,
            low: 8.0,
            close: 10.0,
            volume: 1_000,
        }])
    }
}

fn bar(date: &str, close: f64) -> PriceBar {
    PriceBar {
        date: date.parse().expect("valid date literal"),
        open: close - 1.0,
        high: close + 1.0,
        low: close - 2.0,
        close,
        volume: 10_000,
    }
}

// 帮助函数：在随机端口启动测试服务器，返回基地址与价格库句柄
async fn spawn_test_server() -> (String, Arc<SqlitePriceStore>, tempfile::TempDir) {
    let tmp_dir = tempfile::tempdir().expect("Failed to create temp dir");
    kabu_store::config::set_root_dir(tmp_dir.path().to_path_buf());

    let price_store = Arc::new(SqlitePriceStore::new().await.unwrap());
    let system_store = Arc::new(SqliteSystemStore::new().await.unwrap());

    // 预置 ABC 的两天历史与一只无历史的标的
    let abc = price_store
        .upsert_instrument(&Instrument::from_symbol("ABC"))
        .await
        .unwrap();
    price_store.upsert_bar(abc, &bar("2024-01-03", 101.0)).await.unwrap();
    price_store.upsert_bar(abc, &bar("2024-01-04", 102.0)).await.unwrap();
    price_store
        .upsert_instrument(&Instrument::from_symbol("EMPTYX"))
        .await
        .unwrap();

    // 预测 = 最近收盘 + 2.0 的固定模型
    let artifact = ModelArtifact {
        features: FEATURE_NAMES.map(String::from).to_vec(),
        coefficients: vec![0.0, 0.0, 0.0, 1.0, 0.0],
        intercept: 2.0,
        trained_at: Utc::now(),
    };
    let model = LinearModel::from_artifact(artifact).unwrap();
    let predictor = Arc::new(PredictEngine::new(model, price_store.clone()));

    let mut app_config = AppConfig::default();
    app_config.server.jwt_secret = "test_jwt_secret".to_string();
    app_config.server.refresh_secret = "test_refresh_secret".to_string();

    let ingest_job = Arc::new(IngestJob::new(
        Arc::new(OneBarProvider),
        price_store.clone(),
        IngestConfig {
            symbols: vec!["NEW".to_string()],
            lookback_days: 30,
        },
    ));

    let state = AppState {
        price_store: price_store.clone(),
        system_store,
        predictor,
        ingest_job,
        app_config: Arc::new(app_config),
    };

    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let port = listener.local_addr().unwrap().port();
    let addr = format!("http://127.0.0.1:{}", port);

    let router = build_router(state);
    tokio::spawn(async move {
        axum::serve(listener, router).await.unwrap();
    });

    // 稍微等待服务器启动
    tokio::time::sleep(std::time::Duration::from_millis(300)).await;

    (addr, price_store, tmp_dir)
}

/// # Summary
/// 完整的 API 工作流：注册 → 登录 → 自选股 → 行情 → 预测 → 刷新触发。
#[tokio::test]
async fn test_full_api_workflow() {
    let (addr, price_store, _tmp_dir) = spawn_test_server().await;
    let client = reqwest::Client::new();

    // 1. 注册新用户
    let resp = client
        .post(format!("{}/api/v1/auth/register", addr))
        .json(&serde_json::json!({
            "username": "trader_01",
            "name": "Trader One",
            "password": "s3cret_pwd"
        }))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::OK);

    // 重复注册同名用户被拒绝
    let resp = client
        .post(format!("{}/api/v1/auth/register", addr))
        .json(&serde_json::json!({
            "username": "trader_01",
            "name": "Impostor",
            "password": "other"
        }))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);

    // 2. 错误密码登录被拒绝
    let resp = client
        .post(format!("{}/api/v1/auth/login", addr))
        .json(&serde_json::json!({ "username": "trader_01", "password": "wrong" }))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);

    // 正确登录拿到 JWT
    let resp = client
        .post(format!("{}/api/v1/auth/login", addr))
        .json(&serde_json::json!({ "username": "trader_01", "password": "s3cret_pwd" }))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
    let login: ApiResponse<LoginResponse> = resp.json().await.unwrap();
    let token = login.data.expect("token issued").token;

    // 3. 未带 Token 的自选股请求被拒绝
    let resp = client
        .get(format!("{}/api/v1/user/watchlist", addr))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);

    // 带 Token：添加（小写自动归一为大写）、查询、删除
    let resp = client
        .post(format!("{}/api/v1/user/watchlist", addr))
        .bearer_auth(&token)
        .json(&serde_json::json!({ "symbol": "aapl" }))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::OK);

    client
        .post(format!("{}/api/v1/user/watchlist", addr))
        .bearer_auth(&token)
        .json(&serde_json::json!({ "symbol": "MSFT" }))
        .send()
        .await
        .unwrap();

    let resp = client
        .get(format!("{}/api/v1/user/watchlist", addr))
        .bearer_auth(&token)
        .send()
        .await
        .unwrap();
    let watchlist: ApiResponse<Vec<String>> = resp.json().await.unwrap();
    assert_eq!(watchlist.data.unwrap(), vec!["AAPL", "MSFT"]);

    let resp = client
        .delete(format!("{}/api/v1/user/watchlist/AAPL", addr))
        .bearer_auth(&token)
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::OK);

    let resp = client
        .get(format!("{}/api/v1/user/watchlist", addr))
        .bearer_auth(&token)
        .send()
        .await
        .unwrap();
    let watchlist: ApiResponse<Vec<String>> = resp.json().await.unwrap();
    assert_eq!(watchlist.data.unwrap(), vec!["MSFT"]);

    // 4. 行情：小写代码归一化、日期降序、limit 生效
    let resp = client
        .get(format!("{}/api/v1/market/prices/abc", addr))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
    let history: ApiResponse<PriceHistoryResponse> = resp.json().await.unwrap();
    let history = history.data.unwrap();
    assert_eq!(history.symbol, "ABC");
    assert_eq!(history.prices.len(), 2);
    assert_eq!(history.prices[0].date, "2024-01-04");
    assert_eq!(history.prices[0].close, 102.0);

    let resp = client
        .get(format!("{}/api/v1/market/prices/ABC?limit=1", addr))
        .send()
        .await
        .unwrap();
    let history: ApiResponse<PriceHistoryResponse> = resp.json().await.unwrap();
    assert_eq!(history.data.unwrap().prices.len(), 1);

    // 未知代码 → 404
    let resp = client
        .get(format!("{}/api/v1/market/prices/ZZZZ_NOT_REAL", addr))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);

    // 代码全集
    let resp = client
        .get(format!("{}/api/v1/market/symbols", addr))
        .send()
        .await
        .unwrap();
    let symbols: ApiResponse<Vec<String>> = resp.json().await.unwrap();
    assert!(symbols.data.unwrap().contains(&"ABC".to_string()));

    // 5. 预测：最近收盘 102.0 + 截距 2.0
    let resp = client
        .get(format!("{}/api/v1/market/predict/abc", addr))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
    let prediction: ApiResponse<PredictionResponse> = resp.json().await.unwrap();
    let prediction = prediction.data.unwrap();
    assert_eq!(prediction.symbol, "ABC");
    assert_eq!(prediction.predicted_close, 104.0);
    assert_eq!(prediction.based_on, "2024-01-04");

    // 未知代码 → 404；已登记但无历史 → 400
    let resp = client
        .get(format!("{}/api/v1/market/predict/ZZZZ_NOT_REAL", addr))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);

    let resp = client
        .get(format!("{}/api/v1/market/predict/EMPTYX", addr))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);

    // 6. 刷新触发：密钥错误 → 401；正确 → 任务后台执行并写入价格库
    let resp = client
        .post(format!("{}/internal/refresh-all?secret=wrong", addr))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);

    let resp = client
        .post(format!(
            "{}/internal/refresh-all?secret=test_refresh_secret",
            addr
        ))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::OK);

    // 等待后台任务完成
    tokio::time::sleep(std::time::Duration::from_millis(500)).await;
    let ingested = price_store.list_bars("NEW", None).await.unwrap();
    assert_eq!(ingested.len(), 1);
    assert_eq!(ingested[0].close, 10.0);
}
