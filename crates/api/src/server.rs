//! # API 服务启动器
//!
//! 组装 axum 路由、挂载 Swagger UI、配置 CORS 并绑定 TCP 端口对外提供服务。
//! 本模块不直接启动 `main()`, 而是由 `crates/app` 的 DI 容器持有并调用。

use std::sync::Arc;

use axum::Router;
use tower_http::cors::{Any, CorsLayer};
use utoipa::openapi::security::{HttpAuthScheme, HttpBuilder, SecurityScheme};
use utoipa::{Modify, OpenApi};
use utoipa_axum::router::OpenApiRouter;
use utoipa_axum::routes;
use utoipa_swagger_ui::SwaggerUi;

use kabu_core::config::AppConfig;
use kabu_core::predict::port::ClosePredictor;
use kabu_core::store::port::{PriceStore, SystemStore};
use kabu_ingest::IngestJob;

use crate::routes::{admin, auth, market, predict, watchlist};

// ============================================================
//  共享应用状态
// ============================================================

/// 全局应用状态，通过 axum 的 `State` 提取器注入到每个 Handler 中。
///
/// # Invariants
/// - 所有句柄在服务启动前由 DI 容器注入，生命周期与进程等同。
/// - `predictor` 持有的模型在注入前已完成加载与校验。
#[derive(Clone)]
pub struct AppState {
    /// 价格库访问接口（历史价格查询）
    pub price_store: Arc<dyn PriceStore>,
    /// 系统数据访问接口（鉴权验证和用户管理）
    pub system_store: Arc<dyn SystemStore>,
    /// 次日收盘价预测引擎
    pub predictor: Arc<dyn ClosePredictor>,
    /// 摄取任务（由 refresh 接口在后台触发）
    pub ingest_job: Arc<IngestJob>,
    /// 全局配置（JWT 密钥、刷新密钥）
    pub app_config: Arc<AppConfig>,
}

// ============================================================
//  OpenAPI 文档定义
// ============================================================

/// 全局 OpenAPI 文档结构
#[derive(OpenApi)]
#[openapi(
    info(
        title = "kabu 股票看板 API",
        version = "0.1.0",
        description = "kabu 股票看板的 RESTful API 网关。提供历史价格查询、次日收盘价预测、自选股管理与数据刷新触发。",
        contact(name = "kabu Team"),
        license(name = "MIT")
    ),
    tags(
        (name = "鉴权 (Auth)", description = "注册、JWT 获取、密码修改相关 API"),
        (name = "行情 (Market)", description = "历史价格与代码列表查询"),
        (name = "预测 (Predict)", description = "次一交易日收盘价预测"),
        (name = "自选股 (Watchlist)", description = "登录用户的关注列表管理"),
        (name = "运维 (Internal)", description = "外部调度器的数据刷新触发")
    ),
    modifiers(&SecurityAddon)
)]
pub struct ApiDoc;

/// 为 OpenAPI 文档注入全局 Bearer JWT 鉴权方案。
///
/// 注册后，Swagger UI 页面顶部将显示 🔒 Authorize 按钮，
/// 用户可以填入 JWT Token 后对所有标记了 `security` 的接口进行鉴权测试。
struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        // 若 components 不存在则创建
        let components = openapi.components.get_or_insert_with(Default::default);

        // 注册名为 "bearer_jwt" 的 HTTP Bearer 鉴权方案
        components.add_security_scheme(
            "bearer_jwt",
            SecurityScheme::Http(
                HttpBuilder::new()
                    .scheme(HttpAuthScheme::Bearer)
                    .bearer_format("JWT")
                    .description(Some(
                        "在此处填入登录接口返回的 JWT Token（无需 'Bearer ' 前缀）",
                    ))
                    .build(),
            ),
        );
    }
}

// ============================================================
//  服务构建与启动
// ============================================================

/// 构建完整的 axum 应用路由树。
///
/// 独立于端口绑定，集成测试用它在随机端口上启动同一棵路由树。
pub fn build_router(state: AppState) -> Router {
    // 1. 无需鉴权的公开路由
    let public_router = OpenApiRouter::new()
        .routes(routes!(auth::register))
        .routes(routes!(auth::login))
        .routes(routes!(market::list_symbols))
        .routes(routes!(market::get_prices))
        .routes(routes!(predict::predict_next_close))
        .routes(routes!(admin::refresh_all));

    // 2. 需要合法 JWT 鉴权的路由 (登录用户)
    let user_protected_router = OpenApiRouter::new()
        .routes(routes!(auth::change_password))
        .routes(routes!(watchlist::get_watchlist))
        .routes(routes!(watchlist::add_to_watchlist))
        .routes(routes!(watchlist::remove_from_watchlist))
        .layer(axum::middleware::from_fn_with_state(
            state.clone(),
            crate::middleware::auth::auth_middleware,
        ));

    // 3. 合并所有路由与自动收集的 OpenAPI Doc
    let (router, api) = OpenApiRouter::with_openapi(ApiDoc::openapi())
        .merge(public_router)
        .merge(user_protected_router)
        .with_state(state)
        .split_for_parts();

    // 4. 配置 CORS (开发阶段允许所有来源)
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    // 5. 合并 Swagger UI 路由并应用中间件
    router
        .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", api))
        .layer(cors)
}

/// 构建路由树并启动 HTTP 监听。
///
/// # Arguments
/// * `state` - 由外部 DI 容器注入的共享状态
/// * `bind_addr` - 监听的地址与端口，如 `"0.0.0.0:8080"`
pub async fn start_server(
    state: AppState,
    bind_addr: &str,
) -> Result<(), Box<dyn std::error::Error>> {
    let app = build_router(state);

    tracing::info!("🚀 kabu API Server listening on {}", bind_addr);
    tracing::info!("📖 Swagger UI: http://{}/swagger-ui/", bind_addr);

    let listener = tokio::net::TcpListener::bind(bind_addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
