//! # 自选股路由控制器
//!
//! 登录用户的关注列表增删查，全部路由受 JWT 鉴权保护。

use axum::Json;
use axum::extract::{Path, State};

use crate::error::ApiError;
use crate::middleware::auth::CurrentUser;
use crate::server::AppState;
use crate::types::{ApiResponse, WatchlistRequest};

/// 获取自选股列表
#[utoipa::path(
    get,
    path = "/api/v1/user/watchlist",
    tag = "自选股 (Watchlist)",
    security(("bearer_jwt" = [])),
    responses(
        (status = 200, description = "获取成功", body = ApiResponse<Vec<String>>),
        (status = 401, description = "未认证")
    )
)]
pub async fn get_watchlist(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
) -> Result<Json<ApiResponse<Vec<String>>>, ApiError> {
    let symbols = state.system_store.get_watchlist(&user.id).await?;
    Ok(Json(ApiResponse::ok(symbols)))
}

/// 添加自选股
///
/// 重复添加同一代码是 no-op。
#[utoipa::path(
    post,
    path = "/api/v1/user/watchlist",
    tag = "自选股 (Watchlist)",
    security(("bearer_jwt" = [])),
    request_body = WatchlistRequest,
    responses(
        (status = 200, description = "添加成功", body = ApiResponse<String>),
        (status = 401, description = "未认证")
    )
)]
pub async fn add_to_watchlist(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Json(req): Json<WatchlistRequest>,
) -> Result<Json<ApiResponse<String>>, ApiError> {
    let symbol = req.symbol.to_uppercase();
    state.system_store.add_to_watchlist(&user.id, &symbol).await?;
    Ok(Json(ApiResponse::ok("ok".to_string())))
}

/// 删除自选股
#[utoipa::path(
    delete,
    path = "/api/v1/user/watchlist/{symbol}",
    tag = "自选股 (Watchlist)",
    security(("bearer_jwt" = [])),
    params(
        ("symbol" = String, Path, description = "股票代码")
    ),
    responses(
        (status = 200, description = "删除成功", body = ApiResponse<String>),
        (status = 401, description = "未认证")
    )
)]
pub async fn remove_from_watchlist(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Path(symbol): Path<String>,
) -> Result<Json<ApiResponse<String>>, ApiError> {
    let symbol = symbol.to_uppercase();
    state
        .system_store
        .remove_from_watchlist(&user.id, &symbol)
        .await?;
    Ok(Json(ApiResponse::ok("ok".to_string())))
}
