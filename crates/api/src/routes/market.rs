//! # 行情路由控制器
//!
//! 面向看板的历史价格查询接口，直接读取价格库。

use axum::Json;
use axum::extract::{Path, Query, State};
use serde::Deserialize;
use utoipa::ToSchema;

use crate::error::ApiError;
use crate::server::AppState;
use crate::types::{ApiResponse, PriceHistoryResponse};

#[derive(Deserialize, ToSchema)]
pub struct PricesQuery {
    /// 返回条数上限；缺省返回全部历史
    pub limit: Option<usize>,
}

/// 列出所有已跟踪的股票代码
#[utoipa::path(
    get,
    path = "/api/v1/market/symbols",
    tag = "行情 (Market)",
    responses(
        (status = 200, description = "获取成功", body = ApiResponse<Vec<String>>)
    )
)]
pub async fn list_symbols(
    State(state): State<AppState>,
) -> Result<Json<ApiResponse<Vec<String>>>, ApiError> {
    let symbols = state.price_store.list_symbols().await?;
    Ok(Json(ApiResponse::ok(symbols)))
}

/// 获取某股票的历史价格序列
///
/// 日期降序（最新在前）。未知 symbol 返回 404；
/// 已登记但暂无数据的 symbol 返回空序列。
#[utoipa::path(
    get,
    path = "/api/v1/market/prices/{symbol}",
    tag = "行情 (Market)",
    params(
        ("symbol" = String, Path, description = "股票代码（大小写不敏感）"),
        ("limit" = Option<usize>, Query, description = "返回条数上限")
    ),
    responses(
        (status = 200, description = "获取成功", body = ApiResponse<PriceHistoryResponse>),
        (status = 404, description = "未知的股票代码")
    )
)]
pub async fn get_prices(
    State(state): State<AppState>,
    Path(symbol): Path<String>,
    Query(query): Query<PricesQuery>,
) -> Result<Json<ApiResponse<PriceHistoryResponse>>, ApiError> {
    let symbol = symbol.to_uppercase();

    if state.price_store.get_instrument(&symbol).await?.is_none() {
        return Err(ApiError::NotFound(format!(
            "Stock symbol '{}' not found",
            symbol
        )));
    }

    let bars = state.price_store.list_bars(&symbol, query.limit).await?;

    Ok(Json(ApiResponse::ok(PriceHistoryResponse {
        symbol,
        prices: bars.into_iter().map(Into::into).collect(),
    })))
}
