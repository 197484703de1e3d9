//! # 预测路由控制器
//!
//! 调用预测引擎给出次日收盘价估计。

use axum::Json;
use axum::extract::{Path, State};

use crate::error::ApiError;
use crate::server::AppState;
use crate::types::{ApiResponse, PredictionResponse};

/// 预测某股票的次一交易日收盘价
///
/// 未知 symbol 返回 404；已登记但没有任何历史数据的 symbol 返回 400。
#[utoipa::path(
    get,
    path = "/api/v1/market/predict/{symbol}",
    tag = "预测 (Predict)",
    params(
        ("symbol" = String, Path, description = "股票代码（大小写不敏感）")
    ),
    responses(
        (status = 200, description = "预测成功", body = ApiResponse<PredictionResponse>),
        (status = 400, description = "历史数据不足"),
        (status = 404, description = "未知的股票代码")
    )
)]
pub async fn predict_next_close(
    State(state): State<AppState>,
    Path(symbol): Path<String>,
) -> Result<Json<ApiResponse<PredictionResponse>>, ApiError> {
    let symbol = symbol.to_uppercase();
    let prediction = state.predictor.predict_next_close(&symbol).await?;
    Ok(Json(ApiResponse::ok(prediction.into())))
}
