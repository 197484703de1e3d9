//! # 内部运维路由控制器
//!
//! 供外部调度器触发全量数据刷新。不走 JWT：调度器持有独立的共享密钥。

use axum::Json;
use axum::extract::{Query, State};
use serde::Deserialize;
use utoipa::ToSchema;

use crate::error::ApiError;
use crate::server::AppState;
use crate::types::ApiResponse;

#[derive(Deserialize, ToSchema)]
pub struct RefreshQuery {
    /// 与服务端配置比对的共享密钥
    pub secret: String,
}

/// 触发全量数据刷新
///
/// 密钥校验通过后在后台启动摄取任务并立即返回；
/// 进度通过服务端日志观察（任务按 symbol 逐条输出结果）。
#[utoipa::path(
    post,
    path = "/internal/refresh-all",
    tag = "运维 (Internal)",
    params(
        ("secret" = String, Query, description = "刷新密钥")
    ),
    responses(
        (status = 200, description = "刷新任务已启动", body = ApiResponse<String>),
        (status = 401, description = "密钥错误")
    )
)]
pub async fn refresh_all(
    State(state): State<AppState>,
    Query(query): Query<RefreshQuery>,
) -> Result<Json<ApiResponse<String>>, ApiError> {
    if query.secret != state.app_config.server.refresh_secret {
        tracing::warn!("Refresh trigger rejected: bad secret");
        return Err(ApiError::Unauthorized("Invalid refresh secret".into()));
    }

    let job = state.ingest_job.clone();
    tokio::spawn(async move {
        let report = job.run().await;
        tracing::info!("Background refresh finished: {}", report.summary());
    });

    Ok(Json(ApiResponse::ok(
        "Full data refresh started in the background. Monitor the server logs for progress."
            .to_string(),
    )))
}
