//! # 鉴权中间件
//!
//! 提供基于 JWT 的身份验证，验证通过后将用户实体注入请求扩展。

use axum::extract::{FromRequestParts, Request, State};
use axum::http::request::Parts;
use axum::middleware::Next;
use axum::response::Response;
use jsonwebtoken::{DecodingKey, Validation, decode};

use crate::error::ApiError;
use crate::server::AppState;
use crate::types::Claims;

/// 提取并验证 Authorization: Bearer <token>
pub async fn auth_middleware(
    State(state): State<AppState>,
    mut req: Request,
    next: Next,
) -> Result<Response, ApiError> {
    let auth_header = req.headers().get(axum::http::header::AUTHORIZATION);

    let token = match auth_header {
        Some(header_val) => {
            let s = header_val
                .to_str()
                .map_err(|_| ApiError::Unauthorized("Invalid auth header".into()))?;
            if !s.starts_with("Bearer ") {
                tracing::warn!("Invalid Bearer format: {}", s);
                return Err(ApiError::Unauthorized("Invalid Bearer format".into()));
            }
            s[7..].to_string()
        }
        None => {
            tracing::warn!("Missing Authorization header");
            return Err(ApiError::Unauthorized("Missing Authorization header".into()));
        }
    };

    let claims = match verify_jwt(&token, &state.app_config.server.jwt_secret) {
        Ok(c) => c,
        Err(e) => {
            tracing::warn!("JWT verification failed: {:?}", e);
            return Err(e);
        }
    };

    // Token 有效但用户可能已被移除，按未认证处理
    let user = state
        .system_store
        .get_user(&claims.sub)
        .await
        .map_err(|e| ApiError::Internal(format!("DB Error: {}", e)))?
        .ok_or_else(|| ApiError::Unauthorized("User not found".into()))?;

    // 将用户信息注入 request extensions
    // 以便 downstream handlers 用 `CurrentUser` 提取
    req.extensions_mut().insert(user);
    req.extensions_mut().insert(claims);

    Ok(next.run(req).await)
}

/// 验证 JWT 返回强类型 Claims
pub fn verify_jwt(token: &str, secret: &str) -> Result<Claims, ApiError> {
    let mut validation = Validation::default();
    validation.set_required_spec_claims(&["exp", "sub"]);

    let token_data = decode::<Claims>(
        token,
        &DecodingKey::from_secret(secret.as_ref()),
        &validation,
    )
    .map_err(|_| ApiError::Unauthorized("Invalid or expired token".into()))?;

    Ok(token_data.claims)
}

// 在提取器中获取当前用户的快捷方式
pub struct CurrentUser(pub kabu_core::store::port::User);

impl<S> FromRequestParts<S> for CurrentUser
where
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let user = parts
            .extensions
            .get::<kabu_core::store::port::User>()
            .cloned()
            .ok_or_else(|| ApiError::Unauthorized("Missing User Context".into()))?;
        Ok(CurrentUser(user))
    }
}
