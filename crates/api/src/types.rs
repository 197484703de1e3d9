//! # DTO (Data Transfer Object) 层
//!
//! 将内部领域模型转化为面向前端 JSON 输出的轻量结构体。
//! 所有 DTO 必须派生 `utoipa::ToSchema` 以自动进入 Swagger 文档。

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

// ============================================================
//  行情相关 DTO
// ============================================================

/// 单日价格 DTO
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct PriceBarResponse {
    /// 交易日期 (ISO 8601)
    #[schema(example = "2024-01-04")]
    pub date: String,
    /// 开盘价
    #[schema(example = 101.2)]
    pub open: f64,
    /// 最高价
    #[schema(example = 103.0)]
    pub high: f64,
    /// 最低价
    #[schema(example = 100.5)]
    pub low: f64,
    /// 收盘价
    #[schema(example = 102.0)]
    pub close: f64,
    /// 成交量
    #[schema(example = 1000000_i64)]
    pub volume: i64,
}

/// 历史价格序列 DTO - 看板图表的直接数据源
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct PriceHistoryResponse {
    /// 股票代码
    #[schema(example = "AAPL")]
    pub symbol: String,
    /// 价格序列，日期降序（最新在前）
    pub prices: Vec<PriceBarResponse>,
}

/// 次日收盘价预测 DTO
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct PredictionResponse {
    /// 股票代码
    #[schema(example = "AAPL")]
    pub symbol: String,
    /// 预测的次一交易日收盘价
    #[schema(example = 187.35)]
    pub predicted_close: f64,
    /// 特征取自哪个交易日的 Bar (ISO 8601)
    #[schema(example = "2024-01-04")]
    pub based_on: String,
}

// ============================================================
//  自选股 DTO
// ============================================================

/// 添加自选股请求体
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct WatchlistRequest {
    /// 股票代码
    #[schema(example = "AAPL")]
    pub symbol: String,
}

// ============================================================
//  通用响应 DTO
// ============================================================

/// 统一 API 响应包装器
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct ApiResponse<T: Serialize + ToSchema> {
    /// 是否成功
    pub success: bool,
    /// 数据载荷 (成功时)
    pub data: Option<T>,
    /// 错误信息 (失败时)
    pub error: Option<String>,
}

impl<T: Serialize + ToSchema> ApiResponse<T> {
    /// 构建成功响应
    pub fn ok(data: T) -> Self {
        Self {
            success: true,
            data: Some(data),
            error: None,
        }
    }
}

/// 构建失败响应 (不含泛型载荷)
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct ApiErrorResponse {
    /// 固定为 false
    pub success: bool,
    /// 错误描述信息
    pub error: String,
}

impl ApiErrorResponse {
    /// 从错误信息构建
    pub fn from_msg(msg: impl Into<String>) -> Self {
        Self {
            success: false,
            error: msg.into(),
        }
    }
}

// ============================================================
//  鉴权 DTO
// ============================================================

/// 注册请求体
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct RegisterRequest {
    /// 用户登录 ID
    #[schema(example = "trader_01")]
    pub username: String,
    /// 用户显示名
    #[schema(example = "John Doe")]
    pub name: String,
    /// 密码
    #[schema(example = "P@ssw0rd!")]
    pub password: String,
}

/// 登录请求体
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct LoginRequest {
    /// 用户名
    #[schema(example = "trader_01")]
    pub username: String,
    /// 密码
    #[schema(example = "password123")]
    pub password: String,
}

/// 修改密码请求体
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct ChangePasswordRequest {
    /// 原密码
    #[schema(example = "oldpassword123")]
    pub old_password: String,
    /// 新密码
    #[schema(example = "newSecurePwd!")]
    pub new_password: String,
}

/// 用户基础信息响应 DTO
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct UserResponse {
    /// 用户唯一标识
    #[schema(example = "trader_01")]
    pub id: String,
    /// 显示名称
    #[schema(example = "John Doe")]
    pub name: String,
    /// 注册时间
    #[schema(example = "2026-03-01T00:00:00Z")]
    pub created_at: String,
}

/// 登录成功返回的 Token
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct LoginResponse {
    /// JWT Bearer Token
    #[schema(example = "eyJhbGciOiJIUzI1NiIs...")]
    pub token: String,
    /// Token 过期时间 (秒)
    #[schema(example = 604800_u64)]
    pub expires_in: u64,
}

/// JWT Claims 内容 (内部使用，不暴露到 Swagger)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    /// 用户唯一标识
    pub sub: String,
    /// Token 过期时间 (Unix 时间戳)
    pub exp: usize,
}

// ============================================================
//  领域模型 → DTO 惯用转换 (impl From<T>)
// ============================================================

impl From<kabu_core::market::entity::PriceBar> for PriceBarResponse {
    fn from(b: kabu_core::market::entity::PriceBar) -> Self {
        Self {
            date: b.date.to_string(),
            open: b.open,
            high: b.high,
            low: b.low,
            close: b.close,
            volume: b.volume,
        }
    }
}

impl From<kabu_core::predict::entity::Prediction> for PredictionResponse {
    fn from(p: kabu_core::predict::entity::Prediction) -> Self {
        Self {
            symbol: p.symbol,
            predicted_close: p.predicted_close,
            based_on: p.based_on.to_string(),
        }
    }
}

impl From<&kabu_core::store::port::User> for UserResponse {
    fn from(u: &kabu_core::store::port::User) -> Self {
        Self {
            id: u.id.clone(),
            name: u.name.clone(),
            created_at: u.created_at.to_rfc3339(),
        }
    }
}
