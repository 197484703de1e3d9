use super::error::StoreError;
use crate::common::{Instrument, InstrumentId};
use crate::market::entity::PriceBar;
use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

/// # Summary
/// 用户实体，代表看板系统的注册使用者。
///
/// # Invariants
/// - `id` (登录名) 必须全局唯一。
/// - `password_hash` 存储 bcrypt 哈希，永不存储明文密码。
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct User {
    // 用户唯一标识 (登录名)
    pub id: String,
    // 用户显示名称
    pub name: String,
    // bcrypt 密码哈希
    pub password_hash: String,
    // 注册时间
    pub created_at: DateTime<Utc>,
}

/// # Summary
/// 价格库存储接口，负责标的与日线 Bar 的持久化与读取。
///
/// # Invariants
/// - 同一 `(instrument, date)` 组合至多存在一根 Bar，由底层唯一约束保证。
/// - 所有 Upsert 均为 insert-if-absent 语义：已存在的行永不被修改。
/// - 单根 Bar 的写入失败只影响该条记录，不得波及连接池或其他行。
#[async_trait]
pub trait PriceStore: Send + Sync {
    /// # Summary
    /// 创建（或定位）一只标的。
    ///
    /// # Logic
    /// 1. 按 symbol 执行 insert-if-absent。
    /// 2. 无论本次是否实际插入，都返回该 symbol 对应的行 id。
    ///
    /// # Arguments
    /// * `instrument`: 待登记的标的实体。
    ///
    /// # Returns
    /// 返回标的行标识；重复调用同一 symbol 不报错且 id 稳定。
    async fn upsert_instrument(&self, instrument: &Instrument)
    -> Result<InstrumentId, StoreError>;

    /// # Summary
    /// 按代码查询标的。
    ///
    /// # Arguments
    /// * `symbol`: 股票代码。
    ///
    /// # Returns
    /// 存在返回 `Some((id, instrument))`，否则返回 `None`。
    async fn get_instrument(
        &self,
        symbol: &str,
    ) -> Result<Option<(InstrumentId, Instrument)>, StoreError>;

    /// # Summary
    /// 写入单日 Bar（insert-if-absent）。
    ///
    /// # Logic
    /// 1. 若 `(instrument_id, date)` 不存在则插入。
    /// 2. 若已存在则静默跳过，不修改既有值——重跑摄取任务的稳态行为。
    ///
    /// # Arguments
    /// * `instrument_id`: 标的行标识。
    /// * `bar`: 待写入的日线数据。
    ///
    /// # Returns
    /// 本次实际插入返回 `true`，因已存在而跳过返回 `false`。
    async fn upsert_bar(
        &self,
        instrument_id: InstrumentId,
        bar: &PriceBar,
    ) -> Result<bool, StoreError>;

    /// # Summary
    /// 查询某标的已入库的最近交易日期。
    ///
    /// # Arguments
    /// * `instrument_id`: 标的行标识。
    ///
    /// # Returns
    /// 有历史数据返回 `Some(date)`，否则返回 `None`。
    async fn latest_bar_date(
        &self,
        instrument_id: InstrumentId,
    ) -> Result<Option<NaiveDate>, StoreError>;

    /// # Summary
    /// 读取某标的的历史 Bar 序列，按日期降序（最新在前）。
    ///
    /// # Arguments
    /// * `symbol`: 股票代码。
    /// * `limit`: 返回条数上限；`None` 表示全部。
    ///
    /// # Returns
    /// 未知 symbol 返回空列表（不是错误）。
    async fn list_bars(
        &self,
        symbol: &str,
        limit: Option<usize>,
    ) -> Result<Vec<PriceBar>, StoreError>;

    /// # Summary
    /// 列出价格库中所有已知的股票代码。
    ///
    /// # Returns
    /// 按字典序排列的代码列表。
    async fn list_symbols(&self) -> Result<Vec<String>, StoreError>;
}

/// # Summary
/// 系统级数据存储接口，负责用户与自选股的持久化。
///
/// # Invariants
/// - 自选股按 `(user_id, symbol)` 去重，重复添加为 no-op。
#[async_trait]
pub trait SystemStore: Send + Sync {
    /// # Summary
    /// 获取用户信息。
    ///
    /// # Arguments
    /// * `id`: 用户唯一标识。
    ///
    /// # Returns
    /// 存在返回 `Some(User)`，否则返回 `None`。
    async fn get_user(&self, id: &str) -> Result<Option<User>, StoreError>;

    /// # Summary
    /// 保存或更新用户信息。
    ///
    /// # Logic
    /// 执行 Upsert 操作写入 `users` 表。
    ///
    /// # Arguments
    /// * `user`: 待保存的用户实体。
    async fn save_user(&self, user: &User) -> Result<(), StoreError>;

    /// # Summary
    /// 获取用户的自选股代码列表。
    ///
    /// # Arguments
    /// * `user_id`: 用户唯一标识。
    async fn get_watchlist(&self, user_id: &str) -> Result<Vec<String>, StoreError>;

    /// # Summary
    /// 将股票添加到用户自选股，忽略重复项。
    ///
    /// # Arguments
    /// * `user_id`: 用户唯一标识。
    /// * `symbol`: 股票代码。
    async fn add_to_watchlist(&self, user_id: &str, symbol: &str) -> Result<(), StoreError>;

    /// # Summary
    /// 将股票从用户自选股移除。
    ///
    /// # Arguments
    /// * `user_id`: 用户唯一标识。
    /// * `symbol`: 股票代码。
    async fn remove_from_watchlist(&self, user_id: &str, symbol: &str)
    -> Result<(), StoreError>;
}
