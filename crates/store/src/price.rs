use async_trait::async_trait;
use chrono::NaiveDate;
use kabu_core::common::{Instrument, InstrumentId};
use kabu_core::market::entity::PriceBar;
use kabu_core::store::error::StoreError;
use kabu_core::store::port::PriceStore;
use sqlx::{
    SqlitePool,
    sqlite::{SqliteConnectOptions, SqlitePoolOptions},
};
use std::fs;
use tracing::info;

/// 价格库数据库文件名
const PRICE_DB: &str = "market.db";

/// PriceStore 的 SQLite 实现。
///
/// # Summary
/// 在中心化的 SQLite 数据库 (`market.db`) 中管理标的与日线 Bar，
/// 即 `stocks` / `stock_prices` 两张表。
///
/// # Invariants
/// * `stocks.symbol` 唯一；`stock_prices` 在 `(stock_id, date)` 上唯一，
///   由表级 UNIQUE 约束保证不重复。
/// * 所有 Upsert 使用 `INSERT OR IGNORE`：已存在的行永不被改写。
pub struct SqlitePriceStore {
    pool: SqlitePool,
}

impl SqlitePriceStore {
    /// 创建新的 SqlitePriceStore 并初始化表结构。
    ///
    /// # Logic
    /// 1. 获取配置的数据根目录并确保其存在。
    /// 2. 配置 SQLite 连接选项，开启 `create_if_missing`。
    /// 3. 连接到数据库并执行 DDL 初始化价格表结构。
    ///
    /// # Returns
    /// * `Result<Self, StoreError>` - 存储实例或初始化错误。
    pub async fn new() -> Result<Self, StoreError> {
        let root = crate::config::get_root_dir();
        fs::create_dir_all(&root).map_err(|e| StoreError::InitError(e.to_string()))?;

        let db_path = root.join(PRICE_DB);

        // 使用官方推荐的配置方式，确保自动创建数据库文件
        let options = SqliteConnectOptions::new()
            .filename(&db_path)
            .create_if_missing(true);

        let pool = SqlitePoolOptions::new()
            .connect_with(options)
            .await
            .map_err(|e| StoreError::InitError(e.to_string()))?;

        // 初始化价格表
        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS stocks (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                symbol TEXT NOT NULL UNIQUE,
                company_name TEXT,
                sector TEXT
            );

            CREATE TABLE IF NOT EXISTS stock_prices (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                stock_id INTEGER NOT NULL REFERENCES stocks(id),
                date DATE NOT NULL,
                open REAL NOT NULL,
                high REAL NOT NULL,
                low REAL NOT NULL,
                close REAL NOT NULL,
                volume INTEGER NOT NULL,
                UNIQUE (stock_id, date)
            );
            "#,
        )
        .execute(&pool)
        .await
        .map_err(|e| StoreError::InitError(e.to_string()))?;

        info!("Price store ready at {}", db_path.display());
        Ok(Self { pool })
    }
}

#[async_trait]
impl PriceStore for SqlitePriceStore {
    /// # Summary
    /// 创建（或定位）一只标的。
    ///
    /// # Logic
    /// 1. 对 `stocks` 执行 `INSERT OR IGNORE`。
    /// 2. 再按 symbol 回查行 id（无论本次是否插入，id 均稳定）。
    async fn upsert_instrument(
        &self,
        instrument: &Instrument,
    ) -> Result<InstrumentId, StoreError> {
        sqlx::query("INSERT OR IGNORE INTO stocks (symbol, company_name, sector) VALUES (?, ?, ?)")
            .bind(&instrument.symbol)
            .bind(&instrument.name)
            .bind(&instrument.sector)
            .execute(&self.pool)
            .await
            .map_err(|e| StoreError::Database(e.to_string()))?;

        let id = sqlx::query_scalar::<_, i64>("SELECT id FROM stocks WHERE symbol = ?")
            .bind(&instrument.symbol)
            .fetch_one(&self.pool)
            .await
            .map_err(|e| StoreError::Database(e.to_string()))?;

        Ok(InstrumentId(id))
    }

    /// # Summary
    /// 按代码查询标的。
    async fn get_instrument(
        &self,
        symbol: &str,
    ) -> Result<Option<(InstrumentId, Instrument)>, StoreError> {
        let row = sqlx::query_as::<_, (i64, String, Option<String>, Option<String>)>(
            "SELECT id, symbol, company_name, sector FROM stocks WHERE symbol = ?",
        )
        .bind(symbol)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| StoreError::Database(e.to_string()))?;

        Ok(row.map(|r| {
            (
                InstrumentId(r.0),
                Instrument {
                    symbol: r.1,
                    name: r.2,
                    sector: r.3,
                },
            )
        }))
    }

    /// # Summary
    /// 写入单日 Bar（insert-if-absent）。
    ///
    /// # Logic
    /// 1. 执行 `INSERT OR IGNORE`，依赖 `(stock_id, date)` 唯一约束。
    /// 2. 通过受影响行数区分"实际插入"与"已存在跳过"。
    async fn upsert_bar(
        &self,
        instrument_id: InstrumentId,
        bar: &PriceBar,
    ) -> Result<bool, StoreError> {
        let result = sqlx::query(
            r#"
            INSERT OR IGNORE INTO stock_prices (stock_id, date, open, high, low, close, volume)
            VALUES (?, ?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(instrument_id.0)
        .bind(bar.date)
        .bind(bar.open)
        .bind(bar.high)
        .bind(bar.low)
        .bind(bar.close)
        .bind(bar.volume)
        .execute(&self.pool)
        .await
        .map_err(|e| StoreError::Database(e.to_string()))?;

        Ok(result.rows_affected() > 0)
    }

    /// # Summary
    /// 查询某标的已入库的最近交易日期。
    async fn latest_bar_date(
        &self,
        instrument_id: InstrumentId,
    ) -> Result<Option<NaiveDate>, StoreError> {
        sqlx::query_scalar::<_, Option<NaiveDate>>(
            "SELECT MAX(date) FROM stock_prices WHERE stock_id = ?",
        )
        .bind(instrument_id.0)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| StoreError::Database(e.to_string()))
    }

    /// # Summary
    /// 读取某标的的历史 Bar 序列，按日期降序（最新在前）。
    ///
    /// # Logic
    /// 1. JOIN `stocks` 定位标的。
    /// 2. `ORDER BY date DESC LIMIT ?`；SQLite 中负数 LIMIT 表示不限。
    async fn list_bars(
        &self,
        symbol: &str,
        limit: Option<usize>,
    ) -> Result<Vec<PriceBar>, StoreError> {
        let limit = limit.and_then(|l| i64::try_from(l).ok()).unwrap_or(-1);

        let records = sqlx::query_as::<_, (NaiveDate, f64, f64, f64, f64, i64)>(
            r#"
            SELECT p.date, p.open, p.high, p.low, p.close, p.volume
            FROM stock_prices p
            JOIN stocks s ON s.id = p.stock_id
            WHERE s.symbol = ?
            ORDER BY p.date DESC
            LIMIT ?
            "#,
        )
        .bind(symbol)
        .bind(limit)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| StoreError::Database(e.to_string()))?;

        Ok(records
            .into_iter()
            .map(|r| PriceBar {
                date: r.0,
                open: r.1,
                high: r.2,
                low: r.3,
                close: r.4,
                volume: r.5,
            })
            .collect())
    }

    /// # Summary
    /// 列出价格库中所有已知的股票代码（字典序）。
    async fn list_symbols(&self) -> Result<Vec<String>, StoreError> {
        sqlx::query_scalar::<_, String>("SELECT symbol FROM stocks ORDER BY symbol")
            .fetch_all(&self.pool)
            .await
            .map_err(|e| StoreError::Database(e.to_string()))
    }
}
