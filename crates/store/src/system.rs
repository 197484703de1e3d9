use async_trait::async_trait;
use chrono::{DateTime, Utc};
use kabu_core::store::error::StoreError;
use kabu_core::store::port::{SystemStore, User};
use sqlx::{
    SqlitePool,
    sqlite::{SqliteConnectOptions, SqlitePoolOptions},
};
use std::fs;

/// 系统数据库文件名
const SYSTEM_DB: &str = "app.db";

/// SystemStore 的 SQLite 实现。
///
/// # Summary
/// 在中心化的 SQLite 数据库 (`app.db`) 中管理全局系统数据：用户与自选股。
///
/// # Invariants
/// * 数据库结构在存储实例创建时初始化。
/// * 所有操作均通过共享的 `SqlitePool` 执行。
pub struct SqliteSystemStore {
    pool: SqlitePool,
}

impl SqliteSystemStore {
    /// 创建新的 SqliteSystemStore 并初始化全局表结构。
    ///
    /// # Logic
    /// 1. 获取配置的数据根目录并确保其存在。
    /// 2. 配置 SQLite 连接选项，开启 `create_if_missing`。
    /// 3. 连接到数据库并执行 DDL 初始化系统表结构。
    ///
    /// # Returns
    /// * `Result<Self, StoreError>` - 存储实例或初始化错误。
    pub async fn new() -> Result<Self, StoreError> {
        let root = crate::config::get_root_dir();
        fs::create_dir_all(&root).map_err(|e| StoreError::InitError(e.to_string()))?;

        let db_path = root.join(SYSTEM_DB);

        // 使用官方推荐的配置方式，确保自动创建数据库文件
        let options = SqliteConnectOptions::new()
            .filename(db_path)
            .create_if_missing(true);

        let pool = SqlitePoolOptions::new()
            .connect_with(options)
            .await
            .map_err(|e| StoreError::InitError(e.to_string()))?;

        // 初始化系统表
        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS users (
                id TEXT PRIMARY KEY,
                name TEXT NOT NULL,
                password_hash TEXT NOT NULL,
                created_at DATETIME NOT NULL
            );

            CREATE TABLE IF NOT EXISTS watchlists (
                user_id TEXT NOT NULL,
                symbol TEXT NOT NULL,
                PRIMARY KEY (user_id, symbol)
            );
            "#,
        )
        .execute(&pool)
        .await
        .map_err(|e| StoreError::InitError(e.to_string()))?;

        Ok(Self { pool })
    }
}

#[async_trait]
impl SystemStore for SqliteSystemStore {
    /// # Summary
    /// 根据 ID 获取用户信息。
    ///
    /// # Logic
    /// 查询 `users` 表。
    async fn get_user(&self, id: &str) -> Result<Option<User>, StoreError> {
        let row = sqlx::query_as::<_, (String, String, String, DateTime<Utc>)>(
            "SELECT id, name, password_hash, created_at FROM users WHERE id = ?",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| StoreError::Database(e.to_string()))?;

        Ok(row.map(|r| User {
            id: r.0,
            name: r.1,
            password_hash: r.2,
            created_at: r.3,
        }))
    }

    /// # Summary
    /// 保存或更新用户信息。
    ///
    /// # Logic
    /// 在 `users` 表上执行 `INSERT OR REPLACE`。
    async fn save_user(&self, user: &User) -> Result<(), StoreError> {
        sqlx::query(
            "INSERT OR REPLACE INTO users (id, name, password_hash, created_at) VALUES (?, ?, ?, ?)",
        )
        .bind(&user.id)
        .bind(&user.name)
        .bind(&user.password_hash)
        .bind(user.created_at)
        .execute(&self.pool)
        .await
        .map_err(|e| StoreError::Database(e.to_string()))?;
        Ok(())
    }

    /// # Summary
    /// 获取用户的自选股代码列表。
    async fn get_watchlist(&self, user_id: &str) -> Result<Vec<String>, StoreError> {
        sqlx::query_scalar::<_, String>(
            "SELECT symbol FROM watchlists WHERE user_id = ? ORDER BY symbol",
        )
        .bind(user_id)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| StoreError::Database(e.to_string()))
    }

    /// # Summary
    /// 将股票添加到用户的自选列表，忽略已存在的项。
    async fn add_to_watchlist(&self, user_id: &str, symbol: &str) -> Result<(), StoreError> {
        sqlx::query("INSERT OR IGNORE INTO watchlists (user_id, symbol) VALUES (?, ?)")
            .bind(user_id)
            .bind(symbol)
            .execute(&self.pool)
            .await
            .map_err(|e| StoreError::Database(e.to_string()))?;
        Ok(())
    }

    /// # Summary
    /// 将股票从用户的自选列表移除。
    async fn remove_from_watchlist(&self, user_id: &str, symbol: &str)
    -> Result<(), StoreError> {
        sqlx::query("DELETE FROM watchlists WHERE user_id = ? AND symbol = ?")
            .bind(user_id)
            .bind(symbol)
            .execute(&self.pool)
            .await
            .map_err(|e| StoreError::Database(e.to_string()))?;
        Ok(())
    }
}
