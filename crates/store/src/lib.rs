//! # `kabu-store` - SQLite 持久化适配器
//!
//! 通过 `sqlx` 实现 `kabu-core` 定义的两个存储端口：
//! - [`price::SqlitePriceStore`]: 标的与日线 Bar（`market.db`）
//! - [`system::SqliteSystemStore`]: 用户与自选股（`app.db`）
//!
//! 数据根目录由 [`config::set_root_dir`] 在进程启动时注入。

pub mod config;
pub mod price;
pub mod system;
