//! # `kabu-feed` - 行情数据源适配器
//!
//! 实现 `kabu-core` 的 [`PriceProvider`](kabu_core::market::port::PriceProvider)
//! 端口。当前唯一的实现是 Yahoo Finance v8 chart 接口的 [`yahoo::YahooProvider`]。

pub mod yahoo;
