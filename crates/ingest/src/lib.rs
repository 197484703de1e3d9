//! # `kabu-ingest` - 日线摄取任务
//!
//! 将价格库更新到最新状态的批处理任务：对每只跟踪的股票，从外部数据源
//! 拉取最近的日线 Bar 并以 insert-if-absent 语义写入价格库。
//!
//! 任务本身无状态（状态全部在价格库中），由外部调度器按周期触发；
//! 单个 symbol 的失败被捕获并记入运行报告，永不中断整个批次。

pub mod job;

pub use job::{IngestJob, IngestReport, SymbolReport};
