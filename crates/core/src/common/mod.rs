use serde::{Deserialize, Serialize};

/// # Summary
/// 证券标的实体，代表系统跟踪的一只股票及其静态描述信息。
///
/// # Invariants
/// - `symbol` 必须是合法的交易代码（非美股可带交易所后缀，如 `7203.T`）。
/// - 首次摄取时创建，正常运行中永不删除。
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Instrument {
    // 股票代码 (例如: AAPL, 7203.T)
    pub symbol: String,
    // 公司/显示名称 (可选)
    pub name: Option<String>,
    // 所属板块/行业 (可选)
    pub sector: Option<String>,
}

impl Instrument {
    /// 仅凭代码构造标的，名称默认取代码本身（数据源未提供元数据时的降级）。
    pub fn from_symbol(symbol: impl Into<String>) -> Self {
        let symbol = symbol.into();
        Self {
            name: Some(symbol.clone()),
            sector: None,
            symbol,
        }
    }
}

/// # Summary
/// 标的在价格库中的行标识。
///
/// # Invariants
/// - 由价格库在 `upsert_instrument` 时分配，同一 symbol 永远映射到同一 id。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct InstrumentId(pub i64);

impl std::fmt::Display for InstrumentId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}
