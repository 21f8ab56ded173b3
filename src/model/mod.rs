pub mod chain;
pub mod contract;

pub use chain::{ChainRow, ChainTable, ChainView, NearestChain};
pub use contract::{Contract, OptionType, TickerQuote};
