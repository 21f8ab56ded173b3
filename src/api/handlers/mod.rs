pub mod chain;
pub mod page;
