//! Command implementations.

pub mod assert;
pub mod export;
pub mod output;
