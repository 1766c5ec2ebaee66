//! Trendscope - composite buy/hold/sell scoring for crypto trading pairs

pub mod config;
pub mod error;
pub mod services;
pub mod types;

// Re-export commonly used types
pub use config::{Config, TrendConfig};
pub use error::{AppError, Result};
pub use types::*;
