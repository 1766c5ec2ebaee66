pub mod candle;
pub mod catalog;
pub mod growth;
pub mod indicators;
pub mod score;

pub use candle::*;
pub use catalog::*;
pub use growth::*;
pub use indicators::*;
pub use score::*;
