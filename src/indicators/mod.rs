//! Indicator engine: pure EMA and MACD calculations over price series.

pub mod momentum;
pub mod trend;

pub use momentum::*;
pub use trend::*;
