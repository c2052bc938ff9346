//! Shared data models spanning the service layers.

pub mod audit;
pub mod indicators;
pub mod request;

pub use audit::AuditRecord;
pub use indicators::{MacdSeries, PriceSeries, TrendReport};
pub use request::{IndicatorRequest, StockInfo, StockRequest};
