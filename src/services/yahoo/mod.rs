//! Yahoo-style chart API adapter for historical adjusted-close series.

pub mod client;
pub mod messages;

pub use client::YahooChartClient;
pub use messages::ChartEnvelope;
