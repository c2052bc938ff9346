//! Stock trend analytics service.
//!
//! Fetches adjusted-close series from a chart API, derives EMA and MACD
//! indicators, and keeps an append-only audit log of analytics requests.

pub mod analytics;
pub mod audit;
pub mod config;
pub mod core;
pub mod indicators;
pub mod logging;
pub mod metrics;
pub mod models;
pub mod services;
