//! Stock analytics: request validation, orchestration and error mapping.

pub mod error;
pub mod pipeline;
pub mod validation;

pub use error::AnalyticsError;
pub use pipeline::{compute_trend, AnalyticsPipeline, Stage, MOVING_AVERAGE_PERIOD};
pub use validation::{validate_request, ValidationError};
