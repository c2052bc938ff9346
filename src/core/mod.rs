//! HTTP surface: router, middleware and handlers

pub mod auth;
pub mod http;
pub mod routes;

pub use http::*;
