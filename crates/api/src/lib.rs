//! HTTP boundary: routing, bearer authentication and error mapping.

pub mod app;
pub mod context;
pub mod middleware;
