//! HTTP surface: routes, handlers and request logging

pub mod middleware;
pub mod routes;

pub use routes::build_router;
