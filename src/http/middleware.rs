//! Request logging middleware

use std::net::SocketAddr;
use std::time::Instant;

use axum::{
    extract::{ConnectInfo, Request},
    middleware::Next,
    response::Response,
};
use tracing::info;

/// Log the start and end of every request with its elapsed time.
///
/// The remote address is only known when the server was started with
/// connect info; otherwise it is logged as `-`.
pub async fn log_request(request: Request, next: Next) -> Response {
    let method = request.method().clone();
    let path = request.uri().path().to_owned();
    let remote = request
        .extensions()
        .get::<ConnectInfo<SocketAddr>>()
        .map(|ConnectInfo(addr)| addr.to_string())
        .unwrap_or_else(|| "-".to_string());

    let start = Instant::now();
    info!(%method, %path, %remote, "START");

    let response = next.run(request).await;

    info!(
        %method,
        %path,
        status = response.status().as_u16(),
        elapsed = ?start.elapsed(),
        "END"
    );
    response
}
