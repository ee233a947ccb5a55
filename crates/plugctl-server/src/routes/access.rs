use std::net::SocketAddr;

use axum::extract::{ConnectInfo, Request, State};
use axum::middleware::Next;
use axum::response::Response;

use crate::state::AppState;

/// Middleware: append `<METHOD> <remote> <uri>` to the access log for every request.
pub async fn access_log(State(app): State<AppState>, req: Request, next: Next) -> Response {
    let remote = req
        .extensions()
        .get::<ConnectInfo<SocketAddr>>()
        .map(|ConnectInfo(addr)| addr.to_string())
        .unwrap_or_else(|| "-".to_string());
    let method = req.method().to_string();
    let uri = req.uri().to_string();

    app.events.access(&method, &remote, &uri).await;
    next.run(req).await
}
