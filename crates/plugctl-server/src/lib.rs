pub mod error;
pub mod routes;
pub mod state;

use std::net::SocketAddr;

use axum::routing::get;
use axum::{middleware, Router};
use tower_http::trace::TraceLayer;

pub use state::AppState;

/// Build the axum Router with all routes and middleware.
/// Used by `serve()` and available for integration testing.
pub fn build_router(app_state: AppState) -> Router {
    Router::new()
        .route("/outside_bounds", get(routes::trigger::outside_bounds))
        .route("/logs", get(routes::logs::get_logs))
        .route("/health", get(routes::health::health))
        .layer(middleware::from_fn_with_state(
            app_state.clone(),
            routes::access::access_log,
        ))
        .layer(TraceLayer::new_for_http())
        .with_state(app_state)
}

/// Bind `0.0.0.0:<port>` and serve until the listener fails.
pub async fn serve(app_state: AppState, port: u16) -> anyhow::Result<()> {
    let addr = format!("0.0.0.0:{port}");
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    serve_on(app_state, listener).await
}

/// Serve on a pre-bound listener. Lets the caller read the actual port
/// first when binding to port 0.
pub async fn serve_on(
    app_state: AppState,
    listener: tokio::net::TcpListener,
) -> anyhow::Result<()> {
    let actual_port = listener.local_addr()?.port();
    let app = build_router(app_state);

    tracing::info!("plugctl listening on http://0.0.0.0:{actual_port}");

    axum::serve(
        listener,
        app.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .await?;
    Ok(())
}
