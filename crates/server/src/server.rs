use std::{sync::Arc, time::Instant};

use axum::{
    Router,
    extract::Request,
    middleware::{self, Next},
    response::Response,
    routing::{get, post},
};

use crate::{balances, expenses, users};
use engine::Engine;

#[derive(Clone)]
pub struct ServerState {
    pub engine: Arc<Engine>,
}

/// Logs every request with its outcome.
async fn trace_request(request: Request, next: Next) -> Response {
    let method = request.method().clone();
    let path = request.uri().path().to_string();
    let started = Instant::now();

    let response = next.run(request).await;

    let status = response.status();
    let elapsed_ms = started.elapsed().as_millis();
    if status.is_server_error() {
        tracing::error!(%method, %path, %status, elapsed_ms, "request failed");
    } else if status.is_client_error() {
        tracing::warn!(%method, %path, %status, elapsed_ms, "request rejected");
    } else {
        tracing::debug!(%method, %path, %status, elapsed_ms, "request served");
    }
    response
}

pub fn router(state: ServerState) -> Router {
    Router::new()
        .route("/users", post(users::create).get(users::list))
        .route("/users/{user_id}", get(users::get))
        .route("/expenses", post(expenses::create).get(expenses::list))
        .route("/expenses/user/{user_id}", get(expenses::list_for_user))
        .route("/expenses/{expense_id}", get(expenses::get))
        .route("/balances", get(balances::get))
        .layer(middleware::from_fn(trace_request))
        .with_state(state)
}

pub async fn run_with_listener(
    engine: Engine,
    listener: tokio::net::TcpListener,
) -> Result<(), std::io::Error> {
    let addr = listener.local_addr()?;
    tracing::info!("Server listening on {}", addr);

    let state = ServerState {
        engine: Arc::new(engine),
    };

    axum::serve(listener, router(state)).await
}
