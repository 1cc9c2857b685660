//! Minimal web front end: the current-conditions page plus a small JSON
//! API over the same state the daemon publishes.
//!
//! | Route                | Method | Returns                              |
//! |----------------------|--------|--------------------------------------|
//! | `/`                  | GET    | plain HTML current-conditions page   |
//! | `/api/conditions`    | GET    | formatted display fields as JSON     |
//! | `/api/devices`       | GET    | every device's mode and level        |
//! | `/api/devices/:name` | POST   | command a device mode, 204 on accept |
//!
//! Handlers only read shared state or forward one command to a
//! controller; nothing here blocks on sensors or the network.

use std::io;
use std::sync::Arc;

use axum::{
    Router,
    extract::{Path, State},
    http::StatusCode,
    response::{Html, IntoResponse, Json, Response},
    routing::{get, post},
};
use serde::Deserialize;
use serde_json::json;
use tower_http::cors::CorsLayer;
use tracing::{error, info};

use crate::app::display::DisplayState;
use crate::devices::{OutputController, OutputMode};
use crate::error::CommandError;

/// Everything the handlers can reach, cloned per request.
#[derive(Clone)]
pub struct WebContext {
    pub display: DisplayState,
    pub leds: Arc<OutputController>,
    pub relays: Arc<OutputController>,
}

pub fn router(ctx: WebContext) -> Router {
    Router::new()
        .route("/", get(index))
        .route("/api/conditions", get(conditions))
        .route("/api/devices", get(devices))
        .route("/api/devices/:name", post(set_device))
        .layer(CorsLayer::permissive())
        .with_state(ctx)
}

/// Serve until a shutdown signal arrives.
pub async fn serve(listener: tokio::net::TcpListener, ctx: WebContext) -> io::Result<()> {
    axum::serve(listener, router(ctx))
        .with_graceful_shutdown(shutdown_signal())
        .await
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(err) = tokio::signal::ctrl_c().await {
            error!(%err, "cannot listen for ctrl-c");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(err) => {
                error!(%err, "cannot listen for SIGTERM");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {}
        () = terminate => {}
    }
    info!("shutdown signal received");
}

async fn index(State(ctx): State<WebContext>) -> Html<String> {
    let fields = ctx.display.snapshot();
    Html(format!(
        "<!doctype html>\n\
         <html>\n\
         <head><title>Weather Station</title></head>\n\
         <body>\n\
         <pre>\n\
         \x20   Temperature: {}\tHumidity: {}\n\
         \x20       Pressure: {}\tUV Index: {}\n\
         </pre>\n\
         </body>\n\
         </html>\n",
        fields.temperature, fields.humidity, fields.pressure, fields.uv,
    ))
}

async fn conditions(State(ctx): State<WebContext>) -> Response {
    Json(ctx.display.snapshot()).into_response()
}

async fn devices(State(ctx): State<WebContext>) -> Response {
    Json(json!({
        "led": ctx.leds.statuses(),
        "relay": ctx.relays.statuses(),
    }))
    .into_response()
}

#[derive(Debug, Deserialize)]
struct SetModeBody {
    mode: OutputMode,
}

/// Device names are unique across both banks, so an unknown name on the
/// LED bank falls through to the relay bank.
async fn set_device(
    State(ctx): State<WebContext>,
    Path(name): Path<String>,
    Json(body): Json<SetModeBody>,
) -> Response {
    let outcome = match ctx.leds.set(&name, body.mode) {
        Err(CommandError::UnknownDevice(_)) => ctx.relays.set(&name, body.mode),
        other => other,
    };
    match outcome {
        Ok(()) => StatusCode::NO_CONTENT.into_response(),
        Err(err @ CommandError::UnknownDevice(_)) => {
            (StatusCode::NOT_FOUND, Json(json!({ "error": err.to_string() }))).into_response()
        }
        Err(err @ CommandError::UnsupportedMode { .. }) => {
            (
                StatusCode::BAD_REQUEST,
                Json(json!({ "error": err.to_string() })),
            )
                .into_response()
        }
    }
}
