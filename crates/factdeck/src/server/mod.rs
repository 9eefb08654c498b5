//! HTTP side of factdeck: static hosting for the fact file, a health check,
//! and the bot webhook with its one-time registration endpoint.

pub mod bot;
pub mod polling;
pub mod telegram;

use anyhow::{Context, Result};
use axum::{
    Json, Router,
    body::Body,
    extract::{Query, State},
    http::{HeaderMap, StatusCode, header},
    response::{IntoResponse, Response},
    routing::get,
};
use serde::Deserialize;
use serde_json::json;
use std::{net::SocketAddr, path::Path, sync::Arc};
use tokio::{net::TcpListener, sync::watch};
use tower_http::{services::ServeDir, trace::TraceLayer};
use tracing::{error, info, warn};

use crate::config::ServerSettings;
use bot::Bot;
use telegram::{TelegramApi, Update};

pub const WEBHOOK_PATH: &str = "/api/bot";

/// Largest update body read; anything bigger is dropped unread.
pub const MAX_UPDATE_BYTES: usize = 1024 * 1024;

/// Shared state for axum handlers
#[derive(Clone)]
pub struct ServerState {
    pub bot: Arc<Bot>,
    pub setup_secret: Option<Arc<str>>,
}

#[derive(Debug, Deserialize)]
struct SetupQuery {
    setup: Option<String>,
    secret: Option<String>,
}

pub fn router(state: ServerState, public_dir: &Path) -> Router {
    Router::new()
        .route("/health", get(health))
        .route(
            WEBHOOK_PATH,
            get(register_webhook)
                .post(receive_update)
                .fallback(method_not_allowed),
        )
        .fallback_service(ServeDir::new(public_dir))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Run the HTTP service until Ctrl-C or SIGTERM. With `poll`, also long-poll
/// the Bot API for updates.
pub async fn serve(settings: ServerSettings, poll: bool) -> Result<()> {
    let api = Arc::new(TelegramApi::new(&settings.bot_token));
    let bot = Arc::new(Bot::new(api, settings.web_app_url.clone()));
    let state = ServerState {
        bot: Arc::clone(&bot),
        setup_secret: settings.setup_secret.as_deref().map(Arc::from),
    };
    if state.setup_secret.is_none() {
        warn!("no setup secret configured, webhook registration endpoint is disabled");
    }
    if !settings.public_dir.join("index.html").is_file() {
        warn!(
            public_dir = %settings.public_dir.display(),
            "no index.html to serve, the web app button will 404; run `trunk build --release` first"
        );
    }

    let app = router(state, &settings.public_dir);
    let addr = SocketAddr::from(([0, 0, 0, 0], settings.port));
    let listener = TcpListener::bind(addr)
        .await
        .with_context(|| format!("Failed to bind {addr}"))?;
    info!(%addr, public_dir = %settings.public_dir.display(), "web server listening");
    info!(web_app_url = %settings.web_app_url, "bot web app URL");

    let (stop_tx, stop_rx) = watch::channel(false);
    let poller = poll.then(|| tokio::spawn(polling::run(Arc::clone(&bot), stop_rx)));

    axum::serve(listener, app)
        .with_graceful_shutdown(async move {
            shutdown_signal().await;
            let _ = stop_tx.send(true);
        })
        .await
        .context("HTTP server failed")?;

    if let Some(poller) = poller {
        poller.await.context("Polling task panicked")?;
    }
    info!("stopped");
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            error!("failed to listen for Ctrl-C: {e}");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        use tokio::signal::unix::{SignalKind, signal};
        match signal(SignalKind::terminate()) {
            Ok(mut sigterm) => {
                sigterm.recv().await;
            }
            Err(e) => {
                error!("failed to listen for SIGTERM: {e}");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => info!("received Ctrl-C, shutting down"),
        _ = terminate => info!("received SIGTERM, shutting down"),
    }
}

/// Hand an update to the bot on the blocking pool. Failures are logged, never returned.
pub async fn dispatch(bot: Arc<Bot>, update: Update) {
    let update_id = update.update_id;
    match tokio::task::spawn_blocking(move || bot.handle_update(&update)).await {
        Ok(Ok(())) => {}
        Ok(Err(e)) => error!(update_id, "bot error: {e:#}"),
        Err(e) => error!(update_id, "bot task failed: {e}"),
    }
}

async fn health() -> Json<serde_json::Value> {
    Json(json!({ "ok": true }))
}

/// Always 200 so the provider never retries an update. The body is read by
/// hand so an oversized one is logged and dropped instead of becoming a 413.
async fn receive_update(State(state): State<ServerState>, body: Body) -> Json<serde_json::Value> {
    let body = match axum::body::to_bytes(body, MAX_UPDATE_BYTES).await {
        Ok(body) => body,
        Err(e) => {
            warn!("ignoring unreadable update: {e}");
            return Json(json!({ "ok": true }));
        }
    };
    match serde_json::from_slice::<Update>(&body) {
        Ok(update) => dispatch(Arc::clone(&state.bot), update).await,
        Err(e) => warn!("ignoring malformed update: {e}"),
    }
    Json(json!({ "ok": true }))
}

/// `GET /api/bot?setup=1&secret=...` points the provider's webhook at this host.
async fn register_webhook(
    State(state): State<ServerState>,
    Query(query): Query<SetupQuery>,
    headers: HeaderMap,
) -> Response {
    if query.setup.as_deref().is_none_or(str::is_empty) {
        return method_not_allowed().await;
    }

    let authorized = match (&state.setup_secret, &query.secret) {
        (Some(expected), Some(given)) => expected.as_ref() == given.as_str(),
        _ => false,
    };
    if !authorized {
        warn!("rejected webhook setup with missing or wrong secret");
        return (
            StatusCode::FORBIDDEN,
            Json(json!({ "ok": false, "error": "forbidden" })),
        )
            .into_response();
    }

    let Some(host) = headers.get(header::HOST).and_then(|v| v.to_str().ok()) else {
        return (
            StatusCode::BAD_REQUEST,
            Json(json!({ "ok": false, "error": "missing host header" })),
        )
            .into_response();
    };
    let proto = headers
        .get("x-forwarded-proto")
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.split(',').next())
        .map(str::trim)
        .unwrap_or("https");
    let webhook_url = format!("{proto}://{host}{WEBHOOK_PATH}");

    let api = state.bot.api();
    let url = webhook_url.clone();
    let result = tokio::task::spawn_blocking(move || api.set_webhook(&url))
        .await
        .map_err(anyhow::Error::from)
        .and_then(|r| r);

    match result {
        Ok(reply) => {
            if reply["ok"] == true {
                info!(%webhook_url, "webhook registered");
            } else {
                warn!(%webhook_url, reply = %reply, "webhook registration rejected");
            }
            Json(json!({ "ok": true, "webhookUrl": webhook_url, "setWebhook": reply }))
                .into_response()
        }
        Err(e) => {
            error!(%webhook_url, "webhook registration failed: {e:#}");
            (
                StatusCode::BAD_GATEWAY,
                Json(json!({ "ok": false, "error": format!("{e:#}") })),
            )
                .into_response()
        }
    }
}

async fn method_not_allowed() -> Response {
    (
        StatusCode::METHOD_NOT_ALLOWED,
        Json(json!({ "ok": false, "error": "method not allowed" })),
    )
        .into_response()
}
