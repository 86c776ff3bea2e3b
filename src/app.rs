use std::net::SocketAddr;

use axum::{
    extract::Request,
    http::{header, Method, StatusCode},
    middleware::{self, Next},
    response::Response,
    routing::get,
    Json, Router,
};
use serde::Serialize;
use tower_http::{cors::CorsLayer, trace::TraceLayer};

use crate::auth::{
    handlers::{auth_routes, me_routes},
    middleware::{require_admin, require_auth},
};
use crate::config::AppConfig;
use crate::state::AppState;
use crate::{admin, portfolio, preferences, stocks};

#[derive(Debug, Serialize)]
pub struct OkResponse {
    pub ok: bool,
}

async fn health() -> Json<OkResponse> {
    Json(OkResponse { ok: true })
}

/// Rewrites the empty 200 that `CorsLayer` gives preflights to 204 No Content.
async fn preflight_no_content(req: Request, next: Next) -> Response {
    let preflight = req.method() == Method::OPTIONS
        && req.headers().contains_key(header::ACCESS_CONTROL_REQUEST_METHOD);
    let mut res = next.run(req).await;
    if preflight && res.status() == StatusCode::OK {
        *res.status_mut() = StatusCode::NO_CONTENT;
    }
    res
}

/// Public routes, user routes behind `require_auth`, admin routes behind
/// `require_auth` then `require_admin`. CORS answers preflights before any of them.
pub fn build_app(state: AppState) -> Router {
    let public = Router::new()
        .route("/healthz", get(health))
        .merge(auth_routes());

    let user = Router::new()
        .merge(me_routes())
        .merge(stocks::router())
        .merge(portfolio::router())
        .merge(preferences::router())
        .route_layer(middleware::from_fn_with_state(state.clone(), require_auth));

    let admin = admin::router()
        .route_layer(middleware::from_fn(require_admin))
        .route_layer(middleware::from_fn_with_state(state.clone(), require_auth));

    Router::new()
        .merge(public)
        .merge(user)
        .merge(admin)
        .with_state(state)
        .layer(CorsLayer::permissive())
        .layer(middleware::from_fn(preflight_no_content))
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(|req: &axum::http::Request<_>| {
                    let method = req.method().clone();
                    let uri = req.uri().clone();
                    tracing::info_span!("http_request", %method, uri = %uri, status = tracing::field::Empty)
                })
                .on_response(
                    |res: &axum::http::Response<_>,
                     _latency: std::time::Duration,
                     span: &tracing::Span| {
                        let status = res.status();
                        span.record("status", tracing::field::display(status));
                        if status.is_server_error() {
                            tracing::error!(%status, "response");
                        } else {
                            tracing::info!(%status, "response");
                        }
                    },
                ),
        )
}

pub async fn serve(app: Router, config: &AppConfig) -> anyhow::Result<()> {
    let addr: SocketAddr = format!("{}:{}", config.host, config.port).parse()?;

    tracing::info!("listening on {}", addr);
    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;
    Ok(())
}
