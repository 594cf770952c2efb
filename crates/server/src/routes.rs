//! Route configuration.

use crate::handlers;
use crate::metrics::metrics_handler;
use crate::state::AppState;
use crate::trace::{TRACE_ID_HEADER, trace_id_middleware};
use axum::Router;
use axum::extract::{DefaultBodyLimit, Request};
use axum::http::header::{
    ACCESS_CONTROL_ALLOW_HEADERS, ACCESS_CONTROL_ALLOW_METHODS, ACCESS_CONTROL_ALLOW_ORIGIN,
    ACCESS_CONTROL_EXPOSE_HEADERS, ACCESS_CONTROL_REQUEST_METHOD, CONTENT_DISPOSITION,
};
use axum::http::{HeaderName, HeaderValue, Method, StatusCode};
use axum::middleware::{self, Next};
use axum::response::{IntoResponse, Response};
use axum::routing::{MethodRouter, get, head};
use parcel_core::DOWNLOAD_CONTENT_TYPE;
use std::convert::Infallible;
use tower_http::compression::predicate::{DefaultPredicate, NotForContentType, Predicate};
use tower_http::compression::CompressionLayer;
use tower_http::cors::{Any, CorsLayer};
use tower_http::set_header::SetResponseHeaderLayer;
use tower_http::trace::TraceLayer;

/// Create the application router.
pub fn create_router(state: AppState) -> Router {
    let mut router = Router::new()
        .route("/keys", get(handlers::get_keys))
        .route(
            "/upload/{id}",
            head(handlers::probe_upload).post(handlers::upload_files),
        )
        .route("/d/{id}/{file_name}", get(handlers::download_file))
        .route("/health", get(handlers::health));

    if state.config.server.metrics_enabled {
        router = router.route("/metrics", get(metrics_handler));
    }

    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any)
        .expose_headers([CONTENT_DISPOSITION, HeaderName::from_static(TRACE_ID_HEADER)]);

    let body_limit = match state.config.server.upload_limit() {
        Some(limit) => DefaultBodyLimit::max(limit),
        None => DefaultBodyLimit::disable(),
    };

    // Encrypted downloads do not shrink; skip them.
    let compression = CompressionLayer::new().compress_when(
        DefaultPredicate::new().and(NotForContentType::const_new(DOWNLOAD_CONTENT_TYPE)),
    );

    // Plain OPTIONS on the listing reaches its handler, so the listing is
    // added after CorsLayer and handles preflights and CORS headers itself.
    router
        .layer(cors)
        .route("/d/{id}", listing_route(state.config.server.browse_files))
        .layer(body_limit)
        .layer(middleware::from_fn(trace_id_middleware))
        .layer(compression)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// HEAD and OPTIONS on `/d/{id}`. GET is left unrouted.
fn listing_route(browse_files: bool) -> MethodRouter<AppState> {
    let route: MethodRouter<AppState> = if browse_files {
        head(handlers::list_files).options(handlers::list_files)
    } else {
        head(handlers::list_files_disabled).options(handlers::list_files_disabled)
    };

    route
        .layer::<_, Infallible>(middleware::from_fn(answer_preflight))
        .layer::<_, Infallible>(SetResponseHeaderLayer::if_not_present(
            ACCESS_CONTROL_ALLOW_ORIGIN,
            HeaderValue::from_static("*"),
        ))
        .layer::<_, Infallible>(SetResponseHeaderLayer::if_not_present(
            ACCESS_CONTROL_EXPOSE_HEADERS,
            HeaderValue::from_static("content-disposition,x-trace-id"),
        ))
}

/// Answer a CORS preflight (OPTIONS carrying `Access-Control-Request-Method`)
/// with 204 instead of running the listing.
async fn answer_preflight(req: Request, next: Next) -> Response {
    let is_preflight = req.method() == Method::OPTIONS
        && req.headers().contains_key(ACCESS_CONTROL_REQUEST_METHOD);
    if !is_preflight {
        return next.run(req).await;
    }

    (
        StatusCode::NO_CONTENT,
        [
            (ACCESS_CONTROL_ALLOW_METHODS, "HEAD, OPTIONS"),
            (ACCESS_CONTROL_ALLOW_HEADERS, "*"),
        ],
    )
        .into_response()
}
