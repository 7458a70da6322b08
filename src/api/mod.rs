//! HTTP surface: router assembly, middleware stack, and the server loop.

use anyhow::{anyhow, Context, Result};
use axum::{
    body::Body,
    extract::{Extension, MatchedPath, Request},
    http::{HeaderName, HeaderValue, Method, header::{AUTHORIZATION, CONTENT_TYPE}},
    middleware,
    routing::{get, post},
    Router,
};
use std::sync::Arc;
use tokio::net::TcpListener;
use tower::ServiceBuilder;
use tower_http::{
    cors::{AllowOrigin, CorsLayer},
    request_id::{MakeRequestId, PropagateRequestIdLayer, RequestId, SetRequestIdLayer},
    trace::TraceLayer,
};
use tracing::{info, info_span, Span};
use ulid::Ulid;
use url::Url;
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use crate::auth::{session, state::AuthState};

pub(crate) mod handlers;
mod openapi;

pub use openapi::ApiDoc;

/// One ULID per request unless the caller already set one.
#[derive(Clone, Copy, Debug)]
struct MakeRequestUlid;

impl MakeRequestId for MakeRequestUlid {
    fn make_request_id<B>(&mut self, _request: &axum::http::Request<B>) -> Option<RequestId> {
        let value = HeaderValue::from_str(&Ulid::new().to_string()).ok()?;
        Some(RequestId::new(value))
    }
}

fn make_span(request: &Request<Body>) -> Span {
    // Prefer the matched route over the raw path so spans aggregate cleanly.
    let route = request.extensions().get::<MatchedPath>().map_or_else(
        || request.uri().path().to_owned(),
        |path| path.as_str().to_owned(),
    );
    info_span!("http.request", http.method = %request.method(), http.route = %route)
}

fn allowed_origin(public_base_url: &str) -> Result<HeaderValue> {
    let url = Url::parse(public_base_url).context("invalid public base URL")?;
    let host = url
        .host_str()
        .ok_or_else(|| anyhow!("public base URL has no host"))?;
    let origin = match url.port() {
        Some(port) => format!("{}://{host}:{port}", url.scheme()),
        None => format!("{}://{host}", url.scheme()),
    };
    HeaderValue::from_str(&origin).context("public base URL is not a valid origin")
}

/// Build the application router with the full middleware stack.
///
/// # Errors
///
/// Returns an error if the configured public base URL cannot be turned into
/// a CORS origin.
pub fn app(state: Arc<AuthState>) -> Result<Router> {
    let cors = CorsLayer::new()
        .allow_headers([CONTENT_TYPE, AUTHORIZATION])
        .allow_methods([Method::GET, Method::POST])
        .allow_origin(AllowOrigin::exact(allowed_origin(
            state.config().public_base_url(),
        )?))
        .allow_credentials(true);

    let router = Router::new()
        .route("/", get(handlers::root))
        .route("/health", get(handlers::health::health))
        .route("/v1/account/register", post(handlers::account::register))
        .route("/v1/account/login", post(handlers::account::login))
        .route("/v1/account/logout", post(handlers::account::logout))
        .route("/v1/account/session", get(handlers::account::session))
        .route(
            "/v1/account/management",
            get(handlers::account::management),
        )
        .route("/v1/account/update", post(handlers::account::update_profile))
        .route(
            "/v1/account/password",
            post(handlers::account::change_password),
        )
        .route("/v1/staff", get(handlers::staff::staff))
        .merge(SwaggerUi::new("/docs").url("/api-docs/openapi.json", ApiDoc::openapi()))
        .layer(
            ServiceBuilder::new()
                .layer(SetRequestIdLayer::new(
                    HeaderName::from_static("x-request-id"),
                    MakeRequestUlid,
                ))
                .layer(PropagateRequestIdLayer::new(HeaderName::from_static(
                    "x-request-id",
                )))
                .layer(TraceLayer::new_for_http().make_span_with(make_span))
                .layer(cors)
                // Actor resolution runs on every request, before dispatch.
                .layer(middleware::from_fn_with_state(
                    state.clone(),
                    session::resolve_actor,
                ))
                .layer(Extension(state)),
        );

    Ok(router)
}

/// Start the server.
///
/// # Errors
///
/// Returns an error if the router cannot be built or the listener fails.
pub async fn serve(port: u16, state: Arc<AuthState>) -> Result<()> {
    let router = app(state)?;
    let listener = TcpListener::bind(format!("::0:{port}")).await?;
    info!("listening on port {port}");
    axum::serve(listener, router.into_make_service()).await?;
    Ok(())
}
