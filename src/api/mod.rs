use crate::{
    api::handlers::{health, login, register},
    credentials::CredentialService,
};
use anyhow::{anyhow, Context, Result};
use axum::{
    body::Body,
    extract::MatchedPath,
    http::{header::CONTENT_TYPE, HeaderName, HeaderValue, Method, Request},
    routing::{get, post},
    Extension, Router,
};
use std::sync::Arc;
use tokio::net::TcpListener;
use tower::ServiceBuilder;
use tower_http::{
    cors::{AllowOrigin, Any, CorsLayer},
    request_id::PropagateRequestIdLayer,
    set_header::SetRequestHeaderLayer,
    trace::TraceLayer,
};
use tracing::{error, info, info_span, Span};
use ulid::Ulid;
use url::Url;
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

pub mod handlers;
mod openapi;

pub use openapi::ApiDoc;

/// Build the application router with all routes and middleware attached.
///
/// # Errors
/// Returns an error if `cors_origin` is present but not a valid origin URL.
pub fn router(service: Arc<CredentialService>, cors_origin: Option<&str>) -> Result<Router> {
    let cors = cors_layer(cors_origin)?;

    let router = Router::new()
        .route("/health", get(health))
        .route("/user/register", post(register))
        .route("/user/login", post(login))
        .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", ApiDoc::openapi()))
        .layer(
            ServiceBuilder::new()
                .layer(SetRequestHeaderLayer::if_not_present(
                    HeaderName::from_static("x-request-id"),
                    |_req: &_| HeaderValue::from_str(Ulid::new().to_string().as_str()).ok(),
                ))
                .layer(PropagateRequestIdLayer::new(HeaderName::from_static(
                    "x-request-id",
                )))
                .layer(TraceLayer::new_for_http().make_span_with(make_span))
                .layer(cors)
                .layer(Extension(service)),
        );

    Ok(router)
}

/// Start the server
///
/// # Errors
/// Returns an error if the router cannot be built or the listener fails.
pub async fn new(
    port: u16,
    service: Arc<CredentialService>,
    cors_origin: Option<&str>,
) -> Result<()> {
    let app = router(service, cors_origin)?;

    let listener = TcpListener::bind(format!("::0:{port}")).await?;

    info!("Listening on [::]:{}", port);

    axum::serve(listener, app.into_make_service())
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    Ok(())
}

async fn shutdown_signal() {
    match tokio::signal::ctrl_c().await {
        Ok(()) => info!("Gracefully shutdown"),
        Err(err) => {
            // Keep serving if the signal listener cannot be installed.
            error!("Failed to listen for shutdown signal: {err}");
            std::future::pending::<()>().await;
        }
    }
}

fn make_span(request: &Request<Body>) -> Span {
    let request_id = request
        .headers()
        .get("x-request-id")
        .and_then(|val| val.to_str().ok())
        .unwrap_or("none");
    let matched_path = request
        .extensions()
        .get::<MatchedPath>()
        .map_or_else(|| request.uri().path(), MatchedPath::as_str);

    info_span!(
        "http.request",
        http.method = %request.method(),
        http.route = matched_path,
        request_id
    )
}

/// Browser callers are expected, so CORS is always on: an explicit origin
/// restricts it, otherwise any origin is allowed.
fn cors_layer(origin: Option<&str>) -> Result<CorsLayer> {
    let cors = CorsLayer::new()
        .allow_headers([CONTENT_TYPE])
        .allow_methods([Method::GET, Method::POST]);

    match origin {
        Some(origin) => Ok(cors.allow_origin(AllowOrigin::exact(exact_origin(origin)?))),
        None => Ok(cors.allow_origin(Any)),
    }
}

fn exact_origin(base_url: &str) -> Result<HeaderValue> {
    let parsed =
        Url::parse(base_url).with_context(|| format!("Invalid CORS origin: {base_url}"))?;
    let host = parsed
        .host_str()
        .ok_or_else(|| anyhow!("CORS origin must include a valid host: {base_url}"))?;
    let port = parsed
        .port()
        .map_or_else(String::new, |port| format!(":{port}"));
    let origin = format!("{}://{}{}", parsed.scheme(), host, port);
    HeaderValue::from_str(&origin).context("Failed to build CORS origin header")
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn exact_origin_strips_path_and_keeps_port() {
        let origin = exact_origin("https://app.akredo.dev:8443/login").unwrap();
        assert_eq!(origin, "https://app.akredo.dev:8443");
    }

    #[test]
    fn exact_origin_without_port() {
        let origin = exact_origin("https://app.akredo.dev").unwrap();
        assert_eq!(origin, "https://app.akredo.dev");
    }

    #[test]
    fn exact_origin_rejects_garbage() {
        assert!(exact_origin("not a url").is_err());
    }
}
