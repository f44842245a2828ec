//! HTTP surface for scrapeapi.
//!
//! Every configured endpoint becomes a `GET` route. A request resolves the
//! endpoint's source template from its query string, fetches the document,
//! runs the extraction engine once, and answers with the resulting record as
//! JSON. Failures become per-request error responses; the process keeps
//! serving.

mod error;
mod validate;

use std::collections::HashMap;
use std::net::SocketAddr;
use std::sync::Arc;

use axum::extract::rejection::QueryRejection;
use axum::extract::{Query, State};
use axum::routing::get;
use axum::{Json, Router};
use tower_http::trace::TraceLayer;
use tracing::{Instrument, info, info_span};
use uuid::Uuid;

use scrapeapi_extract::evaluate_document;
use scrapeapi_fetch::{Fetcher, resolve_source};
use scrapeapi_shared::{AppConfig, Endpoint, Record, ScrapeApiError};

pub use error::ApiError;
pub use validate::{ConfigWarning, HEALTH_PATH, validate_config};

/// Shared, read-only state handed to every handler.
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<AppConfig>,
    pub fetcher: Arc<Fetcher>,
}

/// Build the router: one route per endpoint plus the health check.
///
/// The config must have passed [`validate_config`]; duplicate or malformed
/// paths make axum panic while registering routes.
pub fn router(config: Arc<AppConfig>, fetcher: Arc<Fetcher>) -> Router {
    let state = AppState {
        config: config.clone(),
        fetcher,
    };

    let mut router = Router::new().route(HEALTH_PATH, get(health));

    for endpoint in &config.endpoints {
        let endpoint = Arc::new(endpoint.clone());
        let path = endpoint.path.clone();
        router = router.route(
            &path,
            get(
                move |State(state): State<AppState>, query: QueryParams| {
                    serve_endpoint(state, endpoint.clone(), query)
                },
            ),
        );
    }

    router.layer(TraceLayer::new_for_http()).with_state(state)
}

/// Bind `addr` and serve until Ctrl-C.
pub async fn serve(
    config: Arc<AppConfig>,
    fetcher: Arc<Fetcher>,
    addr: SocketAddr,
) -> std::io::Result<()> {
    let endpoints = config.endpoints.len();
    let app = router(config, fetcher);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    info!(addr = %listener.local_addr()?, endpoints, "listening");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %e, "failed to install Ctrl-C handler");
        std::future::pending::<()>().await;
    }
    info!("shutting down");
}

// ---------------------------------------------------------------------------
// Handlers
// ---------------------------------------------------------------------------

async fn health(State(state): State<AppState>) -> Json<serde_json::Value> {
    Json(serde_json::json!({
        "status": "ok",
        "endpoints": state.config.endpoints.len(),
    }))
}

type QueryParams = Result<Query<HashMap<String, String>>, QueryRejection>;

async fn serve_endpoint(
    state: AppState,
    endpoint: Arc<Endpoint>,
    query: QueryParams,
) -> Result<Json<Record>, ApiError> {
    let span = info_span!(
        "endpoint",
        request_id = %Uuid::now_v7(),
        path = %endpoint.path,
    );

    async move {
        let Query(query) =
            query.map_err(|rejection| ScrapeApiError::InvalidQuery(rejection.body_text()))?;
        let source = resolve_source(&endpoint.source, &endpoint.variables, &query);
        let body = state.fetcher.fetch(&source).await?;

        // Parsed DOM is not Send; keep it inside this synchronous call.
        let record = evaluate_document(&body, &source, &endpoint.fields, state.config.extraction)?;

        info!(source = %source, fields = endpoint.fields.len(), "extracted");
        Ok(Json(record))
    }
    .instrument(span)
    .await
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::{Body, to_bytes};
    use axum::http::{Request, StatusCode};
    use scrapeapi_shared::{ExtractionType, Field, FetchConfig, load_config_from};
    use serde_json::json;
    use std::path::Path;
    use tower::ServiceExt;

    fn load_fixture(name: &str) -> String {
        let path = format!("../../../fixtures/html/{name}");
        std::fs::read_to_string(&path).unwrap_or_else(|_| panic!("missing fixture: {path}"))
    }

    fn fixture_app() -> Router {
        let config = load_config_from(Path::new("../../../fixtures/config/scrapeapi.toml"))
            .expect("load config fixture");
        validate_config(&config).expect("fixture config is valid");
        let fetcher = Fetcher::new(&config.fetch).expect("build fetcher");
        router(Arc::new(config), Arc::new(fetcher))
    }

    async fn get_json(app: Router, uri: &str) -> (StatusCode, serde_json::Value) {
        let response = app
            .oneshot(Request::builder().uri(uri).body(Body::empty()).unwrap())
            .await
            .unwrap();
        let status = response.status();
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let value = serde_json::from_slice(&bytes).expect("json body");
        (status, value)
    }

    /// Percent-encode a mock server URI for use as a query value.
    fn encode(value: &str) -> String {
        value.replace(':', "%3A").replace('/', "%2F")
    }

    #[tokio::test]
    async fn health_reports_endpoint_count() {
        let (status, body) = get_json(fixture_app(), "/health").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, json!({ "status": "ok", "endpoints": 2 }));
    }

    #[tokio::test]
    async fn endpoint_extracts_from_mock_source() {
        let server = wiremock::MockServer::start().await;

        wiremock::Mock::given(wiremock::matchers::method("GET"))
            .and(wiremock::matchers::path("/catalog"))
            .and(wiremock::matchers::query_param("page", "2"))
            .respond_with(
                wiremock::ResponseTemplate::new(200).set_body_string(load_fixture("catalog.html")),
            )
            .expect(1)
            .mount(&server)
            .await;

        let uri = format!("/products?base={}&page=2", encode(&server.uri()));
        let (status, body) = get_json(fixture_app(), &uri).await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["source"], json!(format!("{}/catalog?page=2", server.uri())));
        assert_eq!(body["title"], json!("Spring Catalog"));
        assert_eq!(body["total"], json!(3));
        assert_eq!(body["categories"], json!(["Tools", "Garden"]));
        assert_eq!(body["products"][0]["reviews"][0], json!({ "author": "Ana", "stars": 3 }));
        assert_eq!(body["products"][2]["price"], json!(""));
    }

    #[tokio::test]
    async fn response_keys_follow_declaration_order() {
        let server = wiremock::MockServer::start().await;
        wiremock::Mock::given(wiremock::matchers::path("/"))
            .respond_with(
                wiremock::ResponseTemplate::new(200)
                    .set_body_string("<ul><li>Foo</li><li>Bar</li></ul>"),
            )
            .mount(&server)
            .await;

        let config = AppConfig {
            endpoints: vec![Endpoint {
                path: "/items".into(),
                source: format!("{}/", server.uri()),
                variables: vec![],
                fields: vec![
                    Field::new("b", "li", ExtractionType::Count),
                    Field::new("a", "li", ExtractionType::List),
                ],
            }],
            ..AppConfig::default()
        };
        let fetcher = Fetcher::new(&FetchConfig::default()).unwrap();
        let app = router(Arc::new(config), Arc::new(fetcher));

        let response = app
            .oneshot(Request::builder().uri("/items").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);

        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let text = String::from_utf8(bytes.to_vec()).unwrap();
        assert_eq!(
            text,
            format!(r#"{{"source":"{}/","b":2,"a":["Foo","Bar"]}}"#, server.uri())
        );
    }

    #[tokio::test]
    async fn upstream_failure_is_bad_gateway_and_server_keeps_serving() {
        let server = wiremock::MockServer::start().await;

        wiremock::Mock::given(wiremock::matchers::path("/news"))
            .respond_with(wiremock::ResponseTemplate::new(500))
            .mount(&server)
            .await;

        let app = fixture_app();
        let uri = format!("/headlines?base={}", encode(&server.uri()));

        let (status, body) = get_json(app.clone(), &uri).await;
        assert_eq!(status, StatusCode::BAD_GATEWAY);
        assert!(body["error"].as_str().unwrap().contains("HTTP 500"));

        let (status, _) = get_json(app, "/health").await;
        assert_eq!(status, StatusCode::OK);
    }

    #[tokio::test]
    async fn missing_variable_yields_bad_request() {
        // `%base%` resolves to "" and leaves a relative URL behind.
        let (status, body) = get_json(fixture_app(), "/headlines").await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert!(body["error"].as_str().unwrap().contains("invalid source URL"));
    }

    #[tokio::test]
    async fn malformed_query_yields_json_error() {
        let (status, body) = get_json(fixture_app(), "/headlines?base=%ZZ&=&%FF").await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert!(body["error"].is_string());
    }

    #[tokio::test]
    async fn unknown_route_is_not_found() {
        let response = fixture_app()
            .oneshot(Request::builder().uri("/nope").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }
}
