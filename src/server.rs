//! Web server for the map page.
//!
//! Serves the same page the `render` command writes, except that the page
//! loads its earthquake layer from `/earthquakes.geojson`. Every data request
//! performs one fresh feed fetch; nothing is cached between requests.

use axum::{
    Json, Router,
    extract::State,
    http::StatusCode,
    response::{Html, IntoResponse, Response},
    routing::get,
};

use crate::client::{Feed, USGS_BASE_URL, UsgsClient};
use crate::errors::QuakemapError;
use crate::legend::{LegendEntry, depth_legend};
use crate::map::{LayerSource, MapContext, MapOptions};
use crate::style::{StyledCollection, style_collection};

/// Path the page fetches its earthquake layer from.
const DATA_PATH: &str = "/earthquakes.geojson";

/// Server configuration.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub port: u16,
    pub host: String,
    pub feed: Feed,
    pub map: MapOptions,
    /// Host serving the summary feeds
    pub upstream: String,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            port: 8080,
            host: "127.0.0.1".to_string(),
            feed: Feed::default(),
            map: MapOptions::default(),
            upstream: USGS_BASE_URL.to_string(),
        }
    }
}

/// Shared application state.
#[derive(Clone)]
pub struct AppState {
    config: ServerConfig,
    /// Rendered once at startup; the page itself never changes
    page: String,
}

impl AppState {
    /// Build the state, rendering the page up front.
    ///
    /// # Errors
    ///
    /// Returns an error if the page cannot be rendered.
    pub fn new(config: ServerConfig) -> Result<Self, QuakemapError> {
        let page = MapContext::new(config.map, LayerSource::Url(DATA_PATH.to_string()))
            .with_title(format!("Earthquakes ({})", config.feed))
            .render_page()?;
        Ok(Self { config, page })
    }
}

/// Create the Axum router with all routes.
pub fn create_router(state: AppState) -> Router {
    Router::new()
        .route("/", get(index_handler))
        .route(DATA_PATH, get(earthquakes_handler))
        .route("/legend", get(legend_handler))
        .route("/health", get(health_handler))
        .with_state(state)
}

/// Start the web server.
pub async fn run_server(config: ServerConfig) -> anyhow::Result<()> {
    let addr = format!("{}:{}", config.host, config.port);
    let app = create_router(AppState::new(config)?);

    tracing::info!("quakemap serving at http://{}", addr);

    let listener = tokio::net::TcpListener::bind(&addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}

/// Fetch and style the configured feed on the blocking pool.
///
/// The blocking client is created and dropped inside the blocking task.
async fn fetch_styled(config: &ServerConfig) -> Result<StyledCollection, QuakemapError> {
    let upstream = config.upstream.clone();
    let feed = config.feed;
    let joined = tokio::task::spawn_blocking(move || {
        let client = UsgsClient::with_base_url(upstream)?;
        let collection = client.fetch_feed(feed)?;
        Ok::<_, QuakemapError>(style_collection(&collection))
    })
    .await;

    match joined {
        Ok(result) => result,
        Err(e) => Err(QuakemapError::Io(std::io::Error::other(e))),
    }
}

// ============================================================================
// Route Handlers
// ============================================================================

/// Main page handler - serves the map.
async fn index_handler(State(state): State<AppState>) -> Html<String> {
    Html(state.page)
}

/// Styled earthquake layer.
async fn earthquakes_handler(State(state): State<AppState>) -> Response {
    match fetch_styled(&state.config).await {
        Ok(collection) => {
            tracing::debug!("serving {} styled events", collection.features.len());
            Json(collection).into_response()
        }
        Err(e) => {
            tracing::warn!("feed fetch failed: {}", e);
            (StatusCode::BAD_GATEWAY, format!("earthquake feed unavailable: {e}")).into_response()
        }
    }
}

/// Legend entries as JSON.
async fn legend_handler() -> Json<Vec<LegendEntry>> {
    Json(depth_legend())
}

/// Health check endpoint.
async fn health_handler() -> &'static str {
    "OK"
}

#[cfg(test)]
mod tests {
    use httpmock::prelude::*;

    use super::*;

    fn config_for(upstream: String) -> ServerConfig {
        ServerConfig {
            upstream,
            ..ServerConfig::default()
        }
    }

    #[test]
    fn test_page_fetches_data_path() {
        let state = AppState::new(ServerConfig::default()).unwrap();

        assert!(state.page.contains(r#"fetch("/earthquakes.geojson")"#));
        assert!(state.page.contains("<title>Earthquakes (all_week)</title>"));
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn test_fetch_styled_from_upstream() {
        let server = MockServer::start_async().await;
        server
            .mock_async(|when, then| {
                when.method(GET)
                    .path("/earthquakes/feed/v1.0/summary/all_week.geojson");
                then.status(200).body(crate::models::tests::SAMPLE_FEED);
            })
            .await;

        let collection = fetch_styled(&config_for(server.base_url())).await.unwrap();

        assert_eq!(collection.features.len(), 2);
        assert_eq!(
            collection.features[0].properties.style.fill_color.as_str(),
            "#00ff00"
        );
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn test_upstream_failure_is_bad_gateway() {
        let server = MockServer::start_async().await;
        server
            .mock_async(|when, then| {
                when.method(GET);
                then.status(500);
            })
            .await;

        let state = AppState::new(config_for(server.base_url())).unwrap();
        let response = earthquakes_handler(State(state)).await;

        assert_eq!(response.status(), StatusCode::BAD_GATEWAY);
    }

    #[tokio::test]
    async fn test_health_and_legend() {
        assert_eq!(health_handler().await, "OK");
        assert_eq!(legend_handler().await.0.len(), 7);
    }
}
