//! USGS earthquake feed client.
//!
//! Provides blocking HTTP access to the GeoJSON summary feeds.
//! Uses reqwest with rustls for TLS.

use std::fmt;
use std::time::Duration;

use reqwest::blocking::Client;
use tracing::{debug, instrument, warn};

use crate::errors::QuakemapError;
use crate::models::FeatureCollection;

/// Default request timeout in seconds.
const REQUEST_TIMEOUT_SECS: u64 = 10;

/// User agent string for API requests.
const USER_AGENT: &str = concat!("quakemap/", env!("CARGO_PKG_VERSION"));

/// USGS base URL for earthquake feeds.
pub const USGS_BASE_URL: &str = "https://earthquake.usgs.gov";

/// Minimum magnitude a summary feed includes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FeedLevel {
    All,
    Mag1,
    Mag25,
    Mag45,
    Significant,
}

impl FeedLevel {
    const fn as_str(self) -> &'static str {
        match self {
            Self::All => "all",
            Self::Mag1 => "1.0",
            Self::Mag25 => "2.5",
            Self::Mag45 => "4.5",
            Self::Significant => "significant",
        }
    }
}

/// Time window a summary feed covers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FeedWindow {
    Hour,
    Day,
    Week,
    Month,
}

impl FeedWindow {
    const fn as_str(self) -> &'static str {
        match self {
            Self::Hour => "hour",
            Self::Day => "day",
            Self::Week => "week",
            Self::Month => "month",
        }
    }
}

/// A summary feed, named like `all_week` or `2.5_day`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Feed {
    pub level: FeedLevel,
    pub window: FeedWindow,
}

impl Default for Feed {
    fn default() -> Self {
        Self {
            level: FeedLevel::All,
            window: FeedWindow::Week,
        }
    }
}

impl Feed {
    /// URL path of this feed below the base URL.
    #[must_use]
    pub fn path(self) -> String {
        format!("/earthquakes/feed/v1.0/summary/{self}.geojson")
    }
}

impl fmt::Display for Feed {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}_{}", self.level.as_str(), self.window.as_str())
    }
}

impl std::str::FromStr for Feed {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let lower = s.to_lowercase();
        let (level, window) = lower
            .rsplit_once('_')
            .ok_or_else(|| format!("unknown feed: {s} (expected e.g. all_week, 2.5_day)"))?;

        let level = match level {
            "all" => FeedLevel::All,
            "1.0" => FeedLevel::Mag1,
            "2.5" => FeedLevel::Mag25,
            "4.5" => FeedLevel::Mag45,
            "significant" => FeedLevel::Significant,
            _ => return Err(format!("unknown feed level: {level}")),
        };
        let window = match window {
            "hour" => FeedWindow::Hour,
            "day" => FeedWindow::Day,
            "week" => FeedWindow::Week,
            "month" => FeedWindow::Month,
            _ => return Err(format!("unknown feed window: {window}")),
        };

        Ok(Self { level, window })
    }
}

/// Client for the USGS summary feeds.
#[derive(Debug, Clone)]
pub struct UsgsClient {
    client: Client,
    base_url: String,
}

impl UsgsClient {
    /// Create a client against the public USGS host.
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client cannot be initialized.
    pub fn new() -> Result<Self, QuakemapError> {
        Self::with_base_url(USGS_BASE_URL)
    }

    /// Create a client against another host serving the same paths.
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client cannot be initialized.
    pub fn with_base_url(base_url: impl Into<String>) -> Result<Self, QuakemapError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(REQUEST_TIMEOUT_SECS))
            .user_agent(USER_AGENT)
            .build()?;

        Ok(Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
        })
    }

    /// Fetch a summary feed, keeping only features that can be mapped.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails, the status is not a success,
    /// or the body is not a GeoJSON feature collection.
    #[instrument(skip(self), fields(feed = %feed))]
    pub fn fetch_feed(&self, feed: Feed) -> Result<FeatureCollection, QuakemapError> {
        let url = format!("{}{}", self.base_url, feed.path());

        debug!("fetching feed from {}", url);

        let response = self.client.get(&url).send()?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().unwrap_or_default();
            return Err(QuakemapError::Api {
                status: status.as_u16(),
                message: body,
            });
        }

        let body = response.text()?;
        let mut collection: FeatureCollection = serde_json::from_str(&body)?;
        collection.validate()?;

        let dropped = collection.retain_valid();
        if dropped > 0 {
            warn!("dropped {} features that cannot be placed on the map", dropped);
        }

        debug!("fetched {} events", collection.features.len());
        Ok(collection)
    }
}
