//! Per-feature marker styling and popup content.
//!
//! Turns feed features into GeoJSON the map page can draw directly: every
//! feature carries its precomputed circle-marker style and popup markup.

use serde::Serialize;

use crate::classify::{ColorCode, depth_color, marker_radius};
use crate::models::{Feature, FeatureCollection, Geometry};

/// Marker border color.
const BORDER_COLOR: &str = "#000000";

/// Circle-marker path options, named the way Leaflet expects them.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MarkerStyle {
    pub opacity: f64,
    pub fill_opacity: f64,
    pub fill_color: ColorCode,
    pub color: &'static str,
    pub radius: f64,
    pub weight: f64,
}

impl MarkerStyle {
    /// Style a feature: depth drives the fill, magnitude drives the size.
    ///
    /// A missing magnitude is styled as magnitude zero.
    #[must_use]
    pub fn for_feature(feature: &Feature) -> Self {
        Self {
            opacity: 1.0,
            fill_opacity: 0.8,
            fill_color: depth_color(feature.depth_km()),
            color: BORDER_COLOR,
            radius: marker_radius(feature.properties.mag.unwrap_or(0.0)),
            weight: 0.5,
        }
    }
}

/// Escape text for inclusion in HTML.
#[must_use]
pub fn escape_html(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    out
}

/// Popup markup for a feature: location, magnitude and depth.
#[must_use]
pub fn popup_html(feature: &Feature) -> String {
    let place = feature
        .properties
        .place
        .as_deref()
        .map_or_else(|| "unknown".to_string(), escape_html);
    let mag = feature
        .properties
        .mag
        .map_or_else(|| "unknown".to_string(), |m| m.to_string());
    // Adding zero turns -0.0 into 0.0 so it prints as `0`.
    let depth = feature.depth_km() + 0.0;

    format!(
        "<h3>Location: {place}</h3>\n<hr>\n<p>Magnitude: {mag}</p>\n<p>Depth: {depth} km</p>"
    )
}

/// Properties attached to a styled feature.
#[derive(Debug, Clone, Serialize)]
pub struct StyledProperties {
    pub mag: Option<f64>,
    pub place: Option<String>,
    pub depth_km: f64,
    pub style: MarkerStyle,
    pub popup: String,
}

/// A feed feature ready for the map layer.
#[derive(Debug, Clone, Serialize)]
pub struct StyledFeature {
    #[serde(rename = "type")]
    pub type_: &'static str,
    pub id: String,
    pub geometry: Option<Geometry>,
    pub properties: StyledProperties,
}

impl From<&Feature> for StyledFeature {
    fn from(f: &Feature) -> Self {
        Self {
            type_: "Feature",
            id: f.id.clone(),
            geometry: f.geometry.clone(),
            properties: StyledProperties {
                mag: f.properties.mag,
                place: f.properties.place.clone(),
                depth_km: f.depth_km(),
                style: MarkerStyle::for_feature(f),
                popup: popup_html(f),
            },
        }
    }
}

/// A GeoJSON collection of styled features.
#[derive(Debug, Clone, Serialize)]
pub struct StyledCollection {
    #[serde(rename = "type")]
    pub type_: &'static str,
    pub features: Vec<StyledFeature>,
}

/// Style every feature of a feed, preserving order.
#[must_use]
pub fn style_collection(feed: &FeatureCollection) -> StyledCollection {
    StyledCollection {
        type_: "FeatureCollection",
        features: feed.features.iter().map(StyledFeature::from).collect(),
    }
}
