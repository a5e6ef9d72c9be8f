//! Map page assembly.
//!
//! [`MapContext`] owns everything the page needs: map options, the base tile
//! layer, the earthquake layer source and the legend control. Rendering it
//! yields a self-contained HTML document driving Leaflet.

use serde::Serialize;

use crate::errors::QuakemapError;
use crate::legend::{LegendEntry, depth_legend, legend_html};
use crate::style::StyledCollection;

/// Leaflet release loaded by the page.
const LEAFLET_VERSION: &str = "1.9.4";

/// Map center and zoom.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct MapOptions {
    /// `[latitude, longitude]`
    pub center: Center,
    pub zoom: u8,
}

impl Default for MapOptions {
    fn default() -> Self {
        Self {
            center: Center::SAN_FRANCISCO,
            zoom: 5,
        }
    }
}

/// A `[lat, lon]` pair.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Center(pub [f64; 2]);

impl Center {
    pub const SAN_FRANCISCO: Self = Self([37.7749, -122.4194]);
}

impl std::str::FromStr for Center {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let parts: Vec<&str> = s.split(',').collect();
        if parts.len() != 2 {
            return Err(format!(
                "center requires 2 values (lat,lon), got {}",
                parts.len()
            ));
        }

        let vals: Result<Vec<f64>, _> = parts.iter().map(|p| p.trim().parse::<f64>()).collect();
        let vals = vals.map_err(|e| format!("invalid number in center: {e}"))?;
        let (lat, lon) = (vals[0], vals[1]);

        if !(-90.0..=90.0).contains(&lat) {
            return Err(format!("latitude {lat} out of range [-90, 90]"));
        }
        if !(-180.0..=180.0).contains(&lon) {
            return Err(format!("longitude {lon} out of range [-180, 180]"));
        }

        Ok(Self([lat, lon]))
    }
}

/// A raster tile layer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TileLayer {
    pub url_template: String,
    pub attribution: String,
}

impl TileLayer {
    /// The OpenStreetMap standard tiles.
    #[must_use]
    pub fn openstreetmap() -> Self {
        Self {
            url_template: "https://{s}.tile.openstreetmap.org/{z}/{x}/{y}.png".into(),
            attribution: r#"&copy; <a href="https://www.openstreetmap.org/copyright">OpenStreetMap</a> contributors"#.into(),
        }
    }
}

/// Where the page gets the earthquake layer from.
#[derive(Debug, Clone)]
pub enum LayerSource {
    /// Styled features embedded in the page.
    Inline(StyledCollection),
    /// URL the page fetches once it has loaded.
    Url(String),
}

/// The legend control, built once per page.
#[derive(Debug, Clone)]
pub struct LegendControl {
    /// Leaflet control corner
    pub position: &'static str,
    pub entries: Vec<LegendEntry>,
}

impl Default for LegendControl {
    fn default() -> Self {
        Self {
            position: "bottomright",
            entries: depth_legend(),
        }
    }
}

/// Everything one map page owns.
#[derive(Debug, Clone)]
pub struct MapContext {
    pub title: String,
    pub options: MapOptions,
    pub base_layer: TileLayer,
    pub earthquakes: LayerSource,
    pub legend: LegendControl,
}

impl MapContext {
    /// A map with the default base layer and legend.
    #[must_use]
    pub fn new(options: MapOptions, earthquakes: LayerSource) -> Self {
        Self {
            title: "Earthquake Map".into(),
            options,
            base_layer: TileLayer::openstreetmap(),
            earthquakes,
            legend: LegendControl::default(),
        }
    }

    /// Replace the page title.
    #[must_use]
    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = title.into();
        self
    }

    /// Render the complete HTML page.
    ///
    /// # Errors
    ///
    /// Returns an error if the map data cannot be serialized.
    pub fn render_page(&self) -> Result<String, QuakemapError> {
        let options = script_json(&self.options)?;
        let tile_url = script_json(&self.base_layer.url_template)?;
        let attribution = script_json(&self.base_layer.attribution)?;
        let legend = script_json(&legend_html(&self.legend.entries))?;
        let data = match &self.earthquakes {
            LayerSource::Inline(collection) => {
                format!("Promise.resolve({})", script_json(collection)?)
            }
            LayerSource::Url(url) => format!(
                "fetch({}).then(function (r) {{ if (!r.ok) throw new Error('HTTP ' + r.status); return r.json(); }})",
                script_json(url)?
            ),
        };

        Ok(PAGE_TEMPLATE
            .replace("{{LEAFLET_VERSION}}", LEAFLET_VERSION)
            .replace("{{TITLE}}", &crate::style::escape_html(&self.title))
            .replace("{{OPTIONS}}", &options)
            .replace("{{TILE_URL}}", &tile_url)
            .replace("{{ATTRIBUTION}}", &attribution)
            .replace("{{LEGEND_POSITION}}", self.legend.position)
            .replace("{{LEGEND_HTML}}", &legend)
            .replace("{{DATA}}", &data))
    }
}

/// Serialize a value as JSON safe to embed in a `<script>` element.
fn script_json<T: Serialize + ?Sized>(value: &T) -> Result<String, QuakemapError> {
    Ok(serde_json::to_string(value)?.replace("</", "<\\/"))
}

const PAGE_TEMPLATE: &str = r#"<!DOCTYPE html>
<html lang="en">
<head>
    <meta charset="UTF-8">
    <meta name="viewport" content="width=device-width, initial-scale=1.0">
    <title>{{TITLE}}</title>
    <link rel="stylesheet" href="https://unpkg.com/leaflet@{{LEAFLET_VERSION}}/dist/leaflet.css" />
    <script src="https://unpkg.com/leaflet@{{LEAFLET_VERSION}}/dist/leaflet.js"></script>
    <style>
        html, body, #map { height: 100%; margin: 0; padding: 0; }
        .info.legend {
            background: rgba(255, 255, 255, 0.9);
            padding: 8px 10px;
            border-radius: 5px;
            line-height: 20px;
            font: 13px/20px Arial, Helvetica, sans-serif;
            box-shadow: 0 0 15px rgba(0, 0, 0, 0.2);
        }
    </style>
</head>
<body>
    <div id="map"></div>
    <script>
        var options = {{OPTIONS}};
        var basemap = L.tileLayer({{TILE_URL}}, { attribution: {{ATTRIBUTION}} });
        var map = L.map('map', { center: options.center, zoom: options.zoom, layers: [basemap] });

        {{DATA}}.then(function (data) {
            L.geoJson(data, {
                pointToLayer: function (feature, latlng) {
                    return L.circleMarker(latlng);
                },
                style: function (feature) {
                    return feature.properties.style;
                },
                onEachFeature: function (feature, layer) {
                    layer.bindPopup(feature.properties.popup);
                }
            }).addTo(map);
        }).catch(function (err) {
            console.error('earthquake layer unavailable:', err);
        });

        var legend = L.control({ position: '{{LEGEND_POSITION}}' });
        legend.onAdd = function () {
            var div = L.DomUtil.create('div');
            div.innerHTML = {{LEGEND_HTML}};
            return div.firstChild;
        };
        legend.addTo(map);
    </script>
</body>
</html>
"#;
