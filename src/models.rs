//! Data models for the USGS earthquake summary feed.
//!
//! These structures match the GeoJSON format of the summary feeds. Only the
//! fields the map actually reads are modeled; everything else is ignored.

use chrono::{DateTime, TimeZone, Utc};
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;
use tracing::warn;

use crate::errors::QuakemapError;

/// Top-level GeoJSON response from USGS feeds.
#[derive(Debug, Clone, Deserialize)]
pub struct FeatureCollection {
    /// Always "FeatureCollection"
    #[serde(rename = "type")]
    pub type_: String,

    /// Feed metadata, absent in hand-built collections
    #[serde(default)]
    pub metadata: Option<Metadata>,

    /// Earthquake events
    #[serde(default)]
    pub features: Vec<Feature>,
}

impl FeatureCollection {
    /// Validate the response structure.
    pub fn validate(&self) -> Result<(), QuakemapError> {
        if self.type_ != "FeatureCollection" {
            return Err(QuakemapError::InvalidResponse(format!(
                "expected type 'FeatureCollection', got '{}'",
                self.type_
            )));
        }
        Ok(())
    }

    /// Drop features that cannot be placed on the map.
    ///
    /// Returns the number of features removed.
    pub fn retain_valid(&mut self) -> usize {
        let before = self.features.len();
        self.features.retain(|feature| match feature.validate() {
            Ok(()) => true,
            Err(e) => {
                warn!("skipping feature {}: {}", feature.id, e);
                false
            }
        });
        before - self.features.len()
    }

    /// Human-readable feed title, if the feed carried one.
    #[must_use]
    pub fn title(&self) -> Option<&str> {
        self.metadata.as_ref().map(|m| m.title.as_str())
    }
}

/// Metadata about the feed response.
#[derive(Debug, Clone, Deserialize)]
pub struct Metadata {
    /// Human-readable title
    pub title: String,
}

/// A single earthquake event.
///
/// Decoding is lenient: a null or malformed geometry or property decodes as
/// missing, and [`Feature::validate`] decides whether the event can be mapped.
#[derive(Debug, Clone, Deserialize)]
pub struct Feature {
    /// Unique event ID
    #[serde(default, deserialize_with = "lenient_string")]
    pub id: String,

    /// Geographic location
    #[serde(default, deserialize_with = "lenient_geometry")]
    pub geometry: Option<Geometry>,

    /// Event properties
    #[serde(default, deserialize_with = "null_as_default")]
    pub properties: Properties,
}

impl Feature {
    /// Validate the event structure.
    pub fn validate(&self) -> Result<(), QuakemapError> {
        let Some(geometry) = &self.geometry else {
            return Err(QuakemapError::Validation("missing geometry".into()));
        };
        if geometry.coordinates.len() != 3 {
            return Err(QuakemapError::Validation(format!(
                "expected 3 coordinates, got {}",
                geometry.coordinates.len()
            )));
        }
        if let Some(i) = geometry.coordinates.iter().position(Option::is_none) {
            return Err(QuakemapError::Validation(format!(
                "coordinate {i} is not a number"
            )));
        }
        Ok(())
    }

    /// Get the event time as a `DateTime<Utc>`.
    #[must_use]
    pub fn time(&self) -> Option<DateTime<Utc>> {
        self.properties
            .time
            .and_then(|ms| Utc.timestamp_millis_opt(ms).single())
    }

    fn coordinate(&self, index: usize) -> f64 {
        self.geometry
            .as_ref()
            .and_then(|g| g.coordinates.get(index).copied().flatten())
            .unwrap_or(0.0)
    }

    /// Get longitude (degrees).
    #[must_use]
    pub fn longitude(&self) -> f64 {
        self.coordinate(0)
    }

    /// Get latitude (degrees).
    #[must_use]
    pub fn latitude(&self) -> f64 {
        self.coordinate(1)
    }

    /// Get depth in kilometers (positive down).
    #[must_use]
    pub fn depth_km(&self) -> f64 {
        self.coordinate(2)
    }
}

/// Point geometry for an event.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct Geometry {
    /// Always "Point"
    #[serde(rename = "type", default)]
    pub type_: String,

    /// Coordinates: [longitude, latitude, depth_km]; non-numbers decode as `None`
    #[serde(default, deserialize_with = "lenient_numbers")]
    pub coordinates: Vec<Option<f64>>,
}

/// Event properties from the feed.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Properties {
    /// Magnitude value
    #[serde(default, deserialize_with = "lenient_number")]
    pub mag: Option<f64>,

    /// Human-readable place description
    #[serde(default, deserialize_with = "lenient_optional_string")]
    pub place: Option<String>,

    /// Event time (ms since epoch)
    #[serde(default, deserialize_with = "lenient_integer")]
    pub time: Option<i64>,
}

fn lenient_number<'de, D: Deserializer<'de>>(d: D) -> Result<Option<f64>, D::Error> {
    Ok(Value::deserialize(d)?.as_f64())
}

fn lenient_integer<'de, D: Deserializer<'de>>(d: D) -> Result<Option<i64>, D::Error> {
    Ok(Value::deserialize(d)?.as_i64())
}

fn lenient_optional_string<'de, D: Deserializer<'de>>(d: D) -> Result<Option<String>, D::Error> {
    Ok(match Value::deserialize(d)? {
        Value::String(s) => Some(s),
        _ => None,
    })
}

fn lenient_string<'de, D: Deserializer<'de>>(d: D) -> Result<String, D::Error> {
    Ok(lenient_optional_string(d)?.unwrap_or_default())
}

fn lenient_numbers<'de, D: Deserializer<'de>>(d: D) -> Result<Vec<Option<f64>>, D::Error> {
    Ok(match Value::deserialize(d)? {
        Value::Array(items) => items.iter().map(Value::as_f64).collect(),
        _ => Vec::new(),
    })
}

fn lenient_geometry<'de, D: Deserializer<'de>>(d: D) -> Result<Option<Geometry>, D::Error> {
    Ok(serde_json::from_value(Value::deserialize(d)?).ok())
}

fn null_as_default<'de, D, T>(d: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de> + Default,
{
    Ok(Option::<T>::deserialize(d)?.unwrap_or_default())
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;

    pub(crate) const SAMPLE_FEED: &str = r#"{
        "type": "FeatureCollection",
        "metadata": {
            "generated": 1760659200000,
            "url": "https://earthquake.usgs.gov/earthquakes/feed/v1.0/summary/all_week.geojson",
            "title": "USGS All Earthquakes, Past Week",
            "status": 200,
            "api": "1.14.1",
            "count": 3
        },
        "features": [
            {
                "type": "Feature",
                "id": "nc75012345",
                "geometry": { "type": "Point", "coordinates": [-122.81, 38.82, 5.0] },
                "properties": {
                    "mag": 3.0, "magType": "md", "place": "7 km NW of The Geysers, CA",
                    "time": 1760650000000, "url": "https://earthquake.usgs.gov/earthquakes/eventpage/nc75012345",
                    "status": "automatic", "tsunami": 0, "sig": 138
                }
            },
            {
                "type": "Feature",
                "id": "us7000abcd",
                "geometry": { "type": "Point", "coordinates": [142.37, 38.3, 120.4] },
                "properties": {
                    "mag": 4.5, "magType": "mb", "place": "off the east coast of Honshu, Japan",
                    "time": 1760640000000
                }
            },
            {
                "type": "Feature",
                "id": "ak0251xyz",
                "geometry": { "type": "Point", "coordinates": [-150.1, 61.2] },
                "properties": { "mag": null, "place": null, "time": 1760630000000 }
            }
        ]
    }"#;

    #[test]
    fn test_parse_sample_feed() {
        let feed: FeatureCollection =
            serde_json::from_str(SAMPLE_FEED).expect("failed to parse sample feed");

        feed.validate().expect("invalid feed");
        assert_eq!(feed.features.len(), 3);
        assert_eq!(feed.title(), Some("USGS All Earthquakes, Past Week"));

        let first = &feed.features[0];
        assert_eq!(first.id, "nc75012345");
        assert!((first.depth_km() - 5.0).abs() < f64::EPSILON);
        assert!((first.latitude() - 38.82).abs() < f64::EPSILON);
        assert_eq!(first.properties.mag, Some(3.0));
        assert!(first.time().is_some());
    }

    #[test]
    fn test_retain_valid_drops_short_coordinates() {
        let mut feed: FeatureCollection = serde_json::from_str(SAMPLE_FEED).unwrap();

        assert_eq!(feed.retain_valid(), 1);
        assert_eq!(feed.features.len(), 2);
        assert!(feed.features.iter().all(|f| f.id != "ak0251xyz"));
    }

    pub(crate) const MIXED_FEED: &str = r#"{
        "type": "FeatureCollection",
        "features": [
            {
                "type": "Feature",
                "id": "good1",
                "geometry": { "type": "Point", "coordinates": [-117.5, 35.7, 8.2] },
                "properties": { "mag": 2.2, "place": "Ridgecrest, CA", "time": 1760650000000 }
            },
            {
                "type": "Feature",
                "id": "nogeom",
                "geometry": null,
                "properties": { "mag": 1.1, "place": "nowhere" }
            },
            {
                "type": "Feature",
                "id": "nulldepth",
                "geometry": { "type": "Point", "coordinates": [-155.3, 19.4, null] },
                "properties": { "mag": "n/a", "place": 7, "time": null }
            },
            {
                "type": "Feature",
                "id": "noprops",
                "geometry": { "type": "Point", "coordinates": "bogus" },
                "properties": null
            }
        ]
    }"#;

    #[test]
    fn test_malformed_features_decode_and_drop() {
        let mut feed: FeatureCollection =
            serde_json::from_str(MIXED_FEED).expect("mixed feed should decode");

        assert_eq!(feed.features.len(), 4);
        let null_depth = &feed.features[2];
        assert!(null_depth.properties.mag.is_none());
        assert!(null_depth.properties.place.is_none());
        assert!(matches!(
            null_depth.validate(),
            Err(QuakemapError::Validation(_))
        ));
        assert!(feed.features[1].geometry.is_none());

        assert_eq!(feed.retain_valid(), 3);
        assert_eq!(feed.features.len(), 1);
        assert_eq!(feed.features[0].id, "good1");
        assert!((feed.features[0].depth_km() - 8.2).abs() < f64::EPSILON);
    }

    #[test]
    fn test_wrong_top_level_type() {
        let feed: FeatureCollection =
            serde_json::from_str(r#"{"type": "Feature", "features": []}"#).unwrap();

        assert!(matches!(
            feed.validate(),
            Err(QuakemapError::InvalidResponse(_))
        ));
    }

    #[test]
    fn test_metadata_optional() {
        let feed: FeatureCollection =
            serde_json::from_str(r#"{"type": "FeatureCollection", "features": []}"#).unwrap();

        assert!(feed.metadata.is_none());
        assert!(feed.title().is_none());
    }
}
