//! Terminal output for styled events and the legend.
//!
//! Supports human-readable (true-color swatches), JSON, and NDJSON formats.

use std::io::{self, Write};

use serde::Serialize;

use crate::classify::ColorCode;
use crate::legend::LegendEntry;
use crate::models::Feature;
use crate::style::MarkerStyle;

// ANSI codes
const RESET: &str = "\x1b[0m";
const BOLD: &str = "\x1b[1m";
const DIM: &str = "\x1b[2m";

/// Output format selection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Format {
    /// Human-readable terminal output (default)
    #[default]
    Human,
    /// JSON array
    Json,
    /// Newline-delimited JSON (one object per line)
    Ndjson,
}

impl std::str::FromStr for Format {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "human" => Ok(Self::Human),
            "json" => Ok(Self::Json),
            "ndjson" => Ok(Self::Ndjson),
            _ => Err(format!("unknown format: {s} (expected: human, json, ndjson)")),
        }
    }
}

/// Normalized event with its computed map encoding.
#[derive(Debug, Clone, Serialize)]
pub struct OutputEvent {
    pub id: String,
    pub time: Option<String>,
    pub magnitude: Option<f64>,
    pub depth_km: f64,
    pub latitude: f64,
    pub longitude: f64,
    pub place: Option<String>,
    pub color: ColorCode,
    pub radius: f64,
}

impl From<&Feature> for OutputEvent {
    fn from(f: &Feature) -> Self {
        let style = MarkerStyle::for_feature(f);
        Self {
            id: f.id.clone(),
            time: f.time().map(|t| t.to_rfc3339()),
            magnitude: f.properties.mag,
            depth_km: f.depth_km(),
            latitude: f.latitude(),
            longitude: f.longitude(),
            place: f.properties.place.clone(),
            color: style.fill_color,
            radius: style.radius,
        }
    }
}

/// True-color background swatch for a color code.
fn swatch(color: ColorCode) -> String {
    let (r, g, b) = color.rgb();
    format!("\x1b[48;2;{r};{g};{b}m  {RESET}")
}

/// Write events in human-readable format.
///
/// # Errors
///
/// Returns an error if writing fails.
pub fn write_human<W: Write>(writer: &mut W, events: &[Feature]) -> io::Result<()> {
    for event in events {
        let out = OutputEvent::from(event);
        let time = event
            .time()
            .map(|t| t.format("%Y-%m-%d %H:%M:%S").to_string())
            .unwrap_or_else(|| "unknown".into());
        let mag = out
            .magnitude
            .map(|m| format!("{m:.1}"))
            .unwrap_or_else(|| "?".into());
        let place = out.place.as_deref().unwrap_or("Unknown location");

        writeln!(
            writer,
            "{} {BOLD}M{mag:<4}{RESET} │ {DIM}{:>6.1}km{RESET} │ {} r={:<5} │ {time} UTC │ {place}",
            swatch(out.color),
            out.depth_km,
            out.color,
            out.radius,
        )?;
    }
    Ok(())
}

/// Write events as a JSON array.
///
/// # Errors
///
/// Returns an error if serialization or writing fails.
pub fn write_json<W: Write>(writer: &mut W, events: &[Feature]) -> io::Result<()> {
    let output: Vec<OutputEvent> = events.iter().map(OutputEvent::from).collect();
    let json = serde_json::to_string_pretty(&output)
        .map_err(|e| io::Error::new(io::ErrorKind::InvalidData, e))?;
    writeln!(writer, "{json}")
}

/// Write events as newline-delimited JSON.
///
/// # Errors
///
/// Returns an error if serialization or writing fails.
pub fn write_ndjson<W: Write>(writer: &mut W, events: &[Feature]) -> io::Result<()> {
    for event in events {
        let json = serde_json::to_string(&OutputEvent::from(event))
            .map_err(|e| io::Error::new(io::ErrorKind::InvalidData, e))?;
        writeln!(writer, "{json}")?;
    }
    Ok(())
}

/// Write events in the specified format.
///
/// # Errors
///
/// Returns an error if writing fails.
pub fn write_events<W: Write>(writer: &mut W, events: &[Feature], format: Format) -> io::Result<()> {
    match format {
        Format::Human => write_human(writer, events),
        Format::Json => write_json(writer, events),
        Format::Ndjson => write_ndjson(writer, events),
    }
}

/// Write the legend in the specified format.
///
/// NDJSON writes one entry per line.
///
/// # Errors
///
/// Returns an error if serialization or writing fails.
pub fn write_legend<W: Write>(writer: &mut W, entries: &[LegendEntry], format: Format) -> io::Result<()> {
    match format {
        Format::Human => {
            writeln!(writer, "{BOLD}Depth{RESET}")?;
            for entry in entries {
                writeln!(writer, "{} {} {DIM}{}{RESET}", swatch(entry.color), entry.label, entry.color)?;
            }
            Ok(())
        }
        Format::Json => {
            let json = serde_json::to_string_pretty(entries)
                .map_err(|e| io::Error::new(io::ErrorKind::InvalidData, e))?;
            writeln!(writer, "{json}")
        }
        Format::Ndjson => {
            for entry in entries {
                let json = serde_json::to_string(entry)
                    .map_err(|e| io::Error::new(io::ErrorKind::InvalidData, e))?;
                writeln!(writer, "{json}")?;
            }
            Ok(())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::legend::depth_legend;
    use crate::models::FeatureCollection;

    fn sample_events() -> Vec<Feature> {
        let feed: FeatureCollection =
            serde_json::from_str(crate::models::tests::SAMPLE_FEED).unwrap();
        feed.features
    }

    #[test]
    fn test_format_parse() {
        assert_eq!("human".parse::<Format>().unwrap(), Format::Human);
        assert_eq!("JSON".parse::<Format>().unwrap(), Format::Json);
        assert_eq!("ndjson".parse::<Format>().unwrap(), Format::Ndjson);
        assert!("invalid".parse::<Format>().is_err());
    }

    #[test]
    fn test_ndjson_carries_encoding() {
        let mut buf = Vec::new();
        write_ndjson(&mut buf, &sample_events()).unwrap();
        let text = String::from_utf8(buf).unwrap();
        let lines: Vec<&str> = text.lines().collect();

        assert_eq!(lines.len(), 3);
        let first: serde_json::Value = serde_json::from_str(lines[0]).unwrap();
        assert_eq!(first["id"], "nc75012345");
        assert_eq!(first["color"], "#00ff00");
        assert_eq!(first["radius"], 12.0);
    }

    #[test]
    fn test_json_array() {
        let mut buf = Vec::new();
        write_events(&mut buf, &sample_events(), Format::Json).unwrap();
        let value: serde_json::Value = serde_json::from_slice(&buf).unwrap();

        assert_eq!(value.as_array().map(Vec::len), Some(3));
        assert_eq!(value[1]["color"], "#ff0000");
        assert_eq!(value[2]["magnitude"], serde_json::Value::Null);
    }

    #[test]
    fn test_human_lines() {
        let mut buf = Vec::new();
        write_human(&mut buf, &sample_events()).unwrap();
        let text = String::from_utf8(buf).unwrap();

        assert_eq!(text.lines().count(), 3);
        assert!(text.contains("\x1b[48;2;0;255;0m"));
        assert!(text.contains("7 km NW of The Geysers, CA"));
        assert!(text.contains("Unknown location"));
    }

    #[test]
    fn test_legend_output() {
        let mut buf = Vec::new();
        write_legend(&mut buf, &depth_legend(), Format::Json).unwrap();
        let value: serde_json::Value = serde_json::from_slice(&buf).unwrap();

        assert_eq!(value[0]["label"], "-10–10 km");
        assert_eq!(value[0]["color"], "#00ffff");
        assert_eq!(value[6]["label"], "90+ km");

        let mut buf = Vec::new();
        write_legend(&mut buf, &depth_legend(), Format::Human).unwrap();
        assert_eq!(String::from_utf8(buf).unwrap().lines().count(), 8);
    }

    #[test]
    fn test_legend_ndjson_one_entry_per_line() {
        let mut buf = Vec::new();
        write_legend(&mut buf, &depth_legend(), Format::Ndjson).unwrap();
        let text = String::from_utf8(buf).unwrap();
        let lines: Vec<&str> = text.lines().collect();

        assert_eq!(lines.len(), 7);
        let last: serde_json::Value = serde_json::from_str(lines[6]).unwrap();
        assert_eq!(last["label"], "90+ km");
        assert_eq!(last["color"], "#ff0000");
    }
}
