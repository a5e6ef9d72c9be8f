//! Depth legend.
//!
//! Built once from the same band table the classifier uses, then rendered as
//! the static key in the bottom-right corner of the map.

use serde::Serialize;

use crate::classify::{ColorCode, DEEPEST, DEPTH_BANDS, DepthBand};

/// One swatch of the legend.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LegendEntry {
    pub label: String,
    pub color: ColorCode,
}

/// The band table shown in the legend.
///
/// The finite bands followed by the catch-all band, which repeats the last
/// finite bound.
#[must_use]
pub fn legend_bands() -> Vec<DepthBand> {
    let last_bound = DEPTH_BANDS.last().map_or(0.0, |band| band.upper_bound);
    DEPTH_BANDS
        .iter()
        .copied()
        .chain(std::iter::once(DepthBand {
            upper_bound: last_bound,
            color: DEEPEST,
        }))
        .collect()
}

/// Build one entry per band, in order.
///
/// Each label spans from the band's bound to the next band's bound; the last
/// band gets an open-ended `+` label.
#[must_use]
pub fn build_legend(bands: &[DepthBand]) -> Vec<LegendEntry> {
    bands
        .iter()
        .enumerate()
        .map(|(i, band)| {
            let label = match bands.get(i + 1) {
                Some(next) => format!("{}–{} km", band.upper_bound, next.upper_bound),
                None => format!("{}+ km", band.upper_bound),
            };
            LegendEntry {
                label,
                color: band.color,
            }
        })
        .collect()
}

/// The legend for the fixed depth table.
#[must_use]
pub fn depth_legend() -> Vec<LegendEntry> {
    build_legend(&legend_bands())
}

/// Render the legend as the inner markup of the map control.
#[must_use]
pub fn legend_html(entries: &[LegendEntry]) -> String {
    let swatches: String = entries
        .iter()
        .map(|entry| {
            format!(
                r#"<i style="background:{}; width: 20px; height: 20px; display: inline-block; margin-right: 5px;"></i> {}<br>"#,
                entry.color, entry.label
            )
        })
        .collect();
    format!(r#"<div class="info legend">{swatches}</div>"#)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fixed_legend_order() {
        let legend = depth_legend();
        let colors: Vec<ColorCode> = legend.iter().map(|e| e.color).collect();

        assert_eq!(
            colors,
            vec![
                ColorCode::CYAN,
                ColorCode::GREEN,
                ColorCode::LIGHT_GREEN,
                ColorCode::YELLOW,
                ColorCode::ORANGE,
                ColorCode::DARK_ORANGE,
                ColorCode::RED,
            ]
        );
    }

    #[test]
    fn test_fixed_legend_labels() {
        let labels: Vec<String> = depth_legend().into_iter().map(|e| e.label).collect();

        assert_eq!(
            labels,
            vec![
                "-10–10 km",
                "10–30 km",
                "30–50 km",
                "50–70 km",
                "70–90 km",
                "90–90 km",
                "90+ km",
            ]
        );
    }

    #[test]
    fn test_single_band_is_open_ended() {
        let legend = build_legend(&[DepthBand {
            upper_bound: 2.5,
            color: ColorCode::YELLOW,
        }]);

        assert_eq!(legend.len(), 1);
        assert_eq!(legend[0].label, "2.5+ km");
    }

    #[test]
    fn test_empty_table() {
        assert!(build_legend(&[]).is_empty());
    }

    #[test]
    fn test_legend_html() {
        let html = legend_html(&depth_legend());

        assert!(html.starts_with(r#"<div class="info legend">"#));
        assert!(html.ends_with("</div>"));
        assert_eq!(html.matches("<i style=").count(), 7);
        assert!(html.contains("background:#ff0000;"));
        assert!(html.contains("</i> 90+ km<br>"));
    }
}
