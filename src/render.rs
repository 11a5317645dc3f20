//! Interactive map rendering of a segment history.
//!
//! Emits a single self-contained HTML file backed by Leaflet and
//! OpenStreetMap tiles. Resting clusters always get a centroid marker; the
//! per-point trace and cluster overlays are opt-in because they get heavy on
//! long tracks.

use std::fmt::Write as _;
use std::fs;
use std::path::Path;

use log::info;

use crate::error::{Result, TrackError};
use crate::Segment;

/// Which point-level overlays to draw on top of the centroid markers.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RenderOptions {
    /// Draw a green marker for every point of active segments.
    pub trace: bool,
    /// Draw a red marker for every point of resting clusters.
    pub cluster: bool,
}

/// Render the segment history to an HTML map at `path`.
///
/// `view` is the initial map center (latitude, longitude), typically the
/// track's first point.
pub fn render_map(
    segments: &[Segment],
    view: (f64, f64),
    options: RenderOptions,
    path: &Path,
) -> Result<()> {
    let html = render_html(segments, view, options);
    fs::write(path, html).map_err(|source| TrackError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    info!("wrote map with {} segments to {}", segments.len(), path.display());
    Ok(())
}

/// Build the HTML document for a segment history.
pub fn render_html(segments: &[Segment], view: (f64, f64), options: RenderOptions) -> String {
    let mut markers = String::new();

    for segment in segments {
        if options.trace && segment.state.is_active() {
            for point in &segment.points {
                point_marker(&mut markers, point.latitude, point.longitude, "green");
            }
        }
        if options.cluster && segment.state.is_resting() {
            for point in &segment.points {
                point_marker(&mut markers, point.latitude, point.longitude, "red");
            }
        }

        if segment.state.is_resting() {
            let (lat, lon) = segment.center();
            let popup = match &segment.pois {
                Some(pois) if !pois.is_empty() => pois.join(", "),
                // Without names, the arrival time still identifies the stop.
                _ => format!("Arrived {}", segment.points[0].time.to_rfc3339()),
            };
            let _ = writeln!(
                markers,
                "L.circleMarker([{lat:.6}, {lon:.6}], {{radius: 8, color: 'black', fillOpacity: 0.8}}).bindPopup('{}').addTo(map);",
                escape_js(&popup)
            );
        }
    }

    let (view_lat, view_lon) = view;
    let mut html = String::new();
    html.push_str("<!DOCTYPE html>\n<html>\n<head>\n<meta charset=\"utf-8\"/>\n");
    html.push_str("<title>Trip segments</title>\n");
    html.push_str(
        "<link rel=\"stylesheet\" href=\"https://unpkg.com/leaflet@1.9.4/dist/leaflet.css\"/>\n",
    );
    html.push_str("<script src=\"https://unpkg.com/leaflet@1.9.4/dist/leaflet.js\"></script>\n");
    html.push_str("<style>html, body, #map { height: 100%; margin: 0; }</style>\n");
    html.push_str("</head>\n<body>\n<div id=\"map\"></div>\n<script>\n");
    let _ = writeln!(html, "var map = L.map('map').setView([{view_lat:.6}, {view_lon:.6}], 15);");
    html.push_str(
        "L.tileLayer('https://tile.openstreetmap.org/{z}/{x}/{y}.png', \
         {attribution: '&copy; OpenStreetMap contributors'}).addTo(map);\n",
    );
    html.push_str(&markers);
    html.push_str("</script>\n</body>\n</html>\n");
    html
}

fn point_marker(out: &mut String, lat: f64, lon: f64, color: &str) {
    let _ = writeln!(
        out,
        "L.circleMarker([{lat:.6}, {lon:.6}], {{radius: 3, color: '{color}'}}).addTo(map);"
    );
}

/// Escape a string for inclusion inside a single-quoted JS literal.
fn escape_js(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '\\' => escaped.push_str("\\\\"),
            '\'' => escaped.push_str("\\'"),
            '<' => escaped.push_str("\\u003c"),
            '\n' => escaped.push_str("\\n"),
            _ => escaped.push(c),
        }
    }
    escaped
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{TrackPoint, TravelState};
    use chrono::{Duration, TimeZone, Utc};

    fn history() -> Vec<Segment> {
        let start = Utc.with_ymd_and_hms(2024, 5, 1, 8, 0, 0).unwrap();
        let resting: Vec<TrackPoint> = (0..4)
            .map(|i| TrackPoint::new(48.2082, 16.3738, start + Duration::seconds(60 * i)))
            .collect();
        let walking: Vec<TrackPoint> = (0..4)
            .map(|i| {
                TrackPoint::new(
                    48.21 + i as f64 * 0.0001,
                    16.3738,
                    start + Duration::seconds(300 + i),
                )
            })
            .collect();

        vec![
            Segment {
                state: TravelState::Resting,
                points: resting,
                next_state: TravelState::Walking,
                pois: Some(vec!["Joe's Diner".to_string()]),
            },
            Segment {
                state: TravelState::Walking,
                points: walking,
                next_state: TravelState::Resting,
                pois: None,
            },
        ]
    }

    #[test]
    fn test_centroid_marker_always_present() {
        let html = render_html(&history(), (48.2082, 16.3738), RenderOptions::default());
        assert!(html.contains("color: 'black'"));
        // Overlays are off by default.
        assert!(!html.contains("color: 'green'"));
        assert!(!html.contains("color: 'red'"));
    }

    #[test]
    fn test_overlays_follow_options() {
        let options = RenderOptions {
            trace: true,
            cluster: true,
        };
        let html = render_html(&history(), (48.2082, 16.3738), options);
        assert_eq!(html.matches("color: 'green'").count(), 4);
        assert_eq!(html.matches("color: 'red'").count(), 4);
    }

    #[test]
    fn test_poi_names_are_escaped_into_popup() {
        let html = render_html(&history(), (48.2082, 16.3738), RenderOptions::default());
        assert!(html.contains("bindPopup('Joe\\'s Diner')"));
    }

    #[test]
    fn test_popup_falls_back_to_arrival_time() {
        let mut segments = history();
        segments[0].pois = None;
        let html = render_html(&segments, (48.2082, 16.3738), RenderOptions::default());
        assert!(html.contains("Arrived 2024-05-01T08:00:00+00:00"));
    }

    #[test]
    fn test_document_is_self_contained() {
        let html = render_html(&history(), (48.2082, 16.3738), RenderOptions::default());
        assert!(html.starts_with("<!DOCTYPE html>"));
        assert!(html.contains("setView([48.208200, 16.373800], 15)"));
        assert!(html.contains("tile.openstreetmap.org"));
        assert!(html.trim_end().ends_with("</html>"));
    }
}
