//! Overpass API client for point-of-interest lookup around resting clusters.
//!
//! Segmentation itself never touches the network; this module is a
//! post-processing stage that takes already-emitted segments and fills in
//! amenity names for the resting ones. Lookups use bounded retries with a
//! fixed delay and a request timeout, and a failed lookup degrades to "no
//! points of interest" at the annotation layer rather than aborting the run.

use std::collections::HashMap;
use std::time::Duration;

use log::{debug, warn};
use serde::Deserialize;

use crate::error::{Result, TrackError};
use crate::{Segment, TrackPoint};

const MAX_RETRIES: u32 = 3;
const RETRY_DELAY: Duration = Duration::from_secs(2);
const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// Configuration for the Overpass point-of-interest resolver.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PoiConfig {
    /// Overpass interpreter endpoint.
    pub endpoint: String,
    /// Search radius around each queried coordinate, in meters.
    pub radius_m: u32,
    /// Cap on cluster coordinates sent per query, to respect request-size
    /// limits.
    pub max_query_coords: usize,
}

impl Default for PoiConfig {
    fn default() -> Self {
        Self {
            endpoint: "https://overpass-api.de/api/interpreter".to_string(),
            radius_m: 25,
            max_query_coords: 10,
        }
    }
}

/// Overpass JSON response body (only the fields we read).
#[derive(Debug, Deserialize)]
struct OverpassResponse {
    #[serde(default)]
    elements: Vec<OverpassElement>,
}

#[derive(Debug, Deserialize)]
struct OverpassElement {
    #[serde(default)]
    tags: HashMap<String, String>,
}

/// Blocking Overpass client.
pub struct PoiResolver {
    client: reqwest::blocking::Client,
    config: PoiConfig,
}

impl PoiResolver {
    pub fn new(config: PoiConfig) -> Result<Self> {
        let client = reqwest::blocking::Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()
            .map_err(|e| TrackError::PoiLookup(format!("failed to create HTTP client: {e}")))?;

        Ok(Self { client, config })
    }

    /// Query amenities around a cluster of points.
    ///
    /// Retries transient failures up to [`MAX_RETRIES`] times with a fixed
    /// delay, then surfaces [`TrackError::PoiLookup`]. An empty result is a
    /// valid answer, not an error.
    pub fn lookup_amenities(&self, points: &[TrackPoint]) -> Result<Vec<String>> {
        let query = build_query(points, &self.config);
        let mut attempt = 0;

        loop {
            attempt += 1;
            match self.try_fetch(&query) {
                Ok(names) => return Ok(names),
                Err(err) => {
                    if attempt >= MAX_RETRIES {
                        return Err(err);
                    }
                    warn!(
                        "Overpass request failed (attempt {attempt}/{MAX_RETRIES}), retrying in {}s: {err}",
                        RETRY_DELAY.as_secs()
                    );
                    std::thread::sleep(RETRY_DELAY);
                }
            }
        }
    }

    fn try_fetch(&self, query: &str) -> Result<Vec<String>> {
        let response = self
            .client
            .get(&self.config.endpoint)
            .query(&[("data", query)])
            .send()
            .map_err(|e| TrackError::PoiLookup(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            return Err(TrackError::PoiLookup(format!("HTTP {status}")));
        }

        let body: OverpassResponse = response
            .json()
            .map_err(|e| TrackError::PoiLookup(format!("bad response body: {e}")))?;

        Ok(extract_names(body))
    }
}

/// Build the Overpass QL query for amenity ways/nodes around the cluster.
fn build_query(points: &[TrackPoint], config: &PoiConfig) -> String {
    let coords = points
        .iter()
        .take(config.max_query_coords)
        .map(|p| format!("{:.6},{:.6}", p.latitude, p.longitude))
        .collect::<Vec<_>>()
        .join(",");
    let around = format!("{},{}", config.radius_m, coords);

    format!(
        "[out:json];(way[amenity](around:{around});node[amenity](around:{around}););(._;>;);out body;"
    )
}

/// Pull human-readable names out of matched map features. Both the `name` and
/// `operator` tags count, in that order, per element.
fn extract_names(response: OverpassResponse) -> Vec<String> {
    let mut names = Vec::new();
    for element in response.elements {
        if let Some(name) = element.tags.get("name") {
            names.push(name.clone());
        }
        if let Some(operator) = element.tags.get("operator") {
            names.push(operator.clone());
        }
    }
    names
}

/// Fill in `pois` for every resting segment.
///
/// Lookup failures degrade to an unannotated segment with a warning; this
/// stage never aborts the run.
pub fn annotate_segments(segments: &mut [Segment], config: &PoiConfig) {
    let resolver = match PoiResolver::new(config.clone()) {
        Ok(resolver) => resolver,
        Err(err) => {
            warn!("point-of-interest lookup unavailable: {err}");
            return;
        }
    };

    for segment in segments.iter_mut().filter(|s| s.state.is_resting()) {
        match resolver.lookup_amenities(&segment.points) {
            Ok(names) => {
                debug!(
                    "found {} potential amenities near {} resting points",
                    names.len(),
                    segment.points.len()
                );
                segment.pois = Some(names);
            }
            Err(err) => {
                warn!("point-of-interest lookup failed, continuing without: {err}");
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};

    fn cluster(n: usize) -> Vec<TrackPoint> {
        let start = Utc.with_ymd_and_hms(2024, 5, 1, 8, 0, 0).unwrap();
        (0..n)
            .map(|i| {
                TrackPoint::new(48.2082, 16.3738, start + chrono::Duration::seconds(i as i64))
            })
            .collect()
    }

    #[test]
    fn test_build_query_shape() {
        let query = build_query(&cluster(2), &PoiConfig::default());
        assert!(query.starts_with("[out:json];"));
        assert!(query.contains("way[amenity](around:25,48.208200,16.373800,48.208200,16.373800)"));
        assert!(query.contains("node[amenity]"));
        assert!(query.ends_with("out body;"));
    }

    #[test]
    fn test_build_query_caps_coordinates() {
        let config = PoiConfig {
            max_query_coords: 3,
            ..PoiConfig::default()
        };
        let query = build_query(&cluster(50), &config);
        // radius + 3 coordinate pairs
        assert_eq!(query.matches("48.208200").count(), 6);
    }

    #[test]
    fn test_extract_names_from_canned_response() {
        let body = r#"{
            "elements": [
                {"type": "node", "id": 1, "tags": {"amenity": "cafe", "name": "Cafe Central"}},
                {"type": "way", "id": 2, "tags": {"amenity": "bank", "name": "Erste", "operator": "Erste Group"}},
                {"type": "node", "id": 3},
                {"type": "node", "id": 4, "tags": {"amenity": "bench"}}
            ]
        }"#;
        let response: OverpassResponse = serde_json::from_str(body).unwrap();
        let names = extract_names(response);
        assert_eq!(names, vec!["Cafe Central", "Erste", "Erste Group"]);
    }

    #[test]
    fn test_extract_names_empty_response() {
        let response: OverpassResponse = serde_json::from_str("{}").unwrap();
        assert!(extract_names(response).is_empty());
    }
}
