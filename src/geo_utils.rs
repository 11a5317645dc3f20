//! Geographic utilities for GPS track analysis.
//!
//! | Function | Description |
//! |----------|-------------|
//! | [`haversine_distance`] | Great-circle distance between two track points |
//! | [`track_delta`] | Pairwise distance / duration / mean speed over a point run |
//! | [`compute_center`] | Centroid of a point cluster |
//! | [`osm_map_link`] | Shareable openstreetmap.org marker link |
//!
//! All functions expect WGS84 coordinates (latitude/longitude in degrees).

use geo::{Distance, Haversine, Point};

use crate::TrackPoint;

/// Aggregate path statistics over a run of consecutive track points.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct TrackDelta {
    /// Total pairwise path distance in meters.
    pub distance: f64,
    /// Total elapsed time in seconds.
    pub duration: f64,
    /// Mean speed in m/s; 0.0 when the elapsed time is zero.
    pub speed: f64,
}

/// Calculate the great-circle distance between two track points in meters.
///
/// 2D only: elevation is ignored. The haversine implementation is the `geo`
/// crate's, treated here as a supplied primitive.
#[inline]
pub fn haversine_distance(a: &TrackPoint, b: &TrackPoint) -> f64 {
    let p1 = Point::new(a.longitude, a.latitude);
    let p2 = Point::new(b.longitude, b.latitude);
    Haversine::distance(p1, p2)
}

/// Accumulate pairwise distance, elapsed time, and mean speed over `points`.
///
/// Summing consecutive-point deltas (rather than endpoints only) lets local
/// back-and-forth jitter count towards the distance, which is what the rolling
/// average speed estimate wants. Empty and single-point input yield all zeros,
/// as does a run whose timestamps collapse to zero elapsed time — callers
/// treat that as "insufficient data", never as an error.
pub fn track_delta<'a, I>(points: I) -> TrackDelta
where
    I: IntoIterator<Item = &'a TrackPoint>,
{
    let mut total_distance = 0.0;
    let mut total_duration = 0.0;
    let mut prev: Option<&TrackPoint> = None;

    for point in points {
        if let Some(prev) = prev {
            total_distance += haversine_distance(prev, point);
            total_duration += (point.time - prev.time).num_milliseconds() as f64 / 1000.0;
        }
        prev = Some(point);
    }

    if total_duration <= 0.0 {
        return TrackDelta {
            distance: total_distance,
            duration: total_duration.max(0.0),
            speed: 0.0,
        };
    }

    TrackDelta {
        distance: total_distance,
        duration: total_duration,
        speed: total_distance / total_duration,
    }
}

/// Compute the centroid of a point cluster as the arithmetic mean of latitudes
/// and longitudes.
///
/// Not geodesically correct over large spans, but resting clusters are tight.
///
/// # Panics
///
/// Panics on empty input. The segmentation engine guarantees non-empty segment
/// buffers, so an empty cluster here is a caller bug, not a data condition.
pub fn compute_center(points: &[TrackPoint]) -> (f64, f64) {
    assert!(!points.is_empty(), "centroid requires at least one point");

    let sum_lat: f64 = points.iter().map(|p| p.latitude).sum();
    let sum_lon: f64 = points.iter().map(|p| p.longitude).sum();
    let n = points.len() as f64;

    (sum_lat / n, sum_lon / n)
}

/// Build a shareable openstreetmap.org link with a marker at the coordinate.
pub fn osm_map_link(latitude: f64, longitude: f64) -> String {
    format!(
        "https://www.openstreetmap.org/?mlat={latitude:.6}&mlon={longitude:.6}#map=19/{latitude:.6}/{longitude:.6}"
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, TimeZone, Utc};

    fn point_at(lat: f64, lon: f64, offset_secs: i64) -> TrackPoint {
        let start = Utc.with_ymd_and_hms(2024, 5, 1, 8, 0, 0).unwrap();
        TrackPoint::new(lat, lon, start + Duration::seconds(offset_secs))
    }

    #[test]
    fn test_haversine_distance_same_point() {
        let p = point_at(51.5074, -0.1278, 0);
        assert_eq!(haversine_distance(&p, &p), 0.0);
    }

    #[test]
    fn test_haversine_distance_known_value() {
        // London to Paris is approximately 344 km
        let london = point_at(51.5074, -0.1278, 0);
        let paris = point_at(48.8566, 2.3522, 0);
        let dist = haversine_distance(&london, &paris);
        assert!((dist - 343_560.0).abs() < 5_000.0);
    }

    #[test]
    fn test_track_delta_empty_and_single() {
        let empty: Vec<TrackPoint> = vec![];
        assert_eq!(track_delta(&empty), TrackDelta::default());
        let single = [point_at(51.5074, -0.1278, 0)];
        assert_eq!(track_delta(&single), TrackDelta::default());
    }

    #[test]
    fn test_track_delta_zero_duration_is_not_a_division() {
        // Two distinct coordinates sharing a timestamp: distance accumulates,
        // speed stays defined at zero.
        let points = [point_at(51.5074, -0.1278, 0), point_at(51.5080, -0.1278, 0)];
        let delta = track_delta(&points);
        assert!(delta.distance > 0.0);
        assert_eq!(delta.duration, 0.0);
        assert_eq!(delta.speed, 0.0);
    }

    #[test]
    fn test_track_delta_constant_speed() {
        // ~1 m/s northward, one point per second
        let points: Vec<TrackPoint> = (0..60)
            .map(|i| point_at(51.5 + i as f64 / 111_320.0, -0.1278, i))
            .collect();
        let delta = track_delta(&points);
        assert!((delta.duration - 59.0).abs() < 1e-9);
        assert!((delta.speed - 1.0).abs() < 0.05);
    }

    #[test]
    fn test_track_delta_counts_jitter() {
        // Out-and-back over the same two coordinates: endpoint displacement is
        // zero but the pairwise path distance is not.
        let points = [
            point_at(51.5000, -0.1278, 0),
            point_at(51.5001, -0.1278, 10),
            point_at(51.5000, -0.1278, 20),
        ];
        let delta = track_delta(&points);
        assert!(delta.distance > 20.0);
    }

    #[test]
    fn test_compute_center() {
        let points = [point_at(51.50, -0.10, 0), point_at(51.52, -0.12, 1)];
        let (lat, lon) = compute_center(&points);
        assert!((lat - 51.51).abs() < 1e-9);
        assert!((lon + 0.11).abs() < 1e-9);
    }

    #[test]
    #[should_panic(expected = "at least one point")]
    fn test_compute_center_empty_panics() {
        compute_center(&[]);
    }

    #[test]
    fn test_osm_map_link() {
        let link = osm_map_link(51.5074, -0.1278);
        assert!(link.starts_with("https://www.openstreetmap.org/?mlat=51.507400"));
        assert!(link.contains("#map=19/"));
    }
}
