//! # Trip Segmenter
//!
//! Partitions a recorded GPS track into alternating segments of resting and
//! active travel, classifying active segments by travel mode (walking, cycling,
//! generic moving) from a rolling average speed.
//!
//! The core is the segmentation engine in [`segmentation`]: a duration-bounded
//! sliding window feeds a speed classifier, and a debounced state machine
//! confirms transitions and emits [`Segment`] records lazily. Everything else
//! (GPX parsing, the Overpass point-of-interest resolver, console/map/GPX
//! consumers) is thin glue around that engine.
//!
//! ## Features
//!
//! - **`http`** - Enable the Overpass client for point-of-interest lookups
//!
//! ## Quick Start
//!
//! ```rust
//! use chrono::{TimeZone, Utc};
//! use trip_segmenter::{segment_track, SegmentConfig, TrackPoint};
//!
//! let start = Utc.with_ymd_and_hms(2024, 5, 1, 8, 0, 0).unwrap();
//! let track: Vec<TrackPoint> = (0..300)
//!     .map(|i| {
//!         // ~1.2 m/s northward, one point per second
//!         let lat = 51.5074 + i as f64 * 1.2 / 111_320.0;
//!         TrackPoint::new(lat, -0.1278, start + chrono::Duration::seconds(i))
//!     })
//!     .collect();
//!
//! for segment in segment_track(&track, &SegmentConfig::default()) {
//!     println!("{} -> {} ({} points)", segment.state, segment.next_state, segment.points.len());
//! }
//! ```

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

// Unified error handling
pub mod error;
pub use error::{Result, TrackError};

// Geographic utilities (pairwise aggregation, centroid, OSM links)
pub mod geo_utils;
pub use geo_utils::TrackDelta;

// Speed bands and the speed -> travel state classifier
pub mod classify;
pub use classify::{SpeedBand, SpeedBands, TravelState};

// The trip segmentation engine (rolling window + debounced state machine)
pub mod segmentation;
pub use segmentation::{segment_track, Segment, SegmentConfig, Segmenter};

// GPX load/flatten and waypoint-history export
pub mod gpx_io;
pub use gpx_io::{flatten_points, history_gpx, load_gpx, load_track_points, write_history_gpx};

// Console reporter
pub mod report;

// Interactive map renderer
pub mod render;

// Overpass point-of-interest resolver
#[cfg(feature = "http")]
pub mod poi;
#[cfg(feature = "http")]
pub use poi::{annotate_segments, PoiConfig};

// ============================================================================
// Core Types
// ============================================================================

/// One timestamped GPS sample from a recorded track.
///
/// Immutable once parsed; the engine only ever copies points between its
/// internal buffers.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TrackPoint {
    pub latitude: f64,
    pub longitude: f64,
    /// Sample time (UTC).
    pub time: DateTime<Utc>,
    /// Instantaneous speed in m/s, when the recorder supplied one.
    pub speed: Option<f64>,
    /// Horizontal dilution of precision, when the recorder supplied one.
    pub hdop: Option<f64>,
}

impl TrackPoint {
    /// Create a new track point without vendor extras.
    pub fn new(latitude: f64, longitude: f64, time: DateTime<Utc>) -> Self {
        Self {
            latitude,
            longitude,
            time,
            speed: None,
            hdop: None,
        }
    }

    /// Check that the coordinates are finite and within WGS84 range.
    pub fn is_valid(&self) -> bool {
        self.latitude.is_finite()
            && self.longitude.is_finite()
            && self.latitude >= -90.0
            && self.latitude <= 90.0
            && self.longitude >= -180.0
            && self.longitude <= 180.0
    }
}
