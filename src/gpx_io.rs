//! GPX input/output: track loading and the waypoint-history export.
//!
//! The engine only ever sees the flattened, ordered point sequence across all
//! tracks and segments, in file order.

use std::fs::File;
use std::io::{BufReader, BufWriter};
use std::path::Path;

use chrono::{DateTime, Utc};
use gpx::{Gpx, GpxVersion, Waypoint};
use log::warn;
use time::OffsetDateTime;

use crate::error::{Result, TrackError};
use crate::geo_utils::osm_map_link;
use crate::{Segment, TrackPoint};

/// Read and parse a GPX file.
pub fn load_gpx(path: &Path) -> Result<Gpx> {
    let file = File::open(path).map_err(|source| TrackError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    gpx::read(BufReader::new(file)).map_err(|e| TrackError::GpxParse(e.to_string()))
}

/// Flatten a parsed GPX document into the ordered point sequence the engine
/// consumes.
///
/// Points without a timestamp or with out-of-range coordinates are skipped
/// with a warning; the rest keep their file order.
pub fn flatten_points(gpx: &Gpx) -> Vec<TrackPoint> {
    let mut points = Vec::new();

    for track in &gpx.tracks {
        for segment in &track.segments {
            for waypoint in &segment.points {
                let Some(time) = waypoint.time else {
                    warn!("skipping track point without a timestamp");
                    continue;
                };
                let odt: OffsetDateTime = time.into();
                let Some(time) = DateTime::<Utc>::from_timestamp(
                    odt.unix_timestamp(),
                    odt.nanosecond(),
                ) else {
                    warn!("skipping track point with out-of-range timestamp");
                    continue;
                };

                let geo_point = waypoint.point();
                let mut point = TrackPoint::new(geo_point.y(), geo_point.x(), time);
                point.speed = waypoint.speed;
                point.hdop = waypoint.hdop;

                if !point.is_valid() {
                    warn!(
                        "skipping track point with invalid coordinates ({}, {})",
                        point.latitude, point.longitude
                    );
                    continue;
                }

                points.push(point);
            }
        }
    }

    points
}

/// Load a track file and return the flattened point sequence.
///
/// Fails if the file cannot be read or parsed, or if no timestamped points
/// remain after flattening.
pub fn load_track_points(path: &Path) -> Result<Vec<TrackPoint>> {
    let gpx = load_gpx(path)?;
    let points = flatten_points(&gpx);
    if points.is_empty() {
        return Err(TrackError::MissingTimestamps {
            path: path.to_path_buf(),
        });
    }
    Ok(points)
}

/// Build the waypoint-history document: one waypoint per resting segment at
/// the cluster centroid, timestamped at the segment start, carrying the
/// resting duration and a shareable map link.
pub fn history_gpx(segments: &[Segment]) -> Result<Gpx> {
    let mut gpx = Gpx {
        version: GpxVersion::Gpx11,
        creator: Some("trip-segmenter".to_string()),
        ..Gpx::default()
    };

    for segment in segments.iter().filter(|s| s.state.is_resting()) {
        let (lat, lon) = segment.center();
        let delta = segment.delta();
        let arrived = segment.points[0].time;

        let mut waypoint = Waypoint::new(geo::Point::new(lon, lat));
        waypoint.time = Some(to_gpx_time(arrived)?);
        waypoint.name = Some("Visit".to_string());
        waypoint.description = Some(format!("Rested for {:.0} seconds", delta.duration));
        waypoint.comment = Some(osm_map_link(lat, lon));
        gpx.waypoints.push(waypoint);
    }

    Ok(gpx)
}

/// Write the waypoint history for `segments` to a GPX file.
pub fn write_history_gpx(segments: &[Segment], path: &Path) -> Result<()> {
    let gpx = history_gpx(segments)?;
    let file = File::create(path).map_err(|source| TrackError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    gpx::write(&gpx, BufWriter::new(file)).map_err(|e| TrackError::GpxWrite(e.to_string()))
}

fn to_gpx_time(time: DateTime<Utc>) -> Result<gpx::Time> {
    let odt = OffsetDateTime::from_unix_timestamp(time.timestamp())
        .map_err(|e| TrackError::GpxWrite(e.to_string()))?;
    Ok(gpx::Time::from(odt))
}
