//! Console reporter: a textual travel summary of a segment history.

use std::io::{self, Write};

use chrono::{DateTime, Local, Utc};

use crate::geo_utils::osm_map_link;
use crate::Segment;

/// Write travel summaries and arrival/departure lines for every segment.
///
/// Active segments get a one-line travel summary; transitions between resting
/// and active states additionally get arrival/departure details with the
/// resting cluster's centroid, map link, and any resolved points of interest.
pub fn write_report<W: Write>(out: &mut W, segments: &[Segment]) -> io::Result<()> {
    for segment in segments {
        let (Some(first), Some(last)) = (segment.points.first(), segment.points.last()) else {
            continue;
        };
        let delta = segment.delta();

        if segment.state.is_active() {
            writeln!(
                out,
                "Traveled {:.0} m in {:.0} s at {:.2} m/s while {}.",
                delta.distance, delta.duration, delta.speed, segment.state
            )?;
        }

        if segment.state.is_active() && segment.next_state.is_resting() {
            writeln!(out)?;
            writeln!(
                out,
                "Arrived at ({:.5}, {:.5}) at {}",
                last.latitude,
                last.longitude,
                local(last.time)
            )?;
        } else if segment.state.is_resting() && segment.next_state.is_active() {
            writeln!(
                out,
                "Departed ({:.5}, {:.5}) at {} after {:.0} s. Points: {}. Jitter: {:.0} m.",
                first.latitude,
                first.longitude,
                local(last.time),
                delta.duration,
                segment.points.len(),
                delta.distance
            )?;
            let (lat, lon) = segment.center();
            writeln!(out, "Center: {lat:.6}, {lon:.6} -- {}", osm_map_link(lat, lon))?;
            match &segment.pois {
                Some(pois) if !pois.is_empty() => {
                    writeln!(out, "Potential POIs: {}", pois.join(", "))?
                }
                Some(_) => writeln!(out, "Potential POIs: none found")?,
                None => {}
            }
            writeln!(out)?;
        }
    }

    Ok(())
}

fn local(time: DateTime<Utc>) -> String {
    time.with_timezone(&Local).to_rfc3339()
}
