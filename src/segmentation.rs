//! The trip segmentation engine.
//!
//! Streams track points once, in order, through a duration-bounded rolling
//! window and a debounced state machine, lazily yielding a [`Segment`] each
//! time a change of travel state is confirmed.
//!
//! The engine is pure: no I/O happens inside it. Point-of-interest enrichment
//! of resting segments is a separate post-processing stage (see `poi`), so the
//! core stays testable without network access.

use std::collections::VecDeque;

use log::debug;
use serde::{Deserialize, Serialize};

use crate::classify::{SpeedBands, TravelState};
use crate::geo_utils::{compute_center, track_delta, TrackDelta};
use crate::TrackPoint;

/// Configuration for the segmentation engine.
///
/// One canonical default set; callers needing the historical alternative
/// thresholds construct the value explicitly.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SegmentConfig {
    /// Minimum rolling-window span, in seconds, before any classification
    /// decision is attempted. Default: 45.
    pub analysis_window_secs: f64,
    /// Number of consecutive points in a new candidate state required before
    /// the transition is confirmed. Default: 1.
    pub transition_debounce_points: u32,
    /// Speed band table for the classifier.
    pub bands: SpeedBands,
}

impl Default for SegmentConfig {
    fn default() -> Self {
        Self {
            analysis_window_secs: 45.0,
            transition_debounce_points: 1,
            bands: SpeedBands::default(),
        }
    }
}

/// A confirmed, contiguous run of points attributed to one travel state,
/// bounded by two confirmed transitions.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Segment {
    /// The state these points were attributed to.
    pub state: TravelState,
    /// Points belonging to the confirmed state, transition tail trimmed.
    /// Non-empty, chronologically ordered.
    pub points: Vec<TrackPoint>,
    /// The state the track transitioned into.
    pub next_state: TravelState,
    /// Amenity names near a resting cluster. `None` until filled in by
    /// `poi::annotate_segments` (or when lookup is disabled / not resting).
    pub pois: Option<Vec<String>>,
}

impl Segment {
    /// Pairwise distance/duration/speed aggregate over the segment's points.
    pub fn delta(&self) -> TrackDelta {
        track_delta(&self.points)
    }

    /// Centroid of the segment's points.
    pub fn center(&self) -> (f64, f64) {
        compute_center(&self.points)
    }
}

/// Run the segmentation engine over an ordered track.
///
/// Returns a lazy iterator; one logical pass over the input. A second
/// traversal re-invokes this constructor (independent instances are
/// independent state).
pub fn segment_track<'a>(points: &'a [TrackPoint], config: &SegmentConfig) -> Segmenter<'a> {
    Segmenter {
        remaining: points.iter(),
        config: config.clone(),
        window: VecDeque::new(),
        state_points: Vec::new(),
        state: TravelState::Resting,
        countdown: config.transition_debounce_points,
    }
}

/// Lazy segment iterator over one track traversal.
///
/// Holds the rolling window and the current-state buffer; neither is visible
/// except through the emitted [`Segment`]s.
pub struct Segmenter<'a> {
    remaining: std::slice::Iter<'a, TrackPoint>,
    config: SegmentConfig,
    window: VecDeque<TrackPoint>,
    state_points: Vec<TrackPoint>,
    state: TravelState,
    countdown: u32,
}

impl Iterator for Segmenter<'_> {
    type Item = Segment;

    fn next(&mut self) -> Option<Segment> {
        while let Some(&point) = self.remaining.next() {
            self.window.push_back(point);
            self.state_points.push(point);

            let delta = track_delta(&self.window);

            // Keep accumulating until the window spans the analysis duration.
            // No eviction yet: evicting from a cold window would pin its span
            // to one inter-point gap and it would never warm up. A
            // zero-duration aggregate (single point, duplicate timestamps)
            // lands here too, since its speed is defined as 0.
            if delta.duration < self.config.analysis_window_secs {
                continue;
            }

            let candidate = self.config.bands.classify(delta.speed);

            let confirmed = if candidate == self.state {
                // Transient agreement cancels any debounce in progress.
                self.countdown = self.config.transition_debounce_points;
                None
            } else {
                if self.countdown > 0 {
                    self.countdown -= 1;
                }
                (self.countdown == 0).then_some(candidate)
            };

            let segment = confirmed.map(|next_state| {
                // The last debounce points belong to the transition tail, not
                // the confirmed state. Never trim to empty: a segment always
                // carries at least its first point.
                let cut = self
                    .state_points
                    .len()
                    .saturating_sub(self.config.transition_debounce_points as usize)
                    .max(1);

                debug!(
                    "confirmed {} -> {} after {} points ({:.1} m in {:.0} s, {:.2} m/s)",
                    self.state, next_state, cut, delta.distance, delta.duration, delta.speed
                );

                let segment = Segment {
                    state: self.state,
                    points: self.state_points[..cut].to_vec(),
                    next_state,
                    pois: None,
                };

                // Re-seed the new state's buffer from the full window so the
                // following segment keeps the points that triggered the
                // transition as context.
                self.state = next_state;
                self.state_points = self.window.iter().copied().collect();
                self.countdown = self.config.transition_debounce_points;

                segment
            });

            // Slide the window forward by one point per input point.
            self.window.pop_front();

            if segment.is_some() {
                return segment;
            }
        }

        None
    }
}
