//! Speed bands and the average-speed travel-state classifier.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Discrete travel state attributed to a run of track points.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TravelState {
    /// Stationary (GPS jitter only).
    Resting,
    Walking,
    Cycling,
    /// Generic movement that matched no named band.
    Moving,
}

impl TravelState {
    pub fn is_resting(self) -> bool {
        matches!(self, TravelState::Resting)
    }

    pub fn is_active(self) -> bool {
        !self.is_resting()
    }

    /// Lowercase state name for console and log output.
    pub fn name(self) -> &'static str {
        match self {
            TravelState::Resting => "resting",
            TravelState::Walking => "walking",
            TravelState::Cycling => "cycling",
            TravelState::Moving => "moving",
        }
    }
}

impl fmt::Display for TravelState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// An inclusive speed interval `[min, max]` in meters per second.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SpeedBand {
    pub min: f64,
    pub max: f64,
}

impl SpeedBand {
    pub const fn new(min: f64, max: f64) -> Self {
        Self { min, max }
    }

    /// Inclusive membership on both edges.
    #[inline]
    pub fn contains(&self, speed: f64) -> bool {
        speed >= self.min && speed <= self.max
    }
}

/// The ordered band table mapping average speed to [`TravelState`].
///
/// Bands are evaluated in fixed priority order — resting, walking, cycling —
/// and the first inclusive match wins, so a speed exactly on a shared edge
/// belongs to the earlier-listed band. Anything unmatched is generic
/// [`TravelState::Moving`].
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SpeedBands {
    pub resting: SpeedBand,
    pub walking: SpeedBand,
    pub cycling: SpeedBand,
    /// Driving/motorcycling range. Carried in configuration but not consulted
    /// by [`classify`](SpeedBands::classify): speeds above the cycling band
    /// report as [`TravelState::Moving`]. Whether to wire this in as a fourth
    /// band is an open question inherited from the threshold tables.
    pub motoring: SpeedBand,
}

impl Default for SpeedBands {
    fn default() -> Self {
        Self {
            resting: SpeedBand::new(0.0, 0.2),
            // https://en.wikipedia.org/wiki/Preferred_walking_speed
            walking: SpeedBand::new(0.2, 1.5),
            // https://en.wikipedia.org/wiki/Bicycle_performance#Energy_efficiency
            cycling: SpeedBand::new(1.5, 15.0),
            motoring: SpeedBand::new(30_000.0 / 3600.0, 120_000.0 / 3600.0),
        }
    }
}

impl SpeedBands {
    /// Classify an average speed (m/s, non-negative) into a travel state.
    ///
    /// Pure and total: every non-negative input maps to exactly one state.
    pub fn classify(&self, speed: f64) -> TravelState {
        if self.resting.contains(speed) {
            return TravelState::Resting;
        }
        if self.walking.contains(speed) {
            return TravelState::Walking;
        }
        if self.cycling.contains(speed) {
            return TravelState::Cycling;
        }

        TravelState::Moving
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_classify_defaults() {
        let bands = SpeedBands::default();
        assert_eq!(bands.classify(0.0), TravelState::Resting);
        assert_eq!(bands.classify(0.1), TravelState::Resting);
        assert_eq!(bands.classify(1.0), TravelState::Walking);
        assert_eq!(bands.classify(4.0), TravelState::Cycling);
        assert_eq!(bands.classify(25.0), TravelState::Moving);
    }

    #[test]
    fn test_shared_edge_belongs_to_earlier_band() {
        let bands = SpeedBands::default();
        assert_eq!(bands.classify(0.2), TravelState::Resting);
        assert_eq!(bands.classify(1.5), TravelState::Walking);
        assert_eq!(bands.classify(15.0), TravelState::Cycling);
    }

    #[test]
    fn test_motoring_band_is_not_consulted() {
        let bands = SpeedBands::default();
        // 20 m/s = 72 km/h sits inside the configured motoring band but still
        // classifies as generic moving.
        assert!(bands.motoring.contains(20.0));
        assert_eq!(bands.classify(20.0), TravelState::Moving);
    }

    #[test]
    fn test_state_predicates() {
        assert!(TravelState::Resting.is_resting());
        assert!(!TravelState::Resting.is_active());
        assert!(TravelState::Walking.is_active());
        assert_eq!(TravelState::Cycling.to_string(), "cycling");
    }
}
