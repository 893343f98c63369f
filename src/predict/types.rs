use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::predict::state::{PropagationState, Visibility};

/// Information about a single satellite from TLE
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SatelliteInfo {
    pub name: String,
    pub norad_id: u32,
    pub tle_source: String,
}

/// One instant of a pass, AOS to LOS.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PassSample {
    pub timestamp: DateTime<Utc>,
    pub position_km: [f64; 3],
    pub elevation_deg: f64,
    pub azimuth_deg: f64,
    pub footprint_km: f64,
    pub visibility: Visibility,
    pub range_km: f64,
    pub signal_delay_ms: f64,
    pub signal_loss_db: f64,
    pub doppler_shift_hz: f64,
}

/// Sampled geometry of one pass. Empty when no rise was found.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PassGeometry {
    pub samples: Vec<PassSample>,
    pub aos: Option<DateTime<Utc>>,
    pub los: Option<DateTime<Utc>>,
    pub max_elevation_deg: f64,
    pub orbit_number: u64,
}

impl PassGeometry {
    pub fn empty() -> Self {
        Self {
            samples: Vec::new(),
            aos: None,
            los: None,
            max_elevation_deg: 0.0,
            orbit_number: 0,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    /// Stale once `now` is past LOS. An empty pass is always stale.
    pub fn is_stale(&self, now: DateTime<Utc>) -> bool {
        match self.los {
            Some(los) => now > los,
            None => true,
        }
    }

    pub fn duration_seconds(&self) -> i64 {
        match (self.aos, self.los) {
            (Some(aos), Some(los)) => (los - aos).num_seconds(),
            _ => 0,
        }
    }
}

/// One ground-track point of a sampled revolution.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct OrbitPoint {
    pub timestamp: DateTime<Utc>,
    pub position_km: [f64; 3],
    pub latitude_deg: f64,
    pub longitude_deg: f64,
    pub elevation_deg: f64,
    pub azimuth_deg: f64,
    pub orbit_number: u64,
}

impl PassSample {
    pub fn from_state(state: &PropagationState, timestamp: DateTime<Utc>) -> Self {
        Self {
            timestamp,
            position_km: state.position_km,
            elevation_deg: state.elevation_deg,
            azimuth_deg: state.azimuth_deg,
            footprint_km: state.footprint_km,
            visibility: state.visibility,
            range_km: state.range_km,
            signal_delay_ms: state.signal_delay_ms,
            signal_loss_db: state.signal_loss_db,
            doppler_shift_hz: state.doppler_shift_hz,
        }
    }
}

impl OrbitPoint {
    pub fn from_state(state: &PropagationState, timestamp: DateTime<Utc>) -> Self {
        Self {
            timestamp,
            position_km: state.position_km,
            latitude_deg: state.latitude_deg,
            longitude_deg: state.longitude_deg,
            elevation_deg: state.elevation_deg,
            azimuth_deg: state.azimuth_deg,
            orbit_number: state.orbit_number,
        }
    }
}
