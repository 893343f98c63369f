use std::fmt;

use chrono::{DateTime, Utc};
use serde::Serialize;
use strum_macros::{EnumIter, EnumString, IntoStaticStr};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Visibility {
    /// Sunlit satellite against a dark sky.
    Visible,
    /// Sunlit satellite, station in daylight.
    Daylight,
    /// Satellite in Earth's shadow.
    Eclipsed,
}

impl Visibility {
    pub fn as_char(&self) -> char {
        match self {
            Visibility::Visible => 'V',
            Visibility::Daylight => 'D',
            Visibility::Eclipsed => 'N',
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, IntoStaticStr)]
pub enum Ephemeris {
    #[strum(serialize = "SGP4")]
    Sgp4,
    #[strum(serialize = "SDP4")]
    Sdp4,
}

/// Instantaneous state produced by the propagation engine.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PropagationState {
    pub daynum: f64,
    pub timestamp: DateTime<Utc>,
    pub elevation_deg: f64,
    pub azimuth_deg: f64,
    pub range_km: f64,
    pub range_rate_km_s: f64,
    pub position_km: [f64; 3],
    pub latitude_deg: f64,
    pub longitude_deg: f64,
    pub altitude_km: f64,
    pub velocity_km_s: f64,
    pub footprint_km: f64,
    pub visibility: Visibility,
    pub signal_delay_ms: f64,
    pub signal_loss_db: f64,
    pub doppler_shift_hz: f64,
    pub orbit_number: u64,
    /// Position in the orbit scaled to 0..256.
    pub orbital_phase: f64,
    pub ephemeris: Ephemeris,
    /// TLE epoch as a daynum.
    pub epoch: f64,
}

/// Named fields a caller may look up on a satellite.
#[derive(Debug, Clone, Copy, PartialEq, Eq, EnumString, EnumIter, IntoStaticStr)]
#[strum(serialize_all = "snake_case")]
pub enum StateField {
    Elevation,
    Azimuth,
    Latitude,
    Longitude,
    Altitude,
    Velocity,
    Range,
    Footprint,
    Type,
    Visibility,
    #[strum(serialize = "rangerate")]
    RangeRate,
    #[strum(serialize = "orbitalphase")]
    OrbitalPhase,
    NextAos,
    X,
    Y,
    Z,
    #[strum(serialize = "epoc")]
    Epoch,
    #[strum(serialize = "orbitnumber")]
    OrbitNumber,
    #[strum(serialize = "signaldelay")]
    SignalDelay,
    #[strum(serialize = "signalloss")]
    SignalLoss,
    #[strum(serialize = "dopplershift")]
    DopplerShift,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum FieldValue {
    Number(f64),
    Integer(u64),
    Text(String),
    Time(DateTime<Utc>),
}

impl fmt::Display for FieldValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FieldValue::Number(v) => write!(f, "{:.3}", v),
            FieldValue::Integer(v) => write!(f, "{}", v),
            FieldValue::Text(v) => f.write_str(v),
            FieldValue::Time(v) => write!(f, "{}", v.to_rfc3339()),
        }
    }
}

impl PropagationState {
    /// Looks up a field held by the engine state. `NextAos` is owned by the
    /// controller and yields `None` here.
    pub fn field(&self, field: StateField) -> Option<FieldValue> {
        use FieldValue::*;
        let value = match field {
            StateField::Elevation => Number(self.elevation_deg),
            StateField::Azimuth => Number(self.azimuth_deg),
            StateField::Latitude => Number(self.latitude_deg),
            StateField::Longitude => Number(self.longitude_deg),
            StateField::Altitude => Number(self.altitude_km),
            StateField::Velocity => Number(self.velocity_km_s),
            StateField::Range => Number(self.range_km),
            StateField::Footprint => Number(self.footprint_km),
            StateField::Type => {
                let name: &'static str = self.ephemeris.into();
                Text(name.to_string())
            }
            StateField::Visibility => Text(self.visibility.as_char().to_string()),
            StateField::RangeRate => Number(self.range_rate_km_s),
            StateField::OrbitalPhase => Number(self.orbital_phase),
            StateField::NextAos => return None,
            StateField::X => Number(self.position_km[0]),
            StateField::Y => Number(self.position_km[1]),
            StateField::Z => Number(self.position_km[2]),
            StateField::Epoch => Number(self.epoch),
            StateField::OrbitNumber => Integer(self.orbit_number),
            StateField::SignalDelay => Number(self.signal_delay_ms),
            StateField::SignalLoss => Number(self.signal_loss_db),
            StateField::DopplerShift => Number(self.doppler_shift_hz),
        };
        Some(value)
    }
}
