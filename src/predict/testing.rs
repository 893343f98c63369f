//! Analytic stand-in for the SGP4 engine.
//!
//! Elevation follows `amplitude * cos(theta) - bias` with `theta` advancing
//! one turn per `period` days, so a pass is centred on every multiple of the
//! period after `pass_centre`. Orbit numbers roll over half a period away
//! from each pass centre.

use std::f64::consts::{PI, TAU};

use crate::predict::error::PredictError;
use crate::predict::ground_station::GroundStation;
use crate::predict::port::PropagationPort;
use crate::predict::state::{Ephemeris, PropagationState, Visibility};
use crate::predict::types::SatelliteInfo;
use crate::time::{self, DayNum};

/// Keeps event times strictly inside the pass.
const EVENT_NUDGE_DAYS: f64 = 1e-7;

pub struct SyntheticEngine {
    info: SatelliteInfo,
    pub station: Option<GroundStation>,
    pub period: f64,
    pub pass_centre: DayNum,
    pub amplitude: f64,
    pub bias: f64,
    pub horizon: f64,
    pub first_orbit: u64,
    pub daynum: DayNum,
    pub evaluations: usize,
    pub rise_searches: usize,
    pub set_searches: usize,
}

impl SyntheticEngine {
    /// 90 minute orbit with 20 degree, roughly 24 minute passes.
    pub fn leo(pass_centre: DayNum) -> Self {
        Self {
            info: SatelliteInfo {
                name: "TESTSAT".to_string(),
                norad_id: 99999,
                tle_source: "synthetic".to_string(),
            },
            station: None,
            period: 0.0625,
            pass_centre,
            amplitude: 60.0,
            bias: 40.0,
            horizon: 3.0,
            first_orbit: 1000,
            daynum: pass_centre,
            evaluations: 0,
            rise_searches: 0,
            set_searches: 0,
        }
    }

    pub fn never_visible(pass_centre: DayNum) -> Self {
        Self {
            bias: 80.0,
            ..Self::leo(pass_centre)
        }
    }

    pub fn theta(&self, daynum: DayNum) -> f64 {
        TAU * (daynum - self.pass_centre) / self.period
    }

    pub fn elevation(&self, daynum: DayNum) -> f64 {
        self.amplitude * self.theta(daynum).cos() - self.bias
    }

    fn half_width(&self) -> f64 {
        (self.bias / self.amplitude).acos()
    }

    fn to_daynum(&self, theta: f64) -> DayNum {
        self.pass_centre + theta * self.period / TAU
    }

    pub fn orbit_number(&self, daynum: DayNum) -> u64 {
        let revs = ((self.theta(daynum) + PI) / TAU).floor() as i64;
        (self.first_orbit as i64 + revs).max(0) as u64
    }

    fn next_rise_after(&self, daynum: DayNum) -> Option<DayNum> {
        let c = self.half_width();
        let theta = self.theta(daynum);
        let k = ((theta + c) / TAU).floor() + 1.0;
        let rise = self.to_daynum(TAU * k - c) + EVENT_NUDGE_DAYS;
        (rise - daynum <= self.horizon).then_some(rise)
    }
}

impl PropagationPort for SyntheticEngine {
    fn info(&self) -> &SatelliteInfo {
        &self.info
    }

    fn configure_ground_station(&mut self, station: &GroundStation) {
        self.station = Some(*station);
    }

    fn evaluate_at(&mut self, daynum: DayNum) -> Result<PropagationState, PredictError> {
        self.daynum = daynum;
        self.evaluations += 1;
        let theta = self.theta(daynum);
        let elevation = self.elevation(daynum);
        let range_km = 2500.0 - 30.0 * elevation;
        Ok(PropagationState {
            daynum,
            timestamp: time::from_daynum(daynum),
            elevation_deg: elevation,
            azimuth_deg: (theta.to_degrees()).rem_euclid(360.0),
            range_km,
            range_rate_km_s: -7.0 * theta.sin(),
            position_km: [6800.0 * theta.cos(), 6800.0 * theta.sin(), 0.0],
            latitude_deg: 51.0 * theta.sin(),
            longitude_deg: (theta.to_degrees() + 180.0).rem_euclid(360.0) - 180.0,
            altitude_km: 420.0,
            velocity_km_s: 7.66,
            footprint_km: 4537.0,
            visibility: Visibility::Daylight,
            signal_delay_ms: range_km / 299.792458,
            signal_loss_db: 140.0,
            doppler_shift_hz: 3000.0 * theta.sin(),
            orbit_number: self.orbit_number(daynum),
            orbital_phase: 128.0,
            ephemeris: Ephemeris::Sgp4,
            epoch: self.pass_centre,
        })
    }

    fn find_next_rise(&mut self) -> Result<DayNum, PredictError> {
        self.rise_searches += 1;
        if !self.has_any_rise() {
            return Ok(0.0);
        }
        match self.next_rise_after(self.daynum) {
            Some(rise) => {
                self.daynum = rise;
                Ok(rise)
            }
            None => Ok(0.0),
        }
    }

    fn find_next_set(&mut self) -> Result<DayNum, PredictError> {
        self.set_searches += 1;
        if !self.has_any_rise() {
            return Ok(0.0);
        }
        let c = self.half_width();
        let set = if self.elevation(self.daynum) >= 0.0 {
            let k = (self.theta(self.daynum) / TAU).round();
            self.to_daynum(TAU * k + c) - EVENT_NUDGE_DAYS
        } else {
            match self.next_rise_after(self.daynum) {
                Some(rise) => self.to_daynum(self.theta(rise) + 2.0 * c) - 2.0 * EVENT_NUDGE_DAYS,
                None => return Ok(0.0),
            }
        };
        self.daynum = set;
        Ok(set)
    }

    fn has_any_rise(&self) -> bool {
        self.bias < self.amplitude
    }
}

/// A daynum far from the engine epoch so sign changes are not involved.
pub const REFERENCE_DAYNUM: DayNum = 16_000.0;
