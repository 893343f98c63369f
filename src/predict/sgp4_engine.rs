use serde::Deserialize;
use sgp4::{Constants, Elements};

use crate::predict::error::PredictError;
use crate::predict::geometry::{
    self, doppler_shift_hz, footprint_km, free_space_loss_db, look_angles, signal_delay_ms,
    teme_to_ecef_position, teme_to_ecef_velocity,
};
use crate::predict::ground_station::{GroundStation, EARTH_RADIUS_KM};
use crate::predict::port::PropagationPort;
use crate::predict::state::{Ephemeris, PropagationState, Visibility};
use crate::predict::types::SatelliteInfo;
use crate::time::{self, DayNum};

const COARSE_STEP_SECONDS: f64 = 60.0; // 1 minute for initial scan
const FINE_STEP_SECONDS: f64 = 1.0; // 1 second for refinement
const HORIZON_ELEVATION: f64 = 0.0;
const DEEP_SPACE_PERIOD_MINUTES: f64 = 225.0;
const ASTRONOMICAL_DUSK_DEG: f64 = -12.0;

#[derive(Debug, Clone, Copy, Deserialize)]
pub struct EngineConfig {
    /// How far ahead rise/set searches look, in days.
    #[serde(default = "default_search_horizon_days")]
    pub search_horizon_days: f64,
    /// Carrier used for signal loss and Doppler shift.
    #[serde(default = "default_reference_frequency_hz")]
    pub reference_frequency_hz: f64,
}

fn default_search_horizon_days() -> f64 {
    3.0
}

fn default_reference_frequency_hz() -> f64 {
    145_800_000.0
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            search_horizon_days: default_search_horizon_days(),
            reference_frequency_hz: default_reference_frequency_hz(),
        }
    }
}

/// SGP4/SDP4 point propagator for one satellite and one ground station.
pub struct Sgp4Engine {
    info: SatelliteInfo,
    elements: Elements,
    constants: Constants,
    config: EngineConfig,
    station: GroundStation,
    epoch: DayNum,
    daynum: DayNum,
}

impl Sgp4Engine {
    pub fn new(
        info: SatelliteInfo,
        elements: Elements,
        config: EngineConfig,
    ) -> Result<Self, PredictError> {
        let constants = Constants::from_elements(&elements).map_err(|e| PredictError::InvalidTle {
            file: info.tle_source.clone(),
            message: e.to_string(),
        })?;
        let epoch = time::to_daynum(elements.datetime.and_utc());
        Ok(Self {
            info,
            elements,
            constants,
            config,
            station: GroundStation::default(),
            epoch,
            daynum: epoch,
        })
    }

    fn compute(&self, daynum: DayNum) -> Result<PropagationState, PredictError> {
        let timestamp = time::from_daynum(daynum);
        let naive = timestamp.naive_utc();
        let minutes = self
            .elements
            .datetime_to_minutes_since_epoch(&naive)
            .map_err(|e| PredictError::Propagation(e.to_string()))?;
        let prediction = self
            .constants
            .propagate(minutes)
            .map_err(|e| PredictError::Propagation(e.to_string()))?;

        let gmst = sgp4::iau_epoch_to_sidereal_time(sgp4::julian_years_since_j2000(&naive));
        let sat_ecef = teme_to_ecef_position(prediction.position, gmst);
        let sat_vel_ecef = teme_to_ecef_velocity(prediction.position, prediction.velocity, gmst);

        let look = look_angles(&self.station, sat_ecef);
        let rel_vel = geometry::sub(sat_vel_ecef, self.station.velocity_ecef_km_s());
        let range_rate_km_s = geometry::dot(rel_vel, look.los_unit);

        let (latitude_deg, longitude_deg, altitude_km) = geometry::ecef_to_geodetic(sat_ecef);
        let freq = self.config.reference_frequency_hz;

        Ok(PropagationState {
            daynum,
            timestamp,
            elevation_deg: look.elevation_deg,
            azimuth_deg: look.azimuth_deg,
            range_km: look.range_km,
            range_rate_km_s,
            position_km: prediction.position,
            latitude_deg,
            longitude_deg,
            altitude_km,
            velocity_km_s: geometry::norm(prediction.velocity),
            footprint_km: footprint_km(altitude_km),
            visibility: self.visibility(daynum, prediction.position, gmst),
            signal_delay_ms: signal_delay_ms(look.range_km),
            signal_loss_db: free_space_loss_db(look.range_km, freq),
            doppler_shift_hz: doppler_shift_hz(freq, range_rate_km_s),
            orbit_number: self.orbit_number(daynum),
            orbital_phase: self.orbital_phase(daynum),
            ephemeris: self.ephemeris(),
            epoch: self.epoch,
        })
    }

    fn visibility(&self, daynum: DayNum, sat_teme: [f64; 3], gmst: f64) -> Visibility {
        let sun = geometry::sun_position_eci_km(time::to_julian_date(daynum));
        if geometry::is_eclipsed(sat_teme, sun) {
            return Visibility::Eclipsed;
        }
        let sun_look = look_angles(&self.station, teme_to_ecef_position(sun, gmst));
        if sun_look.elevation_deg <= ASTRONOMICAL_DUSK_DEG {
            Visibility::Visible
        } else {
            Visibility::Daylight
        }
    }

    /// Revolution count from the TLE, advanced by elapsed mean motion.
    fn orbit_number(&self, daynum: DayNum) -> u64 {
        let age = daynum - self.epoch;
        let revs = (self.elements.mean_motion + age * self.elements.drag_term) * age
            + self.elements.mean_anomaly / 360.0;
        let number = revs.floor() as i64 + self.elements.revolution_number as i64;
        number.max(0) as u64
    }

    fn orbital_phase(&self, daynum: DayNum) -> f64 {
        let age = daynum - self.epoch;
        let mean_anomaly =
            (self.elements.mean_anomaly + 360.0 * self.elements.mean_motion * age).rem_euclid(360.0);
        mean_anomaly * 256.0 / 360.0
    }

    fn ephemeris(&self) -> Ephemeris {
        if 1440.0 / self.elements.mean_motion >= DEEP_SPACE_PERIOD_MINUTES {
            Ephemeris::Sdp4
        } else {
            Ephemeris::Sgp4
        }
    }

    fn is_above(&self, daynum: DayNum) -> Result<bool, PredictError> {
        Ok(self.compute(daynum)?.elevation_deg >= HORIZON_ELEVATION)
    }

    /// Scan forward for a horizon crossing, then bisect to the fine step.
    /// Rising crossings return the first instant above the horizon, setting
    /// crossings the last.
    fn find_crossing(&self, from: DayNum, rising: bool) -> Result<Option<DayNum>, PredictError> {
        let coarse = time::seconds_to_days(COARSE_STEP_SECONDS);
        let end = from + self.config.search_horizon_days;

        let mut prev = from;
        let mut prev_above = self.is_above(from)?;
        while prev < end {
            let cursor = (prev + coarse).min(end);
            let above = self.is_above(cursor)?;
            if rising && above && !prev_above {
                return self.refine_crossing(prev, cursor, true).map(Some);
            }
            if !rising && !above && prev_above {
                return self.refine_crossing(prev, cursor, false).map(Some);
            }
            prev = cursor;
            prev_above = above;
        }
        Ok(None)
    }

    fn refine_crossing(
        &self,
        before: DayNum,
        after: DayNum,
        rising: bool,
    ) -> Result<DayNum, PredictError> {
        let fine = time::seconds_to_days(FINE_STEP_SECONDS);
        let mut low = before;
        let mut high = after;

        while high - low > fine {
            let mid = low + (high - low) / 2.0;
            let above = self.is_above(mid)?;
            if above == rising {
                high = mid;
            } else {
                low = mid;
            }
        }

        Ok(if rising { high } else { low })
    }
}

impl PropagationPort for Sgp4Engine {
    fn info(&self) -> &SatelliteInfo {
        &self.info
    }

    fn configure_ground_station(&mut self, station: &GroundStation) {
        self.station = *station;
    }

    fn evaluate_at(&mut self, daynum: DayNum) -> Result<PropagationState, PredictError> {
        let state = self.compute(daynum)?;
        self.daynum = daynum;
        Ok(state)
    }

    fn find_next_rise(&mut self) -> Result<DayNum, PredictError> {
        if !self.has_any_rise() {
            return Ok(0.0);
        }
        match self.find_crossing(self.daynum, true)? {
            Some(aos) => {
                self.daynum = aos;
                Ok(aos)
            }
            None => Ok(0.0),
        }
    }

    fn find_next_set(&mut self) -> Result<DayNum, PredictError> {
        if !self.has_any_rise() {
            return Ok(0.0);
        }
        let from = if self.is_above(self.daynum)? {
            self.daynum
        } else {
            match self.find_crossing(self.daynum, true)? {
                Some(aos) => aos,
                None => return Ok(0.0),
            }
        };
        match self.find_crossing(from, false)? {
            Some(los) => {
                self.daynum = los;
                Ok(los)
            }
            None => Ok(0.0),
        }
    }

    fn has_any_rise(&self) -> bool {
        let mut inclination = self.elements.inclination;
        if inclination >= 90.0 {
            inclination = 180.0 - inclination;
        }
        let semi_major_axis = 331.25 * (1440.0 / self.elements.mean_motion).powf(2.0 / 3.0);
        let apogee = semi_major_axis * (1.0 + self.elements.eccentricity) - EARTH_RADIUS_KM;
        let reach = (EARTH_RADIUS_KM / (apogee + EARTH_RADIUS_KM)).acos() + inclination.to_radians();
        reach > self.station.lat_rad().abs()
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;

    pub const ISS_TLE: &str = "ISS (ZARYA)
1 25544U 98067A   20194.88612269 -.00002218  00000-0 -31515-4 0  9992
2 25544  51.6461 221.2784 0001413  89.1723 280.4612 15.49507896236008";

    pub fn iss_engine() -> Sgp4Engine {
        let lines: Vec<&str> = ISS_TLE.lines().collect();
        let elements = Elements::from_tle(
            Some(lines[0].to_string()),
            lines[1].as_bytes(),
            lines[2].as_bytes(),
        )
        .unwrap();
        let info = SatelliteInfo {
            name: lines[0].to_string(),
            norad_id: 25544,
            tle_source: "test".to_string(),
        };
        Sgp4Engine::new(info, elements, EngineConfig::default()).unwrap()
    }

    fn london() -> GroundStation {
        GroundStation::new(51.5, -0.1, 0.0).unwrap()
    }

    #[test]
    fn state_at_epoch_is_low_earth_orbit() {
        let mut engine = iss_engine();
        engine.configure_ground_station(&london());
        let epoch = engine.epoch;
        let state = engine.evaluate_at(epoch).unwrap();
        assert!((350.0..500.0).contains(&state.altitude_km));
        assert!((7.0..8.0).contains(&state.velocity_km_s));
        assert!(state.latitude_deg.abs() <= 52.0);
        assert_eq!(state.ephemeris, Ephemeris::Sgp4);
        assert_eq!(state.orbit_number, 23600);
    }

    #[test]
    fn rise_then_set_brackets_a_pass() {
        let mut engine = iss_engine();
        engine.configure_ground_station(&london());
        let start = engine.epoch;
        engine.evaluate_at(start).unwrap();

        let aos = engine.find_next_rise().unwrap();
        assert!(aos > start);
        assert!(engine.evaluate_at(aos).unwrap().elevation_deg >= 0.0);

        let los = engine.find_next_set().unwrap();
        assert!(los > aos);
        assert!(los - aos < 0.02);
        assert!(engine.evaluate_at(los).unwrap().elevation_deg >= 0.0);
    }

    #[test]
    fn polar_station_never_sees_the_iss() {
        let mut engine = iss_engine();
        engine.configure_ground_station(&GroundStation::new(89.0, 0.0, 0.0).unwrap());
        assert!(!engine.has_any_rise());
        let epoch = engine.epoch;
        engine.evaluate_at(epoch).unwrap();
        assert_eq!(engine.find_next_rise().unwrap(), 0.0);
    }

    #[test]
    fn orbit_number_advances_once_per_revolution() {
        let mut engine = iss_engine();
        let epoch = engine.epoch;
        let first = engine.evaluate_at(epoch).unwrap().orbit_number;
        let period_days = 1.0 / 15.49507896;
        let later = engine.evaluate_at(epoch + period_days).unwrap().orbit_number;
        assert_eq!(later, first + 1);
    }
}
