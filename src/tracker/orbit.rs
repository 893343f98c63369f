use chrono::{DateTime, Utc};

use crate::predict::{GroundStation, OrbitPoint, PropagationPort};
use crate::time::{self, COARSE_STEP_DAYS, FINE_STEP_DAYS};
use crate::tracker::error::TrackerError;
use crate::tracker::status::StatusSink;

/// Minimum age of a ground track before it is rebuilt.
pub const ORBIT_REFRESH_SECONDS: i64 = 60;
/// Extra samples appended after the orbit-number boundary. Without them the
/// drawn track does not close; the cause is not understood.
pub const CLOSURE_PADDING_SAMPLES: usize = 20;
/// Ten days of coarse steps.
const MAX_COARSE_STEPS: usize = 2880;
/// Ten days of fine steps.
const MAX_FINE_STEPS: usize = 28_800;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SampleOutcome {
    Resampled(usize),
    Throttled,
}

/// Ground track of the current revolution.
pub struct OrbitSampler {
    points: Vec<OrbitPoint>,
    last_sampled: Option<DateTime<Utc>>,
    closure_padding: usize,
}

impl Default for OrbitSampler {
    fn default() -> Self {
        Self::new()
    }
}

impl OrbitSampler {
    pub fn new() -> Self {
        Self::with_closure_padding(CLOSURE_PADDING_SAMPLES)
    }

    pub fn with_closure_padding(closure_padding: usize) -> Self {
        Self {
            points: Vec::new(),
            last_sampled: None,
            closure_padding,
        }
    }

    pub fn points(&self) -> &[OrbitPoint] {
        &self.points
    }

    pub fn last_sampled(&self) -> Option<DateTime<Utc>> {
        self.last_sampled
    }

    /// Rebuilds the ground track for the revolution in progress at `now`.
    ///
    /// Requests within [`ORBIT_REFRESH_SECONDS`] of the last rebuild are
    /// ignored. The track runs from the orbit-number boundary at the start of
    /// the revolution to the next boundary, plus the closure padding.
    pub fn sample<P: PropagationPort>(
        &mut self,
        engine: &mut P,
        station: &GroundStation,
        now: DateTime<Utc>,
        status: &dyn StatusSink,
    ) -> Result<SampleOutcome, TrackerError> {
        let name = engine.info().name.clone();

        if let Some(last) = self.last_sampled {
            if (now - last).num_seconds() < ORBIT_REFRESH_SECONDS {
                status.update_info(&format!("Orbit request for {} ignored", name));
                return Ok(SampleOutcome::Throttled);
            }
        }

        status.update_info(&format!("Calculating orbit for {} started", name));
        engine.configure_ground_station(station);

        let mut daynum = time::to_daynum(now);
        let this_orbit = engine.evaluate_at(daynum)?.orbit_number;

        // Back up into the previous revolution.
        let mut steps = 0;
        loop {
            if steps == MAX_COARSE_STEPS {
                return Err(TrackerError::OrbitBoundaryNotFound(steps));
            }
            daynum -= COARSE_STEP_DAYS;
            steps += 1;
            if engine.evaluate_at(daynum)?.orbit_number != this_orbit {
                break;
            }
        }
        daynum += COARSE_STEP_DAYS;

        let mut points = Vec::new();
        loop {
            let state = engine.evaluate_at(daynum)?;
            if state.orbit_number != this_orbit {
                break;
            }
            points.push(OrbitPoint::from_state(&state, engine.daynum_to_calendar(daynum)));
            daynum += FINE_STEP_DAYS;
            if points.len() == MAX_FINE_STEPS {
                log::warn!("Orbit of {} did not end after {} samples", name, points.len());
                break;
            }
        }

        for _ in 0..self.closure_padding {
            let state = engine.evaluate_at(daynum)?;
            points.push(OrbitPoint::from_state(&state, engine.daynum_to_calendar(daynum)));
            daynum += FINE_STEP_DAYS;
        }

        let count = points.len();
        self.points = points;
        self.last_sampled = Some(now);
        status.update_info(&format!("Calculating orbit for {} complete", name));
        Ok(SampleOutcome::Resampled(count))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::predict::testing::{SyntheticEngine, REFERENCE_DAYNUM};
    use crate::tracker::status::LogStatus;
    use chrono::Duration;
    use std::cell::RefCell;

    fn station() -> GroundStation {
        GroundStation::new(51.5, -0.1, 0.0).unwrap()
    }

    #[test]
    fn track_covers_one_revolution_plus_padding() {
        let mut engine = SyntheticEngine::leo(REFERENCE_DAYNUM);
        let mut sampler = OrbitSampler::new();
        let now = time::from_daynum(REFERENCE_DAYNUM);

        let outcome = sampler.sample(&mut engine, &station(), now, &LogStatus).unwrap();
        let points = sampler.points();
        assert_eq!(outcome, SampleOutcome::Resampled(points.len()));

        let body = &points[..points.len() - CLOSURE_PADDING_SAMPLES];
        // 0.0625 day orbit, 0.00035 day steps, start up to one coarse step late.
        assert!((168..=179).contains(&body.len()), "{}", body.len());
        assert!(body.iter().all(|p| p.orbit_number == 1000));
        let padding = &points[points.len() - CLOSURE_PADDING_SAMPLES..];
        assert!(padding.iter().all(|p| p.orbit_number == 1001));

        for pair in points.windows(2) {
            assert!(pair[0].timestamp < pair[1].timestamp);
        }
    }

    #[test]
    fn repeated_request_within_a_minute_is_ignored() {
        let mut engine = SyntheticEngine::leo(REFERENCE_DAYNUM);
        let mut sampler = OrbitSampler::new();
        let messages = RefCell::new(Vec::new());
        let status = |m: &str| messages.borrow_mut().push(m.to_string());
        let now = time::from_daynum(REFERENCE_DAYNUM);

        sampler.sample(&mut engine, &station(), now, &status).unwrap();
        let before = sampler.points().to_vec();
        let evaluations = engine.evaluations;

        let soon = now + Duration::seconds(30);
        let outcome = sampler.sample(&mut engine, &station(), soon, &status).unwrap();
        assert_eq!(outcome, SampleOutcome::Throttled);
        assert_eq!(sampler.points(), &before[..]);
        assert_eq!(sampler.last_sampled(), Some(now));
        assert_eq!(engine.evaluations, evaluations);
        assert_eq!(
            messages.borrow().last().map(String::as_str),
            Some("Orbit request for TESTSAT ignored")
        );

        let later = now + Duration::seconds(61);
        let outcome = sampler.sample(&mut engine, &station(), later, &status).unwrap();
        assert!(matches!(outcome, SampleOutcome::Resampled(_)));
        assert_eq!(sampler.last_sampled(), Some(later));
    }

    #[test]
    fn padding_is_configurable() {
        let mut engine = SyntheticEngine::leo(REFERENCE_DAYNUM);
        let mut sampler = OrbitSampler::with_closure_padding(0);
        let now = time::from_daynum(REFERENCE_DAYNUM);
        sampler.sample(&mut engine, &station(), now, &LogStatus).unwrap();
        assert!(sampler.points().iter().all(|p| p.orbit_number == 1000));
    }

    #[test]
    fn missing_boundary_is_an_error() {
        let mut engine = SyntheticEngine::leo(REFERENCE_DAYNUM);
        // One revolution every thousand years.
        engine.period = 365_250.0;
        let mut sampler = OrbitSampler::new();
        let now = time::from_daynum(REFERENCE_DAYNUM);
        let result = sampler.sample(&mut engine, &station(), now, &LogStatus);
        assert!(matches!(result, Err(TrackerError::OrbitBoundaryNotFound(_))));
        assert!(sampler.points().is_empty());
        assert_eq!(sampler.last_sampled(), None);
    }
}
