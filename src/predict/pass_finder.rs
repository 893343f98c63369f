use chrono::{DateTime, Utc};

use crate::predict::error::PredictError;
use crate::predict::port::{event_time, PropagationPort};
use crate::predict::types::{PassGeometry, PassSample};
use crate::predict::GroundStation;
use crate::time::{self, FINE_STEP_DAYS, HORIZON_BACKOFF_DAYS};

/// Ten days of back-off; beyond this the object is treated as never setting.
const MAX_BACKOFF_STEPS: usize = 1440;
/// Two days of 30 second samples.
const MAX_PASS_SAMPLES: usize = 5760;
const MAX_PASSES_PER_WINDOW: usize = 64;

/// Find and sample the next pass at or after `start`.
///
/// If the object is already up at `start` the search backs off until it is
/// below the horizon, so the pass in progress is the one returned. A missing
/// rise yields an empty [`PassGeometry`], not an error.
pub fn find_pass<P: PropagationPort>(
    engine: &mut P,
    station: &GroundStation,
    start: DateTime<Utc>,
) -> Result<PassGeometry, PredictError> {
    engine.configure_ground_station(station);

    let mut daynum = time::to_daynum(start);
    let mut state = engine.evaluate_at(daynum)?;
    let mut backoff = 0;
    while state.elevation_deg >= 0.0 {
        if backoff == MAX_BACKOFF_STEPS {
            log::warn!("{} never dropped below the horizon", engine.info().name);
            return Ok(PassGeometry::empty());
        }
        daynum -= HORIZON_BACKOFF_DAYS;
        state = engine.evaluate_at(daynum)?;
        backoff += 1;
    }

    let Some(aos) = event_time(engine.find_next_rise()?) else {
        log::debug!("No rise found for {} after {}", engine.info().name, start);
        return Ok(PassGeometry::empty());
    };
    // A missing set collapses the pass onto its rise instant.
    let los = event_time(engine.find_next_set()?).unwrap_or(aos).max(aos);

    let mut samples = Vec::new();
    let mut orbit_number = 0;
    let mut cursor = aos;
    loop {
        let state = engine.evaluate_at(cursor)?;
        if samples.is_empty() {
            orbit_number = state.orbit_number;
        } else if state.elevation_deg < 0.0 {
            break;
        }
        samples.push(PassSample::from_state(&state, engine.daynum_to_calendar(cursor)));
        if cursor >= los || samples.len() >= MAX_PASS_SAMPLES {
            break;
        }
        cursor = (cursor + FINE_STEP_DAYS).min(los);
    }

    let max_elevation_deg = samples
        .iter()
        .map(|s| s.elevation_deg)
        .fold(f64::NEG_INFINITY, f64::max);

    Ok(PassGeometry {
        samples,
        aos: Some(engine.daynum_to_calendar(aos)),
        los: Some(engine.daynum_to_calendar(los)),
        max_elevation_deg,
        orbit_number,
    })
}

/// All passes whose AOS falls in `[start, end)`.
pub fn find_passes_between<P: PropagationPort>(
    engine: &mut P,
    station: &GroundStation,
    start: DateTime<Utc>,
    end: DateTime<Utc>,
) -> Result<Vec<PassGeometry>, PredictError> {
    let step = chrono::Duration::milliseconds((FINE_STEP_DAYS * 86_400_000.0) as i64);
    let mut passes: Vec<PassGeometry> = Vec::new();
    let mut cursor = start;

    while cursor < end && passes.len() < MAX_PASSES_PER_WINDOW {
        let pass = find_pass(engine, station, cursor)?;
        let (Some(aos), Some(los)) = (pass.aos, pass.los) else {
            break;
        };
        if aos >= end {
            break;
        }
        if aos < start {
            // Began before the window opened.
            cursor = los + step;
            continue;
        }
        if passes.last().and_then(|p| p.aos).is_some_and(|prev| aos <= prev) {
            // Still inside the previous pass; move on.
            cursor += step;
            continue;
        }
        cursor = los + step;
        passes.push(pass);
    }

    Ok(passes)
}
