use chrono::{DateTime, Utc};

use crate::predict::error::PredictError;
use crate::predict::ground_station::GroundStation;
use crate::predict::state::PropagationState;
use crate::predict::types::SatelliteInfo;
use crate::time::{self, DayNum};

/// Point-propagation engine driven by the tracker.
///
/// An engine is positioned in time by `evaluate_at`. `find_next_rise` and
/// `find_next_set` search forward from that position and leave the engine at
/// the event they found, so callers re-evaluate before reading state again.
/// Both return `0.0` when no event exists inside the engine's search horizon.
pub trait PropagationPort {
    fn info(&self) -> &SatelliteInfo;

    fn configure_ground_station(&mut self, station: &GroundStation);

    fn evaluate_at(&mut self, daynum: DayNum) -> Result<PropagationState, PredictError>;

    fn find_next_rise(&mut self) -> Result<DayNum, PredictError>;

    fn find_next_set(&mut self) -> Result<DayNum, PredictError>;

    /// False when the object can never rise above this station's horizon.
    fn has_any_rise(&self) -> bool;

    fn daynum_to_calendar(&self, daynum: DayNum) -> DateTime<Utc> {
        time::from_daynum(daynum)
    }
}

/// Treats the `0.0` sentinel and non-finite values as "no event".
pub fn event_time(daynum: DayNum) -> Option<DayNum> {
    if daynum == 0.0 || !daynum.is_finite() {
        None
    } else {
        Some(daynum)
    }
}
