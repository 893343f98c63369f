use std::fmt;

use chrono::{DateTime, Utc};
use serde::Serialize;
use strum_macros::IntoStaticStr;

use crate::predict::{event_time, PredictError, PropagationPort};
use crate::time::DayNum;

/// Ticks between rise/set refreshes.
pub const EVENT_REFRESH_TICKS: u32 = 50;

/// Refreshes the next AOS/LOS once every [`EVENT_REFRESH_TICKS`] ticks.
pub struct EventThrottle {
    every: u32,
    counter: u32,
    next_aos: Option<DateTime<Utc>>,
    next_los: Option<DateTime<Utc>>,
}

impl Default for EventThrottle {
    fn default() -> Self {
        Self::new(EVENT_REFRESH_TICKS)
    }
}

impl EventThrottle {
    /// The counter starts full so the first tick refreshes.
    pub fn new(every: u32) -> Self {
        Self {
            every,
            counter: every,
            next_aos: None,
            next_los: None,
        }
    }

    pub fn next_aos(&self) -> Option<DateTime<Utc>> {
        self.next_aos
    }

    pub fn next_los(&self) -> Option<DateTime<Utc>> {
        self.next_los
    }

    /// Counts a tick and, when due, searches rise and set from `daynum`.
    ///
    /// Returns true when a search ran. The engine is then left at the found
    /// set time and must be evaluated again before its state is read.
    pub fn tick<P: PropagationPort>(
        &mut self,
        engine: &mut P,
        daynum: DayNum,
    ) -> Result<bool, PredictError> {
        self.counter += 1;
        if self.counter < self.every {
            return Ok(false);
        }
        self.counter = 0;

        engine.evaluate_at(daynum)?;
        self.next_aos = event_time(engine.find_next_rise()?).map(|d| engine.daynum_to_calendar(d));
        engine.evaluate_at(daynum)?;
        self.next_los = event_time(engine.find_next_set()?).map(|d| engine.daynum_to_calendar(d));
        log::debug!(
            "Events for {}: aos {:?}, los {:?}",
            engine.info().name,
            self.next_aos,
            self.next_los
        );
        Ok(true)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, IntoStaticStr)]
pub enum EventKind {
    #[strum(serialize = "AOS")]
    Aos,
    #[strum(serialize = "LOS")]
    Los,
    #[strum(serialize = "N/A")]
    NotAvailable,
    #[strum(serialize = "Never")]
    Never,
}

impl EventKind {
    pub fn description(&self) -> &'static str {
        match self {
            EventKind::Aos => "Acquisition Of Satellite",
            EventKind::Los => "Loss Of Satellite",
            EventKind::NotAvailable => "Not Available",
            EventKind::Never => "Never Visible",
        }
    }
}

/// The next event shown for a satellite.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NextEvent {
    pub event: EventKind,
    pub description: &'static str,
    pub time: Option<DateTime<Utc>>,
}

impl NextEvent {
    fn new(event: EventKind, time: Option<DateTime<Utc>>) -> Self {
        Self {
            event,
            description: event.description(),
            time,
        }
    }

    /// LOS while the object is above the acquisition elevation, AOS otherwise.
    pub fn resolve(
        aos_happens: bool,
        elevation_deg: Option<f64>,
        aos_elevation_deg: f64,
        next_aos: Option<DateTime<Utc>>,
        next_los: Option<DateTime<Utc>>,
    ) -> Self {
        if !aos_happens {
            return Self::new(EventKind::Never, None);
        }
        let up = elevation_deg.is_some_and(|el| el >= aos_elevation_deg);
        let (kind, time) = if up {
            (EventKind::Los, next_los)
        } else {
            (EventKind::Aos, next_aos)
        };
        match time {
            Some(t) => Self::new(kind, Some(t)),
            None => Self::new(EventKind::NotAvailable, None),
        }
    }
}

impl fmt::Display for NextEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label: &'static str = self.event.into();
        match self.time {
            Some(t) => write!(f, "{}: {}", label, t.format("%d %b %H:%M:%S")),
            None => f.write_str(label),
        }
    }
}
