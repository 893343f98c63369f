use std::rc::Rc;

use chrono::{DateTime, Duration, NaiveTime, Utc};
use serde::Deserialize;

use crate::predict::{
    find_passes_between, FieldValue, GroundStation, OrbitPoint, PassGeometry, PredictError,
    PropagationPort, PropagationState, StateField,
};
use crate::time;
use crate::tracker::error::TrackerError;
use crate::tracker::events::{EventThrottle, NextEvent};
use crate::tracker::orbit::{OrbitSampler, SampleOutcome};
use crate::tracker::pass_cache::PassCache;
use crate::tracker::status::{LogStatus, StatusSink};

#[derive(Debug, Clone, Copy, Deserialize)]
pub struct Settings {
    /// Refresh next AOS/LOS periodically while ticking.
    #[serde(default = "default_calculate_events")]
    pub calculate_events: bool,
    /// Elevation above which the object counts as acquired.
    #[serde(default)]
    pub aos_elevation_deg: f64,
}

fn default_calculate_events() -> bool {
    true
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            calculate_events: default_calculate_events(),
            aos_elevation_deg: 0.0,
        }
    }
}

/// Tracking state of one satellite.
///
/// Live state, ground-track sampling and pass searches each run on their own
/// engine so the search loops never move the live engine in time.
pub struct Satellite<P: PropagationPort> {
    live: P,
    orbit_engine: P,
    pass_engine: P,
    current: Option<PropagationState>,
    orbit: OrbitSampler,
    events: EventThrottle,
    passes: PassCache,
    todays_passes: Option<Vec<PassGeometry>>,
    selected: bool,
    displaying: bool,
    orbit_requested: bool,
    status: Box<dyn StatusSink>,
}

impl<P: PropagationPort> Satellite<P> {
    /// All three engines start out configured for `station`, so queries made
    /// before the first tick answer for the right observer.
    pub fn new(
        mut live: P,
        mut orbit_engine: P,
        mut pass_engine: P,
        station: &GroundStation,
    ) -> Self {
        live.configure_ground_station(station);
        orbit_engine.configure_ground_station(station);
        pass_engine.configure_ground_station(station);
        Self {
            live,
            orbit_engine,
            pass_engine,
            current: None,
            orbit: OrbitSampler::new(),
            events: EventThrottle::default(),
            passes: PassCache::new(),
            todays_passes: None,
            selected: false,
            displaying: false,
            orbit_requested: false,
            status: Box::new(LogStatus),
        }
    }

    pub fn with_status(mut self, status: Box<dyn StatusSink>) -> Self {
        self.status = status;
        self
    }

    pub fn name(&self) -> &str {
        &self.live.info().name
    }

    pub fn catalog_number(&self) -> u32 {
        self.live.info().norad_id
    }

    pub fn selected(&self) -> bool {
        self.selected
    }

    pub fn set_selected(&mut self, selected: bool) {
        self.selected = selected;
    }

    pub fn toggle_selected(&mut self) -> bool {
        self.selected = !self.selected;
        self.selected
    }

    pub fn is_displaying(&self) -> bool {
        self.displaying
    }

    pub fn set_displaying(&mut self, displaying: bool) {
        self.displaying = displaying;
    }

    /// Ask for the ground track to be rebuilt on the next tick.
    pub fn request_orbit(&mut self) {
        self.orbit_requested = true;
    }

    pub fn current(&self) -> Option<&PropagationState> {
        self.current.as_ref()
    }

    pub fn get(&self, field: StateField) -> Option<FieldValue> {
        match field {
            StateField::NextAos => self.events.next_aos().map(FieldValue::Time),
            _ => self.current.as_ref()?.field(field),
        }
    }

    /// One periodic update. The steps run in order and a failing step is
    /// logged without stopping the ones after it.
    pub fn tick(&mut self, station: &GroundStation, now: DateTime<Utc>, settings: &Settings) {
        self.live.configure_ground_station(station);
        self.orbit_engine.configure_ground_station(station);

        let daynum = time::to_daynum(now);
        match self.live.evaluate_at(daynum) {
            Ok(state) => self.current = Some(state),
            Err(e) => log::warn!("Failed to evaluate {}: {}", self.name(), e),
        }

        if self.orbit_requested {
            if let Err(e) = self.calculate_orbit(station, now) {
                log::warn!("Failed to calculate orbit for {}: {}", self.name(), e);
            }
        }

        if settings.calculate_events {
            if let Err(e) = self.refresh_events(daynum) {
                log::warn!("Failed to refresh events for {}: {}", self.name(), e);
            }
        }

        if self.selected {
            if let Err(e) = self.passes.next_pass(&mut self.pass_engine, station, now) {
                log::warn!("Failed to find next pass for {}: {}", self.name(), e);
            }
        }
    }

    fn refresh_events(&mut self, daynum: f64) -> Result<(), PredictError> {
        if self.events.tick(&mut self.live, daynum)? {
            self.current = Some(self.live.evaluate_at(daynum)?);
        }
        Ok(())
    }

    pub fn calculate_orbit(
        &mut self,
        station: &GroundStation,
        now: DateTime<Utc>,
    ) -> Result<SampleOutcome, TrackerError> {
        self.orbit_requested = false;
        self.orbit
            .sample(&mut self.orbit_engine, station, now, self.status.as_ref())
    }

    pub fn orbit_track(&self) -> &[OrbitPoint] {
        self.orbit.points()
    }

    pub fn aos_happens(&self) -> bool {
        self.live.has_any_rise()
    }

    pub fn next_event(&self, settings: &Settings) -> NextEvent {
        NextEvent::resolve(
            self.aos_happens(),
            self.current.as_ref().map(|s| s.elevation_deg),
            settings.aos_elevation_deg,
            self.events.next_aos(),
            self.events.next_los(),
        )
    }

    /// The upcoming pass, recomputed only once the cached one has ended.
    pub fn get_next_pass(
        &mut self,
        station: &GroundStation,
        now: DateTime<Utc>,
    ) -> Result<Rc<PassGeometry>, PredictError> {
        self.passes.next_pass(&mut self.pass_engine, station, now)
    }

    /// The cached upcoming pass, if one has been computed.
    pub fn next_pass(&self) -> Option<Rc<PassGeometry>> {
        self.passes.next()
    }

    pub fn pass_for_time(
        &mut self,
        station: &GroundStation,
        time: DateTime<Utc>,
    ) -> Result<Rc<PassGeometry>, PredictError> {
        self.passes.pass_for_time(&mut self.pass_engine, station, time)
    }

    /// Passes with AOS on the UTC day of `now`.
    pub fn calculate_todays_passes(
        &mut self,
        station: &GroundStation,
        now: DateTime<Utc>,
    ) -> Result<&[PassGeometry], PredictError> {
        let start = now.date_naive().and_time(NaiveTime::MIN).and_utc();
        let end = start + Duration::days(1);
        let passes = find_passes_between(&mut self.pass_engine, station, start, end)?;
        log::debug!("{} has {} passes today", self.name(), passes.len());
        let stored = self.todays_passes.insert(passes);
        Ok(stored.as_slice())
    }

    pub fn todays_passes(&self) -> Option<&[PassGeometry]> {
        self.todays_passes.as_deref()
    }
}
