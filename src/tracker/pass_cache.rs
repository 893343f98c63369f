use std::rc::Rc;

use chrono::{DateTime, Duration, Utc};

use crate::predict::{find_pass, GroundStation, PassGeometry, PredictError, PropagationPort};
use crate::time::FINE_STEP_DAYS;

/// Memoised passes for one satellite.
///
/// `next` is the upcoming pass and is replaced once its LOS has gone by.
/// `by_time` holds passes requested for explicit times and only grows.
/// Entries are shared out as `Rc` and never modified after insertion.
#[derive(Default)]
pub struct PassCache {
    station: Option<GroundStation>,
    next: Option<Rc<PassGeometry>>,
    by_time: Vec<Rc<PassGeometry>>,
}

impl PassCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn next(&self) -> Option<Rc<PassGeometry>> {
        self.next.clone()
    }

    pub fn len(&self) -> usize {
        self.next.iter().count() + self.by_time.len()
    }

    pub fn next_pass<P: PropagationPort>(
        &mut self,
        engine: &mut P,
        station: &GroundStation,
        now: DateTime<Utc>,
    ) -> Result<Rc<PassGeometry>, PredictError> {
        self.reset_for(station);

        let mut start = now;
        if let Some(pass) = &self.next {
            if !pass.is_stale(now) {
                return Ok(pass.clone());
            }
            // The stored LOS is still above the horizon; search from past it.
            if let Some(los) = pass.los {
                start = start.max(los + fine_step());
            }
        }

        let pass = Rc::new(find_pass(engine, station, start)?);
        match pass.aos {
            Some(aos) => log::debug!("Next pass of {} at {}", engine.info().name, aos),
            None => log::debug!("No upcoming pass for {}", engine.info().name),
        }
        self.next = Some(pass.clone());
        Ok(pass)
    }

    /// Returns the cached pass whose AOS is exactly `time`, computing and
    /// storing a new one on a miss.
    pub fn pass_for_time<P: PropagationPort>(
        &mut self,
        engine: &mut P,
        station: &GroundStation,
        time: DateTime<Utc>,
    ) -> Result<Rc<PassGeometry>, PredictError> {
        self.reset_for(station);

        let hit = self
            .next
            .iter()
            .chain(self.by_time.iter())
            .find(|p| p.aos == Some(time));
        if let Some(pass) = hit {
            return Ok(pass.clone());
        }

        let pass = Rc::new(find_pass(engine, station, time)?);
        self.by_time.push(pass.clone());
        Ok(pass)
    }

    fn reset_for(&mut self, station: &GroundStation) {
        if self.station.as_ref() != Some(station) {
            if self.station.is_some() {
                log::debug!("Ground station changed, dropping {} cached passes", self.len());
            }
            self.next = None;
            self.by_time.clear();
            self.station = Some(*station);
        }
    }
}

fn fine_step() -> Duration {
    Duration::milliseconds((FINE_STEP_DAYS * 86_400_000.0).round() as i64)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::predict::testing::{SyntheticEngine, REFERENCE_DAYNUM};
    use crate::time;

    fn station() -> GroundStation {
        GroundStation::new(51.5, -0.1, 0.0).unwrap()
    }

    #[test]
    fn next_pass_is_reused_until_los() {
        let mut engine = SyntheticEngine::leo(REFERENCE_DAYNUM);
        let mut cache = PassCache::new();
        let now = time::from_daynum(REFERENCE_DAYNUM - 0.03);

        let first = cache.next_pass(&mut engine, &station(), now).unwrap();
        let searches = engine.rise_searches;
        let later = now + chrono::Duration::minutes(5);
        let second = cache.next_pass(&mut engine, &station(), later).unwrap();

        assert!(Rc::ptr_eq(&first, &second));
        assert_eq!(engine.rise_searches, searches);
        assert!(first.aos.unwrap() > now);
    }

    #[test]
    fn stale_pass_is_replaced_by_a_later_one() {
        let mut engine = SyntheticEngine::leo(REFERENCE_DAYNUM);
        let mut cache = PassCache::new();
        let now = time::from_daynum(REFERENCE_DAYNUM - 0.03);

        let first = cache.next_pass(&mut engine, &station(), now).unwrap();
        let after_los = first.los.unwrap() + chrono::Duration::minutes(1);
        let second = cache.next_pass(&mut engine, &station(), after_los).unwrap();

        assert!(!Rc::ptr_eq(&first, &second));
        assert!(second.aos.unwrap() > first.aos.unwrap());
        assert_eq!(second.orbit_number, first.orbit_number + 1);
    }

    #[test]
    fn pass_just_past_los_is_replaced_once_by_the_next_orbit() {
        let mut engine = SyntheticEngine::leo(REFERENCE_DAYNUM);
        let mut cache = PassCache::new();
        let now = time::from_daynum(REFERENCE_DAYNUM - 0.03);

        let first = cache.next_pass(&mut engine, &station(), now).unwrap();
        let just_after = first.los.unwrap() + chrono::Duration::milliseconds(1);
        let searches = engine.rise_searches;

        let second = cache.next_pass(&mut engine, &station(), just_after).unwrap();
        let third = cache.next_pass(&mut engine, &station(), just_after).unwrap();

        assert!(second.aos.unwrap() > first.aos.unwrap());
        assert_eq!(second.orbit_number, first.orbit_number + 1);
        assert!(Rc::ptr_eq(&second, &third));
        assert_eq!(engine.rise_searches, searches + 1);
    }

    #[test]
    fn pass_for_time_hits_on_exact_aos() {
        let mut engine = SyntheticEngine::leo(REFERENCE_DAYNUM);
        let mut cache = PassCache::new();
        let now = time::from_daynum(REFERENCE_DAYNUM - 0.03);

        let next = cache.next_pass(&mut engine, &station(), now).unwrap();
        let hit = cache
            .pass_for_time(&mut engine, &station(), next.aos.unwrap())
            .unwrap();
        assert!(Rc::ptr_eq(&next, &hit));
        assert_eq!(cache.len(), 1);

        let tomorrow = now + chrono::Duration::days(1);
        let miss = cache.pass_for_time(&mut engine, &station(), tomorrow).unwrap();
        assert!(miss.aos.unwrap() > tomorrow);
        assert_eq!(cache.len(), 2);

        let again = cache
            .pass_for_time(&mut engine, &station(), miss.aos.unwrap())
            .unwrap();
        assert!(Rc::ptr_eq(&miss, &again));
        assert_eq!(cache.len(), 2);
    }

    #[test]
    fn empty_pass_is_recomputed_every_call() {
        let mut engine = SyntheticEngine::never_visible(REFERENCE_DAYNUM);
        let mut cache = PassCache::new();
        let now = time::from_daynum(REFERENCE_DAYNUM);

        assert!(cache.next_pass(&mut engine, &station(), now).unwrap().is_empty());
        assert!(cache.next_pass(&mut engine, &station(), now).unwrap().is_empty());
        assert_eq!(engine.rise_searches, 2);
    }

    #[test]
    fn changing_station_drops_cached_passes() {
        let mut engine = SyntheticEngine::leo(REFERENCE_DAYNUM);
        let mut cache = PassCache::new();
        let now = time::from_daynum(REFERENCE_DAYNUM - 0.03);

        let first = cache.next_pass(&mut engine, &station(), now).unwrap();
        let elsewhere = GroundStation::new(40.0, -3.7, 650.0).unwrap();
        let second = cache.next_pass(&mut engine, &elsewhere, now).unwrap();
        assert!(!Rc::ptr_eq(&first, &second));
        assert_eq!(cache.len(), 1);
    }
}
