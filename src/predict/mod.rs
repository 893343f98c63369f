mod error;
mod geometry;
mod ground_station;
mod pass_finder;
mod port;
mod sgp4_engine;
mod state;
mod tle_loader;
mod types;

#[cfg(test)]
pub mod testing;

pub use error::PredictError;
pub use ground_station::GroundStation;
pub use pass_finder::{find_pass, find_passes_between};
pub use port::{event_time, PropagationPort};
pub use sgp4_engine::{EngineConfig, Sgp4Engine};
pub use state::{Ephemeris, FieldValue, PropagationState, StateField, Visibility};
pub use tle_loader::{TleEntry, TleLoader};
pub use types::{OrbitPoint, PassGeometry, PassSample, SatelliteInfo};
