mod error;
mod events;
mod orbit;
mod pass_cache;
mod satellite;
mod status;

pub use error::TrackerError;
pub use events::{EventKind, EventThrottle, NextEvent, EVENT_REFRESH_TICKS};
pub use orbit::{OrbitSampler, SampleOutcome, CLOSURE_PADDING_SAMPLES, ORBIT_REFRESH_SECONDS};
pub use pass_cache::PassCache;
pub use satellite::{Satellite, Settings};
pub use status::{LogStatus, StatusSink};
