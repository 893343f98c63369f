use chrono::{DateTime, Utc};

/// Unix milliseconds at daynum 0 (1979-12-31T00:00:00Z).
const DAYNUM_EPOCH_MS: i64 = 315_446_400_000;
const MS_PER_DAY: f64 = 86_400_000.0;
/// Julian date of daynum 0.
const DAYNUM_EPOCH_JD: f64 = 2_444_238.5;

/// Back-off used to get below the horizon before a rise search (~10 minutes).
pub const HORIZON_BACKOFF_DAYS: f64 = 0.007;
/// Coarse orbit-boundary step (~5 minutes).
pub const COARSE_STEP_DAYS: f64 = 0.0035;
/// Fine sampling step for passes and ground tracks (~30 seconds).
pub const FINE_STEP_DAYS: f64 = 0.00035;

/// Fractional days since the engine epoch.
pub type DayNum = f64;

pub fn to_daynum(time: DateTime<Utc>) -> DayNum {
    (time.timestamp_millis() - DAYNUM_EPOCH_MS) as f64 / MS_PER_DAY
}

pub fn from_daynum(daynum: DayNum) -> DateTime<Utc> {
    let ms = (daynum * MS_PER_DAY).round() as i64 + DAYNUM_EPOCH_MS;
    DateTime::from_timestamp_millis(ms).unwrap_or(DateTime::<Utc>::MAX_UTC)
}

pub fn to_julian_date(daynum: DayNum) -> f64 {
    daynum + DAYNUM_EPOCH_JD
}

pub fn seconds_to_days(seconds: f64) -> f64 {
    seconds / 86_400.0
}
