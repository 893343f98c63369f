use thiserror::Error;

#[derive(Debug, Error)]
pub enum PredictError {
    #[error("TLE file read error: {0}")]
    FileRead(#[from] std::io::Error),
    #[error("Invalid TLE format in {file}: {message}")]
    InvalidTle { file: String, message: String },
    #[error("Propagation error: {0}")]
    Propagation(String),
    #[error("Invalid observer coordinates: lat {latitude_deg}, lon {longitude_deg}")]
    InvalidObserver {
        latitude_deg: f64,
        longitude_deg: f64,
    },
    #[error("Satellite not found: {0}")]
    SatelliteNotFound(String),
    #[error("No satellites loaded")]
    NoSatellites,
}
