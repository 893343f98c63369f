use thiserror::Error;

use crate::predict::PredictError;

#[derive(Debug, Error)]
pub enum TrackerError {
    #[error("predict error: {0}")]
    Predict(#[from] PredictError),
    #[error("orbit boundary not found within {0} steps")]
    OrbitBoundaryNotFound(usize),
}
