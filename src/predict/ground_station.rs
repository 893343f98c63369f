use serde::Serialize;

use crate::predict::error::PredictError;

pub const EARTH_ROTATION_RAD_S: f64 = 7.292_115e-5;
pub const EARTH_RADIUS_KM: f64 = 6378.137;
const EARTH_ECCENTRICITY_SQ: f64 = 0.006_694_379_990_14;

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct GroundStation {
    pub latitude_deg: f64,
    pub longitude_deg: f64,
    pub altitude_m: f64,
}

impl Default for GroundStation {
    fn default() -> Self {
        Self {
            latitude_deg: 0.0,
            longitude_deg: 0.0,
            altitude_m: 0.0,
        }
    }
}

impl GroundStation {
    pub fn new(latitude_deg: f64, longitude_deg: f64, altitude_m: f64) -> Result<Self, PredictError> {
        let valid = latitude_deg.is_finite()
            && longitude_deg.is_finite()
            && altitude_m.is_finite()
            && (-90.0..=90.0).contains(&latitude_deg)
            && (-180.0..360.0).contains(&longitude_deg);
        if !valid {
            return Err(PredictError::InvalidObserver {
                latitude_deg,
                longitude_deg,
            });
        }
        Ok(Self {
            latitude_deg,
            longitude_deg,
            altitude_m,
        })
    }

    /// Parses `"lat, lon"` as written in the station config.
    pub fn from_coordinates(coordinates: &str, altitude_m: Option<f64>) -> Result<Self, PredictError> {
        let invalid = || PredictError::InvalidObserver {
            latitude_deg: f64::NAN,
            longitude_deg: f64::NAN,
        };
        let parts: Vec<_> = coordinates.split(',').map(|s| s.trim()).collect();
        if parts.len() < 2 {
            return Err(invalid());
        }
        let lat = parts[0].parse().map_err(|_| invalid())?;
        let lon = parts[1].parse().map_err(|_| invalid())?;
        Self::new(lat, lon, altitude_m.unwrap_or(0.0))
    }

    pub fn lat_rad(&self) -> f64 {
        self.latitude_deg.to_radians()
    }

    pub fn lon_rad(&self) -> f64 {
        self.longitude_deg.to_radians()
    }

    pub fn position_ecef_km(&self) -> [f64; 3] {
        // WGS-84
        let lat = self.lat_rad();
        let lon = self.lon_rad();
        let sin_lat = lat.sin();
        let n = EARTH_RADIUS_KM / (1.0 - EARTH_ECCENTRICITY_SQ * sin_lat * sin_lat).sqrt();
        let alt_km = self.altitude_m / 1000.0;
        [
            (n + alt_km) * lat.cos() * lon.cos(),
            (n + alt_km) * lat.cos() * lon.sin(),
            (n * (1.0 - EARTH_ECCENTRICITY_SQ) + alt_km) * sin_lat,
        ]
    }

    pub fn velocity_ecef_km_s(&self) -> [f64; 3] {
        let pos = self.position_ecef_km();
        [
            -EARTH_ROTATION_RAD_S * pos[1],
            EARTH_ROTATION_RAD_S * pos[0],
            0.0,
        ]
    }
}
