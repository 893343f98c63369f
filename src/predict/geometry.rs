use crate::predict::ground_station::{GroundStation, EARTH_RADIUS_KM, EARTH_ROTATION_RAD_S};

pub const SPEED_OF_LIGHT_KM_S: f64 = 299_792.458;
const ASTRONOMICAL_UNIT_KM: f64 = 149_597_870.7;
const WGS84_FLATTENING: f64 = 1.0 / 298.257_223_563;

pub fn teme_to_ecef_position(pos_teme: [f64; 3], gmst: f64) -> [f64; 3] {
    let cos_gmst = gmst.cos();
    let sin_gmst = gmst.sin();
    [
        pos_teme[0] * cos_gmst + pos_teme[1] * sin_gmst,
        -pos_teme[0] * sin_gmst + pos_teme[1] * cos_gmst,
        pos_teme[2],
    ]
}

pub fn teme_to_ecef_velocity(pos_teme: [f64; 3], vel_teme: [f64; 3], gmst: f64) -> [f64; 3] {
    let pos = teme_to_ecef_position(pos_teme, gmst);
    let rotated = teme_to_ecef_position(vel_teme, gmst);
    [
        rotated[0] + EARTH_ROTATION_RAD_S * pos[1],
        rotated[1] - EARTH_ROTATION_RAD_S * pos[0],
        rotated[2],
    ]
}

pub fn ecef_to_enu(dr: [f64; 3], lat_rad: f64, lon_rad: f64) -> (f64, f64, f64) {
    let sin_lat = lat_rad.sin();
    let cos_lat = lat_rad.cos();
    let sin_lon = lon_rad.sin();
    let cos_lon = lon_rad.cos();

    let east = -sin_lon * dr[0] + cos_lon * dr[1];
    let north = -sin_lat * cos_lon * dr[0] - sin_lat * sin_lon * dr[1] + cos_lat * dr[2];
    let up = cos_lat * cos_lon * dr[0] + cos_lat * sin_lon * dr[1] + sin_lat * dr[2];
    (east, north, up)
}

pub struct LookAngles {
    pub azimuth_deg: f64,
    pub elevation_deg: f64,
    pub range_km: f64,
    /// Unit line-of-sight vector, station to target, ECEF.
    pub los_unit: [f64; 3],
}

pub fn look_angles(station: &GroundStation, target_ecef: [f64; 3]) -> LookAngles {
    let sta = station.position_ecef_km();
    let dr = sub(target_ecef, sta);
    let range_km = norm(dr);
    let (east, north, up) = ecef_to_enu(dr, station.lat_rad(), station.lon_rad());
    if range_km <= 0.0 {
        return LookAngles {
            azimuth_deg: 0.0,
            elevation_deg: 0.0,
            range_km,
            los_unit: [0.0; 3],
        };
    }
    LookAngles {
        azimuth_deg: east.atan2(north).to_degrees().rem_euclid(360.0),
        elevation_deg: (up / range_km).asin().to_degrees(),
        range_km,
        los_unit: [dr[0] / range_km, dr[1] / range_km, dr[2] / range_km],
    }
}

/// Geodetic latitude, longitude (degrees, -180..180) and altitude (km).
pub fn ecef_to_geodetic(pos: [f64; 3]) -> (f64, f64, f64) {
    let e2 = WGS84_FLATTENING * (2.0 - WGS84_FLATTENING);
    let p = (pos[0] * pos[0] + pos[1] * pos[1]).sqrt();
    let lon = pos[1].atan2(pos[0]);
    let mut lat = pos[2].atan2(p * (1.0 - e2));
    let mut n = EARTH_RADIUS_KM;
    for _ in 0..5 {
        let sin_lat = lat.sin();
        n = EARTH_RADIUS_KM / (1.0 - e2 * sin_lat * sin_lat).sqrt();
        lat = (pos[2] + e2 * n * sin_lat).atan2(p);
    }
    let alt = if lat.cos().abs() > 1e-10 {
        p / lat.cos() - n
    } else {
        pos[2].abs() - n * (1.0 - e2)
    };
    (lat.to_degrees(), lon.to_degrees(), alt)
}

/// Low-precision solar position in the inertial frame, km.
pub fn sun_position_eci_km(julian_date: f64) -> [f64; 3] {
    let n = julian_date - 2_451_545.0;
    let mean_longitude = (280.460 + 0.985_647_4 * n).to_radians();
    let mean_anomaly = (357.528 + 0.985_600_3 * n).to_radians();
    let ecliptic_longitude = mean_longitude
        + 1.915_f64.to_radians() * mean_anomaly.sin()
        + 0.020_f64.to_radians() * (2.0 * mean_anomaly).sin();
    let obliquity = (23.439 - 0.000_000_4 * n).to_radians();
    let distance = (1.000_14
        - 0.016_71 * mean_anomaly.cos()
        - 0.000_14 * (2.0 * mean_anomaly).cos())
        * ASTRONOMICAL_UNIT_KM;
    [
        distance * ecliptic_longitude.cos(),
        distance * obliquity.cos() * ecliptic_longitude.sin(),
        distance * obliquity.sin() * ecliptic_longitude.sin(),
    ]
}

/// Cylindrical Earth shadow test.
pub fn is_eclipsed(sat: [f64; 3], sun: [f64; 3]) -> bool {
    let sun_dist = norm(sun);
    let sun_unit = [sun[0] / sun_dist, sun[1] / sun_dist, sun[2] / sun_dist];
    let along = dot(sat, sun_unit);
    if along >= 0.0 {
        return false;
    }
    let perp = sub(sat, scale(sun_unit, along));
    norm(perp) < EARTH_RADIUS_KM
}

/// Diameter of the ground footprint for an altitude, km.
pub fn footprint_km(altitude_km: f64) -> f64 {
    if altitude_km <= 0.0 {
        return 0.0;
    }
    2.0 * EARTH_RADIUS_KM * (EARTH_RADIUS_KM / (EARTH_RADIUS_KM + altitude_km)).acos()
}

pub fn signal_delay_ms(range_km: f64) -> f64 {
    range_km / SPEED_OF_LIGHT_KM_S * 1000.0
}

pub fn free_space_loss_db(range_km: f64, freq_hz: f64) -> f64 {
    if range_km <= 0.0 || freq_hz <= 0.0 {
        return 0.0;
    }
    20.0 * range_km.log10() + 20.0 * (freq_hz / 1e6).log10() + 32.45
}

/// Shift seen at the station for a carrier at `freq_hz`; positive when closing.
pub fn doppler_shift_hz(freq_hz: f64, range_rate_km_s: f64) -> f64 {
    -freq_hz * range_rate_km_s / SPEED_OF_LIGHT_KM_S
}

pub fn sub(a: [f64; 3], b: [f64; 3]) -> [f64; 3] {
    [a[0] - b[0], a[1] - b[1], a[2] - b[2]]
}

pub fn dot(a: [f64; 3], b: [f64; 3]) -> f64 {
    a[0] * b[0] + a[1] * b[1] + a[2] * b[2]
}

pub fn norm(a: [f64; 3]) -> f64 {
    dot(a, a).sqrt()
}

fn scale(a: [f64; 3], k: f64) -> [f64; 3] {
    [a[0] * k, a[1] * k, a[2] * k]
}
