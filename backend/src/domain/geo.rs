//! Great-circle distance and geofence checks.
//!
//! Pure functions with no failure modes: malformed coordinates propagate as
//! NaN rather than panicking, and NaN comparisons make `is_within_geofence`
//! return false. Callers wanting strictness validate with
//! [`shared::GeoPoint::is_valid`] first.

use shared::GeoPoint;

const EARTH_RADIUS_METERS: f64 = 6_371_000.0;

/// Haversine great-circle distance between two points, in meters.
pub fn distance_meters(a: GeoPoint, b: GeoPoint) -> f64 {
    let phi1 = a.lat.to_radians();
    let phi2 = b.lat.to_radians();
    let delta_phi = (b.lat - a.lat).to_radians();
    let delta_lambda = (b.lng - a.lng).to_radians();

    let h = (delta_phi / 2.0).sin().powi(2)
        + phi1.cos() * phi2.cos() * (delta_lambda / 2.0).sin().powi(2);
    let c = 2.0 * h.sqrt().atan2((1.0 - h).sqrt());

    EARTH_RADIUS_METERS * c
}

/// Whether `point` lies within `radius_meters` of `center`.
pub fn is_within_geofence(point: GeoPoint, center: GeoPoint, radius_meters: f64) -> bool {
    distance_meters(point, center) <= radius_meters
}
