//! Coordinate system conversions on the WGS84 reference ellipsoid.
//!
//! Three point representations are supported, all as `Vector3<f64>`:
//!
//! - **Geodetic**: latitude (deg), longitude (deg), height above the ellipsoid (km)
//! - **Geocentric spherical**: latitude (deg), longitude (deg), radius (km)
//! - **Geocentric Cartesian**: x, y, z (km)
//!
//! All conversions are pure and invertible up to floating-point precision.
//! The spherical/Cartesian → geodetic direction uses Ferrari's closed-form
//! solution, which is exact rather than iterative.

use nalgebra::Vector3;

use crate::constants::{Degree, Kilometer, Radian, DEGRAD, RADEG, WGS84_A, WGS84_EPS2};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CoordinateSystem {
    /// Geodetic latitude (deg), longitude (deg), height above WGS84 (km)
    Geodetic,
    /// Geocentric latitude (deg), longitude (deg), radius (km)
    GeocentricSpherical,
    /// Earth-centered Cartesian x, y, z (km)
    GeocentricCartesian,
}

/// Convert a single point between coordinate systems.
pub fn convert_point(
    point: &Vector3<f64>,
    from: CoordinateSystem,
    to: CoordinateSystem,
) -> Vector3<f64> {
    use CoordinateSystem::*;
    match (from, to) {
        (Geodetic, GeocentricCartesian) => geodetic_to_cartesian(point),
        (Geodetic, GeocentricSpherical) => cartesian_to_spherical(&geodetic_to_cartesian(point)),
        (GeocentricSpherical, GeocentricCartesian) => spherical_to_cartesian(point),
        (GeocentricSpherical, Geodetic) => spherical_to_geodetic(point),
        (GeocentricCartesian, GeocentricSpherical) => cartesian_to_spherical(point),
        (GeocentricCartesian, Geodetic) => spherical_to_geodetic(&cartesian_to_spherical(point)),
        _ => *point,
    }
}

/// Convert a batch of points, vectorized over the leading axis.
pub fn convert_points(
    points: &[Vector3<f64>],
    from: CoordinateSystem,
    to: CoordinateSystem,
) -> Vec<Vector3<f64>> {
    points.iter().map(|p| convert_point(p, from, to)).collect()
}

fn geodetic_to_cartesian(point: &Vector3<f64>) -> Vector3<f64> {
    let lat = point.x * RADEG;
    let lon = point.y * RADEG;
    let height = point.z;
    let (sin_lat, cos_lat) = lat.sin_cos();
    let (sin_lon, cos_lon) = lon.sin_cos();
    // prime vertical radius of curvature
    let n = WGS84_A / (1.0 - WGS84_EPS2 * sin_lat * sin_lat).sqrt();
    Vector3::new(
        (n + height) * cos_lat * cos_lon,
        (n + height) * cos_lat * sin_lon,
        (n * (1.0 - WGS84_EPS2) + height) * sin_lat,
    )
}

fn spherical_to_cartesian(point: &Vector3<f64>) -> Vector3<f64> {
    let lat = point.x * RADEG;
    let lon = point.y * RADEG;
    let radius = point.z;
    let (sin_lat, cos_lat) = lat.sin_cos();
    let (sin_lon, cos_lon) = lon.sin_cos();
    Vector3::new(
        radius * cos_lat * cos_lon,
        radius * cos_lat * sin_lon,
        radius * sin_lat,
    )
}

fn cartesian_to_spherical(point: &Vector3<f64>) -> Vector3<f64> {
    let hypot_xy = point.x.hypot(point.y);
    Vector3::new(
        point.z.atan2(hypot_xy) * DEGRAD,
        point.y.atan2(point.x) * DEGRAD,
        point.norm(),
    )
}

fn spherical_to_geodetic(point: &Vector3<f64>) -> Vector3<f64> {
    let lat = point.x * RADEG;
    let radius = point.z;
    let (geodetic_lat, height) = to_geodetic(radius * lat.sin(), radius * lat.cos());
    Vector3::new(geodetic_lat * DEGRAD, point.y, height)
}

/// Geodetic latitude and height from the Ferrari solution.
///
/// Closed-form inverse of the geodetic → Cartesian mapping, evaluated from
/// the rotational-symmetry pair (z, hypot(x, y)).
fn to_geodetic(z_coord: Kilometer, hypot_xy: Kilometer) -> (Radian, Kilometer) {
    let ee4 = WGS84_EPS2 * WGS84_EPS2;
    let pa2 = (hypot_xy / WGS84_A) * (hypot_xy / WGS84_A);
    let zt = (1.0 - WGS84_EPS2) * (z_coord / WGS84_A) * (z_coord / WGS84_A);
    let rh = (pa2 + zt - ee4) / 6.0;
    let ss = (0.25 * ee4) * zt * pa2;
    let rh3 = rh * rh * rh;
    let tmp = rh3 + ss + (ss * (ss + 2.0 * rh3)).sqrt();
    let tt = tmp.abs().cbrt().copysign(tmp);
    let uu = rh + tt + rh * rh / tt;
    let vv = (uu * uu + ee4 * zt).sqrt();
    let ww = (0.5 * WGS84_EPS2) * (uu + vv - zt) / vv;
    let kp = 1.0 + WGS84_EPS2 * ((uu + vv + ww * ww).sqrt() + ww) / (uu + vv);
    let zkp = kp * z_coord;
    (
        zkp.atan2(hypot_xy),
        hypot_xy.hypot(zkp) * (1.0 / kp - 1.0 + WGS84_EPS2) / WGS84_EPS2,
    )
}

/// Rotate a local North-East-Center vector into geocentric Cartesian axes.
///
/// Arguments
/// ---------
/// * `nec`: field vector in the local NEC frame
/// * `latitude`: geocentric latitude of the local frame origin, in degrees
/// * `longitude`: longitude of the local frame origin, in degrees
///
/// Return
/// ------
/// * the same vector expressed along the Earth-centered x, y, z axes
pub fn nec_to_cartesian(nec: &Vector3<f64>, latitude: Degree, longitude: Degree) -> Vector3<f64> {
    let (sin_lat, cos_lat) = (latitude * RADEG).sin_cos();
    let (sin_lon, cos_lon) = (longitude * RADEG).sin_cos();
    let north = Vector3::new(-sin_lat * cos_lon, -sin_lat * sin_lon, cos_lat);
    let east = Vector3::new(-sin_lon, cos_lon, 0.0);
    let center = Vector3::new(-cos_lat * cos_lon, -cos_lat * sin_lon, -sin_lat);
    north * nec.x + east * nec.y + center * nec.z
}

#[cfg(test)]
mod coordinates_test {
    use super::*;
    use approx::{assert_abs_diff_eq, assert_relative_eq};
    use CoordinateSystem::*;

    #[test]
    fn test_geodetic_to_cartesian_equator() {
        let cart = convert_point(&Vector3::new(0.0, 0.0, 0.0), Geodetic, GeocentricCartesian);
        assert_relative_eq!(cart.x, WGS84_A, epsilon = 1e-12);
        assert_abs_diff_eq!(cart.y, 0.0, epsilon = 1e-12);
        assert_abs_diff_eq!(cart.z, 0.0, epsilon = 1e-12);
    }

    #[test]
    fn test_geodetic_round_trip() {
        for &lat in &[-89.0, -45.0, -0.5, 0.0, 23.7, 45.0, 66.56, 89.9] {
            for &lon in &[-179.0, -90.0, 0.0, 13.5, 179.0] {
                for &height in &[0.0, 100.0, 450.0] {
                    let geodetic = Vector3::new(lat, lon, height);
                    let spherical = convert_point(&geodetic, Geodetic, GeocentricSpherical);
                    let back = convert_point(&spherical, GeocentricSpherical, Geodetic);
                    assert_abs_diff_eq!(back.x, lat, epsilon = 1e-8);
                    assert_abs_diff_eq!(back.y, lon, epsilon = 1e-8);
                    assert_abs_diff_eq!(back.z, height, epsilon = 1e-6);
                }
            }
        }
    }

    #[test]
    fn test_geodetic_round_trip_poles() {
        for &lat in &[90.0, -90.0] {
            let geodetic = Vector3::new(lat, 0.0, 10.0);
            let cart = convert_point(&geodetic, Geodetic, GeocentricCartesian);
            let back = convert_point(&cart, GeocentricCartesian, Geodetic);
            assert_abs_diff_eq!(back.x, lat, epsilon = 1e-8);
            assert_abs_diff_eq!(back.z, 10.0, epsilon = 1e-6);
        }
    }

    #[test]
    fn test_spherical_cartesian_round_trip() {
        let spherical = Vector3::new(-37.25, 144.9, 6812.3);
        let cart = convert_point(&spherical, GeocentricSpherical, GeocentricCartesian);
        let back = convert_point(&cart, GeocentricCartesian, GeocentricSpherical);
        assert_relative_eq!(back.x, spherical.x, epsilon = 1e-12);
        assert_relative_eq!(back.y, spherical.y, epsilon = 1e-12);
        assert_relative_eq!(back.z, spherical.z, epsilon = 1e-12);
    }

    #[test]
    fn test_identity_conversion() {
        let p = Vector3::new(1.0, 2.0, 3.0);
        assert_eq!(convert_point(&p, Geodetic, Geodetic), p);
    }

    #[test]
    fn test_convert_points_batch() {
        let points = vec![Vector3::new(0.0, 0.0, 6500.0), Vector3::new(45.0, 90.0, 7000.0)];
        let out = convert_points(&points, GeocentricSpherical, GeocentricCartesian);
        assert_eq!(out.len(), 2);
        assert_relative_eq!(out[0].x, 6500.0, epsilon = 1e-12);
        assert_relative_eq!(out[1].norm(), 7000.0, epsilon = 1e-9);
    }

    #[test]
    fn test_nec_to_cartesian() {
        // at lat 0, lon 0: north = +z, east = +y, center = -x
        let cart = nec_to_cartesian(&Vector3::new(1.0, 2.0, 3.0), 0.0, 0.0);
        assert_abs_diff_eq!(cart.x, -3.0, epsilon = 1e-12);
        assert_abs_diff_eq!(cart.y, 2.0, epsilon = 1e-12);
        assert_abs_diff_eq!(cart.z, 1.0, epsilon = 1e-12);

        // rotation preserves the norm
        let nec = Vector3::new(20123.4, -3456.7, 41234.5);
        let cart = nec_to_cartesian(&nec, 52.3, -117.8);
        assert_relative_eq!(cart.norm(), nec.norm(), epsilon = 1e-12);
    }
}
