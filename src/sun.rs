//! Low-precision solar ephemeris.
//!
//! Implements the Astronomical Almanac low-precision formulas for the
//! apparent position of the Sun (accuracy on the order of 0.01°), which is
//! sufficient for geomagnetic activity work: dipole tilt angles, solar zenith
//! screening and local-time derivations.

use nalgebra::Vector3;

use crate::constants::{Degree, Mjd2000, DEGRAD, J2000_MJD2000, RADEG};
use crate::coordinates::{convert_point, CoordinateSystem};
use crate::geomag_errors::GeomagError;
use crate::model::broadcast_len;
use crate::time::gmst_mjd2000;

/// Angles of the apparent Sun as seen from one position, all in degrees.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SunPosition {
    pub declination: Degree,
    pub right_ascension: Degree,
    /// Local hour angle, positive west of the observer meridian
    pub hour_angle: Degree,
    /// Azimuth from north, positive eastward, in (-180, 180]
    pub azimuth: Degree,
    pub zenith: Degree,
}

impl SunPosition {
    /// Longitude of the subsolar point implied by this position.
    pub fn sun_longitude(&self, longitude: Degree) -> Degree {
        longitude - self.hour_angle
    }
}

/// Wrap an angle in degrees to the interval (-180, 180].
fn wrap180(angle: Degree) -> Degree {
    -(-angle + 180.0).rem_euclid(360.0) + 180.0
}

/// Apparent solar position at one time and observer location.
///
/// Arguments
/// ---------
/// * `time`: MJD2000 (UT1 assumed close enough to UTC for this precision)
/// * `latitude`, `longitude`: geocentric observer coordinates in degrees
pub fn sun_position(time: Mjd2000, latitude: Degree, longitude: Degree) -> SunPosition {
    let d = time - J2000_MJD2000;

    // mean anomaly and mean longitude of the Sun
    let g = (357.529 + 0.98560028 * d).rem_euclid(360.0) * RADEG;
    let q = 280.459 + 0.98564736 * d;
    // apparent ecliptic longitude and obliquity of the ecliptic
    let l = (q + 1.915 * g.sin() + 0.020 * (2.0 * g).sin()).rem_euclid(360.0) * RADEG;
    let e = (23.439 - 0.00000036 * d) * RADEG;

    let right_ascension = (e.cos() * l.sin()).atan2(l.cos()) * DEGRAD;
    let declination = (e.sin() * l.sin()).asin() * DEGRAD;

    let gmst = gmst_mjd2000(time) * DEGRAD;
    let hour_angle = wrap180(gmst + longitude - right_ascension);

    let lat = latitude * RADEG;
    let dec = declination * RADEG;
    let lha = hour_angle * RADEG;
    let cos_zenith = (lat.sin() * dec.sin() + lat.cos() * dec.cos() * lha.cos()).clamp(-1.0, 1.0);
    let zenith = cos_zenith.acos() * DEGRAD;
    let azimuth = (-dec.cos() * lha.sin())
        .atan2(dec.sin() * lat.cos() - dec.cos() * lat.sin() * lha.cos())
        * DEGRAD;

    SunPosition {
        declination,
        right_ascension: wrap180(right_ascension),
        hour_angle,
        azimuth,
        zenith,
    }
}

/// Vectorized [`sun_position`] with the model broadcast rules.
///
/// Latitude and longitude arrays must match the time array length or have
/// length one; zero-length inputs yield a zero-length output.
pub fn sun_positions(
    times: &[Mjd2000],
    latitudes: &[Degree],
    longitudes: &[Degree],
) -> Result<Vec<SunPosition>, GeomagError> {
    let len = broadcast_len(times.len(), latitudes.len())?;
    let len = broadcast_len(len, longitudes.len())?;
    let pick = |values: &[f64], i: usize| values[if values.len() == 1 { 0 } else { i }];
    Ok((0..len)
        .map(|i| {
            sun_position(
                pick(times, i),
                pick(latitudes, i),
                pick(longitudes, i),
            )
        })
        .collect())
}

/// Unit Earth–Sun vector in geocentric Cartesian axes.
///
/// Assembled from the solar declination and the subsolar longitude through
/// the spherical → Cartesian conversion of the coordinate adapter.
pub fn sun_vector(declination: Degree, sun_longitude: Degree) -> Vector3<f64> {
    convert_point(
        &Vector3::new(declination, sun_longitude, 1.0),
        CoordinateSystem::GeocentricSpherical,
        CoordinateSystem::GeocentricCartesian,
    )
}

#[cfg(test)]
mod sun_test {
    use super::*;
    use crate::time::datetime_to_mjd2000;
    use approx::{assert_abs_diff_eq, assert_relative_eq};

    #[test]
    fn test_declination_at_solstices_and_equinox() {
        // June solstice: declination near +23.44°
        let t = datetime_to_mjd2000("2016-06-20T22:34:00").unwrap();
        let sun = sun_position(t, 0.0, 0.0);
        assert_abs_diff_eq!(sun.declination, 23.44, epsilon = 0.05);

        // December solstice: near -23.44°
        let t = datetime_to_mjd2000("2016-12-21T10:44:00").unwrap();
        let sun = sun_position(t, 0.0, 0.0);
        assert_abs_diff_eq!(sun.declination, -23.44, epsilon = 0.05);

        // March equinox: near 0°
        let t = datetime_to_mjd2000("2016-03-20T04:30:00").unwrap();
        let sun = sun_position(t, 0.0, 0.0);
        assert_abs_diff_eq!(sun.declination, 0.0, epsilon = 0.05);
    }

    #[test]
    fn test_zenith_at_subsolar_point() {
        // wherever the hour angle vanishes and the latitude equals the
        // declination, the sun is at the zenith
        let t = datetime_to_mjd2000("2016-01-01T12:00:00").unwrap();
        let sun = sun_position(t, 0.0, 0.0);
        let subsolar_lon = sun.sun_longitude(0.0);
        let overhead = sun_position(t, sun.declination, subsolar_lon);
        assert_abs_diff_eq!(overhead.zenith, 0.0, epsilon = 0.05);
        assert_abs_diff_eq!(overhead.hour_angle, 0.0, epsilon = 0.05);
    }

    #[test]
    fn test_noon_geometry_mid_latitude() {
        // around local noon at Greenwich the sun stands south: zenith is
        // latitude minus declination, azimuth near ±180°
        let t = datetime_to_mjd2000("2016-04-01T12:00:00").unwrap();
        let sun = sun_position(t, 51.48, 0.0);
        assert_abs_diff_eq!(sun.zenith, 51.48 - sun.declination, epsilon = 1.0);
        assert!(sun.azimuth.abs() > 160.0);
    }

    #[test]
    fn test_sun_vector_unit_norm() {
        let t = datetime_to_mjd2000("2016-01-01T23:50:00").unwrap();
        let sun = sun_position(t, 10.0, 45.0);
        let vector = sun_vector(sun.declination, sun.sun_longitude(45.0));
        assert_relative_eq!(vector.norm(), 1.0, epsilon = 1e-12);
        // the z component is the sine of the declination
        assert_relative_eq!(
            vector.z,
            (sun.declination * RADEG).sin(),
            epsilon = 1e-12
        );
    }

    #[test]
    fn test_sun_positions_broadcast() {
        let times = [0.0, 0.25, 0.5];
        let positions = sun_positions(&times, &[10.0], &[45.0]).unwrap();
        assert_eq!(positions.len(), 3);
        assert_eq!(positions[1], sun_position(0.25, 10.0, 45.0));

        assert!(sun_positions(&times, &[1.0, 2.0], &[0.0]).is_err());
        assert!(sun_positions(&[], &[], &[]).unwrap().is_empty());
    }

    #[test]
    fn test_hour_angle_advances_with_time() {
        // the hour angle advances about 15° per hour
        let t = datetime_to_mjd2000("2016-01-01T09:00:00").unwrap();
        let early = sun_position(t, 0.0, 0.0);
        let later = sun_position(t + 1.0 / 24.0, 0.0, 0.0);
        let advance = wrap180(later.hour_angle - early.hour_angle);
        assert_abs_diff_eq!(advance, 15.0, epsilon = 0.1);
    }
}
