//! Dipole-axis derivation from degree-1 Gauss coefficients.
//!
//! The three degree-1 coefficients define the centered dipole: the axis
//! vector `(−g11, −h11, −g10)`, normalized to unit length, points toward the
//! north geomagnetic pole. The pole coordinates and the dipole tilt angle
//! against the Earth–Sun direction follow directly from it.

use nalgebra::Vector3;

use crate::coefficients::GaussCoefficients;
use crate::constants::{Degree, DEGRAD};
use crate::geomag_errors::GeomagError;

/// Unit vector of the dipole axis, pointing toward the north geomagnetic pole.
pub fn dipole_axis(coeffs: &GaussCoefficients) -> Result<Vector3<f64>, GeomagError> {
    if coeffs.min_degree() > 1 || coeffs.max_degree() < 1 {
        return Err(GeomagError::InvalidDegree(
            "dipole axis requires degree-1 coefficients".into(),
        ));
    }
    let axis = Vector3::new(-coeffs.g(1, 1), -coeffs.h(1, 1), -coeffs.g(1, 0));
    let norm = axis.norm();
    if norm == 0.0 {
        return Err(GeomagError::MalformedCoefficients(
            "degree-1 coefficients are all zero".into(),
        ));
    }
    Ok(axis / norm)
}

/// Latitude and longitude of the north geomagnetic pole, in degrees.
pub fn geomagnetic_pole(coeffs: &GaussCoefficients) -> Result<(Degree, Degree), GeomagError> {
    let axis = dipole_axis(coeffs)?;
    Ok((
        axis.z.asin() * DEGRAD,
        axis.y.atan2(axis.x) * DEGRAD,
    ))
}

/// Dipole tilt angle in degrees.
///
/// The arcsine of the projection of the unit Earth–Sun vector onto the
/// dipole axis; positive when the north geomagnetic pole leans sunward.
pub fn dipole_tilt_angle(earth_sun_vector: &Vector3<f64>, axis: &Vector3<f64>) -> Degree {
    earth_sun_vector.dot(axis).clamp(-1.0, 1.0).asin() * DEGRAD
}
