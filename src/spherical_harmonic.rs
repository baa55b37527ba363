//! Spherical harmonic synthesis of the geomagnetic field.
//!
//! Evaluates the gradient of the Gauss potential at a single geocentric
//! spherical position:
//!
//! ```text
//! B_r = −∂V/∂r,  B_θ = −(1/r)·∂V/∂θ,  B_φ = −(1/(r·sinθ))·∂V/∂φ
//! ```
//!
//! with radial scaling in units of the model's reference radius. Internal
//! sources carry the `(a/r)^(n+2)` factor, external sources `(r/a)^(n−1)`.
//! The azimuthal term is computed against P/sinθ tables, so the pole
//! singularity is removable by construction and the synthesis returns finite,
//! correctly-signed components at colatitude 0 and π.

use nalgebra::Vector3;

use crate::coefficients::GaussCoefficients;
use crate::constants::{Degree, Kilometer, RADEG};
use crate::legendre::LegendreTables;

/// Radial dependency of a spherical harmonic source.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldSource {
    /// Sources below the evaluation shell (core, crust)
    Internal,
    /// Sources above the evaluation shell (magnetospheric)
    External,
}

/// Evaluate the field of one coefficient set at one position.
///
/// Arguments
/// ---------
/// * `coeffs`: Gauss coefficients in nT
/// * `source`: internal or external radial scaling
/// * `latitude`, `longitude`: geocentric spherical position in degrees
/// * `radius`: geocentric radius in km
/// * `reference_radius`: radius the coefficients are referenced to, in km
///
/// Return
/// ------
/// * local spherical components `(B_r, B_θ, B_φ)` in nT
pub fn synthesize(
    coeffs: &GaussCoefficients,
    source: FieldSource,
    latitude: Degree,
    longitude: Degree,
    radius: Kilometer,
    reference_radius: Kilometer,
) -> Vector3<f64> {
    let colatitude = (90.0 - latitude) * RADEG;
    let tables = LegendreTables::new(colatitude, coeffs.max_degree());

    let lon = longitude * RADEG;
    let order_count = coeffs.max_degree() + 1;
    let mut cos_m = Vec::with_capacity(order_count);
    let mut sin_m = Vec::with_capacity(order_count);
    for m in 0..order_count {
        let (s, c) = (m as f64 * lon).sin_cos();
        cos_m.push(c);
        sin_m.push(s);
    }

    let ratio = reference_radius / radius;

    let mut b_r = 0.0;
    let mut b_theta = 0.0;
    let mut b_phi = 0.0;

    for n in coeffs.min_degree()..=coeffs.max_degree() {
        let radial_scale = match source {
            FieldSource::Internal => ratio.powi(n as i32 + 2),
            FieldSource::External => (1.0 / ratio).powi(n as i32 - 1),
        };

        let mut sum_p = 0.0;
        let mut sum_dp = 0.0;
        let mut sum_ps = 0.0;
        for m in 0..=n {
            let g = coeffs.g(n, m);
            let h = if m > 0 { coeffs.h(n, m) } else { 0.0 };
            let in_phase = g * cos_m[m] + h * sin_m[m];
            sum_p += in_phase * tables.p(n, m);
            sum_dp += in_phase * tables.dp(n, m);
            if m > 0 {
                let quadrature = g * sin_m[m] - h * cos_m[m];
                sum_ps += m as f64 * quadrature * tables.p_over_sin(n, m);
            }
        }

        match source {
            FieldSource::Internal => b_r += (n as f64 + 1.0) * radial_scale * sum_p,
            FieldSource::External => b_r -= n as f64 * radial_scale * sum_p,
        }
        b_theta -= radial_scale * sum_dp;
        b_phi += radial_scale * sum_ps;
    }

    Vector3::new(b_r, b_theta, b_phi)
}

/// Convert local spherical field components to the NEC convention.
///
/// North = −B_θ, East = B_φ, Center = −B_r.
#[inline]
pub fn spherical_to_nec(field: &Vector3<f64>) -> Vector3<f64> {
    Vector3::new(-field.y, field.z, -field.x)
}
