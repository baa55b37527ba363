//! # Geomagnetic model facade
//!
//! This module exposes the evaluation contract of the library: a
//! [`GeomagneticModel`] is anything that maps broadcastable time and position
//! arrays to magnetic field vectors. Two implementations are provided:
//!
//! - [`SphericalHarmonicModel`]: one coefficient store, one radial source
//!   kind, one reference radius. Also exposes coefficient introspection and
//!   is the building block for everything else.
//! - [`ComposedModel`]: an explicit list of named, owned sub-models whose
//!   evaluated fields are summed. Each sub-model is independently
//!   time-interpolated before summation. Coefficient introspection is *not*
//!   summed: it addresses one named component through
//!   [`ComposedModel::component`].
//!
//! ## Broadcasting
//!
//! `eval` accepts matching-length time/position arrays; either side may have
//! length one and is broadcast against the other. Zero-length inputs yield a
//! zero-length output, never an error. Any other length combination is a
//! [`GeomagError::ShapeMismatch`].
//!
//! Evaluation is a pure function of `(&self, times, positions)`: models hold
//! no interior mutability and may be shared freely across threads.

pub mod shc;

use nalgebra::Vector3;

use crate::coefficients::{CoefficientStore, GaussCoefficients};
use crate::constants::{Kilometer, Mjd2000, REFERENCE_RADIUS};
use crate::coordinates::{self, CoordinateSystem};
use crate::geomag_errors::GeomagError;
use crate::spherical_harmonic::{spherical_to_nec, synthesize, FieldSource};

/// Output convention of the evaluated field vectors.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldConvention {
    /// North, East, Center components at the evaluation point
    Nec,
    /// Earth-centered Cartesian x, y, z components
    GeocentricCartesian,
}

/// Options controlling a model evaluation.
#[derive(Debug, Clone)]
pub struct EvalOptions {
    /// Coordinate system of the input positions
    pub input_coordinates: CoordinateSystem,
    /// Convention of the returned field vectors
    pub output: FieldConvention,
    /// Per-component scale factors applied to the output, e.g. `[1, 1, -1]`
    /// to flip the Center sign convention
    pub scale: Option<[f64; 3]>,
    /// Truncate the expansion to this degree (downward only)
    pub max_degree: Option<usize>,
    /// F10.7 solar flux series, accepted for interface compatibility with
    /// ionospheric model parametrizations; the models implemented in this
    /// crate do not consume it
    pub f107: Option<Vec<f64>>,
}

impl Default for EvalOptions {
    fn default() -> Self {
        EvalOptions {
            input_coordinates: CoordinateSystem::GeocentricSpherical,
            output: FieldConvention::Nec,
            scale: None,
            max_degree: None,
            f107: None,
        }
    }
}

/// Time interval over which a model is meant to be used, in MJD2000 days.
///
/// Evaluation outside the interval is clamped, never rejected; the range is
/// advisory for callers that want to check it.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ValidityRange {
    pub start: Mjd2000,
    pub end: Mjd2000,
}

impl ValidityRange {
    pub fn contains(&self, time: Mjd2000) -> bool {
        time >= self.start && time <= self.end
    }
}

/// Common evaluation contract of geomagnetic field models.
pub trait GeomagneticModel {
    /// Advisory validity interval of the model.
    fn validity(&self) -> ValidityRange;

    /// Evaluate the field at broadcastable time/position arrays.
    fn eval(
        &self,
        times: &[Mjd2000],
        positions: &[Vector3<f64>],
        options: &EvalOptions,
    ) -> Result<Vec<Vector3<f64>>, GeomagError>;

    /// Evaluate the field at a single time and position.
    fn eval_at(
        &self,
        time: Mjd2000,
        position: &Vector3<f64>,
        options: &EvalOptions,
    ) -> Result<Vector3<f64>, GeomagError> {
        let fields = self.eval(&[time], std::slice::from_ref(position), options)?;
        Ok(fields[0])
    }
}

/// Broadcast two array lengths: equal lengths pass through, a length of one
/// broadcasts against the other side.
pub(crate) fn broadcast_len(times: usize, positions: usize) -> Result<usize, GeomagError> {
    if times == positions {
        Ok(times)
    } else if times == 1 {
        Ok(positions)
    } else if positions == 1 {
        Ok(times)
    } else {
        Err(GeomagError::ShapeMismatch { times, positions })
    }
}

#[inline]
fn broadcast_index(index: usize, len: usize) -> usize {
    if len == 1 {
        0
    } else {
        index
    }
}

/// Rotate local spherical components to the requested convention and apply
/// the optional per-component scale.
fn finish_field(
    spherical_field: &Vector3<f64>,
    latitude: f64,
    longitude: f64,
    options: &EvalOptions,
) -> Vector3<f64> {
    let nec = spherical_to_nec(spherical_field);
    let mut out = match options.output {
        FieldConvention::Nec => nec,
        FieldConvention::GeocentricCartesian => {
            coordinates::nec_to_cartesian(&nec, latitude, longitude)
        }
    };
    if let Some([sx, sy, sz]) = options.scale {
        out.x *= sx;
        out.y *= sy;
        out.z *= sz;
    }
    out
}

/// A single spherical harmonic field model.
#[derive(Debug, Clone, PartialEq)]
pub struct SphericalHarmonicModel {
    store: CoefficientStore,
    source: FieldSource,
    reference_radius: Kilometer,
}

impl SphericalHarmonicModel {
    /// Model over `store` with the IAGA reference radius.
    pub fn new(store: CoefficientStore, source: FieldSource) -> Self {
        SphericalHarmonicModel {
            store,
            source,
            reference_radius: REFERENCE_RADIUS,
        }
    }

    /// Override the radius the coefficients are referenced to.
    pub fn with_reference_radius(mut self, reference_radius: Kilometer) -> Self {
        self.reference_radius = reference_radius;
        self
    }

    pub fn max_degree(&self) -> usize {
        self.store.max_degree()
    }

    pub fn min_degree(&self) -> usize {
        self.store.min_degree()
    }

    pub fn source(&self) -> FieldSource {
        self.source
    }

    pub fn reference_radius(&self) -> Kilometer {
        self.reference_radius
    }

    /// Interpolated Gauss coefficients at `time`, optionally truncated.
    ///
    /// This is the introspection hook used for dipole-axis extraction: a
    /// caller asking for `max_degree = 1` receives exactly the (g10, g11,
    /// h11) triple of the model at that time.
    pub fn coefficients(
        &self,
        time: Mjd2000,
        max_degree: Option<usize>,
    ) -> Result<GaussCoefficients, GeomagError> {
        self.store.coefficients(time, max_degree)
    }
}

impl GeomagneticModel for SphericalHarmonicModel {
    fn validity(&self) -> ValidityRange {
        let (start, end) = self.store.validity();
        ValidityRange { start, end }
    }

    fn eval(
        &self,
        times: &[Mjd2000],
        positions: &[Vector3<f64>],
        options: &EvalOptions,
    ) -> Result<Vec<Vector3<f64>>, GeomagError> {
        let len = broadcast_len(times.len(), positions.len())?;
        if let Some(f107) = &options.f107 {
            broadcast_len(len, f107.len())?;
        }
        if len == 0 {
            return Ok(Vec::new());
        }

        let spherical = coordinates::convert_points(
            positions,
            options.input_coordinates,
            CoordinateSystem::GeocentricSpherical,
        );

        // a non-varying time needs a single coefficient snapshot
        let shared = if times.len() == 1 {
            Some(self.store.coefficients(times[0], options.max_degree)?)
        } else {
            None
        };

        let mut fields = Vec::with_capacity(len);
        for i in 0..len {
            let position = &spherical[broadcast_index(i, spherical.len())];
            let interpolated;
            let coeffs = match &shared {
                Some(coeffs) => coeffs,
                None => {
                    let time = times[broadcast_index(i, times.len())];
                    interpolated = self.store.coefficients(time, options.max_degree)?;
                    &interpolated
                }
            };
            let field = synthesize(
                coeffs,
                self.source,
                position.x,
                position.y,
                position.z,
                self.reference_radius,
            );
            fields.push(finish_field(&field, position.x, position.y, options));
        }
        Ok(fields)
    }
}

/// An additive composition of named spherical harmonic sub-models.
#[derive(Debug, Clone, Default)]
pub struct ComposedModel {
    components: Vec<(String, SphericalHarmonicModel)>,
}

impl ComposedModel {
    pub fn new() -> Self {
        ComposedModel {
            components: Vec::new(),
        }
    }

    /// Append an owned, named sub-model.
    pub fn with_component(mut self, name: impl Into<String>, model: SphericalHarmonicModel) -> Self {
        self.components.push((name.into(), model));
        self
    }

    /// Access one named sub-model.
    ///
    /// Coefficient introspection on a composition deliberately goes through a
    /// single named component rather than a sum: the field composes, the
    /// coefficient sets do not.
    pub fn component(&self, name: &str) -> Option<&SphericalHarmonicModel> {
        self.components
            .iter()
            .find(|(component_name, _)| component_name == name)
            .map(|(_, model)| model)
    }

    pub fn component_names(&self) -> impl Iterator<Item = &str> {
        self.components.iter().map(|(name, _)| name.as_str())
    }
}

impl GeomagneticModel for ComposedModel {
    /// Intersection of the component validity ranges.
    fn validity(&self) -> ValidityRange {
        let mut start = f64::NEG_INFINITY;
        let mut end = f64::INFINITY;
        for (_, model) in &self.components {
            let validity = model.validity();
            start = start.max(validity.start);
            end = end.min(validity.end);
        }
        ValidityRange { start, end }
    }

    fn eval(
        &self,
        times: &[Mjd2000],
        positions: &[Vector3<f64>],
        options: &EvalOptions,
    ) -> Result<Vec<Vector3<f64>>, GeomagError> {
        let len = broadcast_len(times.len(), positions.len())?;
        let mut total = vec![Vector3::zeros(); len];
        for (_, model) in &self.components {
            let part = model.eval(times, positions, options)?;
            for (acc, field) in total.iter_mut().zip(&part) {
                *acc += *field;
            }
        }
        Ok(total)
    }
}
