//! Loader for the SHC spherical harmonic coefficient text format.
//!
//! The format, as distributed with Swarm Level-2 products and the IGRF
//! releases, is line oriented:
//!
//! ```text
//! # comment lines
//!   1 13 25 2 0          <- Nmin Nmax Ntimes [spline-order] [N-step]
//!   2013.5 2013.6 ...    <- Ntimes epochs as decimal years
//!   1  0  -29533.1 ...   <- one row per (n, m): g terms for m >= 0
//!   1 -1    4714.2 ...   <- negative m rows carry the h(n, |m|) terms
//! ```
//!
//! Single-epoch files produce a static coefficient store, multi-epoch files a
//! tabulated store. The decimal-year epochs are converted to MJD2000 with an
//! explicit, per-model [`DecimalYearConvention`]; it is never inferred from
//! the file contents.

use std::path::Path;

use itertools::Itertools;
use tracing::debug;

use crate::coefficients::{
    CoefficientStore, GaussCoefficients, StaticCoefficients, TabulatedCoefficients,
};
use crate::constants::Mjd2000;
use crate::geomag_errors::GeomagError;
use crate::model::{ComposedModel, SphericalHarmonicModel};
use crate::spherical_harmonic::FieldSource;
use crate::time::{decimal_year_to_mjd2000, decimal_year_to_mjd2000_simple};

/// Mapping of SHC decimal-year epochs onto the MJD2000 scale.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DecimalYearConvention {
    /// Calendar-exact conversion over true year lengths
    Exact,
    /// Linear 365.25-day years
    Simple,
}

impl DecimalYearConvention {
    fn to_mjd2000(self, decimal_year: f64) -> Mjd2000 {
        match self {
            DecimalYearConvention::Exact => decimal_year_to_mjd2000(decimal_year),
            DecimalYearConvention::Simple => decimal_year_to_mjd2000_simple(decimal_year),
        }
    }
}

/// Loader options for SHC files.
#[derive(Debug, Clone)]
pub struct ShcOptions {
    /// Weight tabulated interpolation by calendar-exact decimal years rather
    /// than raw day spacing
    pub interpolate_in_decimal_years: bool,
    /// Epoch conversion convention
    pub epoch_convention: DecimalYearConvention,
}

impl Default for ShcOptions {
    fn default() -> Self {
        ShcOptions {
            interpolate_in_decimal_years: false,
            epoch_convention: DecimalYearConvention::Exact,
        }
    }
}

/// Load a single internal-source model from an SHC file.
pub fn load_model_shc(
    path: impl AsRef<Path>,
    options: &ShcOptions,
) -> Result<SphericalHarmonicModel, GeomagError> {
    let path = path.as_ref();
    let text = std::fs::read_to_string(path)?;
    let store = parse_shc(&text, options)?;
    debug!(
        path = %path.display(),
        min_degree = store.min_degree(),
        max_degree = store.max_degree(),
        "loaded SHC coefficient set"
    );
    Ok(SphericalHarmonicModel::new(store, FieldSource::Internal))
}

/// Load a two-part model (e.g. core + crustal) as an additive composition.
pub fn load_model_shc_combined(
    core_path: impl AsRef<Path>,
    static_path: impl AsRef<Path>,
    options: &ShcOptions,
) -> Result<ComposedModel, GeomagError> {
    let core = load_model_shc(core_path, options)?;
    let crust = load_model_shc(static_path, options)?;
    Ok(ComposedModel::new()
        .with_component("core", core)
        .with_component("static", crust))
}

/// Parse SHC text into a coefficient store.
pub fn parse_shc(text: &str, options: &ShcOptions) -> Result<CoefficientStore, GeomagError> {
    let mut lines = text
        .lines()
        .enumerate()
        .map(|(number, line)| (number + 1, line.trim()))
        .filter(|(_, line)| !line.is_empty() && !line.starts_with('#'));

    let (header_line, header) = lines
        .next()
        .ok_or_else(|| GeomagError::MalformedCoefficients("empty SHC input".into()))?;
    let header_fields: Vec<&str> = header.split_whitespace().collect();
    if header_fields.len() < 3 {
        return Err(malformed(header_line, "expected Nmin Nmax Ntimes header"));
    }
    let min_degree = parse_field::<usize>(header_fields[0], header_line, "Nmin")?;
    let max_degree = parse_field::<usize>(header_fields[1], header_line, "Nmax")?;
    let epoch_count = parse_field::<usize>(header_fields[2], header_line, "Ntimes")?;
    if min_degree < 1 || min_degree > max_degree {
        return Err(malformed(
            header_line,
            &format!("invalid degree range {min_degree}..={max_degree}"),
        ));
    }
    if epoch_count == 0 {
        return Err(malformed(header_line, "Ntimes must be positive"));
    }

    let (epoch_line, epoch_text) = lines
        .next()
        .ok_or_else(|| GeomagError::MalformedCoefficients("missing epoch row".into()))?;
    let decimal_years = epoch_text
        .split_whitespace()
        .map(|field| parse_field::<f64>(field, epoch_line, "epoch"))
        .collect::<Result<Vec<f64>, _>>()?;
    if decimal_years.len() != epoch_count {
        return Err(malformed(
            epoch_line,
            &format!("expected {epoch_count} epochs, found {}", decimal_years.len()),
        ));
    }
    if decimal_years.iter().tuple_windows().any(|(a, b)| a >= b) {
        return Err(malformed(epoch_line, "epochs are not strictly increasing"));
    }

    let mut snapshots = vec![GaussCoefficients::zeros(min_degree, max_degree)?; epoch_count];
    let mut seen_g = vec![false; seen_size(max_degree)];
    let mut seen_h = vec![false; seen_size(max_degree)];

    for (line_number, line) in lines {
        let fields: Vec<&str> = line.split_whitespace().collect();
        if fields.len() != 2 + epoch_count {
            return Err(malformed(
                line_number,
                &format!(
                    "expected degree, order and {epoch_count} values, found {} fields",
                    fields.len()
                ),
            ));
        }
        let degree = parse_field::<usize>(fields[0], line_number, "degree")?;
        let signed_order = parse_field::<i64>(fields[1], line_number, "order")?;
        let order = signed_order.unsigned_abs() as usize;
        let is_h = signed_order < 0;

        let seen = if is_h { &mut seen_h } else { &mut seen_g };
        let index = seen_index(degree, order, max_degree, line_number)?;
        if seen[index] {
            return Err(malformed(
                line_number,
                &format!("duplicate entry for degree {degree}, order {signed_order}"),
            ));
        }
        seen[index] = true;

        for (snapshot, field) in snapshots.iter_mut().zip(&fields[2..]) {
            let value = parse_field::<f64>(field, line_number, "coefficient")?;
            if is_h {
                snapshot.set_h(degree, order, value).map_err(|err| {
                    GeomagError::MalformedCoefficients(format!("line {line_number}: {err}"))
                })?;
            } else {
                snapshot.set_g(degree, order, value).map_err(|err| {
                    GeomagError::MalformedCoefficients(format!("line {line_number}: {err}"))
                })?;
            }
        }
    }

    // every (n, m) of the advertised range must be present
    for degree in min_degree..=max_degree {
        for order in 0..=degree {
            if !seen_g[crate::legendre::tri_index(degree, order)] {
                return Err(GeomagError::MalformedCoefficients(format!(
                    "missing g({degree},{order}) entry"
                )));
            }
            if order > 0 && !seen_h[crate::legendre::tri_index(degree, order)] {
                return Err(GeomagError::MalformedCoefficients(format!(
                    "missing h({degree},{order}) entry"
                )));
            }
        }
    }

    let epochs: Vec<Mjd2000> = decimal_years
        .iter()
        .map(|&dy| options.epoch_convention.to_mjd2000(dy))
        .collect();

    if epoch_count == 1 {
        let snapshot = snapshots.remove(0);
        Ok(CoefficientStore::Static(StaticCoefficients::new(snapshot)))
    } else {
        Ok(CoefficientStore::Tabulated(TabulatedCoefficients::new(
            epochs,
            snapshots,
            options.interpolate_in_decimal_years,
        )?))
    }
}

fn seen_size(max_degree: usize) -> usize {
    crate::legendre::tri_index(max_degree, max_degree) + 1
}

fn seen_index(
    degree: usize,
    order: usize,
    max_degree: usize,
    line_number: usize,
) -> Result<usize, GeomagError> {
    if degree > max_degree || order > degree {
        return Err(malformed(
            line_number,
            &format!("entry ({degree},{order}) outside the header degree range"),
        ));
    }
    Ok(crate::legendre::tri_index(degree, order))
}

fn malformed(line_number: usize, message: &str) -> GeomagError {
    GeomagError::MalformedCoefficients(format!("line {line_number}: {message}"))
}

fn parse_field<T: std::str::FromStr>(
    field: &str,
    line_number: usize,
    what: &str,
) -> Result<T, GeomagError> {
    field
        .parse()
        .map_err(|_| malformed(line_number, &format!("invalid {what} value '{field}'")))
}
