//! Gauss coefficient containers and their time behaviour.
//!
//! A [`GaussCoefficients`] value is one snapshot of a spherical harmonic
//! expansion: dense triangular g/h arrays indexed by (degree, order) between
//! a minimum and maximum degree. A [`CoefficientStore`] owns one of three
//! time behaviours on top of such snapshots:
//!
//! - [`StaticCoefficients`]: time-invariant, the query time is ignored;
//! - [`SecularVariationCoefficients`]: a reference snapshot plus a linear
//!   rate in nT per year, `g(t) = g0 + rate · Δyears(t, t0)`;
//! - [`TabulatedCoefficients`]: multi-epoch snapshots with piecewise-linear
//!   interpolation between the bracketing epochs and clamped (nearest-epoch)
//!   extrapolation outside the table.
//!
//! Query times outside a store's tabulated range are never an error: the
//! boundary snapshot is held constant and result accuracy is the caller's
//! responsibility.

use itertools::Itertools;

use crate::constants::{Mjd2000, DAYS_PER_YEAR};
use crate::geomag_errors::GeomagError;
use crate::legendre::tri_index;
use crate::time::mjd2000_to_decimal_year;

/// One snapshot of Schmidt quasi-normalized Gauss coefficients in nT.
///
/// The g ("cosine") terms are defined for orders 0..=n, the h ("sine") terms
/// for orders 1..=n; entries outside `min_degree..=max_degree` are zero.
#[derive(Debug, Clone, PartialEq)]
pub struct GaussCoefficients {
    min_degree: usize,
    max_degree: usize,
    g: Vec<f64>,
    h: Vec<f64>,
}

impl GaussCoefficients {
    /// An all-zero coefficient set over `min_degree..=max_degree`.
    pub fn zeros(min_degree: usize, max_degree: usize) -> Result<Self, GeomagError> {
        if min_degree < 1 {
            return Err(GeomagError::InvalidDegree(
                "minimum degree must be at least 1".into(),
            ));
        }
        if min_degree > max_degree {
            return Err(GeomagError::InvalidDegree(format!(
                "minimum degree {min_degree} exceeds maximum degree {max_degree}"
            )));
        }
        let size = tri_index(max_degree, max_degree) + 1;
        Ok(GaussCoefficients {
            min_degree,
            max_degree,
            g: vec![0.0; size],
            h: vec![0.0; size],
        })
    }

    pub fn min_degree(&self) -> usize {
        self.min_degree
    }

    pub fn max_degree(&self) -> usize {
        self.max_degree
    }

    fn check_entry(&self, degree: usize, order: usize, min_order: usize) -> Result<(), GeomagError> {
        if degree < self.min_degree || degree > self.max_degree {
            return Err(GeomagError::MalformedCoefficients(format!(
                "degree {degree} outside the range {}..={}",
                self.min_degree, self.max_degree
            )));
        }
        if order < min_order || order > degree {
            return Err(GeomagError::MalformedCoefficients(format!(
                "order {order} invalid for degree {degree}"
            )));
        }
        Ok(())
    }

    /// Set a g (cosine) term; orders 0..=degree.
    pub fn set_g(&mut self, degree: usize, order: usize, value: f64) -> Result<(), GeomagError> {
        self.check_entry(degree, order, 0)?;
        self.g[tri_index(degree, order)] = value;
        Ok(())
    }

    /// Set an h (sine) term; orders 1..=degree.
    pub fn set_h(&mut self, degree: usize, order: usize, value: f64) -> Result<(), GeomagError> {
        self.check_entry(degree, order, 1)?;
        self.h[tri_index(degree, order)] = value;
        Ok(())
    }

    /// g (cosine) term at (degree, order); zero below `min_degree`.
    ///
    /// Panics when indexed beyond `max_degree`.
    #[inline]
    pub fn g(&self, degree: usize, order: usize) -> f64 {
        self.g[tri_index(degree, order)]
    }

    /// h (sine) term at (degree, order); zero below `min_degree` and at order 0.
    ///
    /// Panics when indexed beyond `max_degree`.
    #[inline]
    pub fn h(&self, degree: usize, order: usize) -> f64 {
        self.h[tri_index(degree, order)]
    }

    /// Copy truncated to `max_degree`.
    ///
    /// Truncation is downward only: requesting more than the native degree
    /// yields the native maximum. Requesting less than the minimum degree
    /// (or degree 0) is an [`GeomagError::InvalidDegree`] violation.
    pub fn truncated(&self, max_degree: usize) -> Result<Self, GeomagError> {
        if max_degree < 1 {
            return Err(GeomagError::InvalidDegree(
                "truncation degree must be at least 1".into(),
            ));
        }
        if max_degree < self.min_degree {
            return Err(GeomagError::InvalidDegree(format!(
                "truncation degree {max_degree} below the minimum degree {}",
                self.min_degree
            )));
        }
        if max_degree >= self.max_degree {
            return Ok(self.clone());
        }
        let size = tri_index(max_degree, max_degree) + 1;
        Ok(GaussCoefficients {
            min_degree: self.min_degree,
            max_degree,
            g: self.g[..size].to_vec(),
            h: self.h[..size].to_vec(),
        })
    }

    /// Element-wise `wa·a + wb·b` over two same-shape snapshots.
    pub(crate) fn linear_combination(a: &Self, wa: f64, b: &Self, wb: f64) -> Self {
        debug_assert_eq!(a.min_degree, b.min_degree);
        debug_assert_eq!(a.max_degree, b.max_degree);
        GaussCoefficients {
            min_degree: a.min_degree,
            max_degree: a.max_degree,
            g: a.g.iter().zip(&b.g).map(|(x, y)| wa * x + wb * y).collect(),
            h: a.h.iter().zip(&b.h).map(|(x, y)| wa * x + wb * y).collect(),
        }
    }
}

/// Time-invariant coefficient set.
#[derive(Debug, Clone, PartialEq)]
pub struct StaticCoefficients {
    coeffs: GaussCoefficients,
}

impl StaticCoefficients {
    pub fn new(coeffs: GaussCoefficients) -> Self {
        StaticCoefficients { coeffs }
    }
}

/// Reference snapshot plus a linear secular-variation rate.
///
/// The rate is in nT per year; the elapsed-time base is the linear
/// 365.25-day year, `Δyears = (t − t0) / 365.25`. Rate terms absent from the
/// rate set default to the static value with zero rate.
#[derive(Debug, Clone, PartialEq)]
pub struct SecularVariationCoefficients {
    reference_epoch: Mjd2000,
    base: GaussCoefficients,
    rate: GaussCoefficients,
}

impl SecularVariationCoefficients {
    pub fn new(
        reference_epoch: Mjd2000,
        base: GaussCoefficients,
        rate: GaussCoefficients,
    ) -> Result<Self, GeomagError> {
        if rate.min_degree() < base.min_degree() || rate.max_degree() > base.max_degree() {
            return Err(GeomagError::MalformedCoefficients(format!(
                "rate degrees {}..={} outside the static range {}..={}",
                rate.min_degree(),
                rate.max_degree(),
                base.min_degree(),
                base.max_degree()
            )));
        }
        // widen the rate table to the base shape, zero-filled
        let mut full_rate = GaussCoefficients::zeros(base.min_degree(), base.max_degree())?;
        for n in rate.min_degree()..=rate.max_degree() {
            for m in 0..=n {
                full_rate.set_g(n, m, rate.g(n, m))?;
                if m > 0 {
                    full_rate.set_h(n, m, rate.h(n, m))?;
                }
            }
        }
        Ok(SecularVariationCoefficients {
            reference_epoch,
            base,
            rate: full_rate,
        })
    }
}

/// Multi-epoch coefficient table with piecewise-linear time interpolation.
#[derive(Debug, Clone, PartialEq)]
pub struct TabulatedCoefficients {
    epochs: Vec<Mjd2000>,
    snapshots: Vec<GaussCoefficients>,
    interpolate_in_decimal_years: bool,
}

impl TabulatedCoefficients {
    /// Build a table from strictly increasing epochs and same-shape snapshots.
    ///
    /// With `interpolate_in_decimal_years` the interpolation weight within a
    /// bracket is computed on the calendar-exact decimal-year scale instead of
    /// raw day spacing, which matters for coefficient cadences tied to the
    /// calendar (e.g. five-year IGRF epochs spanning leap years).
    pub fn new(
        epochs: Vec<Mjd2000>,
        snapshots: Vec<GaussCoefficients>,
        interpolate_in_decimal_years: bool,
    ) -> Result<Self, GeomagError> {
        if epochs.is_empty() {
            return Err(GeomagError::MalformedCoefficients(
                "tabulated coefficient set without epochs".into(),
            ));
        }
        if epochs.len() != snapshots.len() {
            return Err(GeomagError::MalformedCoefficients(format!(
                "{} epochs but {} coefficient snapshots",
                epochs.len(),
                snapshots.len()
            )));
        }
        if epochs.iter().tuple_windows().any(|(a, b)| a >= b) {
            return Err(GeomagError::MalformedCoefficients(
                "epochs are not strictly increasing".into(),
            ));
        }
        let first = &snapshots[0];
        if snapshots.iter().any(|s| {
            s.min_degree() != first.min_degree() || s.max_degree() != first.max_degree()
        }) {
            return Err(GeomagError::MalformedCoefficients(
                "inconsistent degree ranges across epochs".into(),
            ));
        }
        Ok(TabulatedCoefficients {
            epochs,
            snapshots,
            interpolate_in_decimal_years,
        })
    }

    fn interpolate(&self, time: Mjd2000) -> GaussCoefficients {
        // construction guarantees a non-empty, strictly increasing table
        let first = self.epochs[0];
        let last = self.epochs[self.epochs.len() - 1];
        if self.epochs.len() == 1 || time <= first {
            return self.snapshots[0].clone();
        }
        if time >= last {
            return self.snapshots[self.snapshots.len() - 1].clone();
        }
        // index of the upper bracket epoch
        let hi = self.epochs.partition_point(|&e| e <= time);
        let lo = hi - 1;
        let weight = if self.interpolate_in_decimal_years {
            let t = mjd2000_to_decimal_year(time);
            let e0 = mjd2000_to_decimal_year(self.epochs[lo]);
            let e1 = mjd2000_to_decimal_year(self.epochs[hi]);
            (t - e0) / (e1 - e0)
        } else {
            (time - self.epochs[lo]) / (self.epochs[hi] - self.epochs[lo])
        };
        GaussCoefficients::linear_combination(
            &self.snapshots[lo],
            1.0 - weight,
            &self.snapshots[hi],
            weight,
        )
    }
}

/// A coefficient source with one of the three supported time behaviours.
#[derive(Debug, Clone, PartialEq)]
pub enum CoefficientStore {
    Static(StaticCoefficients),
    SecularVariation(SecularVariationCoefficients),
    Tabulated(TabulatedCoefficients),
}

impl CoefficientStore {
    pub fn min_degree(&self) -> usize {
        match self {
            CoefficientStore::Static(s) => s.coeffs.min_degree(),
            CoefficientStore::SecularVariation(s) => s.base.min_degree(),
            CoefficientStore::Tabulated(t) => t.snapshots[0].min_degree(),
        }
    }

    pub fn max_degree(&self) -> usize {
        match self {
            CoefficientStore::Static(s) => s.coeffs.max_degree(),
            CoefficientStore::SecularVariation(s) => s.base.max_degree(),
            CoefficientStore::Tabulated(t) => t.snapshots[0].max_degree(),
        }
    }

    /// Validity interval of the source in MJD2000 days.
    ///
    /// Static sets are valid for all times; secular-variation sets follow the
    /// five-year issue cycle of WMM-class models; tabulated sets cover their
    /// epoch table. Evaluation outside the interval is clamped, not rejected.
    pub fn validity(&self) -> (Mjd2000, Mjd2000) {
        match self {
            CoefficientStore::Static(_) => (f64::NEG_INFINITY, f64::INFINITY),
            CoefficientStore::SecularVariation(s) => {
                (s.reference_epoch, s.reference_epoch + 5.0 * DAYS_PER_YEAR)
            }
            CoefficientStore::Tabulated(t) => (t.epochs[0], t.epochs[t.epochs.len() - 1]),
        }
    }

    /// Coefficients at `time`, optionally truncated to `max_degree`.
    pub fn coefficients(
        &self,
        time: Mjd2000,
        max_degree: Option<usize>,
    ) -> Result<GaussCoefficients, GeomagError> {
        let full = match self {
            CoefficientStore::Static(s) => s.coeffs.clone(),
            CoefficientStore::SecularVariation(s) => {
                let years = (time - s.reference_epoch) / DAYS_PER_YEAR;
                GaussCoefficients::linear_combination(&s.base, 1.0, &s.rate, years)
            }
            CoefficientStore::Tabulated(t) => t.interpolate(time),
        };
        match max_degree {
            None => Ok(full),
            Some(degree) => full.truncated(degree),
        }
    }
}

#[cfg(test)]
mod coefficients_test {
    use super::*;
    use crate::time::decimal_year_to_mjd2000;
    use approx::assert_relative_eq;

    fn degree_two_set(scale: f64) -> GaussCoefficients {
        let mut coeffs = GaussCoefficients::zeros(1, 2).unwrap();
        coeffs.set_g(1, 0, -29442.0 * scale).unwrap();
        coeffs.set_g(1, 1, -1501.0 * scale).unwrap();
        coeffs.set_h(1, 1, 4797.1 * scale).unwrap();
        coeffs.set_g(2, 0, -2445.1 * scale).unwrap();
        coeffs.set_g(2, 1, 3012.9 * scale).unwrap();
        coeffs.set_h(2, 1, -2845.6 * scale).unwrap();
        coeffs.set_g(2, 2, 1676.7 * scale).unwrap();
        coeffs.set_h(2, 2, -641.9 * scale).unwrap();
        coeffs
    }

    #[test]
    fn test_invariants() {
        assert!(matches!(
            GaussCoefficients::zeros(0, 5),
            Err(GeomagError::InvalidDegree(_))
        ));
        assert!(matches!(
            GaussCoefficients::zeros(4, 2),
            Err(GeomagError::InvalidDegree(_))
        ));

        let mut coeffs = GaussCoefficients::zeros(1, 2).unwrap();
        // h is undefined at order 0
        assert!(coeffs.set_h(1, 0, 1.0).is_err());
        // order above degree
        assert!(coeffs.set_g(1, 2, 1.0).is_err());
        // degree outside the stored range
        assert!(coeffs.set_g(3, 0, 1.0).is_err());
    }

    #[test]
    fn test_truncation() {
        let coeffs = degree_two_set(1.0);
        let truncated = coeffs.truncated(1).unwrap();
        assert_eq!(truncated.max_degree(), 1);
        assert_eq!(truncated.g(1, 0), -29442.0);

        // upward truncation yields the native maximum
        let same = coeffs.truncated(99).unwrap();
        assert_eq!(same.max_degree(), 2);
        assert_eq!(same, coeffs);

        assert!(matches!(
            coeffs.truncated(0),
            Err(GeomagError::InvalidDegree(_))
        ));

        let crust = GaussCoefficients::zeros(16, 20).unwrap();
        assert!(matches!(
            crust.truncated(10),
            Err(GeomagError::InvalidDegree(_))
        ));
    }

    #[test]
    fn test_static_store_ignores_time() {
        let store = CoefficientStore::Static(StaticCoefficients::new(degree_two_set(1.0)));
        let a = store.coefficients(0.0, None).unwrap();
        let b = store.coefficients(7300.5, None).unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn test_secular_variation_one_year() {
        let base = degree_two_set(1.0);
        let mut rate = GaussCoefficients::zeros(1, 1).unwrap();
        rate.set_g(1, 0, 10.3).unwrap();
        rate.set_h(1, 1, -26.8).unwrap();
        let store = CoefficientStore::SecularVariation(
            SecularVariationCoefficients::new(0.0, base, rate).unwrap(),
        );

        let at_epoch = store.coefficients(0.0, None).unwrap();
        assert_eq!(at_epoch.g(1, 0), -29442.0);

        let one_year = store.coefficients(DAYS_PER_YEAR, None).unwrap();
        assert_relative_eq!(one_year.g(1, 0), -29442.0 + 10.3, epsilon = 1e-12);
        assert_relative_eq!(one_year.h(1, 1), 4797.1 - 26.8, epsilon = 1e-12);
        // terms with no rate entry keep the static value
        assert_eq!(one_year.g(2, 2), 1676.7);
    }

    #[test]
    fn test_secular_variation_rate_range_check() {
        let base = GaussCoefficients::zeros(1, 1).unwrap();
        let rate = GaussCoefficients::zeros(1, 2).unwrap();
        assert!(matches!(
            SecularVariationCoefficients::new(0.0, base, rate),
            Err(GeomagError::MalformedCoefficients(_))
        ));
    }

    #[test]
    fn test_tabulated_interpolation_and_clamping() {
        let epochs = vec![0.0, 3652.5];
        let snapshots = vec![degree_two_set(1.0), degree_two_set(2.0)];
        let store = CoefficientStore::Tabulated(
            TabulatedCoefficients::new(epochs, snapshots, false).unwrap(),
        );

        // midpoint of the bracket is the arithmetic mean
        let mid = store.coefficients(1826.25, None).unwrap();
        assert_relative_eq!(mid.g(1, 0), -29442.0 * 1.5, epsilon = 1e-9);

        // clamped extrapolation on both sides, never an error
        let before = store.coefficients(-5000.0, None).unwrap();
        assert_eq!(before.g(1, 0), -29442.0);
        let after = store.coefficients(99999.0, None).unwrap();
        assert_eq!(after.g(1, 0), -2.0 * 29442.0);
    }

    #[test]
    fn test_tabulated_decimal_year_weighting() {
        // epochs at 2003.0 and 2005.0: the 2004 leap year makes the raw-day
        // midpoint differ from the decimal-year midpoint
        let epochs = vec![
            decimal_year_to_mjd2000(2003.0),
            decimal_year_to_mjd2000(2005.0),
        ];
        let mut lo = GaussCoefficients::zeros(1, 1).unwrap();
        lo.set_g(1, 0, 0.0).unwrap();
        let mut hi = GaussCoefficients::zeros(1, 1).unwrap();
        hi.set_g(1, 0, 100.0).unwrap();

        let time = decimal_year_to_mjd2000(2004.0);

        let in_years =
            TabulatedCoefficients::new(epochs.clone(), vec![lo.clone(), hi.clone()], true).unwrap();
        let value = in_years.interpolate(time).g(1, 0);
        assert_relative_eq!(value, 50.0, epsilon = 1e-9);

        let in_days = TabulatedCoefficients::new(epochs, vec![lo, hi], false).unwrap();
        let value = in_days.interpolate(time).g(1, 0);
        assert_relative_eq!(value, 100.0 * 365.0 / 731.0, epsilon = 1e-9);
    }

    #[test]
    fn test_tabulated_validation() {
        let shape = GaussCoefficients::zeros(1, 1).unwrap();
        assert!(TabulatedCoefficients::new(vec![], vec![], false).is_err());
        assert!(
            TabulatedCoefficients::new(vec![0.0, 0.0], vec![shape.clone(), shape.clone()], false)
                .is_err()
        );
        assert!(TabulatedCoefficients::new(vec![0.0], vec![], false).is_err());
        let other = GaussCoefficients::zeros(1, 2).unwrap();
        assert!(TabulatedCoefficients::new(vec![0.0, 1.0], vec![shape, other], false).is_err());
    }
}
