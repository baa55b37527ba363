use hifitime::{Epoch, TimeScale};
use std::str::FromStr;

use crate::constants::{DecimalYear, Mjd2000, Radian, DAYS_PER_YEAR, DPI, J2000_MJD2000, MJD2000_OFFSET};
use crate::geomag_errors::GeomagError;

/// Transformation from a date in the format YYYY-MM-ddTHH:mm:ss to MJD2000
///
/// Argument
/// --------
/// * `date`: a date string in the format YYYY-MM-ddTHH:mm:ss (UTC)
///
/// Return
/// ------
/// * the input date as fractional days since 2000-01-01T00:00:00
pub fn datetime_to_mjd2000(date: &str) -> Result<Mjd2000, GeomagError> {
    let epoch = Epoch::from_str(date)
        .map_err(|err| GeomagError::InvalidDateTime(format!("{date}: {err}")))?;
    Ok(epoch.to_mjd_utc_days() - MJD2000_OFFSET)
}

/// MJD2000 of the first instant of a calendar year.
fn year_start_mjd2000(year: i32) -> Mjd2000 {
    Epoch::from_gregorian(year, 1, 1, 0, 0, 0, 0, TimeScale::UTC).to_mjd_utc_days() - MJD2000_OFFSET
}

/// Calendar year containing the given MJD2000 time.
fn year_of_mjd2000(mjd2000: Mjd2000) -> i32 {
    let mut year = 2000 + (mjd2000 / DAYS_PER_YEAR).floor() as i32;
    while mjd2000 < year_start_mjd2000(year) {
        year -= 1;
    }
    while mjd2000 >= year_start_mjd2000(year + 1) {
        year += 1;
    }
    year
}

/// Convert MJD2000 to a calendar-exact decimal year.
///
/// The fractional part is the elapsed fraction of the actual calendar year
/// (365 or 366 days), so the mapping is piecewise-affine with breakpoints at
/// year boundaries.
pub fn mjd2000_to_decimal_year(mjd2000: Mjd2000) -> DecimalYear {
    let year = year_of_mjd2000(mjd2000);
    let start = year_start_mjd2000(year);
    let end = year_start_mjd2000(year + 1);
    year as f64 + (mjd2000 - start) / (end - start)
}

/// Convert a calendar-exact decimal year to MJD2000.
///
/// Inverse of [`mjd2000_to_decimal_year`].
pub fn decimal_year_to_mjd2000(decimal_year: DecimalYear) -> Mjd2000 {
    let year = decimal_year.floor() as i32;
    let start = year_start_mjd2000(year);
    let end = year_start_mjd2000(year + 1);
    start + (decimal_year - year as f64) * (end - start)
}

/// Convert a decimal year to MJD2000 using the linear 365.25-day year.
///
/// This is the documented approximation used by coefficient sets whose epochs
/// are expressed on the simple decimal-year scale. Round trips against the
/// calendar-exact conversions are only guaranteed within the same convention.
pub fn decimal_year_to_mjd2000_simple(decimal_year: DecimalYear) -> Mjd2000 {
    (decimal_year - 2000.0) * DAYS_PER_YEAR
}

/// Convert MJD2000 to a decimal year using the linear 365.25-day year.
///
/// Inverse of [`decimal_year_to_mjd2000_simple`].
pub fn mjd2000_to_decimal_year_simple(mjd2000: Mjd2000) -> DecimalYear {
    2000.0 + mjd2000 / DAYS_PER_YEAR
}

/// Compute the Greenwich Mean Sidereal Time (GMST) in radians
/// for a given MJD2000 time (UT1 time scale).
///
/// This function implements the IAU 1982/2000 polynomial formula
/// for the mean sidereal time at 0h UT1, plus the fractional-day
/// correction term due to Earth's rotation rate.
///
/// # Arguments
/// * `mjd2000` - fractional days since 2000-01-01T00:00:00 (UT1 time scale)
///
/// # Returns
/// * GMST angle in radians, normalized to the interval [0, 2π).
pub fn gmst_mjd2000(mjd2000: Mjd2000) -> Radian {
    // Polynomial coefficients for GMST at 0h UT1 (in seconds)
    const C0: f64 = 24110.54841;
    const C1: f64 = 8640184.812866;
    const C2: f64 = 9.3104e-2;
    const C3: f64 = -6.2e-6;

    // Ratio of sidereal day to solar day
    const RAP: f64 = 1.00273790934;

    // Integer day (0h UT1) and centuries since J2000.0
    let day = mjd2000.floor();
    let t = (day - J2000_MJD2000) / 36525.0;

    // GMST at 0h UT1 from the polynomial expression, converted to radians
    let mut gmst0 = ((C3 * t + C2) * t + C1) * t + C0;
    gmst0 *= DPI / 86400.0;

    // Contribution of the fraction of the day, scaled by the sidereal rate
    let h = (mjd2000 - day) * DPI;

    (gmst0 + h * RAP).rem_euclid(DPI)
}

#[cfg(test)]
mod time_test {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_datetime_to_mjd2000() {
        let mjd2000 = datetime_to_mjd2000("2016-01-01T00:00:00").unwrap();
        assert_eq!(mjd2000, 5844.0);

        let mjd2000 = datetime_to_mjd2000("2000-01-02T00:00:00").unwrap();
        assert_eq!(mjd2000, 1.0);

        assert!(matches!(
            datetime_to_mjd2000("not a date"),
            Err(GeomagError::InvalidDateTime(_))
        ));
    }

    #[test]
    fn test_decimal_year_exact() {
        // 2016-01-01 is 5844 days after 2000-01-01 (leap years 2000/04/08/12)
        assert_eq!(decimal_year_to_mjd2000(2016.0), 5844.0);
        assert_eq!(mjd2000_to_decimal_year(5844.0), 2016.0);

        // mid-year round trips
        for &dy in &[1999.5, 2004.123, 2015.9, 2020.25] {
            let back = mjd2000_to_decimal_year(decimal_year_to_mjd2000(dy));
            assert_relative_eq!(back, dy, epsilon = 1e-9);
        }
    }

    #[test]
    fn test_decimal_year_simple() {
        assert_eq!(decimal_year_to_mjd2000_simple(2016.0), 5844.0);
        assert_eq!(decimal_year_to_mjd2000_simple(2000.0), 0.0);
        assert_eq!(mjd2000_to_decimal_year_simple(365.25), 2001.0);

        // the two conventions drift apart away from integer leap cycles:
        // 2000 is a leap year, so 2001-01-01 is 366 days in, not 365.25
        assert_eq!(decimal_year_to_mjd2000(2001.0), 366.0);
        assert_eq!(decimal_year_to_mjd2000_simple(2001.0), 365.25);
    }

    #[test]
    fn test_gmst_mjd2000() {
        // 2015-01-06T11:29:03 UT1, reference value from the MJD-based formula
        let gmst = gmst_mjd2000(5484.478514610404);
        assert_relative_eq!(gmst, 4.851925725092499, epsilon = 1e-9);

        // J2000.0 noon: GMST ≈ 280.46°
        let gmst = gmst_mjd2000(0.5);
        assert_relative_eq!(gmst, 4.894961212789145, epsilon = 1e-9);
    }
}
