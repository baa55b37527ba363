//! # Constants and type definitions for geomag
//!
//! This module centralizes the **physical constants**, **conversion factors**, and **common type
//! definitions** used throughout the `geomag` library.
//!
//! ## Overview
//!
//! - Geomagnetic and geodetic reference constants (reference sphere, WGS84 ellipsoid)
//! - Unit conversions (degrees ↔ radians, days ↔ years)
//! - Core type aliases used across the crate
//!
//! These definitions are used by all main modules, including the coefficient stores,
//! the field evaluator, and the coordinate conversions.

// -------------------------------------------------------------------------------------------------
// Physical constants and unit conversions
// -------------------------------------------------------------------------------------------------

/// 2π, useful for trigonometric conversions
pub const DPI: f64 = 2. * std::f64::consts::PI;

/// Degrees → radians
pub const RADEG: f64 = std::f64::consts::PI / 180.0;

/// Radians → degrees
pub const DEGRAD: f64 = 180.0 / std::f64::consts::PI;

/// Mean geomagnetic reference sphere radius in kilometers (IAGA convention)
pub const REFERENCE_RADIUS: f64 = 6371.2;

/// WGS84 equatorial radius in kilometers
pub const WGS84_A: f64 = 6378.137;

/// WGS84 polar radius in kilometers
pub const WGS84_B: f64 = 6356.7523142;

/// WGS84 first eccentricity squared
pub const WGS84_EPS2: f64 = 1.0 - (WGS84_B / WGS84_A) * (WGS84_B / WGS84_A);

/// Number of days in a Julian year
pub const DAYS_PER_YEAR: f64 = 365.25;

/// MJD of the MJD2000 epoch (2000-01-01T00:00:00)
pub const MJD2000_OFFSET: f64 = 51544.0;

/// J2000.0 (2000-01-01T12:00:00 TT) expressed in MJD2000 days
pub const J2000_MJD2000: f64 = 0.5;

// -------------------------------------------------------------------------------------------------
// Type aliases
// -------------------------------------------------------------------------------------------------

/// Angle in degrees
pub type Degree = f64;
/// Angle in radians
pub type Radian = f64;
/// Distance in kilometers
pub type Kilometer = f64;
/// Magnetic field strength in nanotesla
pub type Nanotesla = f64;
/// Modified Julian Date 2000 (fractional days since 2000-01-01T00:00:00)
pub type Mjd2000 = f64;
/// Time expressed as a fractional calendar year
pub type DecimalYear = f64;
