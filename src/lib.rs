pub mod coefficients;
pub mod constants;
pub mod coordinates;
pub mod dipole;
pub mod geomag_errors;
pub mod legendre;
pub mod model;
pub mod spherical_harmonic;
pub mod sun;
pub mod time;
