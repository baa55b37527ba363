use nalgebra::Vector3;

use geomag::coefficients::{CoefficientStore, GaussCoefficients, StaticCoefficients};
use geomag::dipole::geomagnetic_pole;
use geomag::model::{EvalOptions, GeomagneticModel, SphericalHarmonicModel};
use geomag::spherical_harmonic::FieldSource;

/// Evaluate a centered-dipole field built from a degree-1 coefficient set
/// and derive the geomagnetic pole it implies.
fn main() {
    let mut coeffs = GaussCoefficients::zeros(1, 1).unwrap();
    coeffs.set_g(1, 0, -29442.0).unwrap();
    coeffs.set_g(1, 1, -1501.0).unwrap();
    coeffs.set_h(1, 1, 4797.1).unwrap();

    let (pole_lat, pole_lon) = geomagnetic_pole(&coeffs).unwrap();
    println!("north geomagnetic pole: {pole_lat:.2}°, {pole_lon:.2}°");

    let model = SphericalHarmonicModel::new(
        CoefficientStore::Static(StaticCoefficients::new(coeffs)),
        FieldSource::Internal,
    );

    let positions = [
        Vector3::new(0.0, 0.0, 6371.2),
        Vector3::new(45.0, 15.0, 6771.2),
        Vector3::new(-78.5, 111.0, 6771.2),
    ];
    let fields = model.eval(&[0.0], &positions, &EvalOptions::default()).unwrap();

    for (position, field) in positions.iter().zip(&fields) {
        println!(
            "lat {:7.2}°  lon {:7.2}°  r {:7.1} km  ->  B_NEC [{:9.1}, {:9.1}, {:9.1}] nT  |B| {:8.1} nT",
            position.x,
            position.y,
            position.z,
            field.x,
            field.y,
            field.z,
            field.norm()
        );
    }
}
