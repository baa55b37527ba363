use thiserror::Error;

#[derive(Error, Debug)]
pub enum GeomagError {
    #[error("Invalid spherical harmonic degree request: {0}")]
    InvalidDegree(String),

    #[error("Incompatible array shapes: {times} times vs {positions} positions")]
    ShapeMismatch { times: usize, positions: usize },

    #[error("Malformed coefficient input: {0}")]
    MalformedCoefficients(String),

    #[error("Invalid datetime: {0}")]
    InvalidDateTime(String),

    #[error("Unable to perform file operation: {0}")]
    IoError(#[from] std::io::Error),
}

impl PartialEq for GeomagError {
    fn eq(&self, other: &Self) -> bool {
        use GeomagError::*;
        match (self, other) {
            (InvalidDegree(a), InvalidDegree(b)) => a == b,
            (
                ShapeMismatch {
                    times: t1,
                    positions: p1,
                },
                ShapeMismatch {
                    times: t2,
                    positions: p2,
                },
            ) => t1 == t2 && p1 == p2,
            (MalformedCoefficients(a), MalformedCoefficients(b)) => a == b,
            (InvalidDateTime(a), InvalidDateTime(b)) => a == b,

            // IO errors are not comparable: equality on the variant only
            (IoError(_), IoError(_)) => true,

            _ => false,
        }
    }
}
