use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Error)]
pub enum SimulationError {
    #[error("missing coordinate: {0}")]
    MissingCoordinate(&'static str),

    #[error("invalid coordinate {name}: {value}")]
    InvalidCoordinate { name: &'static str, value: f64 },
}
