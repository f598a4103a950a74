/// Failure modes of the projection simulator. Validation is eager: the
/// first invalid input aborts the run, no clamping, no partial output.
#[derive(Debug, Clone, Copy, PartialEq, thiserror::Error)]
pub enum SimulationError {
    #[error("horizon must cover at least one year, got {0}")]
    InvalidHorizon(u32),

    #[error("annual rate must be greater than -100%, got {0}")]
    InvalidRate(f64),

    #[error("target must be greater than zero, got {0}")]
    InvalidTarget(f64),
}
