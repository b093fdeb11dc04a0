use thiserror::Error;

#[derive(Debug, Error)]
pub enum PecError {
    #[error("Domain error: {0}")]
    Domain(String),

    #[error("Config error: {0}")]
    Config(String),

    #[error("Out of range: {axis} {value} outside tabulated range [{min}, {max}]")]
    OutOfRange {
        axis: &'static str,
        value: f64,
        min: f64,
        max: f64,
    },

    #[error("No solution: {0}")]
    NoSolution(String),

    #[error("Convergence error after {iterations} iterations: {message}")]
    Convergence { iterations: usize, message: String },

    #[error("Computation error: {0}")]
    Computation(String),

    #[error("Data error: {0}")]
    Data(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("TOML error: {0}")]
    Toml(#[from] toml::de::Error),
}

impl PecError {
    /// Whether a batch or scan may record this failure and move on.
    pub fn is_recoverable(&self) -> bool {
        matches!(self, PecError::NoSolution(_) | PecError::Convergence { .. })
    }
}

pub type Result<T> = std::result::Result<T, PecError>;
