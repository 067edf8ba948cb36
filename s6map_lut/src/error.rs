use thiserror::Error;

/// LUT mapping failures.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum LutError {
    /// The function needs more inputs than one LUT has.
    #[error("logic depends on {needed} inputs but a LUT takes at most {max}")]
    TooManyInputs { needed: usize, max: usize },
    /// The requested fan-in is not a LUT size.
    #[error("fan-in limit {0} is outside 1..=6")]
    BadFanIn(usize),
    /// A mapper option key or value is not recognized.
    #[error("unknown mapper option `{key}={value}`")]
    BadOption { key: String, value: String },
    /// No mapper has this name.
    #[error("unknown LUT mapper `{0}`")]
    UnknownMapper(String),
    /// The expression contains a flip-flop.
    #[error("flip-flops cannot be mapped to LUTs")]
    Sequential,
}
