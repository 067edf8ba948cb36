use std::io;
use std::path::PathBuf;

use s6map_ir::ParseError;
use s6map_lut::LutError;
use s6map_netlist::{SymbolError, SymbolTag};
use thiserror::Error;

/// Conditions that abort a mapping run.
#[derive(Debug, Error)]
pub enum FlowError {
    /// The clock is an output port.
    #[error("clock signal `{signal}` is an output port")]
    OutputClock { signal: String },
    /// A flip-flop clock is an expression.
    #[error("flip-flop `{signal}` is clocked by an expression instead of a signal")]
    ClockNotSignal { signal: String },
    /// Flip-flops use different clocks.
    #[error("design has more than one clock: `{first}` and `{second}` (flip-flop `{signal}`)")]
    MultiClock {
        first: String,
        second: String,
        signal: String,
    },
    /// A driver contains a flip-flop.
    #[error("logic driving `{signal}` cannot be mapped")]
    UnsupportedLogic { signal: String },
    /// A name the flow registered is missing.
    #[error("symbol {tag}:{name} was never registered")]
    UnknownSymbol { tag: SymbolTag, name: String },
    /// The mapper rejected the logic of one signal.
    #[error("LUT mapping of `{signal}` failed: {source}")]
    Lut {
        signal: String,
        #[source]
        source: LutError,
    },
    /// The mapper could not be configured.
    #[error("LUT mapper configuration: {0}")]
    Mapper(#[from] LutError),
    /// The input could not be parsed.
    #[error(transparent)]
    Parse(#[from] ParseError),
    /// A generated net name is taken.
    #[error(transparent)]
    Symbol(#[from] SymbolError),
    /// The configuration file is invalid.
    #[error("invalid configuration: {0}")]
    Config(#[from] serde_json::Error),
    /// A file could not be read or written.
    #[error("I/O error on {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

impl FlowError {
    pub(crate) fn io(path: impl Into<PathBuf>) -> impl FnOnce(io::Error) -> Self {
        let path = path.into();
        move |source| Self::Io { path, source }
    }
}
