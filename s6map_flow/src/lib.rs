//! Spartan-6 technology mapping.
//!
//! Lowers a signal-level [`Module`](s6map_ir::Module) to a netlist of `UNISIMS`
//! primitives: ports and the clock are buffered, constant drivers are tied to
//! shared `VCC`/`GND` sources and combinational logic is mapped to LUTs. The
//! result is exported as EDIF together with a symbol table relating netlist uids
//! to source names.

pub mod config;
mod design;
mod error;
mod flow;

pub use config::{DEFAULT_PART, FlowConfig, FlowConfigBuilder};
pub use error::FlowError;
pub use flow::{CELL_LIBRARY, Flow, MANUFACTURER, Mapped, detect_clock, run};
