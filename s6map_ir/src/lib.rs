//! Signal-level intermediate representation consumed by the mapper.
//!
//! A [`Module`] is an ordered list of single-bit [`Signal`]s. Each signal may be
//! driven by an [`Expr`]: a literal, another signal, combinational logic, or a
//! flip-flop. [`Purity`] classifies a driver by how it can be implemented.

mod expr;
mod module;
mod parse;

pub use expr::{Expr, FlipFlop, Purity};
pub use module::{Module, Signal, SignalId, SignalKind};
pub use parse::{ParseError, parse, parse_file};
