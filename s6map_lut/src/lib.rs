//! Technology-independent LUT mapping.
//!
//! Combinational logic ([`s6map_ir::Expr`]) is reduced to a [`Bdd`] and
//! lowered to lookup tables through a [`LutFactory`] supplied by the caller, so
//! the mappers never see the netlist they build.

mod bdd;
mod error;
mod mapper;
mod shannon;
mod single;

pub use bdd::{Bdd, Ref, VarOrder};
pub use error::LutError;
pub use mapper::{InputAssoc, LutFactory, LutMapper, Mapper, MapperKind, MapperOptions, Mapping};
pub use shannon::Shannon;
pub use single::SingleLut;
