//! Gate-level netlist model for the Spartan-6 mapper.
//!
//! A [`Netlist`] owns [`Instance`]s of [`Primitive`]s and the [`Net`]s joining
//! them. Every net has at most one driver, recorded in the output slot of the
//! driving instance, and an ordered list of consumers. A [`SymbolStore`] maps
//! object uids to source-level names, and [`edif::write_edif`] serializes the
//! finished graph.

pub mod edif;
mod id;
mod io;
mod netlist;
pub mod primitive;
mod symbol;

pub use edif::{EdifFlavor, EdifParams, write_edif};
pub use id::{InstanceId, NetId, Pin};
pub use io::{IoPort, IoPorts};
pub use netlist::{Branch, Instance, Net, Netlist};
pub use primitive::{MAX_LUT_INPUTS, PortDirection, Primitive, PrimitiveKind, lut, lut_init};
pub use symbol::{Symbol, SymbolError, SymbolStore, SymbolTag};
