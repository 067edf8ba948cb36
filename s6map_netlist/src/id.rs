use contracts::*;
use std::fmt;
use std::hash::Hash;

/// Identifier of an instance inside a [`Netlist`](crate::Netlist).
///
/// Instances and nets draw their identifiers from the same counter, so an
/// `InstanceId` and a `NetId` never share a raw value within one graph.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct InstanceId {
    inner: u32,
}

impl InstanceId {
    /// Creates an instance identifier from a raw uid.
    #[ensures(ret.inner == uid)]
    pub const fn new(uid: u32) -> Self {
        Self { inner: uid }
    }

    /// Returns the raw uid.
    #[ensures(ret == self.inner)]
    pub const fn uid(self) -> u32 {
        self.inner
    }
}

impl fmt::Display for InstanceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "I{}", self.inner)
    }
}

/// Identifier of a net inside a [`Netlist`](crate::Netlist).
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NetId {
    inner: u32,
}

impl NetId {
    /// Creates a net identifier from a raw uid.
    #[ensures(ret.inner == uid)]
    pub const fn new(uid: u32) -> Self {
        Self { inner: uid }
    }

    /// Returns the raw uid.
    #[ensures(ret == self.inner)]
    pub const fn uid(self) -> u32 {
        self.inner
    }
}

impl fmt::Display for NetId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "N{}", self.inner)
    }
}

/// A pin of an instance, seen from the net it is attached to.
///
/// `Output` pins drive the net, `Input` pins consume it. The index counts
/// within the primitive's outputs or inputs respectively.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Pin {
    /// Input pin index.
    Input(usize),
    /// Output pin index.
    Output(usize),
}

impl Pin {
    /// Returns true for output pins.
    #[must_use]
    pub const fn is_output(&self) -> bool {
        matches!(self, Self::Output(_))
    }

    /// Returns the pin index regardless of direction.
    #[must_use]
    pub const fn index(&self) -> usize {
        match self {
            Self::Input(index) | Self::Output(index) => *index,
        }
    }
}
