use crate::{PortDirection, Primitive};

/// A port of the design boundary.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct IoPort {
    /// Port name, also its name in the top-cell interface.
    pub name: String,
    /// Whether the port enters or leaves the design.
    pub direction: PortDirection,
}

/// Records the ports of the design boundary in creation order.
///
/// Each port is handed out as a [`Primitive`] that can be instantiated in a
/// [`Netlist`](crate::Netlist) like any other cell with a single pin.
#[derive(Clone, Debug, Default)]
pub struct IoPorts {
    ports: Vec<IoPort>,
}

impl IoPorts {
    /// No ports yet.
    pub fn new() -> Self {
        Self::default()
    }

    /// Records a port and returns the primitive to instantiate for it.
    pub fn create(&mut self, direction: PortDirection, name: impl Into<String>) -> Primitive {
        let name = name.into();
        tracing::trace!("creating {direction} port {name}");
        let primitive = Primitive::port(direction, name.clone());
        self.ports.push(IoPort { name, direction });
        primitive
    }

    /// Ports in creation order.
    pub fn ports(&self) -> &[IoPort] {
        &self.ports
    }

    /// Number of ports.
    pub fn len(&self) -> usize {
        self.ports.len()
    }

    /// True when no port was created.
    pub fn is_empty(&self) -> bool {
        self.ports.is_empty()
    }
}
