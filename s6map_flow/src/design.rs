use s6map_ir::{Module, Signal};
use s6map_lut::{LutFactory, LutMapper, Mapper};
use s6map_netlist::primitive::{BUFGP, IBUF, LUT_O, OBUF};
use s6map_netlist::{
    InstanceId, IoPorts, MAX_LUT_INPUTS, NetId, Netlist, Pin, PortDirection, Primitive, SymbolStore, SymbolTag, lut,
    lut_init,
};
use tracing::{debug, trace, warn};

use crate::FlowError;

/// How a boundary signal is buffered.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) enum Role {
    Clock,
    Input,
    Output,
}

impl Role {
    fn buffer(self) -> &'static Primitive {
        match self {
            Role::Clock => &BUFGP,
            Role::Input => &IBUF,
            Role::Output => &OBUF,
        }
    }

    fn direction(self) -> PortDirection {
        match self {
            Role::Clock | Role::Input => PortDirection::In,
            Role::Output => PortDirection::Out,
        }
    }
}

/// The graph under construction with its boundary and name table.
#[derive(Debug, Default)]
pub(crate) struct Design {
    pub(crate) io: IoPorts,
    pub(crate) netlist: Netlist,
    pub(crate) symbols: SymbolStore,
}

impl Design {
    /// Creates the fabric net of a signal and, for boundary signals, the pad
    /// net, the buffer between them and the port.
    pub(crate) fn materialize(&mut self, name: &str, role: Option<Role>) -> Result<(), FlowError> {
        let net = self.netlist.create_net();
        self.symbols.add(net.uid(), SymbolTag::Net, name)?;
        let Some(role) = role else {
            trace!("`{name}`: internal net {net}");
            return Ok(());
        };

        let buffer = self.netlist.instantiate(role.buffer());
        self.name_instance(buffer, format!("{name}_BUF"));
        let pad = self.netlist.create_net();
        self.symbols.add(pad.uid(), SymbolTag::Net, format!("{name}_IO"))?;
        let port = self.netlist.instantiate(&self.io.create(role.direction(), name));
        self.name_instance(port, name.to_string());

        // every buffer has pin I on the pad side and pin O on the fabric side
        match role.direction() {
            PortDirection::In => {
                self.netlist.add_branch(pad, port, Pin::Output(0));
                self.netlist.add_branch(pad, buffer, Pin::Input(0));
                self.netlist.add_branch(net, buffer, Pin::Output(0));
            }
            PortDirection::Out => {
                self.netlist.add_branch(net, buffer, Pin::Input(0));
                self.netlist.add_branch(pad, buffer, Pin::Output(0));
                self.netlist.add_branch(pad, port, Pin::Input(0));
            }
        }
        debug!("`{name}`: {} {buffer} between {net} and {pad}", role.buffer());
        Ok(())
    }

    /// Registers an instance name, suffixed when a port or another generated
    /// name already holds it.
    fn name_instance(&mut self, instance: InstanceId, name: String) {
        let symbol = self.symbols.add_unique(instance.uid(), SymbolTag::Instance, name.as_str());
        if symbol.name() != name {
            debug!("instance name `{name}` is taken; {instance} is `{}`", symbol.name());
        }
    }

    /// Fabric net of a signal.
    pub(crate) fn resolve(&self, name: &str) -> Result<NetId, FlowError> {
        self.symbols
            .lookup(name, SymbolTag::Net)
            .and_then(|symbol| symbol.net())
            .ok_or_else(|| FlowError::UnknownSymbol {
                tag: SymbolTag::Net,
                name: name.to_string(),
            })
    }

    /// Folds the net of a constant signal into the net of the shared
    /// constant source, keeping its consumers and moving its name.
    pub(crate) fn drive_constant(&mut self, signal: &Signal, value: bool) -> Result<(), FlowError> {
        let net = self.resolve(&signal.name)?;
        let shared = self.netlist.constant_net(value);
        self.netlist.merge_net(net, shared);
        self.symbols.retarget(SymbolTag::Net, net.uid(), shared.uid());
        debug!("`{}`: constant {} on {shared}", signal.name, u8::from(value));
        Ok(())
    }

    /// Maps the combinational driver of a signal to LUTs and wires them in.
    pub(crate) fn map_signal(&mut self, module: &Module, signal: &Signal, mapper: &Mapper) -> Result<(), FlowError> {
        let Some(source) = signal.source.as_ref() else {
            return Ok(());
        };
        let mut luts = NetlistLuts {
            netlist: &mut self.netlist,
            created: Vec::new(),
        };
        let mapping = mapper
            .map(MAX_LUT_INPUTS, &mut luts, source)
            .map_err(|source| FlowError::Lut {
                signal: signal.name.clone(),
                source,
            })?;
        let created = luts.created;
        for (k, gate) in created.iter().enumerate() {
            self.name_instance(*gate, format!("{}_LUT{k}", signal.name));
        }

        let Some(mapping) = mapping else {
            warn!("`{}` reduces to a plain signal; nets are left separate", signal.name);
            return Ok(());
        };
        let net = self.resolve(&signal.name)?;
        self.netlist.add_branch(net, mapping.output, LUT_O);
        for assoc in &mapping.inputs {
            let input = self.resolve(&module.signal(assoc.signal).name)?;
            self.netlist.add_branch(input, assoc.gate, Pin::Input(assoc.port));
        }
        debug!(
            "`{}`: {} LUT(s), {} input(s)",
            signal.name,
            created.len(),
            mapping.inputs.len()
        );
        Ok(())
    }
}

/// Builds mapper gates as LUT instances of a netlist.
struct NetlistLuts<'a> {
    netlist: &'a mut Netlist,
    created: Vec<InstanceId>,
}

impl LutFactory for NetlistLuts<'_> {
    type Gate = InstanceId;

    fn create(&mut self, inputs: usize, contents: u64) -> InstanceId {
        let id = self.netlist.instantiate(lut(inputs));
        self.netlist.set_attribute(id, "INIT", lut_init(inputs, contents));
        self.created.push(id);
        id
    }

    fn connect(&mut self, from: InstanceId, to: InstanceId, port: usize) {
        let net = self.netlist.create_net();
        self.netlist.add_branch(net, from, LUT_O);
        self.netlist.add_branch(net, to, Pin::Input(port));
    }
}
