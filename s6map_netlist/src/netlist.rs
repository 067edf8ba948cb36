//! The netlist graph: instances of primitives joined by single-driver nets.

use indexmap::IndexMap;
use itertools::Itertools;

use crate::primitive::{GND, VCC};
use crate::{InstanceId, NetId, Pin, Primitive};

/// One consumer (or the driver) of a net: an instance and one of its pins.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct Branch {
    /// Instance owning the pin.
    pub instance: InstanceId,
    /// Pin index on the input or output side.
    pub pin: usize,
}

/// A placed occurrence of a primitive.
#[derive(Clone, Debug)]
pub struct Instance {
    id: InstanceId,
    primitive: Primitive,
    attributes: IndexMap<String, String>,
    outputs: Vec<Option<NetId>>,
}

impl Instance {
    /// Handle of this instance.
    pub fn id(&self) -> InstanceId {
        self.id
    }

    /// Library cell or port this instance places.
    pub fn primitive(&self) -> &Primitive {
        &self.primitive
    }

    /// Attribute overrides, in the order they were first set.
    pub fn attributes(&self) -> impl Iterator<Item = (&str, &str)> {
        self.attributes.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    /// Attribute value, falling back to the primitive default.
    pub fn attribute(&self, name: &str) -> Option<&str> {
        self.attributes
            .get(name)
            .map(String::as_str)
            .or_else(|| self.primitive.default_attribute(name))
    }

    /// Net driven by the given output pin.
    pub fn output(&self, pin: usize) -> Option<NetId> {
        self.outputs.get(pin).copied().flatten()
    }

    /// Nets driven by each output pin.
    pub fn outputs(&self) -> &[Option<NetId>] {
        &self.outputs
    }
}

/// A connection with at most one driver and an ordered list of consumers.
///
/// The driver is owned by the instance side (`Instance::output`); `driver`
/// here mirrors it and is only written by [`Netlist`].
#[derive(Clone, Debug)]
pub struct Net {
    id: NetId,
    driver: Option<Branch>,
    consumers: Vec<Branch>,
}

impl Net {
    /// Handle of this net.
    pub fn id(&self) -> NetId {
        self.id
    }

    /// The output pin driving the net.
    pub fn driver(&self) -> Option<Branch> {
        self.driver
    }

    /// Input pins reading the net, in connection order.
    pub fn consumers(&self) -> &[Branch] {
        &self.consumers
    }

    /// True when nothing drives or consumes the net.
    pub fn is_floating(&self) -> bool {
        self.driver.is_none() && self.consumers.is_empty()
    }
}

/// Owner of all instances and nets of one design.
#[derive(Clone, Debug, Default)]
pub struct Netlist {
    instances: IndexMap<InstanceId, Instance>,
    nets: IndexMap<NetId, Net>,
    next_uid: u32,
    ground: Option<InstanceId>,
    power: Option<InstanceId>,
}

impl Netlist {
    /// An empty graph.
    pub fn new() -> Self {
        Self::default()
    }

    fn allocate_uid(&mut self) -> u32 {
        let uid = self.next_uid;
        self.next_uid += 1;
        uid
    }

    /// Allocates a net with a fresh uid, no driver and no consumers.
    pub fn create_net(&mut self) -> NetId {
        let id = NetId::new(self.allocate_uid());
        self.nets.insert(
            id,
            Net {
                id,
                driver: None,
                consumers: Vec::new(),
            },
        );
        id
    }

    /// Instantiates a primitive under a fresh uid.
    pub fn instantiate(&mut self, primitive: &Primitive) -> InstanceId {
        let id = InstanceId::new(self.allocate_uid());
        self.instantiate_with_id(id, primitive)
    }

    /// Instantiates a primitive under a caller-chosen uid.
    ///
    /// # Panics
    ///
    /// Panics if the uid is already used by an instance or a net.
    pub fn instantiate_with_id(&mut self, id: InstanceId, primitive: &Primitive) -> InstanceId {
        assert!(
            !self.instances.contains_key(&id) && !self.nets.contains_key(&NetId::new(id.uid())),
            "uid {} is already in use",
            id.uid()
        );
        self.next_uid = self.next_uid.max(id.uid() + 1);
        self.instances.insert(
            id,
            Instance {
                id,
                primitive: primitive.clone(),
                attributes: IndexMap::new(),
                outputs: vec![None; primitive.output_count()],
            },
        );
        id
    }

    /// Returns the shared constant source for `value`, creating it on first use.
    ///
    /// At most one `VCC` and one `GND` exist per graph.
    pub fn constant(&mut self, value: bool) -> InstanceId {
        let existing = if value { self.power } else { self.ground };
        if let Some(id) = existing {
            return id;
        }
        let id = self.instantiate(if value { &VCC } else { &GND });
        if value {
            self.power = Some(id);
        } else {
            self.ground = Some(id);
        }
        id
    }

    /// Returns the net driven by the shared constant source for `value`,
    /// creating the source and the net on first use.
    pub fn constant_net(&mut self, value: bool) -> NetId {
        let source = self.constant(value);
        if let Some(net) = self.instances.get(&source).and_then(|inst| inst.output(0)) {
            return net;
        }
        let net = self.create_net();
        self.add_branch(net, source, Pin::Output(0));
        net
    }

    /// Moves every consumer of `from` onto `into`, then removes `from`.
    ///
    /// Consumers are appended after those of `into` in their original order.
    /// A driver of `from` is detached; `into` keeps its own.
    ///
    /// # Panics
    ///
    /// Panics if either net does not exist.
    pub fn merge_net(&mut self, from: NetId, into: NetId) {
        assert!(self.nets.contains_key(&into), "no net {into}");
        if from == into {
            return;
        }
        let merged = self.free_net(from).unwrap_or_else(|| panic!("no net {from}"));
        self.nets[&into].consumers.extend(merged.consumers);
    }

    /// Attaches a pin of `instance` to `net`.
    ///
    /// An output pin becomes the driver of the net, replacing any previous
    /// driver without complaint; an input pin is appended to the consumers.
    ///
    /// # Panics
    ///
    /// Panics if the net or instance does not exist or the pin is out of range.
    pub fn add_branch(&mut self, net: NetId, instance: InstanceId, pin: Pin) {
        assert!(self.nets.contains_key(&net), "no net {net}");
        let inst = self
            .instances
            .get_mut(&instance)
            .unwrap_or_else(|| panic!("no instance {instance}"));
        match pin {
            Pin::Output(index) => {
                assert!(index < inst.outputs.len(), "{instance} has no output {index}");
                let previous_net = inst.outputs[index].replace(net);
                if let Some(previous_net) = previous_net.filter(|&prev| prev != net) {
                    if let Some(prev) = self.nets.get_mut(&previous_net) {
                        prev.driver = None;
                    }
                }
                let branch = Branch { instance, pin: index };
                let previous_driver = self.nets[&net].driver.replace(branch);
                if let Some(old) = previous_driver.filter(|&old| old != branch) {
                    if let Some(old_inst) = self.instances.get_mut(&old.instance) {
                        old_inst.outputs[old.pin] = None;
                    }
                }
            }
            Pin::Input(index) => {
                assert!(
                    index < inst.primitive.input_count(),
                    "{instance} has no input {index}"
                );
                self.nets[&net].consumers.push(Branch { instance, pin: index });
            }
        }
    }

    /// Removes one branch from `net`.
    ///
    /// For an input pin the first matching consumer entry is removed and the
    /// remaining entries keep their order. For an output pin the driver is
    /// cleared if it is that pin. Returns whether anything was removed.
    pub fn disconnect(&mut self, net: NetId, instance: InstanceId, pin: Pin) -> bool {
        let Some(n) = self.nets.get_mut(&net) else {
            return false;
        };
        match pin {
            Pin::Output(index) => {
                let branch = Branch { instance, pin: index };
                if n.driver != Some(branch) {
                    return false;
                }
                n.driver = None;
                if let Some(inst) = self.instances.get_mut(&instance) {
                    inst.outputs[index] = None;
                }
                true
            }
            Pin::Input(index) => {
                let branch = Branch { instance, pin: index };
                match n.consumers.iter().position(|b| *b == branch) {
                    Some(position) => {
                        n.consumers.remove(position);
                        true
                    }
                    None => false,
                }
            }
        }
    }

    /// Sets or overwrites one attribute of an instance.
    ///
    /// # Panics
    ///
    /// Panics if the instance does not exist.
    pub fn set_attribute(&mut self, instance: InstanceId, name: impl Into<String>, value: impl Into<String>) {
        self.instances
            .get_mut(&instance)
            .unwrap_or_else(|| panic!("no instance {instance}"))
            .attributes
            .insert(name.into(), value.into());
    }

    /// Detaches an instance from every net it drives or consumes, then drops it.
    pub fn free_instance(&mut self, instance: InstanceId) -> Option<Instance> {
        let inst = self.instances.shift_remove(&instance)?;
        for net in inst.outputs.iter().flatten() {
            if let Some(n) = self.nets.get_mut(net) {
                n.driver = None;
            }
        }
        for net in self.nets.values_mut() {
            net.consumers.retain(|b| b.instance != instance);
        }
        if self.ground == Some(instance) {
            self.ground = None;
        }
        if self.power == Some(instance) {
            self.power = None;
        }
        Some(inst)
    }

    /// Removes a net, clearing the output slot of its driver.
    pub fn free_net(&mut self, net: NetId) -> Option<Net> {
        let n = self.nets.shift_remove(&net)?;
        if let Some(driver) = n.driver {
            if let Some(inst) = self.instances.get_mut(&driver.instance) {
                inst.outputs[driver.pin] = None;
            }
        }
        Some(n)
    }

    /// Instance by handle.
    pub fn instance(&self, id: InstanceId) -> Option<&Instance> {
        self.instances.get(&id)
    }

    /// Net by handle.
    pub fn net(&self, id: NetId) -> Option<&Net> {
        self.nets.get(&id)
    }

    /// Driver of `net`, if any.
    pub fn driver(&self, net: NetId) -> Option<Branch> {
        self.nets.get(&net).and_then(Net::driver)
    }

    /// Consumers of `net`; empty for an unknown net.
    pub fn consumers(&self, net: NetId) -> &[Branch] {
        self.nets.get(&net).map(Net::consumers).unwrap_or(&[])
    }

    /// Instances in creation order.
    pub fn instances(&self) -> impl Iterator<Item = &Instance> {
        self.instances.values()
    }

    /// Nets in creation order.
    pub fn nets(&self) -> impl Iterator<Item = &Net> {
        self.nets.values()
    }

    /// Number of live instances.
    pub fn instance_count(&self) -> usize {
        self.instances.len()
    }

    /// Number of live nets.
    pub fn net_count(&self) -> usize {
        self.nets.len()
    }

    /// The shared `GND` source, once created.
    pub fn ground(&self) -> Option<InstanceId> {
        self.ground
    }

    /// The shared `VCC` source, once created.
    pub fn power(&self) -> Option<InstanceId> {
        self.power
    }

    /// Instances of the named primitive, in creation order.
    pub fn instances_of<'a>(&'a self, name: &'a str) -> impl Iterator<Item = &'a Instance> + 'a {
        self.instances.values().filter(move |inst| inst.primitive.name() == name)
    }

    /// Number of instances per primitive name, sorted by name.
    ///
    /// Boundary ports are counted under `<port>`.
    pub fn cell_usage(&self) -> Vec<(String, usize)> {
        self.instances
            .values()
            .map(|inst| {
                if inst.primitive.is_port() {
                    "<port>".to_string()
                } else {
                    inst.primitive.name().to_string()
                }
            })
            .counts()
            .into_iter()
            .sorted()
            .collect()
    }
}
