use quickcheck::{Arbitrary, Gen, quickcheck};
use s6map_netlist::primitive::LUT2;
use s6map_netlist::{Branch, InstanceId, NetId, Netlist, Pin};

const NETS: usize = 3;
const INSTANCES: usize = 4;

#[derive(Clone, Debug)]
enum Op {
    Connect { net: usize, instance: usize, pin: Pin },
    Disconnect { net: usize, instance: usize, pin: Pin },
}

impl Arbitrary for Op {
    fn arbitrary(g: &mut Gen) -> Self {
        let net = usize::arbitrary(g) % NETS;
        let instance = usize::arbitrary(g) % INSTANCES;
        let pin = if bool::arbitrary(g) {
            Pin::Output(0)
        } else {
            Pin::Input(usize::arbitrary(g) % 2)
        };
        if u8::arbitrary(g) % 3 == 0 {
            Op::Disconnect { net, instance, pin }
        } else {
            Op::Connect { net, instance, pin }
        }
    }
}

/// Reference model: one optional driver and a plain consumer list per net.
#[derive(Default)]
struct Model {
    drivers: [Option<usize>; NETS],
    consumers: [Vec<(usize, usize)>; NETS],
}

impl Model {
    fn apply(&mut self, op: &Op) {
        match *op {
            Op::Connect { net, instance, pin: Pin::Output(_) } => {
                for driver in self.drivers.iter_mut() {
                    if *driver == Some(instance) {
                        *driver = None;
                    }
                }
                self.drivers[net] = Some(instance);
            }
            Op::Connect { net, instance, pin: Pin::Input(pin) } => {
                self.consumers[net].push((instance, pin));
            }
            Op::Disconnect { net, instance, pin: Pin::Output(_) } => {
                if self.drivers[net] == Some(instance) {
                    self.drivers[net] = None;
                }
            }
            Op::Disconnect { net, instance, pin: Pin::Input(pin) } => {
                if let Some(pos) = self.consumers[net].iter().position(|c| *c == (instance, pin)) {
                    self.consumers[net].remove(pos);
                }
            }
        }
    }
}

fn run(ops: &[Op]) -> bool {
    let mut netlist = Netlist::new();
    let instances: Vec<InstanceId> = (0..INSTANCES).map(|_| netlist.instantiate(&LUT2)).collect();
    let nets: Vec<NetId> = (0..NETS).map(|_| netlist.create_net()).collect();
    let mut model = Model::default();

    for op in ops {
        match *op {
            Op::Connect { net, instance, pin } => netlist.add_branch(nets[net], instances[instance], pin),
            Op::Disconnect { net, instance, pin } => {
                netlist.disconnect(nets[net], instances[instance], pin);
            }
        }
        model.apply(op);
    }

    let nets_agree = (0..NETS).all(|n| {
        let driver = netlist.driver(nets[n]).map(|b| b.instance);
        let consumers: Vec<Branch> = model.consumers[n]
            .iter()
            .map(|&(i, pin)| Branch { instance: instances[i], pin })
            .collect();
        driver == model.drivers[n].map(|i| instances[i]) && netlist.consumers(nets[n]) == consumers.as_slice()
    });
    let slots_agree = (0..INSTANCES).all(|i| {
        let expected = (0..NETS).find(|&n| model.drivers[n] == Some(i)).map(|n| nets[n]);
        netlist.instance(instances[i]).and_then(|inst| inst.output(0)) == expected
    });
    nets_agree && slots_agree
}

quickcheck! {
    fn prop_branches_match_reference_model(ops: Vec<Op>) -> bool {
        run(&ops)
    }

    fn prop_free_instance_removes_every_branch(ops: Vec<Op>, victim: usize) -> bool {
        let mut netlist = Netlist::new();
        let instances: Vec<InstanceId> = (0..INSTANCES).map(|_| netlist.instantiate(&LUT2)).collect();
        let nets: Vec<NetId> = (0..NETS).map(|_| netlist.create_net()).collect();
        for op in &ops {
            if let Op::Connect { net, instance, pin } = *op {
                netlist.add_branch(nets[net], instances[instance], pin);
            }
        }
        let victim = instances[victim % INSTANCES];
        netlist.free_instance(victim);
        let detached = netlist.nets().all(|net| {
            net.driver().is_none_or(|b| b.instance != victim)
                && net.consumers().iter().all(|b| b.instance != victim)
        });
        detached
    }
}
