use std::collections::BTreeMap;

use quickcheck::{Arbitrary, Gen, quickcheck};
use rstest::rstest;
use s6map_ir::{Expr, SignalId};
use s6map_lut::{
    Bdd, InputAssoc, LutError, LutFactory, LutMapper, MapperKind, Mapping, Shannon, SingleLut, VarOrder,
};

/// Records gates and wires so mapped logic can be simulated.
#[derive(Default, Debug)]
struct Sim {
    luts: Vec<(usize, u64)>,
    wires: Vec<(usize, usize, usize)>,
}

impl LutFactory for Sim {
    type Gate = usize;

    fn create(&mut self, inputs: usize, contents: u64) -> usize {
        self.luts.push((inputs, contents));
        self.luts.len() - 1
    }

    fn connect(&mut self, from: usize, to: usize, port: usize) {
        self.wires.push((from, to, port));
    }
}

impl Sim {
    fn port(&self, mapping: &Mapping<usize>, gate: usize, port: usize, value_of: &impl Fn(SignalId) -> bool) -> bool {
        if let Some(assoc) = mapping.inputs.iter().find(|a| a.gate == gate && a.port == port) {
            return value_of(assoc.signal);
        }
        let (from, _, _) = self
            .wires
            .iter()
            .find(|(_, to, p)| *to == gate && *p == port)
            .unwrap_or_else(|| panic!("gate {gate} port {port} is undriven"));
        self.gate(mapping, *from, value_of)
    }

    fn gate(&self, mapping: &Mapping<usize>, gate: usize, value_of: &impl Fn(SignalId) -> bool) -> bool {
        let (inputs, contents) = self.luts[gate];
        let row = (0..inputs)
            .filter(|&port| self.port(mapping, gate, port, value_of))
            .fold(0, |row, port| row | (1 << port));
        (contents >> row) & 1 == 1
    }

    fn drivers_per_port(&self, mapping: &Mapping<usize>) -> bool {
        self.luts.iter().enumerate().all(|(gate, &(inputs, _))| {
            (0..inputs).all(|port| {
                let assocs = mapping.inputs.iter().filter(|a| a.gate == gate && a.port == port).count();
                let wires = self.wires.iter().filter(|(_, to, p)| *to == gate && *p == port).count();
                assocs + wires == 1
            })
        })
    }
}

fn s(i: usize) -> Expr {
    Expr::signal(SignalId::new(i))
}

fn wide_and(n: usize) -> Expr {
    (1..n).fold(s(0), |acc, i| Expr::and(acc, s(i)))
}

#[rstest]
#[case(MapperKind::Single)]
#[case(MapperKind::Shannon)]
fn two_input_and_is_one_lut2(#[case] kind: MapperKind) {
    let mapper = kind.build(&BTreeMap::new()).expect("no options");
    let mut sim = Sim::default();
    let mapping = mapper
        .map(6, &mut sim, &Expr::and(s(0), s(1)))
        .expect("maps")
        .expect("has logic");
    assert_eq!(sim.luts, vec![(2, 0b1000)]);
    assert_eq!(
        mapping.inputs,
        vec![
            InputAssoc { gate: 0, port: 0, signal: SignalId::new(0) },
            InputAssoc { gate: 0, port: 1, signal: SignalId::new(1) },
        ]
    );
}

#[rstest]
#[case(MapperKind::Single)]
#[case(MapperKind::Shannon)]
fn identity_needs_no_logic(#[case] kind: MapperKind) {
    let mapper = kind.build(&BTreeMap::new()).expect("no options");
    let mut sim = Sim::default();
    let expr = Expr::or(s(2), Expr::and(s(2), s(1)));
    assert_eq!(mapper.map(6, &mut sim, &expr), Ok(None));
    assert!(sim.luts.is_empty());
}

#[rstest]
#[case(Expr::and(s(4), Expr::not(s(4))), 0b00)]
#[case(Expr::or(s(4), Expr::not(s(4))), 0b11)]
fn constant_logic_keeps_first_input(#[case] expr: Expr, #[case] table: u64) {
    let mut sim = Sim::default();
    let mapping = Shannon::default()
        .map(6, &mut sim, &expr)
        .expect("maps")
        .expect("has logic");
    assert_eq!(sim.luts, vec![(1, table)]);
    assert_eq!(mapping.inputs, vec![InputAssoc { gate: 0, port: 0, signal: SignalId::new(4) }]);
}

#[test]
fn single_rejects_wide_logic() {
    let mut sim = Sim::default();
    assert_eq!(
        SingleLut::default().map(6, &mut sim, &wide_and(7)),
        Err(LutError::TooManyInputs { needed: 7, max: 6 })
    );
}

#[test]
fn shannon_splits_wide_logic() {
    let expr = wide_and(9);
    let mut sim = Sim::default();
    let mapping = Shannon::default()
        .map(6, &mut sim, &expr)
        .expect("maps")
        .expect("has logic");
    assert!(sim.luts.len() > 1);
    assert!(sim.luts.iter().all(|&(inputs, _)| inputs <= 6));
    assert!(sim.drivers_per_port(&mapping));
    for row in 0..1usize << 9 {
        let value_of = |id: SignalId| (row >> id.index()) & 1 == 1;
        assert_eq!(sim.gate(&mapping, mapping.output, &value_of), row == (1 << 9) - 1);
    }
}

#[rstest]
#[case(0)]
#[case(7)]
fn fan_in_limit_is_checked(#[case] max: usize) {
    let mut sim = Sim::default();
    assert_eq!(
        Shannon::default().map(max, &mut sim, &s(0)),
        Err(LutError::BadFanIn(max))
    );
}

#[test]
fn sequential_logic_is_rejected() {
    let mut sim = Sim::default();
    assert_eq!(
        SingleLut::default().map(6, &mut sim, &Expr::fd(s(0), s(1))),
        Err(LutError::Sequential)
    );
}

#[test]
fn reverse_order_swaps_pins() {
    let extra = BTreeMap::from([("order".to_string(), "reverse".to_string())]);
    let mapper = MapperKind::Single.build(&extra).expect("known option");
    let mut sim = Sim::default();
    let mapping = mapper
        .map(6, &mut sim, &Expr::and(s(0), Expr::not(s(1))))
        .expect("maps")
        .expect("has logic");
    // s1 on pin 0, s0 on pin 1: true only for row 0b10
    assert_eq!(sim.luts, vec![(2, 0b0100)]);
    assert_eq!(mapping.inputs[0].signal, SignalId::new(1));
}

const VARS: usize = 9;

#[derive(Clone, Debug)]
struct Logic(Expr);

fn arbitrary_expr(g: &mut Gen, depth: usize) -> Expr {
    let choice = if depth == 0 { 0 } else { u8::arbitrary(g) % 7 };
    match choice {
        0 if u8::arbitrary(g) % 16 == 0 => Expr::Boolean(bool::arbitrary(g)),
        0 | 1 => s(usize::arbitrary(g) % VARS),
        2 => Expr::not(arbitrary_expr(g, depth - 1)),
        3 => Expr::and(arbitrary_expr(g, depth - 1), arbitrary_expr(g, depth - 1)),
        4 => Expr::or(arbitrary_expr(g, depth - 1), arbitrary_expr(g, depth - 1)),
        5 => Expr::xor(arbitrary_expr(g, depth - 1), arbitrary_expr(g, depth - 1)),
        _ => Expr::mux(
            arbitrary_expr(g, depth - 1),
            arbitrary_expr(g, depth - 1),
            arbitrary_expr(g, depth - 1),
        ),
    }
}

impl Arbitrary for Logic {
    fn arbitrary(g: &mut Gen) -> Self {
        Logic(arbitrary_expr(g, 5))
    }
}

quickcheck! {
    fn prop_bdd_agrees_with_expr(logic: Logic, row: u16) -> bool {
        let value_of = |id: SignalId| (row >> id.index()) & 1 == 1;
        let bdd = Bdd::from_expr(&logic.0, VarOrder::Appearance).expect("combinational");
        Some(bdd.eval(bdd.root(), &value_of)) == logic.0.eval(&value_of)
    }

    fn prop_shannon_preserves_function(logic: Logic, max: u8) -> bool {
        let max = 3 + usize::from(max % 4);
        let mut sim = Sim::default();
        let Some(mapping) = Shannon::default().map(max, &mut sim, &logic.0).expect("combinational") else {
            let bdd = Bdd::from_expr(&logic.0, VarOrder::Appearance).expect("combinational");
            return sim.luts.is_empty()
                && (bdd.identity(bdd.root()).is_some() || logic.0.support().is_empty());
        };
        sim.luts.iter().all(|&(inputs, _)| (1..=max).contains(&inputs))
            && sim.drivers_per_port(&mapping)
            && (0..1usize << VARS).all(|row| {
                let value_of = |id: SignalId| (row >> id.index()) & 1 == 1;
                Some(sim.gate(&mapping, mapping.output, &value_of)) == logic.0.eval(&value_of)
            })
    }
}
