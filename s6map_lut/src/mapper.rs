use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use s6map_ir::{Expr, SignalId};
use serde::{Deserialize, Serialize};

use crate::{Bdd, LutError, Ref, Shannon, SingleLut, VarOrder};

/// Gate construction callbacks supplied by the netlist side.
pub trait LutFactory {
    type Gate: Copy;

    /// Creates a LUT with `inputs` inputs; bit `i` of `contents` is the output
    /// for the input row `i` (input `k` is bit `k` of the row).
    fn create(&mut self, inputs: usize, contents: u64) -> Self::Gate;

    /// Drives input `port` of `to` with the output of `from`.
    fn connect(&mut self, from: Self::Gate, to: Self::Gate, port: usize);
}

/// A LUT input that must be fed from a source signal.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct InputAssoc<G> {
    /// Gate reading the signal.
    pub gate: G,
    /// Input index on that gate.
    pub port: usize,
    /// Signal to connect.
    pub signal: SignalId,
}

/// Gates created for one expression: the gate producing its value and every
/// input that reads a signal directly.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Mapping<G> {
    /// Gate producing the expression's value.
    pub output: G,
    /// Gate inputs fed by source signals.
    pub inputs: Vec<InputAssoc<G>>,
}

/// Technology-independent LUT mapping of one expression.
pub trait LutMapper {
    /// Maps combinational logic to LUTs of at most `max_inputs` inputs.
    ///
    /// Returns `Ok(None)` when the expression reduces to a single signal and
    /// needs no logic.
    ///
    /// # Errors
    ///
    /// Fails if the expression is sequential, if `max_inputs` is outside
    /// `1..=6`, or if the mapper cannot fit the logic in the fan-in limit.
    fn map<F: LutFactory>(
        &self,
        max_inputs: usize,
        factory: &mut F,
        expr: &Expr,
    ) -> Result<Option<Mapping<F::Gate>>, LutError>;
}

/// Options shared by every mapper, read from `key=value` pairs.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct MapperOptions {
    /// Variable order of the BDD.
    pub order: VarOrder,
}

impl MapperOptions {
    /// # Errors
    ///
    /// Unknown keys or values are [`LutError::BadOption`].
    pub fn from_extra(extra: &BTreeMap<String, String>) -> Result<Self, LutError> {
        let mut options = Self::default();
        for (key, value) in extra {
            match (key.as_str(), value.as_str()) {
                ("order", "appearance") => options.order = VarOrder::Appearance,
                ("order", "reverse") => options.order = VarOrder::Reverse,
                _ => {
                    return Err(LutError::BadOption {
                        key: key.clone(),
                        value: value.clone(),
                    });
                }
            }
        }
        Ok(options)
    }
}

/// Selectable mapper.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MapperKind {
    /// One LUT per expression.
    Single,
    /// One LUT when it fits, otherwise Shannon decomposition.
    #[default]
    Shannon,
}

impl MapperKind {
    /// Every mapper, in listing order.
    pub const ALL: [MapperKind; 2] = [MapperKind::Single, MapperKind::Shannon];

    /// Name used on the command line and in configuration.
    pub fn name(self) -> &'static str {
        match self {
            Self::Single => "single",
            Self::Shannon => "shannon",
        }
    }

    /// # Errors
    ///
    /// Fails if `extra` holds an unknown option.
    pub fn build(self, extra: &BTreeMap<String, String>) -> Result<Mapper, LutError> {
        let options = MapperOptions::from_extra(extra)?;
        Ok(match self {
            Self::Single => Mapper::Single(SingleLut::new(options)),
            Self::Shannon => Mapper::Shannon(Shannon::new(options)),
        })
    }
}

impl fmt::Display for MapperKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for MapperKind {
    type Err = LutError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|kind| kind.name() == s)
            .ok_or_else(|| LutError::UnknownMapper(s.to_string()))
    }
}

/// A configured mapper of any kind.
#[derive(Clone, Debug)]
pub enum Mapper {
    /// See [`SingleLut`].
    Single(SingleLut),
    /// See [`Shannon`].
    Shannon(Shannon),
}

impl LutMapper for Mapper {
    fn map<F: LutFactory>(
        &self,
        max_inputs: usize,
        factory: &mut F,
        expr: &Expr,
    ) -> Result<Option<Mapping<F::Gate>>, LutError> {
        match self {
            Self::Single(mapper) => mapper.map(max_inputs, factory, expr),
            Self::Shannon(mapper) => mapper.map(max_inputs, factory, expr),
        }
    }
}

/// What a sub-function lowered to.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) enum Lowered<G> {
    Constant(bool),
    Signal(SignalId),
    Gate(G),
}

pub(crate) fn check_fan_in(max_inputs: usize) -> Result<(), LutError> {
    if (1..=6).contains(&max_inputs) {
        Ok(())
    } else {
        Err(LutError::BadFanIn(max_inputs))
    }
}

/// Emits one LUT computing `f` over its whole support.
pub(crate) fn emit_lut<F: LutFactory>(
    bdd: &Bdd,
    f: Ref,
    factory: &mut F,
    inputs: &mut Vec<InputAssoc<F::Gate>>,
) -> F::Gate {
    let support = bdd.support(f);
    let gate = factory.create(support.len(), bdd.truth_table(f, &support));
    inputs.extend(
        support
            .into_iter()
            .enumerate()
            .map(|(port, signal)| InputAssoc { gate, port, signal }),
    );
    gate
}

/// Builds the final mapping from the lowered root, emitting a LUT1 over the
/// first referenced signal when the logic folded to a constant.
pub(crate) fn finish<F: LutFactory>(
    root: Lowered<F::Gate>,
    expr: &Expr,
    factory: &mut F,
    mut inputs: Vec<InputAssoc<F::Gate>>,
) -> Option<Mapping<F::Gate>> {
    match root {
        Lowered::Signal(_) => None,
        Lowered::Gate(output) => Some(Mapping { output, inputs }),
        Lowered::Constant(value) => {
            let signal = expr.support().into_iter().next()?;
            let output = factory.create(1, if value { 0b11 } else { 0b00 });
            inputs.push(InputAssoc {
                gate: output,
                port: 0,
                signal,
            });
            Some(Mapping { output, inputs })
        }
    }
}
