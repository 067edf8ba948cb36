use s6map_ir::{Expr, SignalId};

use crate::mapper::{Lowered, check_fan_in, emit_lut, finish};
use crate::{Bdd, InputAssoc, LutError, LutFactory, LutMapper, Mapping, MapperOptions, Ref};

/// Inputs of the multiplexer LUT: select, low cofactor, high cofactor.
const MUX_INPUTS: usize = 3;

/// Maps to one LUT when the support fits, and otherwise splits on the top
/// variable, recombining the two cofactors with a multiplexer LUT.
#[derive(Clone, Debug, Default)]
pub struct Shannon {
    options: MapperOptions,
}

impl Shannon {
    /// Mapper with the given options.
    pub fn new(options: MapperOptions) -> Self {
        Self { options }
    }

    fn lower<F: LutFactory>(
        bdd: &Bdd,
        f: Ref,
        max_inputs: usize,
        factory: &mut F,
        inputs: &mut Vec<InputAssoc<F::Gate>>,
    ) -> Result<Lowered<F::Gate>, LutError> {
        if let Some(value) = f.as_constant() {
            return Ok(Lowered::Constant(value));
        }
        if let Some(signal) = bdd.identity(f) {
            return Ok(Lowered::Signal(signal));
        }
        let needed = bdd.support(f).len();
        if needed <= max_inputs {
            return Ok(Lowered::Gate(emit_lut(bdd, f, factory, inputs)));
        }
        if max_inputs < MUX_INPUTS {
            return Err(LutError::TooManyInputs {
                needed,
                max: max_inputs,
            });
        }
        let Some((select, low, high)) = bdd.top(f) else {
            return Ok(Lowered::Constant(false));
        };
        tracing::debug!("splitting {needed}-input function on {select}");
        let zero = Self::lower(bdd, low, max_inputs, factory, inputs)?;
        let one = Self::lower(bdd, high, max_inputs, factory, inputs)?;
        Ok(Lowered::Gate(Self::mux(select, zero, one, factory, inputs)))
    }

    /// A LUT computing `select ? one : zero`, with constant data inputs folded
    /// into the table.
    fn mux<F: LutFactory>(
        select: SignalId,
        zero: Lowered<F::Gate>,
        one: Lowered<F::Gate>,
        factory: &mut F,
        inputs: &mut Vec<InputAssoc<F::Gate>>,
    ) -> F::Gate {
        // pin 0 is the select, data operands that are not constant follow in order
        let zero_pin = (!matches!(zero, Lowered::Constant(_))).then_some(1);
        let one_pin = (!matches!(one, Lowered::Constant(_))).then_some(1 + usize::from(zero_pin.is_some()));
        let width = 1 + usize::from(zero_pin.is_some()) + usize::from(one_pin.is_some());
        let bit = |operand: Lowered<F::Gate>, pin: Option<usize>, row: u64| match (operand, pin) {
            (Lowered::Constant(value), _) => value,
            (_, Some(pin)) => (row >> pin) & 1 == 1,
            (_, None) => false,
        };
        let contents = (0..1u64 << width)
            .filter(|&row| {
                if row & 1 == 1 {
                    bit(one, one_pin, row)
                } else {
                    bit(zero, zero_pin, row)
                }
            })
            .fold(0, |table, row| table | (1 << row));
        let gate = factory.create(width, contents);

        inputs.push(InputAssoc {
            gate,
            port: 0,
            signal: select,
        });
        for (operand, pin) in [(zero, zero_pin), (one, one_pin)] {
            let Some(port) = pin else { continue };
            match operand {
                Lowered::Signal(signal) => inputs.push(InputAssoc { gate, port, signal }),
                Lowered::Gate(from) => factory.connect(from, gate, port),
                Lowered::Constant(_) => {}
            }
        }
        gate
    }
}

impl LutMapper for Shannon {
    fn map<F: LutFactory>(
        &self,
        max_inputs: usize,
        factory: &mut F,
        expr: &Expr,
    ) -> Result<Option<Mapping<F::Gate>>, LutError> {
        check_fan_in(max_inputs)?;
        let bdd = Bdd::from_expr(expr, self.options.order)?;
        let mut inputs = Vec::new();
        let root = Self::lower(&bdd, bdd.root(), max_inputs, factory, &mut inputs)?;
        Ok(finish(root, expr, factory, inputs))
    }
}
