use s6map_ir::Expr;

use crate::mapper::{Lowered, check_fan_in, emit_lut, finish};
use crate::{Bdd, LutError, LutFactory, LutMapper, Mapping, MapperOptions};

/// Maps every expression to exactly one LUT over its support.
#[derive(Clone, Debug, Default)]
pub struct SingleLut {
    options: MapperOptions,
}

impl SingleLut {
    /// Mapper with the given options.
    pub fn new(options: MapperOptions) -> Self {
        Self { options }
    }
}

impl LutMapper for SingleLut {
    fn map<F: LutFactory>(
        &self,
        max_inputs: usize,
        factory: &mut F,
        expr: &Expr,
    ) -> Result<Option<Mapping<F::Gate>>, LutError> {
        check_fan_in(max_inputs)?;
        let bdd = Bdd::from_expr(expr, self.options.order)?;
        let f = bdd.root();
        let mut inputs = Vec::new();
        let root = if let Some(value) = f.as_constant() {
            Lowered::Constant(value)
        } else if let Some(signal) = bdd.identity(f) {
            Lowered::Signal(signal)
        } else {
            let needed = bdd.support(f).len();
            if needed > max_inputs {
                return Err(LutError::TooManyInputs {
                    needed,
                    max: max_inputs,
                });
            }
            Lowered::Gate(emit_lut(&bdd, f, factory, &mut inputs))
        };
        Ok(finish(root, expr, factory, inputs))
    }
}
