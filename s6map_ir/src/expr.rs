use std::fmt;

use crate::SignalId;

/// A flip-flop description: `data` is sampled on the rising edge of `clock`.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct FlipFlop {
    /// Clock operand.
    pub clock: Box<Expr>,
    /// Sampled value.
    pub data: Box<Expr>,
}

/// Driving expression of a signal.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Expr {
    /// Literal `0` or `1`.
    Boolean(bool),
    /// Reference to another signal.
    Signal(SignalId),
    /// Complement.
    Not(Box<Expr>),
    /// Conjunction.
    And(Box<Expr>, Box<Expr>),
    /// Disjunction.
    Or(Box<Expr>, Box<Expr>),
    /// Exclusive or.
    Xor(Box<Expr>, Box<Expr>),
    /// `zero` when `select` is low, `one` when it is high.
    Mux {
        select: Box<Expr>,
        zero: Box<Expr>,
        one: Box<Expr>,
    },
    /// Rising-edge flip-flop.
    Fd(FlipFlop),
}

impl Expr {
    /// `Expr::Signal`.
    pub fn signal(id: SignalId) -> Self {
        Self::Signal(id)
    }

    /// `~arg`.
    pub fn not(arg: Expr) -> Self {
        Self::Not(Box::new(arg))
    }

    /// `lhs & rhs`.
    pub fn and(lhs: Expr, rhs: Expr) -> Self {
        Self::And(Box::new(lhs), Box::new(rhs))
    }

    /// `lhs | rhs`.
    pub fn or(lhs: Expr, rhs: Expr) -> Self {
        Self::Or(Box::new(lhs), Box::new(rhs))
    }

    /// `lhs ^ rhs`.
    pub fn xor(lhs: Expr, rhs: Expr) -> Self {
        Self::Xor(Box::new(lhs), Box::new(rhs))
    }

    /// `mux(select, zero, one)`.
    pub fn mux(select: Expr, zero: Expr, one: Expr) -> Self {
        Self::Mux {
            select: Box::new(select),
            zero: Box::new(zero),
            one: Box::new(one),
        }
    }

    /// `fd(clock, data)`.
    pub fn fd(clock: Expr, data: Expr) -> Self {
        Self::Fd(FlipFlop {
            clock: Box::new(clock),
            data: Box::new(data),
        })
    }

    /// The flip-flop if this is one at the top level.
    pub fn as_flip_flop(&self) -> Option<&FlipFlop> {
        match self {
            Self::Fd(ff) => Some(ff),
            _ => None,
        }
    }

    fn operands(&self) -> Vec<&Expr> {
        match self {
            Self::Boolean(_) | Self::Signal(_) => vec![],
            Self::Not(arg) => vec![&**arg],
            Self::And(a, b) | Self::Or(a, b) | Self::Xor(a, b) => vec![&**a, &**b],
            Self::Mux { select, zero, one } => vec![&**select, &**zero, &**one],
            Self::Fd(ff) => vec![&*ff.clock, &*ff.data],
        }
    }

    /// True if a flip-flop appears anywhere in the expression.
    pub fn is_sequential(&self) -> bool {
        matches!(self, Self::Fd(_)) || self.operands().into_iter().any(Expr::is_sequential)
    }

    /// Referenced signals, deduplicated, in order of first appearance
    /// (depth first, left to right).
    pub fn support(&self) -> Vec<SignalId> {
        fn walk(expr: &Expr, out: &mut Vec<SignalId>) {
            if let Expr::Signal(id) = expr {
                if !out.contains(id) {
                    out.push(*id);
                }
            }
            for operand in expr.operands() {
                walk(operand, out);
            }
        }
        let mut out = Vec::new();
        walk(self, &mut out);
        out
    }

    /// Evaluates combinational logic under an assignment of signal values.
    ///
    /// Returns `None` if the expression contains a flip-flop.
    pub fn eval(&self, value_of: &impl Fn(SignalId) -> bool) -> Option<bool> {
        Some(match self {
            Self::Boolean(value) => *value,
            Self::Signal(id) => value_of(*id),
            Self::Not(arg) => !arg.eval(value_of)?,
            Self::And(a, b) => a.eval(value_of)? & b.eval(value_of)?,
            Self::Or(a, b) => a.eval(value_of)? | b.eval(value_of)?,
            Self::Xor(a, b) => a.eval(value_of)? ^ b.eval(value_of)?,
            Self::Mux { select, zero, one } => {
                if select.eval(value_of)? {
                    one.eval(value_of)?
                } else {
                    zero.eval(value_of)?
                }
            }
            Self::Fd(_) => return None,
        })
    }
}

impl fmt::Display for Expr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Boolean(value) => write!(f, "{}", u8::from(*value)),
            Self::Signal(id) => write!(f, "{id}"),
            Self::Not(arg) => write!(f, "~{arg}"),
            Self::And(a, b) => write!(f, "({a} & {b})"),
            Self::Or(a, b) => write!(f, "({a} | {b})"),
            Self::Xor(a, b) => write!(f, "({a} ^ {b})"),
            Self::Mux { select, zero, one } => write!(f, "mux({select}, {zero}, {one})"),
            Self::Fd(ff) => write!(f, "fd({}, {})", ff.clock, ff.data),
        }
    }
}

/// How a signal's driving logic can be implemented.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Purity {
    /// No driver.
    Empty,
    /// The driver is exactly another signal.
    Signal(SignalId),
    /// The driver has no signal operands and folds to a constant.
    Constant(bool),
    /// Combinational logic over at least one signal, reducible to a BDD.
    Bdd,
    /// Contains state; not expressible as a BDD.
    Impure,
}

impl Purity {
    /// Classifies the driver of a signal.
    pub fn of(source: Option<&Expr>) -> Self {
        let Some(expr) = source else {
            return Self::Empty;
        };
        if expr.is_sequential() {
            return Self::Impure;
        }
        match expr {
            Expr::Signal(id) => Self::Signal(*id),
            _ if expr.support().is_empty() => match expr.eval(&|_| false) {
                Some(value) => Self::Constant(value),
                None => Self::Impure,
            },
            _ => Self::Bdd,
        }
    }
}
