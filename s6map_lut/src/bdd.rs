//! Reduced ordered binary decision diagrams.
//!
//! Nodes are hash-consed: building the same `(variable, low, high)` triple twice
//! yields the same [`Ref`], so two functions are equal exactly when their refs are.
//! Variable levels follow the order chosen when the diagram is built from an
//! [`Expr`].

use std::collections::{BTreeSet, HashMap};

use contracts::debug_requires;
use indexmap::IndexSet;
use s6map_ir::{Expr, SignalId};
use serde::{Deserialize, Serialize};

use crate::LutError;

/// Handle of a BDD function. The two terminals are [`Ref::FALSE`] and [`Ref::TRUE`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Ref(u32);

impl Ref {
    /// Constant zero.
    pub const FALSE: Ref = Ref(0);
    /// Constant one.
    pub const TRUE: Ref = Ref(1);

    /// Terminal for `value`.
    pub const fn constant(value: bool) -> Self {
        if value { Self::TRUE } else { Self::FALSE }
    }

    /// Value of a terminal; `None` for an internal node.
    pub const fn as_constant(self) -> Option<bool> {
        match self.0 {
            0 => Some(false),
            1 => Some(true),
            _ => None,
        }
    }

    const fn node_index(self) -> Option<usize> {
        if self.0 < 2 { None } else { Some(self.0 as usize - 2) }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
struct Node {
    level: usize,
    low: Ref,
    high: Ref,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
enum Op {
    And,
    Or,
    Xor,
}

impl Op {
    /// Result that needs no recursion, if any. Covers every pair of terminals.
    fn shortcut(self, f: Ref, g: Ref) -> Option<Ref> {
        match self {
            Op::And if f == Ref::FALSE || g == Ref::FALSE => Some(Ref::FALSE),
            Op::And if f == Ref::TRUE => Some(g),
            Op::And if g == Ref::TRUE || f == g => Some(f),
            Op::Or if f == Ref::TRUE || g == Ref::TRUE => Some(Ref::TRUE),
            Op::Or if f == Ref::FALSE => Some(g),
            Op::Or if g == Ref::FALSE || f == g => Some(f),
            Op::Xor if f == g => Some(Ref::FALSE),
            Op::Xor if f == Ref::FALSE => Some(g),
            Op::Xor if g == Ref::FALSE => Some(f),
            _ => None,
        }
    }
}

/// Variable order used when building from an expression.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum VarOrder {
    /// First appearance in the expression is the top variable.
    #[default]
    Appearance,
    /// Last appearance is the top variable.
    Reverse,
}

/// Reduced ordered BDD of one expression.
#[derive(Clone, Debug)]
pub struct Bdd {
    vars: IndexSet<SignalId>,
    nodes: IndexSet<Node>,
    memo: HashMap<(Op, Ref, Ref), Ref>,
    root: Ref,
}

impl Bdd {
    /// Builds the diagram of a combinational expression.
    ///
    /// # Errors
    ///
    /// Returns [`LutError::Sequential`] if the expression contains a flip-flop.
    pub fn from_expr(expr: &Expr, order: VarOrder) -> Result<Self, LutError> {
        let mut vars = expr.support();
        if order == VarOrder::Reverse {
            vars.reverse();
        }
        let mut bdd = Self {
            vars: vars.into_iter().collect(),
            nodes: IndexSet::new(),
            memo: HashMap::new(),
            root: Ref::FALSE,
        };
        bdd.root = bdd.build(expr)?;
        tracing::trace!("built BDD with {} nodes over {} variables", bdd.nodes.len(), bdd.vars.len());
        Ok(bdd)
    }

    /// Function of the whole expression.
    pub fn root(&self) -> Ref {
        self.root
    }

    /// Number of distinct internal nodes ever created.
    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    fn build(&mut self, expr: &Expr) -> Result<Ref, LutError> {
        Ok(match expr {
            Expr::Boolean(value) => Ref::constant(*value),
            Expr::Signal(id) => {
                let (level, _) = self.vars.insert_full(*id);
                self.mk(level, Ref::FALSE, Ref::TRUE)
            }
            Expr::Not(arg) => {
                let f = self.build(arg)?;
                self.not(f)
            }
            Expr::And(a, b) => self.build_binary(Op::And, a, b)?,
            Expr::Or(a, b) => self.build_binary(Op::Or, a, b)?,
            Expr::Xor(a, b) => self.build_binary(Op::Xor, a, b)?,
            Expr::Mux { select, zero, one } => {
                let s = self.build(select)?;
                let z = self.build(zero)?;
                let o = self.build(one)?;
                let not_s = self.not(s);
                let low = self.apply(Op::And, not_s, z);
                let high = self.apply(Op::And, s, o);
                self.apply(Op::Or, low, high)
            }
            Expr::Fd(_) => return Err(LutError::Sequential),
        })
    }

    fn build_binary(&mut self, op: Op, a: &Expr, b: &Expr) -> Result<Ref, LutError> {
        let f = self.build(a)?;
        let g = self.build(b)?;
        Ok(self.apply(op, f, g))
    }

    fn mk(&mut self, level: usize, low: Ref, high: Ref) -> Ref {
        if low == high {
            return low;
        }
        let (index, _) = self.nodes.insert_full(Node { level, low, high });
        Ref(index as u32 + 2)
    }

    fn node(&self, f: Ref) -> Option<Node> {
        f.node_index().and_then(|index| self.nodes.get_index(index)).copied()
    }

    fn level(&self, f: Ref) -> usize {
        self.node(f).map_or(usize::MAX, |node| node.level)
    }

    fn cofactors(&self, f: Ref, level: usize) -> (Ref, Ref) {
        match self.node(f) {
            Some(node) if node.level == level => (node.low, node.high),
            _ => (f, f),
        }
    }

    fn not(&mut self, f: Ref) -> Ref {
        self.apply(Op::Xor, f, Ref::TRUE)
    }

    fn apply(&mut self, op: Op, f: Ref, g: Ref) -> Ref {
        if let Some(result) = op.shortcut(f, g) {
            return result;
        }
        // every operator is commutative
        let key = (op, f.min(g), f.max(g));
        if let Some(&result) = self.memo.get(&key) {
            return result;
        }
        let level = self.level(f).min(self.level(g));
        let (f0, f1) = self.cofactors(f, level);
        let (g0, g1) = self.cofactors(g, level);
        let low = self.apply(op, f0, g0);
        let high = self.apply(op, f1, g1);
        let result = self.mk(level, low, high);
        self.memo.insert(key, result);
        result
    }

    /// Top variable of `f` with its low and high cofactors; `None` for terminals.
    pub fn top(&self, f: Ref) -> Option<(SignalId, Ref, Ref)> {
        let node = self.node(f)?;
        let var = self.vars.get_index(node.level).copied()?;
        Some((var, node.low, node.high))
    }

    /// The variable `f` is equal to, if `f` is a plain variable.
    pub fn identity(&self, f: Ref) -> Option<SignalId> {
        match self.top(f)? {
            (var, Ref::FALSE, Ref::TRUE) => Some(var),
            _ => None,
        }
    }

    /// Variables `f` actually depends on, top variable first.
    pub fn support(&self, f: Ref) -> Vec<SignalId> {
        let mut levels = BTreeSet::new();
        let mut seen = BTreeSet::new();
        let mut stack = vec![f];
        while let Some(r) = stack.pop() {
            let Some(node) = self.node(r) else { continue };
            if seen.insert(r) {
                levels.insert(node.level);
                stack.push(node.low);
                stack.push(node.high);
            }
        }
        levels
            .into_iter()
            .filter_map(|level| self.vars.get_index(level).copied())
            .collect()
    }

    /// Value of `f` under a signal assignment.
    pub fn eval(&self, f: Ref, value_of: impl Fn(SignalId) -> bool) -> bool {
        let mut r = f;
        loop {
            if let Some(value) = r.as_constant() {
                return value;
            }
            match self.top(r) {
                Some((var, low, high)) => r = if value_of(var) { high } else { low },
                None => return false,
            }
        }
    }

    /// Truth table of `f` with `inputs[k]` as bit `k` of the row index.
    /// Variables outside `inputs` read as false.
    #[debug_requires(inputs.len() <= 6)]
    pub fn truth_table(&self, f: Ref, inputs: &[SignalId]) -> u64 {
        (0..1u64 << inputs.len())
            .filter(|row| {
                self.eval(f, |var| {
                    inputs
                        .iter()
                        .position(|input| *input == var)
                        .is_some_and(|k| (row >> k) & 1 == 1)
                })
            })
            .fold(0, |table, row| table | (1 << row))
    }
}
