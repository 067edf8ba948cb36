use std::fmt;

use crate::Expr;

/// Index of a signal inside its [`Module`]. Signal identity is this index,
/// never the name.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SignalId(usize);

impl SignalId {
    /// Id of the signal at `index`.
    pub const fn new(index: usize) -> Self {
        Self(index)
    }

    /// Position in the module's signal list.
    pub const fn index(self) -> usize {
        self.0
    }
}

impl fmt::Display for SignalId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "s{}", self.0)
    }
}

/// Role of a signal at the module boundary.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum SignalKind {
    /// Neither input nor output.
    Internal,
    /// Driven from outside the module.
    Input,
    /// Visible outside the module.
    Output,
}

impl SignalKind {
    /// True for inputs and outputs.
    #[must_use]
    pub const fn is_port(self) -> bool {
        !matches!(self, Self::Internal)
    }
}

/// A named single-bit signal.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Signal {
    /// Declared name, unique in the module.
    pub name: String,
    /// Boundary role.
    pub kind: SignalKind,
    /// Driving expression; `None` when nothing assigns the signal.
    pub source: Option<Expr>,
}

/// A flat single-bit design: an ordered list of signals.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Module {
    name: String,
    signals: Vec<Signal>,
}

impl Module {
    /// An empty module.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            signals: Vec::new(),
        }
    }

    /// Module name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Appends a signal and returns its id.
    pub fn add_signal(&mut self, name: impl Into<String>, kind: SignalKind) -> SignalId {
        let id = SignalId(self.signals.len());
        self.signals.push(Signal {
            name: name.into(),
            kind,
            source: None,
        });
        id
    }

    /// Sets the driving expression of a signal, returning the previous one.
    pub fn set_source(&mut self, id: SignalId, source: Expr) -> Option<Expr> {
        self.signals[id.0].source.replace(source)
    }

    /// Signal by id.
    pub fn signal(&self, id: SignalId) -> &Signal {
        &self.signals[id.0]
    }

    /// Id of the signal declared as `name`.
    pub fn find(&self, name: &str) -> Option<SignalId> {
        self.signals.iter().position(|s| s.name == name).map(SignalId)
    }

    /// Signals with their ids, in declaration order.
    pub fn iter(&self) -> impl Iterator<Item = (SignalId, &Signal)> {
        self.signals.iter().enumerate().map(|(i, s)| (SignalId(i), s))
    }

    /// Number of signals.
    pub fn len(&self) -> usize {
        self.signals.len()
    }

    /// True when no signal is declared.
    pub fn is_empty(&self) -> bool {
        self.signals.is_empty()
    }
}
