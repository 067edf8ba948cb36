//! Bidirectional name table for netlist objects.
//!
//! Symbols live in one-character namespaces so a net and an instance may share
//! a human-readable name. The store keeps insertion order, which is also the
//! order of the symbol file.

use std::fmt;
use std::io::{self, Write};

use indexmap::IndexMap;
use indexmap::map::Entry;
use thiserror::Error;

use crate::{InstanceId, NetId};

/// Namespace of a symbol.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum SymbolTag {
    /// `N`
    Net,
    /// `I`
    Instance,
}

impl SymbolTag {
    /// Character written in the symbol file.
    #[must_use]
    pub const fn as_char(self) -> char {
        match self {
            Self::Net => 'N',
            Self::Instance => 'I',
        }
    }

    /// Parses the symbol-file character.
    #[must_use]
    pub const fn from_char(c: char) -> Option<Self> {
        match c {
            'N' => Some(Self::Net),
            'I' => Some(Self::Instance),
            _ => None,
        }
    }
}

impl fmt::Display for SymbolTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_char())
    }
}

/// Symbol table failures.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum SymbolError {
    /// The name is already bound in this namespace.
    #[error("symbol {tag}:{name} is already defined for uid {existing}")]
    Duplicate {
        tag: SymbolTag,
        name: String,
        existing: u32,
    },
    /// A symbol-file line is not `<tag> <uid> <name>`.
    #[error("malformed symbol line {line}: {text:?}")]
    Malformed { line: usize, text: String },
}

/// A name bound to a netlist object.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Symbol {
    uid: u32,
    tag: SymbolTag,
    name: String,
}

impl Symbol {
    /// Uid of the named net or instance.
    pub fn uid(&self) -> u32 {
        self.uid
    }

    /// Namespace of the symbol.
    pub fn tag(&self) -> SymbolTag {
        self.tag
    }

    /// The bound name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// The net this symbol names, if it lives in the net namespace.
    pub fn net(&self) -> Option<NetId> {
        (self.tag == SymbolTag::Net).then(|| NetId::new(self.uid))
    }

    /// The instance this symbol names, if it lives in the instance namespace.
    pub fn instance(&self) -> Option<InstanceId> {
        (self.tag == SymbolTag::Instance).then(|| InstanceId::new(self.uid))
    }
}

/// Names of nets and instances, in registration order.
#[derive(Clone, Debug, Default)]
pub struct SymbolStore {
    by_name: IndexMap<(String, SymbolTag), Symbol>,
}

impl SymbolStore {
    /// An empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers `name` for `uid` in namespace `tag`.
    ///
    /// # Errors
    ///
    /// Fails if `(name, tag)` is already registered.
    pub fn add(&mut self, uid: u32, tag: SymbolTag, name: impl Into<String>) -> Result<&Symbol, SymbolError> {
        let name = name.into();
        match self.by_name.entry((name.clone(), tag)) {
            Entry::Occupied(entry) => Err(SymbolError::Duplicate {
                tag,
                name,
                existing: entry.get().uid,
            }),
            Entry::Vacant(entry) => Ok(entry.insert(Symbol { uid, tag, name })),
        }
    }

    /// Registers `name` for `uid`, or the first free `<name>_<n>` when the
    /// name is taken in namespace `tag`.
    pub fn add_unique(&mut self, uid: u32, tag: SymbolTag, name: impl Into<String>) -> &Symbol {
        let base = name.into();
        let mut name = base.clone();
        let mut suffix = 1;
        while self.by_name.contains_key(&(name.clone(), tag)) {
            name = format!("{base}_{suffix}");
            suffix += 1;
        }
        self.by_name
            .entry((name.clone(), tag))
            .or_insert(Symbol { uid, tag, name })
    }

    /// Points every symbol of namespace `tag` bound to `from` at `to`.
    ///
    /// Returns the number of symbols moved. Their file order is unchanged.
    pub fn retarget(&mut self, tag: SymbolTag, from: u32, to: u32) -> usize {
        let mut moved = 0;
        for sym in self.by_name.values_mut().filter(|sym| sym.tag == tag && sym.uid == from) {
            sym.uid = to;
            moved += 1;
        }
        moved
    }

    /// Symbol registered as `name` in namespace `tag`.
    pub fn lookup(&self, name: &str, tag: SymbolTag) -> Option<&Symbol> {
        self.by_name.get(&(name.to_string(), tag))
    }

    /// First symbol registered for `uid` in namespace `tag`.
    pub fn by_uid(&self, uid: u32, tag: SymbolTag) -> Option<&Symbol> {
        self.by_name.values().find(|sym| sym.uid == uid && sym.tag == tag)
    }

    /// Symbols in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = &Symbol> {
        self.by_name.values()
    }

    /// Number of symbols.
    pub fn len(&self) -> usize {
        self.by_name.len()
    }

    /// True when nothing is registered.
    pub fn is_empty(&self) -> bool {
        self.by_name.is_empty()
    }

    /// Writes one `<tag> <uid> <name>` line per symbol.
    pub fn write_to(&self, mut writer: impl Write) -> io::Result<()> {
        for sym in self.iter() {
            writeln!(writer, "{} {} {}", sym.tag, sym.uid, sym.name)?;
        }
        writer.flush()
    }

    /// Reads back the format produced by [`SymbolStore::write_to`].
    ///
    /// # Errors
    ///
    /// Fails on malformed lines and duplicate symbols.
    pub fn parse(text: &str) -> Result<Self, SymbolError> {
        let mut store = Self::new();
        for (index, line) in text.lines().enumerate() {
            if line.trim().is_empty() {
                continue;
            }
            let malformed = || SymbolError::Malformed {
                line: index + 1,
                text: line.to_string(),
            };
            let mut fields = line.splitn(3, ' ');
            let tag = fields
                .next()
                .and_then(|t| {
                    let mut chars = t.chars();
                    match (chars.next(), chars.next()) {
                        (Some(c), None) => SymbolTag::from_char(c),
                        _ => None,
                    }
                })
                .ok_or_else(malformed)?;
            let uid = fields
                .next()
                .and_then(|u| u.parse::<u32>().ok())
                .ok_or_else(malformed)?;
            let name = fields.next().filter(|n| !n.is_empty()).ok_or_else(malformed)?;
            store.add(uid, tag, name)?;
        }
        Ok(store)
    }
}
