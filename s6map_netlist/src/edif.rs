//! EDIF 2.0.0 netlist writer.
//!
//! Instances are written as `I<uid>` and nets as `N<uid>`; the symbol file
//! produced alongside maps those uids back to source names.

use std::borrow::Cow;
use std::collections::HashSet;
use std::io::{self, Write};

use indexmap::IndexMap;

use crate::{IoPorts, Netlist, Pin, Primitive, PrimitiveKind};

/// Dialect of the emitted EDIF.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub enum EdifFlavor {
    /// Xilinx ISE `ngdbuild` conventions (`PART` property with an owner).
    #[default]
    Xilinx,
}

/// Names and properties written around the netlist.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct EdifParams {
    /// Dialect to emit.
    pub flavor: EdifFlavor,
    /// Name of the top cell and of the design.
    pub design_name: String,
    /// External library holding the primitives.
    pub cell_library: String,
    /// Target device.
    pub part: String,
    /// Owner of the `PART` property.
    pub manufacturer: String,
}

fn is_identifier(name: &str) -> bool {
    let mut chars = name.chars();
    matches!(chars.next(), Some(c) if c.is_ascii_alphabetic())
        && chars.all(|c| c.is_ascii_alphanumeric() || c == '_')
}

/// EDIF identifier used to reference `name`.
fn ident(name: &str) -> Cow<'_, str> {
    if is_identifier(name) {
        return Cow::Borrowed(name);
    }
    let body: String = name
        .chars()
        .map(|c| if c.is_ascii_alphanumeric() || c == '_' { c } else { '_' })
        .collect();
    Cow::Owned(format!("&{body}"))
}

/// Declaration of `name` under the identifier `id`.
fn rename<'a>(name: &'a str, id: &str) -> Cow<'a, str> {
    if id == name {
        Cow::Borrowed(name)
    } else {
        Cow::Owned(format!("(rename {id} \"{}\")", name.escape_default()))
    }
}

/// Identifier used where `name` is declared, renamed when not legal as-is.
fn declare(name: &str) -> Cow<'_, str> {
    rename(name, &ident(name))
}

/// Identifiers of the top-cell ports.
///
/// EDIF identifiers are case-insensitive and mangling is lossy, so a port
/// whose identifier is already taken gets a `_<n>` suffix.
#[derive(Debug, Default)]
struct PortIdents<'a> {
    idents: IndexMap<&'a str, String>,
}

impl<'a> PortIdents<'a> {
    fn new(io: &'a IoPorts) -> Self {
        let mut taken = HashSet::new();
        let mut idents = IndexMap::new();
        for port in io.ports() {
            let base = ident(&port.name).into_owned();
            let mut id = base.clone();
            let mut suffix = 1;
            while !taken.insert(id.to_ascii_lowercase()) {
                id = format!("{base}_{suffix}");
                suffix += 1;
            }
            idents.insert(port.name.as_str(), id);
        }
        Self { idents }
    }

    fn get<'n>(&'n self, name: &'n str) -> Cow<'n, str> {
        match self.idents.get(name) {
            Some(id) => Cow::Borrowed(id.as_str()),
            None => ident(name),
        }
    }

    fn declare<'n>(&'n self, name: &'n str) -> Cow<'n, str> {
        rename(name, &self.get(name))
    }
}

fn write_interface(w: &mut impl Write, indent: &str, ports: &[(Cow<'_, str>, &'static str)]) -> io::Result<()> {
    writeln!(w, "{indent}(interface")?;
    for (declaration, direction) in ports {
        writeln!(w, "{indent}  (port {declaration} (direction {direction}))")?;
    }
    writeln!(w, "{indent})")
}

fn write_external(w: &mut impl Write, params: &EdifParams, cells: &IndexMap<&str, &Primitive>) -> io::Result<()> {
    writeln!(w, "  (external {}", ident(&params.cell_library))?;
    writeln!(w, "    (edifLevel 0)")?;
    writeln!(w, "    (technology (numberDefinition))")?;
    for primitive in cells.values() {
        writeln!(w, "    (cell {} (cellType GENERIC)", declare(primitive.name()))?;
        writeln!(w, "      (view view_1 (viewType NETLIST)")?;
        let ports: Vec<(Cow<'_, str>, &'static str)> = primitive
            .input_names()
            .iter()
            .map(|name| (declare(name), "INPUT"))
            .chain(primitive.output_names().iter().map(|name| (declare(name), "OUTPUT")))
            .collect();
        write_interface(w, "        ", &ports)?;
        writeln!(w, "      )")?;
        writeln!(w, "    )")?;
    }
    writeln!(w, "  )")
}

fn write_contents(w: &mut impl Write, netlist: &Netlist, params: &EdifParams, ports: &PortIdents<'_>) -> io::Result<()> {
    writeln!(w, "        (contents")?;
    for inst in netlist.instances() {
        if inst.primitive().is_port() {
            continue;
        }
        write!(
            w,
            "          (instance {} (viewRef view_1 (cellRef {} (libraryRef {})))",
            inst.id(),
            ident(inst.primitive().name()),
            ident(&params.cell_library)
        )?;
        for (name, value) in inst.attributes() {
            write!(w, "\n            (property {} (string \"{}\"))", ident(name), value.escape_default())?;
        }
        writeln!(w, ")")?;
    }
    for net in netlist.nets() {
        if net.is_floating() {
            continue;
        }
        write!(w, "          (net {} (joined", net.id())?;
        let branches = net
            .driver()
            .map(|b| (b, Pin::Output(b.pin)))
            .into_iter()
            .chain(net.consumers().iter().map(|b| (*b, Pin::Input(b.pin))));
        for (branch, pin) in branches {
            let Some(inst) = netlist.instance(branch.instance) else {
                continue;
            };
            let primitive = inst.primitive();
            match primitive.kind() {
                PrimitiveKind::Port(_) => {
                    write!(w, "\n            (portRef {})", ports.get(primitive.name()))?;
                }
                PrimitiveKind::Cell => {
                    let pin_name = primitive.pin_name(pin).unwrap_or("?");
                    write!(w, "\n            (portRef {} (instanceRef {}))", ident(pin_name), inst.id())?;
                }
            }
        }
        writeln!(w, "))")?;
    }
    writeln!(w, "        )")
}

/// Writes the whole graph as one EDIF top cell.
pub fn write_edif(netlist: &Netlist, io: &IoPorts, params: &EdifParams, mut w: impl Write) -> io::Result<()> {
    let EdifFlavor::Xilinx = params.flavor;

    let mut cells: IndexMap<&str, &Primitive> = IndexMap::new();
    for inst in netlist.instances().filter(|inst| !inst.primitive().is_port()) {
        cells.entry(inst.primitive().name()).or_insert(inst.primitive());
    }

    let design = &params.design_name;
    let design_lib = format!("{design}_lib");

    writeln!(w, "(edif {}", declare(design))?;
    writeln!(w, "  (edifVersion 2 0 0)")?;
    writeln!(w, "  (edifLevel 0)")?;
    writeln!(w, "  (keywordMap (keywordLevel 0))")?;
    writeln!(
        w,
        "  (status (written (timeStamp 0 0 0 0 0 0) (program \"s6map\" (version \"{}\"))))",
        env!("CARGO_PKG_VERSION")
    )?;
    write_external(&mut w, params, &cells)?;

    writeln!(w, "  (library {}", declare(&design_lib))?;
    writeln!(w, "    (edifLevel 0)")?;
    writeln!(w, "    (technology (numberDefinition))")?;
    writeln!(w, "    (cell {} (cellType GENERIC)", declare(design))?;
    writeln!(w, "      (view view_1 (viewType NETLIST)")?;
    let idents = PortIdents::new(io);
    let ports: Vec<(Cow<'_, str>, &'static str)> = io
        .ports()
        .iter()
        .map(|port| {
            let direction = match port.direction {
                crate::PortDirection::In => "INPUT",
                crate::PortDirection::Out => "OUTPUT",
            };
            (idents.declare(&port.name), direction)
        })
        .collect();
    write_interface(&mut w, "        ", &ports)?;
    write_contents(&mut w, netlist, params, &idents)?;
    writeln!(w, "      )")?;
    writeln!(w, "    )")?;
    writeln!(w, "  )")?;

    writeln!(w, "  (design {}", declare(design))?;
    writeln!(w, "    (cellRef {} (libraryRef {}))", ident(design), ident(&design_lib))?;
    writeln!(
        w,
        "    (property PART (string \"{}\") (owner \"{}\"))",
        params.part.escape_default(),
        params.manufacturer.escape_default()
    )?;
    writeln!(w, "  )")?;
    writeln!(w, ")")?;
    w.flush()
}
