use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

use s6map_ir::{Expr, Module, Purity, SignalId, SignalKind};
use s6map_lut::Mapper;
use s6map_netlist::{EdifFlavor, EdifParams, IoPorts, Netlist, SymbolStore, write_edif};
use tracing::{debug, info, warn};

use crate::FlowError;
use crate::config::FlowConfig;
use crate::design::{Design, Role};

/// Cell library the netlist is bound to.
pub const CELL_LIBRARY: &str = "UNISIMS";
/// Owner of the `PART` property.
pub const MANUFACTURER: &str = "Xilinx";

/// Finds the single clock of a module.
///
/// Every signal driven directly by a flip-flop must be clocked by the same
/// signal, compared by identity.
///
/// # Errors
///
/// [`FlowError::ClockNotSignal`] if a flip-flop clock is not a signal reference,
/// [`FlowError::MultiClock`] if two flip-flops use different clocks.
pub fn detect_clock(module: &Module) -> Result<Option<SignalId>, FlowError> {
    let mut clock: Option<SignalId> = None;
    for (_, signal) in module.iter() {
        let Some(ff) = signal.source.as_ref().and_then(Expr::as_flip_flop) else {
            continue;
        };
        let candidate = match ff.clock.as_ref() {
            Expr::Signal(id) => *id,
            _ => {
                return Err(FlowError::ClockNotSignal {
                    signal: signal.name.clone(),
                });
            }
        };
        match clock {
            None => {
                debug!("clock is `{}`", module.signal(candidate).name);
                clock = Some(candidate);
            }
            Some(first) if first != candidate => {
                return Err(FlowError::MultiClock {
                    first: module.signal(first).name.clone(),
                    second: module.signal(candidate).name.clone(),
                    signal: signal.name.clone(),
                });
            }
            Some(_) => {}
        }
    }
    Ok(clock)
}

/// One mapping run over a module.
///
/// [`Flow::map`] runs every step; the steps are also exposed one by one so the
/// intermediate graph can be inspected.
#[derive(Debug)]
pub struct Flow {
    module: Module,
    mapper: Mapper,
    part: String,
    clock: Option<SignalId>,
    design: Design,
}

impl Flow {
    /// # Errors
    ///
    /// Fails if the configured mapper options are invalid.
    pub fn new(module: Module, config: &FlowConfig) -> Result<Self, FlowError> {
        let mapper = config.mapper.build(&config.mapper_options)?;
        Ok(Self {
            module,
            mapper,
            part: config.part.clone(),
            clock: None,
            design: Design::default(),
        })
    }

    /// Module being mapped.
    pub fn module(&self) -> &Module {
        &self.module
    }

    /// Clock found by [`Flow::detect_clock`].
    pub fn clock(&self) -> Option<SignalId> {
        self.clock
    }

    /// Graph built so far.
    pub fn netlist(&self) -> &Netlist {
        &self.design.netlist
    }

    /// Names registered so far.
    pub fn symbols(&self) -> &SymbolStore {
        &self.design.symbols
    }

    /// Ports created so far.
    pub fn io(&self) -> &IoPorts {
        &self.design.io
    }

    /// Runs clock detection, signal materialization and logic mapping.
    ///
    /// # Errors
    ///
    /// Any step's error aborts the run.
    pub fn map(mut self) -> Result<Mapped, FlowError> {
        info!("mapping module `{}` ({} signals)", self.module.name(), self.module.len());
        self.detect_clock()?;
        self.materialize()?;
        self.map_logic()?;
        Ok(self.finish())
    }

    /// # Errors
    ///
    /// See [`detect_clock`].
    pub fn detect_clock(&mut self) -> Result<Option<SignalId>, FlowError> {
        self.clock = detect_clock(&self.module)?;
        if self.clock.is_none() {
            debug!("no clock in `{}`", self.module.name());
        }
        Ok(self.clock)
    }

    /// Creates one net per signal, plus buffer, pad net and port for ports and
    /// the clock.
    ///
    /// # Errors
    ///
    /// [`FlowError::OutputClock`] if the clock is an output port, or a symbol
    /// error if a generated net name is taken.
    pub fn materialize(&mut self) -> Result<(), FlowError> {
        for (id, signal) in self.module.iter() {
            let role = match (signal.kind, self.clock == Some(id)) {
                (SignalKind::Output, true) => {
                    return Err(FlowError::OutputClock {
                        signal: signal.name.clone(),
                    });
                }
                (_, true) => Some(Role::Clock),
                (SignalKind::Input, false) => Some(Role::Input),
                (SignalKind::Output, false) => Some(Role::Output),
                (SignalKind::Internal, false) => None,
            };
            self.design.materialize(&signal.name, role)?;
        }
        info!(
            "materialized {} signals, {} ports",
            self.module.len(),
            self.design.io.len()
        );
        Ok(())
    }

    /// Implements every signal's driver.
    ///
    /// A driver that is a plain signal, or logic reducing to one, leaves the
    /// two nets separate.
    ///
    /// # Errors
    ///
    /// [`FlowError::UnsupportedLogic`] for drivers containing flip-flops, and
    /// mapper or symbol errors.
    pub fn map_logic(&mut self) -> Result<(), FlowError> {
        for (_, signal) in self.module.iter() {
            match Purity::of(signal.source.as_ref()) {
                Purity::Empty => {}
                Purity::Signal(source) => {
                    warn!(
                        "`{}` is driven by `{}`; nets are left separate",
                        signal.name,
                        self.module.signal(source).name
                    );
                }
                Purity::Constant(value) => self.design.drive_constant(signal, value)?,
                Purity::Bdd => self.design.map_signal(&self.module, signal, &self.mapper)?,
                Purity::Impure => {
                    return Err(FlowError::UnsupportedLogic {
                        signal: signal.name.clone(),
                    });
                }
            }
        }
        Ok(())
    }

    /// Ends the run, keeping the graph for export.
    pub fn finish(self) -> Mapped {
        let netlist = &self.design.netlist;
        info!(
            "`{}`: {} instances, {} nets",
            self.module.name(),
            netlist.instance_count(),
            netlist.net_count()
        );
        for (cell, count) in netlist.cell_usage() {
            debug!("  {cell}: {count}");
        }
        Mapped {
            name: self.module.name().to_string(),
            part: self.part,
            clock: self.clock,
            design: self.design,
        }
    }
}

/// A completed mapping, ready to be written.
#[derive(Debug)]
pub struct Mapped {
    name: String,
    part: String,
    clock: Option<SignalId>,
    design: Design,
}

impl Mapped {
    /// Module name, used as the design name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// The design clock, if any.
    pub fn clock(&self) -> Option<SignalId> {
        self.clock
    }

    /// The mapped graph.
    pub fn netlist(&self) -> &Netlist {
        &self.design.netlist
    }

    /// Names of the mapped nets and instances.
    pub fn symbols(&self) -> &SymbolStore {
        &self.design.symbols
    }

    /// Ports of the design boundary.
    pub fn io(&self) -> &IoPorts {
        &self.design.io
    }

    /// EDIF header of this design.
    pub fn edif_params(&self) -> EdifParams {
        EdifParams {
            flavor: EdifFlavor::Xilinx,
            design_name: self.name.clone(),
            cell_library: CELL_LIBRARY.to_string(),
            part: self.part.clone(),
            manufacturer: MANUFACTURER.to_string(),
        }
    }

    /// # Errors
    ///
    /// Propagates write failures.
    pub fn write_edif(&self, w: impl Write) -> std::io::Result<()> {
        write_edif(&self.design.netlist, &self.design.io, &self.edif_params(), w)
    }

    /// # Errors
    ///
    /// Propagates write failures.
    pub fn write_symbols(&self, w: impl Write) -> std::io::Result<()> {
        self.design.symbols.write_to(w)
    }

    /// Writes the netlist and the symbol table.
    ///
    /// # Errors
    ///
    /// [`FlowError::Io`] naming the file that could not be written.
    pub fn write(&self, edif: impl AsRef<Path>, symbols: impl AsRef<Path>) -> Result<(), FlowError> {
        let edif = edif.as_ref();
        write_file(edif, |w| self.write_edif(w))?;
        info!("wrote netlist to {}", edif.display());
        let symbols = symbols.as_ref();
        write_file(symbols, |w| self.write_symbols(w))?;
        info!("wrote {} symbols to {}", self.design.symbols.len(), symbols.display());
        Ok(())
    }
}

fn write_file(
    path: &Path,
    contents: impl FnOnce(&mut BufWriter<File>) -> std::io::Result<()>,
) -> Result<(), FlowError> {
    let file = File::create(path).map_err(FlowError::io(path))?;
    let mut w = BufWriter::new(file);
    contents(&mut w).and_then(|()| w.flush()).map_err(FlowError::io(path))
}

/// Parses `input`, maps it and writes the netlist and symbol files.
///
/// # Errors
///
/// Returns the first fatal condition; output files may be partially written.
pub fn run(
    input: impl AsRef<Path>,
    edif: impl AsRef<Path>,
    symbols: impl AsRef<Path>,
    config: &FlowConfig,
) -> Result<(), FlowError> {
    let input = input.as_ref();
    info!("reading {}", input.display());
    let module = s6map_ir::parse_file(input)?;
    let mapped = Flow::new(module, config)?.map()?;
    mapped.write(edif, symbols)
}
