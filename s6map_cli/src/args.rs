use std::path::PathBuf;

use clap::Parser;
use s6map_flow::{FlowConfig, FlowConfigBuilder, FlowError};
use s6map_lut::MapperKind;

/// s6map - map a signal-level design to Spartan-6 primitives
#[derive(Parser, Debug)]
#[command(name = "s6map")]
#[command(author, version, about, long_about = None)]
pub struct Args {
    /// Design to map
    pub input: PathBuf,

    /// EDIF netlist to write [default: input with `.edf` extension]
    #[arg(short = 'o', long)]
    pub output: Option<PathBuf>,
    /// Symbol table to write [default: input with `.sym` extension]
    #[arg(short = 's', long)]
    pub symbols: Option<PathBuf>,

    /// Target part [default: xc6slx45-fgg484-2]
    #[arg(short = 'p', long)]
    pub part: Option<String>,
    /// LUT mapper [default: shannon]
    #[arg(short = 'm', long, value_enum)]
    pub mapper: Option<MapperArg>,
    /// Extra mapper option, may be repeated
    #[arg(short = 'X', long = "mapper-option", value_name = "KEY=VALUE", value_parser = parse_key_value)]
    pub mapper_options: Vec<(String, String)>,

    /// JSON configuration; flags override its values
    #[arg(short = 'c', long)]
    pub config: Option<PathBuf>,
}

impl Args {
    /// Convert command-line arguments into the flow configuration
    pub fn to_config(&self) -> Result<FlowConfig, FlowError> {
        let base = match &self.config {
            Some(path) => FlowConfig::from_json_file(path)?,
            None => FlowConfig::default(),
        };
        let mut builder = FlowConfigBuilder::from(base);
        if let Some(part) = &self.part {
            builder = builder.part(part);
        }
        if let Some(mapper) = self.mapper {
            builder = builder.mapper(mapper.into());
        }
        Ok(builder.mapper_options(self.mapper_options.iter().cloned()).build())
    }

    /// Netlist path, derived from the input when not given.
    pub fn edif_path(&self) -> PathBuf {
        self.output
            .clone()
            .unwrap_or_else(|| self.input.with_extension("edf"))
    }

    /// Symbol file path, derived from the input when not given.
    pub fn symbols_path(&self) -> PathBuf {
        self.symbols
            .clone()
            .unwrap_or_else(|| self.input.with_extension("sym"))
    }
}

fn parse_key_value(s: &str) -> Result<(String, String), String> {
    s.split_once('=')
        .map(|(key, value)| (key.to_string(), value.to_string()))
        .ok_or_else(|| format!("expected KEY=VALUE, got `{s}`"))
}

/// Command-line argument wrapper for MapperKind
#[derive(Debug, Clone, Copy, clap::ValueEnum)]
pub enum MapperArg {
    /// One LUT per signal
    #[value(name = "single")]
    Single,
    /// Shannon decomposition of logic wider than one LUT
    #[value(name = "shannon")]
    Shannon,
}

impl From<MapperArg> for MapperKind {
    fn from(arg: MapperArg) -> Self {
        match arg {
            MapperArg::Single => MapperKind::Single,
            MapperArg::Shannon => MapperKind::Shannon,
        }
    }
}
