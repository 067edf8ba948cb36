//! s6map command-line tool
//!
//! Maps one design file to an EDIF netlist and a symbol table. Fatal mapping
//! errors are logged and end the process with status 1.

mod args;

use std::error::Error;

use clap::Parser;
use tracing::{error, info};

use args::Args;

fn execute(args: &Args) -> Result<(), s6map_flow::FlowError> {
    let config = args.to_config()?;
    info!(
        "part {}, mapper {} {:?}",
        config.part, config.mapper, config.mapper_options
    );
    s6map_flow::run(&args.input, args.edif_path(), args.symbols_path(), &config)
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    let args = Args::parse();
    if let Err(err) = execute(&args) {
        error!("{err}");
        let mut cause = err.source();
        while let Some(inner) = cause {
            error!("  caused by: {inner}");
            cause = inner.source();
        }
        std::process::exit(1);
    }
}
