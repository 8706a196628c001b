use std::process::ExitCode;

use clap::Parser;
use log::LevelFilter;

use pixelfe::{cli, logger};

fn main() -> ExitCode {
    let args = cli::CliArgs::parse();

    // Initialize session log (overwrites previous session log)
    logger::init_with_level(if args.verbose {
        LevelFilter::Debug
    } else {
        LevelFilter::Info
    });

    cli::run(args)
}
