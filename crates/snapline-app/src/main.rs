//! Snapline command line entry point.

use std::process::ExitCode;

use clap::Parser;
use snapline_app::{Args, run};

fn main() -> ExitCode {
    env_logger::init();
    log::info!("Starting Snapline");

    let args = Args::parse();
    match run(&args) {
        Ok(json) => {
            if args.output.is_none() {
                println!("{json}");
            }
            ExitCode::SUCCESS
        }
        Err(e) => {
            log::error!("Failed to replay {}: {}", args.script.display(), e);
            eprintln!("error: {e}");
            ExitCode::FAILURE
        }
    }
}
