//! The `apisync` command line: collection generation and docs postprocessing.

use std::process::ExitCode;

use clap::Parser;

mod cli;
use cli::Cli;

fn main() -> ExitCode {
    let cli = Cli::parse();

    match cli.run() {
        Ok(()) => ExitCode::SUCCESS,
        Err(error) => {
            eprintln!("❌ Error: {error}");
            for cause in error.chain().skip(1) {
                eprintln!("   Reason: {cause}");
            }
            ExitCode::FAILURE
        }
    }
}
