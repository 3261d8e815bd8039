use std::process::ExitCode;

use clap::Parser;

fn main() -> ExitCode {
    let cli = newsflash::Cli::parse();
    match newsflash::run(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(error) => {
            eprintln!("newsflash: {error}");
            ExitCode::FAILURE
        }
    }
}
