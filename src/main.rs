//! AutoPaper - weekly reading issues from saved articles

use std::process::ExitCode;

fn main() -> ExitCode {
    if let Err(e) = autopaper::cli::run() {
        eprintln!("Error: {:#}", e);
        ExitCode::FAILURE
    } else {
        ExitCode::SUCCESS
    }
}
