//! mdtodo - plain-text todo lists in Markdown files

use std::process::ExitCode;

fn main() -> ExitCode {
    if let Err(e) = mdtodo::cli::run() {
        eprintln!("Error: {:#}", e);
        ExitCode::FAILURE
    } else {
        ExitCode::SUCCESS
    }
}
