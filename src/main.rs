//! stic - Intellivision card, animation and screen tool

use std::process::ExitCode;

use sticsmith::cli;

fn main() -> ExitCode {
    cli::run()
}
