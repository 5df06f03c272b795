use std::process::ExitCode;

use jai_docker::cli::{self, EntryMode};

fn main() -> ExitCode {
    cli::main(EntryMode::Binary)
}
