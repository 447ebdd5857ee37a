//! avrofix CLI entry point
//!
//! Parses arguments and dispatches through `cli::run`. Errors go to stderr
//! and the process exits non-zero.

use avrofix::cli;

fn main() {
    if let Err(e) = cli::run() {
        eprintln!("{}", e);
        std::process::exit(1);
    }
}
