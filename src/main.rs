//! hireguard CLI entry point
//!
//! Parses arguments and delegates to `cli::run`, which prints the JSON
//! result. Exits non-zero on any error.

use hireguard::cli;

fn main() {
    if let Err(e) = cli::run() {
        eprintln!("{}", e);
        std::process::exit(1);
    }
}
