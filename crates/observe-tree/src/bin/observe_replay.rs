//! `observe-replay` — run a mutation script against an observed tree.
//!
//! Usage:
//!   observe-replay < script.json
//!
//! The script (`{"root": ..., "prefix": ..., "ops": [...]}`) is read from
//! stdin. Every change record is printed to stdout as one JSON line as soon
//! as it is delivered, so a failing op still leaves the records of the ops
//! before it. Set `RUST_LOG=observe_tree=trace` to see wrapping and
//! notification on stderr.

use observe_tree::replay::replay;
use std::io::{self, Read, Write};
use tracing_subscriber::EnvFilter;

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(io::stderr)
        .init();

    let mut buf = String::new();
    if let Err(e) = io::stdin().read_to_string(&mut buf) {
        eprintln!("{e}");
        std::process::exit(1);
    }

    let result = replay(&buf, |line| {
        if let Err(e) = writeln!(io::stdout().lock(), "{line}") {
            eprintln!("{e}");
            std::process::exit(1);
        }
    });
    if let Err(e) = result {
        eprintln!("{e}");
        std::process::exit(1);
    }
}
