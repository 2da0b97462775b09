// CLASSIFICATION: COMMUNITY
// Filename: main.rs v0.1
// Date Modified: 2026-10-18
// Author: Lukas Bower

//! Entry point for the executor bootstrap binary.

use execboot::cli;

fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();
    if let Err(err) = cli::run() {
        eprintln!("Error: {}", err);
        std::process::exit(1);
    }
}
