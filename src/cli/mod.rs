// CLASSIFICATION: COMMUNITY
// Filename: mod.rs v0.1
// Date Modified: 2026-10-18
// Author: Lukas Bower

//! CLI module for the executor bootstrap. Exports argument parser and main entry.

pub mod args;

use std::io;

use crate::bootstrap::{Bootstrap, Mode, Outcome};
use crate::cli::args::{build_cli, words};
use crate::config::BootConfig;
use crate::fd::Dup2;

/// Entry point for the CLI. Parses arguments, loads configuration and runs
/// the selected bootstrap mode.
pub fn run() -> anyhow::Result<()> {
    let matches = build_cli().get_matches();
    let argv = words(&matches);
    let Some(mode) = Mode::from_args(argv.as_slice()) else {
        log::info!("no bootstrap mode in {:?}", argv);
        return Ok(());
    };

    let cfg = BootConfig::from_env()?;
    log::debug!("config: {:?}", cfg);
    let mut boot = Bootstrap::new(cfg, &Dup2);
    let stdout = io::stdout();
    let mut out = stdout.lock();
    match boot.run(mode, &mut out)? {
        Outcome::Channels(bound) => {
            // The discovered descriptors stay open until exit.
            std::mem::forget(bound);
        }
        Outcome::Features(_) | Outcome::Console => {}
    }
    Ok(())
}
