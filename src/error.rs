// CLASSIFICATION: COMMUNITY
// Filename: error.rs v0.1
// Author: Lukas Bower
// Date Modified: 2026-10-18

//! Structural bootstrap failures.
//!
//! Missing host capabilities never show up here; they fold into a cleared
//! feature bit. Every variant is fatal once it reaches the binary entry point.

use std::io;
use std::os::unix::io::RawFd;
use std::path::PathBuf;

use thiserror::Error;

use crate::bootstrap::BootState;

/// Errors that make a requested channel or redirection impossible.
#[derive(Debug, Error)]
pub enum BootError {
    #[error("invalid configuration {var}={value:?}")]
    Config { var: &'static str, value: String },

    #[error("failed to open {}: {source}", path.display())]
    OpenDir {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("unexpect ivshm size: {} ({})", fmt_size(*size), device.display())]
    UnexpectedRegionSize { device: PathBuf, size: Option<u64> },

    #[error("failed to open ivshm region {}: {source}", path.display())]
    OpenRegion {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("failed to setup ivshm: input channel {}, output channel {}", found(*input), found(*output))]
    ChannelMissing { input: bool, output: bool },

    #[error("failed to dup: {src} -> {target}: {source}")]
    Dup {
        src: RawFd,
        target: RawFd,
        #[source]
        source: io::Error,
    },

    #[error("failed to open: {}: {source}", path.display())]
    OpenPort {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("failed to write features to stdout: {0}")]
    WriteFeatures(#[source] io::Error),

    #[error("bootstrap already ran (state {0:?})")]
    AlreadyRun(BootState),
}

pub type BootResult<T> = Result<T, BootError>;

fn fmt_size(size: Option<u64>) -> String {
    match size {
        Some(sz) => sz.to_string(),
        None => "-1".to_string(),
    }
}

fn found(present: bool) -> &'static str {
    if present {
        "found"
    } else {
        "missing"
    }
}
