// CLASSIFICATION: COMMUNITY
// Filename: config.rs v0.1
// Author: Lukas Bower
// Date Modified: 2026-10-18

//! Environment driven bootstrap configuration.

use std::os::unix::io::RawFd;
use std::path::{Path, PathBuf};

use crate::error::{BootError, BootResult};

/// Descriptor the executor reads its input shared memory from.
pub const IN_FD: RawFd = 3;
/// Descriptor the executor writes its output shared memory to.
pub const OUT_FD: RawFd = 4;
/// Size of the input shared memory region.
pub const IN_SHM_SIZE: u64 = 4 << 20;
/// Size of the output shared memory region.
pub const OUT_SHM_SIZE: u64 = 16 << 20;

/// Runtime configurable bootstrap parameters.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BootConfig {
    /// Prefix applied to every absolute host path.
    pub sysroot: PathBuf,
    pub in_fd: RawFd,
    pub out_fd: RawFd,
    pub in_shm_size: u64,
    pub out_shm_size: u64,
}

impl Default for BootConfig {
    fn default() -> Self {
        Self {
            sysroot: PathBuf::from("/"),
            in_fd: IN_FD,
            out_fd: OUT_FD,
            in_shm_size: IN_SHM_SIZE,
            out_shm_size: OUT_SHM_SIZE,
        }
    }
}

impl BootConfig {
    /// Defaults overridden by any `EXECBOOT_*` variables that are set.
    pub fn from_env() -> BootResult<Self> {
        let mut cfg = BootConfig::default();
        if let Ok(root) = std::env::var("EXECBOOT_SYSROOT") {
            cfg.sysroot = PathBuf::from(root);
        }
        if let Some(fd) = env_num("EXECBOOT_IN_FD")? {
            cfg.in_fd = to_fd("EXECBOOT_IN_FD", fd)?;
        }
        if let Some(fd) = env_num("EXECBOOT_OUT_FD")? {
            cfg.out_fd = to_fd("EXECBOOT_OUT_FD", fd)?;
        }
        if let Some(sz) = env_num("EXECBOOT_IN_SHM_SIZE")? {
            cfg.in_shm_size = sz;
        }
        if let Some(sz) = env_num("EXECBOOT_OUT_SHM_SIZE")? {
            cfg.out_shm_size = sz;
        }
        Ok(cfg)
    }

    /// Resolve an absolute host path such as `/dev/vport1p30` under the sysroot.
    pub fn host_path(&self, path: &str) -> PathBuf {
        under_root(&self.sysroot, path)
    }
}

/// Join `path` onto `root`, treating `path` as relative to it.
pub fn under_root(root: &Path, path: &str) -> PathBuf {
    root.join(path.trim_start_matches('/'))
}

/// Parse a decimal or `0x`-prefixed hexadecimal number.
pub fn parse_num(text: &str) -> Option<u64> {
    let text = text.trim();
    match text.strip_prefix("0x").or_else(|| text.strip_prefix("0X")) {
        Some(hex) => u64::from_str_radix(hex, 16).ok(),
        None => text.parse().ok(),
    }
}

fn env_num(var: &'static str) -> BootResult<Option<u64>> {
    match std::env::var(var) {
        Ok(value) => parse_num(&value)
            .map(Some)
            .ok_or(BootError::Config { var, value }),
        Err(_) => Ok(None),
    }
}

fn to_fd(var: &'static str, n: u64) -> BootResult<RawFd> {
    RawFd::try_from(n).map_err(|_| BootError::Config {
        var,
        value: n.to_string(),
    })
}
