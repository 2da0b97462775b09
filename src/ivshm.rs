// CLASSIFICATION: COMMUNITY
// Filename: ivshm.rs v0.1
// Author: Lukas Bower
// Date Modified: 2026-10-18

//! Binds the discovered ivshmem regions onto the executor's fixed
//! input/output descriptors.

use std::os::unix::io::{AsRawFd, RawFd};

use log::info;

use crate::config::BootConfig;
use crate::error::{BootError, BootResult};
use crate::fd::{rebind, relocate, DupFd};
use crate::pci::{scan_pci_devices, ChannelSizes, Discovery, Region, PCI_SYSFS_PATH};

/// Both shared memory regions, opened and classified.
#[derive(Debug)]
pub struct ChannelPair {
    pub input: Region,
    pub output: Region,
}

impl TryFrom<Discovery> for ChannelPair {
    type Error = BootError;

    fn try_from(found: Discovery) -> BootResult<Self> {
        match (found.input, found.output) {
            (Some(input), Some(output)) => Ok(ChannelPair { input, output }),
            (input, output) => Err(BootError::ChannelMissing {
                input: input.is_some(),
                output: output.is_some(),
            }),
        }
    }
}

/// Channels live at `in_fd`/`out_fd`. The discovered descriptors stay open
/// for as long as this value is held.
#[derive(Debug)]
pub struct BoundChannels {
    pub in_fd: RawFd,
    pub out_fd: RawFd,
    sources: ChannelPair,
}

impl BoundChannels {
    pub fn sources(&self) -> &ChannelPair {
        &self.sources
    }
}

/// Duplicate the pair onto `in_fd` and `out_fd`.
pub fn bind(
    mut pair: ChannelPair,
    in_fd: RawFd,
    out_fd: RawFd,
    dup: &dyn DupFd,
) -> BootResult<BoundChannels> {
    // A source sitting on the other channel's target would be clobbered by
    // the first dup2; move both out of the way first.
    let in_src = pair.input.file.as_raw_fd();
    let out_src = pair.output.file.as_raw_fd();
    if in_src == out_fd || out_src == in_fd {
        let floor = in_fd.max(out_fd) + 1;
        pair.input.file = relocate(pair.input.file, floor)
            .map_err(|source| BootError::Dup { src: in_src, target: floor, source })?;
        pair.output.file = relocate(pair.output.file, floor)
            .map_err(|source| BootError::Dup { src: out_src, target: floor, source })?;
    }

    rebind(dup, pair.input.file.as_raw_fd(), in_fd)?;
    rebind(dup, pair.output.file.as_raw_fd(), out_fd)?;
    info!(
        "ivshm bound: {} -> fd {}, {} -> fd {}",
        pair.input.device.display(),
        in_fd,
        pair.output.device.display(),
        out_fd
    );
    Ok(BoundChannels {
        in_fd,
        out_fd,
        sources: pair,
    })
}

/// Discover both ivshmem channels and bind them onto the configured descriptors.
pub fn ivshm_setup(cfg: &BootConfig, dup: &dyn DupFd) -> BootResult<BoundChannels> {
    let sizes = ChannelSizes {
        input: cfg.in_shm_size,
        output: cfg.out_shm_size,
    };
    let found = scan_pci_devices(&cfg.host_path(PCI_SYSFS_PATH), sizes)?;
    let pair = ChannelPair::try_from(found)?;
    bind(pair, cfg.in_fd, cfg.out_fd, dup)
}
