// CLASSIFICATION: COMMUNITY
// Filename: vport.rs v0.1
// Author: Lukas Bower
// Date Modified: 2026-10-18

//! Console over virtio-serial: rebinds stdin/stdout/stderr onto the
//! `virtserialport` devices the supervisor attaches to the guest.

use std::fs::OpenOptions;
use std::os::unix::io::{AsRawFd, IntoRawFd, RawFd};
use std::path::PathBuf;

use log::debug;

use crate::config::BootConfig;
use crate::error::{BootError, BootResult};
use crate::fd::{rebind, DupFd};

pub const PORT_STDIN: u32 = 30;
pub const PORT_STDOUT: u32 = 29;
pub const PORT_STDERR: u32 = 28;

/// A virtio port and the descriptor it should back.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PortMapping {
    pub port: u32,
    pub target: RawFd,
}

/// Processed in order; the device id of entry `i` is `i + 1`.
pub const STD_PORTS: [PortMapping; 3] = [
    PortMapping { port: PORT_STDIN, target: 0 },
    PortMapping { port: PORT_STDOUT, target: 1 },
    PortMapping { port: PORT_STDERR, target: 2 },
];

/// `/dev/vport<id>p<port>`
pub fn vport_path(id: usize, port: u32) -> String {
    format!("/dev/vport{}p{}", id, port)
}

/// Open, duplicate and close each port in table order.
pub fn redirect_ports(
    cfg: &BootConfig,
    mappings: &[PortMapping],
    dup: &dyn DupFd,
) -> BootResult<()> {
    for (i, mapping) in mappings.iter().enumerate() {
        let path: PathBuf = cfg.host_path(&vport_path(i + 1, mapping.port));
        let dev = OpenOptions::new()
            .read(true)
            .write(true)
            .open(&path)
            .map_err(|source| BootError::OpenPort {
                path: path.clone(),
                source,
            })?;
        let fd = dev.as_raw_fd();
        let res = rebind(dup, fd, mapping.target);
        if fd == mapping.target {
            // Opened straight onto the target slot; closing would undo it.
            let _ = dev.into_raw_fd();
        }
        res?;
        debug!("{} -> fd {}", path.display(), mapping.target);
    }
    Ok(())
}

/// Back the standard streams with the virtio console ports.
pub fn setup_unix_sock(cfg: &BootConfig, dup: &dyn DupFd) -> BootResult<()> {
    redirect_ports(cfg, &STD_PORTS, dup)
}
