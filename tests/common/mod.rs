// CLASSIFICATION: COMMUNITY
// Filename: mod.rs v0.1
// Author: Lukas Bower
// Date Modified: 2026-10-18

#![allow(dead_code)]

use std::cell::RefCell;
use std::fs;
use std::io;
use std::os::unix::io::RawFd;
use std::path::{Path, PathBuf};

use execboot::fd::DupFd;
use execboot::BootConfig;

pub const IN_SZ: u64 = 4 << 20;
pub const OUT_SZ: u64 = 16 << 20;

/// Records duplication requests without touching the descriptor table.
#[derive(Default)]
pub struct RecordingDup {
    pub calls: RefCell<Vec<(RawFd, RawFd)>>,
}

impl DupFd for RecordingDup {
    fn dup_onto(&self, src: RawFd, target: RawFd) -> io::Result<()> {
        self.calls.borrow_mut().push((src, target));
        Ok(())
    }
}

pub fn cfg_at(root: &Path) -> BootConfig {
    BootConfig {
        sysroot: root.to_path_buf(),
        ..BootConfig::default()
    }
}

pub fn pci_dir(root: &Path) -> PathBuf {
    let dir = root.join("sys/bus/pci/devices");
    fs::create_dir_all(&dir).unwrap();
    dir
}

/// Create a fake PCI device whose BAR 2 spans `size` bytes.
pub fn add_device(root: &Path, addr: &str, vendor: &str, device: &str, size: u64) -> PathBuf {
    let dev = pci_dir(root).join(addr);
    fs::create_dir_all(&dev).unwrap();
    fs::write(dev.join("vendor"), format!("{}\n", vendor)).unwrap();
    fs::write(dev.join("device"), format!("{}\n", device)).unwrap();
    let start: u64 = 0xfc00_0000;
    let resource = format!(
        "0x00000000febf1000 0x00000000febf10ff 0x0000000000040200\n\
         0x0000000000000000 0x0000000000000000 0x0000000000000000\n\
         0x{:016x} 0x{:016x} 0x000000000014220c\n",
        start,
        start + size - 1
    );
    fs::write(dev.join("resource"), resource).unwrap();
    fs::write(dev.join("resource2"), addr.as_bytes()).unwrap();
    dev
}

pub fn add_ivshmem(root: &Path, addr: &str, size: u64) -> PathBuf {
    add_device(root, addr, "0x1af4", "0x1110", size)
}
