// CLASSIFICATION: COMMUNITY
// Filename: pci.rs v0.1
// Author: Lukas Bower
// Date Modified: 2026-10-18

//! ivshmem channel discovery over the PCI sysfs tree.
//!
//! Every entry under `/sys/bus/pci/devices` is inspected; devices carrying the
//! ivshmem vendor/device pair are classified by the size of their BAR 2
//! region into the input or output channel.

use std::fs::{self, File, OpenOptions};
use std::io::Read;
use std::os::unix::ffi::OsStrExt;
use std::path::{Path, PathBuf};

use log::{debug, warn};

use crate::error::{BootError, BootResult};

pub const IVSHMEM_PCI_VENDOR_ID: i64 = 0x1af4;
pub const IVSHMEM_PCI_DEVICE_ID: i64 = 0x1110;
pub const PCI_SYSFS_PATH: &str = "/sys/bus/pci/devices";

/// BAR holding the shared memory.
pub const SHM_REGION: usize = 2;

/// Attribute files of this size or larger are treated as unreadable.
const ATTR_MAX: u64 = 256;

/// Expected sizes of the two shared memory regions.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ChannelSizes {
    pub input: u64,
    pub output: u64,
}

/// An opened BAR of a matching device.
#[derive(Debug)]
pub struct Region {
    /// sysfs directory of the owning device.
    pub device: PathBuf,
    pub size: u64,
    pub file: File,
}

/// Outcome of a full scan; either side may be missing.
#[derive(Debug, Default)]
pub struct Discovery {
    pub input: Option<Region>,
    pub output: Option<Region>,
}

/// Read a small sysfs attribute as text.
fn read_attr(path: &Path) -> Option<String> {
    let mut buf = Vec::new();
    File::open(path)
        .ok()?
        .take(ATTR_MAX)
        .read_to_end(&mut buf)
        .ok()?;
    if buf.len() as u64 >= ATTR_MAX {
        return None;
    }
    Some(String::from_utf8_lossy(&buf).into_owned())
}

/// Parse an integer the way `strtol(s, NULL, 0)` does: optional sign,
/// `0x` for hex, leading `0` for octal, decimal otherwise, stopping at the
/// first character that is not a digit of the detected base.
pub fn parse_id(text: &str) -> Option<i64> {
    let s = text.trim_start();
    let (neg, s) = match s.as_bytes().first() {
        Some(b'-') => (true, &s[1..]),
        Some(b'+') => (false, &s[1..]),
        _ => (false, s),
    };
    let (radix, digits) = if let Some(hex) = s.strip_prefix("0x").or_else(|| s.strip_prefix("0X")) {
        (16, hex)
    } else if s.len() > 1 && s.starts_with('0') {
        (8, &s[1..])
    } else {
        (10, s)
    };
    let end = digits
        .find(|c: char| !c.is_digit(radix))
        .unwrap_or(digits.len());
    if end == 0 {
        // A lone "0" (or "0x" with no digits) still converts to zero.
        return if radix != 10 { Some(0) } else { None };
    }
    let val = i64::from_str_radix(&digits[..end], radix).ok()?;
    Some(if neg { -val } else { val })
}

fn read_id(path: &Path) -> Option<i64> {
    read_attr(path).and_then(|s| parse_id(&s))
}

fn parse_hex(token: &str) -> Option<u64> {
    let token = token
        .strip_prefix("0x")
        .or_else(|| token.strip_prefix("0X"))
        .unwrap_or(token);
    u64::from_str_radix(token, 16).ok()
}

/// Inclusive size of region `index` in a sysfs `resource` table.
///
/// Each line holds `start end flags` in hex. Returns `None` when the line is
/// missing or malformed, or when `end <= start`.
pub fn region_size(resource: &str, index: usize) -> Option<u64> {
    let line = resource.lines().nth(index)?;
    let mut fields = line.split_whitespace().map(parse_hex);
    let start = fields.next()??;
    let end = fields.next()??;
    let _flags = fields.next()??;
    if end > start {
        Some(end - start + 1)
    } else {
        None
    }
}

fn resource_size(device: &Path) -> Option<u64> {
    let table = fs::read_to_string(device.join("resource")).ok()?;
    region_size(&table, SHM_REGION)
}

fn is_ivshmem(device: &Path) -> bool {
    let vendor = read_id(&device.join("vendor"));
    let dev_id = read_id(&device.join("device"));
    vendor == Some(IVSHMEM_PCI_VENDOR_ID) && dev_id == Some(IVSHMEM_PCI_DEVICE_ID)
}

/// Scan `sysfs_dir` (normally [`PCI_SYSFS_PATH`]) for ivshmem devices.
///
/// Entries are visited in directory order and the scan never stops early; a
/// later device of the same size replaces an earlier one. A matching device
/// whose BAR 2 size is neither expected size aborts the scan.
pub fn scan_pci_devices(sysfs_dir: &Path, sizes: ChannelSizes) -> BootResult<Discovery> {
    let entries = fs::read_dir(sysfs_dir).map_err(|source| BootError::OpenDir {
        path: sysfs_dir.to_path_buf(),
        source,
    })?;

    let mut found = Discovery::default();
    for entry in entries {
        let entry = match entry {
            Ok(e) => e,
            Err(e) => {
                warn!("skipping unreadable entry in {}: {}", sysfs_dir.display(), e);
                continue;
            }
        };
        if entry.file_name().as_bytes().first() == Some(&b'.') {
            continue;
        }
        let device = entry.path();
        if !is_ivshmem(&device) {
            continue;
        }

        let size = resource_size(&device);
        debug!("ivshmem device {} region{} size {:?}", device.display(), SHM_REGION, size);
        let slot = match size {
            Some(sz) if sz == sizes.output => &mut found.output,
            Some(sz) if sz == sizes.input => &mut found.input,
            _ => return Err(BootError::UnexpectedRegionSize { device, size }),
        };

        let region_path = device.join(format!("resource{}", SHM_REGION));
        let file = OpenOptions::new()
            .read(true)
            .write(true)
            .open(&region_path)
            .map_err(|source| BootError::OpenRegion {
                path: region_path.clone(),
                source,
            })?;
        if let Some(prev) = slot.replace(Region {
            device: device.clone(),
            size: size.unwrap_or_default(),
            file,
        }) {
            warn!(
                "ivshmem device {} replaces {} (size {})",
                device.display(),
                prev.device.display(),
                prev.size
            );
        }
    }
    Ok(found)
}
