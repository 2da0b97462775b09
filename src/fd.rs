// CLASSIFICATION: COMMUNITY
// Filename: fd.rs v0.1
// Author: Lukas Bower
// Date Modified: 2026-10-18

//! Descriptor duplication seam shared by the ivshm binder and the port redirector.

use std::fs::File;
use std::io;
use std::os::unix::io::{AsRawFd, FromRawFd, RawFd};

use crate::error::{BootError, BootResult};

/// Rebinds an open descriptor onto a fixed descriptor number.
pub trait DupFd {
    fn dup_onto(&self, src: RawFd, target: RawFd) -> io::Result<()>;
}

/// `dup2(2)` against the current process.
#[derive(Debug, Default, Clone, Copy)]
pub struct Dup2;

impl DupFd for Dup2 {
    fn dup_onto(&self, src: RawFd, target: RawFd) -> io::Result<()> {
        // SAFETY: dup2 only manipulates the descriptor table; both numbers
        // are plain integers and an invalid `src` is reported as EBADF.
        let rc = unsafe { libc::dup2(src, target) };
        if rc < 0 {
            return Err(io::Error::last_os_error());
        }
        Ok(())
    }
}

/// Move `file` to the lowest free descriptor number at or above `floor`.
///
/// The returned file is close-on-exec; the original descriptor is closed.
pub fn relocate(file: File, floor: RawFd) -> io::Result<File> {
    // SAFETY: F_DUPFD_CLOEXEC only reads the source descriptor and returns a
    // fresh one that we take ownership of below.
    let fd = unsafe { libc::fcntl(file.as_raw_fd(), libc::F_DUPFD_CLOEXEC, floor) };
    if fd < 0 {
        return Err(io::Error::last_os_error());
    }
    // SAFETY: `fd` was just returned by fcntl and is owned by nobody else.
    Ok(unsafe { File::from_raw_fd(fd) })
}

/// Duplicate `src` onto `target`, mapping failure to [`BootError::Dup`].
pub fn rebind(dup: &dyn DupFd, src: RawFd, target: RawFd) -> BootResult<()> {
    dup.dup_onto(src, target)
        .map_err(|source| BootError::Dup { src, target, source })?;
    log::debug!("dup {} -> {}", src, target);
    Ok(())
}
