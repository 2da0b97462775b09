// CLASSIFICATION: COMMUNITY
// Filename: kversion.rs v0.1
// Author: Lukas Bower
// Date Modified: 2026-10-18

//! Kernel release parsing for version-gated probes.

use std::ffi::CStr;

/// Numeric components of a kernel release string, at most four of them.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct KernelVersion {
    parts: Vec<i64>,
}

impl KernelVersion {
    /// Collect up to four runs of ASCII digits, skipping any other text
    /// between them (`"5.15.0-91-generic"` gives `[5, 15, 0, 91]`).
    pub fn parse(release: &str) -> Self {
        let mut parts = Vec::with_capacity(4);
        let mut bytes = release.bytes().peekable();
        while parts.len() < 4 {
            match bytes.peek().copied() {
                None => break,
                Some(b) if b.is_ascii_digit() => {
                    let mut val: i64 = 0;
                    while let Some(d) = bytes.next_if(u8::is_ascii_digit) {
                        val = val.saturating_mul(10).saturating_add(i64::from(d - b'0'));
                    }
                    parts.push(val);
                }
                Some(_) => {
                    bytes.next();
                }
            }
        }
        KernelVersion { parts }
    }

    pub fn parts(&self) -> &[i64] {
        &self.parts
    }

    /// Weighted gate on the second and third components:
    /// `parts[1] * 1000 + parts[2] >= major * 1000 + minor`.
    ///
    /// The thresholds are compared against components 1 and 2, not 0 and 1;
    /// a release with fewer than two components never passes and a missing
    /// third component counts as zero.
    pub fn at_least(&self, major: i64, minor: i64) -> bool {
        if self.parts.len() < 2 {
            return false;
        }
        let patch = self.parts.get(2).copied().unwrap_or(0);
        self.parts[1].saturating_mul(1000).saturating_add(patch) >= major * 1000 + minor
    }
}

/// Release string of the running kernel, from `uname(2)`.
pub fn running_release() -> Option<String> {
    // SAFETY: utsname is plain old data; uname fills it in place.
    let mut buf: libc::utsname = unsafe { std::mem::zeroed() };
    if unsafe { libc::uname(&mut buf) } != 0 {
        return None;
    }
    // SAFETY: the kernel NUL-terminates every utsname field.
    let release = unsafe { CStr::from_ptr(buf.release.as_ptr()) };
    Some(release.to_string_lossy().into_owned())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_distro_release() {
        let v = KernelVersion::parse("5.15.0-91-generic");
        assert_eq!(v.parts(), &[5, 15, 0, 91]);
    }

    #[test]
    fn stops_after_four_components() {
        let v = KernelVersion::parse("6.1.2.3.4.5");
        assert_eq!(v.parts(), &[6, 1, 2, 3]);
    }

    #[test]
    fn tolerates_leading_and_interleaved_text() {
        let v = KernelVersion::parse("linux-v4..19rc7");
        assert_eq!(v.parts(), &[4, 19, 7]);
    }

    #[test]
    fn gate_weighs_second_and_third_components() {
        // 4.17.0: 17 * 1000 + 0 >= 4 * 1000 + 17
        assert!(KernelVersion::parse("4.17.0").at_least(4, 17));
        assert!(KernelVersion::parse("5.0.0").at_least(0, 0));
        // 3.4.16: 4016 < 4017
        assert!(!KernelVersion::parse("3.4.16").at_least(4, 17));
        assert!(KernelVersion::parse("3.4.17").at_least(4, 17));
    }

    #[test]
    fn gate_needs_two_components() {
        assert!(!KernelVersion::parse("5").at_least(0, 0));
        assert!(!KernelVersion::parse("").at_least(0, 0));
        assert!(KernelVersion::parse("9.5").at_least(4, 17));
    }

    #[test]
    fn running_release_is_readable() {
        let release = running_release().unwrap();
        assert!(!KernelVersion::parse(&release).parts().is_empty());
    }
}
