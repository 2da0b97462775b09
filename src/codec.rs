// CLASSIFICATION: COMMUNITY
// Filename: codec.rs v0.1
// Author: Lukas Bower
// Date Modified: 2026-10-18

//! Canonical little-endian layout for the feature bitmask.

/// Returns `true` when the in-memory layout of a probe integer puts its
/// least significant byte last.
#[inline]
pub fn host_is_big_endian() -> bool {
    let probe: u32 = 1;
    probe.to_ne_bytes()[0] == 0
}

/// Convert `n` so that its native in-memory bytes are little-endian.
///
/// Byte order is detected at call time rather than from `cfg(target_endian)`;
/// the value is only swapped on a big-endian host.
pub fn to_le(n: u64) -> u64 {
    if host_is_big_endian() {
        n.swap_bytes()
    } else {
        n
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn applying_twice_is_identity() {
        for n in [0, 1, 0x11, 0x7fff, u64::MAX, 0x0102_0304_0506_0708] {
            assert_eq!(to_le(to_le(n)), n);
        }
    }

    #[test]
    fn identity_on_little_endian_hosts() {
        let n = 0x0102_0304_0506_0708u64;
        if host_is_big_endian() {
            assert_eq!(to_le(n), 0x0807_0605_0403_0201);
        } else {
            assert_eq!(to_le(n), n);
        }
    }

    #[test]
    fn native_bytes_of_result_are_little_endian() {
        let n = 0x4019u64;
        assert_eq!(to_le(n).to_ne_bytes(), n.to_le_bytes());
    }

    #[test]
    fn detection_matches_target() {
        assert_eq!(host_is_big_endian(), cfg!(target_endian = "big"));
    }
}
