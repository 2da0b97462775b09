// CLASSIFICATION: COMMUNITY
// Filename: mod.rs v0.1
// Author: Lukas Bower
// Date Modified: 2026-10-18

//! Host feature probe.
//!
//! Runs the fixed battery of capability checks and packs the results into a
//! 64-bit mask. The ordinal of each [`Feature`] is the bit index the
//! supervisor decodes, so entries are only ever appended.

pub mod kversion;

use std::fmt;
use std::fs::OpenOptions;
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use log::debug;

use crate::codec::to_le;
use crate::config::under_root;
use kversion::KernelVersion;

/// Fuzzing-support capabilities, in wire order.
#[repr(u8)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Feature {
    Coverage = 0,
    Comparisons = 1,
    ExtraCoverage = 2,
    SandboxSetuid = 3,
    SandboxNamespace = 4,
    SandboxAndroid = 5,
    Fault = 6,
    Leak = 7,
    NetInjection = 8,
    NetDevices = 9,
    Kcsan = 10,
    DevlinkPci = 11,
    UsbEmulation = 12,
    VhciInjection = 13,
    WifiEmulation = 14,
}

/// Number of defined features; bits at or above this index are always zero.
pub const FEATURE_COUNT: usize = 15;

impl Feature {
    pub const ALL: [Feature; FEATURE_COUNT] = [
        Feature::Coverage,
        Feature::Comparisons,
        Feature::ExtraCoverage,
        Feature::SandboxSetuid,
        Feature::SandboxNamespace,
        Feature::SandboxAndroid,
        Feature::Fault,
        Feature::Leak,
        Feature::NetInjection,
        Feature::NetDevices,
        Feature::Kcsan,
        Feature::DevlinkPci,
        Feature::UsbEmulation,
        Feature::VhciInjection,
        Feature::WifiEmulation,
    ];

    pub fn bit(self) -> u64 {
        1 << (self as u8)
    }

    pub fn name(self) -> &'static str {
        match self {
            Feature::Coverage => "code coverage",
            Feature::Comparisons => "comparison tracing",
            Feature::ExtraCoverage => "extra coverage",
            Feature::SandboxSetuid => "setuid sandbox",
            Feature::SandboxNamespace => "namespace sandbox",
            Feature::SandboxAndroid => "Android sandbox",
            Feature::Fault => "fault injection",
            Feature::Leak => "leak checking",
            Feature::NetInjection => "net packet injection",
            Feature::NetDevices => "net device setup",
            Feature::Kcsan => "concurrency sanitizer",
            Feature::DevlinkPci => "devlink PCI setup",
            Feature::UsbEmulation => "USB emulation",
            Feature::VhciInjection => "hci packet injection",
            Feature::WifiEmulation => "wifi device emulation",
        }
    }
}

/// Host interface the probes observe.
pub trait Host {
    /// `access(path, F_OK)` equivalent.
    fn exists(&self, path: &str) -> bool;
    /// Open `path` read/write and write `data` to it.
    fn write_control(&self, path: &str, data: &[u8]) -> io::Result<()>;
    /// Release string of the running kernel.
    fn kernel_release(&self) -> Option<String>;
}

/// The real host, optionally rooted somewhere other than `/`.
#[derive(Debug, Clone)]
pub struct SysHost {
    root: PathBuf,
    release: Option<String>,
}

impl SysHost {
    /// Probe paths under `root`; the kernel release comes from `uname(2)`.
    pub fn new(root: impl Into<PathBuf>) -> Self {
        SysHost {
            root: root.into(),
            release: kversion::running_release(),
        }
    }

    /// Probe paths under `root` and report `release` as the kernel version.
    pub fn with_release(root: impl Into<PathBuf>, release: &str) -> Self {
        SysHost {
            root: root.into(),
            release: Some(release.to_string()),
        }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }
}

impl Host for SysHost {
    fn exists(&self, path: &str) -> bool {
        under_root(&self.root, path).exists()
    }

    fn write_control(&self, path: &str, data: &[u8]) -> io::Result<()> {
        let mut f = OpenOptions::new()
            .read(true)
            .write(true)
            .open(under_root(&self.root, path))?;
        f.write_all(data)
    }

    fn kernel_release(&self) -> Option<String> {
        self.release.clone()
    }
}

/// How a single feature is decided.
#[derive(Clone, Copy)]
pub enum Probe {
    /// Fixed answer, independent of the host.
    Always(bool),
    /// Present iff the path exists.
    Exists(&'static str),
    /// Arbitrary check against the host.
    Check(fn(&dyn Host) -> bool),
}

impl Probe {
    pub fn eval(&self, host: &dyn Host) -> bool {
        match *self {
            Probe::Always(v) => v,
            Probe::Exists(path) => host.exists(path),
            Probe::Check(f) => f(host),
        }
    }
}

const DEBUGFS: &str = "/sys/kernel/debug";
const KMEMLEAK: &str = "/sys/kernel/debug/kmemleak";
/// Minimum kernel for mac80211_hwsim, compared by [`KernelVersion::at_least`].
const WIFI_MIN_VERSION: (i64, i64) = (4, 17);

/// The committed checker table, indexed by [`Feature`] ordinal.
pub const CHECKERS: [(Feature, Probe); FEATURE_COUNT] = [
    (Feature::Coverage, Probe::Check(has_kcov)),
    (Feature::Comparisons, Probe::Always(false)),
    (Feature::ExtraCoverage, Probe::Always(false)),
    (Feature::SandboxSetuid, Probe::Always(true)),
    (Feature::SandboxNamespace, Probe::Exists("/proc/self/ns/user")),
    (Feature::SandboxAndroid, Probe::Exists("/sys/fs/selinux/policy")),
    (Feature::Fault, Probe::Check(has_fault)),
    (Feature::Leak, Probe::Check(has_leak)),
    (Feature::NetInjection, Probe::Exists("/dev/net/tun")),
    (Feature::NetDevices, Probe::Always(true)),
    (Feature::Kcsan, Probe::Exists("/sys/kernel/debug/kcsan")),
    (Feature::DevlinkPci, Probe::Exists("/sys/bus/pci/devices/0000:00:10.0/")),
    (Feature::UsbEmulation, Probe::Exists("/dev/raw-gadget")),
    (Feature::VhciInjection, Probe::Exists("/dev/vhci")),
    (Feature::WifiEmulation, Probe::Check(has_wifi)),
];

fn has_kcov(host: &dyn Host) -> bool {
    host.exists(DEBUGFS) && host.exists("/sys/kernel/debug/kcov")
}

// Reported present only when the fault-injection control files are absent.
fn has_fault(host: &dyn Host) -> bool {
    !host.exists("/proc/self/make-it-fail")
        && !host.exists("/proc/thread-self/fail-nth")
        && host.exists(DEBUGFS)
        && !host.exists("/sys/kernel/debug/failslab/ignore-gfp-wait")
}

// Turns off the background kmemleak scan as a side effect.
fn has_leak(host: &dyn Host) -> bool {
    if !host.exists(DEBUGFS) {
        return false;
    }
    match host.write_control(KMEMLEAK, b"scan=off") {
        Ok(()) => true,
        Err(e) => {
            debug!("kmemleak unavailable: {}", e);
            false
        }
    }
}

fn has_wifi(host: &dyn Host) -> bool {
    let (major, minor) = WIFI_MIN_VERSION;
    let new_enough = host
        .kernel_release()
        .map(|r| KernelVersion::parse(&r).at_least(major, minor))
        .unwrap_or(false);
    new_enough && host.exists("/sys/class/mac80211_hwsim/")
}

/// Bit `i` is set iff `Feature::ALL[i]` is available.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct FeatureBitmask(u64);

impl FeatureBitmask {
    pub fn from_bits(bits: u64) -> Self {
        FeatureBitmask(bits)
    }

    pub fn bits(self) -> u64 {
        self.0
    }

    pub fn has(self, feature: Feature) -> bool {
        self.0 & feature.bit() != 0
    }

    /// Enabled features in wire order.
    pub fn iter(self) -> impl Iterator<Item = Feature> {
        Feature::ALL.into_iter().filter(move |f| self.has(*f))
    }

    /// The 8-byte wire form.
    pub fn to_le_bytes(self) -> [u8; 8] {
        to_le(self.0).to_ne_bytes()
    }

    /// Decode the wire form; `None` unless exactly 8 bytes are given.
    pub fn from_le_bytes(bytes: &[u8]) -> Option<Self> {
        let raw: [u8; 8] = bytes.try_into().ok()?;
        Some(FeatureBitmask(u64::from_le_bytes(raw)))
    }
}

impl fmt::Display for FeatureBitmask {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:#x} [", self.0)?;
        for (i, feature) in self.iter().enumerate() {
            if i > 0 {
                f.write_str(", ")?;
            }
            f.write_str(feature.name())?;
        }
        f.write_str("]")
    }
}

/// Evaluate every probe in table order, without short-circuiting.
pub fn check(host: &dyn Host) -> FeatureBitmask {
    let mut bits = 0u64;
    for (feature, probe) in CHECKERS.iter() {
        let present = probe.eval(host);
        debug!("feature {:?} ({}): {}", feature, feature.name(), present);
        if present {
            bits |= feature.bit();
        }
    }
    FeatureBitmask(bits)
}
