// CLASSIFICATION: COMMUNITY
// Filename: lib.rs v0.1
// Date Modified: 2026-10-18
// Author: Lukas Bower

//! Guest-side bootstrap for a fuzzing executor.
//!
//! Reports host fuzzing features to the supervisor and establishes the
//! supervisor channels (ivshmem shared memory, virtio console ports) before
//! the executor proper starts.

/// Little-endian canonicalisation of the feature bitmask
pub mod codec;

/// Host capability probes and the feature bitmask
pub mod probe;

/// ivshmem discovery over PCI sysfs
pub mod pci;

/// Binding of the ivshmem channels onto fixed descriptors
pub mod ivshm;

/// Standard streams over virtio-serial ports
pub mod vport;

/// Descriptor duplication helpers
pub mod fd;

/// Mode dispatch and bootstrap state machine
pub mod bootstrap;

/// Environment configuration
pub mod config;

/// Bootstrap error type
pub mod error;

/// CLI interface for the bootstrap binary
pub mod cli;

pub use bootstrap::{BootState, Bootstrap, Mode, Outcome};
pub use config::BootConfig;
pub use error::{BootError, BootResult};
pub use probe::{check, Feature, FeatureBitmask};
