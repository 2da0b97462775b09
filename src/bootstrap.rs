// CLASSIFICATION: COMMUNITY
// Filename: bootstrap.rs v0.1
// Author: Lukas Bower
// Date Modified: 2026-10-18

//! Bootstrap mode selection and the channel state machine.
//!
//! Exactly one mode runs per invocation. Channel setup moves
//! `Uninitialized -> Discovering -> Bound`; any error lands in `Aborted`,
//! which is terminal. Errors are returned, the caller terminates.

use std::io::Write;

use log::{debug, info};

use crate::config::BootConfig;
use crate::error::{BootError, BootResult};
use crate::fd::DupFd;
use crate::ivshm::{ivshm_setup, BoundChannels};
use crate::probe::{check, FeatureBitmask, SysHost};
use crate::vport::setup_unix_sock;

/// Bootstrap mode requested on the command line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mode {
    /// `check`: report host features on stdout.
    Check,
    /// `use-ivshm`: bind the shared memory channels.
    Ivshm,
    /// `... use-unix-socks`: back the standard streams with virtio ports.
    UnixSocks,
}

impl Mode {
    /// Select a mode from the arguments after the program name.
    ///
    /// `check` and `use-ivshm` only count as the sole argument;
    /// `use-unix-socks` counts in second position.
    pub fn from_args<S: AsRef<str>>(args: &[S]) -> Option<Mode> {
        let words: Vec<&str> = args.iter().map(AsRef::as_ref).collect();
        match words.as_slice() {
            ["check"] => Some(Mode::Check),
            ["use-ivshm"] => Some(Mode::Ivshm),
            [_, "use-unix-socks", ..] => Some(Mode::UnixSocks),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BootState {
    Uninitialized,
    Discovering,
    Bound,
    Aborted,
}

/// What a completed mode produced.
#[derive(Debug)]
pub enum Outcome {
    /// Bitmask already written to the output stream.
    Features(FeatureBitmask),
    /// Must be kept alive for the rest of the process.
    Channels(BoundChannels),
    Console,
}

pub struct Bootstrap<'a> {
    cfg: BootConfig,
    dup: &'a dyn DupFd,
    state: BootState,
}

impl<'a> Bootstrap<'a> {
    pub fn new(cfg: BootConfig, dup: &'a dyn DupFd) -> Self {
        Bootstrap {
            cfg,
            dup,
            state: BootState::Uninitialized,
        }
    }

    pub fn state(&self) -> BootState {
        self.state
    }

    fn transition(&mut self, next: BootState) {
        info!("bootstrap: {:?} -> {:?}", self.state, next);
        self.state = next;
    }

    /// Run `mode`. `out` receives the feature bitmask in `check` mode.
    pub fn run(&mut self, mode: Mode, out: &mut dyn Write) -> BootResult<Outcome> {
        if self.state != BootState::Uninitialized {
            return Err(BootError::AlreadyRun(self.state));
        }
        let res = match mode {
            Mode::Check => return self.report_features(out),
            Mode::Ivshm => {
                self.transition(BootState::Discovering);
                ivshm_setup(&self.cfg, self.dup).map(Outcome::Channels)
            }
            Mode::UnixSocks => {
                self.transition(BootState::Discovering);
                setup_unix_sock(&self.cfg, self.dup).map(|()| Outcome::Console)
            }
        };
        match res {
            Ok(outcome) => {
                self.transition(BootState::Bound);
                Ok(outcome)
            }
            Err(e) => {
                debug!("{:?} bootstrap failed: {:?}", mode, e);
                self.transition(BootState::Aborted);
                Err(e)
            }
        }
    }

    fn report_features(&self, out: &mut dyn Write) -> BootResult<Outcome> {
        let host = SysHost::new(&self.cfg.sysroot);
        let mask = check(&host);
        info!("features: {}", mask);
        out.write_all(&mask.to_le_bytes())
            .and_then(|()| out.flush())
            .map_err(BootError::WriteFeatures)?;
        Ok(Outcome::Features(mask))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fd::testing::RecordingDup;
    use std::fs;

    #[test]
    fn argument_protocol() {
        assert_eq!(Mode::from_args(&["check"]), Some(Mode::Check));
        assert_eq!(Mode::from_args(&["check", "x"]), None);
        assert_eq!(Mode::from_args(&["use-ivshm"]), Some(Mode::Ivshm));
        assert_eq!(
            Mode::from_args(&["use-ivshm", "use-unix-socks"]),
            Some(Mode::UnixSocks)
        );
        assert_eq!(Mode::from_args(&["exec", "use-unix-socks", "-v"]), Some(Mode::UnixSocks));
        assert_eq!(Mode::from_args(&["use-unix-socks"]), None);
        assert_eq!(Mode::from_args::<&str>(&[]), None);
    }

    fn cfg_at(dir: &tempfile::TempDir) -> BootConfig {
        BootConfig {
            sysroot: dir.path().to_path_buf(),
            ..BootConfig::default()
        }
    }

    #[test]
    fn check_writes_eight_bytes() {
        let dir = tempfile::tempdir().unwrap();
        fs::create_dir_all(dir.path().join("proc/self/ns")).unwrap();
        fs::write(dir.path().join("proc/self/ns/user"), b"").unwrap();
        let dup = RecordingDup::default();
        let mut boot = Bootstrap::new(cfg_at(&dir), &dup);
        let mut out = Vec::new();
        let outcome = boot.run(Mode::Check, &mut out).unwrap();
        assert_eq!(out.len(), 8);
        let mask = FeatureBitmask::from_le_bytes(&out).unwrap();
        assert!(matches!(outcome, Outcome::Features(m) if m == mask));
        assert!(mask.has(crate::probe::Feature::SandboxNamespace));
        assert_eq!(boot.state(), BootState::Uninitialized);
        assert!(dup.calls.borrow().is_empty());
    }

    #[test]
    fn no_device_aborts_without_dup() {
        let dir = tempfile::tempdir().unwrap();
        fs::create_dir_all(dir.path().join("sys/bus/pci/devices")).unwrap();
        let dup = RecordingDup::default();
        let mut boot = Bootstrap::new(cfg_at(&dir), &dup);
        let err = boot.run(Mode::Ivshm, &mut Vec::new()).unwrap_err();
        assert!(matches!(err, BootError::ChannelMissing { input: false, output: false }));
        assert_eq!(boot.state(), BootState::Aborted);
        assert!(dup.calls.borrow().is_empty());
    }

    #[test]
    fn aborted_is_terminal() {
        let dir = tempfile::tempdir().unwrap();
        let dup = RecordingDup::default();
        let mut boot = Bootstrap::new(cfg_at(&dir), &dup);
        assert!(boot.run(Mode::UnixSocks, &mut Vec::new()).is_err());
        assert_eq!(boot.state(), BootState::Aborted);
        let err = boot.run(Mode::UnixSocks, &mut Vec::new()).unwrap_err();
        assert!(matches!(err, BootError::AlreadyRun(BootState::Aborted)));
    }

    #[test]
    fn console_reaches_bound() {
        let dir = tempfile::tempdir().unwrap();
        fs::create_dir_all(dir.path().join("dev")).unwrap();
        for (id, port) in [(1, 30), (2, 29), (3, 28)] {
            fs::write(dir.path().join(format!("dev/vport{}p{}", id, port)), b"").unwrap();
        }
        let dup = RecordingDup::default();
        let mut boot = Bootstrap::new(cfg_at(&dir), &dup);
        assert!(matches!(boot.run(Mode::UnixSocks, &mut Vec::new()).unwrap(), Outcome::Console));
        assert_eq!(boot.state(), BootState::Bound);
    }
}
