//! # relayhub-adapter-gpio-sysfs
//!
//! Relay lines driven through the Linux sysfs GPIO interface.
//!
//! ## Responsibilities
//! - Export the pin and configure it as an output on open
//! - Translate relay states to line levels, honoring active-low boards
//!   (the usual relay HAT switches on when its input is pulled low)
//! - Read the level back from `value`
//!
//! Writes are synchronous: `set_level` returns once the kernel accepted the
//! new value.
//!
//! ## Dependency rule
//! Depends on `relayhub-app` (port traits) and `relayhub-domain` only.

use std::path::{Path, PathBuf};
use std::time::Duration;

use relayhub_app::ports::OutputLine;
use relayhub_domain::error::RelayHubError;
use relayhub_domain::relay::RelayState;

/// Default sysfs GPIO class directory.
pub const DEFAULT_SYSFS_ROOT: &str = "/sys/class/gpio";

/// udev may take a moment to expose a freshly exported pin.
const EXPORT_ATTEMPTS: u32 = 20;
const EXPORT_DELAY: Duration = Duration::from_millis(10);

/// Errors raised while driving a sysfs GPIO line.
#[derive(Debug, thiserror::Error)]
pub enum GpioError {
    #[error("gpio {pin}: i/o error on {}", path.display())]
    Io {
        pin: u32,
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("gpio {pin}: unexpected value {value:?}")]
    UnexpectedValue { pin: u32, value: String },
}

impl From<GpioError> for RelayHubError {
    fn from(err: GpioError) -> Self {
        Self::Hardware(Box::new(err))
    }
}

/// One exported sysfs GPIO pin configured as an output.
#[derive(Debug, Clone)]
pub struct SysfsOutput {
    pin: u32,
    dir: PathBuf,
    active_low: bool,
}

impl SysfsOutput {
    /// Export `pin` under `root` if needed and set it up as an output whose
    /// initial level means "off".
    ///
    /// A freshly exported pin may need a moment before its `direction` file
    /// accepts writes, so this can block the thread for a short while. Async
    /// callers should run it on a blocking task.
    ///
    /// # Errors
    ///
    /// Returns [`GpioError::Io`] when the pin cannot be exported or
    /// configured.
    pub fn open(root: impl AsRef<Path>, pin: u32, active_low: bool) -> Result<Self, GpioError> {
        let root = root.as_ref();
        let dir = root.join(format!("gpio{pin}"));
        let output = Self {
            pin,
            dir,
            active_low,
        };

        if !output.dir.exists() {
            output.write(&root.join("export"), &pin.to_string())?;
            tracing::debug!(pin, "gpio exported");
        }

        // "high"/"low" set direction and initial level in one step, so the
        // relay never flickers on while being configured.
        let direction = if active_low { "high" } else { "low" };
        let direction_path = output.dir.join("direction");
        let mut attempt = 1;
        loop {
            match output.write(&direction_path, direction) {
                Ok(()) => break,
                Err(err) if attempt >= EXPORT_ATTEMPTS => return Err(err),
                Err(_) => {
                    attempt += 1;
                    std::thread::sleep(EXPORT_DELAY);
                }
            }
        }
        tracing::info!(pin, active_low, "gpio configured as output");
        Ok(output)
    }

    #[must_use]
    pub fn pin(&self) -> u32 {
        self.pin
    }

    fn write(&self, path: &Path, contents: &str) -> Result<(), GpioError> {
        std::fs::write(path, contents).map_err(|source| GpioError::Io {
            pin: self.pin,
            path: path.to_path_buf(),
            source,
        })
    }

    fn level_for(&self, state: RelayState) -> &'static str {
        if state.is_on() != self.active_low { "1" } else { "0" }
    }
}

impl OutputLine for SysfsOutput {
    fn set_level(&self, state: RelayState) -> Result<(), RelayHubError> {
        self.write(&self.dir.join("value"), self.level_for(state))?;
        Ok(())
    }

    fn read_level(&self) -> Result<RelayState, RelayHubError> {
        let path = self.dir.join("value");
        let raw = std::fs::read_to_string(&path).map_err(|source| GpioError::Io {
            pin: self.pin,
            path,
            source,
        })?;
        let high = match raw.trim() {
            "1" => true,
            "0" => false,
            other => {
                return Err(GpioError::UnexpectedValue {
                    pin: self.pin,
                    value: other.to_string(),
                }
                .into());
            }
        };
        Ok(if high != self.active_low {
            RelayState::On
        } else {
            RelayState::Off
        })
    }
}
