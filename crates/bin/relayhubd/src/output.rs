//! Runtime choice between hardware and simulated relay lines.

use std::sync::Arc;

use relayhub_adapter_gpio_sysfs::SysfsOutput;
use relayhub_adapter_virtual::VirtualOutput;
use relayhub_app::ports::OutputLine;
use relayhub_domain::error::RelayHubError;
use relayhub_domain::port::Port;
use relayhub_domain::relay::RelayState;

use crate::config::{Config, OutputBackend};

/// The output line type handed to the registry.
pub enum RelayOutput {
    Sysfs(SysfsOutput),
    Virtual(VirtualOutput),
}

impl OutputLine for RelayOutput {
    fn set_level(&self, state: RelayState) -> Result<(), RelayHubError> {
        match self {
            Self::Sysfs(line) => line.set_level(state),
            Self::Virtual(line) => line.set_level(state),
        }
    }

    fn read_level(&self) -> Result<RelayState, RelayHubError> {
        match self {
            Self::Sysfs(line) => line.read_level(),
            Self::Virtual(line) => line.read_level(),
        }
    }
}

/// Open one line per configured relay.
///
/// Blocks while sysfs pins are exported.
///
/// # Errors
///
/// Returns a hardware error when a sysfs pin cannot be exported or
/// configured.
pub fn open_all(config: &Config) -> Result<Vec<(Port, RelayOutput)>, RelayHubError> {
    config
        .relays
        .iter()
        .map(|relay| -> Result<(Port, RelayOutput), RelayHubError> {
            let output = match config.outputs.backend {
                OutputBackend::Sysfs => {
                    let line = SysfsOutput::open(
                        &config.outputs.sysfs_root,
                        relay.pin,
                        config.outputs.active_low,
                    )?;
                    tracing::debug!(port = relay.port, pin = line.pin(), "sysfs relay line ready");
                    RelayOutput::Sysfs(line)
                }
                OutputBackend::Virtual => {
                    let line = VirtualOutput::new(format!("gpio{}", relay.pin));
                    tracing::debug!(port = relay.port, line = line.name(), "virtual relay line ready");
                    RelayOutput::Virtual(line)
                }
            };
            Ok((Port::new(relay.port), output))
        })
        .collect()
}

/// [`open_all`] on the blocking pool, so pin export retries never stall a
/// runtime worker.
///
/// # Errors
///
/// Same as [`open_all`]; a panicked or cancelled opener is reported as a
/// hardware error.
pub async fn open_all_blocking(
    config: Arc<Config>,
) -> Result<Vec<(Port, RelayOutput)>, RelayHubError> {
    tokio::task::spawn_blocking(move || open_all(&config))
        .await
        .map_err(|err| RelayHubError::Hardware(Box::new(err)))?
}
