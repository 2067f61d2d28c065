//! # relayhub-app
//!
//! Application layer — use-cases and **port definitions** (traits).
//!
//! ## Responsibilities
//! - Define **port traits** that adapters must implement (driven/outbound ports):
//!   - `OutputLine` — drive and read one physical relay line
//!   - `RelayStateStore` — load & save the persisted relay document
//!   - `Clock` — local wall-clock time
//! - Own all relay state in a single **registry** with per-relay locking
//! - Define **driving/inbound** use-cases:
//!   - `RelayService` — manual on/off, status queries
//!   - `SchedulerEngine` — daily windows, start/end triggers, startup restore
//!
//! ## Dependency rule
//! Depends on `relayhub-domain` only (plus `tokio` for locks and timers).
//! Never imports adapter crates. Adapters depend on *this* crate, not the reverse.

pub mod ports;
pub mod registry;
pub mod scheduler;
pub mod services;

#[cfg(test)]
pub(crate) mod test_support;
