//! # relayhub-domain
//!
//! Pure domain model for the relayhub relay controller.
//!
//! ## Responsibilities
//! - Foundational types: relay ports, error conventions, wall-clock time
//! - Define **relay states** (`on` / `off`) mirrored from output lines
//! - Define **schedules** (daily `[start, end]` windows) and their fire times
//! - Define the **override tracker** (manual action memory per relay)
//! - Define the **persisted relay record** written to durable storage
//!
//! ## Dependency rule
//! This crate has **no internal dependencies**.
//! It must never import anything from `app`, adapters, or external IO crates.
//! All IO boundaries are expressed as traits in the `app` crate (ports).

pub mod error;
pub mod port;
pub mod time;

pub mod overrides;
pub mod relay;
pub mod schedule;
pub mod snapshot;
