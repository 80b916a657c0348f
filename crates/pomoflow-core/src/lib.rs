//! # Pomoflow Core Library
//!
//! Core engine for a Pomodoro-style productivity timer: a drift-corrected
//! countdown worker plus a phase cycle controller, decoupled from any
//! presentation layer so timing stays accurate even when the host
//! throttles periodic callbacks.
//!
//! ## Architecture
//!
//! - **Countdown Worker**: an isolated tokio task reconciling elapsed time
//!   against the wall clock on every scheduler firing. Commands go in over
//!   a channel, `timer-tick`/`timer-finished`/`error` events come out; no
//!   memory is shared across the boundary.
//! - **Phase Controller**: the Pomodoro / Short Break / Long Break state
//!   machine with cycle counting, per-phase duration lookup, and derived
//!   display state. It owns the persisted settings and writes them through
//!   an injected [`SettingsStore`] on every mutation.
//! - **Storage**: TOML-based configuration under `~/.config/pomoflow/`,
//!   loaded once at startup and defaulted when absent or invalid.
//!
//! ## Key Components
//!
//! - [`CountdownWorker`] / [`WorkerHandle`]: the background countdown
//! - [`PhaseController`]: phase state machine and event consumer
//! - [`TimerSettings`]: the persisted configuration record
//! - [`WorkerCommand`] / [`WorkerEvent`]: the wire protocol between them

pub mod error;
pub mod protocol;
pub mod storage;
pub mod timer;

pub use error::{ConfigError, CoreError, ValidationError, WorkerGone};
pub use protocol::{RunId, WorkerCommand, WorkerEvent};
pub use storage::{SettingsStore, TomlSettingsStore};
pub use timer::{
    format_clock, Countdown, CountdownWorker, EventOutcome, PhaseController, PhaseDurations,
    PhaseInfo, TimerPhase, TimerSettings, WorkerHandle,
};
