mod controller;
mod countdown;
mod phase;
mod settings;
mod worker;

pub use controller::{EventOutcome, PhaseController};
pub use countdown::{Countdown, Tick};
pub use phase::{format_clock, PhaseDurations, PhaseInfo, TimerPhase};
pub use settings::TimerSettings;
pub use worker::{CountdownWorker, WorkerHandle, TICK_INTERVAL};
