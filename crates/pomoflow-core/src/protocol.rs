//! Wire protocol between the phase controller and the countdown worker.
//!
//! Commands flow controller -> worker, events flow worker -> controller,
//! and nothing else crosses the boundary. Both sides are serde tagged
//! unions so a frame looks the same in process and across any transport a
//! front-end might put between the two.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Generation identifier for one countdown run.
///
/// Every `start-timer` names a fresh run, and the worker echoes the id on
/// each `timer-tick` / `timer-finished` it emits for that run. A consumer
/// that stopped one run and started another can therefore discard
/// in-flight events from the superseded run by comparing ids instead of
/// relying on delivery timing.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(transparent)]
pub struct RunId(pub u64);

impl RunId {
    /// The next generation after this one.
    pub fn next(self) -> RunId {
        RunId(self.0 + 1)
    }
}

impl std::fmt::Display for RunId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "run#{}", self.0)
    }
}

/// Commands accepted by the countdown worker.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "kebab-case")]
pub enum WorkerCommand {
    /// Begin a new countdown, cancelling and replacing any active one.
    /// `seconds` must be positive.
    StartTimer { seconds: u64, run: RunId },
    /// Cancel the active countdown. No-op when nothing is running.
    StopTimer,
    /// Re-arm the active countdown to a new duration without starting a
    /// new run. No-op when nothing is running.
    UpdateTimer { seconds: u64 },
}

/// Events emitted by the countdown worker.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "kebab-case")]
pub enum WorkerEvent {
    /// Periodic remaining-time report for the tagged run. The decrement
    /// between consecutive ticks reflects actual wall-clock time, not the
    /// number of scheduler firings.
    TimerTick {
        seconds: u64,
        run: RunId,
        at: DateTime<Utc>,
    },
    /// The tagged run consumed its full duration. Emitted exactly once per
    /// run; the schedule is already stopped when this is sent.
    TimerFinished { run: RunId, at: DateTime<Utc> },
    /// A protocol-level fault (unrecognized or malformed command). The
    /// worker stays responsive and any active countdown keeps running.
    Error { message: String, at: DateTime<Utc> },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn commands_use_kebab_case_tags() {
        let start = serde_json::to_value(WorkerCommand::StartTimer {
            seconds: 300,
            run: RunId(1),
        })
        .unwrap();
        assert_eq!(start["type"], "start-timer");
        assert_eq!(start["seconds"], 300);
        assert_eq!(start["run"], 1);

        let stop = serde_json::to_value(WorkerCommand::StopTimer).unwrap();
        assert_eq!(stop["type"], "stop-timer");

        let update = serde_json::to_value(WorkerCommand::UpdateTimer { seconds: 60 }).unwrap();
        assert_eq!(update["type"], "update-timer");
    }

    #[test]
    fn events_use_kebab_case_tags() {
        let tick = serde_json::to_value(WorkerEvent::TimerTick {
            seconds: 42,
            run: RunId(3),
            at: Utc::now(),
        })
        .unwrap();
        assert_eq!(tick["type"], "timer-tick");
        assert_eq!(tick["seconds"], 42);
        assert_eq!(tick["run"], 3);

        let finished = serde_json::to_value(WorkerEvent::TimerFinished {
            run: RunId(3),
            at: Utc::now(),
        })
        .unwrap();
        assert_eq!(finished["type"], "timer-finished");

        let error = serde_json::to_value(WorkerEvent::Error {
            message: "nope".into(),
            at: Utc::now(),
        })
        .unwrap();
        assert_eq!(error["type"], "error");
    }

    #[test]
    fn unknown_command_tag_fails_to_decode() {
        let frame = serde_json::json!({ "type": "pause-timer" });
        assert!(serde_json::from_value::<WorkerCommand>(frame).is_err());
    }
}
