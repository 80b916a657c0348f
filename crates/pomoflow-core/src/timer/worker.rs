//! Background countdown worker.
//!
//! The worker runs as an isolated tokio task: commands arrive over an
//! unbounded channel and never block the caller, progress comes back as
//! [`WorkerEvent`]s on a second channel, and no state is shared either
//! way. Spawning requires a running tokio runtime; calling
//! [`CountdownWorker::spawn`] outside one panics, which is the fatal
//! initialization error for a missing scheduling platform.
//!
//! ## Usage
//!
//! ```ignore
//! let (handle, mut events) = CountdownWorker::spawn();
//! handle.start(25 * 60, RunId(1))?;
//! while let Some(event) = events.recv().await {
//!     // timer-tick ... timer-finished
//! }
//! ```

use std::time::{Duration, SystemTime};

use chrono::Utc;
use tokio::sync::mpsc::{self, UnboundedReceiver, UnboundedSender};
use tokio::time::{interval_at, Instant, Interval, MissedTickBehavior};
use tracing::{debug, warn};

use super::countdown::Countdown;
use crate::error::WorkerGone;
use crate::protocol::{RunId, WorkerCommand, WorkerEvent};

/// Standard scheduling interval: one firing per second.
pub const TICK_INTERVAL: Duration = Duration::from_secs(1);

/// Messages on the worker's inbox. Typed commands come from
/// [`WorkerHandle`]'s named methods; raw frames are decoded (and possibly
/// rejected) inside the worker so a malformed frame surfaces as an `error`
/// event instead of tearing anything down.
pub(crate) enum Inbound {
    Command(WorkerCommand),
    Frame(serde_json::Value),
}

/// Non-blocking command surface for a spawned [`CountdownWorker`].
///
/// All methods enqueue and return immediately; results arrive later as
/// events. They fail only with [`WorkerGone`], meaning the worker task has
/// terminated.
#[derive(Clone)]
pub struct WorkerHandle {
    tx: UnboundedSender<Inbound>,
}

impl WorkerHandle {
    /// (Re)start the countdown at `seconds`, tagging its events with `run`.
    pub fn start(&self, seconds: u64, run: RunId) -> Result<(), WorkerGone> {
        self.send(WorkerCommand::StartTimer { seconds, run })
    }

    /// Cancel the active countdown. Idempotent.
    pub fn stop(&self) -> Result<(), WorkerGone> {
        self.send(WorkerCommand::StopTimer)
    }

    /// Re-arm the active countdown to `seconds` without changing runs.
    pub fn update(&self, seconds: u64) -> Result<(), WorkerGone> {
        self.send(WorkerCommand::UpdateTimer { seconds })
    }

    /// Deliver a raw protocol frame. An undecodable frame is reported via
    /// an `error` event, not as a failure here.
    pub fn send_frame(&self, frame: serde_json::Value) -> Result<(), WorkerGone> {
        self.tx.send(Inbound::Frame(frame)).map_err(|_| WorkerGone)
    }

    fn send(&self, command: WorkerCommand) -> Result<(), WorkerGone> {
        self.tx
            .send(Inbound::Command(command))
            .map_err(|_| WorkerGone)
    }
}

struct ActiveRun {
    run: RunId,
    countdown: Countdown,
    schedule: Interval,
}

/// The countdown worker task. See the module docs for the contract.
pub struct CountdownWorker {
    inbox: UnboundedReceiver<Inbound>,
    events: UnboundedSender<WorkerEvent>,
    period: Duration,
    active: Option<ActiveRun>,
}

impl CountdownWorker {
    /// Spawn a worker with the standard one-second schedule.
    pub fn spawn() -> (WorkerHandle, UnboundedReceiver<WorkerEvent>) {
        Self::spawn_with_interval(TICK_INTERVAL)
    }

    /// Spawn a worker with a custom scheduling interval.
    ///
    /// Drift correction is interval-agnostic, so test harnesses use short
    /// periods to compress wall-clock time.
    pub fn spawn_with_interval(period: Duration) -> (WorkerHandle, UnboundedReceiver<WorkerEvent>) {
        let (tx, inbox) = mpsc::unbounded_channel();
        let (events, rx) = mpsc::unbounded_channel();
        let worker = Self {
            inbox,
            events,
            period,
            active: None,
        };
        tokio::spawn(worker.run());
        (WorkerHandle { tx }, rx)
    }

    async fn run(mut self) {
        loop {
            tokio::select! {
                inbound = self.inbox.recv() => match inbound {
                    Some(inbound) => self.handle_inbound(inbound),
                    // Every handle dropped; nothing can reach us again.
                    None => break,
                },
                _ = fire(&mut self.active) => self.on_fire(),
            }
            if self.events.is_closed() {
                break;
            }
        }
        debug!("countdown worker stopped");
    }

    fn handle_inbound(&mut self, inbound: Inbound) {
        match inbound {
            Inbound::Command(command) => self.handle_command(command),
            Inbound::Frame(frame) => match serde_json::from_value::<WorkerCommand>(frame) {
                Ok(command) => self.handle_command(command),
                Err(err) => self.protocol_error(format!("unrecognized command: {err}")),
            },
        }
    }

    fn handle_command(&mut self, command: WorkerCommand) {
        match command {
            WorkerCommand::StartTimer { seconds, run } => {
                if seconds == 0 {
                    self.protocol_error("start-timer requires a positive duration".into());
                    return;
                }
                debug!(%run, seconds, "starting countdown");
                self.active = Some(ActiveRun {
                    run,
                    countdown: Countdown::new(seconds, now_ms()),
                    schedule: schedule(self.period),
                });
            }
            WorkerCommand::StopTimer => {
                if self.active.take().is_some() {
                    debug!("countdown stopped");
                }
            }
            WorkerCommand::UpdateTimer { seconds } => {
                if seconds == 0 {
                    self.protocol_error("update-timer requires a positive duration".into());
                    return;
                }
                let fresh_schedule = schedule(self.period);
                match self.active.as_mut() {
                    Some(active) => {
                        debug!(run = %active.run, seconds, "re-arming countdown");
                        active.countdown.rearm(seconds, now_ms());
                        active.schedule = fresh_schedule;
                    }
                    None => debug!(seconds, "update-timer with no active countdown"),
                }
            }
        }
    }

    fn on_fire(&mut self) {
        let (tick, run) = match self.active.as_mut() {
            Some(active) => (active.countdown.advance(now_ms()), active.run),
            None => return,
        };
        let _ = self.events.send(WorkerEvent::TimerTick {
            seconds: tick.remaining_secs,
            run,
            at: Utc::now(),
        });
        if tick.finished {
            debug!(%run, "countdown finished");
            self.active = None;
            let _ = self.events.send(WorkerEvent::TimerFinished {
                run,
                at: Utc::now(),
            });
        }
    }

    fn protocol_error(&self, message: String) {
        warn!(%message, "protocol error");
        let _ = self.events.send(WorkerEvent::Error {
            message,
            at: Utc::now(),
        });
    }
}

/// Await the next schedule firing, or forever when idle (a command on the
/// inbox is then the only thing that can wake the loop).
async fn fire(active: &mut Option<ActiveRun>) {
    match active {
        Some(run) => {
            run.schedule.tick().await;
        }
        None => std::future::pending().await,
    }
}

/// A late firing carries the whole wall-clock gap, which drift correction
/// reconciles in a single tick; catching up with a burst of firings would
/// drain the display faster than wall clock instead.
fn schedule(period: Duration) -> Interval {
    let mut interval = interval_at(Instant::now() + period, period);
    interval.set_missed_tick_behavior(MissedTickBehavior::Skip);
    interval
}

fn now_ms() -> u64 {
    SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .unwrap_or_default()
        .as_millis() as u64
}

#[cfg(test)]
impl WorkerHandle {
    /// A handle wired to a bare channel instead of a task, for unit tests
    /// that only need to observe what would be sent.
    pub(crate) fn detached() -> (WorkerHandle, UnboundedReceiver<Inbound>) {
        let (tx, rx) = mpsc::unbounded_channel();
        (WorkerHandle { tx }, rx)
    }
}
