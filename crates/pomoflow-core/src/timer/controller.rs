//! Phase cycle controller.
//!
//! Owns the persisted [`TimerSettings`] and the display-side countdown
//! state, and orchestrates the worker across phase transitions. All worker
//! interaction is fire-and-forget commands out and [`WorkerEvent`]s in;
//! the controller never reaches into worker-owned state, and every
//! settings mutation is written through the injected [`SettingsStore`].

use tracing::{debug, warn};

use super::phase::{PhaseInfo, TimerPhase};
use super::settings::TimerSettings;
use super::worker::WorkerHandle;
use crate::error::CoreError;
use crate::protocol::{RunId, WorkerEvent};
use crate::storage::SettingsStore;

/// What a consumed [`WorkerEvent`] meant to the phase machine.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EventOutcome {
    /// Remaining time moved for the active run.
    Ticked { remaining_secs: u64 },
    /// The active run finished; the machine advanced to `phase`. When the
    /// matching auto-start flag is set a new run is already underway.
    PhaseCompleted { phase: TimerPhase, auto_started: bool },
    /// The worker reported a protocol fault. The phase machine is untouched.
    Faulted { message: String },
    /// Event from a superseded run; discarded.
    Stale,
}

pub struct PhaseController {
    settings: TimerSettings,
    store: Box<dyn SettingsStore>,
    worker: WorkerHandle,
    /// Displayed remaining seconds for the current phase.
    remaining_secs: u64,
    /// Run the controller currently attributes incoming events to.
    active_run: Option<RunId>,
    /// Generation allocator. The controller is the sole issuer of start
    /// commands, which keeps this authoritative for staleness checks.
    last_run: RunId,
}

impl PhaseController {
    /// Load settings through `store` and bind to a spawned worker.
    pub fn new(store: Box<dyn SettingsStore>, worker: WorkerHandle) -> Self {
        let settings = store.load();
        let remaining_secs = settings.current_duration_secs();
        Self {
            settings,
            store,
            worker,
            remaining_secs,
            active_run: None,
            last_run: RunId(0),
        }
    }

    // ── Queries ──────────────────────────────────────────────────────

    pub fn settings(&self) -> &TimerSettings {
        &self.settings
    }

    pub fn current_phase(&self) -> TimerPhase {
        self.settings.current_phase
    }

    pub fn cycle_count(&self) -> u32 {
        self.settings.pomodoro_cycle_count
    }

    pub fn current_duration_secs(&self) -> u64 {
        self.settings.current_duration_secs()
    }

    pub fn remaining_secs(&self) -> u64 {
        self.remaining_secs
    }

    pub fn is_running(&self) -> bool {
        self.active_run.is_some()
    }

    /// 0..=100 progress through the current phase.
    ///
    /// A zero-duration phase cannot arise through validated settings; the
    /// division is still guarded and reports 0 rather than going undefined.
    pub fn progress_percent(&self) -> u8 {
        let total = self.current_duration_secs();
        if total == 0 {
            return 0;
        }
        let done = total.saturating_sub(self.remaining_secs);
        ((done as f64 / total as f64) * 100.0).round() as u8
    }

    pub fn phase_info(&self) -> PhaseInfo {
        PhaseInfo::new(
            self.current_phase(),
            self.cycle_count(),
            self.remaining_secs,
        )
    }

    // ── Commands ─────────────────────────────────────────────────────

    /// Start the countdown for the displayed remaining time under a fresh
    /// run id.
    pub fn start(&mut self) -> Result<RunId, CoreError> {
        let run = self.last_run.next();
        self.worker.start(self.remaining_secs, run)?;
        self.last_run = run;
        self.active_run = Some(run);
        Ok(run)
    }

    /// Stop the countdown. Idempotent; a tick already in flight will be
    /// discarded as stale when it arrives.
    pub fn stop(&mut self) -> Result<(), CoreError> {
        self.worker.stop()?;
        self.active_run = None;
        Ok(())
    }

    /// Advance the phase machine by hand. The displayed remaining time
    /// resets to the new phase's duration; the worker is not started.
    pub fn next_phase(&mut self) -> Result<TimerPhase, CoreError> {
        self.advance_and_persist()
    }

    /// Zero the cycle count and return to Pomodoro, leaving durations,
    /// auto-start flags, and any active countdown untouched.
    pub fn reset_cycle(&mut self) -> Result<(), CoreError> {
        let phase_before = self.settings.current_phase;
        self.settings.reset_cycle();
        self.after_settings_change(phase_before)
    }

    /// Restore the default configuration wholesale.
    pub fn reset_app_state(&mut self) -> Result<(), CoreError> {
        let phase_before = self.settings.current_phase;
        self.settings = TimerSettings::default();
        self.after_settings_change(phase_before)
    }

    /// Apply a settings mutation, validate the result, persist it.
    /// The mutation is discarded wholesale when validation fails.
    pub fn update_settings(
        &mut self,
        mutate: impl FnOnce(&mut TimerSettings),
    ) -> Result<(), CoreError> {
        let phase_before = self.settings.current_phase;
        let mut updated = self.settings.clone();
        mutate(&mut updated);
        updated.validate()?;
        self.settings = updated;
        self.after_settings_change(phase_before)
    }

    // ── Event intake ─────────────────────────────────────────────────

    /// Fold one worker event into the controller state.
    ///
    /// Ticks and finishes tagged with a superseded run id are discarded: a
    /// stop/restart can race an event already in flight, and run ids are
    /// what make that race harmless.
    pub fn handle_event(&mut self, event: &WorkerEvent) -> Result<EventOutcome, CoreError> {
        match event {
            WorkerEvent::TimerTick { seconds, run, .. } => {
                if self.active_run != Some(*run) {
                    debug!(%run, "discarding tick from superseded run");
                    return Ok(EventOutcome::Stale);
                }
                self.remaining_secs = *seconds;
                Ok(EventOutcome::Ticked {
                    remaining_secs: *seconds,
                })
            }
            WorkerEvent::TimerFinished { run, .. } => {
                if self.active_run != Some(*run) {
                    debug!(%run, "discarding finish from superseded run");
                    return Ok(EventOutcome::Stale);
                }
                self.active_run = None;
                let phase = self.advance_and_persist()?;
                let auto_start = match phase {
                    TimerPhase::Pomodoro => self.settings.auto_start_pomodoro,
                    TimerPhase::ShortBreak | TimerPhase::LongBreak => {
                        self.settings.auto_start_break
                    }
                };
                if auto_start {
                    self.start()?;
                }
                Ok(EventOutcome::PhaseCompleted {
                    phase,
                    auto_started: auto_start,
                })
            }
            WorkerEvent::Error { message, .. } => {
                warn!(%message, "worker fault");
                Ok(EventOutcome::Faulted {
                    message: message.clone(),
                })
            }
        }
    }

    // ── Internal ─────────────────────────────────────────────────────

    fn advance_and_persist(&mut self) -> Result<TimerPhase, CoreError> {
        let phase = self.settings.advance_phase();
        self.remaining_secs = self.settings.current_duration_secs();
        self.store.save(&self.settings)?;
        Ok(phase)
    }

    /// Write-through plus the reactive rule: the displayed remaining time
    /// resets whenever the current phase changed.
    fn after_settings_change(&mut self, phase_before: TimerPhase) -> Result<(), CoreError> {
        if self.settings.current_phase != phase_before {
            self.remaining_secs = self.settings.current_duration_secs();
        }
        self.store.save(&self.settings)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ConfigError;
    use crate::protocol::WorkerCommand;
    use crate::timer::worker::Inbound;
    use chrono::Utc;
    use std::sync::{Arc, Mutex};
    use tokio::sync::mpsc::UnboundedReceiver;

    /// In-memory store recording every write-through.
    #[derive(Clone, Default)]
    struct MemoryStore {
        saved: Arc<Mutex<Vec<TimerSettings>>>,
    }

    impl SettingsStore for MemoryStore {
        fn load(&self) -> TimerSettings {
            self.saved
                .lock()
                .unwrap()
                .last()
                .cloned()
                .unwrap_or_default()
        }

        fn save(&self, settings: &TimerSettings) -> Result<(), ConfigError> {
            self.saved.lock().unwrap().push(settings.clone());
            Ok(())
        }
    }

    fn controller() -> (PhaseController, MemoryStore, UnboundedReceiver<Inbound>) {
        let store = MemoryStore::default();
        let (handle, rx) = WorkerHandle::detached();
        let controller = PhaseController::new(Box::new(store.clone()), handle);
        (controller, store, rx)
    }

    fn tick(run: RunId, seconds: u64) -> WorkerEvent {
        WorkerEvent::TimerTick {
            seconds,
            run,
            at: Utc::now(),
        }
    }

    fn finished(run: RunId) -> WorkerEvent {
        WorkerEvent::TimerFinished {
            run,
            at: Utc::now(),
        }
    }

    #[test]
    fn fresh_controller_shows_full_pomodoro() {
        let (controller, _, _rx) = controller();
        assert_eq!(controller.current_phase(), TimerPhase::Pomodoro);
        assert_eq!(controller.remaining_secs(), 25 * 60);
        assert_eq!(controller.current_duration_secs(), 25 * 60);
        assert_eq!(controller.progress_percent(), 0);
        assert!(!controller.is_running());
    }

    #[test]
    fn start_sends_remaining_under_a_fresh_run() {
        let (mut controller, _, mut rx) = controller();
        let run = controller.start().unwrap();
        assert_eq!(run, RunId(1));
        assert!(controller.is_running());
        match rx.try_recv().unwrap() {
            Inbound::Command(WorkerCommand::StartTimer { seconds, run }) => {
                assert_eq!(seconds, 25 * 60);
                assert_eq!(run, RunId(1));
            }
            _ => panic!("expected a start-timer command"),
        }

        let run = controller.start().unwrap();
        assert_eq!(run, RunId(2), "each start names a new generation");
    }

    #[test]
    fn ticks_from_the_active_run_update_remaining() {
        let (mut controller, _, _rx) = controller();
        let run = controller.start().unwrap();
        let outcome = controller.handle_event(&tick(run, 25 * 60 - 10)).unwrap();
        assert_eq!(
            outcome,
            EventOutcome::Ticked {
                remaining_secs: 25 * 60 - 10
            }
        );
        assert_eq!(controller.remaining_secs(), 25 * 60 - 10);
    }

    #[test]
    fn stale_events_are_discarded() {
        let (mut controller, _, _rx) = controller();
        let old_run = controller.start().unwrap();
        controller.stop().unwrap();
        let new_run = controller.start().unwrap();

        // A tick from the stopped run arrives after the restart.
        let outcome = controller.handle_event(&tick(old_run, 3)).unwrap();
        assert_eq!(outcome, EventOutcome::Stale);
        assert_eq!(controller.remaining_secs(), 25 * 60);

        // So does its finish; the phase machine must not advance.
        let outcome = controller.handle_event(&finished(old_run)).unwrap();
        assert_eq!(outcome, EventOutcome::Stale);
        assert_eq!(controller.current_phase(), TimerPhase::Pomodoro);

        let outcome = controller.handle_event(&tick(new_run, 100)).unwrap();
        assert_eq!(
            outcome,
            EventOutcome::Ticked {
                remaining_secs: 100
            }
        );
    }

    #[test]
    fn events_after_stop_are_discarded() {
        let (mut controller, _, _rx) = controller();
        let run = controller.start().unwrap();
        controller.stop().unwrap();
        assert!(!controller.is_running());
        assert_eq!(
            controller.handle_event(&tick(run, 5)).unwrap(),
            EventOutcome::Stale
        );
    }

    #[test]
    fn finish_advances_phase_and_resets_remaining() {
        let (mut controller, store, _rx) = controller();
        let run = controller.start().unwrap();
        controller.handle_event(&tick(run, 0)).unwrap();

        let outcome = controller.handle_event(&finished(run)).unwrap();
        assert_eq!(
            outcome,
            EventOutcome::PhaseCompleted {
                phase: TimerPhase::ShortBreak,
                auto_started: false,
            }
        );
        assert_eq!(controller.current_phase(), TimerPhase::ShortBreak);
        assert_eq!(controller.remaining_secs(), 5 * 60);
        assert!(!controller.is_running());

        // The transition was written through.
        let persisted = store.load();
        assert_eq!(persisted.current_phase, TimerPhase::ShortBreak);
    }

    #[test]
    fn finish_auto_starts_the_break_when_flagged() {
        let (mut controller, _, mut rx) = controller();
        controller
            .update_settings(|s| s.auto_start_break = true)
            .unwrap();
        let run = controller.start().unwrap();
        let _ = rx.try_recv();

        let outcome = controller.handle_event(&finished(run)).unwrap();
        assert_eq!(
            outcome,
            EventOutcome::PhaseCompleted {
                phase: TimerPhase::ShortBreak,
                auto_started: true,
            }
        );
        assert!(controller.is_running());
        match rx.try_recv().unwrap() {
            Inbound::Command(WorkerCommand::StartTimer { seconds, run }) => {
                assert_eq!(seconds, 5 * 60);
                assert_eq!(run, RunId(2));
            }
            _ => panic!("expected an auto-start command"),
        }
    }

    #[test]
    fn finish_does_not_auto_start_pomodoro_without_the_flag() {
        let (mut controller, _, _rx) = controller();
        controller
            .update_settings(|s| {
                s.auto_start_break = true;
                s.current_phase = TimerPhase::ShortBreak;
            })
            .unwrap();
        let run = controller.start().unwrap();
        let outcome = controller.handle_event(&finished(run)).unwrap();
        assert_eq!(
            outcome,
            EventOutcome::PhaseCompleted {
                phase: TimerPhase::Pomodoro,
                auto_started: false,
            }
        );
        assert!(!controller.is_running());
    }

    #[test]
    fn duration_lookup_tracks_every_transition() {
        let (mut controller, _, _rx) = controller();
        controller
            .update_settings(|s| {
                s.durations.pomodoro = 40;
                s.durations.short_break = 7;
                s.durations.long_break = 20;
            })
            .unwrap();
        for _ in 0..12 {
            let phase = controller.next_phase().unwrap();
            let minutes = controller.settings().durations.minutes(phase);
            assert_eq!(controller.current_duration_secs(), u64::from(minutes) * 60);
            assert_eq!(controller.remaining_secs(), controller.current_duration_secs());
        }
    }

    #[test]
    fn reset_cycle_returns_to_pomodoro_and_keeps_settings() {
        let (mut controller, _, _rx) = controller();
        controller
            .update_settings(|s| {
                s.durations.pomodoro = 30;
                s.auto_start_pomodoro = true;
                s.pomodoro_cycle_count = 5;
                s.current_phase = TimerPhase::LongBreak;
            })
            .unwrap();

        controller.reset_cycle().unwrap();
        assert_eq!(controller.cycle_count(), 0);
        assert_eq!(controller.current_phase(), TimerPhase::Pomodoro);
        assert_eq!(controller.remaining_secs(), 30 * 60);
        assert_eq!(controller.settings().durations.pomodoro, 30);
        assert!(controller.settings().auto_start_pomodoro);
    }

    #[test]
    fn reset_app_state_restores_defaults_from_any_state() {
        let (mut controller, store, _rx) = controller();
        controller
            .update_settings(|s| {
                s.durations.pomodoro = 55;
                s.auto_start_break = true;
                s.long_break_interval = 9;
                s.pomodoro_cycle_count = 42;
                s.current_phase = TimerPhase::ShortBreak;
            })
            .unwrap();

        controller.reset_app_state().unwrap();
        assert_eq!(controller.settings(), &TimerSettings::default());
        assert_eq!(controller.cycle_count(), 0);
        assert_eq!(controller.remaining_secs(), 25 * 60);
        assert_eq!(store.load(), TimerSettings::default());
    }

    #[test]
    fn invalid_settings_mutation_is_discarded_wholesale() {
        let (mut controller, _, _rx) = controller();
        let err = controller.update_settings(|s| {
            s.durations.pomodoro = 0;
            s.auto_start_break = true;
        });
        assert!(err.is_err());
        assert_eq!(controller.settings(), &TimerSettings::default());
    }

    #[test]
    fn progress_percent_tracks_remaining() {
        let (mut controller, _, _rx) = controller();
        let run = controller.start().unwrap();
        assert_eq!(controller.progress_percent(), 0);

        controller
            .handle_event(&tick(run, 25 * 60 / 2))
            .unwrap();
        assert_eq!(controller.progress_percent(), 50);

        controller.handle_event(&tick(run, 0)).unwrap();
        assert_eq!(controller.progress_percent(), 100);
    }

    #[test]
    fn worker_faults_leave_the_machine_untouched() {
        let (mut controller, _, _rx) = controller();
        controller.start().unwrap();
        let before = controller.settings().clone();
        let outcome = controller
            .handle_event(&WorkerEvent::Error {
                message: "unrecognized command".into(),
                at: Utc::now(),
            })
            .unwrap();
        assert_eq!(
            outcome,
            EventOutcome::Faulted {
                message: "unrecognized command".into()
            }
        );
        assert_eq!(controller.settings(), &before);
        assert!(controller.is_running());
    }

    #[test]
    fn phase_titles_follow_the_cycle() {
        let (mut controller, _, _rx) = controller();
        assert_eq!(controller.phase_info().phase_title, "Pomodoro #1");
        controller.next_phase().unwrap();
        assert_eq!(controller.phase_info().phase_title, "Short Break #1");
        controller.next_phase().unwrap();
        assert_eq!(controller.phase_info().phase_title, "Pomodoro #2");
        assert_eq!(
            controller.phase_info().page_title,
            "25:00 - Time to focus!"
        );
    }
}
