//! Persisted timer configuration and the phase state machine.
//!
//! [`TimerSettings`] is the single record the application persists: phase
//! durations, auto-start flags, the long-break interval, the completed
//! cycle count, and the current phase. The phase transition rules live
//! here as pure methods; the controller wraps them with persistence and
//! display-state upkeep.

use serde::{Deserialize, Serialize};

use super::phase::{PhaseDurations, TimerPhase};
use crate::error::{ConfigError, ValidationError};

/// The persisted timer configuration.
///
/// Field defaults mirror the shipped configuration so a partially written
/// or older config file still loads.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimerSettings {
    #[serde(default)]
    pub durations: PhaseDurations,
    #[serde(default)]
    pub auto_start_pomodoro: bool,
    #[serde(default)]
    pub auto_start_break: bool,
    /// Completed Pomodoro cycles between long breaks.
    #[serde(default = "default_long_break_interval")]
    pub long_break_interval: u32,
    /// Completed Pomodoro phases so far. Monotonic except for resets.
    #[serde(default)]
    pub pomodoro_cycle_count: u32,
    #[serde(default)]
    pub current_phase: TimerPhase,
}

fn default_long_break_interval() -> u32 {
    3
}

impl Default for TimerSettings {
    fn default() -> Self {
        Self {
            durations: PhaseDurations::default(),
            auto_start_pomodoro: false,
            auto_start_break: false,
            long_break_interval: default_long_break_interval(),
            pomodoro_cycle_count: 0,
            current_phase: TimerPhase::Pomodoro,
        }
    }
}

impl TimerSettings {
    /// Configured seconds for `phase`.
    pub fn duration_secs(&self, phase: TimerPhase) -> u64 {
        self.durations.secs(phase)
    }

    /// Configured seconds for the current phase.
    pub fn current_duration_secs(&self) -> u64 {
        self.duration_secs(self.current_phase)
    }

    /// Advance the phase state machine and return the new phase.
    ///
    /// Leaving a Pomodoro picks the break kind: a long break when the
    /// cycle count is positive and divides the long-break interval evenly,
    /// a short break otherwise; the count is not touched. Leaving either
    /// break returns to Pomodoro and counts the completed cycle.
    pub fn advance_phase(&mut self) -> TimerPhase {
        if self.current_phase == TimerPhase::Pomodoro {
            let count = self.pomodoro_cycle_count;
            self.current_phase = if count > 0 && count % self.long_break_interval == 0 {
                TimerPhase::LongBreak
            } else {
                TimerPhase::ShortBreak
            };
        } else {
            self.current_phase = TimerPhase::Pomodoro;
            self.pomodoro_cycle_count += 1;
        }
        self.current_phase
    }

    /// Restart the cycle: count to zero, back to Pomodoro. Durations and
    /// auto-start flags are untouched.
    pub fn reset_cycle(&mut self) {
        self.pomodoro_cycle_count = 0;
        self.current_phase = TimerPhase::Pomodoro;
    }

    /// Reject configurations the countdown engine cannot run.
    pub fn validate(&self) -> Result<(), ValidationError> {
        let durations = [
            ("durations.pomodoro", self.durations.pomodoro),
            ("durations.short_break", self.durations.short_break),
            ("durations.long_break", self.durations.long_break),
        ];
        for (field, minutes) in durations {
            if minutes == 0 {
                return Err(ValidationError::InvalidValue {
                    field: field.into(),
                    message: "phase duration must be at least one minute".into(),
                });
            }
        }
        if self.long_break_interval == 0 {
            return Err(ValidationError::InvalidValue {
                field: "long_break_interval".into(),
                message: "long break interval must be at least 1".into(),
            });
        }
        Ok(())
    }

    // ── Dot-path access (config CLI surface) ─────────────────────────

    /// Get a settings value as string by dot-separated key.
    pub fn get(&self, key: &str) -> Option<String> {
        let json = serde_json::to_value(self).ok()?;
        let val = Self::get_json_value_by_path(&json, key)?;
        match val {
            serde_json::Value::String(s) => Some(s.clone()),
            other => Some(other.to_string()),
        }
    }

    /// Set a settings value by dot-separated key, validating the result.
    /// Persistence is the caller's concern.
    ///
    /// # Errors
    ///
    /// Returns an error if the key is unknown, the value cannot be parsed
    /// as the field's type, or the resulting settings fail validation.
    pub fn set(&mut self, key: &str, value: &str) -> Result<(), ConfigError> {
        let mut json = serde_json::to_value(&*self)
            .map_err(|e| ConfigError::ParseFailed(e.to_string()))?;
        Self::set_json_value_by_path(&mut json, key, value)?;
        let updated: TimerSettings =
            serde_json::from_value(json).map_err(|e| ConfigError::ParseFailed(e.to_string()))?;
        updated.validate().map_err(|e| ConfigError::InvalidValue {
            key: key.into(),
            message: e.to_string(),
        })?;
        *self = updated;
        Ok(())
    }

    fn get_json_value_by_path<'a>(
        root: &'a serde_json::Value,
        key: &str,
    ) -> Option<&'a serde_json::Value> {
        if key.is_empty() {
            return None;
        }

        let mut current = root;
        for part in key.split('.') {
            current = current.get(part)?;
        }
        Some(current)
    }

    fn set_json_value_by_path(
        root: &mut serde_json::Value,
        key: &str,
        value: &str,
    ) -> Result<(), ConfigError> {
        let mut parts = key.split('.').peekable();
        if parts.peek().is_none() {
            return Err(ConfigError::UnknownKey(key.into()));
        }

        let mut current = root;
        while let Some(part) = parts.next() {
            let is_leaf = parts.peek().is_none();
            if is_leaf {
                let obj = current
                    .as_object_mut()
                    .ok_or_else(|| ConfigError::UnknownKey(key.into()))?;
                let existing = obj
                    .get(part)
                    .ok_or_else(|| ConfigError::UnknownKey(key.into()))?;

                let new_value = match existing {
                    serde_json::Value::Bool(_) => serde_json::Value::Bool(
                        value.parse::<bool>().map_err(|_| {
                            ConfigError::ParseFailed(format!("cannot parse '{value}' as bool"))
                        })?,
                    ),
                    serde_json::Value::Number(_) => {
                        let n = value.parse::<u64>().map_err(|_| {
                            ConfigError::ParseFailed(format!("cannot parse '{value}' as number"))
                        })?;
                        serde_json::Value::Number(n.into())
                    }
                    _ => serde_json::Value::String(value.into()),
                };

                obj.insert(part.to_string(), new_value);
                return Ok(());
            }

            current = current
                .get_mut(part)
                .ok_or_else(|| ConfigError::UnknownKey(key.into()))?;
        }

        Err(ConfigError::UnknownKey(key.into()))
    }
}
