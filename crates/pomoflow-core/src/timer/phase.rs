use serde::{Deserialize, Serialize};

/// The unit the phase state machine cycles through.
///
/// Serialized names (`pomodoro`, `shortBreak`, `longBreak`) are the keys
/// the persisted configuration uses.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum TimerPhase {
    #[default]
    Pomodoro,
    ShortBreak,
    LongBreak,
}

impl TimerPhase {
    pub fn is_break(self) -> bool {
        matches!(self, TimerPhase::ShortBreak | TimerPhase::LongBreak)
    }

    pub fn label(self) -> &'static str {
        match self {
            TimerPhase::Pomodoro => "Pomodoro",
            TimerPhase::ShortBreak => "Short Break",
            TimerPhase::LongBreak => "Long Break",
        }
    }
}

/// Configured minutes per phase.
///
/// Always holds exactly the three phase entries; serde field defaults keep
/// partially written config files loadable.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PhaseDurations {
    #[serde(default = "default_pomodoro_min")]
    pub pomodoro: u32,
    #[serde(default = "default_short_break_min")]
    pub short_break: u32,
    #[serde(default = "default_long_break_min")]
    pub long_break: u32,
}

fn default_pomodoro_min() -> u32 {
    25
}
fn default_short_break_min() -> u32 {
    5
}
fn default_long_break_min() -> u32 {
    15
}

impl Default for PhaseDurations {
    fn default() -> Self {
        Self {
            pomodoro: default_pomodoro_min(),
            short_break: default_short_break_min(),
            long_break: default_long_break_min(),
        }
    }
}

impl PhaseDurations {
    /// Configured minutes for `phase`.
    pub fn minutes(&self, phase: TimerPhase) -> u32 {
        match phase {
            TimerPhase::Pomodoro => self.pomodoro,
            TimerPhase::ShortBreak => self.short_break,
            TimerPhase::LongBreak => self.long_break,
        }
    }

    /// Configured duration for `phase` in seconds.
    ///
    /// Uses saturating arithmetic so absurdly large configured values stay
    /// finite instead of overflowing.
    pub fn secs(&self, phase: TimerPhase) -> u64 {
        u64::from(self.minutes(phase)).saturating_mul(60)
    }
}

/// Render whole seconds as `MM:SS`. Minutes do not wrap at an hour, so a
/// 90-minute countdown renders as `90:00`.
pub fn format_clock(total_secs: u64) -> String {
    let minutes = total_secs / 60;
    let seconds = total_secs % 60;
    format!("{minutes:02}:{seconds:02}")
}

/// Display strings derived from the current phase, cycle count, and
/// remaining time. Computed on demand, never stored.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PhaseInfo {
    /// Phase label with the cycle ordinal, e.g. `Pomodoro #2`.
    pub phase_title: String,
    /// Window/page title with the formatted remaining time.
    pub page_title: String,
}

impl PhaseInfo {
    pub fn new(phase: TimerPhase, cycle_count: u32, remaining_secs: u64) -> Self {
        // Ordinal of the cycle currently underway; a fresh state shows #1.
        let ordinal = cycle_count.saturating_add(1);
        let clock = format_clock(remaining_secs);
        let activity = if phase.is_break() {
            "Time to rest!"
        } else {
            "Time to focus!"
        };
        Self {
            phase_title: format!("{} #{ordinal}", phase.label()),
            page_title: format!("{clock} - {activity}"),
        }
    }
}
