use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Snapshot of an exam module countdown, ready for a UI to render.
#[derive(Debug, Serialize, Deserialize, Clone)]
#[serde(tag = "type", rename_all = "kebab-case")]
pub enum TimerEvent {
    TimerTick(TimerTick),
    TimeExpired(TimeExpired),
}

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct TimerTick {
    pub module_name: String,
    pub remaining_seconds: u64,
    pub elapsed_seconds: u64,
    pub total_seconds: u64,
    pub timestamp: DateTime<Utc>,
}

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct TimeExpired {
    pub module_name: String,
    pub elapsed_seconds: u64,
    pub timestamp: DateTime<Utc>,
    pub message: String,
}

impl TimerEvent {
    pub fn to_json(&self) -> String {
        serde_json::to_string(self).unwrap_or_else(|_| "{}".to_string())
    }

    pub fn event_name(&self) -> &'static str {
        match self {
            TimerEvent::TimerTick(_) => "timer-tick",
            TimerEvent::TimeExpired(_) => "time-expired",
        }
    }

    pub fn is_expired(&self) -> bool {
        matches!(self, TimerEvent::TimeExpired(_))
    }

    /// `MM:SS` countdown label; expired timers read `00:00`.
    pub fn countdown_label(&self) -> String {
        let remaining = match self {
            TimerEvent::TimerTick(tick) => tick.remaining_seconds,
            TimerEvent::TimeExpired(_) => 0,
        };
        format!("{:02}:{:02}", remaining / 60, remaining % 60)
    }
}
