use std::fmt;
use serde::{Serialize, Deserialize};
use time::{Duration, OffsetDateTime};

/// Phase of an election, always derived from its schedule and the current
/// instant. Never persisted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum ElectionStatus {
    Upcoming,
    Active,
    Ended,
}

impl ElectionStatus {
    /// Both `starts_at` and `ends_at` belong to the active window.
    pub fn evaluate(starts_at: OffsetDateTime, ends_at: OffsetDateTime, now: OffsetDateTime) -> Self {
        if now < starts_at {
            ElectionStatus::Upcoming
        } else if now > ends_at {
            ElectionStatus::Ended
        } else {
            ElectionStatus::Active
        }
    }

    pub fn is_active(self) -> bool {
        self == ElectionStatus::Active
    }

    pub fn is_ended(self) -> bool {
        self == ElectionStatus::Ended
    }
}

impl fmt::Display for ElectionStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            ElectionStatus::Upcoming => "Upcoming",
            ElectionStatus::Active => "Active",
            ElectionStatus::Ended => "Ended",
        };
        f.write_str(label)
    }
}

/// Time left until the next phase boundary, split for display.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Countdown {
    pub total_seconds: i64,
    pub days: i64,
    pub hours: i64,
    pub minutes: i64,
    pub seconds: i64,
}

impl Countdown {
    /// Returns `None` once `target` has passed. Partial seconds are dropped.
    pub fn until(target: OffsetDateTime, now: OffsetDateTime) -> Option<Self> {
        let remaining: Duration = target - now;
        if remaining.is_negative() {
            return None;
        }
        let total_seconds = remaining.whole_seconds();
        Some(Self {
            total_seconds,
            days: total_seconds / 86_400,
            hours: (total_seconds % 86_400) / 3_600,
            minutes: (total_seconds % 3_600) / 60,
            seconds: total_seconds % 60,
        })
    }
}
