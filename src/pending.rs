// How long a todo has been waiting since it was last touched

use chrono::{DateTime, TimeDelta, Utc};

pub const DEFAULT_REFRESH_MINS: i64 = 10;

/// Coarsest whole unit of the time elapsed since `time_modified`
///
/// `3 Days`, `5 Hours`, `12 Mins` or `40 Secs`. A modification time in the
/// future counts as no time at all.
pub fn pending_label(time_modified: DateTime<Utc>, now: DateTime<Utc>) -> String {
    let elapsed = (now - time_modified).max(TimeDelta::zero());

    if elapsed.num_days() > 0 {
        return format!("{} Days", elapsed.num_days());
    }
    if elapsed.num_hours() > 0 {
        return format!("{} Hours", elapsed.num_hours());
    }
    if elapsed.num_minutes() > 0 {
        return format!("{} Mins", elapsed.num_minutes());
    }
    format!("{} Secs", elapsed.num_seconds())
}

/// Decides when pending labels are stale and need a redraw
///
/// Purely read-side: it never touches the todo list.
#[derive(Debug, Clone)]
pub struct RefreshTicker {
    interval: TimeDelta,
    last_tick: DateTime<Utc>,
}

impl RefreshTicker {
    pub fn new(interval: TimeDelta, started_at: DateTime<Utc>) -> Self {
        Self {
            interval,
            last_tick: started_at,
        }
    }

    pub fn every_minutes(minutes: i64, started_at: DateTime<Utc>) -> Self {
        Self::new(TimeDelta::minutes(minutes.max(1)), started_at)
    }

    pub fn interval(&self) -> TimeDelta {
        self.interval
    }

    /// True once per elapsed interval; records the tick when it fires
    pub fn poll(&mut self, now: DateTime<Utc>) -> bool {
        if now - self.last_tick < self.interval {
            return false;
        }
        self.last_tick = now;
        true
    }
}
