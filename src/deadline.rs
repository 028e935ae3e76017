use chrono::{Duration, NaiveDateTime};

/// Deadline settings for the RSVP window. All checks take `now` explicitly
/// so callers (and tests) control the clock; when no config is present the
/// form accepts submissions unconditionally.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DeadlineConfig {
    /// Absolute cutoff instant.
    pub cutoff: NaiveDateTime,
    /// Window after the cutoff during which submissions are still accepted.
    pub grace: Duration,
    /// Window before the cutoff during which a countdown is shown.
    pub warning: Duration,
}

impl DeadlineConfig {
    pub fn is_past_deadline(&self, now: NaiveDateTime) -> bool {
        now > self.cutoff
    }

    pub fn is_within_grace_period(&self, now: NaiveDateTime) -> bool {
        now > self.cutoff && now <= self.cutoff + self.grace
    }

    /// Only meaningful before the cutoff; false once the deadline has passed.
    pub fn is_within_warning_period(&self, now: NaiveDateTime) -> bool {
        now < self.cutoff && now >= self.cutoff - self.warning
    }

    /// Remaining time until the cutoff. Negative once the deadline is past.
    pub fn time_until_deadline(&self, now: NaiveDateTime) -> Duration {
        self.cutoff - now
    }

    /// Instant at which the grace period ends.
    pub fn grace_ends_at(&self) -> NaiveDateTime {
        self.cutoff + self.grace
    }
}

/// Renders a duration as a short human string, e.g. "2 days, 3 hours" or
/// "45 minutes". Zero and negative durations render as "0 minutes".
pub fn format_time_remaining(remaining: Duration) -> String {
    let total_minutes = remaining.num_minutes();
    if total_minutes <= 0 {
        return "0 minutes".to_string();
    }

    let days = remaining.num_days();
    let hours = remaining.num_hours() - days * 24;
    let minutes = total_minutes - remaining.num_hours() * 60;

    if days > 0 {
        if hours > 0 {
            format!("{}, {}", count(days, "day"), count(hours, "hour"))
        } else {
            count(days, "day")
        }
    } else if hours > 0 {
        if minutes > 0 {
            format!("{}, {}", count(hours, "hour"), count(minutes, "minute"))
        } else {
            count(hours, "hour")
        }
    } else {
        count(minutes, "minute")
    }
}

fn count(n: i64, unit: &str) -> String {
    if n == 1 {
        format!("1 {unit}")
    } else {
        format!("{n} {unit}s")
    }
}
