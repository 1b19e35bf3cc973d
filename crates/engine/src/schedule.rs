//! Frequency-to-recurrence translation.
//!
//! Workflow authors declare a human-level frequency (`hourly`, `daily`, …)
//! in the trigger payload; anything else is treated as an already-valid cron
//! expression and passed through verbatim. The pass-through case is not
//! validated here — an invalid literal is discovered at registration time,
//! per workflow, via [`parse_schedule`].

use std::str::FromStr;

use cron::Schedule;

use crate::EngineError;

/// Map a frequency string to a recurrence expression (six fields, seconds
/// first).
pub fn recurrence_expression(frequency: &str) -> &str {
    match frequency {
        "hourly" => "0 0 * * * *",   // top of every hour
        "daily" => "0 0 9 * * *",    // 09:00 every day
        "weekly" => "0 0 9 * * 1",   // 09:00 every Monday
        "monthly" => "0 0 9 1 * *",  // 09:00 on the 1st of the month
        other => other,
    }
}

/// Translate and parse a frequency into a [`Schedule`].
pub fn parse_schedule(frequency: &str) -> Result<Schedule, EngineError> {
    let expression = recurrence_expression(frequency);
    Schedule::from_str(expression).map_err(|source| EngineError::InvalidSchedule {
        expression: expression.to_owned(),
        source,
    })
}
