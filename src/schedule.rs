use crate::error::{BraviaError, Result};
use chrono::{NaiveDateTime, TimeDelta};
use serde::{Deserialize, Serialize};

const TIMESTAMP_FORMAT: &str = "%Y-%m-%dT%H:%M:%S";
const CLOCK_FORMAT: &str = "%H:%M";

/// Start and end clock times (`HH:MM`) of a program
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Schedule {
    pub start_time: String,
    pub end_time: String,
}

/// Compute the clock times of a program from its start and duration
///
/// `start` looks like `2017-03-24T23:50:00+0100`. The timezone offset is
/// dropped, not applied: the result is in the TV's wall-clock time. The end
/// time wraps past midnight.
pub fn compute_schedule(start: &str, duration_secs: i64) -> Result<Schedule> {
    let local = start
        .get(..19)
        .ok_or_else(|| BraviaError::InvalidResponse(format!("Malformed start time: {start}")))?;

    let start_time = NaiveDateTime::parse_from_str(local, TIMESTAMP_FORMAT)
        .map_err(|e| BraviaError::InvalidResponse(format!("Malformed start time {start}: {e}")))?
        .time();

    let duration = TimeDelta::try_seconds(duration_secs).ok_or_else(|| {
        BraviaError::InvalidResponse(format!("Duration out of range: {duration_secs}"))
    })?;
    let (end_time, _) = start_time.overflowing_add_signed(duration);

    Ok(Schedule {
        start_time: start_time.format(CLOCK_FORMAT).to_string(),
        end_time: end_time.format(CLOCK_FORMAT).to_string(),
    })
}
