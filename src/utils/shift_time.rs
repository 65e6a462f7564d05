use chrono::NaiveTime;
use serde::Serializer;
use thiserror::Error;

/// 12-hour clock layout used for shift times and `time_marked`, e.g. `05:30 PM`.
pub const CLOCK_FORMAT: &str = "%I:%M %p";

#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[error("malformed shift time {0:?}, expected hh:mm AM/PM")]
pub struct InvalidShiftTime(pub String);

/// Parse a shift time such as `05:30 PM` or `9:00 am`.
pub fn parse_clock_time(value: &str) -> Result<NaiveTime, InvalidShiftTime> {
    NaiveTime::parse_from_str(value.trim(), CLOCK_FORMAT)
        .map_err(|_| InvalidShiftTime(value.to_string()))
}

pub fn format_clock_time(time: NaiveTime) -> String {
    time.format(CLOCK_FORMAT).to_string()
}

/// serde helper: render a `NaiveTime` as a 12-hour clock string.
pub fn serialize_clock_time<S>(time: &NaiveTime, serializer: S) -> Result<S::Ok, S::Error>
where
    S: Serializer,
{
    serializer.serialize_str(&format_clock_time(*time))
}
