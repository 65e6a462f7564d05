use chrono::{NaiveDate, NaiveTime};
use serde::{Deserialize, Serialize};
use strum_macros::{AsRefStr, Display, EnumString};
use utoipa::ToSchema;

use crate::utils::shift_time::serialize_clock_time;

#[derive(
    Debug, Copy, Clone, Eq, PartialEq, Display, EnumString, AsRefStr, Serialize, Deserialize, ToSchema,
)]
pub enum AttendanceStatus {
    Present,
    Late,
    Absent,
    /// Computed for employees with no record yet; never stored.
    Pending,
}

impl TryFrom<String> for AttendanceStatus {
    type Error = strum::ParseError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

#[derive(Debug, Clone, Serialize, sqlx::FromRow, ToSchema)]
#[schema(
    example = json!({
        "id": 1,
        "employee_id": 7,
        "date": "2026-01-05",
        "status": "Absent",
        "time_marked": "05:02 PM"
    })
)]
pub struct AttendanceRecord {
    pub id: u64,
    pub employee_id: u64,
    #[schema(value_type = String, format = "date")]
    pub date: NaiveDate,
    #[sqlx(try_from = "String")]
    pub status: AttendanceStatus,
    #[schema(value_type = String, example = "05:02 PM")]
    #[serde(serialize_with = "serialize_clock_time")]
    pub time_marked: NaiveTime,
}

/// A row about to be written to the ledger.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewAttendance {
    pub employee_id: u64,
    pub date: NaiveDate,
    pub status: AttendanceStatus,
    pub time_marked: NaiveTime,
}
