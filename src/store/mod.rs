//! Storage collaborators of the attendance job.
//!
//! The traits are what the job sees; `MySql*` types are the production
//! implementations over the shared pool.

pub mod attendance;
pub mod employee;

use async_trait::async_trait;
use chrono::NaiveDate;

use crate::model::attendance::{AttendanceRecord, NewAttendance};

pub use attendance::MySqlAttendanceLedger;
pub use employee::MySqlEmployeeDirectory;

/// The slice of an employee the attendance job needs.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct ShiftAssignment {
    pub employee_id: u64,
    /// Raw column value; parsed per employee so one bad row can't fail the read.
    pub role: String,
    /// 12-hour clock string as stored, e.g. `05:30 PM`
    pub shift_end: String,
}

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum InsertOutcome {
    Inserted,
    /// A record for (employee_id, date) already existed.
    AlreadyMarked,
}

#[async_trait]
pub trait EmployeeDirectory: Send + Sync {
    /// All employees whose role is not `Manager`.
    async fn tracked_employees(&self) -> Result<Vec<ShiftAssignment>, sqlx::Error>;
}

#[async_trait]
pub trait AttendanceLedger: Send + Sync {
    async fn find(
        &self,
        employee_id: u64,
        date: NaiveDate,
    ) -> Result<Option<AttendanceRecord>, sqlx::Error>;

    /// Insert a record; a unique-key conflict is reported as `AlreadyMarked`.
    async fn insert(&self, record: &NewAttendance) -> Result<InsertOutcome, sqlx::Error>;
}
