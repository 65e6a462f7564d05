use async_trait::async_trait;
use chrono::NaiveDate;
use sqlx::MySqlPool;

use super::{AttendanceLedger, InsertOutcome};
use crate::model::attendance::{AttendanceRecord, NewAttendance};
use crate::utils::db_utils::is_unique_violation;

/// Insert one attendance row. Shared by the check-in handler and the job.
pub async fn insert_attendance(
    pool: &MySqlPool,
    record: &NewAttendance,
) -> Result<InsertOutcome, sqlx::Error> {
    let result = sqlx::query(
        r#"
        INSERT INTO attendance (employee_id, date, status, time_marked)
        VALUES (?, ?, ?, ?)
        "#,
    )
    .bind(record.employee_id)
    .bind(record.date)
    .bind(record.status.as_ref())
    .bind(record.time_marked)
    .execute(pool)
    .await;

    match result {
        Ok(_) => Ok(InsertOutcome::Inserted),
        Err(e) if is_unique_violation(&e) => Ok(InsertOutcome::AlreadyMarked),
        Err(e) => Err(e),
    }
}

#[derive(Clone)]
pub struct MySqlAttendanceLedger {
    pool: MySqlPool,
}

impl MySqlAttendanceLedger {
    pub fn new(pool: MySqlPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl AttendanceLedger for MySqlAttendanceLedger {
    async fn find(
        &self,
        employee_id: u64,
        date: NaiveDate,
    ) -> Result<Option<AttendanceRecord>, sqlx::Error> {
        sqlx::query_as::<_, AttendanceRecord>(
            r#"
            SELECT id, employee_id, date, status, time_marked
            FROM attendance
            WHERE employee_id = ? AND date = ?
            "#,
        )
        .bind(employee_id)
        .bind(date)
        .fetch_optional(&self.pool)
        .await
    }

    async fn insert(&self, record: &NewAttendance) -> Result<InsertOutcome, sqlx::Error> {
        insert_attendance(&self.pool, record).await
    }
}
