use crate::auth::auth::AuthUser;
use crate::jobs::attendance::{AttendanceJob, Clock, JobError, LocalClock, SweepReport};
use crate::model::attendance::{AttendanceRecord, AttendanceStatus, NewAttendance};
use crate::model::role::Role;
use crate::store::InsertOutcome;
use crate::store::attendance::insert_attendance;
use crate::utils::shift_time::{format_clock_time, parse_clock_time};
use actix_web::{
    HttpResponse, Responder,
    error::{ErrorBadRequest, ErrorConflict, ErrorInternalServerError, ErrorServiceUnavailable},
    web,
};
use chrono::{Duration, NaiveDate, NaiveTime};
use serde::{Deserialize, Serialize};
use serde_json::json;
use sqlx::{FromRow, MySqlPool};
use tracing::{error, info, warn};
use utoipa::ToSchema;

/// `Late` once the shift has started, `Present` before that.
pub fn check_in_status(now: NaiveTime, shift_start: NaiveTime) -> AttendanceStatus {
    if now > shift_start {
        AttendanceStatus::Late
    } else {
        AttendanceStatus::Present
    }
}

#[derive(Serialize, ToSchema)]
pub struct DayEntry {
    #[schema(example = 7)]
    pub employee_id: u64,
    #[schema(example = "John Doe")]
    pub name: String,
    pub status: AttendanceStatus,
    #[schema(example = "09:04 AM", nullable = true)]
    pub time_marked: Option<String>,
}

#[derive(Serialize, ToSchema)]
pub struct DayOverview {
    #[schema(value_type = String, format = "date")]
    pub date: NaiveDate,
    pub data: Vec<DayEntry>,
}

#[derive(FromRow)]
struct DayRow {
    employee_id: u64,
    name: String,
    status: Option<String>,
    time_marked: Option<NaiveTime>,
}

#[derive(Debug, Deserialize)]
pub struct HistoryQuery {
    pub from: Option<NaiveDate>,
    pub to: Option<NaiveDate>,
}

/// Check-in endpoint
#[utoipa::path(
    post,
    path = "/api/attendance",
    responses(
        (status = 200, description = "Checked in", body = Object, example = json!({
            "message": "Checked in successfully",
            "status": "Present",
            "time_marked": "08:57 AM"
        })),
        (status = 400, description = "Attendance already marked today", body = Object, example = json!({
            "message": "Attendance already marked today"
        })),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "No employee profile"),
        (status = 404, description = "Employee not found"),
        (status = 500, description = "Internal server error")
    ),
    security(
        ("bearer_auth" = [])
    ),
    tag = "Attendance"
)]
pub async fn check_in(
    auth: AuthUser,
    pool: web::Data<MySqlPool>,
) -> actix_web::Result<impl Responder> {
    let employee_id = auth.require_employee_id()?;

    let shift_start = sqlx::query_scalar::<_, String>(
        "SELECT shift_start FROM employees WHERE id = ?",
    )
    .bind(employee_id)
    .fetch_optional(pool.get_ref())
    .await
    .map_err(|e| {
        error!(error = %e, employee_id, "Failed to fetch shift start");
        ErrorInternalServerError("Internal Server Error")
    })?;

    let Some(shift_start) = shift_start else {
        return Ok(HttpResponse::NotFound().json(json!({
            "message": "Employee not found"
        })));
    };

    let shift_start = parse_clock_time(&shift_start).map_err(|e| {
        error!(error = %e, employee_id, "Employee shift is misconfigured");
        ErrorInternalServerError("Employee shift is misconfigured")
    })?;

    let now = LocalClock.now();
    let record = NewAttendance {
        employee_id,
        date: now.date(),
        status: check_in_status(now.time(), shift_start),
        time_marked: now.time(),
    };

    match insert_attendance(pool.get_ref(), &record).await {
        Ok(InsertOutcome::Inserted) => Ok(HttpResponse::Ok().json(json!({
            "message": "Checked in successfully",
            "status": record.status,
            "time_marked": format_clock_time(record.time_marked)
        }))),
        Ok(InsertOutcome::AlreadyMarked) => Ok(HttpResponse::BadRequest().json(json!({
            "message": "Attendance already marked today"
        }))),
        Err(e) => {
            error!(error = %e, employee_id, "Check-in failed");
            Err(ErrorInternalServerError("Internal Server Error"))
        }
    }
}

/// Today's attendance for every tracked employee
///
/// Employees without a record yet are reported as `Pending`; that status is
/// never stored.
#[utoipa::path(
    get,
    path = "/api/attendance/today",
    responses(
        (status = 200, description = "Attendance overview for today", body = DayOverview),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Forbidden"),
        (status = 500, description = "Internal server error")
    ),
    security(
        ("bearer_auth" = [])
    ),
    tag = "Attendance"
)]
pub async fn today_overview(
    auth: AuthUser,
    pool: web::Data<MySqlPool>,
) -> actix_web::Result<impl Responder> {
    auth.require_lead_or_above()?;

    let today = LocalClock.now().date();

    let rows = sqlx::query_as::<_, DayRow>(
        r#"
        SELECT
            e.id AS employee_id,
            CONCAT(e.first_name, ' ', e.last_name) AS name,
            a.status,
            a.time_marked
        FROM employees e
        LEFT JOIN attendance a ON a.employee_id = e.id AND a.date = ?
        WHERE e.role <> ?
        ORDER BY e.id
        "#,
    )
    .bind(today)
    .bind(Role::Manager.as_ref())
    .fetch_all(pool.get_ref())
    .await
    .map_err(|e| {
        error!(error = %e, "Failed to load attendance overview");
        ErrorInternalServerError("Database error")
    })?;

    let data = rows.into_iter().filter_map(day_entry).collect();

    Ok(HttpResponse::Ok().json(DayOverview { date: today, data }))
}

/// `None` (logged) for a stored status this build doesn't know.
fn day_entry(row: DayRow) -> Option<DayEntry> {
    let status = match row.status {
        Some(s) => match s.parse::<AttendanceStatus>() {
            Ok(status) => status,
            Err(e) => {
                warn!(
                    error = %e,
                    employee_id = row.employee_id,
                    status = %s,
                    "Unknown attendance status"
                );
                return None;
            }
        },
        None => AttendanceStatus::Pending,
    };

    Some(DayEntry {
        employee_id: row.employee_id,
        name: row.name,
        status,
        time_marked: row.time_marked.map(format_clock_time),
    })
}

/// Caller's own attendance history
#[utoipa::path(
    get,
    path = "/api/attendance/me",
    params(
        ("from", Query, description = "First day (inclusive, YYYY-MM-DD), defaults to 30 days ago"),
        ("to", Query, description = "Last day (inclusive, YYYY-MM-DD), defaults to today")
    ),
    responses(
        (status = 200, description = "Attendance records, newest first", body = [AttendanceRecord]),
        (status = 400, description = "Invalid date range"),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "No employee profile"),
        (status = 500, description = "Internal server error")
    ),
    security(
        ("bearer_auth" = [])
    ),
    tag = "Attendance"
)]
pub async fn my_attendance(
    auth: AuthUser,
    pool: web::Data<MySqlPool>,
    query: web::Query<HistoryQuery>,
) -> actix_web::Result<impl Responder> {
    let employee_id = auth.require_employee_id()?;

    let to = query.to.unwrap_or_else(|| LocalClock.now().date());
    let from = query.from.unwrap_or(to - Duration::days(30));
    if from > to {
        return Err(ErrorBadRequest("'from' must not be after 'to'"));
    }

    let records = sqlx::query_as::<_, AttendanceRecord>(
        r#"
        SELECT id, employee_id, date, status, time_marked
        FROM attendance
        WHERE employee_id = ? AND date BETWEEN ? AND ?
        ORDER BY date DESC
        "#,
    )
    .bind(employee_id)
    .bind(from)
    .bind(to)
    .fetch_all(pool.get_ref())
    .await
    .map_err(|e| {
        error!(error = %e, employee_id, "Failed to fetch attendance history");
        ErrorInternalServerError("Database error")
    })?;

    Ok(HttpResponse::Ok().json(records))
}

/// Run the absence sweep now
#[utoipa::path(
    post,
    path = "/api/attendance/sweep",
    responses(
        (status = 200, description = "Sweep finished", body = SweepReport),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Admin only"),
        (status = 409, description = "A sweep is already running"),
        (status = 503, description = "Employee directory unavailable")
    ),
    security(
        ("bearer_auth" = [])
    ),
    tag = "Attendance"
)]
pub async fn run_sweep(
    auth: AuthUser,
    job: web::Data<AttendanceJob>,
) -> actix_web::Result<impl Responder> {
    auth.require_admin()?;

    info!(subject = %auth.subject, "Manual attendance sweep requested");

    match job.sweep().await {
        Ok(report) => Ok(HttpResponse::Ok().json(report)),
        Err(e) => Err(sweep_failure(e)),
    }
}

fn sweep_failure(e: JobError) -> actix_web::Error {
    match e {
        JobError::AlreadyRunning => {
            info!("Manual attendance sweep refused, one is already running");
            ErrorConflict("An attendance sweep is already running")
        }
        e @ JobError::Directory(_) => {
            error!(error = %e, "Manual attendance sweep failed");
            ErrorServiceUnavailable("Employee directory unavailable")
        }
        e => {
            error!(error = %e, "Manual attendance sweep failed");
            ErrorInternalServerError("Internal Server Error")
        }
    }
}
