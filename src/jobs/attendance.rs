//! Attendance auto-marking.
//!
//! On every tick the job walks all tracked (non-manager) employees and writes
//! an `Absent` record for anyone whose shift end has passed today without a
//! record. Existing records are never touched. The `(employee_id, date)`
//! unique key makes concurrent writers safe: the losing insert comes back as
//! [`InsertOutcome::AlreadyMarked`] and is counted as already recorded.

use std::sync::Arc;
use std::time::Duration;

use chrono::{Local, NaiveDate, NaiveDateTime};
use futures::StreamExt;
use serde::Serialize;
use thiserror::Error;
use tokio::sync::{Mutex, watch};
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;
use tracing::{debug, error, info, warn};
use utoipa::ToSchema;

use crate::config::Config;
use crate::model::attendance::{AttendanceStatus, NewAttendance};
use crate::model::role::Role;
use crate::store::{AttendanceLedger, EmployeeDirectory, InsertOutcome, ShiftAssignment};
use crate::utils::shift_time::{InvalidShiftTime, parse_clock_time};

/// Source of "now" in deployment-local time.
pub trait Clock: Send + Sync {
    fn now(&self) -> NaiveDateTime;
}

#[derive(Debug, Default, Clone, Copy)]
pub struct LocalClock;

impl Clock for LocalClock {
    fn now(&self) -> NaiveDateTime {
        Local::now().naive_local()
    }
}

#[derive(Debug, Clone)]
pub struct JobSettings {
    pub interval: Duration,
    /// Upper bound on one employee's lookup + insert.
    pub employee_timeout: Duration,
    /// Employees evaluated in parallel within one sweep.
    pub concurrency: usize,
}

impl JobSettings {
    pub fn from_config(config: &Config) -> Self {
        Self {
            interval: config.attendance_interval,
            employee_timeout: config.attendance_employee_timeout,
            concurrency: config.attendance_concurrency,
        }
    }
}

impl Default for JobSettings {
    fn default() -> Self {
        Self {
            interval: Duration::from_secs(120),
            employee_timeout: Duration::from_secs(10),
            concurrency: 8,
        }
    }
}

#[derive(Debug, Error)]
pub enum JobError {
    /// Aborts the whole tick.
    #[error("employee directory unavailable: {0}")]
    Directory(#[source] sqlx::Error),

    #[error("attendance ledger error: {0}")]
    Ledger(#[from] sqlx::Error),

    #[error(transparent)]
    MalformedShift(#[from] InvalidShiftTime),

    #[error("evaluation timed out after {0:?}")]
    Timeout(Duration),

    #[error("unknown role {0:?}")]
    UnknownRole(String),

    /// Another sweep holds the lock; nothing was evaluated.
    #[error("an attendance sweep is already running")]
    AlreadyRunning,
}

/// What a sweep did for a single employee.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum EmployeeOutcome {
    AlreadyRecorded,
    WithinShift,
    MarkedAbsent,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, ToSchema)]
#[schema(example = json!({
    "date": "2026-01-05",
    "evaluated": 12,
    "marked_absent": 3,
    "already_recorded": 8,
    "within_shift": 0,
    "skipped": 1,
    "failed": 1
}))]
pub struct SweepReport {
    #[schema(value_type = String, format = "date")]
    pub date: NaiveDate,
    pub evaluated: usize,
    pub marked_absent: usize,
    pub already_recorded: usize,
    pub within_shift: usize,
    /// Untracked roles returned by the directory.
    pub skipped: usize,
    /// Includes rows whose role could not be parsed.
    pub failed: usize,
}

impl SweepReport {
    fn new(date: NaiveDate) -> Self {
        Self {
            date,
            evaluated: 0,
            marked_absent: 0,
            already_recorded: 0,
            within_shift: 0,
            skipped: 0,
            failed: 0,
        }
    }

    fn record(&mut self, outcome: EmployeeOutcome) {
        match outcome {
            EmployeeOutcome::AlreadyRecorded => self.already_recorded += 1,
            EmployeeOutcome::WithinShift => self.within_shift += 1,
            EmployeeOutcome::MarkedAbsent => self.marked_absent += 1,
        }
    }
}

pub struct AttendanceJob {
    directory: Arc<dyn EmployeeDirectory>,
    ledger: Arc<dyn AttendanceLedger>,
    clock: Arc<dyn Clock>,
    settings: JobSettings,
    running: Mutex<()>,
}

impl AttendanceJob {
    pub fn new(
        directory: Arc<dyn EmployeeDirectory>,
        ledger: Arc<dyn AttendanceLedger>,
        clock: Arc<dyn Clock>,
        settings: JobSettings,
    ) -> Self {
        Self {
            directory,
            ledger,
            clock,
            settings,
            running: Mutex::new(()),
        }
    }

    /// Run one pass over every tracked employee.
    ///
    /// Only a directory failure fails the sweep; per-employee errors are
    /// logged and counted in [`SweepReport::failed`]. At most one sweep runs
    /// at a time per job; a second caller gets [`JobError::AlreadyRunning`].
    pub async fn sweep(&self) -> Result<SweepReport, JobError> {
        let _running = self
            .running
            .try_lock()
            .map_err(|_| JobError::AlreadyRunning)?;

        let now = self.clock.now();
        let mut report = SweepReport::new(now.date());

        let employees = self
            .directory
            .tracked_employees()
            .await
            .map_err(JobError::Directory)?;

        let mut tracked = Vec::with_capacity(employees.len());
        for employee in employees {
            match employee.role.parse::<Role>() {
                Ok(role) if role.is_attendance_tracked() => tracked.push(employee),
                Ok(_) => report.skipped += 1,
                Err(_) => {
                    let e = JobError::UnknownRole(employee.role);
                    warn!(
                        error = %e,
                        employee_id = employee.employee_id,
                        "Attendance evaluation failed"
                    );
                    report.failed += 1;
                }
            }
        }
        report.evaluated = tracked.len();

        let per_employee = self.settings.employee_timeout;
        let results: Vec<(u64, Result<EmployeeOutcome, JobError>)> =
            futures::stream::iter(tracked)
                .map(|employee| async move {
                    let result =
                        match tokio::time::timeout(per_employee, self.evaluate(&employee, now))
                            .await
                        {
                            Ok(result) => result,
                            Err(_) => Err(JobError::Timeout(per_employee)),
                        };
                    (employee.employee_id, result)
                })
                .buffer_unordered(self.settings.concurrency.max(1))
                .collect()
                .await;

        for (employee_id, result) in results {
            match result {
                Ok(outcome) => report.record(outcome),
                Err(e) => {
                    warn!(error = %e, employee_id, "Attendance evaluation failed");
                    report.failed += 1;
                }
            }
        }

        info!(
            date = %report.date,
            evaluated = report.evaluated,
            marked_absent = report.marked_absent,
            already_recorded = report.already_recorded,
            within_shift = report.within_shift,
            skipped = report.skipped,
            failed = report.failed,
            "Attendance sweep completed"
        );

        Ok(report)
    }

    async fn evaluate(
        &self,
        employee: &ShiftAssignment,
        now: NaiveDateTime,
    ) -> Result<EmployeeOutcome, JobError> {
        let today = now.date();

        if self
            .ledger
            .find(employee.employee_id, today)
            .await?
            .is_some()
        {
            return Ok(EmployeeOutcome::AlreadyRecorded);
        }

        let shift_end = parse_clock_time(&employee.shift_end)?;
        if now.time() <= shift_end {
            return Ok(EmployeeOutcome::WithinShift);
        }

        let record = NewAttendance {
            employee_id: employee.employee_id,
            date: today,
            status: AttendanceStatus::Absent,
            time_marked: now.time(),
        };

        match self.ledger.insert(&record).await? {
            InsertOutcome::Inserted => {
                debug!(employee_id = employee.employee_id, date = %today, "Marked absent");
                Ok(EmployeeOutcome::MarkedAbsent)
            }
            InsertOutcome::AlreadyMarked => {
                debug!(
                    employee_id = employee.employee_id,
                    date = %today,
                    "Record appeared before absence insert"
                );
                Ok(EmployeeOutcome::AlreadyRecorded)
            }
        }
    }

    /// Start ticking on the tokio runtime. The first sweep runs immediately.
    ///
    /// Sweeps run inline in the ticker loop, so ticks never overlap; ticks
    /// missed while a sweep is running are skipped, and a tick that finds a
    /// manual sweep in progress does nothing.
    pub fn spawn(self: Arc<Self>) -> JobHandle {
        let (shutdown_tx, mut shutdown_rx) = watch::channel(false);

        let task = tokio::spawn(async move {
            let mut ticker = tokio::time::interval(self.settings.interval);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);

            info!(
                interval_secs = self.settings.interval.as_secs(),
                concurrency = self.settings.concurrency,
                "Attendance job started"
            );

            loop {
                tokio::select! {
                    biased;
                    // also fires if the handle is dropped
                    _ = shutdown_rx.changed() => break,
                    _ = ticker.tick() => match self.sweep().await {
                        Ok(_) => {}
                        Err(JobError::AlreadyRunning) => {
                            info!("Tick skipped, a manual sweep is running");
                        }
                        Err(e) => error!(error = %e, "Attendance sweep abandoned"),
                    },
                }
            }

            info!("Attendance job stopped");
        });

        JobHandle { shutdown_tx, task }
    }
}

/// Owner of a running [`AttendanceJob`]. Dropping it stops the job after the
/// current sweep.
pub struct JobHandle {
    shutdown_tx: watch::Sender<bool>,
    task: JoinHandle<()>,
}

impl JobHandle {
    /// Stop scheduling new sweeps and wait for the in-flight one to finish.
    pub async fn shutdown(self) {
        let _ = self.shutdown_tx.send(true);
        if let Err(e) = self.task.await {
            error!(error = %e, "Attendance job task failed");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::attendance::AttendanceRecord;
    use async_trait::async_trait;
    use chrono::NaiveTime;
    use std::collections::HashMap;
    use std::sync::Mutex;
    use std::sync::atomic::{AtomicUsize, Ordering};

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2026, 3, 2).unwrap()
    }

    fn at(h: u32, m: u32) -> NaiveDateTime {
        today().and_time(NaiveTime::from_hms_opt(h, m, 0).unwrap())
    }

    fn assignment(employee_id: u64, role: Role, shift_end: &str) -> ShiftAssignment {
        ShiftAssignment {
            employee_id,
            role: role.to_string(),
            shift_end: shift_end.to_string(),
        }
    }

    struct FixedClock(Mutex<NaiveDateTime>);

    impl FixedClock {
        fn new(now: NaiveDateTime) -> Arc<Self> {
            Arc::new(Self(Mutex::new(now)))
        }

        fn set(&self, now: NaiveDateTime) {
            *self.0.lock().unwrap() = now;
        }
    }

    impl Clock for FixedClock {
        fn now(&self) -> NaiveDateTime {
            *self.0.lock().unwrap()
        }
    }

    /// Returns every employee it holds, managers included.
    #[derive(Default)]
    struct StaticDirectory {
        employees: Vec<ShiftAssignment>,
        calls: AtomicUsize,
        fail: bool,
    }

    impl StaticDirectory {
        fn new(employees: Vec<ShiftAssignment>) -> Arc<Self> {
            Arc::new(Self {
                employees,
                ..Default::default()
            })
        }
    }

    #[async_trait]
    impl EmployeeDirectory for StaticDirectory {
        async fn tracked_employees(&self) -> Result<Vec<ShiftAssignment>, sqlx::Error> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            if self.fail {
                return Err(sqlx::Error::PoolTimedOut);
            }
            Ok(self.employees.clone())
        }
    }

    /// Ledger with the same (employee_id, date) uniqueness as the table.
    #[derive(Default)]
    struct MemoryLedger {
        records: Mutex<HashMap<(u64, NaiveDate), AttendanceRecord>>,
        inserts: AtomicUsize,
    }

    impl MemoryLedger {
        fn seed(&self, employee_id: u64, date: NaiveDate, status: AttendanceStatus) {
            let mut records = self.records.lock().unwrap();
            let id = records.len() as u64 + 1;
            records.insert(
                (employee_id, date),
                AttendanceRecord {
                    id,
                    employee_id,
                    date,
                    status,
                    time_marked: NaiveTime::from_hms_opt(9, 0, 0).unwrap(),
                },
            );
        }

        fn status_of(&self, employee_id: u64, date: NaiveDate) -> Option<AttendanceStatus> {
            self.records
                .lock()
                .unwrap()
                .get(&(employee_id, date))
                .map(|r| r.status)
        }

        fn len(&self) -> usize {
            self.records.lock().unwrap().len()
        }
    }

    #[async_trait]
    impl AttendanceLedger for MemoryLedger {
        async fn find(
            &self,
            employee_id: u64,
            date: NaiveDate,
        ) -> Result<Option<AttendanceRecord>, sqlx::Error> {
            Ok(self.records.lock().unwrap().get(&(employee_id, date)).cloned())
        }

        async fn insert(&self, record: &NewAttendance) -> Result<InsertOutcome, sqlx::Error> {
            self.inserts.fetch_add(1, Ordering::SeqCst);
            let mut records = self.records.lock().unwrap();
            let key = (record.employee_id, record.date);
            if records.contains_key(&key) {
                return Ok(InsertOutcome::AlreadyMarked);
            }
            let id = records.len() as u64 + 1;
            records.insert(
                key,
                AttendanceRecord {
                    id,
                    employee_id: record.employee_id,
                    date: record.date,
                    status: record.status,
                    time_marked: record.time_marked,
                },
            );
            Ok(InsertOutcome::Inserted)
        }
    }

    /// Never sees an existing record, so every insert races the unique key.
    struct BlindLedger(Arc<MemoryLedger>);

    #[async_trait]
    impl AttendanceLedger for BlindLedger {
        async fn find(
            &self,
            _employee_id: u64,
            _date: NaiveDate,
        ) -> Result<Option<AttendanceRecord>, sqlx::Error> {
            Ok(None)
        }

        async fn insert(&self, record: &NewAttendance) -> Result<InsertOutcome, sqlx::Error> {
            self.0.insert(record).await
        }
    }

    /// Hangs on lookups for one employee.
    struct StallingLedger {
        inner: Arc<MemoryLedger>,
        stalled: u64,
    }

    #[async_trait]
    impl AttendanceLedger for StallingLedger {
        async fn find(
            &self,
            employee_id: u64,
            date: NaiveDate,
        ) -> Result<Option<AttendanceRecord>, sqlx::Error> {
            if employee_id == self.stalled {
                tokio::time::sleep(Duration::from_secs(3600)).await;
            }
            self.inner.find(employee_id, date).await
        }

        async fn insert(&self, record: &NewAttendance) -> Result<InsertOutcome, sqlx::Error> {
            self.inner.insert(record).await
        }
    }

    /// Every lookup takes `delay`; tracks how many lookups overlap.
    struct SlowLedger {
        inner: Arc<MemoryLedger>,
        delay: Duration,
        active: AtomicUsize,
        max_active: AtomicUsize,
    }

    impl SlowLedger {
        fn new(inner: Arc<MemoryLedger>, delay: Duration) -> Arc<Self> {
            Arc::new(Self {
                inner,
                delay,
                active: AtomicUsize::new(0),
                max_active: AtomicUsize::new(0),
            })
        }
    }

    #[async_trait]
    impl AttendanceLedger for SlowLedger {
        async fn find(
            &self,
            employee_id: u64,
            date: NaiveDate,
        ) -> Result<Option<AttendanceRecord>, sqlx::Error> {
            let active = self.active.fetch_add(1, Ordering::SeqCst) + 1;
            self.max_active.fetch_max(active, Ordering::SeqCst);
            tokio::time::sleep(self.delay).await;
            self.active.fetch_sub(1, Ordering::SeqCst);
            self.inner.find(employee_id, date).await
        }

        async fn insert(&self, record: &NewAttendance) -> Result<InsertOutcome, sqlx::Error> {
            self.inner.insert(record).await
        }
    }

    fn job(
        directory: Arc<dyn EmployeeDirectory>,
        ledger: Arc<dyn AttendanceLedger>,
        clock: Arc<dyn Clock>,
    ) -> AttendanceJob {
        AttendanceJob::new(directory, ledger, clock, JobSettings::default())
    }

    #[tokio::test]
    async fn marks_absent_once_shift_end_has_passed() {
        let directory = StaticDirectory::new(vec![assignment(1, Role::Employee, "05:00 PM")]);
        let ledger = Arc::new(MemoryLedger::default());
        let job = job(directory, ledger.clone(), FixedClock::new(at(17, 1)));

        let report = job.sweep().await.unwrap();

        assert_eq!(report.marked_absent, 1);
        assert_eq!(ledger.status_of(1, today()), Some(AttendanceStatus::Absent));
        let record = ledger.find(1, today()).await.unwrap().unwrap();
        assert_eq!(record.time_marked, NaiveTime::from_hms_opt(17, 1, 0).unwrap());
    }

    #[tokio::test]
    async fn leaves_employees_inside_their_shift_alone() {
        let directory = StaticDirectory::new(vec![assignment(2, Role::Employee, "06:00 PM")]);
        let ledger = Arc::new(MemoryLedger::default());
        let job = job(directory, ledger.clone(), FixedClock::new(at(15, 0)));

        let report = job.sweep().await.unwrap();

        assert_eq!(report.within_shift, 1);
        assert_eq!(ledger.len(), 0);
    }

    #[tokio::test]
    async fn exactly_at_shift_end_is_not_yet_absent() {
        let directory = StaticDirectory::new(vec![assignment(2, Role::Employee, "06:00 PM")]);
        let ledger = Arc::new(MemoryLedger::default());
        let job = job(directory, ledger.clone(), FixedClock::new(at(18, 0)));

        job.sweep().await.unwrap();

        assert_eq!(ledger.len(), 0);
    }

    #[tokio::test]
    async fn existing_record_is_never_overwritten() {
        let directory = StaticDirectory::new(vec![assignment(3, Role::Employee, "05:00 PM")]);
        let ledger = Arc::new(MemoryLedger::default());
        ledger.seed(3, today(), AttendanceStatus::Present);
        let job = job(directory, ledger.clone(), FixedClock::new(at(20, 0)));

        let report = job.sweep().await.unwrap();

        assert_eq!(report.already_recorded, 1);
        assert_eq!(ledger.inserts.load(Ordering::SeqCst), 0);
        assert_eq!(ledger.status_of(3, today()), Some(AttendanceStatus::Present));
    }

    #[tokio::test]
    async fn managers_are_never_marked() {
        let directory = StaticDirectory::new(vec![
            assignment(4, Role::Manager, "08:00 AM"),
            assignment(5, Role::TeamLead, "08:00 AM"),
        ]);
        let ledger = Arc::new(MemoryLedger::default());
        let job = job(directory, ledger.clone(), FixedClock::new(at(23, 0)));

        let report = job.sweep().await.unwrap();

        assert_eq!(report.skipped, 1);
        assert_eq!(report.marked_absent, 1);
        assert_eq!(ledger.status_of(4, today()), None);
        assert_eq!(ledger.status_of(5, today()), Some(AttendanceStatus::Absent));
    }

    #[tokio::test]
    async fn repeated_ticks_write_at_most_one_record_per_day() {
        let directory = StaticDirectory::new(vec![
            assignment(1, Role::Employee, "05:00 PM"),
            assignment(2, Role::Employee, "06:00 PM"),
        ]);
        let ledger = Arc::new(MemoryLedger::default());
        let clock = FixedClock::new(at(17, 30));
        let job = job(directory, ledger.clone(), clock.clone());

        job.sweep().await.unwrap();
        clock.set(at(18, 30));
        job.sweep().await.unwrap();
        let last = job.sweep().await.unwrap();

        assert_eq!(ledger.len(), 2);
        assert_eq!(ledger.inserts.load(Ordering::SeqCst), 2);
        assert_eq!(last.already_recorded, 2);
        assert_eq!(last.marked_absent, 0);
    }

    #[tokio::test]
    async fn a_new_day_gets_its_own_record() {
        let directory = StaticDirectory::new(vec![assignment(1, Role::Employee, "05:00 PM")]);
        let ledger = Arc::new(MemoryLedger::default());
        let clock = FixedClock::new(at(17, 30));
        let job = job(directory, ledger.clone(), clock.clone());

        job.sweep().await.unwrap();
        let tomorrow = today().succ_opt().unwrap();
        clock.set(tomorrow.and_time(NaiveTime::from_hms_opt(17, 30, 0).unwrap()));
        job.sweep().await.unwrap();

        assert_eq!(ledger.status_of(1, today()), Some(AttendanceStatus::Absent));
        assert_eq!(ledger.status_of(1, tomorrow), Some(AttendanceStatus::Absent));
    }

    #[tokio::test]
    async fn malformed_shift_does_not_stop_the_sweep() {
        let directory = StaticDirectory::new(vec![
            assignment(1, Role::Employee, "17:00"),
            assignment(2, Role::Employee, "05:00 PM"),
        ]);
        let ledger = Arc::new(MemoryLedger::default());
        let job = job(directory, ledger.clone(), FixedClock::new(at(19, 0)));

        let report = job.sweep().await.unwrap();

        assert_eq!(report.failed, 1);
        assert_eq!(report.marked_absent, 1);
        assert_eq!(ledger.status_of(1, today()), None);
        assert_eq!(ledger.status_of(2, today()), Some(AttendanceStatus::Absent));
    }

    #[tokio::test]
    async fn losing_the_insert_race_counts_as_already_recorded() {
        let directory = StaticDirectory::new(vec![assignment(6, Role::Employee, "05:00 PM")]);
        let inner = Arc::new(MemoryLedger::default());
        inner.seed(6, today(), AttendanceStatus::Late);
        let ledger = Arc::new(BlindLedger(inner.clone()));
        let job = job(directory, ledger, FixedClock::new(at(18, 0)));

        let report = job.sweep().await.unwrap();

        assert_eq!(report.failed, 0);
        assert_eq!(report.already_recorded, 1);
        assert_eq!(inner.status_of(6, today()), Some(AttendanceStatus::Late));
    }

    #[tokio::test]
    async fn directory_failure_abandons_the_tick() {
        let directory = Arc::new(StaticDirectory {
            fail: true,
            ..Default::default()
        });
        let ledger = Arc::new(MemoryLedger::default());
        let job = job(directory, ledger.clone(), FixedClock::new(at(18, 0)));

        let err = job.sweep().await.unwrap_err();

        assert!(matches!(err, JobError::Directory(_)));
        assert_eq!(ledger.len(), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn stalled_lookup_times_out_without_blocking_others() {
        let directory = StaticDirectory::new(vec![
            assignment(1, Role::Employee, "05:00 PM"),
            assignment(2, Role::Employee, "05:00 PM"),
        ]);
        let inner = Arc::new(MemoryLedger::default());
        let ledger = Arc::new(StallingLedger {
            inner: inner.clone(),
            stalled: 1,
        });
        let settings = JobSettings {
            employee_timeout: Duration::from_secs(5),
            ..JobSettings::default()
        };
        let job = AttendanceJob::new(directory, ledger, FixedClock::new(at(18, 0)), settings);

        let report = job.sweep().await.unwrap();

        assert_eq!(report.failed, 1);
        assert_eq!(report.marked_absent, 1);
        assert_eq!(inner.status_of(2, today()), Some(AttendanceStatus::Absent));
    }

    #[tokio::test(start_paused = true)]
    async fn spawned_job_ticks_until_shut_down() {
        let directory = StaticDirectory::new(vec![assignment(1, Role::Employee, "05:00 PM")]);
        let ledger = Arc::new(MemoryLedger::default());
        let settings = JobSettings {
            interval: Duration::from_secs(120),
            ..JobSettings::default()
        };
        let job = Arc::new(AttendanceJob::new(
            directory.clone(),
            ledger.clone(),
            FixedClock::new(at(18, 0)),
            settings,
        ));

        let handle = job.spawn();
        // ticks at 0s, 120s and 240s
        tokio::time::sleep(Duration::from_secs(250)).await;
        handle.shutdown().await;

        assert_eq!(directory.calls.load(Ordering::SeqCst), 3);
        assert_eq!(ledger.len(), 1);

        tokio::time::sleep(Duration::from_secs(600)).await;
        assert_eq!(directory.calls.load(Ordering::SeqCst), 3);
    }

    #[tokio::test]
    async fn unknown_role_fails_only_that_employee() {
        let directory = StaticDirectory::new(vec![
            ShiftAssignment {
                employee_id: 7,
                role: "Intern".to_string(),
                shift_end: "05:00 PM".to_string(),
            },
            assignment(8, Role::Employee, "05:00 PM"),
        ]);
        let ledger = Arc::new(MemoryLedger::default());
        let job = job(directory, ledger.clone(), FixedClock::new(at(18, 0)));

        let report = job.sweep().await.unwrap();

        assert_eq!(report.failed, 1);
        assert_eq!(report.evaluated, 1);
        assert_eq!(report.marked_absent, 1);
        assert_eq!(ledger.status_of(7, today()), None);
        assert_eq!(ledger.status_of(8, today()), Some(AttendanceStatus::Absent));
    }

    #[test]
    fn sweep_future_can_move_across_threads() {
        fn assert_send<T: Send>(_: &T) {}

        let job = job(
            StaticDirectory::new(vec![]),
            Arc::new(MemoryLedger::default()),
            FixedClock::new(at(9, 0)),
        );
        let sweep = job.sweep();
        assert_send(&sweep);
    }

    #[tokio::test(start_paused = true)]
    async fn second_sweep_is_refused_while_one_is_running() {
        let directory = StaticDirectory::new(vec![assignment(1, Role::Employee, "05:00 PM")]);
        let inner = Arc::new(MemoryLedger::default());
        let ledger = SlowLedger::new(inner.clone(), Duration::from_secs(3));
        let job = job(directory.clone(), ledger, FixedClock::new(at(18, 0)));

        let (first, second) = tokio::join!(job.sweep(), job.sweep());

        assert_eq!(first.unwrap().marked_absent, 1);
        assert!(matches!(second, Err(JobError::AlreadyRunning)));
        assert_eq!(directory.calls.load(Ordering::SeqCst), 1);

        // lock is released once the first sweep returns
        assert_eq!(job.sweep().await.unwrap().already_recorded, 1);
    }

    #[tokio::test(start_paused = true)]
    async fn shutdown_lets_the_running_sweep_finish() {
        let directory = StaticDirectory::new(vec![
            assignment(1, Role::Employee, "05:00 PM"),
            assignment(2, Role::TeamLead, "04:00 PM"),
        ]);
        let inner = Arc::new(MemoryLedger::default());
        let ledger = SlowLedger::new(inner.clone(), Duration::from_secs(30));
        let settings = JobSettings {
            employee_timeout: Duration::from_secs(60),
            ..JobSettings::default()
        };
        let job = Arc::new(AttendanceJob::new(
            directory.clone(),
            ledger.clone(),
            FixedClock::new(at(18, 0)),
            settings,
        ));

        let handle = job.spawn();
        // first sweep is now waiting on its lookups
        tokio::time::sleep(Duration::from_secs(1)).await;
        assert_eq!(ledger.active.load(Ordering::SeqCst), 2);
        assert_eq!(inner.len(), 0);

        handle.shutdown().await;

        assert_eq!(directory.calls.load(Ordering::SeqCst), 1);
        assert_eq!(inner.status_of(1, today()), Some(AttendanceStatus::Absent));
        assert_eq!(inner.status_of(2, today()), Some(AttendanceStatus::Absent));
    }

    #[tokio::test(start_paused = true)]
    async fn sweep_longer_than_interval_never_overlaps() {
        let directory = StaticDirectory::new(vec![assignment(1, Role::Employee, "05:00 PM")]);
        let inner = Arc::new(MemoryLedger::default());
        let ledger = SlowLedger::new(inner.clone(), Duration::from_secs(25));
        let settings = JobSettings {
            interval: Duration::from_secs(10),
            employee_timeout: Duration::from_secs(60),
            ..JobSettings::default()
        };
        let job = Arc::new(AttendanceJob::new(
            directory.clone(),
            ledger.clone(),
            FixedClock::new(at(18, 0)),
            settings,
        ));

        let handle = job.spawn();
        tokio::time::sleep(Duration::from_secs(100)).await;
        handle.shutdown().await;

        let sweeps = directory.calls.load(Ordering::SeqCst);
        // a 10s ticker would have fired 11 times in 100s
        assert!((2..=5).contains(&sweeps), "sweeps = {}", sweeps);
        assert_eq!(ledger.max_active.load(Ordering::SeqCst), 1);
        assert_eq!(inner.len(), 1);
        assert_eq!(inner.inserts.load(Ordering::SeqCst), 1);
    }
}
