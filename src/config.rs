use anyhow::{Context, Result, bail};
use std::env;
use std::str::FromStr;
use std::time::Duration;

#[derive(Clone, Debug)]
pub struct Config {
    pub database_url: String,
    pub jwt_secret: String,
    pub server_addr: String,
    pub api_prefix: String,
    pub log_level: tracing::Level,

    // Rate limiting
    pub rate_protected_per_min: u32,

    // Attendance auto-marking job
    pub attendance_job_enabled: bool,
    pub attendance_interval: Duration,
    pub attendance_employee_timeout: Duration,
    pub attendance_concurrency: usize,
}

/// Reads variables through `lookup` so tests don't touch the process env.
struct Vars<F> {
    lookup: F,
}

impl<F> Vars<F>
where
    F: Fn(&str) -> Option<String>,
{
    fn required(&self, key: &str) -> Result<String> {
        (self.lookup)(key).with_context(|| format!("{} must be set", key))
    }

    fn or_default<T>(&self, key: &str, default: T) -> Result<T>
    where
        T: FromStr,
        T::Err: std::error::Error + Send + Sync + 'static,
    {
        match (self.lookup)(key) {
            Some(raw) => raw
                .trim()
                .parse()
                .with_context(|| format!("{} has an invalid value: {:?}", key, raw)),
            None => Ok(default),
        }
    }

    fn non_zero<T>(&self, key: &str, default: T) -> Result<T>
    where
        T: FromStr + PartialEq + Default,
        T::Err: std::error::Error + Send + Sync + 'static,
    {
        let value = self.or_default(key, default)?;
        if value == T::default() {
            bail!("{} must be greater than zero", key);
        }
        Ok(value)
    }
}

impl Config {
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let vars = Vars { lookup };

        Ok(Self {
            server_addr: vars.required("SERVER_ADDR")?,
            database_url: vars.required("DATABASE_URL")?,
            jwt_secret: vars.required("JWT_SECRET")?,
            api_prefix: (vars.lookup)("API_PREFIX").unwrap_or_else(|| "/api".to_string()),
            log_level: vars.or_default("LOG_LEVEL", tracing::Level::DEBUG)?,

            rate_protected_per_min: vars.non_zero("RATE_PROTECTED_PER_MIN", 1000)?,

            attendance_job_enabled: vars.or_default("ATTENDANCE_JOB_ENABLED", true)?,
            // every 2 minutes
            attendance_interval: Duration::from_secs(
                vars.non_zero("ATTENDANCE_INTERVAL_SECS", 120)?,
            ),
            attendance_employee_timeout: Duration::from_secs(
                vars.non_zero("ATTENDANCE_EMPLOYEE_TIMEOUT_SECS", 10)?,
            ),
            attendance_concurrency: vars.non_zero("ATTENDANCE_CONCURRENCY", 8)?,
        })
    }
}
