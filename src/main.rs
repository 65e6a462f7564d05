use actix_web::middleware::NormalizePath;
use actix_web::web::Data;
use actix_web::{App, HttpServer, Responder, get};
use anyhow::Context;
use dotenvy::dotenv;
use std::sync::Arc;

mod api;
mod auth;
mod config;
mod db;
mod docs;
mod jobs;
mod model;
mod models;
mod routes;
mod store;
mod utils;

use config::Config;
use db::init_db;

use crate::docs::ApiDoc;
use crate::jobs::attendance::{AttendanceJob, JobSettings, LocalClock};
use crate::store::{MySqlAttendanceLedger, MySqlEmployeeDirectory};
use tracing::{info, warn};
use tracing_appender::rolling;
use utoipa::OpenApi; // ← needed for ApiDoc::openapi()
use utoipa_swagger_ui::SwaggerUi;

#[get("/")]
async fn index() -> impl Responder {
    "Hello World!"
}

#[actix_web::main]
async fn main() -> anyhow::Result<()> {
    dotenv().ok();

    let config = Config::from_env()?;

    // Rolling daily log
    let file_appender = rolling::daily("logs", "app.log");
    let (non_blocking, _guard) = tracing_appender::non_blocking(file_appender);

    tracing_subscriber::fmt()
        .with_writer(non_blocking)
        .with_max_level(config.log_level)
        .with_ansi(false)
        .with_target(false) // removes module path
        .with_level(true)
        .with_thread_ids(false)
        .with_thread_names(false)
        .pretty()
        .init();

    info!("Server starting...");

    let pool = init_db(&config.database_url).await?;

    let job = Arc::new(AttendanceJob::new(
        Arc::new(MySqlEmployeeDirectory::new(pool.clone())),
        Arc::new(MySqlAttendanceLedger::new(pool.clone())),
        Arc::new(LocalClock),
        JobSettings::from_config(&config),
    ));

    let job_handle = if config.attendance_job_enabled {
        Some(job.clone().spawn())
    } else {
        warn!("Attendance job disabled on this instance");
        None
    };

    let server_addr = config.server_addr.clone();
    let config_data = Data::new(config.clone());
    let job_data = Data::from(job);
    let protected_limiter = Arc::new(routes::build_limiter(config.rate_protected_per_min));

    HttpServer::new(move || {
        App::new()
            .wrap(actix_web::middleware::Logger::default())
            .wrap(NormalizePath::trim())
            .service(
                SwaggerUi::new("/swagger-ui/{_:.*}") // ← important: wildcard {_:.*} to match JS/CSS files
                    .url("/api-doc/openapi.json", ApiDoc::openapi()),
            )
            .app_data(Data::new(pool.clone()))
            .app_data(config_data.clone())
            .app_data(job_data.clone())
            .service(index)
            .configure(|cfg| routes::configure(cfg, &config, protected_limiter.clone()))
    })
    .bind(&server_addr)
    .with_context(|| format!("Failed to bind {}", server_addr))?
    .run()
    .await?;

    // server returned: let the in-flight sweep finish before exiting
    if let Some(handle) = job_handle {
        handle.shutdown().await;
    }

    info!("Server stopped");
    Ok(())
}
