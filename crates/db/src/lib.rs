//! Persistence for compliance reports and certificates.
//!
//! Repositories are zero-sized structs whose async methods take `&PgPool`
//! first. [`sink`] adapts them (and the filesystem) to the engine's
//! [`ReportSink`](fairplay_core::compliance::ReportSink) trait.

use sqlx::postgres::PgPoolOptions;

pub mod models;
pub mod repositories;
pub mod sink;

pub use sink::{FileReportSink, MultiReportSink, PgReportSink};

pub type DbPool = sqlx::PgPool;

/// Create a connection pool from a database URL.
pub async fn create_pool(database_url: &str) -> Result<DbPool, sqlx::Error> {
    PgPoolOptions::new()
        .max_connections(20)
        .connect(database_url)
        .await
}

/// Round-trip a trivial query to confirm the database is reachable.
pub async fn health_check(pool: &DbPool) -> Result<(), sqlx::Error> {
    sqlx::query("SELECT 1").execute(pool).await?;
    Ok(())
}

/// Apply the migrations bundled with this crate.
pub async fn run_migrations(pool: &DbPool) -> Result<(), sqlx::migrate::MigrateError> {
    sqlx::migrate!("./migrations").run(pool).await
}
