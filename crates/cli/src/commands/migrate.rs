//! Database migration command.
//!
//! # Usage
//!
//! ```bash
//! sk-cli migrate
//! ```
//!
//! Migrations live in `crates/db/migrations/` and are embedded in the binary.

/// Run the embedded schema migrations against `DATABASE_URL`.
///
/// # Errors
///
/// Returns an error if configuration is missing, the database is
/// unreachable, or a migration fails.
pub async fn run() -> Result<(), Box<dyn std::error::Error>> {
    let (_, pool) = super::connect().await?;
    storekeep_db::run_migrations(&pool).await?;
    pool.close().await;
    Ok(())
}
