mod postgres;

pub use postgres::PgDatabase;

use std::future::Future;

use billing_core::ResultTable;
use deadpool_postgres::{Config, Pool, Runtime};
use tokio_postgres::NoTls;

use crate::config::DatabaseConfig;
use crate::error::DbError;

/// Database capability the pipeline depends on
pub trait SqlDatabase: Send + Sync {
    /// SQL dialect name shown to the model
    fn dialect(&self) -> &str;

    /// Schema description of the given tables, used as prompt context
    fn table_info(&self, tables: &[String]) -> impl Future<Output = Result<String, DbError>> + Send;

    /// Execute one generated statement in its own read-only transaction.
    ///
    /// A statement the database rejects is reported as `DbError::Execution`.
    fn run(&self, sql: &str) -> impl Future<Output = Result<ResultTable, DbError>> + Send;

    /// Cheap connectivity check for the health endpoint
    fn ping(&self) -> impl Future<Output = Result<(), DbError>> + Send;
}

/// Create a connection pool from the database descriptor
pub fn create_pool(db: &DatabaseConfig) -> Result<Pool, deadpool_postgres::CreatePoolError> {
    let mut cfg = Config::new();
    cfg.host = Some(db.host.clone());
    cfg.port = Some(db.port);
    cfg.user = Some(db.user.clone());
    cfg.password = db.password.clone();
    cfg.dbname = Some(db.database.clone());
    cfg.create_pool(Some(Runtime::Tokio1), NoTls)
}
