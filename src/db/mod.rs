//! Database module: driver abstraction plus SQL Server and SQLite backends

mod driver;
mod query;
mod schema;
pub mod sqlite;
pub mod sqlserver;

pub use driver::*;
pub use query::*;
pub use schema::*;

use crate::config::ConnectionConfig;
use anyhow::Result;
use tracing::info;

/// Open the configured database
pub fn connect(config: &ConnectionConfig) -> Result<Box<dyn DatabaseDriver>> {
    let driver: Box<dyn DatabaseDriver> = match config {
        ConnectionConfig::Sqlite { path } => Box::new(sqlite::SqliteDriver::open(path.clone())?),
        ConnectionConfig::SqlServer(cfg) => {
            Box::new(sqlserver::SqlServerDriver::connect(cfg.clone())?)
        }
    };
    info!(backend = %driver.backend(), database = %driver.database_name(), "connected");
    Ok(driver)
}
