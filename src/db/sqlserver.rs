//! SQL Server driver implementation using tiberius
//!
//! tiberius is async-only; the driver owns a current-thread tokio runtime and
//! blocks on it so callers see the same synchronous interface as SQLite.

use crate::db::driver::{DatabaseBackend, DatabaseDriver};
use crate::db::query::{CellValue, Row as FetchedRow, RowQuery};
use crate::db::schema::ColumnDef;
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use tiberius::time::chrono::{DateTime, FixedOffset, NaiveDate, NaiveDateTime, NaiveTime};
use tiberius::{AuthMethod, Client, ColumnData, Config, FromSql};
use tokio::net::TcpStream;
use tokio::runtime::Runtime;
use tokio::sync::Mutex;
use tokio_util::compat::{Compat, TokioAsyncWriteCompatExt};
use tracing::debug;

const DEFAULT_SCHEMA: &str = "dbo";

/// Configuration specific to SQL Server connections.
///
/// Missing fields fall back to the `DB_*` environment variables.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(default)]
pub struct SqlServerConfig {
    pub host: String,
    pub port: u16,
    pub user: String,
    pub password: String,
    pub database: String,
    pub encrypt: bool,
    pub trust_cert: bool,
}

impl Default for SqlServerConfig {
    fn default() -> Self {
        Self {
            host: std::env::var("DB_HOST").unwrap_or_else(|_| "localhost".to_string()),
            port: std::env::var("DB_PORT").ok().and_then(|p| p.parse().ok()).unwrap_or(1433),
            user: std::env::var("DB_USER").unwrap_or_else(|_| "sa".to_string()),
            password: std::env::var("DB_PASSWORD").unwrap_or_else(|_| String::new()),
            database: std::env::var("DB_DATABASE").unwrap_or_else(|_| "master".to_string()),
            encrypt: false,
            trust_cert: true,
        }
    }
}

/// SQL Server driver
pub struct SqlServerDriver {
    runtime: Runtime,
    client: Mutex<Client<Compat<TcpStream>>>,
    pub config: SqlServerConfig,
}

impl SqlServerDriver {
    /// Create a new SQL Server connection
    pub fn connect(config: SqlServerConfig) -> Result<Self> {
        let runtime = tokio::runtime::Builder::new_current_thread()
            .enable_all()
            .build()
            .context("Failed to start runtime for SQL Server client")?;
        let client = runtime.block_on(Self::connect_internal(&config))?;
        Ok(Self {
            runtime,
            client: Mutex::new(client),
            config,
        })
    }

    /// Internal TCP + TDS connection
    async fn connect_internal(cfg: &SqlServerConfig) -> Result<Client<Compat<TcpStream>>> {
        let mut config = Config::new();
        config.host(&cfg.host);
        config.port(cfg.port);
        config.database(&cfg.database);
        config.authentication(AuthMethod::sql_server(&cfg.user, &cfg.password));

        if cfg.trust_cert {
            config.trust_cert();
        }
        if !cfg.encrypt {
            config.encryption(tiberius::EncryptionLevel::NotSupported);
        }

        let tcp = TcpStream::connect(config.get_addr())
            .await
            .context("Failed to connect to SQL Server")?;
        tcp.set_nodelay(true)?;

        let client = Client::connect(config, tcp.compat_write())
            .await
            .context("Failed to authenticate with SQL Server")?;

        Ok(client)
    }
}

impl DatabaseDriver for SqlServerDriver {
    fn backend(&self) -> DatabaseBackend {
        DatabaseBackend::SqlServer
    }

    fn database_name(&self) -> String {
        self.config.database.clone()
    }

    fn get_columns(&self, table: &str) -> Result<Vec<ColumnDef>> {
        let (schema, table) = table.split_once('.').unwrap_or((DEFAULT_SCHEMA, table));
        let query = "SELECT c.name, t.name \
             FROM sys.columns c \
             INNER JOIN sys.types t ON c.user_type_id = t.user_type_id \
             INNER JOIN sys.tables tbl ON c.object_id = tbl.object_id \
             INNER JOIN sys.schemas s ON tbl.schema_id = s.schema_id \
             WHERE s.name = @P1 AND tbl.name = @P2 \
             ORDER BY c.column_id";

        self.runtime.block_on(async {
            let mut client = self.client.lock().await;
            let rows = client
                .query(query, &[&schema, &table])
                .await?
                .into_first_result()
                .await?;

            let columns: Vec<ColumnDef> = rows
                .iter()
                .map(|row| ColumnDef {
                    name: row.get::<&str, _>(0).unwrap_or("").to_string(),
                    data_type: row.get::<&str, _>(1).unwrap_or("").to_uppercase(),
                })
                .collect();
            Ok::<_, anyhow::Error>(columns)
        })
    }

    fn fetch_rows(&self, query: &RowQuery) -> Result<Vec<FetchedRow>> {
        let sql = query.to_sql(self.backend());
        debug!(%sql, "fetching rows");

        self.runtime.block_on(async {
            let mut client = self.client.lock().await;
            let rows = client
                .simple_query(&sql)
                .await
                .with_context(|| format!("Failed to run `{}`", sql))?
                .into_first_result()
                .await?;

            let fetched: Vec<FetchedRow> = rows
                .iter()
                .map(|row| {
                    let cells = row
                        .cells()
                        .map(|(col, data)| (col.name().to_string(), cell_value(data)))
                        .collect();
                    FetchedRow::new(cells)
                })
                .collect();
            Ok::<_, anyhow::Error>(fetched)
        })
    }
}

// ---- Type conversion helpers ----

/// Convert a decoded TDS value into a cell.
///
/// Nullable column types (`Intn`, `Floatn`, `Datetimen`, ...) decode to the
/// same value variants as their fixed-width forms, so every column type maps
/// to a typed cell.
fn cell_value(data: &ColumnData<'static>) -> CellValue {
    let cell = match data {
        ColumnData::U8(v) => v.map(|v| CellValue::Int(v as i64)),
        ColumnData::I16(v) => v.map(|v| CellValue::Int(v as i64)),
        ColumnData::I32(v) => v.map(|v| CellValue::Int(v as i64)),
        ColumnData::I64(v) => v.map(CellValue::Int),
        ColumnData::F32(v) => v.map(|v| CellValue::Float(v as f64)),
        ColumnData::F64(v) => v.map(CellValue::Float),
        ColumnData::Bit(v) => v.map(CellValue::Bool),
        ColumnData::String(v) => v.as_deref().map(|v| CellValue::String(v.to_string())),
        ColumnData::Guid(v) => v.map(|v| CellValue::String(v.to_string())),
        ColumnData::Binary(v) => v.as_deref().map(|v| CellValue::Binary(v.to_vec())),
        ColumnData::Numeric(v) => v.map(|v| CellValue::String(v.to_string())),
        ColumnData::Xml(v) => v.as_ref().map(|v| CellValue::String(v.to_string())),
        ColumnData::DateTime(_) | ColumnData::SmallDateTime(_) | ColumnData::DateTime2(_) => {
            decode::<NaiveDateTime>(data)
                .map(|v| CellValue::DateTime(v.format("%Y-%m-%d %H:%M:%S").to_string()))
        }
        ColumnData::Date(_) => decode::<NaiveDate>(data)
            .map(|v| CellValue::DateTime(v.format("%Y-%m-%d").to_string())),
        ColumnData::Time(_) => decode::<NaiveTime>(data)
            .map(|v| CellValue::DateTime(v.format("%H:%M:%S").to_string())),
        ColumnData::DateTimeOffset(_) => decode::<DateTime<FixedOffset>>(data)
            .map(|v| CellValue::DateTime(v.format("%Y-%m-%d %H:%M:%S %:z").to_string())),
    };
    cell.unwrap_or(CellValue::Null)
}

fn decode<'a, T: FromSql<'a>>(data: &'a ColumnData<'static>) -> Option<T> {
    T::from_sql(data).ok().flatten()
}
