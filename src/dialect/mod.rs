//! SQL dialect providers.
//!
//! A dialect supplies quoting, literal formatting, parameter token syntax
//! and the handful of SQL templates that differ between engines. Providers
//! are stateless unit structs shared as `&'static dyn SqlDialect`.

pub mod mysql;
pub mod postgres;
pub mod sqlite;
pub mod traits;

pub use traits::SqlDialect;

use mysql::MysqlDialect;
use postgres::PostgresDialect;
use sqlite::SqliteDialect;

/// Supported SQL dialects.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Dialect {
    Postgres,
    Mysql,
    Sqlite,
}

impl Default for Dialect {
    fn default() -> Self {
        Self::Postgres
    }
}

impl Dialect {
    pub fn provider(&self) -> &'static dyn SqlDialect {
        match self {
            Dialect::Postgres => &PostgresDialect,
            Dialect::Mysql => &MysqlDialect,
            Dialect::Sqlite => &SqliteDialect,
        }
    }
}
