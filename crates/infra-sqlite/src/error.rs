// sqlx::Error -> DaoError translation
//
// Lives here because of the orphan rule: core cannot see sqlx, and this crate
// cannot implement `From<sqlx::Error>` for `DaoError`.

use daokit_core::error::DaoError;
use rust_decimal::Decimal;
use std::str::FromStr;

/// Convert a sqlx error into `DaoError::Persistence`, classifying the SQLite
/// result code into the message while keeping the original error as source
pub(crate) fn map_sqlx_error(err: sqlx::Error) -> DaoError {
    let message = match &err {
        sqlx::Error::Database(db_err) => {
            // SQLite error codes: https://www.sqlite.org/rescode.html
            match db_err.code().as_deref() {
                Some(code @ ("2067" | "1555")) => {
                    format!("Unique constraint violation: {} ({})", db_err.message(), code)
                }
                Some(code @ ("787" | "3850")) => format!(
                    "Foreign key constraint violation: {} ({})",
                    db_err.message(),
                    code
                ),
                Some(code @ ("19" | "1299" | "275")) => {
                    format!("Constraint violation: {} ({})", db_err.message(), code)
                }
                Some("5") => format!("Database locked (SQLITE_BUSY): {}", db_err.message()),
                Some("8") => format!(
                    "Write rejected on read-only connection: {}",
                    db_err.message()
                ),
                Some(code) => format!("Database error [{}]: {}", code, db_err.message()),
                None => format!("Database error: {}", db_err.message()),
            }
        }
        sqlx::Error::RowNotFound => "Row not found".to_string(),
        sqlx::Error::ColumnNotFound(col) => format!("Column not found: {}", col),
        sqlx::Error::PoolTimedOut => "Timed out waiting for a pooled connection".to_string(),
        // Connection, pool, protocol errors
        other => other.to_string(),
    };

    DaoError::persistence(message, err)
}

/// Decode a decimal stored as TEXT
pub(crate) fn parse_decimal(column: &'static str, raw: &str) -> Result<Decimal, DaoError> {
    Decimal::from_str(raw).map_err(|e| {
        DaoError::persistence(format!("Invalid decimal in column {}: {:?}", column, raw), e)
    })
}
