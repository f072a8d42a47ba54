//! sqlx-to-port error mapping.
//!
//! | sqlx error                  | Postgres code | StoreError |
//! |-----------------------------|---------------|------------|
//! | Database (unique violation) | `23505`       | `Conflict` |
//! | RowNotFound                 | n/a           | `NotFound` |
//! | anything else               | any           | `Backend`  |

use coalition_members::store::StoreError;

pub(crate) fn map_sqlx_error(operation: &str, err: sqlx::Error) -> StoreError {
    match err {
        sqlx::Error::Database(db_err) => {
            let msg = format!("database error in {}: {}", operation, db_err.message());
            if db_err.code().as_deref() == Some("23505") {
                StoreError::Conflict(msg)
            } else {
                StoreError::Backend(msg)
            }
        }
        sqlx::Error::RowNotFound => StoreError::NotFound,
        other => StoreError::Backend(format!("{operation}: {other}")),
    }
}

/// Enum columns are stored as text; an unrecognized value means the schema
/// and the code have drifted apart.
pub(crate) fn bad_column(column: &str, value: &str) -> StoreError {
    StoreError::Backend(format!("unrecognized {column} value {value:?}"))
}
