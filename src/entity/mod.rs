//! Compile-time description of persisted record shapes.
//!
//! An [`Entity`] lists its columns in a stable order, converts itself into a row of
//! [`RowValues`] in that order, and rebuilds itself from a stored row. The
//! [`impl_entity!`](crate::impl_entity) macro writes the impl from a field list.

mod macros;

use chrono::NaiveDateTime;
use serde_json::Value as JsonValue;

use crate::error::StoreError;
use crate::results::CustomDbRow;
use crate::types::{ColumnType, RowValues};

/// One column of an entity's table.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Column {
    pub name: &'static str,
    pub kind: ColumnType,
    pub nullable: bool,
}

impl Column {
    #[must_use]
    pub const fn new(name: &'static str, kind: ColumnType, nullable: bool) -> Self {
        Self {
            name,
            kind,
            nullable,
        }
    }
}

/// A record type persisted by a [`Table`](crate::table::Table).
///
/// `COLUMNS`, `to_row` and `from_row` must agree on column order; `impl_entity!`
/// guarantees that. One column, named by `KEY_COLUMN`, holds the 64-bit primary key.
pub trait Entity: Sized + Send + Sync + 'static {
    /// Type name; the default table name.
    const TYPE_NAME: &'static str;
    /// Columns in declaration order.
    const COLUMNS: &'static [Column];
    /// Name of the integer primary key column.
    const KEY_COLUMN: &'static str = "Id";

    /// Field values in `COLUMNS` order.
    fn to_row(&self) -> Vec<RowValues>;

    /// Rebuild the entity from a stored row.
    ///
    /// # Errors
    /// Returns `StoreError::ConversionError` if a column is missing or holds a value of the
    /// wrong kind.
    fn from_row(row: &CustomDbRow) -> Result<Self, StoreError>;
}

/// Rust field types that map onto a single column.
pub trait ColumnValue: Sized {
    const KIND: ColumnType;
    const NULLABLE: bool = false;

    fn to_value(&self) -> RowValues;

    /// # Errors
    /// Returns `StoreError::ConversionError` when `value` cannot represent `Self`.
    fn from_value(value: &RowValues) -> Result<Self, StoreError>;
}

/// Read column `name` from `row` as `V`.
///
/// # Errors
/// Returns `StoreError::ConversionError` if the column is absent or cannot be converted.
pub fn column<V: ColumnValue>(row: &CustomDbRow, name: &str) -> Result<V, StoreError> {
    let value = row
        .get(name)
        .ok_or_else(|| StoreError::ConversionError(format!("column {name} missing from row")))?;
    V::from_value(value).map_err(|e| match e {
        StoreError::ConversionError(msg) => {
            StoreError::ConversionError(format!("column {name}: {msg}"))
        }
        other => other,
    })
}

fn mismatch(expected: &str, found: &RowValues) -> StoreError {
    StoreError::ConversionError(format!("expected {expected}, found {}", found.kind_name()))
}

impl ColumnValue for i64 {
    const KIND: ColumnType = ColumnType::Integer;

    fn to_value(&self) -> RowValues {
        RowValues::Int(*self)
    }

    fn from_value(value: &RowValues) -> Result<Self, StoreError> {
        value.as_int().copied().ok_or_else(|| mismatch("integer", value))
    }
}

impl ColumnValue for i32 {
    const KIND: ColumnType = ColumnType::Integer;

    fn to_value(&self) -> RowValues {
        RowValues::Int(i64::from(*self))
    }

    fn from_value(value: &RowValues) -> Result<Self, StoreError> {
        let wide = value.as_int().ok_or_else(|| mismatch("integer", value))?;
        i32::try_from(*wide)
            .map_err(|e| StoreError::ConversionError(format!("{wide} does not fit i32: {e}")))
    }
}

impl ColumnValue for bool {
    const KIND: ColumnType = ColumnType::Boolean;

    fn to_value(&self) -> RowValues {
        RowValues::Bool(*self)
    }

    fn from_value(value: &RowValues) -> Result<Self, StoreError> {
        value.as_bool().copied().ok_or_else(|| mismatch("bool", value))
    }
}

impl ColumnValue for f64 {
    const KIND: ColumnType = ColumnType::Real;

    fn to_value(&self) -> RowValues {
        RowValues::Float(*self)
    }

    fn from_value(value: &RowValues) -> Result<Self, StoreError> {
        value.as_float().ok_or_else(|| mismatch("float", value))
    }
}

impl ColumnValue for String {
    const KIND: ColumnType = ColumnType::Text;

    fn to_value(&self) -> RowValues {
        RowValues::Text(self.clone())
    }

    fn from_value(value: &RowValues) -> Result<Self, StoreError> {
        value
            .as_text()
            .map(str::to_owned)
            .ok_or_else(|| mismatch("text", value))
    }
}

impl ColumnValue for Vec<u8> {
    const KIND: ColumnType = ColumnType::Blob;

    fn to_value(&self) -> RowValues {
        RowValues::Blob(self.clone())
    }

    fn from_value(value: &RowValues) -> Result<Self, StoreError> {
        value
            .as_blob()
            .map(<[u8]>::to_vec)
            .ok_or_else(|| mismatch("blob", value))
    }
}

/// Stored as text on `SQLite`, keeping nanoseconds. `PostgreSQL` `TIMESTAMP` keeps
/// microseconds only; the Postgres store truncates on write, so a value with finer
/// precision comes back truncated.
impl ColumnValue for NaiveDateTime {
    const KIND: ColumnType = ColumnType::Timestamp;

    fn to_value(&self) -> RowValues {
        RowValues::Timestamp(*self)
    }

    fn from_value(value: &RowValues) -> Result<Self, StoreError> {
        value
            .as_timestamp()
            .ok_or_else(|| mismatch("timestamp", value))
    }
}

impl ColumnValue for JsonValue {
    const KIND: ColumnType = ColumnType::Json;

    fn to_value(&self) -> RowValues {
        RowValues::JSON(self.clone())
    }

    fn from_value(value: &RowValues) -> Result<Self, StoreError> {
        value.as_json().ok_or_else(|| mismatch("json", value))
    }
}

impl<T: ColumnValue> ColumnValue for Option<T> {
    const KIND: ColumnType = T::KIND;
    const NULLABLE: bool = true;

    fn to_value(&self) -> RowValues {
        match self {
            Some(inner) => inner.to_value(),
            None => RowValues::Null,
        }
    }

    fn from_value(value: &RowValues) -> Result<Self, StoreError> {
        if value.is_null() {
            Ok(None)
        } else {
            T::from_value(value).map(Some)
        }
    }
}
