//! [`RowAccess`] for [`rusqlite::Row`].
//!
//! SQLite stores temporals, UUIDs, and decimals as TEXT (or INTEGER for
//! epoch timestamps), so the typed getters convert from the storage class
//! the driver reports. The driver never reports an offset; instants are
//! anchored at UTC unless the stored text carries one.

use chrono::{DateTime, FixedOffset, NaiveDateTime, NaiveTime};
use rusqlite::types::ValueRef;
use rust_decimal::prelude::FromPrimitive;
use rust_decimal::Decimal;
use uuid::Uuid;

use crate::error::DecodeError;
use crate::row::RowAccess;
use crate::types::temporal;

fn storage_class(value: &ValueRef<'_>) -> &'static str {
    match value {
        ValueRef::Null => "NULL",
        ValueRef::Integer(_) => "INTEGER",
        ValueRef::Real(_) => "REAL",
        ValueRef::Text(_) => "TEXT",
        ValueRef::Blob(_) => "BLOB",
    }
}

fn cell<'r>(row: &'r rusqlite::Row<'_>, ordinal: usize) -> Result<ValueRef<'r>, DecodeError> {
    if ordinal == 0 {
        return Err(DecodeError::MissingColumn(0));
    }
    row.get_ref(ordinal - 1)
        .map_err(|_| DecodeError::MissingColumn(ordinal))
}

fn utf8(ordinal: usize, bytes: &[u8]) -> Result<&str, DecodeError> {
    core::str::from_utf8(bytes)
        .map_err(|_| DecodeError::unexpected_type(ordinal, "TEXT", "invalid UTF-8"))
}

macro_rules! integral_getter {
    ($fn_name:ident, $ty:ty) => {
        fn $fn_name(&self, ordinal: usize) -> Result<$ty, DecodeError> {
            match cell(self, ordinal)? {
                ValueRef::Integer(i) => <$ty>::try_from(i).map_err(|_| {
                    DecodeError::unexpected_type(ordinal, stringify!($ty), "INTEGER out of range")
                }),
                other => Err(DecodeError::unexpected_type(
                    ordinal,
                    "INTEGER",
                    storage_class(&other),
                )),
            }
        }
    };
}

impl RowAccess for rusqlite::Row<'_> {
    fn column_count(&self) -> usize {
        self.as_ref().column_count()
    }

    fn column_name(&self, ordinal: usize) -> Option<&str> {
        if ordinal == 0 {
            return None;
        }
        self.as_ref().column_name(ordinal - 1).ok()
    }

    fn driver_type(&self, ordinal: usize) -> &'static str {
        match cell(self, ordinal) {
            Ok(value) => storage_class(&value),
            Err(_) => "unknown",
        }
    }

    fn is_null(&self, ordinal: usize) -> Result<bool, DecodeError> {
        Ok(matches!(cell(self, ordinal)?, ValueRef::Null))
    }

    fn get_bool(&self, ordinal: usize) -> Result<bool, DecodeError> {
        match cell(self, ordinal)? {
            ValueRef::Integer(i) => Ok(i != 0),
            other => Err(DecodeError::unexpected_type(
                ordinal,
                "INTEGER",
                storage_class(&other),
            )),
        }
    }

    integral_getter!(get_byte, i8);
    integral_getter!(get_short, i16);
    integral_getter!(get_int, i32);
    integral_getter!(get_long, i64);

    fn get_float(&self, ordinal: usize) -> Result<f32, DecodeError> {
        self.get_double(ordinal).map(|v| v as f32)
    }

    fn get_double(&self, ordinal: usize) -> Result<f64, DecodeError> {
        match cell(self, ordinal)? {
            ValueRef::Real(f) => Ok(f),
            // NUMERIC affinity may hand integral values back as INTEGER
            ValueRef::Integer(i) => Ok(i as f64),
            other => Err(DecodeError::unexpected_type(
                ordinal,
                "REAL",
                storage_class(&other),
            )),
        }
    }

    fn get_big_decimal(&self, ordinal: usize) -> Result<Decimal, DecodeError> {
        match cell(self, ordinal)? {
            ValueRef::Text(bytes) => utf8(ordinal, bytes)?
                .trim()
                .parse::<Decimal>()
                .map_err(|_| DecodeError::unexpected_type(ordinal, "Decimal", "unparsable TEXT")),
            ValueRef::Integer(i) => Ok(Decimal::from(i)),
            ValueRef::Real(f) => Decimal::from_f64(f).ok_or_else(|| {
                DecodeError::unexpected_type(ordinal, "Decimal", "non-finite REAL")
            }),
            other => Err(DecodeError::unexpected_type(
                ordinal,
                "TEXT",
                storage_class(&other),
            )),
        }
    }

    fn get_string(&self, ordinal: usize) -> Result<String, DecodeError> {
        match cell(self, ordinal)? {
            ValueRef::Text(bytes) => Ok(utf8(ordinal, bytes)?.to_string()),
            other => Err(DecodeError::unexpected_type(
                ordinal,
                "TEXT",
                storage_class(&other),
            )),
        }
    }

    fn get_bytes(&self, ordinal: usize) -> Result<Vec<u8>, DecodeError> {
        match cell(self, ordinal)? {
            ValueRef::Blob(bytes) => Ok(bytes.to_vec()),
            other => Err(DecodeError::unexpected_type(
                ordinal,
                "BLOB",
                storage_class(&other),
            )),
        }
    }

    fn get_uuid(&self, ordinal: usize) -> Result<Uuid, DecodeError> {
        match cell(self, ordinal)? {
            ValueRef::Text(bytes) => Uuid::parse_str(utf8(ordinal, bytes)?)
                .map_err(|_| DecodeError::unexpected_type(ordinal, "Uuid", "unparsable TEXT")),
            ValueRef::Blob(bytes) => Uuid::from_slice(bytes)
                .map_err(|_| DecodeError::unexpected_type(ordinal, "Uuid", "BLOB of wrong length")),
            other => Err(DecodeError::unexpected_type(
                ordinal,
                "TEXT",
                storage_class(&other),
            )),
        }
    }

    fn get_timestamp(
        &self,
        ordinal: usize,
    ) -> Result<(NaiveDateTime, Option<FixedOffset>), DecodeError> {
        match cell(self, ordinal)? {
            ValueRef::Text(bytes) => temporal::parse_datetime(utf8(ordinal, bytes)?).ok_or_else(
                || DecodeError::unexpected_type(ordinal, "timestamp", "unparsable TEXT"),
            ),
            ValueRef::Integer(seconds) => DateTime::from_timestamp(seconds, 0)
                .map(|dt| (dt.naive_utc(), Some(chrono::Offset::fix(&chrono::Utc))))
                .ok_or_else(|| {
                    DecodeError::unexpected_type(ordinal, "timestamp", "INTEGER out of range")
                }),
            other => Err(DecodeError::unexpected_type(
                ordinal,
                "TEXT",
                storage_class(&other),
            )),
        }
    }

    fn get_time(
        &self,
        ordinal: usize,
    ) -> Result<(NaiveTime, Option<FixedOffset>), DecodeError> {
        match cell(self, ordinal)? {
            ValueRef::Text(bytes) => temporal::parse_time(utf8(ordinal, bytes)?).ok_or_else(
                || DecodeError::unexpected_type(ordinal, "time", "unparsable TEXT"),
            ),
            other => Err(DecodeError::unexpected_type(
                ordinal,
                "TEXT",
                storage_class(&other),
            )),
        }
    }
}
