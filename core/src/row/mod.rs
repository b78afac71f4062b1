//! Row decoding.
//!
//! Decoding is tag-driven: for each 1-based ordinal the selection's
//! [`TypeTag`] picks an extraction primitive against the driver row, NULLs
//! are checked against the tag's nullability, and the resulting values are
//! assembled right-to-left into the nested tuple shape the selection
//! predicts: `(A1, (A2, ... (An, ())))`.
//!
//! Driver leaves implement [`RowAccess`]; the `rusqlite` implementation is
//! feature-gated.

#[cfg(feature = "rusqlite")]
mod rusqlite;

use chrono::{DateTime, FixedOffset, NaiveDate, NaiveDateTime, NaiveTime, Utc};
use rust_decimal::Decimal;
use uuid::Uuid;

use crate::dialect::Dialect;
use crate::error::DecodeError;
use crate::types::{TypeTag, Value};

/// Typed access to the current row of an externally owned cursor.
///
/// Getters are keyed by 1-based ordinal and fail with
/// [`DecodeError::UnexpectedType`] when the driver's column kind is
/// incompatible, or [`DecodeError::MissingColumn`] when the ordinal is out
/// of range. NULL handling stays with [`extract`]: getters are only called
/// on non-NULL cells.
pub trait RowAccess {
    fn column_count(&self) -> usize;
    fn column_name(&self, ordinal: usize) -> Option<&str>;
    /// The driver's name for the column kind, for error text.
    fn driver_type(&self, ordinal: usize) -> &'static str;

    fn is_null(&self, ordinal: usize) -> Result<bool, DecodeError>;
    fn get_bool(&self, ordinal: usize) -> Result<bool, DecodeError>;
    fn get_byte(&self, ordinal: usize) -> Result<i8, DecodeError>;
    fn get_short(&self, ordinal: usize) -> Result<i16, DecodeError>;
    fn get_int(&self, ordinal: usize) -> Result<i32, DecodeError>;
    fn get_long(&self, ordinal: usize) -> Result<i64, DecodeError>;
    fn get_float(&self, ordinal: usize) -> Result<f32, DecodeError>;
    fn get_double(&self, ordinal: usize) -> Result<f64, DecodeError>;
    fn get_big_decimal(&self, ordinal: usize) -> Result<Decimal, DecodeError>;
    fn get_string(&self, ordinal: usize) -> Result<String, DecodeError>;
    fn get_bytes(&self, ordinal: usize) -> Result<Vec<u8>, DecodeError>;
    fn get_uuid(&self, ordinal: usize) -> Result<Uuid, DecodeError>;
    /// The driver's timestamp primitive: a local datetime plus the offset,
    /// when the driver reports one.
    fn get_timestamp(
        &self,
        ordinal: usize,
    ) -> Result<(NaiveDateTime, Option<FixedOffset>), DecodeError>;
    /// The driver's time primitive, with an offset when reported.
    fn get_time(
        &self,
        ordinal: usize,
    ) -> Result<(NaiveTime, Option<FixedOffset>), DecodeError>;
}

/// Extracts one cell by tag.
///
/// NULL cells decode as [`Value::Null`] for nullable tags and fail with
/// [`DecodeError::UnexpectedNull`] otherwise. Temporal tags normalize
/// through the driver's timestamp primitive; offset-less drivers anchor
/// instants at UTC.
pub fn extract(
    tag: &TypeTag,
    row: &impl RowAccess,
    ordinal: usize,
    dialect: &Dialect,
) -> Result<Value, DecodeError> {
    if ordinal == 0 || ordinal > row.column_count() {
        return Err(DecodeError::MissingColumn(ordinal));
    }
    if row.is_null(ordinal)? {
        return if tag.is_nullable() {
            Ok(Value::Null)
        } else {
            Err(DecodeError::UnexpectedNull(ordinal))
        };
    }
    let utc = chrono::Offset::fix(&Utc);
    match tag.base() {
        TypeTag::Bool => row.get_bool(ordinal).map(Value::Bool),
        TypeTag::Byte => row.get_byte(ordinal).map(Value::Byte),
        TypeTag::Short => row.get_short(ordinal).map(Value::Short),
        TypeTag::Int => row.get_int(ordinal).map(Value::Int),
        TypeTag::Long => row.get_long(ordinal).map(Value::Long),
        TypeTag::Float => row.get_float(ordinal).map(Value::Float),
        TypeTag::Double => row.get_double(ordinal).map(Value::Double),
        TypeTag::Decimal => row.get_big_decimal(ordinal).map(Value::Decimal),
        TypeTag::Char => {
            let s = row.get_string(ordinal)?;
            let mut chars = s.chars();
            match (chars.next(), chars.next()) {
                (Some(c), None) => Ok(Value::Char(c)),
                _ => Err(DecodeError::unexpected_type(
                    ordinal,
                    "Char",
                    row.driver_type(ordinal),
                )),
            }
        }
        TypeTag::Text => row.get_string(ordinal).map(Value::Text),
        TypeTag::Bytes => row.get_bytes(ordinal).map(Value::Bytes),
        TypeTag::Uuid => row.get_uuid(ordinal).map(Value::Uuid),
        TypeTag::Date => {
            let (dt, _) = row.get_timestamp(ordinal)?;
            Ok(Value::Date(dt.date()))
        }
        TypeTag::Time => {
            let (t, _) = row.get_time(ordinal)?;
            Ok(Value::Time(t))
        }
        TypeTag::DateTime => {
            let (dt, _) = row.get_timestamp(ordinal)?;
            Ok(Value::DateTime(dt))
        }
        TypeTag::Instant => {
            let (dt, offset) = row.get_timestamp(ordinal)?;
            let anchored = match offset {
                Some(offset) => local_at(dt, offset, ordinal)?.with_timezone(&Utc),
                None => dt.and_utc(),
            };
            Ok(Value::Instant(anchored))
        }
        TypeTag::OffsetTime => {
            let (t, offset) = row.get_time(ordinal)?;
            Ok(Value::OffsetTime(t, offset.unwrap_or(utc)))
        }
        TypeTag::OffsetDateTime => {
            let (dt, offset) = row.get_timestamp(ordinal)?;
            let offset = offset.unwrap_or(utc);
            Ok(Value::OffsetDateTime(local_at(dt, offset, ordinal)?))
        }
        TypeTag::ZonedDateTime => {
            let (dt, offset) = row.get_timestamp(ordinal)?;
            let offset = offset.unwrap_or(utc);
            Ok(Value::ZonedDateTime(local_at(dt, offset, ordinal)?))
        }
        TypeTag::Dialect(name) => match dialect.extractor(name) {
            Some(extractor) => extractor(row, ordinal),
            None => Err(DecodeError::unexpected_type(
                ordinal,
                name.as_str(),
                "unregistered dialect type",
            )),
        },
        TypeTag::Nullable(_) => unreachable!("base() strips nullability"),
    }
}

fn local_at(
    dt: NaiveDateTime,
    offset: FixedOffset,
    ordinal: usize,
) -> Result<DateTime<FixedOffset>, DecodeError> {
    use chrono::TimeZone;
    offset.from_local_datetime(&dt).single().ok_or_else(|| {
        DecodeError::unexpected_type(ordinal, "timestamp", "unrepresentable local time")
    })
}

// =============================================================================
// Leaf conversions
// =============================================================================

/// Converts one extracted [`Value`] into a Rust leaf type.
pub trait FromValue: Sized {
    fn from_value(value: &Value, ordinal: usize) -> Result<Self, DecodeError>;
}

fn kind_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "NULL",
        Value::Bool(_) => "Bool",
        Value::Byte(_) => "Byte",
        Value::Short(_) => "Short",
        Value::Int(_) => "Int",
        Value::Long(_) => "Long",
        Value::Float(_) => "Float",
        Value::Double(_) => "Double",
        Value::Decimal(_) => "Decimal",
        Value::Char(_) => "Char",
        Value::Text(_) => "Text",
        Value::Bytes(_) => "Bytes",
        Value::Uuid(_) => "Uuid",
        Value::Date(_) => "Date",
        Value::Time(_) => "Time",
        Value::DateTime(_) => "DateTime",
        Value::Instant(_) => "Instant",
        Value::OffsetTime(..) => "OffsetTime",
        Value::OffsetDateTime(_) => "OffsetDateTime",
        Value::ZonedDateTime(_) => "ZonedDateTime",
    }
}

macro_rules! impl_from_value {
    ($($ty:ty => $expected:literal: $($pattern:pat => $result:expr),+);* $(;)?) => { $(
        impl FromValue for $ty {
            fn from_value(value: &Value, ordinal: usize) -> Result<Self, DecodeError> {
                match value {
                    Value::Null => Err(DecodeError::UnexpectedNull(ordinal)),
                    $($pattern => Ok($result),)+
                    other => Err(DecodeError::unexpected_type(
                        ordinal,
                        $expected,
                        kind_name(other),
                    )),
                }
            }
        }
    )* }
}

impl_from_value!(
    bool => "Bool": Value::Bool(b) => *b;
    i8 => "Byte": Value::Byte(v) => *v;
    i16 => "Short": Value::Short(v) => *v, Value::Byte(v) => (*v).into();
    i32 => "Int": Value::Int(v) => *v, Value::Short(v) => (*v).into(), Value::Byte(v) => (*v).into();
    i64 => "Long": Value::Long(v) => *v, Value::Int(v) => (*v).into(), Value::Short(v) => (*v).into(), Value::Byte(v) => (*v).into();
    f32 => "Float": Value::Float(v) => *v;
    f64 => "Double": Value::Double(v) => *v, Value::Float(v) => (*v).into();
    Decimal => "Decimal": Value::Decimal(v) => *v;
    char => "Char": Value::Char(c) => *c;
    String => "Text": Value::Text(s) => s.clone(), Value::Char(c) => c.to_string();
    Vec<u8> => "Bytes": Value::Bytes(b) => b.clone();
    Uuid => "Uuid": Value::Uuid(u) => *u;
    NaiveDate => "Date": Value::Date(d) => *d;
    NaiveTime => "Time": Value::Time(t) => *t;
    NaiveDateTime => "DateTime": Value::DateTime(dt) => *dt;
    DateTime<Utc> => "Instant": Value::Instant(i) => *i;
    DateTime<FixedOffset> => "OffsetDateTime": Value::OffsetDateTime(dt) => *dt, Value::ZonedDateTime(dt) => *dt;
    (NaiveTime, FixedOffset) => "OffsetTime": Value::OffsetTime(t, o) => (*t, *o);
);

impl<T: FromValue> FromValue for Option<T> {
    fn from_value(value: &Value, ordinal: usize) -> Result<Self, DecodeError> {
        match value {
            Value::Null => Ok(None),
            other => T::from_value(other, ordinal).map(Some),
        }
    }
}

// =============================================================================
// Nested tuple assembly
// =============================================================================

/// Reconstructs the right-nested row tuple `(Head, Tail)` terminated by `()`.
///
/// The implementation recurses structurally: `()` consumes nothing, a pair
/// consumes one leaf and delegates the rest, so a selection of `n`
/// expressions yields exactly `n` leaves in order.
pub trait FromRow: Sized {
    const ARITY: usize;
    fn from_values(values: &[Value], at: usize) -> Result<Self, DecodeError>;
}

impl FromRow for () {
    const ARITY: usize = 0;

    fn from_values(_values: &[Value], _at: usize) -> Result<Self, DecodeError> {
        Ok(())
    }
}

impl<Head: FromValue, Tail: FromRow> FromRow for (Head, Tail) {
    const ARITY: usize = 1 + Tail::ARITY;

    fn from_values(values: &[Value], at: usize) -> Result<Self, DecodeError> {
        let value = values.get(at).ok_or(DecodeError::MissingColumn(at + 1))?;
        let head = Head::from_value(value, at + 1)?;
        let tail = Tail::from_values(values, at + 1)?;
        Ok((head, tail))
    }
}

/// Decodes one cursor row into the tuple shape `T`, verifying it against the
/// selection's effective tags.
pub fn decode_row<R, T>(row: &R, tags: &[TypeTag], dialect: &Dialect) -> Result<T, DecodeError>
where
    R: RowAccess,
    T: FromRow,
{
    if T::ARITY != tags.len() {
        return Err(DecodeError::MissingColumn(tags.len().min(T::ARITY) + 1));
    }
    if row.column_count() < tags.len() {
        return Err(DecodeError::MissingColumn(row.column_count() + 1));
    }
    let mut values = Vec::with_capacity(tags.len());
    for (i, tag) in tags.iter().enumerate() {
        values.push(extract(tag, row, i + 1, dialect)?);
    }
    T::from_values(&values, 0)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tuples_assemble_right_to_left() {
        let values = vec![
            Value::Text("Terrence".into()),
            Value::Text("Smith".into()),
        ];
        let row: (String, (String, ())) = FromRow::from_values(&values, 0).unwrap();
        assert_eq!(row, ("Terrence".to_string(), ("Smith".to_string(), ())));
    }

    #[test]
    fn null_fills_option_and_rejects_plain() {
        let values = vec![Value::Null];
        let ok: (Option<i32>, ()) = FromRow::from_values(&values, 0).unwrap();
        assert_eq!(ok, (None, ()));

        let err = <(i32, ()) as FromRow>::from_values(&values, 0).unwrap_err();
        assert_eq!(err, DecodeError::UnexpectedNull(1));
    }

    #[test]
    fn type_mismatch_names_both_sides() {
        let values = vec![Value::Text("x".into())];
        let err = <(i64, ()) as FromRow>::from_values(&values, 0).unwrap_err();
        assert!(matches!(err, DecodeError::UnexpectedType { ordinal: 1, .. }));
    }
}
