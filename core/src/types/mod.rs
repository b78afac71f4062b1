//! Scalar type tags shared by the renderer and the row decoder.
//!
//! A [`TypeTag`] is a closed discriminator over the scalar types a column or
//! expression can carry. The same tag drives two independent concerns: the
//! canonical SQL literal form (see [`crate::dialect`]) and the cursor
//! extraction primitive (see [`crate::row`]).

pub(crate) mod temporal;
mod value;

pub use value::Value;

use core::fmt;

use compact_str::CompactString;

use crate::error::BuildError;

/// Closed enumeration of supported scalar types plus the nullable wrapper.
///
/// `Nullable` never nests: use [`TypeTag::nullable`], which collapses double
/// wrapping. Hand-built `Nullable(Nullable(_))` values are rejected wherever
/// a tag enters a statement tree.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum TypeTag {
    Bool,
    Byte,
    Short,
    Int,
    Long,
    Float,
    Double,
    Decimal,
    Char,
    Text,
    Bytes,
    Uuid,
    Date,
    Time,
    DateTime,
    Instant,
    OffsetTime,
    OffsetDateTime,
    ZonedDateTime,
    /// An engine-specific type; rendering and extraction are delegated to the
    /// dialect's registered handlers.
    Dialect(CompactString),
    Nullable(Box<TypeTag>),
}

impl TypeTag {
    /// Wraps a tag in `Nullable`, collapsing double wrapping.
    pub fn nullable(tag: TypeTag) -> TypeTag {
        match tag {
            TypeTag::Nullable(_) => tag,
            other => TypeTag::Nullable(Box::new(other)),
        }
    }

    /// Returns this tag lifted to nullable.
    pub fn lifted(&self) -> TypeTag {
        TypeTag::nullable(self.clone())
    }

    pub fn is_nullable(&self) -> bool {
        matches!(self, TypeTag::Nullable(_))
    }

    /// The tag with any nullable wrapper stripped.
    pub fn base(&self) -> &TypeTag {
        match self {
            TypeTag::Nullable(inner) => inner,
            other => other,
        }
    }

    /// True for tags that participate in arithmetic.
    pub fn is_numeric(&self) -> bool {
        matches!(
            self.base(),
            TypeTag::Byte
                | TypeTag::Short
                | TypeTag::Int
                | TypeTag::Long
                | TypeTag::Float
                | TypeTag::Double
                | TypeTag::Decimal
        )
    }

    /// True for text-like tags (LIKE, string functions).
    pub fn is_textual(&self) -> bool {
        matches!(self.base(), TypeTag::Char | TypeTag::Text)
    }

    pub fn is_boolean(&self) -> bool {
        matches!(self.base(), TypeTag::Bool)
    }

    pub fn is_temporal(&self) -> bool {
        matches!(
            self.base(),
            TypeTag::Date
                | TypeTag::Time
                | TypeTag::DateTime
                | TypeTag::Instant
                | TypeTag::OffsetTime
                | TypeTag::OffsetDateTime
                | TypeTag::ZonedDateTime
        )
    }

    /// Whether two tags denote the same scalar type modulo nullability.
    pub fn same_base(&self, other: &TypeTag) -> bool {
        self.base() == other.base()
    }

    /// Rejects hand-built nested nullable wrappers.
    ///
    /// [`TypeTag::nullable`] cannot produce nesting; the enum constructor can.
    pub(crate) fn validate(&self) -> Result<(), BuildError> {
        match self {
            TypeTag::Nullable(inner) => {
                if inner.is_nullable() {
                    Err(BuildError::NullableNesting)
                } else {
                    inner.validate()
                }
            }
            _ => Ok(()),
        }
    }
}

impl fmt::Display for TypeTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TypeTag::Bool => f.write_str("Bool"),
            TypeTag::Byte => f.write_str("Byte"),
            TypeTag::Short => f.write_str("Short"),
            TypeTag::Int => f.write_str("Int"),
            TypeTag::Long => f.write_str("Long"),
            TypeTag::Float => f.write_str("Float"),
            TypeTag::Double => f.write_str("Double"),
            TypeTag::Decimal => f.write_str("Decimal"),
            TypeTag::Char => f.write_str("Char"),
            TypeTag::Text => f.write_str("Text"),
            TypeTag::Bytes => f.write_str("Bytes"),
            TypeTag::Uuid => f.write_str("Uuid"),
            TypeTag::Date => f.write_str("Date"),
            TypeTag::Time => f.write_str("Time"),
            TypeTag::DateTime => f.write_str("DateTime"),
            TypeTag::Instant => f.write_str("Instant"),
            TypeTag::OffsetTime => f.write_str("OffsetTime"),
            TypeTag::OffsetDateTime => f.write_str("OffsetDateTime"),
            TypeTag::ZonedDateTime => f.write_str("ZonedDateTime"),
            TypeTag::Dialect(name) => write!(f, "Dialect({name})"),
            TypeTag::Nullable(inner) => write!(f, "Nullable<{inner}>"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn nullable_collapses_double_wrap() {
        let once = TypeTag::nullable(TypeTag::Int);
        let twice = TypeTag::nullable(once.clone());
        assert_eq!(once, twice);
        assert_eq!(twice.base(), &TypeTag::Int);
    }

    #[test]
    fn hand_built_nesting_is_rejected() {
        let nested = TypeTag::Nullable(Box::new(TypeTag::Nullable(Box::new(TypeTag::Int))));
        assert_eq!(nested.validate(), Err(BuildError::NullableNesting));
        assert!(TypeTag::nullable(TypeTag::Int).validate().is_ok());
    }

    #[test]
    fn classification_sees_through_nullable() {
        assert!(TypeTag::nullable(TypeTag::Double).is_numeric());
        assert!(TypeTag::nullable(TypeTag::Text).is_textual());
        assert!(!TypeTag::Bytes.is_numeric());
        assert!(TypeTag::nullable(TypeTag::Date).is_temporal());
    }
}
