use compact_str::CompactString;
use thiserror::Error;

use crate::expr::func::Arity;
use crate::types::TypeTag;

/// Errors detected while building a statement tree.
///
/// These are programmer errors: a tree that fails construction never reaches
/// rendering or execution.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum BuildError {
    /// A column name appears twice in one column set or insert column list
    #[error("duplicate column \"{0}\"")]
    DuplicateColumn(CompactString),

    /// A column reference points at a table absent from the statement scope,
    /// or a name lookup missed the table's column set
    #[error("column \"{column}\" is not in scope for table \"{table}\"")]
    UnknownTableColumn {
        table: CompactString,
        column: CompactString,
    },

    /// A non-aggregated selection expression references columns outside the
    /// GROUP BY keys
    #[error("expression references columns outside the GROUP BY keys: {0}")]
    GroupByViolation(String),

    /// Operand types are incompatible with the operator or target column
    #[error("type mismatch: expected {expected}, got {actual}")]
    TypeMismatch { expected: TypeTag, actual: TypeTag },

    /// A function application has the wrong number of arguments
    #[error("function {function} expects {expected} arguments, got {actual}")]
    ArityMismatch {
        function: CompactString,
        expected: Arity,
        actual: usize,
    },

    /// A nullable tag was wrapped in another nullable tag
    #[error("nullable type tags do not nest")]
    NullableNesting,

    /// A selection with no expressions
    #[error("selection must contain at least one expression")]
    EmptySelection,

    /// Row shapes that must agree do not (set operations, insert sources,
    /// literal row lists)
    #[error("row shape mismatch: {0}")]
    ShapeMismatch(String),

    /// A function or dialect-specific type has no handler in the target
    /// dialect
    #[error("dialect {dialect} does not support {feature}")]
    UnsupportedForDialect {
        dialect: CompactString,
        feature: CompactString,
    },

    /// The same column is assigned twice in one UPDATE
    #[error("column \"{0}\" is assigned more than once")]
    DuplicateAssignment(CompactString),

    /// A NULL literal supplied where the target column is not nullable
    #[error("NULL supplied for non-nullable column \"{0}\"")]
    NullForNonNullable(CompactString),

    /// An aliased expression used below selection top level
    #[error("aliased expressions are only legal at selection top level")]
    AliasNotTopLevel,

    /// A literal row source with no rows
    #[error("literal row source must contain at least one row")]
    EmptyRows,
}

/// Errors produced while decoding cursor rows into typed tuples.
///
/// The row stream terminates with its first decode error; no partial row is
/// ever delivered.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum DecodeError {
    /// NULL arrived in a slot whose tag is not nullable
    #[error("unexpected NULL in column {0}")]
    UnexpectedNull(usize),

    /// The driver reported a column kind incompatible with the expected tag
    #[error("column {ordinal}: expected {expected}, driver reported {actual}")]
    UnexpectedType {
        ordinal: usize,
        expected: CompactString,
        actual: CompactString,
    },

    /// A 1-based ordinal beyond the cursor's column count
    #[error("column ordinal {0} is out of range")]
    MissingColumn(usize),

    /// The cursor was consumed or closed before the access
    #[error("cursor is closed")]
    Closed,
}

impl DecodeError {
    pub(crate) fn unexpected_type(
        ordinal: usize,
        expected: impl Into<CompactString>,
        actual: impl Into<CompactString>,
    ) -> Self {
        DecodeError::UnexpectedType {
            ordinal,
            expected: expected.into(),
            actual: actual.into(),
        }
    }
}
