use std::borrow::Cow;

use compact_str::CompactString;

use crate::dialect::Dialect;
use crate::sql::Token;

/// One piece of an SQL statement.
///
/// - `Token` - keywords, operators, punctuation
/// - `Ident` - identifiers, quoted on demand by the dialect
/// - `Raw` - pre-rendered text emitted as-is (literals, function calls,
///   pagination clauses)
#[derive(Debug, Clone, PartialEq)]
pub enum SqlChunk {
    Token(Token),
    Ident(CompactString),
    Raw(Cow<'static, str>),
}

impl SqlChunk {
    #[inline]
    pub fn ident(name: impl Into<CompactString>) -> Self {
        SqlChunk::Ident(name.into())
    }

    #[inline]
    pub fn raw(text: impl Into<Cow<'static, str>>) -> Self {
        SqlChunk::Raw(text.into())
    }

    /// (space wanted before, space wanted after)
    pub(crate) fn spacing(&self) -> (bool, bool) {
        match self {
            SqlChunk::Token(t) => t.spacing(),
            SqlChunk::Ident(_) | SqlChunk::Raw(_) => (true, true),
        }
    }

    pub(crate) fn write(&self, dialect: &Dialect, out: &mut String) {
        match self {
            SqlChunk::Token(t) => out.push_str(t.as_str()),
            SqlChunk::Ident(name) => dialect.write_ident(name, out),
            SqlChunk::Raw(text) => out.push_str(text),
        }
    }
}

impl From<Token> for SqlChunk {
    #[inline]
    fn from(value: Token) -> Self {
        SqlChunk::Token(value)
    }
}
