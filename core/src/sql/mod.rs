//! SQL fragment assembly.
//!
//! Statement rendering builds a flat chunk buffer rather than a string so the
//! writer can apply identifier quoting and spacing rules in one place. The
//! buffer uses inline storage for typical fragment sizes.

mod chunk;
mod tokens;

pub use chunk::SqlChunk;
pub use tokens::Token;

use std::borrow::Cow;

use compact_str::CompactString;
use smallvec::SmallVec;

use crate::dialect::Dialect;

/// A flat sequence of SQL chunks.
#[derive(Debug, Clone, Default)]
pub struct Sql {
    pub(crate) chunks: SmallVec<[SqlChunk; 8]>,
}

impl Sql {
    /// An empty fragment.
    #[inline]
    pub const fn empty() -> Self {
        Self {
            chunks: SmallVec::new_const(),
        }
    }

    /// A fragment holding a single token.
    #[inline]
    pub fn token(t: Token) -> Self {
        Self {
            chunks: smallvec::smallvec![SqlChunk::Token(t)],
        }
    }

    /// A fragment holding one identifier, quoted on demand at write time.
    #[inline]
    pub fn ident(name: impl Into<CompactString>) -> Self {
        Self {
            chunks: smallvec::smallvec![SqlChunk::Ident(name.into())],
        }
    }

    /// A fragment holding pre-rendered text.
    #[inline]
    pub fn raw(text: impl Into<Cow<'static, str>>) -> Self {
        Self {
            chunks: smallvec::smallvec![SqlChunk::Raw(text.into())],
        }
    }

    /// Appends another fragment (flat extend).
    #[inline]
    pub fn append(mut self, other: Sql) -> Self {
        self.chunks.reserve(other.chunks.len());
        self.chunks.extend(other.chunks);
        self
    }

    /// Pushes a single chunk.
    #[inline]
    pub fn push(mut self, chunk: impl Into<SqlChunk>) -> Self {
        self.chunks.push(chunk.into());
        self
    }

    /// Wraps this fragment in parentheses.
    #[inline]
    pub fn parens(self) -> Self {
        Sql::token(Token::LParen).append(self).push(Token::RParen)
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.chunks.is_empty()
    }

    /// Joins fragments with a separator token.
    pub fn join(items: impl IntoIterator<Item = Sql>, separator: Token) -> Sql {
        let mut iter = items.into_iter();
        let Some(first) = iter.next() else {
            return Sql::empty();
        };
        let mut result = first;
        for item in iter {
            result = result.push(separator).append(item);
        }
        result
    }

    /// Writes the fragment as SQL text, applying the dialect's identifier
    /// quoting and the chunk spacing rules.
    pub fn text(&self, dialect: &Dialect) -> String {
        let mut out = String::with_capacity(self.chunks.len() * 8);
        let mut want_space = false;
        for chunk in &self.chunks {
            let (before, after) = chunk.spacing();
            if want_space && before && !out.is_empty() {
                out.push(' ');
            }
            chunk.write(dialect, &mut out);
            want_space = after;
        }
        out
    }
}

impl From<Token> for Sql {
    #[inline]
    fn from(value: Token) -> Self {
        Sql::token(value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dialect::Dialect;

    #[test]
    fn writer_spaces_words_but_not_punctuation() {
        let sql = Sql::token(Token::Select)
            .push(SqlChunk::ident("users"))
            .push(Token::Dot)
            .push(SqlChunk::ident("id"))
            .push(Token::Comma)
            .push(SqlChunk::ident("name"))
            .push(Token::From)
            .push(SqlChunk::ident("users"));
        assert_eq!(
            sql.text(&Dialect::sqlite()),
            "SELECT users.id, users.name FROM users"
        );
    }

    #[test]
    fn parens_hug_their_contents() {
        let sql = Sql::token(Token::In).append(Sql::raw("'a'").push(Token::Comma).append(Sql::raw("'b'")).parens());
        assert_eq!(sql.text(&Dialect::sqlite()), "IN ('a', 'b')");
    }
}
