/// SQL keywords, operators, and punctuation emitted by the renderer.
///
/// Tokens carry their text and their spacing behavior; the writer inserts a
/// single space between two adjacent chunks only when the left side wants a
/// space after and the right side wants one before.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Token {
    Select,
    From,
    Where,
    GroupBy,
    Having,
    OrderBy,
    Union,
    UnionAll,
    As,
    On,
    And,
    Or,
    Not,
    In,
    NotIn,
    Is,
    IsNull,
    IsNotNull,
    Null,
    Like,
    Case,
    When,
    Then,
    Else,
    End,
    InsertInto,
    Values,
    Update,
    Set,
    DeleteFrom,
    Distinct,
    Asc,
    Desc,
    NullsFirst,
    NullsLast,
    LParen,
    RParen,
    Comma,
    Dot,
    Eq,
    Ne,
    Lt,
    Le,
    Gt,
    Ge,
    Plus,
    Minus,
    Star,
    Slash,
    Percent,
}

impl Token {
    pub const fn as_str(&self) -> &'static str {
        match self {
            Token::Select => "SELECT",
            Token::From => "FROM",
            Token::Where => "WHERE",
            Token::GroupBy => "GROUP BY",
            Token::Having => "HAVING",
            Token::OrderBy => "ORDER BY",
            Token::Union => "UNION",
            Token::UnionAll => "UNION ALL",
            Token::As => "AS",
            Token::On => "ON",
            Token::And => "AND",
            Token::Or => "OR",
            Token::Not => "NOT",
            Token::In => "IN",
            Token::NotIn => "NOT IN",
            Token::Is => "IS",
            Token::IsNull => "IS NULL",
            Token::IsNotNull => "IS NOT NULL",
            Token::Null => "NULL",
            Token::Like => "LIKE",
            Token::Case => "CASE",
            Token::When => "WHEN",
            Token::Then => "THEN",
            Token::Else => "ELSE",
            Token::End => "END",
            Token::InsertInto => "INSERT INTO",
            Token::Values => "VALUES",
            Token::Update => "UPDATE",
            Token::Set => "SET",
            Token::DeleteFrom => "DELETE FROM",
            Token::Distinct => "DISTINCT",
            Token::Asc => "ASC",
            Token::Desc => "DESC",
            Token::NullsFirst => "NULLS FIRST",
            Token::NullsLast => "NULLS LAST",
            Token::LParen => "(",
            Token::RParen => ")",
            Token::Comma => ",",
            Token::Dot => ".",
            Token::Eq => "=",
            Token::Ne => "<>",
            Token::Lt => "<",
            Token::Le => "<=",
            Token::Gt => ">",
            Token::Ge => ">=",
            Token::Plus => "+",
            Token::Minus => "-",
            Token::Star => "*",
            Token::Slash => "/",
            Token::Percent => "%",
        }
    }

    /// (space wanted before, space wanted after)
    pub(crate) const fn spacing(&self) -> (bool, bool) {
        match self {
            Token::LParen => (true, false),
            Token::RParen => (false, true),
            Token::Comma => (false, true),
            Token::Dot => (false, false),
            _ => (true, true),
        }
    }
}
