//! Dialect descriptors.
//!
//! A [`Dialect`] is a value: a bundle of rendering hooks (identifier quoting,
//! literal forms, pagination syntax, function names) plus the dialect-scoped
//! function registry and extractors for engine-specific types. The renderer
//! touches dialects only through this surface and never inspects which engine
//! it is talking to.

use compact_str::CompactString;
use std::collections::HashMap;
use std::fmt::Write;

use crate::error::{BuildError, DecodeError};
use crate::expr::func::FunctionRegistry;
use crate::row::RowAccess;
use crate::types::{temporal, Value};

/// Extraction hook for [`crate::types::TypeTag::Dialect`] columns.
pub type DialectExtractFn = fn(&dyn RowAccess, usize) -> Result<Value, DecodeError>;

/// A parameter bundle customizing SQL text for one target engine.
#[derive(Clone)]
pub struct Dialect {
    name: &'static str,
    functions: FunctionRegistry,
    extractors: HashMap<CompactString, DialectExtractFn>,
    boolean_literal: fn(bool) -> &'static str,
    bytes_literal: fn(&[u8], &mut String),
    decimal_literal: fn(&rust_decimal::Decimal, &mut String),
    temporal_literal: fn(&Value, &mut String),
    limit_clause: fn(Option<u64>, Option<u64>) -> String,
    function_name: fn(&str) -> Option<&'static str>,
}

impl core::fmt::Debug for Dialect {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("Dialect").field("name", &self.name).finish()
    }
}

impl Dialect {
    /// ANSI-flavored profile: TRUE/FALSE booleans, prefixed temporal
    /// literals, `FETCH FIRST ... ROWS ONLY` pagination.
    pub fn ansi() -> Dialect {
        Dialect {
            name: "ansi",
            functions: FunctionRegistry::baseline(),
            extractors: HashMap::new(),
            boolean_literal: |b| if b { "TRUE" } else { "FALSE" },
            bytes_literal: write_hex_x_literal,
            decimal_literal: write_bare_decimal,
            temporal_literal: write_prefixed_temporal,
            limit_clause: fetch_first_clause,
            function_name: |_| None,
        }
    }

    /// SQLite profile: 1/0 booleans, bare quoted temporal strings,
    /// `LIMIT ... OFFSET ...` pagination, `SUBSTR`.
    pub fn sqlite() -> Dialect {
        Dialect {
            name: "sqlite",
            functions: FunctionRegistry::baseline(),
            extractors: HashMap::new(),
            boolean_literal: |b| if b { "1" } else { "0" },
            bytes_literal: write_hex_x_literal,
            // a bare numeric literal would pass through SQLite's f64 parser
            // and lose digits; text keeps decimals exact
            decimal_literal: write_quoted_decimal,
            temporal_literal: write_plain_temporal,
            limit_clause: sqlite_limit_clause,
            function_name: |name| match name {
                "SUBSTRING" => Some("SUBSTR"),
                _ => None,
            },
        }
    }

    /// PostgreSQL profile: TRUE/FALSE booleans, prefixed temporal literals,
    /// `'\x...'` bytea form, `LIMIT ... OFFSET ...` pagination.
    pub fn postgres() -> Dialect {
        Dialect {
            name: "postgres",
            functions: FunctionRegistry::baseline(),
            extractors: HashMap::new(),
            boolean_literal: |b| if b { "TRUE" } else { "FALSE" },
            bytes_literal: write_hex_escape_literal,
            decimal_literal: write_bare_decimal,
            temporal_literal: write_prefixed_temporal,
            limit_clause: postgres_limit_clause,
            function_name: |_| None,
        }
    }

    pub fn name(&self) -> &'static str {
        self.name
    }

    /// Registers an engine-specific function, consuming and returning the
    /// descriptor so dialect packs can chain extensions.
    pub fn with_function(mut self, name: &str, sig: crate::expr::func::FunctionSig) -> Self {
        self.functions.register(name, sig);
        self
    }

    /// Registers an extractor for a [`crate::types::TypeTag::Dialect`] type.
    pub fn with_extractor(mut self, type_name: &str, extract: DialectExtractFn) -> Self {
        self.extractors.insert(CompactString::new(type_name), extract);
        self
    }

    pub fn functions(&self) -> &FunctionRegistry {
        &self.functions
    }

    pub(crate) fn extractor(&self, type_name: &str) -> Option<DialectExtractFn> {
        self.extractors.get(type_name).copied()
    }

    // ==================== identifiers ====================

    /// Reserved words and names containing anything outside `[A-Za-z0-9_]`
    /// (including all non-ASCII) force quoting.
    pub fn needs_quote(&self, ident: &str) -> bool {
        let mut chars = ident.chars();
        let Some(first) = chars.next() else {
            return true;
        };
        if !(first.is_ascii_alphabetic() || first == '_') {
            return true;
        }
        if !chars.all(|c| c.is_ascii_alphanumeric() || c == '_') {
            return true;
        }
        RESERVED
            .iter()
            .any(|kw| kw.eq_ignore_ascii_case(ident))
    }

    /// Quotes and escapes unconditionally.
    pub fn quote_ident(&self, ident: &str) -> String {
        let mut out = String::with_capacity(ident.len() + 2);
        out.push('"');
        for c in ident.chars() {
            if c == '"' {
                out.push('"');
            }
            out.push(c);
        }
        out.push('"');
        out
    }

    /// Writes an identifier, quoting only when needed.
    pub fn write_ident(&self, ident: &str, out: &mut String) {
        if self.needs_quote(ident) {
            out.push_str(&self.quote_ident(ident));
        } else {
            out.push_str(ident);
        }
    }

    // ==================== literals ====================

    pub fn boolean_literal(&self, value: bool) -> &'static str {
        (self.boolean_literal)(value)
    }

    /// Writes a temporal literal in this dialect's form.
    pub fn temporal_literal(&self, value: &Value, out: &mut String) {
        (self.temporal_literal)(value, out)
    }

    /// Writes any literal value as SQL text.
    pub fn render_literal(&self, value: &Value, out: &mut String) {
        match value {
            Value::Null => out.push_str("NULL"),
            Value::Bool(b) => out.push_str(self.boolean_literal(*b)),
            Value::Byte(v) => {
                let _ = write!(out, "{v}");
            }
            Value::Short(v) => {
                let _ = write!(out, "{v}");
            }
            Value::Int(v) => {
                let _ = write!(out, "{v}");
            }
            Value::Long(v) => {
                let _ = write!(out, "{v}");
            }
            Value::Float(v) => write_float(f64::from(*v), out),
            Value::Double(v) => write_float(*v, out),
            Value::Decimal(v) => (self.decimal_literal)(v, out),
            Value::Char(c) => {
                let mut buf = [0u8; 4];
                write_quoted(c.encode_utf8(&mut buf), out);
            }
            Value::Text(s) => write_quoted(s, out),
            Value::Bytes(b) => (self.bytes_literal)(b, out),
            Value::Uuid(u) => {
                let mut buf = String::with_capacity(36);
                let _ = write!(buf, "{u}");
                write_quoted(&buf, out);
            }
            Value::Date(_)
            | Value::Time(_)
            | Value::DateTime(_)
            | Value::Instant(_)
            | Value::OffsetTime(..)
            | Value::OffsetDateTime(_)
            | Value::ZonedDateTime(_) => self.temporal_literal(value, out),
        }
    }

    // ==================== clauses ====================

    /// The pagination clause, or an empty string when neither bound is set.
    pub fn render_limit(&self, limit: Option<u64>, offset: Option<u64>) -> String {
        (self.limit_clause)(limit, offset)
    }

    /// Formats a registered function call; unknown names are a construction
    /// error for this dialect.
    pub fn render_function(&self, name: &str, args: &[String]) -> Result<String, BuildError> {
        if !self.functions.contains(name) {
            return Err(BuildError::UnsupportedForDialect {
                dialect: CompactString::new(self.name),
                feature: CompactString::new(name),
            });
        }
        let rendered = (self.function_name)(name).unwrap_or(name);
        let mut out = String::with_capacity(rendered.len() + 2 + args.len() * 8);
        out.push_str(rendered);
        out.push('(');
        for (i, arg) in args.iter().enumerate() {
            if i > 0 {
                out.push_str(", ");
            }
            out.push_str(arg);
        }
        out.push(')');
        Ok(out)
    }
}

// =============================================================================
// Hook implementations
// =============================================================================

fn write_quoted(s: &str, out: &mut String) {
    out.push('\'');
    for c in s.chars() {
        if c == '\'' {
            out.push('\'');
        }
        out.push(c);
    }
    out.push('\'');
}

fn write_float(value: f64, out: &mut String) {
    if !value.is_finite() {
        out.push_str("NULL");
    } else if value.fract() == 0.0 && value.abs() < 1e15 {
        let _ = write!(out, "{value:.1}");
    } else {
        let _ = write!(out, "{value}");
    }
}

fn write_bare_decimal(value: &rust_decimal::Decimal, out: &mut String) {
    let _ = write!(out, "{value}");
}

fn write_quoted_decimal(value: &rust_decimal::Decimal, out: &mut String) {
    let mut body = String::with_capacity(24);
    let _ = write!(body, "{value}");
    write_quoted(&body, out);
}

/// `X'AB12'`
fn write_hex_x_literal(bytes: &[u8], out: &mut String) {
    out.push_str("X'");
    for b in bytes {
        let _ = write!(out, "{b:02X}");
    }
    out.push('\'');
}

/// `'\xAB12'` (PostgreSQL bytea)
fn write_hex_escape_literal(bytes: &[u8], out: &mut String) {
    out.push_str("'\\x");
    for b in bytes {
        let _ = write!(out, "{b:02X}");
    }
    out.push('\'');
}

/// ISO-8601 body inside a type-prefixed quote: `DATE '2024-03-09'`.
fn write_prefixed_temporal(value: &Value, out: &mut String) {
    let mut body = String::new();
    let prefix = temporal_body(value, &mut body);
    out.push_str(prefix);
    out.push(' ');
    write_quoted(&body, out);
}

/// Bare quoted ISO-8601 body: `'2024-03-09'` (SQLite stores temporals as
/// text).
fn write_plain_temporal(value: &Value, out: &mut String) {
    let mut body = String::new();
    temporal_body(value, &mut body);
    write_quoted(&body, out);
}

fn temporal_body(value: &Value, out: &mut String) -> &'static str {
    match value {
        Value::Date(d) => {
            let _ = write!(out, "{}", d.format("%Y-%m-%d"));
            "DATE"
        }
        Value::Time(t) => {
            temporal::write_time(t, out);
            "TIME"
        }
        Value::DateTime(dt) => {
            temporal::write_datetime(dt, out);
            "TIMESTAMP"
        }
        Value::Instant(i) => {
            temporal::write_datetime(&i.naive_utc(), out);
            out.push_str("+00:00");
            "TIMESTAMP"
        }
        Value::OffsetTime(t, offset) => {
            temporal::write_time(t, out);
            temporal::write_offset(offset, out);
            "TIME"
        }
        Value::OffsetDateTime(dt) | Value::ZonedDateTime(dt) => {
            temporal::write_datetime(&dt.naive_local(), out);
            temporal::write_offset(dt.offset(), out);
            "TIMESTAMP"
        }
        _ => "",
    }
}

fn sqlite_limit_clause(limit: Option<u64>, offset: Option<u64>) -> String {
    match (limit, offset) {
        (None, None) => String::new(),
        (Some(n), None) => format!("LIMIT {n}"),
        (Some(n), Some(m)) => format!("LIMIT {n} OFFSET {m}"),
        // SQLite has no bare OFFSET; -1 means unlimited
        (None, Some(m)) => format!("LIMIT -1 OFFSET {m}"),
    }
}

fn postgres_limit_clause(limit: Option<u64>, offset: Option<u64>) -> String {
    match (limit, offset) {
        (None, None) => String::new(),
        (Some(n), None) => format!("LIMIT {n}"),
        (Some(n), Some(m)) => format!("LIMIT {n} OFFSET {m}"),
        (None, Some(m)) => format!("OFFSET {m}"),
    }
}

fn fetch_first_clause(limit: Option<u64>, offset: Option<u64>) -> String {
    match (limit, offset) {
        (None, None) => String::new(),
        (Some(n), None) => format!("FETCH FIRST {n} ROWS ONLY"),
        (Some(n), Some(m)) => format!("OFFSET {m} ROWS FETCH FIRST {n} ROWS ONLY"),
        (None, Some(m)) => format!("OFFSET {m} ROWS"),
    }
}

/// Words that force identifier quoting in any profile.
const RESERVED: &[&str] = &[
    "ALL", "AND", "AS", "ASC", "BETWEEN", "BY", "CASE", "CAST", "CHECK", "COLUMN", "CONSTRAINT",
    "CREATE", "CROSS", "CURRENT", "DEFAULT", "DELETE", "DESC", "DISTINCT", "DROP", "ELSE", "END",
    "EXCEPT", "EXISTS", "FALSE", "FETCH", "FOREIGN", "FROM", "FULL", "GROUP", "HAVING", "IN",
    "INNER", "INSERT", "INTERSECT", "INTO", "IS", "JOIN", "KEY", "LEFT", "LIKE", "LIMIT", "NOT",
    "NULL", "OFFSET", "ON", "OR", "ORDER", "OUTER", "PRIMARY", "REFERENCES", "RIGHT", "SELECT",
    "SET", "TABLE", "THEN", "TO", "TRUE", "UNION", "UNIQUE", "UPDATE", "USER", "USING", "VALUES",
    "WHEN", "WHERE", "WITH",
];
