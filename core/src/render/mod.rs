//! Statement rendering.
//!
//! `render` walks a statement tree and assembles a chunk buffer, consulting
//! the dialect only through its hook surface. Rendering is pure and total
//! for well-formed trees; the single failure mode is a dialect-specific
//! feature with no registered handler, which propagates as a construction
//! error.
//!
//! Parenthesization uses an explicit precedence table: a child is wrapped
//! when its precedence is below its parent's, or equal in a non-associative
//! position (the right side of a left-associative operator, either side of a
//! comparison).

use compact_str::CompactString;
use std::collections::HashMap;

use crate::dialect::Dialect;
use crate::error::BuildError;
use crate::expr::{AggregateFunc, BinaryOp, Expr, ExprKind, UnaryOp};
use crate::query::{
    Delete, Direction, Insert, InsertSource, NullsOrder, OrderKey, Read, SelectStatement, Update,
};
use crate::schema::Table;
use crate::source::TableSource;
use crate::sql::{Sql, SqlChunk, Token};
use crate::types::{TypeTag, Value};

/// Statement trees that render to SQL text for a dialect.
pub trait ToSqlText {
    fn sql_text(&self, dialect: &Dialect) -> Result<String, BuildError>;
}

/// Marker for statements executed for their row count.
pub trait MutationStatement: ToSqlText {}

impl ToSqlText for Read {
    fn sql_text(&self, dialect: &Dialect) -> Result<String, BuildError> {
        render_read(self, dialect)
    }
}

impl ToSqlText for Insert {
    fn sql_text(&self, dialect: &Dialect) -> Result<String, BuildError> {
        render_insert(self, dialect)
    }
}

impl ToSqlText for Update {
    fn sql_text(&self, dialect: &Dialect) -> Result<String, BuildError> {
        render_update(self, dialect)
    }
}

impl ToSqlText for Delete {
    fn sql_text(&self, dialect: &Dialect) -> Result<String, BuildError> {
        render_delete(self, dialect)
    }
}

impl MutationStatement for Insert {}
impl MutationStatement for Update {}
impl MutationStatement for Delete {}

/// Renders a read tree.
pub fn render_read(read: &Read, dialect: &Dialect) -> Result<String, BuildError> {
    check_dialect_tags(read, dialect)?;
    let sql = read_fragment(read, dialect)?;
    Ok(sql.text(dialect))
}

/// Renders an insert.
pub fn render_insert(insert: &Insert, dialect: &Dialect) -> Result<String, BuildError> {
    let mut sql = Sql::token(Token::InsertInto)
        .push(SqlChunk::ident(insert.table.name()))
        .append(
            Sql::join(
                insert.columns.iter().map(|&ordinal| {
                    Sql::ident(column_name(&insert.table, ordinal))
                }),
                Token::Comma,
            )
            .parens(),
        );
    match &insert.source {
        InsertSource::Rows(rows) => {
            sql = sql
                .push(Token::Values)
                .append(rows_fragment(rows, dialect));
        }
        InsertSource::Query(read) => {
            check_dialect_tags(read, dialect)?;
            sql = sql.append(read_fragment(read, dialect)?);
        }
    }
    Ok(sql.text(dialect))
}

/// Renders an update.
pub fn render_update(update: &Update, dialect: &Dialect) -> Result<String, BuildError> {
    let renderer = Renderer::for_table(dialect, &update.table);
    let assignments = update
        .assignments
        .iter()
        .map(|(ordinal, value)| {
            Ok(Sql::ident(column_name(&update.table, *ordinal))
                .push(Token::Eq)
                .append(renderer.expr(value, 0, false)?))
        })
        .collect::<Result<Vec<_>, BuildError>>()?;
    let mut sql = Sql::token(Token::Update)
        .push(SqlChunk::ident(update.table.name()))
        .push(Token::Set)
        .append(Sql::join(assignments, Token::Comma));
    if let Some(filter) = &update.filter {
        sql = sql
            .push(Token::Where)
            .append(renderer.expr(filter, 0, false)?);
    }
    Ok(sql.text(dialect))
}

/// Renders a delete.
pub fn render_delete(delete: &Delete, dialect: &Dialect) -> Result<String, BuildError> {
    let renderer = Renderer::for_table(dialect, &delete.table);
    let mut sql = Sql::token(Token::DeleteFrom).push(SqlChunk::ident(delete.table.name()));
    if let Some(filter) = &delete.filter {
        sql = sql
            .push(Token::Where)
            .append(renderer.expr(filter, 0, false)?);
    }
    Ok(sql.text(dialect))
}

/// Renders a bare expression, qualifying columns by table name. Intended for
/// diagnostics and tests; statements assign self-join aliases themselves.
pub fn expr_text(expr: &Expr, dialect: &Dialect) -> Result<String, BuildError> {
    let renderer = Renderer {
        dialect,
        aliases: HashMap::new(),
    };
    Ok(renderer.expr(expr, 0, false)?.text(dialect))
}

fn column_name(table: &Table, ordinal: usize) -> CompactString {
    table
        .columns()
        .get(ordinal)
        .map(|c| CompactString::new(c.name()))
        .unwrap_or_default()
}

/// A dialect-specific type in the selection must have a registered handler.
fn check_dialect_tags(read: &Read, dialect: &Dialect) -> Result<(), BuildError> {
    for tag in read.tags() {
        if let TypeTag::Dialect(name) = tag.base() {
            if dialect.extractor(name).is_none() {
                return Err(BuildError::UnsupportedForDialect {
                    dialect: CompactString::new(dialect.name()),
                    feature: name.clone(),
                });
            }
        }
    }
    Ok(())
}

fn read_fragment(read: &Read, dialect: &Dialect) -> Result<Sql, BuildError> {
    match read {
        Read::Select(stmt) => select_fragment(stmt, dialect),
        Read::Union { left, right, all } => {
            let token = if *all { Token::UnionAll } else { Token::Union };
            Ok(union_operand(left, dialect)?
                .push(token)
                .append(union_operand(right, dialect)?))
        }
        Read::Values(rows) => Ok(Sql::token(Token::Values).append(rows_fragment(&rows.rows, dialect))),
    }
}

/// Set-operation operands keep their parens unless already minimal: a plain
/// SELECT without ORDER BY or pagination, or a literal row source.
fn union_operand(read: &Read, dialect: &Dialect) -> Result<Sql, BuildError> {
    let minimal = match read {
        Read::Select(stmt) => {
            stmt.order_by.is_empty() && stmt.limit.is_none() && stmt.offset.is_none()
        }
        Read::Values(_) => true,
        Read::Union { .. } => false,
    };
    let sql = read_fragment(read, dialect)?;
    Ok(if minimal { sql } else { sql.parens() })
}

fn rows_fragment(rows: &[Vec<Value>], dialect: &Dialect) -> Sql {
    Sql::join(
        rows.iter().map(|row| {
            Sql::join(
                row.iter().map(|value| {
                    let mut text = String::new();
                    dialect.render_literal(value, &mut text);
                    Sql::raw(text)
                }),
                Token::Comma,
            )
            .parens()
        }),
        Token::Comma,
    )
}

fn select_fragment(stmt: &SelectStatement, dialect: &Dialect) -> Result<Sql, BuildError> {
    let renderer = Renderer::for_source(dialect, &stmt.source);

    let items = stmt
        .selection
        .exprs()
        .iter()
        .map(|e| renderer.expr(e, 0, false))
        .collect::<Result<Vec<_>, _>>()?;
    let mut sql = Sql::token(Token::Select).append(Sql::join(items, Token::Comma));

    sql = sql
        .push(Token::From)
        .append(renderer.source(&stmt.source)?);

    if let Some(filter) = &stmt.filter {
        sql = sql
            .push(Token::Where)
            .append(renderer.expr(filter, 0, false)?);
    }

    if !stmt.group_by.is_empty() {
        let keys = stmt
            .group_by
            .iter()
            .map(|k| renderer.expr(k, 0, false))
            .collect::<Result<Vec<_>, _>>()?;
        sql = sql
            .push(Token::GroupBy)
            .append(Sql::join(keys, Token::Comma));
    }

    if let Some(having) = &stmt.having {
        sql = sql
            .push(Token::Having)
            .append(renderer.expr(having, 0, false)?);
    }

    if !stmt.order_by.is_empty() {
        let keys = stmt
            .order_by
            .iter()
            .map(|k| renderer.order_key(k))
            .collect::<Result<Vec<_>, _>>()?;
        sql = sql
            .push(Token::OrderBy)
            .append(Sql::join(keys, Token::Comma));
    }

    let pagination = dialect.render_limit(stmt.limit, stmt.offset);
    if !pagination.is_empty() {
        sql = sql.append(Sql::raw(pagination));
    }
    Ok(sql)
}

// =============================================================================
// Renderer
// =============================================================================

/// Per-statement rendering state: the dialect plus the display name assigned
/// to each table instance (`name`, `name_2`, ... for repeated relations).
struct Renderer<'d> {
    dialect: &'d Dialect,
    aliases: HashMap<u64, CompactString>,
}

impl<'d> Renderer<'d> {
    fn for_source(dialect: &'d Dialect, source: &TableSource) -> Self {
        let mut aliases = HashMap::new();
        let mut seen: HashMap<CompactString, usize> = HashMap::new();
        for table in source.tables() {
            let name = CompactString::new(table.name());
            let count = seen.entry(name.clone()).or_insert(0);
            *count += 1;
            let display = if *count == 1 {
                name
            } else {
                CompactString::new(format!("{}_{}", name, count))
            };
            aliases.insert(table.instance(), display);
        }
        Renderer { dialect, aliases }
    }

    fn for_table(dialect: &'d Dialect, table: &Table) -> Self {
        let mut aliases = HashMap::new();
        aliases.insert(table.instance(), CompactString::new(table.name()));
        Renderer { dialect, aliases }
    }

    fn display_name(&self, table: &Table) -> CompactString {
        self.aliases
            .get(&table.instance())
            .cloned()
            .unwrap_or_else(|| CompactString::new(table.name()))
    }

    fn source(&self, source: &TableSource) -> Result<Sql, BuildError> {
        match source {
            TableSource::Table(table) => {
                let display = self.display_name(table);
                let mut sql = Sql::ident(table.name());
                if display.as_str() != table.name() {
                    sql = sql.push(Token::As).push(SqlChunk::ident(display));
                }
                Ok(sql)
            }
            TableSource::Join(join) => {
                let left = self.source(&join.left)?;
                let right = match &join.right {
                    // bushy right trees need their own grouping
                    nested @ TableSource::Join(_) => self.source(nested)?.parens(),
                    table => self.source(table)?,
                };
                Ok(left
                    .append(Sql::raw(join.kind.sql_str()))
                    .append(right)
                    .push(Token::On)
                    .append(self.expr(&join.on, 0, false)?))
            }
        }
    }

    fn order_key(&self, key: &OrderKey) -> Result<Sql, BuildError> {
        let mut sql = self.expr(&key.expr, 0, false)?;
        sql = sql.push(match key.direction {
            Direction::Asc => Token::Asc,
            Direction::Desc => Token::Desc,
        });
        if let Some(nulls) = key.nulls {
            sql = sql.push(match nulls {
                NullsOrder::First => Token::NullsFirst,
                NullsOrder::Last => Token::NullsLast,
            });
        }
        Ok(sql)
    }

    /// Renders an expression as a child of a node with precedence `parent`;
    /// `non_assoc` marks positions where equal precedence still needs parens.
    fn expr(&self, expr: &Expr, parent: u8, non_assoc: bool) -> Result<Sql, BuildError> {
        let prec = precedence(expr);
        let sql = self.expr_inner(expr)?;
        if prec < parent || (prec == parent && non_assoc) {
            Ok(sql.parens())
        } else {
            Ok(sql)
        }
    }

    fn expr_inner(&self, expr: &Expr) -> Result<Sql, BuildError> {
        match &expr.kind {
            ExprKind::Literal(value) => {
                let mut text = String::new();
                self.dialect.render_literal(value, &mut text);
                Ok(Sql::raw(text))
            }
            ExprKind::Column { table, ordinal } => Ok(Sql::ident(self.display_name(table))
                .push(Token::Dot)
                .push(SqlChunk::ident(column_name(table, *ordinal)))),
            ExprKind::Unary { op, expr } => match op {
                UnaryOp::Not => Ok(Sql::token(Token::Not).append(self.expr(
                    expr,
                    UNARY_PREC,
                    true,
                )?)),
                UnaryOp::Neg => {
                    let inner = self.expr(expr, NEG_PREC, true)?.text(self.dialect);
                    Ok(Sql::raw(format!("-{inner}")))
                }
            },
            ExprKind::Binary { op, left, right } => {
                let prec = binary_prec(*op);
                let non_assoc_left = is_comparison(*op);
                let left = self.expr(left, prec, non_assoc_left)?;
                let right = self.expr(right, prec, true)?;
                Ok(left.push(binary_token(*op)).append(right))
            }
            ExprKind::Function { name, args } => {
                let rendered = args
                    .iter()
                    .map(|a| Ok(self.expr(a, 0, false)?.text(self.dialect)))
                    .collect::<Result<Vec<_>, BuildError>>()?;
                Ok(Sql::raw(self.dialect.render_function(name, &rendered)?))
            }
            ExprKind::Aggregate { func, expr } => {
                let body = match expr {
                    None => "*".to_string(),
                    Some(e) => {
                        let text = self.expr(e, 0, false)?.text(self.dialect);
                        if *func == AggregateFunc::CountDistinct {
                            format!("DISTINCT {text}")
                        } else {
                            text
                        }
                    }
                };
                Ok(Sql::raw(format!("{}({})", func.name(), body)))
            }
            ExprKind::Case {
                branches,
                otherwise,
            } => {
                let mut sql = Sql::token(Token::Case);
                for (when, then) in branches {
                    sql = sql
                        .push(Token::When)
                        .append(self.expr(when, 0, false)?)
                        .push(Token::Then)
                        .append(self.expr(then, 0, false)?);
                }
                if let Some(e) = otherwise {
                    sql = sql.push(Token::Else).append(self.expr(e, 0, false)?);
                }
                Ok(sql.push(Token::End))
            }
            ExprKind::Coalesce(args) => {
                let rendered = args
                    .iter()
                    .map(|a| Ok(self.expr(a, 0, false)?.text(self.dialect)))
                    .collect::<Result<Vec<_>, BuildError>>()?;
                Ok(Sql::raw(format!("COALESCE({})", rendered.join(", "))))
            }
            ExprKind::InList {
                expr,
                list,
                negated,
            } => {
                let lhs = self.expr(expr, CMP_PREC, true)?;
                let token = if *negated { Token::NotIn } else { Token::In };
                let items = if list.is_empty() {
                    // matches no row, keeps the clause well-formed
                    Sql::token(Token::Null)
                } else {
                    let rendered = list
                        .iter()
                        .map(|i| self.expr(i, 0, false))
                        .collect::<Result<Vec<_>, _>>()?;
                    Sql::join(rendered, Token::Comma)
                };
                Ok(lhs.push(token).append(items.parens()))
            }
            ExprKind::InSubquery {
                expr,
                subquery,
                negated,
            } => {
                let lhs = self.expr(expr, CMP_PREC, true)?;
                let token = if *negated { Token::NotIn } else { Token::In };
                let sub = read_fragment(subquery, self.dialect)?;
                Ok(lhs.push(token).append(sub.parens()))
            }
            ExprKind::IsNull { expr, negated } => {
                let lhs = self.expr(expr, CMP_PREC, true)?;
                let token = if *negated {
                    Token::IsNotNull
                } else {
                    Token::IsNull
                };
                Ok(lhs.push(token))
            }
            ExprKind::Aliased { expr, alias } => {
                let inner = self.expr(expr, 0, false)?;
                // selection aliases are always quoted
                Ok(inner
                    .push(Token::As)
                    .append(Sql::raw(self.dialect.quote_ident(alias))))
            }
        }
    }
}

// =============================================================================
// Precedence table
// =============================================================================

const OR_PREC: u8 = 1;
const AND_PREC: u8 = 2;
const UNARY_PREC: u8 = 3;
const CMP_PREC: u8 = 4;
const ADD_PREC: u8 = 5;
const MUL_PREC: u8 = 6;
const NEG_PREC: u8 = 7;
const ATOM_PREC: u8 = 10;

fn binary_prec(op: BinaryOp) -> u8 {
    match op {
        BinaryOp::Or => OR_PREC,
        BinaryOp::And => AND_PREC,
        BinaryOp::Eq
        | BinaryOp::Ne
        | BinaryOp::Lt
        | BinaryOp::Le
        | BinaryOp::Gt
        | BinaryOp::Ge
        | BinaryOp::Like => CMP_PREC,
        BinaryOp::Add | BinaryOp::Sub => ADD_PREC,
        BinaryOp::Mul | BinaryOp::Div | BinaryOp::Rem => MUL_PREC,
    }
}

fn is_comparison(op: BinaryOp) -> bool {
    binary_prec(op) == CMP_PREC
}

fn binary_token(op: BinaryOp) -> Token {
    match op {
        BinaryOp::Add => Token::Plus,
        BinaryOp::Sub => Token::Minus,
        BinaryOp::Mul => Token::Star,
        BinaryOp::Div => Token::Slash,
        BinaryOp::Rem => Token::Percent,
        BinaryOp::Eq => Token::Eq,
        BinaryOp::Ne => Token::Ne,
        BinaryOp::Lt => Token::Lt,
        BinaryOp::Le => Token::Le,
        BinaryOp::Gt => Token::Gt,
        BinaryOp::Ge => Token::Ge,
        BinaryOp::And => Token::And,
        BinaryOp::Or => Token::Or,
        BinaryOp::Like => Token::Like,
    }
}

fn precedence(expr: &Expr) -> u8 {
    match &expr.kind {
        ExprKind::Binary { op, .. } => binary_prec(*op),
        ExprKind::Unary { op, .. } => match op {
            UnaryOp::Not => UNARY_PREC,
            UnaryOp::Neg => NEG_PREC,
        },
        ExprKind::InList { .. } | ExprKind::InSubquery { .. } | ExprKind::IsNull { .. } => CMP_PREC,
        ExprKind::Aliased { expr, .. } => precedence(expr),
        _ => ATOM_PREC,
    }
}
