//! Read trees and the staged SELECT builder.
//!
//! `select(σ).from(src)` opens a staged builder whose refinements each
//! appear at most once and in clause order; `having` is only reachable after
//! `group_by`, so the illegal transition is not expressible. Semantic checks
//! (scope membership, Boolean predicates, GROUP BY legality) run at
//! [`SelectBuilder::build`].

use std::collections::HashSet;
use std::marker::PhantomData;

use compact_str::CompactString;

use crate::error::BuildError;
use crate::expr::{Expr, ExprKind};
use crate::selection::Selection;
use crate::source::TableSource;
use crate::types::{TypeTag, Value};

/// Sort direction for ORDER BY keys.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Asc,
    Desc,
}

/// Placement of NULLs within an ordering.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NullsOrder {
    First,
    Last,
}

/// One ORDER BY key.
#[derive(Debug, Clone)]
pub struct OrderKey {
    pub(crate) expr: Expr,
    pub(crate) direction: Direction,
    pub(crate) nulls: Option<NullsOrder>,
}

impl OrderKey {
    pub fn nulls_first(mut self) -> Self {
        self.nulls = Some(NullsOrder::First);
        self
    }

    pub fn nulls_last(mut self) -> Self {
        self.nulls = Some(NullsOrder::Last);
        self
    }
}

/// An ascending ORDER BY key.
pub fn asc(expr: Expr) -> OrderKey {
    OrderKey {
        expr,
        direction: Direction::Asc,
        nulls: None,
    }
}

/// A descending ORDER BY key.
pub fn desc(expr: Expr) -> OrderKey {
    OrderKey {
        expr,
        direction: Direction::Desc,
        nulls: None,
    }
}

impl Expr {
    /// This expression as an ascending ORDER BY key.
    pub fn asc(self) -> OrderKey {
        asc(self)
    }

    /// This expression as a descending ORDER BY key.
    pub fn desc(self) -> OrderKey {
        desc(self)
    }
}

impl From<(Expr, Direction)> for OrderKey {
    fn from((expr, direction): (Expr, Direction)) -> Self {
        OrderKey {
            expr,
            direction,
            nulls: None,
        }
    }
}

/// A full SELECT statement.
#[derive(Debug, Clone)]
pub struct SelectStatement {
    pub(crate) selection: Selection,
    pub(crate) source: TableSource,
    pub(crate) filter: Option<Expr>,
    pub(crate) group_by: Vec<Expr>,
    pub(crate) having: Option<Expr>,
    pub(crate) order_by: Vec<OrderKey>,
    pub(crate) limit: Option<u64>,
    pub(crate) offset: Option<u64>,
}

/// A literal row source with its per-column tags.
#[derive(Debug, Clone)]
pub struct LiteralRows {
    pub(crate) rows: Vec<Vec<Value>>,
    pub(crate) tags: Vec<TypeTag>,
}

/// A rooted read tree: a SELECT, a set operation, or literal rows.
#[derive(Debug, Clone)]
pub enum Read {
    Select(Box<SelectStatement>),
    Union {
        left: Box<Read>,
        right: Box<Read>,
        all: bool,
    },
    Values(LiteralRows),
}

impl Read {
    /// Effective per-column type tags, with outer-join nullability lifting
    /// applied: an expression referencing any weak-side column decodes as
    /// nullable regardless of its declared tag.
    pub fn tags(&self) -> Vec<TypeTag> {
        match self {
            Read::Select(stmt) => {
                let weak = stmt.source.nullable_instances();
                stmt.selection
                    .exprs()
                    .iter()
                    .map(|e| {
                        let declared = e.tag().clone();
                        if references_weak_side(e, &weak) {
                            declared.lifted()
                        } else {
                            declared
                        }
                    })
                    .collect()
            }
            Read::Union { left, right, .. } => left
                .tags()
                .into_iter()
                .zip(right.tags())
                .map(|(l, r)| {
                    if r.is_nullable() {
                        l.lifted()
                    } else {
                        l
                    }
                })
                .collect(),
            Read::Values(rows) => rows.tags.clone(),
        }
    }

    /// Selection aliases, if this read is a plain SELECT.
    pub fn selection(&self) -> Option<&Selection> {
        match self {
            Read::Select(stmt) => Some(&stmt.selection),
            _ => None,
        }
    }

    /// `self UNION other`; operand row shapes must agree.
    pub fn union(self, other: Read) -> Result<Read, BuildError> {
        set_op(self, other, false)
    }

    /// `self UNION ALL other`; operand row shapes must agree.
    pub fn union_all(self, other: Read) -> Result<Read, BuildError> {
        set_op(self, other, true)
    }

    /// A literal row source. Rows must be non-empty and rectangular with
    /// consistent per-column types; NULLs make a column nullable.
    pub fn values(rows: Vec<Vec<Value>>) -> Result<Read, BuildError> {
        let Some(first) = rows.first() else {
            return Err(BuildError::EmptyRows);
        };
        let width = first.len();
        if width == 0 {
            return Err(BuildError::EmptySelection);
        }
        let mut tags: Vec<Option<TypeTag>> = vec![None; width];
        let mut nullable = vec![false; width];
        for row in &rows {
            if row.len() != width {
                return Err(BuildError::ShapeMismatch(format!(
                    "literal rows vary in width: {} vs {}",
                    width,
                    row.len()
                )));
            }
            for (i, value) in row.iter().enumerate() {
                match value.tag() {
                    None => nullable[i] = true,
                    Some(tag) => match &tags[i] {
                        None => tags[i] = Some(tag),
                        Some(existing) => {
                            if !existing.same_base(&tag) {
                                return Err(BuildError::TypeMismatch {
                                    expected: existing.clone(),
                                    actual: tag,
                                });
                            }
                        }
                    },
                }
            }
        }
        let tags = tags
            .into_iter()
            .zip(nullable)
            .map(|(tag, null)| {
                let base = tag.unwrap_or(TypeTag::Text);
                if null {
                    TypeTag::nullable(base)
                } else {
                    base
                }
            })
            .collect();
        Ok(Read::Values(LiteralRows { rows, tags }))
    }
}

fn set_op(left: Read, right: Read, all: bool) -> Result<Read, BuildError> {
    let lt = left.tags();
    let rt = right.tags();
    if lt.len() != rt.len() {
        return Err(BuildError::ShapeMismatch(format!(
            "set operation operands have {} and {} columns",
            lt.len(),
            rt.len()
        )));
    }
    for (l, r) in lt.iter().zip(&rt) {
        if !l.same_base(r) {
            return Err(BuildError::TypeMismatch {
                expected: l.base().clone(),
                actual: r.base().clone(),
            });
        }
    }
    Ok(Read::Union {
        left: Box::new(left),
        right: Box::new(right),
        all,
    })
}

fn references_weak_side(expr: &Expr, weak: &HashSet<u64>) -> bool {
    if weak.is_empty() {
        return false;
    }
    let mut found = false;
    expr.visit_columns(&mut |table, _| {
        found |= weak.contains(&table.instance());
    });
    found
}

// =============================================================================
// Staged builder
// =============================================================================

/// Builder state markers. Transitions consume the builder, so each refinement
/// appears at most once and only in clause order.
#[derive(Debug, Clone, Copy, Default)]
pub struct FromSet;
#[derive(Debug, Clone, Copy, Default)]
pub struct WhereSet;
#[derive(Debug, Clone, Copy, Default)]
pub struct GroupSet;
#[derive(Debug, Clone, Copy, Default)]
pub struct HavingSet;
#[derive(Debug, Clone, Copy, Default)]
pub struct OrderSet;
#[derive(Debug, Clone, Copy, Default)]
pub struct LimitSet;
#[derive(Debug, Clone, Copy, Default)]
pub struct OffsetSet;

/// States that may still add a WHERE clause.
pub trait CanWhere {}
impl CanWhere for FromSet {}

/// States that may still add a GROUP BY clause.
pub trait CanGroup {}
impl CanGroup for FromSet {}
impl CanGroup for WhereSet {}

/// States that may still add ORDER BY keys.
pub trait CanOrder {}
impl CanOrder for FromSet {}
impl CanOrder for WhereSet {}
impl CanOrder for GroupSet {}
impl CanOrder for HavingSet {}

/// States that may still set a LIMIT.
pub trait CanLimit {}
impl CanLimit for FromSet {}
impl CanLimit for WhereSet {}
impl CanLimit for GroupSet {}
impl CanLimit for HavingSet {}
impl CanLimit for OrderSet {}

/// States that may still set an OFFSET.
pub trait CanOffset {}
impl CanOffset for FromSet {}
impl CanOffset for WhereSet {}
impl CanOffset for GroupSet {}
impl CanOffset for HavingSet {}
impl CanOffset for OrderSet {}
impl CanOffset for LimitSet {}

/// Opens a SELECT over the given selection.
pub fn select(selection: impl Into<Selection>) -> SelectInit {
    SelectInit {
        selection: selection.into(),
    }
}

/// A SELECT awaiting its FROM clause.
#[derive(Debug, Clone)]
pub struct SelectInit {
    selection: Selection,
}

impl SelectInit {
    /// Fixes the table source.
    pub fn from(self, source: impl Into<TableSource>) -> SelectBuilder<FromSet> {
        SelectBuilder {
            stmt: SelectStatement {
                selection: self.selection,
                source: source.into(),
                filter: None,
                group_by: Vec::new(),
                having: None,
                order_by: Vec::new(),
                limit: None,
                offset: None,
            },
            _state: PhantomData,
        }
    }
}

/// The staged SELECT builder.
#[derive(Debug, Clone)]
pub struct SelectBuilder<State> {
    stmt: SelectStatement,
    _state: PhantomData<State>,
}

impl<State> SelectBuilder<State> {
    fn transition<Next>(self) -> SelectBuilder<Next> {
        SelectBuilder {
            stmt: self.stmt,
            _state: PhantomData,
        }
    }

    /// Finishes the tree, running the semantic checks.
    pub fn build(self) -> Result<Read, BuildError> {
        validate(&self.stmt)?;
        Ok(Read::Select(Box::new(self.stmt)))
    }
}

impl<State: CanWhere> SelectBuilder<State> {
    /// Adds the WHERE predicate.
    pub fn r#where(mut self, predicate: Expr) -> SelectBuilder<WhereSet> {
        self.stmt.filter = Some(predicate);
        self.transition()
    }
}

impl<State: CanGroup> SelectBuilder<State> {
    /// Adds GROUP BY keys.
    pub fn group_by(
        mut self,
        keys: impl IntoIterator<Item = Expr>,
    ) -> SelectBuilder<GroupSet> {
        self.stmt.group_by = keys.into_iter().collect();
        self.transition()
    }
}

impl SelectBuilder<GroupSet> {
    /// Adds the HAVING predicate; only reachable after `group_by`.
    pub fn having(mut self, predicate: Expr) -> SelectBuilder<HavingSet> {
        self.stmt.having = Some(predicate);
        self.transition()
    }
}

impl<State: CanOrder> SelectBuilder<State> {
    /// Adds ORDER BY keys.
    pub fn order_by(
        mut self,
        keys: impl IntoIterator<Item = impl Into<OrderKey>>,
    ) -> SelectBuilder<OrderSet> {
        self.stmt.order_by = keys.into_iter().map(Into::into).collect();
        self.transition()
    }
}

impl<State: CanLimit> SelectBuilder<State> {
    /// Caps the row count.
    pub fn limit(mut self, limit: u64) -> SelectBuilder<LimitSet> {
        self.stmt.limit = Some(limit);
        self.transition()
    }
}

impl<State: CanOffset> SelectBuilder<State> {
    /// Skips leading rows.
    pub fn offset(mut self, offset: u64) -> SelectBuilder<OffsetSet> {
        self.stmt.offset = Some(offset);
        self.transition()
    }
}

// =============================================================================
// Validation
// =============================================================================

fn validate(stmt: &SelectStatement) -> Result<(), BuildError> {
    if stmt.selection.is_empty() {
        return Err(BuildError::EmptySelection);
    }
    for expr in stmt.selection.exprs() {
        expr.tag().validate()?;
    }

    let mut scoped: Vec<&Expr> = stmt.selection.exprs().iter().collect();
    scoped.extend(stmt.filter.iter());
    scoped.extend(stmt.group_by.iter());
    scoped.extend(stmt.having.iter());
    for key in &stmt.order_by {
        scoped.push(&key.expr);
    }
    for expr in scoped {
        check_scope(expr, &stmt.source)?;
    }

    if let Some(filter) = &stmt.filter {
        require_boolean(filter)?;
    }
    if let Some(having) = &stmt.having {
        require_boolean(having)?;
    }

    if !stmt.group_by.is_empty() {
        for expr in stmt.selection.exprs() {
            require_group_safe(expr, &stmt.group_by)?;
        }
        if let Some(having) = &stmt.having {
            require_group_safe(having, &stmt.group_by)?;
        }
        for key in &stmt.order_by {
            require_group_safe(&key.expr, &stmt.group_by)?;
        }
    }
    Ok(())
}

fn require_boolean(expr: &Expr) -> Result<(), BuildError> {
    if expr.tag().is_boolean() {
        Ok(())
    } else {
        Err(BuildError::TypeMismatch {
            expected: TypeTag::Bool,
            actual: expr.tag().base().clone(),
        })
    }
}

pub(crate) fn check_scope(expr: &Expr, source: &TableSource) -> Result<(), BuildError> {
    let mut missing: Option<(CompactString, CompactString)> = None;
    expr.visit_columns(&mut |table, ordinal| {
        if !source.contains_instance(table.instance()) && missing.is_none() {
            let column = table
                .columns()
                .get(ordinal)
                .map(|c| CompactString::new(c.name()))
                .unwrap_or_default();
            missing = Some((CompactString::new(table.name()), column));
        }
    });
    match missing {
        Some((table, column)) => Err(BuildError::UnknownTableColumn { table, column }),
        None => Ok(()),
    }
}

fn require_group_safe(expr: &Expr, keys: &[Expr]) -> Result<(), BuildError> {
    if group_safe(expr, keys) {
        Ok(())
    } else {
        Err(BuildError::GroupByViolation(offending_column(expr, keys)))
    }
}

/// True when the expression is aggregated, a literal, one of the keys, or a
/// pure function of group-safe parts.
fn group_safe(expr: &Expr, keys: &[Expr]) -> bool {
    let expr = expr.unaliased();
    if keys.iter().any(|k| k.same_structure(expr)) {
        return true;
    }
    match &expr.kind {
        ExprKind::Literal(_) => true,
        ExprKind::Aggregate { .. } => true,
        ExprKind::Column { .. } => false,
        ExprKind::Unary { expr, .. } => group_safe(expr, keys),
        ExprKind::Binary { left, right, .. } => {
            group_safe(left, keys) && group_safe(right, keys)
        }
        ExprKind::Function { args, .. } => args.iter().all(|a| group_safe(a, keys)),
        ExprKind::Case {
            branches,
            otherwise,
        } => {
            branches
                .iter()
                .all(|(w, t)| group_safe(w, keys) && group_safe(t, keys))
                && otherwise
                    .as_deref()
                    .map_or(true, |e| group_safe(e, keys))
        }
        ExprKind::Coalesce(args) => args.iter().all(|a| group_safe(a, keys)),
        ExprKind::InList { expr, list, .. } => {
            group_safe(expr, keys) && list.iter().all(|i| group_safe(i, keys))
        }
        ExprKind::InSubquery { expr, .. } => group_safe(expr, keys),
        ExprKind::IsNull { expr, .. } => group_safe(expr, keys),
        ExprKind::Aliased { expr, .. } => group_safe(expr, keys),
    }
}

/// Names the first column that breaks the GROUP BY rule, for the error text.
fn offending_column(expr: &Expr, keys: &[Expr]) -> String {
    let mut name = None;
    expr.visit_columns(&mut |table, ordinal| {
        if name.is_some() {
            return;
        }
        let as_key = Expr::column_ref(table.clone(), ordinal);
        if !keys.iter().any(|k| k.same_structure(&as_key)) {
            if let Some(col) = table.columns().get(ordinal) {
                name = Some(format!("{}.{}", table.name(), col.name()));
            }
        }
    });
    name.unwrap_or_else(|| "expression".to_string())
}
