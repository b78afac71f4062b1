//! Typed expression trees.
//!
//! Every [`Expr`] carries its output [`TypeTag`] and an aggregation flag;
//! operator constructors check operand compatibility when the node is built,
//! so a tree that exists is well-typed. Construction failures surface as
//! [`BuildError`] at the call site and never reach rendering.

pub mod agg;
pub mod case;
pub mod cmp;
pub mod func;
pub mod logic;
pub mod math;

pub use agg::{avg, count, count_all, count_distinct, max, min, sum, AggregateFunc};
pub use case::{case_when, coalesce, CaseBuilder};
pub use cmp::{
    eq, ge, gt, in_list, in_subquery, is_not_null, is_null, le, like, lt, ne, not_in_list,
    not_in_subquery,
};
pub use func::{
    abs, call, ceil, concat, cos, floor, length, ln, log, lower, round, sin, sqrt, substring,
    trim, upper, FunctionRegistry,
};
pub use logic::{and, not, or};
pub use math::{add, div, mul, neg, rem, sub};

use compact_str::CompactString;

use crate::error::BuildError;
use crate::query::Read;
use crate::schema::Table;
use crate::types::{TypeTag, Value};

/// A typed SQL expression.
#[derive(Debug, Clone)]
pub struct Expr {
    pub(crate) kind: ExprKind,
    pub(crate) ty: TypeTag,
    pub(crate) aggregated: bool,
}

#[derive(Debug, Clone)]
pub(crate) enum ExprKind {
    Literal(Value),
    Column {
        table: Table,
        ordinal: usize,
    },
    Unary {
        op: UnaryOp,
        expr: Box<Expr>,
    },
    Binary {
        op: BinaryOp,
        left: Box<Expr>,
        right: Box<Expr>,
    },
    Function {
        name: CompactString,
        args: Vec<Expr>,
    },
    Aggregate {
        func: AggregateFunc,
        /// `None` renders `COUNT(*)`.
        expr: Option<Box<Expr>>,
    },
    Case {
        branches: Vec<(Expr, Expr)>,
        otherwise: Option<Box<Expr>>,
    },
    Coalesce(Vec<Expr>),
    InList {
        expr: Box<Expr>,
        list: Vec<Expr>,
        negated: bool,
    },
    InSubquery {
        expr: Box<Expr>,
        subquery: Box<Read>,
        negated: bool,
    },
    IsNull {
        expr: Box<Expr>,
        negated: bool,
    },
    Aliased {
        expr: Box<Expr>,
        alias: CompactString,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum UnaryOp {
    Neg,
    Not,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum BinaryOp {
    Add,
    Sub,
    Mul,
    Div,
    Rem,
    Eq,
    Ne,
    Lt,
    Le,
    Gt,
    Ge,
    And,
    Or,
    Like,
}

/// A literal expression; the tag is derived from the value.
pub fn lit(value: impl Into<Value>) -> Expr {
    let value = value.into();
    let ty = match value.tag() {
        Some(tag) => tag,
        // a bare NULL defaults to a nullable text slot; use `null_of` for a
        // specific type
        None => TypeTag::nullable(TypeTag::Text),
    };
    Expr {
        kind: ExprKind::Literal(value),
        ty,
        aggregated: false,
    }
}

/// A typed NULL literal.
pub fn null_of(tag: TypeTag) -> Expr {
    Expr {
        kind: ExprKind::Literal(Value::Null),
        ty: TypeTag::nullable(tag),
        aggregated: false,
    }
}

impl Expr {
    pub(crate) fn column_ref(table: Table, ordinal: usize) -> Expr {
        let ty = table
            .columns()
            .get(ordinal)
            .map(|c| c.ty().clone())
            .unwrap_or(TypeTag::Text);
        Expr {
            kind: ExprKind::Column { table, ordinal },
            ty,
            aggregated: false,
        }
    }

    /// The expression's output type tag.
    pub fn tag(&self) -> &TypeTag {
        &self.ty
    }

    /// Whether an aggregation occurs anywhere in this expression.
    pub fn is_aggregated(&self) -> bool {
        self.aggregated
    }

    /// Attaches a selection alias. Only legal at selection top level;
    /// operator constructors reject aliased operands.
    pub fn alias(self, alias: &str) -> Expr {
        let ty = self.ty.clone();
        let aggregated = self.aggregated;
        Expr {
            kind: ExprKind::Aliased {
                expr: Box::new(self),
                alias: CompactString::new(alias),
            },
            ty,
            aggregated,
        }
    }

    pub(crate) fn is_aliased(&self) -> bool {
        matches!(self.kind, ExprKind::Aliased { .. })
    }

    /// The expression with any top-level alias removed.
    pub(crate) fn unaliased(&self) -> &Expr {
        match &self.kind {
            ExprKind::Aliased { expr, .. } => expr,
            _ => self,
        }
    }

    /// Rejects aliased operands; used by every operator constructor.
    pub(crate) fn operand(self) -> Result<Expr, BuildError> {
        if self.is_aliased() {
            Err(BuildError::AliasNotTopLevel)
        } else {
            Ok(self)
        }
    }

    /// Visits every column reference, skipping subquery interiors (those are
    /// validated against their own scope when the subquery is built).
    pub(crate) fn visit_columns(&self, f: &mut impl FnMut(&Table, usize)) {
        match &self.kind {
            ExprKind::Literal(_) => {}
            ExprKind::Column { table, ordinal } => f(table, *ordinal),
            ExprKind::Unary { expr, .. } => expr.visit_columns(f),
            ExprKind::Binary { left, right, .. } => {
                left.visit_columns(f);
                right.visit_columns(f);
            }
            ExprKind::Function { args, .. } => {
                for arg in args {
                    arg.visit_columns(f);
                }
            }
            ExprKind::Aggregate { expr, .. } => {
                if let Some(expr) = expr {
                    expr.visit_columns(f);
                }
            }
            ExprKind::Case {
                branches,
                otherwise,
            } => {
                for (when, then) in branches {
                    when.visit_columns(f);
                    then.visit_columns(f);
                }
                if let Some(e) = otherwise {
                    e.visit_columns(f);
                }
            }
            ExprKind::Coalesce(args) => {
                for arg in args {
                    arg.visit_columns(f);
                }
            }
            ExprKind::InList { expr, list, .. } => {
                expr.visit_columns(f);
                for item in list {
                    item.visit_columns(f);
                }
            }
            ExprKind::InSubquery { expr, .. } => expr.visit_columns(f),
            ExprKind::IsNull { expr, .. } => expr.visit_columns(f),
            ExprKind::Aliased { expr, .. } => expr.visit_columns(f),
        }
    }

    /// Structural equality ignoring top-level aliases.
    ///
    /// Column references compare by table instance and ordinal; subquery
    /// membership tests never compare equal.
    pub fn same_structure(&self, other: &Expr) -> bool {
        match (&self.unaliased().kind, &other.unaliased().kind) {
            (ExprKind::Literal(a), ExprKind::Literal(b)) => a == b,
            (
                ExprKind::Column { table: ta, ordinal: oa },
                ExprKind::Column { table: tb, ordinal: ob },
            ) => ta == tb && oa == ob,
            (
                ExprKind::Unary { op: opa, expr: ea },
                ExprKind::Unary { op: opb, expr: eb },
            ) => opa == opb && ea.same_structure(eb),
            (
                ExprKind::Binary { op: opa, left: la, right: ra },
                ExprKind::Binary { op: opb, left: lb, right: rb },
            ) => opa == opb && la.same_structure(lb) && ra.same_structure(rb),
            (
                ExprKind::Function { name: na, args: aa },
                ExprKind::Function { name: nb, args: ab },
            ) => na == nb && same_structure_all(aa, ab),
            (
                ExprKind::Aggregate { func: fa, expr: ea },
                ExprKind::Aggregate { func: fb, expr: eb },
            ) => {
                fa == fb
                    && match (ea, eb) {
                        (None, None) => true,
                        (Some(a), Some(b)) => a.same_structure(b),
                        _ => false,
                    }
            }
            (
                ExprKind::Case { branches: ba, otherwise: oa },
                ExprKind::Case { branches: bb, otherwise: ob },
            ) => {
                ba.len() == bb.len()
                    && ba.iter().zip(bb).all(|((wa, ta), (wb, tb))| {
                        wa.same_structure(wb) && ta.same_structure(tb)
                    })
                    && match (oa, ob) {
                        (None, None) => true,
                        (Some(a), Some(b)) => a.same_structure(b),
                        _ => false,
                    }
            }
            (ExprKind::Coalesce(aa), ExprKind::Coalesce(ab)) => same_structure_all(aa, ab),
            (
                ExprKind::InList { expr: ea, list: la, negated: na },
                ExprKind::InList { expr: eb, list: lb, negated: nb },
            ) => na == nb && ea.same_structure(eb) && same_structure_all(la, lb),
            (
                ExprKind::IsNull { expr: ea, negated: na },
                ExprKind::IsNull { expr: eb, negated: nb },
            ) => na == nb && ea.same_structure(eb),
            _ => false,
        }
    }
}

fn same_structure_all(a: &[Expr], b: &[Expr]) -> bool {
    a.len() == b.len() && a.iter().zip(b).all(|(x, y)| x.same_structure(y))
}

/// Propagated nullability: the result is nullable when either operand is.
pub(crate) fn join_nullability(result: TypeTag, operands: &[&TypeTag]) -> TypeTag {
    if operands.iter().any(|t| t.is_nullable()) {
        TypeTag::nullable(result)
    } else {
        result
    }
}
