//! Aggregation functions.
//!
//! An aggregation is itself an expression, so it can be aliased, compared in
//! HAVING, or nested inside arithmetic. Any expression containing an
//! aggregation is *aggregated* for GROUP BY legality purposes.

use crate::error::BuildError;
use crate::expr::{Expr, ExprKind};
use crate::types::TypeTag;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AggregateFunc {
    Sum,
    Avg,
    Count,
    CountDistinct,
    Min,
    Max,
}

impl AggregateFunc {
    pub(crate) const fn name(&self) -> &'static str {
        match self {
            AggregateFunc::Sum => "SUM",
            AggregateFunc::Avg => "AVG",
            AggregateFunc::Count | AggregateFunc::CountDistinct => "COUNT",
            AggregateFunc::Min => "MIN",
            AggregateFunc::Max => "MAX",
        }
    }
}

fn aggregate(func: AggregateFunc, expr: Expr, ty: TypeTag) -> Expr {
    Expr {
        kind: ExprKind::Aggregate {
            func,
            expr: Some(Box::new(expr)),
        },
        ty,
        aggregated: true,
    }
}

fn require_numeric(expr: &Expr) -> Result<(), BuildError> {
    if expr.ty.is_numeric() {
        Ok(())
    } else {
        Err(BuildError::TypeMismatch {
            expected: TypeTag::Double,
            actual: expr.ty.base().clone(),
        })
    }
}

/// `SUM(expr)` over a numeric expression; keeps the operand's tag.
pub fn sum(expr: Expr) -> Result<Expr, BuildError> {
    let expr = expr.operand()?;
    require_numeric(&expr)?;
    let ty = expr.ty.clone();
    Ok(aggregate(AggregateFunc::Sum, expr, ty))
}

/// `AVG(expr)` over a numeric expression; always `Double`.
pub fn avg(expr: Expr) -> Result<Expr, BuildError> {
    let expr = expr.operand()?;
    require_numeric(&expr)?;
    Ok(aggregate(AggregateFunc::Avg, expr, TypeTag::Double))
}

/// `COUNT(expr)`; `Long`.
pub fn count(expr: Expr) -> Result<Expr, BuildError> {
    let expr = expr.operand()?;
    Ok(aggregate(AggregateFunc::Count, expr, TypeTag::Long))
}

/// `COUNT(DISTINCT expr)`; `Long`.
pub fn count_distinct(expr: Expr) -> Result<Expr, BuildError> {
    let expr = expr.operand()?;
    Ok(aggregate(AggregateFunc::CountDistinct, expr, TypeTag::Long))
}

/// `COUNT(*)`; `Long`, zero on empty input.
pub fn count_all() -> Expr {
    Expr {
        kind: ExprKind::Aggregate {
            func: AggregateFunc::Count,
            expr: None,
        },
        ty: TypeTag::Long,
        aggregated: true,
    }
}

/// `MIN(expr)`; keeps the operand's tag.
pub fn min(expr: Expr) -> Result<Expr, BuildError> {
    let expr = expr.operand()?;
    let ty = expr.ty.clone();
    Ok(aggregate(AggregateFunc::Min, expr, ty))
}

/// `MAX(expr)`; keeps the operand's tag.
pub fn max(expr: Expr) -> Result<Expr, BuildError> {
    let expr = expr.operand()?;
    let ty = expr.ty.clone();
    Ok(aggregate(AggregateFunc::Max, expr, ty))
}
