//! Comparison and membership predicates.

use crate::error::BuildError;
use crate::expr::{join_nullability, BinaryOp, Expr, ExprKind};
use crate::query::Read;
use crate::types::TypeTag;

fn comparison(op: BinaryOp, left: Expr, right: Expr) -> Result<Expr, BuildError> {
    let left = left.operand()?;
    let right = right.operand()?;
    if !left.ty.same_base(&right.ty) {
        return Err(BuildError::TypeMismatch {
            expected: left.ty.base().clone(),
            actual: right.ty.base().clone(),
        });
    }
    let ty = join_nullability(TypeTag::Bool, &[&left.ty, &right.ty]);
    let aggregated = left.aggregated || right.aggregated;
    Ok(Expr {
        kind: ExprKind::Binary {
            op,
            left: Box::new(left),
            right: Box::new(right),
        },
        ty,
        aggregated,
    })
}

/// `left = right`; operands must share a base type.
pub fn eq(left: Expr, right: Expr) -> Result<Expr, BuildError> {
    comparison(BinaryOp::Eq, left, right)
}

/// `left <> right`
pub fn ne(left: Expr, right: Expr) -> Result<Expr, BuildError> {
    comparison(BinaryOp::Ne, left, right)
}

/// `left < right`
pub fn lt(left: Expr, right: Expr) -> Result<Expr, BuildError> {
    comparison(BinaryOp::Lt, left, right)
}

/// `left <= right`
pub fn le(left: Expr, right: Expr) -> Result<Expr, BuildError> {
    comparison(BinaryOp::Le, left, right)
}

/// `left > right`
pub fn gt(left: Expr, right: Expr) -> Result<Expr, BuildError> {
    comparison(BinaryOp::Gt, left, right)
}

/// `left >= right`
pub fn ge(left: Expr, right: Expr) -> Result<Expr, BuildError> {
    comparison(BinaryOp::Ge, left, right)
}

/// `left LIKE pattern`; both sides must be textual.
pub fn like(left: Expr, pattern: Expr) -> Result<Expr, BuildError> {
    let left = left.operand()?;
    let pattern = pattern.operand()?;
    for side in [&left, &pattern] {
        if !side.ty.is_textual() {
            return Err(BuildError::TypeMismatch {
                expected: TypeTag::Text,
                actual: side.ty.base().clone(),
            });
        }
    }
    let ty = join_nullability(TypeTag::Bool, &[&left.ty, &pattern.ty]);
    let aggregated = left.aggregated || pattern.aggregated;
    Ok(Expr {
        kind: ExprKind::Binary {
            op: BinaryOp::Like,
            left: Box::new(left),
            right: Box::new(pattern),
        },
        ty,
        aggregated,
    })
}

/// `expr IN (item, ...)`.
///
/// Every item must share the expression's base type. A NULL anywhere makes
/// the predicate Boolean-nullable rather than false. An empty list renders
/// `IN (NULL)`, which matches no row.
pub fn in_list(
    expr: Expr,
    items: impl IntoIterator<Item = Expr>,
) -> Result<Expr, BuildError> {
    membership(expr, items, false)
}

/// `expr NOT IN (item, ...)`.
pub fn not_in_list(
    expr: Expr,
    items: impl IntoIterator<Item = Expr>,
) -> Result<Expr, BuildError> {
    membership(expr, items, true)
}

fn membership(
    expr: Expr,
    items: impl IntoIterator<Item = Expr>,
    negated: bool,
) -> Result<Expr, BuildError> {
    let expr = expr.operand()?;
    let mut list = Vec::new();
    let mut nullable = expr.ty.is_nullable();
    let mut aggregated = expr.aggregated;
    for item in items {
        let item = item.operand()?;
        if !item.ty.same_base(&expr.ty) {
            return Err(BuildError::TypeMismatch {
                expected: expr.ty.base().clone(),
                actual: item.ty.base().clone(),
            });
        }
        nullable |= item.ty.is_nullable();
        aggregated |= item.aggregated;
        list.push(item);
    }
    let ty = if nullable {
        TypeTag::nullable(TypeTag::Bool)
    } else {
        TypeTag::Bool
    };
    Ok(Expr {
        kind: ExprKind::InList {
            expr: Box::new(expr),
            list,
            negated,
        },
        ty,
        aggregated,
    })
}

/// `expr IN (subquery)`; the subquery must read exactly one column of the
/// expression's base type.
pub fn in_subquery(expr: Expr, subquery: Read) -> Result<Expr, BuildError> {
    subquery_membership(expr, subquery, false)
}

/// `expr NOT IN (subquery)`.
pub fn not_in_subquery(expr: Expr, subquery: Read) -> Result<Expr, BuildError> {
    subquery_membership(expr, subquery, true)
}

fn subquery_membership(expr: Expr, subquery: Read, negated: bool) -> Result<Expr, BuildError> {
    let expr = expr.operand()?;
    let tags = subquery.tags();
    if tags.len() != 1 {
        return Err(BuildError::ShapeMismatch(format!(
            "IN subquery must select exactly one column, found {}",
            tags.len()
        )));
    }
    if !tags[0].same_base(&expr.ty) {
        return Err(BuildError::TypeMismatch {
            expected: expr.ty.base().clone(),
            actual: tags[0].base().clone(),
        });
    }
    let ty = join_nullability(TypeTag::Bool, &[&expr.ty, &tags[0]]);
    let aggregated = expr.aggregated;
    Ok(Expr {
        kind: ExprKind::InSubquery {
            expr: Box::new(expr),
            subquery: Box::new(subquery),
            negated,
        },
        ty,
        aggregated,
    })
}

/// `expr IS NULL`
pub fn is_null(expr: Expr) -> Result<Expr, BuildError> {
    null_test(expr, false)
}

/// `expr IS NOT NULL`
pub fn is_not_null(expr: Expr) -> Result<Expr, BuildError> {
    null_test(expr, true)
}

fn null_test(expr: Expr, negated: bool) -> Result<Expr, BuildError> {
    let expr = expr.operand()?;
    let aggregated = expr.aggregated;
    Ok(Expr {
        kind: ExprKind::IsNull {
            expr: Box::new(expr),
            negated,
        },
        ty: TypeTag::Bool,
        aggregated,
    })
}
