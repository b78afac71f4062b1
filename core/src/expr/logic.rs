//! Boolean connectives.

use crate::error::BuildError;
use crate::expr::{join_nullability, BinaryOp, Expr, ExprKind, UnaryOp};
use crate::types::TypeTag;

fn connective(op: BinaryOp, left: Expr, right: Expr) -> Result<Expr, BuildError> {
    let left = left.operand()?;
    let right = right.operand()?;
    for side in [&left, &right] {
        if !side.ty.is_boolean() {
            return Err(BuildError::TypeMismatch {
                expected: TypeTag::Bool,
                actual: side.ty.base().clone(),
            });
        }
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

/// `left AND right`
pub fn and(left: Expr, right: Expr) -> Result<Expr, BuildError> {
    connective(BinaryOp::And, left, right)
}

/// `left OR right`
pub fn or(left: Expr, right: Expr) -> Result<Expr, BuildError> {
    connective(BinaryOp::Or, left, right)
}

/// `NOT expr`
pub fn not(expr: Expr) -> Result<Expr, BuildError> {
    let expr = expr.operand()?;
    if !expr.ty.is_boolean() {
        return Err(BuildError::TypeMismatch {
            expected: TypeTag::Bool,
            actual: expr.ty.base().clone(),
        });
    }
    let ty = expr.ty.clone();
    let aggregated = expr.aggregated;
    Ok(Expr {
        kind: ExprKind::Unary {
            op: UnaryOp::Not,
            expr: Box::new(expr),
        },
        ty,
        aggregated,
    })
}
