//! Arithmetic operators.
//!
//! Operands must be numeric; the result tag is `Double`. Exact decimal
//! arithmetic is a known gap: `Decimal` operands participate but the result
//! still widens to `Double`.

use crate::error::BuildError;
use crate::expr::{join_nullability, BinaryOp, Expr, ExprKind, UnaryOp};
use crate::types::TypeTag;

fn arithmetic(op: BinaryOp, left: Expr, right: Expr) -> Result<Expr, BuildError> {
    let left = left.operand()?;
    let right = right.operand()?;
    for side in [&left, &right] {
        if !side.ty.is_numeric() {
            return Err(BuildError::TypeMismatch {
                expected: TypeTag::Double,
                actual: side.ty.base().clone(),
            });
        }
    }
    let ty = join_nullability(TypeTag::Double, &[&left.ty, &right.ty]);
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

/// `left + right`
pub fn add(left: Expr, right: Expr) -> Result<Expr, BuildError> {
    arithmetic(BinaryOp::Add, left, right)
}

/// `left - right`
pub fn sub(left: Expr, right: Expr) -> Result<Expr, BuildError> {
    arithmetic(BinaryOp::Sub, left, right)
}

/// `left * right`
pub fn mul(left: Expr, right: Expr) -> Result<Expr, BuildError> {
    arithmetic(BinaryOp::Mul, left, right)
}

/// `left / right`
pub fn div(left: Expr, right: Expr) -> Result<Expr, BuildError> {
    arithmetic(BinaryOp::Div, left, right)
}

/// `left % right`
pub fn rem(left: Expr, right: Expr) -> Result<Expr, BuildError> {
    arithmetic(BinaryOp::Rem, left, right)
}

/// `-expr`; preserves the operand's tag.
pub fn neg(expr: Expr) -> Result<Expr, BuildError> {
    let expr = expr.operand()?;
    if !expr.ty.is_numeric() {
        return Err(BuildError::TypeMismatch {
            expected: TypeTag::Double,
            actual: expr.ty.base().clone(),
        });
    }
    let ty = expr.ty.clone();
    let aggregated = expr.aggregated;
    Ok(Expr {
        kind: ExprKind::Unary {
            op: UnaryOp::Neg,
            expr: Box::new(expr),
        },
        ty,
        aggregated,
    })
}
