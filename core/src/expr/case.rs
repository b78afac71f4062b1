//! CASE and COALESCE primitives.

use crate::error::BuildError;
use crate::expr::{Expr, ExprKind};
use crate::types::TypeTag;

/// Builder for `CASE WHEN ... THEN ... [ELSE ...] END`.
///
/// Branch predicates must be Boolean and every branch value must share one
/// base type. Without an ELSE arm the result is nullable.
#[derive(Debug, Clone)]
pub struct CaseBuilder {
    branches: Vec<(Expr, Expr)>,
    aggregated: bool,
    value_ty: TypeTag,
}

/// Starts a CASE expression with its first branch.
pub fn case_when(predicate: Expr, value: Expr) -> Result<CaseBuilder, BuildError> {
    let predicate = predicate.operand()?;
    let value = value.operand()?;
    if !predicate.ty.is_boolean() {
        return Err(BuildError::TypeMismatch {
            expected: TypeTag::Bool,
            actual: predicate.ty.base().clone(),
        });
    }
    let aggregated = predicate.aggregated || value.aggregated;
    let value_ty = value.ty.clone();
    Ok(CaseBuilder {
        branches: vec![(predicate, value)],
        aggregated,
        value_ty,
    })
}

impl CaseBuilder {
    /// Adds a further branch; the value must unify with earlier branches.
    pub fn when(mut self, predicate: Expr, value: Expr) -> Result<Self, BuildError> {
        let predicate = predicate.operand()?;
        let value = value.operand()?;
        if !predicate.ty.is_boolean() {
            return Err(BuildError::TypeMismatch {
                expected: TypeTag::Bool,
                actual: predicate.ty.base().clone(),
            });
        }
        if !value.ty.same_base(&self.value_ty) {
            return Err(BuildError::TypeMismatch {
                expected: self.value_ty.base().clone(),
                actual: value.ty.base().clone(),
            });
        }
        if value.ty.is_nullable() {
            self.value_ty = self.value_ty.lifted();
        }
        self.aggregated |= predicate.aggregated || value.aggregated;
        self.branches.push((predicate, value));
        Ok(self)
    }

    /// Closes the CASE with an ELSE arm.
    pub fn otherwise(self, value: Expr) -> Result<Expr, BuildError> {
        let value = value.operand()?;
        if !value.ty.same_base(&self.value_ty) {
            return Err(BuildError::TypeMismatch {
                expected: self.value_ty.base().clone(),
                actual: value.ty.base().clone(),
            });
        }
        let ty = if value.ty.is_nullable() || self.value_ty.is_nullable() {
            self.value_ty.lifted()
        } else {
            self.value_ty.clone()
        };
        let aggregated = self.aggregated || value.aggregated;
        Ok(Expr {
            kind: ExprKind::Case {
                branches: self.branches,
                otherwise: Some(Box::new(value)),
            },
            ty,
            aggregated,
        })
    }

    /// Closes the CASE without an ELSE arm; the result is nullable because a
    /// row may match no branch.
    pub fn end(self) -> Expr {
        let ty = self.value_ty.lifted();
        Expr {
            kind: ExprKind::Case {
                branches: self.branches,
                otherwise: None,
            },
            ty,
            aggregated: self.aggregated,
        }
    }
}

/// `COALESCE(a, b, ...)`.
///
/// Arguments must share one base type. The result is non-nullable as soon as
/// any argument is non-nullable.
pub fn coalesce(args: impl IntoIterator<Item = Expr>) -> Result<Expr, BuildError> {
    let mut checked = Vec::new();
    let mut base: Option<TypeTag> = None;
    let mut nullable = true;
    let mut aggregated = false;
    for arg in args {
        let arg = arg.operand()?;
        match &base {
            None => base = Some(arg.ty.base().clone()),
            Some(b) => {
                if arg.ty.base() != b {
                    return Err(BuildError::TypeMismatch {
                        expected: b.clone(),
                        actual: arg.ty.base().clone(),
                    });
                }
            }
        }
        nullable &= arg.ty.is_nullable();
        aggregated |= arg.aggregated;
        checked.push(arg);
    }
    let Some(base) = base else {
        return Err(BuildError::ArityMismatch {
            function: "COALESCE".into(),
            expected: crate::expr::func::Arity::AtLeast(1),
            actual: 0,
        });
    };
    let ty = if nullable {
        TypeTag::nullable(base)
    } else {
        base
    };
    Ok(Expr {
        kind: ExprKind::Coalesce(checked),
        ty,
        aggregated,
    })
}
