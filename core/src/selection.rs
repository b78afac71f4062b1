//! Selection lists.
//!
//! A [`Selection`] is the ordered, heterogeneous projection of a read. Its
//! row shape is the right-nested tuple of its expression types terminated by
//! unit; the decoder reconstructs exactly that shape (see [`crate::row`]).

use crate::expr::Expr;
use crate::types::TypeTag;

/// An ordered sequence of typed, optionally aliased expressions.
#[derive(Debug, Clone, Default)]
pub struct Selection {
    exprs: Vec<Expr>,
}

impl Selection {
    pub fn new() -> Self {
        Self::default()
    }

    /// Right-appends an expression.
    pub fn add(mut self, expr: Expr) -> Self {
        self.exprs.push(expr);
        self
    }

    pub fn len(&self) -> usize {
        self.exprs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.exprs.is_empty()
    }

    pub fn exprs(&self) -> &[Expr] {
        &self.exprs
    }

    /// Declared type tags, one per expression, in order.
    pub fn tags(&self) -> Vec<TypeTag> {
        self.exprs.iter().map(|e| e.tag().clone()).collect()
    }

    /// Shape equality modulo alias: same length and same tags position for
    /// position.
    pub fn shape_matches(&self, other: &Selection) -> bool {
        self.len() == other.len()
            && self
                .exprs
                .iter()
                .zip(&other.exprs)
                .all(|(a, b)| a.tag() == b.tag())
    }

    /// Structural equality modulo alias text.
    pub fn equivalent(&self, other: &Selection) -> bool {
        self.len() == other.len()
            && self
                .exprs
                .iter()
                .zip(&other.exprs)
                .all(|(a, b)| a.same_structure(b))
    }
}

impl From<Expr> for Selection {
    fn from(expr: Expr) -> Self {
        Selection { exprs: vec![expr] }
    }
}

impl From<Vec<Expr>> for Selection {
    fn from(exprs: Vec<Expr>) -> Self {
        Selection { exprs }
    }
}

impl<const N: usize> From<[Expr; N]> for Selection {
    fn from(exprs: [Expr; N]) -> Self {
        Selection {
            exprs: exprs.into(),
        }
    }
}

impl FromIterator<Expr> for Selection {
    fn from_iter<T: IntoIterator<Item = Expr>>(iter: T) -> Self {
        Selection {
            exprs: iter.into_iter().collect(),
        }
    }
}

macro_rules! impl_selection_from_tuple {
    ($($T:ident),+) => {
        impl<$($T: Into<Expr>),+> From<($($T,)+)> for Selection {
            #[allow(non_snake_case)]
            fn from(($($T,)+): ($($T,)+)) -> Self {
                Selection {
                    exprs: vec![$($T.into()),+],
                }
            }
        }
    };
}

impl_selection_from_tuple!(A, B);
impl_selection_from_tuple!(A, B, C);
impl_selection_from_tuple!(A, B, C, D);
impl_selection_from_tuple!(A, B, C, D, E);
impl_selection_from_tuple!(A, B, C, D, E, F);
impl_selection_from_tuple!(A, B, C, D, E, F, G);
impl_selection_from_tuple!(A, B, C, D, E, F, G, H);

#[cfg(test)]
mod tests {
    use super::*;
    use crate::expr::lit;
    use crate::types::TypeTag;

    #[test]
    fn shape_is_positional_tags() {
        let a = Selection::from((lit(1i32), lit("x"), lit(2.0f64)));
        assert_eq!(
            a.tags(),
            vec![TypeTag::Int, TypeTag::Text, TypeTag::Double]
        );
    }

    #[test]
    fn alias_does_not_change_shape_or_structure() {
        let plain = Selection::from((lit(1i32), lit("x")));
        let aliased = Selection::from((lit(1i32).alias("n"), lit("x").alias("s")));
        assert!(plain.shape_matches(&aliased));
        assert!(plain.equivalent(&aliased));
    }
}
