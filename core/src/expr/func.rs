//! SQL function applications.
//!
//! Functions live in a registry keyed by canonical (uppercase) name; each
//! entry carries an arity, per-argument classes, and a result signature.
//! Every dialect's registry starts from the neutral baseline and may be
//! extended with engine-specific entries; applying a name missing from the
//! registry is a construction error.

use core::fmt;

use compact_str::CompactString;
use std::collections::HashMap;

use crate::error::BuildError;
use crate::expr::{Expr, ExprKind};
use crate::types::TypeTag;

/// Number of arguments a function accepts.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Arity {
    Exact(usize),
    AtLeast(usize),
    Between(usize, usize),
}

impl Arity {
    pub(crate) fn admits(&self, n: usize) -> bool {
        match self {
            Arity::Exact(k) => n == *k,
            Arity::AtLeast(k) => n >= *k,
            Arity::Between(lo, hi) => (*lo..=*hi).contains(&n),
        }
    }
}

impl fmt::Display for Arity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Arity::Exact(k) => write!(f, "{k}"),
            Arity::AtLeast(k) => write!(f, "at least {k}"),
            Arity::Between(lo, hi) => write!(f, "{lo} to {hi}"),
        }
    }
}

/// What an argument slot accepts.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ArgClass {
    Numeric,
    Textual,
    Any,
}

impl ArgClass {
    fn admits(&self, tag: &TypeTag) -> bool {
        match self {
            ArgClass::Numeric => tag.is_numeric(),
            ArgClass::Textual => tag.is_textual(),
            ArgClass::Any => true,
        }
    }

    fn expected(&self) -> TypeTag {
        match self {
            ArgClass::Numeric => TypeTag::Double,
            ArgClass::Textual => TypeTag::Text,
            ArgClass::Any => TypeTag::Text,
        }
    }
}

/// How the result tag is derived.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ResultKind {
    Fixed(TypeTag),
    /// Same base tag as the given zero-based argument.
    SameAsArg(usize),
}

/// One registered function.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FunctionSig {
    pub arity: Arity,
    /// Classes for leading positional arguments; `variadic` covers the rest.
    pub fixed_args: &'static [ArgClass],
    pub variadic: Option<ArgClass>,
    pub result: ResultKind,
}

impl FunctionSig {
    const fn uniform(arity: Arity, class: ArgClass, result: ResultKind) -> Self {
        FunctionSig {
            arity,
            fixed_args: &[],
            variadic: Some(class),
            result,
        }
    }

    fn class_at(&self, index: usize) -> ArgClass {
        self.fixed_args
            .get(index)
            .copied()
            .or(self.variadic)
            .unwrap_or(ArgClass::Any)
    }
}

/// Dialect-scoped function table.
#[derive(Debug, Clone, Default)]
pub struct FunctionRegistry {
    entries: HashMap<CompactString, FunctionSig>,
}

impl FunctionRegistry {
    /// The neutral baseline every dialect starts from.
    pub fn baseline() -> Self {
        let mut reg = FunctionRegistry::default();
        for name in ["ABS", "CEIL", "FLOOR", "ROUND"] {
            reg.register(
                name,
                FunctionSig::uniform(
                    if name == "ROUND" {
                        Arity::Between(1, 2)
                    } else {
                        Arity::Exact(1)
                    },
                    ArgClass::Numeric,
                    ResultKind::SameAsArg(0),
                ),
            );
        }
        for name in ["LN", "LOG", "SIN", "COS", "SQRT"] {
            reg.register(
                name,
                FunctionSig::uniform(
                    Arity::Exact(1),
                    ArgClass::Numeric,
                    ResultKind::Fixed(TypeTag::Double),
                ),
            );
        }
        for name in ["LOWER", "UPPER", "TRIM"] {
            reg.register(
                name,
                FunctionSig::uniform(
                    Arity::Exact(1),
                    ArgClass::Textual,
                    ResultKind::Fixed(TypeTag::Text),
                ),
            );
        }
        reg.register(
            "LENGTH",
            FunctionSig::uniform(
                Arity::Exact(1),
                ArgClass::Textual,
                ResultKind::Fixed(TypeTag::Long),
            ),
        );
        reg.register(
            "SUBSTRING",
            FunctionSig {
                arity: Arity::Between(2, 3),
                fixed_args: &[ArgClass::Textual, ArgClass::Numeric, ArgClass::Numeric],
                variadic: None,
                result: ResultKind::Fixed(TypeTag::Text),
            },
        );
        reg.register(
            "CONCAT",
            FunctionSig::uniform(
                Arity::AtLeast(1),
                ArgClass::Textual,
                ResultKind::Fixed(TypeTag::Text),
            ),
        );
        reg
    }

    pub fn register(&mut self, name: &str, sig: FunctionSig) {
        self.entries.insert(CompactString::new(name), sig);
    }

    pub fn get(&self, name: &str) -> Option<&FunctionSig> {
        self.entries.get(name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.entries.contains_key(name)
    }

    /// Applies a registered function to its arguments.
    pub fn call(
        &self,
        name: &str,
        args: impl IntoIterator<Item = Expr>,
    ) -> Result<Expr, BuildError> {
        let canonical = CompactString::new(name.to_ascii_uppercase());
        let Some(sig) = self.entries.get(canonical.as_str()) else {
            return Err(BuildError::UnsupportedForDialect {
                dialect: CompactString::new("baseline"),
                feature: canonical,
            });
        };

        let mut checked = Vec::new();
        let mut nullable = false;
        let mut aggregated = false;
        for arg in args {
            let arg = arg.operand()?;
            let class = sig.class_at(checked.len());
            if !class.admits(&arg.ty) {
                return Err(BuildError::TypeMismatch {
                    expected: class.expected(),
                    actual: arg.ty.base().clone(),
                });
            }
            nullable |= arg.ty.is_nullable();
            aggregated |= arg.aggregated;
            checked.push(arg);
        }
        if !sig.arity.admits(checked.len()) {
            return Err(BuildError::ArityMismatch {
                function: canonical,
                expected: sig.arity,
                actual: checked.len(),
            });
        }

        let base = match &sig.result {
            ResultKind::Fixed(tag) => tag.clone(),
            ResultKind::SameAsArg(i) => checked
                .get(*i)
                .map(|e| e.ty.base().clone())
                .unwrap_or(TypeTag::Double),
        };
        let ty = if nullable {
            TypeTag::nullable(base)
        } else {
            base
        };
        Ok(Expr {
            kind: ExprKind::Function {
                name: canonical,
                args: checked,
            },
            ty,
            aggregated,
        })
    }
}

/// Applies a baseline function by name.
pub fn call(name: &str, args: impl IntoIterator<Item = Expr>) -> Result<Expr, BuildError> {
    baseline().call(name, args)
}

/// The shared baseline registry, built once.
pub fn baseline() -> &'static FunctionRegistry {
    static BASELINE: std::sync::OnceLock<FunctionRegistry> = std::sync::OnceLock::new();
    BASELINE.get_or_init(FunctionRegistry::baseline)
}

macro_rules! baseline_fns {
    ($($(#[$doc:meta])* $fn_name:ident => $sql_name:literal),* $(,)?) => { $(
        $(#[$doc])*
        pub fn $fn_name(expr: Expr) -> Result<Expr, BuildError> {
            call($sql_name, [expr])
        }
    )* }
}

baseline_fns!(
    /// `ABS(expr)`
    abs => "ABS",
    /// `CEIL(expr)`
    ceil => "CEIL",
    /// `FLOOR(expr)`
    floor => "FLOOR",
    /// `ROUND(expr)`
    round => "ROUND",
    /// `LN(expr)`
    ln => "LN",
    /// `LOG(expr)`
    log => "LOG",
    /// `SIN(expr)`
    sin => "SIN",
    /// `COS(expr)`
    cos => "COS",
    /// `SQRT(expr)`
    sqrt => "SQRT",
    /// `LOWER(expr)`
    lower => "LOWER",
    /// `UPPER(expr)`
    upper => "UPPER",
    /// `TRIM(expr)`
    trim => "TRIM",
    /// `LENGTH(expr)`
    length => "LENGTH",
);

/// `SUBSTRING(string, start[, count])`
pub fn substring(string: Expr, start: Expr, count: Option<Expr>) -> Result<Expr, BuildError> {
    let mut args = vec![string, start];
    args.extend(count);
    call("SUBSTRING", args)
}

/// `CONCAT(a, b, ...)`
pub fn concat(args: impl IntoIterator<Item = Expr>) -> Result<Expr, BuildError> {
    call("CONCAT", args)
}
