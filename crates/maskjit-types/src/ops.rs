//! Operators of the user-function language

use std::fmt;
use std::str::FromStr;

use crate::error::TypeError;

/// Operator families that share typing behaviour
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum OpCategory {
    /// `+ - * / // % **`
    Arithmetic,
    /// `& | ^`
    Bitwise,
    /// `== != < <= > >=`
    Comparison,
}

/// Binary operators
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BinaryOp {
    /// `+`
    Add,
    /// `-`
    Sub,
    /// `*`
    Mul,
    /// `/`
    TrueDiv,
    /// `//`
    FloorDiv,
    /// `%`
    Mod,
    /// `**`
    Pow,
    /// `&`
    BitAnd,
    /// `|`
    BitOr,
    /// `^`
    BitXor,
    /// `==`
    Eq,
    /// `!=`
    Ne,
    /// `<`
    Lt,
    /// `<=`
    Le,
    /// `>`
    Gt,
    /// `>=`
    Ge,
}

impl BinaryOp {
    /// Arithmetic operators
    pub const ARITHMETIC: [BinaryOp; 7] = [
        BinaryOp::Add,
        BinaryOp::Sub,
        BinaryOp::Mul,
        BinaryOp::TrueDiv,
        BinaryOp::FloorDiv,
        BinaryOp::Mod,
        BinaryOp::Pow,
    ];

    /// Bitwise operators
    pub const BITWISE: [BinaryOp; 3] = [BinaryOp::BitAnd, BinaryOp::BitOr, BinaryOp::BitXor];

    /// Comparison operators
    pub const COMPARISON: [BinaryOp; 6] = [
        BinaryOp::Eq,
        BinaryOp::Ne,
        BinaryOp::Lt,
        BinaryOp::Le,
        BinaryOp::Gt,
        BinaryOp::Ge,
    ];

    /// Every binary operator
    pub fn all() -> impl Iterator<Item = BinaryOp> {
        Self::ARITHMETIC
            .into_iter()
            .chain(Self::BITWISE)
            .chain(Self::COMPARISON)
    }

    /// Source-level spelling
    pub fn symbol(self) -> &'static str {
        match self {
            BinaryOp::Add => "+",
            BinaryOp::Sub => "-",
            BinaryOp::Mul => "*",
            BinaryOp::TrueDiv => "/",
            BinaryOp::FloorDiv => "//",
            BinaryOp::Mod => "%",
            BinaryOp::Pow => "**",
            BinaryOp::BitAnd => "&",
            BinaryOp::BitOr => "|",
            BinaryOp::BitXor => "^",
            BinaryOp::Eq => "==",
            BinaryOp::Ne => "!=",
            BinaryOp::Lt => "<",
            BinaryOp::Le => "<=",
            BinaryOp::Gt => ">",
            BinaryOp::Ge => ">=",
        }
    }

    /// Family this operator belongs to
    pub fn category(self) -> OpCategory {
        match self {
            BinaryOp::Add
            | BinaryOp::Sub
            | BinaryOp::Mul
            | BinaryOp::TrueDiv
            | BinaryOp::FloorDiv
            | BinaryOp::Mod
            | BinaryOp::Pow => OpCategory::Arithmetic,
            BinaryOp::BitAnd | BinaryOp::BitOr | BinaryOp::BitXor => OpCategory::Bitwise,
            BinaryOp::Eq
            | BinaryOp::Ne
            | BinaryOp::Lt
            | BinaryOp::Le
            | BinaryOp::Gt
            | BinaryOp::Ge => OpCategory::Comparison,
        }
    }
}

impl fmt::Display for BinaryOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.symbol())
    }
}

impl FromStr for BinaryOp {
    type Err = TypeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::all()
            .find(|op| op.symbol() == s)
            .ok_or_else(|| TypeError::Parse {
                input: s.to_string(),
                reason: "unknown binary operator".to_string(),
            })
    }
}

/// Math library functions applied as unary operators
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[allow(missing_docs)]
pub enum MathFn {
    Acos,
    Acosh,
    Asin,
    Asinh,
    Atan,
    Atanh,
    Ceil,
    Cos,
    Cosh,
    Degrees,
    Erf,
    Erfc,
    Exp,
    Expm1,
    Fabs,
    Floor,
    Gamma,
    Lgamma,
    Log,
    Log10,
    Log1p,
    Log2,
    Radians,
    Sin,
    Sinh,
    Sqrt,
    Tan,
    Tanh,
}

impl MathFn {
    /// Every math function
    pub const ALL: [MathFn; 28] = [
        MathFn::Acos,
        MathFn::Acosh,
        MathFn::Asin,
        MathFn::Asinh,
        MathFn::Atan,
        MathFn::Atanh,
        MathFn::Ceil,
        MathFn::Cos,
        MathFn::Cosh,
        MathFn::Degrees,
        MathFn::Erf,
        MathFn::Erfc,
        MathFn::Exp,
        MathFn::Expm1,
        MathFn::Fabs,
        MathFn::Floor,
        MathFn::Gamma,
        MathFn::Lgamma,
        MathFn::Log,
        MathFn::Log10,
        MathFn::Log1p,
        MathFn::Log2,
        MathFn::Radians,
        MathFn::Sin,
        MathFn::Sinh,
        MathFn::Sqrt,
        MathFn::Tan,
        MathFn::Tanh,
    ];

    /// Library name
    pub fn name(self) -> &'static str {
        match self {
            MathFn::Acos => "acos",
            MathFn::Acosh => "acosh",
            MathFn::Asin => "asin",
            MathFn::Asinh => "asinh",
            MathFn::Atan => "atan",
            MathFn::Atanh => "atanh",
            MathFn::Ceil => "ceil",
            MathFn::Cos => "cos",
            MathFn::Cosh => "cosh",
            MathFn::Degrees => "degrees",
            MathFn::Erf => "erf",
            MathFn::Erfc => "erfc",
            MathFn::Exp => "exp",
            MathFn::Expm1 => "expm1",
            MathFn::Fabs => "fabs",
            MathFn::Floor => "floor",
            MathFn::Gamma => "gamma",
            MathFn::Lgamma => "lgamma",
            MathFn::Log => "log",
            MathFn::Log10 => "log10",
            MathFn::Log1p => "log1p",
            MathFn::Log2 => "log2",
            MathFn::Radians => "radians",
            MathFn::Sin => "sin",
            MathFn::Sinh => "sinh",
            MathFn::Sqrt => "sqrt",
            MathFn::Tan => "tan",
            MathFn::Tanh => "tanh",
        }
    }

    /// `ceil` and `floor` round to an integer result
    pub fn rounds_to_integer(self) -> bool {
        matches!(self, MathFn::Ceil | MathFn::Floor)
    }
}

/// Unary operators
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum UnaryOp {
    /// `+x`
    Pos,
    /// `-x`
    Neg,
    /// `not x`
    Not,
    /// `~x`
    Invert,
    /// `math.<fn>(x)`
    Math(MathFn),
}

impl UnaryOp {
    /// Every unary operator
    pub fn all() -> impl Iterator<Item = UnaryOp> {
        [UnaryOp::Pos, UnaryOp::Neg, UnaryOp::Not, UnaryOp::Invert]
            .into_iter()
            .chain(MathFn::ALL.into_iter().map(UnaryOp::Math))
    }

    /// Source-level spelling
    pub fn symbol(self) -> &'static str {
        match self {
            UnaryOp::Pos => "+",
            UnaryOp::Neg => "-",
            UnaryOp::Not => "not",
            UnaryOp::Invert => "~",
            UnaryOp::Math(f) => f.name(),
        }
    }
}

impl fmt::Display for UnaryOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.symbol())
    }
}

impl FromStr for UnaryOp {
    type Err = TypeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let name = s.strip_prefix("math.").unwrap_or(s);
        Self::all()
            .find(|op| op.symbol() == name)
            .ok_or_else(|| TypeError::Parse {
                input: s.to_string(),
                reason: "unknown unary operator".to_string(),
            })
    }
}
