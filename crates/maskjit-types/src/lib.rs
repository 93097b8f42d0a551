//! Maskjit Type System
//!
//! The type universe of compiled row functions over nullable columns:
//! primitive scalars, the two string layouts, masked values, the null
//! sentinel, and how they unify at control-flow joins.

#![warn(missing_docs)]

pub mod context;
pub mod conversion;
pub mod error;
pub mod ops;
pub mod scalar;
pub mod ty;
pub mod unify;

pub use context::{TypeContext, TypeId};
pub use conversion::{classify_conversion, Conversion};
pub use error::TypeError;
pub use ops::{BinaryOp, MathFn, OpCategory, UnaryOp};
pub use scalar::{NumericPromotion, ScalarTyping};
pub use ty::{
    MaskedType, PrimitiveType, TimeUnit, Type, TypeKind, ValueType, SUPPORTED_VALUE_KINDS,
};
pub use unify::Unifier;
