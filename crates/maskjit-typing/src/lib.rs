//! maskjit typing layer
//!
//! Decides the result type of every operation a user function performs on
//! nullable columns: operators over masked values and `NA`, identity and
//! truthiness tests, return packing, the `Masked` constructor, and string
//! operations that lower to foreign routines.
//!
//! # Example
//!
//! ```
//! use maskjit_types::{BinaryOp, PrimitiveType, Type, TypeContext};
//! use maskjit_typing::{infer_function, Expr, TypingConfig};
//!
//! let mut ctx = TypeContext::new();
//! let body = Expr::binary(BinaryOp::Add, Expr::param(0), Expr::float(2.5));
//! let params = [Type::masked(PrimitiveType::Int32)];
//! let typed = infer_function(&mut ctx, &TypingConfig::default(), &params, &body).unwrap();
//! assert_eq!(ctx.name(typed.ret), "Masked(float64)");
//! ```

#![warn(missing_docs)]

pub mod attrs;
pub mod config;
pub mod infer;
pub mod rules;
pub mod signature;
pub mod strings;

pub use attrs::{resolve_attribute, Attribute};
pub use config::{ConfigError, TypingConfig};
pub use infer::{infer_function, ConversionSite, Expr, Literal, NodeId, TypedFunction, Typer};
pub use rules::{Arity, OpKey, OperatorTable, RuleContext, RuleFn};
pub use signature::Signature;
pub use strings::{abi_result_type, StringMethod};
