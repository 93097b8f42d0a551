//! Typing of plain (non-masked) values
//!
//! Masked rules delegate to this layer for the value types they carry, so it
//! decides promotions like `int32 + float64 -> float64`.

use crate::ops::{BinaryOp, OpCategory, UnaryOp};
use crate::ty::{PrimitiveType, Type};

/// The underlying type system the masked rules are layered on
pub trait ScalarTyping: Send + Sync {
    /// Result of `lhs op rhs`, or `None` if the operator is undefined for them
    fn binary(&self, op: BinaryOp, lhs: &Type, rhs: &Type) -> Option<Type>;

    /// Result of `op operand`
    fn unary(&self, op: UnaryOp, operand: &Type) -> Option<Type>;

    /// Common type of two unmasked types
    fn unify(&self, a: &Type, b: &Type) -> Option<Type>;

    /// Whether a value of `from` may be explicitly converted to `to`
    fn can_cast(&self, from: &Type, to: &Type) -> bool;
}

/// NumPy-style numeric promotion with datetime arithmetic
#[derive(Debug, Default, Clone, Copy)]
pub struct NumericPromotion;

use PrimitiveType as P;

fn promote_integers(a: P, b: P) -> P {
    let (wa, wb) = (a.bit_width().unwrap_or(64), b.bit_width().unwrap_or(64));
    if a.is_signed_integer() == b.is_signed_integer() {
        let bits = wa.max(wb);
        let promoted = if a.is_signed_integer() {
            P::signed(bits)
        } else {
            P::unsigned(bits)
        };
        return promoted.unwrap_or(P::Int64);
    }

    let (signed_bits, unsigned_bits) = if a.is_signed_integer() { (wa, wb) } else { (wb, wa) };
    if unsigned_bits < signed_bits {
        P::signed(signed_bits).unwrap_or(P::Int64)
    } else if unsigned_bits < 64 {
        P::signed(unsigned_bits * 2).unwrap_or(P::Int64)
    } else {
        // uint64 mixed with any signed integer has no integer home
        P::Float64
    }
}

/// Promotion among numbers and bools; `None` if either side is not numeric-like
fn promote_numeric(a: P, b: P) -> Option<P> {
    let numeric_like = |p: P| p.is_numeric() || p.is_boolean();
    if !numeric_like(a) || !numeric_like(b) {
        return None;
    }
    match (a, b) {
        (P::Boolean, P::Boolean) => Some(P::Boolean),
        (P::Boolean, other) | (other, P::Boolean) => Some(other),
        _ if a.is_float() && b.is_float() => Some(if a == P::Float64 || b == P::Float64 {
            P::Float64
        } else {
            P::Float32
        }),
        _ if a.is_float() || b.is_float() => {
            let (float, int) = if a.is_float() { (a, b) } else { (b, a) };
            let small_int = int.bit_width().is_some_and(|w| w <= 16);
            Some(if float == P::Float32 && small_int {
                P::Float32
            } else {
                P::Float64
            })
        }
        _ => Some(promote_integers(a, b)),
    }
}

fn temporal_arithmetic(op: BinaryOp, a: P, b: P) -> Option<P> {
    match (op, a, b) {
        (BinaryOp::Sub, P::Datetime(u), P::Datetime(v)) => Some(P::Timedelta(u.finer(v))),
        (BinaryOp::Add | BinaryOp::Sub, P::Datetime(u), P::Timedelta(v)) => {
            Some(P::Datetime(u.finer(v)))
        }
        (BinaryOp::Add, P::Timedelta(u), P::Datetime(v)) => Some(P::Datetime(u.finer(v))),
        (BinaryOp::Add | BinaryOp::Sub | BinaryOp::Mod, P::Timedelta(u), P::Timedelta(v)) => {
            Some(P::Timedelta(u.finer(v)))
        }
        (BinaryOp::TrueDiv, P::Timedelta(_), P::Timedelta(_)) => Some(P::Float64),
        (BinaryOp::FloorDiv, P::Timedelta(_), P::Timedelta(_)) => Some(P::Int64),
        (BinaryOp::Mul | BinaryOp::TrueDiv, P::Timedelta(u), n) if n.is_numeric() => {
            Some(P::Timedelta(u))
        }
        (BinaryOp::FloorDiv, P::Timedelta(u), n) if n.is_integer() => Some(P::Timedelta(u)),
        (BinaryOp::Mul, n, P::Timedelta(u)) if n.is_numeric() => Some(P::Timedelta(u)),
        _ => None,
    }
}

impl NumericPromotion {
    fn binary_primitive(&self, op: BinaryOp, a: P, b: P) -> Option<P> {
        if a == P::Opaque || b == P::Opaque {
            return None;
        }

        match op.category() {
            OpCategory::Comparison => match (a, b) {
                (P::Datetime(_), P::Datetime(_)) | (P::Timedelta(_), P::Timedelta(_)) => {
                    Some(P::Boolean)
                }
                _ => promote_numeric(a, b).map(|_| P::Boolean),
            },
            OpCategory::Bitwise => {
                if a.is_float() || b.is_float() {
                    return None;
                }
                promote_numeric(a, b)
            }
            OpCategory::Arithmetic => {
                if a.is_temporal() || b.is_temporal() {
                    return temporal_arithmetic(op, a, b);
                }
                let promoted = promote_numeric(a, b)?;
                Some(match (op, promoted) {
                    (BinaryOp::TrueDiv, p) if !p.is_float() => P::Float64,
                    (_, P::Boolean) => P::Int64,
                    (_, p) => p,
                })
            }
        }
    }

    fn unary_primitive(&self, op: UnaryOp, p: P) -> Option<P> {
        match op {
            UnaryOp::Pos | UnaryOp::Neg => match p {
                P::Boolean => Some(P::Int64),
                P::Timedelta(_) => Some(p),
                _ if p.is_numeric() => Some(p),
                _ => None,
            },
            UnaryOp::Not => (p.is_numeric() || p.is_boolean()).then_some(P::Boolean),
            UnaryOp::Invert => (p.is_integer() || p.is_boolean()).then_some(p),
            UnaryOp::Math(f) => {
                if !(p.is_numeric() || p.is_boolean()) {
                    None
                } else if f.rounds_to_integer() {
                    Some(P::Int64)
                } else if p == P::Float32 {
                    Some(P::Float32)
                } else {
                    Some(P::Float64)
                }
            }
        }
    }
}

impl ScalarTyping for NumericPromotion {
    fn binary(&self, op: BinaryOp, lhs: &Type, rhs: &Type) -> Option<Type> {
        match (lhs, rhs) {
            (Type::Primitive(a), Type::Primitive(b)) => {
                self.binary_primitive(op, *a, *b).map(Type::Primitive)
            }
            (l, r) if l.is_string_like() && r.is_string_like() => {
                (op.category() == OpCategory::Comparison).then_some(Type::Primitive(P::Boolean))
            }
            _ => None,
        }
    }

    fn unary(&self, op: UnaryOp, operand: &Type) -> Option<Type> {
        let p = operand.as_primitive()?;
        self.unary_primitive(op, p).map(Type::Primitive)
    }

    fn unify(&self, a: &Type, b: &Type) -> Option<Type> {
        if a == b {
            return Some(a.clone());
        }
        match (a, b) {
            (Type::Primitive(x), Type::Primitive(y)) => match (*x, *y) {
                (P::Datetime(u), P::Datetime(v)) => Some(P::Datetime(u.finer(v)).into()),
                (P::Timedelta(u), P::Timedelta(v)) => Some(P::Timedelta(u.finer(v)).into()),
                (x, y) => promote_numeric(x, y).map(Type::Primitive),
            },
            (x, y) if x.is_string_like() && y.is_string_like() => Some(Type::OwnedString),
            _ => None,
        }
    }

    fn can_cast(&self, from: &Type, to: &Type) -> bool {
        if from == to {
            return true;
        }
        match (from, to) {
            (Type::Primitive(a), Type::Primitive(b)) => {
                let numeric_like = |p: &P| p.is_numeric() || p.is_boolean();
                (numeric_like(a) && numeric_like(b))
                    || matches!(
                        (a, b),
                        (P::Datetime(_), P::Datetime(_)) | (P::Timedelta(_), P::Timedelta(_))
                    )
            }
            (f, Type::OwnedString) => f.is_string_like(),
            _ => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ops::MathFn;
    use crate::ty::TimeUnit;

    fn bin(op: BinaryOp, a: P, b: P) -> Option<Type> {
        NumericPromotion.binary(op, &a.into(), &b.into())
    }

    #[test]
    fn test_same_width_integers_keep_width() {
        assert_eq!(bin(BinaryOp::Add, P::Int32, P::Int32), Some(P::Int32.into()));
        assert_eq!(bin(BinaryOp::Mul, P::UInt8, P::UInt16), Some(P::UInt16.into()));
    }

    #[test]
    fn test_int_float_promotion() {
        assert_eq!(bin(BinaryOp::Add, P::Int32, P::Float64), Some(P::Float64.into()));
        assert_eq!(bin(BinaryOp::Add, P::Int32, P::Float32), Some(P::Float64.into()));
        assert_eq!(bin(BinaryOp::Add, P::Int16, P::Float32), Some(P::Float32.into()));
    }

    #[test]
    fn test_mixed_signedness() {
        assert_eq!(bin(BinaryOp::Add, P::Int32, P::UInt8), Some(P::Int32.into()));
        assert_eq!(bin(BinaryOp::Add, P::Int32, P::UInt32), Some(P::Int64.into()));
        assert_eq!(bin(BinaryOp::Add, P::Int8, P::UInt64), Some(P::Float64.into()));
    }

    #[test]
    fn test_true_division_is_float() {
        assert_eq!(bin(BinaryOp::TrueDiv, P::Int32, P::Int32), Some(P::Float64.into()));
        assert_eq!(bin(BinaryOp::TrueDiv, P::Float32, P::Float32), Some(P::Float32.into()));
        assert_eq!(bin(BinaryOp::FloorDiv, P::Int32, P::Int64), Some(P::Int64.into()));
    }

    #[test]
    fn test_bool_operands() {
        assert_eq!(bin(BinaryOp::Add, P::Boolean, P::Boolean), Some(P::Int64.into()));
        assert_eq!(bin(BinaryOp::Add, P::Boolean, P::Int16), Some(P::Int16.into()));
        assert_eq!(bin(BinaryOp::BitAnd, P::Boolean, P::Boolean), Some(P::Boolean.into()));
        assert_eq!(bin(BinaryOp::BitOr, P::Float64, P::Int32), None);
    }

    #[test]
    fn test_comparisons() {
        assert_eq!(bin(BinaryOp::Lt, P::Int32, P::Float64), Some(P::Boolean.into()));
        let ns = P::Datetime(TimeUnit::Ns);
        let s = P::Datetime(TimeUnit::S);
        assert_eq!(bin(BinaryOp::Eq, ns, s), Some(P::Boolean.into()));
        assert_eq!(bin(BinaryOp::Eq, ns, P::Int64), None);
        assert_eq!(
            NumericPromotion.binary(BinaryOp::Eq, &Type::OwnedString, &Type::OwnedString),
            Some(P::Boolean.into())
        );
        assert_eq!(
            NumericPromotion.binary(BinaryOp::Add, &Type::OwnedString, &Type::OwnedString),
            None
        );
    }

    #[test]
    fn test_temporal_arithmetic() {
        let dt_ms = P::Datetime(TimeUnit::Ms);
        let dt_ns = P::Datetime(TimeUnit::Ns);
        let td_us = P::Timedelta(TimeUnit::Us);
        assert_eq!(
            bin(BinaryOp::Sub, dt_ms, dt_ns),
            Some(P::Timedelta(TimeUnit::Ns).into())
        );
        assert_eq!(
            bin(BinaryOp::Add, dt_ms, td_us),
            Some(P::Datetime(TimeUnit::Us).into())
        );
        assert_eq!(bin(BinaryOp::Add, dt_ms, dt_ns), None);
        assert_eq!(bin(BinaryOp::Mul, P::Int64, td_us), Some(td_us.into()));
        assert_eq!(bin(BinaryOp::TrueDiv, td_us, td_us), Some(P::Float64.into()));
    }

    #[test]
    fn test_opaque_has_no_operators() {
        assert_eq!(bin(BinaryOp::Add, P::Opaque, P::Int32), None);
        assert_eq!(NumericPromotion.unary(UnaryOp::Neg, &P::Opaque.into()), None);
    }

    #[test]
    fn test_unary() {
        let t = NumericPromotion;
        assert_eq!(t.unary(UnaryOp::Neg, &P::Int8.into()), Some(P::Int8.into()));
        assert_eq!(t.unary(UnaryOp::Neg, &P::Boolean.into()), Some(P::Int64.into()));
        assert_eq!(t.unary(UnaryOp::Not, &P::Float64.into()), Some(P::Boolean.into()));
        assert_eq!(t.unary(UnaryOp::Invert, &P::Float64.into()), None);
        assert_eq!(
            t.unary(UnaryOp::Math(MathFn::Sqrt), &P::Int32.into()),
            Some(P::Float64.into())
        );
        assert_eq!(
            t.unary(UnaryOp::Math(MathFn::Sin), &P::Float32.into()),
            Some(P::Float32.into())
        );
        assert_eq!(
            t.unary(UnaryOp::Math(MathFn::Floor), &P::Float64.into()),
            Some(P::Int64.into())
        );
        assert_eq!(t.unary(UnaryOp::Neg, &Type::OwnedString), None);
    }

    #[test]
    fn test_unify() {
        let t = NumericPromotion;
        assert_eq!(
            t.unify(&P::Int32.into(), &P::Float64.into()),
            Some(P::Float64.into())
        );
        assert_eq!(
            t.unify(&P::Boolean.into(), &P::Int8.into()),
            Some(P::Int8.into())
        );
        assert_eq!(
            t.unify(&Type::StringView, &Type::StringLiteral),
            Some(Type::OwnedString)
        );
        assert_eq!(t.unify(&P::Int32.into(), &Type::OwnedString), None);
        assert_eq!(t.unify(&P::Opaque.into(), &P::Opaque.into()), Some(P::Opaque.into()));
        assert_eq!(t.unify(&P::Opaque.into(), &P::Int32.into()), None);
    }

    #[test]
    fn test_can_cast() {
        let t = NumericPromotion;
        assert!(t.can_cast(&P::Int32.into(), &P::Float64.into()));
        assert!(t.can_cast(&P::Boolean.into(), &P::UInt8.into()));
        assert!(t.can_cast(&Type::StringView, &Type::OwnedString));
        assert!(!t.can_cast(&Type::OwnedString, &Type::StringView));
        assert!(!t.can_cast(&P::Datetime(TimeUnit::Ns).into(), &P::Int64.into()));
    }
}
