//! Unification at control-flow joins
//!
//! Computes the type of a variable that can be reached from several paths,
//! e.g. a name assigned a masked value in one branch and `NA` in another.

use crate::error::TypeError;
use crate::scalar::ScalarTyping;
use crate::ty::{MaskedType, Type};

/// Join-point type resolution layered on an underlying [`ScalarTyping`]
#[derive(Clone, Copy)]
pub struct Unifier<'a> {
    scalar: &'a dyn ScalarTyping,
}

impl<'a> Unifier<'a> {
    /// Create a unifier over the given scalar rules
    pub fn new(scalar: &'a dyn ScalarTyping) -> Self {
        Unifier { scalar }
    }

    /// Common type of `a` and `b`
    ///
    /// Symmetric; never mutates its inputs. The error names both candidates so
    /// the caller can report it at the join site.
    pub fn unify(&self, a: &Type, b: &Type) -> Result<Type, TypeError> {
        let unified = match (a, b) {
            // Masked absorbs NA, its value type is unchanged
            (Type::Masked(_), Type::Null) => Ok(a.clone()),

            // NA against Masked defers to the rule above
            (Type::Null, Type::Masked(_)) => self.unify(b, a),

            (Type::Masked(m1), Type::Masked(m2)) => {
                self.lift(&m1.value_type(), &m2.value_type(), a, b)
            }

            (Type::Masked(m), other) | (other, Type::Masked(m)) => {
                self.lift(&m.value_type(), other, a, b)
            }

            (Type::Null, Type::Null) => Ok(Type::Null),

            // A bare value meeting NA becomes masked
            (Type::Null, other) | (other, Type::Null) => Ok(MaskedType::new(other)?.into()),

            _ => self
                .scalar
                .unify(a, b)
                .ok_or_else(|| TypeError::cannot_unify(a, b)),
        };

        match &unified {
            Ok(ty) => log::debug!("unify({}, {}) = {}", a, b, ty),
            Err(err) => log::debug!("unify({}, {}) failed: {}", a, b, err),
        }
        unified
    }

    fn lift(&self, x: &Type, y: &Type, a: &Type, b: &Type) -> Result<Type, TypeError> {
        let inner = self
            .scalar
            .unify(x, y)
            .ok_or_else(|| TypeError::cannot_unify(a, b))?;
        Ok(MaskedType::new(&inner)?.into())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scalar::NumericPromotion;
    use crate::ty::PrimitiveType as P;

    fn unifier() -> Unifier<'static> {
        Unifier::new(&NumericPromotion)
    }

    #[test]
    fn test_masked_absorbs_null_both_orders() {
        let u = unifier();
        let m = Type::masked(P::Int16);
        assert_eq!(u.unify(&m, &Type::Null), Ok(m.clone()));
        assert_eq!(u.unify(&Type::Null, &m), Ok(m));
    }

    #[test]
    fn test_masked_masked_promotes() {
        let u = unifier();
        assert_eq!(
            u.unify(&Type::masked(P::Int32), &Type::masked(P::Float64)),
            Ok(Type::masked(P::Float64))
        );
    }

    #[test]
    fn test_masked_masked_incompatible() {
        let u = unifier();
        let a = Type::masked(P::Int32);
        let b = Type::Masked(MaskedType::owned_string());
        assert_eq!(
            u.unify(&a, &b),
            Err(TypeError::UnificationFailed {
                left: "Masked(int32)".to_string(),
                right: "Masked(owned_string)".to_string(),
            })
        );
    }

    #[test]
    fn test_masked_scalar_both_orders() {
        let u = unifier();
        let m = Type::masked(P::Int32);
        let f: Type = P::Float64.into();
        assert_eq!(u.unify(&m, &f), Ok(Type::masked(P::Float64)));
        assert_eq!(u.unify(&f, &m), Ok(Type::masked(P::Float64)));
    }

    #[test]
    fn test_null_rules() {
        let u = unifier();
        assert_eq!(u.unify(&Type::Null, &Type::Null), Ok(Type::Null));
        assert_eq!(
            u.unify(&Type::Null, &P::Int64.into()),
            Ok(Type::masked(P::Int64))
        );
        assert_eq!(
            u.unify(&Type::StringView, &Type::Null),
            Ok(Type::Masked(MaskedType::owned_string()))
        );
        assert!(matches!(
            u.unify(&Type::Null, &Type::external("decimal128")),
            Err(TypeError::UnsupportedValueType { .. })
        ));
    }

    #[test]
    fn test_if_elif_else_chain() {
        // if/elif/else assigning Masked(int64), int64 and NA to one name
        let u = unifier();
        let first = u.unify(&Type::masked(P::Int64), &P::Int64.into()).unwrap();
        assert_eq!(u.unify(&first, &Type::Null), Ok(Type::masked(P::Int64)));
    }
}
