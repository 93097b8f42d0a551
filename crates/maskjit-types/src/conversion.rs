//! Explicit conversions between types
//!
//! Masked types with different value types are never interchangeable; anywhere
//! one flows into a slot of the other, a conversion has to be emitted.

use std::fmt;

use crate::error::TypeError;
use crate::scalar::ScalarTyping;
use crate::ty::Type;

/// How a value of one type is turned into another
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Conversion {
    /// Same type, nothing to do
    Exact,
    /// Value cast (numeric width, time unit, or masked value type)
    Cast,
    /// Plain value placed into a masked slot, validity forced true
    WrapValid,
    /// `NA` placed into a masked slot, validity false
    NullToMasked,
    /// String view or literal copied into an owned string
    Materialize,
    /// String view or literal copied into an owned string, then placed into a
    /// masked slot with validity forced true
    MaterializeValid,
}

impl Conversion {
    /// Check if code has to be emitted for this conversion
    pub fn is_noop(self) -> bool {
        self == Conversion::Exact
    }
}

impl fmt::Display for Conversion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Conversion::Exact => "exact",
            Conversion::Cast => "cast",
            Conversion::WrapValid => "wrap-valid",
            Conversion::NullToMasked => "null-to-masked",
            Conversion::Materialize => "materialize",
            Conversion::MaterializeValid => "materialize-valid",
        };
        f.write_str(name)
    }
}

/// Classify the conversion from `from` to `to`
pub fn classify_conversion(
    scalar: &dyn ScalarTyping,
    from: &Type,
    to: &Type,
) -> Result<Conversion, TypeError> {
    if from == to {
        return Ok(Conversion::Exact);
    }

    let incompatible = || TypeError::IncompatibleCast {
        from: from.to_string(),
        to: to.to_string(),
    };

    match (from, to) {
        (Type::Null, Type::Masked(_)) => Ok(Conversion::NullToMasked),
        (Type::Masked(a), Type::Masked(b)) => {
            if scalar.can_cast(&a.value_type(), &b.value_type()) {
                Ok(Conversion::Cast)
            } else {
                Err(incompatible())
            }
        }
        (Type::StringView | Type::StringLiteral, Type::OwnedString) => Ok(Conversion::Materialize),
        // Views never live inside a masked value
        (Type::StringView | Type::StringLiteral, Type::Masked(m)) if m.is_string() => {
            Ok(Conversion::MaterializeValid)
        }
        (value, Type::Masked(m)) if !value.is_null() => {
            if scalar.can_cast(value, &m.value_type()) {
                Ok(Conversion::WrapValid)
            } else {
                Err(incompatible())
            }
        }
        (Type::Primitive(_), Type::Primitive(_)) if scalar.can_cast(from, to) => {
            Ok(Conversion::Cast)
        }
        _ => Err(incompatible()),
    }
}
