//! Attribute lookup on masked values

use maskjit_types::{PrimitiveType, Type, TypeError};

use crate::rules::RuleContext;
use crate::strings::StringMethod;

/// What `recv.name` refers to
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Attribute {
    /// Data member of the given type
    Member(Type),
    /// Bound string method; only valid as the callee of a call
    Method(StringMethod),
}

/// Resolve `recv.name`
///
/// Every masked type exposes `value` and `valid`. Masked strings also expose
/// the string methods.
pub fn resolve_attribute(
    cx: &RuleContext<'_>,
    recv: &Type,
    name: &str,
) -> Result<Attribute, TypeError> {
    let unknown = || TypeError::UnknownAttribute {
        ty: recv.to_string(),
        attr: name.to_string(),
    };

    let Type::Masked(masked) = recv else {
        return Err(unknown());
    };

    match name {
        "value" => Ok(Attribute::Member(masked.value_type())),
        "valid" => Ok(Attribute::Member(PrimitiveType::Boolean.into())),
        _ => {
            let method = name
                .parse::<StringMethod>()
                .ok()
                .filter(|_| masked.is_string())
                .ok_or_else(unknown)?;
            if !cx.config.string_udfs {
                return Err(TypeError::FeatureDisabled {
                    feature: format!("string operation `{}`", method),
                });
            }
            Ok(Attribute::Method(method))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::TypingConfig;
    use maskjit_types::{MaskedType, NumericPromotion};

    #[test]
    fn test_value_and_valid() {
        let config = TypingConfig::default();
        let cx = RuleContext::new(&NumericPromotion, &config);
        let m = Type::masked(PrimitiveType::Float32);

        assert_eq!(
            resolve_attribute(&cx, &m, "value"),
            Ok(Attribute::Member(PrimitiveType::Float32.into()))
        );
        assert_eq!(
            resolve_attribute(&cx, &m, "valid"),
            Ok(Attribute::Member(PrimitiveType::Boolean.into()))
        );
        assert!(resolve_attribute(&cx, &m, "upper").is_err());
    }

    #[test]
    fn test_string_methods() {
        let config = TypingConfig::default();
        let cx = RuleContext::new(&NumericPromotion, &config);
        let s = Type::Masked(MaskedType::owned_string());

        assert_eq!(
            resolve_attribute(&cx, &s, "value"),
            Ok(Attribute::Member(Type::OwnedString))
        );
        assert_eq!(
            resolve_attribute(&cx, &s, "endswith"),
            Ok(Attribute::Method(StringMethod::EndsWith))
        );
        assert_eq!(
            resolve_attribute(&cx, &s, "strip"),
            Err(TypeError::UnknownAttribute {
                ty: "Masked(owned_string)".to_string(),
                attr: "strip".to_string(),
            })
        );
    }

    #[test]
    fn test_unmasked_receivers_have_no_attributes() {
        let config = TypingConfig::default();
        let cx = RuleContext::new(&NumericPromotion, &config);
        assert!(resolve_attribute(&cx, &PrimitiveType::Int32.into(), "value").is_err());
        assert!(resolve_attribute(&cx, &Type::Null, "valid").is_err());
    }
}
