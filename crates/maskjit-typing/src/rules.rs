//! Operator typing table
//!
//! Every typed operation is looked up by its [`OpKey`] and the kinds of its
//! operands. The table is built once, on first use, by walking the fixed
//! operator lists, and is read-only afterwards.
//!
//! | operands              | result                                   |
//! |-----------------------|------------------------------------------|
//! | `Masked ⊙ Masked`     | `Masked(scalar(⊙, a.value, b.value))`    |
//! | `Masked ⊙ NA`         | the masked operand, unchanged            |
//! | `Masked ⊙ x`          | `Masked(scalar(⊙, a.value, x))`          |
//! | `⊙ Masked`            | `Masked(scalar(⊙, a.value))`             |
//! | `Masked is NA`        | `bool`                                   |
//! | `bool(Masked(bool))`  | `bool`                                   |
//! | `return Masked`       | unchanged                                |
//! | `return p`, primitive | `Masked(p)`, valid forced true           |
//!
//! Anything not listed declines with [`TypeError::NoApplicableOperator`].

use std::fmt;
use std::sync::LazyLock;

use maskjit_types::{
    BinaryOp, MaskedType, PrimitiveType, ScalarTyping, Type, TypeError, TypeKind, UnaryOp,
};
use rustc_hash::FxHashMap;

use crate::config::TypingConfig;
use crate::signature::Signature;
use crate::strings;

/// Operation being typed
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum OpKey {
    /// Binary operator
    Binary(BinaryOp),
    /// Unary operator or math function
    Unary(UnaryOp),
    /// Identity test against `NA`
    Is,
    /// Truthiness of a branch condition
    Truth,
    /// Normalization of the function's result
    Pack,
    /// `len(x)`
    Len,
    /// `Masked(value, valid)`
    MaskedCtor,
}

impl fmt::Display for OpKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            OpKey::Binary(op) => write!(f, "{}", op),
            OpKey::Unary(op) => write!(f, "{}", op),
            OpKey::Is => write!(f, "is"),
            OpKey::Truth => write!(f, "bool"),
            OpKey::Pack => write!(f, "return"),
            OpKey::Len => write!(f, "len"),
            OpKey::MaskedCtor => write!(f, "Masked"),
        }
    }
}

/// Operand kinds a rule is registered for
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Arity {
    /// One operand
    Unary(TypeKind),
    /// Two operands, in source order
    Binary(TypeKind, TypeKind),
}

impl Arity {
    /// Pattern of the given operands; `None` for other operand counts
    pub fn of(operands: &[Type]) -> Option<Arity> {
        match operands {
            [a] => Some(Arity::Unary(a.kind())),
            [a, b] => Some(Arity::Binary(a.kind(), b.kind())),
            _ => None,
        }
    }
}

/// What a rule may consult besides its operands
#[derive(Clone, Copy)]
pub struct RuleContext<'a> {
    /// Typing of unmasked values
    pub scalar: &'a dyn ScalarTyping,
    /// Active configuration
    pub config: &'a TypingConfig,
}

impl<'a> RuleContext<'a> {
    /// Create a rule context
    pub fn new(scalar: &'a dyn ScalarTyping, config: &'a TypingConfig) -> Self {
        RuleContext { scalar, config }
    }
}

/// A typing rule
pub type RuleFn = fn(&RuleContext<'_>, OpKey, &[Type]) -> Result<Signature, TypeError>;

static TABLE: LazyLock<OperatorTable> = LazyLock::new(OperatorTable::build);

/// Kinds that take part in operations as plain values
const VALUE_KINDS: [TypeKind; 4] = [
    TypeKind::Primitive,
    TypeKind::StringView,
    TypeKind::OwnedString,
    TypeKind::StringLiteral,
];

/// Mapping from (operation, operand kinds) to typing rule
pub struct OperatorTable {
    rules: FxHashMap<(OpKey, Arity), RuleFn>,
}

impl OperatorTable {
    /// The process-wide table
    pub fn global() -> &'static OperatorTable {
        &TABLE
    }

    fn build() -> Self {
        use TypeKind::{Masked, Null, OwnedString, Primitive, StringLiteral, StringView};

        let mut table = OperatorTable {
            rules: FxHashMap::default(),
        };

        for op in BinaryOp::all() {
            let key = OpKey::Binary(op);
            table.insert(key, Arity::Binary(Masked, Masked), masked_masked);
            table.insert(key, Arity::Binary(Masked, Null), masked_null);
            table.insert(key, Arity::Binary(Null, Masked), masked_null);
            for kind in VALUE_KINDS {
                table.insert(key, Arity::Binary(Masked, kind), masked_value);
                table.insert(key, Arity::Binary(kind, Masked), masked_value);
                for other in VALUE_KINDS {
                    table.insert(key, Arity::Binary(kind, other), plain_binary);
                }
            }
        }

        for op in UnaryOp::all() {
            table.insert(OpKey::Unary(op), Arity::Unary(Masked), masked_unary);
            table.insert(OpKey::Unary(op), Arity::Unary(Primitive), plain_unary);
        }

        table.insert(OpKey::Is, Arity::Binary(Masked, Null), is_null);
        table.insert(OpKey::Is, Arity::Binary(Null, Masked), is_null);

        table.insert(OpKey::Truth, Arity::Unary(Masked), truth);
        table.insert(OpKey::Truth, Arity::Unary(Primitive), truth);

        // Only primitives are wrapped on return; bare strings decline
        table.insert(OpKey::Pack, Arity::Unary(Masked), pack_masked);
        table.insert(OpKey::Pack, Arity::Unary(Primitive), pack_value);

        for kind in [Primitive, StringView, OwnedString] {
            table.insert(OpKey::MaskedCtor, Arity::Binary(kind, Primitive), masked_ctor);
        }

        table.insert(OpKey::Len, Arity::Unary(Masked), strings::len_masked);
        for kind in [StringLiteral, StringView, OwnedString] {
            table.insert(OpKey::Len, Arity::Unary(kind), strings::len_plain);
        }

        log::trace!("operator table built with {} rules", table.len());
        table
    }

    fn insert(&mut self, key: OpKey, arity: Arity, rule: RuleFn) {
        self.rules.insert((key, arity), rule);
    }

    /// Number of registered (operation, pattern) pairs
    pub fn len(&self) -> usize {
        self.rules.len()
    }

    /// Check if no rule is registered
    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }

    /// The rule registered for `key` at `arity`
    pub fn rule(&self, key: OpKey, arity: Arity) -> Option<RuleFn> {
        self.rules.get(&(key, arity)).copied()
    }

    /// Type `key` applied to `operands`
    pub fn resolve(
        &self,
        cx: &RuleContext<'_>,
        key: OpKey,
        operands: &[Type],
    ) -> Result<Signature, TypeError> {
        let rule = Arity::of(operands).and_then(|arity| self.rule(key, arity));
        let result = match rule {
            Some(rule) => rule(cx, key, operands),
            None => Err(decline(key, operands)),
        };

        match &result {
            Ok(sig) => log::debug!("{} {} resolved", key, sig),
            Err(err) => log::debug!("{} declined: {}", key, err),
        }
        result
    }
}

fn decline(key: OpKey, operands: &[Type]) -> TypeError {
    match (key, operands) {
        (OpKey::Pack, [ty]) => TypeError::InvalidReturn { ty: ty.to_string() },
        _ => TypeError::no_overload(key, operands),
    }
}

/// The value a masked operand carries; other operands as they are
fn unmasked(ty: &Type) -> Type {
    match ty {
        Type::Masked(m) => m.value_type(),
        other => other.clone(),
    }
}

fn wrap(ty: &Type) -> Result<Type, TypeError> {
    Ok(MaskedType::new(ty)?.into())
}

fn masked_masked(
    cx: &RuleContext<'_>,
    key: OpKey,
    operands: &[Type],
) -> Result<Signature, TypeError> {
    let (OpKey::Binary(op), [Type::Masked(a), Type::Masked(b)]) = (key, operands) else {
        return Err(decline(key, operands));
    };
    let ret = cx
        .scalar
        .binary(op, &a.value_type(), &b.value_type())
        .ok_or_else(|| decline(key, operands))?;
    Ok(Signature::new(wrap(&ret)?, operands.to_vec()))
}

fn masked_null(
    _cx: &RuleContext<'_>,
    key: OpKey,
    operands: &[Type],
) -> Result<Signature, TypeError> {
    let masked = operands
        .iter()
        .find(|ty| ty.is_masked())
        .ok_or_else(|| decline(key, operands))?;
    Ok(Signature::new(masked.clone(), operands.to_vec()))
}

fn masked_value(
    cx: &RuleContext<'_>,
    key: OpKey,
    operands: &[Type],
) -> Result<Signature, TypeError> {
    let (OpKey::Binary(op), [lhs, rhs]) = (key, operands) else {
        return Err(decline(key, operands));
    };
    let ret = cx
        .scalar
        .binary(op, &unmasked(lhs), &unmasked(rhs))
        .ok_or_else(|| decline(key, operands))?;
    Ok(Signature::new(wrap(&ret)?, operands.to_vec()))
}

fn plain_binary(
    cx: &RuleContext<'_>,
    key: OpKey,
    operands: &[Type],
) -> Result<Signature, TypeError> {
    let (OpKey::Binary(op), [lhs, rhs]) = (key, operands) else {
        return Err(decline(key, operands));
    };
    let ret = cx
        .scalar
        .binary(op, lhs, rhs)
        .ok_or_else(|| decline(key, operands))?;
    Ok(Signature::new(ret, operands.to_vec()))
}

fn masked_unary(
    cx: &RuleContext<'_>,
    key: OpKey,
    operands: &[Type],
) -> Result<Signature, TypeError> {
    let (OpKey::Unary(op), [Type::Masked(m)]) = (key, operands) else {
        return Err(decline(key, operands));
    };
    let ret = cx
        .scalar
        .unary(op, &m.value_type())
        .ok_or_else(|| decline(key, operands))?;
    Ok(Signature::new(wrap(&ret)?, operands.to_vec()))
}

fn plain_unary(
    cx: &RuleContext<'_>,
    key: OpKey,
    operands: &[Type],
) -> Result<Signature, TypeError> {
    let (OpKey::Unary(op), [operand]) = (key, operands) else {
        return Err(decline(key, operands));
    };
    let ret = cx
        .scalar
        .unary(op, operand)
        .ok_or_else(|| decline(key, operands))?;
    Ok(Signature::new(ret, operands.to_vec()))
}

// `x is NA` asks about the validity flag, so the answer is never itself missing
fn is_null(
    _cx: &RuleContext<'_>,
    _key: OpKey,
    operands: &[Type],
) -> Result<Signature, TypeError> {
    Ok(Signature::new(PrimitiveType::Boolean.into(), operands.to_vec()))
}

fn truth(
    _cx: &RuleContext<'_>,
    key: OpKey,
    operands: &[Type],
) -> Result<Signature, TypeError> {
    let is_bool = match operands {
        [Type::Masked(m)] => m.primitive() == Some(PrimitiveType::Boolean),
        [Type::Primitive(p)] => p.is_boolean(),
        _ => false,
    };
    if !is_bool {
        return Err(decline(key, operands));
    }
    Ok(Signature::new(PrimitiveType::Boolean.into(), operands.to_vec()))
}

fn pack_masked(
    _cx: &RuleContext<'_>,
    key: OpKey,
    operands: &[Type],
) -> Result<Signature, TypeError> {
    let [ret @ Type::Masked(_)] = operands else {
        return Err(decline(key, operands));
    };
    Ok(Signature::new(ret.clone(), operands.to_vec()))
}

fn pack_value(
    _cx: &RuleContext<'_>,
    key: OpKey,
    operands: &[Type],
) -> Result<Signature, TypeError> {
    let [value] = operands else {
        return Err(decline(key, operands));
    };
    Ok(Signature::new(wrap(value)?, operands.to_vec()))
}

fn masked_ctor(
    cx: &RuleContext<'_>,
    key: OpKey,
    operands: &[Type],
) -> Result<Signature, TypeError> {
    let [value, valid] = operands else {
        return Err(decline(key, operands));
    };

    let boolean = Type::Primitive(PrimitiveType::Boolean);
    if *valid != boolean {
        return Err(TypeError::ArgumentMismatch {
            callee: key.to_string(),
            expected: boolean.to_string(),
            actual: valid.to_string(),
        });
    }

    if let Type::Primitive(PrimitiveType::Datetime(unit) | PrimitiveType::Timedelta(unit)) = value {
        if !cx.config.accepts_unit(*unit) {
            let units: Vec<_> = cx.config.time_units.iter().map(|u| u.as_str()).collect();
            return Err(TypeError::ArgumentMismatch {
                callee: key.to_string(),
                expected: format!("a temporal value in one of [{}]", units.join(", ")),
                actual: value.to_string(),
            });
        }
    }

    Ok(Signature::new(wrap(value)?, vec![value.clone(), boolean]))
}
