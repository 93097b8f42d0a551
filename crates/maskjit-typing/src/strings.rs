//! String operation rules
//!
//! Typing for `len` and the bound methods of `Masked(owned_string)`. Result
//! types come from the foreign binding each operation lowers to, so the
//! typing layer and the ABI cannot drift apart.

use std::fmt;
use std::str::FromStr;

use maskjit_ffi::bindings::{self, AbiReturn, ForeignFn};
use maskjit_types::{MaskedType, PrimitiveType, Type, TypeError};

use crate::rules::{OpKey, RuleContext};
use crate::signature::Signature;

/// Primitive a foreign routine's return value is typed as
pub fn abi_result_type(ret: AbiReturn) -> PrimitiveType {
    match ret {
        AbiReturn::Bool => PrimitiveType::Boolean,
        AbiReturn::Length | AbiReturn::Index | AbiReturn::Status => PrimitiveType::Int32,
    }
}

fn require_string_udfs(cx: &RuleContext<'_>, what: impl fmt::Display) -> Result<(), TypeError> {
    if cx.config.string_udfs {
        Ok(())
    } else {
        Err(TypeError::FeatureDisabled {
            feature: format!("string operation `{}`", what),
        })
    }
}

pub(crate) fn len_masked(
    cx: &RuleContext<'_>,
    key: OpKey,
    operands: &[Type],
) -> Result<Signature, TypeError> {
    let [Type::Masked(m)] = operands else {
        return Err(TypeError::no_overload(key, operands));
    };
    if !m.is_string() {
        return Err(TypeError::no_overload(key, operands));
    }
    require_string_udfs(cx, key)?;

    let ret = Type::masked(abi_result_type(bindings::LENGTH.ret));
    Ok(Signature::new(ret, operands.to_vec()))
}

pub(crate) fn len_plain(
    _cx: &RuleContext<'_>,
    _key: OpKey,
    operands: &[Type],
) -> Result<Signature, TypeError> {
    let ret = Type::Primitive(abi_result_type(bindings::LENGTH.ret));
    Ok(Signature::new(ret, operands.to_vec()))
}

/// Methods bound on `Masked(owned_string)`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StringMethod {
    /// `s.startswith(prefix)`
    StartsWith,
    /// `s.endswith(suffix)`
    EndsWith,
    /// `s.find(sub)`
    Find,
    /// `s.rfind(sub)`
    RFind,
    /// `s.upper()`
    Upper,
    /// `s.lower()`
    Lower,
}

impl StringMethod {
    /// Every bound method
    pub const ALL: [StringMethod; 6] = [
        StringMethod::StartsWith,
        StringMethod::EndsWith,
        StringMethod::Find,
        StringMethod::RFind,
        StringMethod::Upper,
        StringMethod::Lower,
    ];

    /// Attribute name
    pub fn name(self) -> &'static str {
        self.binding().name
    }

    /// The routine this method lowers to
    pub fn binding(self) -> &'static ForeignFn {
        match self {
            StringMethod::StartsWith => &bindings::STARTSWITH,
            StringMethod::EndsWith => &bindings::ENDSWITH,
            StringMethod::Find => &bindings::FIND,
            StringMethod::RFind => &bindings::RFIND,
            StringMethod::Upper => &bindings::UPPER,
            StringMethod::Lower => &bindings::LOWER,
        }
    }

    /// Number of explicit arguments; the receiver is the routine's first input
    pub fn arity(self) -> usize {
        self.binding().inputs().count().saturating_sub(1)
    }

    /// Result type of a call
    ///
    /// Routines that write a destination produce a new masked string; the
    /// others return their scalar result unmasked.
    pub fn result_type(self) -> Type {
        let binding = self.binding();
        if binding.has_output() {
            Type::Masked(MaskedType::owned_string())
        } else {
            Type::Primitive(abi_result_type(binding.ret))
        }
    }

    /// Type a call on `recv` with `args`
    pub fn signature(
        self,
        cx: &RuleContext<'_>,
        recv: &Type,
        args: &[Type],
    ) -> Result<Signature, TypeError> {
        if !recv.as_masked().is_some_and(MaskedType::is_string) {
            return Err(TypeError::UnknownAttribute {
                ty: recv.to_string(),
                attr: self.name().to_string(),
            });
        }
        require_string_udfs(cx, self)?;

        if args.len() != self.arity() {
            return Err(TypeError::ArgumentCount {
                callee: self.to_string(),
                expected: self.arity(),
                actual: args.len(),
            });
        }

        let expected = Type::Masked(MaskedType::owned_string());
        if let Some(bad) = args.iter().find(|arg| **arg != expected) {
            return Err(TypeError::ArgumentMismatch {
                callee: self.to_string(),
                expected: expected.to_string(),
                actual: bad.to_string(),
            });
        }

        let sig = Signature::bound(recv.clone(), self.result_type(), args.to_vec());
        log::debug!("{} {} resolved", self, sig);
        Ok(sig)
    }
}

impl fmt::Display for StringMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for StringMethod {
    type Err = TypeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|m| m.name() == s)
            .ok_or_else(|| TypeError::Parse {
                input: s.to_string(),
                reason: "unknown string method".to_string(),
            })
    }
}
