//! Resolved call signatures

use std::fmt;

use maskjit_types::Type;

/// Argument and result types a rule settled on for one operation
///
/// `args` are the types the backend should see at the call, which may differ
/// from the operand types written in source when a conversion is implied.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Signature {
    /// Result type
    pub ret: Type,
    /// Argument types, receiver excluded
    pub args: Vec<Type>,
    /// Receiver of a bound method
    pub recv: Option<Type>,
}

impl Signature {
    /// Free-standing signature
    pub fn new(ret: Type, args: Vec<Type>) -> Self {
        Signature {
            ret,
            args,
            recv: None,
        }
    }

    /// Bound-method signature
    pub fn bound(recv: Type, ret: Type, args: Vec<Type>) -> Self {
        Signature {
            ret,
            args,
            recv: Some(recv),
        }
    }
}

impl fmt::Display for Signature {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if let Some(recv) = &self.recv {
            write!(f, "{}.", recv)?;
        }
        write!(f, "(")?;
        for (i, arg) in self.args.iter().enumerate() {
            if i > 0 {
                write!(f, ", ")?;
            }
            write!(f, "{}", arg)?;
        }
        write!(f, ") -> {}", self.ret)
    }
}
