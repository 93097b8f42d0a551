//! Launch-argument adaptation
//!
//! The generic launch machinery only understands flat scalars, arrays and raw
//! addresses. Arguments declared as `owned_string*` point at a struct whose
//! first field is itself a pointer, so they are narrowed to a bare `uint64`
//! address before crossing the boundary. Nothing here touches typing.

use std::fmt;

use maskjit_types::PrimitiveType;

use crate::layout::OwnedStringRepr;

// ============================================================================
// Kernel arguments
// ============================================================================

/// Declared type of a launch argument
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ArgType {
    /// Scalar passed by value
    Scalar(PrimitiveType),
    /// Column buffer
    Array(PrimitiveType),
    /// Address of an `owned_string`
    OwnedStringPtr,
    /// Address of a `string_view`
    StringViewPtr,
    /// Raw 64-bit address
    UInt64,
}

impl fmt::Display for ArgType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ArgType::Scalar(p) => write!(f, "{}", p),
            ArgType::Array(p) => write!(f, "{}[:]", p),
            ArgType::OwnedStringPtr => write!(f, "owned_string*"),
            ArgType::StringViewPtr => write!(f, "string_view*"),
            ArgType::UInt64 => write!(f, "uint64"),
        }
    }
}

/// Runtime payload of a launch argument
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ArgValue {
    /// Signed integer or temporal tick count
    Int(i64),
    /// Unsigned integer
    UInt(u64),
    /// Floating point
    Float(f64),
    /// Boolean
    Bool(bool),
    /// Pointer, as an address
    Address(u64),
}

/// One argument on its way to a launch
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct KernelArg {
    /// Declared type
    pub ty: ArgType,
    /// Payload
    pub value: ArgValue,
}

impl KernelArg {
    /// Argument with an explicit type and payload
    pub fn new(ty: ArgType, value: ArgValue) -> Self {
        KernelArg { ty, value }
    }

    /// Pass an owned string by address
    ///
    /// The caller keeps `s` alive until the launch completes.
    pub fn owned_string(s: &OwnedStringRepr) -> Self {
        let addr = s as *const OwnedStringRepr as usize as u64;
        KernelArg::new(ArgType::OwnedStringPtr, ArgValue::Address(addr))
    }
}

// ============================================================================
// Handlers
// ============================================================================

/// Rewrites arguments before they reach the launch machinery
pub trait ArgHandler {
    /// Return the argument to pass in place of `arg`
    fn prepare_arg(&self, arg: KernelArg) -> KernelArg;
}

/// Narrows `owned_string*` arguments to `uint64` addresses
#[derive(Debug, Default, Clone, Copy)]
pub struct StringPtrArgHandler;

impl ArgHandler for StringPtrArgHandler {
    fn prepare_arg(&self, arg: KernelArg) -> KernelArg {
        match (arg.ty, arg.value) {
            (ArgType::OwnedStringPtr, ArgValue::Address(addr)) => {
                log::trace!("narrowing owned_string* at {:#x} to uint64", addr);
                KernelArg::new(ArgType::UInt64, ArgValue::UInt(addr))
            }
            _ => arg,
        }
    }
}

/// Run every argument through every handler, in order
pub fn prepare_args(handlers: &[&dyn ArgHandler], args: Vec<KernelArg>) -> Vec<KernelArg> {
    args.into_iter()
        .map(|arg| handlers.iter().fold(arg, |arg, h| h.prepare_arg(arg)))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_owned_string_pointer_is_narrowed() {
        let s = OwnedStringRepr::from_string("abc".to_string()).unwrap();
        let arg = KernelArg::owned_string(&s);
        let expected = &s as *const OwnedStringRepr as usize as u64;

        let prepared = StringPtrArgHandler.prepare_arg(arg);
        assert_eq!(prepared.ty, ArgType::UInt64);
        assert_eq!(prepared.value, ArgValue::UInt(expected));
    }

    #[test]
    fn test_other_arguments_pass_through() {
        let args = [
            KernelArg::new(ArgType::Scalar(PrimitiveType::Int32), ArgValue::Int(7)),
            KernelArg::new(ArgType::Array(PrimitiveType::Float64), ArgValue::Address(0x1000)),
            KernelArg::new(ArgType::StringViewPtr, ArgValue::Address(0x2000)),
            KernelArg::new(ArgType::Scalar(PrimitiveType::Boolean), ArgValue::Bool(true)),
        ];
        for arg in args {
            assert_eq!(StringPtrArgHandler.prepare_arg(arg), arg);
        }
    }

    #[test]
    fn test_prepare_args_keeps_order() {
        let handler = StringPtrArgHandler;
        let args = vec![
            KernelArg::new(ArgType::Scalar(PrimitiveType::Int64), ArgValue::Int(1)),
            KernelArg::new(ArgType::OwnedStringPtr, ArgValue::Address(0xdead)),
        ];
        let prepared = prepare_args(&[&handler], args);
        assert_eq!(prepared.len(), 2);
        assert_eq!(prepared[0].value, ArgValue::Int(1));
        assert_eq!(prepared[1].ty, ArgType::UInt64);
        assert_eq!(prepared[1].value, ArgValue::UInt(0xdead));
    }

    #[test]
    fn test_arg_type_display() {
        assert_eq!(ArgType::Array(PrimitiveType::Int8).to_string(), "int8[:]");
        assert_eq!(ArgType::OwnedStringPtr.to_string(), "owned_string*");
    }
}
