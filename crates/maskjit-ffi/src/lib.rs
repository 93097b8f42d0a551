//! maskjit FFI surface
//!
//! The contract between typed user functions and natively implemented string
//! routines: the table of foreign signatures, the memory layouts those
//! routines read and write, and the adaptation applied to launch arguments.

#![warn(missing_docs)]

pub mod bindings;
pub mod error;
pub mod layout;
pub mod marshal;

pub use bindings::{lookup, AbiParam, AbiReturn, AbiType, ForeignFn, ParamRole, STRING_BINDINGS};
pub use error::{LayoutError, LayoutResult};
pub use layout::{
    OwnedStringRepr, StringViewRepr, OWNED_STRING_SIZE, STRING_VIEW_SIZE, UNKNOWN_LENGTH,
};
pub use marshal::{prepare_args, ArgHandler, ArgType, ArgValue, KernelArg, StringPtrArgHandler};
