//! Foreign string routines
//!
//! Device-side string algorithms live outside the compiled function and are
//! linked in by the backend. This table is the ABI contract: each routine
//! takes string layouts by address and returns a bool or an `int32`.
//! Typing rules for string operations derive their result types from here.

use std::fmt;

use crate::layout::{OwnedStringRepr, StringViewRepr};

/// Pointer argument types understood by the routines
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AbiType {
    /// `owned_string*`
    OwnedStringPtr,
    /// `string_view*`
    StringViewPtr,
}

impl AbiType {
    /// C spelling
    pub fn c_type(self) -> &'static str {
        match self {
            AbiType::OwnedStringPtr => "owned_string*",
            AbiType::StringViewPtr => "string_view*",
        }
    }
}

/// Whether the routine reads or writes through a parameter
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ParamRole {
    /// Read only
    Input,
    /// Destination the routine writes its result into
    Output,
}

/// One parameter of a foreign routine
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct AbiParam {
    /// Pointer type
    pub ty: AbiType,
    /// Read or write
    pub role: ParamRole,
}

impl AbiParam {
    const fn input(ty: AbiType) -> Self {
        AbiParam {
            ty,
            role: ParamRole::Input,
        }
    }

    const fn output(ty: AbiType) -> Self {
        AbiParam {
            ty,
            role: ParamRole::Output,
        }
    }
}

/// Return value of a foreign routine
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AbiReturn {
    /// `bool` predicate result
    Bool,
    /// `int32` character length
    Length,
    /// `int32` character index, `-1` when not found
    Index,
    /// `int32` status; non-negative is the number of bytes written
    Status,
}

impl AbiReturn {
    /// C spelling
    pub fn c_type(self) -> &'static str {
        match self {
            AbiReturn::Bool => "bool",
            AbiReturn::Length | AbiReturn::Index | AbiReturn::Status => "int32_t",
        }
    }
}

/// Declared signature of an externally implemented routine
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ForeignFn {
    /// Link name
    pub name: &'static str,
    /// Parameters, all by address
    pub params: &'static [AbiParam],
    /// Return value
    pub ret: AbiReturn,
}

impl ForeignFn {
    /// Number of parameters
    pub fn arity(&self) -> usize {
        self.params.len()
    }

    /// Parameters the routine only reads
    pub fn inputs(&self) -> impl Iterator<Item = &AbiParam> {
        self.params.iter().filter(|p| p.role == ParamRole::Input)
    }

    /// Whether the routine writes into a destination string
    pub fn has_output(&self) -> bool {
        self.params.iter().any(|p| p.role == ParamRole::Output)
    }
}

impl fmt::Display for ForeignFn {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}(", self.ret.c_type(), self.name)?;
        for (i, param) in self.params.iter().enumerate() {
            if i > 0 {
                write!(f, ", ")?;
            }
            if param.role == ParamRole::Input {
                write!(f, "const ")?;
            }
            write!(f, "{}", param.ty.c_type())?;
        }
        write!(f, ")")
    }
}

const OWNED_IN: AbiParam = AbiParam::input(AbiType::OwnedStringPtr);
const OWNED_OUT: AbiParam = AbiParam::output(AbiType::OwnedStringPtr);
const VIEW_IN: AbiParam = AbiParam::input(AbiType::StringViewPtr);

/// Character length of an owned string
pub static LENGTH: ForeignFn = ForeignFn {
    name: "length",
    params: &[OWNED_IN],
    ret: AbiReturn::Length,
};

/// Prefix test
pub static STARTSWITH: ForeignFn = ForeignFn {
    name: "startswith",
    params: &[OWNED_IN, OWNED_IN],
    ret: AbiReturn::Bool,
};

/// Suffix test
pub static ENDSWITH: ForeignFn = ForeignFn {
    name: "endswith",
    params: &[OWNED_IN, OWNED_IN],
    ret: AbiReturn::Bool,
};

/// First occurrence of a substring
pub static FIND: ForeignFn = ForeignFn {
    name: "find",
    params: &[OWNED_IN, OWNED_IN],
    ret: AbiReturn::Index,
};

/// Last occurrence of a substring
pub static RFIND: ForeignFn = ForeignFn {
    name: "rfind",
    params: &[OWNED_IN, OWNED_IN],
    ret: AbiReturn::Index,
};

/// Uppercase `src` into `dst`
pub static UPPER: ForeignFn = ForeignFn {
    name: "upper",
    params: &[OWNED_IN, OWNED_OUT],
    ret: AbiReturn::Status,
};

/// Lowercase `src` into `dst`
pub static LOWER: ForeignFn = ForeignFn {
    name: "lower",
    params: &[OWNED_IN, OWNED_OUT],
    ret: AbiReturn::Status,
};

/// Copy a view into an owned string
pub static MATERIALIZE_FROM_VIEW: ForeignFn = ForeignFn {
    name: "materialize_from_view",
    params: &[VIEW_IN, OWNED_OUT],
    ret: AbiReturn::Status,
};

/// Every routine the backend must link against
pub static STRING_BINDINGS: [&ForeignFn; 8] = [
    &LENGTH,
    &STARTSWITH,
    &ENDSWITH,
    &FIND,
    &RFIND,
    &UPPER,
    &LOWER,
    &MATERIALIZE_FROM_VIEW,
];

/// Find a routine by link name
pub fn lookup(name: &str) -> Option<&'static ForeignFn> {
    STRING_BINDINGS.iter().copied().find(|f| f.name == name)
}

// Host-side shapes of the routines, for backends that resolve them to addresses

/// `length`
pub type LengthFn = unsafe extern "C" fn(*const OwnedStringRepr) -> i32;
/// `startswith`, `endswith`
pub type PredicateFn = unsafe extern "C" fn(*const OwnedStringRepr, *const OwnedStringRepr) -> bool;
/// `find`, `rfind`
pub type SearchFn = unsafe extern "C" fn(*const OwnedStringRepr, *const OwnedStringRepr) -> i32;
/// `upper`, `lower`
pub type CaseFn = unsafe extern "C" fn(*const OwnedStringRepr, *mut OwnedStringRepr) -> i32;
/// `materialize_from_view`
pub type MaterializeFn =
    for<'a> unsafe extern "C" fn(*const StringViewRepr<'a>, *mut OwnedStringRepr) -> i32;
