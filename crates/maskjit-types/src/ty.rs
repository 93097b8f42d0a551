//! Core type definitions for the maskjit type universe

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use std::sync::Arc;

use crate::error::TypeError;

/// Human-readable list of the value kinds a `MaskedType` can hold.
pub const SUPPORTED_VALUE_KINDS: &str = "int8, int16, int32, int64, uint8, uint16, uint32, uint64, \
     float32, float64, bool, datetime64[ns|us|ms|s], timedelta64[ns|us|ms|s], object, \
     string_view, owned_string";

/// Resolution of a temporal value.
///
/// Variants are declared coarse to fine, so `max` picks the finer unit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TimeUnit {
    /// Seconds
    S,
    /// Milliseconds
    Ms,
    /// Microseconds
    Us,
    /// Nanoseconds
    Ns,
}

impl TimeUnit {
    /// Every unit, finest first
    pub const ALL: [TimeUnit; 4] = [TimeUnit::Ns, TimeUnit::Us, TimeUnit::Ms, TimeUnit::S];

    /// Short unit suffix (`ns`, `us`, `ms`, `s`)
    pub fn as_str(self) -> &'static str {
        match self {
            TimeUnit::S => "s",
            TimeUnit::Ms => "ms",
            TimeUnit::Us => "us",
            TimeUnit::Ns => "ns",
        }
    }

    /// The finer of two units
    pub fn finer(self, other: TimeUnit) -> TimeUnit {
        self.max(other)
    }
}

impl fmt::Display for TimeUnit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for TimeUnit {
    type Err = TypeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "s" => Ok(TimeUnit::S),
            "ms" => Ok(TimeUnit::Ms),
            "us" => Ok(TimeUnit::Us),
            "ns" => Ok(TimeUnit::Ns),
            _ => Err(TypeError::Parse {
                input: s.to_string(),
                reason: "expected one of ns, us, ms, s".to_string(),
            }),
        }
    }
}

/// Concrete scalar kinds a compiled function can operate on
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum PrimitiveType {
    /// `bool`
    Boolean,
    /// `int8`
    Int8,
    /// `int16`
    Int16,
    /// `int32`
    Int32,
    /// `int64`
    Int64,
    /// `uint8`
    UInt8,
    /// `uint16`
    UInt16,
    /// `uint32`
    UInt32,
    /// `uint64`
    UInt64,
    /// `float32`
    Float32,
    /// `float64`
    Float64,
    /// Point in time, `datetime64[unit]`
    Datetime(TimeUnit),
    /// Span of time, `timedelta64[unit]`
    Timedelta(TimeUnit),
    /// Dynamic value whose concrete kind is not resolved yet
    Opaque,
}

impl PrimitiveType {
    /// Integer kinds, signed first
    pub const INTEGERS: [PrimitiveType; 8] = [
        PrimitiveType::Int8,
        PrimitiveType::Int16,
        PrimitiveType::Int32,
        PrimitiveType::Int64,
        PrimitiveType::UInt8,
        PrimitiveType::UInt16,
        PrimitiveType::UInt32,
        PrimitiveType::UInt64,
    ];

    /// Floating point kinds
    pub const FLOATS: [PrimitiveType; 2] = [PrimitiveType::Float32, PrimitiveType::Float64];

    /// Every member of the domain, temporal kinds at every unit
    pub fn all() -> Vec<PrimitiveType> {
        let mut all = Vec::with_capacity(20);
        all.push(PrimitiveType::Boolean);
        all.extend(Self::INTEGERS);
        all.extend(Self::FLOATS);
        for unit in TimeUnit::ALL {
            all.push(PrimitiveType::Datetime(unit));
            all.push(PrimitiveType::Timedelta(unit));
        }
        all.push(PrimitiveType::Opaque);
        all
    }

    /// Signed integer of the given width
    pub fn signed(bits: u8) -> Option<PrimitiveType> {
        match bits {
            8 => Some(PrimitiveType::Int8),
            16 => Some(PrimitiveType::Int16),
            32 => Some(PrimitiveType::Int32),
            64 => Some(PrimitiveType::Int64),
            _ => None,
        }
    }

    /// Unsigned integer of the given width
    pub fn unsigned(bits: u8) -> Option<PrimitiveType> {
        match bits {
            8 => Some(PrimitiveType::UInt8),
            16 => Some(PrimitiveType::UInt16),
            32 => Some(PrimitiveType::UInt32),
            64 => Some(PrimitiveType::UInt64),
            _ => None,
        }
    }

    /// Float of the given width
    pub fn float(bits: u8) -> Option<PrimitiveType> {
        match bits {
            32 => Some(PrimitiveType::Float32),
            64 => Some(PrimitiveType::Float64),
            _ => None,
        }
    }

    /// Check if this is a signed or unsigned integer
    pub fn is_integer(&self) -> bool {
        self.is_signed_integer() || self.is_unsigned_integer()
    }

    /// Check if this is a signed integer
    pub fn is_signed_integer(&self) -> bool {
        matches!(
            self,
            PrimitiveType::Int8 | PrimitiveType::Int16 | PrimitiveType::Int32 | PrimitiveType::Int64
        )
    }

    /// Check if this is an unsigned integer
    pub fn is_unsigned_integer(&self) -> bool {
        matches!(
            self,
            PrimitiveType::UInt8
                | PrimitiveType::UInt16
                | PrimitiveType::UInt32
                | PrimitiveType::UInt64
        )
    }

    /// Check if this is a floating point kind
    pub fn is_float(&self) -> bool {
        matches!(self, PrimitiveType::Float32 | PrimitiveType::Float64)
    }

    /// Integers and floats (not bool)
    pub fn is_numeric(&self) -> bool {
        self.is_integer() || self.is_float()
    }

    /// Check if this is `bool`
    pub fn is_boolean(&self) -> bool {
        matches!(self, PrimitiveType::Boolean)
    }

    /// Check if this is a datetime or timedelta
    pub fn is_temporal(&self) -> bool {
        matches!(self, PrimitiveType::Datetime(_) | PrimitiveType::Timedelta(_))
    }

    /// Bit width of integer and float kinds
    pub fn bit_width(&self) -> Option<u8> {
        match self {
            PrimitiveType::Int8 | PrimitiveType::UInt8 => Some(8),
            PrimitiveType::Int16 | PrimitiveType::UInt16 => Some(16),
            PrimitiveType::Int32 | PrimitiveType::UInt32 | PrimitiveType::Float32 => Some(32),
            PrimitiveType::Int64 | PrimitiveType::UInt64 | PrimitiveType::Float64 => Some(64),
            _ => None,
        }
    }

    /// Canonical name, as printed in diagnostics
    pub fn type_name(&self) -> String {
        match self {
            PrimitiveType::Boolean => "bool".to_string(),
            PrimitiveType::Int8 => "int8".to_string(),
            PrimitiveType::Int16 => "int16".to_string(),
            PrimitiveType::Int32 => "int32".to_string(),
            PrimitiveType::Int64 => "int64".to_string(),
            PrimitiveType::UInt8 => "uint8".to_string(),
            PrimitiveType::UInt16 => "uint16".to_string(),
            PrimitiveType::UInt32 => "uint32".to_string(),
            PrimitiveType::UInt64 => "uint64".to_string(),
            PrimitiveType::Float32 => "float32".to_string(),
            PrimitiveType::Float64 => "float64".to_string(),
            PrimitiveType::Datetime(unit) => format!("datetime64[{}]", unit),
            PrimitiveType::Timedelta(unit) => format!("timedelta64[{}]", unit),
            PrimitiveType::Opaque => "object".to_string(),
        }
    }
}

impl fmt::Display for PrimitiveType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.type_name())
    }
}

fn parse_unit_suffix<'a>(s: &'a str, prefix: &str) -> Option<&'a str> {
    s.strip_prefix(prefix)?.strip_prefix('[')?.strip_suffix(']')
}

impl FromStr for PrimitiveType {
    type Err = TypeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        let ty = match s {
            "bool" | "boolean" => PrimitiveType::Boolean,
            "int8" => PrimitiveType::Int8,
            "int16" => PrimitiveType::Int16,
            "int32" => PrimitiveType::Int32,
            "int64" => PrimitiveType::Int64,
            "uint8" => PrimitiveType::UInt8,
            "uint16" => PrimitiveType::UInt16,
            "uint32" => PrimitiveType::UInt32,
            "uint64" => PrimitiveType::UInt64,
            "float32" => PrimitiveType::Float32,
            "float64" => PrimitiveType::Float64,
            "object" => PrimitiveType::Opaque,
            _ => {
                if let Some(unit) = parse_unit_suffix(s, "datetime64") {
                    PrimitiveType::Datetime(unit.parse()?)
                } else if let Some(unit) = parse_unit_suffix(s, "timedelta64") {
                    PrimitiveType::Timedelta(unit.parse()?)
                } else {
                    return Err(TypeError::Parse {
                        input: s.to_string(),
                        reason: "unknown primitive type".to_string(),
                    });
                }
            }
        };
        Ok(ty)
    }
}

impl TryFrom<String> for PrimitiveType {
    type Error = TypeError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<PrimitiveType> for String {
    fn from(value: PrimitiveType) -> Self {
        value.type_name()
    }
}

/// What a masked value can physically hold
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ValueType {
    /// A member of the primitive domain
    Primitive(PrimitiveType),
    /// An owned string; views are materialized before being masked
    OwnedString,
}

/// A value paired with a validity flag
///
/// Physical layout is `{ value: value_type, valid: bool }`. Two masked types
/// are equal iff their value types are equal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct MaskedType {
    value: ValueType,
}

impl MaskedType {
    /// Mask a value of type `value_type`
    ///
    /// String representations degrade to `owned_string`. Anything outside the
    /// supported set fails with a diagnostic listing the supported kinds.
    pub fn new(value_type: &Type) -> Result<MaskedType, TypeError> {
        let value = match value_type {
            Type::Primitive(p) => ValueType::Primitive(*p),
            Type::StringView | Type::OwnedString => ValueType::OwnedString,
            other => {
                return Err(TypeError::UnsupportedValueType {
                    found: other.to_string(),
                    supported: SUPPORTED_VALUE_KINDS.to_string(),
                })
            }
        };
        Ok(MaskedType { value })
    }

    /// Mask a primitive; always succeeds
    pub fn of(primitive: PrimitiveType) -> MaskedType {
        MaskedType {
            value: ValueType::Primitive(primitive),
        }
    }

    /// `Masked(owned_string)`
    pub fn owned_string() -> MaskedType {
        MaskedType {
            value: ValueType::OwnedString,
        }
    }

    /// The stored value kind
    pub fn value(&self) -> ValueType {
        self.value
    }

    /// The stored value kind as a full type
    pub fn value_type(&self) -> Type {
        match self.value {
            ValueType::Primitive(p) => Type::Primitive(p),
            ValueType::OwnedString => Type::OwnedString,
        }
    }

    /// The primitive held, if any
    pub fn primitive(&self) -> Option<PrimitiveType> {
        match self.value {
            ValueType::Primitive(p) => Some(p),
            ValueType::OwnedString => None,
        }
    }

    /// Check if this masks an owned string
    pub fn is_string(&self) -> bool {
        self.value == ValueType::OwnedString
    }

    /// Member layout handed to the code generator
    pub fn fields(&self) -> [(&'static str, Type); 2] {
        [
            ("value", self.value_type()),
            ("valid", Type::Primitive(PrimitiveType::Boolean)),
        ]
    }
}

impl fmt::Display for MaskedType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Masked({})", self.value_type())
    }
}

/// Discriminant of [`Type`], used to key typing rules
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TypeKind {
    /// Primitive scalar
    Primitive,
    /// Borrowed string
    StringView,
    /// Owned string
    OwnedString,
    /// String constant in source
    StringLiteral,
    /// Masked value
    Masked,
    /// Null sentinel
    Null,
    /// Type owned by another subsystem
    External,
}

/// The core type representation
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Type {
    /// Primitive scalar
    Primitive(PrimitiveType),

    /// Borrowed, read-only string span
    StringView,

    /// Owning string buffer
    OwnedString,

    /// String constant appearing in the function body
    StringLiteral,

    /// Value plus validity flag
    Masked(MaskedType),

    /// Type of the null literal `NA`
    Null,

    /// A kind this layer does not model (decimal, list, struct columns, ...)
    External(Arc<str>),
}

impl Type {
    /// `Masked(p)` as a full type
    pub fn masked(primitive: PrimitiveType) -> Type {
        Type::Masked(MaskedType::of(primitive))
    }

    /// External kind by name
    pub fn external(name: &str) -> Type {
        Type::External(Arc::from(name))
    }

    /// Discriminant
    pub fn kind(&self) -> TypeKind {
        match self {
            Type::Primitive(_) => TypeKind::Primitive,
            Type::StringView => TypeKind::StringView,
            Type::OwnedString => TypeKind::OwnedString,
            Type::StringLiteral => TypeKind::StringLiteral,
            Type::Masked(_) => TypeKind::Masked,
            Type::Null => TypeKind::Null,
            Type::External(_) => TypeKind::External,
        }
    }

    /// Check if this type is a primitive type
    pub fn is_primitive(&self) -> bool {
        matches!(self, Type::Primitive(_))
    }

    /// Check if this type is masked
    pub fn is_masked(&self) -> bool {
        matches!(self, Type::Masked(_))
    }

    /// Check if this type is the null sentinel
    pub fn is_null(&self) -> bool {
        matches!(self, Type::Null)
    }

    /// Check if this is one of the two physical string layouts
    pub fn is_string_repr(&self) -> bool {
        matches!(self, Type::StringView | Type::OwnedString)
    }

    /// Check if this is any string-like type, literals included
    pub fn is_string_like(&self) -> bool {
        matches!(self, Type::StringView | Type::OwnedString | Type::StringLiteral)
    }

    /// Get the primitive type if this is a primitive
    pub fn as_primitive(&self) -> Option<PrimitiveType> {
        match self {
            Type::Primitive(p) => Some(*p),
            _ => None,
        }
    }

    /// Get the masked type if this is masked
    pub fn as_masked(&self) -> Option<&MaskedType> {
        match self {
            Type::Masked(m) => Some(m),
            _ => None,
        }
    }
}

impl From<PrimitiveType> for Type {
    fn from(value: PrimitiveType) -> Self {
        Type::Primitive(value)
    }
}

impl From<MaskedType> for Type {
    fn from(value: MaskedType) -> Self {
        Type::Masked(value)
    }
}

impl fmt::Display for Type {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Type::Primitive(p) => write!(f, "{}", p),
            Type::StringView => write!(f, "string_view"),
            Type::OwnedString => write!(f, "owned_string"),
            Type::StringLiteral => write!(f, "Literal[str]"),
            Type::Masked(m) => write!(f, "{}", m),
            Type::Null => write!(f, "NA"),
            Type::External(name) => write!(f, "{}", name),
        }
    }
}

impl FromStr for Type {
    type Err = TypeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        match s {
            "NA" | "na" => return Ok(Type::Null),
            "string_view" => return Ok(Type::StringView),
            "owned_string" => return Ok(Type::OwnedString),
            "Literal[str]" | "str_literal" => return Ok(Type::StringLiteral),
            _ => {}
        }

        if let Some(inner) = s.strip_prefix("Masked(").and_then(|r| r.strip_suffix(')')) {
            let value: Type = inner.parse()?;
            return Ok(Type::Masked(MaskedType::new(&value)?));
        }

        if let Some(name) = s.strip_prefix("ext:") {
            if name.is_empty() {
                return Err(TypeError::Parse {
                    input: s.to_string(),
                    reason: "external type needs a name".to_string(),
                });
            }
            return Ok(Type::external(name));
        }

        Ok(Type::Primitive(s.parse()?))
    }
}
