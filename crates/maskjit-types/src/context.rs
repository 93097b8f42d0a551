//! Type context for managing types and type interning

use crate::error::TypeError;
use crate::ty::{MaskedType, PrimitiveType, Type};
use rustc_hash::FxHashMap;
use std::fmt;
use std::sync::Arc;

/// Unique identifier for a type in the type context
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TypeId(pub(crate) u32);

impl TypeId {
    /// Raw index into the context
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

impl fmt::Display for TypeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "TypeId({})", self.0)
    }
}

/// Type context that manages all types seen while compiling one function
///
/// Identical types get the same TypeId, and masked types are cached per value
/// type, so equality of ids is equality of types.
#[derive(Debug, Clone)]
pub struct TypeContext {
    /// Storage for all types, indexed by TypeId
    types: Vec<Arc<Type>>,

    /// Reverse mapping from Type to TypeId for interning
    type_to_id: FxHashMap<Type, TypeId>,

    /// Value TypeId to the TypeId of its masked type
    masked: FxHashMap<TypeId, TypeId>,
}

impl Default for TypeContext {
    fn default() -> Self {
        Self::new()
    }
}

impl TypeContext {
    /// Well-known TypeId of `NA`
    pub const NULL: TypeId = TypeId(0);
    /// Well-known TypeId of `string_view`
    pub const STRING_VIEW: TypeId = TypeId(1);
    /// Well-known TypeId of `owned_string`
    pub const OWNED_STRING: TypeId = TypeId(2);
    /// Well-known TypeId of string literals
    pub const STRING_LITERAL: TypeId = TypeId(3);
    /// Well-known TypeId of `bool`
    pub const BOOLEAN: TypeId = TypeId(4);

    /// Create a context with the singleton types pre-interned
    pub fn new() -> Self {
        let mut ctx = TypeContext {
            types: Vec::new(),
            type_to_id: FxHashMap::default(),
            masked: FxHashMap::default(),
        };

        // Order fixes the well-known ids above
        ctx.intern(Type::Null);
        ctx.intern(Type::StringView);
        ctx.intern(Type::OwnedString);
        ctx.intern(Type::StringLiteral);
        for p in PrimitiveType::all() {
            ctx.intern(Type::Primitive(p));
        }

        log::trace!("type context initialized with {} singletons", ctx.len());
        ctx
    }

    /// Intern a type, returning its TypeId
    pub fn intern(&mut self, ty: Type) -> TypeId {
        if let Some(&id) = self.type_to_id.get(&ty) {
            return id;
        }

        let id = TypeId(self.types.len() as u32);
        self.types.push(Arc::new(ty.clone()));
        self.type_to_id.insert(ty, id);
        id
    }

    /// Get a type by its TypeId
    pub fn get(&self, id: TypeId) -> Option<&Type> {
        self.types.get(id.index()).map(|arc| arc.as_ref())
    }

    /// Look up a type's ID without interning
    pub fn lookup(&self, ty: &Type) -> Option<TypeId> {
        self.type_to_id.get(ty).copied()
    }

    /// Number of interned types
    pub fn len(&self) -> usize {
        self.types.len()
    }

    /// Check if nothing is interned
    pub fn is_empty(&self) -> bool {
        self.types.is_empty()
    }

    /// Display name of an interned type
    pub fn name(&self, id: TypeId) -> String {
        match self.get(id) {
            Some(ty) => ty.to_string(),
            None => id.to_string(),
        }
    }

    /// TypeId of a primitive
    pub fn primitive(&mut self, p: PrimitiveType) -> TypeId {
        self.intern(Type::Primitive(p))
    }

    /// The masked type over `value`, cached per value id
    pub fn masked(&mut self, value: TypeId) -> Result<TypeId, TypeError> {
        if let Some(&id) = self.masked.get(&value) {
            return Ok(id);
        }

        let value_ty = self.get(value).ok_or_else(|| TypeError::UnsupportedValueType {
            found: value.to_string(),
            supported: crate::ty::SUPPORTED_VALUE_KINDS.to_string(),
        })?;
        let masked = MaskedType::new(value_ty)?;
        let id = self.intern(Type::Masked(masked));
        self.masked.insert(value, id);
        Ok(id)
    }

    /// TypeId of the value type of a masked type
    pub fn value_type_of(&mut self, masked: TypeId) -> Option<TypeId> {
        let value = self.get(masked)?.as_masked()?.value_type();
        Some(self.intern(value))
    }
}
