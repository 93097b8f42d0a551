//! Error types for the foreign string layouts

/// Result type for layout construction
pub type LayoutResult<T> = Result<T, LayoutError>;

/// String layout errors
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum LayoutError {
    /// Byte length does not fit the 32-bit size field
    #[error("String of {len} bytes exceeds the 32-bit size field")]
    TooLong {
        /// Length in bytes
        len: usize,
    },
}
