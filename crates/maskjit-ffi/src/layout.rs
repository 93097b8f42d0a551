//! Memory layouts of the two string representations
//!
//! Foreign routines receive these by address, so field order and widths are
//! part of the ABI:
//!
//! ```text
//! string_view  { const char* data; int32 bytes; int32 length; }  // length cached, -1 = unknown
//! owned_string { char* data;       int32 bytes; int32 size;   }  // size = allocated capacity
//! ```

use std::cell::Cell;
use std::marker::PhantomData;
use std::mem::ManuallyDrop;

use crate::error::{LayoutError, LayoutResult};

/// Character length not computed yet
pub const UNKNOWN_LENGTH: i32 = -1;

fn checked_len(len: usize) -> LayoutResult<i32> {
    i32::try_from(len).map_err(|_| LayoutError::TooLong { len })
}

// ============================================================================
// StringViewRepr
// ============================================================================

/// Borrowed, read-only span of resident text
///
/// Never allocates or frees; the lifetime ties it to the storage it points into.
#[repr(C)]
#[derive(Debug, Clone)]
pub struct StringViewRepr<'a> {
    data: *const u8,
    bytes: i32,
    length: Cell<i32>,
    _marker: PhantomData<&'a [u8]>,
}

impl<'a> StringViewRepr<'a> {
    /// View `s` without copying
    pub fn new(s: &'a str) -> LayoutResult<Self> {
        Ok(StringViewRepr {
            data: s.as_ptr(),
            bytes: checked_len(s.len())?,
            length: Cell::new(UNKNOWN_LENGTH),
            _marker: PhantomData,
        })
    }

    /// Address of the first byte
    pub fn data(&self) -> *const u8 {
        self.data
    }

    /// Size in bytes
    pub fn size_bytes(&self) -> i32 {
        self.bytes
    }

    /// Number of characters, computed on first use
    pub fn length(&self) -> i32 {
        let cached = self.length.get();
        if cached != UNKNOWN_LENGTH {
            return cached;
        }
        // bytes fits in i32, so the char count does too
        let computed = self.as_str().chars().count() as i32;
        self.length.set(computed);
        computed
    }

    /// Check if [`StringViewRepr::length`] has been computed
    pub fn is_length_cached(&self) -> bool {
        self.length.get() != UNKNOWN_LENGTH
    }

    /// The viewed text
    pub fn as_str(&self) -> &'a str {
        // SAFETY: `data`/`bytes` were taken from a `&'a str` in `new`, and the
        // fields are private so they cannot be changed afterwards.
        unsafe {
            let bytes = std::slice::from_raw_parts(self.data, self.bytes as usize);
            std::str::from_utf8_unchecked(bytes)
        }
    }
}

// ============================================================================
// OwnedStringRepr
// ============================================================================

/// Owning string buffer
///
/// Releases its buffer exactly once, on drop or through [`OwnedStringRepr::into_string`].
#[repr(C)]
#[derive(Debug)]
pub struct OwnedStringRepr {
    data: *mut u8,
    bytes: i32,
    size: i32,
}

// The buffer is exclusively owned, same as a Vec<u8>
unsafe impl Send for OwnedStringRepr {}

impl OwnedStringRepr {
    /// Empty string with no allocation
    pub fn new() -> Self {
        let mut empty = ManuallyDrop::new(Vec::<u8>::new());
        OwnedStringRepr {
            data: empty.as_mut_ptr(),
            bytes: 0,
            size: 0,
        }
    }

    /// Take ownership of `s`'s buffer
    pub fn from_string(s: String) -> LayoutResult<Self> {
        let mut buf = s.into_bytes();
        let bytes = checked_len(buf.len())?;
        if buf.capacity() > i32::MAX as usize {
            buf.shrink_to_fit();
        }
        let size = checked_len(buf.capacity())?;
        let mut buf = ManuallyDrop::new(buf);
        Ok(OwnedStringRepr {
            data: buf.as_mut_ptr(),
            bytes,
            size,
        })
    }

    /// Copy the text of a view into a fresh buffer
    pub fn from_view(view: &StringViewRepr<'_>) -> LayoutResult<Self> {
        Self::from_string(view.as_str().to_owned())
    }

    /// Size in bytes
    pub fn size_bytes(&self) -> i32 {
        self.bytes
    }

    /// Allocated capacity in bytes
    pub fn capacity(&self) -> i32 {
        self.size
    }

    /// The owned text
    pub fn as_str(&self) -> &str {
        // SAFETY: the buffer came from a `String` and is only reachable
        // through `&self`, so it is initialized UTF-8 of `bytes` length.
        unsafe {
            let bytes = std::slice::from_raw_parts(self.data, self.bytes as usize);
            std::str::from_utf8_unchecked(bytes)
        }
    }

    /// Borrow as a view
    pub fn as_view(&self) -> LayoutResult<StringViewRepr<'_>> {
        StringViewRepr::new(self.as_str())
    }

    /// Give the buffer back as a `String`
    pub fn into_string(self) -> String {
        let this = ManuallyDrop::new(self);
        // SAFETY: pointer, length and capacity are exactly those of the Vec
        // taken apart in `from_string`; ManuallyDrop prevents a second free.
        unsafe {
            let buf = Vec::from_raw_parts(this.data, this.bytes as usize, this.size as usize);
            String::from_utf8_unchecked(buf)
        }
    }
}

impl Default for OwnedStringRepr {
    fn default() -> Self {
        Self::new()
    }
}

impl Drop for OwnedStringRepr {
    fn drop(&mut self) {
        // SAFETY: see `into_string`; drop runs at most once.
        unsafe {
            drop(Vec::from_raw_parts(
                self.data,
                self.bytes as usize,
                self.size as usize,
            ));
        }
    }
}

/// Size of `string_view` as seen by foreign code
pub const STRING_VIEW_SIZE: usize = std::mem::size_of::<StringViewRepr<'static>>();

/// Size of `owned_string` as seen by foreign code
pub const OWNED_STRING_SIZE: usize = std::mem::size_of::<OwnedStringRepr>();

#[cfg(target_pointer_width = "64")]
const _: () = {
    assert!(STRING_VIEW_SIZE == 16);
    assert!(OWNED_STRING_SIZE == 16);
};

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_view_length_is_lazy() {
        let text = String::from("héllo");
        let view = StringViewRepr::new(&text).unwrap();
        assert_eq!(view.size_bytes(), 6);
        assert!(!view.is_length_cached());
        assert_eq!(view.length(), 5);
        assert!(view.is_length_cached());
        assert_eq!(view.as_str(), "héllo");
    }

    #[test]
    fn test_owned_round_trip() {
        let owned = OwnedStringRepr::from_string("abc".to_string()).unwrap();
        assert_eq!(owned.size_bytes(), 3);
        assert!(owned.capacity() >= 3);
        assert_eq!(owned.as_str(), "abc");
        assert_eq!(owned.into_string(), "abc");
    }

    #[test]
    fn test_materialize_from_view_copies() {
        let text = "column value".to_string();
        let view = StringViewRepr::new(&text).unwrap();
        let owned = OwnedStringRepr::from_view(&view).unwrap();
        assert_ne!(owned.as_str().as_ptr(), view.data());
        assert_eq!(owned.as_str(), view.as_str());
        assert_eq!(owned.as_view().unwrap().length(), 12);
    }

    #[test]
    fn test_empty_owned() {
        let empty = OwnedStringRepr::default();
        assert_eq!(empty.as_str(), "");
        assert_eq!(empty.capacity(), 0);
        drop(empty);
    }
}
