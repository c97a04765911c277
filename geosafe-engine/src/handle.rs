//! Opaque handle and sentinel types shared by every engine implementation.
//!
//! Handles are plain non-zero ids. A handle carries no lifetime and no
//! ownership: whether it still refers to anything is decided by the engine at
//! call time, the same way a raw pointer into a C library would be.

use std::fmt;
use std::num::NonZeroU64;

/// Handle to one initialized engine context.
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct ContextHandle(NonZeroU64);

impl ContextHandle {
    /// Wrap a raw id. Returns `None` for the null id (0).
    pub fn from_raw(raw: u64) -> Option<Self> {
        NonZeroU64::new(raw).map(Self)
    }

    /// Raw id of this handle.
    pub fn as_raw(self) -> u64 {
        self.0.get()
    }
}

impl fmt::Debug for ContextHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ctx#{}", self.0)
    }
}

/// Handle to one geometry allocated inside a context.
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct GeomHandle(NonZeroU64);

impl GeomHandle {
    /// Wrap a raw id. Returns `None` for the null id (0).
    pub fn from_raw(raw: u64) -> Option<Self> {
        NonZeroU64::new(raw).map(Self)
    }

    /// Raw id of this handle.
    pub fn as_raw(self) -> u64 {
        self.0.get()
    }
}

impl fmt::Debug for GeomHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "geom#{}", self.0)
    }
}

/// Three-valued predicate result.
///
/// Raw encoding is `0 = false`, `1 = true`, `2 = exception`. Any other raw
/// value is treated as an exception.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum Ternary {
    False = 0,
    True = 1,
    Exception = 2,
}

impl Ternary {
    /// Decode a raw predicate byte.
    pub fn from_raw(raw: u8) -> Self {
        match raw {
            0 => Ternary::False,
            1 => Ternary::True,
            _ => Ternary::Exception,
        }
    }

    /// Raw predicate byte.
    pub fn as_raw(self) -> u8 {
        self as u8
    }
}

impl From<bool> for Ternary {
    fn from(value: bool) -> Self {
        if value {
            Ternary::True
        } else {
            Ternary::False
        }
    }
}
