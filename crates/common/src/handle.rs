//! Opaque references to native-side counterparts.

use std::fmt;
use std::num::NonZeroUsize;

/// Pointer-width identifier of a native object.
///
/// A handle is never zero; the unbound state is `Option::None` on the managed
/// side and the raw value `0` when exposed across the boundary.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NativeHandle(NonZeroUsize);

impl NativeHandle {
    /// Raw sentinel meaning "no native counterpart".
    pub const UNBOUND: usize = 0;

    /// Wrap a raw value received from native code. Returns `None` for the sentinel.
    pub fn from_raw(raw: usize) -> Option<Self> {
        NonZeroUsize::new(raw).map(Self)
    }

    /// The raw pointer-width value.
    pub fn as_raw(self) -> usize {
        self.0.get()
    }

    /// Raw value of an optional handle, with `0` for `None`.
    pub fn raw_or_sentinel(handle: Option<Self>) -> usize {
        handle.map_or(Self::UNBOUND, Self::as_raw)
    }
}

impl fmt::Display for NativeHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:#x}", self.0)
    }
}
