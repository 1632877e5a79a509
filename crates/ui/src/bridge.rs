//! Native side of the tab bridge.

use std::sync::Arc;

use common::NativeHandle;
use url::Url;

use crate::tab::{ContentSurface, Tab, TabId};

/// Calls the managed side issues to a tab's native counterpart.
///
/// The native side owns the counterpart's lifetime. It informs the tab of the
/// handle after construction through [`Tab::set_native_ptr`] and clears it
/// through [`Tab::clear_native_ptr`] when the counterpart is destroyed.
pub trait NativeTabBridge: Send + Sync {
    /// Construct the native counterpart for `tab`.
    ///
    /// Must call `tab.set_native_ptr` before returning. Implementations keep
    /// only a weak reference to the tab.
    fn init_tab(&self, tab: &Arc<Tab>, id: TabId);

    /// Navigate the counterpart.
    fn load_url(&self, handle: NativeHandle, url: &Url);

    /// Attach a render surface to the counterpart.
    fn attach_surface(&self, handle: NativeHandle, surface: &ContentSurface);

    /// Destroy the counterpart.
    ///
    /// Must call `clear_native_ptr` on the owning tab if it is still alive.
    fn destroy_tab(&self, handle: NativeHandle);
}
