//! Browser tab and its binding to a native counterpart.
//!
//! A tab holds at most one [`NativeHandle`] at a time. The handle is a
//! back-reference set and cleared by native code; the tab never creates or
//! frees it. Every native-directed call goes through [`Tab::with_native`],
//! which refuses the call while no handle is bound.

use std::fmt;
use std::sync::Arc;

use common::{BridgeError, NativeHandle};
use parking_lot::{Mutex, RwLock};
use url::Url;

use crate::bridge::NativeTabBridge;
use crate::delegate::{RenderQuery, TabDelegate};
use crate::tab_model::HandleLedger;

/// Tab identifier, unique among the tabs sharing a
/// [`HandleLedger`](crate::tab_model::HandleLedger).
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TabId(pub u32);

impl fmt::Display for TabId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Surface identifier.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct SurfaceId(pub u64);

/// Render surface a tab draws into.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ContentSurface {
    id: SurfaceId,
    width: u32,
    height: u32,
}

impl ContentSurface {
    pub fn new(id: SurfaceId, width: u32, height: u32) -> Self {
        Self { id, width, height }
    }

    pub fn id(&self) -> SurfaceId {
        self.id
    }

    pub fn size(&self) -> (u32, u32) {
        (self.width, self.height)
    }
}

/// Managed-side page state.
#[derive(Debug, Default)]
struct PageState {
    url: Option<Url>,
    surface: Option<ContentSurface>,
}

/// Browser tab.
pub struct Tab {
    /// Tab ID.
    id: TabId,
    /// Native counterpart, if bound.
    native: Mutex<Option<NativeHandle>>,
    /// Handles currently bound across the owning model.
    ledger: Arc<HandleLedger>,
    /// Render-preference delegate.
    delegate: TabDelegate,
    /// Page state.
    page: RwLock<PageState>,
}

impl Tab {
    /// Create an unbound tab.
    pub fn new(id: TabId, delegate: TabDelegate, ledger: Arc<HandleLedger>) -> Self {
        Self {
            id,
            native: Mutex::new(None),
            ledger,
            delegate,
            page: RwLock::new(PageState::default()),
        }
    }

    /// Get the tab ID.
    pub fn id(&self) -> TabId {
        self.id
    }

    /// The bound handle, if any.
    pub fn current_handle(&self) -> Option<NativeHandle> {
        *self.native.lock()
    }

    /// Check if a native counterpart is bound.
    pub fn is_bound(&self) -> bool {
        self.current_handle().is_some()
    }

    /// Bind the native counterpart.
    ///
    /// Fails with [`BridgeError::DoubleBind`] if a handle is already bound and
    /// with [`BridgeError::HandleInUse`] if another tab holds `handle`. State
    /// is unchanged on failure.
    pub fn bind(&self, handle: NativeHandle) -> Result<(), BridgeError> {
        let mut native = self.native.lock();
        if let Some(current) = *native {
            return Err(BridgeError::DoubleBind {
                current,
                attempted: handle,
            });
        }
        self.ledger.claim(handle, self.id)?;
        *native = Some(handle);
        tracing::debug!(tab = %self.id, %handle, "native counterpart bound");
        Ok(())
    }

    /// Clear the native counterpart and return the handle that was bound.
    ///
    /// Fails with [`BridgeError::Unbound`] if nothing is bound.
    pub fn unbind(&self) -> Result<NativeHandle, BridgeError> {
        let mut native = self.native.lock();
        let handle = native.take().ok_or(BridgeError::Unbound)?;
        self.ledger.release(handle, self.id);
        tracing::debug!(tab = %self.id, %handle, "native counterpart cleared");
        Ok(handle)
    }

    /// Raw handle value for native callers, `0` when unbound.
    pub fn native_ptr(&self) -> usize {
        NativeHandle::raw_or_sentinel(self.current_handle())
    }

    /// Called by native code once its counterpart is constructed.
    pub fn set_native_ptr(&self, raw: usize) -> Result<(), BridgeError> {
        let result = NativeHandle::from_raw(raw)
            .ok_or(BridgeError::NullHandle)
            .and_then(|handle| self.bind(handle));
        if let Err(err) = result {
            self.protocol_violation("set_native_ptr", err);
        }
        result
    }

    /// Called by native code when its counterpart is destroyed.
    pub fn clear_native_ptr(&self) -> Result<(), BridgeError> {
        match self.unbind() {
            Ok(_) => Ok(()),
            Err(err) => {
                self.protocol_violation("clear_native_ptr", err);
                Err(err)
            }
        }
    }

    /// Native-side misuse of the binding protocol. Fatal with debug assertions.
    fn protocol_violation(&self, call: &str, err: BridgeError) {
        tracing::error!(tab = %self.id, call, error = %err, "bridge protocol violation");
        debug_assert!(false, "tab {}: {call}: {err}", self.id);
    }

    /// Run `f` against the bound handle, or refuse with [`BridgeError::Unbound`].
    ///
    /// Must be called on the UI thread. The handle is read before `f` runs and
    /// the binding lock is not held across the native call, so only the UI
    /// thread's ordering keeps a `clear_native_ptr` from landing in between.
    pub fn with_native<R>(&self, f: impl FnOnce(NativeHandle) -> R) -> Result<R, BridgeError> {
        match self.current_handle() {
            Some(handle) => Ok(f(handle)),
            None => {
                tracing::warn!(tab = %self.id, "refusing native call on unbound tab");
                Err(BridgeError::Unbound)
            }
        }
    }

    /// Build the native counterpart if it does not exist yet.
    pub fn initialize_native(
        self: &Arc<Self>,
        bridge: &dyn NativeTabBridge,
    ) -> Result<NativeHandle, BridgeError> {
        if let Some(handle) = self.current_handle() {
            return Ok(handle);
        }
        bridge.init_tab(self, self.id);
        match self.current_handle() {
            Some(handle) => Ok(handle),
            None => {
                self.protocol_violation("init", BridgeError::Unbound);
                Err(BridgeError::Unbound)
            }
        }
    }

    /// Navigate to `url`.
    pub fn load_url(&self, bridge: &dyn NativeTabBridge, url: &Url) -> Result<(), BridgeError> {
        self.with_native(|handle| bridge.load_url(handle, url))?;
        self.page.write().url = Some(url.clone());
        tracing::info!(tab = %self.id, %url, "navigating");
        Ok(())
    }

    /// Swap in a new render surface. Returns the one it replaced.
    pub fn set_content_surface(
        &self,
        bridge: &dyn NativeTabBridge,
        surface: ContentSurface,
    ) -> Result<Option<ContentSurface>, BridgeError> {
        self.with_native(|handle| bridge.attach_surface(handle, &surface))?;
        Ok(self.page.write().surface.replace(surface))
    }

    /// Detach the render surface without notifying native code.
    pub fn take_content_surface(&self) -> Option<ContentSurface> {
        self.page.write().surface.take()
    }

    /// Ask native code to destroy the counterpart.
    ///
    /// The native side clears the binding through [`Tab::clear_native_ptr`];
    /// after this returns no further native-directed call is accepted.
    pub fn destroy_native(&self, bridge: &dyn NativeTabBridge) -> Result<(), BridgeError> {
        let handle = self.with_native(|handle| {
            bridge.destroy_tab(handle);
            handle
        })?;
        if self.current_handle() == Some(handle) {
            self.protocol_violation("destroy", BridgeError::NotCleared(handle));
            // Never keep a handle whose counterpart is gone.
            let _ = self.unbind();
        }
        self.page.write().surface = None;
        Ok(())
    }

    /// Current URL.
    pub fn url(&self) -> Option<Url> {
        self.page.read().url.clone()
    }

    /// Current render surface.
    pub fn content_surface(&self) -> Option<ContentSurface> {
        self.page.read().surface.clone()
    }

    /// Render-preference delegate.
    pub fn delegate(&self) -> &TabDelegate {
        &self.delegate
    }

    /// Native query: preferred color scheme is dark.
    pub fn is_night_mode_enabled(&self) -> bool {
        self.delegate.resolve(RenderQuery::NightMode)
    }

    /// Native query: auto-darkening allowed.
    pub fn is_force_dark_web_content_enabled(&self) -> bool {
        self.delegate.resolve(RenderQuery::ForceDark)
    }
}

impl fmt::Debug for Tab {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Tab")
            .field("id", &self.id)
            .field("native", &self.current_handle())
            .field("url", &self.url().map(String::from))
            .finish()
    }
}
