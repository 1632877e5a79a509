//! Managed-side shell objects.
//!
//! This crate provides the objects the presentation layer works with:
//! - Tabs and their binding to native counterparts
//! - The tab container
//! - Render-preference delegation
//! - User notices

pub mod bridge;
pub mod delegate;
pub mod notice;
pub mod tab;
pub mod tab_model;

pub use bridge::NativeTabBridge;
pub use delegate::{FixedPreferences, RenderPreferenceProvider, RenderQuery, TabDelegate};
pub use notice::Notice;
pub use tab::{ContentSurface, SurfaceId, Tab, TabId};
pub use tab_model::{HandleLedger, TabModel};
