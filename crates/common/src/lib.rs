//! Common types shared by the embedding shell crates.

pub mod error;
pub mod handle;
pub mod process;

pub use error::{AppError, BridgeError, EmbedResult, StartupError};
pub use handle::NativeHandle;
pub use process::{LibraryProcessType, ProcessRole, ProcessState};
