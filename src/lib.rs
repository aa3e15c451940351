//! NarutoVerse chat client
//!
//! Pick a character and chat with a backend-hosted agent whose replies are
//! streamed back chunk by chunk. The library is UI-independent; the `ui`
//! and `views` modules (behind the `desktop`/`mobile` features) drive it
//! from Dioxus.

pub mod api;
pub mod config;
pub mod directory;
pub mod error;
pub mod session;
pub mod storage;
pub mod stream;
pub mod thread;
pub mod transcript;
pub mod types;

#[cfg(feature = "dioxus")]
pub mod theme;
#[cfg(feature = "dioxus")]
pub mod ui;
#[cfg(feature = "dioxus")]
pub mod views;

pub use error::{ChatError, ChatResult};
pub use session::{ChatSession, SendOutcome};
