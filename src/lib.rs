//! # homebrew-dl
//!
//! Backend library for homebrew-store client applications on handheld
//! consoles: fetch remote files (catalog stores, packages, fonts) over HTTPS
//! onto local storage, persist user settings and install metadata, and drive
//! the settings-menu state machine a frontend renders.
//!
//! ## Design Philosophy
//!
//! - **Library-first** - No rendering or input polling; the frontend owns the
//!   frame loop and feeds events in
//! - **Caller-owned state** - Every download owns its accumulation buffer, so
//!   concurrent transfers are safe by construction
//! - **Safe defaults** - TLS certificate verification is on unless explicitly
//!   disabled; destination-write failures are surfaced, never swallowed
//! - **Boot resilience** - Missing config, metadata, or store files degrade to
//!   defaults and an "invalid store" state instead of refusing to start
//!
//! ## Quick Start
//!
//! ```no_run
//! use homebrew_dl::{App, DownloadOptions};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let app = App::initialize("/mnt/sd/homebrew-dl").await?;
//!
//!     // Install a package into the configured app directory.
//!     let destination = app.config().directories.app_dir.join("game.bin");
//!     app.fetcher()
//!         .download_to_file(
//!             "https://example.com/game.bin",
//!             &destination,
//!             &DownloadOptions::default(),
//!         )
//!         .await?;
//!
//!     app.shutdown().await?;
//!     Ok(())
//! }
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::unwrap_used)]
#![warn(clippy::expect_used)]

/// Application bootstrap and wiring
pub mod app;
/// Growable accumulation buffer for in-flight transfers
pub mod buffer;
/// Configuration types
pub mod config;
/// Error types
pub mod error;
/// HTTPS fetch engine
pub mod fetch;
/// Install metadata
pub mod meta;
/// Settings menu state machine
pub mod settings;
/// Catalog store handle
pub mod store;
/// Utility functions
pub mod utils;

// Re-export commonly used types
pub use app::App;
pub use buffer::ChunkBuffer;
pub use config::{Config, FetchConfig};
pub use error::{Error, Result};
pub use fetch::{DownloadOptions, Fetcher, ProgressFn};
pub use meta::MetaStore;
pub use settings::{InputEvent, Key, Page, SettingsAction, SettingsMenu};
pub use store::{CatalogStore, StoreInfo};
