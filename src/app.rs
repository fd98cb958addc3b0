//! Application bootstrap
//!
//! Wires storage layout, configuration, install metadata, the fetch engine,
//! and the active catalog store together. The frontend owns the frame loop
//! and rendering; it constructs an [`App`] at startup, routes settings input
//! through it, and calls [`App::shutdown`] on exit so config and metadata
//! are persisted.

use crate::config::Config;
use crate::error::Result;
use crate::fetch::Fetcher;
use crate::meta::MetaStore;
use crate::settings::{InputEvent, SettingsAction, SettingsMenu};
use crate::store::CatalogStore;
use std::path::{Path, PathBuf};

/// Config file name under the application root
pub const CONFIG_FILE: &str = "config.json";
/// Install metadata file name under the application root
pub const META_FILE: &str = "meta.json";
/// Directory for catalog store files under the application root
pub const STORES_DIR: &str = "stores";
/// Directory for launcher shortcuts under the application root
pub const SHORTCUTS_DIR: &str = "shortcuts";

/// A bootstrapped application: storage, config, metadata, network, store
pub struct App {
    root: PathBuf,
    config: Config,
    meta: MetaStore,
    store: CatalogStore,
    fetcher: Fetcher,
    settings: SettingsMenu,
}

impl App {
    /// Bootstrap under the given application root
    ///
    /// Creates the directory tree (root, `stores/`, `shortcuts/`), loads
    /// config and metadata (missing files yield defaults), builds the fetch
    /// engine, and opens the default catalog store. An invalid store is
    /// tolerated. When `auto_update_store` is set and the store records an
    /// update URL, the store is refreshed; a failed refresh is logged and
    /// boot proceeds offline.
    pub async fn initialize(root: impl Into<PathBuf>) -> Result<Self> {
        let root = root.into();
        tracing::info!(root = %root.display(), "initializing");

        tokio::fs::create_dir_all(&root).await?;
        tokio::fs::create_dir_all(root.join(STORES_DIR)).await?;
        tokio::fs::create_dir_all(root.join(SHORTCUTS_DIR)).await?;

        let config = Config::load(&root.join(CONFIG_FILE)).await?;
        let meta = MetaStore::load(&root.join(META_FILE)).await?;
        let fetcher = Fetcher::new(config.fetch.clone())?;

        let store_path = root.join(STORES_DIR).join(&config.default_store);
        let mut store = CatalogStore::open(store_path).await;

        if config.boot.auto_update_store && store.is_valid() {
            if let Err(e) = store.refresh(&fetcher).await {
                tracing::warn!(error = %e, "boot store refresh failed, continuing offline");
            }
        }

        Ok(Self {
            root,
            config,
            meta,
            store,
            fetcher,
            settings: SettingsMenu::new(),
        })
    }

    /// The application root directory
    #[must_use]
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Directory catalog store files live in
    #[must_use]
    pub fn stores_dir(&self) -> PathBuf {
        self.root.join(STORES_DIR)
    }

    /// Directory launcher shortcuts are written to
    #[must_use]
    pub fn shortcuts_dir(&self) -> PathBuf {
        self.root.join(SHORTCUTS_DIR)
    }

    /// The loaded configuration
    #[must_use]
    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Mutable access to the configuration
    pub fn config_mut(&mut self) -> &mut Config {
        &mut self.config
    }

    /// The loaded install metadata
    #[must_use]
    pub fn meta(&self) -> &MetaStore {
        &self.meta
    }

    /// Mutable access to the install metadata
    pub fn meta_mut(&mut self) -> &mut MetaStore {
        &mut self.meta
    }

    /// The active catalog store (possibly invalid; check before rendering)
    #[must_use]
    pub fn store(&self) -> &CatalogStore {
        &self.store
    }

    /// Mutable access to the active catalog store
    pub fn store_mut(&mut self) -> &mut CatalogStore {
        &mut self.store
    }

    /// The shared fetch engine
    #[must_use]
    pub fn fetcher(&self) -> &Fetcher {
        &self.fetcher
    }

    /// The settings menu state
    #[must_use]
    pub fn settings(&self) -> &SettingsMenu {
        &self.settings
    }

    /// Mutable access to the settings menu state
    pub fn settings_mut(&mut self) -> &mut SettingsMenu {
        &mut self.settings
    }

    /// Route one input event to the settings menu against the live config
    pub fn settings_input(&mut self, event: InputEvent) -> Vec<SettingsAction> {
        self.settings.handle_input(event, &mut self.config)
    }

    /// Persist config and install metadata without consuming the app
    pub async fn save(&self) -> Result<()> {
        self.config.save(&self.root.join(CONFIG_FILE)).await?;
        self.meta.save(&self.root.join(META_FILE)).await?;
        Ok(())
    }

    /// Persist state and tear the application down
    pub async fn shutdown(self) -> Result<()> {
        tracing::info!("shutting down");
        self.save().await
    }
}
