//! Settings menu state machine
//!
//! The frontend owns rendering; this module owns everything else about the
//! settings screen: which page is open, which row is highlighted, how
//! directional input moves the cursor (with the per-page wraparound rules),
//! and what a confirmed or touched row does.
//!
//! Effects come in two flavors. Plain config mutations (toggles, language,
//! theme) are applied directly to the [`Config`] passed into
//! [`SettingsMenu::handle_input`]. Everything that needs the frontend (open
//! a picker, show credits, download or unload the font, leave the screen,
//! exit the app) is returned as [`SettingsAction`] values for the caller to
//! perform.
//!
//! Touch input is hit-tested against the same fixed screen-space rectangles
//! the renderer draws, exported as constants here so both sides agree.

use crate::config::Config;
use std::path::PathBuf;

/// A screen-space hit rectangle, bounds inclusive
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Rect {
    /// Left edge
    pub x: u16,
    /// Top edge
    pub y: u16,
    /// Width
    pub w: u16,
    /// Height
    pub h: u16,
}

impl Rect {
    /// Construct a rectangle
    #[must_use]
    pub const fn new(x: u16, y: u16, w: u16, h: u16) -> Self {
        Self { x, y, w, h }
    }

    /// True if the point lies inside, edges included
    #[must_use]
    pub const fn contains(&self, x: u16, y: u16) -> bool {
        x >= self.x && x <= self.x + self.w && y >= self.y && y <= self.y + self.h
    }
}

/// Row hit-rectangles shared by the main, directory, and language pages
pub const ROW_BUTTONS: [Rect; 7] = [
    Rect::new(45, 32, 271, 22),
    Rect::new(45, 62, 271, 22),
    Rect::new(45, 92, 271, 22),
    Rect::new(45, 122, 271, 22),
    Rect::new(45, 152, 271, 22),
    Rect::new(45, 182, 271, 22),
    Rect::new(45, 212, 271, 22),
];

/// Toggle boxes on the auto-update and GUI pages
pub const TOGGLE_BUTTONS: [Rect; 2] = [Rect::new(288, 44, 24, 24), Rect::new(288, 120, 24, 24)];

/// Back arrow shown on every sub-page
pub const BACK_BUTTON: Rect = Rect::new(45, 0, 24, 24);

/// Theme bar on the GUI page
pub const THEME_BAR: Rect = Rect::new(40, 220, 280, 24);

/// Add-font button on the language page
pub const ADD_FONT_BUTTON: Rect = Rect::new(45, 220, 16, 16);

/// Rows visible at once in the language list
const LANGUAGE_WINDOW: usize = 6;

/// A selectable language
#[derive(Clone, Copy, Debug)]
pub struct Language {
    /// Language code stored in the config (e.g. "de")
    pub code: &'static str,
    /// Display name in the language itself
    pub name: &'static str,
    /// Whether this language needs the downloadable font to render
    pub needs_custom_font: bool,
}

/// Supported languages, in display order
pub const LANGUAGES: &[Language] = &[
    Language { code: "br", name: "Bruh", needs_custom_font: false },
    Language { code: "de", name: "Deutsch", needs_custom_font: false },
    Language { code: "en", name: "English", needs_custom_font: false },
    Language { code: "es", name: "Español", needs_custom_font: false },
    Language { code: "fr", name: "Français", needs_custom_font: false },
    Language { code: "it", name: "Italiano", needs_custom_font: false },
    Language { code: "hu", name: "Magyar", needs_custom_font: false },
    Language { code: "pl", name: "Polski", needs_custom_font: false },
    Language { code: "pt-BR", name: "Português (Brasil)", needs_custom_font: false },
    Language { code: "ru", name: "Русский", needs_custom_font: false },
    // Spelled with a latin i with dieresis to render in the stock font
    Language { code: "uk", name: "Украïнська", needs_custom_font: true },
    Language { code: "jp", name: "日本語", needs_custom_font: false },
];

/// Number of rows on the main page
const MAIN_ITEMS: usize = 7;
/// Number of rows on the directory page
const DIR_ITEMS: usize = 5;

/// Settings screen pages
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum Page {
    /// Top-level settings list
    #[default]
    Main,
    /// Directory path settings
    Directories,
    /// Boot-time auto-update toggles
    AutoUpdate,
    /// Appearance toggles and theme selection
    Gui,
    /// Language list
    Language,
}

/// Logical input keys
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Key {
    /// Move selection up
    Up,
    /// Move selection down
    Down,
    /// Fast-move selection backward
    Left,
    /// Fast-move selection forward
    Right,
    /// Activate the selected row
    Confirm,
    /// Leave the current page
    Back,
}

/// One input event fed to the state machine
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum InputEvent {
    /// Key newly pressed this frame
    Press(Key),
    /// Key repeat while held; drives cursor movement like a fresh press
    Repeat(Key),
    /// Touch at screen coordinates
    Touch {
        /// Touch x coordinate
        x: u16,
        /// Touch y coordinate
        y: u16,
    },
}

/// A config directory the user can repoint
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum DirectoryKind {
    /// Executable applications
    Apps,
    /// ROM files
    Roms,
    /// Downloaded archives
    Archives,
    /// Launcher shortcuts
    Shortcuts,
    /// Firmware payloads
    Firmware,
}

/// Directory rows on the directory page, in display order
const DIRECTORY_ROWS: [DirectoryKind; DIR_ITEMS] = [
    DirectoryKind::Apps,
    DirectoryKind::Roms,
    DirectoryKind::Archives,
    DirectoryKind::Shortcuts,
    DirectoryKind::Firmware,
];

impl DirectoryKind {
    /// Store a picked path into the matching config field
    pub fn assign(self, config: &mut Config, path: PathBuf) {
        match self {
            DirectoryKind::Apps => config.directories.app_dir = path,
            DirectoryKind::Roms => config.directories.rom_dir = path,
            DirectoryKind::Archives => config.directories.archive_dir = path,
            DirectoryKind::Shortcuts => config.directories.shortcut_dir = path,
            DirectoryKind::Firmware => config.directories.firmware_dir = path,
        }
    }

    /// Read the matching config field
    #[must_use]
    pub fn get(self, config: &Config) -> &PathBuf {
        match self {
            DirectoryKind::Apps => &config.directories.app_dir,
            DirectoryKind::Roms => &config.directories.rom_dir,
            DirectoryKind::Archives => &config.directories.archive_dir,
            DirectoryKind::Shortcuts => &config.directories.shortcut_dir,
            DirectoryKind::Firmware => &config.directories.firmware_dir,
        }
    }
}

/// An effect the frontend must perform
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SettingsAction {
    /// Open the store-selection overlay
    SelectStore,
    /// Open a directory picker; apply the result via [`DirectoryKind::assign`]
    SelectDirectory(DirectoryKind),
    /// Show the credits overlay
    ShowCredits,
    /// Leave the settings screen (back to browsing)
    LeaveSettings,
    /// Exit the application
    Exit,
    /// Download the custom font (skip if already cached on storage)
    DownloadFont,
    /// Load the custom font
    LoadFont,
    /// Unload the custom font
    UnloadFont,
    /// The active language changed; reload localized strings
    LanguageChanged,
}

/// Settings menu page/selection state machine
///
/// # Examples
///
/// ```
/// use homebrew_dl::config::Config;
/// use homebrew_dl::settings::{InputEvent, Key, Page, SettingsMenu};
///
/// let mut menu = SettingsMenu::new();
/// let mut config = Config::default();
///
/// // Move down twice and confirm: opens the auto-update page.
/// menu.handle_input(InputEvent::Repeat(Key::Down), &mut config);
/// menu.handle_input(InputEvent::Repeat(Key::Down), &mut config);
/// let actions = menu.handle_input(InputEvent::Press(Key::Confirm), &mut config);
/// assert_eq!(menu.page(), Page::AutoUpdate);
/// assert!(actions.is_empty());
/// ```
#[derive(Clone, Debug)]
pub struct SettingsMenu {
    page: Page,
    selection: usize,
    /// First visible row of the language list
    scroll: usize,
    /// Number of installed themes the theme row cycles through
    theme_count: usize,
}

impl Default for SettingsMenu {
    fn default() -> Self {
        Self {
            page: Page::Main,
            selection: 0,
            scroll: 0,
            theme_count: 1,
        }
    }
}

impl SettingsMenu {
    /// Create a menu on the main page with the default single theme
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// The page currently shown
    #[must_use]
    pub fn page(&self) -> Page {
        self.page
    }

    /// The highlighted row on the current page
    #[must_use]
    pub fn selection(&self) -> usize {
        self.selection
    }

    /// First visible row of the language list
    #[must_use]
    pub fn scroll(&self) -> usize {
        self.scroll
    }

    /// Tell the menu how many themes the theme row cycles through
    ///
    /// Clamped to at least one so cycling stays defined.
    pub fn set_theme_count(&mut self, count: usize) {
        self.theme_count = count.max(1);
    }

    /// Feed one input event; mutates `config` in place and returns the
    /// effects the frontend must perform
    pub fn handle_input(&mut self, event: InputEvent, config: &mut Config) -> Vec<SettingsAction> {
        let actions = match self.page {
            Page::Main => self.handle_main(event),
            Page::Directories => self.handle_directories(event),
            Page::AutoUpdate => self.handle_auto_update(event, config),
            Page::Gui => self.handle_gui(event, config),
            Page::Language => self.handle_language(event, config),
        };
        tracing::trace!(page = ?self.page, selection = self.selection, "settings input handled");
        actions
    }

    /// Movement key extracted from a press or repeat event
    fn movement(event: InputEvent) -> Option<Key> {
        match event {
            InputEvent::Press(k) | InputEvent::Repeat(k)
                if matches!(k, Key::Up | Key::Down | Key::Left | Key::Right) =>
            {
                Some(k)
            }
            _ => None,
        }
    }

    fn handle_main(&mut self, event: InputEvent) -> Vec<SettingsAction> {
        if let Some(key) = Self::movement(event) {
            match key {
                Key::Down => {
                    self.selection = if self.selection < MAIN_ITEMS - 1 {
                        self.selection + 1
                    } else {
                        0
                    };
                }
                Key::Up => {
                    self.selection = if self.selection > 0 {
                        self.selection - 1
                    } else {
                        MAIN_ITEMS - 1
                    };
                }
                // The fast-move stride is larger than the page, so these
                // always land on the last/first row.
                Key::Right => self.selection = MAIN_ITEMS - 1,
                Key::Left => self.selection = 0,
                _ => {}
            }
            return Vec::new();
        }

        match event {
            InputEvent::Press(Key::Back) => {
                self.selection = 0;
                vec![SettingsAction::LeaveSettings]
            }
            InputEvent::Press(Key::Confirm) => self.activate_main_row(self.selection),
            InputEvent::Touch { x, y } => {
                for (i, rect) in ROW_BUTTONS.iter().enumerate() {
                    if rect.contains(x, y) {
                        return self.activate_main_row(i);
                    }
                }
                Vec::new()
            }
            _ => Vec::new(),
        }
    }

    fn activate_main_row(&mut self, row: usize) -> Vec<SettingsAction> {
        match row {
            0 => {
                self.selection = 0;
                self.page = Page::Language;
                Vec::new()
            }
            1 => vec![SettingsAction::SelectStore],
            2 => {
                self.selection = 0;
                self.page = Page::AutoUpdate;
                Vec::new()
            }
            3 => {
                self.selection = 0;
                self.page = Page::Gui;
                Vec::new()
            }
            4 => {
                self.selection = 0;
                self.page = Page::Directories;
                Vec::new()
            }
            5 => vec![SettingsAction::ShowCredits],
            6 => vec![SettingsAction::Exit],
            _ => Vec::new(),
        }
    }

    fn handle_directories(&mut self, event: InputEvent) -> Vec<SettingsAction> {
        if let Some(key) = Self::movement(event) {
            match key {
                Key::Down => {
                    self.selection = if self.selection < DIR_ITEMS - 1 {
                        self.selection + 1
                    } else {
                        0
                    };
                }
                Key::Up => {
                    self.selection = if self.selection > 0 {
                        self.selection - 1
                    } else {
                        DIR_ITEMS - 1
                    };
                }
                Key::Right => self.selection = DIR_ITEMS - 1,
                Key::Left => self.selection = 0,
                _ => {}
            }
            return Vec::new();
        }

        match event {
            InputEvent::Press(Key::Back) => {
                self.back_to_main(4);
                Vec::new()
            }
            InputEvent::Press(Key::Confirm) => {
                vec![SettingsAction::SelectDirectory(DIRECTORY_ROWS[self.selection])]
            }
            InputEvent::Touch { x, y } => {
                if BACK_BUTTON.contains(x, y) {
                    self.back_to_main(4);
                    return Vec::new();
                }
                for (i, kind) in DIRECTORY_ROWS.iter().enumerate() {
                    // Touch activates the row without moving the cursor.
                    if ROW_BUTTONS[i].contains(x, y) {
                        return vec![SettingsAction::SelectDirectory(*kind)];
                    }
                }
                Vec::new()
            }
            _ => Vec::new(),
        }
    }

    fn handle_auto_update(&mut self, event: InputEvent, config: &mut Config) -> Vec<SettingsAction> {
        if let Some(key) = Self::movement(event) {
            // Two rows, no wraparound.
            match key {
                Key::Down if self.selection < 1 => self.selection += 1,
                Key::Up if self.selection > 0 => self.selection -= 1,
                _ => {}
            }
            return Vec::new();
        }

        match event {
            InputEvent::Press(Key::Back) => {
                self.back_to_main(2);
                Vec::new()
            }
            InputEvent::Press(Key::Confirm) => {
                Self::toggle_auto_update_row(config, self.selection);
                Vec::new()
            }
            InputEvent::Touch { x, y } => {
                if BACK_BUTTON.contains(x, y) {
                    self.back_to_main(2);
                } else if TOGGLE_BUTTONS[0].contains(x, y) {
                    Self::toggle_auto_update_row(config, 0);
                } else if TOGGLE_BUTTONS[1].contains(x, y) {
                    Self::toggle_auto_update_row(config, 1);
                }
                Vec::new()
            }
            _ => Vec::new(),
        }
    }

    fn toggle_auto_update_row(config: &mut Config, row: usize) {
        match row {
            0 => config.boot.auto_update_store = !config.boot.auto_update_store,
            1 => config.boot.update_check = !config.boot.update_check,
            _ => {}
        }
    }

    fn handle_gui(&mut self, event: InputEvent, config: &mut Config) -> Vec<SettingsAction> {
        if let Some(key) = Self::movement(event) {
            // Three rows, no wraparound.
            match key {
                Key::Down if self.selection < 2 => self.selection += 1,
                Key::Up if self.selection > 0 => self.selection -= 1,
                _ => {}
            }
            return Vec::new();
        }

        match event {
            InputEvent::Press(Key::Back) => {
                self.back_to_main(3);
                Vec::new()
            }
            InputEvent::Press(Key::Confirm) => self.activate_gui_row(self.selection, config),
            InputEvent::Touch { x, y } => {
                if BACK_BUTTON.contains(x, y) {
                    self.back_to_main(3);
                    Vec::new()
                } else if TOGGLE_BUTTONS[0].contains(x, y) {
                    self.activate_gui_row(0, config)
                } else if TOGGLE_BUTTONS[1].contains(x, y) {
                    self.activate_gui_row(1, config)
                } else if THEME_BAR.contains(x, y) {
                    self.activate_gui_row(2, config)
                } else {
                    Vec::new()
                }
            }
            _ => Vec::new(),
        }
    }

    fn activate_gui_row(&mut self, row: usize, config: &mut Config) -> Vec<SettingsAction> {
        match row {
            0 => {
                config.gui.use_background = !config.gui.use_background;
                Vec::new()
            }
            1 => {
                config.gui.custom_font = !config.gui.custom_font;
                if config.gui.custom_font {
                    vec![SettingsAction::LoadFont]
                } else {
                    vec![SettingsAction::UnloadFont]
                }
            }
            2 => {
                config.theme = if config.theme + 1 < self.theme_count {
                    config.theme + 1
                } else {
                    0
                };
                Vec::new()
            }
            _ => Vec::new(),
        }
    }

    fn handle_language(&mut self, event: InputEvent, config: &mut Config) -> Vec<SettingsAction> {
        let len = LANGUAGES.len();

        if let Some(key) = Self::movement(event) {
            match key {
                Key::Down => {
                    self.selection = if self.selection < len - 1 {
                        self.selection + 1
                    } else {
                        0
                    };
                }
                Key::Up => {
                    self.selection = if self.selection > 0 {
                        self.selection - 1
                    } else {
                        len - 1
                    };
                }
                Key::Right => {
                    self.selection = if self.selection + LANGUAGE_WINDOW < len - 1 {
                        self.selection + LANGUAGE_WINDOW
                    } else {
                        len - 1
                    };
                }
                Key::Left => {
                    self.selection = if self.selection > LANGUAGE_WINDOW {
                        self.selection - LANGUAGE_WINDOW
                    } else {
                        0
                    };
                }
                _ => {}
            }
            self.clamp_language_scroll();
            return Vec::new();
        }

        match event {
            InputEvent::Press(Key::Back) => {
                self.leave_language_page();
                Vec::new()
            }
            InputEvent::Press(Key::Confirm) => self.select_language(self.selection, config),
            InputEvent::Touch { x, y } => {
                if BACK_BUTTON.contains(x, y) {
                    self.leave_language_page();
                    return Vec::new();
                }
                if ADD_FONT_BUTTON.contains(x, y) {
                    config.gui.custom_font = true;
                    return vec![SettingsAction::DownloadFont, SettingsAction::LoadFont];
                }
                for (i, rect) in ROW_BUTTONS.iter().take(LANGUAGE_WINDOW).enumerate() {
                    if rect.contains(x, y) && self.scroll + i < len {
                        let index = self.scroll + i;
                        return self.select_language(index, config);
                    }
                }
                Vec::new()
            }
            _ => Vec::new(),
        }
    }

    /// Apply the language at `index` and return to the main page
    fn select_language(&mut self, index: usize, config: &mut Config) -> Vec<SettingsAction> {
        let language = &LANGUAGES[index];
        let mut actions = Vec::new();

        if language.needs_custom_font {
            config.gui.custom_font = true;
            actions.push(SettingsAction::DownloadFont);
            actions.push(SettingsAction::LoadFont);
        }

        config.language = language.code.to_string();
        actions.push(SettingsAction::LanguageChanged);
        tracing::debug!(language = language.code, "language selected");

        self.leave_language_page();
        actions
    }

    fn leave_language_page(&mut self) {
        self.selection = 0;
        self.scroll = 0;
        self.page = Page::Main;
    }

    fn back_to_main(&mut self, main_selection: usize) {
        self.page = Page::Main;
        self.selection = main_selection;
    }

    /// Keep the language window tracking the selection
    fn clamp_language_scroll(&mut self) {
        if self.selection < self.scroll {
            self.scroll = self.selection;
        } else if self.selection > self.scroll + LANGUAGE_WINDOW - 1 {
            self.scroll = self.selection - LANGUAGE_WINDOW + 1;
        }
    }
}
