//! Cross-platform application paths using the `dirs` crate.
//!
//! Layout:
//!
//! Config dir (settings):
//!   Windows: %APPDATA%\calmmind\
//!   macOS:   ~/Library/Application Support/calmmind/
//!   Linux:   ~/.config/calmmind/
//!
//! Data dir (session store, saved narrations):
//!   Windows: %LOCALAPPDATA%\calmmind\
//!   macOS:   ~/Library/Application Support/calmmind/
//!   Linux:   ~/.local/share/calmmind/

use std::path::PathBuf;

/// Holds all resolved application directory/file paths.
#[derive(Debug, Clone)]
pub struct AppPaths {
    /// Directory for `settings.toml`.
    pub config_dir: PathBuf,
    /// Full path to `settings.toml`.
    pub settings_file: PathBuf,
    /// Full path to the JSON session store.
    pub sessions_file: PathBuf,
    /// Directory where the CLI writes narration audio.
    pub narrations_dir: PathBuf,
}

impl AppPaths {
    const APP_NAME: &'static str = "calmmind";

    /// Resolves all paths using the `dirs` crate.
    ///
    /// Falls back to the current directory if the platform cannot provide a
    /// standard path.
    pub fn new() -> Self {
        let config_dir = dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join(Self::APP_NAME);

        let data_dir = dirs::data_local_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join(Self::APP_NAME);

        Self {
            settings_file: config_dir.join("settings.toml"),
            config_dir,
            sessions_file: data_dir.join("sessions.json"),
            narrations_dir: data_dir.join("narrations"),
        }
    }
}

impl Default for AppPaths {
    fn default() -> Self {
        Self::new()
    }
}
