use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::controller::SessionSettings;
use crate::document_model::record::DEFAULT_TITLE_LENGTH;
use crate::export::DEFAULT_FILENAME_LENGTH;

pub const RC_FILE_NAME: &str = ".jotpadrc";
const APP_DIR: &str = "jotpad";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RcConfig {
    pub store_path: PathBuf,
    pub export_dir: PathBuf,
    pub debounce_ms: u64,
    pub title_length: usize,
    pub filename_length: usize,
    pub log_level: String,
    pub watch: bool,
    pub watch_interval_ms: u64,
    pub tab_stop: usize,
}

impl Default for RcConfig {
    fn default() -> Self {
        Self {
            store_path: RcLoader::data_dir().join("store.json"),
            export_dir: PathBuf::from("."),
            debounce_ms: 500,
            title_length: DEFAULT_TITLE_LENGTH,
            filename_length: DEFAULT_FILENAME_LENGTH,
            log_level: "warn".to_string(),
            watch: true,
            watch_interval_ms: 1000,
            tab_stop: 4,
        }
    }
}

impl RcConfig {
    pub fn session_settings(&self) -> SessionSettings {
        SessionSettings {
            debounce: Duration::from_millis(self.debounce_ms),
            title_length: self.title_length,
            filename_length: self.filename_length,
        }
    }

    /// Polling interval for writes by other processes, `None` when off.
    pub fn watch_interval(&self) -> Option<Duration> {
        self.watch
            .then(|| Duration::from_millis(self.watch_interval_ms))
    }

    /// Where the editor writes its log while it owns the terminal.
    pub fn log_path(&self) -> PathBuf {
        RcLoader::data_dir().join("jotpad.log")
    }
}

pub struct RcLoader;

impl RcLoader {
    /// Get the path to the RC file
    /// Looks for .jotpadrc in:
    /// 1. Current directory
    /// 2. Home directory (~/.jotpadrc)
    pub fn get_rc_path() -> Option<PathBuf> {
        let current_rc = Path::new(RC_FILE_NAME);
        if current_rc.exists() {
            return Some(current_rc.to_path_buf());
        }

        let home_rc = dirs::home_dir()?.join(RC_FILE_NAME);
        home_rc.exists().then_some(home_rc)
    }

    /// Per-user data directory, falling back to the current directory.
    pub fn data_dir() -> PathBuf {
        dirs::data_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join(APP_DIR)
    }

    /// Load and parse the RC file
    pub fn load_config() -> RcConfig {
        let mut config = RcConfig::default();

        if let Some(rc_path) = Self::get_rc_path() {
            match fs::read_to_string(&rc_path) {
                Ok(content) => {
                    Self::parse_config_content(&content, &mut config);
                    tracing::debug!("Loaded config from {:?}", rc_path);
                }
                Err(e) => tracing::warn!("Could not read {:?}: {}", rc_path, e),
            }
        }

        config
    }

    /// Parse the content of an RC file
    pub fn parse_config_content(content: &str, config: &mut RcConfig) {
        for line in content.lines() {
            let line = line.trim();

            // Skip empty lines and comments
            if line.is_empty() || line.starts_with('#') || line.starts_with('"') {
                continue;
            }

            Self::parse_config_line(line, config);
        }
    }

    /// Parse a single configuration line
    fn parse_config_line(line: &str, config: &mut RcConfig) {
        // Remove inline comments
        let line = match line.find('#') {
            Some(pos) => &line[..pos],
            None => line,
        }
        .trim();

        // Handle "set" commands (vim-style)
        if let Some(stripped) = line.strip_prefix("set ") {
            let setting = stripped.trim();

            match setting {
                "watch" => config.watch = true,
                "nowatch" => config.watch = false,
                _ => {
                    if let Some((key, value)) = setting.split_once('=') {
                        Self::apply_value(key.trim(), value.trim(), config);
                    }
                }
            }
        }
        // Handle direct key-value pairs
        else if let Some((key, value)) = line.split_once('=') {
            Self::apply_value(key.trim(), value.trim(), config);
        }
    }

    fn apply_value(key: &str, value: &str, config: &mut RcConfig) {
        match key {
            "store" | "store_path" => {
                if !value.is_empty() {
                    config.store_path = expand_home(value);
                }
            }
            "export_dir" | "exportdir" => {
                if !value.is_empty() {
                    config.export_dir = expand_home(value);
                }
            }
            "debounce" | "debounce_ms" => {
                if let Ok(ms) = value.parse::<u64>() {
                    if (1..=10_000).contains(&ms) {
                        config.debounce_ms = ms;
                    }
                }
            }
            "title_length" | "titlelength" => {
                if let Ok(length) = value.parse::<usize>() {
                    if (1..=200).contains(&length) {
                        config.title_length = length;
                    }
                }
            }
            "filename_length" | "filenamelength" => {
                if let Ok(length) = value.parse::<usize>() {
                    if (1..=200).contains(&length) {
                        config.filename_length = length;
                    }
                }
            }
            "log" | "log_level" => match value {
                "error" | "warn" | "info" | "debug" | "trace" | "off" => {
                    config.log_level = value.to_string();
                }
                _ => {} // Invalid value, ignore
            },
            "watch" => {
                config.watch = value == "true" || value == "1" || value == "yes";
            }
            "watch_interval_ms" | "watch_interval" => {
                if let Ok(ms) = value.parse::<u64>() {
                    if ms >= 50 {
                        config.watch_interval_ms = ms;
                    }
                }
            }
            "tabstop" | "tab_stop" => {
                if let Ok(tab_stop) = value.parse::<usize>() {
                    if tab_stop > 0 && tab_stop <= 16 {
                        config.tab_stop = tab_stop;
                    }
                }
            }
            _ => {} // Unknown setting, ignore
        }
    }

    /// Generate a sample RC file content
    pub fn generate_sample_rc() -> String {
        r#"# jotpad configuration file (.jotpadrc)
# Lines starting with # or " are comments

# Storage
store = ~/.local/share/jotpad/store.json
export_dir = ~/Documents

# Editing
debounce_ms = 500       # Quiet period before an edit is saved
title_length = 75       # Characters of the first line used as title
filename_length = 50    # Characters of the first line used for exports
set tabstop=4

# Follow edits made by other jotpad windows (or set nowatch)
set watch
watch_interval_ms = 1000

# Log level while the editor runs: error, warn, info, debug, trace
log = warn
"#
        .to_string()
    }
}

fn expand_home(value: &str) -> PathBuf {
    match (value.strip_prefix("~/"), dirs::home_dir()) {
        (Some(rest), Some(home)) => home.join(rest),
        _ => PathBuf::from(value),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_key_value_config() {
        let mut config = RcConfig::default();
        let content = r#"
            store = /tmp/notes.json
            export_dir=/tmp/out
            debounce_ms = 250
            title_length = 40
            filename_length = 20
            log = debug
        "#;

        RcLoader::parse_config_content(content, &mut config);

        assert_eq!(config.store_path, PathBuf::from("/tmp/notes.json"));
        assert_eq!(config.export_dir, PathBuf::from("/tmp/out"));
        assert_eq!(config.debounce_ms, 250);
        assert_eq!(config.title_length, 40);
        assert_eq!(config.filename_length, 20);
        assert_eq!(config.log_level, "debug");
    }

    #[test]
    fn test_parse_vim_style_config() {
        let mut config = RcConfig::default();
        let content = r#"
            set nowatch
            set tabstop=8
            set debounce=750
        "#;

        RcLoader::parse_config_content(content, &mut config);

        assert!(!config.watch);
        assert_eq!(config.watch_interval(), None);
        assert_eq!(config.tab_stop, 8);
        assert_eq!(config.debounce_ms, 750);
    }

    #[test]
    fn test_parse_mixed_config_with_comments() {
        let mut config = RcConfig::default();
        let content = r#"
            # This is a comment
            set nowatch            # no polling
            " This is also a comment

            watch_interval_ms=2000 # slower polling
            # set watch            # This is commented out
        "#;

        RcLoader::parse_config_content(content, &mut config);

        assert!(!config.watch);
        assert_eq!(config.watch_interval_ms, 2000);
    }

    #[test]
    fn test_invalid_values_ignored() {
        let mut config = RcConfig::default();
        let content = r#"
            debounce_ms = 0        # Invalid: too small
            debounce_ms = 60000    # Invalid: too large
            title_length = many    # Invalid: not a number
            log = loud             # Invalid: unknown level
            store =                # Invalid: empty
            unknown_setting=value  # Unknown setting
        "#;

        RcLoader::parse_config_content(content, &mut config);

        assert_eq!(config, RcConfig::default());
    }

    #[test]
    fn test_session_settings() {
        let config = RcConfig {
            debounce_ms: 300,
            title_length: 10,
            ..RcConfig::default()
        };
        let settings = config.session_settings();
        assert_eq!(settings.debounce, Duration::from_millis(300));
        assert_eq!(settings.title_length, 10);
        assert_eq!(settings.filename_length, DEFAULT_FILENAME_LENGTH);
        assert_eq!(config.watch_interval(), Some(Duration::from_millis(1000)));
    }

    #[test]
    fn test_sample_rc_parses_cleanly() {
        let mut config = RcConfig::default();
        RcLoader::parse_config_content(&RcLoader::generate_sample_rc(), &mut config);
        assert_eq!(config.debounce_ms, 500);
        assert!(config.watch);
        assert_eq!(config.log_level, "warn");
    }
}
