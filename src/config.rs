use serde::{Deserialize, Serialize};
use std::env;
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

/// Overrides the settings file location.
pub const CONFIG_PATH_ENV: &str = "PDF2IMAGE_CONFIG";
/// Overrides the stored default format token.
pub const DEFAULT_FORMAT_ENV: &str = "PDF2IMAGE_DEFAULT_FORMAT";

const DEFAULT_FORMAT: &str = "png";
const DEFAULT_DPI: f32 = 96.0;

/// Persisted settings. Every field falls back to its default when missing from the file.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// Format token used when no format argument is given. Validated only when consulted.
    pub default_format: String,
    /// Rasterisation resolution in dots per inch.
    pub dpi: f32,
    /// Directory holding the PDFium shared library, if not next to the executable.
    pub pdfium_library_dir: Option<PathBuf>,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            default_format: DEFAULT_FORMAT.to_string(),
            dpi: DEFAULT_DPI,
            pdfium_library_dir: None,
        }
    }
}

impl Settings {
    /// Default settings file: `$PDF2IMAGE_CONFIG`, or `settings.json` in the platform config dir.
    pub fn path() -> Option<PathBuf> {
        if let Some(path) = env::var_os(CONFIG_PATH_ENV) {
            return Some(PathBuf::from(path));
        }
        dirs::config_dir().map(|dir| dir.join("pdf2image").join("settings.json"))
    }

    /// Load settings from the default location and apply environment overrides.
    pub fn load() -> Self {
        let mut settings = match Self::path() {
            Some(path) => Self::load_from(&path),
            None => Self::default(),
        };
        if let Ok(format) = env::var(DEFAULT_FORMAT_ENV) {
            if !format.is_empty() {
                settings.default_format = format;
            }
        }
        settings
    }

    /// Load settings from `path`. Never fails: problems are logged and defaults used.
    pub fn load_from(path: &Path) -> Self {
        let content = match fs::read_to_string(path) {
            Ok(content) => content,
            Err(e) if e.kind() == ErrorKind::NotFound => {
                log::debug!("no settings at {}, using defaults", path.display());
                return Self::default();
            }
            Err(e) => {
                log::warn!("cannot read settings {}: {}", path.display(), e);
                return Self::default();
            }
        };

        match serde_json::from_str::<Settings>(&content) {
            Ok(settings) => settings.sanitized(),
            Err(e) => {
                log::warn!("ignoring malformed settings {}: {}", path.display(), e);
                Self::default()
            }
        }
    }

    fn sanitized(mut self) -> Self {
        if !(self.dpi.is_finite() && self.dpi > 0.0) {
            log::warn!("invalid dpi {} in settings, using {}", self.dpi, DEFAULT_DPI);
            self.dpi = DEFAULT_DPI;
        }
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn missing_file_gives_defaults() {
        let dir = tempdir().unwrap();
        let settings = Settings::load_from(&dir.path().join("nope.json"));
        assert_eq!(settings, Settings::default());
        assert_eq!(settings.default_format, "png");
    }

    #[test]
    fn partial_file_keeps_other_defaults() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("settings.json");
        fs::write(&path, r#"{ "default_format": "GIF" }"#).unwrap();

        let settings = Settings::load_from(&path);
        assert_eq!(settings.default_format, "GIF");
        assert_eq!(settings.dpi, 96.0);
        assert_eq!(settings.pdfium_library_dir, None);
    }

    #[test]
    fn malformed_file_gives_defaults() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("settings.json");
        fs::write(&path, "default_format = png").unwrap();

        assert_eq!(Settings::load_from(&path), Settings::default());
    }

    #[test]
    fn non_positive_dpi_is_reset() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("settings.json");
        fs::write(&path, r#"{ "dpi": 0.0, "default_format": "bmp" }"#).unwrap();

        let settings = Settings::load_from(&path);
        assert_eq!(settings.dpi, 96.0);
        assert_eq!(settings.default_format, "bmp");
    }

    #[test]
    fn settings_survive_a_json_round_trip() {
        let settings = Settings {
            default_format: "wmf".into(),
            dpi: 150.0,
            pdfium_library_dir: Some(PathBuf::from("/opt/pdfium/lib")),
        };
        let json = serde_json::to_string_pretty(&settings).unwrap();
        assert_eq!(serde_json::from_str::<Settings>(&json).unwrap(), settings);
    }
}
