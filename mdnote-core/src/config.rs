//! Configuration management for mdnote

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub editor: EditorConfig,
    pub preview: PreviewConfig,
    pub images: ImageConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct EditorConfig {
    /// Idle time before edits are written back to the note store
    pub autosave_ms: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PreviewConfig {
    pub highlight: bool,
    /// Deepest heading level listed in the table of contents
    pub toc_depth: u8,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ImageConfig {
    pub max_bytes: u64,
}

impl Default for EditorConfig {
    fn default() -> Self {
        Self { autosave_ms: 400 }
    }
}

impl Default for PreviewConfig {
    fn default() -> Self {
        Self {
            highlight: true,
            toc_depth: 6,
        }
    }
}

impl Default for ImageConfig {
    fn default() -> Self {
        Self {
            max_bytes: 5 * 1024 * 1024,
        }
    }
}

impl EditorConfig {
    pub fn autosave_window(&self) -> Duration {
        Duration::from_millis(self.autosave_ms)
    }
}

#[cfg(feature = "render")]
impl PreviewConfig {
    pub fn render_options(&self) -> crate::render::RenderOptions {
        crate::render::RenderOptions {
            highlight: self.highlight,
        }
    }
}

impl Config {
    /// Get the platform-specific config file path
    pub fn config_path() -> Option<PathBuf> {
        directories::ProjectDirs::from("", "", "mdnote")
            .map(|proj_dirs| proj_dirs.config_dir().join("mdnote.toml"))
    }

    /// Load configuration from file, falling back to defaults if missing
    pub fn load() -> Result<Self> {
        match Self::config_path() {
            Some(path) if path.exists() => Self::load_from(&path),
            _ => {
                log::debug!("No config file found, using defaults");
                Ok(Self::default())
            }
        }
    }

    /// Load from a specific path
    pub fn load_from(path: &Path) -> Result<Self> {
        // Check config file permissions (Unix only)
        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            let metadata = std::fs::metadata(path)
                .with_context(|| format!("Failed to stat config file: {}", path.display()))?;
            if metadata.permissions().mode() & 0o002 != 0 {
                anyhow::bail!(
                    "Config file {} is world-writable (insecure permissions)",
                    path.display()
                );
            }
        }

        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        let config: Config = toml::from_str(&content)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))?;

        log::debug!("Loaded config from {}", path.display());
        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(config.editor.autosave_ms, 400);
        assert_eq!(config.editor.autosave_window(), Duration::from_millis(400));
        assert!(config.preview.highlight);
        assert_eq!(config.preview.toc_depth, 6);
        assert!(config.images.max_bytes > 0);
    }

    #[test]
    fn test_load_valid_toml() -> Result<()> {
        let mut file = NamedTempFile::new()?;
        file.write_all(
            b"[editor]\n\
autosave_ms = 1000\n\
\n\
[preview]\n\
highlight = false\n\
toc_depth = 3\n\
\n\
[images]\n\
max_bytes = 2048\n",
        )?;

        let config = Config::load_from(file.path())?;
        assert_eq!(config.editor.autosave_ms, 1000);
        assert!(!config.preview.highlight);
        assert_eq!(config.preview.toc_depth, 3);
        assert_eq!(config.images.max_bytes, 2048);

        Ok(())
    }

    #[test]
    fn test_load_partial_toml() -> Result<()> {
        let mut file = NamedTempFile::new()?;
        file.write_all(b"[preview]\ntoc_depth = 2\n")?;

        let config = Config::load_from(file.path())?;
        assert_eq!(config.preview.toc_depth, 2);
        assert!(config.preview.highlight);
        assert_eq!(config.editor.autosave_ms, 400);

        Ok(())
    }

    #[test]
    fn test_load_invalid_toml_returns_error() {
        let mut file = NamedTempFile::new().unwrap();
        file.write_all(b"invalid toml [[[syntax").unwrap();

        let result = Config::load_from(file.path());
        assert!(result.is_err());
    }

    #[cfg(unix)]
    #[test]
    fn test_world_writable_config_rejected() -> Result<()> {
        use std::os::unix::fs::PermissionsExt;

        let mut file = NamedTempFile::new()?;
        file.write_all(b"[editor]\nautosave_ms = 10\n")?;
        std::fs::set_permissions(file.path(), std::fs::Permissions::from_mode(0o666))?;

        assert!(Config::load_from(file.path()).is_err());
        Ok(())
    }

    #[test]
    fn test_config_path_returns_some() {
        let path = Config::config_path();
        assert!(path.is_some());
        if let Some(p) = path {
            assert!(p.to_string_lossy().contains("mdnote"));
            assert!(p.to_string_lossy().ends_with("mdnote.toml"));
        }
    }

    #[test]
    fn test_serialization_round_trip() -> Result<()> {
        let mut config = Config::default();
        config.preview.toc_depth = 4;

        let toml_str = toml::to_string(&config)?;
        let parsed: Config = toml::from_str(&toml_str)?;
        assert_eq!(parsed.preview.toc_depth, 4);

        Ok(())
    }
}
