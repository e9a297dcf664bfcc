use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

/// On-disk TOML configuration structure.
/// All fields are optional so partial configs work (merge with defaults).
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ConfigFile {
    pub summary: Option<SummaryConfig>,
    pub display: Option<DisplayConfig>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SummaryConfig {
    pub model: Option<String>,
    pub base_url: Option<String>,
    pub relay_url: Option<String>,
    pub timeout_secs: Option<u64>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DisplayConfig {
    pub theme: Option<String>,
    pub fps: Option<u32>,
}

/// Platform config directory path: `<config_dir>/pdfsum/config.toml`.
pub fn config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|d| d.join("pdfsum").join("config.toml"))
}

/// Load config by cascading CWD `.pdfsum.toml` over platform config.
/// CWD values override platform values.
pub fn load_config() -> ConfigFile {
    let platform = config_path().and_then(|p| load_from_path(&p));
    let cwd = load_from_path(Path::new(".pdfsum.toml"));

    match (platform, cwd) {
        (None, None) => ConfigFile::default(),
        (Some(p), None) => p,
        (None, Some(c)) => c,
        (Some(p), Some(c)) => merge(p, c),
    }
}

/// Load a config from a specific path. Returns `None` if the file doesn't
/// exist or can't be parsed.
pub fn load_from_path(path: &Path) -> Option<ConfigFile> {
    let content = std::fs::read_to_string(path).ok()?;
    match toml::from_str(&content) {
        Ok(config) => Some(config),
        Err(e) => {
            tracing::warn!(path = %path.display(), error = %e, "ignoring unparseable config file");
            None
        }
    }
}

/// Merge two configs: `overlay` values take precedence over `base`.
pub fn merge(base: ConfigFile, overlay: ConfigFile) -> ConfigFile {
    let base_summary = base.summary.unwrap_or_default();
    let overlay_summary = overlay.summary.unwrap_or_default();
    let base_display = base.display.unwrap_or_default();
    let overlay_display = overlay.display.unwrap_or_default();

    ConfigFile {
        summary: Some(SummaryConfig {
            model: overlay_summary.model.or(base_summary.model),
            base_url: overlay_summary.base_url.or(base_summary.base_url),
            relay_url: overlay_summary.relay_url.or(base_summary.relay_url),
            timeout_secs: overlay_summary.timeout_secs.or(base_summary.timeout_secs),
        }),
        display: Some(DisplayConfig {
            theme: overlay_display.theme.or(base_display.theme),
            fps: overlay_display.fps.or(base_display.fps),
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn partial_file_parses() {
        let toml_str = "[summary]\nmodel = \"gpt-4o\"\n";
        let parsed: ConfigFile = toml::from_str(toml_str).unwrap();
        let summary = parsed.summary.unwrap();
        assert_eq!(summary.model.as_deref(), Some("gpt-4o"));
        assert!(summary.relay_url.is_none());
        assert!(parsed.display.is_none());
    }

    #[test]
    fn relay_url_round_trip_toml() {
        let config = ConfigFile {
            summary: Some(SummaryConfig {
                relay_url: Some("http://127.0.0.1:5002".to_string()),
                ..Default::default()
            }),
            ..Default::default()
        };
        let toml_str = toml::to_string_pretty(&config).unwrap();
        let parsed: ConfigFile = toml::from_str(&toml_str).unwrap();
        assert_eq!(
            parsed.summary.unwrap().relay_url.as_deref(),
            Some("http://127.0.0.1:5002")
        );
    }

    #[test]
    fn merge_overlay_wins() {
        let base = ConfigFile {
            summary: Some(SummaryConfig {
                model: Some("base-model".into()),
                timeout_secs: Some(30),
                ..Default::default()
            }),
            display: Some(DisplayConfig {
                theme: Some("hacker".into()),
                fps: Some(10),
            }),
        };
        let overlay = ConfigFile {
            summary: Some(SummaryConfig {
                model: Some("overlay-model".into()),
                ..Default::default()
            }),
            display: Some(DisplayConfig {
                theme: Some("modern".into()),
                fps: None,
            }),
        };
        let merged = merge(base, overlay);
        let summary = merged.summary.unwrap();
        assert_eq!(summary.model.as_deref(), Some("overlay-model"));
        assert_eq!(summary.timeout_secs, Some(30));
        let display = merged.display.unwrap();
        assert_eq!(display.theme.as_deref(), Some("modern"));
        assert_eq!(display.fps, Some(10));
    }

    #[test]
    fn merge_base_preserved_when_overlay_absent() {
        let base = ConfigFile {
            summary: Some(SummaryConfig {
                base_url: Some("https://llm.internal/v1".into()),
                ..Default::default()
            }),
            ..Default::default()
        };
        let merged = merge(base, ConfigFile::default());
        assert_eq!(
            merged.summary.unwrap().base_url.as_deref(),
            Some("https://llm.internal/v1")
        );
    }

    #[test]
    fn missing_file_loads_as_none() {
        assert!(load_from_path(Path::new("/nonexistent/pdfsum/config.toml")).is_none());
    }
}
