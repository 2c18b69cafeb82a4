//! Settings for one `recovery` run: flags and their environment variables,
//! then an optional JSON file, then platform defaults.

use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

/// Shape of the config file. A file stamped with a higher number came from
/// a newer build and is refused, so a save here cannot drop its fields.
const CONFIG_VERSION: u32 = 1;

/// Overrides the config file location.
const CONFIG_ENV: &str = "RECOVERY_CONFIG";

const APP_DIR: &str = "com.recovery.tracker";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ConfigFile {
    pub config_version: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data_dir: Option<PathBuf>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub log_format: Option<LogFormat>,
}

impl Default for ConfigFile {
    fn default() -> Self {
        Self {
            config_version: CONFIG_VERSION,
            data_dir: None,
            log_format: None,
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "snake_case")]
pub enum LogFormat {
    #[default]
    Pretty,
    Json,
}

/// Values given on the command line (or via their environment variables).
#[derive(Debug, Clone, Default)]
pub struct Overrides {
    pub data_dir: Option<PathBuf>,
    pub log_format: Option<LogFormat>,
}

/// What the run actually uses.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Settings {
    pub data_dir: PathBuf,
    pub log_format: LogFormat,
}

impl Settings {
    /// `default_data_dir` is only consulted when neither the overrides nor
    /// the file name a data directory.
    pub fn resolve(
        file: &ConfigFile,
        overrides: &Overrides,
        default_data_dir: impl FnOnce() -> eyre::Result<PathBuf>,
    ) -> eyre::Result<Self> {
        let data_dir = match overrides.data_dir.as_ref().or(file.data_dir.as_ref()) {
            Some(dir) => dir.clone(),
            None => default_data_dir()?,
        };
        Ok(Self {
            data_dir,
            log_format: overrides.log_format.or(file.log_format).unwrap_or_default(),
        })
    }
}

pub fn config_path() -> eyre::Result<PathBuf> {
    if let Some(path) = std::env::var_os(CONFIG_ENV) {
        return Ok(PathBuf::from(path));
    }
    let base = dirs::config_dir().ok_or_else(|| eyre::eyre!("no config directory found"))?;
    Ok(base.join(APP_DIR).join("config.json"))
}

pub fn default_data_dir() -> eyre::Result<PathBuf> {
    let base = dirs::data_dir().ok_or_else(|| eyre::eyre!("no data directory found"))?;
    Ok(base.join(APP_DIR))
}

/// A missing file is not an error: every setting has a fallback.
pub fn load(path: &Path) -> eyre::Result<ConfigFile> {
    let contents = match std::fs::read_to_string(path) {
        Ok(contents) => contents,
        Err(e) if e.kind() == ErrorKind::NotFound => return Ok(ConfigFile::default()),
        Err(e) => return Err(eyre::eyre!("failed to read config at {}: {e}", path.display())),
    };

    let file: ConfigFile = serde_json::from_str(&contents)
        .map_err(|e| eyre::eyre!("invalid config at {}: {e}", path.display()))?;
    if file.config_version > CONFIG_VERSION {
        return Err(eyre::eyre!(
            "config at {} has version {}, this build understands up to {CONFIG_VERSION}",
            path.display(),
            file.config_version
        ));
    }
    Ok(file)
}

/// Persist `settings` so later runs need no flags.
pub fn save(path: &Path, settings: &Settings) -> eyre::Result<()> {
    let file = ConfigFile {
        config_version: CONFIG_VERSION,
        data_dir: Some(settings.data_dir.clone()),
        log_format: Some(settings.log_format),
    };
    let name = path
        .file_name()
        .and_then(|n| n.to_str())
        .ok_or_else(|| eyre::eyre!("config path {} has no file name", path.display()))?;
    let dir = path.parent().unwrap_or(Path::new(""));

    recovery_storage::objects::put_object(dir, name, serde_json::to_vec_pretty(&file)?)?;
    tracing::info!(path = %path.display(), "config saved");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn fallback() -> eyre::Result<PathBuf> {
        Ok(PathBuf::from("/platform/data"))
    }

    #[test]
    fn overrides_beat_file_beats_platform_default() {
        let file = ConfigFile {
            data_dir: Some(PathBuf::from("/from/file")),
            log_format: Some(LogFormat::Json),
            ..ConfigFile::default()
        };

        let none = Settings::resolve(&file, &Overrides::default(), fallback).unwrap();
        assert_eq!(none.data_dir, PathBuf::from("/from/file"));
        assert_eq!(none.log_format, LogFormat::Json);

        let flags = Overrides {
            data_dir: Some(PathBuf::from("/from/flag")),
            log_format: Some(LogFormat::Pretty),
        };
        let both = Settings::resolve(&file, &flags, fallback).unwrap();
        assert_eq!(both.data_dir, PathBuf::from("/from/flag"));
        assert_eq!(both.log_format, LogFormat::Pretty);

        let empty = Settings::resolve(&ConfigFile::default(), &Overrides::default(), fallback).unwrap();
        assert_eq!(empty.data_dir, PathBuf::from("/platform/data"));
        assert_eq!(empty.log_format, LogFormat::Pretty);
    }

    #[test]
    fn platform_default_is_not_needed_when_a_dir_is_given() {
        let flags = Overrides {
            data_dir: Some(PathBuf::from("/from/flag")),
            log_format: None,
        };
        let settings = Settings::resolve(&ConfigFile::default(), &flags, || {
            Err(eyre::eyre!("no data directory found"))
        })
        .unwrap();
        assert_eq!(settings.data_dir, PathBuf::from("/from/flag"));
    }

    #[test]
    fn missing_file_and_partial_file_use_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.json");
        assert_eq!(load(&path).unwrap(), ConfigFile::default());

        std::fs::write(&path, r#"{"log_format":"json"}"#).unwrap();
        let file = load(&path).unwrap();
        assert_eq!(file.config_version, CONFIG_VERSION);
        assert_eq!(file.log_format, Some(LogFormat::Json));
        assert_eq!(file.data_dir, None);
    }

    #[test]
    fn file_from_newer_build_is_refused() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.json");
        std::fs::write(&path, r#"{"config_version":2,"data_dir":"/x"}"#).unwrap();
        let err = load(&path).unwrap_err();
        assert!(err.to_string().contains("understands up to 1"));
    }

    #[test]
    fn saved_settings_load_back() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested/config.json");
        let settings = Settings {
            data_dir: dir.path().join("data"),
            log_format: LogFormat::Json,
        };

        save(&path, &settings).unwrap();
        let file = load(&path).unwrap();
        let reloaded = Settings::resolve(&file, &Overrides::default(), fallback).unwrap();
        assert_eq!(reloaded, settings);
    }
}
