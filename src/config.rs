/*
 * This file is part of pcibdf.
 *
 * Copyright (C) 2025 pcibdf contributors
 *
 * pcibdf is free software: you can redistribute it and/or modify
 * it under the terms of the GNU General Public License as published by
 * the Free Software Foundation, either version 3 of the License, or
 * (at your option) any later version.
 *
 * pcibdf is distributed in the hope that it will be useful,
 * but WITHOUT ANY WARRANTY; without even the implied warranty of
 * MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE. See the
 * GNU General Public License for more details.
 *
 * You should have received a copy of the GNU General Public License
 * along with pcibdf. If not, see <https://www.gnu.org/licenses/>.
 */

use std::env;
use std::fs;
use std::path::{Path, PathBuf};

use bdf_core::constants::limits::MAX_CONFIG_SIZE;
use bdf_error::{BdfError, Result};
use serde::{Deserialize, Serialize};

const LOG_LEVELS: &[&str] = &["error", "warn", "info", "debug", "trace"];

#[derive(Debug, Copy, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    #[default]
    Text,
    Json,
}

fn default_log_level() -> String {
    "warn".to_string()
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct Config {
    /// How set results are printed
    #[serde(default)]
    pub output: OutputFormat,
    /// Log filter used when RUST_LOG is unset
    #[serde(default = "default_log_level")]
    pub log_level: String,
    /// Topology snapshot used by dump-topology when none is given
    #[serde(default)]
    pub topology_snapshot: Option<PathBuf>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            output: OutputFormat::default(),
            log_level: default_log_level(),
            topology_snapshot: None,
        }
    }
}

pub fn config_path() -> PathBuf {
    if let Ok(xdg) = env::var("XDG_CONFIG_HOME") {
        return Path::new(&xdg).join("pcibdf").join("config.json");
    }
    if let Ok(home) = env::var("HOME") {
        return Path::new(&home)
            .join(".config")
            .join("pcibdf")
            .join("config.json");
    }
    PathBuf::from("/etc/pcibdf/config.json")
}

/// Load the user config, falling back to defaults when no file exists
pub fn load_config() -> Result<Config> {
    load_config_from(&config_path())
}

pub fn load_config_from(path: &Path) -> Result<Config> {
    let metadata = match fs::metadata(path) {
        Ok(m) => m,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Config::default()),
        Err(e) => return Err(BdfError::FileRead { path: path.to_path_buf(), source: e }),
    };
    if metadata.len() > MAX_CONFIG_SIZE {
        return Err(BdfError::FileTooLarge {
            path: path.to_path_buf(),
            size: metadata.len(),
            max_size: MAX_CONFIG_SIZE,
        });
    }

    let data = fs::read_to_string(path)
        .map_err(|e| BdfError::FileRead { path: path.to_path_buf(), source: e })?;
    let cfg: Config = serde_json::from_str(&data)?;
    validate_config(&cfg)?;
    Ok(cfg)
}

pub fn save_config_to(path: &Path, cfg: &Config) -> Result<()> {
    validate_config(cfg)?;
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }
    let json = serde_json::to_string_pretty(cfg)?;
    fs::write(path, json)?;
    Ok(())
}

pub fn save_config(cfg: &Config) -> Result<()> {
    save_config_to(&config_path(), cfg)
}

pub fn validate_config(cfg: &Config) -> Result<()> {
    if !LOG_LEVELS.contains(&cfg.log_level.as_str()) {
        return Err(BdfError::config(format!(
            "unknown log_level {:?} (expected one of {})",
            cfg.log_level,
            LOG_LEVELS.join(", ")
        )));
    }
    if let Some(p) = &cfg.topology_snapshot {
        if p.as_os_str().is_empty() {
            return Err(BdfError::config("topology_snapshot cannot be empty"));
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;
    use std::io::Write;
    use tempfile::{NamedTempFile, TempDir};

    #[test]
    fn test_output_format_serialization() {
        assert_eq!(serde_json::to_string(&OutputFormat::Text).unwrap(), "\"text\"");
        assert_eq!(serde_json::to_string(&OutputFormat::Json).unwrap(), "\"json\"");
        assert_eq!(serde_json::from_str::<OutputFormat>("\"json\"").unwrap(), OutputFormat::Json);
    }

    #[test]
    fn test_defaults_from_empty_object() {
        let cfg: Config = serde_json::from_str("{}").unwrap();
        assert_eq!(cfg, Config::default());
        assert_eq!(cfg.log_level, "warn");
    }

    #[test]
    fn test_unknown_fields_rejected() {
        assert!(serde_json::from_str::<Config>(r#"{"colour": true}"#).is_err());
    }

    #[test]
    fn test_validate_config() {
        assert!(validate_config(&Config::default()).is_ok());

        let cfg = Config { log_level: "loud".to_string(), ..Config::default() };
        assert!(validate_config(&cfg).is_err());

        let cfg = Config { topology_snapshot: Some(PathBuf::new()), ..Config::default() };
        assert!(validate_config(&cfg).is_err());
    }

    #[test]
    fn test_missing_file_gives_defaults() {
        let dir = TempDir::new().unwrap();
        let cfg = load_config_from(&dir.path().join("absent.json")).unwrap();
        assert_eq!(cfg, Config::default());
    }

    #[test]
    fn test_malformed_file_is_error() {
        let mut file = NamedTempFile::new().unwrap();
        file.write_all(b"{ not json").unwrap();
        assert!(matches!(load_config_from(file.path()), Err(BdfError::JsonParse(_))));
    }

    #[test]
    fn test_save_and_load_round_trip() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("nested").join("config.json");
        let cfg = Config {
            output: OutputFormat::Json,
            log_level: "debug".to_string(),
            topology_snapshot: Some(PathBuf::from("/var/lib/pcibdf/topology.json")),
        };

        save_config_to(&path, &cfg).unwrap();
        assert_eq!(load_config_from(&path).unwrap(), cfg);
    }

    #[test]
    #[serial]
    fn test_config_path_prefers_xdg() {
        let old = env::var("XDG_CONFIG_HOME").ok();
        env::set_var("XDG_CONFIG_HOME", "/tmp/xdg-test");
        assert_eq!(config_path(), PathBuf::from("/tmp/xdg-test/pcibdf/config.json"));
        match old {
            Some(v) => env::set_var("XDG_CONFIG_HOME", v),
            None => env::remove_var("XDG_CONFIG_HOME"),
        }
    }
}
