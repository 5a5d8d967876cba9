/*
 * This file is part of sensors-monitor.
 *
 * Copyright (C) 2025 sensors-monitor contributors
 *
 * sensors-monitor is free software: you can redistribute it and/or modify
 * it under the terms of the GNU General Public License as published by
 * the Free Software Foundation, either version 3 of the License, or
 * (at your option) any later version.
 *
 * sensors-monitor is distributed in the hope that it will be useful,
 * but WITHOUT ANY WARRANTY; without even the implied warranty of
 * MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE. See the
 * GNU General Public License for more details.
 *
 * You should have received a copy of the GNU General Public License
 * along with sensors-monitor. If not, see <https://www.gnu.org/licenses/>.
 */

use std::collections::HashMap;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use ini::Ini;
use tracing::{debug, warn};

use crate::error::ConfigError;

pub const CONFIG_FILE: &str = "/etc/sensors-monitor.conf";
pub const DEFAULTS_SECTION: &str = "defaults";

const LABEL_KEY: &str = "label";
const VISIBLE_KEY: &str = "visible";
const HIDDEN_SENSORS_KEY: &str = "hidden_sensors";

fn default_refresh() -> u64 { 2 }

/// A value kind that can be read out of the key/value store.
pub trait ConfigValue: Sized {
    fn parse_config(raw: &str) -> Option<Self>;
}

impl ConfigValue for String {
    fn parse_config(raw: &str) -> Option<Self> {
        Some(raw.to_string())
    }
}

impl ConfigValue for i64 {
    fn parse_config(raw: &str) -> Option<Self> {
        raw.trim().parse().ok()
    }
}

impl ConfigValue for u64 {
    fn parse_config(raw: &str) -> Option<Self> {
        raw.trim().parse().ok()
    }
}

impl ConfigValue for f64 {
    fn parse_config(raw: &str) -> Option<Self> {
        raw.trim().parse().ok()
    }
}

impl ConfigValue for bool {
    fn parse_config(raw: &str) -> Option<Self> {
        match raw.trim().to_ascii_lowercase().as_str() {
            "1" | "yes" | "true" | "on" => Some(true),
            "0" | "no" | "false" | "off" => Some(false),
            _ => None,
        }
    }
}

/// Process-wide settings from the `[defaults]` section.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Defaults {
    pub refresh: u64,
    pub live: bool,
    pub sensors_config: Option<String>,
    pub sensors_json: Option<String>,
}

impl Default for Defaults {
    fn default() -> Self {
        Self {
            refresh: default_refresh(),
            live: false,
            sensors_config: None,
            sensors_json: None,
        }
    }
}

/// Per-chip display preferences, one section per chip id.
///
/// Section names are matched exactly. Option keys are stored lowercased so
/// `Core 0 = CPU` and a lookup for sensor `core 0` hit the same entry.
#[derive(Debug, Clone, Default)]
pub struct MonitorConfig {
    sections: HashMap<String, HashMap<String, String>>,
}

impl MonitorConfig {
    pub fn from_ini_str(text: &str) -> Result<Self, String> {
        let ini = Ini::load_from_str(text).map_err(|e| e.to_string())?;
        let mut sections: HashMap<String, HashMap<String, String>> = HashMap::new();
        for (name, props) in ini.iter() {
            // keys above the first section header have nowhere to go
            let Some(name) = name else { continue };
            let section = sections.entry(name.to_string()).or_default();
            for (key, value) in props.iter() {
                section.insert(key.to_ascii_lowercase(), value.to_string());
            }
        }
        Ok(Self { sections })
    }

    pub fn get_raw(&self, section: &str, key: &str) -> Option<&str> {
        self.sections
            .get(section)
            .and_then(|s| s.get(&key.to_ascii_lowercase()))
            .map(|v| v.as_str())
    }

    /// Typed lookup: the configured value when present and parseable, else `default`.
    pub fn get<T: ConfigValue>(&self, section: &str, key: &str, default: T) -> T {
        self.get_raw(section, key)
            .and_then(T::parse_config)
            .unwrap_or(default)
    }

    pub fn has_section(&self, section: &str) -> bool {
        self.sections.contains_key(section)
    }

    pub fn chip_label(&self, chip_id: &str) -> String {
        self.get(chip_id, LABEL_KEY, chip_id.to_string())
    }

    pub fn sensor_label(&self, chip_id: &str, sensor_id: &str) -> String {
        self.get(chip_id, sensor_id, sensor_id.to_string())
    }

    pub fn chip_visible(&self, chip_id: &str) -> bool {
        self.get(chip_id, VISIBLE_KEY, true)
    }

    pub fn sensor_visible(&self, chip_id: &str, sensor_id: &str) -> bool {
        match self.get_raw(chip_id, HIDDEN_SENSORS_KEY) {
            Some(list) => !list
                .split(',')
                .map(str::trim)
                .filter(|s| !s.is_empty())
                .any(|hidden| hidden == sensor_id),
            None => true,
        }
    }

    pub fn defaults(&self) -> Defaults {
        let fallback = Defaults::default();
        let path = |key: &str| {
            self.get_raw(DEFAULTS_SECTION, key)
                .map(str::trim)
                .filter(|s| !s.is_empty())
                .map(str::to_string)
        };
        Defaults {
            refresh: self.get(DEFAULTS_SECTION, "refresh", fallback.refresh),
            live: self.get(DEFAULTS_SECTION, "live", fallback.live),
            sensors_config: path("sensors_config"),
            sensors_json: path("sensors_json"),
        }
    }
}

pub fn config_path() -> PathBuf {
    PathBuf::from(CONFIG_FILE)
}

/// Read a config file. `Ok(None)` when the file does not exist.
pub fn try_load_config(path: &Path) -> Result<Option<MonitorConfig>, ConfigError> {
    let text = match fs::read_to_string(path) {
        Ok(t) => t,
        Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(None),
        Err(e) => {
            return Err(ConfigError::Read { path: path.to_path_buf(), source: e });
        }
    };
    MonitorConfig::from_ini_str(&text)
        .map(Some)
        .map_err(|reason| ConfigError::Parse { path: path.to_path_buf(), reason })
}

/// Load the config, degrading to an empty one on any problem.
pub fn load_config(path: &Path) -> MonitorConfig {
    match try_load_config(path) {
        Ok(Some(cfg)) => {
            debug!(path = %path.display(), sections = cfg.sections.len(), "loaded config");
            cfg
        }
        Ok(None) => {
            debug!(path = %path.display(), "no config file, using defaults");
            MonitorConfig::default()
        }
        Err(e) => {
            warn!("{}; continuing with default configuration", e);
            MonitorConfig::default()
        }
    }
}
