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

//! Command Line Interface
//!
//! Flags override the `[defaults]` section of the config file, which
//! overrides the built-in defaults.

use std::path::PathBuf;
use std::time::Duration;

use clap::Parser;
use tracing::warn;

use crate::config::{Defaults, CONFIG_FILE};

#[derive(Parser, Debug, Clone)]
#[command(name = "sensors-monitor")]
#[command(version)]
#[command(about = "Dashboard for lm-sensors temperatures, voltages and fans")]
#[command(long_about = "Dashboard for lm-sensors temperatures, voltages and fans

Runs `sensors -j`, sorts the readings into system temperatures, drive
temperatures, voltages and fans, and draws them as colored tables.

EXAMPLES:
    sensors-monitor                    Print the dashboard once
    sensors-monitor --live -r 5        Redraw every 5 seconds until q is pressed
    sensors-monitor --json             Print the classified readings as JSON
    sensors-monitor --sensors-json dump.json

ENVIRONMENT VARIABLES:
    SENSORS_MONITOR_LOG=debug          Log filter (default: warn)

FILES:
    /etc/sensors-monitor.conf          Chip labels, visibility and defaults")]
pub struct Cli {
    /// Refresh interval in seconds for live mode
    #[arg(short = 'r', long = "refresh", value_name = "SECS",
          value_parser = clap::value_parser!(u64).range(1..))]
    pub refresh: Option<u64>,

    /// Keep redrawing until interrupted
    #[arg(short = 'l', long = "live")]
    pub live: bool,

    /// Draw once and exit, even if the config asks for live mode
    #[arg(short = 'o', long = "once", conflicts_with = "live")]
    pub once: bool,

    /// lm-sensors config passed to `sensors -c`
    #[arg(short = 's', long = "sensors-config", value_name = "PATH")]
    pub sensors_config: Option<PathBuf>,

    /// Read a saved `sensors -j` dump instead of running `sensors`
    #[arg(long = "sensors-json", value_name = "PATH")]
    pub sensors_json: Option<PathBuf>,

    /// Configuration file
    #[arg(short = 'c', long = "config", value_name = "PATH", default_value = CONFIG_FILE)]
    pub config: PathBuf,

    /// Print the classified readings as JSON and exit
    #[arg(long = "json", conflicts_with = "live")]
    pub json: bool,

    /// Write log output to this file instead of stderr
    #[arg(long = "log-file", value_name = "PATH")]
    pub log_file: Option<PathBuf>,
}

/// How the process should run once flags and config are merged.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Mode {
    Once,
    Live,
    Json,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Settings {
    pub mode: Mode,
    pub refresh: Duration,
    pub sensors_config: Option<PathBuf>,
    pub sensors_json: Option<PathBuf>,
}

impl Cli {
    pub fn resolve(&self, defaults: &Defaults) -> Settings {
        let refresh_secs = match self.refresh {
            Some(secs) => secs,
            None if defaults.refresh == 0 => {
                warn!("refresh = 0 in config is not usable, using 1 second");
                1
            }
            None => defaults.refresh,
        };

        let mode = if self.json {
            Mode::Json
        } else if self.once {
            Mode::Once
        } else if self.live || defaults.live {
            Mode::Live
        } else {
            Mode::Once
        };

        Settings {
            mode,
            refresh: Duration::from_secs(refresh_secs),
            sensors_config: self
                .sensors_config
                .clone()
                .or_else(|| defaults.sensors_config.as_ref().map(PathBuf::from)),
            sensors_json: self
                .sensors_json
                .clone()
                .or_else(|| defaults.sensors_json.as_ref().map(PathBuf::from)),
        }
    }
}
