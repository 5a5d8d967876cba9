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

//! Error types for acquisition and configuration.

use std::io;
use std::path::PathBuf;

use thiserror::Error;

/// Failures while obtaining the raw sensor tree. All of these are fatal.
#[derive(Error, Debug)]
pub enum AcquireError {
    #[error("the `{program}` command was not found or is not executable, make sure lm-sensors is installed and in your PATH")]
    ToolMissing { program: String },

    #[error("`{program}` failed ({status}): {stderr}")]
    ToolFailed {
        program: String,
        status: String,
        stderr: String,
    },

    #[error("failed to parse sensor output: {0}")]
    MalformedOutput(String),

    #[error("failed to read sensor data from {path}: {source}")]
    JsonFile { path: PathBuf, source: io::Error },

    #[error("IO error: {0}")]
    Io(#[from] io::Error),
}

impl From<serde_json::Error> for AcquireError {
    fn from(e: serde_json::Error) -> Self {
        AcquireError::MalformedOutput(e.to_string())
    }
}

/// Configuration problems. Never fatal: callers log and fall back to defaults.
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("failed to read {path}: {source}")]
    Read { path: PathBuf, source: io::Error },

    #[error("failed to parse {path}: {reason}")]
    Parse { path: PathBuf, reason: String },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_acquire_error_display() {
        let missing = AcquireError::ToolMissing { program: "sensors".to_string() };
        assert!(missing.to_string().contains("`sensors` command was not found"));

        let failed = AcquireError::ToolFailed {
            program: "sensors".to_string(),
            status: "exit status: 1".to_string(),
            stderr: "No sensors found!".to_string(),
        };
        assert_eq!(failed.to_string(), "`sensors` failed (exit status: 1): No sensors found!");

        let malformed = AcquireError::MalformedOutput("expected value".to_string());
        assert_eq!(malformed.to_string(), "failed to parse sensor output: expected value");
    }

    #[test]
    fn test_acquire_error_from_json() {
        let err = serde_json::from_str::<serde_json::Value>("{not json").unwrap_err();
        let acquire: AcquireError = err.into();
        assert!(matches!(acquire, AcquireError::MalformedOutput(_)));
    }

    #[test]
    fn test_acquire_error_from_io() {
        let io_err = io::Error::new(io::ErrorKind::PermissionDenied, "denied");
        let acquire: AcquireError = io_err.into();
        assert!(acquire.to_string().starts_with("IO error"));
    }

    #[test]
    fn test_config_error_display() {
        let err = ConfigError::Parse {
            path: PathBuf::from("/etc/sensors-monitor.conf"),
            reason: "bad section".to_string(),
        };
        assert_eq!(err.to_string(), "failed to parse /etc/sensors-monitor.conf: bad section");
    }
}
