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

//! Acquisition of the raw sensor tree from lm-sensors.

use std::fs;
use std::io::ErrorKind;
use std::path::PathBuf;
use std::process::Command;

use serde_json::Value;
use tracing::debug;

use crate::error::AcquireError;

pub const SENSORS_PROGRAM: &str = "sensors";
/// Passed as `-c` when no lm-sensors config is given, so the tool applies no
/// label/ignore overrides of its own.
pub const NULL_DEVICE: &str = "/dev/null";

/// Something that yields one raw `sensors -j` tree per call.
#[cfg_attr(test, mockall::automock)]
pub trait SensorSource {
    fn acquire(&self) -> Result<Value, AcquireError>;
}

fn parse_tree(text: &str) -> Result<Value, AcquireError> {
    let value: Value = serde_json::from_str(text)?;
    if !value.is_object() {
        return Err(AcquireError::MalformedOutput(
            "expected a JSON object keyed by chip".to_string(),
        ));
    }
    Ok(value)
}

/// Runs `sensors -c <config> -j`.
#[derive(Debug, Clone)]
pub struct SensorsCommand {
    program: PathBuf,
    config: Option<PathBuf>,
}

impl SensorsCommand {
    pub fn new(config: Option<PathBuf>) -> Self {
        Self { program: PathBuf::from(SENSORS_PROGRAM), config }
    }

    /// Use a different executable, mainly for tests.
    pub fn with_program(mut self, program: impl Into<PathBuf>) -> Self {
        self.program = program.into();
        self
    }

    fn config_arg(&self) -> PathBuf {
        self.config.clone().unwrap_or_else(|| PathBuf::from(NULL_DEVICE))
    }
}

impl SensorSource for SensorsCommand {
    fn acquire(&self) -> Result<Value, AcquireError> {
        let program = self.program.display().to_string();
        let config = self.config_arg();
        debug!(program = %program, config = %config.display(), "running sensors");

        let output = match Command::new(&self.program).arg("-c").arg(&config).arg("-j").output() {
            Ok(o) => o,
            Err(e) if matches!(e.kind(), ErrorKind::NotFound | ErrorKind::PermissionDenied) => {
                return Err(AcquireError::ToolMissing { program });
            }
            Err(e) => return Err(e.into()),
        };

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr).trim().to_string();
            return Err(AcquireError::ToolFailed {
                program,
                status: output.status.to_string(),
                stderr,
            });
        }

        let stdout = String::from_utf8(output.stdout)
            .map_err(|e| AcquireError::MalformedOutput(e.to_string()))?;
        parse_tree(&stdout)
    }
}

/// Reads a saved `sensors -j` dump.
#[derive(Debug, Clone)]
pub struct JsonFileSource {
    path: PathBuf,
}

impl JsonFileSource {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

impl SensorSource for JsonFileSource {
    fn acquire(&self) -> Result<Value, AcquireError> {
        let text = fs::read_to_string(&self.path)
            .map_err(|source| AcquireError::JsonFile { path: self.path.clone(), source })?;
        parse_tree(&text)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::test_utils::{create_fake_sensors, create_temp_json_file, create_temp_text_file, sample_tree};
    use serial_test::serial;
    use tempfile::TempDir;

    #[test]
    fn test_parse_tree_accepts_object() {
        let v = parse_tree(r#"{"coretemp-isa-0000": {"Adapter": "ISA adapter"}}"#).unwrap();
        assert!(v.get("coretemp-isa-0000").is_some());
    }

    #[test]
    fn test_parse_tree_rejects_garbage_and_non_objects() {
        assert!(matches!(parse_tree("not json"), Err(AcquireError::MalformedOutput(_))));
        assert!(matches!(parse_tree("[1,2]"), Err(AcquireError::MalformedOutput(_))));
    }

    #[test]
    fn test_config_arg_defaults_to_null_device() {
        assert_eq!(SensorsCommand::new(None).config_arg(), PathBuf::from("/dev/null"));
        let custom = SensorsCommand::new(Some(PathBuf::from("/etc/sensors3.conf")));
        assert_eq!(custom.config_arg(), PathBuf::from("/etc/sensors3.conf"));
    }

    #[test]
    fn test_missing_tool() {
        let dir = TempDir::new().unwrap();
        let source = SensorsCommand::new(None).with_program(dir.path().join("no-such-sensors"));
        match source.acquire() {
            Err(AcquireError::ToolMissing { program }) => assert!(program.ends_with("no-such-sensors")),
            other => panic!("expected ToolMissing, got {:?}", other),
        }
    }

    #[test]
    fn test_non_executable_tool_is_missing() {
        use std::os::unix::fs::PermissionsExt;
        let dir = TempDir::new().unwrap();
        let program = dir.path().join("sensors");
        fs::write(&program, "#!/bin/sh\necho '{}'\n").unwrap();
        fs::set_permissions(&program, fs::Permissions::from_mode(0o644)).unwrap();

        match SensorsCommand::new(None).with_program(&program).acquire() {
            Err(AcquireError::ToolMissing { program }) => assert!(program.ends_with("sensors")),
            other => panic!("expected ToolMissing, got {:?}", other),
        }
    }

    #[test]
    #[serial]
    fn test_tool_output_is_parsed() {
        let dir = TempDir::new().unwrap();
        let json = create_temp_json_file(&sample_tree());
        let program = create_fake_sensors(dir.path(), &format!("cat '{}'", json.path().display()));
        let tree = SensorsCommand::new(None).with_program(program).acquire().unwrap();
        assert_eq!(tree, sample_tree());
    }

    #[test]
    #[serial]
    fn test_tool_receives_config_and_json_flags() {
        let dir = TempDir::new().unwrap();
        let program = create_fake_sensors(
            dir.path(),
            r#"[ "$1" = "-c" ] && [ "$2" = "/dev/null" ] && [ "$3" = "-j" ] || exit 3
echo '{}'"#,
        );
        let tree = SensorsCommand::new(None).with_program(program).acquire().unwrap();
        assert!(tree.as_object().unwrap().is_empty());
    }

    #[test]
    #[serial]
    fn test_tool_failure_status() {
        let dir = TempDir::new().unwrap();
        let program = create_fake_sensors(dir.path(), "echo 'No sensors found!' >&2\nexit 1");
        match SensorsCommand::new(None).with_program(program).acquire() {
            Err(AcquireError::ToolFailed { stderr, .. }) => assert_eq!(stderr, "No sensors found!"),
            other => panic!("expected ToolFailed, got {:?}", other),
        }
    }

    #[test]
    #[serial]
    fn test_tool_malformed_output() {
        let dir = TempDir::new().unwrap();
        let program = create_fake_sensors(dir.path(), "echo 'coretemp-isa-0000'");
        assert!(matches!(
            SensorsCommand::new(None).with_program(program).acquire(),
            Err(AcquireError::MalformedOutput(_))
        ));
    }

    #[test]
    fn test_json_file_source() {
        let file = create_temp_json_file(&sample_tree());
        let tree = JsonFileSource::new(file.path()).acquire().unwrap();
        assert_eq!(tree, sample_tree());
    }

    #[test]
    fn test_json_file_source_errors() {
        let dir = TempDir::new().unwrap();
        assert!(matches!(
            JsonFileSource::new(dir.path().join("missing.json")).acquire(),
            Err(AcquireError::JsonFile { .. })
        ));
        let bad = create_temp_text_file("{ truncated");
        assert!(matches!(
            JsonFileSource::new(bad.path()).acquire(),
            Err(AcquireError::MalformedOutput(_))
        ));
    }
}
