/*
 * Test utilities and fixtures for sensors-monitor
 *
 * Sample `sensors -j` trees, config builders and temporary files shared by
 * the unit tests of several modules.
 */

#[cfg(test)]
pub mod test_utils {
    use crate::classify::classify;
    use crate::config::MonitorConfig;
    use crate::model::SensorSnapshot;
    use crate::ordering::ChipOrder;
    use serde_json::{json, Value};
    use std::fs;
    use std::io::Write;
    use std::os::unix::fs::PermissionsExt;
    use std::path::{Path, PathBuf};
    use tempfile::NamedTempFile;

    /// A desktop-like tree: Intel CPU, Super I/O chip, one SATA and one NVMe
    /// drive, and an ACPI thermal zone. Keys are in the order `sensors -j`
    /// prints them.
    pub fn sample_tree() -> Value {
        json!({
            "nct6775-isa-0290": {
                "Adapter": "ISA adapter",
                "in0": { "in0_input": 1.02, "in0_min": 0.0, "in0_max": 1.74, "in0_alarm": 0.0 },
                "in1": { "in1_input": 3.33, "in1_min": 2.98, "in1_max": 3.63 },
                "fan1": { "fan1_input": 812.0, "fan1_min": 0.0, "fan1_alarm": 0.0 },
                "fan2": { "fan2_input": 1045.0, "fan2_min": 0.0 },
                "fan3": { "fan3_input": 0.0 },
                "SYSTIN": { "temp1_input": 33.0, "temp1_max": 80.0, "temp1_max_hyst": 75.0 },
                "intrusion0": { "intrusion0_alarm": 1.0 }
            },
            "coretemp-isa-0000": {
                "Adapter": "ISA adapter",
                "Package id 0": { "temp1_input": 48.0, "temp1_max": 80.0, "temp1_crit": 100.0 },
                "Core 0": { "temp2_input": 45.0, "temp2_max": 80.0, "temp2_crit": 100.0 },
                "Core 1": { "temp3_input": 47.0, "temp3_max": 80.0, "temp3_crit": 100.0 }
            },
            "nvme-pci-0100": {
                "Adapter": "PCI adapter",
                "Composite": {
                    "temp1_input": 39.85, "temp1_max": 81.85, "temp1_min": -273.15,
                    "temp1_crit": 84.85, "temp1_alarm": 0.0
                }
            },
            "drivetemp-scsi-0-0": {
                "Adapter": "SCSI adapter",
                "temp1": {
                    "temp1_input": 31.0, "temp1_max": 60.0, "temp1_min": 0.0,
                    "temp1_crit": 70.0, "temp1_lowest": 22.0, "temp1_highest": 41.0
                }
            },
            "acpitz-acpi-0": {
                "Adapter": "ACPI interface",
                "temp1": { "temp1_input": 27.8, "temp1_crit": 119.0 }
            }
        })
    }

    pub fn config_from(text: &str) -> MonitorConfig {
        MonitorConfig::from_ini_str(text).unwrap()
    }

    pub fn sample_snapshot() -> SensorSnapshot {
        classify(sample_tree(), &MonitorConfig::default(), &ChipOrder::default())
    }

    /// Creates a temporary file with the given text content
    pub fn create_temp_text_file(text: &str) -> NamedTempFile {
        let mut temp_file = NamedTempFile::new().unwrap();
        temp_file.write_all(text.as_bytes()).unwrap();
        temp_file.flush().unwrap();
        temp_file
    }

    /// Creates a temporary file with JSON content
    pub fn create_temp_json_file(data: &Value) -> NamedTempFile {
        create_temp_text_file(&serde_json::to_string_pretty(data).unwrap())
    }

    /// Writes an executable shell script standing in for `sensors`
    pub fn create_fake_sensors(dir: &Path, body: &str) -> PathBuf {
        let path = dir.join("sensors");
        fs::write(&path, format!("#!/bin/sh\n{}\n", body)).unwrap();
        fs::set_permissions(&path, fs::Permissions::from_mode(0o755)).unwrap();
        path
    }
}
