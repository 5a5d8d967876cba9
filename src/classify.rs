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

//! Turns the `sensors -j` tree into a [`SensorSnapshot`].
//!
//! The tree looks like
//!
//! ```text
//! { "coretemp-isa-0000": {
//!       "Adapter": "ISA adapter",
//!       "Core 0": { "temp2_input": 45.0, "temp2_max": 100.0, "temp2_crit": 100.0 } } }
//! ```
//!
//! Raw fields are routed by their type prefix (`temp`, `fan`, `in`) and role
//! suffix (`_input`, `_max`, ...). All fields of one field group fold into at
//! most one record per category.

use serde_json::{Map, Value};
use tracing::{debug, trace};

use crate::config::MonitorConfig;
use crate::model::{
    DriveTemperature, Fan, SensorIdentity, SensorRecord, SensorSnapshot, Temperature, Voltage,
};
use crate::ordering::ChipOrder;

pub const ADAPTER_KEY: &str = "Adapter";

/// Chips whose `temp*` fields are drive temperatures.
const DRIVE_CHIP_PREFIXES: [&str; 2] = ["drivetemp", "nvme"];

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
enum FieldKind {
    Temp,
    Fan,
    In,
}

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
enum Role {
    Input,
    Min,
    Max,
    Crit,
    Lowest,
    Highest,
}

fn field_kind(name: &str) -> Option<FieldKind> {
    if name.starts_with("temp") {
        Some(FieldKind::Temp)
    } else if name.starts_with("fan") {
        Some(FieldKind::Fan)
    } else if name.starts_with("in") {
        Some(FieldKind::In)
    } else {
        None
    }
}

fn field_role(name: &str) -> Option<Role> {
    const SUFFIXES: [(&str, Role); 6] = [
        ("_input", Role::Input),
        ("_min", Role::Min),
        ("_max", Role::Max),
        ("_crit", Role::Crit),
        ("_lowest", Role::Lowest),
        ("_highest", Role::Highest),
    ];
    SUFFIXES
        .iter()
        .find(|(suffix, _)| name.ends_with(suffix))
        .map(|(_, role)| *role)
}

pub fn is_drive_chip(chip_id: &str) -> bool {
    DRIVE_CHIP_PREFIXES.iter().any(|p| chip_id.starts_with(p))
}

fn temperature_slot(t: &mut Temperature, role: Role) -> Option<&mut Option<f64>> {
    match role {
        Role::Input => Some(&mut t.value),
        Role::Max => Some(&mut t.high),
        Role::Crit => Some(&mut t.critical),
        _ => None,
    }
}

fn drive_slot(d: &mut DriveTemperature, role: Role) -> Option<&mut Option<f64>> {
    match role {
        Role::Lowest => Some(&mut d.lowest),
        Role::Highest => Some(&mut d.highest),
        _ => temperature_slot(&mut d.temperature, role),
    }
}

fn fan_slot(f: &mut Fan, role: Role) -> Option<&mut Option<f64>> {
    match role {
        Role::Input => Some(&mut f.value),
        Role::Min => Some(&mut f.min),
        _ => None,
    }
}

fn voltage_slot(v: &mut Voltage, role: Role) -> Option<&mut Option<f64>> {
    match role {
        Role::Input => Some(&mut v.value),
        Role::Min => Some(&mut v.min),
        Role::Max => Some(&mut v.max),
        _ => None,
    }
}

/// Store `value` in the record's slot for `role`, creating the record on the
/// first field that has a slot. Fields without a slot leave `pending` alone.
fn route<T: Default>(
    pending: &mut Option<T>,
    role: Role,
    value: Option<f64>,
    slot: fn(&mut T, Role) -> Option<&mut Option<f64>>,
) {
    let existed = pending.is_some();
    let mut rec = pending.take().unwrap_or_default();
    let routed = match slot(&mut rec, role) {
        Some(s) => {
            *s = value;
            true
        }
        None => false,
    };
    if routed || existed {
        *pending = Some(rec);
    }
}

/// Records of one field group while its fields are being scanned.
#[derive(Debug, Default)]
struct PendingSensor {
    temperature: Option<Temperature>,
    drive: Option<DriveTemperature>,
    fan: Option<Fan>,
    voltage: Option<Voltage>,
}

impl PendingSensor {
    fn apply(&mut self, name: &str, value: &Value, drive_chip: bool) {
        let Some(kind) = field_kind(name) else { return };
        let Some(role) = field_role(name) else { return };
        let number = value.as_f64();
        if number.is_none() {
            trace!(field = name, "non-numeric field value treated as absent");
        }
        match kind {
            FieldKind::Temp if drive_chip => route(&mut self.drive, role, number, drive_slot),
            FieldKind::Temp => route(&mut self.temperature, role, number, temperature_slot),
            FieldKind::Fan => route(&mut self.fan, role, number, fan_slot),
            FieldKind::In => route(&mut self.voltage, role, number, voltage_slot),
        }
    }

    fn is_empty(&self) -> bool {
        self.temperature.is_none() && self.drive.is_none() && self.fan.is_none() && self.voltage.is_none()
    }

    fn freeze(self, identity: SensorIdentity, out: &mut SensorSnapshot) {
        if let Some(reading) = self.temperature {
            out.temperatures.push(SensorRecord { identity: identity.clone(), reading });
        }
        if let Some(reading) = self.drive {
            out.drive_temperatures.push(SensorRecord { identity: identity.clone(), reading });
        }
        if let Some(reading) = self.fan {
            out.fans.push(SensorRecord { identity: identity.clone(), reading });
        }
        if let Some(reading) = self.voltage {
            out.voltages.push(SensorRecord { identity, reading });
        }
    }
}

fn adapter_of(groups: &Map<String, Value>) -> Option<String> {
    groups.get(ADAPTER_KEY).map(|v| match v {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    })
}

fn classify_chip(
    chip_id: &str,
    groups: &Map<String, Value>,
    config: &MonitorConfig,
    order: &ChipOrder,
    out: &mut SensorSnapshot,
) {
    let adapter = adapter_of(groups);
    let drive_chip = is_drive_chip(chip_id);
    let chip_label = config.chip_label(chip_id);
    let chip_rank = order.rank(chip_id);

    for (sensor_id, fields) in groups {
        // "Adapter" and similar metadata sit next to the field groups
        let Value::Object(fields) = fields else { continue };
        if !config.sensor_visible(chip_id, sensor_id) {
            debug!(chip = chip_id, sensor = sensor_id.as_str(), "sensor hidden by config");
            continue;
        }

        let mut pending = PendingSensor::default();
        for (name, value) in fields {
            pending.apply(name, value, drive_chip);
        }
        if pending.is_empty() {
            continue;
        }

        let identity = SensorIdentity {
            chip_id: chip_id.to_string(),
            sensor_id: sensor_id.clone(),
            chip_label: chip_label.clone(),
            sensor_label: config.sensor_label(chip_id, sensor_id),
            chip_rank,
            adapter: adapter.clone(),
        };
        pending.freeze(identity, out);
    }
}

/// Stable sort of every category by chip rank. Chips sharing a rank keep the
/// order they were discovered in.
pub fn sort_snapshot(snapshot: &mut SensorSnapshot) {
    snapshot.temperatures.sort_by_key(|r| r.identity.chip_rank);
    snapshot.drive_temperatures.sort_by_key(|r| r.identity.chip_rank);
    snapshot.voltages.sort_by_key(|r| r.identity.chip_rank);
    snapshot.fans.sort_by_key(|r| r.identity.chip_rank);
}

/// Classify, filter, label and sort one raw tree.
pub fn classify(raw: Value, config: &MonitorConfig, order: &ChipOrder) -> SensorSnapshot {
    let mut snapshot = SensorSnapshot {
        temperatures: Vec::new(),
        drive_temperatures: Vec::new(),
        voltages: Vec::new(),
        fans: Vec::new(),
        raw: Value::Null,
    };

    if let Value::Object(chips) = &raw {
        for (chip_id, chip_data) in chips {
            if !config.chip_visible(chip_id) {
                debug!(chip = chip_id.as_str(), "chip hidden by config");
                continue;
            }
            let Value::Object(groups) = chip_data else { continue };
            classify_chip(chip_id, groups, config, order, &mut snapshot);
        }
    }

    sort_snapshot(&mut snapshot);
    debug!(
        temps = snapshot.temperatures.len(),
        drives = snapshot.drive_temperatures.len(),
        volts = snapshot.voltages.len(),
        fans = snapshot.fans.len(),
        "classified snapshot"
    );
    snapshot.raw = raw;
    snapshot
}
