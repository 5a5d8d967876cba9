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

//! Classified sensor data.
//!
//! Every record pairs a [`SensorIdentity`] with a category payload. All
//! readings are optional because the sensor tool omits fields a driver does
//! not report.

use serde::Serialize;
use serde_json::Value;

#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Category {
    Temperature,
    DriveTemperature,
    Fan,
    Voltage,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SensorIdentity {
    pub chip_id: String,
    pub sensor_id: String,
    pub chip_label: String,
    pub sensor_label: String,
    /// Sort key only, never shown.
    #[serde(skip)]
    pub chip_rank: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub adapter: Option<String>,
}

impl SensorIdentity {
    /// Text of the first dashboard column.
    pub fn display_name(&self) -> String {
        format!("{} {}", self.chip_label, self.sensor_label)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Temperature {
    pub value: Option<f64>,
    pub high: Option<f64>,
    pub critical: Option<f64>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct DriveTemperature {
    #[serde(flatten)]
    pub temperature: Temperature,
    pub lowest: Option<f64>,
    pub highest: Option<f64>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Fan {
    pub value: Option<f64>,
    pub min: Option<f64>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Voltage {
    pub value: Option<f64>,
    pub min: Option<f64>,
    pub max: Option<f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SensorRecord<R> {
    #[serde(flatten)]
    pub identity: SensorIdentity,
    #[serde(flatten)]
    pub reading: R,
}

impl<R> SensorRecord<R> {
    pub fn chip_id(&self) -> &str {
        &self.identity.chip_id
    }

    pub fn sensor_id(&self) -> &str {
        &self.identity.sensor_id
    }
}

/// The classified result of one poll. Built once, then only read.
#[derive(Debug, Clone, Serialize)]
pub struct SensorSnapshot {
    pub temperatures: Vec<SensorRecord<Temperature>>,
    pub drive_temperatures: Vec<SensorRecord<DriveTemperature>>,
    pub voltages: Vec<SensorRecord<Voltage>>,
    pub fans: Vec<SensorRecord<Fan>>,
    /// The source tree as acquired, kept for debugging.
    #[serde(skip)]
    pub raw: Value,
}

impl SensorSnapshot {
    pub fn is_empty(&self) -> bool {
        self.temperatures.is_empty()
            && self.drive_temperatures.is_empty()
            && self.voltages.is_empty()
            && self.fans.is_empty()
    }

    pub fn count(&self, category: Category) -> usize {
        match category {
            Category::Temperature => self.temperatures.len(),
            Category::DriveTemperature => self.drive_temperatures.len(),
            Category::Fan => self.fans.len(),
            Category::Voltage => self.voltages.len(),
        }
    }
}
