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

//! Severity tiers and value formatting, evaluated at render time.

use serde::Serialize;

/// Fraction of `high` at which a temperature turns critical.
pub const TEMP_CRITICAL_RATIO: f64 = 0.8;
/// Fraction of `high` at which a temperature turns warning.
pub const TEMP_WARNING_RATIO: f64 = 0.6;

#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Tier {
    Normal,
    Warning,
    Critical,
}

/// Both tiers are derived from `high`; `critical` is display-only.
pub fn temperature_tier(value: Option<f64>, high: Option<f64>) -> Option<Tier> {
    let value = value?;
    let high = high.unwrap_or(f64::INFINITY);
    let tier = if value >= high * TEMP_CRITICAL_RATIO {
        Tier::Critical
    } else if value >= high * TEMP_WARNING_RATIO {
        Tier::Warning
    } else {
        Tier::Normal
    };
    Some(tier)
}

pub fn fan_tier(value: Option<f64>) -> Option<Tier> {
    value.map(|_| Tier::Normal)
}

pub fn voltage_tier(value: Option<f64>, min: Option<f64>, max: Option<f64>) -> Option<Tier> {
    let value = value?;
    let min = min.unwrap_or(f64::NEG_INFINITY);
    let max = max.unwrap_or(f64::INFINITY);
    let tier = if value < min {
        Tier::Warning
    } else if value > max {
        Tier::Critical
    } else {
        Tier::Normal
    };
    Some(tier)
}

pub fn fmt_temp(v: f64) -> String {
    format!("{}°C", v)
}

pub fn fmt_volts(v: f64) -> String {
    format!("{:.2}V", v)
}

pub fn fmt_rpm(v: f64) -> String {
    format!("{:.0} RPM", v)
}

pub fn val_temp(v: Option<f64>) -> String {
    v.map(fmt_temp).unwrap_or_default()
}

pub fn val_volts(v: Option<f64>) -> String {
    v.map(fmt_volts).unwrap_or_default()
}

pub fn val_rpm(v: Option<f64>) -> String {
    v.map(fmt_rpm).unwrap_or_default()
}
