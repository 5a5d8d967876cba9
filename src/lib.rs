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

//! sensors-monitor - terminal dashboard for lm-sensors
//!
//! This library reads the `sensors -j` tree, classifies it into
//! temperatures, drive temperatures, voltages and fans, applies the
//! per-chip display config and lays the result out as tables.

pub mod classify;
pub mod cli;
pub mod config;
pub mod dashboard;
pub mod error;
pub mod logger;
pub mod model;
pub mod monitor;
pub mod ordering;
pub mod presentation;
pub mod sensors;
pub mod ui;

#[cfg(test)]
pub mod test_utils;
