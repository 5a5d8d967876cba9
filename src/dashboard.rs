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

//! Layout description of the dashboard.
//!
//! This is pure data: tables with formatted cells, grouped into the three
//! fixed regions. `ui` turns it into ratatui widgets.

use crate::model::{DriveTemperature, Fan, SensorRecord, SensorSnapshot, Temperature, Voltage};
use crate::presentation::{
    fan_tier, temperature_tier, val_rpm, val_temp, val_volts, voltage_tier, Tier,
};

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum TableKind {
    SystemTemperatures,
    DriveTemperatures,
    Voltages,
    Fans,
}

impl TableKind {
    pub fn title(self) -> &'static str {
        match self {
            TableKind::SystemTemperatures => "System Temperatures",
            TableKind::DriveTemperatures => "Drive Temperatures",
            TableKind::Voltages => "Voltages",
            TableKind::Fans => "Fans",
        }
    }
}

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum ColumnRole {
    /// "chip sensor" name
    Label,
    /// the live reading, colored by tier
    Current,
    /// thresholds and extrema, dimmed
    Secondary,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Column {
    pub header: &'static str,
    pub role: ColumnRole,
    /// Relative width.
    pub weight: u16,
}

const fn col(header: &'static str, role: ColumnRole, weight: u16) -> Column {
    Column { header, role, weight }
}

#[derive(Debug, Clone, PartialEq)]
pub struct CellView {
    pub text: String,
    pub tier: Option<Tier>,
}

impl CellView {
    fn plain(text: String) -> Self {
        Self { text, tier: None }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct RowView {
    pub chip_id: String,
    /// First row of a new chip; drawn with a separator above it.
    pub starts_group: bool,
    pub cells: Vec<CellView>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct TableView {
    pub kind: TableKind,
    pub columns: Vec<Column>,
    pub rows: Vec<RowView>,
}

impl TableView {
    pub fn title(&self) -> &'static str {
        self.kind.title()
    }

    /// Lines needed to draw the table: title, header, header gap, rows and
    /// one separator line per chip boundary.
    pub fn height(&self) -> u16 {
        let separators = self.rows.iter().filter(|r| r.starts_group).count();
        (3 + self.rows.len() + separators) as u16
    }
}

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum RegionId {
    Temperatures,
    Voltages,
    Fans,
}

impl RegionId {
    pub fn title(self) -> &'static str {
        match self {
            RegionId::Temperatures => "Temperatures",
            RegionId::Voltages => "Voltages",
            RegionId::Fans => "Fans",
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Region {
    pub id: RegionId,
    pub tables: Vec<TableView>,
    pub hidden: bool,
}

impl Region {
    fn new(id: RegionId, tables: Vec<TableView>) -> Self {
        let hidden = tables.is_empty();
        Self { id, tables, hidden }
    }

    /// Tables, one blank line between consecutive tables, and the two border
    /// lines.
    pub fn height(&self) -> u16 {
        let gaps = self.tables.len().saturating_sub(1) as u16;
        self.tables.iter().map(TableView::height).sum::<u16>() + gaps + 2
    }
}

/// Regions left to right: temperatures, voltages, fans.
#[derive(Debug, Clone, PartialEq)]
pub struct Dashboard {
    pub regions: Vec<Region>,
}

impl Dashboard {
    pub fn visible_regions(&self) -> impl Iterator<Item = &Region> {
        self.regions.iter().filter(|r| !r.hidden)
    }

    pub fn region(&self, id: RegionId) -> Option<&Region> {
        self.regions.iter().find(|r| r.id == id)
    }

    pub fn is_empty(&self) -> bool {
        self.visible_regions().next().is_none()
    }

    /// Height of the tallest visible region.
    pub fn height(&self) -> u16 {
        self.visible_regions().map(Region::height).max().unwrap_or(0)
    }
}

/// Build rows, marking each chip boundary.
fn build_rows<R>(
    records: &[SensorRecord<R>],
    cells: impl Fn(&SensorRecord<R>) -> Vec<CellView>,
) -> Vec<RowView> {
    let mut rows = Vec::with_capacity(records.len());
    let mut last_chip_id: Option<&str> = None;
    for rec in records {
        let chip_id = rec.chip_id();
        let starts_group = matches!(last_chip_id, Some(prev) if prev != chip_id);
        rows.push(RowView {
            chip_id: chip_id.to_string(),
            starts_group,
            cells: cells(rec),
        });
        last_chip_id = Some(chip_id);
    }
    rows
}

fn label_cell<R>(rec: &SensorRecord<R>) -> CellView {
    CellView::plain(rec.identity.display_name())
}

pub fn build_temp_table(temps: &[SensorRecord<Temperature>]) -> Option<TableView> {
    if temps.is_empty() {
        return None;
    }
    let rows = build_rows(temps, |rec| {
        let t = &rec.reading;
        vec![
            label_cell(rec),
            CellView { text: val_temp(t.value), tier: temperature_tier(t.value, t.high) },
            CellView::plain(val_temp(t.high)),
            CellView::plain(val_temp(t.critical)),
        ]
    });
    Some(TableView {
        kind: TableKind::SystemTemperatures,
        columns: vec![
            col("Chip / Sensor", ColumnRole::Label, 2),
            col("Current", ColumnRole::Current, 1),
            col("High", ColumnRole::Secondary, 1),
            col("Critical", ColumnRole::Secondary, 1),
        ],
        rows,
    })
}

pub fn build_drive_temp_table(temps: &[SensorRecord<DriveTemperature>]) -> Option<TableView> {
    if temps.is_empty() {
        return None;
    }
    let rows = build_rows(temps, |rec| {
        let d = &rec.reading;
        let t = &d.temperature;
        vec![
            label_cell(rec),
            CellView { text: val_temp(t.value), tier: temperature_tier(t.value, t.high) },
            CellView::plain(val_temp(t.high)),
            CellView::plain(val_temp(t.critical)),
            CellView::plain(val_temp(d.lowest)),
            CellView::plain(val_temp(d.highest)),
        ]
    });
    Some(TableView {
        kind: TableKind::DriveTemperatures,
        columns: vec![
            col("Drive", ColumnRole::Label, 3),
            col("Current", ColumnRole::Current, 1),
            col("High", ColumnRole::Secondary, 1),
            col("Critical", ColumnRole::Secondary, 1),
            col("Lowest", ColumnRole::Secondary, 1),
            col("Highest", ColumnRole::Secondary, 1),
        ],
        rows,
    })
}

pub fn build_voltage_table(volts: &[SensorRecord<Voltage>]) -> Option<TableView> {
    if volts.is_empty() {
        return None;
    }
    let rows = build_rows(volts, |rec| {
        let v = &rec.reading;
        vec![
            label_cell(rec),
            CellView { text: val_volts(v.value), tier: voltage_tier(v.value, v.min, v.max) },
            CellView::plain(val_volts(v.min)),
            CellView::plain(val_volts(v.max)),
        ]
    });
    Some(TableView {
        kind: TableKind::Voltages,
        columns: vec![
            col("Chip / Sensor", ColumnRole::Label, 2),
            col("Current", ColumnRole::Current, 1),
            col("Min", ColumnRole::Secondary, 1),
            col("Max", ColumnRole::Secondary, 1),
        ],
        rows,
    })
}

pub fn build_fans_table(fans: &[SensorRecord<Fan>]) -> Option<TableView> {
    if fans.is_empty() {
        return None;
    }
    let rows = build_rows(fans, |rec| {
        let f = &rec.reading;
        vec![
            label_cell(rec),
            CellView { text: val_rpm(f.value), tier: fan_tier(f.value) },
            CellView::plain(val_rpm(f.min)),
        ]
    });
    Some(TableView {
        kind: TableKind::Fans,
        columns: vec![
            col("Fan", ColumnRole::Label, 2),
            col("Current", ColumnRole::Current, 1),
            col("Min", ColumnRole::Secondary, 1),
        ],
        rows,
    })
}

pub fn build_dashboard(snapshot: &SensorSnapshot) -> Dashboard {
    let left: Vec<TableView> = [
        build_temp_table(&snapshot.temperatures),
        build_drive_temp_table(&snapshot.drive_temperatures),
    ]
    .into_iter()
    .flatten()
    .collect();
    let main: Vec<TableView> = build_voltage_table(&snapshot.voltages).into_iter().collect();
    let right: Vec<TableView> = build_fans_table(&snapshot.fans).into_iter().collect();

    Dashboard {
        regions: vec![
            Region::new(RegionId::Temperatures, left),
            Region::new(RegionId::Voltages, main),
            Region::new(RegionId::Fans, right),
        ],
    }
}
