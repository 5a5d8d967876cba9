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

//! Terminal rendering of a [`Dashboard`].
//!
//! The same widget draws the live screen and the one-shot printout. One-shot
//! mode renders into an off-screen buffer and writes it to stdout line by
//! line, so the output scrolls like any other command.

use std::io::{self, IsTerminal, Stdout, Write};
use std::thread;
use std::time::Duration;

use anyhow::{Context, Result};
use chrono::{DateTime, Local};
use crossterm::cursor::{Hide, Show};
use crossterm::event::{self, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers};
use crossterm::style::{
    Attribute, Color as TermColor, Print, ResetColor, SetAttribute, SetForegroundColor,
};
use crossterm::terminal::{self, disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen};
use crossterm::{execute, queue};
use ratatui::layout::Constraint::{Fill, Length};
use ratatui::prelude::*;
use ratatui::widgets::{Block, BorderType, Cell, Row, Table};
use tracing::{debug, warn};

use crate::dashboard::{build_dashboard, ColumnRole, Dashboard, Region, TableView};
use crate::logger;
use crate::model::SensorSnapshot;
use crate::monitor::{Renderer, StopToken};
use crate::presentation::Tier;

/// Width used for one-shot output when stdout is not a terminal.
pub const DEFAULT_WIDTH: u16 = 160;
const COLUMN_SPACING: u16 = 2;
const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";
const KEY_POLL_INTERVAL: Duration = Duration::from_millis(100);
pub const EMPTY_MESSAGE: &str = "No sensors to display";

fn tier_style(tier: Option<Tier>) -> Style {
    let color = match tier {
        Some(Tier::Critical) => Color::Red,
        Some(Tier::Warning) => Color::Yellow,
        Some(Tier::Normal) | None => Color::LightGreen,
    };
    Style::default().fg(color).add_modifier(Modifier::BOLD)
}

fn label_style() -> Style {
    Style::default().fg(Color::LightBlue)
}

fn header_style(role: ColumnRole) -> Style {
    let style = Style::default().fg(Color::White).add_modifier(Modifier::BOLD);
    match role {
        ColumnRole::Secondary => style.add_modifier(Modifier::DIM),
        _ => style,
    }
}

fn cell_style(role: ColumnRole, tier: Option<Tier>) -> Style {
    match role {
        ColumnRole::Label => label_style(),
        ColumnRole::Current => tier_style(tier),
        ColumnRole::Secondary => Style::default().fg(Color::White).add_modifier(Modifier::DIM),
    }
}

/// Line above the panels: program name, refresh interval in live mode and
/// the time the snapshot was drawn.
#[derive(Debug, Clone)]
pub struct StatusLine {
    pub refresh: Option<Duration>,
    pub taken_at: DateTime<Local>,
}

impl StatusLine {
    pub fn live(refresh: Duration) -> Self {
        Self { refresh: Some(refresh), taken_at: Local::now() }
    }

    pub fn once() -> Self {
        Self { refresh: None, taken_at: Local::now() }
    }

    fn left_text(&self) -> String {
        match self.refresh {
            Some(r) => format!(" sensors-monitor  every {}s  (q to quit)", r.as_secs()),
            None => " sensors-monitor".to_string(),
        }
    }

    fn right_text(&self) -> String {
        format!("[{}] ", self.taken_at.format(TIMESTAMP_FORMAT))
    }
}

impl Widget for &StatusLine {
    fn render(self, area: Rect, buf: &mut Buffer) {
        Line::from(self.left_text()).fg(Color::Cyan).bold().render(area, buf);
        Line::from(self.right_text()).fg(Color::Gray).right_aligned().render(area, buf);
    }
}

pub struct DashboardWidget<'a> {
    dashboard: &'a Dashboard,
    status: StatusLine,
}

impl<'a> DashboardWidget<'a> {
    pub fn new(dashboard: &'a Dashboard, status: StatusLine) -> Self {
        Self { dashboard, status }
    }

    /// Lines needed to show everything: the status line plus the tallest
    /// region, or one message line when nothing is visible.
    pub fn required_height(&self) -> u16 {
        1 + self.dashboard.height().max(1)
    }
}

impl Widget for DashboardWidget<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let [status_area, body] = Layout::vertical([Length(1), Fill(1)]).areas(area);
        (&self.status).render(status_area, buf);

        if self.dashboard.is_empty() {
            Line::from(EMPTY_MESSAGE).fg(Color::DarkGray).centered().render(body, buf);
            return;
        }

        let regions: Vec<&Region> = self.dashboard.visible_regions().collect();
        let columns = Layout::horizontal(regions.iter().map(|_| Fill(1)))
            .spacing(1)
            .split(body);
        for (region, column) in regions.into_iter().zip(columns.iter()) {
            render_region(region, *column, buf);
        }
    }
}

fn render_region(region: &Region, area: Rect, buf: &mut Buffer) {
    let block = Block::bordered()
        .border_type(BorderType::Rounded)
        .title(Line::from(format!(" {} ", region.id.title())).fg(Color::Cyan).bold());
    let inner = block.inner(area);
    block.render(area, buf);

    let mut constraints = Vec::with_capacity(region.tables.len() * 2 + 1);
    for (i, table) in region.tables.iter().enumerate() {
        if i > 0 {
            constraints.push(Length(1));
        }
        constraints.push(Length(table.height()));
    }
    constraints.push(Fill(1));
    let slots = Layout::vertical(constraints).split(inner);

    for (i, table) in region.tables.iter().enumerate() {
        render_table(table, slots[i * 2], buf);
    }
}

fn render_table(view: &TableView, area: Rect, buf: &mut Buffer) {
    let [title_area, table_area] = Layout::vertical([Length(1), Fill(1)]).areas(area);
    Line::from(view.title()).fg(Color::Magenta).bold().render(title_area, buf);

    let header = Row::new(
        view.columns
            .iter()
            .map(|c| Cell::from(c.header).style(header_style(c.role))),
    )
    .bottom_margin(1);

    let rows = view.rows.iter().map(|row| {
        let cells = row.cells.iter().zip(&view.columns).map(|(cell, column)| {
            Cell::from(cell.text.clone()).style(cell_style(column.role, cell.tier))
        });
        Row::new(cells).top_margin(u16::from(row.starts_group))
    });

    let widths = view.columns.iter().map(|c| Fill(c.weight));
    let table = Table::new(rows, widths).header(header).column_spacing(COLUMN_SPACING);
    Widget::render(table, table_area, buf);
}

/// Draw the dashboard into an off-screen buffer sized to fit it.
pub fn render_to_buffer(dashboard: &Dashboard, status: StatusLine, width: u16) -> Buffer {
    let widget = DashboardWidget::new(dashboard, status);
    let area = Rect::new(0, 0, width, widget.required_height());
    let mut buf = Buffer::empty(area);
    widget.render(area, &mut buf);
    buf
}

fn term_color(color: Color) -> TermColor {
    match color {
        Color::Reset => TermColor::Reset,
        Color::Black => TermColor::Black,
        Color::Red => TermColor::DarkRed,
        Color::Green => TermColor::DarkGreen,
        Color::Yellow => TermColor::DarkYellow,
        Color::Blue => TermColor::DarkBlue,
        Color::Magenta => TermColor::DarkMagenta,
        Color::Cyan => TermColor::DarkCyan,
        Color::Gray => TermColor::Grey,
        Color::DarkGray => TermColor::DarkGrey,
        Color::LightRed => TermColor::Red,
        Color::LightGreen => TermColor::Green,
        Color::LightYellow => TermColor::Yellow,
        Color::LightBlue => TermColor::Blue,
        Color::LightMagenta => TermColor::Magenta,
        Color::LightCyan => TermColor::Cyan,
        Color::White => TermColor::White,
        Color::Rgb(r, g, b) => TermColor::Rgb { r, g, b },
        Color::Indexed(i) => TermColor::AnsiValue(i),
    }
}

/// Write the buffer as plain lines, with ANSI styling when `color` is set.
/// Trailing blank cells are dropped.
pub fn write_buffer<W: Write>(buf: &Buffer, out: &mut W, color: bool) -> io::Result<()> {
    let width = buf.area.width as usize;
    for line in buf.content().chunks(width.max(1)) {
        let end = line
            .iter()
            .rposition(|c| c.symbol() != " ")
            .map_or(0, |i| i + 1);

        let mut current: Option<(Color, Modifier)> = None;
        for cell in &line[..end] {
            if color && current != Some((cell.fg, cell.modifier)) {
                queue!(out, SetAttribute(Attribute::Reset), SetForegroundColor(term_color(cell.fg)))?;
                if cell.modifier.contains(Modifier::BOLD) {
                    queue!(out, SetAttribute(Attribute::Bold))?;
                }
                if cell.modifier.contains(Modifier::DIM) {
                    queue!(out, SetAttribute(Attribute::Dim))?;
                }
                current = Some((cell.fg, cell.modifier));
            }
            queue!(out, Print(cell.symbol()))?;
        }
        if color && current.is_some() {
            queue!(out, SetAttribute(Attribute::Reset), ResetColor)?;
        }
        queue!(out, Print("\n"))?;
    }
    out.flush()
}

/// Prints each snapshot once to a writer, normally stdout.
pub struct OneShotPrinter<W: Write> {
    out: W,
    width: u16,
    color: bool,
}

impl OneShotPrinter<Stdout> {
    pub fn stdout() -> Self {
        let out = io::stdout();
        let tty = out.is_terminal();
        let width = if tty {
            terminal::size().map(|(w, _)| w).unwrap_or(DEFAULT_WIDTH)
        } else {
            DEFAULT_WIDTH
        };
        Self::new(out, width, tty)
    }
}

impl<W: Write> OneShotPrinter<W> {
    pub fn new(out: W, width: u16, color: bool) -> Self {
        Self { out, width, color }
    }

    pub fn into_inner(self) -> W {
        self.out
    }
}

impl<W: Write> Renderer for OneShotPrinter<W> {
    fn render(&mut self, snapshot: &SensorSnapshot) -> Result<()> {
        let dashboard = build_dashboard(snapshot);
        let buf = render_to_buffer(&dashboard, StatusLine::once(), self.width);
        write_buffer(&buf, &mut self.out, self.color).context("writing dashboard to stdout")
    }
}

/// Prints the classified snapshot as pretty JSON.
pub struct JsonPrinter<W: Write> {
    out: W,
}

impl<W: Write> JsonPrinter<W> {
    pub fn new(out: W) -> Self {
        Self { out }
    }

    pub fn into_inner(self) -> W {
        self.out
    }
}

impl<W: Write> Renderer for JsonPrinter<W> {
    fn render(&mut self, snapshot: &SensorSnapshot) -> Result<()> {
        serde_json::to_writer_pretty(&mut self.out, snapshot).context("serializing snapshot")?;
        writeln!(self.out)?;
        self.out.flush()?;
        Ok(())
    }
}

/// Full-screen live display. Raw mode, the alternate screen and the hidden
/// cursor are undone on drop.
pub struct LiveTerminal {
    terminal: Terminal<CrosstermBackend<Stdout>>,
    refresh: Duration,
}

impl LiveTerminal {
    pub fn enter(refresh: Duration) -> Result<Self> {
        enable_raw_mode().context("enabling raw mode")?;
        let mut stdout = io::stdout();
        if let Err(e) = execute!(stdout, EnterAlternateScreen, Hide) {
            let _ = disable_raw_mode();
            return Err(e).context("entering alternate screen");
        }
        match Terminal::new(CrosstermBackend::new(stdout)) {
            Ok(terminal) => {
                logger::set_stderr_muted(true);
                Ok(Self { terminal, refresh })
            }
            Err(e) => {
                let _ = execute!(io::stdout(), LeaveAlternateScreen, Show);
                let _ = disable_raw_mode();
                Err(e).context("creating terminal")
            }
        }
    }
}

impl Renderer for LiveTerminal {
    fn render(&mut self, snapshot: &SensorSnapshot) -> Result<()> {
        let dashboard = build_dashboard(snapshot);
        let status = StatusLine::live(self.refresh);
        self.terminal
            .draw(|f| f.render_widget(DashboardWidget::new(&dashboard, status), f.area()))?;
        Ok(())
    }
}

impl Drop for LiveTerminal {
    fn drop(&mut self) {
        let raw = disable_raw_mode();
        let screen = execute!(self.terminal.backend_mut(), LeaveAlternateScreen, Show);
        logger::set_stderr_muted(false);
        if let Err(e) = raw {
            warn!("failed to disable raw mode: {}", e);
        }
        if let Err(e) = screen {
            warn!("failed to restore terminal: {}", e);
        }
    }
}

pub fn is_quit_key(key: &KeyEvent) -> bool {
    if key.kind != KeyEventKind::Press {
        return false;
    }
    match key.code {
        KeyCode::Char('q') | KeyCode::Esc => true,
        KeyCode::Char('c') => key.modifiers.contains(KeyModifiers::CONTROL),
        _ => false,
    }
}

/// Read keys until a quit key arrives or `stop` is cancelled elsewhere.
/// In raw mode Ctrl-C arrives as a key, not a signal.
pub fn spawn_key_reader(stop: StopToken) -> thread::JoinHandle<()> {
    thread::spawn(move || {
        while !stop.is_cancelled() {
            match event::poll(KEY_POLL_INTERVAL) {
                Ok(true) => match event::read() {
                    Ok(Event::Key(key)) if is_quit_key(&key) => {
                        debug!(?key.code, "quit key");
                        stop.cancel();
                    }
                    Ok(_) => {}
                    Err(e) => {
                        warn!("reading terminal events failed: {}", e);
                        return;
                    }
                },
                Ok(false) => {}
                Err(e) => {
                    warn!("polling terminal events failed: {}", e);
                    return;
                }
            }
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::classify::classify;
    use crate::config::MonitorConfig;
    use crate::ordering::ChipOrder;
    use crate::test_utils::test_utils::sample_snapshot;
    use chrono::TimeZone;
    use serde_json::json;

    fn fixed_status(refresh: Option<Duration>) -> StatusLine {
        let taken_at = Local.with_ymd_and_hms(2025, 3, 14, 9, 26, 53).unwrap();
        StatusLine { refresh, taken_at }
    }

    fn lines(buf: &Buffer) -> Vec<String> {
        buf.content()
            .chunks(buf.area.width as usize)
            .map(|row| row.iter().map(|c| c.symbol()).collect::<String>())
            .collect()
    }

    fn position(buf: &Buffer, needle: &str) -> Option<(usize, usize)> {
        lines(buf).iter().enumerate().find_map(|(y, line)| {
            let chars: Vec<char> = line.chars().collect();
            let pat: Vec<char> = needle.chars().collect();
            chars.windows(pat.len()).position(|w| w == pat.as_slice()).map(|x| (x, y))
        })
    }

    fn fg_at(buf: &Buffer, x: usize, y: usize) -> Color {
        buf.content()[y * buf.area.width as usize + x].fg
    }

    #[test]
    fn test_status_line_texts() {
        let live = fixed_status(Some(Duration::from_secs(2)));
        assert!(live.left_text().contains("every 2s"));
        assert_eq!(live.right_text(), "[2025-03-14 09:26:53] ");
        assert!(!fixed_status(None).left_text().contains("every"));
    }

    #[test]
    fn test_render_shows_regions_and_tables() {
        let dash = build_dashboard(&sample_snapshot());
        let buf = render_to_buffer(&dash, fixed_status(None), 300);
        let text = lines(&buf).join("\n");
        for title in [
            " Temperatures ",
            " Voltages ",
            " Fans ",
            "System Temperatures",
            "Drive Temperatures",
            "Chip / Sensor",
            "Lowest",
            "2025-03-14 09:26:53",
        ] {
            assert!(text.contains(title), "missing {:?}", title);
        }
        assert!(text.contains("coretemp-isa-0000 Core 0"));
        assert!(text.contains("1045 RPM"));
        assert!(text.contains("3.33V"));
        assert_eq!(buf.area.height, 1 + dash.height());
    }

    #[test]
    fn test_hidden_regions_not_drawn() {
        let snap = classify(
            json!({ "coretemp-isa-0000": { "Core 0": { "temp1_input": 45.0, "temp1_max": 90.0 } } }),
            &MonitorConfig::default(),
            &ChipOrder::default(),
        );
        let buf = render_to_buffer(&build_dashboard(&snap), fixed_status(None), 120);
        let text = lines(&buf).join("\n");
        assert!(text.contains(" Temperatures "));
        assert!(!text.contains(" Voltages "));
        assert!(!text.contains(" Fans "));
    }

    #[test]
    fn test_current_value_colored_by_tier() {
        let snap = classify(
            json!({ "coretemp-isa-0000": {
                "Core 0": { "temp1_input": 80.0, "temp1_max": 90.0 },
                "Core 1": { "temp2_input": 55.0, "temp2_max": 90.0 },
                "Core 2": { "temp3_input": 30.0, "temp3_max": 90.0 }
            } }),
            &MonitorConfig::default(),
            &ChipOrder::default(),
        );
        let buf = render_to_buffer(&build_dashboard(&snap), fixed_status(None), 120);
        let (x, y) = position(&buf, "80°C").unwrap();
        assert_eq!(fg_at(&buf, x, y), Color::Red);
        let (x, y) = position(&buf, "55°C").unwrap();
        assert_eq!(fg_at(&buf, x, y), Color::Yellow);
        let (x, y) = position(&buf, "30°C").unwrap();
        assert_eq!(fg_at(&buf, x, y), Color::LightGreen);
        let (x, y) = position(&buf, "90°C").unwrap();
        assert!(buf.content()[y * 120 + x].modifier.contains(Modifier::DIM));
    }

    #[test]
    fn test_chip_change_leaves_blank_line() {
        let snap = classify(
            json!({
                "coretemp-isa-0000": { "Core 0": { "temp1_input": 45.0 } },
                "acpitz-acpi-0": { "temp1": { "temp1_input": 27.8 } }
            }),
            &MonitorConfig::default(),
            &ChipOrder::default(),
        );
        let buf = render_to_buffer(&build_dashboard(&snap), fixed_status(None), 120);
        let (_, core) = position(&buf, "Core 0").unwrap();
        let (_, acpi) = position(&buf, "acpitz-acpi-0").unwrap();
        assert_eq!(acpi, core + 2);
    }

    #[test]
    fn test_empty_dashboard_message() {
        let snap = classify(json!({}), &MonitorConfig::default(), &ChipOrder::default());
        let buf = render_to_buffer(&build_dashboard(&snap), fixed_status(None), 80);
        assert_eq!(buf.area.height, 2);
        assert!(lines(&buf)[1].contains(EMPTY_MESSAGE));
    }

    #[test]
    fn test_write_buffer_plain_trims_trailing_space() {
        let mut buf = Buffer::empty(Rect::new(0, 0, 10, 2));
        buf.set_string(0, 0, "ab", Style::default().fg(Color::Red));
        let mut out = Vec::new();
        write_buffer(&buf, &mut out, false).unwrap();
        assert_eq!(String::from_utf8(out).unwrap(), "ab\n\n");
    }

    #[test]
    fn test_write_buffer_color_emits_escapes() {
        let mut buf = Buffer::empty(Rect::new(0, 0, 4, 1));
        buf.set_string(0, 0, "hi", Style::default().fg(Color::Red).add_modifier(Modifier::BOLD));
        let mut out = Vec::new();
        write_buffer(&buf, &mut out, true).unwrap();
        let text = String::from_utf8(out).unwrap();
        assert!(text.contains("\x1b["));
        assert!(text.contains("hi"));
        assert!(text.ends_with('\n'));
    }

    #[test]
    fn test_one_shot_printer_output() {
        let mut printer = OneShotPrinter::new(Vec::new(), 400, false);
        printer.render(&sample_snapshot()).unwrap();
        let text = String::from_utf8(printer.into_inner()).unwrap();
        assert!(text.contains("System Temperatures"));
        assert!(text.contains("nvme-pci-0100 Composite"));
        assert!(!text.contains('\x1b'));
    }

    #[test]
    fn test_json_printer_output() {
        let mut printer = JsonPrinter::new(Vec::new());
        printer.render(&sample_snapshot()).unwrap();
        let value: serde_json::Value = serde_json::from_slice(&printer.into_inner()).unwrap();
        assert_eq!(value["temperatures"].as_array().unwrap().len(), 5);
        assert_eq!(value["fans"].as_array().unwrap().len(), 3);
        assert!(value.get("raw").is_none());
    }

    #[test]
    fn test_quit_keys() {
        assert!(is_quit_key(&KeyEvent::new(KeyCode::Char('q'), KeyModifiers::NONE)));
        assert!(is_quit_key(&KeyEvent::new(KeyCode::Esc, KeyModifiers::NONE)));
        assert!(is_quit_key(&KeyEvent::new(KeyCode::Char('c'), KeyModifiers::CONTROL)));
        assert!(!is_quit_key(&KeyEvent::new(KeyCode::Char('c'), KeyModifiers::NONE)));
        assert!(!is_quit_key(&KeyEvent::new(KeyCode::Char('x'), KeyModifiers::NONE)));
    }
}
