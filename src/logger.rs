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

use std::fs::{self, File, OpenOptions};
use std::path::Path;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Mutex;

use anyhow::{Context, Result};
use tracing::Metadata;
use tracing_subscriber::fmt::writer::MakeWriterExt;
use tracing_subscriber::EnvFilter;

/// Environment variable holding the log filter.
pub const LOG_ENV: &str = "SENSORS_MONITOR_LOG";
const DEFAULT_FILTER: &str = "warn";

/// Set while the live dashboard owns the terminal.
static STDERR_MUTED: AtomicBool = AtomicBool::new(false);

/// Drop stderr log events while `muted` is set. Events sent to a
/// `--log-file` are unaffected.
pub fn set_stderr_muted(muted: bool) {
    STDERR_MUTED.store(muted, Ordering::SeqCst);
}

pub fn stderr_muted() -> bool {
    STDERR_MUTED.load(Ordering::SeqCst)
}

fn stderr_open(_: &Metadata<'_>) -> bool {
    !stderr_muted()
}

fn env_filter() -> EnvFilter {
    let level = std::env::var(LOG_ENV).unwrap_or_else(|_| DEFAULT_FILTER.to_string());
    EnvFilter::try_new(&level).unwrap_or_else(|_| EnvFilter::new(DEFAULT_FILTER))
}

fn open_log_file(path: &Path) -> Result<File> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)
            .with_context(|| format!("creating log directory {}", parent.display()))?;
    }
    OpenOptions::new()
        .create(true)
        .append(true)
        .open(path)
        .with_context(|| format!("opening log file {}", path.display()))
}

/// Install the global subscriber. Logs go to stderr, or to `log_file`
/// when given. Calling it twice is harmless. Stderr output is dropped
/// while [`set_stderr_muted`] is on.
pub fn init_logging(log_file: Option<&Path>) -> Result<()> {
    let builder = tracing_subscriber::fmt()
        .with_target(false)
        .with_level(true)
        .with_env_filter(env_filter());

    // try_init fails only if a subscriber is already set
    match log_file {
        Some(path) => {
            let file = open_log_file(path)?;
            let _ = builder.with_ansi(false).with_writer(Mutex::new(file)).try_init();
        }
        None => {
            let _ = builder.with_writer(std::io::stderr.with_filter(stderr_open)).try_init();
        }
    }
    Ok(())
}
