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

//! Poll cycle and the one-shot / live drivers.

use std::sync::{Arc, Condvar, Mutex};
use std::time::{Duration, Instant};

use anyhow::Result;
use tracing::{debug, info};

use crate::classify::classify;
use crate::config::MonitorConfig;
use crate::model::SensorSnapshot;
use crate::ordering::ChipOrder;
use crate::sensors::SensorSource;

/// Cancellation shared between the poll loop, the signal handler and the
/// key reader. Waiting on it returns early once it is cancelled.
#[derive(Clone, Debug, Default)]
pub struct StopToken {
    inner: Arc<(Mutex<bool>, Condvar)>,
}

impl StopToken {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        let (lock, cvar) = &*self.inner;
        match lock.lock() {
            Ok(mut guard) => *guard = true,
            Err(poisoned) => *poisoned.into_inner() = true,
        }
        cvar.notify_all();
    }

    pub fn is_cancelled(&self) -> bool {
        let (lock, _) = &*self.inner;
        match lock.lock() {
            Ok(guard) => *guard,
            Err(poisoned) => *poisoned.into_inner(),
        }
    }

    /// Sleep for `timeout` unless cancelled first. Returns `true` if cancelled.
    pub fn wait_timeout(&self, timeout: Duration) -> bool {
        let (lock, cvar) = &*self.inner;
        let deadline = Instant::now() + timeout;
        let mut guard = match lock.lock() {
            Ok(g) => g,
            Err(poisoned) => poisoned.into_inner(),
        };
        // loop guards against spurious wakeups
        while !*guard {
            let now = Instant::now();
            if now >= deadline {
                return false;
            }
            guard = match cvar.wait_timeout(guard, deadline - now) {
                Ok((g, _)) => g,
                Err(poisoned) => poisoned.into_inner().0,
            };
        }
        true
    }
}

/// Receives each fresh snapshot.
pub trait Renderer {
    fn render(&mut self, snapshot: &SensorSnapshot) -> Result<()>;
}

/// One poll: acquire, classify, sort.
pub fn poll(
    source: &dyn SensorSource,
    config: &MonitorConfig,
    order: &ChipOrder,
) -> Result<SensorSnapshot, crate::error::AcquireError> {
    let raw = source.acquire()?;
    Ok(classify(raw, config, order))
}

pub fn run_once(
    source: &dyn SensorSource,
    config: &MonitorConfig,
    renderer: &mut dyn Renderer,
) -> Result<()> {
    let snapshot = poll(source, config, &ChipOrder::default())?;
    renderer.render(&snapshot)
}

/// Poll and render every `interval` until `stop` is cancelled. Stop is only
/// checked between steps, so a started frame is always finished.
pub fn run_live(
    source: &dyn SensorSource,
    config: &MonitorConfig,
    interval: Duration,
    stop: &StopToken,
    renderer: &mut dyn Renderer,
) -> Result<()> {
    let order = ChipOrder::default();
    info!(interval_secs = interval.as_secs(), "live mode");
    let mut cycles: u64 = 0;
    while !stop.is_cancelled() {
        let snapshot = poll(source, config, &order)?;
        if stop.is_cancelled() {
            break;
        }
        renderer.render(&snapshot)?;
        cycles += 1;
        if stop.wait_timeout(interval) {
            break;
        }
    }
    debug!(cycles, "live mode stopped");
    Ok(())
}
