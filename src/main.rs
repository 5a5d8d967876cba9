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

use std::io;
use std::process::{self, ExitCode};
use std::sync::{Mutex, PoisonError};

use anyhow::Result;
use clap::Parser;
use tracing::{error, info, warn};

use sensors_monitor::cli::{Cli, Mode, Settings};
use sensors_monitor::config::{load_config, MonitorConfig};
use sensors_monitor::logger;
use sensors_monitor::model::SensorSnapshot;
use sensors_monitor::monitor::{run_live, run_once, Renderer, StopToken};
use sensors_monitor::sensors::{JsonFileSource, SensorSource, SensorsCommand};
use sensors_monitor::ui::{spawn_key_reader, JsonPrinter, LiveTerminal, OneShotPrinter};

/// Held while one-shot output is written, so a signal never truncates it.
static OUTPUT: Mutex<()> = Mutex::new(());

/// Writes through `R` while holding [`OUTPUT`].
struct Exclusive<R>(R);

impl<R: Renderer> Renderer for Exclusive<R> {
    fn render(&mut self, snapshot: &SensorSnapshot) -> Result<()> {
        let _held = OUTPUT.lock().unwrap_or_else(PoisonError::into_inner);
        self.0.render(snapshot)
    }
}

/// SIGINT, SIGTERM and SIGHUP end the process with status 0. Live mode stops
/// its loop through `stop` so the terminal is restored; one-shot modes exit
/// once any output in progress is complete.
fn install_signal_handler(mode: &Mode, stop: &StopToken) {
    let live = *mode == Mode::Live;
    let stop = stop.clone();
    let installed = ctrlc::set_handler(move || {
        if live {
            stop.cancel();
        } else {
            let _held = OUTPUT.lock().unwrap_or_else(PoisonError::into_inner);
            info!("interrupted, exiting");
            process::exit(0);
        }
    });
    if let Err(e) = installed {
        warn!("Failed to set signal handler: {}. Use q to quit.", e);
    }
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    if let Err(e) = logger::init_logging(cli.log_file.as_deref()) {
        eprintln!("warning: {:#}", e);
    }

    let config = load_config(&cli.config);
    let settings = cli.resolve(&config.defaults());
    info!(mode = ?settings.mode, refresh_secs = settings.refresh.as_secs(), "starting");

    match run(&settings, &config) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            // the live terminal is already restored here
            error!("{:#}", e);
            eprintln!("Error: {:#}", e);
            ExitCode::FAILURE
        }
    }
}

fn source_for(settings: &Settings) -> Box<dyn SensorSource> {
    match &settings.sensors_json {
        Some(path) => {
            info!(path = %path.display(), "reading sensors from JSON file");
            Box::new(JsonFileSource::new(path))
        }
        None => Box::new(SensorsCommand::new(settings.sensors_config.clone())),
    }
}

fn run(settings: &Settings, config: &MonitorConfig) -> Result<()> {
    let source = source_for(settings);
    let stop = StopToken::new();
    install_signal_handler(&settings.mode, &stop);

    match settings.mode {
        Mode::Once => {
            run_once(source.as_ref(), config, &mut Exclusive(OneShotPrinter::stdout()))
        }
        Mode::Json => {
            run_once(source.as_ref(), config, &mut Exclusive(JsonPrinter::new(io::stdout())))
        }
        Mode::Live => {
            let result = {
                let mut screen = LiveTerminal::enter(settings.refresh)?;
                let keys = spawn_key_reader(stop.clone());
                let result = run_live(source.as_ref(), config, settings.refresh, &stop, &mut screen);
                stop.cancel();
                if keys.join().is_err() {
                    warn!("key reader thread panicked");
                }
                result
            };
            info!("live mode finished");
            result
        }
    }
}
