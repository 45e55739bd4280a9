//! Track Replay - headless driver
//!
//! Loads a recording and plays it through the playback clock at a fixed
//! tick cadence, logging each source's position. Stands in for the frame
//! loop a rendering front end would normally own.
//!
//! ```text
//! track-replay <folder | file.csv> [--grouped] [--config FILE]
//!              [--speed X] [--snapshot] [--realtime] [--loop]
//! ```

use std::path::PathBuf;
use std::time::Duration;

use anyhow::{bail, Context};
use track_replay::{
    config::default_config_path, dataset, display, PlaybackClock, PlaybackEvent, ReplayConfig,
};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Log one frame out of this many
const LOG_EVERY_N_FRAMES: usize = 30;

#[derive(Debug, Default)]
struct Args {
    input: PathBuf,
    config: Option<PathBuf>,
    grouped: bool,
    realtime: bool,
    snapshot: bool,
    looping: bool,
    speed: Option<f64>,
}

fn parse_args() -> anyhow::Result<Args> {
    let mut args = Args::default();
    let mut input = None;
    let mut iter = std::env::args().skip(1);

    while let Some(arg) = iter.next() {
        match arg.as_str() {
            "--grouped" => args.grouped = true,
            "--realtime" => args.realtime = true,
            "--snapshot" => args.snapshot = true,
            "--loop" => args.looping = true,
            "--config" => {
                let path = iter.next().context("--config needs a file path")?;
                args.config = Some(PathBuf::from(path));
            }
            "--speed" => {
                let value = iter.next().context("--speed needs a value")?;
                let speed = value
                    .parse::<f64>()
                    .with_context(|| format!("bad speed '{}'", value))?;
                args.speed = Some(speed);
            }
            other if other.starts_with("--") => bail!("unknown option {}", other),
            other => input = Some(PathBuf::from(other)),
        }
    }

    args.input = input.context("usage: track-replay <folder | file.csv> [options]")?;
    Ok(args)
}

fn main() -> anyhow::Result<()> {
    // Initialize logging
    tracing_subscriber::registry()
        .with(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("info,track_replay=debug")),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let args = parse_args()?;

    let mut config = match args.config.as_ref() {
        Some(path) => ReplayConfig::load(path)
            .with_context(|| format!("loading config {}", path.display()))?,
        None => default_config_path()
            .map(ReplayConfig::load_or_default)
            .unwrap_or_default(),
    };
    if args.snapshot {
        config.interpolation_enabled = false;
    }
    if args.looping {
        if args.realtime {
            config.loop_enabled = true;
        } else {
            tracing::warn!("--loop needs --realtime, ignoring");
        }
    }
    if !args.realtime && config.loop_enabled {
        tracing::warn!("Looping disabled for a non-realtime run");
        config.loop_enabled = false;
    }

    let data = if args.input.is_dir() {
        dataset::load_folder(&args.input, &config)?
    } else if args.grouped {
        dataset::load_grouped_file(&args.input)?
    } else {
        let fragment = dataset::load_file(&args.input, 1)?;
        dataset::merge([fragment])
    };

    tracing::info!(
        "Starting replay of {} samples, {} sources",
        data.len(),
        data.source_count()
    );

    let mut clock = PlaybackClock::with_config(&config);
    if let Some(speed) = args.speed {
        clock.set_speed(speed);
    }

    let mut frame_count = 0usize;
    clock.subscribe(move |event: &PlaybackEvent| match event {
        PlaybackEvent::Frame { elapsed, results } => {
            if frame_count % LOG_EVERY_N_FRAMES == 0 {
                for (source, sample) in results {
                    tracing::info!(
                        "{} source {}: ({:.2}, {:.2})",
                        display::format_elapsed(*elapsed),
                        source,
                        sample.position.x,
                        sample.position.y
                    );
                }
            }
            frame_count += 1;
        }
        PlaybackEvent::MarkerReached { name, time, .. } => {
            tracing::info!("Marker '{}' at {:.2}s", name, time);
        }
        PlaybackEvent::StateChanged(state) => {
            tracing::info!("Playback {}", state.display_name());
        }
        PlaybackEvent::DatasetLoaded { duration, .. } => {
            tracing::info!("Dataset ready, {:.2}s", duration);
        }
    });

    clock.load_dataset(data);
    clock.play();
    if !clock.is_running() {
        bail!("nothing to replay: dataset has zero duration");
    }

    let interval = Duration::from_millis(config.tick_interval_ms);
    while clock.is_running() {
        if args.realtime {
            std::thread::sleep(interval);
        }
        clock.tick(interval.as_secs_f64());
    }

    if let Some(label) = display::wall_clock_label(&clock) {
        tracing::info!("Replay finished at {}", label);
    }
    Ok(())
}
