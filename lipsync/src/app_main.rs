// SPDX-License-Identifier: GPL-3.0-only

//! Command entry point
//!
//! Parses the command line, sets up logging and configuration, then hands
//! off to the decoder, the capture device and the playback drivers.

use crate::audio::MicrophoneCapture;
use crate::audio::capture::write_wav;
use crate::cli;
use crate::input::{DecodedClip, decode_file};
use crate::output::{OutputFormat, TimelineReport};
use crate::playback::{LiveTracker, analyse_clip, drive_live};
use anyhow::{Context, Result};
use clap::ArgMatches;
use lipsync_shared::LipSyncConfig;
use lipsync_shared::LipSyncSession;
use lipsync_shared::audio::calibration::ThresholdCalibrator;
use log::info;
use std::path::PathBuf;
use std::time::Duration;
use tokio::sync::mpsc;

/// Main entry point for the cli
///
/// # Errors
///
/// Returns an error if the selected command fails.
pub async fn run() -> Result<()> {
    let matches = cli::build().get_matches();
    let Some((command, sub)) = matches.subcommand() else {
        return Ok(());
    };

    init_logging(sub.get_flag("verbose"));
    let config = load_config(sub)?;

    match command {
        "analyze" => handle_analyze_command(sub, config),
        "calibrate" => handle_calibrate_command(sub, &config),
        "record" => handle_record_command(sub, config).await,
        "live" => handle_live_command(sub, config).await,
        "config" => handle_config_command(sub, &config),
        other => Err(anyhow::anyhow!("Unknown command: {other}")),
    }
}

// Respect RUST_LOG env var, fallback to verbose flag
fn init_logging(verbose: bool) {
    if std::env::var("RUST_LOG").is_ok() {
        env_logger::init();
    } else {
        let log_level = if verbose {
            log::LevelFilter::Debug
        } else {
            log::LevelFilter::Info
        };
        env_logger::Builder::from_default_env()
            .filter_level(log_level)
            .init();
    }
}

fn load_config(matches: &ArgMatches) -> Result<LipSyncConfig> {
    match matches.get_one::<PathBuf>("config") {
        Some(path) => LipSyncConfig::load_from(path)
            .with_context(|| format!("Failed to load config from {}", path.display())),
        None => Ok(LipSyncConfig::load()),
    }
}

fn new_session(matches: &ArgMatches, config: LipSyncConfig) -> LipSyncSession {
    match matches.get_one::<u64>("seed") {
        Some(&seed) => {
            info!("Using fallback seed {seed}");
            LipSyncSession::with_seed(config, seed)
        }
        None => LipSyncSession::new(config),
    }
}

fn output_format(matches: &ArgMatches) -> Result<OutputFormat> {
    let raw = matches
        .get_one::<String>("format")
        .map_or("json", String::as_str);
    raw.parse::<OutputFormat>()
        .with_context(|| format!("Unknown output format: {raw}"))
}

fn seconds_arg(matches: &ArgMatches, id: &str) -> Result<Duration> {
    let seconds = matches.get_one::<f64>(id).copied().unwrap_or_default();
    Duration::try_from_secs_f64(seconds).with_context(|| format!("Invalid duration: {seconds}s"))
}

fn print_report(
    source: &str,
    clip: &DecodedClip,
    session: &mut LipSyncSession,
    format: OutputFormat,
) -> Result<()> {
    let timeline = analyse_clip(session, clip)?;
    let report = TimelineReport::new(
        source,
        clip.sample_rate,
        clip.duration(),
        session.thresholds(),
        &timeline,
    );
    print!("{}", report.render(format)?);
    if format == OutputFormat::Json {
        println!();
    }
    Ok(())
}

/// Handle the analyze subcommand - offline playback of a file
fn handle_analyze_command(matches: &ArgMatches, config: LipSyncConfig) -> Result<()> {
    let path = matches
        .get_one::<PathBuf>("file")
        .context("Missing audio file")?;
    let format = output_format(matches)?;

    info!("🎬 Analysing {}", path.display());
    let clip = decode_file(path)?;
    let mut session = new_session(matches, config);

    print_report(&path.display().to_string(), &clip, &mut session, format)
}

/// Handle the calibrate subcommand - thresholds only
fn handle_calibrate_command(matches: &ArgMatches, config: &LipSyncConfig) -> Result<()> {
    let path = matches
        .get_one::<PathBuf>("file")
        .context("Missing audio file")?;
    let clip = decode_file(path)?;

    let calibrator = ThresholdCalibrator::new(config.calibration.clone());
    let thresholds = calibrator.calibrate(&clip.samples, clip.sample_rate);

    println!("silence_threshold = {:.3}", thresholds.silence_threshold);
    println!("voice_threshold = {:.3}", thresholds.voice_threshold);
    Ok(())
}

/// Handle the record subcommand - capture, optionally save, then analyse
async fn handle_record_command(matches: &ArgMatches, config: LipSyncConfig) -> Result<()> {
    let duration = seconds_arg(matches, "seconds")?;
    let format = output_format(matches)?;

    let capture = MicrophoneCapture::open_default()?;
    let clip = capture.record(duration).await?;

    if let Some(output) = matches.get_one::<PathBuf>("output") {
        write_wav(output, &clip.samples, clip.sample_rate)?;
    }

    let mut session = new_session(matches, config);
    print_report("microphone", &clip, &mut session, format)
}

/// Handle the live subcommand - track the microphone until Ctrl+C
async fn handle_live_command(matches: &ArgMatches, config: LipSyncConfig) -> Result<()> {
    let calibrate_for = seconds_arg(matches, "calibrate-seconds")?;

    let capture = MicrophoneCapture::open_default()?;
    let sample_rate = capture.sample_rate();

    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
    let calibration_samples =
        (calibrate_for.as_secs_f64() * f64::from(sample_rate)).round() as usize;

    let (tx, mut rx) = mpsc::unbounded_channel();
    let _stream = capture.start(tx)?;

    let session = new_session(matches, config);
    let mut tracker = LiveTracker::new(session, sample_rate);

    info!("Press Ctrl+C to stop");
    let shutdown = async {
        match tokio::signal::ctrl_c().await {
            Ok(()) => info!("Received Ctrl+C, stopping..."),
            Err(e) => log::error!("Failed to listen for Ctrl+C: {e}"),
        }
    };

    let timeline = drive_live(&mut tracker, &mut rx, calibration_samples, shutdown).await?;
    info!(
        "{} mouth changes over {:.1}s",
        timeline.cues().len(),
        timeline.ticks().last().map_or(0.0, |t| t.time)
    );
    Ok(())
}

/// Handle the config subcommand - print and optionally persist
fn handle_config_command(matches: &ArgMatches, config: &LipSyncConfig) -> Result<()> {
    print!("{}", config.to_toml()?);

    if matches.get_flag("save") {
        config.save()?;
        info!("Saved configuration to {}", LipSyncConfig::default_path().display());
    }
    Ok(())
}
