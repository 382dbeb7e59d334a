// SPDX-License-Identifier: GPL-3.0-only
use crate::audio::capture::SampleReceiver;
use crate::output::{TimedViseme, Timeline};
use anyhow::{Context, Result};
use lipsync_shared::audio::calibration::CalibrationThresholds;
use lipsync_shared::{FrequencyAnalyser, LipSyncSession, MouthAsset};
use log::{debug, info};
use std::collections::VecDeque;
use std::future::Future;
use std::time::{Duration, Instant};
use tokio::time::MissedTickBehavior;

use super::clock::PlaybackClock;

/// Session plus the rolling audio window it is fed from.
pub struct LiveTracker {
    session: LipSyncSession,
    analyser: FrequencyAnalyser,
    clock: PlaybackClock,
    window: VecDeque<f32>,
    window_len: usize,
    sample_rate: u32,
    // Playback position of the previous tick
    last_tick: Option<f64>,
}

impl LiveTracker {
    #[must_use]
    pub fn new(session: LipSyncSession, sample_rate: u32) -> Self {
        let config = session.config().analyser.clone();
        let window_len = config.fft_size;
        Self {
            analyser: FrequencyAnalyser::new(sample_rate, config),
            session,
            clock: PlaybackClock::new(),
            window: VecDeque::with_capacity(window_len),
            window_len,
            sample_rate,
            last_tick: None,
        }
    }

    #[must_use]
    pub fn session(&self) -> &LipSyncSession {
        &self.session
    }

    #[must_use]
    pub fn clock(&self) -> &PlaybackClock {
        &self.clock
    }

    #[must_use]
    pub fn sample_rate(&self) -> u32 {
        self.sample_rate
    }

    /// Derive thresholds from a stretch of room audio. Only valid while stopped.
    pub fn calibrate(&mut self, samples: &[f32]) -> CalibrationThresholds {
        self.session.calibrate(samples, self.sample_rate)
    }

    /// Append newly captured samples, keeping only the analysis window.
    pub fn push_samples(&mut self, samples: &[f32]) {
        self.window.extend(samples);
        let excess = self.window.len().saturating_sub(self.window_len);
        self.window.drain(..excess);
    }

    /// Begin a fresh playback at `now`.
    pub fn start(&mut self, now: Instant) {
        self.session.start_playback();
        self.analyser.reset();
        self.clock.start(now);
        self.last_tick = None;
    }

    /// Pause keeps the session's timing state untouched.
    pub fn pause(&mut self, now: Instant) {
        self.clock.pause(now);
    }

    pub fn resume(&mut self, now: Instant) {
        self.clock.resume(now);
    }

    pub fn stop(&mut self) {
        self.clock.stop();
    }

    /// Run one display tick. Nothing happens unless the clock is running.
    ///
    /// A held label is credited with the playback time since the previous
    /// tick, so ticks dropped by a busy loop still count. The first tick
    /// after a start is credited the nominal frame delta.
    ///
    /// # Errors
    ///
    /// Returns an error if the analyser and session disagree on bin count.
    pub fn tick(&mut self, now: Instant) -> Result<Option<TimedViseme>> {
        if !self.clock.is_running() {
            return Ok(None);
        }
        let Some(time) = self.clock.position(now) else {
            return Ok(None);
        };

        let delta = self
            .last_tick
            .map_or(self.session.config().smoother.frame_delta, |last| {
                (time - last).max(0.0)
            });
        self.last_tick = Some(time);

        let frame = self.analyser.analyse(self.window.make_contiguous());
        let viseme = self.session.process_frame_with_delta(&frame, time, delta)?;
        Ok(Some(TimedViseme { time, viseme }))
    }
}

/// Drive `tracker` from a stream of captured chunks until `shutdown`
/// resolves or the stream ends.
///
/// The first `calibration_samples` samples are used for calibration before
/// playback starts.
///
/// # Errors
///
/// Returns an error if the tick rate gives no usable period or a tick fails.
pub async fn drive_live<F>(
    tracker: &mut LiveTracker,
    rx: &mut SampleReceiver,
    calibration_samples: usize,
    shutdown: F,
) -> Result<Timeline>
where
    F: Future<Output = ()>,
{
    let tick_rate = tracker.session().config().analyser.tick_rate_hz;
    let mut timeline = Timeline::new(tick_rate);
    tokio::pin!(shutdown);

    if calibration_samples > 0 {
        info!("🔇 Calibrating on {calibration_samples} samples, keep the room at its usual level...");
        let mut collected = Vec::with_capacity(calibration_samples);
        while collected.len() < calibration_samples {
            tokio::select! {
                () = &mut shutdown => return Ok(timeline),
                chunk = rx.recv() => match chunk {
                    Some(chunk) => collected.extend(chunk),
                    None => return Ok(timeline),
                },
            }
        }
        collected.truncate(calibration_samples);
        tracker.calibrate(&collected);
    }

    let period = Duration::try_from_secs_f64(1.0 / tick_rate)
        .ok()
        .filter(|period| !period.is_zero())
        .with_context(|| format!("Unusable tick rate: {tick_rate} Hz"))?;
    let mut interval = tokio::time::interval(period);
    interval.set_missed_tick_behavior(MissedTickBehavior::Skip);

    tracker.start(Instant::now());
    info!("▶️ Live tracking started");
    let mut last_shown = None;

    loop {
        tokio::select! {
            () = &mut shutdown => break,
            chunk = rx.recv() => match chunk {
                Some(chunk) => tracker.push_samples(&chunk),
                None => {
                    debug!("Capture stream closed");
                    break;
                }
            },
            _ = interval.tick() => {
                if let Some(entry) = tracker.tick(Instant::now())? {
                    if last_shown != Some(entry.viseme) {
                        info!(
                            "{:>8.3}s  {:<7} {}",
                            entry.time,
                            entry.viseme,
                            MouthAsset::for_viseme(entry.viseme).file_name()
                        );
                        last_shown = Some(entry.viseme);
                    }
                    timeline.push(entry.time, entry.viseme);
                }
            }
        }
    }

    tracker.stop();
    info!("⏹️ Live tracking stopped after {} ticks", timeline.len());
    Ok(timeline)
}

#[cfg(test)]
mod tests {
    use super::*;
    use lipsync_shared::{LipSyncConfig, Viseme};
    use tokio::sync::mpsc;

    fn tracker() -> LiveTracker {
        LiveTracker::new(LipSyncSession::with_seed(LipSyncConfig::default(), 5), 16_000)
    }

    #[test]
    fn test_window_keeps_most_recent_samples() {
        let mut tracker = tracker();
        tracker.push_samples(&vec![1.0; 400]);
        tracker.push_samples(&vec![2.0; 400]);
        assert_eq!(tracker.window.len(), 512);
        assert_eq!(tracker.window.front(), Some(&1.0));
        assert_eq!(tracker.window.back(), Some(&2.0));
        assert_eq!(tracker.window.iter().filter(|&&s| s == 1.0).count(), 112);
    }

    #[test]
    fn test_no_ticks_before_start_or_while_paused() {
        let t0 = Instant::now();
        let mut tracker = tracker();
        assert_eq!(tracker.tick(t0).unwrap(), None);

        tracker.start(t0);
        let first = tracker.tick(t0).unwrap().unwrap();
        assert_eq!(first.viseme, Viseme::Silence);
        assert_eq!(first.time, 0.0);

        tracker.pause(t0 + Duration::from_millis(100));
        assert_eq!(tracker.tick(t0 + Duration::from_millis(200)).unwrap(), None);

        tracker.resume(t0 + Duration::from_millis(500));
        let resumed = tracker
            .tick(t0 + Duration::from_millis(550))
            .unwrap()
            .unwrap();
        assert!((resumed.time - 0.15).abs() < 1e-9);
    }

    #[test]
    fn test_pause_keeps_session_timing() {
        let t0 = Instant::now();
        let mut tracker = tracker();
        tracker.start(t0);
        tracker.tick(t0).unwrap();
        tracker.tick(t0 + Duration::from_millis(16)).unwrap();
        let before = *tracker.session().timing();

        tracker.pause(t0 + Duration::from_millis(20));
        tracker.resume(t0 + Duration::from_millis(900));
        assert_eq!(*tracker.session().timing(), before);
    }

    #[test]
    fn test_late_tick_credits_measured_time() {
        let t0 = Instant::now();
        let mut tracker = tracker();
        tracker.start(t0);
        tracker.tick(t0).unwrap();
        tracker.tick(t0 + Duration::from_millis(16)).unwrap();
        // Several ticks were skipped before this one
        tracker.tick(t0 + Duration::from_millis(100)).unwrap();

        let timing = tracker.session().timing();
        assert_eq!(timing.current, Viseme::Silence);
        assert!((timing.elapsed_in_label - 0.116).abs() < 1e-9);
    }

    #[test]
    fn test_paused_time_is_not_credited() {
        let t0 = Instant::now();
        let mut tracker = tracker();
        tracker.start(t0);
        tracker.tick(t0).unwrap();
        tracker.pause(t0 + Duration::from_millis(20));
        tracker.resume(t0 + Duration::from_millis(1_020));
        tracker.tick(t0 + Duration::from_millis(1_040)).unwrap();

        // 16 ms for the first tick plus 40 ms of playback
        let elapsed = tracker.session().timing().elapsed_in_label;
        assert!((elapsed - 0.056).abs() < 1e-9);
    }

    #[tokio::test]
    async fn test_drive_live_on_silence() {
        let (tx, mut rx) = mpsc::unbounded_channel();
        let feeder = tokio::spawn(async move {
            for _ in 0..40 {
                if tx.send(vec![0.0f32; 160]).is_err() {
                    break;
                }
                tokio::time::sleep(Duration::from_millis(5)).await;
            }
        });

        let mut tracker = tracker();
        let timeline = drive_live(
            &mut tracker,
            &mut rx,
            1_600,
            tokio::time::sleep(Duration::from_millis(150)),
        )
        .await
        .unwrap();
        feeder.abort();

        let thresholds = tracker.session().thresholds();
        assert_eq!(thresholds.silence_threshold, 8.0);
        assert_eq!(thresholds.voice_threshold, 15.0);
        assert!(!timeline.is_empty());
        assert!(timeline.ticks().iter().all(|t| t.viseme == Viseme::Silence));
        assert!(!tracker.clock().is_running());
    }

    #[tokio::test]
    async fn test_drive_live_rejects_unusable_tick_rate() {
        let mut config = LipSyncConfig::default();
        config.analyser.tick_rate_hz = 1e-20;
        let mut tracker = LiveTracker::new(LipSyncSession::with_seed(config, 5), 16_000);
        let (_tx, mut rx) = mpsc::unbounded_channel::<Vec<f32>>();

        let result = drive_live(&mut tracker, &mut rx, 0, std::future::pending()).await;
        assert!(result.is_err());
        assert!(!tracker.clock().is_running());
    }

    #[tokio::test]
    async fn test_drive_live_stops_when_capture_ends() {
        let (tx, mut rx) = mpsc::unbounded_channel::<Vec<f32>>();
        drop(tx);

        let mut tracker = tracker();
        let timeline = drive_live(
            &mut tracker,
            &mut rx,
            0,
            tokio::time::sleep(Duration::from_secs(30)),
        )
        .await
        .unwrap();

        // The interval fires immediately, so at most a tick or two lands
        assert!(timeline.len() <= 2);
    }
}
