// SPDX-License-Identifier: GPL-3.0-only
use crate::input::DecodedClip;
use crate::output::Timeline;
use anyhow::Result;
use lipsync_shared::{FrequencyAnalyser, LipSyncSession};
use log::{debug, info};

/// Calibrate on `clip`, then play it through the session tick by tick.
///
/// Tick `n` sits at `n / tick_rate_hz` seconds and sees the audio up to that
/// point, the same view a live analyser would have during playback.
///
/// # Errors
///
/// Returns an error if the analyser produces frames of the wrong size for
/// the session.
#[allow(
    clippy::cast_possible_truncation,
    clippy::cast_precision_loss,
    clippy::cast_sign_loss
)]
pub fn analyse_clip(session: &mut LipSyncSession, clip: &DecodedClip) -> Result<Timeline> {
    let thresholds = session.calibrate(&clip.samples, clip.sample_rate);
    debug!("Using thresholds {thresholds:?}");

    let analyser_config = session.config().analyser.clone();
    let tick_rate = analyser_config.tick_rate_hz;
    let mut analyser = FrequencyAnalyser::new(clip.sample_rate, analyser_config);

    let tick_count = (clip.duration() * tick_rate).ceil() as usize;
    let mut timeline = Timeline::new(tick_rate);

    session.start_playback();
    for tick in 0..tick_count {
        let now = tick as f64 / tick_rate;
        let end = ((now * f64::from(clip.sample_rate)).round() as usize).min(clip.samples.len());

        let frame = analyser.analyse(&clip.samples[..end]);
        let viseme = session.process_frame(&frame, now)?;
        timeline.push(now, viseme);
    }

    info!(
        "Analysed {:.2}s of audio in {} ticks ({} cues)",
        clip.duration(),
        timeline.len(),
        timeline.cues().len()
    );
    Ok(timeline)
}
