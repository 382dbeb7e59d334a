// SPDX-License-Identifier: GPL-3.0-only

use crate::input::DecodedClip;
use anyhow::{Context, Result};
use cpal::traits::{DeviceTrait, HostTrait, StreamTrait};
use cpal::{Device, SampleFormat, Stream, StreamConfig, SupportedStreamConfig};
use hound::{WavSpec, WavWriter};
use log::info;
use std::path::Path;
use std::time::Duration;
use tokio::sync::mpsc;

/// Chunks of mono samples as they arrive from the device callback.
pub type SampleSender = mpsc::UnboundedSender<Vec<f32>>;
pub type SampleReceiver = mpsc::UnboundedReceiver<Vec<f32>>;

/// The default input device with the stream format we will open it with.
pub struct MicrophoneCapture {
    device: Device,
    config: SupportedStreamConfig,
}

impl MicrophoneCapture {
    /// Pick the default input device and its preferred configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if no input device or usable configuration exists.
    pub fn open_default() -> Result<Self> {
        let host = cpal::default_host();
        let device = host
            .default_input_device()
            .context("No input device available")?;
        let config = optimal_config(&device)?;

        if let Ok(name) = device.name() {
            info!(
                "🎤 Using input device '{name}' at {}Hz ({} channels, {:?})",
                config.sample_rate().0,
                config.channels(),
                config.sample_format()
            );
        }

        Ok(Self { device, config })
    }

    #[must_use]
    pub fn sample_rate(&self) -> u32 {
        self.config.sample_rate().0
    }

    /// Start streaming mono chunks into `tx`. Capture stops when the
    /// returned stream is dropped.
    ///
    /// # Errors
    ///
    /// Returns an error if the stream cannot be built or started, or the
    /// device only offers an unsupported sample format.
    pub fn start(&self, tx: SampleSender) -> Result<Stream> {
        let stream_config: StreamConfig = self.config.config();
        let channels = usize::from(stream_config.channels);

        let stream = match self.config.sample_format() {
            SampleFormat::F32 => self.device.build_input_stream(
                &stream_config,
                move |data: &[f32], _: &cpal::InputCallbackInfo| {
                    let _ = tx.send(downmix_f32(data, channels));
                },
                |err| log::error!("Stream error: {err}"),
                None,
            )?,
            SampleFormat::I16 => self.device.build_input_stream(
                &stream_config,
                move |data: &[i16], _: &cpal::InputCallbackInfo| {
                    let _ = tx.send(downmix_i16(data, channels));
                },
                |err| log::error!("Stream error: {err}"),
                None,
            )?,
            other => return Err(anyhow::anyhow!("Unsupported sample format: {other:?}")),
        };

        stream.play().context("Failed to start input stream")?;
        Ok(stream)
    }

    /// Record for a fixed duration.
    ///
    /// # Errors
    ///
    /// Returns an error if the stream fails to start.
    pub async fn record(&self, duration: Duration) -> Result<DecodedClip> {
        info!("🎤 Recording {:.1}s of audio...", duration.as_secs_f64());

        let (tx, mut rx) = mpsc::unbounded_channel();
        let stream = self.start(tx)?;
        tokio::time::sleep(duration).await;
        drop(stream);

        let mut samples = Vec::new();
        while let Ok(chunk) = rx.try_recv() {
            samples.extend(chunk);
        }

        // Trim the callback overshoot
        let wanted = duration_in_samples(duration, self.sample_rate());
        samples.truncate(wanted);

        info!("🎤 Recorded {} samples", samples.len());
        DecodedClip::from_samples(samples, self.sample_rate())
    }
}

/// Capture rate used whenever the device allows it.
const PREFERRED_SAMPLE_RATE: u32 = 48_000;

// F32 before I16, at the preferred rate or as close as the device allows.
fn optimal_config(device: &Device) -> Result<SupportedStreamConfig> {
    let range = device
        .supported_input_configs()?
        .filter(|config| matches!(config.sample_format(), SampleFormat::F32 | SampleFormat::I16))
        .min_by_key(|config| {
            (
                config.sample_format() != SampleFormat::F32,
                rate_distance(config.min_sample_rate().0, config.max_sample_rate().0),
            )
        })
        .context("No F32 or I16 input config")?;

    let rate = nearest_rate(range.min_sample_rate().0, range.max_sample_rate().0);
    Ok(range.with_sample_rate(cpal::SampleRate(rate)))
}

fn nearest_rate(min: u32, max: u32) -> u32 {
    PREFERRED_SAMPLE_RATE.clamp(min, max.max(min))
}

fn rate_distance(min: u32, max: u32) -> u32 {
    nearest_rate(min, max).abs_diff(PREFERRED_SAMPLE_RATE)
}

#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
fn duration_in_samples(duration: Duration, sample_rate: u32) -> usize {
    (duration.as_secs_f64() * f64::from(sample_rate)).round() as usize
}

/// Average interleaved frames down to one channel.
#[must_use]
#[allow(clippy::cast_precision_loss)]
pub fn downmix_f32(data: &[f32], channels: usize) -> Vec<f32> {
    let channels = channels.max(1);
    data.chunks(channels)
        .map(|chunk| chunk.iter().sum::<f32>() / chunk.len() as f32)
        .collect()
}

#[must_use]
#[allow(clippy::cast_precision_loss)]
pub fn downmix_i16(data: &[i16], channels: usize) -> Vec<f32> {
    let samples: Vec<f32> = data.iter().map(|&s| f32::from(s) / 32768.0).collect();
    downmix_f32(&samples, channels)
}

/// Save mono samples as a 32-bit float WAV file.
///
/// # Errors
///
/// Returns an error if the file cannot be created or written.
pub fn write_wav<P: AsRef<Path>>(path: P, samples: &[f32], sample_rate: u32) -> Result<()> {
    let path = path.as_ref();
    let spec = WavSpec {
        channels: 1,
        sample_rate,
        bits_per_sample: 32,
        sample_format: hound::SampleFormat::Float,
    };

    let mut writer = WavWriter::create(path, spec)
        .with_context(|| format!("Failed to create {}", path.display()))?;
    for &sample in samples {
        writer.write_sample(sample)?;
    }
    writer.finalize()?;

    info!("💾 Saved {} samples to {}", samples.len(), path.display());
    Ok(())
}
