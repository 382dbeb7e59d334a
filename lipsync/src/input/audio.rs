// SPDX-License-Identifier: GPL-3.0-only
use anyhow::{Context, Result};
use lipsync_shared::validation::validate_sample_rate;
use std::path::Path;
use symphonia::core::audio::{AudioBuffer, AudioBufferRef, Signal};
use symphonia::core::codecs::{CODEC_TYPE_NULL, DecoderOptions};
use symphonia::core::conv::FromSample;
use symphonia::core::formats::FormatOptions;
use symphonia::core::io::{MediaSourceStream, MediaSourceStreamOptions};
use symphonia::core::meta::MetadataOptions;
use symphonia::core::probe::Hint;
use symphonia::core::sample::Sample;

/// A mono clip held fully in memory.
#[derive(Debug, Clone, PartialEq)]
pub struct DecodedClip {
    pub samples: Vec<f32>,
    pub sample_rate: u32,
}

impl DecodedClip {
    /// Wrap already decoded mono samples.
    ///
    /// # Errors
    ///
    /// Returns an error if the sample rate is outside the supported range.
    pub fn from_samples(samples: Vec<f32>, sample_rate: u32) -> Result<Self> {
        validate_sample_rate(sample_rate)?;
        Ok(Self {
            samples,
            sample_rate,
        })
    }

    /// Clip length in seconds.
    #[must_use]
    #[allow(clippy::cast_precision_loss)]
    pub fn duration(&self) -> f64 {
        self.samples.len() as f64 / f64::from(self.sample_rate)
    }
}

// Only the first channel drives the mouth.
fn first_channel<T>(samples: &mut Vec<f32>, data: &AudioBuffer<T>)
where
    T: Sample,
    f32: FromSample<T>,
{
    if data.spec().channels.count() == 0 {
        return;
    }
    samples.extend(data.chan(0).iter().map(|v| f32::from_sample(*v)));
}

/// Decode any container/codec symphonia understands into a mono clip.
///
/// # Errors
///
/// Returns an error if the file cannot be opened or probed, has no decodable
/// audio track, or reports an unsupported sample rate.
pub fn decode_file<P: AsRef<Path>>(path: P) -> Result<DecodedClip> {
    let path = path.as_ref();
    let src = std::fs::File::open(path)
        .with_context(|| format!("Failed to open audio file {}", path.display()))?;
    let mss = MediaSourceStream::new(Box::new(src), MediaSourceStreamOptions::default());

    let mut hint = Hint::new();
    if let Some(extension) = path.extension().and_then(|e| e.to_str()) {
        hint.with_extension(extension);
    }

    let probed = symphonia::default::get_probe()
        .format(
            &hint,
            mss,
            &FormatOptions::default(),
            &MetadataOptions::default(),
        )
        .with_context(|| format!("Unrecognised audio format: {}", path.display()))?;
    let mut format = probed.format;

    let track = format
        .tracks()
        .iter()
        .find(|t| t.codec_params.codec != CODEC_TYPE_NULL)
        .ok_or_else(|| anyhow::anyhow!("no supported audio tracks in {}", path.display()))?;

    let mut decoder = symphonia::default::get_codecs()
        .make(&track.codec_params, &DecoderOptions::default())
        .context("Failed to create audio decoder")?;

    let track_id = track.id;
    let sample_rate = track
        .codec_params
        .sample_rate
        .context("Audio track does not declare a sample rate")?;
    let mut pcm_data = Vec::new();

    while let Ok(packet) = format.next_packet() {
        if packet.track_id() != track_id {
            continue;
        }

        match decoder.decode(&packet)? {
            AudioBufferRef::F64(buf) => first_channel(&mut pcm_data, &buf),
            AudioBufferRef::F32(buf) => first_channel(&mut pcm_data, &buf),
            AudioBufferRef::S32(buf) => first_channel(&mut pcm_data, &buf),
            AudioBufferRef::S16(buf) => first_channel(&mut pcm_data, &buf),
            AudioBufferRef::S8(buf) => first_channel(&mut pcm_data, &buf),
            AudioBufferRef::U32(buf) => first_channel(&mut pcm_data, &buf),
            AudioBufferRef::U16(buf) => first_channel(&mut pcm_data, &buf),
            AudioBufferRef::U8(buf) => first_channel(&mut pcm_data, &buf),
            AudioBufferRef::U24(buf) => first_channel(&mut pcm_data, &buf),
            AudioBufferRef::S24(buf) => first_channel(&mut pcm_data, &buf),
        }
    }

    log::debug!(
        "Decoded {}: {} samples at {}Hz",
        path.display(),
        pcm_data.len(),
        sample_rate
    );

    DecodedClip::from_samples(pcm_data, sample_rate)
}
