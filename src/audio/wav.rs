/*!
 * WAV file reading and writing.
 *
 * Synthesis engines and ffmpeg hand audio back as WAV files of arbitrary
 * layout. Everything is normalized here to the track format: mono, 16-bit,
 * at the configured sample rate.
 */

use std::io::{Read, Seek, Write};
use std::path::Path;

use crate::audio::AudioClip;
use crate::errors::AudioError;

/// Read a WAV file and convert it to a mono clip at `target_rate`.
pub fn read_wav<P: AsRef<Path>>(path: P, target_rate: u32) -> Result<AudioClip, AudioError> {
    let reader = hound::WavReader::open(path.as_ref())?;
    decode(reader, target_rate)
}

/// Read WAV data from any reader (for testing/flexibility).
pub fn read_wav_from<R: Read>(reader: R, target_rate: u32) -> Result<AudioClip, AudioError> {
    let reader = hound::WavReader::new(reader)?;
    decode(reader, target_rate)
}

fn decode<R: Read>(mut reader: hound::WavReader<R>, target_rate: u32) -> Result<AudioClip, AudioError> {
    let spec = reader.spec();
    if spec.channels == 0 {
        return Err(AudioError::UnsupportedFormat("zero channels".to_string()));
    }

    let raw: Vec<i16> = match (spec.sample_format, spec.bits_per_sample) {
        (hound::SampleFormat::Int, 16) => reader
            .samples::<i16>()
            .collect::<Result<Vec<_>, _>>()?,
        (hound::SampleFormat::Int, bits) if bits > 16 && bits <= 32 => {
            let shift = bits - 16;
            reader
                .samples::<i32>()
                .map(|s| s.map(|v| (v >> shift) as i16))
                .collect::<Result<Vec<_>, _>>()?
        }
        (hound::SampleFormat::Int, 8) => reader
            .samples::<i8>()
            .map(|s| s.map(|v| (v as i16) << 8))
            .collect::<Result<Vec<_>, _>>()?,
        (hound::SampleFormat::Float, 32) => reader
            .samples::<f32>()
            .map(|s| s.map(float_to_i16))
            .collect::<Result<Vec<_>, _>>()?,
        (format, bits) => {
            return Err(AudioError::UnsupportedFormat(format!(
                "{:?} with {} bits per sample",
                format, bits
            )));
        }
    };

    let mono = downmix(&raw, spec.channels);
    let samples = resample(&mono, spec.sample_rate, target_rate);
    Ok(AudioClip::new(samples, target_rate))
}

/// Write a clip as a 16-bit PCM mono WAV file.
pub fn write_wav<P: AsRef<Path>>(path: P, clip: &AudioClip) -> Result<(), AudioError> {
    let writer = hound::WavWriter::create(path.as_ref(), wav_spec(clip.sample_rate()))?;
    encode(writer, clip)
}

/// Write a clip as WAV into any seekable writer.
pub fn write_wav_to<W: Write + Seek>(writer: W, clip: &AudioClip) -> Result<(), AudioError> {
    let writer = hound::WavWriter::new(writer, wav_spec(clip.sample_rate()))?;
    encode(writer, clip)
}

fn wav_spec(sample_rate: u32) -> hound::WavSpec {
    hound::WavSpec {
        channels: 1,
        sample_rate,
        bits_per_sample: 16,
        sample_format: hound::SampleFormat::Int,
    }
}

fn encode<W: Write + Seek>(mut writer: hound::WavWriter<W>, clip: &AudioClip) -> Result<(), AudioError> {
    for &sample in clip.samples() {
        writer.write_sample(sample)?;
    }
    writer.finalize()?;
    Ok(())
}

fn float_to_i16(value: f32) -> i16 {
    (value.clamp(-1.0, 1.0) * i16::MAX as f32) as i16
}

/// Average interleaved channels down to mono.
fn downmix(samples: &[i16], channels: u16) -> Vec<i16> {
    if channels <= 1 {
        return samples.to_vec();
    }
    let channels = channels as usize;
    samples
        .chunks_exact(channels)
        .map(|frame| {
            let sum: i32 = frame.iter().map(|s| *s as i32).sum();
            (sum / channels as i32) as i16
        })
        .collect()
}

/// Simple linear interpolation resampling.
///
/// No low-pass filter is applied, so downsampling aliases any content above
/// the new Nyquist frequency.
pub fn resample(samples: &[i16], from_rate: u32, to_rate: u32) -> Vec<i16> {
    if from_rate == to_rate || samples.is_empty() || from_rate == 0 || to_rate == 0 {
        return samples.to_vec();
    }

    let ratio = from_rate as f64 / to_rate as f64;
    let output_len = (samples.len() as f64 / ratio).ceil() as usize;

    (0..output_len)
        .map(|i| {
            let source_pos = i as f64 * ratio;
            let source_idx = (source_pos.floor() as usize).min(samples.len() - 1);
            let fraction = source_pos - source_idx as f64;

            if source_idx + 1 >= samples.len() {
                samples[source_idx]
            } else {
                let left = samples[source_idx] as f64;
                let right = samples[source_idx + 1] as f64;
                (left + (right - left) * fraction) as i16
            }
        })
        .collect()
}
