//! PCM decoding for synthesized speech
//!
//! Speech responses carry raw little-endian signed 16-bit PCM. Decoding
//! normalizes each sample by 32768 into `[-1.0, 1.0)`, de-interleaving into
//! one buffer per channel.

use crate::{Error, Result};
use std::path::Path;

pub const SPEECH_SAMPLE_RATE: u32 = 24_000;
pub const SPEECH_CHANNELS: u16 = 1;

#[derive(Debug, Clone, PartialEq)]
pub struct AudioBuffer {
    pub sample_rate: u32,
    /// One sample vector per channel, all of equal length.
    pub channels: Vec<Vec<f32>>,
}

impl AudioBuffer {
    pub fn channel_count(&self) -> usize {
        self.channels.len()
    }

    /// Samples per channel.
    pub fn frame_count(&self) -> usize {
        self.channels.first().map(Vec::len).unwrap_or(0)
    }

    pub fn duration_secs(&self) -> f64 {
        if self.sample_rate == 0 {
            return 0.0;
        }
        self.frame_count() as f64 / self.sample_rate as f64
    }
}

pub fn decode_pcm16(bytes: &[u8], sample_rate: u32, channels: u16) -> Result<AudioBuffer> {
    if channels == 0 {
        return Err(Error::Audio("channel count must be at least 1".to_string()));
    }
    let frame_bytes = 2 * channels as usize;
    if bytes.len() % frame_bytes != 0 {
        return Err(Error::Audio(format!(
            "{} bytes is not a whole number of {}-channel 16-bit frames",
            bytes.len(),
            channels
        )));
    }

    let frame_count = bytes.len() / frame_bytes;
    let mut out = vec![Vec::with_capacity(frame_count); channels as usize];

    for frame in bytes.chunks_exact(frame_bytes) {
        for (channel, sample) in frame.chunks_exact(2).enumerate() {
            let value = i16::from_le_bytes([sample[0], sample[1]]);
            out[channel].push(value as f32 / 32768.0);
        }
    }

    Ok(AudioBuffer {
        sample_rate,
        channels: out,
    })
}

/// Decode a base64 speech payload using the speech model's fixed format.
pub fn decode_base64_pcm(data: &str) -> Result<AudioBuffer> {
    use base64::Engine as _;
    let bytes = base64::engine::general_purpose::STANDARD.decode(data.trim())?;
    decode_pcm16(&bytes, SPEECH_SAMPLE_RATE, SPEECH_CHANNELS)
}

/// Write the buffer as an interleaved 16-bit WAV file.
pub fn write_wav(buffer: &AudioBuffer, path: &Path) -> Result<()> {
    let spec = hound::WavSpec {
        channels: buffer.channel_count() as u16,
        sample_rate: buffer.sample_rate,
        bits_per_sample: 16,
        sample_format: hound::SampleFormat::Int,
    };
    let mut writer = hound::WavWriter::create(path, spec)
        .map_err(|e| Error::Audio(format!("failed to create wav writer: {e}")))?;

    for frame in 0..buffer.frame_count() {
        for channel in &buffer.channels {
            let v = (channel[frame] * 32768.0)
                .round()
                .clamp(i16::MIN as f32, i16::MAX as f32) as i16;
            writer
                .write_sample(v)
                .map_err(|e| Error::Audio(format!("failed to write wav sample: {e}")))?;
        }
    }
    writer
        .finalize()
        .map_err(|e| Error::Audio(format!("failed to finalize wav: {e}")))?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_decode_known_samples() {
        // 0, i16::MAX, i16::MIN, -1
        let bytes = [0x00, 0x00, 0xFF, 0x7F, 0x00, 0x80, 0xFF, 0xFF];
        let buffer = decode_pcm16(&bytes, 24_000, 1).unwrap();

        assert_eq!(buffer.frame_count(), 4);
        let samples = &buffer.channels[0];
        assert_eq!(samples[0], 0.0);
        assert_eq!(samples[1], 32767.0 / 32768.0);
        assert_eq!(samples[2], -1.0);
        assert_eq!(samples[3], -1.0 / 32768.0);
    }

    #[test]
    fn test_sample_count_and_range_for_every_length() {
        for channels in 1u16..=2 {
            for frames in 0usize..64 {
                let bytes: Vec<u8> = (0..frames * 2 * channels as usize)
                    .map(|i| (i * 37 % 256) as u8)
                    .collect();
                let buffer = decode_pcm16(&bytes, 24_000, channels).unwrap();

                assert_eq!(buffer.channel_count(), channels as usize);
                assert_eq!(buffer.frame_count(), bytes.len() / (2 * channels as usize));
                assert!(buffer
                    .channels
                    .iter()
                    .flatten()
                    .all(|s| (-1.0..=1.0).contains(s)));
            }
        }
    }

    #[test]
    fn test_stereo_deinterleaves() {
        // L=1, R=-1, L=2, R=-2
        let bytes = [0x01, 0x00, 0xFF, 0xFF, 0x02, 0x00, 0xFE, 0xFF];
        let buffer = decode_pcm16(&bytes, 48_000, 2).unwrap();
        assert_eq!(buffer.channels[0], vec![1.0 / 32768.0, 2.0 / 32768.0]);
        assert_eq!(buffer.channels[1], vec![-1.0 / 32768.0, -2.0 / 32768.0]);
    }

    #[test]
    fn test_odd_length_rejected() {
        let err = decode_pcm16(&[0x00, 0x01, 0x02], 24_000, 1).unwrap_err();
        assert!(matches!(err, Error::Audio(_)));

        let err = decode_pcm16(&[0x00, 0x01], 24_000, 2).unwrap_err();
        assert!(matches!(err, Error::Audio(_)));
    }

    #[test]
    fn test_decode_base64_uses_speech_format() {
        let buffer = decode_base64_pcm("AAD/fw==").unwrap();
        assert_eq!(buffer.sample_rate, SPEECH_SAMPLE_RATE);
        assert_eq!(buffer.channel_count(), 1);
        assert_eq!(buffer.frame_count(), 2);
    }

    #[test]
    fn test_decode_base64_rejects_garbage() {
        assert!(matches!(
            decode_base64_pcm("!!not base64!!"),
            Err(Error::Base64(_))
        ));
    }

    #[test]
    fn test_write_wav_round_trips_header() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("narration.wav");
        let buffer = decode_base64_pcm("AAD/fw==").unwrap();

        write_wav(&buffer, &path).unwrap();

        let reader = hound::WavReader::open(&path).unwrap();
        assert_eq!(reader.spec().sample_rate, 24_000);
        assert_eq!(reader.spec().channels, 1);
        assert_eq!(reader.len(), 2);
    }
}
