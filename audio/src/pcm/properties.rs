//! Audio stream descriptor.

use crate::error::{AudioError, Result};

/// Byte order of multi-byte numeric sample values.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ByteOrder {
    #[default]
    Little,
    Big,
}

/// Encoding of the audio payload.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum AudioFormat {
    /// Not yet determined.
    #[default]
    None,
    /// Uncompressed linear PCM.
    Pcm,
}

/// Shape of an audio stream.
///
/// `AudioProperties` is a plain `Copy` value: handing it to another
/// component always gives that component its own copy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct AudioProperties {
    /// Number of interleaved channels.
    pub channel_count: u16,
    /// Frames per second.
    pub sample_rate: u32,
    /// Bits per encoded sample.
    pub bits_per_sample: u16,
    /// Byte order of encoded samples.
    pub byte_order: ByteOrder,
    /// Size of the payload in bytes.
    pub data_size: u32,
    /// Payload encoding.
    pub format: AudioFormat,
}

impl AudioProperties {
    /// Creates little-endian PCM properties with an empty payload.
    pub fn pcm(channel_count: u16, sample_rate: u32, bits_per_sample: u16) -> Self {
        Self {
            channel_count,
            sample_rate,
            bits_per_sample,
            byte_order: ByteOrder::Little,
            data_size: 0,
            format: AudioFormat::Pcm,
        }
    }

    /// Returns the number of bytes per sample.
    pub fn sample_byte_width(&self) -> usize {
        usize::from(self.bits_per_sample / 8)
    }

    /// Returns the number of bytes per frame (one sample per channel).
    pub fn frame_byte_width(&self) -> usize {
        self.sample_byte_width() * usize::from(self.channel_count)
    }

    /// Returns the number of bytes in one second of audio.
    pub fn byte_rate(&self) -> u64 {
        u64::from(self.sample_rate) * self.frame_byte_width() as u64
    }

    /// Returns a copy with a different sample rate and an empty payload.
    pub fn with_sample_rate(&self, sample_rate: u32) -> Self {
        Self {
            sample_rate,
            data_size: 0,
            ..*self
        }
    }

    /// Grows `data_size` by `len` bytes.
    ///
    /// Fails when the payload would no longer fit the 32-bit RIFF size field.
    pub(crate) fn add_data(&mut self, len: usize) -> Result<()> {
        self.data_size = u32::try_from(len)
            .ok()
            .and_then(|len| self.data_size.checked_add(len))
            .ok_or_else(|| {
                AudioError::UnsupportedFormat("payload exceeds the 4 GiB RIFF limit".into())
            })?;
        Ok(())
    }
}
