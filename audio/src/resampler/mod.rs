//! Sample rate conversion filters.
//!
//! Two independent implementations of [`AudioFilter`] are provided:
//!
//! - [`LinearResampler`]: streaming linear interpolation whose output does
//!   not depend on how the input is split into chunks.
//! - [`ReferenceResampler`]: pads, interpolates and decimates on the
//!   least common multiple of the two rates. Slow, 8/16-bit only.
//!
//! # Example
//!
//! ```rust
//! use wavresample_audio::pcm::AudioProperties;
//! use wavresample_audio::resampler::{AudioFilter, LinearResampler};
//!
//! let mut filter = LinearResampler::new(8000);
//! filter.set_input_properties(AudioProperties::pcm(1, 16000, 16));
//!
//! let input = vec![0u8; 16000 * 2];
//! let mut output = filter.process(&input)?;
//! output.extend(filter.process(&[])?);
//!
//! assert_eq!(output.len(), 8000 * 2);
//! assert_eq!(filter.output_properties().unwrap().data_size, 16000);
//! # Ok::<(), wavresample_audio::AudioError>(())
//! ```

mod linear;
mod reference;

pub use linear::LinearResampler;
pub use reference::ReferenceResampler;

use crate::error::{AudioError, Result};
use crate::pcm::{AudioFormat, AudioProperties, SampleWidth};

/// A stateful filter applied to a PCM payload chunk by chunk.
///
/// Chunks must be passed to [`process`](AudioFilter::process) in stream
/// order, followed by exactly one call with an empty chunk to flush any
/// trailing output.
pub trait AudioFilter {
    /// Sets the output sample rate. The filter returns to the unconfigured
    /// state until [`set_input_properties`](AudioFilter::set_input_properties)
    /// is called again.
    fn configure(&mut self, output_sample_rate: u32);

    /// Starts a fresh stream with the given input shape, clearing all state
    /// carried from previous chunks.
    fn set_input_properties(&mut self, properties: AudioProperties);

    /// Filters one chunk of payload bytes.
    fn process(&mut self, input: &[u8]) -> Result<Vec<u8>>;

    /// Returns the output shape, with `data_size` equal to the bytes produced
    /// so far. `None` before the filter is configured.
    fn output_properties(&self) -> Option<AudioProperties>;
}

/// Checks the input shape against a filter's limits and returns the sample
/// width to decode with.
fn validate(input: &AudioProperties, output_rate: u32, max_bits: u16) -> Result<SampleWidth> {
    if output_rate == 0 {
        return Err(AudioError::UnsupportedOperation(
            "output sample rate must be positive".into(),
        ));
    }
    if input.format != AudioFormat::Pcm {
        return Err(AudioError::UnsupportedOperation(
            "input is not PCM".into(),
        ));
    }
    if input.bits_per_sample > max_bits {
        return Err(AudioError::UnsupportedOperation(format!(
            "{}-bit samples exceed the {max_bits}-bit limit",
            input.bits_per_sample
        )));
    }
    if input.sample_rate == 0 || input.channel_count == 0 {
        return Err(AudioError::UnsupportedOperation(
            "input has no channels or a zero sample rate".into(),
        ));
    }
    SampleWidth::from_bits(input.bits_per_sample).ok_or_else(|| {
        AudioError::UnsupportedOperation(format!(
            "{}-bit samples are not byte aligned",
            input.bits_per_sample
        ))
    })
}

/// Decodes one frame into `samples`, one value per channel.
///
/// 8-bit WAVE samples are unsigned and decode to 0..=255; wider samples are
/// signed. A missing frame decodes to zeros.
fn decode_frame(
    frame: Option<&[u8]>,
    width: SampleWidth,
    props: &AudioProperties,
    samples: &mut [i32],
) {
    let Some(frame) = frame else {
        samples.fill(0);
        return;
    };
    let n = width.bytes();
    for (channel, sample) in samples.iter_mut().enumerate() {
        let src = &frame[channel * n..];
        *sample = match width {
            SampleWidth::One => i32::from(src[0]),
            _ => width.read(src, props.byte_order),
        };
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_limits() {
        let props = AudioProperties::pcm(2, 44100, 16);
        assert_eq!(validate(&props, 8000, 24).unwrap(), SampleWidth::Two);
        assert!(validate(&props, 0, 24).is_err());

        let deep = AudioProperties::pcm(2, 44100, 32);
        assert!(matches!(
            validate(&deep, 8000, 24),
            Err(AudioError::UnsupportedOperation(_))
        ));

        let mut none = props;
        none.format = AudioFormat::None;
        assert!(validate(&none, 8000, 24).is_err());

        let odd = AudioProperties::pcm(1, 8000, 12);
        assert!(validate(&odd, 16000, 24).is_err());

        let silent = AudioProperties::pcm(0, 8000, 16);
        assert!(validate(&silent, 16000, 24).is_err());
    }

    #[test]
    fn test_decode_frame() {
        let props = AudioProperties::pcm(2, 8000, 8);
        let mut samples = [0i32; 2];
        decode_frame(Some(&[0x80, 0xff]), SampleWidth::One, &props, &mut samples);
        assert_eq!(samples, [128, 255]);

        let props = AudioProperties::pcm(2, 8000, 16);
        decode_frame(Some(&[0xff, 0xff, 0x10, 0x00]), SampleWidth::Two, &props, &mut samples);
        assert_eq!(samples, [-1, 16]);

        decode_frame(None, SampleWidth::Two, &props, &mut samples);
        assert_eq!(samples, [0, 0]);
    }
}
