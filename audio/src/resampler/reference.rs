//! Reference resampler working on the least common multiple of the rates.
//!
//! Each chunk is stuffed with silent frames up to the common rate, the gaps
//! are filled by linear interpolation between the surrounding real frames,
//! and every n-th frame is kept for the output rate. Memory grows with the
//! common rate, so this is a comparison implementation, not a production
//! path. The output of a split stream may differ slightly from a single pass.

use tracing::trace;

use super::{AudioFilter, decode_frame, validate};
use crate::error::{AudioError, Result};
use crate::pcm::math::{interpolate_linear, lcm, round_half_up};
use crate::pcm::{AudioProperties, SampleWidth};

/// Deepest sample supported by the reference resampler.
const MAX_BITS: u16 = 16;

/// Largest stuffed chunk the reference resampler will allocate.
const MAX_STUFFED_BYTES: usize = 1 << 30;

/// Pad, interpolate and decimate resampler.
#[derive(Debug, Clone)]
pub struct ReferenceResampler {
    output_rate: u32,
    stream: Option<Stream>,
}

#[derive(Debug, Clone)]
struct Stream {
    input: AudioProperties,
    output: AudioProperties,
    last_frame: Option<Vec<u8>>,
    /// Frames of the next stuffed chunk to skip before decimating.
    decimation_offset: usize,
}

impl ReferenceResampler {
    /// Creates an unconfigured resampler producing `output_rate` Hz.
    pub fn new(output_rate: u32) -> Self {
        Self {
            output_rate,
            stream: None,
        }
    }

    /// Returns the output sample rate.
    pub fn output_rate(&self) -> u32 {
        self.output_rate
    }
}

impl AudioFilter for ReferenceResampler {
    fn configure(&mut self, output_sample_rate: u32) {
        self.output_rate = output_sample_rate;
        self.stream = None;
    }

    fn set_input_properties(&mut self, properties: AudioProperties) {
        self.stream = Some(Stream {
            input: properties,
            output: properties.with_sample_rate(self.output_rate),
            last_frame: None,
            decimation_offset: 0,
        });
    }

    fn process(&mut self, input: &[u8]) -> Result<Vec<u8>> {
        let output_rate = self.output_rate;
        let stream = self.stream.as_mut().ok_or_else(|| {
            AudioError::UnsupportedOperation("input properties not set".into())
        })?;
        let width = validate(&stream.input, output_rate, MAX_BITS)?;

        if output_rate == stream.input.sample_rate || input.is_empty() {
            stream.output.add_data(input.len())?;
            return Ok(input.to_vec());
        }

        let frame_size = stream.input.frame_byte_width();
        let whole = input.len() / frame_size * frame_size;
        if whole == 0 {
            return Ok(Vec::new());
        }
        let input = &input[..whole];

        let common = lcm(
            u64::from(stream.input.sample_rate),
            u64::from(output_rate),
        );
        let step = (common / u64::from(stream.input.sample_rate)) as usize;
        let decimation = (common / u64::from(output_rate)) as usize;

        let mut stuffed = stuff(input, frame_size, step, stream.last_frame.is_some())?;
        interpolate(
            &mut stuffed,
            &stream.input,
            width,
            step,
            stream.last_frame.as_deref(),
        );
        let out = decimate(&stuffed, frame_size, decimation, &mut stream.decimation_offset);

        stream.last_frame = Some(input[whole - frame_size..].to_vec());
        stream.output.add_data(out.len())?;
        trace!(input = input.len(), stuffed = stuffed.len(), output = out.len(), "reference chunk");
        Ok(out)
    }

    fn output_properties(&self) -> Option<AudioProperties> {
        self.stream.as_ref().map(|s| s.output)
    }
}

/// Spreads the input frames `step` frames apart, leaving silence between
/// them. With a carried frame the chunk also starts with a silent gap.
fn stuff(input: &[u8], frame_size: usize, step: usize, has_carry: bool) -> Result<Vec<u8>> {
    let frames = input.len() / frame_size;
    let padding = (step - 1) * frame_size;
    let stride = frame_size + padding;
    let lead = if has_carry { padding } else { 0 };

    let len = frames
        .checked_mul(stride)
        .filter(|&n| n <= MAX_STUFFED_BYTES)
        .ok_or_else(|| {
            AudioError::UnsupportedOperation(
                "rate ratio too fine for the reference resampler".into(),
            )
        })?
        + lead
        - padding;

    let mut stuffed = vec![0u8; len];
    for (k, frame) in input.chunks_exact(frame_size).enumerate() {
        let at = lead + k * stride;
        stuffed[at..at + frame_size].copy_from_slice(frame);
    }
    Ok(stuffed)
}

/// Fills each silent gap by interpolating between its neighbouring frames.
fn interpolate(
    stuffed: &mut [u8],
    props: &AudioProperties,
    width: SampleWidth,
    step: usize,
    carry: Option<&[u8]>,
) {
    let frame_size = props.frame_byte_width();
    let sample_size = width.bytes();
    let channels = usize::from(props.channel_count);
    let gap = step - 1;
    let stride = (frame_size * step) as i64;
    let len = stuffed.len() as i64;

    let mut left = vec![0i32; channels];
    let mut right = vec![0i32; channels];
    let mut encoded = Vec::with_capacity(4);

    let mut i: i64 = if carry.is_some() { -(frame_size as i64) } else { 0 };
    while i < len {
        let j = i + stride;
        if i < 0 {
            decode_frame(carry, width, props, &mut left);
        } else {
            let at = i as usize;
            decode_frame(Some(&stuffed[at..at + frame_size]), width, props, &mut left);
        }
        if j >= len {
            decode_frame(None, width, props, &mut right);
        } else {
            let at = j as usize;
            decode_frame(Some(&stuffed[at..at + frame_size]), width, props, &mut right);
        }

        for channel in 0..channels {
            for k in 0..gap {
                let index = i + (frame_size * (k + 1) + channel * sample_size) as i64;
                if index + sample_size as i64 > len {
                    continue;
                }
                let distance = (k + 1) as f64 / (gap + 1) as f64;
                let sample = interpolate_linear(left[channel], right[channel], distance);

                encoded.clear();
                width.write(sample, props.byte_order, &mut encoded);
                let at = index as usize;
                stuffed[at..at + sample_size].copy_from_slice(&encoded);
            }
        }
        i += stride;
    }
}

/// Keeps every `decimation`-th frame starting at `offset`, then pads with
/// silence to the expected output length.
fn decimate(stuffed: &[u8], frame_size: usize, decimation: usize, offset: &mut usize) -> Vec<u8> {
    let expected = round_half_up(stuffed.len() as f64 / decimation as f64) as usize;
    let expected = expected.div_ceil(frame_size) * frame_size;

    let mut out = Vec::with_capacity(expected);
    let hop = decimation * frame_size;
    let mut i = *offset * frame_size;
    while i < stuffed.len() {
        out.extend_from_slice(&stuffed[i..i + frame_size]);
        i += hop;
    }
    if !out.is_empty() {
        *offset = (i - stuffed.len()) / frame_size;
    }
    if out.len() < expected {
        out.resize(expected, 0);
    }
    out
}
