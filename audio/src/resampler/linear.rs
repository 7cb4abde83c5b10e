//! Streaming linear-interpolation resampler.
//!
//! Output frame `n` of a chunk sits at input position
//! `segment_offset + n * decimation_rate`, measured in input frames from the
//! start of the chunk. Its samples are interpolated between the frames on
//! either side of that position. After each chunk the offset is moved back by
//! the chunk's length, so the next chunk continues on the same output grid;
//! a position left of the chunk borrows the previous chunk's last frame.
//! Every position, rate and weight is rounded to [`DECIMAL_PLACES`], which
//! makes the result independent of how the input is split into chunks.

use tracing::trace;

use super::{AudioFilter, decode_frame, validate};
use crate::error::{AudioError, Result};
use crate::pcm::math::{DECIMAL_PLACES, interpolate_linear, round_half_up, round_to};
use crate::pcm::{AudioProperties, SampleWidth};

/// Deepest sample supported by the linear resampler.
const MAX_BITS: u16 = 24;

/// Linear resampler with constant memory per chunk.
#[derive(Debug, Clone)]
pub struct LinearResampler {
    output_rate: u32,
    stream: Option<Stream>,
}

/// Per-stream state, created by `set_input_properties`.
#[derive(Debug, Clone)]
struct Stream {
    input: AudioProperties,
    output: AudioProperties,
    carry: Carry,
}

/// State carried from one chunk to the next.
#[derive(Debug, Clone)]
struct Carry {
    /// Last input frame of the previous chunk.
    last_frame: Option<Vec<u8>>,
    /// Position of the next output frame relative to the next chunk's start.
    segment_offset: f64,
    /// Input frames per output frame.
    decimation_rate: f64,
}

impl Carry {
    fn new(input_rate: u32, output_rate: u32) -> Self {
        let decimation_rate = round_to(
            f64::from(input_rate) / f64::from(output_rate),
            DECIMAL_PLACES,
        );
        // Centre the first window. Upsampling starts left of the first frame.
        let mut segment_offset = round_to(decimation_rate / 2.0, DECIMAL_PLACES);
        if output_rate > input_rate {
            segment_offset = -segment_offset;
        }
        Self {
            last_frame: None,
            segment_offset,
            decimation_rate,
        }
    }
}

impl LinearResampler {
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

impl AudioFilter for LinearResampler {
    fn configure(&mut self, output_sample_rate: u32) {
        self.output_rate = output_sample_rate;
        self.stream = None;
    }

    fn set_input_properties(&mut self, properties: AudioProperties) {
        self.stream = Some(Stream {
            input: properties,
            output: properties.with_sample_rate(self.output_rate),
            carry: Carry::new(properties.sample_rate, self.output_rate),
        });
    }

    fn process(&mut self, input: &[u8]) -> Result<Vec<u8>> {
        let output_rate = self.output_rate;
        let Stream {
            input: props,
            output,
            carry,
        } = self.stream.as_mut().ok_or_else(|| {
            AudioError::UnsupportedOperation("input properties not set".into())
        })?;

        let width = validate(props, output_rate, MAX_BITS)?;

        if output_rate == props.sample_rate {
            output.add_data(input.len())?;
            return Ok(input.to_vec());
        }
        if carry.decimation_rate <= 0.0 {
            return Err(AudioError::UnsupportedOperation(format!(
                "{} Hz to {output_rate} Hz is below the rate precision",
                props.sample_rate
            )));
        }

        let out = resample_chunk(input, props, width, carry);
        output.add_data(out.len())?;
        trace!(input = input.len(), output = out.len(), "linear chunk");
        Ok(out)
    }

    fn output_properties(&self) -> Option<AudioProperties> {
        self.stream.as_ref().map(|s| s.output)
    }
}

fn resample_chunk(
    input: &[u8],
    props: &AudioProperties,
    width: SampleWidth,
    carry: &mut Carry,
) -> Vec<u8> {
    let frame_size = props.frame_byte_width();
    let channels = usize::from(props.channel_count);
    let len = input.len() as i64;
    let rate = carry.decimation_rate;

    let estimate = (input.len() as f64 / rate) as usize + frame_size;
    let mut out = Vec::with_capacity(estimate);
    let mut left = vec![0i32; channels];
    let mut right = vec![0i32; channels];
    let mut frame_count: usize = 0;

    loop {
        let pointer = round_to(
            carry.segment_offset + frame_count as f64 * rate,
            DECIMAL_PLACES,
        );
        let pointer_decimal = round_to(pointer % 1.0, DECIMAL_PLACES);
        // Negative positions (upsampling) are normalized into 0..1.
        let weight = round_to((pointer_decimal + 1.0) % 1.0, DECIMAL_PLACES);
        let left_frame = round_half_up(pointer - weight) as i64;
        let right_frame = left_frame + 1;

        let last_needed = if pointer_decimal > 0.0 {
            right_frame
        } else {
            left_frame
        };
        if len < (last_needed + 1) * frame_size as i64 {
            break;
        }
        // The flush call only emits frames still waiting on the carried frame.
        if input.is_empty() && round_half_up(pointer_decimal) >= 0.0 {
            break;
        }

        let left_bytes = if left_frame < 0 {
            carry.last_frame.as_deref()
        } else {
            frame_at(input, left_frame, frame_size)
        };
        let right_bytes = if weight > 0.0 {
            frame_at(input, right_frame, frame_size)
        } else {
            None
        };
        decode_frame(left_bytes, width, props, &mut left);
        decode_frame(right_bytes, width, props, &mut right);

        for (l, r) in left.iter().zip(&right) {
            let sample = interpolate_linear(*l, *r, weight);
            width.write(sample, props.byte_order, &mut out);
        }
        frame_count += 1;
    }

    if input.len() >= frame_size {
        carry.last_frame = Some(input[input.len() - frame_size..].to_vec());
        let consumed = input.len() as f64 / (rate * frame_size as f64);
        carry.segment_offset -= round_to((consumed - frame_count as f64) * rate, DECIMAL_PLACES);
    }

    out
}

fn frame_at(input: &[u8], index: i64, frame_size: usize) -> Option<&[u8]> {
    let start = usize::try_from(index).ok()? * frame_size;
    input.get(start..start + frame_size)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pcm::ByteOrder;

    fn mono16(samples: &[i16]) -> Vec<u8> {
        samples.iter().flat_map(|s| s.to_le_bytes()).collect()
    }

    fn samples16(bytes: &[u8]) -> Vec<i16> {
        bytes
            .chunks_exact(2)
            .map(|b| i16::from_le_bytes([b[0], b[1]]))
            .collect()
    }

    fn run(filter: &mut LinearResampler, chunks: &[&[u8]]) -> Vec<u8> {
        let mut out = Vec::new();
        for chunk in chunks {
            out.extend(filter.process(chunk).unwrap());
        }
        out.extend(filter.process(&[]).unwrap());
        out
    }

    /// Deterministic pseudo-random 16-bit stereo frames.
    fn noise(frames: usize) -> Vec<u8> {
        let mut x: u32 = 0x1234_5678;
        let mut out = Vec::with_capacity(frames * 4);
        for _ in 0..frames * 2 {
            x ^= x << 13;
            x ^= x >> 17;
            x ^= x << 5;
            out.extend_from_slice(&(x as i16).to_le_bytes());
        }
        out
    }

    #[test]
    fn test_unconfigured_process_fails() {
        let mut filter = LinearResampler::new(8000);
        assert!(matches!(
            filter.process(&[0, 0]),
            Err(AudioError::UnsupportedOperation(_))
        ));
        assert!(filter.output_properties().is_none());
    }

    #[test]
    fn test_identity_rate() {
        let mut filter = LinearResampler::new(44100);
        filter.set_input_properties(AudioProperties::pcm(2, 44100, 16));
        let input = noise(100);

        assert_eq!(filter.process(&input).unwrap(), input);
        assert_eq!(filter.process(&input[..40]).unwrap(), &input[..40]);
        assert!(filter.process(&[]).unwrap().is_empty());
        assert_eq!(filter.output_properties().unwrap().data_size, 440);
    }

    #[test]
    fn test_rejects_deep_samples() {
        let mut filter = LinearResampler::new(8000);
        filter.set_input_properties(AudioProperties::pcm(1, 44100, 32));
        assert!(matches!(
            filter.process(&[0; 8]),
            Err(AudioError::UnsupportedOperation(_))
        ));
    }

    #[test]
    fn test_downsample_by_two() {
        let mut filter = LinearResampler::new(4000);
        filter.set_input_properties(AudioProperties::pcm(1, 8000, 16));
        let out = run(&mut filter, &[&mono16(&[0, 10, 20, 30, 40, 50, 60, 70])]);
        // Rate 2, offset 1: every odd input frame, no interpolation.
        assert_eq!(samples16(&out), vec![10, 30, 50, 70]);
    }

    #[test]
    fn test_upsample_by_two() {
        let mut filter = LinearResampler::new(8000);
        filter.set_input_properties(AudioProperties::pcm(1, 4000, 16));
        let out = run(&mut filter, &[&mono16(&[100, 200, 300, 400])]);
        // Rate 0.5, offset -0.25: first frame leans on a silent carry frame,
        // the flush leans on a silent right frame.
        assert_eq!(
            samples16(&out),
            vec![75, 125, 175, 225, 275, 325, 375, 300]
        );
        assert_eq!(filter.output_properties().unwrap().data_size, 16);
    }

    #[test]
    fn test_chunking_invariance() {
        let input = noise(997);
        for (in_rate, out_rate) in [(44100, 8000), (44100, 96000), (8000, 44100), (48000, 44100)] {
            let props = AudioProperties::pcm(2, in_rate, 16);

            let mut single = LinearResampler::new(out_rate);
            single.set_input_properties(props);
            let expected = run(&mut single, &[&input]);

            for cuts in [vec![4, 8], vec![400, 404, 2000], vec![1200, 2400, 3600]] {
                let mut chunks: Vec<&[u8]> = Vec::new();
                let mut prev = 0;
                for cut in cuts.into_iter().chain([input.len()]) {
                    chunks.push(&input[prev..cut]);
                    prev = cut;
                }
                let mut split = LinearResampler::new(out_rate);
                split.set_input_properties(props);
                assert_eq!(run(&mut split, &chunks), expected, "{in_rate} -> {out_rate}");
            }
        }
    }

    #[test]
    fn test_output_size_direction() {
        let input = noise(4410);
        let props = AudioProperties::pcm(2, 44100, 16);

        let mut down = LinearResampler::new(8000);
        down.set_input_properties(props);
        let frames = run(&mut down, &[&input]).len() / 4;
        assert!(frames < 4410);
        assert!((frames as i64 - 800).abs() <= 1);

        let mut up = LinearResampler::new(96000);
        up.set_input_properties(props);
        let frames = run(&mut up, &[&input]).len() / 4;
        assert!(frames > 4410);
        assert!((frames as i64 - 9600).abs() <= 1);
    }

    #[test]
    fn test_zero_weight_ignores_right_frame() {
        // 2:1 downsampling lands exactly on frames 1, 3, 5, 7 (weight 0).
        let props = AudioProperties::pcm(1, 8000, 16);
        let input = mono16(&[1, 2, 3, 4, 5, 6, 7, 8, 9]);
        let mut corrupted = input.clone();
        for frame in [2, 4, 6, 8] {
            corrupted[frame * 2] = 0xaa;
            corrupted[frame * 2 + 1] = 0x55;
        }

        let mut a = LinearResampler::new(4000);
        a.set_input_properties(props);
        let mut b = LinearResampler::new(4000);
        b.set_input_properties(props);

        let expected = run(&mut a, &[&input]);
        assert_eq!(samples16(&expected), vec![2, 4, 6, 8]);
        assert_eq!(run(&mut b, &[&corrupted]), expected);
    }

    #[test]
    fn test_set_input_properties_resets_state() {
        let props = AudioProperties::pcm(1, 4000, 16);
        let input = mono16(&[100, 200, 300, 400]);

        let mut filter = LinearResampler::new(8000);
        filter.set_input_properties(props);
        let first = run(&mut filter, &[&input]);

        filter.set_input_properties(props);
        assert_eq!(filter.output_properties().unwrap().data_size, 0);
        assert_eq!(run(&mut filter, &[&input]), first);
    }

    #[test]
    fn test_configure_requires_new_input() {
        let mut filter = LinearResampler::new(8000);
        filter.set_input_properties(AudioProperties::pcm(1, 4000, 16));
        filter.configure(2000);
        assert_eq!(filter.output_rate(), 2000);
        assert!(filter.process(&[0, 0]).is_err());

        filter.set_input_properties(AudioProperties::pcm(1, 4000, 16));
        let out = run(&mut filter, &[&mono16(&[10, 20, 30, 40])]);
        assert_eq!(samples16(&out), vec![20, 40]);
        assert_eq!(filter.output_properties().unwrap().sample_rate, 2000);
    }

    #[test]
    fn test_eight_bit_unsigned() {
        let mut filter = LinearResampler::new(8000);
        filter.set_input_properties(AudioProperties::pcm(1, 4000, 8));
        let out = run(&mut filter, &[&[0x80, 0xc0, 0xff, 0x00]]);
        // Samples interpolate as unsigned 128, 192, 255, 0.
        assert_eq!(out, vec![96, 144, 176, 208, 239, 191, 64, 0]);
    }

    #[test]
    fn test_twenty_four_bit_big_endian() {
        let mut props = AudioProperties::pcm(1, 8000, 24);
        props.byte_order = ByteOrder::Big;
        let mut filter = LinearResampler::new(4000);
        filter.set_input_properties(props);

        let input = [
            0x00, 0x00, 0x01, // 1
            0xff, 0xff, 0xfe, // -2
            0x00, 0x00, 0x03, // 3
            0x80, 0x00, 0x00, // -8388608
        ];
        let out = run(&mut filter, &[&input]);
        assert_eq!(out, vec![0xff, 0xff, 0xfe, 0x80, 0x00, 0x00]);
    }

    #[test]
    fn test_concrete_scenario_frame_counts() {
        // 5,147,260 bytes of 2-channel 16-bit audio, split in one-second
        // chunks of 176,400 bytes.
        let total = 5_147_260usize;
        let chunk = 176_400usize;
        let silence = vec![0u8; chunk];
        let props = AudioProperties::pcm(2, 44100, 16);

        for (rate, expected) in [(8000, 933_744u32), (96000, 11_204_920u32)] {
            let mut filter = LinearResampler::new(rate);
            filter.set_input_properties(props);
            let mut remaining = total;
            while remaining > 0 {
                let n = remaining.min(chunk);
                filter.process(&silence[..n]).unwrap();
                remaining -= n;
            }
            filter.process(&[]).unwrap();
            assert_eq!(filter.output_properties().unwrap().data_size, expected);
        }
    }
}
