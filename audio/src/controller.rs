//! Stream controller driving a filter over a WAVE file.
//!
//! A [`WaveController`] is built inert and parses its header in an explicit
//! [`open`](WaveController::open) step. [`apply_filter`](WaveController::apply_filter)
//! then feeds the payload through an [`AudioFilter`] in bounded chunks, and
//! [`save`](WaveController::save) writes the final file once the output size
//! is known.

use std::io::Read;

use tracing::{debug, info, warn};

use crate::codec::wav::{HeaderOptions, parse_header, synthesize_header};
use crate::error::{AudioError, Result};
use crate::pcm::{AudioFormat, AudioProperties, ByteSink, ByteSource};
use crate::resampler::AudioFilter;

/// Size of the buffer used when copying a staged payload.
const COPY_BUF_LEN: usize = 64 * 1024;

/// Options for a [`WaveController`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ControllerOptions {
    /// Seconds of input audio per chunk.
    pub chunk_seconds: u32,
    pub header: HeaderOptions,
}

impl Default for ControllerOptions {
    fn default() -> Self {
        Self {
            chunk_seconds: 1,
            header: HeaderOptions::default(),
        }
    }
}

/// Reads a WAVE stream, filters its payload and writes the result.
pub struct WaveController<S: ByteSource> {
    source: S,
    options: ControllerOptions,
    properties: Option<AudioProperties>,
}

impl<S: ByteSource> WaveController<S> {
    /// Creates a controller over `source`. Nothing is read until
    /// [`open`](Self::open).
    pub fn new(source: S, options: ControllerOptions) -> Self {
        Self {
            source,
            options,
            properties: None,
        }
    }

    /// Parses the WAVE header, leaving the source at the first payload byte.
    pub fn open(&mut self) -> Result<AudioProperties> {
        if self.properties.is_some() {
            return Err(AudioError::UnsupportedOperation(
                "controller already opened".into(),
            ));
        }
        let props = parse_header(&mut self.source, &self.options.header)?;
        self.properties = Some(props);
        Ok(props)
    }

    /// Returns the current stream properties: the parsed input before
    /// filtering, the filter output after.
    pub fn properties(&self) -> Option<AudioProperties> {
        self.properties
    }

    pub fn options(&self) -> &ControllerOptions {
        &self.options
    }

    /// Consumes the controller and returns the source.
    pub fn into_source(self) -> S {
        self.source
    }

    /// Runs the payload through `filter`, pushing every output chunk to `sink`.
    ///
    /// Chunks are read in stream order and followed by one empty call that
    /// flushes trailing frames. Returns the filter's output properties,
    /// which also become the controller's own.
    pub fn apply_filter(
        &mut self,
        filter: &mut dyn AudioFilter,
        sink: &mut dyn ByteSink,
    ) -> Result<AudioProperties> {
        let input = self.opened()?;
        if input.format != AudioFormat::Pcm {
            return Err(AudioError::UnsupportedOperation(
                "only PCM payloads can be filtered".into(),
            ));
        }
        filter.set_input_properties(input);

        let chunk_len = chunk_len(&input, self.options.chunk_seconds)?;
        let declared = u64::from(input.data_size);
        let available = self.source.bytes_remaining();
        let mut remaining = declared.min(available);
        if available < declared {
            warn!(
                declared,
                available, "data chunk is larger than the remaining input"
            );
        }

        let mut index = 0u64;
        while remaining > 0 {
            let want = chunk_len.min(remaining) as usize;
            let chunk = self.source.pop(want)?;
            if chunk.is_empty() {
                warn!(missing = remaining, "input ended before the declared payload");
                break;
            }
            remaining -= chunk.len() as u64;

            let out = filter.process(&chunk)?;
            sink.push(&out)?;
            debug!(index, input = chunk.len(), output = out.len(), "chunk processed");
            index += 1;
        }

        let tail = filter.process(&[])?;
        sink.push(&tail)?;

        let output = filter.output_properties().ok_or_else(|| {
            AudioError::UnsupportedOperation("filter lost its configuration".into())
        })?;
        info!(
            chunks = index,
            sample_rate = output.sample_rate,
            data_size = output.data_size,
            "filter complete"
        );
        self.properties = Some(output);
        Ok(output)
    }

    /// Writes a complete WAVE file: the header for the current properties,
    /// `payload`, and a pad byte when the payload length is odd.
    ///
    /// `payload` must yield exactly `data_size` bytes.
    pub fn save(&self, payload: &mut dyn Read, out: &mut dyn ByteSink) -> Result<()> {
        let props = self.opened()?;
        out.push(&synthesize_header(&props))?;

        let expected = u64::from(props.data_size);
        let mut copied = 0u64;
        let mut buf = vec![0u8; COPY_BUF_LEN];
        loop {
            let n = match payload.read(&mut buf) {
                Ok(0) => break,
                Ok(n) => n,
                Err(e) if e.kind() == std::io::ErrorKind::Interrupted => continue,
                Err(e) => return Err(e.into()),
            };
            out.push(&buf[..n])?;
            copied += n as u64;
        }
        if copied != expected {
            return Err(AudioError::Io(std::io::Error::new(
                std::io::ErrorKind::UnexpectedEof,
                format!("payload holds {copied} bytes, header declares {expected}"),
            )));
        }

        if expected % 2 == 1 {
            out.push(&[0])?;
        }
        debug!(bytes = out.bytes_written(), "file written");
        Ok(())
    }

    fn opened(&self) -> Result<AudioProperties> {
        self.properties
            .ok_or_else(|| AudioError::UnsupportedOperation("controller not opened".into()))
    }
}

/// Bytes per chunk: whole frames covering `seconds` of input.
fn chunk_len(props: &AudioProperties, seconds: u32) -> Result<u64> {
    let len = props.byte_rate() * u64::from(seconds.max(1));
    if len == 0 {
        return Err(AudioError::UnsupportedOperation(
            "input has an empty frame".into(),
        ));
    }
    Ok(len)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pcm::{ReaderSource, WriterSink};
    use crate::resampler::LinearResampler;

    fn wave(props: AudioProperties, payload: &[u8]) -> Vec<u8> {
        let mut props = props;
        props.data_size = payload.len() as u32;
        let mut data = synthesize_header(&props).to_vec();
        data.extend_from_slice(payload);
        data
    }

    fn mono16(samples: &[i16]) -> Vec<u8> {
        samples.iter().flat_map(|s| s.to_le_bytes()).collect()
    }

    #[test]
    fn test_requires_open() {
        let source = ReaderSource::from_bytes(Vec::new());
        let mut controller = WaveController::new(source, ControllerOptions::default());
        let mut filter = LinearResampler::new(8000);
        let mut sink = WriterSink::new(Vec::new());

        assert!(controller.properties().is_none());
        assert!(matches!(
            controller.apply_filter(&mut filter, &mut sink),
            Err(AudioError::UnsupportedOperation(_))
        ));
        assert!(controller.save(&mut &[0u8; 0][..], &mut sink).is_err());
    }

    #[test]
    fn test_open_twice_fails() {
        let data = wave(AudioProperties::pcm(1, 8000, 16), &[0, 0]);
        let mut controller =
            WaveController::new(ReaderSource::from_bytes(data), ControllerOptions::default());
        assert_eq!(controller.open().unwrap().data_size, 2);
        assert!(controller.open().is_err());
    }

    #[test]
    fn test_open_reports_header_errors() {
        let source = ReaderSource::from_bytes(b"RIFX\0\0\0\0WAVE".to_vec());
        let mut controller = WaveController::new(source, ControllerOptions::default());
        let err = controller.open().unwrap_err();
        assert_eq!(err.kind(), crate::error::ErrorKind::UnsupportedFormat);
    }

    #[test]
    fn test_apply_filter_downsamples() {
        let payload = mono16(&[10, 20, 30, 40, 50, 60, 70, 80]);
        let data = wave(AudioProperties::pcm(1, 8000, 16), &payload);
        let mut controller =
            WaveController::new(ReaderSource::from_bytes(data), ControllerOptions::default());
        controller.open().unwrap();

        let mut filter = LinearResampler::new(4000);
        let mut sink = WriterSink::new(Vec::new());
        let out = controller.apply_filter(&mut filter, &mut sink).unwrap();

        assert_eq!(out.sample_rate, 4000);
        assert_eq!(out.data_size as u64, sink.bytes_written());
        assert_eq!(controller.properties(), Some(out));
        assert_eq!(sink.get_ref().len(), 8);
    }

    #[test]
    fn test_apply_filter_clamps_to_available_bytes() {
        let mut data = wave(AudioProperties::pcm(1, 8000, 16), &mono16(&[1, 2, 3, 4]));
        // Declare twice the payload actually present.
        data[40..44].copy_from_slice(&16u32.to_le_bytes());
        let mut controller =
            WaveController::new(ReaderSource::from_bytes(data), ControllerOptions::default());
        controller.open().unwrap();

        let mut filter = LinearResampler::new(8000);
        let mut sink = WriterSink::new(Vec::new());
        let out = controller.apply_filter(&mut filter, &mut sink).unwrap();
        assert_eq!(out.data_size, 8);
        assert_eq!(sink.into_inner(), mono16(&[1, 2, 3, 4]));
    }

    #[test]
    fn test_apply_filter_rejects_deep_samples() {
        let data = wave(AudioProperties::pcm(1, 8000, 32), &[0; 8]);
        let mut controller =
            WaveController::new(ReaderSource::from_bytes(data), ControllerOptions::default());
        controller.open().unwrap();

        let mut filter = LinearResampler::new(4000);
        let mut sink = WriterSink::new(Vec::new());
        let err = controller.apply_filter(&mut filter, &mut sink).unwrap_err();
        assert_eq!(err.kind(), crate::error::ErrorKind::UnsupportedFormat);
    }

    #[test]
    fn test_save_pads_odd_payload() {
        let data = wave(AudioProperties::pcm(1, 8000, 8), &[1, 2, 3]);
        let mut controller =
            WaveController::new(ReaderSource::from_bytes(data.clone()), ControllerOptions::default());
        controller.open().unwrap();

        let mut sink = WriterSink::new(Vec::new());
        controller.save(&mut &[1u8, 2, 3][..], &mut sink).unwrap();

        let written = sink.into_inner();
        assert_eq!(written.len(), 44 + 3 + 1);
        assert_eq!(&written[..47], &data[..]);
        assert_eq!(written[47], 0);
    }

    #[test]
    fn test_save_rejects_short_payload() {
        let data = wave(AudioProperties::pcm(1, 8000, 16), &[0; 4]);
        let mut controller =
            WaveController::new(ReaderSource::from_bytes(data), ControllerOptions::default());
        controller.open().unwrap();

        let mut sink = WriterSink::new(Vec::new());
        let err = controller.save(&mut &[0u8; 2][..], &mut sink).unwrap_err();
        assert_eq!(err.kind(), crate::error::ErrorKind::Io);
    }

    #[test]
    fn test_chunk_len() {
        let props = AudioProperties::pcm(2, 44100, 16);
        assert_eq!(chunk_len(&props, 1).unwrap(), 176_400);
        assert_eq!(chunk_len(&props, 3).unwrap(), 529_200);
        assert_eq!(chunk_len(&props, 0).unwrap(), 176_400);
    }
}
