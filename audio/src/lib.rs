//! Streaming sample rate conversion for PCM WAVE files.
//!
//! This crate provides:
//!
//! - `pcm`: stream properties, sample byte codec, rate arithmetic and byte I/O
//! - `codec::wav`: RIFF/WAVE header parsing and synthesis
//! - `resampler`: chunked resampling filters
//! - `controller`: drives a filter over a WAVE stream
//!
//! # Example
//!
//! ```rust
//! use wavresample_audio::codec::wav::synthesize_header;
//! use wavresample_audio::pcm::{AudioProperties, ReaderSource, WriterSink};
//! use wavresample_audio::resampler::LinearResampler;
//! use wavresample_audio::{ControllerOptions, WaveController};
//!
//! // One second of 16 kHz mono silence.
//! let mut props = AudioProperties::pcm(1, 16000, 16);
//! props.data_size = 32000;
//! let mut file = synthesize_header(&props).to_vec();
//! file.resize(44 + 32000, 0);
//!
//! let mut controller =
//!     WaveController::new(ReaderSource::from_bytes(file), ControllerOptions::default());
//! controller.open()?;
//!
//! let mut payload = WriterSink::new(Vec::new());
//! let output = controller.apply_filter(&mut LinearResampler::new(8000), &mut payload)?;
//! assert_eq!(output.data_size, 16000);
//!
//! let mut out = WriterSink::new(Vec::new());
//! controller.save(&mut payload.into_inner().as_slice(), &mut out)?;
//! assert_eq!(out.get_ref().len(), 44 + 16000);
//! # Ok::<(), wavresample_audio::AudioError>(())
//! ```

pub mod codec;
pub mod controller;
pub mod error;
pub mod pcm;
pub mod resampler;

pub use controller::{ControllerOptions, WaveController};
pub use error::{AudioError, ErrorKind, Result};
pub use pcm::AudioProperties;
