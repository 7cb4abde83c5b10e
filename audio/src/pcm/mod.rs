//! PCM (Pulse Code Modulation) sample handling.
//!
//! # Key Types
//!
//! - [`AudioProperties`]: shape of a stream (channels, rate, depth, size)
//! - [`SampleWidth`]: encodes and decodes 1 to 4 byte samples
//! - [`ByteSource`] / [`ByteSink`]: sequential byte I/O used by the codecs
//!
//! # Example
//!
//! ```rust
//! use wavresample_audio::pcm::{AudioProperties, ByteOrder, SampleWidth};
//!
//! let props = AudioProperties::pcm(2, 44100, 16);
//! assert_eq!(props.frame_byte_width(), 4);
//!
//! let width = SampleWidth::from_bits(props.bits_per_sample).unwrap();
//! let mut buf = Vec::new();
//! width.write(-2, ByteOrder::Little, &mut buf);
//! assert_eq!(width.read(&buf, ByteOrder::Little), -2);
//! ```

pub mod bytes;
pub mod io;
pub mod math;
mod properties;

pub use bytes::SampleWidth;
pub use io::{ByteSink, ByteSource, ReaderSource, WriterSink};
pub use properties::{AudioFormat, AudioProperties, ByteOrder};
