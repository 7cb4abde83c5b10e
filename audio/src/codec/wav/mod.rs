//! RIFF/WAVE container codec.
//!
//! Only the canonical integer PCM layout is supported. Parsing walks the
//! subchunks generically, so extra chunks such as `fact` or `LIST` between
//! `fmt ` and `data` are skipped. Output headers are always the fixed
//! 44-byte layout produced by [`synthesize_header`].

mod header;

pub use header::{HEADER_LEN, HeaderOptions, parse_header, synthesize_header};
