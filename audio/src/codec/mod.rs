//! Audio codec implementations.
//!
//! - `wav`: RIFF/WAVE container (integer PCM only)

pub mod wav;
