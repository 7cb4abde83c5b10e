//! WAVE header parsing and synthesis.

use tracing::{debug, info, warn};

use crate::error::{AudioError, Result};
use crate::pcm::bytes::{le_u16, le_u32};
use crate::pcm::{AudioFormat, AudioProperties, ByteOrder, ByteSource};

/// Length of a synthesized header in bytes.
pub const HEADER_LEN: usize = 44;

const RIFF: &[u8; 4] = b"RIFF";
const RIFX: &[u8; 4] = b"RIFX";
const WAVE: &[u8; 4] = b"WAVE";
const FMT: &[u8; 4] = b"fmt ";
const DATA: &[u8; 4] = b"data";

/// Size of the canonical PCM `fmt ` body.
const FMT_PCM_LEN: u32 = 16;
/// `fmt ` sizes of WAVEFORMATEX and WAVEFORMATEXTENSIBLE.
const FMT_EXTENSIBLE_LENS: [u32; 2] = [18, 40];
/// Format code for integer PCM.
const FORMAT_PCM: u16 = 1;

/// Largest piece popped at once while skipping unknown chunks.
const SKIP_STEP: usize = 64 * 1024;

/// Restrictions applied to a syntactically valid header.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct HeaderOptions {
    /// Input sample rates the caller accepts. Empty accepts any rate.
    pub accepted_sample_rates: Vec<u32>,
}

impl HeaderOptions {
    /// Accepts only the given input sample rates.
    pub fn accept_rates(rates: impl IntoIterator<Item = u32>) -> Self {
        Self {
            accepted_sample_rates: rates.into_iter().collect(),
        }
    }
}

/// Parses a RIFF/WAVE header from a source positioned at offset 0.
///
/// On success the source is positioned at the first payload byte and the
/// returned properties carry the declared `data` chunk size.
pub fn parse_header<S>(source: &mut S, options: &HeaderOptions) -> Result<AudioProperties>
where
    S: ByteSource + ?Sized,
{
    let tag = pop_exact(source, 4, "RIFF tag")?;
    if tag == RIFX {
        return Err(AudioError::UnsupportedFormat(
            "big-endian RIFX container".into(),
        ));
    }
    if tag != RIFF {
        return Err(AudioError::HeaderFormat(format!(
            "expected RIFF tag, found {}",
            fourcc(&tag)
        )));
    }

    let riff_size = le_u32(&pop_exact(source, 4, "RIFF chunk size")?, 0);
    debug!(riff_size, "riff chunk");

    let tag = pop_exact(source, 4, "WAVE tag")?;
    if tag != WAVE {
        return Err(AudioError::HeaderFormat(format!(
            "expected WAVE tag, found {}",
            fourcc(&tag)
        )));
    }

    let mut props: Option<AudioProperties> = None;

    loop {
        let id = source.pop(4)?;
        if id.len() < 4 {
            return Err(AudioError::HeaderFormat("data chunk not found".into()));
        }
        let size = le_u32(&pop_exact(source, 4, "chunk size")?, 0);

        match id.as_slice() {
            id if id == DATA => {
                let mut props = props.ok_or_else(|| {
                    AudioError::HeaderFormat("data chunk found before fmt chunk".into())
                })?;
                props.data_size = size;
                check_accepted(&props, options)?;
                info!(
                    channels = props.channel_count,
                    sample_rate = props.sample_rate,
                    bits = props.bits_per_sample,
                    data_size = props.data_size,
                    "parsed wave header"
                );
                return Ok(props);
            }
            id if id == FMT => {
                props = Some(parse_fmt(source, size)?);
            }
            other => {
                let padded = u64::from(size) + u64::from(size & 1);
                if size & 1 != 0 {
                    warn!(chunk = %fourcc(other), size, "odd-sized chunk, skipping pad byte");
                }
                debug!(chunk = %fourcc(other), size, "skipping chunk");
                skip(source, padded, other)?;
            }
        }
    }
}

/// Synthesizes the canonical 44-byte PCM header for `props`.
///
/// `props.data_size` must be the number of payload bytes that follow the
/// header; the optional pad byte after an odd payload is not counted.
pub fn synthesize_header(props: &AudioProperties) -> [u8; HEADER_LEN] {
    let block_align = props.channel_count.wrapping_mul(props.bits_per_sample / 8);
    let byte_rate = props.byte_rate() as u32;

    let mut h = [0u8; HEADER_LEN];
    h[0..4].copy_from_slice(RIFF);
    h[4..8].copy_from_slice(&(props.data_size.saturating_add(36)).to_le_bytes());
    h[8..12].copy_from_slice(WAVE);
    h[12..16].copy_from_slice(FMT);
    h[16..20].copy_from_slice(&FMT_PCM_LEN.to_le_bytes());
    h[20..22].copy_from_slice(&FORMAT_PCM.to_le_bytes());
    h[22..24].copy_from_slice(&props.channel_count.to_le_bytes());
    h[24..28].copy_from_slice(&props.sample_rate.to_le_bytes());
    h[28..32].copy_from_slice(&byte_rate.to_le_bytes());
    h[32..34].copy_from_slice(&block_align.to_le_bytes());
    h[34..36].copy_from_slice(&props.bits_per_sample.to_le_bytes());
    h[36..40].copy_from_slice(DATA);
    h[40..44].copy_from_slice(&props.data_size.to_le_bytes());
    h
}

fn parse_fmt<S>(source: &mut S, size: u32) -> Result<AudioProperties>
where
    S: ByteSource + ?Sized,
{
    if FMT_EXTENSIBLE_LENS.contains(&size) {
        return Err(AudioError::UnsupportedFormat(format!(
            "extensible fmt chunk ({size} bytes)"
        )));
    }
    if size != FMT_PCM_LEN {
        return Err(AudioError::HeaderFormat(format!(
            "invalid fmt chunk size {size}"
        )));
    }

    let body = pop_exact(source, FMT_PCM_LEN as usize, "fmt chunk")?;
    let format_code = le_u16(&body, 0);
    if format_code != FORMAT_PCM {
        return Err(AudioError::UnsupportedFormat(format!(
            "audio format code {format_code} is not integer PCM"
        )));
    }

    // Byte rate (offset 8) and block align (offset 12) are derivable and ignored.
    Ok(AudioProperties {
        channel_count: le_u16(&body, 2),
        sample_rate: le_u32(&body, 4),
        bits_per_sample: le_u16(&body, 14),
        byte_order: ByteOrder::Little,
        data_size: 0,
        format: AudioFormat::Pcm,
    })
}

fn check_accepted(props: &AudioProperties, options: &HeaderOptions) -> Result<()> {
    if options.accepted_sample_rates.is_empty()
        || options.accepted_sample_rates.contains(&props.sample_rate)
    {
        return Ok(());
    }
    Err(AudioError::UnsupportedFormat(format!(
        "input sample rate {} Hz not accepted",
        props.sample_rate
    )))
}

/// Pops exactly `n` bytes or fails with a header format error naming `what`.
fn pop_exact<S>(source: &mut S, n: usize, what: &str) -> Result<Vec<u8>>
where
    S: ByteSource + ?Sized,
{
    let bytes = source.pop(n)?;
    if bytes.len() < n {
        return Err(AudioError::HeaderFormat(format!("truncated before {what}")));
    }
    Ok(bytes)
}

fn skip<S>(source: &mut S, mut n: u64, id: &[u8]) -> Result<()>
where
    S: ByteSource + ?Sized,
{
    while n > 0 {
        let step = n.min(SKIP_STEP as u64) as usize;
        if source.pop(step)?.len() < step {
            return Err(AudioError::HeaderFormat(format!(
                "truncated inside {} chunk, data chunk not found",
                fourcc(id)
            )));
        }
        n -= step as u64;
    }
    Ok(())
}

fn fourcc(id: &[u8]) -> String {
    format!("{:?}", String::from_utf8_lossy(id))
}
