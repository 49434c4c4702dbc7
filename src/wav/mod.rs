//! RIFF/WAVE container construction for raw linear PCM.
//!
//! The header is always the canonical 44-byte layout: a RIFF descriptor, a
//! 16-byte PCM fmt chunk and a data chunk header, followed by the untouched
//! payload. Nothing here performs I/O or logging.

pub mod chunks;
pub mod error;
pub mod format;

pub use chunks::{
    encode_data_header, encode_fmt_chunk, encode_riff_chunk, FourCc, DATA_HEADER_LEN,
    FMT_CHUNK_LEN, HEADER_LEN, RIFF_CHUNK_LEN,
};
pub use error::WavError;
pub use format::{BitsPerSample, Channels, PcmFormat, SampleRate};

use chunks::PCM_FMT_CHUNK_SIZE;

/// Wrap `pcm` in a WAV container after validating the raw parameters.
///
/// Parameters are checked in order (channels, sample rate, bits per sample)
/// and the first unsupported one is reported.
pub fn build_wav(
    pcm: &[u8],
    channels: u32,
    sample_rate: u32,
    bits_per_sample: u32,
) -> Result<Vec<u8>, WavError> {
    let format = PcmFormat::new(channels, sample_rate, bits_per_sample)?;
    build_wav_with(&format, pcm)
}

/// Wrap `pcm` in a WAV container using an already validated format.
pub fn build_wav_with(format: &PcmFormat, pcm: &[u8]) -> Result<Vec<u8>, WavError> {
    let data_size = u32::try_from(pcm.len())
        .ok()
        .filter(|size| size.checked_add(riff_overhead()).is_some())
        .ok_or(WavError::PayloadTooLarge(pcm.len()))?;
    let chunk_size = riff_overhead() + data_size;

    let mut wav = Vec::with_capacity(HEADER_LEN + pcm.len());
    encode_riff_chunk(&mut wav, chunk_size);
    encode_fmt_chunk(&mut wav, format);
    encode_data_header(&mut wav, data_size);
    wav.extend_from_slice(pcm);

    Ok(wav)
}

// "WAVE" tag plus the fmt chunk and data chunk headers.
const fn riff_overhead() -> u32 {
    4 + (8 + PCM_FMT_CHUNK_SIZE) + 8
}
