use super::format::PcmFormat;

pub const RIFF_CHUNK_LEN: usize = 12;
pub const FMT_CHUNK_LEN: usize = 24;
pub const DATA_HEADER_LEN: usize = 8;
pub const HEADER_LEN: usize = RIFF_CHUNK_LEN + FMT_CHUNK_LEN + DATA_HEADER_LEN;

/// Size of the fmt body for plain PCM (no extension block).
pub const PCM_FMT_CHUNK_SIZE: u32 = 16;
pub const AUDIO_FORMAT_PCM: u16 = 1;

/// Four-character chunk tag.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FourCc([u8; 4]);

impl FourCc {
    /// Panics (at compile time for `const` tags) unless `tag` is exactly four bytes.
    pub const fn new(tag: &str) -> Self {
        let bytes = tag.as_bytes();
        assert!(bytes.len() == 4, "chunk tags must be exactly four bytes");
        Self([bytes[0], bytes[1], bytes[2], bytes[3]])
    }

    pub const fn as_bytes(&self) -> &[u8; 4] {
        &self.0
    }
}

pub const RIFF: FourCc = FourCc::new("RIFF");
pub const WAVE: FourCc = FourCc::new("WAVE");
pub const FMT: FourCc = FourCc::new("fmt ");
pub const DATA: FourCc = FourCc::new("data");

/// Appends the 12-byte RIFF descriptor.
pub fn encode_riff_chunk(out: &mut Vec<u8>, chunk_size: u32) {
    out.extend_from_slice(RIFF.as_bytes());
    out.extend_from_slice(&chunk_size.to_le_bytes());
    out.extend_from_slice(WAVE.as_bytes());
}

/// Appends the 24-byte fmt sub-chunk for uncompressed PCM.
pub fn encode_fmt_chunk(out: &mut Vec<u8>, format: &PcmFormat) {
    out.extend_from_slice(FMT.as_bytes());
    out.extend_from_slice(&PCM_FMT_CHUNK_SIZE.to_le_bytes());
    out.extend_from_slice(&AUDIO_FORMAT_PCM.to_le_bytes());
    out.extend_from_slice(&format.channels.count().to_le_bytes());
    out.extend_from_slice(&format.sample_rate.hz().to_le_bytes());
    out.extend_from_slice(&format.byte_rate().to_le_bytes());
    out.extend_from_slice(&format.block_align().to_le_bytes());
    out.extend_from_slice(&format.bits_per_sample.bits().to_le_bytes());
}

/// Appends the 8-byte data sub-chunk header. The payload follows separately.
pub fn encode_data_header(out: &mut Vec<u8>, data_size: u32) {
    out.extend_from_slice(DATA.as_bytes());
    out.extend_from_slice(&data_size.to_le_bytes());
}
