use thiserror::Error;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum WavError {
    #[error("invalid channel count {0}: expected 1 or 2")]
    InvalidChannels(u32),
    #[error("invalid sample rate {0}Hz: expected 8000 or 16000")]
    InvalidSampleRate(u32),
    #[error("invalid bits per sample {0}: expected 8 or 16")]
    InvalidBitsPerSample(u32),
    #[error("PCM payload of {0} bytes does not fit in a RIFF container")]
    PayloadTooLarge(usize),
}
