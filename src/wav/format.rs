use super::error::WavError;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Channels {
    Mono,
    Stereo,
}

impl Channels {
    pub fn count(self) -> u16 {
        match self {
            Channels::Mono => 1,
            Channels::Stereo => 2,
        }
    }
}

impl TryFrom<u32> for Channels {
    type Error = WavError;

    fn try_from(value: u32) -> Result<Self, Self::Error> {
        match value {
            1 => Ok(Channels::Mono),
            2 => Ok(Channels::Stereo),
            other => Err(WavError::InvalidChannels(other)),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SampleRate {
    Hz8000,
    Hz16000,
}

impl SampleRate {
    pub fn hz(self) -> u32 {
        match self {
            SampleRate::Hz8000 => 8_000,
            SampleRate::Hz16000 => 16_000,
        }
    }
}

impl TryFrom<u32> for SampleRate {
    type Error = WavError;

    fn try_from(value: u32) -> Result<Self, Self::Error> {
        match value {
            8_000 => Ok(SampleRate::Hz8000),
            16_000 => Ok(SampleRate::Hz16000),
            other => Err(WavError::InvalidSampleRate(other)),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BitsPerSample {
    Eight,
    Sixteen,
}

impl BitsPerSample {
    pub fn bits(self) -> u16 {
        match self {
            BitsPerSample::Eight => 8,
            BitsPerSample::Sixteen => 16,
        }
    }
}

impl TryFrom<u32> for BitsPerSample {
    type Error = WavError;

    fn try_from(value: u32) -> Result<Self, Self::Error> {
        match value {
            8 => Ok(BitsPerSample::Eight),
            16 => Ok(BitsPerSample::Sixteen),
            other => Err(WavError::InvalidBitsPerSample(other)),
        }
    }
}

/// A validated channel/rate/depth combination for linear PCM.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PcmFormat {
    pub channels: Channels,
    pub sample_rate: SampleRate,
    pub bits_per_sample: BitsPerSample,
}

impl PcmFormat {
    /// Validates raw parameters, reporting the first unsupported one in
    /// channels, sample rate, bits per sample order.
    pub fn new(channels: u32, sample_rate: u32, bits_per_sample: u32) -> Result<Self, WavError> {
        Ok(Self {
            channels: Channels::try_from(channels)?,
            sample_rate: SampleRate::try_from(sample_rate)?,
            bits_per_sample: BitsPerSample::try_from(bits_per_sample)?,
        })
    }

    /// Bytes per sample frame across all channels.
    pub fn block_align(&self) -> u16 {
        self.channels.count() * self.bits_per_sample.bits() / 8
    }

    /// Bytes per second of audio.
    pub fn byte_rate(&self) -> u32 {
        let channels = u32::from(self.channels.count());
        let bits = u32::from(self.bits_per_sample.bits());
        self.sample_rate.hz() * channels * bits / 8
    }
}
