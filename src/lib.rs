pub mod config;
pub mod convert;
pub mod logging;
pub mod wav;

pub use config::{Config, ConfigManager};
pub use convert::{ConversionJob, ConversionReport, ConvertError, ConvertOptions};
pub use wav::{build_wav, build_wav_with, PcmFormat, WavError};
