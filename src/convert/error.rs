use std::io;
use std::path::PathBuf;

use thiserror::Error;

use crate::wav::WavError;

#[derive(Debug, Error)]
pub enum ConvertError {
    #[error(transparent)]
    Wav(#[from] WavError),
    #[error("failed to read PCM input {path:?}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("failed to write WAV output {path:?}: {source}")]
    Write {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("output {0:?} already exists (pass --force to overwrite)")]
    OutputExists(PathBuf),
    #[error("output {0:?} is targeted by more than one input")]
    DuplicateOutput(PathBuf),
}

impl ConvertError {
    pub fn read(path: impl Into<PathBuf>, source: io::Error) -> Self {
        Self::Read {
            path: path.into(),
            source,
        }
    }

    pub fn write(path: impl Into<PathBuf>, source: io::Error) -> Self {
        Self::Write {
            path: path.into(),
            source,
        }
    }
}
