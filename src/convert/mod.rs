//! File-level conversion: read raw PCM from disk, wrap it, write the WAV.

mod error;

pub use error::ConvertError;

use bytes::Bytes;
use futures::stream::{self, StreamExt};
use std::collections::HashSet;
use std::io::{self, ErrorKind, Write};
use std::path::{Path, PathBuf};
use std::time::Duration;
use tempfile::NamedTempFile;
use tokio::{fs, task};
use tracing::{debug, warn};

use crate::logging;
use crate::wav::{self, PcmFormat};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConversionJob {
    pub input: PathBuf,
    pub output: PathBuf,
}

impl ConversionJob {
    pub fn new(input: impl Into<PathBuf>, output: impl Into<PathBuf>) -> Self {
        Self {
            input: input.into(),
            output: output.into(),
        }
    }
}

#[derive(Debug, Clone, Copy)]
pub struct ConvertOptions {
    pub format: PcmFormat,
    pub overwrite: bool,
    pub max_concurrency: usize,
}

impl ConvertOptions {
    pub fn new(format: PcmFormat) -> Self {
        Self {
            format,
            overwrite: false,
            max_concurrency: 4,
        }
    }
}

#[derive(Debug, Clone)]
pub struct ConversionReport {
    pub input: PathBuf,
    pub output: PathBuf,
    pub format: PcmFormat,
    pub pcm_bytes: usize,
    pub wav_bytes: usize,
    pub duration: Duration,
}

pub async fn read_pcm(path: &Path) -> Result<Bytes, ConvertError> {
    let data = fs::read(path)
        .await
        .map_err(|err| ConvertError::read(path, err))?;
    debug!("Read {} bytes of PCM from {:?}", data.len(), path);
    Ok(Bytes::from(data))
}

/// Write `data` to `path`, creating parent directories as needed.
///
/// The bytes are staged in a temporary file next to `path` and renamed into
/// place, so `path` either holds the complete WAV or is left as it was. With
/// `overwrite` unset an existing file is left untouched and
/// [`ConvertError::OutputExists`] is returned.
pub async fn write_wav(
    path: &Path,
    data: impl Into<Bytes>,
    overwrite: bool,
) -> Result<(), ConvertError> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)
            .await
            .map_err(|err| ConvertError::write(path, err))?;
    }

    let target = path.to_path_buf();
    let data = data.into();
    task::spawn_blocking(move || persist_atomically(&target, &data, overwrite))
        .await
        .map_err(|err| ConvertError::write(path, io::Error::new(ErrorKind::Other, err)))?
}

fn persist_atomically(path: &Path, data: &[u8], overwrite: bool) -> Result<(), ConvertError> {
    let dir = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };

    // Dropping the staged file (including on every error path) unlinks it.
    let mut staged = NamedTempFile::new_in(dir).map_err(|err| ConvertError::write(path, err))?;
    staged
        .write_all(data)
        .and_then(|()| staged.as_file().sync_all())
        .map_err(|err| ConvertError::write(path, err))?;

    let persisted = if overwrite {
        staged.persist(path)
    } else {
        staged.persist_noclobber(path)
    };

    persisted.map(|_| ()).map_err(|err| {
        if !overwrite && err.error.kind() == ErrorKind::AlreadyExists {
            ConvertError::OutputExists(path.to_path_buf())
        } else {
            ConvertError::write(path, err.error)
        }
    })
}

pub async fn convert_file(
    job: &ConversionJob,
    options: &ConvertOptions,
) -> Result<ConversionReport, ConvertError> {
    let pcm = read_pcm(&job.input).await?;
    let wav = wav::build_wav_with(&options.format, &pcm)?;
    let wav_bytes = wav.len();
    write_wav(&job.output, wav, options.overwrite).await?;

    let report = ConversionReport {
        input: job.input.clone(),
        output: job.output.clone(),
        format: options.format,
        pcm_bytes: pcm.len(),
        wav_bytes,
        duration: Duration::from_secs_f64(pcm.len() as f64 / options.format.byte_rate() as f64),
    };
    logging::record_conversion(&report);

    Ok(report)
}

/// Convert every job with at most `max_concurrency` in flight.
///
/// Results come back in job order; a failed job does not stop the rest. A job
/// whose output was already claimed by an earlier job fails with
/// [`ConvertError::DuplicateOutput`] without touching the filesystem.
pub async fn convert_many(
    jobs: Vec<ConversionJob>,
    options: &ConvertOptions,
) -> Vec<Result<ConversionReport, ConvertError>> {
    let limit = options.max_concurrency.max(1);

    let mut claimed = HashSet::new();
    let jobs: Vec<(ConversionJob, bool)> = jobs
        .into_iter()
        .map(|job| {
            let first_claim = claimed.insert(job.output.clone());
            (job, first_claim)
        })
        .collect();

    stream::iter(jobs)
        .map(|(job, first_claim)| async move {
            let result = if first_claim {
                convert_file(&job, options).await
            } else {
                Err(ConvertError::DuplicateOutput(job.output.clone()))
            };
            if let Err(err) = &result {
                warn!("Failed to convert {:?}: {}", job.input, err);
            }
            result
        })
        .buffered(limit)
        .collect()
        .await
}

/// `input` with its extension replaced by `wav`, moved into `out_dir` if given.
pub fn default_output_path(input: &Path, out_dir: Option<&Path>) -> PathBuf {
    let renamed = input.with_extension("wav");
    match (out_dir, renamed.file_name()) {
        (Some(dir), Some(name)) => dir.join(name),
        _ => renamed,
    }
}
