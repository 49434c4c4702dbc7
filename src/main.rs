use anyhow::{bail, Context, Result};
use clap::Parser;
use pcm2wav_rs::{
    convert::{self, default_output_path},
    logging, ConfigManager, ConversionJob, ConversionReport, ConvertError, ConvertOptions,
};
use std::collections::HashSet;
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use tokio::signal;
use tracing::{error, info};

#[derive(Debug, Parser)]
#[command(name = "pcm2wav", version, about = "Wrap raw PCM files in a WAV header")]
struct Cli {
    /// Raw PCM input files
    #[arg(required = true)]
    inputs: Vec<PathBuf>,

    /// Channel count (1 or 2)
    #[arg(short, long)]
    channels: Option<u32>,

    /// Sample rate in Hz (8000 or 16000)
    #[arg(short = 'r', long)]
    sample_rate: Option<u32>,

    /// Bits per sample (8 or 16)
    #[arg(short, long)]
    bits_per_sample: Option<u32>,

    /// Output file; only valid with a single input
    #[arg(short, long, conflicts_with = "out_dir")]
    output: Option<PathBuf>,

    /// Directory for generated WAV files
    #[arg(short = 'd', long)]
    out_dir: Option<PathBuf>,

    /// Overwrite existing outputs
    #[arg(short, long)]
    force: bool,

    /// Maximum number of files converted at once
    #[arg(short, long)]
    jobs: Option<usize>,

    /// Config file to use instead of the default location
    #[arg(long)]
    config: Option<PathBuf>,

    /// Write the effective settings (after command-line overrides) back to the config file
    #[arg(long)]
    save_config: bool,

    /// Enable debug logging
    #[arg(short, long)]
    verbose: bool,
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();
    logging::init(cli.verbose);

    match run(cli).await {
        Ok(true) => ExitCode::SUCCESS,
        Ok(false) => ExitCode::FAILURE,
        Err(err) => {
            error!("{err:#}");
            ExitCode::FAILURE
        }
    }
}

/// Returns whether every job succeeded.
async fn run(cli: Cli) -> Result<bool> {
    let mut config_manager = match &cli.config {
        Some(path) => ConfigManager::load_from(path)?,
        None => ConfigManager::load()?,
    };
    let mut config = config_manager.get();
    info!("Configuration loaded from {:?}", config_manager.config_path());

    if let Some(channels) = cli.channels {
        config.channels = channels;
    }
    if let Some(sample_rate) = cli.sample_rate {
        config.sample_rate = sample_rate;
    }
    if let Some(bits) = cli.bits_per_sample {
        config.bits_per_sample = bits;
    }
    if let Some(jobs) = cli.jobs {
        config.max_concurrency = jobs;
    }

    // Validate before touching any input file.
    let format = config
        .pcm_format()
        .context("Unsupported PCM parameters")?;

    if cli.save_config {
        config_manager.save(config.clone())?;
    }

    let options = ConvertOptions {
        format,
        overwrite: cli.force || config.overwrite,
        max_concurrency: config.max_concurrency,
    };

    let out_dir = cli
        .out_dir
        .clone()
        .or_else(|| config.output_dir.as_ref().map(PathBuf::from));
    let jobs = plan_jobs(&cli.inputs, cli.output.as_deref(), out_dir.as_deref())?;

    info!(
        "Converting {} file(s) as {}ch {}Hz {}-bit",
        jobs.len(),
        format.channels.count(),
        format.sample_rate.hz(),
        format.bits_per_sample.bits()
    );

    let results = tokio::select! {
        results = convert::convert_many(jobs, &options) => results,
        _ = signal::ctrl_c() => {
            info!("Received SIGINT (Ctrl+C), aborting");
            return Ok(false);
        }
    };

    Ok(summarize(&results))
}

/// Logs the batch outcome and returns whether every job succeeded.
fn summarize(results: &[Result<ConversionReport, ConvertError>]) -> bool {
    let failed = results.iter().filter(|result| result.is_err()).count();
    if failed > 0 {
        error!("{} of {} conversion(s) failed", failed, results.len());
    } else {
        info!("✅ Converted {} file(s)", results.len());
    }

    failed == 0
}

fn plan_jobs(
    inputs: &[PathBuf],
    output: Option<&Path>,
    out_dir: Option<&Path>,
) -> Result<Vec<ConversionJob>> {
    if let Some(output) = output {
        if inputs.len() != 1 {
            bail!("--output can only be used with a single input file");
        }
        return Ok(vec![ConversionJob::new(&inputs[0], output)]);
    }

    let jobs: Vec<ConversionJob> = inputs
        .iter()
        .map(|input| ConversionJob::new(input, default_output_path(input, out_dir)))
        .collect();

    let mut seen = HashSet::new();
    for job in &jobs {
        if !seen.insert(&job.output) {
            bail!(
                "Several inputs would be written to {:?}; use distinct file names",
                job.output
            );
        }
    }

    Ok(jobs)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pcm2wav_rs::PcmFormat;
    use std::time::Duration;

    fn paths(raw: &[&str]) -> Vec<PathBuf> {
        raw.iter().map(PathBuf::from).collect()
    }

    #[test]
    fn explicit_output_requires_single_input() {
        let err = plan_jobs(&paths(&["a.pcm", "b.pcm"]), Some(Path::new("out.wav")), None)
            .unwrap_err();
        assert!(err.to_string().contains("single input"));

        let jobs = plan_jobs(&paths(&["a.pcm"]), Some(Path::new("out.wav")), None)
            .expect("single input");
        assert_eq!(jobs, vec![ConversionJob::new("a.pcm", "out.wav")]);
    }

    #[test]
    fn outputs_relocate_into_out_dir() {
        let jobs = plan_jobs(&paths(&["rec/one.pcm", "two.raw"]), None, Some(Path::new("out")))
            .expect("plan");
        assert_eq!(
            jobs,
            vec![
                ConversionJob::new("rec/one.pcm", "out/one.wav"),
                ConversionJob::new("two.raw", "out/two.wav"),
            ]
        );
    }

    #[test]
    fn colliding_outputs_are_rejected() {
        let err = plan_jobs(
            &paths(&["a/take.pcm", "b/take.pcm"]),
            None,
            Some(Path::new("out")),
        )
        .unwrap_err();
        assert!(err.to_string().contains("out/take.wav"));

        // Without an out_dir the same names stay in separate directories.
        let jobs = plan_jobs(&paths(&["a/take.pcm", "b/take.pcm"]), None, None).expect("plan");
        assert_eq!(jobs.len(), 2);
    }

    #[test]
    fn parses_overrides_and_save_flag() {
        let cli = Cli::try_parse_from([
            "pcm2wav",
            "--save-config",
            "-c",
            "2",
            "-r",
            "8000",
            "in.pcm",
        ])
        .expect("parse");
        assert!(cli.save_config);
        assert_eq!(cli.channels, Some(2));
        assert_eq!(cli.sample_rate, Some(8_000));
        assert_eq!(cli.inputs, paths(&["in.pcm"]));

        assert!(Cli::try_parse_from(["pcm2wav", "-o", "a.wav", "-d", "out", "in.pcm"]).is_err());
    }

    #[test]
    fn any_failed_job_marks_the_run_failed() {
        let report = ConversionReport {
            input: PathBuf::from("a.pcm"),
            output: PathBuf::from("a.wav"),
            format: PcmFormat::new(1, 8_000, 8).expect("valid format"),
            pcm_bytes: 8_000,
            wav_bytes: 8_044,
            duration: Duration::from_secs(1),
        };

        assert!(summarize(&[Ok(report.clone())]));
        assert!(summarize(&[]));
        assert!(!summarize(&[
            Ok(report),
            Err(ConvertError::OutputExists(PathBuf::from("b.wav"))),
        ]));
    }
}
