use owo_colors::OwoColorize;
use serde::{Deserialize, Serialize};
use std::fmt;
use time::{format_description::FormatItem, macros::format_description, OffsetDateTime};
use tracing::{Level, Subscriber};
use tracing_subscriber::{
    fmt::{format::Writer, FmtContext, FormatEvent, FormatFields},
    layer::SubscriberExt,
    registry::LookupSpan,
    util::SubscriberInitExt,
};

use crate::convert::ConversionReport;

const CONVERSION_TARGET: &str = "pcm2wav::conversion";
const TARGET_GUTTER_WIDTH: usize = 22;
const TIMESTAMP_FORMAT: &[FormatItem<'_>] =
    format_description!("[year]-[month]-[day] [hour]:[minute]:[second]");

/// Flattened view of a [`ConversionReport`] carried through the event as JSON.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConversionRecord {
    pub input: String,
    pub output: String,
    pub channels: u16,
    pub sample_rate: u32,
    pub bits_per_sample: u16,
    pub pcm_bytes: usize,
    pub wav_bytes: usize,
    pub duration_ms: u64,
}

impl From<&ConversionReport> for ConversionRecord {
    fn from(report: &ConversionReport) -> Self {
        Self {
            input: report.input.display().to_string(),
            output: report.output.display().to_string(),
            channels: report.format.channels.count(),
            sample_rate: report.format.sample_rate.hz(),
            bits_per_sample: report.format.bits_per_sample.bits(),
            pcm_bytes: report.pcm_bytes,
            wav_bytes: report.wav_bytes,
            duration_ms: report.duration.as_millis() as u64,
        }
    }
}

impl ConversionRecord {
    pub fn render_pretty(&self, use_color: bool) -> String {
        let rows = [
            ("IN ", self.input.clone()),
            ("OUT", self.output.clone()),
            (
                "FMT",
                format!(
                    "{}ch {}Hz {}-bit",
                    self.channels, self.sample_rate, self.bits_per_sample
                ),
            ),
            (
                "LEN",
                format!(
                    "{} -> {} bytes ({} ms)",
                    self.pcm_bytes, self.wav_bytes, self.duration_ms
                ),
            ),
        ];

        let mut lines = vec!["┌─ Conversion".to_string()];
        for (label, value) in rows {
            let value = if use_color {
                value.cyan().to_string()
            } else {
                value
            };
            lines.push(format!("│ {label} : {value}"));
        }
        lines.push("└─".to_string());

        lines.join("\n")
    }
}

#[derive(Debug, Default)]
struct ConversionEventVisitor {
    report_json: Option<String>,
}

impl tracing::field::Visit for ConversionEventVisitor {
    fn record_str(&mut self, field: &tracing::field::Field, value: &str) {
        if field.name() == "report_json" {
            self.report_json = Some(value.to_string());
        }
    }

    fn record_debug(&mut self, field: &tracing::field::Field, value: &dyn fmt::Debug) {
        if field.name() == "report_json" && self.report_json.is_none() {
            self.report_json = Some(format!("{value:?}"));
        }
    }
}

#[derive(Debug, Default)]
pub struct ConsoleFormatter;

impl ConsoleFormatter {
    pub fn new() -> Self {
        Self
    }
}

impl<S, N> FormatEvent<S, N> for ConsoleFormatter
where
    S: Subscriber + for<'lookup> LookupSpan<'lookup>,
    N: for<'writer> FormatFields<'writer> + 'static,
{
    fn format_event(
        &self,
        ctx: &FmtContext<'_, S, N>,
        mut writer: Writer<'_>,
        event: &tracing::Event<'_>,
    ) -> fmt::Result {
        let metadata = event.metadata();
        let use_color = writer.has_ansi_escapes();

        write_prefix(&mut writer, metadata, use_color)?;
        ctx.format_fields(writer.by_ref(), event)?;
        writer.write_char('\n')?;

        if metadata.target() == CONVERSION_TARGET {
            let mut visitor = ConversionEventVisitor::default();
            event.record(&mut visitor);
            if let Some(json) = visitor.report_json {
                match serde_json::from_str::<ConversionRecord>(&json) {
                    Ok(record) => {
                        writer.write_str(&record.render_pretty(use_color))?;
                        writer.write_char('\n')?;
                    }
                    Err(err) => {
                        writer.write_str("│ Failed to render conversion report: ")?;
                        writer.write_str(&err.to_string())?;
                        writer.write_char('\n')?;
                    }
                }
            }
        }

        Ok(())
    }
}

/// Install the global subscriber. `RUST_LOG` wins over `verbose` when set.
pub fn init(verbose: bool) {
    let default_filter = if verbose { "pcm2wav=debug" } else { "pcm2wav=info" };

    // try_init: a second call (e.g. from tests) keeps the first subscriber.
    let _ = tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| default_filter.into()),
        )
        .with(tracing_subscriber::fmt::layer().event_format(ConsoleFormatter::new()))
        .try_init();
}

pub fn record_conversion(report: &ConversionReport) {
    tracing::info!(
        target: "pcm2wav::convert",
        "Wrote {:?} ({} bytes)",
        report.output,
        report.wav_bytes
    );

    if !conversion_summary_enabled() {
        return;
    }
    let record = ConversionRecord::from(report);
    if let Ok(json) = serde_json::to_string(&record) {
        tracing::event!(
            target: CONVERSION_TARGET,
            tracing::Level::DEBUG,
            report_json = json.as_str(),
            pcm_bytes = record.pcm_bytes,
            wav_bytes = record.wav_bytes,
            "conversion finished"
        );
    } else {
        tracing::event!(
            target: CONVERSION_TARGET,
            tracing::Level::DEBUG,
            "conversion finished (serialization failure)"
        );
    }
}

// Consults the active filter, not just the static max level, so the JSON is
// only built when the summary event would actually be recorded.
fn conversion_summary_enabled() -> bool {
    tracing::enabled!(target: CONVERSION_TARGET, Level::DEBUG)
}

fn write_prefix(
    writer: &mut Writer<'_>,
    metadata: &tracing::Metadata<'_>,
    use_color: bool,
) -> fmt::Result {
    let timestamp_plain = format_timestamp();
    let timestamp_display = if use_color {
        timestamp_plain.as_str().dimmed().to_string()
    } else {
        timestamp_plain
    };
    writer.write_str(&timestamp_display)?;

    let level_plain = format!("{:>5}", metadata.level());
    let level_display = if use_color {
        color_level(&level_plain, *metadata.level())
    } else {
        level_plain.clone()
    };
    if !level_plain.starts_with(' ') {
        writer.write_char(' ')?;
    }
    writer.write_str(&level_display)?;
    writer.write_char(' ')?;

    let target_text = format!("{:<width$}", metadata.target(), width = TARGET_GUTTER_WIDTH);
    let target_text = if use_color {
        target_text.blue().dimmed().to_string()
    } else {
        target_text
    };
    writer.write_str(&target_text)?;
    writer.write_str(": ")?;

    Ok(())
}

fn color_level(text: &str, level: Level) -> String {
    match level {
        Level::ERROR => text.red().bold().to_string(),
        Level::WARN => text.yellow().bold().to_string(),
        Level::INFO => text.green().to_string(),
        Level::DEBUG => text.cyan().to_string(),
        Level::TRACE => text.dimmed().to_string(),
    }
}

fn format_timestamp() -> String {
    let now = OffsetDateTime::now_local().unwrap_or_else(|_| OffsetDateTime::now_utc());
    now.format(&TIMESTAMP_FORMAT)
        .unwrap_or_else(|_| "0000-00-00 00:00:00".to_string())
}
