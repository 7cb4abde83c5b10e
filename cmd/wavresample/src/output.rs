//! Run summary output.

use std::fs::File;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::Serialize;
use wavresample_audio::AudioProperties;

/// Output format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OutputFormat {
    /// YAML format (default).
    #[default]
    Yaml,
    /// JSON format.
    Json,
}

/// Output configuration.
pub struct Output {
    pub format: OutputFormat,
    pub file: Option<PathBuf>,
}

impl Output {
    /// Creates a new output configuration.
    pub fn new(format: OutputFormat, file: Option<PathBuf>) -> Self {
        Self { format, file }
    }

    /// Serializes `value` in the configured format.
    pub fn render<T: Serialize>(&self, value: &T) -> anyhow::Result<String> {
        Ok(match self.format {
            OutputFormat::Yaml => serde_yaml::to_string(value)?,
            OutputFormat::Json => serde_json::to_string_pretty(value)?,
        })
    }

    /// Writes `value` to the configured file, or stdout.
    pub fn write<T: Serialize>(&self, value: &T) -> anyhow::Result<()> {
        let output = self.render(value)?;
        match &self.file {
            Some(path) => {
                let mut file = File::create(path)?;
                file.write_all(output.as_bytes())?;
            }
            None => {
                println!("{}", output);
            }
        }
        Ok(())
    }
}

/// Shape of one side of a conversion.
#[derive(Debug, Serialize)]
pub struct StreamReport {
    pub path: String,
    pub sample_rate: u32,
    pub channels: u16,
    pub bits_per_sample: u16,
    pub data_size: u32,
}

impl StreamReport {
    pub fn new(path: &Path, props: &AudioProperties) -> Self {
        Self {
            path: path.display().to_string(),
            sample_rate: props.sample_rate,
            channels: props.channel_count,
            bits_per_sample: props.bits_per_sample,
            data_size: props.data_size,
        }
    }
}

/// Summary of a finished run.
#[derive(Debug, Serialize)]
pub struct Report {
    pub filter: String,
    pub input: StreamReport,
    pub output: StreamReport,
    pub elapsed_seconds: f64,
}

impl Report {
    pub fn new(filter: &str, input: StreamReport, output: StreamReport, elapsed: Duration) -> Self {
        Self {
            filter: filter.to_string(),
            input,
            output,
            // Two decimals, as printed in the log.
            elapsed_seconds: (elapsed.as_secs_f64() * 100.0).round() / 100.0,
        }
    }
}
