use crate::engine::RunSummary;
use crate::errors::Result;
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::io::Write;

/// Defines the possible output formats for run reports.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    /// A simple, human-readable text format.
    Text,
    /// JSON format, suitable for machine processing.
    Json,
    /// Comma-Separated Values format.
    Csv,
}

impl From<&str> for OutputFormat {
    fn from(s: &str) -> Self {
        match s.to_lowercase().as_str() {
            "json" => OutputFormat::Json,
            "csv" => OutputFormat::Csv,
            _ => OutputFormat::Text,
        }
    }
}

/// Renders a [`RunSummary`] for the console or for other tools.
pub struct OutputFormatter {
    format: OutputFormat,
    tool_name: String,
    tool_version: String,
}

impl OutputFormatter {
    pub fn new(format: OutputFormat) -> Self {
        Self {
            format,
            tool_name: "zrep".to_string(),
            tool_version: env!("CARGO_PKG_VERSION").to_string(),
        }
    }

    /// Writes the formatted summary to a given writer.
    pub fn write_output<W: Write>(&self, writer: &mut W, summary: &RunSummary) -> Result<()> {
        let output = match self.format {
            OutputFormat::Text => self.format_text(summary),
            OutputFormat::Json => self.format_json(summary)?,
            OutputFormat::Csv => self.format_csv(summary)?,
        };

        writer.write_all(output.as_bytes())?;
        Ok(())
    }

    /// In a dry run, each matching path on its own line followed by a count.
    /// Otherwise one line per modified file, then failures and totals.
    fn format_text(&self, summary: &RunSummary) -> String {
        let mut output = String::new();

        for file in &summary.replaced {
            if summary.dry_run {
                output.push_str(&format!("{}\n", file.path.display()));
            } else {
                output.push_str(&format!(
                    "Modified {} ({} changes)\n",
                    file.path.display(),
                    file.occurrences
                ));
            }
        }

        for warning in &summary.warnings {
            match &warning.path {
                Some(path) => output.push_str(&format!(
                    "Skipped {}: {}\n",
                    path.display(),
                    warning.message
                )),
                None => output.push_str(&format!("Skipped: {}\n", warning.message)),
            }
        }

        for error in &summary.errors {
            output.push_str(&format!("Error: {error}\n"));
        }

        output.push_str(&format!("\n{}\n", "-".repeat(50)));
        if summary.dry_run {
            output.push_str(&format!(
                "Files matching: {}\n",
                summary.files_replaced()
            ));
        } else {
            output.push_str(&format!("Files scanned : {}\n", summary.files_scanned));
            output.push_str(&format!("Files changed : {}\n", summary.files_replaced()));
            output.push_str(&format!("Total edits   : {}\n", summary.total_occurrences()));
            output.push_str(&format!("Binary skipped: {}\n", summary.binary_skipped));
            output.push_str(&format!("Failures      : {}\n", summary.errors.len()));
        }

        output
    }

    /// Formats the summary into a structured JSON document.
    fn format_json(&self, summary: &RunSummary) -> Result<String> {
        #[derive(Serialize)]
        struct JsonOutput {
            tool: ToolInfo,
            run_time: DateTime<Utc>,
            dry_run: bool,
            files_scanned: usize,
            files_replaced: usize,
            total_occurrences: usize,
            binary_skipped: usize,
            pattern_absent: usize,
            replaced: Vec<JsonReplaced>,
            errors: Vec<JsonError>,
            warnings: Vec<JsonWarning>,
        }

        #[derive(Serialize)]
        struct ToolInfo {
            name: String,
            version: String,
        }

        #[derive(Serialize)]
        struct JsonReplaced {
            file: String,
            occurrences: usize,
        }

        #[derive(Serialize)]
        struct JsonError {
            file: String,
            stage: String,
            message: String,
        }

        #[derive(Serialize)]
        struct JsonWarning {
            path: Option<String>,
            message: String,
        }

        let output = JsonOutput {
            tool: ToolInfo {
                name: self.tool_name.clone(),
                version: self.tool_version.clone(),
            },
            run_time: Utc::now(),
            dry_run: summary.dry_run,
            files_scanned: summary.files_scanned,
            files_replaced: summary.files_replaced(),
            total_occurrences: summary.total_occurrences(),
            binary_skipped: summary.binary_skipped,
            pattern_absent: summary.pattern_absent,
            replaced: summary
                .replaced
                .iter()
                .map(|r| JsonReplaced {
                    file: r.path.display().to_string(),
                    occurrences: r.occurrences,
                })
                .collect(),
            errors: summary
                .errors
                .iter()
                .map(|e| JsonError {
                    file: e.path.display().to_string(),
                    stage: e.kind.to_string(),
                    message: e.source.to_string(),
                })
                .collect(),
            warnings: summary
                .warnings
                .iter()
                .map(|w| JsonWarning {
                    path: w.path.as_ref().map(|p| p.display().to_string()),
                    message: w.message.clone(),
                })
                .collect(),
        };

        Ok(serde_json::to_string_pretty(&output)?)
    }

    /// Formats the summary as a CSV table, one row per file event.
    fn format_csv(&self, summary: &RunSummary) -> Result<String> {
        use csv::Writer;

        let mut wtr = Writer::from_writer(vec![]);
        wtr.write_record(["Status", "File", "Occurrences", "Detail"])?;

        let status = if summary.dry_run { "would-modify" } else { "modified" };
        for r in &summary.replaced {
            wtr.write_record([
                status,
                r.path.display().to_string().as_str(),
                r.occurrences.to_string().as_str(),
                "",
            ])?;
        }
        for e in &summary.errors {
            wtr.write_record([
                "error",
                e.path.display().to_string().as_str(),
                "",
                format!("{}: {}", e.kind, e.source).as_str(),
            ])?;
        }
        for w in &summary.warnings {
            let path = w
                .path
                .as_ref()
                .map(|p| p.display().to_string())
                .unwrap_or_default();
            wtr.write_record(["skipped", path.as_str(), "", w.message.as_str()])?;
        }

        let data = wtr
            .into_inner()
            .map_err(|e| std::io::Error::other(e.to_string()))?;
        Ok(String::from_utf8_lossy(&data).into_owned())
    }
}
