//! Output formatting for the CLI.

use crate::config::OutputFormat;
use crate::error::Result;
use colored::*;
use taxa_domain::{FieldName, MunicipalRecord, RawFact};
use taxa_pipeline::PipelineResult;
use taxa_store::{MissingData, StoredRun};
use tabled::{
    builder::Builder,
    settings::{object::Rows, Alignment, Modify, Style},
};

/// Output formatter.
pub struct Formatter {
    format: OutputFormat,
    color_enabled: bool,
}

impl Formatter {
    /// Create a new formatter.
    pub fn new(format: OutputFormat, color_enabled: bool) -> Self {
        Self {
            format,
            color_enabled,
        }
    }

    /// The active output format.
    pub fn format(&self) -> OutputFormat {
        self.format
    }

    /// Format a list of records.
    pub fn format_records(&self, records: &[MunicipalRecord]) -> Result<String> {
        match self.format {
            OutputFormat::Json => Ok(serde_json::to_string_pretty(records)?),
            OutputFormat::Table => Ok(self.format_records_table(records)),
            OutputFormat::Quiet => Ok(records
                .iter()
                .map(|r| r.municipality.as_str())
                .collect::<Vec<_>>()
                .join("\n")),
        }
    }

    fn format_records_table(&self, records: &[MunicipalRecord]) -> String {
        if records.is_empty() {
            return self.colorize("No municipalities found.", "yellow");
        }

        let mut builder = Builder::default();
        builder.push_record([
            "Municipality",
            "Livsmedel (kr/h)",
            "Debitering",
            "Bygglov (kr/h)",
            "Completeness",
            "Quality",
            "Status",
        ]);

        for record in records {
            builder.push_record([
                record.municipality.clone(),
                cell(record.field_text(FieldName::FoodControlRate)),
                cell(record.field_text(FieldName::FoodControlBilling)),
                cell(record.field_text(FieldName::BuildingPermitRate)),
                format!("{:.2}", record.completeness_score),
                format!("{:.1}", record.data_quality_score),
                record.status.as_str().to_string(),
            ]);
        }

        render(builder)
    }

    /// Format one record with its provenance.
    pub fn format_record(&self, record: &MunicipalRecord) -> Result<String> {
        match self.format {
            OutputFormat::Json => Ok(serde_json::to_string_pretty(record)?),
            OutputFormat::Quiet => Ok(record.municipality.clone()),
            OutputFormat::Table => {
                let mut builder = Builder::default();
                builder.push_record(["Field", "Value", "Confidence", "Source"]);

                for field in FieldName::ALL {
                    let evidence = record.evidence.get(&field);
                    let mut value = cell(record.field_text(field));
                    if let Some(flag) = record.rate_flag(field) {
                        value = format!("{} ({})", value, flag.as_str());
                    }
                    if field == FieldName::FoodControlBilling {
                        if let Some(original) = &record.billing_model_original {
                            value = format!("{} \"{}\"", value, original);
                        }
                    }
                    builder.push_record([
                        field.as_str().to_string(),
                        value,
                        evidence.map_or_else(|| "-".to_string(), |e| format!("{:.2}", e.confidence)),
                        evidence.map_or_else(|| "-".to_string(), |e| e.source_url.clone()),
                    ]);
                }

                let mut lines = vec![
                    self.colorize(&record.municipality, "cyan"),
                    render(builder),
                    format!(
                        "Status: {}  Completeness: {:.2}  Quality: {:.1}",
                        record.status.as_str(),
                        record.completeness_score,
                        record.data_quality_score
                    ),
                ];

                if !record.validation_warnings.is_empty() {
                    lines.push(self.colorize("Warnings:", "yellow"));
                    for warning in &record.validation_warnings {
                        lines.push(format!("  {}", warning));
                    }
                }

                Ok(lines.join("\n"))
            }
        }
    }

    /// Format extracted facts.
    pub fn format_facts(&self, facts: &[RawFact]) -> Result<String> {
        match self.format {
            OutputFormat::Json => Ok(serde_json::to_string_pretty(facts)?),
            OutputFormat::Quiet => Ok(facts
                .iter()
                .map(|f| format!("{}={}", f.field_name, f.value.as_text()))
                .collect::<Vec<_>>()
                .join("\n")),
            OutputFormat::Table => {
                if facts.is_empty() {
                    return Ok(self.colorize("No facts found.", "yellow"));
                }

                let mut builder = Builder::default();
                builder.push_record(["Municipality", "Field", "Value", "Confidence", "Source"]);
                for fact in facts {
                    builder.push_record([
                        fact.municipality.clone(),
                        fact.field_name.to_string(),
                        fact.value.as_text(),
                        format!("{:.2}", fact.confidence),
                        fact.source_url.clone(),
                    ]);
                }
                Ok(render(builder))
            }
        }
    }

    /// Format the missing-data report.
    pub fn format_missing(&self, rows: &[MissingData]) -> Result<String> {
        match self.format {
            OutputFormat::Json => {
                let json: Vec<serde_json::Value> = rows
                    .iter()
                    .map(|row| {
                        serde_json::json!({
                            "municipality": row.municipality,
                            "missing": row.missing,
                        })
                    })
                    .collect();
                Ok(serde_json::to_string_pretty(&json)?)
            }
            OutputFormat::Quiet => Ok(rows
                .iter()
                .map(|r| r.municipality.as_str())
                .collect::<Vec<_>>()
                .join("\n")),
            OutputFormat::Table => {
                if rows.is_empty() {
                    return Ok(self.success("Every municipality has all fields."));
                }

                let mut builder = Builder::default();
                let mut header = vec!["Municipality".to_string()];
                header.extend(FieldName::ALL.iter().map(|f| f.to_string()));
                header.push("Missing".to_string());
                builder.push_record(header);

                for row in rows {
                    let mut record = vec![row.municipality.clone()];
                    record.extend(FieldName::ALL.iter().map(|f| {
                        if row.missing.contains(f) {
                            self.colorize("missing", "red")
                        } else {
                            "ok".to_string()
                        }
                    }));
                    record.push(row.missing.len().to_string());
                    builder.push_record(record);
                }
                Ok(render(builder))
            }
        }
    }

    /// Format the statistics of a stored run.
    pub fn format_run(&self, run: &StoredRun) -> Result<String> {
        match self.format {
            OutputFormat::Json => {
                let coverage: serde_json::Map<String, serde_json::Value> = run
                    .field_coverage
                    .iter()
                    .map(|(field, c)| {
                        (
                            field.to_string(),
                            serde_json::json!({ "count": c.count, "percentage": c.percentage }),
                        )
                    })
                    .collect();
                let quality: serde_json::Map<String, serde_json::Value> = run
                    .quality_distribution
                    .iter()
                    .map(|(bucket, count, pct)| {
                        (
                            bucket.as_str().to_string(),
                            serde_json::json!({ "count": count, "percentage": pct }),
                        )
                    })
                    .collect();
                let values: serde_json::Map<String, serde_json::Value> = run
                    .values
                    .iter()
                    .map(|(k, v)| (k.clone(), serde_json::Value::String(v.clone())))
                    .collect();

                Ok(serde_json::to_string_pretty(&serde_json::json!({
                    "run_id": run.run_id.to_string(),
                    "timestamp": run.timestamp,
                    "values": values,
                    "field_coverage": coverage,
                    "quality_distribution": quality,
                }))?)
            }
            OutputFormat::Quiet => Ok(run.run_id.to_string()),
            OutputFormat::Table => {
                let mut builder = Builder::default();
                builder.push_record(["Metric", "Value"]);
                for (key, value) in &run.values {
                    builder.push_record([key.as_str(), value.as_str()]);
                }

                let mut quality = Builder::default();
                quality.push_record(["Quality", "Count", "Share"]);
                for (bucket, count, pct) in &run.quality_distribution {
                    quality.push_record([
                        bucket.as_str().to_string(),
                        count.to_string(),
                        format!("{:.1}%", pct),
                    ]);
                }

                Ok([
                    self.info(&format!("Run {} ({})", run.run_id, run.timestamp)),
                    render(builder),
                    render(quality),
                ]
                .join("\n"))
            }
        }
    }

    /// Format the outcome of a pipeline run.
    pub fn format_result(&self, result: &PipelineResult) -> Result<String> {
        let manifest = &result.manifest;
        match self.format {
            OutputFormat::Json => {
                let exports: Vec<serde_json::Value> = manifest
                    .outcomes
                    .iter()
                    .map(|o| {
                        serde_json::json!({
                            "format": o.format.as_str(),
                            "path": o.path.display().to_string(),
                            "error": o.error,
                        })
                    })
                    .collect();

                Ok(serde_json::to_string_pretty(&serde_json::json!({
                    "run_id": manifest.run_id.to_string(),
                    "timestamp": manifest.timestamp,
                    "input_facts": result.input_facts,
                    "records": result.records.len(),
                    "complete_records": result.statistics.complete_records,
                    "partial_records": result.statistics.partial_records,
                    "rejected_records": result.rejections.len(),
                    "rejected_facts": result.field_rejections.len(),
                    "duplicates_found": result.dedup.duplicates_found,
                    "exports": exports,
                }))?)
            }
            OutputFormat::Quiet => Ok(manifest
                .succeeded()
                .iter()
                .map(|o| o.path.display().to_string())
                .collect::<Vec<_>>()
                .join("\n")),
            OutputFormat::Table => {
                let mut lines = vec![result.summary()];
                if manifest.is_complete() {
                    lines.push(self.success(&format!(
                        "Exported {} record(s) in {} format(s)",
                        manifest.record_count,
                        manifest.outcomes.len()
                    )));
                } else {
                    lines.push(self.warning(&format!(
                        "{} of {} export format(s) failed",
                        manifest.failed().len(),
                        manifest.outcomes.len()
                    )));
                }
                Ok(lines.join("\n"))
            }
        }
    }

    /// Format a success message.
    pub fn success(&self, message: &str) -> String {
        self.colorize(&format!("✓ {}", message), "green")
    }

    /// Format an error message.
    pub fn error(&self, message: &str) -> String {
        self.colorize(&format!("✗ {}", message), "red")
    }

    /// Format an info message.
    pub fn info(&self, message: &str) -> String {
        self.colorize(&format!("ℹ {}", message), "blue")
    }

    /// Format a warning message.
    pub fn warning(&self, message: &str) -> String {
        self.colorize(&format!("⚠ {}", message), "yellow")
    }

    /// Colorize text if color is enabled.
    fn colorize(&self, text: &str, color: &str) -> String {
        if !self.color_enabled {
            return text.to_string();
        }

        match color {
            "red" => text.red().to_string(),
            "green" => text.green().to_string(),
            "blue" => text.blue().to_string(),
            "yellow" => text.yellow().to_string(),
            "cyan" => text.cyan().to_string(),
            _ => text.to_string(),
        }
    }
}

fn cell(value: Option<String>) -> String {
    value.unwrap_or_else(|| "-".to_string())
}

fn render(builder: Builder) -> String {
    let mut table = builder.build();
    table
        .with(Style::rounded())
        .with(Modify::new(Rows::first()).with(Alignment::center()));
    table.to_string()
}
