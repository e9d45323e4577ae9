//! Output formatting for the CLI.

use crate::config::OutputFormat;
use crate::error::Result;
use colored::*;
use lodestar_domain::{EntityData, EntityRecord, FuzzyDate, RelationEdge};
use lodestar_importer::{ImportOutcome, ImportReport};
use lodestar_mapping::ExtractionConfig;
use tabled::{
    builder::Builder,
    settings::{object::Rows, Alignment, Modify, Style},
};

/// A record with what the store knows around it
#[derive(Debug, Clone)]
pub struct RecordDetails {
    /// The record
    pub record: EntityRecord,
    /// Registered identifier URIs
    pub identifiers: Vec<String>,
    /// Outgoing relations with the object's label
    pub relations: Vec<(RelationEdge, String)>,
}

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

    /// Format the outcome of an import.
    pub fn format_outcome(&self, uri: &str, outcome: &ImportOutcome) -> Result<String> {
        match self.format {
            OutputFormat::Json => self.format_outcome_json(uri, outcome),
            OutputFormat::Quiet => Ok(outcome
                .record()
                .map(|r| r.id.to_string())
                .unwrap_or_default()),
            OutputFormat::Table => Ok(self.format_outcome_text(uri, outcome)),
        }
    }

    fn format_outcome_json(&self, uri: &str, outcome: &ImportOutcome) -> Result<String> {
        let value = match outcome {
            ImportOutcome::Created { record, report } => serde_json::json!({
                "uri": uri,
                "outcome": "created",
                "record": record_json(record),
                "report": report_json(report),
            }),
            ImportOutcome::Existing(record) => serde_json::json!({
                "uri": uri,
                "outcome": "existing",
                "record": record_json(record),
            }),
            ImportOutcome::NotFound => serde_json::json!({
                "uri": uri,
                "outcome": "not_found",
            }),
        };
        Ok(serde_json::to_string_pretty(&value)?)
    }

    fn format_outcome_text(&self, uri: &str, outcome: &ImportOutcome) -> String {
        match outcome {
            ImportOutcome::Created { record, report } => {
                let mut lines = vec![self.success(&format!(
                    "Imported {} '{}' ({})",
                    record.kind(),
                    record.label(),
                    record.id
                ))];
                lines.push(format!(
                    "  {} record(s), {} relation(s), {} identifier(s)",
                    report.records_created.len(),
                    report.relations_created,
                    report.identifiers_registered
                ));
                for skipped in &report.skipped {
                    lines.push(self.warning(&format!("Skipped {}", skipped)));
                }
                lines.join("\n")
            }
            ImportOutcome::Existing(record) => self.info(&format!(
                "{} is already imported as '{}' ({})",
                uri,
                record.label(),
                record.id
            )),
            ImportOutcome::NotFound => {
                self.warning(&format!("No applicable description at {}", uri))
            }
        }
    }

    /// Format a stored record.
    pub fn format_record(&self, details: &RecordDetails) -> Result<String> {
        match self.format {
            OutputFormat::Json => {
                let mut value = record_json(&details.record);
                value["identifiers"] = serde_json::json!(details.identifiers);
                value["relations"] = details
                    .relations
                    .iter()
                    .map(|(edge, label)| {
                        serde_json::json!({
                            "kind": edge.kind.as_str(),
                            "object": edge.object.to_string(),
                            "object_label": label,
                            "start": date_str(edge.start.as_ref()),
                            "end": date_str(edge.end.as_ref()),
                            "notes": edge.notes,
                        })
                    })
                    .collect();
                Ok(serde_json::to_string_pretty(&value)?)
            }
            OutputFormat::Quiet => Ok(details.record.id.to_string()),
            OutputFormat::Table => Ok(self.format_record_table(details)),
        }
    }

    fn format_record_table(&self, details: &RecordDetails) -> String {
        let record = &details.record;
        let mut builder = Builder::default();
        builder.push_record(["Field", "Value"]);
        builder.push_record(["ID".to_string(), record.id.to_string()]);
        builder.push_record(["Kind".to_string(), record.kind().to_string()]);
        for (field, value) in fields(&record.data) {
            builder.push_record([field.to_string(), value]);
        }
        for uri in &details.identifiers {
            builder.push_record(["Identifier".to_string(), uri.clone()]);
        }
        for (edge, label) in &details.relations {
            let interval = match (&edge.start, &edge.end) {
                (None, None) => String::new(),
                (start, end) => format!(
                    " [{} - {}]",
                    date_str(start.as_ref()).unwrap_or("?"),
                    date_str(end.as_ref()).unwrap_or("?")
                ),
            };
            builder.push_record([
                edge.kind.name().to_string(),
                format!("{} ({}){}", label, edge.object, interval),
            ]);
        }

        let mut table = builder.build();
        table
            .with(Style::rounded())
            .with(Modify::new(Rows::first()).with(Alignment::center()));

        format!("{}\n{}", self.colorize(&record.label(), "cyan"), table)
    }

    /// Format extraction configs.
    pub fn format_mappings(&self, configs: &[&ExtractionConfig]) -> Result<String> {
        match self.format {
            OutputFormat::Json => {
                let values: Vec<serde_json::Value> = configs
                    .iter()
                    .map(|c| {
                        serde_json::json!({
                            "target": c.target.to_string(),
                            "source": c.source.to_string(),
                            "filters": c.filters.len(),
                            "fields": c.attributes.iter().map(|a| a.field.as_str()).collect::<Vec<_>>(),
                            "relations": c.relations.iter().map(|r| r.kind.as_str()).collect::<Vec<_>>(),
                        })
                    })
                    .collect();
                Ok(serde_json::to_string_pretty(&values)?)
            }
            OutputFormat::Quiet => Ok(configs
                .iter()
                .map(|c| format!("{}/{}", c.source, c.target))
                .collect::<Vec<_>>()
                .join("\n")),
            OutputFormat::Table => {
                if configs.is_empty() {
                    return Ok(self.colorize("No extraction configs.", "yellow"));
                }

                let mut builder = Builder::default();
                builder.push_record(["Source", "Target", "Filters", "Fields", "Relations"]);
                for config in configs {
                    let fields: Vec<&str> = config.attributes.iter().map(|a| a.field.as_str()).collect();
                    let relations: Vec<&str> = config.relations.iter().map(|r| r.kind.as_str()).collect();
                    builder.push_record([
                        config.source.to_string(),
                        config.target.to_string(),
                        config.filters.len().to_string(),
                        fields.join(", "),
                        relations.join(", "),
                    ]);
                }

                let mut table = builder.build();
                table
                    .with(Style::rounded())
                    .with(Modify::new(Rows::first()).with(Alignment::center()));
                Ok(table.to_string())
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

fn date_str(date: Option<&FuzzyDate>) -> Option<&str> {
    date.map(FuzzyDate::as_str)
}

/// Display rows of a record's attributes, empty ones left out
fn fields(data: &EntityData) -> Vec<(&'static str, String)> {
    let mut rows: Vec<(&'static str, Option<String>)> = Vec::new();
    match data {
        EntityData::Person(p) => {
            rows.push(("Forename", p.forename.clone()));
            rows.push(("Surname", p.surname.clone()));
            rows.push(("Born", p.start.as_ref().map(|d| d.to_string())));
            rows.push(("Died", p.end.as_ref().map(|d| d.to_string())));
            rows.push(("Gender", p.gender.map(|g| g.as_str().to_string())));
            rows.push(("Professions", non_empty(&p.professions)));
            rows.push(("Titles", non_empty(&p.titles)));
        }
        EntityData::Place(p) => {
            rows.push(("Label", p.label.clone()));
            rows.push(("Latitude", p.latitude.map(|v| v.to_string())));
            rows.push(("Longitude", p.longitude.map(|v| v.to_string())));
            rows.push(("Feature", p.kind.clone()));
        }
        EntityData::Institution(i) => {
            rows.push(("Name", i.name.clone()));
            rows.push(("Founded", i.start.as_ref().map(|d| d.to_string())));
            rows.push(("Dissolved", i.end.as_ref().map(|d| d.to_string())));
        }
        EntityData::Event(e) => {
            rows.push(("Name", e.name.clone()));
            rows.push(("Start", e.start.as_ref().map(|d| d.to_string())));
            rows.push(("End", e.end.as_ref().map(|d| d.to_string())));
        }
        EntityData::Work(w) => {
            rows.push(("Name", w.name.clone()));
            rows.push(("Date", w.start.as_ref().map(|d| d.to_string())));
        }
        EntityData::Prize(p) => {
            rows.push(("Name", p.name.clone()));
            rows.push(("Established", p.start.as_ref().map(|d| d.to_string())));
        }
    }
    rows.into_iter()
        .filter_map(|(field, value)| value.map(|v| (field, v)))
        .collect()
}

fn non_empty(values: &[String]) -> Option<String> {
    if values.is_empty() {
        None
    } else {
        Some(values.join(", "))
    }
}

fn record_json(record: &EntityRecord) -> serde_json::Value {
    let mut value = serde_json::json!({
        "id": record.id.to_string(),
        "kind": record.kind().as_str(),
        "label": record.label(),
        "created_at": record.created_at,
    });
    for (field, text) in fields(&record.data) {
        value[field.to_lowercase()] = serde_json::json!(text);
    }
    value
}

fn report_json(report: &ImportReport) -> serde_json::Value {
    serde_json::json!({
        "records_created": report.records_created.iter().map(|id| id.to_string()).collect::<Vec<_>>(),
        "relations_created": report.relations_created,
        "identifiers_registered": report.identifiers_registered,
        "skipped": report.skipped.iter().map(|s| s.to_string()).collect::<Vec<_>>(),
        "attempts": report.attempts,
    })
}
