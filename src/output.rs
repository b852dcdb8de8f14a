use colored::Colorize;
use serde::Serialize;

use crate::{
    config::ConfigResource,
    error::GatewayError,
    gateway::{ExplainResponse, QueryResponse, VettedQuery},
    row::{CellValue, ResultRow}
};

/// Output format for results
#[derive(Debug, Clone, Copy, Default)]
pub enum OutputFormat {
    #[default]
    Text,
    Json,
    Yaml
}

/// Output options
#[derive(Debug, Clone)]
pub struct OutputOptions {
    pub format:  OutputFormat,
    pub colored: bool
}

impl Default for OutputOptions {
    fn default() -> Self {
        Self {
            format:  OutputFormat::Text,
            colored: true
        }
    }
}

/// Vetted statement as reported by `check`
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CheckReport<'a> {
    pub sql:       &'a str,
    pub capped:    bool,
    pub relations: Vec<String>
}

impl<'a> From<&'a VettedQuery> for CheckReport<'a> {
    fn from(vetted: &'a VettedQuery) -> Self {
        Self {
            sql:       &vetted.sql,
            capped:    vetted.capped,
            relations: vetted
                .statement
                .relations()
                .iter()
                .map(|r| r.qualified().to_string())
                .collect()
        }
    }
}

fn structured<T: Serialize>(value: &T, format: OutputFormat) -> Option<String> {
    match format {
        OutputFormat::Json => Some(serde_json::to_string_pretty(value).unwrap_or_default()),
        OutputFormat::Yaml => Some(serde_yaml::to_string(value).unwrap_or_default()),
        OutputFormat::Text => None
    }
}

fn heading(text: &str, opts: &OutputOptions) -> String {
    if opts.colored {
        text.bold().to_string()
    } else {
        text.to_string()
    }
}

/// Format the result of the check command
pub fn format_check(vetted: &VettedQuery, opts: &OutputOptions) -> String {
    let report = CheckReport::from(vetted);
    if let Some(out) = structured(&report, opts.format) {
        return out;
    }
    let mut output = heading("=== Vetted Statement ===\n\n", opts);
    output.push_str(&format!("{}\n\n", report.sql));
    let relations = if report.relations.is_empty() {
        String::from("(none)")
    } else {
        report.relations.join(", ")
    };
    output.push_str(&format!("Relations: {}\n", relations));
    let cap = if report.capped { "added" } else { "not needed" };
    output.push_str(&format!("Row cap: {}\n", cap));
    output
}

/// Format masked rows of a query or mask command
pub fn format_query_response(response: &QueryResponse, opts: &OutputOptions) -> String {
    if let Some(out) = structured(response, opts.format) {
        return out;
    }
    let mut output = heading("=== Query Result ===\n\n", opts);
    output.push_str(&format_rows_text(&response.rows));
    output.push_str(&format!("\nRows returned: {}\n", response.rows_returned));
    output
}

fn format_rows_text(rows: &[ResultRow]) -> String {
    let mut out = String::new();
    for (i, row) in rows.iter().enumerate() {
        let cells: Vec<String> = row
            .iter()
            .map(|(column, value)| format!("{}={}", column, format_cell(value)))
            .collect();
        out.push_str(&format!("#{} {}\n", i + 1, cells.join(", ")));
    }
    out
}

fn format_cell(value: &CellValue) -> String {
    match value {
        CellValue::Null => String::from("NULL"),
        CellValue::Bool(b) => b.to_string(),
        CellValue::Number(n) => n.to_string(),
        CellValue::Text(s) => s.clone()
    }
}

/// Format a redacted plan
pub fn format_explain_response(response: &ExplainResponse, opts: &OutputOptions) -> String {
    if let Some(out) = structured(response, opts.format) {
        return out;
    }
    let mut output = heading("=== Redacted Plan ===\n\n", opts);
    if response.degraded {
        let note = "Note: backend exposes no plan; showing degraded-fidelity placeholder";
        if opts.colored {
            output.push_str(&note.yellow().to_string());
        } else {
            output.push_str(note);
        }
        output.push_str("\n\n");
    }
    output.push_str(&response.text);
    output.push('\n');
    output
}

/// Format the configuration resource
pub fn format_config(resource: &ConfigResource, opts: &OutputOptions) -> String {
    if let Some(out) = structured(resource, opts.format) {
        return out;
    }
    let mut output = heading("=== Gateway Configuration ===\n\n", opts);
    output.push_str(&format!("Backend: {}\n", resource.backend_type));
    output.push_str(&format!("Whitelist: {}\n", resource.whitelist.join(", ")));
    output.push_str(&format!("Row cap: {}\n", resource.row_cap));
    output
}

/// Format a rejected request
pub fn format_error(err: &GatewayError, opts: &OutputOptions) -> String {
    if let Some(out) = structured(&err.to_body(), opts.format) {
        return out;
    }
    let kind = if opts.colored {
        err.kind().red().bold().to_string()
    } else {
        err.kind().to_string()
    };
    format!("{}: {}", kind, err)
}
