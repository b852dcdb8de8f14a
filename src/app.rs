//! Application logic for the SQL Safety Gateway CLI.
//!
//! This module contains the command handling separated from the main entry
//! point to enable testing.

use std::{
    fs::read_to_string,
    io::{self, Read},
    path::Path
};

use crate::{
    adapter::{SnapshotAdapter, parse_rows},
    cli::{Cli, Commands, Format, GlobalArgs},
    config::GatewayConfig,
    error::{AppResult, GatewayError, file_read_error, snapshot_error},
    gateway::{Gateway, QueryResponse},
    masking::mask_rows,
    output::{
        OutputFormat, OutputOptions, format_check, format_config, format_error,
        format_explain_response, format_query_response
    }
};

/// Exit code for a request the gateway refused or could not serve
pub const EXIT_REJECTED: i32 = 1;

/// Rendered command result
#[derive(Debug, Clone)]
pub struct CommandOutput {
    pub exit_code: i32,
    pub output:    String
}

/// Convert CLI format to internal OutputFormat
pub fn convert_format(format: Format) -> OutputFormat {
    match format {
        Format::Text => OutputFormat::Text,
        Format::Json => OutputFormat::Json,
        Format::Yaml => OutputFormat::Yaml
    }
}

/// Create output options from parameters
pub fn create_output_options(format: Format, no_color: bool) -> OutputOptions {
    OutputOptions {
        format:  convert_format(format),
        colored: !no_color
    }
}

/// Apply command-line overrides, the highest precedence source
pub fn apply_overrides(config: &mut GatewayConfig, args: &GlobalArgs) {
    if let Some(backend) = &args.backend {
        config.backend = backend.clone();
    }
    if let Some(whitelist) = &args.whitelist {
        config.whitelist = whitelist.clone();
    }
    if let Some(row_cap) = args.row_cap {
        config.row_cap = row_cap;
    }
}

/// Read SQL given inline, as `@path`, or `-` for stdin
pub fn read_sql_input(arg: &str) -> AppResult<String> {
    if arg == "-" {
        read_stdin()
    } else if let Some(path) = arg.strip_prefix('@') {
        read_to_string(path).map_err(|e| file_read_error(path, e))
    } else {
        Ok(arg.to_string())
    }
}

fn read_stdin() -> AppResult<String> {
    let mut buffer = String::new();
    io::stdin()
        .read_to_string(&mut buffer)
        .map_err(|e| file_read_error("stdin", e))?;
    Ok(buffer)
}

/// Load the configuration and run one command
pub async fn run(cli: Cli) -> AppResult<CommandOutput> {
    let mut config = GatewayConfig::load()?;
    apply_overrides(&mut config, &cli.global);
    run_with_config(cli, config).await
}

/// Run one command against an already loaded configuration
pub async fn run_with_config(cli: Cli, config: GatewayConfig) -> AppResult<CommandOutput> {
    let settings = config.settings()?;
    tracing::info!(
        backend = %settings.backend(),
        connection = settings.connection().is_some(),
        whitelist = settings.whitelist().len(),
        row_cap = settings.row_cap(),
        "gateway configured"
    );
    let gateway = Gateway::new(settings);
    let opts = create_output_options(cli.global.format, cli.global.no_color);

    let result = match cli.command {
        Commands::Check {
            sql
        } => {
            let sql = read_sql_input(&sql)?;
            gateway.vet(&sql).map(|v| format_check(&v, &opts))
        }
        Commands::Query {
            sql,
            rows
        } => {
            let sql = read_sql_input(&sql)?;
            let adapter = SnapshotAdapter::new().with_rows(SnapshotAdapter::load_rows(&rows)?);
            gateway
                .query(&sql, &adapter)
                .await
                .map(|r| format_query_response(&r, &opts))
        }
        Commands::Explain {
            sql,
            plan
        } => {
            let sql = read_sql_input(&sql)?;
            let adapter = match plan {
                Some(path) => SnapshotAdapter::new().with_plan(SnapshotAdapter::load_plan(&path)?),
                None => SnapshotAdapter::new()
            };
            gateway
                .explain_safe(&sql, &adapter)
                .await
                .map(|r| format_explain_response(&r, &opts))
        }
        Commands::Mask {
            rows
        } => Ok(run_mask(&rows, &opts)?),
        Commands::Config => Ok(format_config(&gateway.settings().resource(), &opts))
    };

    Ok(render_result(result, &opts))
}

fn run_mask(source: &str, opts: &OutputOptions) -> AppResult<String> {
    let rows = if source == "-" {
        parse_rows(&read_stdin()?).map_err(|e| snapshot_error("stdin", e))?
    } else {
        SnapshotAdapter::load_rows(Path::new(source))?
    };
    let rows = mask_rows(&rows);
    let response = QueryResponse {
        rows_returned: rows.len(),
        rows
    };
    Ok(format_query_response(&response, opts))
}

fn render_result(result: Result<String, GatewayError>, opts: &OutputOptions) -> CommandOutput {
    match result {
        Ok(output) => CommandOutput {
            exit_code: 0,
            output
        },
        Err(err) => CommandOutput {
            exit_code: EXIT_REJECTED,
            output:    format_error(&err, opts)
        }
    }
}
