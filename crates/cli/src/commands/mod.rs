pub mod compare;
pub mod explode;
pub mod trace;

use std::path::Path;

use bomcheck_core::config::{AppConfig, LoadOptions};
use bomcheck_core::{BomTable, ExplodeOptions, Explosion};
use serde::Serialize;

use crate::ingest;

#[derive(Debug, Clone)]
pub struct CommandResult {
    pub exit_code: u8,
    pub output: String,
}

#[derive(Debug, Serialize)]
struct CommandOutcome {
    command: String,
    status: String,
    error_class: Option<String>,
    message: String,
}

impl CommandResult {
    pub fn success(output: impl Into<String>) -> Self {
        Self { exit_code: 0, output: output.into() }
    }

    pub fn failure(
        command: &str,
        error_class: &str,
        message: impl Into<String>,
        exit_code: u8,
    ) -> Self {
        let payload = CommandOutcome {
            command: command.to_string(),
            status: "error".to_string(),
            error_class: Some(error_class.to_string()),
            message: message.into(),
        };
        Self { exit_code, output: serialize_payload(payload) }
    }
}

fn serialize_payload(payload: CommandOutcome) -> String {
    serde_json::to_string(&payload).unwrap_or_else(|error| {
        format!(
            "{{\"command\":\"unknown\",\"status\":\"error\",\"error_class\":\"serialization\",\"message\":\"{}\"}}",
            error.to_string().replace('\\', "\\\\").replace('"', "\\\"")
        )
    })
}

/// The shared front half of every command: load config, ingest the BOM
/// file, resolve the root, explode. Failures come back as ready-to-print
/// `CommandResult`s with staged exit codes.
pub(crate) struct ExplodedBom {
    pub config: AppConfig,
    pub table: BomTable,
    pub explosion: Explosion,
}

pub(crate) fn explode_bom(
    command: &str,
    bom_path: &Path,
    config_path: Option<&Path>,
) -> Result<ExplodedBom, Box<CommandResult>> {
    let config = AppConfig::load(LoadOptions {
        config_path: config_path.map(Path::to_path_buf),
        require_file: config_path.is_some(),
        ..LoadOptions::default()
    })
    .map_err(|error| {
        CommandResult::failure(command, "config_validation", error.to_string(), 2)
    })?;

    let rows = ingest::read_bom_file(bom_path)
        .map_err(|error| CommandResult::failure(command, "ingest", error.to_string(), 3))?;

    let table = BomTable::from_rows(rows);
    let root = table
        .root_item()
        .map_err(|error| CommandResult::failure(command, "root_resolution", error.to_string(), 4))?;

    tracing::info!(root = %root, "exploding bom");
    let explosion = bomcheck_core::explode(
        &table,
        &root,
        &ExplodeOptions { max_depth: config.explode.max_depth },
    )
    .map_err(|error| CommandResult::failure(command, "explosion", error.to_string(), 5))?;

    Ok(ExplodedBom { config, table, explosion })
}
