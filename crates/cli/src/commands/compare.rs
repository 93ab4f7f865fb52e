use std::path::Path;

use bomcheck_core::{build_parts_list, reconcile};

use crate::commands::{explode_bom, CommandResult};
use crate::{export, ingest, render};

pub fn run(
    bom_path: &Path,
    target_path: &Path,
    out: Option<&Path>,
    json: bool,
    config_path: Option<&Path>,
) -> CommandResult {
    let exploded = match explode_bom("compare", bom_path, config_path) {
        Ok(exploded) => exploded,
        Err(failure) => return *failure,
    };

    let targets = match ingest::read_target_file(target_path) {
        Ok(targets) => targets,
        Err(error) => return CommandResult::failure("compare", "ingest", error.to_string(), 3),
    };

    let parts = build_parts_list(&exploded.explosion, &exploded.table);
    let report = reconcile(&parts, &targets, exploded.config.compare.tolerance);

    if let Some(path) = out {
        if let Err(error) = export::write_comparison_csv(path, &report) {
            return CommandResult::failure("compare", "export", error.to_string(), 6);
        }
    }

    if json {
        let payload = serde_json::json!({
            "command": "compare",
            "status": "ok",
            "tolerance": exploded.config.compare.tolerance,
            "report": report,
        });
        return CommandResult::success(payload.to_string());
    }

    CommandResult::success(render::comparison_table(&report))
}
