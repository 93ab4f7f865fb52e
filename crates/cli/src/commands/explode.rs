use std::path::Path;

use bomcheck_core::{build_length_list, build_parts_list};

use crate::commands::{explode_bom, CommandResult};
use crate::{export, render};

pub fn run(
    bom_path: &Path,
    out: Option<&Path>,
    lengths_out: Option<&Path>,
    json: bool,
    config_path: Option<&Path>,
) -> CommandResult {
    let exploded = match explode_bom("explode", bom_path, config_path) {
        Ok(exploded) => exploded,
        Err(failure) => return *failure,
    };

    let parts = build_parts_list(&exploded.explosion, &exploded.table);
    let lengths = build_length_list(&exploded.explosion, &exploded.table);

    if let Some(path) = out {
        if let Err(error) = export::write_parts_csv(path, &parts) {
            return CommandResult::failure("explode", "export", error.to_string(), 6);
        }
    }
    if let Some(path) = lengths_out {
        if let Err(error) = export::write_lengths_csv(path, &lengths) {
            return CommandResult::failure("explode", "export", error.to_string(), 6);
        }
    }

    if json {
        let payload = serde_json::json!({
            "command": "explode",
            "status": "ok",
            "parts": parts,
            "lengths": lengths,
        });
        return CommandResult::success(payload.to_string());
    }

    let mut sections = vec![render::parts_table(&parts)];
    if !lengths.is_empty() {
        sections.push(String::new());
        sections.push("Length items (aggregated separately):".to_string());
        sections.push(render::lengths_table(&lengths));
    }
    CommandResult::success(sections.join("\n"))
}
