use std::path::Path;

use bomcheck_core::ItemId;

use crate::commands::{explode_bom, CommandResult};
use crate::render;

pub fn run(bom_path: &Path, item: &str, json: bool, config_path: Option<&Path>) -> CommandResult {
    let exploded = match explode_bom("trace", bom_path, config_path) {
        Ok(exploded) => exploded,
        Err(failure) => return *failure,
    };

    let item = ItemId::from(item);
    let Some(entries) = exploded.explosion.trace_log.get(&item) else {
        let known: Vec<String> =
            exploded.explosion.trace_log.keys().map(ToString::to_string).collect();
        return CommandResult::failure(
            "trace",
            "unknown_item",
            format!("no derivation paths recorded for `{item}` (known leaves: {})", known.join(", ")),
            4,
        );
    };

    if json {
        let payload = serde_json::json!({
            "command": "trace",
            "status": "ok",
            "item": item,
            "paths": entries,
        });
        return CommandResult::success(payload.to_string());
    }

    CommandResult::success(render::trace_listing(item.as_str(), entries))
}
