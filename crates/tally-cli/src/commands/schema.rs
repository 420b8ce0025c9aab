use anyhow::Context;
use serde_json::json;
use tally_schema::SchemaRegistry;

use crate::cli::GlobalFlags;
use crate::cli::root_commands::SchemaArgs;
use crate::output::output;

/// Handle `tly schema`.
pub fn handle(args: &SchemaArgs, flags: &GlobalFlags) -> anyhow::Result<()> {
    let registry = SchemaRegistry::new();
    match args.name.as_deref() {
        Some(name) => {
            let schema = registry.get(name).with_context(|| {
                format!("unknown schema '{name}' (try one of {:?})", registry.list())
            })?;
            output(schema, flags.format)
        }
        None => output(&json!({ "schemas": registry.list() }), flags.format),
    }
}
