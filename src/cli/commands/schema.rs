//! The `devplan schema` command: JSON Schema for profile documents.

use crate::error::Result;
use crate::profile::ManifestSchema;
use crate::ui::Output;

use super::dispatcher::{Command, CommandResult};

pub struct SchemaCommand {
    schema: ManifestSchema,
}

impl SchemaCommand {
    pub fn new() -> Self {
        Self {
            schema: ManifestSchema::new(),
        }
    }
}

impl Default for SchemaCommand {
    fn default() -> Self {
        Self::new()
    }
}

impl Command for SchemaCommand {
    /// The schema is JSON either way, so `--json` changes nothing.
    fn execute(&self, _output: &Output) -> Result<CommandResult> {
        let schema = serde_json::to_string_pretty(&self.schema.generate())
            .map_err(anyhow::Error::from)?;
        println!("{}", schema);
        Ok(CommandResult::success())
    }
}
