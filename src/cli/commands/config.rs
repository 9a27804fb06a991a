use async_trait::async_trait;

use crate::{
    cli::{CliError, Command, CommandResult},
    config::Config,
};

/// Command to print the effective configuration as TOML
///
/// Can print the JSON schema of the configuration file instead, for editor
/// completion.
pub struct ConfigCommand {
    config: Config,
    schema: bool,
}

impl ConfigCommand {
    /// Creates a new ConfigCommand for an already loaded configuration
    pub fn new(config: Config) -> Self {
        Self {
            config,
            schema: false,
        }
    }

    /// Print the schema instead of the values
    pub fn with_schema(mut self, schema: bool) -> Self {
        self.schema = schema;
        self
    }
}

#[async_trait]
impl Command for ConfigCommand {
    async fn execute(&self) -> CommandResult {
        if self.schema {
            let schema = schemars::schema_for!(Config);
            return serde_json::to_string_pretty(&schema)
                .map_err(|e| CliError::ConfigError(e.to_string()));
        }

        self.config
            .to_toml_string()
            .map_err(|e| CliError::ConfigError(e.to_string()))
    }
}
