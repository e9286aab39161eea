//! # Platform-specific utilities
//!
//! Questo modulo centralizza la logica cross-platform per verificare la
//! presenza dei tool esterni (mogrify, gifsicle) prima di avviare una
//! pipeline. La verifica avviene allo startup: un tool mancante fa fallire
//! subito la run invece di produrre un errore per ogni singolo file.

use crate::error::PipelineError;
use std::collections::HashMap;
use std::sync::OnceLock;

/// Platform-specific command manager
pub struct PlatformCommands {
    commands: HashMap<&'static str, &'static str>,
    which_command: &'static str,
}

impl PlatformCommands {
    /// Get the singleton instance
    pub fn instance() -> &'static Self {
        static INSTANCE: OnceLock<PlatformCommands> = OnceLock::new();
        INSTANCE.get_or_init(Self::new)
    }

    /// Initialize platform-specific commands
    fn new() -> Self {
        let (commands, which_command) = if cfg!(windows) {
            let mut commands = HashMap::new();
            commands.insert("mogrify", "mogrify.exe");
            commands.insert("gifsicle", "gifsicle.exe");
            (commands, "where")
        } else {
            let mut commands = HashMap::new();
            commands.insert("mogrify", "mogrify");
            commands.insert("gifsicle", "gifsicle");
            (commands, "which")
        };

        Self {
            commands,
            which_command,
        }
    }

    /// Get the platform-specific command name
    pub fn get_command<'a>(&self, base_name: &'a str) -> &'a str {
        self.commands.get(base_name).unwrap_or(&base_name)
    }

    /// Check if a command is available on the system
    pub async fn is_command_available(&self, base_name: &str) -> bool {
        let command_name = self.get_command(base_name);

        let result = tokio::process::Command::new(self.which_command)
            .arg(command_name)
            .output()
            .await;

        match result {
            Ok(output) => output.status.success(),
            Err(_) => false,
        }
    }

    /// Fail fast when a required external tool is missing
    pub async fn ensure_tools(&self, tools: &[&str]) -> Result<(), PipelineError> {
        for tool in tools {
            if !self.is_command_available(tool).await {
                return Err(PipelineError::MissingDependency(format!(
                    "{} is required but was not found on PATH",
                    tool
                )));
            }
        }
        Ok(())
    }
}
