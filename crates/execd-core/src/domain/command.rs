//! Process start commands.

use serde::{Deserialize, Serialize};

use crate::ports::ProcessError;

/// A command to launch under supervision.
///
/// `type_tag` is opaque classification metadata supplied by the caller; it is
/// carried through to process snapshots and never interpreted by the runtime.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Command {
    /// Human-readable command name.
    pub name: String,
    /// Shell command line to execute.
    pub command_line: String,
    /// Opaque classification tag.
    #[serde(rename = "type")]
    pub type_tag: String,
}

impl Command {
    pub fn new(name: impl Into<String>, command_line: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            command_line: command_line.into(),
            type_tag: String::new(),
        }
    }

    /// Set the classification tag.
    #[must_use]
    pub fn with_type(mut self, type_tag: impl Into<String>) -> Self {
        self.type_tag = type_tag.into();
        self
    }

    /// Reject commands that cannot be started.
    ///
    /// Validation happens before any side effect: an invalid command spawns
    /// nothing and registers nothing.
    pub fn validate(&self) -> Result<(), ProcessError> {
        if self.name.is_empty() {
            return Err(ProcessError::InvalidCommand("command name required".into()));
        }
        if self.command_line.is_empty() {
            return Err(ProcessError::InvalidCommand("command line required".into()));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn validate_accepts_complete_command() {
        let command = Command::new("list", "ls -al").with_type("maven");
        assert!(command.validate().is_ok());
    }

    #[test]
    fn validate_rejects_empty_name() {
        let command = Command::new("", "ls -al");
        assert!(matches!(
            command.validate(),
            Err(ProcessError::InvalidCommand(m)) if m.contains("name")
        ));
    }

    #[test]
    fn validate_rejects_empty_command_line() {
        let command = Command::new("list", "");
        assert!(matches!(
            command.validate(),
            Err(ProcessError::InvalidCommand(m)) if m.contains("command line")
        ));
    }

    #[test]
    fn deserializes_from_wire_shape() {
        let command: Command =
            serde_json::from_str(r#"{"name":"build","commandLine":"make all","type":"ci"}"#)
                .unwrap();
        assert_eq!(command.name, "build");
        assert_eq!(command.command_line, "make all");
        assert_eq!(command.type_tag, "ci");
    }
}
