use rmcp::schemars::{self, JsonSchema};
use serde::Deserialize;

use crate::security::{Validatable, ValidationError};

/// Request parameters for the shell_exec tool
#[derive(Debug, Clone, Deserialize, JsonSchema)]
pub struct ShellExecRequest {
    /// Command line handed to the configured shell
    pub command: String,

    /// Directory to run the command in. Must be under $HOME; defaults to the
    /// server's working directory.
    #[serde(default, rename = "workingDir", alias = "working_dir")]
    pub working_dir: Option<String>,
}

#[cfg(test)]
impl ShellExecRequest {
    pub fn new(command: impl Into<String>) -> Self {
        Self {
            command: command.into(),
            working_dir: None,
        }
    }

    pub fn in_dir(mut self, dir: impl Into<String>) -> Self {
        self.working_dir = Some(dir.into());
        self
    }
}

impl Validatable for ShellExecRequest {
    fn validate(&self) -> Result<(), ValidationError> {
        if self.command.trim().is_empty() {
            return Err(ValidationError::EmptyCommand);
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_deserialize_with_working_dir() {
        let json = r#"{"command": "ls -la", "workingDir": "/home/user"}"#;
        let req: ShellExecRequest = serde_json::from_str(json).unwrap();
        assert_eq!(req.command, "ls -la");
        assert_eq!(req.working_dir.as_deref(), Some("/home/user"));
    }

    #[test]
    fn test_deserialize_snake_case_alias() {
        let json = r#"{"command": "pwd", "working_dir": "src"}"#;
        let req: ShellExecRequest = serde_json::from_str(json).unwrap();
        assert_eq!(req.working_dir.as_deref(), Some("src"));
    }

    #[test]
    fn test_deserialize_minimal() {
        let req: ShellExecRequest = serde_json::from_str(r#"{"command": "pwd"}"#).unwrap();
        assert_eq!(req.working_dir, None);
    }

    #[test]
    fn test_deserialize_requires_command() {
        assert!(serde_json::from_str::<ShellExecRequest>(r#"{"workingDir": "/tmp"}"#).is_err());
    }

    #[test]
    fn test_validate_rejects_empty_command() {
        assert_eq!(ShellExecRequest::new("").validate(), Err(ValidationError::EmptyCommand));
        assert_eq!(ShellExecRequest::new("  \n").validate(), Err(ValidationError::EmptyCommand));
    }

    #[test]
    fn test_validate_accepts_command() {
        assert!(ShellExecRequest::new("echo hello | tr a-z A-Z").validate().is_ok());
    }

    #[test]
    fn test_schema_uses_camel_case_working_dir() {
        let schema = serde_json::to_value(schemars::schema_for!(ShellExecRequest)).unwrap();
        let properties = &schema["properties"];
        assert!(properties.get("command").is_some());
        assert!(properties.get("workingDir").is_some());
    }
}
