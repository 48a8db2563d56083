use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::cli::Cli;

/// Default shell on Unix-like platforms
const UNIX_DEFAULT_SHELL: &str = "/bin/bash";

/// Default shell on Windows
const WINDOWS_DEFAULT_SHELL: &str = "cmd.exe";

/// Platform family, as far as shell selection is concerned
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Platform {
    Windows,
    Unix,
}

impl Platform {
    pub fn current() -> Self {
        Self::from_os(std::env::consts::OS)
    }

    pub fn from_os(os: &str) -> Self {
        if os == "windows" {
            Platform::Windows
        } else {
            Platform::Unix
        }
    }

    fn default_shell(self) -> &'static str {
        match self {
            Platform::Windows => WINDOWS_DEFAULT_SHELL,
            Platform::Unix => UNIX_DEFAULT_SHELL,
        }
    }
}

/// Shell and directory settings resolved once at startup.
///
/// Shared read-only by every execution request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ShellConfig {
    pub shell_path: String,
    pub default_working_dir: Option<PathBuf>,
    pub timeout: Option<Duration>,
}

impl ShellConfig {
    #[cfg(test)]
    pub fn new(shell_path: impl Into<String>) -> Self {
        Self {
            shell_path: shell_path.into(),
            default_working_dir: None,
            timeout: None,
        }
    }

    #[cfg(test)]
    pub fn with_working_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.default_working_dir = Some(dir.into());
        self
    }

    /// Resolve from command-line options, the `SHELL` variable and the
    /// platform defaults. Reads no files: a missing shell binary surfaces as a
    /// launch failure on the first command.
    pub fn from_env(cli: &Cli) -> Self {
        let env_shell = std::env::var("SHELL").ok();
        Self {
            shell_path: resolve_shell(cli.shell.as_deref(), env_shell.as_deref(), Platform::current()),
            default_working_dir: resolve_working_dir(cli.working_dir.as_deref(), dirs::home_dir()),
            timeout: cli.timeout_ms.map(Duration::from_millis),
        }
    }

    /// The flag that makes the configured shell interpret a command string
    pub fn shell_flag(&self) -> &'static str {
        let name = Path::new(&self.shell_path)
            .file_stem()
            .map(|s| s.to_string_lossy().to_ascii_lowercase());
        match name.as_deref() {
            Some("cmd") => "/C",
            _ => "-c",
        }
    }
}

/// Explicit flag, then a non-empty `SHELL`, then the platform default
pub fn resolve_shell(flag: Option<&str>, env_shell: Option<&str>, platform: Platform) -> String {
    flag.filter(|s| !s.is_empty())
        .or_else(|| env_shell.filter(|s| !s.is_empty()))
        .unwrap_or_else(|| platform.default_shell())
        .to_string()
}

/// Explicit flag, then the user's home directory
pub fn resolve_working_dir(flag: Option<&Path>, home: Option<PathBuf>) -> Option<PathBuf> {
    match flag {
        Some(dir) if !dir.as_os_str().is_empty() => Some(dir.to_path_buf()),
        _ => home,
    }
}
