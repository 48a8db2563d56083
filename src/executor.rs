use std::future::Future;
use std::io;
use std::path::PathBuf;
use std::process::{ExitStatus, Output, Stdio};
use std::sync::Arc;
use std::time::Duration;

use thiserror::Error;
use tokio::process::Command;
use tracing::{error, info, warn};

use crate::config::ShellConfig;
use crate::request::ShellExecRequest;
use crate::security::{ContainmentPolicy, Validatable};

/// Text returned when a successful command prints nothing
pub const NO_OUTPUT_MESSAGE: &str = "(Command executed successfully but produced no output)";

/// Result of a shell_exec request
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ExecutionOutcome {
    Success { stdout: String },
    Failure { message: String },
}

impl ExecutionOutcome {
    fn failure(message: impl Into<String>) -> Self {
        ExecutionOutcome::Failure {
            message: message.into(),
        }
    }
}

/// Why a shell process produced no exit status
#[derive(Debug, Error)]
pub enum LaunchError {
    #[error("Failed to execute command: {0}")]
    Io(#[source] io::Error),
    #[error("Command timed out after {}ms", .0.as_millis())]
    TimedOut(Duration),
}

/// A fully resolved shell invocation
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Invocation {
    pub shell: String,
    pub flag: &'static str,
    pub command: String,
    pub working_dir: Option<PathBuf>,
    pub timeout: Option<Duration>,
}

/// Starts shell processes and waits for them
pub trait Launcher: Send + Sync + 'static {
    fn launch(&self, invocation: Invocation) -> impl Future<Output = Result<Output, LaunchError>> + Send;
}

/// Runs invocations as real child processes on the tokio runtime
#[derive(Debug, Clone, Copy, Default)]
pub struct ShellLauncher;

impl Launcher for ShellLauncher {
    fn launch(&self, invocation: Invocation) -> impl Future<Output = Result<Output, LaunchError>> + Send {
        async move {
            let mut cmd = Command::new(&invocation.shell);
            cmd.arg(invocation.flag)
                .arg(&invocation.command)
                .stdin(Stdio::null())
                .kill_on_drop(true);
            if let Some(ref dir) = invocation.working_dir {
                cmd.current_dir(dir);
            }

            match invocation.timeout {
                // Dropping the output future on timeout kills the child
                Some(limit) => match tokio::time::timeout(limit, cmd.output()).await {
                    Ok(result) => result.map_err(LaunchError::Io),
                    Err(_) => Err(LaunchError::TimedOut(limit)),
                },
                None => cmd.output().await.map_err(LaunchError::Io),
            }
        }
    }
}

/// What happened to a launched process
#[derive(Debug)]
pub enum ProcessOutcome {
    Completed { stdout: String, stderr: String },
    NonZeroExit { status: ExitStatus, stdout: String, stderr: String },
    LaunchFailed(LaunchError),
}

impl ProcessOutcome {
    pub fn from_result(result: Result<Output, LaunchError>) -> Self {
        match result {
            Ok(output) => {
                let stdout = String::from_utf8_lossy(&output.stdout).into_owned();
                let stderr = String::from_utf8_lossy(&output.stderr).into_owned();
                if output.status.success() {
                    ProcessOutcome::Completed { stdout, stderr }
                } else {
                    ProcessOutcome::NonZeroExit {
                        status: output.status,
                        stdout,
                        stderr,
                    }
                }
            }
            Err(e) => ProcessOutcome::LaunchFailed(e),
        }
    }

    /// Collapse into the two-variant outcome. Failures prefer stderr, then
    /// stdout, then a description of the exit status or launch error.
    pub fn into_execution_outcome(self) -> ExecutionOutcome {
        match self {
            ProcessOutcome::Completed { stdout, .. } => {
                if stdout.is_empty() {
                    ExecutionOutcome::Success {
                        stdout: NO_OUTPUT_MESSAGE.to_string(),
                    }
                } else {
                    ExecutionOutcome::Success { stdout }
                }
            }
            ProcessOutcome::NonZeroExit { status, stdout, stderr } => {
                if !stderr.is_empty() {
                    ExecutionOutcome::failure(stderr)
                } else if !stdout.is_empty() {
                    ExecutionOutcome::failure(stdout)
                } else {
                    ExecutionOutcome::failure(format!("Command failed with {}", status))
                }
            }
            ProcessOutcome::LaunchFailed(e) => ExecutionOutcome::failure(e.to_string()),
        }
    }
}

/// Validates, confines and runs shell_exec requests
pub struct Gateway<L = ShellLauncher> {
    config: Arc<ShellConfig>,
    policy: ContainmentPolicy,
    launcher: L,
}

impl Gateway<ShellLauncher> {
    pub fn new(config: Arc<ShellConfig>) -> Self {
        Self::with_launcher(config, ContainmentPolicy::for_home(), ShellLauncher)
    }
}

impl<L: Launcher> Gateway<L> {
    pub fn with_launcher(config: Arc<ShellConfig>, policy: ContainmentPolicy, launcher: L) -> Self {
        Self {
            config,
            policy,
            launcher,
        }
    }

    /// The request's directory if given, otherwise the configured default
    fn effective_working_dir(&self, request: &ShellExecRequest) -> Option<PathBuf> {
        match request.working_dir.as_deref() {
            Some(dir) if !dir.is_empty() => Some(PathBuf::from(dir)),
            _ => self.config.default_working_dir.clone(),
        }
    }

    /// Run one request to completion.
    ///
    /// The containment check happens before any process is created; a denied
    /// directory never reaches the launcher.
    pub async fn execute(&self, request: &ShellExecRequest) -> ExecutionOutcome {
        if let Err(e) = request.validate() {
            return ExecutionOutcome::failure(e.to_string());
        }

        info!(command = %request.command, "Executing command");

        let working_dir = self.effective_working_dir(request);
        if let Some(ref dir) = working_dir {
            if let Err(e) = self.policy.check(dir) {
                error!(working_dir = %dir.display(), "Working directory must be under $HOME");
                return ExecutionOutcome::failure(e.to_string());
            }
        }

        let invocation = Invocation {
            shell: self.config.shell_path.clone(),
            flag: self.config.shell_flag(),
            command: request.command.clone(),
            working_dir,
            timeout: self.config.timeout,
        };

        let outcome = ProcessOutcome::from_result(self.launcher.launch(invocation).await);
        match &outcome {
            ProcessOutcome::Completed { stderr, .. } if !stderr.is_empty() => {
                warn!(stderr = %stderr, "Command warning");
            }
            ProcessOutcome::NonZeroExit { status, stdout, stderr } => {
                let detail = if stderr.is_empty() { stdout } else { stderr };
                error!(%status, output = %detail, "Command execution error");
            }
            ProcessOutcome::LaunchFailed(e) => {
                error!(shell = %self.config.shell_path, error = %e, "Command execution error");
            }
            ProcessOutcome::Completed { .. } => {}
        }
        outcome.into_execution_outcome()
    }

    /// Run a request on its own task so a panic inside the gateway comes back
    /// as a failure instead of tearing down the server
    pub async fn execute_isolated(self: &Arc<Self>, request: ShellExecRequest) -> ExecutionOutcome {
        let gateway = Arc::clone(self);
        match tokio::spawn(async move { gateway.execute(&request).await }).await {
            Ok(outcome) => outcome,
            Err(e) => {
                error!(error = %e, "Unexpected error");
                ExecutionOutcome::failure(format!("Error: {}", e))
            }
        }
    }
}
