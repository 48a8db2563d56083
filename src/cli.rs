use std::ffi::OsString;
use std::path::PathBuf;

use clap::error::ErrorKind;
use clap::Parser;

/// MCP Shell Server - a server for executing shell commands
#[derive(Debug, Default, Parser)]
#[command(name = "mcp-shell", version, about)]
pub struct Cli {
    /// Path to the shell used to run commands
    #[arg(short, long, value_name = "PATH")]
    pub shell: Option<String>,

    /// Default working directory for commands (must be under $HOME)
    #[arg(short, long, value_name = "PATH")]
    pub working_dir: Option<PathBuf>,

    /// Kill commands that run longer than this many milliseconds
    #[arg(long, value_name = "MS")]
    pub timeout_ms: Option<u64>,

    /// File that receives the JSON diagnostic log [default: ./mcp-shell.log]
    #[arg(long, value_name = "PATH")]
    pub log_file: Option<PathBuf>,
}

impl Cli {
    /// Parse the process arguments without ever aborting on bad input.
    ///
    /// Returns the default (empty) options alongside the parser's message when
    /// the arguments are malformed, so configuration can fall through to the
    /// environment and platform defaults. `--help` and `--version` still print
    /// and exit.
    pub fn parse_lenient() -> (Self, Option<String>) {
        Self::parse_lenient_from(std::env::args_os())
    }

    pub fn parse_lenient_from<I, T>(args: I) -> (Self, Option<String>)
    where
        I: IntoIterator<Item = T>,
        T: Into<OsString> + Clone,
    {
        match Self::try_parse_from(args) {
            Ok(cli) => (cli, None),
            Err(e) => match e.kind() {
                ErrorKind::DisplayHelp
                | ErrorKind::DisplayVersion
                | ErrorKind::DisplayHelpOnMissingArgumentOrSubcommand => e.exit(),
                _ => (Self::default(), Some(e.to_string().trim_end().to_string())),
            },
        }
    }
}
