//! Global arguments that apply to every subcommand.
//!
//! Declared here and flattened into [`super::Cli`] so that `-v`, `-q`,
//! `-w`, etc. are available on any invocation without repetition.

use std::path::{Path, PathBuf};

use clap::Args;

/// Global arguments for all commands.
#[derive(Debug, Args)]
pub struct GlobalArgs {
    /// Increase logging verbosity.
    ///
    /// Pass once for INFO (`-v`), twice for DEBUG (`-vv`), three times for
    /// TRACE (`-vvv`).  Conflicts with `--quiet`.
    #[arg(
        short = 'v',
        long = "verbose",
        action = clap::ArgAction::Count,
        global = true,
        help = "Increase verbosity (-v, -vv, -vvv)",
        long_help = "Increase logging verbosity:
    (none)  - Only warnings and errors
    -v      - Info level (scan results, generated files)
    -vv     - Debug level (directives, watch events)
    -vvv    - Trace level (very verbose)"
    )]
    pub verbose: u8,

    /// Suppress all non-error output.
    #[arg(
        short = 'q',
        long = "quiet",
        global = true,
        conflicts_with = "verbose",
        help = "Suppress non-error output"
    )]
    pub quiet: bool,

    /// Disable ANSI colour codes.
    ///
    /// Automatically honoured when `NO_COLOR` is set in the environment
    /// (see <https://no-color.org>).
    #[arg(
        long = "no-color",
        global = true,
        env = "NO_COLOR",
        help = "Disable colored output"
    )]
    pub no_color: bool,

    /// Configuration file path, replacing the global config file.
    #[arg(
        short = 'c',
        long = "config",
        global = true,
        env = "STENCIL_CONFIG",
        value_name = "FILE",
        help = "Configuration file path"
    )]
    pub config: Option<PathBuf>,

    /// Workspace folders. Defaults to the current directory.
    #[arg(
        short = 'w',
        long = "workspace",
        global = true,
        value_name = "DIR",
        action = clap::ArgAction::Append,
        help = "Workspace folder (repeatable, default: current directory)"
    )]
    pub workspace: Vec<PathBuf>,

    /// Machine-readable output format.
    #[arg(
        long = "output-format",
        global = true,
        value_enum,
        default_value = "auto",
        help = "Output format"
    )]
    pub output_format: OutputFormat,
}

impl GlobalArgs {
    /// Workspace roots as absolute paths; the current directory if none given.
    pub fn workspaces(&self) -> std::io::Result<Vec<PathBuf>> {
        let cwd = std::env::current_dir()?;
        if self.workspace.is_empty() {
            return Ok(vec![cwd]);
        }
        Ok(self.workspace.iter().map(|w| absolute(&cwd, w)).collect())
    }

    /// The first workspace; its `.stencil/config.toml` joins the config layers.
    pub fn primary_workspace(&self) -> std::io::Result<PathBuf> {
        let mut workspaces = self.workspaces()?;
        Ok(workspaces.swap_remove(0))
    }
}

fn absolute(cwd: &Path, path: &Path) -> PathBuf {
    if path.is_absolute() {
        path.to_path_buf()
    } else {
        cwd.join(path)
    }
}

/// How the CLI should render its output.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, clap::ValueEnum)]
pub enum OutputFormat {
    /// Auto-detect based on terminal.
    #[default]
    Auto,
    /// Human-readable with colors.
    Human,
    /// Plain text without colors.
    Plain,
    /// JSON output.
    Json,
}
