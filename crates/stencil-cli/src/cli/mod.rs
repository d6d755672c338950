//! CLI argument definitions using the clap derive API.
//!
//! This module is the *only* place that knows about argument names, aliases,
//! help text, and value enums.  No business logic lives here.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand, ValueEnum};

pub mod global;
pub use global::{GlobalArgs, OutputFormat};

// ── Top-level CLI ─────────────────────────────────────────────────────────────

/// Main CLI entry-point.
#[derive(Debug, Parser)]
#[command(
    name    = "stencil",
    bin_name = "stencil",
    version  = env!("CARGO_PKG_VERSION"),
    author   = env!("CARGO_PKG_AUTHORS"),
    about    = "Interactive file templates for your workspace",
    long_about = "Stencil creates files from templates kept in your workspace. \
                  Templates can ask questions while they render and the \
                  catalog follows the template folder as it changes.",
    after_help = "EXAMPLES:\n\
        \x20 stencil new src/button.tsx --template component.tsx\n\
        \x20 stencil new README.md -t readme.md --set license=MIT\n\
        \x20 stencil list --format tree\n\
        \x20 stencil watch -w ./app -w ./lib",
    arg_required_else_help = true,
    subcommand_required    = true,
)]
pub struct Cli {
    /// Flags available on every subcommand.
    #[command(flatten)]
    pub global: GlobalArgs,

    /// Subcommand to execute.
    #[command(subcommand)]
    pub command: Commands,
}

// ── Subcommands ───────────────────────────────────────────────────────────────

/// All available subcommands.
#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Create a file from a template.
    #[command(
        visible_alias = "n",
        about = "Create a file from a template",
        after_help = "EXAMPLES:\n\
            \x20 stencil new src/app.rs                      # pick a template\n\
            \x20 stencil new src/app.rs -t module.rs --yes\n\
            \x20 stencil new notes.md -t note.md --set doTests=no --dry-run"
    )]
    New(NewArgs),

    /// List the template catalog.
    #[command(
        visible_alias = "ls",
        about = "List available templates",
        after_help = "EXAMPLES:\n\
            \x20 stencil list\n\
            \x20 stencil list --format json\n\
            \x20 stencil list -w ./app -w ./lib --format tree"
    )]
    List(ListArgs),

    /// Keep the catalog live and print it on every change.
    #[command(
        about = "Watch the template catalog",
        after_help = "EXAMPLES:\n\
            \x20 stencil watch\n\
            \x20 stencil watch -w ./app -w ./lib"
    )]
    Watch(WatchArgs),

    /// Manage template files.
    #[command(
        visible_alias = "t",
        about = "Create, rename, delete or show templates",
        subcommand,
        after_help = "EXAMPLES:\n\
            \x20 stencil template create component.tsx\n\
            \x20 stencil template rename component.tsx widget.tsx\n\
            \x20 stencil template show widget.tsx"
    )]
    Template(TemplateCommands),

    /// Initialise a Stencil configuration and catalog.
    #[command(
        about = "Initialise configuration",
        after_help = "EXAMPLES:\n\
            \x20 stencil init           # .stencil/ in the workspace\n\
            \x20 stencil init --global  # user configuration file"
    )]
    Init(InitArgs),

    /// Generate shell completion scripts.
    #[command(
        about = "Generate shell completions",
        after_help = "EXAMPLES:\n\
            \x20 stencil completions bash > ~/.local/share/bash-completion/completions/stencil\n\
            \x20 stencil completions zsh  > ~/.zfunc/_stencil\n\
            \x20 stencil completions fish > ~/.config/fish/completions/stencil.fish"
    )]
    Completions(CompletionsArgs),

    /// Inspect the Stencil configuration.
    #[command(
        about = "Configuration management",
        subcommand,
        after_help = "EXAMPLES:\n\
            \x20 stencil config get catalog.extension\n\
            \x20 stencil config list\n\
            \x20 stencil config path"
    )]
    Config(ConfigCommands),
}

// ── new ───────────────────────────────────────────────────────────────────────

/// Arguments for `stencil new`.
#[derive(Debug, Args)]
pub struct NewArgs {
    /// File to create.
    #[arg(value_name = "TARGET", help = "Path of the file to create")]
    pub target: PathBuf,

    /// Template name (with or without its extension).
    #[arg(
        short = 't',
        long = "template",
        value_name = "NAME",
        help = "Template to use (asked for if omitted)"
    )]
    pub template: Option<String>,

    /// Pre-answered questions.
    #[arg(
        short = 's',
        long = "set",
        value_name = "KEY=VALUE",
        value_parser = parse_assignment,
        help = "Answer a template question up front (repeatable)"
    )]
    pub set: Vec<(String, String)>,

    /// Never ask; unanswered questions fall back to defaults or fail.
    #[arg(
        short = 'y',
        long = "yes",
        help = "Do not ask anything; use --set values and defaults"
    )]
    pub yes: bool,

    /// Overwrite an existing file.
    #[arg(long = "force", help = "Overwrite the target if it exists")]
    pub force: bool,

    /// Print the rendered file instead of writing it.
    #[arg(long = "dry-run", help = "Print the result without writing it")]
    pub dry_run: bool,
}

/// Parse `KEY=VALUE`.
pub fn parse_assignment(raw: &str) -> Result<(String, String), String> {
    match raw.split_once('=') {
        Some((key, value)) if !key.trim().is_empty() => {
            Ok((key.trim().to_string(), value.to_string()))
        }
        _ => Err(format!("expected KEY=VALUE, got '{raw}'")),
    }
}

// ── list ──────────────────────────────────────────────────────────────────────

/// Arguments for `stencil list`.
#[derive(Debug, Args)]
pub struct ListArgs {
    /// Output format.
    #[arg(
        long = "format",
        value_enum,
        default_value = "tree",
        help = "Output format"
    )]
    pub format: ListFormat,
}

/// Output format for the `list` command.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum ListFormat {
    /// Workspaces with their templates underneath.
    Tree,
    /// One template name per line.
    List,
    /// JSON array.
    Json,
}

// ── watch ─────────────────────────────────────────────────────────────────────

/// Arguments for `stencil watch`.
#[derive(Debug, Args)]
pub struct WatchArgs {
    /// Print only the changed workspace instead of the whole tree.
    #[arg(long = "changes-only", help = "Print only what changed")]
    pub changes_only: bool,
}

// ── template ──────────────────────────────────────────────────────────────────

/// Subcommands for `stencil template`.
#[derive(Debug, Subcommand)]
pub enum TemplateCommands {
    /// Create a template in the catalog directory.
    Create {
        /// Template name without the template extension, e.g. `component.tsx`.
        name: String,
        /// Initial content.
        #[arg(long = "content", value_name = "TEXT", default_value = "")]
        content: String,
    },
    /// Rename a template.
    Rename {
        /// Current template name.
        name: String,
        /// New template name.
        new_name: String,
    },
    /// Delete a template.
    Delete {
        /// Template name.
        name: String,
    },
    /// Print a template's source.
    Show {
        /// Template name.
        name: String,
    },
}

// ── init ──────────────────────────────────────────────────────────────────────

/// Arguments for `stencil init`.
#[derive(Debug, Args)]
pub struct InitArgs {
    /// Write the user configuration file instead of the workspace one.
    #[arg(long = "global", help = "Create global configuration")]
    pub global: bool,

    /// Do not add the sample template.
    #[arg(long = "no-sample", help = "Skip the sample template")]
    pub no_sample: bool,

    /// Overwrite existing files.
    #[arg(short = 'f', long = "force", help = "Overwrite existing configuration")]
    pub force: bool,
}

// ── completions ───────────────────────────────────────────────────────────────

/// Arguments for `stencil completions`.
#[derive(Debug, Args)]
pub struct CompletionsArgs {
    /// Target shell.
    #[arg(value_enum, help = "Shell to generate completions for")]
    pub shell: Shell,
}

/// Supported shells for completion generation.
#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum Shell {
    Bash,
    Zsh,
    Fish,
    PowerShell,
    Elvish,
}

// ── config subcommands ────────────────────────────────────────────────────────

/// Subcommands for `stencil config`.
#[derive(Debug, Subcommand)]
pub enum ConfigCommands {
    /// Print the value of a configuration key.
    Get {
        /// Dotted key path, e.g. `catalog.extension`.
        key: String,
    },
    /// Print the effective configuration.
    List,
    /// Print the configuration files that are consulted.
    Path,
}

// ── tests ─────────────────────────────────────────────────────────────────────
