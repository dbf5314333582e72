//! CLI argument parsing.
//!
//! The CLI is a thin, non-interactive wrapper: records arrive as a JSON
//! manifest and every decision about the document lives in the library.
use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

/// Root CLI entrypoint.
#[derive(Parser, Debug)]
#[command(
    name = "agent-embed",
    version,
    about = "Keep generated SKILLS and COMMANDS sections inside a hand-edited markdown file",
    after_help = "Examples:\n  agent-embed embed --target CLAUDE.md --records records.json\n  agent-embed embed --target CLAUDE.md --records records.json --dry-run\n  agent-embed list --target CLAUDE.md --json\n  agent-embed unembed --target CLAUDE.md --skill review\n  agent-embed backups --target CLAUDE.md\n  agent-embed restore --target CLAUDE.md --latest\n  agent-embed cleanup --retention-days 14",
    subcommand_required = true,
    arg_required_else_help = true
)]
pub struct RootArgs {
    #[command(flatten)]
    pub global: GlobalArgs,

    #[command(subcommand)]
    pub command: Command,
}

/// Flags shared by every command.
#[derive(Args, Debug, Clone)]
pub struct GlobalArgs {
    /// Config file (default: ./.agent-embed.json when present)
    #[arg(long, value_name = "PATH", global = true)]
    pub config: Option<PathBuf>,

    /// Backup directory, overriding the config
    #[arg(long, value_name = "DIR", global = true)]
    pub backup_dir: Option<PathBuf>,

    /// Log engine decisions to stderr
    #[arg(long, global = true)]
    pub verbose: bool,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    Embed(EmbedArgs),
    Unembed(UnembedArgs),
    List(ListArgs),
    Export(ExportArgs),
    Validate(ValidateArgs),
    Backups(BackupsArgs),
    Restore(RestoreArgs),
    Cleanup(CleanupArgs),
}

#[derive(Parser, Debug)]
#[command(about = "Regenerate the embedded sections of a document from a record manifest")]
pub struct EmbedArgs {
    /// Document to update (created when missing)
    #[arg(long, value_name = "FILE")]
    pub target: PathBuf,

    /// Record manifest: {"skills": [...], "commands": [...]}
    #[arg(long, value_name = "JSON")]
    pub records: PathBuf,

    /// Print the merged document instead of writing it
    #[arg(long)]
    pub dry_run: bool,

    /// Skip post-write validation and rollback
    #[arg(long)]
    pub no_validate: bool,

    /// Emit machine-readable JSON output
    #[arg(long)]
    pub json: bool,
}

#[derive(Parser, Debug)]
#[command(about = "Remove embedded items from a document by name")]
pub struct UnembedArgs {
    #[arg(long, value_name = "FILE")]
    pub target: PathBuf,

    /// Skill to remove (repeatable)
    #[arg(long = "skill", value_name = "NAME")]
    pub skills: Vec<String>,

    /// Command to remove (repeatable)
    #[arg(long = "command", value_name = "NAME")]
    pub commands: Vec<String>,

    /// Show what would be removed without writing
    #[arg(long)]
    pub dry_run: bool,

    #[arg(long)]
    pub json: bool,
}

#[derive(Parser, Debug)]
#[command(about = "List the items embedded in a document")]
pub struct ListArgs {
    #[arg(long, value_name = "FILE")]
    pub target: PathBuf,

    #[arg(long)]
    pub json: bool,
}

#[derive(Parser, Debug)]
#[command(about = "Write records to a standalone document")]
pub struct ExportArgs {
    #[arg(long, value_name = "JSON")]
    pub records: PathBuf,

    /// Output document
    #[arg(long, value_name = "FILE")]
    pub out: PathBuf,
}

#[derive(Parser, Debug)]
#[command(about = "Check a document's markdown structure and embedded sections")]
pub struct ValidateArgs {
    #[arg(long, value_name = "FILE")]
    pub target: PathBuf,

    #[arg(long)]
    pub json: bool,
}

#[derive(Parser, Debug)]
#[command(about = "List backups of a document, newest first")]
pub struct BackupsArgs {
    #[arg(long, value_name = "FILE")]
    pub target: PathBuf,

    #[arg(long)]
    pub json: bool,
}

#[derive(Parser, Debug)]
#[command(about = "Restore a document from a backup")]
pub struct RestoreArgs {
    #[arg(long, value_name = "FILE")]
    pub target: PathBuf,

    /// Backup file to restore
    #[arg(long, value_name = "PATH", conflicts_with = "latest", required_unless_present = "latest")]
    pub backup: Option<PathBuf>,

    /// Restore the newest regular backup
    #[arg(long)]
    pub latest: bool,
}

#[derive(Parser, Debug)]
#[command(about = "Delete backups older than the retention period")]
pub struct CleanupArgs {
    /// Retention period, overriding the config
    #[arg(long, value_name = "DAYS", value_parser = clap::value_parser!(u32).range(1..))]
    pub retention_days: Option<u32>,

    #[arg(long)]
    pub json: bool,
}
