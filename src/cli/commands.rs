use clap::{Args, Parser, Subcommand};

#[derive(Parser)]
#[command(name = "fv", about = concat!("[#] feedvault v", env!("CARGO_PKG_VERSION"), " - your feed archive, tagged and local"), version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Commands>,

    /// Output as JSON
    #[arg(long, global = true)]
    pub json: bool,

    /// Run against a different data directory
    #[arg(short = 'C', long = "data-dir", global = true)]
    pub data_dir: Option<String>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Import a JSON archive, merging with existing tag annotations
    Import(ImportArgs),
    /// Export the full collection as indented JSON
    Export(ExportArgs),
    /// List posts, optionally filtered by tags
    List(ListArgs),
    /// List all tags in use
    Tags,
    /// Add or remove tags on a post
    Tag(TagArgs),
    /// Show collection statistics
    Stats,
}

#[derive(Args)]
pub struct ImportArgs {
    /// Archive file (a JSON array of posts)
    pub file: String,
}

#[derive(Args)]
pub struct ExportArgs {
    /// Output file; `-` for stdout (default: from vault.toml)
    pub file: Option<String>,
}

#[derive(Args)]
pub struct ListArgs {
    /// Only show posts carrying this tag (repeatable; OR semantics)
    #[arg(long = "tag")]
    pub tags: Vec<String>,
}

#[derive(Args)]
pub struct TagArgs {
    /// Post id
    pub id: String,
    /// Action: "add" or "rm"
    pub action: String,
    /// Tag text (trimmed on add)
    pub tag: String,
}
