use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

use crate::cli::commands::*;
use crate::cli::output::*;
use crate::io;
use crate::model::{Record, RecordId, VaultConfig};
use crate::ops::tags;
use crate::session::{ImportOutcome, Session};

// ---------------------------------------------------------------------------
// Dispatch
// ---------------------------------------------------------------------------

pub fn dispatch(cli: Cli) -> Result<(), Box<dyn std::error::Error>> {
    let json = cli.json;
    let data_dir = io::data_dir(cli.data_dir.as_deref().map(Path::new))?;
    let config = io::load_config(&data_dir)?;
    let db_path = data_dir.join(&config.store.file);

    match cli.command {
        None => unreachable!("no-subcommand launches the TUI from main"),
        Some(cmd) => match cmd {
            Commands::Import(args) => cmd_import(args, &db_path),
            Commands::Export(args) => cmd_export(args, &db_path, &config),
            Commands::List(args) => cmd_list(args, &db_path, json),
            Commands::Tags => cmd_tags(&db_path, json),
            Commands::Tag(args) => cmd_tag(args, &db_path),
            Commands::Stats => cmd_stats(&db_path, json),
        },
    }
}

// ---------------------------------------------------------------------------
// Commands
// ---------------------------------------------------------------------------

fn cmd_import(args: ImportArgs, db_path: &Path) -> Result<(), Box<dyn std::error::Error>> {
    let bytes = fs::read(&args.file)
        .map_err(|e| format!("could not read {}: {}", args.file, e))?;

    let mut session = Session::open(db_path)?;
    match session.import_bytes(&bytes)? {
        ImportOutcome::Imported { count, skipped } => {
            println!("imported {} posts", count);
            if skipped > 0 {
                eprintln!("warning: skipped {} elements without a usable id", skipped);
            }
        }
        ImportOutcome::NotAnArray => {
            eprintln!("warning: {} is not a JSON array; nothing imported", args.file);
        }
    }
    Ok(())
}

fn cmd_export(
    args: ExportArgs,
    db_path: &Path,
    config: &VaultConfig,
) -> Result<(), Box<dyn std::error::Error>> {
    let session = Session::open(db_path)?;
    let bytes = session.export_json()?;

    let target = args.file.unwrap_or_else(|| config.export.file.clone());
    if target == "-" {
        std::io::stdout().write_all(&bytes)?;
        println!();
    } else {
        fs::write(&target, &bytes)?;
        println!("exported {} posts to {}", session.post_count(), target);
    }
    Ok(())
}

fn cmd_list(args: ListArgs, db_path: &Path, json: bool) -> Result<(), Box<dyn std::error::Error>> {
    let mut session = Session::open(db_path)?;
    session.set_selected_tags(args.tags.into_iter().collect());
    let view = session.current_view();

    if json {
        let out = ListJson {
            count: view.len(),
            posts: view.iter().map(PostJson::from).collect(),
        };
        println!("{}", serde_json::to_string_pretty(&out)?);
    } else if view.is_empty() {
        println!("no posts");
    } else {
        for record in &view {
            print_post(record);
        }
        println!("{} post{}", view.len(), if view.len() == 1 { "" } else { "s" });
    }
    Ok(())
}

fn cmd_tags(db_path: &Path, json: bool) -> Result<(), Box<dyn std::error::Error>> {
    let session = Session::open(db_path)?;
    let tags: Vec<String> = session.available_tags().into_iter().collect();

    if json {
        println!("{}", serde_json::to_string_pretty(&TagsJson { tags })?);
    } else if tags.is_empty() {
        println!("no tags");
    } else {
        for tag in &tags {
            println!("#{}", tag);
        }
    }
    Ok(())
}

fn cmd_tag(args: TagArgs, db_path: &Path) -> Result<(), Box<dyn std::error::Error>> {
    let mut session = Session::open(db_path)?;
    let id = resolve_id(session.collection(), &args.id)
        .ok_or_else(|| format!("post not found: {}", args.id))?;

    match args.action.as_str() {
        "add" => {
            if session.add_tag(&id, &args.tag)? {
                println!("added #{} to {}", args.tag.trim(), id);
            } else {
                eprintln!("warning: empty tag; nothing added");
            }
        }
        "rm" => {
            if session.remove_tag(&id, &args.tag)? {
                println!("removed #{} from {}", args.tag, id);
            } else {
                println!("no tag #{} on {}", args.tag, id);
            }
        }
        other => return Err(format!("unknown action '{}' (use add or rm)", other).into()),
    }
    Ok(())
}

fn cmd_stats(db_path: &Path, json: bool) -> Result<(), Box<dyn std::error::Error>> {
    let session = Session::open(db_path)?;
    let collection = session.collection();
    let with_media = collection.iter().filter(|r| r.has_media()).count();
    let media_items: usize = collection.iter().map(|r| r.media.len()).sum();
    let distinct_tags = tags::derive_tags(collection).len();
    let last_import = session.last_import()?;

    if json {
        let out = StatsJson {
            posts: collection.len(),
            with_media,
            media_items,
            distinct_tags,
            last_import: last_import.map(|t| t.to_rfc3339()),
        };
        println!("{}", serde_json::to_string_pretty(&out)?);
    } else {
        println!("posts:         {}", collection.len());
        println!("with media:    {}", with_media);
        println!("media items:   {}", media_items);
        println!("distinct tags: {}", distinct_tags);
        if let Some(at) = last_import {
            println!("last import:   {}", at.format("%Y-%m-%d %H:%M UTC"));
        }
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

/// Resolve a CLI id argument against the collection. A numeric argument is
/// tried as a numeric id first, then as text (ids like `42` and `"42"` are
/// distinct keys in the store).
fn resolve_id(collection: &[Record], arg: &str) -> Option<RecordId> {
    if let Ok(n) = arg.parse::<u64>() {
        let id = RecordId::Int(n);
        if collection.iter().any(|r| r.id == id) {
            return Some(id);
        }
    }
    let id = RecordId::Text(arg.to_string());
    collection.iter().any(|r| r.id == id).then_some(id)
}

/// Data directory for this invocation (used by main for the TUI path too)
pub fn resolve_data_dir(override_dir: Option<&str>) -> Result<PathBuf, Box<dyn std::error::Error>> {
    Ok(io::data_dir(override_dir.map(Path::new))?)
}
