//! Read-only commands: the document tree and the server's statistics.

use clap::Args;
use serde::Serialize;
use tabled::Tabled;

use leaddocs_core::error::AppError;
use leaddocs_entity::document::{DocumentStructure, FileEntry, Folder};

use super::Session;
use crate::output::{self, OutputFormat};

/// Arguments for the tree command
#[derive(Debug, Args)]
pub struct TreeArgs {
    /// Hide entries nested deeper than this (0 shows the root level only)
    #[arg(short, long)]
    pub depth: Option<usize>,
}

/// One line of the flattened tree
#[derive(Debug, Serialize, Tabled)]
struct EntryRow {
    /// Path from the root
    path: String,
    /// "folder" or "file"
    kind: &'static str,
    /// Entry ID
    id: String,
    /// Size
    size: String,
    /// Upload time, files only
    uploaded: String,
}

/// File count per extension
#[derive(Debug, Serialize, Tabled)]
struct TypeRow {
    extension: String,
    files: u64,
}

/// Print the lead's tree.
pub async fn show_tree(session: &Session, args: &TreeArgs) -> Result<(), AppError> {
    let tree = session.load().await?;

    match session.format {
        OutputFormat::Json => output::print_json(tree.as_ref()),
        OutputFormat::Table => {
            output::print_list(&flatten(&tree, args.depth), OutputFormat::Table);
            println!(
                "{} files, {} folders, {}",
                tree.total_files,
                tree.total_folders,
                output::human_size(tree.total_size)
            );
        }
    }
    Ok(())
}

/// Print the statistics the server computes for the lead.
pub async fn show_stats(session: &Session) -> Result<(), AppError> {
    let stats = session.store.fetch_stats(&session.lead_id).await;
    session.check()?;
    let stats = stats.unwrap_or_default();

    match session.format {
        OutputFormat::Json => output::print_json(&stats),
        OutputFormat::Table => {
            println!("Documents for lead {}", session.lead_id);
            output::print_kv("Files", &stats.total_files.to_string());
            output::print_kv("Folders", &stats.total_folders.to_string());
            output::print_kv("Size", &output::human_size(stats.total_size));
            output::print_kv(
                "Last upload",
                &stats
                    .last_upload_at
                    .map(|t| t.format("%Y-%m-%d %H:%M").to_string())
                    .unwrap_or_else(|| "never".to_string()),
            );

            let rows: Vec<TypeRow> = stats
                .file_types
                .iter()
                .map(|(extension, files)| TypeRow {
                    extension: extension.clone(),
                    files: *files,
                })
                .collect();
            if !rows.is_empty() {
                println!();
                output::print_list(&rows, OutputFormat::Table);
            }
        }
    }
    Ok(())
}

/// Depth-first rows: root files, then each folder followed by its contents.
fn flatten(tree: &DocumentStructure, max_depth: Option<usize>) -> Vec<EntryRow> {
    let mut rows: Vec<EntryRow> = tree.files.iter().map(|f| file_row("", f)).collect();
    for folder in &tree.folders {
        push_folder(&mut rows, "", folder, 0, max_depth);
    }
    rows
}

fn push_folder(
    rows: &mut Vec<EntryRow>,
    parent: &str,
    folder: &Folder,
    depth: usize,
    max_depth: Option<usize>,
) {
    if max_depth.is_some_and(|max| depth > max) {
        return;
    }

    let path = format!("{}/{}", parent, folder.name);
    rows.push(EntryRow {
        path: format!("{}/", path),
        kind: "folder",
        id: folder.id.to_string(),
        size: output::human_size(folder.total_size),
        uploaded: String::new(),
    });

    if max_depth.is_some_and(|max| depth + 1 > max) {
        return;
    }
    rows.extend(folder.files.iter().map(|f| file_row(&path, f)));
    for sub in &folder.subfolders {
        push_folder(rows, &path, sub, depth + 1, max_depth);
    }
}

fn file_row(parent: &str, file: &FileEntry) -> EntryRow {
    EntryRow {
        path: format!("{}/{}", parent, file.name),
        kind: "file",
        id: file.id.to_string(),
        size: output::human_size(file.size),
        uploaded: file.uploaded_at.format("%Y-%m-%d %H:%M").to_string(),
    }
}
