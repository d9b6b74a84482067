//! CLI command definitions and dispatch.

pub mod file;
pub mod folder;
pub mod tree;

use std::sync::Arc;

use clap::{Parser, Subcommand};
use tracing::debug;

use leaddocs_client::{DocumentsApi, HttpDocumentsApi, InMemoryDocumentsApi};
use leaddocs_core::config::AppConfig;
use leaddocs_core::error::AppError;
use leaddocs_core::types::LeadId;
use leaddocs_entity::document::{DocumentStructure, FileEntry, Folder};
use leaddocs_store::{DirectorySaver, DocumentStore};

use crate::output::{self, OutputFormat};

/// LeadDocs: browse and edit the documents attached to a CRM lead
#[derive(Debug, Parser)]
#[command(name = "leaddocs", version, about, long_about = None)]
pub struct Cli {
    /// Configuration overlay to load from `config/{env}.toml`
    #[arg(short, long, default_value = "development")]
    pub env: String,

    /// Output format
    #[arg(short, long, value_enum, default_value = "table")]
    pub format: OutputFormat,

    /// Lead whose documents to operate on
    #[arg(short, long)]
    pub lead: LeadId,

    /// Work against a built-in sample tree instead of the Documents API.
    /// Changes are not kept between runs.
    #[arg(long)]
    pub offline: bool,

    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Commands,
}

/// Top-level commands
#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Show the document tree
    Tree(tree::TreeArgs),
    /// Show the server's document statistics
    Stats,
    /// Create a folder
    Mkdir(folder::MkdirArgs),
    /// Delete a folder and everything in it
    Rmdir(folder::RmdirArgs),
    /// Upload local files
    Upload(file::UploadArgs),
    /// Delete a file
    Rm(file::RmArgs),
    /// Download a file into the configured downloads directory
    Download(file::DownloadArgs),
    /// Move a file to another folder
    Mv(file::MvArgs),
}

impl Cli {
    /// Execute the CLI command
    pub async fn execute(&self, config: AppConfig) -> Result<(), AppError> {
        let session = Session::open(self, &config).await?;

        match &self.command {
            Commands::Tree(args) => tree::show_tree(&session, args).await,
            Commands::Stats => tree::show_stats(&session).await,
            Commands::Mkdir(args) => folder::mkdir(&session, args).await,
            Commands::Rmdir(args) => folder::rmdir(&session, args).await,
            Commands::Upload(args) => file::upload(&session, args).await,
            Commands::Rm(args) => file::rm(&session, args).await,
            Commands::Download(args) => file::download(&session, args).await,
            Commands::Mv(args) => file::mv(&session, args).await,
        }
    }
}

/// One lead's store plus the output settings for a single invocation.
pub struct Session {
    pub store: DocumentStore,
    pub lead_id: LeadId,
    pub format: OutputFormat,
}

impl Session {
    async fn open(cli: &Cli, config: &AppConfig) -> Result<Self, AppError> {
        let api: Arc<dyn DocumentsApi> = if cli.offline {
            debug!(lead_id = %cli.lead, "Using the offline sample backend");
            Arc::new(sample_backend(&cli.lead).await)
        } else {
            Arc::new(HttpDocumentsApi::new(&config.api)?)
        };
        let saver = Arc::new(DirectorySaver::new(&config.downloads.directory));

        Ok(Self {
            store: DocumentStore::new(api, saver),
            lead_id: cli.lead.clone(),
            format: cli.format,
        })
    }

    /// Fetch the lead's tree, failing the command if the fetch failed.
    pub async fn load(&self) -> Result<Arc<DocumentStructure>, AppError> {
        let tree = self.store.fetch_documents(&self.lead_id).await;
        self.check()?;
        tree.ok_or_else(|| AppError::internal("No documents loaded"))
    }

    /// Turn an error recorded by the store into a command failure.
    pub fn check(&self) -> Result<(), AppError> {
        match self.store.error() {
            Some(message) => Err(AppError::external_service(message)),
            None => Ok(()),
        }
    }

    /// Finish a mutating command: report success and the running totals.
    pub fn done(&self, message: &str) -> Result<(), AppError> {
        self.check()?;

        let Some(tree) = self.store.documents() else {
            output::print_success(message);
            return Ok(());
        };

        match self.format {
            OutputFormat::Json => output::print_json(&serde_json::json!({
                "message": message,
                "totalFiles": tree.total_files,
                "totalFolders": tree.total_folders,
                "totalSize": tree.total_size,
            })),
            OutputFormat::Table => {
                output::print_success(message);
                output::print_kv("Files", &tree.total_files.to_string());
                output::print_kv("Folders", &tree.total_folders.to_string());
                output::print_kv("Size", &output::human_size(tree.total_size));
            }
        }
        Ok(())
    }
}

/// Backend for `--offline`, seeded with a small tree for the lead.
async fn sample_backend(lead_id: &LeadId) -> InMemoryDocumentsApi {
    let api = InMemoryDocumentsApi::new();

    let contents: [(&str, &str, &[u8]); 4] = [
        ("file_intake", "intake-notes.txt", b"Met at the spring expo. Wants a pilot in Q3.\n"),
        ("file_msa", "msa-draft.pdf", b"%PDF-1.7 draft master services agreement\n"),
        ("file_msa_signed", "msa-signed.pdf", b"%PDF-1.7 signed master services agreement\n"),
        ("file_logo", "logo.png", b"\x89PNG\r\n\x1a\n"),
    ];
    let entry = |idx: usize| {
        let (id, name, data) = contents[idx];
        FileEntry::new(id, name, data.len() as u64)
    };

    let tree = DocumentStructure {
        files: vec![entry(0)],
        folders: vec![
            Folder::new("fld_contracts", "Contracts")
                .with_file(entry(1))
                .with_subfolder(Folder::new("fld_signed", "Signed").with_file(entry(2))),
            Folder::new("fld_branding", "Branding").with_file(entry(3)),
            Folder::new("fld_invoices", "Invoices"),
        ],
        ..DocumentStructure::default()
    };
    api.seed(lead_id, tree).await;

    for (id, _, data) in contents {
        api.put_content(&id.into(), data.to_vec()).await;
    }
    api
}
