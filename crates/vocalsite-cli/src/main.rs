//! Vocalsite - build a small website by speaking to it
//!
//! Thin shell over vocalsite-core:
//! - Buffers live as three plain files in the project directory
//! - The preview sandbox renders into `.vocalsite/preview.html`
//! - Version history persists in `.vocalsite/versions.db`
//! - `generate` sends a typed instruction through the generation workflow
//!   (standing in for the speech transcript)

use anyhow::{anyhow, Result};
use clap::{Parser, Subcommand};

use vocalsite_core::{
    compose, export, GenerationClient, GenerationRequest, HttpGenerationClient, SpeechSource,
    SqliteStore, Studio,
};

mod project;

use project::{BrowserViewer, FileSandbox, Project};

/// Vocalsite - voice-driven website studio
#[derive(Parser)]
#[command(name = "vocalsite")]
#[command(about = "Build a small website by speaking to it", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Project directory (defaults to current)
    #[arg(short, long, default_value = ".")]
    project: String,
}

#[derive(Subcommand)]
enum Commands {
    /// Seed a new project with default markup, style and script files
    Init,

    /// Compose the three buffers into one document on stdout
    Compose {
        /// Inject the preview-only outline-debug overlay
        #[arg(long)]
        outlines: bool,
    },

    /// Write index.html, style.css and script.js into a directory
    Export {
        /// Output directory
        #[arg(short, long, default_value = "dist")]
        out: String,
    },

    /// Snapshot the current buffers into the version history
    Save,

    /// List saved versions, most recent first
    Versions,

    /// Overwrite the buffer files from a saved version
    Restore { id: u64 },

    /// Run one generation call with a typed instruction
    Generate {
        /// The instruction, as you would have spoken it
        instruction: Vec<String>,

        /// Model ID override
        #[arg(long)]
        model: Option<String>,

        /// Chat-completions endpoint override
        #[arg(long)]
        api_url: Option<String>,
    },

    /// Open the composed document (no debug overlay) in the system browser
    Open,
}

/// Placeholder client for commands that never generate.
///
/// Keeps session construction uniform; reaching it means the API key env var
/// is missing.
struct OfflineClient;

#[async_trait::async_trait]
impl GenerationClient for OfflineClient {
    async fn generate(&self, _request: &GenerationRequest) -> Result<String> {
        Err(anyhow!(
            "no API key: set VOCALSITE_API_KEY or OPENAI_API_KEY"
        ))
    }
}

/// Typed instruction standing in for the live speech transcript
struct TypedInstruction {
    text: String,
}

impl SpeechSource for TypedInstruction {
    fn transcript(&self) -> String {
        self.text.clone()
    }

    fn is_listening(&self) -> bool {
        false
    }

    fn reset(&mut self) {
        self.text.clear();
    }
}

fn api_key() -> Option<String> {
    std::env::var("VOCALSITE_API_KEY")
        .or_else(|_| std::env::var("OPENAI_API_KEY"))
        .ok()
}

/// Build a generation client from the environment
fn generation_client(model: Option<String>, api_url: Option<String>) -> Result<Box<dyn GenerationClient>> {
    let Some(key) = api_key() else {
        return Ok(Box::new(OfflineClient));
    };
    let client = HttpGenerationClient::with_endpoint(
        api_url.unwrap_or_else(|| {
            vocalsite_core::constants::generation::DEFAULT_API_URL.to_string()
        }),
        key,
        model.unwrap_or_else(|| vocalsite_core::constants::generation::DEFAULT_MODEL.to_string()),
    )?;
    Ok(Box::new(client))
}

/// Open a studio session around the project's files and history
fn open_studio(
    project: &Project,
    model: Option<String>,
    api_url: Option<String>,
) -> Result<Studio> {
    let buffers = project.load_buffers()?;
    let sandbox = FileSandbox::new(project.preview_file());
    let persistence = SqliteStore::open(&project.history_db())?;
    let client = generation_client(model, api_url)?;
    Ok(Studio::with_buffers(
        project.label(),
        buffers,
        Box::new(sandbox),
        Box::new(persistence),
        client,
    ))
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(tracing::Level::WARN.into()),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let project = Project::new(&cli.project);

    match cli.command {
        Commands::Init => {
            project.init()?;
            println!("Seeded project in {}", project.root().display());
        }
        Commands::Compose { outlines } => {
            let buffers = project.load_buffers()?;
            let document = compose(&buffers.markup, &buffers.style, &buffers.script, outlines);
            println!("{document}");
        }
        Commands::Export { out } => {
            let buffers = project.load_buffers()?;
            let artifacts = export(&buffers);
            let out = std::path::Path::new(&out);
            std::fs::create_dir_all(out)?;
            std::fs::write(out.join(vocalsite_core::export::INDEX_FILE), &artifacts.index_document)?;
            std::fs::write(out.join(vocalsite_core::export::STYLE_FILE), &artifacts.style_sheet)?;
            std::fs::write(out.join(vocalsite_core::export::SCRIPT_FILE), &artifacts.script_file)?;
            println!("Exported 3 files to {}", out.display());
        }
        Commands::Save => {
            let mut studio = open_studio(&project, None, None)?;
            let snap = studio.save_version();
            println!("Saved version {} ({})", snap.id, snap.label);
        }
        Commands::Versions => {
            let studio = open_studio(&project, None, None)?;
            let versions = studio.versions();
            if versions.is_empty() {
                println!("No saved versions yet");
            }
            for snap in versions {
                println!("{:>16}  {}", snap.id, snap.label);
            }
        }
        Commands::Restore { id } => {
            let mut studio = open_studio(&project, None, None)?;
            studio.restore_version(id)?;
            project.write_buffers(studio.buffers())?;
            println!("Restored version {id}");
        }
        Commands::Generate {
            instruction,
            model,
            api_url,
        } => {
            let mut studio = open_studio(&project, model, api_url)?;
            let mut speech = TypedInstruction {
                text: instruction.join(" "),
            };
            let snap = studio.generate_from_speech(&mut speech).await?;
            project.write_buffers(studio.buffers())?;
            println!("Applied generation, saved version {} ({})", snap.id, snap.label);
            println!("Preview: {}", project.preview_file().display());
        }
        Commands::Open => {
            let mut studio = open_studio(&project, None, None)?;
            let mut viewer = BrowserViewer::new(project.root().join("vocalsite-view.html"));
            studio.open_external(&mut viewer)?;
        }
    }

    Ok(())
}
