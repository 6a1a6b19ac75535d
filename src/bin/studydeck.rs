//! CLI binary for studydeck.
//!
//! `serve` runs the HTTP service. `study` sends a local file through a
//! running service and prints the generated material.

use anyhow::{bail, Context, Result};
use clap::{Args, Parser, Subcommand};
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use studydeck::client::{Effect, SelectedFile, SessionConfig, StudyClient, StudySession};
use studydeck::server::{self, AppState};
use studydeck::{GenerationConfig, ServerConfig, DEFAULT_MAX_INPUT_CHARS};
use tracing_subscriber::EnvFilter;

const AFTER_HELP: &str = r#"EXAMPLES:
  # Start the service on port 5000
  studydeck serve

  # Point it at any OpenAI-compatible endpoint
  studydeck serve --api-base http://localhost:11434/v1 --model llama3.1

  # Generate material for a file via a running service
  studydeck study notes.pdf -o notes-study.txt

ENVIRONMENT VARIABLES:
  PORT                    Listen port (default 5000)
  CLIENT_ORIGIN           Allowed CORS origin (default http://localhost:5173)
  STUDY_API_BASE          OpenAI-compatible base URL; bypasses provider auto-detection
  STUDY_API_KEY           Bearer token for STUDY_API_BASE (api.openai.com/v1 if unset)
  EDGEQUAKE_LLM_PROVIDER  Provider (openai, anthropic, gemini, ollama, ...)
  EDGEQUAKE_MODEL         Model ID
  OPENAI_API_KEY          OpenAI API key (used when nothing else is set)
  STUDY_MAX_INPUT_CHARS   Characters of text sent to the model (default 12000)
  STUDY_UPLOAD_DIR        Directory for staged uploads (default: system temp)
  STUDY_MAX_UPLOAD_BYTES  Maximum request body size (default 10 MiB)
  PDFIUM_LIB_PATH         Directory containing libpdfium

A .env file in the working directory is loaded first.
"#;

/// Turn PDFs and text files into flashcards, quizzes and summaries.
#[derive(Parser, Debug)]
#[command(
    name = "studydeck",
    version,
    about = "Turn PDFs and text files into flashcards, quizzes and summaries",
    arg_required_else_help = true,
    after_long_help = AFTER_HELP
)]
struct Cli {
    #[command(subcommand)]
    command: Command,

    /// Debug-level logging.
    #[arg(short, long, global = true, env = "STUDY_VERBOSE")]
    verbose: bool,

    /// Errors only.
    #[arg(short, long, global = true, env = "STUDY_QUIET")]
    quiet: bool,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Run the HTTP service.
    Serve(ServeArgs),
    /// Upload a file to a running service and print the result.
    Study(StudyArgs),
}

#[derive(Args, Debug)]
struct ServeArgs {
    #[arg(long, env = "PORT", default_value_t = 5000)]
    port: u16,

    #[arg(long, env = "CLIENT_ORIGIN", default_value = "http://localhost:5173")]
    client_origin: String,

    /// OpenAI-compatible base URL, e.g. https://api.openai.com/v1
    #[arg(long, env = "STUDY_API_BASE")]
    api_base: Option<String>,

    #[arg(long, env = "STUDY_API_KEY", hide_env_values = true)]
    api_key: Option<String>,

    #[arg(long, env = "EDGEQUAKE_LLM_PROVIDER")]
    provider: Option<String>,

    #[arg(short, long, env = "EDGEQUAKE_MODEL")]
    model: Option<String>,

    #[arg(long, env = "STUDY_MAX_INPUT_CHARS", default_value_t = DEFAULT_MAX_INPUT_CHARS)]
    max_input_chars: usize,

    #[arg(long, env = "STUDY_MAX_TOKENS", default_value_t = 2048)]
    max_tokens: usize,

    #[arg(long, env = "STUDY_TEMPERATURE", default_value_t = 0.4)]
    temperature: f32,

    /// File containing a replacement system prompt.
    #[arg(long, env = "STUDY_SYSTEM_PROMPT")]
    system_prompt: Option<PathBuf>,

    #[arg(long, env = "STUDY_UPLOAD_DIR")]
    upload_dir: Option<PathBuf>,

    #[arg(long, env = "STUDY_MAX_UPLOAD_BYTES", default_value_t = 10 * 1024 * 1024)]
    max_upload_bytes: usize,

    #[arg(long, env = "PDFIUM_LIB_PATH")]
    pdfium_lib_path: Option<PathBuf>,
}

#[derive(Args, Debug)]
struct StudyArgs {
    /// PDF or plain-text file.
    file: PathBuf,

    #[arg(long, env = "STUDY_SERVER", default_value = "http://localhost:5000")]
    server: String,

    /// Write the result here instead of stdout.
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Print the raw material as JSON.
    #[arg(long)]
    json: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();
    let cli = Cli::parse();

    let filter = if cli.verbose {
        "debug"
    } else if cli.quiet {
        "error"
    } else {
        "info"
    };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(filter)),
        )
        .with_writer(io::stderr)
        .init();

    match cli.command {
        Command::Serve(args) => run_serve(args).await,
        Command::Study(args) => run_study(args).await,
    }
}

async fn run_serve(args: ServeArgs) -> Result<()> {
    let config = build_server_config(&args).await?;
    let state = AppState::from_config(config).context("Failed to initialise service")?;
    tracing::info!("Generator backend: {}", state.generator.name());
    server::serve(Arc::new(state)).await?;
    Ok(())
}

/// Map CLI args to `ServerConfig`.
async fn build_server_config(args: &ServeArgs) -> Result<ServerConfig> {
    let mut generation = GenerationConfig::builder()
        .max_input_chars(args.max_input_chars)
        .max_tokens(args.max_tokens)
        .temperature(args.temperature);
    if let Some(ref base) = args.api_base {
        generation = generation.api_base(base);
    }
    if let Some(ref key) = args.api_key {
        generation = generation.api_key(key);
    }
    if let Some(ref provider) = args.provider {
        generation = generation.provider_name(provider);
    }
    if let Some(ref model) = args.model {
        generation = generation.model(model);
    }
    if let Some(ref path) = args.system_prompt {
        let prompt = tokio::fs::read_to_string(path)
            .await
            .with_context(|| format!("Failed to read system prompt from {:?}", path))?;
        generation = generation.system_prompt(prompt);
    }
    let generation = generation.build().context("Invalid generation settings")?;

    let mut builder = ServerConfig::builder()
        .port(args.port)
        .allowed_origin(&args.client_origin)
        .max_upload_bytes(args.max_upload_bytes)
        .generation(generation);
    if let Some(ref dir) = args.upload_dir {
        builder = builder.upload_dir(dir);
    }
    if let Some(ref dir) = args.pdfium_lib_path {
        builder = builder.pdfium_lib_path(dir);
    }
    Ok(builder.build().context("Invalid server settings")?)
}

async fn run_study(args: StudyArgs) -> Result<()> {
    let data = tokio::fs::read(&args.file)
        .await
        .with_context(|| format!("Failed to read {:?}", args.file))?;
    let file_name = args
        .file
        .file_name()
        .and_then(|n| n.to_str())
        .unwrap_or("upload")
        .to_string();
    let file = SelectedFile::new(file_name, guess_content_type(&args.file), data);

    let config = SessionConfig {
        api_base: args.server.clone(),
        ..SessionConfig::default()
    };
    let client = StudyClient::from_config(&config);
    let mut session = StudySession::new(config);
    session.select_file(file);

    if !client.run(&mut session).await {
        bail!(
            "{}",
            session.error().unwrap_or("Failed to generate study material")
        );
    }
    let Some(view) = session.view() else {
        bail!("Failed to generate study material");
    };
    if view.truncated() {
        tracing::warn!("Source text was truncated before generation");
    }

    let contents = if args.json {
        serde_json::to_string_pretty(view.material())?
    } else {
        match view.download() {
            Effect::Download { contents, .. } => contents,
            Effect::Clipboard(text) => text,
        }
    };

    match args.output {
        Some(ref path) => {
            tokio::fs::write(path, &contents)
                .await
                .with_context(|| format!("Failed to write {:?}", path))?;
            eprintln!("Wrote {}", path.display());
        }
        None => {
            let mut stdout = io::stdout().lock();
            stdout.write_all(contents.as_bytes())?;
            stdout.flush()?;
        }
    }
    Ok(())
}

fn guess_content_type(path: &Path) -> Option<&'static str> {
    let ext = path.extension()?.to_str()?.to_ascii_lowercase();
    match ext.as_str() {
        "pdf" => Some("application/pdf"),
        "txt" => Some("text/plain"),
        _ => None,
    }
}
