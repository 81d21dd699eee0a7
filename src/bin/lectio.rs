//! CLI binary for lectio.
//!
//! A thin shim over the library crate: `generate` runs the pipeline once on
//! a local PDF, `serve` starts the HTTP API.

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use lectio::api::{self, AppState};
use lectio::{generate_to_file, Db, GenerationConfig, LectureRequest, ObjectStore};
use std::io;
use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;
use tracing_subscriber::EnvFilter;

const AFTER_HELP: &str = r#"EXAMPLES:
  # One-shot: lecture PDF in, narrated MP4 out
  lectio generate lecture.pdf -o lecture.mp4 --title "Intro to Queues" --professor "Prof. Kim"

  # Run the HTTP API
  lectio serve --addr 0.0.0.0:8080 --db lectures.db \
      --storage-endpoint http://minio:9000 --storage-bucket videos

  # Pick a specific model
  lectio generate lecture.pdf -o out.mp4 -t "Queues" -p "Kim" --model gpt-4.1 --provider openai

ENVIRONMENT VARIABLES:
  OPENAI_API_KEY        OpenAI API key (LLM and TTS)
  ANTHROPIC_API_KEY     Anthropic API key (LLM)
  LECTIO_LLM_PROVIDER   Override provider (openai, anthropic, gemini, ollama)
  LECTIO_MODEL          Override model ID
  PDFIUM_LIB_PATH       Path to an existing libpdfium

EXTERNAL TOOLS:
  soffice (LibreOffice), ffmpeg, and ffprobe must be on PATH.
"#;

/// Turn lecture PDFs into narrated slide videos.
#[derive(Parser, Debug)]
#[command(
    name = "lectio",
    version,
    about = "Turn lecture PDFs into narrated slide videos",
    arg_required_else_help = true,
    color = clap::ColorChoice::Auto,
    after_long_help = AFTER_HELP
)]
struct Cli {
    #[command(subcommand)]
    command: Command,

    /// Enable DEBUG-level tracing logs.
    #[arg(short, long, global = true, env = "LECTIO_VERBOSE")]
    verbose: bool,

    /// Suppress all output except errors.
    #[arg(short, long, global = true, env = "LECTIO_QUIET")]
    quiet: bool,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Generate one video from a local PDF.
    Generate(GenerateArgs),
    /// Serve the HTTP API.
    Serve(ServeArgs),
}

#[derive(clap::Args, Debug)]
struct GenerateArgs {
    /// Local PDF file path.
    input: PathBuf,

    /// Where to write the MP4.
    #[arg(short, long, env = "LECTIO_OUTPUT", default_value = "lecture.mp4")]
    output: PathBuf,

    /// Lecture title.
    #[arg(short, long)]
    title: String,

    /// Professor name.
    #[arg(short, long)]
    professor: String,

    /// Optional lecture description, fed to the narration prompt.
    #[arg(short, long)]
    description: Option<String>,

    /// Print the outline and run statistics as JSON on stdout.
    #[arg(long, env = "LECTIO_JSON")]
    json: bool,

    #[command(flatten)]
    model: ModelArgs,
}

#[derive(clap::Args, Debug)]
struct ServeArgs {
    /// Listen address.
    #[arg(long, env = "LECTIO_ADDR", default_value = "127.0.0.1:8080")]
    addr: SocketAddr,

    /// SQLite database path.
    #[arg(long, env = "LECTIO_DB", default_value = "lectures.db")]
    db: PathBuf,

    /// S3-compatible storage endpoint, e.g. http://minio:9000.
    #[arg(long, env = "LECTIO_STORAGE_ENDPOINT")]
    storage_endpoint: String,

    /// Storage bucket for finished videos.
    #[arg(long, env = "LECTIO_STORAGE_BUCKET", default_value = "videos")]
    storage_bucket: String,

    #[command(flatten)]
    model: ModelArgs,
}

#[derive(clap::Args, Debug)]
struct ModelArgs {
    /// LLM model ID (e.g. gpt-4.1-nano, claude-sonnet-4-20250514).
    #[arg(long, env = "LECTIO_MODEL")]
    model: Option<String>,

    /// LLM provider: openai, anthropic, gemini, ollama.
    #[arg(long, env = "LECTIO_PROVIDER")]
    provider: Option<String>,

    /// TTS voice.
    #[arg(long, env = "LECTIO_VOICE", default_value = "alloy")]
    voice: String,

    /// Retries per model call on transient failure.
    #[arg(long, env = "LECTIO_MAX_RETRIES", default_value_t = 3)]
    max_retries: u32,

    /// Per-model-call timeout in seconds.
    #[arg(long, env = "LECTIO_API_TIMEOUT", default_value_t = 120)]
    api_timeout: u64,
}

impl ModelArgs {
    fn into_config(self) -> Result<GenerationConfig> {
        let mut builder = GenerationConfig::builder()
            .voice(self.voice)
            .max_retries(self.max_retries)
            .api_timeout_secs(self.api_timeout);
        if let Some(model) = self.model {
            builder = builder.model(model);
        }
        if let Some(provider) = self.provider {
            builder = builder.provider_name(provider);
        }
        builder.build().context("invalid configuration")
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let filter = if cli.quiet {
        "error"
    } else if cli.verbose {
        "debug"
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
        Command::Generate(args) => run_generate(args).await,
        Command::Serve(args) => run_serve(args).await,
    }
}

async fn run_generate(args: GenerateArgs) -> Result<()> {
    let config = args.model.into_config()?;
    let pdf = std::fs::read(&args.input)
        .with_context(|| format!("cannot read {}", args.input.display()))?;

    let request = LectureRequest {
        title: args.title,
        professor: args.professor,
        description: args.description,
        pdf,
    };

    let output = generate_to_file(&request, &args.output, &config)
        .await
        .context("generation failed")?;

    if args.json {
        let report = serde_json::json!({
            "video": output.video_path,
            "outline": output.outline,
            "stats": output.stats,
        });
        println!("{}", serde_json::to_string_pretty(&report)?);
    }

    eprintln!(
        "✔ {} — {} slides, {:.0}s of video, {} tokens in / {} out",
        output.video_path.display(),
        output.stats.slides,
        output.stats.video_duration_secs,
        output.stats.total_input_tokens,
        output.stats.total_output_tokens,
    );
    Ok(())
}

async fn run_serve(args: ServeArgs) -> Result<()> {
    let config = args.model.into_config()?;
    let db = Db::open(&args.db)
        .with_context(|| format!("cannot open database at {}", args.db.display()))?;
    let store = ObjectStore::new(args.storage_endpoint, args.storage_bucket)
        .context("cannot build storage client")?;

    let state = Arc::new(AppState { config, db, store });
    let app = api::router(state);

    let listener = tokio::net::TcpListener::bind(args.addr)
        .await
        .with_context(|| format!("cannot bind {}", args.addr))?;
    eprintln!("listening on http://{}", args.addr);

    axum::serve(listener, app).await.context("server failed")
}
