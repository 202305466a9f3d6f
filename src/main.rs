use anyhow::{anyhow, Context, Result};
use bytes::Bytes;
use clap::{Args, Parser, Subcommand};
use pixelguard::artifact::{ArtifactStore, Sweeper};
use pixelguard::config::Config;
use pixelguard::metadata::extract_metadata;
use pixelguard::noise::NoiseMethod;
use pixelguard::protection::{protect_upload, ProtectionPipeline, ProtectionRequest};
use pixelguard::watermark::Anchor;
use serde_json::json;
use std::path::{Path, PathBuf};
use std::sync::Arc;

/// Pixelguard - protect images with a visible watermark, copyright metadata
/// and adversarial noise
#[derive(Parser, Debug)]
#[command(name = "pixelguard")]
#[command(version, about, long_about = None)]
struct Cli {
    /// Path to configuration file (defaults apply when it does not exist)
    #[arg(short, long, default_value = "pixelguard.yaml", global = true)]
    config: PathBuf,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Store an image, protect it and print the output artifact path
    Protect(ProtectArgs),
    /// Print an image's metadata as JSON
    Inspect {
        input: PathBuf,
    },
    /// Delete expired artifacts once
    Sweep,
    /// Sweep at startup and then periodically until Ctrl-C
    Watch,
    /// Load and validate the configuration, then exit
    CheckConfig,
}

#[derive(Args, Debug)]
struct ProtectArgs {
    input: PathBuf,

    /// Also copy the protected image to this path
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Format hint used when the content cannot be sniffed
    #[arg(long)]
    format: Option<String>,

    /// Watermark text (empty disables the watermark)
    #[arg(long)]
    text: Option<String>,

    #[arg(long)]
    anchor: Option<Anchor>,

    /// Watermark opacity 0-100
    #[arg(long)]
    opacity: Option<u8>,

    /// Watermark font size in pixels
    #[arg(long)]
    font_size: Option<u32>,

    #[arg(long)]
    no_metadata: bool,

    #[arg(long)]
    no_noise: bool,

    /// Noise intensity 1-10
    #[arg(long)]
    intensity: Option<u8>,

    #[arg(long)]
    method: Option<NoiseMethod>,

    /// Print the per-stage report as JSON instead of the output path
    #[arg(long)]
    report: bool,
}

impl ProtectArgs {
    /// Apply command-line overrides on top of the configured specs.
    fn apply(&self, config: &mut Config) {
        let protection = &mut config.protection;
        if let Some(text) = &self.text {
            protection.watermark.text = text.clone();
        }
        if let Some(anchor) = self.anchor {
            protection.watermark.anchor = anchor;
        }
        if let Some(opacity) = self.opacity {
            protection.watermark.opacity = opacity;
        }
        if let Some(font_size) = self.font_size {
            protection.watermark.font_size = font_size;
        }
        if self.no_metadata {
            protection.metadata.enabled = false;
        }
        if self.no_noise {
            protection.noise.enabled = false;
        }
        if let Some(intensity) = self.intensity {
            protection.noise.intensity = intensity;
        }
        if let Some(method) = self.method {
            protection.noise.method = method;
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let mut config = Config::from_file_or_default(&cli.config)
        .map_err(|e| anyhow!("Failed to load configuration: {}", e))?;
    if let Command::Protect(args) = &cli.command {
        args.apply(&mut config);
    }
    config
        .validate()
        .map_err(|e| anyhow!("Invalid configuration: {}", e))?;

    pixelguard::logging::init_subscriber(&config.logging)
        .map_err(|e| anyhow!("Failed to initialize logging: {}", e))?;

    tracing::debug!(
        config_file = %cli.config.display(),
        temp_dir = %config.storage.temp_dir.display(),
        "Configuration loaded"
    );

    match cli.command {
        Command::Protect(args) => protect(&config, &args).await,
        Command::Inspect { input } => inspect(&input).await,
        Command::Sweep => sweep(&config).await,
        Command::Watch => watch(&config).await,
        Command::CheckConfig => {
            println!("{}", serde_json::to_string_pretty(&config)?);
            Ok(())
        }
    }
}

async fn read_input(path: &Path) -> Result<Bytes> {
    let data = tokio::fs::read(path)
        .await
        .with_context(|| format!("Failed to read {}", path.display()))?;
    Ok(Bytes::from(data))
}

async fn protect(config: &Config, args: &ProtectArgs) -> Result<()> {
    let store = ArtifactStore::open(&config.storage).await?;
    let source = read_input(&args.input).await?;
    let name = args
        .input
        .file_name()
        .and_then(|n| n.to_str())
        .unwrap_or("upload");

    let pipeline = Arc::new(ProtectionPipeline::from_config(&config.protection));
    let request = ProtectionRequest {
        source,
        format_hint: args.format.clone(),
        watermark: config.protection.watermark.clone(),
        metadata: config.protection.metadata,
        noise: config.protection.noise,
    };
    let upload = protect_upload(&store, &pipeline, name, request).await?;

    if let Some(path) = &args.output {
        tokio::fs::write(path, &upload.output.bytes)
            .await
            .with_context(|| format!("Failed to write {}", path.display()))?;
    }

    if args.report {
        let output = &upload.output;
        let body = json!({
            "original": upload.original,
            "processed": upload.processed,
            "format": output.format,
            "content_type": output.content_type(),
            "width": output.width,
            "height": output.height,
            "report": output.report,
        });
        println!("{}", serde_json::to_string_pretty(&body)?);
    } else {
        println!("{}", upload.processed.path.display());
    }

    Ok(())
}

async fn inspect(input: &Path) -> Result<()> {
    let data = read_input(input).await?;
    let snapshot = extract_metadata(&data)
        .with_context(|| format!("Failed to read metadata from {}", input.display()))?;
    println!("{}", serde_json::to_string_pretty(&snapshot)?);
    Ok(())
}

async fn sweep(config: &Config) -> Result<()> {
    let store = ArtifactStore::open(&config.storage).await?;
    let report = store.sweep_once().await;
    println!("{}", serde_json::to_string_pretty(&report)?);
    Ok(())
}

async fn watch(config: &Config) -> Result<()> {
    let store = ArtifactStore::open(&config.storage).await?;
    let sweeper = Sweeper::start(store, config.storage.sweep_interval()).await;

    tracing::info!(
        temp_dir = %config.storage.temp_dir.display(),
        expiry_secs = config.storage.expiry_secs,
        interval_secs = config.storage.sweep_interval_secs,
        "Watching artifact directory, press Ctrl-C to stop"
    );

    tokio::signal::ctrl_c()
        .await
        .context("Failed to listen for Ctrl-C")?;

    sweeper.stop().await;
    Ok(())
}
