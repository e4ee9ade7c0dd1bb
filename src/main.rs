use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use serde::Serialize;
use std::path::PathBuf;
use tracing::info;
use tracing_subscriber::EnvFilter;
use trex_rust::{
    DetectionResult, Trex2Api,
    config::{self, Config, LogsConfig},
    dataset::CountingDataset,
    prompt::{self, ImageInput, RawEmbeddingItem, RawGenericPrompt, RawInteractiveItem},
};

/// Command-line client for the T-Rex2 visual prompt API
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Configuration file (defaults to $CONFIG_PATH, then config.yaml)
    #[arg(long, global = true, value_name = "FILE")]
    config: Option<PathBuf>,

    /// API token, overrides the configuration and $TREX2_API_TOKEN
    #[arg(long, global = true, value_name = "TOKEN")]
    token: Option<String>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    #[command(flatten)]
    Api(ApiCommand),
    /// Print the size of a counting dataset
    Browse {
        #[arg(long, value_name = "DIR")]
        img_dir: PathBuf,
        #[arg(long, value_name = "FILE")]
        ann_file: PathBuf,
        #[arg(long, value_name = "FILE")]
        exemplar_file: Option<PathBuf>,
    },
}

#[derive(Subcommand, Debug)]
enum ApiCommand {
    /// Box or point prompts on each image, detections on the same image
    Interactive {
        #[arg(long, value_name = "FILE")]
        prompts: PathBuf,
        #[arg(long, default_value = "0.3", value_name = "THRESHOLD")]
        box_threshold: f32,
    },
    /// Prompts on reference images, detections on a target image
    Generic {
        #[arg(long, value_name = "IMAGE")]
        target: String,
        #[arg(long, value_name = "FILE")]
        prompts: PathBuf,
        #[arg(long, default_value = "0.3", value_name = "THRESHOLD")]
        box_threshold: f32,
    },
    /// Condense reference prompts into a reusable embedding
    Customize {
        #[arg(long, value_name = "FILE")]
        prompts: PathBuf,
    },
    /// Saved embeddings as prompts on each image
    Embedding {
        #[arg(long, value_name = "FILE")]
        prompts: PathBuf,
        #[arg(long, default_value = "0.3", value_name = "THRESHOLD")]
        box_threshold: f32,
    },
}

/// Validates a log level or `RUST_LOG`-style filter directive
fn validate_log_level(level: &str) -> Result<EnvFilter> {
    EnvFilter::try_new(level).map_err(|e| {
        anyhow::anyhow!(
            "Invalid log level: '{}' ({}). Use a level (error, warn, info, debug, trace) or a filter like 'trex_rust=debug'",
            level,
            e
        )
    })
}

/// JSON logs on stderr; `RUST_LOG` overrides the configured level
fn init_tracing(logs: &LogsConfig) -> Result<()> {
    let log_level = std::env::var("RUST_LOG").unwrap_or_else(|_| logs.level.clone());
    let filter = validate_log_level(&log_level)?;

    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(filter)
        .json()
        .init();
    Ok(())
}

async fn load_config(path: Option<PathBuf>, token: Option<String>) -> Result<Config> {
    let mut config = match path {
        Some(path) => config::load_from(path).await,
        None => config::load().await,
    }
    .context("Failed to load configuration")?;

    if let Ok(token) = std::env::var("TREX2_API_TOKEN") {
        config.api.token = token;
    }
    if let Some(token) = token {
        config.api.token = token;
    }

    Ok(config)
}

fn print_json<T: Serialize>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

fn threshold(results: Vec<DetectionResult>, box_threshold: f32) -> Vec<DetectionResult> {
    results
        .iter()
        .map(|result| result.retain_above(box_threshold))
        .collect()
}

async fn browse(img_dir: PathBuf, ann_file: PathBuf, exemplar_file: Option<PathBuf>) -> Result<()> {
    let dataset = CountingDataset::open(&img_dir, &ann_file, exemplar_file.as_deref()).await?;
    println!("Number of images in {}: {}", ann_file.display(), dataset.len());
    Ok(())
}

async fn run(api: &Trex2Api, command: ApiCommand) -> Result<()> {
    match command {
        ApiCommand::Interactive {
            prompts,
            box_threshold,
        } => {
            let raw = prompt::load_json::<RawInteractiveItem>(&prompts).await?;
            let items = prompt::parse_interactive(raw)?;
            let results = api.interactive_inference(&items).await?;
            print_json(&threshold(results, box_threshold))?;
        }
        ApiCommand::Generic {
            target,
            prompts,
            box_threshold,
        } => {
            let raw = prompt::load_json::<RawGenericPrompt>(&prompts).await?;
            let prompts = prompt::parse_generic(raw)?;
            let result = api
                .generic_inference(&ImageInput::parse(&target), &prompts)
                .await?;
            print_json(&result.retain_above(box_threshold))?;
        }
        ApiCommand::Customize { prompts } => {
            let raw = prompt::load_json::<RawGenericPrompt>(&prompts).await?;
            let prompts = prompt::parse_generic(raw)?;
            let url = api.customize_embedding(&prompts).await?;
            println!("{}", url);
        }
        ApiCommand::Embedding {
            prompts,
            box_threshold,
        } => {
            let raw = prompt::load_json::<RawEmbeddingItem>(&prompts).await?;
            let items = prompt::parse_embedding(raw);
            let results = api.embedding_inference(&items).await?;
            print_json(&threshold(results, box_threshold))?;
        }
    }
    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();
    let config = load_config(args.config, args.token).await;

    let command = match args.command {
        Command::Browse {
            img_dir,
            ann_file,
            exemplar_file,
        } => {
            // Browsing needs no API settings, only the log level
            let logs = config.map(|config| config.logs).unwrap_or_default();
            if let Err(e) = init_tracing(&logs) {
                eprintln!("{}", e);
                std::process::exit(1);
            }
            return browse(img_dir, ann_file, exemplar_file).await;
        }
        Command::Api(command) => command,
    };

    // API commands cannot run without a configuration
    let config = match config {
        Ok(config) => config,
        Err(e) => {
            eprintln!("{:#}", e);
            std::process::exit(1);
        }
    };

    if let Err(e) = init_tracing(&config.logs) {
        eprintln!("{}", e);
        std::process::exit(1);
    }

    config.validate()?;
    info!("Using T-Rex2 API at {}", config.api.base_url);

    let api = Trex2Api::from_config(&config.api)?;
    run(&api, command).await
}
