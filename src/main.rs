//! textlift - extract text and word geometry from images
//!
//! Reads an image from a file, stdin, or the clipboard, runs the platform
//! OCR engine on it, and prints the recognized text entities as JSON.

use std::io::Read;
use std::path::PathBuf;

use anyhow::{bail, Context, Result};
use clap::Parser;
use tracing::{info, Level};
use tracing_subscriber::FmtSubscriber;

use textlift::config::{self, AppConfig};
use textlift::{
    extract_text_with_language, ImageSource, Origin, RecognitionMethod, RecognitionOptions,
};

/// textlift - platform OCR with per-word geometry
#[derive(Parser, Debug)]
#[command(name = "textlift")]
#[command(about = "Extract text and word geometry from an image using the platform OCR engine")]
struct Args {
    /// Image file to read ("-" reads encoded image bytes from stdin)
    image: Option<PathBuf>,

    /// Read the image from the system clipboard instead of a file
    #[arg(long, conflicts_with = "image")]
    clipboard: bool,

    /// Vertical-origin convention for reported coordinates
    #[arg(long, value_enum)]
    origin: Option<Origin>,

    /// Speed/accuracy tradeoff requested from the engine
    #[arg(long, value_enum)]
    method: Option<RecognitionMethod>,

    /// Pretty-print the JSON output
    #[arg(long)]
    pretty: bool,

    /// Enable debug logging
    #[arg(short, long)]
    verbose: bool,
}

fn main() -> Result<()> {
    let args = Args::parse();

    // Logs go to stderr so stdout stays valid JSON
    let subscriber = FmtSubscriber::builder()
        .with_max_level(if args.verbose { Level::DEBUG } else { Level::WARN })
        .with_writer(std::io::stderr)
        .finish();
    tracing::subscriber::set_global_default(subscriber)?;

    let config = load_or_create_config();

    let options = RecognitionOptions {
        origin: args.origin.unwrap_or(config.recognition.origin),
        method: args.method.unwrap_or(config.recognition.method),
    };

    let source = if args.clipboard {
        ImageSource::Clipboard
    } else {
        match args.image {
            Some(path) if path.as_os_str() == "-" => {
                let mut bytes = Vec::new();
                std::io::stdin()
                    .read_to_end(&mut bytes)
                    .context("failed to read image bytes from stdin")?;
                ImageSource::Bytes(bytes)
            }
            Some(path) => ImageSource::Path(path),
            None => bail!("no image source given (pass a file path, \"-\", or --clipboard)"),
        }
    };

    let result = extract_text_with_language(source, options, &config.recognition.language)
        .context("text extraction failed")?;

    let json = if args.pretty || config.output.pretty {
        serde_json::to_string_pretty(&result)?
    } else {
        serde_json::to_string(&result)?
    };
    println!("{json}");

    Ok(())
}

/// Load configuration from file or create default
fn load_or_create_config() -> AppConfig {
    if let Ok(config_dir) = config::get_config_dir() {
        let config_path = config_dir.join("config.toml");
        if config_path.exists() {
            if let Ok(config) = config::load_config(&config_path) {
                info!("Loaded configuration from {:?}", config_path);
                return config;
            }
        }
    }
    info!("Using default configuration");
    AppConfig::default()
}
