//! resizer: upload an image, resize it server-side, and save the result.
//!
//! Set RESIZER_API_URL (default http://localhost:4000).

use anyhow::Context;
use clap::Parser;
use resizer_cli::{init_tracing, load_selected_file, save_result, UiState};
use resizer_client::{ApiClient, ClientConfig, Orchestrator, ResizeRequest};
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(name = "resizer", about = "Resize an image through the resizer API")]
struct Args {
    /// Path to the image to upload
    file: PathBuf,

    /// Target width in pixels
    #[arg(long)]
    width: Option<i64>,

    /// Target height in pixels
    #[arg(long)]
    height: Option<i64>,

    /// Directory the resized image is written to
    #[arg(long, short, default_value = ".")]
    output: PathBuf,

    /// API base URL; overrides RESIZER_API_URL
    #[arg(long)]
    api_url: Option<String>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    init_tracing();
    let args = Args::parse();

    let mut config = ClientConfig::from_env();
    if let Some(api_url) = args.api_url {
        config.api_url = api_url;
    }
    let api = ApiClient::new(&config).context("Failed to create API client")?;
    let orchestrator = Orchestrator::new(api, config.max_dimension);

    let request = ResizeRequest {
        file: Some(load_selected_file(&args.file)?),
        width: args.width,
        height: args.height,
    };

    let mut ui = UiState::default();
    if !ui.begin() {
        anyhow::bail!("A resize is already in progress");
    }

    // The observer has already printed the failure line.
    let image = match orchestrator.run(&request, &mut ui).await {
        Ok(image) => image,
        Err(_) => std::process::exit(1),
    };

    let path = save_result(&args.output, &image)?;
    tracing::info!(url = %image.source_url, size_bytes = image.bytes.len(), "Downloaded result");
    println!("{}", path.display());

    Ok(())
}
