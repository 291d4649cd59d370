use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use std::path::{Path, PathBuf};

use picflow_client::ImageUploader;
use picflow_core::{ParseSizeError, SizeName, SourceUri};

#[derive(Parser, Debug)]
#[command(name = "picflow")]
#[command(about = "Compress a photo into size-bounded variants and upload them")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Compress and upload an image with the requested size variants
    Upload {
        /// Path to the source image
        path: PathBuf,

        /// Comma-separated variant sizes (default: large,medium,small)
        #[arg(long, value_delimiter = ',', value_parser = parse_size)]
        sizes: Vec<SizeName>,
    },
    /// Upload a profile picture (small variant only)
    ProfilePicture {
        /// Path to the source image
        path: PathBuf,
    },
    /// Upload a gallery image (all size variants)
    Gallery {
        /// Path to the source image
        path: PathBuf,
    },
    /// Fetch the presigned download URL for one variant
    Url {
        image_id: String,

        #[arg(value_parser = parse_size)]
        size: SizeName,
    },
    /// Fetch presigned download URLs for all variants
    Urls { image_id: String },
}

fn parse_size(s: &str) -> Result<SizeName, String> {
    s.parse().map_err(|e: ParseSizeError| e.to_string())
}

fn source_uri(path: &Path) -> Result<SourceUri> {
    let path = path.to_str().context("Source path is not valid UTF-8")?;
    Ok(SourceUri::new(path))
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let cli = Cli::parse();
    let uploader = ImageUploader::from_env()?;

    match cli.command {
        Command::Upload { path, sizes } => {
            let sizes = if sizes.is_empty() {
                SizeName::ALL.to_vec()
            } else {
                sizes
            };
            let result = uploader.upload(&source_uri(&path)?, &sizes).await?;
            println!("{}", serde_json::to_string_pretty(&result)?);
        }
        Command::ProfilePicture { path } => {
            let image_id = uploader.upload_profile_picture(&source_uri(&path)?).await?;
            println!("{}", image_id);
        }
        Command::Gallery { path } => {
            let image_id = uploader.upload_gallery_image(&source_uri(&path)?).await?;
            println!("{}", image_id);
        }
        Command::Url { image_id, size } => {
            let variant = uploader.variant_url(&image_id, size).await?;
            println!("{}", serde_json::to_string_pretty(&variant)?);
        }
        Command::Urls { image_id } => {
            let all = uploader.all_variant_urls(&image_id).await?;
            println!("{}", serde_json::to_string_pretty(&all)?);
        }
    }

    Ok(())
}
