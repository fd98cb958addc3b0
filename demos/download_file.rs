//! Basic download example
//!
//! This example demonstrates the core functionality of homebrew-dl:
//! - Building a fetcher from configuration
//! - Downloading a file to disk with progress reporting
//! - Telling transport, server, and destination failures apart

use homebrew_dl::config::FetchConfig;
use homebrew_dl::fetch::{DownloadOptions, Fetcher};
use homebrew_dl::Error;
use std::path::Path;
use std::sync::Arc;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Initialize tracing for logging (optional)
    // Uncomment if you add tracing-subscriber to your dependencies:
    // tracing_subscriber::fmt::init();

    let mut args = std::env::args().skip(1);
    let url = args
        .next()
        .unwrap_or_else(|| "https://example.com/".to_string());
    let destination = args.next().unwrap_or_else(|| "download.bin".to_string());

    // Build configuration; the defaults verify TLS and follow up to 50 redirects.
    let config = FetchConfig {
        user_agent: "homebrew-dl-example/1.0".to_string(),
        ..FetchConfig::default()
    };
    let fetcher = Fetcher::new(config)?;

    // Report progress as chunks arrive.
    let options = DownloadOptions {
        progress: Some(Arc::new(|received, total| match total {
            Some(total) => {
                let percent = received as f64 * 100.0 / total as f64;
                println!("  {received}/{total} bytes ({percent:.1}%)");
            }
            None => println!("  {received} bytes"),
        })),
        ..DownloadOptions::default()
    };

    println!("Downloading {url} -> {destination}");
    match fetcher
        .download_to_file(&url, Path::new(&destination), &options)
        .await
    {
        Ok(bytes) => println!("✓ Wrote {bytes} bytes to {destination}"),
        Err(Error::HttpStatus { status, url }) => {
            eprintln!("✗ Server refused: {status} for {url}");
        }
        Err(Error::Destination { path, source }) => {
            eprintln!("✗ Could not write {}: {source}", path.display());
        }
        Err(e) => eprintln!("✗ Download failed: {e}"),
    }

    Ok(())
}
