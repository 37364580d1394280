use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::Parser;
use parafetch_fetch::{Downloader, ReqwestClient};

use crate::cli::Args;
use crate::ui::tracker::{DownloadTracker, Tracker};

mod cli;
mod logging;
mod ui;

fn main() -> ExitCode {
    let args = Args::parse();
    logging::init(args.verbose, args.quiet);

    match run(&args) {
        Ok(path) => {
            if !args.quiet {
                println!("{}", path.display());
            }
            ExitCode::SUCCESS
        }
        Err(e) => {
            report(&e);
            ExitCode::FAILURE
        }
    }
}

fn run(args: &Args) -> Result<PathBuf> {
    let runtime = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()
        .context("failed to start the async runtime")?;
    runtime.block_on(download(args))
}

async fn download(args: &Args) -> Result<PathBuf> {
    let client = ReqwestClient::builder()
        .connect_timeout(args.connect_timeout())
        .timeout(args.timeout())
        .build()
        .context("failed to build the HTTP client")?;

    let mut options = args.fetch_options();
    let tracker = (!args.quiet).then(|| Arc::new(DownloadTracker::new("Downloading")));
    if let Some(tracker) = &tracker {
        options = options.on_progress(tracker.observer());
    }
    tracing::debug!(uri = %args.uri, ?options, "starting download");

    let result = Downloader::new(client)
        .with_options(options)
        .download(&args.uri, args.output.as_deref())
        .await;

    match (&result, &tracker) {
        (Ok(_), Some(tracker)) => tracker.finish(Some("done".to_string())),
        (Err(_), Some(tracker)) => tracker.abandon(),
        _ => {}
    }
    result.with_context(|| format!("failed to download {}", args.uri))
}

fn report(error: &anyhow::Error) {
    eprintln!("error: {error}");
    for cause in error.chain().skip(1) {
        eprintln!("  caused by: {cause}");
    }
    if let Some(chunk) = error
        .downcast_ref::<parafetch_fetch::Error>()
        .and_then(parafetch_fetch::Error::root_chunk_failure)
    {
        eprintln!("  first failure: {chunk}");
    }
}
