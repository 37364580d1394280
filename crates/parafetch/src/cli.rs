use std::path::PathBuf;
use std::time::Duration;

use clap::{ArgAction, Parser};
use parafetch_fetch::FetchOptions;
use parafetch_fetch::data::DEFAULT_WORKERS;

#[derive(Clone, Debug, Parser)]
#[command(name = "parafetch", version = env!("CARGO_PKG_VERSION"), about, long_about = None)]
pub struct Args {
    /// URL of the resource to download
    #[arg(value_name = "URI", env = "PARAFETCH_URI")]
    pub uri: String,

    /// Number of byte ranges fetched in parallel
    #[arg(short = 'n', long, env = "PARAFETCH_WORKERS", default_value_t = DEFAULT_WORKERS)]
    pub workers: u32,

    /// Output file, or an existing directory to place the file in
    #[arg(short, long, env = "PARAFETCH_OUTPUT")]
    pub output: Option<PathBuf>,

    /// Where chunk scratch files are kept [default: the output's directory]
    #[arg(long, env = "PARAFETCH_SCRATCH_DIR")]
    pub scratch_dir: Option<PathBuf>,

    /// Retries per chunk after a transient failure
    #[arg(long, env = "PARAFETCH_RETRIES", default_value_t = 3)]
    pub retries: u32,

    /// Base delay of the exponential retry backoff
    #[arg(long, env = "PARAFETCH_RETRY_BACKOFF_MS", default_value_t = 100)]
    pub retry_backoff_ms: u64,

    #[arg(long, env = "PARAFETCH_CONNECT_TIMEOUT_SECS", default_value_t = 30)]
    pub connect_timeout_secs: u64,

    /// Deadline for each request, body included
    #[arg(long, env = "PARAFETCH_TIMEOUT_SECS")]
    pub timeout_secs: Option<u64>,

    /// Extra request header as `KEY: VALUE`
    #[arg(short = 'H', long = "header", env = "PARAFETCH_HEADER", value_parser = parse_header)]
    pub headers: Vec<(String, String)>,

    /// Let the other chunks finish when one fails
    #[arg(long, env = "PARAFETCH_NO_CANCEL")]
    pub no_cancel: bool,

    /// Print nothing but errors
    #[arg(short, long, env = "PARAFETCH_QUIET", conflicts_with = "verbose")]
    pub quiet: bool,

    /// More log output; repeat for more detail
    #[arg(short, long, action = ArgAction::Count)]
    pub verbose: u8,
}

impl Args {
    pub fn fetch_options(&self) -> FetchOptions {
        let mut options = FetchOptions::default()
            .workers(self.workers)
            .max_retries(self.retries)
            .retry_backoff(Duration::from_millis(self.retry_backoff_ms))
            .cancel_on_failure(!self.no_cancel);

        if let Some(dir) = &self.scratch_dir {
            options = options.scratch_root(dir);
        }
        for (key, value) in &self.headers {
            options = options.header(key, value);
        }
        options
    }

    pub fn connect_timeout(&self) -> Option<Duration> {
        (self.connect_timeout_secs > 0).then(|| Duration::from_secs(self.connect_timeout_secs))
    }

    pub fn timeout(&self) -> Option<Duration> { self.timeout_secs.map(Duration::from_secs) }
}

fn parse_header(s: &str) -> Result<(String, String), String> {
    let (key, value) = s
        .split_once(':')
        .ok_or_else(|| format!("expected `KEY: VALUE`, got `{s}`"))?;
    let key = key.trim();
    if key.is_empty() {
        return Err(format!("missing header name in `{s}`"));
    }
    Ok((key.to_string(), value.trim().to_string()))
}
