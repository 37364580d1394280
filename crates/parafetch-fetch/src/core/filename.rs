use std::time::{SystemTime, UNIX_EPOCH};

use once_cell::sync::Lazy;
use regex::Regex;

const DEFAULT_FILENAME: &str = "file";

static DISPOSITION_FILENAME: Lazy<Option<Regex>> =
    Lazy::new(|| Regex::new(r#"filename="([^"]+)"|filename=([^;\s"]+)"#).ok());

/// Extract the `filename` parameter of a `Content-Disposition` value.
pub(crate) fn disposition_filename(disposition: &str) -> Option<String> {
    let caps = DISPOSITION_FILENAME.as_ref()?.captures(disposition)?;
    let name = caps.get(1).or_else(|| caps.get(2))?.as_str();
    sanitize(name)
}

/// Pick the output name for a resource.
///
/// Priority: the server's suggested name, then the last non-empty segment of
/// the URL path, then `file<timestamp>`. Only the final path component of any
/// candidate is kept.
pub fn resolve_filename(suggested: Option<&str>, url: &str) -> String {
    suggested
        .and_then(sanitize)
        .or_else(|| url_filename(url))
        .unwrap_or_else(fallback_filename)
}

fn url_filename(url: &str) -> Option<String> {
    let parsed = url::Url::parse(url).ok()?;
    let segment = parsed.path_segments()?.rfind(|s| !s.is_empty())?;
    sanitize(segment)
}

fn sanitize(name: &str) -> Option<String> {
    let last = name
        .rsplit(|c: char| c == '/' || c == '\\')
        .next()
        .map(str::trim)
        .filter(|s| !s.is_empty() && *s != "." && *s != "..")?;
    Some(last.to_string())
}

fn fallback_filename() -> String {
    let stamp = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default()
        .as_micros();
    format!("{DEFAULT_FILENAME}{stamp}")
}
