use tracing_subscriber::EnvFilter;

/// Install the stderr log subscriber. `RUST_LOG` takes precedence over the
/// verbosity flags.
pub fn init(verbose: u8, quiet: bool) {
    let filter = if std::env::var(EnvFilter::DEFAULT_ENV).unwrap_or_default().is_empty() {
        EnvFilter::new(default_directives(verbose, quiet))
    } else {
        EnvFilter::from_default_env()
    };

    // a subscriber may already be installed when embedded in tests
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(verbose > 1)
        .try_init();
}

fn default_directives(verbose: u8, quiet: bool) -> &'static str {
    if quiet {
        return "error";
    }
    match verbose {
        0 => "warn",
        1 => "warn,parafetch=info,parafetch_fetch=info,parafetch_fs=info",
        2 => "warn,parafetch=debug,parafetch_fetch=debug,parafetch_fs=debug",
        _ => "trace",
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_directives_follow_flags() {
        assert_eq!(default_directives(3, true), "error");
        assert_eq!(default_directives(0, false), "warn");
        assert!(default_directives(1, false).contains("parafetch_fetch=info"));
        assert!(default_directives(2, false).contains("parafetch_fs=debug"));
        assert_eq!(default_directives(9, false), "trace");
    }

    #[test]
    fn test_directives_parse() {
        for verbose in 0..4 {
            assert!(EnvFilter::try_new(default_directives(verbose, false)).is_ok());
        }
    }
}
