use tracing_subscriber::EnvFilter;

pub const DEFAULT_FILTER: &str = "info,chromiumoxide=warn";
pub const VERBOSE_FILTER: &str = "info,forum_harvest=debug,chromiumoxide=warn";

/// `RUST_LOG` wins; otherwise the default filter, or the verbose one.
pub fn init_tracing(verbose: bool) {
    let fallback = if verbose { VERBOSE_FILTER } else { DEFAULT_FILTER };
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(fallback));
    let _ = tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(env_filter)
        .try_init();
}
