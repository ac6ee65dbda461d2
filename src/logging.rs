use log::LevelFilter;

/// Initializes env_logger. `RUST_LOG` applies unless `verbose` forces debug output.
pub fn init(verbose: bool) {
    let mut builder = env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"));
    if verbose {
        builder.filter_level(LevelFilter::Debug);
    }
    // A second init (tests, embedding) keeps the first logger.
    let _ = builder.format_timestamp_secs().try_init();
}
