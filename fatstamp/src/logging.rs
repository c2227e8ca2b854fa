/// Initialise logging. `info` by default, `debug` with `--verbose`; a set
/// `RUST_LOG` overrides both.
pub fn init(verbose: bool) {
    let level = if verbose {
        log::LevelFilter::Debug
    } else {
        log::LevelFilter::Info
    };

    env_logger::Builder::new()
        .filter_level(level)
        .parse_default_env()
        .init();
}
