use std::sync::Once;

use env_logger::Builder;
use log::LevelFilter;

static INIT: Once = Once::new();

fn builder(verbose: bool) -> Builder {
    let level = if verbose {
        LevelFilter::Debug
    } else {
        LevelFilter::Warn
    };
    let mut builder = Builder::new();

    builder
        .filter_level(LevelFilter::Warn)
        .filter_module("dictionary", level)
        .filter_module("dictionary_cli", level)
        .format_timestamp_millis()
        .parse_default_env();
    builder
}

/// Quiet by default so log lines do not interleave with the menu.
pub fn initialize_logger(verbose: bool) {
    INIT.call_once_force(|_| {
        let _ = builder(verbose).try_init();
    });
}
