use tracing_subscriber::{filter::Targets, prelude::*};

use marlin_monitor::config::LoggingConfig;

pub fn setup_tracing(config: &LoggingConfig) -> miette::Result<()> {
    let level = config.max_level;

    let mut filter = Targets::new().with_target("marlin_monitor", level);

    if config.include_http {
        filter = filter
            .with_target("reqwest", level)
            .with_target("hyper_util", level);
    }

    // stdout is reserved for the rendered table
    tracing_subscriber::FmtSubscriber::builder()
        .with_max_level(level)
        .with_writer(std::io::stderr)
        .finish()
        .with(filter)
        .init();

    Ok(())
}
