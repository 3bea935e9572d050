use serde::Deserialize;
use serde_with::{serde_as, DisplayFromStr};
use std::path::PathBuf;

use crate::monitor::View;
use crate::prelude::*;
use crate::render::OutputFormat;
use crate::sort::{Order, SortColumn};

#[serde_as]
#[derive(Deserialize, Debug, Clone)]
pub struct LoggingConfig {
    #[serde_as(as = "DisplayFromStr")]
    #[serde(default = "LoggingConfig::default_level")]
    pub max_level: tracing::Level,

    /// Also emit events from the HTTP stack.
    #[serde(default)]
    pub include_http: bool,
}

impl LoggingConfig {
    fn default_level() -> tracing::Level {
        tracing::Level::WARN
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            max_level: Self::default_level(),
            include_http: Default::default(),
        }
    }
}

/// Default view used when the command line leaves a choice open.
#[derive(Deserialize, Debug, Default, Clone)]
pub struct DisplayConfig {
    pub filter: Option<usize>,
    pub order: Option<Order>,
    pub format: Option<OutputFormat>,
}

impl DisplayConfig {
    /// Merges explicit choices over the configured ones.
    pub fn view(
        &self,
        filter: Option<usize>,
        order: Option<Order>,
        format: Option<OutputFormat>,
    ) -> Result<View, Error> {
        let column = match filter.or(self.filter) {
            Some(x) => SortColumn::try_from(x)?,
            None => SortColumn::default(),
        };

        Ok(View {
            column,
            order: order.or(self.order).unwrap_or_default(),
            format: format.or(self.format).unwrap_or_default(),
        })
    }
}

#[derive(Deserialize, Debug, Default, Clone)]
pub struct Config {
    #[serde(default)]
    pub logging: LoggingConfig,

    #[serde(default)]
    pub display: DisplayConfig,
}

impl Config {
    pub fn new(explicit_file: &Option<PathBuf>) -> Result<Self, Error> {
        let mut s = ::config::Config::builder();

        // system-wide defaults
        s = s.add_source(
            ::config::File::with_name("/etc/marlin-monitor/monitor.toml").required(false),
        );

        // a file in the working dir overrides them
        s = s.add_source(::config::File::with_name("marlin-monitor.toml").required(false));

        // an explicit file is mandatory
        if let Some(explicit) = explicit_file.as_ref().and_then(|x| x.to_str()) {
            s = s.add_source(::config::File::with_name(explicit).required(true));
        }

        // env vars get the last word, eg. MARLIN_MONITOR_LOGGING__MAX_LEVEL
        s = s.add_source(
            ::config::Environment::with_prefix("MARLIN_MONITOR")
                .prefix_separator("_")
                .separator("__"),
        );

        Ok(s.build()?.try_deserialize()?)
    }
}
