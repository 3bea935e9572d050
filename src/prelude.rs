pub use super::model::*;

use miette::Diagnostic;
use std::fmt::Display;
use thiserror::Error;

#[derive(Error, Debug, Diagnostic)]
pub enum Error {
    #[error("transport error: {0}")]
    #[diagnostic(help("upstream data sources are required, the run cannot continue without them"))]
    TransportError(String),

    #[error("parse error: {0}")]
    ParseError(String),

    #[error("configuration error: {0}")]
    ConfigError(String),

    #[error("io error: {0}")]
    IO(#[from] std::io::Error),
}

impl Error {
    pub fn transport(error: impl Display) -> Error {
        Error::TransportError(error.to_string())
    }

    pub fn parse(error: impl Display) -> Error {
        Error::ParseError(error.to_string())
    }

    pub fn config(text: impl Display) -> Error {
        Error::ConfigError(text.to_string())
    }
}

impl From<reqwest::Error> for Error {
    fn from(err: reqwest::Error) -> Self {
        Error::transport(err)
    }
}

impl From<::config::ConfigError> for Error {
    fn from(err: ::config::ConfigError) -> Self {
        Error::config(err)
    }
}
