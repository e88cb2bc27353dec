use std::io;
use std::path::PathBuf;
use std::string::FromUtf8Error;

use reqwest::StatusCode;

#[derive(Debug, thiserror::Error)]
pub enum FetchError {
    /// Transport failure or a body that is not the expected JSON.
    #[error("request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("failed to fetch posts: {0}")]
    Status(StatusCode),
}

#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("failed to read {}: {source}", .path.display())]
    Read { path: PathBuf, source: io::Error },

    #[error("failed to write {}: {source}", .path.display())]
    Write { path: PathBuf, source: io::Error },

    #[error("failed to encode {}: {source}", .path.display())]
    Encode {
        path: PathBuf,
        source: serde_json::Error,
    },
}

#[derive(Debug, thiserror::Error)]
pub enum LoadError {
    #[error("the file '{}' was not found", .0.display())]
    NotFound(PathBuf),

    #[error("failed to read {}: {source}", .path.display())]
    Io { path: PathBuf, source: io::Error },

    #[error("the file '{}' is not a valid JSON file: {source}", .path.display())]
    Parse {
        path: PathBuf,
        source: serde_json::Error,
    },

    /// Neither UTF-8 nor the Latin-1 fallback produced valid JSON.
    #[error("could not decode '{}' as UTF-8 ({utf8}) or Latin-1 ({latin1})", .path.display())]
    Encoding {
        path: PathBuf,
        utf8: FromUtf8Error,
        latin1: serde_json::Error,
    },

    #[error("the JSON file does not contain a list (found {0})")]
    NotAList(&'static str),
}

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("failed to read {}: {source}", .path.display())]
    Read { path: PathBuf, source: io::Error },

    #[error("invalid config {}: {source}", .path.display())]
    Parse {
        path: PathBuf,
        source: toml::de::Error,
    },

    #[error("batch must be at least 1")]
    ZeroBatch,
}
