use std::path::PathBuf;

use reqwest::StatusCode;

pub type Result<T, E = Error> = std::result::Result<T, E>;

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("request to {url} failed")]
    Request {
        url: String,
        #[source]
        source: reqwest::Error,
    },

    #[error("request to {url} returned status {status}")]
    Status { url: String, status: StatusCode },

    #[error("failed to decode response of {url}")]
    Decode {
        url: String,
        #[source]
        source: reqwest::Error,
    },

    #[error("unexpected response from {url}: {reason}")]
    Envelope { url: String, reason: String },

    #[error("invalid url: {0}")]
    InvalidUrl(#[from] url::ParseError),

    #[error("no downloader executable found (tried {}), set {override_var} to its path", .candidates.join(", "))]
    Configuration {
        candidates: Vec<&'static str>,
        override_var: &'static str,
    },
}

impl Error {
    /// Whether the error came from talking to an upstream site.
    pub fn is_upstream(&self) -> bool {
        !matches!(self, Error::Configuration { .. })
    }
}

#[derive(Debug, thiserror::Error)]
pub enum DownloadError {
    #[error("failed to start {}", .program.display())]
    Spawn {
        program: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("downloader exited with {}", describe_exit(.code))]
    ExitStatus { code: Option<i32> },

    #[error("failed to prepare output directory {}", .path.display())]
    OutputDir {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

fn describe_exit(code: &Option<i32>) -> String {
    match code {
        Some(code) => format!("code {code}"),
        None => "a signal".to_owned(),
    }
}
