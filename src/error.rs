use std::path::PathBuf;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file at {path}: {source}")]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Failed to parse config file at {path}: {source}")]
    Parse {
        path: PathBuf,
        source: toml::de::Error,
    },
}

#[derive(Debug, Error)]
pub enum ApiError {
    #[error("Invalid API URL `{url}`: {reason}")]
    InvalidUrl { url: String, reason: String },

    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Request failed with status {status}{}", message_suffix(.message))]
    Status { status: u16, message: Option<String> },

    #[error("Failed to decode response from {url}: {source}")]
    Decode {
        url: String,
        source: serde_json::Error,
    },
}

fn message_suffix(message: &Option<String>) -> String {
    message
        .as_deref()
        .map(|message| format!(": {message}"))
        .unwrap_or_default()
}

impl ApiError {
    /// The message reported by the CMS, or `default` for any other failure.
    pub fn message_or(&self, default: &str) -> String {
        match self {
            ApiError::Status {
                message: Some(message),
                ..
            } => message.clone(),
            _ => default.to_string(),
        }
    }
}

#[derive(Debug, Error)]
pub enum SessionError {
    #[error("Failed to access session file at {path}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Session file at {path} is corrupt: {source}")]
    Corrupt {
        path: PathBuf,
        source: serde_json::Error,
    },
}

#[derive(Debug, Error)]
pub enum AuthError {
    /// The CMS refused the credentials or the request failed.
    #[error("{message}")]
    Rejected {
        message: String,
        #[source]
        source: ApiError,
    },

    #[error(transparent)]
    Session(#[from] SessionError),
}

impl AuthError {
    pub(crate) fn rejected(source: ApiError, default: &str) -> Self {
        AuthError::Rejected {
            message: source.message_or(default),
            source,
        }
    }
}
