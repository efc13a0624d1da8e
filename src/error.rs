// Error types shared by the library modules. The binary wraps these in
// `anyhow` at the edge; inside the crate every fallible function returns
// `Result<T>` with `QpiError`.

use std::io;
use std::path::PathBuf;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum QpiError {
    /// A credential field resolved to nothing (empty flag, env var and prompt).
    #[error("missing {field}: pass --{field} or set {env}")]
    MissingValue {
        field: &'static str,
        env: &'static str,
    },

    #[error("cannot prompt for {field}: stdin is not a terminal (pass --{field} or set {env})")]
    NotInteractive {
        field: &'static str,
        env: &'static str,
    },

    #[error("prompt for {field} failed")]
    Prompt {
        field: &'static str,
        #[source]
        source: io::Error,
    },

    #[error("failed to read {}", path.display())]
    ReadInput {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("{} is not valid UTF-8", path.display())]
    InvalidEncoding {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("token contains characters that are not valid in a header")]
    InvalidToken(#[from] reqwest::header::InvalidHeaderValue),

    #[error("authentication rejected: {status} - {body}")]
    AuthenticationRejected { status: u16, body: String },

    /// The server refused the token on a submission. Nothing later can
    /// succeed with the same token.
    #[error("token rejected: {status} - {body}")]
    Unauthorized { status: u16, body: String },

    #[error("submission rejected: {status} - {body}")]
    SubmissionRejected { status: u16, body: String },

    #[error("http request failed")]
    Http(#[from] reqwest::Error),
}

pub type Result<T> = std::result::Result<T, QpiError>;
