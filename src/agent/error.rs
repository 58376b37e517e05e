use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Clone, Copy, PartialEq, Eq, strum_macros::Display)]
#[strum(serialize_all = "snake_case")]
pub enum SourceKind {
    Orientation,
    Position,
    Liveness,
}

#[derive(Debug, Error)]
pub enum SourceError {
    #[error("{kind}: failed to read {path}: {source}")]
    Io {
        kind: SourceKind,
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("{kind}: expected {expected} fields, found {found}")]
    FieldCount {
        kind: SourceKind,
        expected: &'static str,
        found: usize,
    },
    #[error("{kind}: invalid {field} value {value:?}")]
    InvalidField {
        kind: SourceKind,
        field: &'static str,
        value: String,
    },
}

#[derive(Debug, Error)]
pub enum HeartbeatError {
    #[error("failed to write liveness file {path}: {source}")]
    Publish {
        path: PathBuf,
        source: std::io::Error,
    },
}

#[derive(Debug, Error)]
pub enum UploadError {
    #[error("network error: {0}")]
    Transport(#[source] reqwest::Error),
    #[error("collector returned {status}: {body}")]
    Status {
        status: reqwest::StatusCode,
        body: String,
    },
    #[error("unreadable collector response: {0}")]
    Decode(#[source] reqwest::Error),
}
