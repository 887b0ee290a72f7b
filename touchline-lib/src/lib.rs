//! Core library for Touchline.
//!
//! Holds the profile model, the edit/save/cancel state machine that drives the
//! profile form, and the HTTP service used to read, upload and update profile
//! records. Front ends own a [`ProfileForm`] and feed it the results of
//! [`ProfileApi`] calls.

use reqwest::StatusCode;
use thiserror::Error;

pub mod api;
pub mod config;
pub mod editor;
pub mod fs;
pub mod profile;
pub mod session;

pub use api::{ApiClient, ProfileApi, UserSource};
pub use config::{Cfg, CoreConfig};
pub use editor::ProfileEditor;
pub use profile::{
    AvatarSource, Field, ImageRef, JobTitle, LocalFile, Mode, ProfileData, ProfileForm,
    SaveOutcome, UploadStatus, UserRecord,
};
pub use session::Session;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, Error)]
pub enum Error {
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),
    #[error("server responded with {status}: {body}")]
    Status { status: StatusCode, body: String },
    #[error("malformed response: {0}")]
    Decode(#[from] serde_json::Error),
    #[error("invalid URL: {0}")]
    Url(#[from] url::ParseError),
    #[error("the server returned no uploaded file")]
    EmptyUpload,
    #[error("the server response carried no data")]
    MissingData,
    #[error("no profile found for subject '{0}'")]
    UserNotFound(String),
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    #[error("failed to parse configuration: {0}")]
    ConfigParse(#[from] toml::de::Error),
    #[error("failed to write configuration: {0}")]
    ConfigWrite(#[from] toml::ser::Error),
    #[error("$HOME must exist")]
    NoHome,
    #[error("{0}")]
    Validation(String),
    #[error("{0}")]
    InvalidTransition(&'static str),
}
