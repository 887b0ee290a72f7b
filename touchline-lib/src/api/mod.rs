//! Seams to the content server.
//!
//! [`UserSource`] reads profile records and [`ProfileApi`] writes them. [`ApiClient`] implements
//! both over HTTP; tests swap in an in-memory double.

use std::fmt::Debug;

use async_trait::async_trait;

use crate::{
    Result,
    profile::{LocalFile, UpdatePayload, UploadedFile, UserRecord},
};

mod client;
#[cfg(test)]
pub(crate) mod stub;

pub use client::ApiClient;

/// Looks up the profile record belonging to an authenticated subject.
#[async_trait]
pub trait UserSource: Send + Sync + Debug {
    async fn fetch_user(&self, subject: &str) -> Result<UserRecord>;
}

#[async_trait]
pub trait ProfileApi: Send + Sync + Debug {
    /// `POST upload` with `file` as the `files` part.
    async fn upload(&self, file: &LocalFile) -> Result<Vec<UploadedFile>>;

    /// `PUT utilisateurs/{document_id}` with `{ "data": payload }`.
    async fn update(&self, document_id: &str, payload: &UpdatePayload) -> Result<()>;

    /// Download the bytes behind an absolute image URL.
    async fn fetch_image(&self, url: &str) -> Result<Vec<u8>>;
}
