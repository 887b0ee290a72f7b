use std::sync::Arc;

use async_trait::async_trait;
use parking_lot::Mutex;
use reqwest::StatusCode;

use crate::{
    Error, Result,
    api::{ProfileApi, UserSource},
    profile::{LocalFile, UpdatePayload, UploadedFile, UserRecord},
};

/// In-memory stand-in for the content server.
#[derive(Debug, Clone, Default)]
pub(crate) struct StubApi {
    inner: Arc<Mutex<StubState>>,
}

#[derive(Debug, Default)]
struct StubState {
    record: Option<UserRecord>,
    next_upload_id: u64,
    fail_uploads: bool,
    fail_updates: bool,
    updates: Vec<(String, UpdatePayload)>,
}

impl StubApi {
    pub fn with_record(record: UserRecord) -> Self {
        let stub = Self::default();
        stub.inner.lock().record = Some(record);
        stub
    }

    pub fn fail_uploads(&self, fail: bool) {
        self.inner.lock().fail_uploads = fail;
    }

    pub fn fail_updates(&self, fail: bool) {
        self.inner.lock().fail_updates = fail;
    }

    pub fn updates(&self) -> Vec<(String, UpdatePayload)> {
        self.inner.lock().updates.clone()
    }
}

#[async_trait]
impl UserSource for StubApi {
    async fn fetch_user(&self, subject: &str) -> Result<UserRecord> {
        self.inner
            .lock()
            .record
            .clone()
            .ok_or_else(|| Error::UserNotFound(subject.to_string()))
    }
}

#[async_trait]
impl ProfileApi for StubApi {
    async fn upload(&self, file: &LocalFile) -> Result<Vec<UploadedFile>> {
        let mut state = self.inner.lock();
        if state.fail_uploads {
            return Err(Error::Status {
                status: StatusCode::PAYLOAD_TOO_LARGE,
                body: String::new(),
            });
        }

        state.next_upload_id += 1;
        Ok(vec![UploadedFile {
            id: state.next_upload_id,
            url: format!("/uploads/{}", file.name()),
        }])
    }

    async fn update(&self, document_id: &str, payload: &UpdatePayload) -> Result<()> {
        let mut state = self.inner.lock();
        if state.fail_updates {
            return Err(Error::Status {
                status: StatusCode::INTERNAL_SERVER_ERROR,
                body: String::new(),
            });
        }

        state.updates.push((document_id.to_string(), payload.clone()));
        Ok(())
    }

    async fn fetch_image(&self, _url: &str) -> Result<Vec<u8>> {
        Ok(Vec::new())
    }
}
