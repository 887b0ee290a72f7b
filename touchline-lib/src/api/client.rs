use async_trait::async_trait;
use reqwest::{
    Client, Method, RequestBuilder, Response,
    multipart::{Form, Part},
};
use serde::{Deserialize, Serialize, de::DeserializeOwned};
use tracing::{debug, info, warn};
use url::Url;

use crate::{
    CoreConfig, Error, Result,
    api::{ProfileApi, UserSource},
    profile::{LocalFile, UpdatePayload, UploadedFile, UserRecord},
};

/// Field name the upload endpoint expects the file under
const UPLOAD_FIELD: &str = "files";

#[derive(Serialize)]
struct UpdateBody<'a> {
    data: &'a UpdatePayload,
}

#[derive(Deserialize)]
struct Envelope<T> {
    data: Option<T>,
}

/// HTTP client for the content server.
#[derive(Clone)]
pub struct ApiClient {
    client: Client,
    api_url: Url,
    token: Option<String>,
}

impl std::fmt::Debug for ApiClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ApiClient")
            .field("api_url", &self.api_url.as_str())
            .field("has_token", &self.token.is_some())
            .finish()
    }
}

impl ApiClient {
    pub fn new(cfg: &CoreConfig) -> Result<Self> {
        let client = Client::builder().timeout(cfg.request_timeout()).build()?;
        let api_url = api_url(&cfg.base_endpoint, &cfg.api_prefix)?;

        info!("Using content API at {api_url}");

        Ok(Self {
            client,
            api_url,
            token: None,
        })
    }

    /// Attach a bearer token to every request.
    pub fn with_token(mut self, token: Option<String>) -> Self {
        self.token = token;
        self
    }

    pub fn api_url(&self) -> &Url {
        &self.api_url
    }

    fn endpoint(&self, segments: &[&str]) -> Result<Url> {
        let mut url = self.api_url.clone();
        url.path_segments_mut()
            .map_err(|_| Error::Url(url::ParseError::RelativeUrlWithCannotBeABaseBase))?
            .pop_if_empty()
            .extend(segments);
        Ok(url)
    }

    /// Start a request to `url`. The token only goes to the content server's own origin.
    fn request(&self, method: Method, url: Url) -> RequestBuilder {
        let same_origin = url.origin() == self.api_url.origin();
        let request = self.client.request(method, url);

        match &self.token {
            Some(token) if same_origin => request.bearer_auth(token),
            _ => request,
        }
    }

    async fn send(&self, request: RequestBuilder) -> Result<Response> {
        let response = request.send().await?;
        let status = response.status();

        if status.is_success() {
            Ok(response)
        } else {
            let body = response.text().await.unwrap_or_default();
            warn!("Request to {} failed with {status}", self.api_url);
            Err(Error::Status { status, body })
        }
    }

    async fn json<T: DeserializeOwned>(&self, request: RequestBuilder) -> Result<T> {
        let bytes = self.send(request).await?.bytes().await?;
        Ok(serde_json::from_slice(&bytes)?)
    }
}

#[async_trait]
impl UserSource for ApiClient {
    async fn fetch_user(&self, subject: &str) -> Result<UserRecord> {
        let url = self.endpoint(&["utilisateurs"])?;
        debug!("Fetching profile of {subject}");

        let request = self
            .request(Method::GET, url)
            .query(&[("filters[sub][$eq]", subject), ("populate", "image")]);
        let envelope: Envelope<Vec<UserRecord>> = self.json(request).await?;

        envelope
            .data
            .and_then(|records| records.into_iter().next())
            .ok_or_else(|| Error::UserNotFound(subject.to_string()))
    }
}

#[async_trait]
impl ProfileApi for ApiClient {
    async fn upload(&self, file: &LocalFile) -> Result<Vec<UploadedFile>> {
        let url = self.endpoint(&["upload"])?;
        info!("Uploading {} ({} bytes)", file.name(), file.bytes().len());

        let part = Part::bytes(file.bytes().to_vec())
            .file_name(file.name().to_string())
            .mime_str(&file.mime())?;
        let form = Form::new().part(UPLOAD_FIELD, part);

        self.json(self.request(Method::POST, url).multipart(form)).await
    }

    async fn update(&self, document_id: &str, payload: &UpdatePayload) -> Result<()> {
        let url = self.endpoint(&["utilisateurs", document_id])?;
        info!("Updating profile {document_id}");

        let request = self
            .request(Method::PUT, url)
            .json(&UpdateBody { data: payload });
        let envelope: Envelope<serde_json::Value> = self.json(request).await?;

        match envelope.data {
            Some(value) if !value.is_null() => Ok(()),
            _ => Err(Error::MissingData),
        }
    }

    async fn fetch_image(&self, url: &str) -> Result<Vec<u8>> {
        let url = Url::parse(url)?;
        let bytes = self.send(self.request(Method::GET, url)).await?.bytes().await?;
        Ok(bytes.to_vec())
    }
}

/// `{base_endpoint}/{api_prefix}/`, tolerating stray slashes on either part.
fn api_url(base_endpoint: &str, api_prefix: &str) -> Result<Url> {
    let mut raw = base_endpoint.trim().trim_end_matches('/').to_string();
    let prefix = api_prefix.trim_matches('/');
    if !prefix.is_empty() {
        raw.push('/');
        raw.push_str(prefix);
    }
    raw.push('/');

    Ok(Url::parse(&raw)?)
}
