//! Two-stage avatar handling.
//!
//! A freshly picked file is shown straight away as a local preview while it is uploaded. Only
//! once the server acknowledges it does the returned [`ImageRef`] become the committed avatar
//! of the profile. The preview bytes live in a [`PendingAvatar`] and are dropped as soon as the
//! pending stage is replaced, committed or discarded.

use std::{fmt, fs, path::Path, sync::Arc};

use crate::{Error, Result, profile::ImageRef};

/// A file picked on the local machine.
#[derive(Clone, PartialEq, Eq)]
pub struct LocalFile {
    name: String,
    bytes: Arc<[u8]>,
}

impl fmt::Debug for LocalFile {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LocalFile")
            .field("name", &self.name)
            .field("len", &self.bytes.len())
            .finish()
    }
}

impl LocalFile {
    pub fn new(name: impl Into<String>, bytes: impl Into<Arc<[u8]>>) -> Self {
        Self {
            name: name.into(),
            bytes: bytes.into(),
        }
    }

    pub fn read(path: &Path) -> Result<Self> {
        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| "avatar".into());

        Ok(Self::new(name, fs::read(path)?))
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn bytes(&self) -> &[u8] {
        &self.bytes
    }

    /// MIME type guessed from the file name.
    pub fn mime(&self) -> String {
        mime_guess::from_path(&self.name)
            .first_or_octet_stream()
            .essence_str()
            .to_string()
    }

    pub fn is_image(&self) -> bool {
        mime_guess::from_path(&self.name)
            .first()
            .is_some_and(|m| m.type_() == mime_guess::mime::IMAGE)
    }
}

/// Identifies one upload attempt. Completions carrying an outdated ticket are ignored.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct UploadTicket(pub(crate) u64);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PendingState {
    Uploading,
    Failed,
}

/// A local preview waiting for server confirmation.
#[derive(Debug, Clone)]
pub struct PendingAvatar {
    pub(crate) preview: LocalFile,
    pub(crate) ticket: UploadTicket,
    pub(crate) state: PendingState,
}

impl PendingAvatar {
    pub fn preview(&self) -> &LocalFile {
        &self.preview
    }

    pub fn ticket(&self) -> UploadTicket {
        self.ticket
    }

    pub fn state(&self) -> PendingState {
        self.state
    }
}

/// What the avatar widget should display.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AvatarSource<'a> {
    Preview(&'a LocalFile),
    Remote(String),
    Placeholder(String),
}

/// Borrowed view of both avatar stages of a form.
#[derive(Debug, Clone, Copy)]
pub struct AvatarSlot<'a> {
    pub committed: Option<&'a ImageRef>,
    pub pending: Option<&'a PendingAvatar>,
}

impl<'a> AvatarSlot<'a> {
    /// Pick the preview first, then the committed image resolved against `base_endpoint`, then
    /// the placeholder.
    pub fn source(&self, base_endpoint: &str, placeholder: &str) -> AvatarSource<'a> {
        if let Some(pending) = self.pending {
            return AvatarSource::Preview(&pending.preview);
        }

        match self.committed {
            Some(image) if !image.url.is_empty() => {
                AvatarSource::Remote(resolve_url(base_endpoint, &image.url))
            }
            _ => AvatarSource::Placeholder(placeholder.to_string()),
        }
    }
}

/// Join a path returned by the API onto the configured base endpoint. Absolute URLs are kept
/// as they are.
pub fn resolve_url(base_endpoint: &str, url: &str) -> String {
    if url.starts_with("http://") || url.starts_with("https://") {
        return url.to_string();
    }

    let base = base_endpoint.trim_end_matches('/');
    if url.starts_with('/') {
        format!("{base}{url}")
    } else {
        format!("{base}/{url}")
    }
}

pub(crate) fn ensure_image(file: &LocalFile) -> Result<()> {
    if file.is_image() {
        Ok(())
    } else {
        Err(Error::Validation(format!(
            "'{}' is not an image file",
            file.name()
        )))
    }
}

#[cfg(test)]
mod test {
    use super::*;

    fn pending(name: &str) -> PendingAvatar {
        PendingAvatar {
            preview: LocalFile::new(name, vec![1, 2, 3]),
            ticket: UploadTicket(1),
            state: PendingState::Uploading,
        }
    }

    #[test]
    fn test_source_prefers_preview() {
        let committed = ImageRef {
            url: "/uploads/old.png".into(),
            id: Some(1),
        };
        let pending = pending("new.png");
        let slot = AvatarSlot {
            committed: Some(&committed),
            pending: Some(&pending),
        };

        assert_eq!(
            slot.source("http://cms", "placeholder"),
            AvatarSource::Preview(&pending.preview)
        );
    }

    #[test]
    fn test_source_resolves_committed() {
        let committed = ImageRef {
            url: "/uploads/old.png".into(),
            id: Some(1),
        };
        let slot = AvatarSlot {
            committed: Some(&committed),
            pending: None,
        };

        assert_eq!(
            slot.source("http://cms/", "placeholder"),
            AvatarSource::Remote("http://cms/uploads/old.png".into())
        );
    }

    #[test]
    fn test_source_placeholder() {
        let empty = ImageRef {
            url: "".into(),
            id: None,
        };
        let slot = AvatarSlot {
            committed: Some(&empty),
            pending: None,
        };
        assert_eq!(
            slot.source("http://cms", "ph"),
            AvatarSource::Placeholder("ph".into())
        );

        let slot = AvatarSlot {
            committed: None,
            pending: None,
        };
        assert_eq!(
            slot.source("http://cms", "ph"),
            AvatarSource::Placeholder("ph".into())
        );
    }

    #[test]
    fn test_resolve_url() {
        assert_eq!(
            resolve_url("http://cms", "uploads/a.png"),
            "http://cms/uploads/a.png"
        );
        assert_eq!(
            resolve_url("http://cms", "https://cdn.example/a.png"),
            "https://cdn.example/a.png"
        );
    }

    #[test]
    fn test_local_file_kind() {
        let png = LocalFile::new("me.PNG", vec![0u8; 4]);
        assert!(png.is_image());
        assert_eq!(png.mime(), "image/png");

        let pdf = LocalFile::new("cv.pdf", vec![0u8; 4]);
        assert!(!pdf.is_image());
        assert!(matches!(ensure_image(&pdf), Err(Error::Validation(_))));
    }

    #[test]
    fn test_local_file_read() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("avatar.jpg");
        fs::write(&path, b"jpeg").unwrap();

        let file = LocalFile::read(&path).unwrap();

        assert_eq!(file.name(), "avatar.jpg");
        assert_eq!(file.bytes(), b"jpeg");
    }
}
