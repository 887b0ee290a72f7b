use iced::{
    Element,
    widget::{container, image, text},
};
use touchline_lib::{AvatarSource, LocalFile, ProfileForm, profile::UploadTicket};

use super::Message;

const AVATAR_SIZE: f32 = 120.0;

/// Decoded images backing the avatar widget.
#[derive(Debug, Default)]
pub struct AvatarImages {
    preview: Option<(UploadTicket, image::Handle)>,
    remote: Option<(String, image::Handle)>,
}

impl AvatarImages {
    pub fn set_preview(&mut self, ticket: UploadTicket, file: &LocalFile) {
        self.preview = Some((ticket, image::Handle::from_bytes(file.bytes().to_vec())));
    }

    pub fn set_remote(&mut self, url: String, bytes: Vec<u8>) {
        self.remote = Some((url, image::Handle::from_bytes(bytes)));
    }

    pub fn has_remote(&self, url: &str) -> bool {
        self.remote.as_ref().is_some_and(|(cached, _)| cached == url)
    }

    /// Forget the preview once the form has committed, replaced or discarded it.
    pub fn release_stale_preview(&mut self, form: &ProfileForm) {
        let pending = form.avatar().pending.map(|p| p.ticket());
        if self.preview.as_ref().map(|(ticket, _)| *ticket) != pending {
            self.preview = None;
        }
    }

    pub fn view<'a>(&'a self, source: &AvatarSource<'_>, initials: String) -> Element<'a, Message> {
        let handle = match source {
            AvatarSource::Preview(_) => self.preview.as_ref().map(|(_, handle)| handle),
            AvatarSource::Remote(url) | AvatarSource::Placeholder(url) => self
                .remote
                .as_ref()
                .filter(|(cached, _)| cached == url)
                .map(|(_, handle)| handle),
        };

        match handle {
            Some(handle) => image(handle.clone())
                .width(AVATAR_SIZE)
                .height(AVATAR_SIZE)
                .into(),
            // Still fetching, or the fetch failed
            None => container(text(initials).size(36))
                .center(AVATAR_SIZE)
                .style(container::rounded_box)
                .into(),
        }
    }
}

#[cfg(test)]
mod test {
    use touchline_lib::UserRecord;

    use super::*;

    #[test]
    fn test_preview_released_after_cancel() {
        let mut form = ProfileForm::new(&UserRecord::default());
        let mut images = AvatarImages::default();

        form.begin_edit();
        let request = form
            .begin_upload(LocalFile::new("me.png", vec![1u8, 2, 3]))
            .unwrap();
        images.set_preview(request.ticket, &request.file);
        images.release_stale_preview(&form);
        assert!(images.preview.is_some());

        form.cancel();
        images.release_stale_preview(&form);
        assert!(images.preview.is_none());
    }

    #[test]
    fn test_remote_cache_is_keyed_by_url() {
        let mut images = AvatarImages::default();
        images.set_remote("http://cms/a.png".into(), vec![0u8; 4]);

        assert!(images.has_remote("http://cms/a.png"));
        assert!(!images.has_remote("http://cms/b.png"));
    }
}
