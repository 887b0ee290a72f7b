use tracing::debug;

use crate::{
    Error, Result,
    api::{ProfileApi, UserSource},
    profile::{Field, JobTitle, LocalFile, ProfileForm, SaveOutcome},
};

/// Drives a [`ProfileForm`] against a server, one request at a time.
///
/// Front ends that need to stay responsive while requests run (the GUI) use the form directly
/// and spawn the requests themselves.
#[derive(Debug)]
pub struct ProfileEditor<A> {
    api: A,
    form: ProfileForm,
}

impl<A> ProfileEditor<A>
where
    A: UserSource + ProfileApi,
{
    /// Fetch the profile of `subject` and start in viewing mode.
    pub async fn load(api: A, subject: &str) -> Result<Self> {
        let record = api.fetch_user(subject).await?;
        Ok(Self {
            form: ProfileForm::new(&record),
            api,
        })
    }

    pub fn form(&self) -> &ProfileForm {
        &self.form
    }

    pub fn begin_edit(&mut self) {
        self.form.begin_edit();
    }

    pub fn cancel(&mut self) {
        self.form.cancel();
    }

    pub fn set_field(&mut self, field: Field, value: impl Into<String>) -> Result<()> {
        let value = value.into();
        if self.form.inputs_disabled() {
            return Err(Error::InvalidTransition(
                "fields can only be changed while editing",
            ));
        }
        if self.form.set_field(field, value.clone()) {
            Ok(())
        } else {
            Err(Error::Validation(format!(
                "'{value}' is not a valid {}",
                field.label().to_lowercase()
            )))
        }
    }

    pub fn set_job_title(&mut self, title: JobTitle) -> Result<()> {
        if self.form.set_job_title(title) {
            Ok(())
        } else {
            Err(Error::InvalidTransition(
                "the job title can only be changed while editing",
            ))
        }
    }

    /// Upload `file` and stage it as the new avatar. On failure the form keeps the preview and
    /// the returned error is the one reported by the server.
    pub async fn upload_avatar(&mut self, file: LocalFile) -> Result<()> {
        let request = self.form.begin_upload(file)?;
        match self.api.upload(&request.file).await {
            Ok(files) => {
                let empty = files.is_empty();
                self.form.finish_upload(request.ticket, Ok::<_, Error>(files));
                if empty {
                    Err(Error::EmptyUpload)
                } else {
                    Ok(())
                }
            }
            Err(err) => {
                self.form.finish_upload(request.ticket, Err::<Vec<_>, _>(&err));
                Err(err)
            }
        }
    }

    /// Persist the staged profile.
    pub async fn save(&mut self) -> Result<SaveOutcome> {
        let request = self.form.begin_submit()?;
        let result = self
            .api
            .update(&request.document_id, &request.payload)
            .await;
        let outcome = self.form.finish_submit(request.ticket, result.as_ref().map(|_| ()));
        debug!("Save finished with {:?}", outcome);

        result.map(|()| outcome)
    }

    /// Fetch the record again. Edits in progress are kept.
    pub async fn reload(&mut self, subject: &str) -> Result<()> {
        let record = self.api.fetch_user(subject).await?;
        self.form.load(&record);
        Ok(())
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::{
        api::stub::StubApi,
        profile::{Mode, SAVED_MESSAGE, UPLOAD_ERROR_MESSAGE, UserRecord},
    };

    fn record() -> UserRecord {
        UserRecord {
            document_id: Some("doc-1".into()),
            nom: Some("Doe".into()),
            prenom: Some("Jane".into()),
            email: Some("jane@club.fr".into()),
            ..UserRecord::default()
        }
    }

    #[tokio::test]
    async fn test_edit_and_save() {
        let api = StubApi::with_record(record());
        let mut editor = ProfileEditor::load(api.clone(), "sub-1").await.unwrap();

        editor.begin_edit();
        editor.set_field(Field::Prenom, "Jane2").unwrap();
        let outcome = editor.save().await.unwrap();

        assert_eq!(outcome, SaveOutcome::Saved(SAVED_MESSAGE));
        assert_eq!(editor.form().mode(), Mode::Viewing);
        assert_eq!(editor.form().profile().prenom, "Jane2");

        let updates = api.updates();
        assert_eq!(updates.len(), 1);
        let (document_id, payload) = updates.first().unwrap();
        assert_eq!(document_id, "doc-1");
        assert_eq!(payload.prenom, "Jane2");
        assert_eq!(payload.image, None);
    }

    #[tokio::test]
    async fn test_upload_then_save_sends_image_id() {
        let api = StubApi::with_record(record());
        let mut editor = ProfileEditor::load(api.clone(), "sub-1").await.unwrap();

        editor.begin_edit();
        editor
            .upload_avatar(LocalFile::new("me.png", vec![1u8, 2, 3]))
            .await
            .unwrap();
        editor.save().await.unwrap();

        let image = editor.form().profile().image.clone().unwrap();
        assert_eq!(image.url, "/uploads/me.png");
        assert_eq!(api.updates().first().unwrap().1.image, image.id);
    }

    #[tokio::test]
    async fn test_failed_upload_blocks_save() {
        let api = StubApi::with_record(record());
        api.fail_uploads(true);
        let mut editor = ProfileEditor::load(api.clone(), "sub-1").await.unwrap();

        editor.begin_edit();
        assert!(
            editor
                .upload_avatar(LocalFile::new("me.png", vec![1u8]))
                .await
                .is_err()
        );

        assert_eq!(editor.form().upload_error(), Some(UPLOAD_ERROR_MESSAGE));
        assert!(matches!(
            editor.save().await,
            Err(Error::InvalidTransition(_))
        ));
        assert!(api.updates().is_empty());
    }

    #[tokio::test]
    async fn test_failed_save_keeps_edits() {
        let api = StubApi::with_record(record());
        api.fail_updates(true);
        let mut editor = ProfileEditor::load(api.clone(), "sub-1").await.unwrap();

        editor.begin_edit();
        editor.set_job_title(JobTitle::PhysicalTrainer).unwrap();

        assert!(matches!(editor.save().await, Err(Error::Status { .. })));
        assert_eq!(editor.form().mode(), Mode::Editing);
        assert_eq!(
            editor.form().profile().titre_emploi,
            JobTitle::PhysicalTrainer
        );
        assert!(editor.form().save_error().is_some());
    }

    #[tokio::test]
    async fn test_load_unknown_subject() {
        let result = ProfileEditor::load(StubApi::default(), "ghost").await;

        assert!(matches!(result, Err(Error::UserNotFound(_))));
    }

    #[tokio::test]
    async fn test_set_field_outside_edit_mode() {
        let mut editor = ProfileEditor::load(StubApi::with_record(record()), "sub-1")
            .await
            .unwrap();

        assert!(matches!(
            editor.set_field(Field::Nom, "Smith"),
            Err(Error::InvalidTransition(_))
        ));

        editor.begin_edit();
        assert!(matches!(
            editor.set_field(Field::Telephone, "call me"),
            Err(Error::Validation(_))
        ));
    }

    #[tokio::test]
    async fn test_cancel_discards_staged_edits() {
        let api = StubApi::with_record(record());
        let mut editor = ProfileEditor::load(api.clone(), "sub-1").await.unwrap();

        editor.begin_edit();
        editor.set_field(Field::Ville, "Nantes").unwrap();
        editor.cancel();
        editor.reload("sub-1").await.unwrap();

        assert_eq!(editor.form().profile().ville, "");
        assert!(api.updates().is_empty());
    }
}
