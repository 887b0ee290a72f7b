use std::fmt::Display;

use tracing::{debug, error, warn};

use crate::{
    Error, Result,
    profile::{
        AvatarSlot, Field, ImageRef, JobTitle, LocalFile, PendingAvatar, ProfileData, UpdatePayload,
        UploadTicket, UploadedFile, UserRecord,
        avatar::{PendingState, ensure_image},
        model::is_valid_email,
    },
};

pub const UPLOAD_ERROR_MESSAGE: &str = "Failed to upload image. Please choose a smaller image.";
pub const SAVED_MESSAGE: &str = "Profile updated successfully";

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub enum Mode {
    #[default]
    Viewing,
    Editing,
}

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub enum UploadStatus {
    #[default]
    Idle,
    Uploading,
    Success,
    Error,
}

/// Identifies one save attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SaveTicket(u64);

/// Everything a transport needs to start an upload.
#[derive(Debug, Clone)]
pub struct UploadRequest {
    pub ticket: UploadTicket,
    pub file: LocalFile,
}

/// Everything a transport needs to persist the staged profile.
#[derive(Debug, Clone)]
pub struct SaveRequest {
    pub ticket: SaveTicket,
    pub document_id: String,
    pub payload: UpdatePayload,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SaveOutcome {
    /// The server accepted the update. Carries the notification to show.
    Saved(&'static str),
    Failed,
    /// The completion did not belong to the save in flight.
    Ignored,
}

#[derive(Debug, Clone)]
struct InFlightSave {
    ticket: SaveTicket,
    snapshot: ProfileData,
}

/// State machine behind the profile form.
///
/// While [`Mode::Viewing`] the staged profile always equals the last known server record. Edits,
/// uploads and saves only happen in [`Mode::Editing`]; network work is done by the caller,
/// which reports back through [`ProfileForm::finish_upload`] and [`ProfileForm::finish_submit`].
#[derive(Debug, Clone, Default)]
pub struct ProfileForm {
    baseline: ProfileData,
    profile: ProfileData,
    pending: Option<PendingAvatar>,
    mode: Mode,
    upload: UploadStatus,
    changed: bool,
    upload_error: Option<String>,
    save_error: Option<String>,
    in_flight: Option<InFlightSave>,
    next_ticket: u64,
}

impl ProfileForm {
    pub fn new(record: &UserRecord) -> Self {
        let baseline = ProfileData::from(record);
        Self {
            profile: baseline.clone(),
            baseline,
            ..Self::default()
        }
    }

    /// Replace the last known server record. Fields are only refreshed while viewing so that a
    /// late reload never clobbers edits; cancel will restore the new record.
    pub fn load(&mut self, record: &UserRecord) {
        self.baseline = ProfileData::from(record);
        if self.mode == Mode::Viewing {
            self.profile = self.baseline.clone();
        }
        debug!("Loaded profile {}", self.baseline.document_id);
    }

    // Accessors

    pub fn profile(&self) -> &ProfileData {
        &self.profile
    }

    pub fn baseline(&self) -> &ProfileData {
        &self.baseline
    }

    pub fn mode(&self) -> Mode {
        self.mode
    }

    pub fn is_editing(&self) -> bool {
        self.mode == Mode::Editing
    }

    pub fn is_saving(&self) -> bool {
        self.in_flight.is_some()
    }

    pub fn is_changed(&self) -> bool {
        self.changed
    }

    pub fn upload_status(&self) -> UploadStatus {
        self.upload
    }

    pub fn upload_error(&self) -> Option<&str> {
        self.upload_error.as_deref()
    }

    pub fn save_error(&self) -> Option<&str> {
        self.save_error.as_deref()
    }

    pub fn avatar(&self) -> AvatarSlot<'_> {
        AvatarSlot {
            committed: self.profile.image.as_ref(),
            pending: self.pending.as_ref(),
        }
    }

    /// A save or an upload is in flight.
    pub fn is_busy(&self) -> bool {
        self.is_saving() || self.upload == UploadStatus::Uploading
    }

    /// Whether text inputs and the job title selector should refuse input.
    pub fn inputs_disabled(&self) -> bool {
        !self.is_editing() || self.is_busy()
    }

    pub fn is_save_disabled(&self) -> bool {
        self.is_saving()
            || self.upload == UploadStatus::Error
            || self.upload == UploadStatus::Uploading
            || (!self.changed && self.upload == UploadStatus::Idle)
    }

    // Transitions

    pub fn begin_edit(&mut self) {
        if self.mode == Mode::Viewing {
            self.mode = Mode::Editing;
            debug!("Editing profile {}", self.profile.document_id);
        }
    }

    /// Stage a new value for `field`. Returns `false` if the edit was refused.
    pub fn set_field(&mut self, field: Field, value: impl Into<String>) -> bool {
        let value = value.into();
        if self.inputs_disabled() {
            return false;
        }

        let slot = self.profile.get_mut(field);
        if !field.accepts_edit(slot.as_str(), &value) {
            return false;
        }
        if *slot != value {
            *slot = value;
            self.changed = true;
        }
        true
    }

    pub fn set_job_title(&mut self, title: JobTitle) -> bool {
        if self.inputs_disabled() {
            return false;
        }

        if self.profile.titre_emploi != title {
            self.profile.titre_emploi = title;
            self.changed = true;
        }
        true
    }

    /// Show `file` as the avatar preview and hand out the request for the transport.
    pub fn begin_upload(&mut self, file: LocalFile) -> Result<UploadRequest> {
        if !self.is_editing() {
            return Err(Error::InvalidTransition(
                "the avatar can only be changed while editing",
            ));
        }
        if self.is_saving() {
            return Err(Error::InvalidTransition(
                "the avatar cannot be changed while saving",
            ));
        }
        if self.upload == UploadStatus::Uploading {
            return Err(Error::InvalidTransition("an upload is already in progress"));
        }
        ensure_image(&file)?;

        let ticket = UploadTicket(self.next_ticket());
        // Replacing the pending stage releases the previous preview
        self.pending = Some(PendingAvatar {
            preview: file.clone(),
            ticket,
            state: PendingState::Uploading,
        });
        self.upload = UploadStatus::Uploading;
        debug!("Uploading avatar {}", file.name());

        Ok(UploadRequest { ticket, file })
    }

    /// Apply the result of an upload. Returns `false` if the ticket is stale.
    pub fn finish_upload<E: Display>(
        &mut self,
        ticket: UploadTicket,
        result: std::result::Result<Vec<UploadedFile>, E>,
    ) -> bool {
        let Some(pending) = self
            .pending
            .as_mut()
            .filter(|p| p.ticket == ticket && p.state == PendingState::Uploading)
        else {
            warn!("Ignoring completion of stale upload {:?}", ticket);
            return false;
        };

        match result.map(|files| files.into_iter().next()) {
            Ok(Some(file)) => {
                self.profile.image = Some(ImageRef {
                    url: file.url,
                    id: Some(file.id),
                });
                self.pending = None;
                self.upload = UploadStatus::Success;
                self.upload_error = None;
                self.changed = true;
                debug!("Avatar committed as upload {}", file.id);
            }
            Ok(None) => {
                error!("Failed to upload image: {}", Error::EmptyUpload);
                pending.state = PendingState::Failed;
                self.upload = UploadStatus::Error;
                self.upload_error = Some(UPLOAD_ERROR_MESSAGE.into());
            }
            Err(err) => {
                error!("Failed to upload image: {err}");
                pending.state = PendingState::Failed;
                self.upload = UploadStatus::Error;
                self.upload_error = Some(UPLOAD_ERROR_MESSAGE.into());
            }
        }

        true
    }

    /// Lock the form and build the update for the staged profile.
    pub fn begin_submit(&mut self) -> Result<SaveRequest> {
        if !self.is_editing() {
            return Err(Error::InvalidTransition("there is nothing being edited"));
        }
        if self.is_save_disabled() {
            return Err(Error::InvalidTransition("saving is currently disabled"));
        }
        if !self.profile.email.is_empty() && !is_valid_email(&self.profile.email) {
            return Err(Error::Validation(format!(
                "'{}' is not a valid email address",
                self.profile.email
            )));
        }

        let ticket = SaveTicket(self.next_ticket());
        self.save_error = None;
        self.in_flight = Some(InFlightSave {
            ticket,
            snapshot: self.profile.clone(),
        });
        debug!("Saving profile {}", self.profile.document_id);

        Ok(SaveRequest {
            ticket,
            document_id: self.profile.document_id.clone(),
            payload: self.profile.update_payload(),
        })
    }

    /// Apply the result of a save.
    pub fn finish_submit<E: Display>(
        &mut self,
        ticket: SaveTicket,
        result: std::result::Result<(), E>,
    ) -> SaveOutcome {
        let Some(in_flight) = self.in_flight.take_if(|s| s.ticket == ticket) else {
            warn!("Ignoring completion of stale save {:?}", ticket);
            return SaveOutcome::Ignored;
        };

        match result {
            Ok(()) => {
                self.baseline = in_flight.snapshot;
                match self.mode {
                    Mode::Editing => {
                        self.mode = Mode::Viewing;
                        self.changed = false;
                        self.upload = UploadStatus::Idle;
                        self.pending = None;
                        self.profile = self.baseline.clone();
                    }
                    // Cancelled while the request was in flight
                    Mode::Viewing => self.profile = self.baseline.clone(),
                }
                debug!("Saved profile {}", self.baseline.document_id);
                SaveOutcome::Saved(SAVED_MESSAGE)
            }
            Err(err) => {
                error!("Failed to update profile: {err}");
                if self.mode == Mode::Editing {
                    self.save_error = Some(format!("Failed to update profile: {err}"));
                }
                SaveOutcome::Failed
            }
        }
    }

    /// Throw away every staged change and go back to the last known server record.
    pub fn cancel(&mut self) {
        self.mode = Mode::Viewing;
        self.upload = UploadStatus::Idle;
        self.changed = false;
        self.upload_error = None;
        self.save_error = None;
        self.pending = None;
        self.profile = self.baseline.clone();
        debug!("Cancelled edit of profile {}", self.profile.document_id);
    }

    fn next_ticket(&mut self) -> u64 {
        self.next_ticket = self.next_ticket.wrapping_add(1);
        self.next_ticket
    }
}
