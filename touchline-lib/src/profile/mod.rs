//! Profile model and the form state machine used to edit it.

mod avatar;
mod form;
mod model;

pub use avatar::{
    AvatarSlot, AvatarSource, LocalFile, PendingAvatar, PendingState, UploadTicket, resolve_url,
};
pub use form::{
    Mode, ProfileForm, SAVED_MESSAGE, SaveOutcome, SaveRequest, SaveTicket, UPLOAD_ERROR_MESSAGE,
    UploadRequest, UploadStatus,
};
pub use model::{
    Field, ImageRef, ImageRelation, InputKind, JobTitle, ProfileData, RelationData,
    UpdatePayload, UploadedFile, UserRecord, is_valid_email,
};
