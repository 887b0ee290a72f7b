use std::env;

/// Subject identifier and credentials of the signed-in user.
///
/// Passed explicitly to whatever loads the profile; nothing in the library reads it from
/// ambient state.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Session {
    pub subject: String,
    pub token: Option<String>,
}

pub const SUBJECT_VAR: &str = "TOUCHLINE_SUBJECT";
pub const TOKEN_VAR: &str = "TOUCHLINE_TOKEN";

impl Session {
    pub fn new(subject: impl Into<String>, token: Option<String>) -> Self {
        Self {
            subject: subject.into(),
            token,
        }
    }

    /// Build a session from `TOUCHLINE_SUBJECT` and `TOUCHLINE_TOKEN`. Returns `None` when no
    /// subject is set.
    pub fn from_env() -> Option<Self> {
        let subject = env::var(SUBJECT_VAR).ok().filter(|s| !s.is_empty())?;
        let token = env::var(TOKEN_VAR).ok().filter(|t| !t.is_empty());

        Some(Self::new(subject, token))
    }
}
