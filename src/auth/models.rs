use serde::{Deserialize, Serialize};

/// The authenticated caller of an operation.
///
/// Only `subject` takes part in authorization decisions: it is compared
/// against a document's `owner_id`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Identity {
    /// Stable subject identifier issued by the identity provider.
    pub subject: String,
    /// Display email, if the provider supplies one.
    #[serde(default)]
    pub email: Option<String>,
}

impl Identity {
    pub fn new(subject: impl Into<String>) -> Self {
        Self {
            subject: subject.into(),
            email: None,
        }
    }

    pub fn with_email(mut self, email: impl Into<String>) -> Self {
        self.email = Some(email.into());
        self
    }
}
