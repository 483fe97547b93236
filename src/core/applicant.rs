use serde::{Deserialize, Serialize};
use std::fmt;

/// Longest applicant name accepted, in characters.
pub const MAX_NAME_LEN: usize = 200;

/// The person a pre-qualification certificate is issued to.
///
/// Only the name is required. Contact details are optional and blank
/// strings are treated as absent.
///
/// # Examples
///
/// ```
/// use prequal_engine::core::applicant::Applicant;
///
/// let applicant = Applicant::new("Jane Doe").with_email("jane@example.com");
/// assert_eq!(applicant.name(), "Jane Doe");
/// assert_eq!(applicant.email(), Some("jane@example.com"));
/// assert_eq!(applicant.phone(), None);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Applicant {
    name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    email: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    phone: Option<String>,
}

impl Applicant {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            email: None,
            phone: None,
        }
    }

    pub fn with_email(mut self, email: impl Into<String>) -> Self {
        self.email = non_blank(email.into());
        self
    }

    pub fn with_phone(mut self, phone: impl Into<String>) -> Self {
        self.phone = non_blank(phone.into());
        self
    }

    /// Trim every field and drop blank contact details.
    pub fn normalized(self) -> Self {
        Self {
            name: self.name.trim().to_string(),
            email: self.email.and_then(non_blank),
            phone: self.phone.and_then(non_blank),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn email(&self) -> Option<&str> {
        self.email.as_deref()
    }

    pub fn phone(&self) -> Option<&str> {
        self.phone.as_deref()
    }
}

fn non_blank(value: String) -> Option<String> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        None
    } else {
        Some(trimmed.to_string())
    }
}

impl fmt::Display for Applicant {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name)?;
        if let Some(email) = &self.email {
            write!(f, " <{}>", email)?;
        }
        Ok(())
    }
}
