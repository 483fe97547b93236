use std::fmt;

/// A bearer token issued by the identity provider.
///
/// Passed explicitly to each outbound call; nothing in this crate keeps
/// a session in global state. `Debug` never prints the token.
#[derive(Clone, PartialEq, Eq)]
pub struct Credential(String);

impl Credential {
    /// `None` for an empty or whitespace-only token.
    pub fn bearer(token: impl Into<String>) -> Option<Self> {
        let token = token.into();
        if token.trim().is_empty() {
            None
        } else {
            Some(Self(token.trim().to_string()))
        }
    }

    pub fn token(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for Credential {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Credential(<redacted>)")
    }
}

/// Whether an action may proceed without a signed-in session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum AuthPolicy {
    /// Attach the credential when present, call anonymously otherwise.
    #[default]
    Optional,
    /// Refuse the action unless a credential is supplied.
    Required,
}
