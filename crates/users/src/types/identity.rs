//! Authenticated principal attached to a request.

/// The authenticated caller of a directory operation.
///
/// `token_identifier` is `"{issuer}|{subject}"` and matches the key stored on
/// the caller's user record.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CallerIdentity {
    pub token_identifier: String,
    pub issuer: String,
    pub subject: String,
    pub email: Option<String>,
    pub name: Option<String>,
}

impl CallerIdentity {
    pub fn new(issuer: impl Into<String>, subject: impl Into<String>) -> Self {
        let issuer = issuer.into();
        let subject = subject.into();
        Self {
            token_identifier: format!("{issuer}|{subject}"),
            issuer,
            subject,
            email: None,
            name: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_token_identifier_joins_issuer_and_subject() {
        let identity = CallerIdentity::new("https://clerk.example", "user_42");

        assert_eq!(identity.token_identifier, "https://clerk.example|user_42");
        assert_eq!(identity.issuer, "https://clerk.example");
        assert_eq!(identity.subject, "user_42");
        assert!(identity.email.is_none());
        assert!(identity.name.is_none());
    }
}
