use serde::Serialize;
use std::fmt;

/// Server-assigned message sequence number, rendered as text.
///
/// Only meaningful for the INBOX selection of the connection that produced it;
/// a later connection may map the same number to a different message.
pub type MessageId = String;

/// Everything needed to open an authenticated IMAP connection.
#[derive(Clone, PartialEq, Eq)]
pub struct Credentials {
    pub mail_host: String,
    pub address: String,
    secret: String,
}

impl Credentials {
    pub fn new(
        mail_host: impl Into<String>,
        address: impl Into<String>,
        secret: impl Into<String>,
    ) -> Self {
        Self {
            mail_host: mail_host.into(),
            address: address.into(),
            secret: secret.into(),
        }
    }

    pub fn secret(&self) -> &str {
        &self.secret
    }
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("mail_host", &self.mail_host)
            .field("address", &self.address)
            .field("secret", &"<redacted>")
            .finish()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MessageSummary {
    pub id: MessageId,
    pub subject: String,
    pub sender: String,
    pub display_date: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MessageDetail {
    pub subject: String,
    pub sender: String,
    pub display_date: String,
    /// HTML when the message has an HTML part, plain text otherwise.
    pub body: String,
    pub html: bool,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn debug_output_never_contains_the_secret() {
        let creds = Credentials::new("imap.gmail.com", "me@gmail.com", "hunter2");
        let dbg = format!("{creds:?}");
        assert!(dbg.contains("me@gmail.com"));
        assert!(!dbg.contains("hunter2"));
        assert_eq!(creds.secret(), "hunter2");
    }
}
