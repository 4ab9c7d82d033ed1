use crate::config::Config;
use crate::domain::email::{Credentials, MessageDetail, MessageSummary};
use crate::domain::page::{PAGE_SIZE, PageWindow};
use crate::error::{Error, Result};
use crate::mail::directory::{Directory, domain_of};
use crate::mail::imap_client::{Connector, ImapConnector, MailGateway};
use crate::store::repo::{SessionStore, SessionToken};

/// Entry point for the presentation layer.
pub struct Webmail {
    directory: Directory,
    gateway: MailGateway,
}

impl Webmail {
    pub fn new(directory: Directory, connector: impl Connector + 'static) -> Self {
        Self {
            directory,
            gateway: MailGateway::new(connector),
        }
    }

    pub fn from_config(cfg: &Config) -> Self {
        Self::new(
            Directory::with_providers(&cfg.providers),
            ImapConnector::new(cfg.imap_port(), cfg.timeout()),
        )
    }

    /// Resolves the provider for `address` and checks the password against it.
    pub fn login(&self, address: &str, secret: &str) -> Result<Credentials> {
        let address = address.trim();
        let domain = domain_of(address).unwrap_or_default();
        let host = self
            .directory
            .lookup(&domain)
            .ok_or_else(|| Error::UnsupportedProvider(domain.clone()))?;

        self.gateway.verify_credentials(host, address, secret)?;
        log::info!("{address} logged in via {host}");
        Ok(Credentials::new(host, address, secret))
    }

    pub fn list_inbox(
        &self,
        creds: &Credentials,
        page: usize,
    ) -> Result<(Vec<MessageSummary>, PageWindow)> {
        self.gateway.list_page(creds, page, PAGE_SIZE)
    }

    pub fn get_message(&self, creds: &Credentials, id: &str) -> Result<MessageDetail> {
        self.gateway.fetch_message(creds, id)
    }

    /// Logs in and keeps the credentials in `store` under a fresh token.
    pub fn open_session(
        &self,
        store: &dyn SessionStore,
        address: &str,
        secret: &str,
    ) -> Result<SessionToken> {
        let creds = self.login(address, secret)?;
        let token = SessionToken::generate();
        store.insert(token.clone(), creds);
        Ok(token)
    }

    /// Like [`Webmail::list_inbox`], dropping the session on failure.
    pub fn list_inbox_for(
        &self,
        store: &dyn SessionStore,
        token: &SessionToken,
        page: usize,
    ) -> Result<(Vec<MessageSummary>, PageWindow)> {
        let creds = store.get(token).ok_or(Error::Access)?;
        self.list_inbox(&creds, page)
            .inspect_err(|_| expire(store, token))
    }

    /// Like [`Webmail::get_message`], dropping the session on failure.
    pub fn get_message_for(
        &self,
        store: &dyn SessionStore,
        token: &SessionToken,
        id: &str,
    ) -> Result<MessageDetail> {
        let creds = store.get(token).ok_or(Error::Access)?;
        self.get_message(&creds, id)
            .inspect_err(|_| expire(store, token))
    }
}

/// Discards the credentials held for `token`. Safe to call twice.
pub fn logout(store: &dyn SessionStore, token: &SessionToken) {
    if let Some(creds) = store.remove(token) {
        log::info!("{} logged out", creds.address);
    }
}

fn expire(store: &dyn SessionStore, token: &SessionToken) {
    if let Some(creds) = store.remove(token) {
        log::info!("session for {} expired after access failure", creds.address);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mail::fake::{FakeConnector, simple_message};
    use crate::store::memory::MemoryStore;

    fn webmail(fake: FakeConnector) -> Webmail {
        Webmail::new(Directory::builtin(), fake)
    }

    fn three_messages() -> FakeConnector {
        FakeConnector::with_messages(
            (1..=3)
                .map(|i| simple_message(&format!("m{i}"), "Tue, 07 Oct 2025 00:35:00 +0000"))
                .collect(),
        )
    }

    #[test]
    fn login_resolves_host_from_domain() {
        let creds = webmail(three_messages())
            .login(" taro@Outlook.com ", "pw")
            .unwrap();
        assert_eq!(creds.mail_host, "outlook.office365.com");
        assert_eq!(creds.address, "taro@Outlook.com");
        assert_eq!(creds.secret(), "pw");
    }

    #[test]
    fn unknown_domain_names_the_domain() {
        let err = webmail(three_messages())
            .login("someone@example.org", "pw")
            .unwrap_err();
        assert!(matches!(&err, Error::UnsupportedProvider(d) if d == "example.org"));
        assert_eq!(
            err.to_string(),
            "unsupported or unknown mail provider: (example.org)"
        );
    }

    #[test]
    fn address_without_domain_is_unsupported() {
        let err = webmail(three_messages()).login("nobody", "pw").unwrap_err();
        assert!(matches!(err, Error::UnsupportedProvider(d) if d.is_empty()));
    }

    #[test]
    fn bad_password_is_auth_error() {
        let err = webmail(three_messages().rejecting_login())
            .login("me@gmail.com", "wrong")
            .unwrap_err();
        assert!(matches!(err, Error::Auth));
    }

    #[test]
    fn session_round_trip() {
        let store = MemoryStore::new();
        let wm = webmail(three_messages());
        let token = wm.open_session(&store, "me@gmail.com", "pw").unwrap();

        let (items, window) = wm.list_inbox_for(&store, &token, 1).unwrap();
        assert_eq!(items.len(), 3);
        assert_eq!(window.page_size, PAGE_SIZE);

        let msg = wm.get_message_for(&store, &token, &items[0].id).unwrap();
        assert_eq!(msg.subject, "m3");

        logout(&store, &token);
        assert!(store.is_empty());
        logout(&store, &token);
        assert!(matches!(
            wm.list_inbox_for(&store, &token, 1),
            Err(Error::Access)
        ));
    }

    #[test]
    fn access_failure_forces_logout() {
        let store = MemoryStore::new();
        let wm = webmail(three_messages());
        let token = wm.open_session(&store, "me@gmail.com", "pw").unwrap();

        assert!(matches!(
            wm.get_message_for(&store, &token, "42"),
            Err(Error::Access)
        ));
        assert!(store.get(&token).is_none());
    }

    #[test]
    fn failed_login_stores_nothing() {
        let store = MemoryStore::new();
        let wm = webmail(three_messages().rejecting_login());
        assert!(wm.open_session(&store, "me@gmail.com", "pw").is_err());
        assert!(store.is_empty());
    }
}
