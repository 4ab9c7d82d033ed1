use std::collections::HashMap;
use std::net::{TcpStream, ToSocketAddrs};
use std::time::Duration;

use anyhow::{Context, Result, anyhow};
use mailparse::{MailHeader, MailHeaderMap};
use native_tls::{TlsConnector, TlsStream};

use crate::domain::email::{Credentials, MessageDetail, MessageSummary};
use crate::domain::page::{PageWindow, window_for};
use crate::error::Error;
use crate::mail::dates::normalize;
use crate::mail::decoders::{decode_header_field, select_body_part};

pub const DEFAULT_IMAP_PORT: u16 = 993;
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

/// Only the fields a listing shows; PEEK leaves `\Seen` untouched.
const HEADER_QUERY: &str = "BODY.PEEK[HEADER.FIELDS (SUBJECT FROM DATE)]";

const NO_SUBJECT: &str = "(no subject)";
const UNKNOWN_SENDER: &str = "(unknown sender)";

/// One authenticated connection. Ids are INBOX sequence numbers.
pub trait MailboxSession {
    fn select_inbox(&mut self) -> Result<()>;

    /// Every sequence number in the selected mailbox, ascending.
    fn search_all(&mut self) -> Result<Vec<u32>>;

    /// Raw header block per id. Ids the server did not return are absent.
    fn fetch_headers(&mut self, ids: &[u32]) -> Result<HashMap<u32, Vec<u8>>>;

    /// Full RFC 822 source, or `None` if the server returned nothing for `id`.
    fn fetch_message(&mut self, id: u32) -> Result<Option<Vec<u8>>>;

    fn logout(&mut self) -> Result<()>;
}

/// Opens a fresh authenticated [`MailboxSession`].
pub trait Connector: Send + Sync {
    fn open(&self, host: &str, address: &str, secret: &str) -> Result<Box<dyn MailboxSession>>;
}

/// Implicit-TLS IMAP over `native_tls`.
#[derive(Debug, Clone)]
pub struct ImapConnector {
    pub port: u16,
    pub timeout: Duration,
}

impl ImapConnector {
    pub fn new(port: u16, timeout: Duration) -> Self {
        Self { port, timeout }
    }

    fn connect(&self, host: &str) -> Result<imap::Client<TlsStream<TcpStream>>> {
        let tcp = connect_tcp(host, self.port, self.timeout)?;
        tcp.set_read_timeout(Some(self.timeout))?;
        tcp.set_write_timeout(Some(self.timeout))?;

        let tls = TlsConnector::builder().build()?;
        let stream = tls
            .connect(host, tcp)
            .map_err(|e| anyhow!("TLS handshake with {host} failed: {e}"))?;

        let mut client = imap::Client::new(stream);
        client
            .read_greeting()
            .with_context(|| format!("no IMAP greeting from {host}"))?;
        Ok(client)
    }
}

impl Default for ImapConnector {
    fn default() -> Self {
        Self::new(DEFAULT_IMAP_PORT, DEFAULT_TIMEOUT)
    }
}

impl Connector for ImapConnector {
    fn open(&self, host: &str, address: &str, secret: &str) -> Result<Box<dyn MailboxSession>> {
        log::debug!("connecting to {}:{}", host, self.port);
        let client = self.connect(host)?;
        let session = client
            .login(address, secret)
            .map_err(|(e, _client)| anyhow!("LOGIN as {address} rejected: {e}"))?;
        log::debug!("authenticated as {address}");
        Ok(Box::new(ImapMailbox { session }))
    }
}

fn connect_tcp(host: &str, port: u16, timeout: Duration) -> Result<TcpStream> {
    let mut last_err = None;
    for addr in (host, port)
        .to_socket_addrs()
        .with_context(|| format!("cannot resolve {host}"))?
    {
        match TcpStream::connect_timeout(&addr, timeout) {
            Ok(stream) => return Ok(stream),
            Err(e) => last_err = Some(e),
        }
    }
    match last_err {
        Some(e) => Err(anyhow!(e).context(format!("cannot connect to {host}:{port}"))),
        None => Err(anyhow!("{host} resolved to no addresses")),
    }
}

struct ImapMailbox {
    session: imap::Session<TlsStream<TcpStream>>,
}

impl MailboxSession for ImapMailbox {
    fn select_inbox(&mut self) -> Result<()> {
        let mailbox = self.session.select("INBOX")?;
        log::debug!("INBOX has {} messages", mailbox.exists);
        Ok(())
    }

    fn search_all(&mut self) -> Result<Vec<u32>> {
        let mut ids: Vec<u32> = self.session.search("ALL")?.into_iter().collect();
        ids.sort_unstable();
        Ok(ids)
    }

    fn fetch_headers(&mut self, ids: &[u32]) -> Result<HashMap<u32, Vec<u8>>> {
        if ids.is_empty() {
            return Ok(HashMap::new());
        }
        let set = ids
            .iter()
            .map(u32::to_string)
            .collect::<Vec<_>>()
            .join(",");
        let fetches = self.session.fetch(set, HEADER_QUERY)?;
        Ok(fetches
            .iter()
            .filter_map(|f| f.header().map(|h| (f.message, h.to_vec())))
            .collect())
    }

    fn fetch_message(&mut self, id: u32) -> Result<Option<Vec<u8>>> {
        let fetches = self.session.fetch(id.to_string(), "BODY.PEEK[]")?;
        Ok(fetches
            .iter()
            .find(|f| f.message == id)
            .and_then(|f| f.body())
            .map(<[u8]>::to_vec))
    }

    fn logout(&mut self) -> Result<()> {
        self.session.logout()?;
        Ok(())
    }
}

/// Per-request mail access. Every call opens its own connection and logs out
/// before returning; nothing is pooled.
pub struct MailGateway {
    connector: Box<dyn Connector>,
}

impl MailGateway {
    pub fn new(connector: impl Connector + 'static) -> Self {
        Self {
            connector: Box::new(connector),
        }
    }

    /// Logs in and straight back out. Any failure is reported as [`Error::Auth`].
    pub fn verify_credentials(&self, host: &str, address: &str, secret: &str) -> crate::Result<()> {
        match self.connector.open(host, address, secret) {
            Ok(mut session) => {
                logout_quietly(session.as_mut());
                Ok(())
            }
            Err(e) => {
                log::warn!("login to {host} as {address} failed: {e:#}");
                Err(Error::Auth)
            }
        }
    }

    /// Newest-first page of INBOX summaries. Only header fields are fetched.
    pub fn list_page(
        &self,
        creds: &Credentials,
        page_number: usize,
        page_size: usize,
    ) -> crate::Result<(Vec<MessageSummary>, PageWindow)> {
        self.with_inbox(creds, "list inbox", |mbox| {
            let mut ids = mbox.search_all()?;
            // servers assign sequence numbers in arrival order
            ids.reverse();

            let window = window_for(ids.len(), page_number, page_size);
            let page_ids = &ids[window.start..window.end];
            let mut headers = mbox.fetch_headers(page_ids)?;

            let summaries: Vec<MessageSummary> = page_ids
                .iter()
                .filter_map(|id| headers.remove(id).map(|raw| summarize(*id, &raw)))
                .collect();
            Ok((summaries, PageWindow::new(ids.len(), page_number, page_size)))
        })
    }

    /// Full message by the id a listing returned.
    pub fn fetch_message(&self, creds: &Credentials, id: &str) -> crate::Result<MessageDetail> {
        let seq = match id.trim().parse::<u32>() {
            Ok(n) if n > 0 => n,
            _ => {
                log::warn!("rejecting malformed message id {id:?}");
                return Err(Error::Access);
            }
        };
        self.with_inbox(creds, "fetch message", |mbox| {
            let raw = mbox
                .fetch_message(seq)?
                .ok_or_else(|| anyhow!("message {seq} not found"))?;
            Ok(detail(&raw))
        })
    }

    fn with_inbox<T>(
        &self,
        creds: &Credentials,
        what: &str,
        op: impl FnOnce(&mut dyn MailboxSession) -> Result<T>,
    ) -> crate::Result<T> {
        self.connector
            .open(&creds.mail_host, &creds.address, creds.secret())
            .and_then(|mut session| {
                let out = session
                    .select_inbox()
                    .and_then(|()| op(session.as_mut()));
                logout_quietly(session.as_mut());
                out
            })
            .map_err(|e| {
                log::warn!(
                    "{what} for {} on {} failed: {e:#}",
                    creds.address,
                    creds.mail_host
                );
                Error::Access
            })
    }
}

fn logout_quietly(session: &mut dyn MailboxSession) {
    if let Err(e) = session.logout() {
        log::debug!("logout failed: {e:#}");
    }
}

fn header_text(headers: &[MailHeader], name: &str) -> Option<String> {
    headers
        .get_first_header(name)
        .map(|h| decode_header_field(h.get_value_raw()))
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
}

struct Envelope {
    subject: String,
    sender: String,
    display_date: String,
}

fn envelope(headers: &[MailHeader]) -> Envelope {
    Envelope {
        subject: header_text(headers, "Subject").unwrap_or_else(|| NO_SUBJECT.to_string()),
        sender: header_text(headers, "From").unwrap_or_else(|| UNKNOWN_SENDER.to_string()),
        display_date: normalize(headers.get_first_value("Date").as_deref()),
    }
}

fn summarize(id: u32, raw_headers: &[u8]) -> MessageSummary {
    let headers = match mailparse::parse_headers(raw_headers) {
        Ok((headers, _)) => headers,
        Err(e) => {
            log::warn!("cannot parse headers of message {id}: {e}");
            Vec::new()
        }
    };
    let env = envelope(&headers);
    MessageSummary {
        id: id.to_string(),
        subject: env.subject,
        sender: env.sender,
        display_date: env.display_date,
    }
}

fn detail(raw: &[u8]) -> MessageDetail {
    match mailparse::parse_mail(raw) {
        Ok(parsed) => {
            let env = envelope(&parsed.headers);
            let body = select_body_part(&parsed);
            MessageDetail {
                subject: env.subject,
                sender: env.sender,
                display_date: env.display_date,
                body: body.text,
                html: body.html,
            }
        }
        Err(e) => {
            log::warn!("cannot parse message, showing raw source: {e}");
            let env = envelope(&[]);
            MessageDetail {
                subject: env.subject,
                sender: env.sender,
                display_date: env.display_date,
                body: String::from_utf8_lossy(raw).into_owned(),
                html: false,
            }
        }
    }
}
