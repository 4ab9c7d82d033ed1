//! In-memory mailbox used by the gateway and facade tests.

use std::collections::HashMap;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use anyhow::{Result, anyhow};

use crate::mail::imap_client::{Connector, MailboxSession};

pub fn simple_message(subject: &str, date: &str) -> Vec<u8> {
    format!(
        "From: Sender <sender@example.test>\r\n\
         Subject: {subject}\r\n\
         Date: {date}\r\n\
         Content-Type: text/plain; charset=utf-8\r\n\
         \r\n\
         body of {subject}\r\n"
    )
    .into_bytes()
}

#[derive(Clone, Default)]
pub struct Stats {
    opened: Arc<AtomicUsize>,
    logged_out: Arc<AtomicUsize>,
}

impl Stats {
    pub fn opened(&self) -> usize {
        self.opened.load(Ordering::SeqCst)
    }

    pub fn logged_out(&self) -> usize {
        self.logged_out.load(Ordering::SeqCst)
    }
}

#[derive(Clone, Default)]
pub struct FakeConnector {
    messages: Arc<Vec<Vec<u8>>>,
    reject_login: bool,
    fail_search: bool,
    stats: Stats,
}

impl FakeConnector {
    /// Message `i` in `messages` gets sequence number `i + 1`.
    pub fn with_messages(messages: Vec<Vec<u8>>) -> Self {
        Self {
            messages: Arc::new(messages),
            ..Self::default()
        }
    }

    pub fn rejecting_login(mut self) -> Self {
        self.reject_login = true;
        self
    }

    pub fn failing_search(mut self) -> Self {
        self.fail_search = true;
        self
    }

    pub fn stats(&self) -> Stats {
        self.stats.clone()
    }
}

impl Connector for FakeConnector {
    fn open(&self, _host: &str, _address: &str, _secret: &str) -> Result<Box<dyn MailboxSession>> {
        if self.reject_login {
            return Err(anyhow!("NO [AUTHENTICATIONFAILED] Invalid credentials"));
        }
        self.stats.opened.fetch_add(1, Ordering::SeqCst);
        Ok(Box::new(FakeSession {
            messages: self.messages.clone(),
            fail_search: self.fail_search,
            stats: self.stats.clone(),
        }))
    }
}

struct FakeSession {
    messages: Arc<Vec<Vec<u8>>>,
    fail_search: bool,
    stats: Stats,
}

impl FakeSession {
    fn get(&self, id: u32) -> Option<&Vec<u8>> {
        let idx = usize::try_from(id).ok()?.checked_sub(1)?;
        self.messages.get(idx)
    }
}

impl MailboxSession for FakeSession {
    fn select_inbox(&mut self) -> Result<()> {
        Ok(())
    }

    fn search_all(&mut self) -> Result<Vec<u32>> {
        if self.fail_search {
            return Err(anyhow!("connection reset by peer"));
        }
        Ok((1..=self.messages.len() as u32).collect())
    }

    fn fetch_headers(&mut self, ids: &[u32]) -> Result<HashMap<u32, Vec<u8>>> {
        Ok(ids
            .iter()
            .filter_map(|id| {
                let raw = self.get(*id)?;
                let end = raw
                    .windows(4)
                    .position(|w| w == b"\r\n\r\n")
                    .map_or(raw.len(), |p| p + 4);
                Some((*id, raw[..end].to_vec()))
            })
            .collect())
    }

    fn fetch_message(&mut self, id: u32) -> Result<Option<Vec<u8>>> {
        match self.get(id) {
            Some(raw) => Ok(Some(raw.clone())),
            None => Err(anyhow!("BAD Invalid messageset")),
        }
    }

    fn logout(&mut self) -> Result<()> {
        self.stats.logged_out.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }
}
