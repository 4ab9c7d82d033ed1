use std::collections::HashMap;

const BUILTIN_SERVERS: &[(&str, &str)] = &[
    ("gmail.com", "imap.gmail.com"),
    ("outlook.com", "outlook.office365.com"),
    ("hotmail.com", "outlook.office365.com"),
    ("live.com", "outlook.office365.com"),
    ("yahoo.co.jp", "imap.mail.yahoo.co.jp"),
    ("icloud.com", "imap.mail.me.com"),
    ("me.com", "imap.mail.me.com"),
];

/// Maps an email domain to the IMAP host serving it. Built once at startup.
#[derive(Debug, Clone)]
pub struct Directory {
    servers: HashMap<String, String>,
}

impl Directory {
    pub fn builtin() -> Self {
        Self {
            servers: BUILTIN_SERVERS
                .iter()
                .map(|(d, h)| (d.to_string(), h.to_string()))
                .collect(),
        }
    }

    /// Built-in table with `extra` entries layered on top.
    pub fn with_providers<'a, I>(extra: I) -> Self
    where
        I: IntoIterator<Item = (&'a String, &'a String)>,
    {
        let mut dir = Self::builtin();
        for (domain, host) in extra {
            dir.servers
                .insert(domain.trim().to_ascii_lowercase(), host.trim().to_string());
        }
        dir
    }

    pub fn lookup(&self, domain: &str) -> Option<&str> {
        self.servers
            .get(&domain.trim().to_ascii_lowercase())
            .map(String::as_str)
    }
}

impl Default for Directory {
    fn default() -> Self {
        Self::builtin()
    }
}

/// Domain part of an address (after the last `@`), lower-cased.
pub fn domain_of(address: &str) -> Option<String> {
    let (_, domain) = address.trim().rsplit_once('@')?;
    if domain.is_empty() {
        return None;
    }
    Some(domain.to_ascii_lowercase())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::BTreeMap;

    #[test]
    fn builtin_domains_resolve() {
        let dir = Directory::builtin();
        for (domain, host) in BUILTIN_SERVERS {
            assert_eq!(dir.lookup(domain), Some(*host));
        }
        assert_eq!(dir.lookup("hotmail.com"), Some("outlook.office365.com"));
        assert_eq!(dir.lookup("me.com"), Some("imap.mail.me.com"));
    }

    #[test]
    fn unknown_domain_is_not_found() {
        let dir = Directory::builtin();
        assert_eq!(dir.lookup("example.org"), None);
        assert_eq!(dir.lookup("yahoo.com"), None);
    }

    #[test]
    fn lookup_ignores_case() {
        assert_eq!(
            Directory::builtin().lookup("GMail.COM"),
            Some("imap.gmail.com")
        );
    }

    #[test]
    fn extra_providers_extend_and_override() {
        let mut extra = BTreeMap::new();
        extra.insert("Example.org".to_string(), "imap.example.org".to_string());
        extra.insert("gmail.com".to_string(), "imap.proxy.local".to_string());
        let dir = Directory::with_providers(&extra);
        assert_eq!(dir.lookup("example.org"), Some("imap.example.org"));
        assert_eq!(dir.lookup("gmail.com"), Some("imap.proxy.local"));
        assert_eq!(dir.lookup("icloud.com"), Some("imap.mail.me.com"));
    }

    #[test]
    fn domain_extraction() {
        assert_eq!(domain_of("Taro@GMail.com").as_deref(), Some("gmail.com"));
        assert_eq!(domain_of("a@b@me.com").as_deref(), Some("me.com"));
        assert_eq!(domain_of("nobody"), None);
        assert_eq!(domain_of("trailing@"), None);
    }
}
