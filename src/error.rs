use thiserror::Error;

/// Failures surfaced by the webmail core.
///
/// Decoding problems are not represented here: header, body and date decoding
/// degrade to best-effort values instead of failing the request.
#[derive(Error, Debug)]
pub enum Error {
    #[error("unsupported or unknown mail provider: ({0})")]
    UnsupportedProvider(String),
    #[error("login failed: check your email address and password (or app password)")]
    Auth,
    #[error("mailbox access failed; please log in again")]
    Access,
}

pub type Result<T> = std::result::Result<T, Error>;
