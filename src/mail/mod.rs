pub mod dates;
pub mod decoders;
pub mod directory;
pub mod imap_client;

#[cfg(test)]
pub(crate) mod fake;
