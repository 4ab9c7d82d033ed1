pub mod config;
pub mod domain;
pub mod error;
pub mod mail;
pub mod store;
pub mod terminal;
pub mod webmail;

pub use error::{Error, Result};
pub use webmail::Webmail;
