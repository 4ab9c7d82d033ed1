pub mod email;
pub mod page;
