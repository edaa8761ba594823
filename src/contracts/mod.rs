//! Collaborator contracts
//!
//! Capabilities the surrounding platform provides next to file transfer:
//! email, activity logging, printing and a record store. Only the
//! interfaces live here; implementations are supplied by the host
//! application.

mod database;
mod email;
mod log;
mod print;

pub use database::*;
pub use email::*;
pub use log::*;
pub use print::*;
