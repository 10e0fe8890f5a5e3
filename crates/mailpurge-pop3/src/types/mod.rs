//! Core POP3 types.

mod listing;
mod reply;

pub use listing::{ListEntry, MailboxStat};
pub use reply::{Reply, Status};
