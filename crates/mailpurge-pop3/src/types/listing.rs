//! Mailbox listing types.

/// One entry of a `LIST` scan listing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ListEntry {
    /// 1-based message number.
    pub index: u32,
    /// Message size in octets.
    pub size: u64,
}

/// Drop listing returned by `STAT`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct MailboxStat {
    /// Number of messages in the maildrop.
    pub count: u32,
    /// Total size in octets.
    pub size: u64,
}
