//! POP3 command builder.

use std::fmt;

/// POP3 command.
#[derive(Clone, PartialEq, Eq)]
pub enum Command {
    /// USER - Identify the mailbox owner
    User {
        /// Mailbox name
        name: String,
    },
    /// PASS - Submit the credential for the previously identified user
    Pass {
        /// Secret; never shown in `Debug` output
        secret: String,
    },
    /// STAT - Message count and total size
    Stat,
    /// LIST - Scan listing of every message
    List,
    /// DELE - Mark a message for deletion
    Dele {
        /// 1-based message number
        index: u32,
    },
    /// NOOP - No operation
    Noop,
    /// RSET - Unmark all messages marked for deletion
    Rset,
    /// QUIT - Close the session, committing deletions in the transaction state
    Quit,
}

impl Command {
    /// Returns the command keyword.
    #[must_use]
    pub const fn keyword(&self) -> &'static str {
        match self {
            Self::User { .. } => "USER",
            Self::Pass { .. } => "PASS",
            Self::Stat => "STAT",
            Self::List => "LIST",
            Self::Dele { .. } => "DELE",
            Self::Noop => "NOOP",
            Self::Rset => "RSET",
            Self::Quit => "QUIT",
        }
    }

    /// Returns true if the reply to this command is multi-line.
    #[must_use]
    pub const fn is_multiline(&self) -> bool {
        matches!(self, Self::List)
    }

    /// Serializes the command to bytes.
    #[must_use]
    pub fn serialize(&self) -> Vec<u8> {
        let mut buf = Vec::with_capacity(16);
        buf.extend_from_slice(self.keyword().as_bytes());

        match self {
            Self::User { name } => {
                buf.push(b' ');
                buf.extend_from_slice(name.as_bytes());
            }
            Self::Pass { secret } => {
                buf.push(b' ');
                buf.extend_from_slice(secret.as_bytes());
            }
            Self::Dele { index } => {
                buf.extend_from_slice(format!(" {index}").as_bytes());
            }
            Self::Stat | Self::List | Self::Noop | Self::Rset | Self::Quit => {}
        }

        buf.extend_from_slice(b"\r\n");
        buf
    }
}

impl fmt::Debug for Command {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::User { name } => f.debug_struct("User").field("name", name).finish(),
            Self::Pass { .. } => f.debug_struct("Pass").field("secret", &"***").finish(),
            Self::Dele { index } => f.debug_struct("Dele").field("index", index).finish(),
            other => f.write_str(other.keyword()),
        }
    }
}
