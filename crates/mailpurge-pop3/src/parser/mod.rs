//! POP3 response parser.

use crate::error::{Error, Result};
use crate::types::{ListEntry, MailboxStat, Reply, Status};

/// Parses a POP3 status line.
///
/// Status lines look like:
/// - `+OK POP3 server ready`
/// - `-ERR invalid password`
/// - `+OK` (no text)
///
/// # Errors
///
/// Returns an error if the line does not start with a status indicator.
pub fn parse_status_line(line: &str) -> Result<Reply> {
    let (status, rest) = if let Some(rest) = line.strip_prefix("+OK") {
        (Status::Ok, rest)
    } else if let Some(rest) = line.strip_prefix("-ERR") {
        (Status::Err, rest)
    } else {
        return Err(Error::Protocol(format!("Invalid status line: {line}")));
    };

    // "+OKAY" is not a status indicator
    if !rest.is_empty() && !rest.starts_with(' ') {
        return Err(Error::Protocol(format!("Invalid status line: {line}")));
    }

    Ok(Reply::new(status, rest.trim()))
}

/// Checks if a line terminates a multi-line response.
#[must_use]
pub fn is_terminator(line: &str) -> bool {
    line == "."
}

/// Removes byte-stuffing from a multi-line data line.
#[must_use]
pub fn unstuff(line: &str) -> &str {
    line.strip_prefix('.').unwrap_or(line)
}

/// Parses one `LIST` scan-listing line: `<index> <size>`.
///
/// # Errors
///
/// Returns an error if the line is malformed.
pub fn parse_list_entry(line: &str) -> Result<ListEntry> {
    let mut parts = line.split_whitespace();
    let (Some(index), Some(size)) = (parts.next(), parts.next()) else {
        return Err(Error::Protocol(format!("Malformed LIST entry: {line}")));
    };

    let index = index
        .parse::<u32>()
        .map_err(|_| Error::Protocol(format!("Invalid message number: {index}")))?;
    let size = size
        .parse::<u64>()
        .map_err(|_| Error::Protocol(format!("Invalid message size: {size}")))?;

    if index == 0 {
        return Err(Error::Protocol("Message number 0 in LIST".into()));
    }

    Ok(ListEntry { index, size })
}

/// Parses the text of a `STAT` reply: `<count> <octets>`.
///
/// # Errors
///
/// Returns an error if the text is malformed.
pub fn parse_stat(text: &str) -> Result<MailboxStat> {
    let mut parts = text.split_whitespace();
    let count = parts
        .next()
        .and_then(|c| c.parse::<u32>().ok())
        .ok_or_else(|| Error::Protocol(format!("Malformed STAT reply: {text}")))?;
    let size = parts
        .next()
        .and_then(|s| s.parse::<u64>().ok())
        .ok_or_else(|| Error::Protocol(format!("Malformed STAT reply: {text}")))?;

    Ok(MailboxStat { count, size })
}
