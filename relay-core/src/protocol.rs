//! Wire codec: classifying datagrams, parsing commands, and formatting replies.
//!
//! Deliberately dumb: no framing, no length prefixes, no endianness to get wrong.
//! Commands are ASCII-ish UTF-8 text; replies are UTF-8 text; everything else is an
//! opaque payload the relay never looks inside of.

use crate::errors::RelayError;
use crate::ids::GroupId;

/// Max datagram size accepted by the relay, per §4.A.
pub const MAX_DATAGRAM_BYTES: usize = 4096;

/// What the codec decided about an inbound datagram before any registry lookup.
pub enum Classification<'a> {
    Command(&'a [u8]),
    Payload(&'a [u8]),
}

/// A datagram is a command iff its first byte is `!` (0x21); everything else is a
/// payload to be broadcast verbatim.
pub fn classify(datagram: &[u8]) -> Classification<'_> {
    match datagram.first() {
        Some(b'!') => Classification::Command(datagram),
        _ => Classification::Payload(datagram),
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    Create,
    Join(GroupId),
    Leave(GroupId),
    Ping,
    Who,
}

/// Parse a command datagram's bytes into a `Command`, or a `RelayError` describing
/// why it couldn't be. Bytes must already have been classified as a command (leading
/// `!`) by `classify`.
pub fn parse_command(bytes: &[u8]) -> Result<Command, RelayError> {
    let text = std::str::from_utf8(bytes).map_err(|_| RelayError::bad_cmd())?;
    let mut tokens = text.split(' ').filter(|t| !t.is_empty());
    let verb = tokens.next().ok_or_else(RelayError::bad_cmd)?;
    let args: Vec<&str> = tokens.collect();

    match verb {
        "!CREATE" => {
            if args.is_empty() {
                Ok(Command::Create)
            } else {
                Err(RelayError::bad_arg("Usage:!CREATE"))
            }
        }
        "!JOIN" => one_group_id_arg(&args, "Usage:!JOIN <GROUPID>").map(Command::Join),
        "!LEAVE" => one_group_id_arg(&args, "Usage:!LEAVE <GROUPID>").map(Command::Leave),
        "!PING" => {
            if args.is_empty() {
                Ok(Command::Ping)
            } else {
                Err(RelayError::bad_arg("Usage:!PING"))
            }
        }
        "!WHO" => {
            if args.is_empty() {
                Ok(Command::Who)
            } else {
                Err(RelayError::bad_arg("Usage:!WHO"))
            }
        }
        _ => Err(RelayError::bad_cmd()),
    }
}

fn one_group_id_arg(args: &[&str], usage: &'static str) -> Result<GroupId, RelayError> {
    match args {
        [only] => GroupId::parse(only).ok_or_else(|| RelayError::bad_arg(usage)),
        _ => Err(RelayError::bad_arg(usage)),
    }
}

/// Reply envelope formatting — the success half of §4.B's grammar.
pub mod reply {
    use crate::ids::GroupId;

    pub fn created(id: &GroupId) -> String {
        format!("OK CREATED {id}")
    }

    pub fn joined(id: &GroupId) -> String {
        format!("OK JOINED {id}")
    }

    pub fn left(id: &GroupId) -> String {
        format!("OK LEFT {id}")
    }

    pub fn who(id: &GroupId, count: usize) -> String {
        format!("OK WHO {id} {count}")
    }

    pub fn pong(heartbeat_interval_secs: u64) -> String {
        format!("PONG {heartbeat_interval_secs}")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn classifies_bang_prefixed_as_command() {
        assert!(matches!(classify(b"!PING"), Classification::Command(_)));
        assert!(matches!(classify(b"hello"), Classification::Payload(_)));
        assert!(matches!(classify(b""), Classification::Payload(_)));
    }

    #[test]
    fn parses_ping_and_who() {
        assert_eq!(parse_command(b"!PING").unwrap(), Command::Ping);
        assert_eq!(parse_command(b"!WHO").unwrap(), Command::Who);
    }

    #[test]
    fn parses_join_and_leave_with_valid_id() {
        let id = GroupId::parse("ABCDEFGH").unwrap();
        assert_eq!(parse_command(b"!JOIN ABCDEFGH").unwrap(), Command::Join(id.clone()));
        assert_eq!(parse_command(b"!LEAVE ABCDEFGH").unwrap(), Command::Leave(id));
    }

    #[test]
    fn unknown_verb_is_bad_cmd() {
        let err = parse_command(b"!FOO").unwrap_err();
        assert_eq!(err.code.as_str(), "BAD_CMD");
        assert_eq!(err.message, "UnknownCommand");
    }

    #[test]
    fn join_without_arg_is_bad_arg() {
        let err = parse_command(b"!JOIN").unwrap_err();
        assert_eq!(err.code.as_str(), "BAD_ARG");
        assert_eq!(err.message, "Usage:!JOIN <GROUPID>");
    }

    #[test]
    fn join_with_malformed_id_is_bad_arg() {
        let err = parse_command(b"!JOIN not-an-id").unwrap_err();
        assert_eq!(err.code.as_str(), "BAD_ARG");
    }

    #[test]
    fn create_with_extra_args_is_bad_arg() {
        let err = parse_command(b"!CREATE extra").unwrap_err();
        assert_eq!(err.message, "Usage:!CREATE");
    }

    #[test]
    fn non_utf8_is_bad_cmd() {
        let bytes: &[u8] = &[b'!', 0xff, 0xfe];
        let err = parse_command(bytes).unwrap_err();
        assert_eq!(err.code.as_str(), "BAD_CMD");
    }

    #[test]
    fn reply_formatting_matches_grammar() {
        let id = GroupId::parse("ABCDEFGH").unwrap();
        assert_eq!(reply::created(&id), "OK CREATED ABCDEFGH");
        assert_eq!(reply::joined(&id), "OK JOINED ABCDEFGH");
        assert_eq!(reply::left(&id), "OK LEFT ABCDEFGH");
        assert_eq!(reply::who(&id, 2), "OK WHO ABCDEFGH 2");
        assert_eq!(reply::pong(60), "PONG 60");
    }
}
