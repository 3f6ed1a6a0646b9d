use std::fmt;

use thiserror::Error;

/// The closed, wire-stable error code set from the protocol's `ERR <CODE> <Message>` envelope.
///
/// This enum is exhaustive by design: a new failure mode is a protocol change, not an
/// addition a client can ignore.
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCode {
    /// Unknown verb or malformed leading bytes.
    #[error("BAD_CMD")]
    BadCmd,
    /// Verb recognized; arguments wrong shape/count.
    #[error("BAD_ARG")]
    BadArg,
    /// Referenced group ID not live.
    #[error("NO_SUCH_GROUP")]
    NoSuchGroup,
    /// Operation requires membership; sender has none.
    #[error("NOT_IN_GROUP")]
    NotInGroup,
    /// `cap` would be exceeded.
    #[error("GROUP_FULL")]
    GroupFull,
    /// Creator at `max_groups_per_client`.
    #[error("OWNER_LIMIT")]
    OwnerLimit,
    /// Datagram exceeds 4096 bytes.
    #[error("TOO_LARGE")]
    TooLarge,
}

impl ErrorCode {
    pub fn as_str(&self) -> &'static str {
        match self {
            ErrorCode::BadCmd => "BAD_CMD",
            ErrorCode::BadArg => "BAD_ARG",
            ErrorCode::NoSuchGroup => "NO_SUCH_GROUP",
            ErrorCode::NotInGroup => "NOT_IN_GROUP",
            ErrorCode::GroupFull => "GROUP_FULL",
            ErrorCode::OwnerLimit => "OWNER_LIMIT",
            ErrorCode::TooLarge => "TOO_LARGE",
        }
    }
}

/// A recoverable, per-datagram relay error: always rendered back to the sender as
/// `ERR <code> <message>` and never bubbled past the handler that raised it.
///
/// `message` is owned rather than `&'static str` because a few codes (`GROUP_FULL`)
/// embed the group ID, which is only known at the call site.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RelayError {
    pub code: ErrorCode,
    pub message: String,
}

impl RelayError {
    pub fn new(code: ErrorCode, message: impl Into<String>) -> Self {
        Self { code, message: message.into() }
    }

    pub fn bad_cmd() -> Self {
        Self::new(ErrorCode::BadCmd, "UnknownCommand")
    }

    pub fn bad_arg(usage: &'static str) -> Self {
        Self::new(ErrorCode::BadArg, usage)
    }

    pub fn no_such_group() -> Self {
        Self::new(ErrorCode::NoSuchGroup, "NoSuchGroup")
    }

    /// Raised by `!LEAVE` and `!WHO` when the sender has no membership at all.
    pub fn not_in_group() -> Self {
        Self::new(ErrorCode::NotInGroup, "NotInGroup")
    }

    /// Raised by broadcast fan-out specifically; points the sender at the fix.
    pub fn not_in_group_broadcast() -> Self {
        Self::new(ErrorCode::NotInGroup, "JoinFirstUseJOIN")
    }

    pub fn group_full(group_id: &str) -> Self {
        Self::new(ErrorCode::GroupFull, group_id)
    }

    pub fn owner_limit() -> Self {
        Self::new(ErrorCode::OwnerLimit, "OwnerLimit")
    }

    pub fn too_large() -> Self {
        Self::new(ErrorCode::TooLarge, "PayloadTooLarge")
    }
}

impl fmt::Display for RelayError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ERR {} {}", self.code.as_str(), self.message)
    }
}

impl std::error::Error for RelayError {}

pub type RelayResult<T> = Result<T, RelayError>;
