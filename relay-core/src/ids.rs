//! Group ID allocation.
//!
//! IDs are 8 characters drawn from `{A-Z, 1-9} \ {O, 0}` (34 symbols). `O`/`0` are
//! omitted so a human relaying an ID over voice or a sticky note can't confuse the
//! letter for the digit. Don't extend this alphabet without a protocol version bump —
//! IDs are regex-validated on the wire (`^[A-NP-Z1-9]{8}$`).

use std::collections::HashSet;

use rand::Rng;

pub const GROUP_ID_LEN: usize = 8;

const ALPHABET: &[u8] = b"ABCDEFGHIJKLMNPQRSTUVWXYZ123456789";

/// Group identifier. Newtype over a fixed-length `String` so it can't be confused
/// with an arbitrary client-supplied string at the type level.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct GroupId(String);

impl GroupId {
    /// Validate and wrap an externally-supplied ID (e.g. a `!JOIN` argument).
    pub fn parse(s: &str) -> Option<Self> {
        if s.len() != GROUP_ID_LEN {
            return None;
        }
        if s.bytes().all(|b| ALPHABET.contains(&b)) {
            Some(Self(s.to_string()))
        } else {
            None
        }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for GroupId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// Number of rejection-sampling attempts before giving up. At 34^8 possible IDs,
/// colliding this many times in a row against any realistic live set is the kind of
/// thing that doesn't happen outside of an adversarial RNG.
const MAX_ALLOCATION_ATTEMPTS: usize = 256;

/// Draw a fresh, currently-unused group ID via rejection sampling.
///
/// Returns `None` on the (untested in practice) exhaustion case; callers should map
/// that to `ErrorCode::BadCmd` per §4.C.
pub fn allocate_group_id(live: &HashSet<GroupId>) -> Option<GroupId> {
    let mut rng = rand::rng();
    for _ in 0..MAX_ALLOCATION_ATTEMPTS {
        let candidate: String = (0..GROUP_ID_LEN)
            .map(|_| ALPHABET[rng.random_range(0..ALPHABET.len())] as char)
            .collect();
        let candidate = GroupId(candidate);
        if !live.contains(&candidate) {
            return Some(candidate);
        }
    }
    None
}
