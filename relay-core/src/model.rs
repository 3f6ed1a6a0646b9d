//! The registry's data model: `Client` and `Group`, plus their shared invariants.
//!
//! See `registry.rs` for the operations that keep these consistent; this module only
//! owns the shapes.

use std::collections::HashSet;
use std::net::SocketAddr;
use std::time::Instant;

use crate::ids::GroupId;

/// A client is identified purely by the address observed on its datagrams. There is
/// no handshake and no client-chosen ID: NAT rebinding or a client restart on a new
/// ephemeral port looks exactly like a brand-new client, by design (see DESIGN.md).
pub type ClientAddr = SocketAddr;

#[derive(Debug, Clone)]
pub struct Client {
    pub addr: ClientAddr,
    pub last_activity: Instant,
    /// Insertion-ordered so "most recently joined" (the `!WHO` / broadcast tie-break)
    /// is just "last element", not a separate timestamp map.
    pub memberships: Vec<GroupId>,
    pub owned: HashSet<GroupId>,
}

impl Client {
    pub fn new(addr: ClientAddr, now: Instant) -> Self {
        Self {
            addr,
            last_activity: now,
            memberships: Vec::new(),
            owned: HashSet::new(),
        }
    }

    /// The group `!WHO` and broadcast fan-out associate with this client: the most
    /// recently joined one, or `None` if it isn't in any group.
    pub fn active_group(&self) -> Option<&GroupId> {
        self.memberships.last()
    }

    fn add_membership(&mut self, id: GroupId) {
        if !self.memberships.contains(&id) {
            self.memberships.push(id);
        }
    }

    fn remove_membership(&mut self, id: &GroupId) {
        self.memberships.retain(|g| g != id);
    }
}

#[derive(Debug, Clone)]
pub struct Group {
    pub id: GroupId,
    pub owner: ClientAddr,
    pub members: HashSet<ClientAddr>,
    /// `None` means unlimited.
    pub cap: Option<usize>,
    pub empty_since: Option<Instant>,
    pub created_at: Instant,
    /// Set to `false` once the owning client entry is torn down; ownership survives
    /// the owner leaving the group, but this flag matters for the
    /// owner-gone-and-empty deletion rule in §4.F.
    pub owner_known: bool,
}

impl Group {
    pub fn new(id: GroupId, owner: ClientAddr, cap: Option<usize>, now: Instant) -> Self {
        Self {
            id,
            owner,
            members: HashSet::new(),
            cap,
            empty_since: Some(now),
            created_at: now,
            owner_known: true,
        }
    }

    pub fn is_full(&self) -> bool {
        match self.cap {
            Some(cap) => self.members.len() >= cap,
            None => false,
        }
    }

    /// Invariant 1/5 helper: callers mutate `members` directly (the registry owns
    /// both sides of the relationship), then call this to keep `empty_since` and the
    /// client's `memberships` vector in lock-step.
    pub(crate) fn note_membership_changed(&mut self, now: Instant) {
        if self.members.is_empty() {
            if self.empty_since.is_none() {
                self.empty_since = Some(now);
            }
        } else {
            self.empty_since = None;
        }
    }
}

/// Applies the client-side half of a join, keeping `Group::members` and
/// `Client::memberships` symmetric (invariant 1). Lives here rather than as inherent
/// methods on both types because it always touches both at once.
pub(crate) fn link(client: &mut Client, group: &mut Group, now: Instant) {
    client.add_membership(group.id.clone());
    group.members.insert(client.addr);
    group.note_membership_changed(now);
}

pub(crate) fn unlink(client: &mut Client, group: &mut Group, now: Instant) {
    client.remove_membership(&group.id);
    group.members.remove(&client.addr);
    group.note_membership_changed(now);
}
