//! The authoritative in-memory registry: clients, groups, membership, ownership.
//!
//! Everything here runs under one `parking_lot::Mutex`. Every public method takes the
//! lock, does a small amount of pure `HashMap`/`HashSet` bookkeeping, and releases it —
//! there is no `.await` anywhere in the critical section, so a sync mutex is strictly
//! cheaper than an async one and gives the single-writer discipline §5 asks for for
//! free: two operations on the same client or group always have a happens-before edge
//! because they both had to acquire the same lock.

use std::collections::{HashMap, HashSet};
use std::time::Instant;

use parking_lot::Mutex;
use tracing::{debug, trace};

use crate::config::RegistryConfig;
use crate::errors::{RelayError, RelayResult};
use crate::ids::{allocate_group_id, GroupId};
use crate::model::{self, Client, ClientAddr, Group};

struct RegistryInner {
    clients: HashMap<ClientAddr, Client>,
    groups: HashMap<GroupId, Group>,
}

impl RegistryInner {
    fn new() -> Self {
        Self { clients: HashMap::new(), groups: HashMap::new() }
    }
}

/// Summary of one sweep pass, returned for logging at the call site.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SweepReport {
    pub clients_reaped: usize,
    pub groups_reaped: usize,
}

pub struct Registry {
    inner: Mutex<RegistryInner>,
    config: RegistryConfig,
}

impl Registry {
    pub fn new(config: RegistryConfig) -> Self {
        Self { inner: Mutex::new(RegistryInner::new()), config }
    }

    pub fn config(&self) -> &RegistryConfig {
        &self.config
    }

    /// Upsert a client and refresh its liveness. Any valid-framed datagram — command
    /// or payload — counts as activity, per §4.D.
    pub fn touch(&self, addr: ClientAddr, now: Instant) {
        let mut inner = self.inner.lock();
        inner
            .clients
            .entry(addr)
            .and_modify(|c| c.last_activity = now)
            .or_insert_with(|| Client::new(addr, now));
    }

    /// `!CREATE`. Enforces invariant 4 (`max_groups_per_client`) and allocates a fresh
    /// ID against the live set (invariant 6). The creator is NOT auto-joined — see
    /// DESIGN.md's resolution of the open question in SPEC_FULL §9.
    pub fn create_group(&self, owner: ClientAddr, now: Instant) -> RelayResult<GroupId> {
        let mut inner = self.inner.lock();

        let owned_live = inner
            .clients
            .get(&owner)
            .map(|c| c.owned.iter().filter(|g| inner.groups.contains_key(*g)).count())
            .unwrap_or(0);
        if owned_live >= self.config.max_groups_per_client {
            return Err(RelayError::owner_limit());
        }

        let live: HashSet<GroupId> = inner.groups.keys().cloned().collect();
        let id = allocate_group_id(&live).ok_or_else(RelayError::bad_cmd)?;

        let group = Group::new(id.clone(), owner, self.config.default_cap, now);
        inner.groups.insert(id.clone(), group);
        inner
            .clients
            .entry(owner)
            .or_insert_with(|| Client::new(owner, now))
            .owned
            .insert(id.clone());

        debug!(group = %id, %owner, "group created");
        Ok(id)
    }

    /// `!JOIN`. Idempotent: re-joining a group you're already in is a no-op success.
    pub fn join(&self, addr: ClientAddr, id: &GroupId, now: Instant) -> RelayResult<usize> {
        let mut inner = self.inner.lock();

        let already_member = inner.groups.get(id).map(|g| g.members.contains(&addr)).unwrap_or(false);
        if already_member {
            let count = inner.groups.get(id).map(|g| g.members.len()).unwrap_or(0);
            return Ok(count);
        }

        {
            let group = inner.groups.get(id).ok_or_else(RelayError::no_such_group)?;
            if group.is_full() {
                return Err(RelayError::group_full(group.id.as_str()));
            }
        }

        let mut client = inner.clients.remove(&addr).unwrap_or_else(|| Client::new(addr, now));
        let group = inner.groups.get_mut(id).expect("checked above");
        model::link(&mut client, group, now);
        let count = group.members.len();
        inner.clients.insert(addr, client);

        trace!(group = %id, %addr, "joined");
        Ok(count)
    }

    /// `!LEAVE`.
    pub fn leave(&self, addr: ClientAddr, id: &GroupId, now: Instant) -> RelayResult<()> {
        let mut inner = self.inner.lock();

        let mut client = inner.clients.remove(&addr).ok_or_else(RelayError::not_in_group)?;
        if !client.memberships.contains(id) {
            inner.clients.insert(addr, client);
            return Err(RelayError::not_in_group());
        }

        let group = inner
            .groups
            .get_mut(id)
            .expect("invariant 1 violated: client membership without a live group");
        model::unlink(&mut client, group, now);
        inner.clients.insert(addr, client);

        trace!(group = %id, %addr, "left");
        Ok(())
    }

    /// `!WHO`. See SPEC_FULL §9: multi-membership ties break to the most recently
    /// joined group.
    pub fn who(&self, addr: ClientAddr) -> RelayResult<(GroupId, usize)> {
        let inner = self.inner.lock();
        let client = inner.clients.get(&addr).ok_or_else(RelayError::not_in_group)?;
        let id = client.active_group().ok_or_else(RelayError::not_in_group)?;
        let count = inner.groups.get(id).map(|g| g.members.len()).unwrap_or(0);
        Ok((id.clone(), count))
    }

    /// The group a payload datagram from `addr` should be broadcast to, using the
    /// same most-recently-joined tie-break as `!WHO`. Uses the broadcast-specific
    /// error message (`JoinFirstUseJOIN`) rather than the generic one.
    pub fn active_group_for_broadcast(&self, addr: ClientAddr) -> RelayResult<GroupId> {
        let inner = self.inner.lock();
        let client = inner.clients.get(&addr).ok_or_else(RelayError::not_in_group_broadcast)?;
        client
            .active_group()
            .cloned()
            .ok_or_else(RelayError::not_in_group_broadcast)
    }

    /// Every member address of `id` other than `except`. Used by broadcast fan-out;
    /// the sender is excluded here so callers never have to remember to skip it.
    pub fn members_of_excluding(&self, id: &GroupId, except: ClientAddr) -> Vec<ClientAddr> {
        let inner = self.inner.lock();
        inner
            .groups
            .get(id)
            .map(|g| g.members.iter().copied().filter(|a| *a != except).collect())
            .unwrap_or_default()
    }

    /// Called by the sweeper and (conceptually) on implicit disconnect: removes
    /// `addr` from every group it belongs to and from the client table itself.
    pub fn remove_client(&self, addr: ClientAddr, now: Instant) {
        let mut inner = self.inner.lock();
        let Some(client) = inner.clients.remove(&addr) else { return };

        for group_id in &client.memberships {
            if let Some(group) = inner.groups.get_mut(group_id) {
                group.members.remove(&addr);
                group.note_membership_changed(now);
            }
        }
        for group_id in &client.owned {
            if let Some(group) = inner.groups.get_mut(group_id) {
                group.owner_known = false;
            }
        }
    }

    /// One maintenance pass: evict inactive clients, then reap expired or
    /// owner-gone-and-empty groups. Idempotent — running it twice in a row with no
    /// intervening activity is a no-op on the second call.
    pub fn sweep(&self, now: Instant) -> SweepReport {
        let threshold = self.config.inactivity_threshold();
        let empty_ttl = self.config.empty_ttl;

        let stale: Vec<ClientAddr> = {
            let inner = self.inner.lock();
            inner
                .clients
                .values()
                .filter(|c| now.saturating_duration_since(c.last_activity) > threshold)
                .map(|c| c.addr)
                .collect()
        };
        for addr in &stale {
            self.remove_client(*addr, now);
        }

        let mut inner = self.inner.lock();
        let doomed: Vec<GroupId> = inner
            .groups
            .values()
            .filter(|g| {
                let ttl_expired = g
                    .empty_since
                    .map(|since| now.saturating_duration_since(since) > empty_ttl)
                    .unwrap_or(false);
                let owner_gone_and_empty = !g.owner_known && g.members.is_empty();
                ttl_expired || owner_gone_and_empty
            })
            .map(|g| g.id.clone())
            .collect();
        for id in &doomed {
            inner.groups.remove(id);
        }

        if !stale.is_empty() || !doomed.is_empty() {
            debug!(clients_reaped = stale.len(), groups_reaped = doomed.len(), "sweep");
        }

        SweepReport { clients_reaped: stale.len(), groups_reaped: doomed.len() }
    }

    #[cfg(test)]
    fn group_exists(&self, id: &GroupId) -> bool {
        self.inner.lock().groups.contains_key(id)
    }

    #[cfg(test)]
    fn client_exists(&self, addr: ClientAddr) -> bool {
        self.inner.lock().clients.contains_key(&addr)
    }
}
