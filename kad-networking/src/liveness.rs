// Copyright 2026 MaidSafe.net limited.
//
// This SAFE Network Software is licensed to you under The General Public License (GPL), version 3.
// Unless required by applicable law or agreed to in writing, the SAFE Network Software distributed
// under the GPL Licence is distributed on an "AS IS" BASIS, WITHOUT WARRANTIES OR CONDITIONS OF ANY
// KIND, either express or implied. Please review the Licences for the specific language governing
// permissions and limitations relating to use of the SAFE Network Software.

//! Time-bucketed contact expiry (spec.md §4.2).
//!
//! Contacts are bucketed by the second at which their `live_expires`
//! falls; a cursor advances one second at a time up to wall clock,
//! re-bucketing or killing whatever falls due. This replaces the source's
//! ad-hoc linked list with an ordered map keyed by time, per spec.md §9.

use crate::contact_manager::ContactManager;
use std::collections::{BTreeMap, HashSet};

const VERIFIED_MIN_LIFETIME: u64 = 60;
const VERIFIED_DEAD_GRACE: u64 = 15;
const UNVERIFIED_LIFETIME: u64 = 5;
const UNVERIFIED_DEAD_GRACE: u64 = 10;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum LivenessEvent {
    /// The contact's `dead_at` has passed; it has already been removed
    /// from the routing table by the time this is returned.
    Dead(u32),
    /// A hello-request should be (re-)sent to this still-live contact.
    SendHello(u32),
}

pub struct LivenessService {
    buckets: BTreeMap<u64, HashSet<u32>>,
    cur_time: u64,
}

impl Default for LivenessService {
    fn default() -> Self {
        Self::new(0)
    }
}

impl LivenessService {
    pub fn new(start_time: u64) -> Self {
        Self {
            buckets: BTreeMap::new(),
            cur_time: start_time,
        }
    }

    fn bucket(&mut self, at: u64, ip: u32) {
        self.buckets.entry(at).or_default().insert(ip);
    }

    /// Schedules a newly inserted contact. Returns `true` if a
    /// hello-request must be sent immediately (the unverified path).
    pub fn schedule_new(&mut self, contacts: &mut ContactManager, ip: u32, jitter: u64, now: u64) -> bool {
        let Some(contact) = contacts.get_mut(ip) else {
            return false;
        };
        if contact.verified {
            contact.live_expires = now + jitter.min(9) + VERIFIED_MIN_LIFETIME + 1;
            contact.dead_at = contact.live_expires + VERIFIED_DEAD_GRACE;
            self.bucket(contact.live_expires, ip);
            false
        } else {
            contact.live_expires = now + UNVERIFIED_LIFETIME;
            contact.dead_at = contact.live_expires + UNVERIFIED_DEAD_GRACE;
            contact.last_hello_req = now;
            self.bucket(contact.live_expires, ip);
            true
        }
    }

    /// Rebases a contact's expiry on the long (verified) schedule after
    /// any inbound datagram from its IP; re-buckets it.
    pub fn refresh(&mut self, contacts: &mut ContactManager, ip: u32, jitter: u64, now: u64) {
        let Some(contact) = contacts.get_mut(ip) else {
            return;
        };
        contact.last_live = now;
        contact.live_expires = now + jitter.min(9) + VERIFIED_MIN_LIFETIME + 1;
        contact.dead_at = contact.live_expires + VERIFIED_DEAD_GRACE;
        self.bucket(contact.live_expires, ip);
    }

    /// Advances the cursor one second at a time up to `wall_now`, killing
    /// or re-probing every contact bucketed at or before each step.
    pub fn tick(&mut self, contacts: &mut ContactManager, wall_now: u64) -> Vec<LivenessEvent> {
        let mut events = Vec::new();
        while self.cur_time <= wall_now {
            if let Some(ips) = self.buckets.remove(&self.cur_time) {
                for ip in ips {
                    let Some(contact) = contacts.get_mut(ip) else {
                        continue; // already removed elsewhere; tolerate the miss
                    };
                    if wall_now >= contact.dead_at {
                        contacts.remove(ip);
                        events.push(LivenessEvent::Dead(ip));
                    } else {
                        let new_expires = wall_now + UNVERIFIED_LIFETIME;
                        contact.live_expires = new_expires;
                        contact.dead_at = new_expires + UNVERIFIED_DEAD_GRACE;
                        contact.last_hello_req = wall_now;
                        self.bucket(new_expires, ip);
                        events.push(LivenessEvent::SendHello(ip));
                    }
                }
            }
            self.cur_time += 1;
        }
        events
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use kad_protocol::Id;

    #[test]
    fn verified_contact_gets_long_schedule_and_no_immediate_hello() {
        let mut contacts = ContactManager::new();
        contacts.admit_hello_response(Id::from_bytes([1; 16]), 7, 4662, 3, Some(1), 0);
        let mut liveness = LivenessService::new(0);
        let needs_hello = liveness.schedule_new(&mut contacts, 7, 3, 0);
        assert!(!needs_hello);
        let c = contacts.get(7).unwrap();
        assert!(c.timestamps_are_consistent());
        assert_eq!(c.live_expires, 64);
        assert_eq!(c.dead_at, 79);
    }

    #[test]
    fn unverified_contact_needs_immediate_hello_on_short_schedule() {
        let mut contacts = ContactManager::new();
        contacts.admit_bootstrap(Id::from_bytes([1; 16]), 7, 4662, 3, 0);
        let mut liveness = LivenessService::new(0);
        let needs_hello = liveness.schedule_new(&mut contacts, 7, 0, 0);
        assert!(needs_hello);
        let c = contacts.get(7).unwrap();
        assert_eq!(c.live_expires, 5);
        assert_eq!(c.dead_at, 15);
    }

    #[test]
    fn tick_kills_contact_once_wall_clock_passes_dead_at() {
        let mut contacts = ContactManager::new();
        contacts.admit_bootstrap(Id::from_bytes([1; 16]), 7, 4662, 3, 0);
        let mut liveness = LivenessService::new(0);
        liveness.schedule_new(&mut contacts, 7, 0, 0);
        // live_expires=5, dead_at=15: a tick at t=15 should kill it.
        let events = liveness.tick(&mut contacts, 15);
        assert!(events.contains(&LivenessEvent::Dead(7)));
        assert!(contacts.get(7).is_none());
    }

    #[test]
    fn tick_re_probes_still_live_contact_past_live_expires() {
        let mut contacts = ContactManager::new();
        contacts.admit_bootstrap(Id::from_bytes([1; 16]), 7, 4662, 3, 0);
        let mut liveness = LivenessService::new(0);
        liveness.schedule_new(&mut contacts, 7, 0, 0); // live_expires=5, dead_at=15
        let events = liveness.tick(&mut contacts, 5);
        assert!(events.contains(&LivenessEvent::SendHello(7)));
        assert!(contacts.get(7).is_some());
    }
}
