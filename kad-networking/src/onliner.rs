// Copyright 2026 MaidSafe.net limited.
//
// This SAFE Network Software is licensed to you under The General Public License (GPL), version 3.
// Unless required by applicable law or agreed to in writing, the SAFE Network Software distributed
// under the GPL Licence is distributed on an "AS IS" BASIS, WITHOUT WARRANTIES OR CONDITIONS OF ANY
// KIND, either express or implied. Please review the Licences for the specific language governing
// permissions and limitations relating to use of the SAFE Network Software.

//! Age-ordered live-contact set used to seed new searches (spec.md §4.2).
//!
//! Ordered by `created` ascending: older peers are more likely to remain
//! online, so a search walks from oldest to newest. An ordered map keyed
//! by `(created_second, ip)` replaces the source's doubly-linked bucket
//! list (spec.md §9).

use crate::contact_manager::ContactManager;
use crate::dispatch::decide_opcode;
use crate::rate_guard::PacketRequestGuard;
use kad_protocol::Id;
use std::collections::{BTreeMap, HashMap};

const MAX_CANDIDATES: usize = 10;

pub struct Onliner {
    by_age: BTreeMap<u64, Vec<u32>>,
    created_at: HashMap<u32, u64>,
}

impl Default for Onliner {
    fn default() -> Self {
        Self::new()
    }
}

impl Onliner {
    pub fn new() -> Self {
        Self {
            by_age: BTreeMap::new(),
            created_at: HashMap::new(),
        }
    }

    pub fn insert(&mut self, ip: u32, created: u64) {
        if let Some(prev) = self.created_at.insert(ip, created) {
            self.remove_from_bucket(prev, ip);
        }
        self.by_age.entry(created).or_default().push(ip);
    }

    pub fn remove(&mut self, ip: u32) {
        if let Some(created) = self.created_at.remove(&ip) {
            self.remove_from_bucket(created, ip);
        }
    }

    fn remove_from_bucket(&mut self, created: u64, ip: u32) {
        if let Some(bucket) = self.by_age.get_mut(&created) {
            bucket.retain(|&x| x != ip);
            if bucket.is_empty() {
                self.by_age.remove(&created);
            }
        }
    }

    pub fn len(&self) -> usize {
        self.created_at.len()
    }

    pub fn is_empty(&self) -> bool {
        self.created_at.is_empty()
    }

    /// Walks oldest-to-newest, skipping contacts without a KAD ID or
    /// whose outbound rate for the opcode the distance picks would be
    /// exceeded, returning up to 10 `(ip, opcode)` candidates.
    pub fn get_search_contacts(
        &self,
        target: &Id,
        contacts: &ContactManager,
        rate_guard: &mut PacketRequestGuard,
        now: u64,
    ) -> Vec<(u32, crate::rate_guard::GuardOpcode)> {
        let mut out = Vec::with_capacity(MAX_CANDIDATES);
        'outer: for ips in self.by_age.values() {
            for &ip in ips {
                let Some(contact) = contacts.get(ip) else {
                    continue; // tolerate a miss: contact was removed concurrently
                };
                let Some(kad_id) = contact.kad_id.as_ref() else {
                    continue;
                };
                if contact.is_dead(now) {
                    continue;
                }
                let opcode = decide_opcode(target, kad_id);
                if !rate_guard.can_pass(ip, opcode, now) {
                    continue;
                }
                out.push((ip, opcode));
                if out.len() >= MAX_CANDIDATES {
                    break 'outer;
                }
            }
        }
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rate_guard::GuardOpcode;

    #[test]
    fn walks_oldest_first() {
        let mut onliner = Onliner::new();
        onliner.insert(1, 10);
        onliner.insert(2, 5);
        onliner.insert(3, 20);

        let mut contacts = ContactManager::new();
        for ip in [1u32, 2, 3] {
            contacts.admit_hello_response(Id::from_bytes([ip as u8; 16]), ip, 4662, 3, None, 0);
        }
        let mut guard = PacketRequestGuard::new();
        let target = Id::from_bytes([0; 16]);
        let picked = onliner.get_search_contacts(&target, &contacts, &mut guard, 0);
        let order: Vec<u32> = picked.iter().map(|(ip, _)| *ip).collect();
        assert_eq!(order, vec![2, 1, 3]);
    }

    #[test]
    fn skips_contacts_without_kad_id_or_over_rate_limit() {
        let mut onliner = Onliner::new();
        onliner.insert(1, 0);
        onliner.insert(2, 1);

        let mut contacts = ContactManager::new();
        contacts.admit_bootstrap(Id::from_bytes([9; 16]), 1, 4662, 3, 0); // no kad id yet
        contacts.admit_hello_response(Id::from_bytes([9; 16]), 2, 4662, 3, None, 0);

        let mut guard = PacketRequestGuard::new();
        let target = Id::from_bytes([9; 16]);
        let picked = onliner.get_search_contacts(&target, &contacts, &mut guard, 0);
        assert_eq!(picked, vec![(2, GuardOpcode::SearchKeyReq)]);
    }

    #[test]
    fn caps_at_ten_candidates() {
        let mut onliner = Onliner::new();
        let mut contacts = ContactManager::new();
        for ip in 0..20u32 {
            onliner.insert(ip, ip as u64);
            contacts.admit_hello_response(Id::from_bytes([ip as u8; 16]), ip, 4662, 3, None, 0);
        }
        let mut guard = PacketRequestGuard::new();
        let target = Id::from_bytes([0; 16]);
        let picked = onliner.get_search_contacts(&target, &contacts, &mut guard, 0);
        assert_eq!(picked.len(), 10);
    }
}
