// Copyright 2026 MaidSafe.net limited.
//
// This SAFE Network Software is licensed to you under The General Public License (GPL), version 3.
// Unless required by applicable law or agreed to in writing, the SAFE Network Software distributed
// under the GPL Licence is distributed on an "AS IS" BASIS, WITHOUT WARRANTIES OR CONDITIONS OF ANY
// KIND, either express or implied. Please review the Licences for the specific language governing
// permissions and limitations relating to use of the SAFE Network Software.

//! The routing table: `IP -> Contact`, capacity 1000 (spec.md §3, §4.2).
//!
//! This is the sole owner of every [`Contact`]; the onliner, finder and
//! liveness service hold only IPs and look a contact up here on use,
//! tolerating a miss as "contact removed" (spec.md §9's re-architecture
//! note on replacing shared-ownership/cyclic-pointer contact entries).

use crate::contact::{Contact, UdpKey};
use kad_protocol::Id;
use kad_protocol::opcode::MIN_SUPPORT_CONTACT_VERSION;
use std::collections::HashMap;

pub const CAPACITY: usize = 1000;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum AdmissionOutcome {
    Inserted,
    Updated,
    RejectedFull,
    RejectedVersion,
}

pub struct ContactManager {
    contacts: HashMap<u32, Contact>,
    min_version: u8,
}

impl Default for ContactManager {
    fn default() -> Self {
        Self::new()
    }
}

impl ContactManager {
    pub fn new() -> Self {
        Self::with_min_version(MIN_SUPPORT_CONTACT_VERSION)
    }

    /// Like [`Self::new`], but overrides the minimum accepted contact
    /// version (`NodeConfig::min_contact_version`) instead of the
    /// protocol-wide default.
    pub fn with_min_version(min_version: u8) -> Self {
        Self {
            contacts: HashMap::with_capacity(CAPACITY),
            min_version,
        }
    }

    pub fn len(&self) -> usize {
        self.contacts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.contacts.is_empty()
    }

    pub fn is_full(&self) -> bool {
        self.contacts.len() >= CAPACITY
    }

    pub fn get(&self, ip: u32) -> Option<&Contact> {
        self.contacts.get(&ip)
    }

    pub fn get_mut(&mut self, ip: u32) -> Option<&mut Contact> {
        self.contacts.get_mut(&ip)
    }

    pub fn remove(&mut self, ip: u32) -> Option<Contact> {
        self.contacts.remove(&ip)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&u32, &Contact)> {
        self.contacts.iter()
    }

    /// Path (a): load from the persisted node file. Always admitted as
    /// unverified regardless of the on-disk flag, forcing re-probing on
    /// startup (spec.md §4.7).
    pub fn admit_bootstrap(
        &mut self,
        kad_id: Id,
        ip: u32,
        udp_port: u16,
        version: u8,
        now: u64,
    ) -> AdmissionOutcome {
        self.admit(Some(kad_id), ip, udp_port, version, now, false)
    }

    /// Path (b): a completed hello exchange. Marks the contact verified
    /// and records its learned UDP key, ID and version.
    pub fn admit_hello_response(
        &mut self,
        kad_id: Id,
        ip: u32,
        udp_port: u16,
        version: u8,
        learned_udp_key: Option<u32>,
        now: u64,
    ) -> AdmissionOutcome {
        let outcome = self.admit(Some(kad_id), ip, udp_port, version, now, true);
        if matches!(outcome, AdmissionOutcome::Inserted | AdmissionOutcome::Updated) {
            if let Some(key) = learned_udp_key {
                if let Some(c) = self.contacts.get_mut(&ip) {
                    c.udp_key = UdpKey { key, bound_ip: ip };
                }
            }
        }
        outcome
    }

    /// Path (c): a peer surfaced as a side channel inside another
    /// contact's find-node-response. Only added if its IP is new; an
    /// existing contact at that IP is left alone (refreshing the
    /// *responder* itself is a separate call: [`Self::refresh_responder`]).
    pub fn admit_find_node_peer(
        &mut self,
        kad_id: Id,
        ip: u32,
        udp_port: u16,
        version: u8,
        now: u64,
    ) -> AdmissionOutcome {
        if self.contacts.contains_key(&ip) {
            return AdmissionOutcome::Updated;
        }
        self.admit(Some(kad_id), ip, udp_port, version, now, false)
    }

    /// The responder of a find-node-response is refreshed without a
    /// verified-status change (spec.md §4.2).
    pub fn refresh_responder(&mut self, ip: u32, now: u64) {
        if let Some(c) = self.contacts.get_mut(&ip) {
            c.last_live = now;
        }
    }

    fn admit(
        &mut self,
        kad_id: Option<Id>,
        ip: u32,
        udp_port: u16,
        version: u8,
        now: u64,
        verified: bool,
    ) -> AdmissionOutcome {
        if version < self.min_version {
            return AdmissionOutcome::RejectedVersion;
        }
        if let Some(existing) = self.contacts.get_mut(&ip) {
            existing.kad_id = kad_id.or(existing.kad_id);
            existing.udp_port = udp_port;
            existing.version = version;
            existing.verified = verified || existing.verified;
            existing.last_live = now;
            return AdmissionOutcome::Updated;
        }
        if self.is_full() {
            return AdmissionOutcome::RejectedFull;
        }
        let mut contact = Contact::new(kad_id, ip, udp_port, version, now);
        contact.verified = verified;
        self.contacts.insert(ip, contact);
        AdmissionOutcome::Inserted
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rejects_version_below_minimum() {
        let mut mgr = ContactManager::new();
        let outcome = mgr.admit_bootstrap(Id::from_bytes([1; 16]), 1, 4662, 0x02, 0);
        assert_eq!(outcome, AdmissionOutcome::RejectedVersion);
        assert_eq!(mgr.len(), 0);
    }

    #[test]
    fn rejects_once_table_is_full_but_still_updates_existing() {
        let mut mgr = ContactManager::new();
        for ip in 0..CAPACITY as u32 {
            assert_eq!(
                mgr.admit_bootstrap(Id::from_bytes([1; 16]), ip, 4662, 0x03, 0),
                AdmissionOutcome::Inserted
            );
        }
        assert!(mgr.is_full());
        assert_eq!(
            mgr.admit_bootstrap(Id::from_bytes([2; 16]), 99999, 4662, 0x03, 0),
            AdmissionOutcome::RejectedFull
        );
        // existing contacts still get updated even while full
        assert_eq!(
            mgr.admit_bootstrap(Id::from_bytes([3; 16]), 0, 4663, 0x03, 1),
            AdmissionOutcome::Updated
        );
        assert_eq!(mgr.get(0).unwrap().udp_port, 4663);
    }

    #[test]
    fn ip_identity_overwrites_kad_id_change() {
        let mut mgr = ContactManager::new();
        mgr.admit_bootstrap(Id::from_bytes([1; 16]), 7, 4662, 0x03, 0);
        mgr.admit_bootstrap(Id::from_bytes([2; 16]), 7, 4662, 0x03, 1);
        assert_eq!(mgr.len(), 1);
        assert_eq!(mgr.get(7).unwrap().kad_id, Some(Id::from_bytes([2; 16])));
    }

    #[test]
    fn hello_response_marks_verified_and_records_udp_key() {
        let mut mgr = ContactManager::new();
        mgr.admit_hello_response(Id::from_bytes([1; 16]), 7, 4662, 0x03, Some(42), 0);
        let c = mgr.get(7).unwrap();
        assert!(c.verified);
        assert_eq!(c.udp_key.key, 42);
    }
}
