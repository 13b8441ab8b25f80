// Copyright 2026 MaidSafe.net limited.
//
// This SAFE Network Software is licensed to you under The General Public License (GPL), version 3.
// Unless required by applicable law or agreed to in writing, the SAFE Network Software distributed
// under the GPL Licence is distributed on an "AS IS" BASIS, WITHOUT WARRANTIES OR CONDITIONS OF ANY
// KIND, either express or implied. Please review the Licences for the specific language governing
// permissions and limitations relating to use of the SAFE Network Software.

//! Random-target walk used to discover new peers (spec.md §4.2).
//!
//! Every scheduler tick pops up to 5 contacts from the back of the list
//! and moves them to the front; any with a KAD ID and version `>= 0x02`
//! is sent a fresh find-node-req toward a random target. The finder does
//! not run while the routing table is full.

use crate::contact_manager::ContactManager;
use kad_protocol::opcode::KADEMLIA_VERSION_2_47A;
use std::collections::{HashSet, VecDeque};

const CONTACTS_PER_TICK: usize = 5;

pub struct Finder {
    order: VecDeque<u32>,
    members: HashSet<u32>,
}

impl Default for Finder {
    fn default() -> Self {
        Self::new()
    }
}

impl Finder {
    pub fn new() -> Self {
        Self {
            order: VecDeque::new(),
            members: HashSet::new(),
        }
    }

    pub fn push(&mut self, ip: u32) {
        if self.members.insert(ip) {
            self.order.push_front(ip);
        }
    }

    pub fn remove(&mut self, ip: u32) {
        if self.members.remove(&ip) {
            self.order.retain(|&x| x != ip);
        }
    }

    pub fn len(&self) -> usize {
        self.order.len()
    }

    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }

    /// Returns the IPs that should receive a find-node-req this tick.
    pub fn tick(&mut self, contacts: &ContactManager, table_full: bool) -> Vec<u32> {
        if table_full {
            return Vec::new();
        }
        let n = CONTACTS_PER_TICK.min(self.order.len());
        let mut to_query = Vec::with_capacity(n);
        for _ in 0..n {
            let Some(ip) = self.order.pop_back() else {
                break;
            };
            self.order.push_front(ip);
            if let Some(contact) = contacts.get(ip) {
                if contact.kad_id.is_some() && contact.version >= KADEMLIA_VERSION_2_47A {
                    to_query.push(ip);
                }
            }
        }
        to_query
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use kad_protocol::Id;

    #[test]
    fn does_not_run_while_table_is_full() {
        let mut finder = Finder::new();
        finder.push(1);
        let contacts = ContactManager::new();
        assert!(finder.tick(&contacts, true).is_empty());
    }

    #[test]
    fn queries_contacts_with_kad_id_and_supported_version() {
        let mut finder = Finder::new();
        finder.push(1);
        finder.push(2);
        let mut contacts = ContactManager::new();
        contacts.admit_hello_response(Id::from_bytes([1; 16]), 1, 4662, 3, None, 0);
        contacts.admit_bootstrap(Id::from_bytes([1; 16]), 2, 4662, 3, 0);
        // give contact 2 a kad id but version below the finder's floor
        if let Some(c) = contacts.get_mut(2) {
            c.version = 1;
        }
        let to_query = finder.tick(&contacts, false);
        assert_eq!(to_query, vec![1]);
    }

    #[test]
    fn moves_popped_contacts_to_the_front() {
        let mut finder = Finder::new();
        for ip in 1..=3u32 {
            finder.push(ip);
        }
        let contacts = ContactManager::new();
        finder.tick(&contacts, false);
        assert_eq!(finder.order, VecDeque::from(vec![1u32, 2, 3]));
    }
}
