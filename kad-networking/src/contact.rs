// Copyright 2026 MaidSafe.net limited.
//
// This SAFE Network Software is licensed to you under The General Public License (GPL), version 3.
// Unless required by applicable law or agreed to in writing, the SAFE Network Software distributed
// under the GPL Licence is distributed on an "AS IS" BASIS, WITHOUT WARRANTIES OR CONDITIONS OF ANY
// KIND, either express or implied. Please review the Licences for the specific language governing
// permissions and limitations relating to use of the SAFE Network Software.

//! A remote peer's record, keyed by IP elsewhere (see [`crate::contact_manager`]).

use kad_protocol::Id;
use std::collections::VecDeque;

const RTT_HISTORY_LEN: usize = 10;

/// Per-peer receiver-verify-key, valid only while our own public IP still
/// equals `bound_ip` (spec.md §3: "UDP key").
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub struct UdpKey {
    pub key: u32,
    pub bound_ip: u32,
}

impl UdpKey {
    pub fn blank() -> Self {
        Self::default()
    }

    /// The value to place in an obfuscated datagram's receiver-verify-key
    /// field, or `0` when our public IP has moved since this key was
    /// learned.
    pub fn effective_key(&self, local_public_ip: u32) -> u32 {
        if self.bound_ip == local_public_ip {
            self.key
        } else {
            0
        }
    }
}

/// How a contact entered the routing table, mirrored for diagnostics and
/// for the admission rules in `contact_manager` (spec.md §4.2).
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum AdmissionPath {
    Bootstrap,
    HelloResponse,
    FindNodeSideChannel,
}

#[derive(Clone, Debug, PartialEq)]
pub struct Contact {
    pub kad_id: Option<Id>,
    pub ip: u32,
    pub udp_port: u16,
    pub version: u8,
    pub udp_key: UdpKey,
    pub verified: bool,
    pub created: u64,
    pub last_hello_req: u64,
    pub live_expires: u64,
    pub dead_at: u64,
    pub last_live: u64,
    rtt_samples: VecDeque<u32>,
}

impl Contact {
    /// Builds a freshly admitted, not-yet-scheduled contact. Liveness
    /// timestamps are filled in by [`crate::liveness::LivenessService`] on
    /// insertion, not here, since they depend on whether the contact is
    /// verified.
    pub fn new(kad_id: Option<Id>, ip: u32, udp_port: u16, version: u8, now: u64) -> Self {
        Self {
            kad_id,
            ip,
            udp_port,
            version,
            udp_key: UdpKey::blank(),
            verified: false,
            created: now,
            last_hello_req: 0,
            live_expires: 0,
            dead_at: 0,
            last_live: now,
            rtt_samples: VecDeque::with_capacity(RTT_HISTORY_LEN),
        }
    }

    pub fn record_rtt_sample(&mut self, sample_ms: u32) {
        if self.rtt_samples.len() == RTT_HISTORY_LEN {
            self.rtt_samples.pop_front();
        }
        self.rtt_samples.push_back(sample_ms);
    }

    /// Equally weighted mean of up to the last 10 RTT samples.
    pub fn mean_rtt(&self) -> Option<u32> {
        if self.rtt_samples.is_empty() {
            return None;
        }
        let sum: u64 = self.rtt_samples.iter().map(|&v| v as u64).sum();
        Some((sum / self.rtt_samples.len() as u64) as u32)
    }

    pub fn is_dead(&self, now: u64) -> bool {
        now >= self.dead_at
    }

    /// A contact is admitted to search seeding only if it has a KAD ID and
    /// is not dead (spec.md §3 invariant).
    pub fn admissible_for_search(&self, now: u64) -> bool {
        self.kad_id.is_some() && !self.is_dead(now)
    }

    /// `dead_at > live_expires > last_hello_req` (spec.md §3 invariant).
    pub fn timestamps_are_consistent(&self) -> bool {
        self.dead_at > self.live_expires && self.live_expires > self.last_hello_req
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn udp_key_is_zero_once_public_ip_moves() {
        let key = UdpKey {
            key: 77,
            bound_ip: 10,
        };
        assert_eq!(key.effective_key(10), 77);
        assert_eq!(key.effective_key(11), 0);
    }

    #[test]
    fn rtt_history_is_bounded_to_ten_samples() {
        let mut c = Contact::new(None, 1, 4662, 3, 0);
        for i in 0..20u32 {
            c.record_rtt_sample(i);
        }
        // last 10 samples are 10..=19, mean = 14
        assert_eq!(c.mean_rtt(), Some(14));
    }

    #[test]
    fn contact_without_kad_id_is_not_admissible() {
        let mut c = Contact::new(None, 1, 4662, 3, 0);
        c.dead_at = 1000;
        assert!(!c.admissible_for_search(0));
        c.kad_id = Some(Id::from_bytes([1; 16]));
        assert!(c.admissible_for_search(0));
        assert!(!c.admissible_for_search(1000));
    }
}
